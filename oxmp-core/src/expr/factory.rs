//! Arena factory for immutable expression nodes.
//!
//! All expressions built from one .nl file live in a single [`ExprFactory`];
//! handles stay valid for the factory's lifetime and the arena is reclaimed
//! wholesale on drop. Variadic kinds are built through scoped builders
//! (`begin_* .. end_*`): a builder is bounds-checked against the arity it was
//! declared with and consumed exactly once by the matching `end_*` call.
//!
//! Kind and argument-type mismatches are program errors and are rejected by
//! debug assertions rather than `Result`s.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::kind::ExprKind;
use super::{CountExpr, Expr, ExprId, LogicalExpr, NumericExpr, Variable};
use crate::common::FuncType;

/// Handle to a registered function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub(crate) u32);

/// A function callable from expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    name: String,
    num_args: i32,
    ty: FuncType,
}

impl Function {
    /// Function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared arity; `-1` means variadic.
    #[must_use]
    pub fn num_args(&self) -> i32 {
        self.num_args
    }

    /// Numeric or symbolic.
    #[must_use]
    pub fn func_type(&self) -> FuncType {
        self.ty
    }
}

/// Payload of one expression node, selected by kind.
#[derive(Debug)]
pub(crate) enum ExprData {
    Number(f64),
    Bool(bool),
    Index(i32),
    Unary(ExprId),
    Binary(ExprId, ExprId),
    Ternary(ExprId, ExprId, ExprId),
    PlTerm {
        breakpoints: Box<[f64]>,
        slopes: Box<[f64]>,
        var: ExprId,
    },
    Call {
        func: FuncId,
        args: Box<[ExprId]>,
    },
    Args(Box<[ExprId]>),
    Str(Box<[u8]>),
}

#[derive(Debug)]
pub(crate) struct ExprNode {
    pub(crate) kind: ExprKind,
    pub(crate) data: ExprData,
}

/// Owner of all expression nodes and registered functions.
///
/// The factory can be moved but not cloned; handles index into its arena.
#[derive(Debug, Default)]
pub struct ExprFactory {
    nodes: Vec<ExprNode>,
    funcs: Vec<Function>,
    func_names: FxHashMap<String, FuncId>,
}

/// Builder for iterated numeric kinds (`min`, `max`, `sum`, `numberof`) and
/// pairwise kinds (`alldiff`, `!alldiff`).
#[derive(Debug)]
pub struct IteratedExprBuilder {
    kind: ExprKind,
    args: SmallVec<[ExprId; 4]>,
    capacity: usize,
}

impl IteratedExprBuilder {
    /// Append the next argument. Adding more arguments than declared is a
    /// program error.
    pub fn add_arg(&mut self, arg: NumericExpr) {
        debug_assert!(self.args.len() < self.capacity, "too many arguments");
        self.args.push(arg.0);
    }
}

/// Builder for kinds with logical arguments (`count`, `exists`, `forall`).
#[derive(Debug)]
pub struct LogicalArgsBuilder {
    kind: ExprKind,
    args: SmallVec<[ExprId; 4]>,
    capacity: usize,
}

impl LogicalArgsBuilder {
    /// Append the next argument.
    pub fn add_arg(&mut self, arg: LogicalExpr) {
        debug_assert!(self.args.len() < self.capacity, "too many arguments");
        self.args.push(arg.0);
    }
}

/// Builder for kinds whose arguments mix numeric and string expressions
/// (symbolic `numberof`).
#[derive(Debug)]
pub struct SymbolicArgsBuilder {
    args: SmallVec<[ExprId; 4]>,
    capacity: usize,
}

impl SymbolicArgsBuilder {
    /// Append the next argument.
    pub fn add_arg(&mut self, arg: Expr) {
        debug_assert!(self.args.len() < self.capacity, "too many arguments");
        self.args.push(arg.0);
    }
}

/// Builder for function-call expressions.
#[derive(Debug)]
pub struct CallExprBuilder {
    func: FuncId,
    args: SmallVec<[ExprId; 4]>,
    capacity: usize,
}

impl CallExprBuilder {
    /// Append the next argument; call arguments may be numeric expressions
    /// or string literals.
    pub fn add_arg(&mut self, arg: Expr) {
        debug_assert!(self.args.len() < self.capacity, "too many arguments");
        self.args.push(arg.0);
    }
}

/// Builder for piecewise-linear terms. Slopes and breakpoints arrive in
/// interleaved order: slope, breakpoint, slope, ..., slope.
#[derive(Debug)]
pub struct PlTermExprBuilder {
    num_breakpoints: usize,
    breakpoints: Vec<f64>,
    slopes: Vec<f64>,
}

impl PlTermExprBuilder {
    /// Append the next slope.
    pub fn add_slope(&mut self, slope: f64) {
        debug_assert!(self.slopes.len() <= self.num_breakpoints, "too many slopes");
        self.slopes.push(slope);
    }

    /// Append the next breakpoint.
    pub fn add_breakpoint(&mut self, breakpoint: f64) {
        debug_assert!(
            self.breakpoints.len() < self.num_breakpoints,
            "too many breakpoints"
        );
        self.breakpoints.push(breakpoint);
    }
}

impl ExprFactory {
    /// Create an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: ExprKind, data: ExprData) -> ExprId {
        let id = ExprId(u32::try_from(self.nodes.len()).expect("expression arena overflow"));
        self.nodes.push(ExprNode { kind, data });
        id
    }

    pub(crate) fn node(&self, id: ExprId) -> &ExprNode {
        &self.nodes[id.index()]
    }

    /// Number of expression nodes currently in the arena.
    #[must_use]
    pub fn num_exprs(&self) -> usize {
        self.nodes.len()
    }

    /// Kind of an expression.
    #[must_use]
    pub fn kind(&self, e: impl Into<Expr>) -> ExprKind {
        self.node(e.into().0).kind
    }

    /// Value of a numeric constant, or `None` for any other kind.
    #[must_use]
    pub fn numeric_constant_value(&self, e: NumericExpr) -> Option<f64> {
        match self.node(e.0).data {
            ExprData::Number(v) => Some(v),
            _ => None,
        }
    }

    // ---------------------------------------------------------------------
    // Numeric expressions
    // ---------------------------------------------------------------------

    /// Create a numeric constant.
    pub fn make_numeric_constant(&mut self, value: f64) -> NumericExpr {
        NumericExpr(self.push(ExprKind::Number, ExprData::Number(value)))
    }

    /// Create a reference to the variable with the given zero-based index.
    pub fn make_variable(&mut self, index: i32) -> Variable {
        debug_assert!(index >= 0, "negative variable index");
        Variable(self.push(ExprKind::Variable, ExprData::Index(index)))
    }

    /// Create a reference to the common expression with the given zero-based
    /// index.
    pub fn make_common_expr_ref(&mut self, index: i32) -> NumericExpr {
        debug_assert!(index >= 0, "negative common expression index");
        NumericExpr(self.push(ExprKind::CommonExprRef, ExprData::Index(index)))
    }

    /// Create a unary numeric expression.
    pub fn make_unary(&mut self, kind: ExprKind, arg: NumericExpr) -> NumericExpr {
        debug_assert!(kind.is_unary(), "invalid expression kind {kind:?}");
        NumericExpr(self.push(kind, ExprData::Unary(arg.0)))
    }

    /// Create a binary numeric expression.
    pub fn make_binary(&mut self, kind: ExprKind, lhs: NumericExpr, rhs: NumericExpr) -> NumericExpr {
        debug_assert!(kind.is_binary(), "invalid expression kind {kind:?}");
        NumericExpr(self.push(kind, ExprData::Binary(lhs.0, rhs.0)))
    }

    /// Create an if-then-else expression over numeric branches.
    pub fn make_if(
        &mut self,
        condition: LogicalExpr,
        then_expr: NumericExpr,
        else_expr: NumericExpr,
    ) -> NumericExpr {
        NumericExpr(self.push(
            ExprKind::If,
            ExprData::Ternary(condition.0, then_expr.0, else_expr.0),
        ))
    }

    /// Start building a piecewise-linear term with `num_breakpoints`
    /// breakpoints (and `num_breakpoints + 1` slopes).
    pub fn begin_pl_term(&mut self, num_breakpoints: usize) -> PlTermExprBuilder {
        debug_assert!(num_breakpoints > 0, "piecewise-linear term needs breakpoints");
        PlTermExprBuilder {
            num_breakpoints,
            breakpoints: Vec::with_capacity(num_breakpoints),
            slopes: Vec::with_capacity(num_breakpoints + 1),
        }
    }

    /// Finish a piecewise-linear term applied to `var`.
    pub fn end_pl_term(&mut self, builder: PlTermExprBuilder, var: Variable) -> NumericExpr {
        debug_assert_eq!(
            builder.breakpoints.len(),
            builder.num_breakpoints,
            "wrong number of breakpoints"
        );
        debug_assert_eq!(
            builder.slopes.len(),
            builder.num_breakpoints + 1,
            "wrong number of slopes"
        );
        debug_assert!(
            builder.breakpoints.is_sorted_by(|a, b| a < b),
            "breakpoints must be strictly increasing"
        );
        NumericExpr(self.push(
            ExprKind::PlTerm,
            ExprData::PlTerm {
                breakpoints: builder.breakpoints.into_boxed_slice(),
                slopes: builder.slopes.into_boxed_slice(),
                var: var.0,
            },
        ))
    }

    /// Register a function; registering the same name again returns the
    /// existing handle.
    pub fn add_function(&mut self, name: &str, num_args: i32, ty: FuncType) -> FuncId {
        if let Some(&id) = self.func_names.get(name) {
            return id;
        }
        let id = FuncId(u32::try_from(self.funcs.len()).expect("function table overflow"));
        self.funcs.push(Function {
            name: name.to_string(),
            num_args,
            ty,
        });
        self.func_names.insert(name.to_string(), id);
        id
    }

    /// Resolve a registered function by name.
    #[must_use]
    pub fn find_function(&self, name: &str) -> Option<FuncId> {
        self.func_names.get(name).copied()
    }

    /// Access a registered function.
    #[must_use]
    pub fn function(&self, id: FuncId) -> &Function {
        &self.funcs[id.0 as usize]
    }

    /// Number of registered functions.
    #[must_use]
    pub fn num_functions(&self) -> usize {
        self.funcs.len()
    }

    /// Start building a call to `func` with `num_args` arguments.
    pub fn begin_call(&mut self, func: FuncId, num_args: usize) -> CallExprBuilder {
        let declared = self.function(func).num_args;
        debug_assert!(
            declared < 0 || declared as usize == num_args,
            "wrong number of arguments to {}",
            self.function(func).name()
        );
        CallExprBuilder {
            func,
            args: SmallVec::with_capacity(num_args),
            capacity: num_args,
        }
    }

    /// Finish a call expression.
    pub fn end_call(&mut self, builder: CallExprBuilder) -> NumericExpr {
        debug_assert_eq!(builder.args.len(), builder.capacity, "missing arguments");
        NumericExpr(self.push(
            ExprKind::Call,
            ExprData::Call {
                func: builder.func,
                args: builder.args.into_vec().into_boxed_slice(),
            },
        ))
    }

    /// Start building an iterated numeric expression (`Min`, `Max` or `Sum`).
    /// `min` and `max` demand at least one argument.
    pub fn begin_iterated(&mut self, kind: ExprKind, num_args: usize) -> IteratedExprBuilder {
        debug_assert!(
            kind.is_vararg() || kind == ExprKind::Sum,
            "invalid expression kind {kind:?}"
        );
        debug_assert!(!kind.is_vararg() || num_args >= 1, "too few arguments");
        IteratedExprBuilder {
            kind,
            args: SmallVec::with_capacity(num_args),
            capacity: num_args,
        }
    }

    /// Finish an iterated numeric expression.
    pub fn end_iterated(&mut self, builder: IteratedExprBuilder) -> NumericExpr {
        debug_assert_eq!(builder.args.len(), builder.capacity, "missing arguments");
        NumericExpr(self.push(
            builder.kind,
            ExprData::Args(builder.args.into_vec().into_boxed_slice()),
        ))
    }

    /// Start building a `numberof` expression; `value` is the expression
    /// being counted and occupies argument slot 0.
    pub fn begin_number_of(&mut self, num_args: usize, value: NumericExpr) -> IteratedExprBuilder {
        debug_assert!(num_args >= 1, "too few arguments");
        let mut args = SmallVec::with_capacity(num_args);
        args.push(value.0);
        IteratedExprBuilder {
            kind: ExprKind::NumberOf,
            args,
            capacity: num_args,
        }
    }

    /// Finish a `numberof` expression.
    pub fn end_number_of(&mut self, builder: IteratedExprBuilder) -> NumericExpr {
        debug_assert_eq!(builder.kind, ExprKind::NumberOf);
        self.end_iterated(builder)
    }

    /// Start building a symbolic `numberof`; arguments may mix numeric
    /// expressions and string literals.
    pub fn begin_number_of_sym(&mut self, num_args: usize, value: Expr) -> SymbolicArgsBuilder {
        debug_assert!(num_args >= 1, "too few arguments");
        let mut args = SmallVec::with_capacity(num_args);
        args.push(value.0);
        SymbolicArgsBuilder {
            args,
            capacity: num_args,
        }
    }

    /// Finish a symbolic `numberof` expression.
    pub fn end_number_of_sym(&mut self, builder: SymbolicArgsBuilder) -> NumericExpr {
        debug_assert_eq!(builder.args.len(), builder.capacity, "missing arguments");
        NumericExpr(self.push(
            ExprKind::NumberOfSym,
            ExprData::Args(builder.args.into_vec().into_boxed_slice()),
        ))
    }

    /// Start building a `count` expression over logical arguments.
    pub fn begin_count(&mut self, num_args: usize) -> LogicalArgsBuilder {
        LogicalArgsBuilder {
            kind: ExprKind::Count,
            args: SmallVec::with_capacity(num_args),
            capacity: num_args,
        }
    }

    /// Finish a `count` expression.
    pub fn end_count(&mut self, builder: LogicalArgsBuilder) -> CountExpr {
        debug_assert_eq!(builder.kind, ExprKind::Count);
        debug_assert_eq!(builder.args.len(), builder.capacity, "missing arguments");
        CountExpr(self.push(
            ExprKind::Count,
            ExprData::Args(builder.args.into_vec().into_boxed_slice()),
        ))
    }

    // ---------------------------------------------------------------------
    // Logical expressions
    // ---------------------------------------------------------------------

    /// Create a logical constant.
    pub fn make_logical_constant(&mut self, value: bool) -> LogicalExpr {
        LogicalExpr(self.push(ExprKind::Bool, ExprData::Bool(value)))
    }

    /// Create a logical negation.
    pub fn make_not(&mut self, arg: LogicalExpr) -> LogicalExpr {
        LogicalExpr(self.push(ExprKind::Not, ExprData::Unary(arg.0)))
    }

    /// Create a binary logical expression (`Or`, `And`, `Iff`).
    pub fn make_binary_logical(
        &mut self,
        kind: ExprKind,
        lhs: LogicalExpr,
        rhs: LogicalExpr,
    ) -> LogicalExpr {
        debug_assert!(kind.is_binary_logical(), "invalid expression kind {kind:?}");
        LogicalExpr(self.push(kind, ExprData::Binary(lhs.0, rhs.0)))
    }

    /// Create a relational expression over numeric operands.
    pub fn make_relational(
        &mut self,
        kind: ExprKind,
        lhs: NumericExpr,
        rhs: NumericExpr,
    ) -> LogicalExpr {
        debug_assert!(kind.is_relational(), "invalid expression kind {kind:?}");
        LogicalExpr(self.push(kind, ExprData::Binary(lhs.0, rhs.0)))
    }

    /// Create a logical count expression (`atleast` and friends) comparing
    /// `lhs` against a count.
    pub fn make_logical_count(
        &mut self,
        kind: ExprKind,
        lhs: NumericExpr,
        count: CountExpr,
    ) -> LogicalExpr {
        debug_assert!(kind.is_logical_count(), "invalid expression kind {kind:?}");
        LogicalExpr(self.push(kind, ExprData::Binary(lhs.0, count.0)))
    }

    /// Create an implication `condition ==> then_expr else else_expr`.
    pub fn make_implication(
        &mut self,
        condition: LogicalExpr,
        then_expr: LogicalExpr,
        else_expr: LogicalExpr,
    ) -> LogicalExpr {
        LogicalExpr(self.push(
            ExprKind::Implication,
            ExprData::Ternary(condition.0, then_expr.0, else_expr.0),
        ))
    }

    /// Start building an iterated logical expression (`Exists` or `ForAll`).
    pub fn begin_iterated_logical(&mut self, kind: ExprKind, num_args: usize) -> LogicalArgsBuilder {
        debug_assert!(kind.is_iterated_logical(), "invalid expression kind {kind:?}");
        LogicalArgsBuilder {
            kind,
            args: SmallVec::with_capacity(num_args),
            capacity: num_args,
        }
    }

    /// Finish an iterated logical expression.
    pub fn end_iterated_logical(&mut self, builder: LogicalArgsBuilder) -> LogicalExpr {
        debug_assert!(builder.kind.is_iterated_logical());
        debug_assert_eq!(builder.args.len(), builder.capacity, "missing arguments");
        LogicalExpr(self.push(
            builder.kind,
            ExprData::Args(builder.args.into_vec().into_boxed_slice()),
        ))
    }

    /// Start building a pairwise expression (`AllDiff` or `NotAllDiff`) over
    /// numeric arguments.
    pub fn begin_pairwise(&mut self, kind: ExprKind, num_args: usize) -> IteratedExprBuilder {
        debug_assert!(kind.is_pairwise(), "invalid expression kind {kind:?}");
        IteratedExprBuilder {
            kind,
            args: SmallVec::with_capacity(num_args),
            capacity: num_args,
        }
    }

    /// Finish a pairwise expression.
    pub fn end_pairwise(&mut self, builder: IteratedExprBuilder) -> LogicalExpr {
        debug_assert!(builder.kind.is_pairwise());
        debug_assert_eq!(builder.args.len(), builder.capacity, "missing arguments");
        LogicalExpr(self.push(
            builder.kind,
            ExprData::Args(builder.args.into_vec().into_boxed_slice()),
        ))
    }

    // ---------------------------------------------------------------------
    // String expressions
    // ---------------------------------------------------------------------

    /// Create a string literal; the bytes may contain NUL and newline.
    pub fn make_string_literal(&mut self, value: &[u8]) -> Expr {
        Expr(self.push(ExprKind::String, ExprData::Str(value.into())))
    }

    /// Create a symbolic if-then-else whose branches may be strings.
    pub fn make_symbolic_if(
        &mut self,
        condition: LogicalExpr,
        then_expr: Expr,
        else_expr: Expr,
    ) -> Expr {
        Expr(self.push(
            ExprKind::IfSym,
            ExprData::Ternary(condition.0, then_expr.0, else_expr.0),
        ))
    }
}
