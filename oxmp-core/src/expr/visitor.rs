//! Double dispatch over expression kinds.
//!
//! [`ExprVisitor`] exposes one hook per kind plus class-level fallbacks
//! (`visit_unary`, `visit_binary`, ...); every default forwards to
//! [`ExprVisitor::visit_unhandled_numeric`] or
//! [`ExprVisitor::visit_unhandled_logical`], which fail loudly. A visitor
//! overrides only the kinds it handles. Dispatch reads the kind tag and
//! routes to the matching hook; traversal order inside hooks is up to the
//! visitor, and the dispatcher itself keeps no state between calls.

use super::factory::{ExprData, ExprFactory, Function};
use super::kind::ExprKind;
use super::{CountExpr as CountId, Expr, ExprId, LogicalExpr, NumericExpr, Variable};
use crate::error::{NlError, Result};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Expr {}
    impl Sealed for super::NumericExpr {}
    impl Sealed for super::LogicalExpr {}
    impl Sealed for super::CountId {}
    impl Sealed for super::Variable {}
}

/// Typed expression handles, used as the argument type of the generic views.
pub trait ExprHandle: Copy + sealed::Sealed {
    #[doc(hidden)]
    fn from_id(id: ExprId) -> Self;
    /// Identity of the underlying node.
    fn id(self) -> ExprId;
}

impl ExprHandle for Expr {
    fn from_id(id: ExprId) -> Self {
        Expr(id)
    }
    fn id(self) -> ExprId {
        self.0
    }
}

impl ExprHandle for NumericExpr {
    fn from_id(id: ExprId) -> Self {
        NumericExpr(id)
    }
    fn id(self) -> ExprId {
        self.0
    }
}

impl ExprHandle for LogicalExpr {
    fn from_id(id: ExprId) -> Self {
        LogicalExpr(id)
    }
    fn id(self) -> ExprId {
        self.0
    }
}

impl ExprHandle for CountId {
    fn from_id(id: ExprId) -> Self {
        CountId(id)
    }
    fn id(self) -> ExprId {
        self.0
    }
}

impl ExprHandle for Variable {
    fn from_id(id: ExprId) -> Self {
        Variable(id)
    }
    fn id(self) -> ExprId {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// View of a numeric constant.
#[derive(Clone, Copy)]
pub struct NumericConstant<'a> {
    f: &'a ExprFactory,
    id: ExprId,
}

impl NumericConstant<'_> {
    /// The constant's value.
    #[must_use]
    pub fn value(&self) -> f64 {
        match self.f.node(self.id).data {
            ExprData::Number(v) => v,
            _ => unreachable!("numeric constant payload"),
        }
    }
}

/// View of a logical constant.
#[derive(Clone, Copy)]
pub struct LogicalConstant<'a> {
    f: &'a ExprFactory,
    id: ExprId,
}

impl LogicalConstant<'_> {
    /// The constant's value.
    #[must_use]
    pub fn value(&self) -> bool {
        match self.f.node(self.id).data {
            ExprData::Bool(v) => v,
            _ => unreachable!("logical constant payload"),
        }
    }
}

/// View of a variable or common-expression reference.
#[derive(Clone, Copy)]
pub struct Reference<'a> {
    f: &'a ExprFactory,
    id: ExprId,
}

impl Reference<'_> {
    /// `Variable` or `CommonExprRef`.
    #[must_use]
    pub fn kind(&self) -> ExprKind {
        self.f.node(self.id).kind
    }

    /// Zero-based index of the referenced variable or common expression.
    #[must_use]
    pub fn index(&self) -> i32 {
        match self.f.node(self.id).data {
            ExprData::Index(i) => i,
            _ => unreachable!("reference payload"),
        }
    }
}

/// View of a unary operation with argument type `A`.
#[derive(Clone, Copy)]
pub struct UnaryOp<'a, A> {
    f: &'a ExprFactory,
    id: ExprId,
    _arg: std::marker::PhantomData<A>,
}

/// Unary numeric expression.
pub type UnaryExpr<'a> = UnaryOp<'a, NumericExpr>;
/// Logical negation.
pub type NotExpr<'a> = UnaryOp<'a, LogicalExpr>;

impl<A: ExprHandle> UnaryOp<'_, A> {
    /// Kind of this operation.
    #[must_use]
    pub fn kind(&self) -> ExprKind {
        self.f.node(self.id).kind
    }

    /// The single argument.
    #[must_use]
    pub fn arg(&self) -> A {
        match self.f.node(self.id).data {
            ExprData::Unary(a) => A::from_id(a),
            _ => unreachable!("unary payload"),
        }
    }
}

/// View of a binary operation with operand type `A`.
#[derive(Clone, Copy)]
pub struct BinaryOp<'a, A> {
    f: &'a ExprFactory,
    id: ExprId,
    _arg: std::marker::PhantomData<A>,
}

/// Binary numeric expression.
pub type BinaryExpr<'a> = BinaryOp<'a, NumericExpr>;
/// Binary logical expression (`||`, `&&`, `<==>`).
pub type BinaryLogicalExpr<'a> = BinaryOp<'a, LogicalExpr>;
/// Relational expression over numeric operands.
pub type RelationalExpr<'a> = BinaryOp<'a, NumericExpr>;

impl<A: ExprHandle> BinaryOp<'_, A> {
    /// Kind of this operation.
    #[must_use]
    pub fn kind(&self) -> ExprKind {
        self.f.node(self.id).kind
    }

    /// Left operand.
    #[must_use]
    pub fn lhs(&self) -> A {
        match self.f.node(self.id).data {
            ExprData::Binary(l, _) => A::from_id(l),
            _ => unreachable!("binary payload"),
        }
    }

    /// Right operand.
    #[must_use]
    pub fn rhs(&self) -> A {
        match self.f.node(self.id).data {
            ExprData::Binary(_, r) => A::from_id(r),
            _ => unreachable!("binary payload"),
        }
    }
}

/// View of a conditional with branch type `A`.
#[derive(Clone, Copy)]
pub struct Conditional<'a, A> {
    f: &'a ExprFactory,
    id: ExprId,
    _arg: std::marker::PhantomData<A>,
}

/// Numeric if-then-else.
pub type IfExpr<'a> = Conditional<'a, NumericExpr>;
/// Implication, `a ==> b else c`.
pub type ImplicationExpr<'a> = Conditional<'a, LogicalExpr>;
/// Symbolic if-then-else whose branches may be strings.
pub type SymbolicIfExpr<'a> = Conditional<'a, Expr>;

impl<A: ExprHandle> Conditional<'_, A> {
    /// Kind of this conditional.
    #[must_use]
    pub fn kind(&self) -> ExprKind {
        self.f.node(self.id).kind
    }

    /// The condition.
    #[must_use]
    pub fn condition(&self) -> LogicalExpr {
        match self.f.node(self.id).data {
            ExprData::Ternary(c, _, _) => LogicalExpr(c),
            _ => unreachable!("conditional payload"),
        }
    }

    /// The then-branch.
    #[must_use]
    pub fn then_expr(&self) -> A {
        match self.f.node(self.id).data {
            ExprData::Ternary(_, t, _) => A::from_id(t),
            _ => unreachable!("conditional payload"),
        }
    }

    /// The else-branch.
    #[must_use]
    pub fn else_expr(&self) -> A {
        match self.f.node(self.id).data {
            ExprData::Ternary(_, _, e) => A::from_id(e),
            _ => unreachable!("conditional payload"),
        }
    }
}

/// View of an iterated expression with argument type `A`. For `numberof`,
/// argument 0 is the value being counted.
#[derive(Clone, Copy)]
pub struct Iterated<'a, A> {
    f: &'a ExprFactory,
    id: ExprId,
    _arg: std::marker::PhantomData<A>,
}

/// Functional `min` / `max`.
pub type VarArgExpr<'a> = Iterated<'a, NumericExpr>;
/// Iterated sum.
pub type SumExpr<'a> = Iterated<'a, NumericExpr>;
/// `numberof` expression.
pub type NumberOfExpr<'a> = Iterated<'a, NumericExpr>;
/// Symbolic `numberof` expression.
pub type NumberOfSymExpr<'a> = Iterated<'a, Expr>;
/// Iterated logical expression (`exists`, `forall`) and `count` arguments.
pub type IteratedLogicalExpr<'a> = Iterated<'a, LogicalExpr>;
/// Pairwise expression (`alldiff`, `!alldiff`).
pub type PairwiseExpr<'a> = Iterated<'a, NumericExpr>;

impl<'a, A: ExprHandle> Iterated<'a, A> {
    /// Kind of this expression.
    #[must_use]
    pub fn kind(&self) -> ExprKind {
        self.f.node(self.id).kind
    }

    fn raw_args(&self) -> &'a [ExprId] {
        match &self.f.node(self.id).data {
            ExprData::Args(args) => args,
            _ => unreachable!("iterated payload"),
        }
    }

    /// Number of arguments.
    #[must_use]
    pub fn num_args(&self) -> usize {
        self.raw_args().len()
    }

    /// The `i`-th argument.
    #[must_use]
    pub fn arg(&self, i: usize) -> A {
        A::from_id(self.raw_args()[i])
    }

    /// Iterate over the arguments in order.
    pub fn args(&self) -> impl Iterator<Item = A> + use<'a, A> {
        self.raw_args().iter().map(|&id| A::from_id(id))
    }
}

/// View of a piecewise-linear term.
#[derive(Clone, Copy)]
pub struct PlTermExpr<'a> {
    f: &'a ExprFactory,
    id: ExprId,
}

impl PlTermExpr<'_> {
    /// Number of breakpoints; there is one more slope.
    #[must_use]
    pub fn num_breakpoints(&self) -> usize {
        match &self.f.node(self.id).data {
            ExprData::PlTerm { breakpoints, .. } => breakpoints.len(),
            _ => unreachable!("piecewise-linear payload"),
        }
    }

    /// Number of slopes.
    #[must_use]
    pub fn num_slopes(&self) -> usize {
        self.num_breakpoints() + 1
    }

    /// The `i`-th breakpoint.
    #[must_use]
    pub fn breakpoint(&self, i: usize) -> f64 {
        match &self.f.node(self.id).data {
            ExprData::PlTerm { breakpoints, .. } => breakpoints[i],
            _ => unreachable!("piecewise-linear payload"),
        }
    }

    /// The `i`-th slope.
    #[must_use]
    pub fn slope(&self, i: usize) -> f64 {
        match &self.f.node(self.id).data {
            ExprData::PlTerm { slopes, .. } => slopes[i],
            _ => unreachable!("piecewise-linear payload"),
        }
    }

    /// Zero-based index of the variable the term is applied to.
    #[must_use]
    pub fn var_index(&self) -> i32 {
        match &self.f.node(self.id).data {
            ExprData::PlTerm { var, .. } => match self.f.node(*var).data {
                ExprData::Index(i) => i,
                _ => unreachable!("piecewise-linear variable payload"),
            },
            _ => unreachable!("piecewise-linear payload"),
        }
    }
}

/// View of a function call.
#[derive(Clone, Copy)]
pub struct CallExpr<'a> {
    f: &'a ExprFactory,
    id: ExprId,
}

impl<'a> CallExpr<'a> {
    /// The called function.
    #[must_use]
    pub fn function(&self) -> &'a Function {
        match &self.f.node(self.id).data {
            ExprData::Call { func, .. } => self.f.function(*func),
            _ => unreachable!("call payload"),
        }
    }

    fn raw_args(&self) -> &'a [ExprId] {
        match &self.f.node(self.id).data {
            ExprData::Call { args, .. } => args,
            _ => unreachable!("call payload"),
        }
    }

    /// Number of arguments.
    #[must_use]
    pub fn num_args(&self) -> usize {
        self.raw_args().len()
    }

    /// The `i`-th argument; may be numeric or a string literal.
    #[must_use]
    pub fn arg(&self, i: usize) -> Expr {
        Expr(self.raw_args()[i])
    }

    /// Iterate over the arguments in order.
    pub fn args(&self) -> impl Iterator<Item = Expr> + use<'a> {
        self.raw_args().iter().map(|&id| Expr(id))
    }
}

/// View of a logical count expression (`atleast` and friends).
#[derive(Clone, Copy)]
pub struct LogicalCountExpr<'a> {
    f: &'a ExprFactory,
    id: ExprId,
}

impl LogicalCountExpr<'_> {
    /// Kind of this expression.
    #[must_use]
    pub fn kind(&self) -> ExprKind {
        self.f.node(self.id).kind
    }

    /// The numeric left-hand side.
    #[must_use]
    pub fn lhs(&self) -> NumericExpr {
        match self.f.node(self.id).data {
            ExprData::Binary(l, _) => NumericExpr(l),
            _ => unreachable!("logical count payload"),
        }
    }

    /// The count expression on the right-hand side.
    #[must_use]
    pub fn count(&self) -> CountId {
        match self.f.node(self.id).data {
            ExprData::Binary(_, r) => CountId(r),
            _ => unreachable!("logical count payload"),
        }
    }
}

/// View of a string literal.
#[derive(Clone, Copy)]
pub struct StringLiteral<'a> {
    f: &'a ExprFactory,
    id: ExprId,
}

impl<'a> StringLiteral<'a> {
    /// The literal's bytes; may contain NUL and newline.
    #[must_use]
    pub fn value(&self) -> &'a [u8] {
        match &self.f.node(self.id).data {
            ExprData::Str(bytes) => bytes,
            _ => unreachable!("string payload"),
        }
    }
}

macro_rules! mk_view {
    ($ctor:ident, $ty:ident) => {
        fn $ctor(f: &ExprFactory, id: ExprId) -> $ty<'_> {
            $ty { f, id }
        }
    };
    ($ctor:ident, $ty:ident < $arg:ty >) => {
        fn $ctor(f: &ExprFactory, id: ExprId) -> $ty<'_, $arg> {
            $ty {
                f,
                id,
                _arg: std::marker::PhantomData,
            }
        }
    };
}

mk_view!(num_const, NumericConstant);
mk_view!(log_const, LogicalConstant);
mk_view!(reference, Reference);
mk_view!(unary, UnaryOp<NumericExpr>);
mk_view!(not_view, UnaryOp<LogicalExpr>);
mk_view!(binary, BinaryOp<NumericExpr>);
mk_view!(binary_logical, BinaryOp<LogicalExpr>);
mk_view!(if_view, Conditional<NumericExpr>);
mk_view!(implication, Conditional<LogicalExpr>);
mk_view!(sym_if, Conditional<Expr>);
mk_view!(iter_num, Iterated<NumericExpr>);
mk_view!(iter_log, Iterated<LogicalExpr>);
mk_view!(iter_sym, Iterated<Expr>);
mk_view!(pl_term, PlTermExpr);
mk_view!(call, CallExpr);
mk_view!(logical_count, LogicalCountExpr);
mk_view!(string_lit, StringLiteral);

// ---------------------------------------------------------------------------
// The visitor trait
// ---------------------------------------------------------------------------

/// Per-kind double dispatch with two result types, one for numeric and one
/// for logical expressions.
#[allow(unused_variables)]
pub trait ExprVisitor {
    /// Result of visiting a numeric expression.
    type NumericResult;
    /// Result of visiting a logical expression.
    type LogicalResult;

    /// Dispatch a numeric expression to the matching hook.
    fn visit_numeric(&mut self, f: &ExprFactory, e: NumericExpr) -> Result<Self::NumericResult>
    where
        Self: Sized,
    {
        dispatch_numeric(self, f, e)
    }

    /// Dispatch a logical expression to the matching hook.
    fn visit_logical(&mut self, f: &ExprFactory, e: LogicalExpr) -> Result<Self::LogicalResult>
    where
        Self: Sized,
    {
        dispatch_logical(self, f, e)
    }

    /// Fallback for numeric kinds the visitor does not handle.
    fn visit_unhandled_numeric(&mut self, kind: ExprKind) -> Result<Self::NumericResult> {
        Err(NlError::unsupported(kind.name()))
    }

    /// Fallback for logical kinds the visitor does not handle.
    fn visit_unhandled_logical(&mut self, kind: ExprKind) -> Result<Self::LogicalResult> {
        Err(NlError::unsupported(kind.name()))
    }

    // -- numeric leaves ----------------------------------------------------

    /// A numeric constant.
    fn visit_numeric_constant(&mut self, e: NumericConstant<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(ExprKind::Number)
    }

    /// A variable reference.
    fn visit_variable(&mut self, e: Reference<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(ExprKind::Variable)
    }

    /// A common-expression reference.
    fn visit_common_expr_ref(&mut self, e: Reference<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(ExprKind::CommonExprRef)
    }

    // -- unary numeric -----------------------------------------------------

    /// Class fallback for unary numeric kinds.
    fn visit_unary(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(e.kind())
    }

    /// Unary minus.
    fn visit_minus(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `abs`.
    fn visit_abs(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `floor`.
    fn visit_floor(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `ceil`.
    fn visit_ceil(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `sqrt`.
    fn visit_sqrt(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `x^2`.
    fn visit_pow2(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `exp`.
    fn visit_exp(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `log`.
    fn visit_log(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `log10`.
    fn visit_log10(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `sin`.
    fn visit_sin(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `sinh`.
    fn visit_sinh(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `cos`.
    fn visit_cos(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `cosh`.
    fn visit_cosh(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `tan`.
    fn visit_tan(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `tanh`.
    fn visit_tanh(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `asin`.
    fn visit_asin(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `asinh`.
    fn visit_asinh(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `acos`.
    fn visit_acos(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `acosh`.
    fn visit_acosh(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `atan`.
    fn visit_atan(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    /// `atanh`.
    fn visit_atanh(&mut self, e: UnaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unary(e)
    }

    // -- binary numeric ----------------------------------------------------

    /// Class fallback for binary numeric kinds.
    fn visit_binary(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(e.kind())
    }

    /// Addition.
    fn visit_add(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// Subtraction.
    fn visit_sub(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// Positive difference, `less`.
    fn visit_less(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// Multiplication.
    fn visit_mul(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// Division.
    fn visit_div(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// Truncated division.
    fn visit_int_div(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// Modulo.
    fn visit_mod(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// Exponentiation.
    fn visit_pow(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// Exponentiation with a constant base.
    fn visit_pow_const_base(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// Exponentiation with a constant exponent.
    fn visit_pow_const_exp(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// `atan2`.
    fn visit_atan2(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// `precision`.
    fn visit_precision(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// `round`.
    fn visit_round(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    /// `trunc`.
    fn visit_trunc(&mut self, e: BinaryExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_binary(e)
    }

    // -- composite numeric -------------------------------------------------

    /// If-then-else.
    fn visit_if(&mut self, e: IfExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(ExprKind::If)
    }

    /// Piecewise-linear term.
    fn visit_pl_term(&mut self, e: PlTermExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(ExprKind::PlTerm)
    }

    /// Function call.
    fn visit_call(&mut self, e: CallExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(ExprKind::Call)
    }

    /// Class fallback for functional `min` / `max`.
    fn visit_vararg(&mut self, e: VarArgExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(e.kind())
    }

    /// Iterated minimum.
    fn visit_min(&mut self, e: VarArgExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_vararg(e)
    }

    /// Iterated maximum.
    fn visit_max(&mut self, e: VarArgExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_vararg(e)
    }

    /// Iterated sum.
    fn visit_sum(&mut self, e: SumExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(ExprKind::Sum)
    }

    /// `numberof`; argument 0 is the value being counted.
    fn visit_number_of(&mut self, e: NumberOfExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(ExprKind::NumberOf)
    }

    /// Symbolic `numberof`.
    fn visit_number_of_sym(&mut self, e: NumberOfSymExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(ExprKind::NumberOfSym)
    }

    /// `count` over logical arguments.
    fn visit_count(&mut self, e: IteratedLogicalExpr<'_>) -> Result<Self::NumericResult> {
        self.visit_unhandled_numeric(ExprKind::Count)
    }

    // -- logical -----------------------------------------------------------

    /// A logical constant.
    fn visit_logical_constant(&mut self, e: LogicalConstant<'_>) -> Result<Self::LogicalResult> {
        self.visit_unhandled_logical(ExprKind::Bool)
    }

    /// Logical negation.
    fn visit_not(&mut self, e: NotExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_unhandled_logical(ExprKind::Not)
    }

    /// Class fallback for binary logical kinds.
    fn visit_binary_logical(&mut self, e: BinaryLogicalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_unhandled_logical(e.kind())
    }

    /// Disjunction.
    fn visit_or(&mut self, e: BinaryLogicalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_binary_logical(e)
    }

    /// Conjunction.
    fn visit_and(&mut self, e: BinaryLogicalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_binary_logical(e)
    }

    /// Equivalence.
    fn visit_iff(&mut self, e: BinaryLogicalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_binary_logical(e)
    }

    /// Class fallback for relational kinds.
    fn visit_relational(&mut self, e: RelationalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_unhandled_logical(e.kind())
    }

    /// `<`.
    fn visit_lt(&mut self, e: RelationalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_relational(e)
    }

    /// `<=`.
    fn visit_le(&mut self, e: RelationalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_relational(e)
    }

    /// `=`.
    fn visit_eq(&mut self, e: RelationalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_relational(e)
    }

    /// `>=`.
    fn visit_ge(&mut self, e: RelationalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_relational(e)
    }

    /// `>`.
    fn visit_gt(&mut self, e: RelationalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_relational(e)
    }

    /// `!=`.
    fn visit_ne(&mut self, e: RelationalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_relational(e)
    }

    /// Class fallback for logical count kinds.
    fn visit_logical_count(&mut self, e: LogicalCountExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_unhandled_logical(e.kind())
    }

    /// `atleast`.
    fn visit_atleast(&mut self, e: LogicalCountExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_logical_count(e)
    }

    /// `atmost`.
    fn visit_atmost(&mut self, e: LogicalCountExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_logical_count(e)
    }

    /// `exactly`.
    fn visit_exactly(&mut self, e: LogicalCountExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_logical_count(e)
    }

    /// `!atleast`.
    fn visit_not_atleast(&mut self, e: LogicalCountExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_logical_count(e)
    }

    /// `!atmost`.
    fn visit_not_atmost(&mut self, e: LogicalCountExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_logical_count(e)
    }

    /// `!exactly`.
    fn visit_not_exactly(&mut self, e: LogicalCountExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_logical_count(e)
    }

    /// Implication.
    fn visit_implication(&mut self, e: ImplicationExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_unhandled_logical(ExprKind::Implication)
    }

    /// Class fallback for iterated logical kinds.
    fn visit_iterated_logical(&mut self, e: IteratedLogicalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_unhandled_logical(e.kind())
    }

    /// `exists`.
    fn visit_exists(&mut self, e: IteratedLogicalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_iterated_logical(e)
    }

    /// `forall`.
    fn visit_forall(&mut self, e: IteratedLogicalExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_iterated_logical(e)
    }

    /// Class fallback for pairwise kinds.
    fn visit_pairwise(&mut self, e: PairwiseExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_unhandled_logical(e.kind())
    }

    /// `alldiff`.
    fn visit_alldiff(&mut self, e: PairwiseExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_pairwise(e)
    }

    /// `!alldiff`.
    fn visit_not_alldiff(&mut self, e: PairwiseExpr<'_>) -> Result<Self::LogicalResult> {
        self.visit_pairwise(e)
    }
}

/// Route a numeric expression to the hook matching its kind.
pub fn dispatch_numeric<V>(v: &mut V, f: &ExprFactory, e: NumericExpr) -> Result<V::NumericResult>
where
    V: ExprVisitor + ?Sized,
{
    use crate::expr::kind::ExprKind as K;
    let id = e.0;
    match f.node(id).kind {
        K::Number => v.visit_numeric_constant(num_const(f, id)),
        K::Variable => v.visit_variable(reference(f, id)),
        K::CommonExprRef => v.visit_common_expr_ref(reference(f, id)),
        K::Minus => v.visit_minus(unary(f, id)),
        K::Abs => v.visit_abs(unary(f, id)),
        K::Floor => v.visit_floor(unary(f, id)),
        K::Ceil => v.visit_ceil(unary(f, id)),
        K::Sqrt => v.visit_sqrt(unary(f, id)),
        K::Pow2 => v.visit_pow2(unary(f, id)),
        K::Exp => v.visit_exp(unary(f, id)),
        K::Log => v.visit_log(unary(f, id)),
        K::Log10 => v.visit_log10(unary(f, id)),
        K::Sin => v.visit_sin(unary(f, id)),
        K::Sinh => v.visit_sinh(unary(f, id)),
        K::Cos => v.visit_cos(unary(f, id)),
        K::Cosh => v.visit_cosh(unary(f, id)),
        K::Tan => v.visit_tan(unary(f, id)),
        K::Tanh => v.visit_tanh(unary(f, id)),
        K::Asin => v.visit_asin(unary(f, id)),
        K::Asinh => v.visit_asinh(unary(f, id)),
        K::Acos => v.visit_acos(unary(f, id)),
        K::Acosh => v.visit_acosh(unary(f, id)),
        K::Atan => v.visit_atan(unary(f, id)),
        K::Atanh => v.visit_atanh(unary(f, id)),
        K::Add => v.visit_add(binary(f, id)),
        K::Sub => v.visit_sub(binary(f, id)),
        K::Less => v.visit_less(binary(f, id)),
        K::Mul => v.visit_mul(binary(f, id)),
        K::Div => v.visit_div(binary(f, id)),
        K::IntDiv => v.visit_int_div(binary(f, id)),
        K::Mod => v.visit_mod(binary(f, id)),
        K::Pow => v.visit_pow(binary(f, id)),
        K::PowConstBase => v.visit_pow_const_base(binary(f, id)),
        K::PowConstExp => v.visit_pow_const_exp(binary(f, id)),
        K::Atan2 => v.visit_atan2(binary(f, id)),
        K::Precision => v.visit_precision(binary(f, id)),
        K::Round => v.visit_round(binary(f, id)),
        K::Trunc => v.visit_trunc(binary(f, id)),
        K::If => v.visit_if(if_view(f, id)),
        K::PlTerm => v.visit_pl_term(pl_term(f, id)),
        K::Call => v.visit_call(call(f, id)),
        K::Min => v.visit_min(iter_num(f, id)),
        K::Max => v.visit_max(iter_num(f, id)),
        K::Sum => v.visit_sum(iter_num(f, id)),
        K::NumberOf => v.visit_number_of(iter_num(f, id)),
        K::NumberOfSym => v.visit_number_of_sym(iter_sym(f, id)),
        K::Count => v.visit_count(iter_log(f, id)),
        kind => panic!("not a numeric expression: {kind:?}"),
    }
}

/// Route a logical expression to the hook matching its kind.
pub fn dispatch_logical<V>(v: &mut V, f: &ExprFactory, e: LogicalExpr) -> Result<V::LogicalResult>
where
    V: ExprVisitor + ?Sized,
{
    use crate::expr::kind::ExprKind as K;
    let id = e.0;
    match f.node(id).kind {
        K::Bool => v.visit_logical_constant(log_const(f, id)),
        K::Not => v.visit_not(not_view(f, id)),
        K::Or => v.visit_or(binary_logical(f, id)),
        K::And => v.visit_and(binary_logical(f, id)),
        K::Iff => v.visit_iff(binary_logical(f, id)),
        K::Lt => v.visit_lt(binary(f, id)),
        K::Le => v.visit_le(binary(f, id)),
        K::Eq => v.visit_eq(binary(f, id)),
        K::Ge => v.visit_ge(binary(f, id)),
        K::Gt => v.visit_gt(binary(f, id)),
        K::Ne => v.visit_ne(binary(f, id)),
        K::AtLeast => v.visit_atleast(logical_count(f, id)),
        K::AtMost => v.visit_atmost(logical_count(f, id)),
        K::Exactly => v.visit_exactly(logical_count(f, id)),
        K::NotAtLeast => v.visit_not_atleast(logical_count(f, id)),
        K::NotAtMost => v.visit_not_atmost(logical_count(f, id)),
        K::NotExactly => v.visit_not_exactly(logical_count(f, id)),
        K::Implication => v.visit_implication(implication(f, id)),
        K::Exists => v.visit_exists(iter_log(f, id)),
        K::ForAll => v.visit_forall(iter_log(f, id)),
        K::AllDiff => v.visit_alldiff(iter_num(f, id)),
        K::NotAllDiff => v.visit_not_alldiff(iter_num(f, id)),
        kind => panic!("not a logical expression: {kind:?}"),
    }
}

/// Decompose a generic expression into its numeric, logical or string face.
pub enum ExprFace<'a> {
    /// A numeric expression.
    Numeric(NumericExpr),
    /// A logical expression.
    Logical(LogicalExpr),
    /// A string literal.
    String(StringLiteral<'a>),
    /// A symbolic if-then-else.
    SymbolicIf(SymbolicIfExpr<'a>),
}

/// Classify a generic expression handle.
#[must_use]
pub fn classify(f: &ExprFactory, e: Expr) -> ExprFace<'_> {
    let kind = f.node(e.0).kind;
    if kind.is_numeric() {
        ExprFace::Numeric(NumericExpr(e.0))
    } else if kind.is_logical() {
        ExprFace::Logical(LogicalExpr(e.0))
    } else if kind == ExprKind::String {
        ExprFace::String(string_lit(f, e.0))
    } else {
        ExprFace::SymbolicIf(sym_if(f, e.0))
    }
}
