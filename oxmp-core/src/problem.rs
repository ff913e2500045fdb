//! Concrete problem representation built from reader events.
//!
//! [`Problem`] owns the expression factory and the model data: variables
//! with bounds and types, objectives, algebraic and logical constraints,
//! common expressions, complementarity conditions, initial values, column
//! sizes and suffixes. It is the full-featured [`ProblemBuilder`]; visitor
//! consumers walk its expressions through [`Problem::factory`].

use crate::builder::{
    ArgBuilder, ColumnSizeReceiver, LinearExprBuilder, PlArgBuilder, ProblemBuilder,
    SuffixValueReceiver,
};
use crate::common::{FuncType, ObjSense, VarType, suf};
use crate::error::{NlError, Result};
use crate::expr::factory::FuncId;
use crate::expr::{
    CountExpr, Expr, ExprFactory, ExprKind, IteratedExprBuilder, LogicalArgsBuilder, LogicalExpr,
    NumericExpr, PlTermExprBuilder, SymbolicArgsBuilder, Variable,
};
use crate::header::NlHeader;
use crate::suffix::SuffixManager;

/// A decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo {
    /// Lower bound, possibly `-inf`.
    pub lb: f64,
    /// Upper bound, possibly `+inf`.
    pub ub: f64,
    /// Continuous or integer.
    pub ty: VarType,
    /// Primal initial value, if one was given.
    pub initial: Option<f64>,
}

impl Default for VarInfo {
    fn default() -> Self {
        VarInfo {
            lb: f64::NEG_INFINITY,
            ub: f64::INFINITY,
            ty: VarType::Continuous,
            initial: None,
        }
    }
}

/// An objective: sense, linear gradient and optional nonlinear part.
#[derive(Debug, Clone, Default)]
pub struct Objective {
    /// Min or max.
    pub sense: ObjSense,
    /// Sparse linear terms `(var, coef)`.
    pub linear: Vec<(i32, f64)>,
    /// Nonlinear part, absent for linear objectives.
    pub nonlinear: Option<NumericExpr>,
}

/// An algebraic constraint row.
#[derive(Debug, Clone)]
pub struct AlgebraicCon {
    /// Sparse linear terms `(var, coef)`.
    pub linear: Vec<(i32, f64)>,
    /// Nonlinear part, absent for linear rows.
    pub nonlinear: Option<NumericExpr>,
    /// Lower bound, possibly `-inf`.
    pub lb: f64,
    /// Upper bound, possibly `+inf`.
    pub ub: f64,
    /// Dual initial value, if one was given.
    pub dual_initial: Option<f64>,
}

impl Default for AlgebraicCon {
    fn default() -> Self {
        AlgebraicCon {
            linear: Vec::new(),
            nonlinear: None,
            lb: f64::NEG_INFINITY,
            ub: f64::INFINITY,
            dual_initial: None,
        }
    }
}

/// A common (defined) subexpression.
#[derive(Debug, Clone, Default)]
pub struct CommonExpr {
    /// Sparse linear terms `(var, coef)`.
    pub linear: Vec<(i32, f64)>,
    /// Nonlinear part.
    pub nonlinear: Option<NumericExpr>,
    /// Placement hint from the writer.
    pub position: i32,
}

/// A complementarity condition between a constraint and a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Complement {
    /// Algebraic constraint index.
    pub con_index: i32,
    /// Variable index.
    pub var_index: i32,
    /// Two-bit mask of [`crate::common::comp`] flags.
    pub flags: i32,
}

/// In-memory problem, the reader's full-featured sink.
#[derive(Debug, Default)]
pub struct Problem {
    stub: String,
    header: NlHeader,
    factory: ExprFactory,
    vars: Vec<VarInfo>,
    objs: Vec<Objective>,
    algebraic_cons: Vec<AlgebraicCon>,
    logical_cons: Vec<Option<LogicalExpr>>,
    common_exprs: Vec<CommonExpr>,
    complements: Vec<Complement>,
    funcs: Vec<Option<FuncId>>,
    col_sizes: Vec<i32>,
    suffixes: SuffixManager,
}

/// Integer sub-ranges of the .nl variable ordering: nonlinear blocks carry
/// their integer variables at the block end, linear binary and integer
/// variables sit at the very end of the variable list.
fn integer_ranges(h: &NlHeader) -> [(i32, i32); 5] {
    let nlvb = h.num_nl_vars_in_both.max(0);
    let nlvc = h.num_nl_vars_in_cons.max(0);
    let nlvo = h.num_nl_vars_in_objs.max(0);
    let objs_only = (nlvo - nlvb).max(0);
    let nl_end = nlvc + objs_only;
    let n = h.num_vars;
    let nbv = h.num_linear_binary_vars;
    let niv = h.num_linear_integer_vars;
    [
        (nlvb - h.num_nl_integer_vars_in_both, nlvb),
        (nlvc - h.num_nl_integer_vars_in_cons, nlvc),
        (nl_end - h.num_nl_integer_vars_in_objs, nl_end),
        (n - niv - nbv, n - niv),
        (n - niv, n),
    ]
}

fn var_type_from_header(h: &NlHeader, index: i32) -> VarType {
    for (lo, hi) in integer_ranges(h) {
        if lo <= index && index < hi {
            return VarType::Integer;
        }
    }
    VarType::Continuous
}

impl Problem {
    /// Create an empty problem; dimensions are set by
    /// [`ProblemBuilder::begin_build`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The path stub this problem was read from.
    #[must_use]
    pub fn stub(&self) -> &str {
        &self.stub
    }

    /// The parsed header.
    #[must_use]
    pub fn header(&self) -> &NlHeader {
        &self.header
    }

    /// The expression arena.
    #[must_use]
    pub fn factory(&self) -> &ExprFactory {
        &self.factory
    }

    /// Number of variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Access a variable.
    #[must_use]
    pub fn var(&self, index: usize) -> &VarInfo {
        &self.vars[index]
    }

    /// Number of objectives.
    #[must_use]
    pub fn num_objs(&self) -> usize {
        self.objs.len()
    }

    /// Access an objective.
    #[must_use]
    pub fn obj(&self, index: usize) -> &Objective {
        &self.objs[index]
    }

    /// Number of algebraic constraints.
    #[must_use]
    pub fn num_algebraic_cons(&self) -> usize {
        self.algebraic_cons.len()
    }

    /// Access an algebraic constraint.
    #[must_use]
    pub fn algebraic_con(&self, index: usize) -> &AlgebraicCon {
        &self.algebraic_cons[index]
    }

    /// Number of logical constraints.
    #[must_use]
    pub fn num_logical_cons(&self) -> usize {
        self.logical_cons.len()
    }

    /// Access a logical constraint; `None` if the body never set it.
    #[must_use]
    pub fn logical_con(&self, index: usize) -> Option<LogicalExpr> {
        self.logical_cons[index]
    }

    /// Number of common expressions.
    #[must_use]
    pub fn num_common_exprs(&self) -> usize {
        self.common_exprs.len()
    }

    /// Access a common expression.
    #[must_use]
    pub fn common_expr(&self, index: usize) -> &CommonExpr {
        &self.common_exprs[index]
    }

    /// The complementarity conditions in input order.
    #[must_use]
    pub fn complements(&self) -> &[Complement] {
        &self.complements
    }

    /// Jacobian column sizes, if a `k`/`K` segment was present.
    #[must_use]
    pub fn jacobian_column_sizes(&self) -> &[i32] {
        &self.col_sizes
    }

    /// The suffix store.
    #[must_use]
    pub fn suffixes(&self) -> &SuffixManager {
        &self.suffixes
    }

    fn is_zero_constant(&self, e: NumericExpr) -> bool {
        self.factory.numeric_constant_value(e) == Some(0.0)
    }
}

// The factory's scoped builders double as the builder-interface argument
// accumulators.

impl ArgBuilder<NumericExpr> for IteratedExprBuilder {
    fn add_arg(&mut self, arg: NumericExpr) {
        IteratedExprBuilder::add_arg(self, arg);
    }
}

impl ArgBuilder<LogicalExpr> for LogicalArgsBuilder {
    fn add_arg(&mut self, arg: LogicalExpr) {
        LogicalArgsBuilder::add_arg(self, arg);
    }
}

impl ArgBuilder<Expr> for SymbolicArgsBuilder {
    fn add_arg(&mut self, arg: Expr) {
        SymbolicArgsBuilder::add_arg(self, arg);
    }
}

impl ArgBuilder<Expr> for crate::expr::CallExprBuilder {
    fn add_arg(&mut self, arg: Expr) {
        crate::expr::CallExprBuilder::add_arg(self, arg);
    }
}

impl PlArgBuilder for PlTermExprBuilder {
    fn add_slope(&mut self, slope: f64) {
        PlTermExprBuilder::add_slope(self, slope);
    }

    fn add_breakpoint(&mut self, breakpoint: f64) {
        PlTermExprBuilder::add_breakpoint(self, breakpoint);
    }
}

/// Borrowed handler appending into a term vector.
#[derive(Debug)]
pub struct LinearTerms<'a> {
    terms: &'a mut Vec<(i32, f64)>,
}

impl LinearExprBuilder for LinearTerms<'_> {
    fn add_term(&mut self, var_index: i32, coef: f64) {
        self.terms.push((var_index, coef));
    }
}

/// Borrowed handler appending column sizes.
#[derive(Debug)]
pub struct ColumnSizes<'a> {
    sizes: &'a mut Vec<i32>,
}

impl ColumnSizeReceiver for ColumnSizes<'_> {
    fn add(&mut self, size: i32) {
        self.sizes.push(size);
    }
}

/// Borrowed handler writing one suffix's values.
#[derive(Debug)]
pub struct SuffixValuesWriter<'a> {
    suffix: &'a mut crate::suffix::Suffix,
}

impl SuffixValueReceiver for SuffixValuesWriter<'_> {
    fn set_int_value(&mut self, index: i32, value: i64) {
        self.suffix.set_int_value(index as usize, value);
    }

    fn set_float_value(&mut self, index: i32, value: f64) {
        self.suffix.set_float_value(index as usize, value);
    }
}

impl ProblemBuilder for Problem {
    type Expr = Expr;
    type NumericExpr = NumericExpr;
    type LogicalExpr = LogicalExpr;
    type CountExpr = CountExpr;
    type Variable = Variable;

    type NumericArgBuilder = IteratedExprBuilder;
    type LogicalArgBuilder = LogicalArgsBuilder;
    type SymbolicArgBuilder = SymbolicArgsBuilder;
    type CallArgBuilder = crate::expr::CallExprBuilder;
    type PlTermBuilder = PlTermExprBuilder;

    type LinearPartBuilder<'a> = LinearTerms<'a>;
    type ColumnSizeHandler<'a> = ColumnSizes<'a>;
    type SuffixHandler<'a> = SuffixValuesWriter<'a>;

    fn begin_build(&mut self, stub: &str, header: &NlHeader, _flags: i32) -> Result<()> {
        self.stub = stub.to_string();
        self.header = header.clone();
        self.vars = (0..header.num_vars)
            .map(|j| VarInfo {
                ty: var_type_from_header(header, j),
                ..VarInfo::default()
            })
            .collect();
        self.objs = vec![Objective::default(); header.num_objs.max(0) as usize];
        self.algebraic_cons =
            vec![AlgebraicCon::default(); header.num_algebraic_cons.max(0) as usize];
        self.logical_cons = vec![None; header.num_logical_cons.max(0) as usize];
        self.common_exprs = vec![CommonExpr::default(); header.num_common_exprs().max(0) as usize];
        self.funcs = vec![None; header.num_funcs.max(0) as usize];
        Ok(())
    }

    fn set_obj(&mut self, index: i32, sense: ObjSense, expr: NumericExpr) -> Result<()> {
        let is_zero = self.is_zero_constant(expr);
        let obj = &mut self.objs[index as usize];
        obj.sense = sense;
        obj.nonlinear = if is_zero { None } else { Some(expr) };
        Ok(())
    }

    fn set_con(&mut self, index: i32, expr: NumericExpr) -> Result<()> {
        let is_zero = self.is_zero_constant(expr);
        self.algebraic_cons[index as usize].nonlinear =
            if is_zero { None } else { Some(expr) };
        Ok(())
    }

    fn set_logical_con(&mut self, index: i32, expr: LogicalExpr) -> Result<()> {
        self.logical_cons[index as usize] = Some(expr);
        Ok(())
    }

    fn set_common_expr(&mut self, index: i32, expr: NumericExpr, position: i32) -> Result<()> {
        let is_zero = self.is_zero_constant(expr);
        let ce = &mut self.common_exprs[index as usize];
        ce.nonlinear = if is_zero { None } else { Some(expr) };
        ce.position = position;
        Ok(())
    }

    fn set_complement(&mut self, con_index: i32, var_index: i32, flags: i32) -> Result<()> {
        self.complements.push(Complement {
            con_index,
            var_index,
            flags,
        });
        Ok(())
    }

    fn linear_obj_builder(&mut self, obj_index: i32, num_terms: i32) -> Result<LinearTerms<'_>> {
        let terms = &mut self.objs[obj_index as usize].linear;
        terms.reserve(num_terms.max(0) as usize);
        Ok(LinearTerms { terms })
    }

    fn linear_con_builder(&mut self, con_index: i32, num_terms: i32) -> Result<LinearTerms<'_>> {
        let terms = &mut self.algebraic_cons[con_index as usize].linear;
        terms.reserve(num_terms.max(0) as usize);
        Ok(LinearTerms { terms })
    }

    fn linear_var_builder(&mut self, var_index: i32, num_terms: i32) -> Result<LinearTerms<'_>> {
        let index = var_index - self.header.num_vars;
        let terms = &mut self.common_exprs[index as usize].linear;
        terms.reserve(num_terms.max(0) as usize);
        Ok(LinearTerms { terms })
    }

    fn set_var_bounds(&mut self, index: i32, lb: f64, ub: f64) -> Result<()> {
        let var = &mut self.vars[index as usize];
        var.lb = lb;
        var.ub = ub;
        Ok(())
    }

    fn set_con_bounds(&mut self, index: i32, lb: f64, ub: f64) -> Result<()> {
        let con = &mut self.algebraic_cons[index as usize];
        con.lb = lb;
        con.ub = ub;
        Ok(())
    }

    fn set_initial_value(&mut self, var_index: i32, value: f64) -> Result<()> {
        self.vars[var_index as usize].initial = Some(value);
        Ok(())
    }

    fn set_initial_dual_value(&mut self, con_index: i32, value: f64) -> Result<()> {
        self.algebraic_cons[con_index as usize].dual_initial = Some(value);
        Ok(())
    }

    fn column_sizes(&mut self) -> Result<ColumnSizes<'_>> {
        self.col_sizes.clear();
        Ok(ColumnSizes {
            sizes: &mut self.col_sizes,
        })
    }

    fn set_function(&mut self, index: i32, name: &str, num_args: i32, ty: FuncType) -> Result<()> {
        let id = self.factory.add_function(name, num_args, ty);
        self.funcs[index as usize] = Some(id);
        Ok(())
    }

    fn add_suffix(
        &mut self,
        kind: i32,
        _num_values: i32,
        name: &str,
    ) -> Result<SuffixValuesWriter<'_>> {
        let num_items = match kind & suf::MASK {
            suf::VAR => self.vars.len(),
            suf::CON => self.algebraic_cons.len() + self.logical_cons.len(),
            suf::OBJ => self.objs.len(),
            _ => 1,
        };
        let suffix = self.suffixes.get_mut(kind).add(name, kind, num_items);
        Ok(SuffixValuesWriter { suffix })
    }

    fn make_numeric_constant(&mut self, value: f64) -> Result<NumericExpr> {
        Ok(self.factory.make_numeric_constant(value))
    }

    fn make_variable(&mut self, index: i32) -> Result<Variable> {
        Ok(self.factory.make_variable(index))
    }

    fn make_common_expr_ref(&mut self, index: i32) -> Result<NumericExpr> {
        Ok(self.factory.make_common_expr_ref(index))
    }

    fn make_unary(&mut self, kind: ExprKind, arg: NumericExpr) -> Result<NumericExpr> {
        Ok(self.factory.make_unary(kind, arg))
    }

    fn make_binary(
        &mut self,
        kind: ExprKind,
        lhs: NumericExpr,
        rhs: NumericExpr,
    ) -> Result<NumericExpr> {
        Ok(self.factory.make_binary(kind, lhs, rhs))
    }

    fn make_if(
        &mut self,
        condition: LogicalExpr,
        then_expr: NumericExpr,
        else_expr: NumericExpr,
    ) -> Result<NumericExpr> {
        Ok(self.factory.make_if(condition, then_expr, else_expr))
    }

    fn begin_pl_term(&mut self, num_breakpoints: i32) -> Result<PlTermExprBuilder> {
        Ok(self.factory.begin_pl_term(num_breakpoints.max(0) as usize))
    }

    fn end_pl_term(&mut self, builder: PlTermExprBuilder, var: Variable) -> Result<NumericExpr> {
        Ok(self.factory.end_pl_term(builder, var))
    }

    fn begin_call(&mut self, func_index: i32, num_args: i32) -> Result<crate::expr::CallExprBuilder> {
        let Some(func) = self.funcs.get(func_index as usize).copied().flatten() else {
            return Err(NlError::unsupported(format!(
                "call to undeclared function {func_index}"
            )));
        };
        Ok(self.factory.begin_call(func, num_args.max(0) as usize))
    }

    fn end_call(&mut self, builder: crate::expr::CallExprBuilder) -> Result<NumericExpr> {
        Ok(self.factory.end_call(builder))
    }

    fn begin_iterated(&mut self, kind: ExprKind, num_args: i32) -> Result<IteratedExprBuilder> {
        Ok(self.factory.begin_iterated(kind, num_args.max(0) as usize))
    }

    fn end_iterated(&mut self, builder: IteratedExprBuilder) -> Result<NumericExpr> {
        Ok(self.factory.end_iterated(builder))
    }

    fn begin_count(&mut self, num_args: i32) -> Result<LogicalArgsBuilder> {
        Ok(self.factory.begin_count(num_args.max(0) as usize))
    }

    fn end_count(&mut self, builder: LogicalArgsBuilder) -> Result<CountExpr> {
        Ok(self.factory.end_count(builder))
    }

    fn begin_number_of(&mut self, num_args: i32, value: NumericExpr) -> Result<IteratedExprBuilder> {
        Ok(self.factory.begin_number_of(num_args.max(0) as usize, value))
    }

    fn end_number_of(&mut self, builder: IteratedExprBuilder) -> Result<NumericExpr> {
        Ok(self.factory.end_number_of(builder))
    }

    fn begin_number_of_sym(&mut self, num_args: i32, value: Expr) -> Result<SymbolicArgsBuilder> {
        Ok(self
            .factory
            .begin_number_of_sym(num_args.max(0) as usize, value))
    }

    fn end_number_of_sym(&mut self, builder: SymbolicArgsBuilder) -> Result<NumericExpr> {
        Ok(self.factory.end_number_of_sym(builder))
    }

    fn make_logical_constant(&mut self, value: bool) -> Result<LogicalExpr> {
        Ok(self.factory.make_logical_constant(value))
    }

    fn make_not(&mut self, arg: LogicalExpr) -> Result<LogicalExpr> {
        Ok(self.factory.make_not(arg))
    }

    fn make_binary_logical(
        &mut self,
        kind: ExprKind,
        lhs: LogicalExpr,
        rhs: LogicalExpr,
    ) -> Result<LogicalExpr> {
        Ok(self.factory.make_binary_logical(kind, lhs, rhs))
    }

    fn make_relational(
        &mut self,
        kind: ExprKind,
        lhs: NumericExpr,
        rhs: NumericExpr,
    ) -> Result<LogicalExpr> {
        Ok(self.factory.make_relational(kind, lhs, rhs))
    }

    fn make_logical_count(
        &mut self,
        kind: ExprKind,
        lhs: NumericExpr,
        count: CountExpr,
    ) -> Result<LogicalExpr> {
        Ok(self.factory.make_logical_count(kind, lhs, count))
    }

    fn make_implication(
        &mut self,
        condition: LogicalExpr,
        then_expr: LogicalExpr,
        else_expr: LogicalExpr,
    ) -> Result<LogicalExpr> {
        Ok(self.factory.make_implication(condition, then_expr, else_expr))
    }

    fn begin_iterated_logical(
        &mut self,
        kind: ExprKind,
        num_args: i32,
    ) -> Result<LogicalArgsBuilder> {
        Ok(self
            .factory
            .begin_iterated_logical(kind, num_args.max(0) as usize))
    }

    fn end_iterated_logical(&mut self, builder: LogicalArgsBuilder) -> Result<LogicalExpr> {
        Ok(self.factory.end_iterated_logical(builder))
    }

    fn begin_pairwise(&mut self, kind: ExprKind, num_args: i32) -> Result<IteratedExprBuilder> {
        Ok(self.factory.begin_pairwise(kind, num_args.max(0) as usize))
    }

    fn end_pairwise(&mut self, builder: IteratedExprBuilder) -> Result<LogicalExpr> {
        Ok(self.factory.end_pairwise(builder))
    }

    fn make_string_literal(&mut self, value: &[u8]) -> Result<Expr> {
        Ok(self.factory.make_string_literal(value))
    }

    fn make_symbolic_if(
        &mut self,
        condition: LogicalExpr,
        then_expr: Expr,
        else_expr: Expr,
    ) -> Result<Expr> {
        Ok(self.factory.make_symbolic_if(condition, then_expr, else_expr))
    }
}
