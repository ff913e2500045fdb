//! The flattening converter.
//!
//! [`FlatConverter`] is a [`ProblemBuilder`], so the .nl reader can feed it
//! directly; the events accumulate in an internal [`Problem`]. A call to
//! [`FlatConverter::convert`] then lowers the tree model into a
//! [`FlatModel`]: affine pieces fold into [`EExpr`]s, every composite
//! subexpression becomes a fresh result variable plus a named custom
//! constraint, and a breadth-first loop rewrites custom constraints the
//! backend does not recommend until a fixed point is reached.

use oxmp_core::builder::ProblemBuilder;
use oxmp_core::common::{FuncType, ObjSense, VarType};
use oxmp_core::error::{NlError, Result};
use oxmp_core::expr::visitor::{
    self, BinaryExpr, ExprVisitor, NumericConstant, Reference, UnaryExpr, VarArgExpr,
};
use oxmp_core::expr::{
    CountExpr, Expr, ExprFactory, ExprKind, IteratedExprBuilder, LogicalArgsBuilder, LogicalExpr,
    NumericExpr, PlTermExprBuilder, SymbolicArgsBuilder, Variable,
};
use oxmp_core::header::NlHeader;
use oxmp_core::problem::{ColumnSizes, LinearTerms, Problem, SuffixValuesWriter};
use tracing::{debug, trace};

use crate::backend::{Acceptance, Backend};
use crate::constraint::{CustomCon, LinearDefCon, VarArrayCon};
use crate::eexpr::EExpr;
use crate::model::FlatModel;

/// Knobs of the conversion loop.
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Upper bound on conversion waves; a backstop against rewrite tables
    /// that keep emitting work.
    pub max_waves: usize,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig { max_waves: 50 }
    }
}

impl FlattenConfig {
    fn validate(&self) -> Result<()> {
        if self.max_waves == 0 {
            return Err(NlError::InvalidOption {
                name: "cvt:maxwaves".to_string(),
                value: 0,
            });
        }
        Ok(())
    }
}

/// Lowers a tree-shaped problem into a flat model against one backend.
#[derive(Debug)]
pub struct FlatConverter<B> {
    problem: Problem,
    backend: B,
    config: FlattenConfig,
}

impl<B: Backend> FlatConverter<B> {
    /// Create a converter with the default configuration.
    #[must_use]
    pub fn new(backend: B) -> Self {
        FlatConverter {
            problem: Problem::new(),
            backend,
            config: FlattenConfig::default(),
        }
    }

    /// Create a converter with an explicit configuration.
    pub fn with_config(backend: B, config: FlattenConfig) -> Result<Self> {
        config.validate()?;
        Ok(FlatConverter {
            problem: Problem::new(),
            backend,
            config,
        })
    }

    /// The problem received so far.
    #[must_use]
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Lower the received problem into a flat model.
    pub fn convert(self) -> Result<FlatModel> {
        let FlatConverter {
            problem,
            backend,
            config,
        } = self;
        let mut model = FlatModel::new();

        for index in 0..problem.num_vars() {
            let var = problem.var(index);
            model.add_var(var.lb, var.ub, var.ty);
        }

        if problem.num_common_exprs() > 0 {
            return Err(NlError::unsupported("common expression"));
        }
        if problem.num_logical_cons() > 0 {
            return Err(NlError::unsupported("logical constraint"));
        }

        for index in 0..problem.num_objs() {
            let obj = problem.obj(index);
            if obj.nonlinear.is_some() {
                return Err(NlError::unsupported("nonlinear objective"));
            }
            model.add_obj(obj.sense, obj.linear.clone());
        }

        for index in 0..problem.num_algebraic_cons() {
            let con = problem.algebraic_con(index);
            let mut terms = con.linear.clone();
            let mut lb = con.lb;
            let mut ub = con.ub;
            if let Some(root) = con.nonlinear {
                let mut ctx = FlattenCtx {
                    factory: problem.factory(),
                    model: &mut model,
                };
                let ee = ctx.lower(root)?;
                for &(var, coef) in ee.terms() {
                    merge_term(&mut terms, var, coef);
                }
                lb -= ee.constant_term();
                ub -= ee.constant_term();
            }
            model.add_row(lb, ub, terms);
        }

        convert_custom_cons(&backend, &config, &mut model)?;
        debug!(
            backend = backend.name(),
            num_vars = model.num_vars(),
            num_rows = model.num_rows(),
            num_custom_cons = model.num_custom_cons(),
            "conversion finished"
        );
        Ok(model)
    }
}

fn merge_term(terms: &mut Vec<(i32, f64)>, var: i32, coef: f64) {
    if let Some(term) = terms.iter_mut().find(|(v, _)| *v == var) {
        term.1 += coef;
        return;
    }
    terms.push((var, coef));
}

/// The breadth-first rewrite loop: each wave scans the custom constraints
/// appended by the previous wave and rewrites those the backend does not
/// recommend; the loop ends when a wave appends nothing. Running it on a
/// fully converted model is a no-op.
pub fn convert_custom_cons<B: Backend>(
    backend: &B,
    config: &FlattenConfig,
    model: &mut FlatModel,
) -> Result<()> {
    let mut prev = 0;
    let mut wave = 0usize;
    loop {
        let end = model.num_custom_cons();
        if end == prev {
            break;
        }
        wave += 1;
        if wave > config.max_waves {
            return Err(NlError::RewriteLimit {
                class: "conversion wave limit".to_string(),
            });
        }
        preprocess_intermediate(model);
        for index in prev..end {
            if model.is_removed(index) {
                continue;
            }
            let kind = model.custom_con(index).kind();
            let acceptance = backend.acceptance(kind);
            if acceptance == Acceptance::Recommended {
                continue;
            }
            if rewrite_custom_con(backend, model, index)? {
                model.mark_removed(index);
            } else if acceptance == Acceptance::NotAccepted {
                return Err(NlError::RewriteLimit {
                    class: kind.name().to_string(),
                });
            }
        }
        trace!(wave, appended = model.num_custom_cons() - end, "conversion wave");
        prev = end;
    }
    preprocess_final(model);
    Ok(())
}

/// Rewrite one custom constraint, appending replacements at the tail.
/// Emitted constraints must strictly decrease the class rank.
fn rewrite_custom_con<B: Backend>(
    backend: &B,
    model: &mut FlatModel,
    index: usize,
) -> Result<bool> {
    let kind = model.custom_con(index).kind();
    let before = model.num_custom_cons();
    let emitted = if let CustomCon::LinearDefining(def) = model.custom_con(index) {
        let linear = def.to_linear_con();
        model.add_custom_con(CustomCon::Linear(linear));
        true
    } else {
        let con = model.custom_con(index).clone();
        backend.rewrite(&con, model)?
    };
    if emitted {
        for appended in before..model.num_custom_cons() {
            if model.custom_con(appended).kind().rank() >= kind.rank() {
                return Err(NlError::RewriteLimit {
                    class: kind.name().to_string(),
                });
            }
        }
    }
    Ok(emitted)
}

fn preprocess_intermediate(model: &mut FlatModel) {
    trace!(num_custom_cons = model.num_custom_cons(), "preprocess wave");
}

fn preprocess_final(model: &mut FlatModel) {
    trace!(
        live = model.live_custom_cons().count(),
        "preprocess fixed point"
    );
}

/// Bounds and type of a fresh variable standing for `expr`, by interval
/// arithmetic over the terms. Integrality survives only integer variables
/// with integral coefficients.
fn bounds_and_type(expr: &EExpr, model: &FlatModel) -> (f64, f64, VarType) {
    let mut lb = expr.constant_term();
    let mut ub = expr.constant_term();
    let mut ty = VarType::Integer;
    for &(var, coef) in expr.terms() {
        let info = model.var(var);
        if coef >= 0.0 {
            lb += coef * info.lb;
            ub += coef * info.ub;
        } else {
            lb += coef * info.ub;
            ub += coef * info.lb;
        }
        if info.ty != VarType::Integer || coef.fract() != 0.0 {
            ty = VarType::Continuous;
        }
    }
    (lb, ub, ty)
}

/// Visitor state for lowering one expression tree.
struct FlattenCtx<'a> {
    factory: &'a ExprFactory,
    model: &'a mut FlatModel,
}

impl FlattenCtx<'_> {
    fn lower(&mut self, e: NumericExpr) -> Result<EExpr> {
        let factory = self.factory;
        visitor::dispatch_numeric(self, factory, e)
    }

    /// The flat variable standing for `ee`: the identity for variables, the
    /// pinned variable for constants, otherwise a fresh variable defined by
    /// a `LinearDefining` constraint.
    fn to_var(&mut self, ee: EExpr) -> i32 {
        if let Some(var) = ee.representing_variable() {
            return var;
        }
        if ee.is_constant() {
            return self.model.make_fixed_var(ee.constant_term());
        }
        let (lb, ub, ty) = bounds_and_type(&ee, self.model);
        let result_var = self.model.add_var(lb, ub, ty);
        self.model
            .add_custom_con(CustomCon::LinearDefining(LinearDefCon {
                expr: ee,
                result_var,
            }));
        result_var
    }

    fn lower_functional(&mut self, e: VarArgExpr<'_>, kind: ExprKind) -> Result<EExpr> {
        let args: Vec<NumericExpr> = e.args().collect();
        let mut vars = Vec::with_capacity(args.len());
        for arg in args {
            let ee = self.lower(arg)?;
            vars.push(self.to_var(ee));
        }
        let is_max = kind == ExprKind::Max;
        let mut lb = if is_max { f64::NEG_INFINITY } else { f64::INFINITY };
        let mut ub = lb;
        let mut ty = VarType::Integer;
        for &var in &vars {
            let info = self.model.var(var);
            if is_max {
                lb = lb.max(info.lb);
                ub = ub.max(info.ub);
            } else {
                lb = lb.min(info.lb);
                ub = ub.min(info.ub);
            }
            if info.ty != VarType::Integer {
                ty = VarType::Continuous;
            }
        }
        let result_var = self.model.add_var(lb, ub, ty);
        let con = VarArrayCon {
            result_var,
            args: vars,
        };
        self.model.add_custom_con(if is_max {
            CustomCon::Maximum(con)
        } else {
            CustomCon::Minimum(con)
        });
        Ok(EExpr::variable(result_var))
    }
}

impl ExprVisitor for FlattenCtx<'_> {
    type NumericResult = EExpr;
    type LogicalResult = EExpr;

    fn visit_numeric_constant(&mut self, e: NumericConstant<'_>) -> Result<EExpr> {
        Ok(EExpr::constant(e.value()))
    }

    fn visit_variable(&mut self, e: Reference<'_>) -> Result<EExpr> {
        Ok(EExpr::variable(e.index()))
    }

    fn visit_minus(&mut self, e: UnaryExpr<'_>) -> Result<EExpr> {
        let mut ee = self.lower(e.arg())?;
        ee.negate();
        Ok(ee)
    }

    fn visit_add(&mut self, e: BinaryExpr<'_>) -> Result<EExpr> {
        let mut lhs = self.lower(e.lhs())?;
        let rhs = self.lower(e.rhs())?;
        lhs.add(rhs);
        Ok(lhs)
    }

    fn visit_sub(&mut self, e: BinaryExpr<'_>) -> Result<EExpr> {
        let mut lhs = self.lower(e.lhs())?;
        let mut rhs = self.lower(e.rhs())?;
        rhs.negate();
        lhs.add(rhs);
        Ok(lhs)
    }

    fn visit_min(&mut self, e: VarArgExpr<'_>) -> Result<EExpr> {
        self.lower_functional(e, ExprKind::Min)
    }

    fn visit_max(&mut self, e: VarArgExpr<'_>) -> Result<EExpr> {
        self.lower_functional(e, ExprKind::Max)
    }
}

// ---------------------------------------------------------------------------
// ProblemBuilder: forward every event to the internal Problem.
// ---------------------------------------------------------------------------

impl<B: Backend> ProblemBuilder for FlatConverter<B> {
    type Expr = Expr;
    type NumericExpr = NumericExpr;
    type LogicalExpr = LogicalExpr;
    type CountExpr = CountExpr;
    type Variable = Variable;

    type NumericArgBuilder = IteratedExprBuilder;
    type LogicalArgBuilder = LogicalArgsBuilder;
    type SymbolicArgBuilder = SymbolicArgsBuilder;
    type CallArgBuilder = oxmp_core::expr::CallExprBuilder;
    type PlTermBuilder = PlTermExprBuilder;

    type LinearPartBuilder<'a>
        = LinearTerms<'a>
    where
        Self: 'a;
    type ColumnSizeHandler<'a>
        = ColumnSizes<'a>
    where
        Self: 'a;
    type SuffixHandler<'a>
        = SuffixValuesWriter<'a>
    where
        Self: 'a;

    fn begin_build(&mut self, stub: &str, header: &NlHeader, flags: i32) -> Result<()> {
        self.problem.begin_build(stub, header, flags)
    }

    fn end_build(&mut self) -> Result<()> {
        self.problem.end_build()
    }

    fn set_obj(&mut self, index: i32, sense: ObjSense, expr: NumericExpr) -> Result<()> {
        self.problem.set_obj(index, sense, expr)
    }

    fn set_con(&mut self, index: i32, expr: NumericExpr) -> Result<()> {
        self.problem.set_con(index, expr)
    }

    fn set_logical_con(&mut self, index: i32, expr: LogicalExpr) -> Result<()> {
        self.problem.set_logical_con(index, expr)
    }

    fn set_common_expr(&mut self, index: i32, expr: NumericExpr, position: i32) -> Result<()> {
        self.problem.set_common_expr(index, expr, position)
    }

    fn set_complement(&mut self, con_index: i32, var_index: i32, flags: i32) -> Result<()> {
        self.problem.set_complement(con_index, var_index, flags)
    }

    fn linear_obj_builder(&mut self, obj_index: i32, num_terms: i32) -> Result<LinearTerms<'_>> {
        self.problem.linear_obj_builder(obj_index, num_terms)
    }

    fn linear_con_builder(&mut self, con_index: i32, num_terms: i32) -> Result<LinearTerms<'_>> {
        self.problem.linear_con_builder(con_index, num_terms)
    }

    fn linear_var_builder(&mut self, var_index: i32, num_terms: i32) -> Result<LinearTerms<'_>> {
        self.problem.linear_var_builder(var_index, num_terms)
    }

    fn set_var_bounds(&mut self, index: i32, lb: f64, ub: f64) -> Result<()> {
        self.problem.set_var_bounds(index, lb, ub)
    }

    fn set_con_bounds(&mut self, index: i32, lb: f64, ub: f64) -> Result<()> {
        self.problem.set_con_bounds(index, lb, ub)
    }

    fn set_initial_value(&mut self, var_index: i32, value: f64) -> Result<()> {
        self.problem.set_initial_value(var_index, value)
    }

    fn set_initial_dual_value(&mut self, con_index: i32, value: f64) -> Result<()> {
        self.problem.set_initial_dual_value(con_index, value)
    }

    fn column_sizes(&mut self) -> Result<ColumnSizes<'_>> {
        self.problem.column_sizes()
    }

    fn set_function(&mut self, index: i32, name: &str, num_args: i32, ty: FuncType) -> Result<()> {
        self.problem.set_function(index, name, num_args, ty)
    }

    fn add_suffix(
        &mut self,
        kind: i32,
        num_values: i32,
        name: &str,
    ) -> Result<SuffixValuesWriter<'_>> {
        self.problem.add_suffix(kind, num_values, name)
    }

    fn make_numeric_constant(&mut self, value: f64) -> Result<NumericExpr> {
        self.problem.make_numeric_constant(value)
    }

    fn make_variable(&mut self, index: i32) -> Result<Variable> {
        self.problem.make_variable(index)
    }

    fn make_common_expr_ref(&mut self, index: i32) -> Result<NumericExpr> {
        self.problem.make_common_expr_ref(index)
    }

    fn make_unary(&mut self, kind: ExprKind, arg: NumericExpr) -> Result<NumericExpr> {
        self.problem.make_unary(kind, arg)
    }

    fn make_binary(
        &mut self,
        kind: ExprKind,
        lhs: NumericExpr,
        rhs: NumericExpr,
    ) -> Result<NumericExpr> {
        self.problem.make_binary(kind, lhs, rhs)
    }

    fn make_if(
        &mut self,
        condition: LogicalExpr,
        then_expr: NumericExpr,
        else_expr: NumericExpr,
    ) -> Result<NumericExpr> {
        self.problem.make_if(condition, then_expr, else_expr)
    }

    fn begin_pl_term(&mut self, num_breakpoints: i32) -> Result<PlTermExprBuilder> {
        self.problem.begin_pl_term(num_breakpoints)
    }

    fn end_pl_term(&mut self, builder: PlTermExprBuilder, var: Variable) -> Result<NumericExpr> {
        self.problem.end_pl_term(builder, var)
    }

    fn begin_call(&mut self, func_index: i32, num_args: i32) -> Result<Self::CallArgBuilder> {
        self.problem.begin_call(func_index, num_args)
    }

    fn end_call(&mut self, builder: Self::CallArgBuilder) -> Result<NumericExpr> {
        self.problem.end_call(builder)
    }

    fn begin_iterated(&mut self, kind: ExprKind, num_args: i32) -> Result<IteratedExprBuilder> {
        self.problem.begin_iterated(kind, num_args)
    }

    fn end_iterated(&mut self, builder: IteratedExprBuilder) -> Result<NumericExpr> {
        self.problem.end_iterated(builder)
    }

    fn begin_count(&mut self, num_args: i32) -> Result<LogicalArgsBuilder> {
        self.problem.begin_count(num_args)
    }

    fn end_count(&mut self, builder: LogicalArgsBuilder) -> Result<CountExpr> {
        self.problem.end_count(builder)
    }

    fn begin_number_of(&mut self, num_args: i32, value: NumericExpr) -> Result<IteratedExprBuilder> {
        self.problem.begin_number_of(num_args, value)
    }

    fn end_number_of(&mut self, builder: IteratedExprBuilder) -> Result<NumericExpr> {
        self.problem.end_number_of(builder)
    }

    fn begin_number_of_sym(&mut self, num_args: i32, value: Expr) -> Result<SymbolicArgsBuilder> {
        self.problem.begin_number_of_sym(num_args, value)
    }

    fn end_number_of_sym(&mut self, builder: SymbolicArgsBuilder) -> Result<NumericExpr> {
        self.problem.end_number_of_sym(builder)
    }

    fn make_logical_constant(&mut self, value: bool) -> Result<LogicalExpr> {
        self.problem.make_logical_constant(value)
    }

    fn make_not(&mut self, arg: LogicalExpr) -> Result<LogicalExpr> {
        self.problem.make_not(arg)
    }

    fn make_binary_logical(
        &mut self,
        kind: ExprKind,
        lhs: LogicalExpr,
        rhs: LogicalExpr,
    ) -> Result<LogicalExpr> {
        self.problem.make_binary_logical(kind, lhs, rhs)
    }

    fn make_relational(
        &mut self,
        kind: ExprKind,
        lhs: NumericExpr,
        rhs: NumericExpr,
    ) -> Result<LogicalExpr> {
        self.problem.make_relational(kind, lhs, rhs)
    }

    fn make_logical_count(
        &mut self,
        kind: ExprKind,
        lhs: NumericExpr,
        count: CountExpr,
    ) -> Result<LogicalExpr> {
        self.problem.make_logical_count(kind, lhs, count)
    }

    fn make_implication(
        &mut self,
        condition: LogicalExpr,
        then_expr: LogicalExpr,
        else_expr: LogicalExpr,
    ) -> Result<LogicalExpr> {
        self.problem.make_implication(condition, then_expr, else_expr)
    }

    fn begin_iterated_logical(
        &mut self,
        kind: ExprKind,
        num_args: i32,
    ) -> Result<LogicalArgsBuilder> {
        self.problem.begin_iterated_logical(kind, num_args)
    }

    fn end_iterated_logical(&mut self, builder: LogicalArgsBuilder) -> Result<LogicalExpr> {
        self.problem.end_iterated_logical(builder)
    }

    fn begin_pairwise(&mut self, kind: ExprKind, num_args: i32) -> Result<IteratedExprBuilder> {
        self.problem.begin_pairwise(kind, num_args)
    }

    fn end_pairwise(&mut self, builder: IteratedExprBuilder) -> Result<LogicalExpr> {
        self.problem.end_pairwise(builder)
    }

    fn make_string_literal(&mut self, value: &[u8]) -> Result<Expr> {
        self.problem.make_string_literal(value)
    }

    fn make_symbolic_if(
        &mut self,
        condition: LogicalExpr,
        then_expr: Expr,
        else_expr: Expr,
    ) -> Result<Expr> {
        self.problem.make_symbolic_if(condition, then_expr, else_expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MipBackend;

    #[test]
    fn test_config_validation() {
        assert!(FlatConverter::with_config(MipBackend, FlattenConfig::default()).is_ok());
        let err =
            FlatConverter::with_config(MipBackend, FlattenConfig { max_waves: 0 }).unwrap_err();
        assert_eq!(err.to_string(), "invalid value 0 for option cvt:maxwaves");
    }

    #[test]
    fn test_bounds_and_type_interval_arithmetic() {
        let mut model = FlatModel::new();
        let x = model.add_var(1.0, 3.0, VarType::Integer);
        let y = model.add_var(-2.0, 5.0, VarType::Integer);
        let mut ee = EExpr::constant(1.0);
        ee.add_term(x, 1.0);
        ee.add_term(y, 2.0);
        let (lb, ub, ty) = bounds_and_type(&ee, &model);
        assert_eq!(lb, 1.0 + 1.0 - 4.0);
        assert_eq!(ub, 1.0 + 3.0 + 10.0);
        assert_eq!(ty, VarType::Integer);
    }

    #[test]
    fn test_negative_coefficient_swaps_bounds() {
        let mut model = FlatModel::new();
        let x = model.add_var(1.0, 3.0, VarType::Integer);
        let mut ee = EExpr::default();
        ee.add_term(x, -2.0);
        let (lb, ub, ty) = bounds_and_type(&ee, &model);
        assert_eq!(lb, -6.0);
        assert_eq!(ub, -2.0);
        assert_eq!(ty, VarType::Integer);
    }

    #[test]
    fn test_fractional_coefficient_downgrades_type() {
        let mut model = FlatModel::new();
        let x = model.add_var(0.0, 2.0, VarType::Integer);
        let mut ee = EExpr::default();
        ee.add_term(x, 0.5);
        let (lb, ub, ty) = bounds_and_type(&ee, &model);
        assert_eq!((lb, ub), (0.0, 1.0));
        assert_eq!(ty, VarType::Continuous);
    }

    #[test]
    fn test_infinite_bounds_absorb() {
        let mut model = FlatModel::new();
        let x = model.add_var(f64::NEG_INFINITY, f64::INFINITY, VarType::Continuous);
        let mut ee = EExpr::default();
        ee.add_term(x, 2.0);
        let (lb, ub, ty) = bounds_and_type(&ee, &model);
        assert_eq!(lb, f64::NEG_INFINITY);
        assert_eq!(ub, f64::INFINITY);
        assert_eq!(ty, VarType::Continuous);
    }
}
