//! The sink interface driven by the .nl reader.
//!
//! [`ProblemBuilder`] mirrors the factory surface plus the model-level
//! events (bounds, linear parts, suffixes, initial values). Every method has
//! a default that reports the construct as unsupported, so a minimal builder
//! overrides only what it can accept; [`NullBuilder`] overrides nothing and
//! is the reject-all stub for drivers interested in linear data only.
//!
//! Events arrive in input order. Variadic constructs use owned argument
//! builders (`begin_* .. end_*`); linear parts, column sizes and suffixes use
//! short-lived handlers borrowing the builder.

use crate::common::{FuncType, ObjSense};
use crate::error::{NlError, Result};
use crate::expr::ExprKind;
use crate::header::NlHeader;

/// Receives the terms of one linear part (objective gradient, constraint
/// row or defined-variable body).
pub trait LinearExprBuilder {
    /// Append one `coef * var` term.
    fn add_term(&mut self, var_index: i32, coef: f64);
}

/// Receives the arguments of one variadic expression.
pub trait ArgBuilder<E> {
    /// Append the next argument.
    fn add_arg(&mut self, arg: E);
}

/// Receives the interleaved slopes and breakpoints of a piecewise-linear
/// term.
pub trait PlArgBuilder {
    /// Append the next slope.
    fn add_slope(&mut self, slope: f64);
    /// Append the next breakpoint.
    fn add_breakpoint(&mut self, breakpoint: f64);
}

/// Receives Jacobian column sizes.
pub trait ColumnSizeReceiver {
    /// Append the size of the next column.
    fn add(&mut self, size: i32);
}

/// Receives suffix values.
pub trait SuffixValueReceiver {
    /// Set an integer value for the item at `index`.
    fn set_int_value(&mut self, index: i32, value: i64);
    /// Set a floating-point value for the item at `index`.
    fn set_float_value(&mut self, index: i32, value: f64);
}

impl<E> ArgBuilder<E> for () {
    fn add_arg(&mut self, _arg: E) {}
}

impl LinearExprBuilder for () {
    fn add_term(&mut self, _var_index: i32, _coef: f64) {}
}

impl PlArgBuilder for () {
    fn add_slope(&mut self, _slope: f64) {}
    fn add_breakpoint(&mut self, _breakpoint: f64) {}
}

impl ColumnSizeReceiver for () {
    fn add(&mut self, _size: i32) {}
}

impl SuffixValueReceiver for () {
    fn set_int_value(&mut self, _index: i32, _value: i64) {}
    fn set_float_value(&mut self, _index: i32, _value: f64) {}
}

/// Abstract sink for reader events; constructs the in-memory problem.
#[allow(unused_variables)]
pub trait ProblemBuilder {
    /// Any expression: numeric, logical or string.
    type Expr: From<Self::NumericExpr> + From<Self::LogicalExpr>;
    /// A numeric expression.
    type NumericExpr: From<Self::Variable> + From<Self::CountExpr>;
    /// A logical expression.
    type LogicalExpr;
    /// A count expression.
    type CountExpr;
    /// A variable reference.
    type Variable;

    /// Argument accumulator for iterated numeric and pairwise kinds.
    type NumericArgBuilder: ArgBuilder<Self::NumericExpr>;
    /// Argument accumulator for count and iterated logical kinds.
    type LogicalArgBuilder: ArgBuilder<Self::LogicalExpr>;
    /// Argument accumulator for symbolic `numberof`.
    type SymbolicArgBuilder: ArgBuilder<Self::Expr>;
    /// Argument accumulator for function calls.
    type CallArgBuilder: ArgBuilder<Self::Expr>;
    /// Accumulator for piecewise-linear slopes and breakpoints.
    type PlTermBuilder: PlArgBuilder;

    /// Handler for one linear part.
    type LinearPartBuilder<'a>: LinearExprBuilder
    where
        Self: 'a;
    /// Handler for Jacobian column sizes.
    type ColumnSizeHandler<'a>: ColumnSizeReceiver
    where
        Self: 'a;
    /// Handler for one suffix's values.
    type SuffixHandler<'a>: SuffixValueReceiver
    where
        Self: 'a;

    /// Error reported for a construct this builder does not accept.
    fn unhandled(&self, construct: &str) -> NlError {
        NlError::unsupported(construct)
    }

    /// Called once before any other event, with the parsed header.
    fn begin_build(&mut self, stub: &str, header: &NlHeader, flags: i32) -> Result<()> {
        Ok(())
    }

    /// Called once after the last event.
    fn end_build(&mut self) -> Result<()> {
        Ok(())
    }

    // -- model items -------------------------------------------------------

    /// Set objective `index`'s sense and nonlinear expression.
    fn set_obj(&mut self, index: i32, sense: ObjSense, expr: Self::NumericExpr) -> Result<()> {
        Err(self.unhandled("objective"))
    }

    /// Set the nonlinear part of algebraic constraint `index`.
    fn set_con(&mut self, index: i32, expr: Self::NumericExpr) -> Result<()> {
        Err(self.unhandled("nonlinear constraint"))
    }

    /// Assert logical constraint `index`.
    fn set_logical_con(&mut self, index: i32, expr: Self::LogicalExpr) -> Result<()> {
        Err(self.unhandled("logical constraint"))
    }

    /// Set common expression `index` (zero-based among common expressions);
    /// `position` is the writer's placement hint.
    fn set_common_expr(&mut self, index: i32, expr: Self::NumericExpr, position: i32) -> Result<()> {
        Err(self.unhandled("nonlinear defined variable"))
    }

    /// Associate algebraic constraint `con_index` with `var_index`;
    /// `flags` holds the two infinite-bound bits.
    fn set_complement(&mut self, con_index: i32, var_index: i32, flags: i32) -> Result<()> {
        Err(self.unhandled("complementarity constraint"))
    }

    /// Handler for objective `obj_index`'s linear gradient.
    fn linear_obj_builder(
        &mut self,
        obj_index: i32,
        num_terms: i32,
    ) -> Result<Self::LinearPartBuilder<'_>> {
        Err(self.unhandled("linear objective"))
    }

    /// Handler for constraint `con_index`'s linear row.
    fn linear_con_builder(
        &mut self,
        con_index: i32,
        num_terms: i32,
    ) -> Result<Self::LinearPartBuilder<'_>> {
        Err(self.unhandled("linear constraint"))
    }

    /// Handler for the linear part of defined variable `var_index`
    /// (a global variable index at or past `num_vars`).
    fn linear_var_builder(
        &mut self,
        var_index: i32,
        num_terms: i32,
    ) -> Result<Self::LinearPartBuilder<'_>> {
        Err(self.unhandled("linear defined variable"))
    }

    /// Set variable bounds.
    fn set_var_bounds(&mut self, index: i32, lb: f64, ub: f64) -> Result<()> {
        Err(self.unhandled("variable bound"))
    }

    /// Set algebraic constraint bounds.
    fn set_con_bounds(&mut self, index: i32, lb: f64, ub: f64) -> Result<()> {
        Err(self.unhandled("constraint bound"))
    }

    /// Set a primal initial value.
    fn set_initial_value(&mut self, var_index: i32, value: f64) -> Result<()> {
        Err(self.unhandled("initial value"))
    }

    /// Set a dual initial value.
    fn set_initial_dual_value(&mut self, con_index: i32, value: f64) -> Result<()> {
        Err(self.unhandled("initial dual value"))
    }

    /// Handler receiving Jacobian column sizes.
    fn column_sizes(&mut self) -> Result<Self::ColumnSizeHandler<'_>> {
        Err(self.unhandled("Jacobian column size"))
    }

    /// Declare function `index`.
    fn set_function(&mut self, index: i32, name: &str, num_args: i32, ty: FuncType) -> Result<()> {
        Err(self.unhandled("function"))
    }

    /// Add a suffix; `kind` carries the entity kind plus modal flags.
    fn add_suffix(
        &mut self,
        kind: i32,
        num_values: i32,
        name: &str,
    ) -> Result<Self::SuffixHandler<'_>> {
        Err(self.unhandled("suffix"))
    }

    // -- numeric expression factory ----------------------------------------

    /// Create a numeric constant.
    fn make_numeric_constant(&mut self, value: f64) -> Result<Self::NumericExpr> {
        Err(self.unhandled("numeric constant in nonlinear expression"))
    }

    /// Create a variable reference.
    fn make_variable(&mut self, index: i32) -> Result<Self::Variable> {
        Err(self.unhandled("variable in nonlinear expression"))
    }

    /// Create a common-expression reference (zero-based index among common
    /// expressions).
    fn make_common_expr_ref(&mut self, index: i32) -> Result<Self::NumericExpr> {
        Err(self.unhandled("named subexpression"))
    }

    /// Create a unary numeric expression.
    fn make_unary(&mut self, kind: ExprKind, arg: Self::NumericExpr) -> Result<Self::NumericExpr> {
        Err(self.unhandled("unary expression"))
    }

    /// Create a binary numeric expression.
    fn make_binary(
        &mut self,
        kind: ExprKind,
        lhs: Self::NumericExpr,
        rhs: Self::NumericExpr,
    ) -> Result<Self::NumericExpr> {
        Err(self.unhandled("binary expression"))
    }

    /// Create an if-then-else expression.
    fn make_if(
        &mut self,
        condition: Self::LogicalExpr,
        then_expr: Self::NumericExpr,
        else_expr: Self::NumericExpr,
    ) -> Result<Self::NumericExpr> {
        Err(self.unhandled("if expression"))
    }

    /// Start a piecewise-linear term.
    fn begin_pl_term(&mut self, num_breakpoints: i32) -> Result<Self::PlTermBuilder> {
        Err(self.unhandled("piecewise-linear term"))
    }

    /// Finish a piecewise-linear term applied to `var`.
    fn end_pl_term(
        &mut self,
        builder: Self::PlTermBuilder,
        var: Self::Variable,
    ) -> Result<Self::NumericExpr> {
        Err(self.unhandled("piecewise-linear term"))
    }

    /// Start a call to declared function `func_index`.
    fn begin_call(&mut self, func_index: i32, num_args: i32) -> Result<Self::CallArgBuilder> {
        Err(self.unhandled("function call"))
    }

    /// Finish a call expression.
    fn end_call(&mut self, builder: Self::CallArgBuilder) -> Result<Self::NumericExpr> {
        Err(self.unhandled("function call"))
    }

    /// Start an iterated numeric expression (`Min`, `Max` or `Sum`).
    fn begin_iterated(&mut self, kind: ExprKind, num_args: i32) -> Result<Self::NumericArgBuilder> {
        if kind.is_vararg() {
            Err(self.unhandled("vararg expression"))
        } else {
            Err(self.unhandled("sum"))
        }
    }

    /// Finish an iterated numeric expression.
    fn end_iterated(&mut self, builder: Self::NumericArgBuilder) -> Result<Self::NumericExpr> {
        Err(self.unhandled("iterated expression"))
    }

    /// Start a `count` expression.
    fn begin_count(&mut self, num_args: i32) -> Result<Self::LogicalArgBuilder> {
        Err(self.unhandled("count expression"))
    }

    /// Finish a `count` expression.
    fn end_count(&mut self, builder: Self::LogicalArgBuilder) -> Result<Self::CountExpr> {
        Err(self.unhandled("count expression"))
    }

    /// Start a `numberof` with the value being counted.
    fn begin_number_of(
        &mut self,
        num_args: i32,
        value: Self::NumericExpr,
    ) -> Result<Self::NumericArgBuilder> {
        Err(self.unhandled("numberof expression"))
    }

    /// Finish a `numberof` expression.
    fn end_number_of(&mut self, builder: Self::NumericArgBuilder) -> Result<Self::NumericExpr> {
        Err(self.unhandled("numberof expression"))
    }

    /// Start a symbolic `numberof` with the value being counted.
    fn begin_number_of_sym(
        &mut self,
        num_args: i32,
        value: Self::Expr,
    ) -> Result<Self::SymbolicArgBuilder> {
        Err(self.unhandled("symbolic numberof expression"))
    }

    /// Finish a symbolic `numberof` expression.
    fn end_number_of_sym(&mut self, builder: Self::SymbolicArgBuilder) -> Result<Self::NumericExpr> {
        Err(self.unhandled("symbolic numberof expression"))
    }

    // -- logical expression factory ----------------------------------------

    /// Create a logical constant.
    fn make_logical_constant(&mut self, value: bool) -> Result<Self::LogicalExpr> {
        Err(self.unhandled("logical constant"))
    }

    /// Create a logical negation.
    fn make_not(&mut self, arg: Self::LogicalExpr) -> Result<Self::LogicalExpr> {
        Err(self.unhandled("logical not"))
    }

    /// Create a binary logical expression.
    fn make_binary_logical(
        &mut self,
        kind: ExprKind,
        lhs: Self::LogicalExpr,
        rhs: Self::LogicalExpr,
    ) -> Result<Self::LogicalExpr> {
        Err(self.unhandled("binary logical expression"))
    }

    /// Create a relational expression.
    fn make_relational(
        &mut self,
        kind: ExprKind,
        lhs: Self::NumericExpr,
        rhs: Self::NumericExpr,
    ) -> Result<Self::LogicalExpr> {
        Err(self.unhandled("relational expression"))
    }

    /// Create a logical count expression.
    fn make_logical_count(
        &mut self,
        kind: ExprKind,
        lhs: Self::NumericExpr,
        count: Self::CountExpr,
    ) -> Result<Self::LogicalExpr> {
        Err(self.unhandled("logical count expression"))
    }

    /// Create an implication.
    fn make_implication(
        &mut self,
        condition: Self::LogicalExpr,
        then_expr: Self::LogicalExpr,
        else_expr: Self::LogicalExpr,
    ) -> Result<Self::LogicalExpr> {
        Err(self.unhandled("implication expression"))
    }

    /// Start an iterated logical expression (`Exists` or `ForAll`).
    fn begin_iterated_logical(
        &mut self,
        kind: ExprKind,
        num_args: i32,
    ) -> Result<Self::LogicalArgBuilder> {
        Err(self.unhandled("iterated logical expression"))
    }

    /// Finish an iterated logical expression.
    fn end_iterated_logical(&mut self, builder: Self::LogicalArgBuilder) -> Result<Self::LogicalExpr> {
        Err(self.unhandled("iterated logical expression"))
    }

    /// Start a pairwise expression (`AllDiff` or `NotAllDiff`).
    fn begin_pairwise(&mut self, kind: ExprKind, num_args: i32) -> Result<Self::NumericArgBuilder> {
        Err(self.unhandled("alldiff expression"))
    }

    /// Finish a pairwise expression.
    fn end_pairwise(&mut self, builder: Self::NumericArgBuilder) -> Result<Self::LogicalExpr> {
        Err(self.unhandled("alldiff expression"))
    }

    // -- string expression factory -----------------------------------------

    /// Create a string literal; the bytes may contain NUL and newline.
    fn make_string_literal(&mut self, value: &[u8]) -> Result<Self::Expr> {
        Err(self.unhandled("string literal"))
    }

    /// Create a symbolic if-then-else.
    fn make_symbolic_if(
        &mut self,
        condition: Self::LogicalExpr,
        then_expr: Self::Expr,
        else_expr: Self::Expr,
    ) -> Result<Self::Expr> {
        Err(self.unhandled("symbolic if expression"))
    }
}

/// The reject-all builder: accepts the build bracket and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBuilder;

impl ProblemBuilder for NullBuilder {
    type Expr = ();
    type NumericExpr = ();
    type LogicalExpr = ();
    type CountExpr = ();
    type Variable = ();

    type NumericArgBuilder = ();
    type LogicalArgBuilder = ();
    type SymbolicArgBuilder = ();
    type CallArgBuilder = ();
    type PlTermBuilder = ();

    type LinearPartBuilder<'a> = ();
    type ColumnSizeHandler<'a> = ();
    type SuffixHandler<'a> = ();
}
