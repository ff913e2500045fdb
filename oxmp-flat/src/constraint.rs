//! Custom constraints: the named relation classes a flat model carries
//! alongside its plain linear rows.
//!
//! Each class has a kind tag used for backend acceptance queries and a
//! rewrite rank; every registered rewrite must produce constraints of
//! strictly smaller rank, which is what makes the conversion loop terminate.

use crate::eexpr::EExpr;

/// Tag identifying a custom-constraint class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConKind {
    /// `lb <= sum(coef * var) <= ub`.
    Linear,
    /// `r = affine_expr`.
    LinearDefining,
    /// `r = max(v1, ..., vn)`.
    Maximum,
    /// `r = min(v1, ..., vn)`.
    Minimum,
    /// `r = (v1 != v2)`.
    NotEqual,
    /// `r = (v1 <= v2)`.
    LessOrEqual,
    /// `r = (v1 || v2)`.
    Disjunction,
    /// `b == bv  ==>  sum(coef * var) <= rhs`.
    IndicatorLinLe,
}

impl ConKind {
    /// Short class name used in diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ConKind::Linear => "linear",
            ConKind::LinearDefining => "linear defining",
            ConKind::Maximum => "maximum",
            ConKind::Minimum => "minimum",
            ConKind::NotEqual => "not equal",
            ConKind::LessOrEqual => "less or equal",
            ConKind::Disjunction => "disjunction",
            ConKind::IndicatorLinLe => "indicator linear-le",
        }
    }

    /// Human-readable shape of the relation.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ConKind::Linear => "lb <= c'x <= ub",
            ConKind::LinearDefining => "r = affine_expr",
            ConKind::Maximum => "r = max(v1, v2, ..., vn)",
            ConKind::Minimum => "r = min(v1, v2, ..., vn)",
            ConKind::NotEqual => "r = (v1 != v2)",
            ConKind::LessOrEqual => "r = (v1 <= v2)",
            ConKind::Disjunction => "r = (v1 || v2)",
            ConKind::IndicatorLinLe => "b==bv ==> c'x <= rhs",
        }
    }

    /// Rewrite rank; every rewrite strictly decreases it.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            ConKind::Linear => 0,
            ConKind::LinearDefining | ConKind::IndicatorLinLe => 1,
            _ => 2,
        }
    }
}

/// A plain linear constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearCon {
    /// Coefficients, parallel to `vars`.
    pub coefs: Vec<f64>,
    /// Variable indices, parallel to `coefs`.
    pub vars: Vec<i32>,
    /// Lower bound.
    pub lb: f64,
    /// Upper bound.
    pub ub: f64,
}

/// `r = affine_expr`, introduced when a composite subexpression is replaced
/// by its result variable.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearDefCon {
    /// The affine body.
    pub expr: EExpr,
    /// The defined result variable.
    pub result_var: i32,
}

impl LinearDefCon {
    /// The equivalent plain linear constraint:
    /// `expr - r = 0` with the constant moved to the bounds.
    #[must_use]
    pub fn to_linear_con(&self) -> LinearCon {
        let mut coefs = Vec::with_capacity(self.expr.terms().len() + 1);
        let mut vars = Vec::with_capacity(self.expr.terms().len() + 1);
        for &(var, coef) in self.expr.terms() {
            vars.push(var);
            coefs.push(coef);
        }
        vars.push(self.result_var);
        coefs.push(-1.0);
        let rhs = -self.expr.constant_term();
        LinearCon {
            coefs,
            vars,
            lb: rhs,
            ub: rhs,
        }
    }
}

/// `r = op(v1, ..., vn)` over a variable array (maximum, minimum).
#[derive(Debug, Clone, PartialEq)]
pub struct VarArrayCon {
    /// The result variable.
    pub result_var: i32,
    /// The argument variables.
    pub args: Vec<i32>,
}

/// `r = (v1 op v2)` for a binary relation (not-equal, less-or-equal,
/// disjunction).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairCon {
    /// The result variable.
    pub result_var: i32,
    /// Left operand.
    pub lhs: i32,
    /// Right operand.
    pub rhs: i32,
}

/// Indicator constraint `b == bv  ==>  c'x <= rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorLinLeCon {
    /// The indicator variable; must be binary.
    pub binary_var: i32,
    /// The triggering value, 0 or 1.
    pub binary_value: i32,
    /// Coefficients of the implied inequality.
    pub coefs: Vec<f64>,
    /// Variables of the implied inequality.
    pub vars: Vec<i32>,
    /// Right-hand side of the implied inequality.
    pub rhs: f64,
}

/// A custom constraint value.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomCon {
    /// Plain linear constraint.
    Linear(LinearCon),
    /// Defining constraint `r = affine_expr`.
    LinearDefining(LinearDefCon),
    /// `r = max(vs)`.
    Maximum(VarArrayCon),
    /// `r = min(vs)`.
    Minimum(VarArrayCon),
    /// `r = (v1 != v2)`.
    NotEqual(PairCon),
    /// `r = (v1 <= v2)`.
    LessOrEqual(PairCon),
    /// `r = (v1 || v2)`.
    Disjunction(PairCon),
    /// `b == bv ==> c'x <= rhs`.
    IndicatorLinLe(IndicatorLinLeCon),
}

impl CustomCon {
    /// The class tag of this constraint.
    #[must_use]
    pub fn kind(&self) -> ConKind {
        match self {
            CustomCon::Linear(_) => ConKind::Linear,
            CustomCon::LinearDefining(_) => ConKind::LinearDefining,
            CustomCon::Maximum(_) => ConKind::Maximum,
            CustomCon::Minimum(_) => ConKind::Minimum,
            CustomCon::NotEqual(_) => ConKind::NotEqual,
            CustomCon::LessOrEqual(_) => ConKind::LessOrEqual,
            CustomCon::Disjunction(_) => ConKind::Disjunction,
            CustomCon::IndicatorLinLe(_) => ConKind::IndicatorLinLe,
        }
    }

    /// The result variable, for defining classes.
    #[must_use]
    pub fn result_var(&self) -> Option<i32> {
        match self {
            CustomCon::Linear(_) | CustomCon::IndicatorLinLe(_) => None,
            CustomCon::LinearDefining(c) => Some(c.result_var),
            CustomCon::Maximum(c) | CustomCon::Minimum(c) => Some(c.result_var),
            CustomCon::NotEqual(c) | CustomCon::LessOrEqual(c) | CustomCon::Disjunction(c) => {
                Some(c.result_var)
            }
        }
    }
}
