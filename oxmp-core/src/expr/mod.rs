//! Expression algebra: kinds, the arena factory and the visitor.
//!
//! Expressions are immutable nodes owned by an [`ExprFactory`]. References
//! between nodes go through dense [`ExprId`] indices rather than pointers, so
//! shared subexpressions are shared by construction and the whole tree is
//! reclaimed when the factory is dropped. The typed handles below ([`Expr`],
//! [`NumericExpr`], [`LogicalExpr`], [`CountExpr`], [`Variable`]) are thin
//! wrappers that keep the numeric/logical split visible in builder APIs.

pub mod factory;
pub mod kind;
pub mod visitor;

pub use factory::{
    CallExprBuilder, ExprFactory, FuncId, Function, IteratedExprBuilder, LogicalArgsBuilder,
    PlTermExprBuilder, SymbolicArgsBuilder,
};
pub use kind::{ExprKind, MAX_OPCODE, Precedence, kind_from_opcode};

/// Index of an expression node inside its factory's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub(crate) u32);

impl ExprId {
    /// Raw index value.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to an expression of any kind (numeric, logical or string).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Expr(pub(crate) ExprId);

/// Handle to a numeric expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumericExpr(pub(crate) ExprId);

/// Handle to a logical expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicalExpr(pub(crate) ExprId);

/// Handle to a count expression (a numeric expression counting satisfied
/// logical arguments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountExpr(pub(crate) ExprId);

/// Handle to a variable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable(pub(crate) ExprId);

impl From<NumericExpr> for Expr {
    fn from(e: NumericExpr) -> Expr {
        Expr(e.0)
    }
}

impl From<LogicalExpr> for Expr {
    fn from(e: LogicalExpr) -> Expr {
        Expr(e.0)
    }
}

impl From<Variable> for NumericExpr {
    fn from(e: Variable) -> NumericExpr {
        NumericExpr(e.0)
    }
}

impl From<Variable> for Expr {
    fn from(e: Variable) -> Expr {
        Expr(e.0)
    }
}

impl From<CountExpr> for NumericExpr {
    fn from(e: CountExpr) -> NumericExpr {
        NumericExpr(e.0)
    }
}

impl Expr {
    /// Identity of the underlying node.
    #[must_use]
    pub fn id(self) -> ExprId {
        self.0
    }
}

impl NumericExpr {
    /// Identity of the underlying node.
    #[must_use]
    pub fn id(self) -> ExprId {
        self.0
    }
}

impl LogicalExpr {
    /// Identity of the underlying node.
    #[must_use]
    pub fn id(self) -> ExprId {
        self.0
    }
}

impl CountExpr {
    /// Identity of the underlying node.
    #[must_use]
    pub fn id(self) -> ExprId {
        self.0
    }
}

impl Variable {
    /// Identity of the underlying node.
    #[must_use]
    pub fn id(self) -> ExprId {
        self.0
    }
}
