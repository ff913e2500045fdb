//! OxMP Core - .nl reading and expression algebra for mathematical
//! programming.
//!
//! This crate provides the foundational pieces of the OxMP toolchain:
//! - A streaming reader for the AMPL .nl interchange format (text and
//!   binary) dispatching build events to a [`builder::ProblemBuilder`]
//! - Arena-allocated immutable expressions with typed [`expr::ExprId`]
//!   handles and a static kind/opcode table
//! - Per-kind visitor dispatch with numeric and logical result types
//! - A full problem representation ([`problem::Problem`]) and a reject-all
//!   stub ([`builder::NullBuilder`])
//!
//! # Examples
//!
//! ## Reading a model
//!
//! ```
//! use oxmp_core::nl::read_nl_string;
//! use oxmp_core::problem::Problem;
//!
//! let input = "g3 0 1 0\n 1 0 0 0 0 0\n 0 0 0 0 0 0\n 0 0\n 0 0 0\n \
//!              0 0 0 1\n 0 0 0 0 0\n 0 0\n 0 0\n 0 0 0 0 0\n";
//! let mut problem = Problem::new();
//! read_nl_string(input, &mut problem, "(input)").unwrap();
//! assert_eq!(problem.num_vars(), 1);
//! ```
//!
//! ## Building expressions
//!
//! ```
//! use oxmp_core::expr::{ExprFactory, ExprKind, NumericExpr};
//!
//! let mut f = ExprFactory::new();
//! let x: NumericExpr = f.make_variable(0).into();
//! let two = f.make_numeric_constant(2.0);
//! let product = f.make_binary(ExprKind::Mul, two, x);
//! assert_eq!(f.kind(product), ExprKind::Mul);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod common;
pub mod error;
pub mod expr;
pub mod header;
pub mod nl;
pub mod problem;
pub mod suffix;

pub use builder::{NullBuilder, ProblemBuilder};
pub use common::{FuncType, ObjSense, VarType};
pub use error::{NlError, Result, SourceLocation};
pub use expr::{Expr, ExprFactory, ExprKind, LogicalExpr, NumericExpr, Variable};
pub use header::{ArithKind, NlFormat, NlHeader};
pub use nl::{read_nl_bytes, read_nl_file, read_nl_string};
pub use problem::Problem;
