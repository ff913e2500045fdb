//! OxMP Flat - lowering nonlinear models to mixed-integer form.
//!
//! This crate consumes the reader events of `oxmp-core` and produces a
//! [`model::FlatModel`]:
//! - [`eexpr::EExpr`], the canonical affine result of lowering a numeric
//!   expression
//! - [`constraint::CustomCon`], the named relation classes introduced when a
//!   composite expression is replaced by a result variable
//! - [`backend::Backend`], the per-class capability table a solver
//!   advertises
//! - [`converter::FlatConverter`], the breadth-first rewrite engine that
//!   iterates until every remaining custom constraint is recommended
//!
//! # Examples
//!
//! ```
//! use oxmp_core::nl::read_nl_string;
//! use oxmp_flat::{FlatConverter, MipBackend};
//!
//! // min x0 subject to -x0 <= 0
//! let input = "g3 0 1 0\n 1 1 1 0 1 0\n 1 0 0 0 0 0\n 0 0\n 1 0 0\n \
//!              0 0 0 1\n 0 0 0 0 0\n 1 1\n 0 0\n 0 0 0 0 0\n\
//!              O0 0\nn0\nG0 1\n0 1\nC0\no16\nv0\nr\n1 0\n";
//! let mut converter = FlatConverter::new(MipBackend);
//! read_nl_string(input, &mut converter, "(input)").unwrap();
//! let model = converter.convert().unwrap();
//! assert_eq!(model.num_rows(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod constraint;
pub mod converter;
pub mod eexpr;
pub mod model;

pub use backend::{Acceptance, Backend, MipBackend, TableBackend};
pub use constraint::{ConKind, CustomCon};
pub use converter::{FlatConverter, FlattenConfig, convert_custom_cons};
pub use eexpr::EExpr;
pub use model::{FlatModel, FlatObj, FlatRow, FlatVar};
