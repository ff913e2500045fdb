//! The flat model: variables, linear rows, linear objectives and the
//! append-only list of custom constraints.
//!
//! Variables and custom constraints only ever grow during a conversion run;
//! a removed custom constraint stays in place with its `removed` flag set so
//! indices remain stable.

use oxmp_core::common::{ObjSense, VarType};
use rustc_hash::FxHashMap;

use crate::constraint::CustomCon;

/// A flat-model variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatVar {
    /// Lower bound, possibly `-inf`.
    pub lb: f64,
    /// Upper bound, possibly `+inf`.
    pub ub: f64,
    /// Continuous or integer.
    pub ty: VarType,
}

/// A linear objective.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatObj {
    /// Min or max.
    pub sense: ObjSense,
    /// Sparse terms `(var, coef)`.
    pub terms: Vec<(i32, f64)>,
}

/// A linear constraint row.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    /// Lower bound, possibly `-inf`.
    pub lb: f64,
    /// Upper bound, possibly `+inf`.
    pub ub: f64,
    /// Sparse terms `(var, coef)`.
    pub terms: Vec<(i32, f64)>,
}

#[derive(Debug)]
struct ConSlot {
    con: CustomCon,
    removed: bool,
}

/// The flattened model a backend consumes.
#[derive(Debug, Default)]
pub struct FlatModel {
    vars: Vec<FlatVar>,
    objs: Vec<FlatObj>,
    rows: Vec<FlatRow>,
    custom: Vec<ConSlot>,
    fixed_vars: FxHashMap<u64, i32>,
}

impl FlatModel {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, returning its index.
    pub fn add_var(&mut self, lb: f64, ub: f64, ty: VarType) -> i32 {
        let index = self.vars.len() as i32;
        self.vars.push(FlatVar { lb, ub, ty });
        index
    }

    /// Number of variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Access a variable.
    #[must_use]
    pub fn var(&self, index: i32) -> FlatVar {
        self.vars[index as usize]
    }

    /// Add a linear objective.
    pub fn add_obj(&mut self, sense: ObjSense, terms: Vec<(i32, f64)>) -> usize {
        self.objs.push(FlatObj { sense, terms });
        self.objs.len() - 1
    }

    /// Number of objectives.
    #[must_use]
    pub fn num_objs(&self) -> usize {
        self.objs.len()
    }

    /// Access an objective.
    #[must_use]
    pub fn obj(&self, index: usize) -> &FlatObj {
        &self.objs[index]
    }

    /// Add a linear row.
    pub fn add_row(&mut self, lb: f64, ub: f64, terms: Vec<(i32, f64)>) -> usize {
        self.rows.push(FlatRow { lb, ub, terms });
        self.rows.len() - 1
    }

    /// Number of linear rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Access a linear row.
    #[must_use]
    pub fn row(&self, index: usize) -> &FlatRow {
        &self.rows[index]
    }

    /// Append a custom constraint, taking ownership; returns its index.
    pub fn add_custom_con(&mut self, con: CustomCon) -> usize {
        self.custom.push(ConSlot {
            con,
            removed: false,
        });
        self.custom.len() - 1
    }

    /// Number of custom constraints, removed ones included.
    #[must_use]
    pub fn num_custom_cons(&self) -> usize {
        self.custom.len()
    }

    /// Access a custom constraint.
    #[must_use]
    pub fn custom_con(&self, index: usize) -> &CustomCon {
        &self.custom[index].con
    }

    /// Whether a custom constraint has been replaced by a rewrite.
    #[must_use]
    pub fn is_removed(&self, index: usize) -> bool {
        self.custom[index].removed
    }

    /// Mark a custom constraint as replaced. Irreversible.
    pub fn mark_removed(&mut self, index: usize) {
        self.custom[index].removed = true;
    }

    /// Iterate over the live custom constraints.
    pub fn live_custom_cons(&self) -> impl Iterator<Item = &CustomCon> {
        self.custom
            .iter()
            .filter(|slot| !slot.removed)
            .map(|slot| &slot.con)
    }

    /// The variable pinned to `value`, creating it on first use.
    pub fn make_fixed_var(&mut self, value: f64) -> i32 {
        if let Some(&var) = self.fixed_vars.get(&value.to_bits()) {
            return var;
        }
        let ty = if value.fract() == 0.0 && value.is_finite() {
            VarType::Integer
        } else {
            VarType::Continuous
        };
        let var = self.add_var(value, value, ty);
        self.fixed_vars.insert(value.to_bits(), var);
        var
    }
}
