//! Backend capability tables.
//!
//! A backend advertises, per custom-constraint class, whether it accepts the
//! class natively. `Recommended` is the conversion fixed point; anything
//! else makes the converter look for a rewrite. A backend may also supply
//! its own rewrites through [`Backend::rewrite`].

use oxmp_core::Result;
use rustc_hash::FxHashMap;

use crate::constraint::{ConKind, CustomCon};
use crate::model::FlatModel;

/// How a backend receives a custom-constraint class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// The backend cannot take the class; it must be rewritten.
    NotAccepted,
    /// The backend can take the class but prefers a rewrite when one exists.
    AcceptedButNotRecommended,
    /// The backend's preferred form; conversion leaves it alone.
    Recommended,
}

/// A solver backend's capability surface.
pub trait Backend {
    /// Backend name, for diagnostics.
    fn name(&self) -> &str;

    /// Acceptance level for a constraint class.
    fn acceptance(&self, kind: ConKind) -> Acceptance;

    /// Rewrite `con` into constraints the backend prefers, appending them to
    /// `model`. Returns `true` if a rewrite was emitted. Every emitted
    /// constraint must have a strictly smaller rank than `con`.
    fn rewrite(&self, con: &CustomCon, model: &mut FlatModel) -> Result<bool> {
        let _ = (con, model);
        Ok(false)
    }
}

impl<B: Backend + ?Sized> Backend for &B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn acceptance(&self, kind: ConKind) -> Acceptance {
        (**self).acceptance(kind)
    }

    fn rewrite(&self, con: &CustomCon, model: &mut FlatModel) -> Result<bool> {
        (**self).rewrite(con, model)
    }
}

/// A plain mixed-integer backend: linear rows and indicator constraints are
/// native, every defining class must be lowered.
#[derive(Debug, Default, Clone, Copy)]
pub struct MipBackend;

impl Backend for MipBackend {
    fn name(&self) -> &str {
        "mip"
    }

    fn acceptance(&self, kind: ConKind) -> Acceptance {
        match kind {
            ConKind::Linear | ConKind::IndicatorLinLe => Acceptance::Recommended,
            _ => Acceptance::NotAccepted,
        }
    }
}

/// A table-driven backend, mainly for tests and prototyping.
#[derive(Debug, Clone)]
pub struct TableBackend {
    name: String,
    default: Acceptance,
    table: FxHashMap<ConKind, Acceptance>,
}

impl TableBackend {
    /// Create a table with a default acceptance level.
    #[must_use]
    pub fn new(name: &str, default: Acceptance) -> Self {
        TableBackend {
            name: name.to_string(),
            default,
            table: FxHashMap::default(),
        }
    }

    /// Override the acceptance of one class.
    #[must_use]
    pub fn with(mut self, kind: ConKind, acceptance: Acceptance) -> Self {
        self.table.insert(kind, acceptance);
        self
    }
}

impl Backend for TableBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn acceptance(&self, kind: ConKind) -> Acceptance {
        self.table.get(&kind).copied().unwrap_or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_backend_acceptance() {
        let b = MipBackend;
        assert_eq!(b.name(), "mip");
        assert_eq!(b.acceptance(ConKind::Linear), Acceptance::Recommended);
        assert_eq!(
            b.acceptance(ConKind::IndicatorLinLe),
            Acceptance::Recommended
        );
        assert_eq!(b.acceptance(ConKind::Maximum), Acceptance::NotAccepted);
        assert_eq!(
            b.acceptance(ConKind::LinearDefining),
            Acceptance::NotAccepted
        );
    }

    #[test]
    fn test_table_backend_overrides() {
        let b = TableBackend::new("cp", Acceptance::Recommended)
            .with(ConKind::IndicatorLinLe, Acceptance::NotAccepted)
            .with(ConKind::Disjunction, Acceptance::AcceptedButNotRecommended);
        assert_eq!(b.acceptance(ConKind::Maximum), Acceptance::Recommended);
        assert_eq!(
            b.acceptance(ConKind::IndicatorLinLe),
            Acceptance::NotAccepted
        );
        assert_eq!(
            b.acceptance(ConKind::Disjunction),
            Acceptance::AcceptedButNotRecommended
        );
    }

    #[test]
    fn test_default_rewrite_hook_declines() {
        let b = MipBackend;
        let mut model = FlatModel::new();
        let con = CustomCon::Maximum(crate::constraint::VarArrayCon {
            result_var: 0,
            args: vec![1, 2],
        });
        assert!(!b.rewrite(&con, &mut model).unwrap());
    }
}
