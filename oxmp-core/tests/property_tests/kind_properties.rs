//! Properties of the static expression-kind table.

use oxmp_core::expr::{ExprKind, MAX_OPCODE, kind_from_opcode};
use proptest::prelude::*;

proptest! {
    /// Every opcode that resolves to a kind resolves to a kind carrying
    /// that same opcode.
    #[test]
    fn opcode_resolution_is_consistent(opcode in 0..=MAX_OPCODE) {
        if let Some(kind) = kind_from_opcode(opcode) {
            prop_assert_eq!(kind.opcode(), opcode);
            prop_assert!(kind.has_canonical_opcode());
        }
    }

    /// Opcodes outside the table never resolve.
    #[test]
    fn out_of_range_opcodes_do_not_resolve(opcode in MAX_OPCODE + 1..1000) {
        prop_assert_eq!(kind_from_opcode(opcode), None);
        prop_assert_eq!(kind_from_opcode(-opcode), None);
    }

    /// Class predicates partition the numeric/logical split.
    #[test]
    fn numeric_and_logical_predicates_are_exclusive(index in 0..ExprKind::COUNT) {
        let kind = ExprKind::all()[index];
        prop_assert!(!(kind.is_numeric() && kind.is_logical()));
        if kind.is_unary() || kind.is_binary() || kind.is_iterated() {
            prop_assert!(kind.is_numeric());
        }
        if kind.is_relational() || kind.is_logical_count() || kind.is_pairwise() {
            prop_assert!(kind.is_logical());
        }
    }
}
