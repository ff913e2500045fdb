//! Round-trip properties of the header model.

use oxmp_core::builder::ProblemBuilder;
use oxmp_core::header::NlHeader;
use oxmp_core::nl::read_nl_string;
use oxmp_core::{NlError, Result};
use proptest::prelude::*;

/// Minimal builder that only captures the header.
#[derive(Default)]
struct HeaderSink {
    header: NlHeader,
}

impl ProblemBuilder for HeaderSink {
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

    fn begin_build(&mut self, _stub: &str, header: &NlHeader, _flags: i32) -> Result<()> {
        self.header = header.clone();
        Ok(())
    }
}

prop_compose! {
    /// Headers a canonical writer could produce: every field present, counts
    /// consistent, text format.
    fn valid_header()(
        num_vars in 0..10_000i32,
        num_algebraic_cons in 0..10_000i32,
        num_objs in 0..100i32,
        num_logical_cons in 0..100i32,
        compl in 0..50i32,
        nl_compl in 0..50i32,
        binary_vars in 0..50i32,
        common in 0..50i32,
        options in prop::collection::vec(-100..100i32, 0..=9),
        vbtol in 0.0..1e6f64,
    ) -> NlHeader {
        let mut h = NlHeader {
            num_vars,
            num_algebraic_cons,
            num_objs,
            num_logical_cons,
            num_compl_conds: compl + nl_compl,
            num_nl_compl_conds: nl_compl,
            num_linear_binary_vars: binary_vars,
            num_common_exprs_in_cons: common,
            ..NlHeader::default()
        };
        h.num_options = options.len();
        for (slot, value) in h.options.iter_mut().zip(&options) {
            *slot = *value;
        }
        if h.num_options > 1 && h.options[1] == 3 {
            h.ampl_vbtol = vbtol;
        }
        h
    }
}

fn parse_header(text: &str) -> std::result::Result<NlHeader, NlError> {
    let mut sink = HeaderSink::default();
    read_nl_string(text, &mut sink, "(input)")?;
    Ok(sink.header)
}

proptest! {
    /// Formatting then parsing a valid header reproduces it.
    #[test]
    fn header_round_trip(header in valid_header()) {
        let parsed = parse_header(&header.to_string()).unwrap();
        prop_assert_eq!(parsed, header);
    }

    /// Parsing never panics on arbitrary single-line mutations of a valid
    /// header.
    #[test]
    fn parser_is_panic_free_on_mutations(
        header in valid_header(),
        line in 0..10usize,
        junk in "[ 0-9a-z-]{0,12}",
    ) {
        let text = header.to_string();
        let mut lines: Vec<&str> = text.lines().collect();
        lines[line] = &junk;
        let mutated = format!("{}\n", lines.join("\n"));
        let _ = parse_header(&mutated);
    }
}
