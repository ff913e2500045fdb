//! The .nl preamble: problem dimensions and format information.
//!
//! The header is ten text lines even when the body is binary. [`NlHeader`]
//! stores every field; [`std::fmt::Display`] renders the canonical form and
//! the reader in [`crate::nl`] parses it back.

use std::fmt;

/// Input format of the .nl body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NlFormat {
    /// ASCII body with whitespace-separated tokens.
    #[default]
    Text,
    /// Binary body in the writer's native byte order.
    Binary,
    /// Binary body whose numeric records must be byte-swapped.
    BinarySwapped,
}

/// Floating-point arithmetic kind advertised in header line 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ArithKind {
    /// Unknown or unspecified; treated as the reader's native kind.
    #[default]
    Unknown = 0,
    /// IEEE-754 big endian.
    IeeeBigEndian = 1,
    /// IEEE-754 little endian.
    IeeeLittleEndian = 2,
    /// IBM hexadecimal floating point.
    Ibm = 3,
    /// VAX floating point.
    Vax = 4,
    /// Cray floating point.
    Cray = 5,
}

impl ArithKind {
    /// Largest valid wire value.
    pub const LAST: i32 = ArithKind::Cray as i32;

    /// The arithmetic kind of this host.
    #[must_use]
    pub fn native() -> ArithKind {
        if cfg!(target_endian = "big") {
            ArithKind::IeeeBigEndian
        } else {
            ArithKind::IeeeLittleEndian
        }
    }

    /// Decode a wire value.
    #[must_use]
    pub fn from_wire(value: i32) -> Option<ArithKind> {
        match value {
            0 => Some(ArithKind::Unknown),
            1 => Some(ArithKind::IeeeBigEndian),
            2 => Some(ArithKind::IeeeLittleEndian),
            3 => Some(ArithKind::Ibm),
            4 => Some(ArithKind::Vax),
            5 => Some(ArithKind::Cray),
            _ => None,
        }
    }

    /// Whether this is one of the IEEE-754 kinds.
    #[must_use]
    pub fn is_ieee(self) -> bool {
        matches!(self, ArithKind::IeeeBigEndian | ArithKind::IeeeLittleEndian)
    }
}

/// Maximum number of integer options on header line 1.
pub const MAX_NL_OPTIONS: usize = 9;

/// Sentinel in option slot 1 requesting a trailing `ampl_vbtol` double.
pub const READ_VBTOL: i32 = 3;

/// Zero-based option slot checked against [`READ_VBTOL`].
pub const VBTOL_OPTION: usize = 1;

/// Header flag bit 0: the writer wants output suffixes back.
pub const WANT_OUTPUT_SUFFIXES: i32 = 1;

/// Structured .nl header.
///
/// Missing trailing fields keep their documented defaults: most are 0, but
/// `num_eqns` is `-1` for pre-1997 writers, `num_nl_vars_in_both` is `-1`
/// when line 5 has only two fields, and `num_compl_dbl_ineqs` becomes `-1`
/// when complementarities are present but their subfields are incomplete.
#[derive(Debug, Clone, PartialEq)]
pub struct NlHeader {
    /// Body format.
    pub format: NlFormat,
    /// Number of options on line 1.
    pub num_options: usize,
    /// Option values; slots past `num_options` are zero.
    pub options: [i32; MAX_NL_OPTIONS],
    /// Tolerance transmitted when `options[VBTOL_OPTION] == READ_VBTOL`.
    pub ampl_vbtol: f64,

    /// Total number of variables.
    pub num_vars: i32,
    /// Number of algebraic constraints, including ranges and equalities.
    pub num_algebraic_cons: i32,
    /// Total number of objectives.
    pub num_objs: i32,
    /// Number of range constraints.
    pub num_ranges: i32,
    /// Number of equality constraints, or `-1` if unknown.
    pub num_eqns: i32,
    /// Number of logical constraints.
    pub num_logical_cons: i32,

    /// Number of nonlinear constraints.
    pub num_nl_cons: i32,
    /// Number of nonlinear objectives.
    pub num_nl_objs: i32,
    /// Total number of complementarity conditions.
    pub num_compl_conds: i32,
    /// Number of nonlinear complementarity conditions.
    pub num_nl_compl_conds: i32,
    /// Number of complementarities involving double inequalities.
    pub num_compl_dbl_ineqs: i32,
    /// Number of complemented variables with a nonzero lower bound.
    pub num_compl_vars_with_nz_lb: i32,

    /// Number of nonlinear network constraints.
    pub num_nl_net_cons: i32,
    /// Number of linear network constraints.
    pub num_linear_net_cons: i32,

    /// Number of nonlinear variables in constraints.
    pub num_nl_vars_in_cons: i32,
    /// Number of nonlinear variables in objectives.
    pub num_nl_vars_in_objs: i32,
    /// Number of nonlinear variables in both, or `-1` for old writers.
    pub num_nl_vars_in_both: i32,

    /// Number of linear network variables (arcs).
    pub num_linear_net_vars: i32,
    /// Number of declared functions.
    pub num_funcs: i32,
    /// Arithmetic kind of binary numeric records.
    pub arith_kind: ArithKind,
    /// Miscellaneous flags; bit 0 is [`WANT_OUTPUT_SUFFIXES`].
    pub flags: i32,

    /// Number of linear binary variables.
    pub num_linear_binary_vars: i32,
    /// Number of linear non-binary integer variables.
    pub num_linear_integer_vars: i32,
    /// Number of integer nonlinear variables in both constraints and objectives.
    pub num_nl_integer_vars_in_both: i32,
    /// Number of integer nonlinear variables just in constraints.
    pub num_nl_integer_vars_in_cons: i32,
    /// Number of integer nonlinear variables just in objectives.
    pub num_nl_integer_vars_in_objs: i32,

    /// Number of nonzeros in the constraint Jacobian.
    pub num_con_nonzeros: i64,
    /// Number of nonzeros in all objective gradients.
    pub num_obj_nonzeros: i64,

    /// Length of the longest constraint name.
    pub max_con_name_len: i32,
    /// Length of the longest variable name.
    pub max_var_name_len: i32,

    /// Common expressions appearing in both constraints and objectives.
    pub num_common_exprs_in_both: i32,
    /// Common expressions appearing in constraints.
    pub num_common_exprs_in_cons: i32,
    /// Common expressions appearing in objectives.
    pub num_common_exprs_in_objs: i32,
    /// Common expressions appearing in a single constraint only.
    pub num_common_exprs_in_single_cons: i32,
    /// Common expressions appearing in a single objective only.
    pub num_common_exprs_in_single_objs: i32,
}

impl Default for NlHeader {
    fn default() -> Self {
        NlHeader {
            format: NlFormat::Text,
            num_options: 0,
            options: [0; MAX_NL_OPTIONS],
            ampl_vbtol: 0.0,
            num_vars: 0,
            num_algebraic_cons: 0,
            num_objs: 0,
            num_ranges: 0,
            num_eqns: 0,
            num_logical_cons: 0,
            num_nl_cons: 0,
            num_nl_objs: 0,
            num_compl_conds: 0,
            num_nl_compl_conds: 0,
            num_compl_dbl_ineqs: 0,
            num_compl_vars_with_nz_lb: 0,
            num_nl_net_cons: 0,
            num_linear_net_cons: 0,
            num_nl_vars_in_cons: 0,
            num_nl_vars_in_objs: 0,
            num_nl_vars_in_both: 0,
            num_linear_net_vars: 0,
            num_funcs: 0,
            arith_kind: ArithKind::Unknown,
            flags: 0,
            num_linear_binary_vars: 0,
            num_linear_integer_vars: 0,
            num_nl_integer_vars_in_both: 0,
            num_nl_integer_vars_in_cons: 0,
            num_nl_integer_vars_in_objs: 0,
            num_con_nonzeros: 0,
            num_obj_nonzeros: 0,
            max_con_name_len: 0,
            max_var_name_len: 0,
            num_common_exprs_in_both: 0,
            num_common_exprs_in_cons: 0,
            num_common_exprs_in_objs: 0,
            num_common_exprs_in_single_cons: 0,
            num_common_exprs_in_single_objs: 0,
        }
    }
}

impl NlHeader {
    /// Total number of integer variables, binary included.
    #[must_use]
    pub fn num_integer_vars(&self) -> i32 {
        self.num_linear_binary_vars
            + self.num_linear_integer_vars
            + self.num_nl_integer_vars_in_both
            + self.num_nl_integer_vars_in_cons
            + self.num_nl_integer_vars_in_objs
    }

    /// Number of continuous variables.
    #[must_use]
    pub fn num_continuous_vars(&self) -> i32 {
        self.num_vars - self.num_integer_vars()
    }

    /// Total number of common expressions across the five partitions.
    #[must_use]
    pub fn num_common_exprs(&self) -> i32 {
        self.num_common_exprs_in_both
            + self.num_common_exprs_in_cons
            + self.num_common_exprs_in_objs
            + self.num_common_exprs_in_single_cons
            + self.num_common_exprs_in_single_objs
    }

    /// Whether the writer asked for output suffixes.
    #[must_use]
    pub fn want_output_suffixes(&self) -> bool {
        self.flags & WANT_OUTPUT_SUFFIXES != 0
    }
}

impl fmt::Display for NlHeader {
    fn fmt(&self, w: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = if self.format == NlFormat::Text { 'g' } else { 'b' };
        write!(w, "{tag}{}", self.num_options)?;
        for i in 0..self.num_options {
            write!(w, " {}", self.options[i])?;
        }
        if self.options[VBTOL_OPTION] == READ_VBTOL {
            write!(w, " {}", self.ampl_vbtol)?;
        }
        writeln!(w)?;
        writeln!(
            w,
            " {} {} {} {} {} {}",
            self.num_vars,
            self.num_algebraic_cons,
            self.num_objs,
            self.num_ranges,
            self.num_eqns,
            self.num_logical_cons
        )?;
        writeln!(
            w,
            " {} {} {} {} {} {}",
            self.num_nl_cons,
            self.num_nl_objs,
            self.num_compl_conds - self.num_nl_compl_conds,
            self.num_nl_compl_conds,
            self.num_compl_dbl_ineqs,
            self.num_compl_vars_with_nz_lb
        )?;
        writeln!(w, " {} {}", self.num_nl_net_cons, self.num_linear_net_cons)?;
        writeln!(
            w,
            " {} {} {}",
            self.num_nl_vars_in_cons, self.num_nl_vars_in_objs, self.num_nl_vars_in_both
        )?;
        let arith = if self.format == NlFormat::Text {
            0
        } else {
            self.arith_kind as i32
        };
        writeln!(
            w,
            " {} {} {} {}",
            self.num_linear_net_vars, self.num_funcs, arith, self.flags
        )?;
        writeln!(
            w,
            " {} {} {} {} {}",
            self.num_linear_binary_vars,
            self.num_linear_integer_vars,
            self.num_nl_integer_vars_in_both,
            self.num_nl_integer_vars_in_cons,
            self.num_nl_integer_vars_in_objs
        )?;
        writeln!(w, " {} {}", self.num_con_nonzeros, self.num_obj_nonzeros)?;
        writeln!(w, " {} {}", self.max_con_name_len, self.max_var_name_len)?;
        writeln!(
            w,
            " {} {} {} {} {}",
            self.num_common_exprs_in_both,
            self.num_common_exprs_in_cons,
            self.num_common_exprs_in_objs,
            self.num_common_exprs_in_single_cons,
            self.num_common_exprs_in_single_objs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_text_header() {
        let header = NlHeader {
            format: NlFormat::Text,
            num_options: 9,
            options: [2, 3, 5, 7, 11, 13, 17, 19, 23],
            ampl_vbtol: 1.23,
            num_vars: 29,
            num_algebraic_cons: 47,
            num_objs: 37,
            num_ranges: 41,
            num_eqns: 43,
            num_logical_cons: 31,
            num_nl_cons: 53,
            num_nl_objs: 59,
            num_compl_conds: 67 + 61,
            num_nl_compl_conds: 61,
            num_compl_dbl_ineqs: 71,
            num_compl_vars_with_nz_lb: 73,
            num_nl_net_cons: 79,
            num_linear_net_cons: 83,
            num_nl_vars_in_cons: 89,
            num_nl_vars_in_objs: 97,
            num_nl_vars_in_both: 101,
            num_linear_net_vars: 103,
            num_funcs: 107,
            arith_kind: ArithKind::IeeeLittleEndian,
            flags: 109,
            num_linear_binary_vars: 113,
            num_linear_integer_vars: 127,
            num_nl_integer_vars_in_both: 131,
            num_nl_integer_vars_in_cons: 137,
            num_nl_integer_vars_in_objs: 139,
            num_con_nonzeros: 149,
            num_obj_nonzeros: 151,
            max_con_name_len: 157,
            max_var_name_len: 163,
            num_common_exprs_in_both: 167,
            num_common_exprs_in_cons: 173,
            num_common_exprs_in_objs: 179,
            num_common_exprs_in_single_cons: 181,
            num_common_exprs_in_single_objs: 191,
        };
        assert_eq!(
            header.to_string(),
            "g9 2 3 5 7 11 13 17 19 23 1.23\n\
             \x20 29 47 37 41 43 31\n\
             \x20 53 59 67 61 71 73\n\
             \x20 79 83\n\
             \x20 89 97 101\n\
             \x20 103 107 0 109\n\
             \x20 113 127 131 137 139\n\
             \x20 149 151\n\
             \x20 157 163\n\
             \x20 167 173 179 181 191\n"
        );
    }

    #[test]
    fn test_write_binary_header() {
        let header = NlHeader {
            format: NlFormat::Binary,
            num_options: 3,
            options: [11, 22, 33, 0, 0, 0, 0, 0, 0],
            arith_kind: ArithKind::Cray,
            ..NlHeader::default()
        };
        assert_eq!(
            header.to_string(),
            "b3 11 22 33\n\
             \x20 0 0 0 0 0 0\n\
             \x20 0 0 0 0 0 0\n\
             \x20 0 0\n\
             \x20 0 0 0\n\
             \x20 0 0 5 0\n\
             \x20 0 0 0 0 0\n\
             \x20 0 0\n\
             \x20 0 0\n\
             \x20 0 0 0 0 0\n"
        );
    }

    #[test]
    fn test_counts() {
        let header = NlHeader {
            num_vars: 10,
            num_linear_binary_vars: 2,
            num_linear_integer_vars: 1,
            num_common_exprs_in_cons: 3,
            num_common_exprs_in_single_objs: 1,
            ..NlHeader::default()
        };
        assert_eq!(header.num_integer_vars(), 3);
        assert_eq!(header.num_continuous_vars(), 7);
        assert_eq!(header.num_common_exprs(), 4);
    }

    #[test]
    fn test_arith_kind_wire() {
        assert_eq!(ArithKind::from_wire(0), Some(ArithKind::Unknown));
        assert_eq!(ArithKind::from_wire(5), Some(ArithKind::Cray));
        assert_eq!(ArithKind::from_wire(6), None);
        assert!(ArithKind::IeeeBigEndian.is_ieee());
        assert!(!ArithKind::Cray.is_ieee());
        assert!(ArithKind::native().is_ieee());
    }
}
