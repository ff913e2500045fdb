//! .nl reader tests driven by a logging builder.
//!
//! `LogBuilder` renders every event it receives into a compact textual log,
//! so each test reads a small model and compares the log (or the error
//! rendering) against a golden string.

use std::fmt::Write as _;

use oxmp_core::builder::{
    ArgBuilder, ColumnSizeReceiver, LinearExprBuilder, PlArgBuilder, ProblemBuilder,
    SuffixValueReceiver,
};
use oxmp_core::common::{FuncType, ObjSense};
use oxmp_core::expr::ExprKind;
use oxmp_core::header::{ArithKind, NlFormat, NlHeader};
use oxmp_core::nl::read_nl_string;
use oxmp_core::{Problem, Result, read_nl_bytes};

/// Accumulates the arguments of one variadic construct.
#[derive(Default)]
struct Args {
    head: String,
    items: Vec<String>,
}

impl ArgBuilder<String> for Args {
    fn add_arg(&mut self, arg: String) {
        self.items.push(arg);
    }
}

struct PlArgs {
    breakpoints: Vec<f64>,
    slopes: Vec<f64>,
}

impl PlArgBuilder for PlArgs {
    fn add_slope(&mut self, slope: f64) {
        self.slopes.push(slope);
    }
    fn add_breakpoint(&mut self, breakpoint: f64) {
        self.breakpoints.push(breakpoint);
    }
}

struct LinearLog<'a> {
    buf: String,
    log: &'a mut String,
}

impl LinearExprBuilder for LinearLog<'_> {
    fn add_term(&mut self, var_index: i32, coef: f64) {
        if !self.buf.is_empty() {
            self.buf.push_str(" + ");
        }
        let _ = write!(self.buf, "{coef} * v{var_index}");
    }
}

impl Drop for LinearLog<'_> {
    fn drop(&mut self) {
        self.log.push_str(&self.buf);
        self.log.push(';');
    }
}

struct ColLog<'a> {
    log: &'a mut String,
}

impl ColumnSizeReceiver for ColLog<'_> {
    fn add(&mut self, size: i32) {
        let _ = write!(self.log, " {size}");
    }
}

impl Drop for ColLog<'_> {
    fn drop(&mut self) {
        self.log.push(';');
    }
}

struct SufLog<'a> {
    log: &'a mut String,
    first: bool,
}

impl SuffixValueReceiver for SufLog<'_> {
    fn set_int_value(&mut self, index: i32, value: i64) {
        if !self.first {
            self.log.push(',');
        }
        self.first = false;
        let _ = write!(self.log, " i{index} = {value}");
    }

    fn set_float_value(&mut self, index: i32, value: f64) {
        if !self.first {
            self.log.push(',');
        }
        self.first = false;
        let _ = write!(self.log, " d{index} = {value}");
    }
}

impl Drop for SufLog<'_> {
    fn drop(&mut self) {
        self.log.push(';');
    }
}

/// Builder rendering the event stream as text.
#[derive(Default)]
struct LogBuilder {
    header: NlHeader,
    log: String,
}

impl LogBuilder {
    fn sep(&mut self) {
        if !self.log.is_empty() {
            self.log.push(' ');
        }
    }

    fn write_bounds(&mut self, kind: char, index: i32, lb: f64, ub: f64) {
        self.sep();
        if lb != f64::NEG_INFINITY && lb != ub {
            let _ = write!(self.log, "{lb} <= ");
        }
        let _ = write!(self.log, "{kind}{index}");
        if lb == ub {
            let _ = write!(self.log, " = {ub}");
        } else if ub != f64::INFINITY {
            let _ = write!(self.log, " <= {ub}");
        }
        self.log.push(';');
    }

    fn args(head: impl Into<String>) -> Args {
        Args {
            head: head.into(),
            items: Vec::new(),
        }
    }

    fn joined(items: &[String]) -> String {
        items.join(", ")
    }
}

impl ProblemBuilder for LogBuilder {
    type Expr = String;
    type NumericExpr = String;
    type LogicalExpr = String;
    type CountExpr = String;
    type Variable = String;

    type NumericArgBuilder = Args;
    type LogicalArgBuilder = Args;
    type SymbolicArgBuilder = Args;
    type CallArgBuilder = Args;
    type PlTermBuilder = PlArgs;

    type LinearPartBuilder<'a> = LinearLog<'a>;
    type ColumnSizeHandler<'a> = ColLog<'a>;
    type SuffixHandler<'a> = SufLog<'a>;

    fn begin_build(&mut self, _stub: &str, header: &NlHeader, _flags: i32) -> Result<()> {
        self.header = header.clone();
        self.log.clear();
        Ok(())
    }

    fn set_obj(&mut self, index: i32, sense: ObjSense, expr: String) -> Result<()> {
        self.sep();
        let verb = if sense == ObjSense::Max {
            "maximize"
        } else {
            "minimize"
        };
        let _ = write!(self.log, "{verb} o{index}: {expr};");
        Ok(())
    }

    fn set_con(&mut self, index: i32, expr: String) -> Result<()> {
        self.sep();
        let _ = write!(self.log, "c{index}: {expr};");
        Ok(())
    }

    fn set_logical_con(&mut self, index: i32, expr: String) -> Result<()> {
        self.sep();
        let _ = write!(self.log, "l{index}: {expr};");
        Ok(())
    }

    fn set_common_expr(&mut self, index: i32, expr: String, position: i32) -> Result<()> {
        self.sep();
        let global = self.header.num_vars + index;
        let _ = write!(self.log, "v{global}/{position} = {expr};");
        Ok(())
    }

    fn set_complement(&mut self, con_index: i32, var_index: i32, flags: i32) -> Result<()> {
        self.sep();
        let _ = write!(self.log, "c{con_index} complements v{var_index} {flags};");
        Ok(())
    }

    fn linear_obj_builder(&mut self, obj_index: i32, num_terms: i32) -> Result<LinearLog<'_>> {
        self.sep();
        let _ = write!(self.log, "o{obj_index} {num_terms}: ");
        Ok(LinearLog {
            buf: String::new(),
            log: &mut self.log,
        })
    }

    fn linear_con_builder(&mut self, con_index: i32, num_terms: i32) -> Result<LinearLog<'_>> {
        self.sep();
        let _ = write!(self.log, "c{con_index} {num_terms}: ");
        Ok(LinearLog {
            buf: String::new(),
            log: &mut self.log,
        })
    }

    fn linear_var_builder(&mut self, var_index: i32, num_terms: i32) -> Result<LinearLog<'_>> {
        self.sep();
        let _ = write!(self.log, "v{var_index} {num_terms}: ");
        Ok(LinearLog {
            buf: String::new(),
            log: &mut self.log,
        })
    }

    fn set_var_bounds(&mut self, index: i32, lb: f64, ub: f64) -> Result<()> {
        self.write_bounds('v', index, lb, ub);
        Ok(())
    }

    fn set_con_bounds(&mut self, index: i32, lb: f64, ub: f64) -> Result<()> {
        self.write_bounds('c', index, lb, ub);
        Ok(())
    }

    fn set_initial_value(&mut self, var_index: i32, value: f64) -> Result<()> {
        self.sep();
        let _ = write!(self.log, "v{var_index} := {value};");
        Ok(())
    }

    fn set_initial_dual_value(&mut self, con_index: i32, value: f64) -> Result<()> {
        self.sep();
        let _ = write!(self.log, "c{con_index} := {value};");
        Ok(())
    }

    fn column_sizes(&mut self) -> Result<ColLog<'_>> {
        self.log.push_str("sizes:");
        Ok(ColLog { log: &mut self.log })
    }

    fn set_function(&mut self, index: i32, name: &str, num_args: i32, ty: FuncType) -> Result<()> {
        self.sep();
        let _ = write!(self.log, "f{index}: {name} {num_args} {};", ty as i32);
        Ok(())
    }

    fn add_suffix(&mut self, kind: i32, num_values: i32, name: &str) -> Result<SufLog<'_>> {
        self.sep();
        let _ = write!(self.log, "suffix {name}:{kind}:{num_values}:");
        Ok(SufLog {
            log: &mut self.log,
            first: true,
        })
    }

    fn make_numeric_constant(&mut self, value: f64) -> Result<String> {
        Ok(format!("{value}"))
    }

    fn make_variable(&mut self, index: i32) -> Result<String> {
        Ok(format!("v{index}"))
    }

    fn make_common_expr_ref(&mut self, index: i32) -> Result<String> {
        Ok(format!("v{}", self.header.num_vars + index))
    }

    fn make_unary(&mut self, kind: ExprKind, arg: String) -> Result<String> {
        Ok(format!("u{}({arg})", kind.opcode()))
    }

    fn make_binary(&mut self, kind: ExprKind, lhs: String, rhs: String) -> Result<String> {
        Ok(format!("b{}({lhs}, {rhs})", kind.opcode()))
    }

    fn make_if(&mut self, condition: String, then_expr: String, else_expr: String) -> Result<String> {
        Ok(format!("if {condition} then {then_expr} else {else_expr}"))
    }

    fn begin_pl_term(&mut self, num_breakpoints: i32) -> Result<PlArgs> {
        Ok(PlArgs {
            breakpoints: Vec::with_capacity(num_breakpoints as usize),
            slopes: Vec::new(),
        })
    }

    fn end_pl_term(&mut self, builder: PlArgs, var: String) -> Result<String> {
        let breakpoints: Vec<String> = builder.breakpoints.iter().map(f64::to_string).collect();
        let slopes: Vec<String> = builder.slopes.iter().map(f64::to_string).collect();
        Ok(format!(
            "<<{}; {}>> {var}",
            breakpoints.join(", "),
            slopes.join(", ")
        ))
    }

    fn begin_call(&mut self, func_index: i32, _num_args: i32) -> Result<Args> {
        Ok(Self::args(format!("f{func_index}")))
    }

    fn end_call(&mut self, builder: Args) -> Result<String> {
        Ok(format!("{}({})", builder.head, Self::joined(&builder.items)))
    }

    fn begin_iterated(&mut self, kind: ExprKind, _num_args: i32) -> Result<Args> {
        let head = if kind == ExprKind::Sum {
            "sum".to_string()
        } else {
            format!("v{}", kind.opcode())
        };
        Ok(Self::args(head))
    }

    fn end_iterated(&mut self, builder: Args) -> Result<String> {
        Ok(format!("{}({})", builder.head, Self::joined(&builder.items)))
    }

    fn begin_count(&mut self, _num_args: i32) -> Result<Args> {
        Ok(Self::args("count"))
    }

    fn end_count(&mut self, builder: Args) -> Result<String> {
        Ok(format!("count({})", Self::joined(&builder.items)))
    }

    fn begin_number_of(&mut self, _num_args: i32, value: String) -> Result<Args> {
        let mut args = Self::args("numberof");
        args.items.push(value);
        Ok(args)
    }

    fn end_number_of(&mut self, builder: Args) -> Result<String> {
        Ok(format!(
            "numberof {} in ({})",
            builder.items[0],
            Self::joined(&builder.items[1..])
        ))
    }

    fn begin_number_of_sym(&mut self, _num_args: i32, value: String) -> Result<Args> {
        let mut args = Self::args("numberof sym");
        args.items.push(value);
        Ok(args)
    }

    fn end_number_of_sym(&mut self, builder: Args) -> Result<String> {
        Ok(format!(
            "numberof sym {} in ({})",
            builder.items[0],
            Self::joined(&builder.items[1..])
        ))
    }

    fn make_logical_constant(&mut self, value: bool) -> Result<String> {
        Ok(format!("l{}", value as i32))
    }

    fn make_not(&mut self, arg: String) -> Result<String> {
        Ok(format!("not {arg}"))
    }

    fn make_binary_logical(&mut self, kind: ExprKind, lhs: String, rhs: String) -> Result<String> {
        Ok(format!("bl{}({lhs}, {rhs})", kind.opcode()))
    }

    fn make_relational(&mut self, kind: ExprKind, lhs: String, rhs: String) -> Result<String> {
        Ok(format!("r{}({lhs}, {rhs})", kind.opcode()))
    }

    fn make_logical_count(&mut self, kind: ExprKind, lhs: String, count: String) -> Result<String> {
        Ok(format!("lc{}({lhs}, {count})", kind.opcode()))
    }

    fn make_implication(
        &mut self,
        condition: String,
        then_expr: String,
        else_expr: String,
    ) -> Result<String> {
        Ok(format!("{condition} ==> {then_expr} else {else_expr}"))
    }

    fn begin_iterated_logical(&mut self, kind: ExprKind, _num_args: i32) -> Result<Args> {
        Ok(Self::args(format!("il{}", kind.opcode())))
    }

    fn end_iterated_logical(&mut self, builder: Args) -> Result<String> {
        Ok(format!("{}({})", builder.head, Self::joined(&builder.items)))
    }

    fn begin_pairwise(&mut self, kind: ExprKind, _num_args: i32) -> Result<Args> {
        Ok(Self::args(kind.name()))
    }

    fn end_pairwise(&mut self, builder: Args) -> Result<String> {
        Ok(format!("{}({})", builder.head, Self::joined(&builder.items)))
    }

    fn make_string_literal(&mut self, value: &[u8]) -> Result<String> {
        let text: String = value.iter().map(|&b| b as char).collect();
        Ok(format!("'{text}'"))
    }

    fn make_symbolic_if(
        &mut self,
        condition: String,
        then_expr: String,
        else_expr: String,
    ) -> Result<String> {
        Ok(format!("if {condition} then {then_expr} else {else_expr}"))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_header() -> NlHeader {
    NlHeader {
        num_vars: 5,
        num_objs: 6,
        num_algebraic_cons: 7,
        num_logical_cons: 8,
        num_funcs: 9,
        num_common_exprs_in_objs: 1,
        ..NlHeader::default()
    }
}

fn read_nl(body: &str) -> String {
    let input = format!("{}{body}", make_header());
    let mut builder = LogBuilder::default();
    read_nl_string(&input, &mut builder, "(input)").unwrap();
    builder.log
}

fn read_nl_err(body: &str) -> String {
    let input = format!("{}{body}", make_header());
    let mut builder = LogBuilder::default();
    read_nl_string(&input, &mut builder, "(input)")
        .unwrap_err()
        .to_string()
}

fn replace_line(header: &str, index: usize, line: &str) -> String {
    let mut lines: Vec<&str> = header.lines().collect();
    lines[index] = line;
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn read_header(input: &str) -> NlHeader {
    let mut builder = LogBuilder::default();
    read_nl_string(input, &mut builder, "(input)").unwrap();
    builder.header
}

fn read_header_line(index: usize, line: &str) -> NlHeader {
    read_header(&replace_line(&NlHeader::default().to_string(), index, line))
}

fn read_header_line_err(index: usize, line: &str) -> String {
    let input = replace_line(&NlHeader::default().to_string(), index, line);
    let mut builder = LogBuilder::default();
    read_nl_string(&input, &mut builder, "(input)")
        .unwrap_err()
        .to_string()
}

macro_rules! expect_read {
    ($expected:expr, $body:expr) => {
        assert_eq!($expected, read_nl($body))
    };
}

macro_rules! expect_read_error {
    ($body:expr, $error:expr) => {
        assert_eq!($error, read_nl_err($body))
    };
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

#[test]
fn invalid_format_specifier() {
    assert_eq!(
        read_header_line_err(0, "x"),
        "(input):1:1: expected format specifier"
    );
    assert_eq!(
        read_header_line_err(0, ""),
        "(input):1:1: expected format specifier"
    );
}

#[test]
fn invalid_num_options() {
    assert_eq!(read_header_line(0, "ga").num_options, 0);
    assert_eq!(read_header_line(0, "g-1").num_options, 0);
    assert_eq!(read_header_line_err(0, "g10"), "(input):1:2: too many options");
    assert_eq!(
        read_header_line_err(0, "g2147483648"),
        "(input):1:2: number is too big"
    );
}

#[test]
fn read_options() {
    let h = read_header_line(0, "g3 5 7");
    assert_eq!(h.num_options, 3);
    assert_eq!(&h.options[..4], &[5, 7, 0, 0]);
    let h = read_header_line(0, "g9 2 3 5 7 11 13 17 19 23");
    assert_eq!(h.num_options, 9);
    assert_eq!(h.options, [2, 3, 5, 7, 11, 13, 17, 19, 23]);
    assert_eq!(read_header_line(0, "g").num_options, 0);
}

#[test]
fn read_ampl_vbtol() {
    assert_eq!(read_header_line(0, "g2 0 3 4.2").ampl_vbtol, 4.2);
    assert_eq!(read_header_line(0, "g2 0 0 4.2").ampl_vbtol, 0.0);
    assert_eq!(read_header_line(0, "g2 0 3").ampl_vbtol, 0.0);
}

#[test]
fn missing_trailing_fields_default() {
    let h = read_header_line(1, " 1 2 3");
    assert_eq!((h.num_vars, h.num_algebraic_cons, h.num_objs), (1, 2, 3));
    assert_eq!(h.num_ranges, 0);
    assert_eq!(h.num_eqns, -1);
    assert_eq!(h.num_logical_cons, 0);
    let h = read_header_line(1, " 1 2 3 4 5 6");
    assert_eq!(h.num_eqns, 5);
    assert_eq!(h.num_logical_cons, 6);
}

#[test]
fn num_compl_dbl_ineqs_resets_when_subfields_incomplete() {
    assert_eq!(read_header_line(2, " 0 0 0 0 42").num_compl_dbl_ineqs, 42);
    let h = read_header_line(2, " 0 0 70 0 42");
    assert_eq!(h.num_compl_conds, 70);
    assert_eq!(h.num_compl_dbl_ineqs, -1);
}

#[test]
fn nl_vars_in_both_defaults_to_unknown() {
    let header = NlHeader::default().to_string();
    let input = replace_line(&replace_line(&header, 4, " 0 0"), 6, " 0 0");
    let h = read_header(&input);
    assert_eq!(h.num_nl_vars_in_both, -1);
    // With the old two-field line 5, line 7 carries only two fields too.
    assert_eq!(h.num_nl_integer_vars_in_both, 0);
}

#[test]
fn incomplete_header_lines() {
    assert_eq!(
        read_header_line_err(1, " 1 0"),
        "(input):2:5: expected unsigned integer"
    );
    for i in [2usize, 3, 4, 5, 7, 8] {
        let _ = read_header_line(i, " 0 0");
        assert_eq!(
            read_header_line_err(i, " 0"),
            format!("(input):{}:3: expected unsigned integer", i + 1)
        );
    }
    assert_eq!(
        read_header_line_err(6, " 0 0 0 0"),
        "(input):7:9: expected unsigned integer"
    );
    assert_eq!(
        read_header_line_err(9, " 0 0 0 0"),
        "(input):10:9: expected unsigned integer"
    );
}

#[test]
fn read_arith_kind() {
    assert_eq!(read_header_line(5, " 0 0").format, NlFormat::Text);
    assert_eq!(read_header_line(5, " 0 0 0").format, NlFormat::Text);
    assert_eq!(read_header_line(5, " 0 0 5").format, NlFormat::Text);
    assert_eq!(
        read_header_line_err(5, " 0 0 6"),
        "(input):6:6: unknown floating-point arithmetic kind"
    );
}

#[test]
fn binary_arith_kind_selects_swapping() {
    let native = ArithKind::native() as i32;
    let other = 3 - native;
    let header = NlHeader {
        format: NlFormat::Binary,
        ..NlHeader::default()
    }
    .to_string();
    let h = read_header(&replace_line(&header, 5, &format!(" 0 0 {native}")));
    assert_eq!(h.format, NlFormat::Binary);
    let h = read_header(&replace_line(&header, 5, &format!(" 0 0 {other}")));
    assert_eq!(h.format, NlFormat::BinarySwapped);
    let err = {
        let input = replace_line(&header, 5, " 0 0 5");
        let mut builder = LogBuilder::default();
        read_nl_string(&input, &mut builder, "(input)").unwrap_err()
    };
    assert_eq!(err.to_string(), "(input):6:6: unrecognized binary format");
}

#[test]
fn header_integer_overflow() {
    let cases = [
        ("num_common_exprs_in_both", 2),
        ("num_common_exprs_in_cons", 4),
        ("num_common_exprs_in_objs", 6),
        ("num_common_exprs_in_single_cons", 8),
        ("num_common_exprs_in_single_objs", 10),
    ];
    for (field, column) in cases {
        let mut h = NlHeader {
            num_vars: i32::MAX,
            ..NlHeader::default()
        };
        match field {
            "num_common_exprs_in_both" => h.num_common_exprs_in_both = 1,
            "num_common_exprs_in_cons" => h.num_common_exprs_in_cons = 1,
            "num_common_exprs_in_objs" => h.num_common_exprs_in_objs = 1,
            "num_common_exprs_in_single_cons" => h.num_common_exprs_in_single_cons = 1,
            _ => h.num_common_exprs_in_single_objs = 1,
        }
        let mut builder = LogBuilder::default();
        let err = read_nl_string(&h.to_string(), &mut builder, "in").unwrap_err();
        assert_eq!(err.to_string(), format!("in:10:{column}: integer overflow"));
    }
}

#[test]
fn header_round_trip() {
    let h = make_header();
    assert_eq!(read_header(&h.to_string()), h);
    let h = NlHeader {
        num_options: 3,
        options: [1, 3, 5, 0, 0, 0, 0, 0, 0],
        ampl_vbtol: 2.5,
        num_vars: 11,
        num_algebraic_cons: 4,
        num_objs: 2,
        num_ranges: 1,
        num_eqns: 1,
        num_logical_cons: 3,
        num_nl_cons: 2,
        num_linear_binary_vars: 1,
        num_con_nonzeros: 17,
        max_var_name_len: 9,
        num_common_exprs_in_single_objs: 2,
        ..NlHeader::default()
    };
    assert_eq!(read_header(&h.to_string()), h);
}

#[test]
fn no_newline_at_eof() {
    let input = "g\n 1 1 0\n 0 0\n 0 0\n 0 0 0\n 0 0 0 1\n 0 0 0 0 0\n 0 0\n 0 0\n 0 0 0 0 0\nk0\0deadbeef";
    let mut builder = LogBuilder::default();
    let err = read_nl_string(input, &mut builder, "(input)").unwrap_err();
    assert_eq!(err.to_string(), "(input):11:3: expected newline");
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[test]
fn read_obj_senses_and_bounds() {
    expect_read!("minimize o1: 0;", "O1 0\nn0\n");
    expect_read!("maximize o0: v0;", "O0 1\nv0\n");
    expect_read!("maximize o5: v0;", "O5 10\nv0\n");
    expect_read_error!("O0 -1\nn0\n", "(input):11:4: expected unsigned integer");
    expect_read_error!("O-1 0\nn0\n", "(input):11:2: expected unsigned integer");
    expect_read_error!("O6 0\nn0\n", "(input):11:2: integer 6 out of bounds");
}

#[test]
fn read_numeric_constants() {
    expect_read!("c0: 4.2;", "C0\nn4.2\n");
    expect_read!("c0: -100;", "C0\nn-1e+2\n");
    // Short and long constants are integers; residue is discarded at the
    // end of the record.
    expect_read!("c0: 4;", "C0\ns4.2\n");
    expect_read!("c0: 4;", "C0\nl4.2\n");
    expect_read!("c0: -32768;", "C0\ns-32768\n");
    expect_read!("c0: 32767;", "C0\ns32767\n");
    expect_read_error!("C0\ns32768\n", "(input):12:2: number is too big");
    expect_read!("c0: 123456789012;", "C0\nl123456789012\n");
    expect_read_error!(
        "C0\nl9223372036854775808\n",
        "(input):12:2: number is too big"
    );
}

#[test]
fn read_variable_and_common_expr_refs() {
    expect_read!("c0: v4;", "C0\nv4\n");
    // Index 5 is the first common expression.
    expect_read!("c0: v5;", "C0\nv5\n");
    expect_read_error!("C0\nv-1\n", "(input):12:2: expected unsigned integer");
    expect_read_error!("C0\nv6\n", "(input):12:2: integer 6 out of bounds");
}

#[test]
fn read_unary_expr() {
    expect_read!("c0: u13(v3);", "C0\no13\nv3\n");
}

#[test]
fn read_binary_expr() {
    expect_read!("c0: b0(v1, 42);", "C0\no0\nv1\nn42\n");
}

#[test]
fn read_if_expr() {
    expect_read!("c0: if l1 then v1 else v2;", "C0\no35\nn1\nv1\nv2\n");
}

#[test]
fn read_piecewise_linear_expr() {
    expect_read!("c0: <<0; -1, 1>> v1;", "C0\no64\n2\nn-1.0\ns0\nl1\nv1\n");
    expect_read_error!(
        "C0\no64\n-1\nn0\nv1\n",
        "(input):13:1: expected unsigned integer"
    );
    expect_read_error!(
        "C0\no64\n1\nn0\nv1\n",
        "(input):13:1: too few slopes in piecewise-linear term"
    );
    expect_read_error!(
        "C0\no64\n2\nv1\nn0\nn1\nv1\n",
        "(input):14:1: expected constant"
    );
    expect_read_error!(
        "C0\no64\n2\nn-1\nv0\nn1\nv1\n",
        "(input):15:1: expected constant"
    );
    expect_read_error!(
        "C0\no64\n2\nn-1\nn0\nn1\nn1\n",
        "(input):17:1: expected variable"
    );
}

#[test]
fn read_call_expr() {
    expect_read!("f1: f 2 1; c0: f1(v1, 0);", "F1 1 2 f\nC0\nf1 2\nv1\nn0\n");
    expect_read_error!("C0\nf-1 1\nn0\n", "(input):12:2: expected unsigned integer");
    expect_read_error!("C0\nf10 1\nn0\n", "(input):12:2: integer 10 out of bounds");
    expect_read_error!(
        "F1 1 2 f\nC0\nf1 2\nx\n",
        "(input):14:1: expected expression"
    );
}

#[test]
fn undeclared_function_is_rejected() {
    let header = NlHeader {
        num_vars: 2,
        num_algebraic_cons: 1,
        num_funcs: 2,
        ..NlHeader::default()
    };
    let input = format!("{header}C0\nf1 2\nv0\nn0\n");
    let mut problem = Problem::new();
    let err = read_nl_string(&input, &mut problem, "(input)").unwrap_err();
    assert_eq!(err.to_string(), "unsupported: call to undeclared function 1");
}

#[test]
fn read_vararg_expr() {
    expect_read!("c0: v11(v4, 5, v1);", "C0\no11\n3\nv4\nn5\nv1\n");
    expect_read!("c0: v12(v4);", "C0\no12\n1\nv4\n");
    expect_read_error!("C0\no12\n0\n", "(input):13:1: too few arguments");
}

#[test]
fn read_sum_expr() {
    expect_read!("c0: sum(v4, 5, v1);", "C0\no54\n3\nv4\nn5\nv1\n");
    expect_read_error!("C0\no54\n2\nv4\nn5\n", "(input):13:1: too few arguments");
}

#[test]
fn read_count_expr() {
    expect_read!(
        "c0: count(l1, r24(v1, 42), l0);",
        "C0\no59\n3\nn1\no24\nv1\nn42\nn0\n"
    );
    expect_read!("c0: count(l1);", "C0\no59\n1\nn1\n");
    expect_read_error!("C0\no59\n0\n", "(input):13:1: too few arguments");
}

#[test]
fn read_number_of_expr() {
    expect_read!("c0: numberof v4 in (5, v1);", "C0\no60\n3\nv4\nn5\nv1\n");
    expect_read!("c0: numberof v4 in ();", "C0\no60\n1\nv4\n");
    expect_read_error!("C0\no60\n0\n", "(input):13:1: too few arguments");
}

#[test]
fn read_symbolic_number_of_expr() {
    expect_read!(
        "f0: f -1 1; c0: numberof sym 'a' in (v0, 'b');",
        "F0 1 -1 f\nC0\no61\n3\nh1:a\nv0\nh1:b\n"
    );
}

#[test]
fn read_logical_constant() {
    expect_read!("l0: l0;", "L0\nn0\n");
    expect_read!("l0: l1;", "L0\nn1\n");
    expect_read!("l0: l1;", "L0\nn4.2\n");
    expect_read!("l0: l1;", "L0\ns1\n");
    expect_read!("l0: l1;", "L0\nl1\n");
}

#[test]
fn read_not_expr() {
    expect_read!("l0: not l0;", "L0\no34\nn0\n");
}

#[test]
fn read_binary_logical_expr() {
    expect_read!("l0: bl20(l1, l0);", "L0\no20\nn1\nn0\n");
}

#[test]
fn read_relational_expr() {
    expect_read!("l0: r23(v1, 0);", "L0\no23\nv1\nn0\n");
}

#[test]
fn read_logical_count_expr() {
    expect_read!("l0: lc63(v1, count(l1));", "L0\no63\nv1\no59\n1\nn1\n");
    expect_read_error!(
        "L0\no63\nv1\nn0\n",
        "(input):14:1: expected count expression"
    );
    expect_read_error!(
        "L0\no63\nv1\no16\nn0\n",
        "(input):14:2: expected count expression opcode"
    );
}

#[test]
fn read_implication_expr() {
    expect_read!("l0: l1 ==> l0 else l1;", "L0\no72\nn1\nn0\nn1\n");
}

#[test]
fn read_iterated_logical_expr() {
    expect_read!("l0: il71(l1, l0, l1);", "L0\no71\n3\nn1\nn0\nn1\n");
    expect_read_error!("L0\no71\n2\nn1\nn0\n", "(input):13:1: too few arguments");
}

#[test]
fn read_pairwise_exprs() {
    expect_read!("l0: alldiff(v4, 5, v1);", "L0\no74\n3\nv4\nn5\nv1\n");
    expect_read!("l0: !alldiff(v4, 5, v1);", "L0\no82\n3\nv4\nn5\nv1\n");
    expect_read_error!("L0\no74\n2\nv4\nn5\n", "(input):13:1: too few arguments");
}

#[test]
fn read_string_literal() {
    expect_read!("f1: f 1 1; c0: f1('');", "F1 1 1 f\nC0\nf1 1\nh0:\n");
    expect_read!("f1: f 1 1; c0: f1('abc');", "F1 1 1 f\nC0\nf1 1\nh3:abc\n");
    expect_read!("f1: f 1 1; c0: f1('ab\nc');", "F1 1 1 f\nC0\nf1 1\nh4:ab\nc\n");
    let body = "F1 1 1 f\nC0\nf1 1\nh5:ab\0c\n\n";
    assert_eq!(read_nl(body), "f1: f 1 1; c0: f1('ab\0c\n');");
    expect_read_error!(
        "F1 1 1 f\nC0\nf1 1\nh3:ab",
        "(input):14:6: unexpected end of file in string"
    );
    expect_read_error!(
        "F1 1 1 f\nC0\nf1 1\nh3:abc",
        "(input):14:7: expected newline"
    );
    expect_read_error!(
        "F1 1 1 f\nC0\nf1 1\nh3:ab\n",
        "(input):15:1: expected newline"
    );
}

#[test]
fn read_invalid_opcodes() {
    expect_read_error!("C0\no-1\n", "(input):12:2: expected unsigned integer");
    expect_read_error!("C0\no83\n", "(input):12:2: invalid opcode 83");
    expect_read_error!("C0\no36\n", "(input):12:2: invalid opcode 36");
}

#[test]
fn read_invalid_numeric_expr() {
    expect_read_error!("C0\nx\n", "(input):12:1: expected expression");
    expect_read_error!(
        "C0\no22\nv1\nn0\n",
        "(input):12:2: expected numeric expression opcode"
    );
}

#[test]
fn read_invalid_logical_expr() {
    expect_read_error!("L0\nx\n", "(input):12:1: expected logical expression");
    expect_read_error!(
        "L0\no0\nv1\nn0\n",
        "(input):12:2: expected logical expression opcode"
    );
}

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

#[test]
fn read_var_bounds() {
    expect_read!(
        "1.1 <= v0; v1 <= 22; v2 = 33; v3; 44 <= v4 <= 55;",
        "b\n2 1.1\n1 22\n4 33\n3\n0 44 55\n"
    );
    expect_read_error!("b\n-1\n", "(input):12:1: expected unsigned integer");
    expect_read_error!("b\n5 1\n", "(input):12:1: invalid bound type");
    expect_read_error!(
        "b\n2 11\n1 22\n4 33\n3\n",
        "(input):16:1: expected unsigned integer"
    );
}

#[test]
fn read_con_bounds_and_complements() {
    expect_read!(
        "1.1 <= c0; c1 <= 22; c2 = 33; c3; 44 <= c4 <= 55; \
         c5 complements v1 3; c6 complements v4 2;",
        "r\n2 1.1\n1 22\n4 33\n3\n0 44 55\n5 7 2\n5 2 5\n"
    );
    expect_read_error!("r\n-1\n", "(input):12:1: expected unsigned integer");
    expect_read_error!("r\n6 1\n", "(input):12:1: invalid bound type");
    expect_read_error!("r\n5 1 0\n", "(input):12:5: integer 0 out of bounds");
    expect_read_error!("r\n5 1 6\n", "(input):12:5: integer 6 out of bounds");
}

#[test]
fn complement_with_largest_var_index() {
    let header = NlHeader {
        num_vars: i32::MAX,
        num_algebraic_cons: 1,
        ..NlHeader::default()
    };
    let input = format!("{header}r\n5 1 {}\n", i32::MAX);
    let mut builder = LogBuilder::default();
    read_nl_string(&input, &mut builder, "(input)").unwrap();
    assert_eq!(
        builder.log,
        format!("c0 complements v{} 1;", i32::MAX - 1)
    );
}

#[test]
fn read_linear_obj_expr() {
    expect_read!("o0 2: 1.3 * v1 + 5 * v3;", "G0 2\n1 1.3\n3 5\n");
    expect_read!(
        "o5 5: 1 * v1 + 1 * v2 + 1 * v3 + 1 * v4 + 1 * v5;",
        "G5 5\n1 1\n2 1\n3 1\n4 1\n5 1\n"
    );
    expect_read_error!("G-1", "(input):11:2: expected unsigned integer");
    expect_read_error!("G6", "(input):11:2: integer 6 out of bounds");
    expect_read_error!("G0 0", "(input):11:4: integer 0 out of bounds");
    expect_read_error!("G0 6", "(input):11:4: integer 6 out of bounds");
    expect_read_error!("G0 1\n-1 0\n", "(input):12:1: expected unsigned integer");
    expect_read_error!("G0 1\n6 0\n", "(input):12:1: integer 6 out of bounds");
}

#[test]
fn read_linear_con_expr() {
    expect_read!("c0 2: 1.3 * v1 + 5 * v3;", "J0 2\n1 1.3\n3 5\n");
    expect_read_error!("J8", "(input):11:2: integer 8 out of bounds");
    expect_read_error!("J0 0", "(input):11:4: integer 0 out of bounds");
    expect_read_error!("J0 1\n6 0\n", "(input):12:1: integer 6 out of bounds");
}

#[test]
fn read_column_sizes() {
    expect_read!("sizes: 1 2 2 4;", "k4\n1\n3\n5\n9\n");
    expect_read!("sizes: 1 2 2 4;", "K4\n1\n2\n2\n4\n");
    expect_read_error!("k3\n", "(input):11:2: expected 4");
    expect_read_error!("k4\n-1\n", "(input):12:1: expected unsigned integer");
    expect_read_error!("k4\n2\n1\n", "(input):13:1: invalid column offset");
}

#[test]
fn read_initial_values() {
    expect_read!(
        "v4 := 1.1; v3 := 0; v2 := 1; v1 := 2; v0 := 3;",
        "x5\n4 1.1\n3 0\n2 1\n1 2\n0 3\n"
    );
    expect_read_error!("x6\n", "(input):11:2: too many initial values");
    expect_read_error!("x1\n-1 0\n", "(input):12:1: expected unsigned integer");
    expect_read_error!("x1\n5 0\n", "(input):12:1: integer 5 out of bounds");
    expect_read_error!("x2\n4 1.1\n\n", "(input):13:1: expected unsigned integer");
}

#[test]
fn read_initial_dual_values() {
    expect_read!(
        "c4 := 1.1; c3 := 0; c2 := 1; c1 := 2; c0 := 3; c5 := 1; c6 := 2;",
        "d7\n4 1.1\n3 0\n2 1\n1 2\n0 3\n5 1\n6 2\n"
    );
    expect_read_error!("d8\n", "(input):11:2: too many initial values");
    expect_read_error!("d1\n-1 0\n", "(input):12:1: expected unsigned integer");
    expect_read_error!("d1\n7 0\n", "(input):12:1: integer 7 out of bounds");
}

#[test]
fn read_function_decls() {
    expect_read!("f0: foo 2 1;", "F0 1 2 foo\n");
    expect_read!("f0: foo -1 0;", "F0 0 -1 foo\n");
    expect_read_error!("F0 1 2 \n", "(input):11:8: expected name");
    expect_read_error!("F-1 0 0 f\n", "(input):11:2: expected unsigned integer");
    expect_read_error!("F9 0 0 f\n", "(input):11:2: integer 9 out of bounds");
    expect_read_error!("F0 -1 0 f\n", "(input):11:4: expected unsigned integer");
    expect_read_error!("F0 2 0 f\n", "(input):11:4: invalid function type");
}

#[test]
fn read_defined_vars() {
    expect_read!("v5/1 = b2(v0, 42);", "V5 0 1\no2\nv0\nn42\n");
    expect_read!("v5 2: 2 * v1 + 3 * v0; v5/1 = 0;", "V5 2 1\n1 2.0\n0 3\nn0\n");
    expect_read_error!("V4 0 1\nv0\n", "(input):11:2: integer 4 out of bounds");
    expect_read_error!("V6 0 1\nv0\n", "(input):11:2: integer 6 out of bounds");
}

#[test]
fn read_suffix_segment() {
    expect_read!(
        "suffix foo:0:5: i0 = 3, i1 = 2, i2 = 1, i3 = 2, i4 = 3;",
        "S0 5 foo\n0 3\n1 2\n2 1\n3 2\n4 3\n"
    );
    expect_read!("suffix bar:4:2: d0 = 1.5, d2 = -2;", "S4 2 bar\n0 1.5\n2 -2\n");
    expect_read_error!("S-1 1 foo\n", "(input):11:2: expected unsigned integer");
    expect_read_error!("S8 1 foo\n", "(input):11:2: invalid suffix kind");
    expect_read_error!("S0 0 foo\n", "(input):11:4: integer 0 out of bounds");
    expect_read_error!("S0 6 foo\n", "(input):11:4: integer 6 out of bounds");
}

#[test]
fn invalid_segment_type() {
    expect_read_error!("Q\n", "(input):11:1: invalid segment type");
}

// ---------------------------------------------------------------------------
// Binary bodies
// ---------------------------------------------------------------------------

fn binary_header(num_vars: i32, num_algebraic_cons: i32, num_objs: i32) -> NlHeader {
    NlHeader {
        format: NlFormat::Binary,
        num_vars,
        num_algebraic_cons,
        num_objs,
        ..NlHeader::default()
    }
}

struct BinaryBody {
    bytes: Vec<u8>,
    swap: bool,
}

impl BinaryBody {
    fn new(header: &NlHeader, swap: bool) -> Self {
        BinaryBody {
            bytes: header.to_string().into_bytes(),
            swap,
        }
    }

    fn push(&mut self, mut value: Vec<u8>) {
        if self.swap {
            value.reverse();
        }
        self.bytes.extend_from_slice(&value);
    }

    fn tag(&mut self, tag: u8) -> &mut Self {
        self.bytes.push(tag);
        self
    }

    fn int(&mut self, value: i32) -> &mut Self {
        self.push(value.to_ne_bytes().to_vec());
        self
    }

    fn double(&mut self, value: f64) -> &mut Self {
        self.push(value.to_ne_bytes().to_vec());
        self
    }
}

#[test]
fn binary_body_matches_text_events() {
    let header = binary_header(2, 1, 1);
    let mut body = BinaryBody::new(&header, false);
    body.tag(b'O').int(0).int(0);
    body.tag(b'n').double(0.0);
    body.tag(b'C').int(0);
    body.tag(b'o').int(16);
    body.tag(b'v').int(1);
    body.tag(b'r').int(1).double(0.0);
    let mut builder = LogBuilder::default();
    read_nl_bytes(&body.bytes, &mut builder, "(input)").unwrap();
    assert_eq!(builder.log, "minimize o0: 0; c0: u16(v1); c0 <= 0;");
}

#[test]
fn binary_swapped_body_round_trips() {
    let other = if cfg!(target_endian = "little") {
        ArithKind::IeeeBigEndian
    } else {
        ArithKind::IeeeLittleEndian
    };
    let header = NlHeader {
        arith_kind: other,
        ..binary_header(1, 1, 0)
    };
    let mut body = BinaryBody::new(&header, true);
    body.tag(b'C').int(0);
    body.tag(b'o').int(16);
    body.tag(b'v').int(0);
    let mut builder = LogBuilder::default();
    read_nl_bytes(&body.bytes, &mut builder, "(input)").unwrap();
    assert_eq!(builder.log, "c0: u16(v0);");
}

// ---------------------------------------------------------------------------
// End-to-end scenarios against the Problem sink
// ---------------------------------------------------------------------------

#[test]
fn trivial_variable_model() {
    let header = NlHeader {
        num_vars: 1,
        ..NlHeader::default()
    };
    let mut problem = Problem::new();
    read_nl_string(&header.to_string(), &mut problem, "(input)").unwrap();
    assert_eq!(problem.num_vars(), 1);
    assert_eq!(problem.num_objs(), 0);
    assert_eq!(problem.num_algebraic_cons(), 0);
    let v = problem.var(0);
    assert_eq!(v.lb, f64::NEG_INFINITY);
    assert_eq!(v.ub, f64::INFINITY);
    assert_eq!(v.ty, oxmp_core::VarType::Continuous);
}

#[test]
fn linear_objective_model() {
    let header = NlHeader {
        num_vars: 3,
        num_objs: 1,
        ..NlHeader::default()
    };
    let input = format!("{header}O0 0\nn0\nG0 2\n0 1.5\n2 -2\n");
    let mut problem = Problem::new();
    read_nl_string(&input, &mut problem, "(input)").unwrap();
    let obj = problem.obj(0);
    assert_eq!(obj.sense, ObjSense::Min);
    assert_eq!(obj.linear, vec![(0, 1.5), (2, -2.0)]);
    assert!(obj.nonlinear.is_none());
}

#[test]
fn builder_call_counts_match_header() {
    // A model declaring two objectives and two constraints produces exactly
    // two objective events and two constraint-bound events, in input order.
    let header = NlHeader {
        num_vars: 2,
        num_objs: 2,
        num_algebraic_cons: 2,
        ..NlHeader::default()
    };
    let input = format!("{header}O0 0\nn0\nO1 1\nv1\nr\n1 0\n4 2\n");
    let mut builder = LogBuilder::default();
    read_nl_string(&input, &mut builder, "(input)").unwrap();
    assert_eq!(
        builder.log,
        "minimize o0: 0; maximize o1: v1; c0 <= 0; c1 = 2;"
    );
}

#[test]
fn reject_all_builder_surfaces_unsupported() {
    let header = NlHeader {
        num_vars: 1,
        num_objs: 1,
        ..NlHeader::default()
    };
    let input = format!("{header}O0 0\nn0\n");
    let mut builder = oxmp_core::NullBuilder;
    let err = read_nl_string(&input, &mut builder, "(input)").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unsupported: numeric constant in nonlinear expression"
    );
}
