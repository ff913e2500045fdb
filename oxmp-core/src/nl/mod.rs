//! Streaming .nl reader.
//!
//! The reader consumes one .nl byte stream and pushes build events into a
//! [`ProblemBuilder`]: a `begin_build` / `end_build` bracket around header,
//! bounds, linear parts, expression trees, suffixes and metadata, in input
//! order. The ten header lines are always text; the body is text or binary
//! according to the format tag, with byte-swapped decoding when the header
//! advertises the complementary IEEE arithmetic.
//!
//! Errors never recover: the first malformed token aborts the read with a
//! `file:line:column` diagnostic, and end of input anywhere but a record
//! boundary is fatal.

mod scan;

use std::path::Path;

use tracing::debug;

use crate::builder::{
    ArgBuilder, ColumnSizeReceiver, LinearExprBuilder, PlArgBuilder, ProblemBuilder,
    SuffixValueReceiver,
};
use crate::common::{FuncType, ObjSense, comp, suf};
use crate::error::{NlError, Result, SourceLocation};
use crate::expr::{ExprKind, kind_from_opcode};
use crate::header::{ArithKind, MAX_NL_OPTIONS, NlFormat, NlHeader, READ_VBTOL, VBTOL_OPTION};
use scan::{BinaryScanner, Scanner, TextScanner};

/// Read a .nl model from a string, pushing events into `builder`.
///
/// `name` appears in error locations; the stub passed to
/// [`ProblemBuilder::begin_build`] is `name` without a `.nl` extension.
pub fn read_nl_string<B: ProblemBuilder>(data: &str, builder: &mut B, name: &str) -> Result<()> {
    read_nl_bytes(data.as_bytes(), builder, name)
}

/// Read a .nl model from raw bytes, pushing events into `builder`.
pub fn read_nl_bytes<B: ProblemBuilder>(data: &[u8], builder: &mut B, name: &str) -> Result<()> {
    let mut scanner = TextScanner::new(data, name);
    let (header, num_vars_and_exprs) = read_header(&mut scanner)?;
    let stub = name.strip_suffix(".nl").unwrap_or(name);
    debug!(
        format = ?header.format,
        num_vars = header.num_vars,
        num_algebraic_cons = header.num_algebraic_cons,
        num_objs = header.num_objs,
        "reading {stub}"
    );
    builder.begin_build(stub, &header, header.flags)?;
    match header.format {
        NlFormat::Text => {
            BodyParser::new(scanner, &mut *builder, &header, num_vars_and_exprs).run()?;
        }
        NlFormat::Binary | NlFormat::BinarySwapped => {
            let swap = header.format == NlFormat::BinarySwapped;
            let binary = BinaryScanner::new(data, name, scanner.offset(), swap);
            BodyParser::new(binary, &mut *builder, &header, num_vars_and_exprs).run()?;
        }
    }
    builder.end_build()
}

/// Read a .nl model from a file.
pub fn read_nl_file<B: ProblemBuilder, P: AsRef<Path>>(path: P, builder: &mut B) -> Result<()> {
    let path = path.as_ref();
    let name = path.to_string_lossy().into_owned();
    let data = std::fs::read(path).map_err(|source| NlError::Io {
        file: name.clone(),
        source,
    })?;
    read_nl_bytes(&data, builder, &name)
}

/// Parse the ten header lines, returning the header and the checked sum
/// `num_vars + num_common_exprs()`.
fn read_header(s: &mut TextScanner<'_>) -> Result<(NlHeader, i32)> {
    let mut h = NlHeader::default();

    // Line 1: format tag, options, optional vbtol.
    match s.read_char() {
        Some(b'g') => h.format = NlFormat::Text,
        Some(b'b') => h.format = NlFormat::Binary,
        _ => return Err(s.error(s.token_loc(), "expected format specifier")),
    }
    if let Some(n) = s.read_opt_uint()? {
        if n as usize > MAX_NL_OPTIONS {
            return Err(s.error(s.token_loc(), "too many options"));
        }
        h.num_options = n as usize;
    }
    for i in 0..h.num_options {
        match s.read_opt_int()? {
            Some(v) => h.options[i] = v,
            None => break,
        }
    }
    if h.options[VBTOL_OPTION] == READ_VBTOL
        && let Some(v) = s.read_opt_double()?
    {
        h.ampl_vbtol = v;
    }
    s.read_till_end_of_line()?;

    // Line 2: problem dimensions.
    h.num_vars = s.read_uint()?;
    h.num_algebraic_cons = s.read_uint()?;
    h.num_objs = s.read_uint()?;
    h.num_eqns = -1;
    if let Some(ranges) = s.read_opt_uint()? {
        h.num_ranges = ranges;
        if let Some(eqns) = s.read_opt_uint()? {
            h.num_eqns = eqns;
            if let Some(logical) = s.read_opt_uint()? {
                h.num_logical_cons = logical;
            }
        }
    }
    s.read_till_end_of_line()?;

    // Line 3: nonlinear and complementarity counts.
    h.num_nl_cons = s.read_uint()?;
    h.num_nl_objs = s.read_uint()?;
    let mut all_compl = false;
    if let Some(compl_conds) = s.read_opt_uint()? {
        h.num_compl_conds = compl_conds;
        if let Some(nl_compl) = s.read_opt_uint()? {
            h.num_nl_compl_conds = nl_compl;
            if let Some(dbl) = s.read_opt_uint()? {
                h.num_compl_dbl_ineqs = dbl;
                if let Some(nz_lb) = s.read_opt_uint()? {
                    h.num_compl_vars_with_nz_lb = nz_lb;
                    all_compl = true;
                }
            }
        }
    }
    h.num_compl_conds += h.num_nl_compl_conds;
    if h.num_compl_conds > 0 && !all_compl {
        h.num_compl_dbl_ineqs = -1;
    }
    s.read_till_end_of_line()?;

    // Line 4: network constraints.
    h.num_nl_net_cons = s.read_uint()?;
    h.num_linear_net_cons = s.read_uint()?;
    s.read_till_end_of_line()?;

    // Line 5: nonlinear variables; the third field appeared in 1993.
    h.num_nl_vars_in_cons = s.read_uint()?;
    h.num_nl_vars_in_objs = s.read_uint()?;
    h.num_nl_vars_in_both = s.read_opt_uint()?.unwrap_or(-1);
    s.read_till_end_of_line()?;

    // Line 6: linear network variables, functions, arithmetic kind, flags.
    h.num_linear_net_vars = s.read_uint()?;
    h.num_funcs = s.read_uint()?;
    if let Some(arith) = s.read_opt_uint()? {
        let loc = s.token_loc();
        let Some(kind) = ArithKind::from_wire(arith) else {
            return Err(s.error(loc, "unknown floating-point arithmetic kind"));
        };
        h.arith_kind = kind;
        if h.format != NlFormat::Text && kind != ArithKind::Unknown && kind != ArithKind::native() {
            if kind.is_ieee() {
                h.format = NlFormat::BinarySwapped;
            } else {
                return Err(s.error(loc, "unrecognized binary format"));
            }
        }
        if let Some(flags) = s.read_opt_uint()? {
            h.flags = flags;
        }
    }
    s.read_till_end_of_line()?;

    // Line 7: discrete variables. The nonlinear integer counts are only
    // present when line 5 carried its third field.
    h.num_linear_binary_vars = s.read_uint()?;
    h.num_linear_integer_vars = s.read_uint()?;
    if h.num_nl_vars_in_both >= 0 {
        h.num_nl_integer_vars_in_both = s.read_uint()?;
        h.num_nl_integer_vars_in_cons = s.read_uint()?;
        h.num_nl_integer_vars_in_objs = s.read_uint()?;
    }
    s.read_till_end_of_line()?;

    // Line 8: nonzero counts.
    h.num_con_nonzeros = i64::from(s.read_uint()?);
    h.num_obj_nonzeros = i64::from(s.read_uint()?);
    s.read_till_end_of_line()?;

    // Line 9: name lengths.
    h.max_con_name_len = s.read_uint()?;
    h.max_var_name_len = s.read_uint()?;
    s.read_till_end_of_line()?;

    // Line 10: common expressions, with checked accumulation of the
    // variable index space.
    let mut total = h.num_vars;
    let mut read_field = |s: &mut TextScanner<'_>, total: &mut i32| -> Result<i32> {
        let v = s.read_uint()?;
        *total = total
            .checked_add(v)
            .ok_or_else(|| NlError::overflow(s.file_name(), s.token_loc()))?;
        Ok(v)
    };
    h.num_common_exprs_in_both = read_field(s, &mut total)?;
    h.num_common_exprs_in_cons = read_field(s, &mut total)?;
    h.num_common_exprs_in_objs = read_field(s, &mut total)?;
    h.num_common_exprs_in_single_cons = read_field(s, &mut total)?;
    h.num_common_exprs_in_single_objs = read_field(s, &mut total)?;
    s.read_till_end_of_line()?;

    Ok((h, total))
}

/// Body grammar over either scanner.
struct BodyParser<'b, S, B> {
    scanner: S,
    builder: &'b mut B,
    num_vars: i32,
    num_objs: i32,
    num_algebraic_cons: i32,
    num_logical_cons: i32,
    num_funcs: i32,
    num_vars_and_exprs: i32,
}

impl<'b, S: Scanner, B: ProblemBuilder> BodyParser<'b, S, B> {
    fn new(scanner: S, builder: &'b mut B, header: &NlHeader, num_vars_and_exprs: i32) -> Self {
        BodyParser {
            scanner,
            builder,
            num_vars: header.num_vars,
            num_objs: header.num_objs,
            num_algebraic_cons: header.num_algebraic_cons,
            num_logical_cons: header.num_logical_cons,
            num_funcs: header.num_funcs,
            num_vars_and_exprs,
        }
    }

    fn err(&self, loc: SourceLocation, message: impl Into<String>) -> NlError {
        NlError::parse(self.scanner.file_name(), loc, message)
    }

    fn run(&mut self) -> Result<()> {
        while let Some(tag) = self.scanner.read_char() {
            match tag {
                b'F' => self.read_function()?,
                b'S' => self.read_suffix()?,
                b'V' => self.read_defined_var()?,
                b'G' => self.read_linear_obj()?,
                b'J' => self.read_linear_con()?,
                b'C' => self.read_con_expr()?,
                b'O' => self.read_obj()?,
                b'L' => self.read_logical_con()?,
                b'r' => self.read_bounds(true)?,
                b'b' => self.read_bounds(false)?,
                b'k' => self.read_column_sizes(true)?,
                b'K' => self.read_column_sizes(false)?,
                b'x' => self.read_initial_values()?,
                b'd' => self.read_initial_dual_values()?,
                _ => {
                    return Err(self.err(self.scanner.token_loc(), "invalid segment type"));
                }
            }
        }
        Ok(())
    }

    /// Unsigned index strictly below `ub`.
    fn read_index(&mut self, ub: i32) -> Result<i32> {
        let v = self.scanner.read_uint()?;
        if v >= ub {
            return Err(self.err(self.scanner.token_loc(), format!("integer {v} out of bounds")));
        }
        Ok(v)
    }

    /// Argument count of a variadic expression, at least `min`.
    fn read_num_args(&mut self, min: i32) -> Result<i32> {
        let n = self.scanner.read_uint()?;
        let loc = self.scanner.token_loc();
        if n < min {
            return Err(self.err(loc, "too few arguments"));
        }
        self.scanner.read_till_end_of_line()?;
        Ok(n)
    }

    /// Opcode line of an `o` record.
    fn read_opcode(&mut self) -> Result<(ExprKind, SourceLocation)> {
        let op = self.scanner.read_uint()?;
        let loc = self.scanner.token_loc();
        let Some(kind) = kind_from_opcode(op) else {
            return Err(self.err(loc, format!("invalid opcode {op}")));
        };
        self.scanner.read_till_end_of_line()?;
        Ok((kind, loc))
    }

    // -- expression trees --------------------------------------------------

    fn read_constant(&mut self, code: u8) -> Result<f64> {
        let value = match code {
            b'n' => self.scanner.read_double()?,
            b's' => self.scanner.read_short_const()?,
            _ => self.scanner.read_long_const()?,
        };
        self.scanner.read_till_end_of_line()?;
        Ok(value)
    }

    /// A `v` record: a variable or common-expression reference.
    fn read_reference(&mut self) -> Result<B::NumericExpr> {
        let index = self.read_index(self.num_vars_and_exprs)?;
        self.scanner.read_till_end_of_line()?;
        if index < self.num_vars {
            Ok(self.builder.make_variable(index)?.into())
        } else {
            self.builder.make_common_expr_ref(index - self.num_vars)
        }
    }

    fn read_numeric_expr(&mut self) -> Result<B::NumericExpr> {
        let Some(code) = self.scanner.read_char() else {
            return Err(self.err(self.scanner.loc(), "expected expression"));
        };
        let loc = self.scanner.token_loc();
        match code {
            b'n' | b's' | b'l' => {
                let value = self.read_constant(code)?;
                self.builder.make_numeric_constant(value)
            }
            b'v' => self.read_reference(),
            b'f' => self.read_call(),
            b'o' => {
                let (kind, oploc) = self.read_opcode()?;
                self.read_numeric_from_kind(kind, oploc)
            }
            _ => Err(self.err(loc, "expected expression")),
        }
    }

    fn read_numeric_from_kind(
        &mut self,
        kind: ExprKind,
        loc: SourceLocation,
    ) -> Result<B::NumericExpr> {
        use crate::expr::ExprKind as K;
        if kind.is_unary() {
            let arg = self.read_numeric_expr()?;
            return self.builder.make_unary(kind, arg);
        }
        if kind.is_binary() {
            let lhs = self.read_numeric_expr()?;
            let rhs = self.read_numeric_expr()?;
            return self.builder.make_binary(kind, lhs, rhs);
        }
        match kind {
            K::If => {
                let condition = self.read_logical_expr()?;
                let then_expr = self.read_numeric_expr()?;
                let else_expr = self.read_numeric_expr()?;
                self.builder.make_if(condition, then_expr, else_expr)
            }
            K::PlTerm => self.read_pl_term(),
            K::Min | K::Max => {
                let n = self.read_num_args(1)?;
                let mut args = self.builder.begin_iterated(kind, n)?;
                for _ in 0..n {
                    let arg = self.read_numeric_expr()?;
                    args.add_arg(arg);
                }
                self.builder.end_iterated(args)
            }
            K::Sum => {
                let n = self.read_num_args(3)?;
                let mut args = self.builder.begin_iterated(kind, n)?;
                for _ in 0..n {
                    let arg = self.read_numeric_expr()?;
                    args.add_arg(arg);
                }
                self.builder.end_iterated(args)
            }
            K::Count => {
                let count = self.read_count_args()?;
                Ok(count.into())
            }
            K::NumberOf => {
                let n = self.read_num_args(1)?;
                let value = self.read_numeric_expr()?;
                let mut args = self.builder.begin_number_of(n, value)?;
                for _ in 1..n {
                    let arg = self.read_numeric_expr()?;
                    args.add_arg(arg);
                }
                self.builder.end_number_of(args)
            }
            K::NumberOfSym => {
                let n = self.read_num_args(1)?;
                let value = self.read_expr()?;
                let mut args = self.builder.begin_number_of_sym(n, value)?;
                for _ in 1..n {
                    let arg = self.read_expr()?;
                    args.add_arg(arg);
                }
                self.builder.end_number_of_sym(args)
            }
            _ => Err(self.err(loc, "expected numeric expression opcode")),
        }
    }

    /// A generic expression: numeric, string literal or symbolic if.
    fn read_expr(&mut self) -> Result<B::Expr> {
        let Some(code) = self.scanner.read_char() else {
            return Err(self.err(self.scanner.loc(), "expected expression"));
        };
        let loc = self.scanner.token_loc();
        match code {
            b'h' => {
                let bytes = self.scanner.read_string_literal()?;
                self.builder.make_string_literal(&bytes)
            }
            b'n' | b's' | b'l' => {
                let value = self.read_constant(code)?;
                Ok(self.builder.make_numeric_constant(value)?.into())
            }
            b'v' => Ok(self.read_reference()?.into()),
            b'f' => Ok(self.read_call()?.into()),
            b'o' => {
                let (kind, oploc) = self.read_opcode()?;
                if kind == ExprKind::IfSym {
                    let condition = self.read_logical_expr()?;
                    let then_expr = self.read_expr()?;
                    let else_expr = self.read_expr()?;
                    self.builder.make_symbolic_if(condition, then_expr, else_expr)
                } else {
                    Ok(self.read_numeric_from_kind(kind, oploc)?.into())
                }
            }
            _ => Err(self.err(loc, "expected expression")),
        }
    }

    fn read_pl_term(&mut self) -> Result<B::NumericExpr> {
        let num_slopes = self.scanner.read_uint()?;
        let loc = self.scanner.token_loc();
        if num_slopes < 2 {
            return Err(self.err(loc, "too few slopes in piecewise-linear term"));
        }
        self.scanner.read_till_end_of_line()?;
        let mut term = self.builder.begin_pl_term(num_slopes - 1)?;
        for i in 0..2 * num_slopes - 1 {
            let Some(code) = self.scanner.read_char() else {
                return Err(self.err(self.scanner.loc(), "expected constant"));
            };
            let loc = self.scanner.token_loc();
            if !matches!(code, b'n' | b's' | b'l') {
                return Err(self.err(loc, "expected constant"));
            }
            let value = self.read_constant(code)?;
            // Slopes and breakpoints alternate, slopes first and last.
            if i % 2 == 0 {
                term.add_slope(value);
            } else {
                term.add_breakpoint(value);
            }
        }
        let Some(code) = self.scanner.read_char() else {
            return Err(self.err(self.scanner.loc(), "expected variable"));
        };
        let loc = self.scanner.token_loc();
        if code != b'v' {
            return Err(self.err(loc, "expected variable"));
        }
        let index = self.read_index(self.num_vars)?;
        self.scanner.read_till_end_of_line()?;
        let var = self.builder.make_variable(index)?;
        self.builder.end_pl_term(term, var)
    }

    fn read_call(&mut self) -> Result<B::NumericExpr> {
        let func_index = self.read_index(self.num_funcs)?;
        let num_args = self.scanner.read_uint()?;
        self.scanner.read_till_end_of_line()?;
        let mut args = self.builder.begin_call(func_index, num_args)?;
        for _ in 0..num_args {
            let arg = self.read_expr()?;
            args.add_arg(arg);
        }
        self.builder.end_call(args)
    }

    fn read_logical_expr(&mut self) -> Result<B::LogicalExpr> {
        let Some(code) = self.scanner.read_char() else {
            return Err(self.err(self.scanner.loc(), "expected logical expression"));
        };
        let loc = self.scanner.token_loc();
        match code {
            b'n' | b's' | b'l' => {
                let value = self.read_constant(code)?;
                self.builder.make_logical_constant(value != 0.0)
            }
            b'o' => {
                let (kind, oploc) = self.read_opcode()?;
                self.read_logical_from_kind(kind, oploc)
            }
            _ => Err(self.err(loc, "expected logical expression")),
        }
    }

    fn read_logical_from_kind(
        &mut self,
        kind: ExprKind,
        loc: SourceLocation,
    ) -> Result<B::LogicalExpr> {
        use crate::expr::ExprKind as K;
        if kind.is_binary_logical() {
            let lhs = self.read_logical_expr()?;
            let rhs = self.read_logical_expr()?;
            return self.builder.make_binary_logical(kind, lhs, rhs);
        }
        if kind.is_relational() {
            let lhs = self.read_numeric_expr()?;
            let rhs = self.read_numeric_expr()?;
            return self.builder.make_relational(kind, lhs, rhs);
        }
        if kind.is_logical_count() {
            let lhs = self.read_numeric_expr()?;
            let count = self.read_count_expr()?;
            return self.builder.make_logical_count(kind, lhs, count);
        }
        if kind.is_iterated_logical() {
            let n = self.read_num_args(3)?;
            let mut args = self.builder.begin_iterated_logical(kind, n)?;
            for _ in 0..n {
                let arg = self.read_logical_expr()?;
                args.add_arg(arg);
            }
            return self.builder.end_iterated_logical(args);
        }
        if kind.is_pairwise() {
            let n = self.read_num_args(3)?;
            let mut args = self.builder.begin_pairwise(kind, n)?;
            for _ in 0..n {
                let arg = self.read_numeric_expr()?;
                args.add_arg(arg);
            }
            return self.builder.end_pairwise(args);
        }
        match kind {
            K::Not => {
                let arg = self.read_logical_expr()?;
                self.builder.make_not(arg)
            }
            K::Implication => {
                let condition = self.read_logical_expr()?;
                let then_expr = self.read_logical_expr()?;
                let else_expr = self.read_logical_expr()?;
                self.builder.make_implication(condition, then_expr, else_expr)
            }
            _ => Err(self.err(loc, "expected logical expression opcode")),
        }
    }

    /// A count expression in a context that demands one.
    fn read_count_expr(&mut self) -> Result<B::CountExpr> {
        let Some(code) = self.scanner.read_char() else {
            return Err(self.err(self.scanner.loc(), "expected count expression"));
        };
        let loc = self.scanner.token_loc();
        if code != b'o' {
            return Err(self.err(loc, "expected count expression"));
        }
        let (kind, oploc) = self.read_opcode()?;
        if kind != ExprKind::Count {
            return Err(self.err(oploc, "expected count expression opcode"));
        }
        self.read_count_args()
    }

    fn read_count_args(&mut self) -> Result<B::CountExpr> {
        let n = self.read_num_args(1)?;
        let mut args = self.builder.begin_count(n)?;
        for _ in 0..n {
            let arg = self.read_logical_expr()?;
            args.add_arg(arg);
        }
        self.builder.end_count(args)
    }

    // -- segments ----------------------------------------------------------

    fn read_function(&mut self) -> Result<()> {
        let index = self.read_index(self.num_funcs)?;
        let ty_raw = self.scanner.read_uint()?;
        let ty_loc = self.scanner.token_loc();
        let Some(ty) = FuncType::from_wire(ty_raw) else {
            return Err(self.err(ty_loc, "invalid function type"));
        };
        let num_args = self.scanner.read_int()?;
        let name = self.scanner.read_name()?;
        self.scanner.read_till_end_of_line()?;
        self.builder.set_function(index, &name, num_args, ty)
    }

    fn read_suffix(&mut self) -> Result<()> {
        let kind = self.scanner.read_uint()?;
        let kind_loc = self.scanner.token_loc();
        if kind >= 8 {
            return Err(self.err(kind_loc, "invalid suffix kind"));
        }
        let num_items = match kind & suf::MASK {
            suf::VAR => self.num_vars,
            suf::CON => self.num_algebraic_cons + self.num_logical_cons,
            suf::OBJ => self.num_objs,
            _ => 1,
        };
        let num_values = self.scanner.read_uint()?;
        let count_loc = self.scanner.token_loc();
        if num_values < 1 || num_values > num_items {
            return Err(self.err(count_loc, format!("integer {num_values} out of bounds")));
        }
        let name = self.scanner.read_name()?;
        self.scanner.read_till_end_of_line()?;
        let float = kind & suf::FLOAT != 0;
        let mut handler = self.builder.add_suffix(kind, num_values, &name)?;
        for _ in 0..num_values {
            let index = self.scanner.read_uint()?;
            if index >= num_items {
                let loc = self.scanner.token_loc();
                return Err(NlError::parse(
                    self.scanner.file_name(),
                    loc,
                    format!("integer {index} out of bounds"),
                ));
            }
            if float {
                let value = self.scanner.read_double()?;
                handler.set_float_value(index, value);
            } else {
                let value = self.scanner.read_int()?;
                handler.set_int_value(index, i64::from(value));
            }
            self.scanner.read_till_end_of_line()?;
        }
        Ok(())
    }

    fn read_defined_var(&mut self) -> Result<()> {
        let index = self.scanner.read_uint()?;
        let loc = self.scanner.token_loc();
        if index < self.num_vars || index >= self.num_vars_and_exprs {
            return Err(self.err(loc, format!("integer {index} out of bounds")));
        }
        let num_linear_terms = self.scanner.read_uint()?;
        let position = self.scanner.read_uint()?;
        self.scanner.read_till_end_of_line()?;
        if num_linear_terms > 0 {
            let bound = self.num_vars_and_exprs;
            let mut part = self.builder.linear_var_builder(index, num_linear_terms)?;
            for _ in 0..num_linear_terms {
                let var = self.scanner.read_uint()?;
                if var >= bound {
                    let loc = self.scanner.token_loc();
                    return Err(NlError::parse(
                        self.scanner.file_name(),
                        loc,
                        format!("integer {var} out of bounds"),
                    ));
                }
                let coef = self.scanner.read_double()?;
                self.scanner.read_till_end_of_line()?;
                part.add_term(var, coef);
            }
        }
        let expr = self.read_numeric_expr()?;
        self.builder
            .set_common_expr(index - self.num_vars, expr, position)
    }

    fn read_linear_obj(&mut self) -> Result<()> {
        let index = self.read_index(self.num_objs)?;
        let num_terms = self.read_linear_term_count()?;
        self.scanner.read_till_end_of_line()?;
        let bound = self.num_vars_and_exprs;
        let file = self.scanner.file_name().to_string();
        let mut part = self.builder.linear_obj_builder(index, num_terms)?;
        Self::read_linear_terms(&mut self.scanner, &mut part, num_terms, bound, &file)
    }

    fn read_linear_con(&mut self) -> Result<()> {
        let index = self.read_index(self.num_algebraic_cons)?;
        let num_terms = self.read_linear_term_count()?;
        self.scanner.read_till_end_of_line()?;
        let bound = self.num_vars_and_exprs;
        let file = self.scanner.file_name().to_string();
        let mut part = self.builder.linear_con_builder(index, num_terms)?;
        Self::read_linear_terms(&mut self.scanner, &mut part, num_terms, bound, &file)
    }

    /// Linear term count: at least one term, at most one per variable.
    fn read_linear_term_count(&mut self) -> Result<i32> {
        let n = self.scanner.read_uint()?;
        if n < 1 || n > self.num_vars {
            let loc = self.scanner.token_loc();
            return Err(self.err(loc, format!("integer {n} out of bounds")));
        }
        Ok(n)
    }

    fn read_linear_terms(
        scanner: &mut S,
        part: &mut impl LinearExprBuilder,
        num_terms: i32,
        bound: i32,
        file: &str,
    ) -> Result<()> {
        for _ in 0..num_terms {
            let var = scanner.read_uint()?;
            if var >= bound {
                let loc = scanner.token_loc();
                return Err(NlError::parse(file, loc, format!("integer {var} out of bounds")));
            }
            let coef = scanner.read_double()?;
            scanner.read_till_end_of_line()?;
            part.add_term(var, coef);
        }
        Ok(())
    }

    fn read_con_expr(&mut self) -> Result<()> {
        let index = self.read_index(self.num_algebraic_cons)?;
        self.scanner.read_till_end_of_line()?;
        let expr = self.read_numeric_expr()?;
        self.builder.set_con(index, expr)
    }

    fn read_obj(&mut self) -> Result<()> {
        let index = self.read_index(self.num_objs)?;
        let sense_raw = self.scanner.read_uint()?;
        self.scanner.read_till_end_of_line()?;
        let sense = if sense_raw == 0 {
            ObjSense::Min
        } else {
            ObjSense::Max
        };
        let expr = self.read_numeric_expr()?;
        self.builder.set_obj(index, sense, expr)
    }

    fn read_logical_con(&mut self) -> Result<()> {
        let index = self.read_index(self.num_logical_cons)?;
        self.scanner.read_till_end_of_line()?;
        let expr = self.read_logical_expr()?;
        self.builder.set_logical_con(index, expr)
    }

    fn read_bounds(&mut self, constraints: bool) -> Result<()> {
        self.scanner.read_till_end_of_line()?;
        let count = if constraints {
            self.num_algebraic_cons
        } else {
            self.num_vars
        };
        let max_code = if constraints { 5 } else { 4 };
        for i in 0..count {
            let code = self.scanner.read_uint()?;
            let loc = self.scanner.token_loc();
            if code > max_code {
                return Err(self.err(loc, "invalid bound type"));
            }
            if code == 5 {
                // Complementarity: raw flags, then a 1-based variable index.
                let flags = self.scanner.read_uint()?;
                let var = self.scanner.read_uint()?;
                let var_loc = self.scanner.token_loc();
                if var < 1 || var > self.num_vars {
                    return Err(self.err(var_loc, format!("integer {var} out of bounds")));
                }
                self.scanner.read_till_end_of_line()?;
                self.builder.set_complement(i, var - 1, flags & comp::MASK)?;
                continue;
            }
            let (lb, ub) = match code {
                0 => (self.scanner.read_double()?, self.scanner.read_double()?),
                1 => (f64::NEG_INFINITY, self.scanner.read_double()?),
                2 => (self.scanner.read_double()?, f64::INFINITY),
                3 => (f64::NEG_INFINITY, f64::INFINITY),
                _ => {
                    let v = self.scanner.read_double()?;
                    (v, v)
                }
            };
            self.scanner.read_till_end_of_line()?;
            if constraints {
                self.builder.set_con_bounds(i, lb, ub)?;
            } else {
                self.builder.set_var_bounds(i, lb, ub)?;
            }
        }
        Ok(())
    }

    fn read_column_sizes(&mut self, cumulative: bool) -> Result<()> {
        let expected = (self.num_vars - 1).max(0);
        let n = self.scanner.read_uint()?;
        if n != expected {
            let loc = self.scanner.token_loc();
            return Err(self.err(loc, format!("expected {expected}")));
        }
        self.scanner.read_till_end_of_line()?;
        let file = self.scanner.file_name().to_string();
        let mut handler = self.builder.column_sizes()?;
        let mut prev = 0;
        for _ in 0..n {
            let value = self.scanner.read_uint()?;
            if cumulative {
                if value < prev {
                    let loc = self.scanner.token_loc();
                    return Err(NlError::parse(&file, loc, "invalid column offset"));
                }
                handler.add(value - prev);
                prev = value;
            } else {
                handler.add(value);
            }
            self.scanner.read_till_end_of_line()?;
        }
        Ok(())
    }

    fn read_initial_values(&mut self) -> Result<()> {
        self.read_initial(false)
    }

    fn read_initial_dual_values(&mut self) -> Result<()> {
        self.read_initial(true)
    }

    fn read_initial(&mut self, dual: bool) -> Result<()> {
        let num_items = if dual {
            self.num_algebraic_cons
        } else {
            self.num_vars
        };
        let n = self.scanner.read_uint()?;
        if n < 1 || n > num_items {
            let loc = self.scanner.token_loc();
            return Err(self.err(loc, "too many initial values"));
        }
        self.scanner.read_till_end_of_line()?;
        for _ in 0..n {
            let index = self.read_index(num_items)?;
            let value = self.scanner.read_double()?;
            self.scanner.read_till_end_of_line()?;
            if dual {
                self.builder.set_initial_dual_value(index, value)?;
            } else {
                self.builder.set_initial_value(index, value)?;
            }
        }
        Ok(())
    }
}
