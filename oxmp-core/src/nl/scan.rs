//! Token-level scanners shared by the text and binary body grammars.
//!
//! The text scanner works over whitespace-separated ASCII tokens with exact
//! line/column tracking: a NUL byte or the end of the buffer both act as end
//! of input, tokens never cross lines, and `read_till_end_of_line` discards
//! residual characters up to (and including) the newline. The binary scanner
//! reads fixed-width records: 4-byte integers, 8-byte doubles, 2-byte `s`
//! and 8-byte `l` constants, length-prefixed names, with optional whole-value
//! byte swapping; line skipping is a no-op.

use crate::error::{NlError, Result, SourceLocation};

/// Token source for the .nl grammars.
pub(crate) trait Scanner {
    /// Name of the input, for error messages.
    fn file_name(&self) -> &str;

    /// Current location.
    fn loc(&self) -> SourceLocation;

    /// Start of the most recently read token.
    fn token_loc(&self) -> SourceLocation;

    /// Build a parse error at `loc`.
    fn error(&self, loc: SourceLocation, message: impl Into<String>) -> NlError
    where
        Self: Sized,
    {
        NlError::parse(self.file_name(), loc, message)
    }

    /// Next raw byte, recording its position as the token start; `None` at
    /// end of input.
    fn read_char(&mut self) -> Option<u8>;

    /// Unsigned integer token; fails with `expected unsigned integer` or
    /// `number is too big`.
    fn read_uint(&mut self) -> Result<i32>;

    /// Signed integer token.
    fn read_int(&mut self) -> Result<i32>;

    /// Double token.
    fn read_double(&mut self) -> Result<f64>;

    /// Unsigned integer if one is present at the cursor.
    fn read_opt_uint(&mut self) -> Result<Option<i32>>;

    /// Signed integer if one is present at the cursor.
    fn read_opt_int(&mut self) -> Result<Option<i32>>;

    /// Double if one is present at the cursor.
    fn read_opt_double(&mut self) -> Result<Option<f64>>;

    /// Payload of an `s` (short) constant.
    fn read_short_const(&mut self) -> Result<f64>;

    /// Payload of an `l` (long) constant.
    fn read_long_const(&mut self) -> Result<f64>;

    /// A name token; fails with `expected name`.
    fn read_name(&mut self) -> Result<String>;

    /// A length-prefixed string literal; may contain NUL and newline.
    fn read_string_literal(&mut self) -> Result<Vec<u8>>;

    /// Discard the rest of the current record.
    fn read_till_end_of_line(&mut self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Scanner over an ASCII .nl body.
pub(crate) struct TextScanner<'a> {
    data: &'a [u8],
    name: String,
    pos: usize,
    line: usize,
    line_start: usize,
    token: usize,
}

impl<'a> TextScanner<'a> {
    pub(crate) fn new(data: &'a [u8], name: &str) -> Self {
        TextScanner {
            data,
            name: name.to_string(),
            pos: 0,
            line: 1,
            line_start: 0,
            token: 0,
        }
    }

    /// Byte offset of the cursor, used to hand the tail to a binary scanner.
    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    fn at(&self, pos: usize) -> Option<u8> {
        match self.data.get(pos) {
            Some(0) | None => None,
            Some(&c) => Some(c),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.at(self.pos)
    }

    fn loc_at(&self, pos: usize) -> SourceLocation {
        SourceLocation::new(self.line, pos - self.line_start + 1)
    }

    fn skip_space(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }
    }

    fn fail(&self, loc: SourceLocation, message: impl Into<String>) -> NlError {
        NlError::parse(&self.name, loc, message)
    }

    /// Digits at the cursor accumulated into `acc` (negative magnitude), or
    /// `None` if there is no digit. `min` bounds the magnitude.
    fn read_digits(&mut self, min: i64) -> Result<Option<i64>> {
        let loc = self.token_loc();
        let mut acc: i64 = 0;
        let mut any = false;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            any = true;
            acc = acc
                .checked_mul(10)
                .and_then(|a| a.checked_sub(i64::from(c - b'0')))
                .filter(|&a| a >= min)
                .ok_or_else(|| self.fail(loc, "number is too big"))?;
            self.pos += 1;
        }
        Ok(if any { Some(acc) } else { None })
    }

    fn read_integer(&mut self, min: i64, max: i64, signed: bool) -> Result<Option<i64>> {
        self.skip_space();
        self.token = self.pos;
        let negative = signed && self.peek() == Some(b'-');
        if negative {
            self.pos += 1;
        }
        // Negative accumulation covers the asymmetric two's-complement range.
        let floor = if negative { min } else { -max };
        match self.read_digits(floor)? {
            Some(acc) => Ok(Some(if negative { acc } else { -acc })),
            None => {
                if negative {
                    self.pos = self.token;
                }
                Ok(None)
            }
        }
    }

    fn parse_double_token(&mut self) -> Option<f64> {
        let start = self.pos;
        let mut p = self.pos;
        if matches!(self.at(p), Some(b'+') | Some(b'-')) {
            p += 1;
        }
        let int_digits = {
            let s = p;
            while self.at(p).is_some_and(|c| c.is_ascii_digit()) {
                p += 1;
            }
            p - s
        };
        let mut frac_digits = 0;
        if self.at(p) == Some(b'.') {
            p += 1;
            let s = p;
            while self.at(p).is_some_and(|c| c.is_ascii_digit()) {
                p += 1;
            }
            frac_digits = p - s;
        }
        if int_digits == 0 && frac_digits == 0 {
            return None;
        }
        if matches!(self.at(p), Some(b'e') | Some(b'E')) {
            let mut q = p + 1;
            if matches!(self.at(q), Some(b'+') | Some(b'-')) {
                q += 1;
            }
            if self.at(q).is_some_and(|c| c.is_ascii_digit()) {
                while self.at(q).is_some_and(|c| c.is_ascii_digit()) {
                    q += 1;
                }
                p = q;
            }
        }
        let text = std::str::from_utf8(&self.data[start..p]).ok()?;
        let value = text.parse().ok()?;
        self.pos = p;
        Some(value)
    }
}

impl Scanner for TextScanner<'_> {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn loc(&self) -> SourceLocation {
        self.loc_at(self.pos)
    }

    fn token_loc(&self) -> SourceLocation {
        self.loc_at(self.token)
    }

    fn read_char(&mut self) -> Option<u8> {
        self.token = self.pos;
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn read_uint(&mut self) -> Result<i32> {
        match self.read_integer(0, i64::from(i32::MAX), false)? {
            Some(v) => Ok(v as i32),
            None => Err(self.fail(self.token_loc(), "expected unsigned integer")),
        }
    }

    fn read_int(&mut self) -> Result<i32> {
        match self.read_integer(i64::from(i32::MIN), i64::from(i32::MAX), true)? {
            Some(v) => Ok(v as i32),
            None => Err(self.fail(self.token_loc(), "expected integer")),
        }
    }

    fn read_double(&mut self) -> Result<f64> {
        match self.read_opt_double()? {
            Some(v) => Ok(v),
            None => Err(self.fail(self.token_loc(), "expected double")),
        }
    }

    fn read_opt_uint(&mut self) -> Result<Option<i32>> {
        Ok(self
            .read_integer(0, i64::from(i32::MAX), false)?
            .map(|v| v as i32))
    }

    fn read_opt_int(&mut self) -> Result<Option<i32>> {
        Ok(self
            .read_integer(i64::from(i32::MIN), i64::from(i32::MAX), true)?
            .map(|v| v as i32))
    }

    fn read_opt_double(&mut self) -> Result<Option<f64>> {
        self.skip_space();
        self.token = self.pos;
        Ok(self.parse_double_token())
    }

    fn read_short_const(&mut self) -> Result<f64> {
        match self.read_integer(i64::from(i16::MIN), i64::from(i16::MAX), true)? {
            Some(v) => Ok(v as f64),
            None => Err(self.fail(self.token_loc(), "expected integer")),
        }
    }

    fn read_long_const(&mut self) -> Result<f64> {
        match self.read_integer(i64::MIN, i64::MAX, true)? {
            Some(v) => Ok(v as f64),
            None => Err(self.fail(self.token_loc(), "expected integer")),
        }
    }

    fn read_name(&mut self) -> Result<String> {
        self.skip_space();
        self.token = self.pos;
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_ascii_whitespace())
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.fail(self.token_loc(), "expected name"));
        }
        Ok(String::from_utf8_lossy(&self.data[start..self.pos]).into_owned())
    }

    fn read_string_literal(&mut self) -> Result<Vec<u8>> {
        let length = self.read_uint()? as usize;
        if self.peek() != Some(b':') {
            return Err(self.fail(self.loc(), "expected ':'"));
        }
        self.pos += 1;
        let mut bytes = Vec::with_capacity(length);
        for _ in 0..length {
            // Interior NUL bytes are literal content; only the buffer end is
            // end-of-file here.
            let Some(&c) = self.data.get(self.pos) else {
                return Err(self.fail(self.loc(), "unexpected end of file in string"));
            };
            self.pos += 1;
            if c == b'\n' {
                self.line += 1;
                self.line_start = self.pos;
            }
            bytes.push(c);
        }
        if self.data.get(self.pos) != Some(&b'\n') {
            return Err(self.fail(self.loc(), "expected newline"));
        }
        self.pos += 1;
        self.line += 1;
        self.line_start = self.pos;
        Ok(bytes)
    }

    fn read_till_end_of_line(&mut self) -> Result<()> {
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == b'\n' {
                self.line += 1;
                self.line_start = self.pos;
                return Ok(());
            }
        }
        Err(self.fail(self.loc(), "expected newline"))
    }
}

// ---------------------------------------------------------------------------
// Binary
// ---------------------------------------------------------------------------

/// Scanner over a binary .nl body.
pub(crate) struct BinaryScanner<'a> {
    data: &'a [u8],
    name: String,
    pos: usize,
    token: usize,
    swap: bool,
}

impl<'a> BinaryScanner<'a> {
    pub(crate) fn new(data: &'a [u8], name: &str, offset: usize, swap: bool) -> Self {
        BinaryScanner {
            data,
            name: name.to_string(),
            pos: offset,
            token: offset,
            swap,
        }
    }

    fn fail(&self, loc: SourceLocation, message: impl Into<String>) -> NlError {
        NlError::parse(&self.name, loc, message)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.token = self.pos;
        let Some(slice) = self.data.get(self.pos..self.pos + N) else {
            return Err(self.fail(self.loc(), "unexpected end of file"));
        };
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(slice);
        if self.swap {
            bytes.reverse();
        }
        self.pos += N;
        Ok(bytes)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_ne_bytes(self.take()?))
    }
}

impl Scanner for BinaryScanner<'_> {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn loc(&self) -> SourceLocation {
        SourceLocation::new(1, self.pos + 1)
    }

    fn token_loc(&self) -> SourceLocation {
        SourceLocation::new(1, self.token + 1)
    }

    fn read_char(&mut self) -> Option<u8> {
        self.token = self.pos;
        let c = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(c)
    }

    fn read_uint(&mut self) -> Result<i32> {
        let v = self.read_i32()?;
        if v < 0 {
            return Err(self.fail(self.token_loc(), "expected unsigned integer"));
        }
        Ok(v)
    }

    fn read_int(&mut self) -> Result<i32> {
        self.read_i32()
    }

    fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_ne_bytes(self.take()?))
    }

    fn read_opt_uint(&mut self) -> Result<Option<i32>> {
        Ok(Some(self.read_uint()?))
    }

    fn read_opt_int(&mut self) -> Result<Option<i32>> {
        Ok(Some(self.read_i32()?))
    }

    fn read_opt_double(&mut self) -> Result<Option<f64>> {
        Ok(Some(self.read_double()?))
    }

    fn read_short_const(&mut self) -> Result<f64> {
        Ok(f64::from(i16::from_ne_bytes(self.take()?)))
    }

    fn read_long_const(&mut self) -> Result<f64> {
        Ok(i64::from_ne_bytes(self.take()?) as f64)
    }

    fn read_name(&mut self) -> Result<String> {
        let bytes = self.read_string_literal()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_string_literal(&mut self) -> Result<Vec<u8>> {
        let length = self.read_uint()? as usize;
        let Some(slice) = self.data.get(self.pos..self.pos + length) else {
            return Err(self.fail(self.loc(), "unexpected end of file in string"));
        };
        let bytes = slice.to_vec();
        self.pos += length;
        Ok(bytes)
    }

    fn read_till_end_of_line(&mut self) -> Result<()> {
        Ok(())
    }
}
