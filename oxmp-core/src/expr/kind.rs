//! Static expression-kind table.
//!
//! Kinds are laid out in contiguous ranges so that classification is a pair
//! of integer comparisons: numeric kinds first (constants, references, unary,
//! binary, conditional, piecewise-linear, call, iterated), then logical kinds
//! (constants, not, binary logical, relational, logical counts, implication,
//! iterated logical, pairwise), then the string kinds. Each kind carries a
//! persistent opcode used by the .nl wire format, a printable symbol and a
//! precedence.

/// Largest valid wire opcode.
pub const MAX_OPCODE: i32 = 82;

/// Expression kind.
///
/// The discriminant order is load-bearing: range predicates such as
/// [`ExprKind::is_numeric`] compare discriminants against the `FIRST_*` /
/// `LAST_*` markers below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ExprKind {
    /// An unknown expression.
    Unknown = 0,
    /// A number such as `42` or `-1.23e-4`.
    Number,
    /// A reference to a variable.
    Variable,
    /// A reference to a common (defined) subexpression.
    CommonExprRef,
    /// Unary minus, `-x`.
    Minus,
    /// `abs(x)`.
    Abs,
    /// `floor(x)`.
    Floor,
    /// `ceil(x)`.
    Ceil,
    /// `sqrt(x)`.
    Sqrt,
    /// Squaring, `x^2`.
    Pow2,
    /// `exp(x)`.
    Exp,
    /// `log(x)`.
    Log,
    /// `log10(x)`.
    Log10,
    /// `sin(x)`.
    Sin,
    /// `sinh(x)`.
    Sinh,
    /// `cos(x)`.
    Cos,
    /// `cosh(x)`.
    Cosh,
    /// `tan(x)`.
    Tan,
    /// `tanh(x)`.
    Tanh,
    /// `asin(x)`.
    Asin,
    /// `asinh(x)`.
    Asinh,
    /// `acos(x)`.
    Acos,
    /// `acosh(x)`.
    Acosh,
    /// `atan(x)`.
    Atan,
    /// `atanh(x)`.
    Atanh,
    /// Addition, `x + y`.
    Add,
    /// Subtraction, `x - y`.
    Sub,
    /// Positive difference, `x less y`.
    Less,
    /// Multiplication, `x * y`.
    Mul,
    /// Division, `x / y`.
    Div,
    /// Truncated division, `x div y`.
    IntDiv,
    /// Modulo, `x mod y`.
    Mod,
    /// Exponentiation, `x ^ y`.
    Pow,
    /// Exponentiation with a constant base, `a ^ x`.
    PowConstBase,
    /// Exponentiation with a constant exponent, `x ^ a`.
    PowConstExp,
    /// `atan2(y, x)`.
    Atan2,
    /// `precision(x, n)`.
    Precision,
    /// `round(x, n)`.
    Round,
    /// `trunc(x, n)`.
    Trunc,
    /// If-then-else over numeric branches.
    If,
    /// A piecewise-linear term, `<<0; -1, 1>> x`.
    PlTerm,
    /// A function call, `f(x, 'a')`.
    Call,
    /// Iterated minimum, `min{i in I} x[i]`.
    Min,
    /// Iterated maximum, `max{i in I} x[i]`.
    Max,
    /// Iterated sum, `sum{i in I} x[i]`.
    Sum,
    /// `numberof 42 in ({i in I} x[i])`.
    NumberOf,
    /// Symbolic numberof over mixed numeric/string arguments.
    NumberOfSym,
    /// `count{i in I} (x[i] >= 0)`.
    Count,
    /// A logical constant, `0` or `1`.
    Bool,
    /// Logical negation, `not a`.
    Not,
    /// Disjunction, `a || b`.
    Or,
    /// Conjunction, `a && b`.
    And,
    /// Equivalence, `a <==> b`.
    Iff,
    /// `x < y`.
    Lt,
    /// `x <= y`.
    Le,
    /// `x = y`.
    Eq,
    /// `x >= y`.
    Ge,
    /// `x > y`.
    Gt,
    /// `x != y`.
    Ne,
    /// `atleast k (...)`.
    AtLeast,
    /// `atmost k (...)`.
    AtMost,
    /// `exactly k (...)`.
    Exactly,
    /// `!atleast k (...)`.
    NotAtLeast,
    /// `!atmost k (...)`.
    NotAtMost,
    /// `!exactly k (...)`.
    NotExactly,
    /// Implication, `a ==> b else c`.
    Implication,
    /// `exists{i in I} p[i]`.
    Exists,
    /// `forall{i in I} p[i]`.
    ForAll,
    /// `alldiff{i in I} x[i]`.
    AllDiff,
    /// `!alldiff{i in I} x[i]`.
    NotAllDiff,
    /// A string literal; may contain NUL and newline bytes.
    String,
    /// Symbolic if-then-else whose branches may be strings.
    IfSym,
}

/// Operator precedence, lowest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    /// No meaningful precedence.
    Unknown,
    /// `if-then-else`.
    Conditional,
    /// `<==>`.
    Iff,
    /// `==> else`.
    Implication,
    /// `or`, `||`.
    LogicalOr,
    /// `and`, `&&`.
    LogicalAnd,
    /// `not`, `!`.
    Not,
    /// `<`, `<=`, `=`, `>=`, `>`, `!=`.
    Relational,
    /// A piecewise-linear expression.
    PiecewiseLinear,
    /// `+`, `-`, `less`.
    Additive,
    /// `sum`, `prod`, `min`, `max`.
    Iterative,
    /// `*`, `/`, `div`, `mod`.
    Multiplicative,
    /// `^`.
    Exponentiation,
    /// Unary `+` and `-`.
    Unary,
    /// A function call, including functional `min` / `max`.
    Call,
    /// A variable or constant.
    Primary,
}

/// One row of the static kind table.
struct KindInfo {
    opcode: i32,
    precedence: Precedence,
    name: &'static str,
}

use self::ExprKind as K;
use self::Precedence as P;

macro_rules! kind_table {
    ($($kind:ident => ($op:expr, $prec:ident, $name:expr)),+ $(,)?) => {
        const INFO: [KindInfo; K::COUNT] = [
            $(KindInfo { opcode: $op, precedence: P::$prec, name: $name }),+
        ];
        /// All kinds in discriminant order.
        const ALL: [ExprKind; K::COUNT] = [$(K::$kind),+];
    };
}

kind_table! {
    Unknown       => (-1, Unknown,        "unknown"),
    Number        => (79, Primary,        "number"),
    Variable      => (81, Primary,        "variable"),
    CommonExprRef => (81, Primary,        "common expression"),
    Minus         => (16, Unary,          "unary -"),
    Abs           => (15, Call,           "abs"),
    Floor         => (13, Call,           "floor"),
    Ceil          => (14, Call,           "ceil"),
    Sqrt          => (39, Call,           "sqrt"),
    Pow2          => (76, Exponentiation, "^2"),
    Exp           => (44, Call,           "exp"),
    Log           => (43, Call,           "log"),
    Log10         => (42, Call,           "log10"),
    Sin           => (41, Call,           "sin"),
    Sinh          => (40, Call,           "sinh"),
    Cos           => (46, Call,           "cos"),
    Cosh          => (45, Call,           "cosh"),
    Tan           => (38, Call,           "tan"),
    Tanh          => (37, Call,           "tanh"),
    Asin          => (51, Call,           "asin"),
    Asinh         => (50, Call,           "asinh"),
    Acos          => (53, Call,           "acos"),
    Acosh         => (52, Call,           "acosh"),
    Atan          => (49, Call,           "atan"),
    Atanh         => (47, Call,           "atanh"),
    Add           => ( 0, Additive,       "+"),
    Sub           => ( 1, Additive,       "-"),
    Less          => ( 6, Additive,       "less"),
    Mul           => ( 2, Multiplicative, "*"),
    Div           => ( 3, Multiplicative, "/"),
    IntDiv        => (55, Multiplicative, "div"),
    Mod           => ( 4, Multiplicative, "mod"),
    Pow           => ( 5, Exponentiation, "^"),
    PowConstBase  => (77, Exponentiation, "^"),
    PowConstExp   => (75, Exponentiation, "^"),
    Atan2         => (48, Call,           "atan2"),
    Precision     => (56, Call,           "precision"),
    Round         => (57, Call,           "round"),
    Trunc         => (58, Call,           "trunc"),
    If            => (35, Conditional,    "if"),
    PlTerm        => (64, Call,           "pl term"),
    Call          => (78, Call,           "function call"),
    Min           => (11, Call,           "min"),
    Max           => (12, Call,           "max"),
    Sum           => (54, Iterative,      "sum"),
    NumberOf      => (60, Call,           "numberof"),
    NumberOfSym   => (61, Call,           "string numberof"),
    Count         => (59, Call,           "count"),
    Bool          => (79, Primary,        "bool"),
    Not           => (34, Not,            "!"),
    Or            => (20, LogicalOr,      "||"),
    And           => (21, LogicalAnd,     "&&"),
    Iff           => (73, Iff,            "<==>"),
    Lt            => (22, Relational,     "<"),
    Le            => (23, Relational,     "<="),
    Eq            => (24, Relational,     "="),
    Ge            => (28, Relational,     ">="),
    Gt            => (29, Relational,     ">"),
    Ne            => (30, Relational,     "!="),
    AtLeast       => (62, Call,           "atleast"),
    AtMost        => (63, Call,           "atmost"),
    Exactly       => (66, Call,           "exactly"),
    NotAtLeast    => (67, Call,           "!atleast"),
    NotAtMost     => (68, Call,           "!atmost"),
    NotExactly    => (69, Call,           "!exactly"),
    Implication   => (72, Implication,    "==>"),
    Exists        => (71, Call,           "exists"),
    ForAll        => (70, Call,           "forall"),
    AllDiff       => (74, Call,           "alldiff"),
    NotAllDiff    => (82, Call,           "!alldiff"),
    String        => (80, Primary,        "string"),
    IfSym         => (65, Conditional,    "string if-then-else"),
}

impl ExprKind {
    /// Number of kinds, including [`ExprKind::Unknown`].
    pub const COUNT: usize = 72;

    /// First kind other than [`ExprKind::Unknown`].
    pub const FIRST_EXPR: ExprKind = K::Number;
    /// Last kind.
    pub const LAST_EXPR: ExprKind = K::IfSym;
    /// First numeric kind.
    pub const FIRST_NUMERIC: ExprKind = K::Number;
    /// Last numeric kind.
    pub const LAST_NUMERIC: ExprKind = K::Count;
    /// First reference kind.
    pub const FIRST_REFERENCE: ExprKind = K::Variable;
    /// Last reference kind.
    pub const LAST_REFERENCE: ExprKind = K::CommonExprRef;
    /// First unary numeric kind.
    pub const FIRST_UNARY: ExprKind = K::Minus;
    /// Last unary numeric kind.
    pub const LAST_UNARY: ExprKind = K::Atanh;
    /// First binary numeric kind.
    pub const FIRST_BINARY: ExprKind = K::Add;
    /// Last binary numeric kind.
    pub const LAST_BINARY: ExprKind = K::Trunc;
    /// First iterated kind.
    pub const FIRST_ITERATED: ExprKind = K::Min;
    /// Last iterated kind.
    pub const LAST_ITERATED: ExprKind = K::NumberOf;
    /// First vararg (functional min/max) kind.
    pub const FIRST_VARARG: ExprKind = K::Min;
    /// Last vararg kind.
    pub const LAST_VARARG: ExprKind = K::Max;
    /// First logical kind.
    pub const FIRST_LOGICAL: ExprKind = K::Bool;
    /// Last logical kind.
    pub const LAST_LOGICAL: ExprKind = K::NotAllDiff;
    /// First binary logical kind.
    pub const FIRST_BINARY_LOGICAL: ExprKind = K::Or;
    /// Last binary logical kind.
    pub const LAST_BINARY_LOGICAL: ExprKind = K::Iff;
    /// First relational kind.
    pub const FIRST_RELATIONAL: ExprKind = K::Lt;
    /// Last relational kind.
    pub const LAST_RELATIONAL: ExprKind = K::Ne;
    /// First logical count kind.
    pub const FIRST_LOGICAL_COUNT: ExprKind = K::AtLeast;
    /// Last logical count kind.
    pub const LAST_LOGICAL_COUNT: ExprKind = K::NotExactly;
    /// First iterated logical kind.
    pub const FIRST_ITERATED_LOGICAL: ExprKind = K::Exists;
    /// Last iterated logical kind.
    pub const LAST_ITERATED_LOGICAL: ExprKind = K::ForAll;
    /// First pairwise kind.
    pub const FIRST_PAIRWISE: ExprKind = K::AllDiff;
    /// Last pairwise kind.
    pub const LAST_PAIRWISE: ExprKind = K::NotAllDiff;

    /// All kinds in discriminant order, including `Unknown`.
    #[must_use]
    pub const fn all() -> &'static [ExprKind] {
        &ALL
    }

    fn in_range(self, first: ExprKind, last: ExprKind) -> bool {
        first as u8 <= self as u8 && self as u8 <= last as u8
    }

    /// Persistent wire opcode for this kind, or `-1` for `Unknown`.
    ///
    /// `Bool` and `CommonExprRef` never appear as explicit opcodes on the
    /// wire (logical constants are written as numbers, common-expression
    /// references as variables); they report the opcode of that shared
    /// representation and [`ExprKind::has_canonical_opcode`] is false.
    #[must_use]
    pub fn opcode(self) -> i32 {
        INFO[self as usize].opcode
    }

    /// Whether [`kind_from_opcode`] maps this kind's opcode back to it.
    #[must_use]
    pub fn has_canonical_opcode(self) -> bool {
        !matches!(self, K::Unknown | K::Bool | K::CommonExprRef)
    }

    /// Printable symbol. Symbols are not unique: `Pow`, `PowConstBase` and
    /// `PowConstExp` all print as `^`.
    #[must_use]
    pub fn name(self) -> &'static str {
        INFO[self as usize].name
    }

    /// Operator precedence.
    #[must_use]
    pub fn precedence(self) -> Precedence {
        INFO[self as usize].precedence
    }

    /// Numeric kinds are in `[FIRST_NUMERIC, LAST_NUMERIC]`.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        self.in_range(Self::FIRST_NUMERIC, Self::LAST_NUMERIC)
    }

    /// Logical kinds are in `[FIRST_LOGICAL, LAST_LOGICAL]`.
    #[must_use]
    pub fn is_logical(self) -> bool {
        self.in_range(Self::FIRST_LOGICAL, Self::LAST_LOGICAL)
    }

    /// Variable and common-expression references.
    #[must_use]
    pub fn is_reference(self) -> bool {
        self.in_range(Self::FIRST_REFERENCE, Self::LAST_REFERENCE)
    }

    /// Unary numeric operations.
    #[must_use]
    pub fn is_unary(self) -> bool {
        self.in_range(Self::FIRST_UNARY, Self::LAST_UNARY)
    }

    /// Binary numeric operations.
    #[must_use]
    pub fn is_binary(self) -> bool {
        self.in_range(Self::FIRST_BINARY, Self::LAST_BINARY)
    }

    /// Functional `min` / `max`.
    #[must_use]
    pub fn is_vararg(self) -> bool {
        self.in_range(Self::FIRST_VARARG, Self::LAST_VARARG)
    }

    /// Iterated numeric operations (`min`, `max`, `sum`, `numberof`).
    #[must_use]
    pub fn is_iterated(self) -> bool {
        self.in_range(Self::FIRST_ITERATED, Self::LAST_ITERATED)
    }

    /// Binary logical operations (`||`, `&&`, `<==>`).
    #[must_use]
    pub fn is_binary_logical(self) -> bool {
        self.in_range(Self::FIRST_BINARY_LOGICAL, Self::LAST_BINARY_LOGICAL)
    }

    /// Relational operations.
    #[must_use]
    pub fn is_relational(self) -> bool {
        self.in_range(Self::FIRST_RELATIONAL, Self::LAST_RELATIONAL)
    }

    /// Logical count operations (`atleast` and friends).
    #[must_use]
    pub fn is_logical_count(self) -> bool {
        self.in_range(Self::FIRST_LOGICAL_COUNT, Self::LAST_LOGICAL_COUNT)
    }

    /// Iterated logical operations (`exists`, `forall`).
    #[must_use]
    pub fn is_iterated_logical(self) -> bool {
        self.in_range(Self::FIRST_ITERATED_LOGICAL, Self::LAST_ITERATED_LOGICAL)
    }

    /// Pairwise operations (`alldiff`, `!alldiff`).
    #[must_use]
    pub fn is_pairwise(self) -> bool {
        self.in_range(Self::FIRST_PAIRWISE, Self::LAST_PAIRWISE)
    }
}

/// Resolve a wire opcode to its expression kind.
///
/// Opcodes 79 and 81 resolve to the numeric kinds `Number` and `Variable`;
/// whether such a record denotes a logical constant or a common-expression
/// reference depends on context the caller tracks. Unassigned opcodes yield
/// `None`.
#[must_use]
pub fn kind_from_opcode(opcode: i32) -> Option<ExprKind> {
    if !(0..=MAX_OPCODE).contains(&opcode) {
        return None;
    }
    OPCODE_TO_KIND[opcode as usize]
}

/// Opcode-indexed inverse of the kind table, filled at compile time.
const OPCODE_TO_KIND: [Option<ExprKind>; (MAX_OPCODE + 1) as usize] = {
    let mut table = [None; (MAX_OPCODE + 1) as usize];
    let mut i = 0;
    while i < ExprKind::COUNT {
        let kind = ALL[i];
        let opcode = INFO[i].opcode;
        // Number and Variable win the shared opcodes 79 and 81.
        if opcode >= 0 && !matches!(kind, K::Bool | K::CommonExprRef) {
            table[opcode as usize] = Some(kind);
        }
        i += 1;
    }
    table
};
