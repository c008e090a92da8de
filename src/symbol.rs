use std::{fmt, str::FromStr};

/// Number of general-purpose registers.
pub const NUM_REGISTERS: usize = 32;

/// Index of one of the 32 general-purpose registers, `x0` through `x31`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Register(u8);

impl Register {
    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < NUM_REGISTERS).then_some(Register(index))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FromStr for Register {
    type Err = ();

    /// Parses the `x<n>` spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('x').ok_or(())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(());
        }
        let index: u8 = digits.parse().map_err(|_| ())?;
        Register::new(index).ok_or(())
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Condition checked by a branch against the flags of the last compare.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cond {
    Always,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Cond {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Cond::Always => "b",
            Cond::Eq => "b.eq",
            Cond::Ne => "b.ne",
            Cond::Gt => "b.gt",
            Cond::Ge => "b.ge",
            Cond::Lt => "b.lt",
            Cond::Le => "b.le",
        }
    }
}

/// Rendering selected by the second operand of `print`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Base {
    /// `d`, signed decimal
    Dec,
    /// `x`, `0x`-prefixed unsigned hex
    Hex,
    /// `b`, `0b`-prefixed unsigned binary
    Bin,
    /// `s`, null-terminated string read from memory
    Str,
}

impl FromStr for Base {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "d" => Ok(Base::Dec),
            "x" => Ok(Base::Hex),
            "b" => Ok(Base::Bin),
            "s" => Ok(Base::Str),
            _ => Err(()),
        }
    }
}

/// Every mnemonic the parser recognises.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InstrKind {
    Mov,
    Add,
    Sub,
    Cmp,
    CmpU,
    And,
    Eor,
    Orr,
    Lsl,
    Lsr,
    Asr,
    Load,
    Store,
    Put,
    Print,
    Branch(Cond),
    Call,
    Ret,
}

impl FromStr for InstrKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "mov" => InstrKind::Mov,
            "add" => InstrKind::Add,
            "sub" => InstrKind::Sub,
            "cmp" => InstrKind::Cmp,
            "cmp_u" => InstrKind::CmpU,
            "and" => InstrKind::And,
            "eor" => InstrKind::Eor,
            "orr" => InstrKind::Orr,
            "lsl" => InstrKind::Lsl,
            "lsr" => InstrKind::Lsr,
            "asr" => InstrKind::Asr,
            "load" => InstrKind::Load,
            "store" => InstrKind::Store,
            "put" => InstrKind::Put,
            "print" => InstrKind::Print,
            "b" => InstrKind::Branch(Cond::Always),
            "b.eq" => InstrKind::Branch(Cond::Eq),
            "b.ne" => InstrKind::Branch(Cond::Ne),
            "b.gt" => InstrKind::Branch(Cond::Gt),
            "b.ge" => InstrKind::Branch(Cond::Ge),
            "b.lt" => InstrKind::Branch(Cond::Lt),
            "b.le" => InstrKind::Branch(Cond::Le),
            "call" => InstrKind::Call,
            "ret" => InstrKind::Ret,
            _ => return Err(()),
        };
        Ok(kind)
    }
}
