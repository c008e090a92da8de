use std::fmt;

use miette::Result;

use crate::{
    label::{is_exit_label, LabelTable},
    memory::{Width, MEMORY_CAPACITY},
    parser::AsmParser,
    span::Span,
    symbol::{Base, Cond, Register},
};

/// Assembly intermediate representation: the command arena plus its label table.
///
/// Program order is index order; the command after `i` is `i + 1`.
#[derive(Clone, Debug, Default)]
pub struct Program {
    commands: Vec<Command>,
    /// Source location of each command, parallel to `commands`
    spans: Vec<Span>,
    labels: LabelTable,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    /// Lex and parse `src` into a program with all labels resolved to command indices.
    pub fn parse(src: &str) -> Result<Program> {
        AsmParser::new(src)?.parse()
    }

    pub fn push(&mut self, command: Command, span: Span) {
        self.commands.push(command);
        self.spans.push(span);
    }

    /// Bind `name` to the position of the next pushed command.
    ///
    /// Returns `false` if the label already exists.
    pub fn define_label(&mut self, name: &str) -> bool {
        self.labels.insert(name, self.commands.len())
    }

    pub fn get(&self, idx: usize) -> Option<&Command> {
        self.commands.get(idx)
    }

    pub fn span(&self, idx: usize) -> Option<Span> {
        self.spans.get(idx).copied()
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Static checks for commands that are certain to fail if they are ever executed.
    ///
    /// Execution does not depend on this; `run` only fails when a bad command is reached.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (idx, command) in self.commands.iter().enumerate() {
            let mut report = |kind| errors.push(ValidationError { idx, kind });
            match command {
                Command::Lsl { amount, .. }
                | Command::Lsr { amount, .. }
                | Command::Asr { amount, .. } => {
                    if let Operand::Imm(amount) = *amount {
                        if !(0..=63).contains(&amount) {
                            report(Problem::ShiftAmount(amount));
                        }
                    }
                }
                Command::Load { width, addr, .. } | Command::Store { width, addr, .. } => {
                    match Width::try_from(*width) {
                        Ok(width) => {
                            if let Operand::Imm(addr) = *addr {
                                if !fits_in_memory(addr, width.bytes()) {
                                    report(Problem::Address(addr));
                                }
                            }
                        }
                        Err(_) => report(Problem::Width(*width)),
                    }
                }
                Command::Put { text, addr } => {
                    if let Operand::Imm(addr) = *addr {
                        if !fits_in_memory(addr, text.len() + 1) {
                            report(Problem::Address(addr));
                        }
                    }
                }
                Command::Branch { target, .. } => {
                    if self.labels.lookup(target).is_none() && !is_exit_label(target) {
                        report(Problem::Label(target.clone()));
                    }
                }
                Command::Call { target } => {
                    if self.labels.lookup(target).is_none() {
                        report(Problem::Label(target.clone()));
                    }
                }
                _ => (),
            }
        }
        errors
    }
}

fn fits_in_memory(offset: i64, len: usize) -> bool {
    usize::try_from(offset)
        .ok()
        .and_then(|start| start.checked_add(len))
        .is_some_and(|end| end <= MEMORY_CAPACITY)
}

/// Register or immediate operand.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operand {
    Imm(i64),
    Reg(Register),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Imm(val) => write!(f, "{val}"),
            Operand::Reg(reg) => write!(f, "{reg}"),
        }
    }
}

/// Single executable command.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Command {
    /// Write an immediate into `dest`
    Mov { dest: Register, imm: i64 },
    /// `dest = lhs + rhs`, wrapping
    Add { dest: Register, lhs: Register, rhs: Operand },
    /// `dest = lhs - rhs`, wrapping
    Sub { dest: Register, lhs: Register, rhs: Operand },
    /// Set flags from `lhs` against `rhs`, either signed or unsigned
    Cmp { lhs: Register, rhs: Operand, signed: bool },
    /// Bitwise ops only ever take registers
    And { dest: Register, lhs: Register, rhs: Register },
    Eor { dest: Register, lhs: Register, rhs: Register },
    Orr { dest: Register, lhs: Register, rhs: Register },
    Lsl { dest: Register, src: Register, amount: Operand },
    Lsr { dest: Register, src: Register, amount: Operand },
    Asr { dest: Register, src: Register, amount: Operand },
    /// Read `width` bytes at `addr` into `dest`, zero-extended
    Load { dest: Register, width: i64, addr: Operand },
    /// Write the low `width` bytes of `src` at `addr`
    Store { src: Register, addr: Operand, width: i64 },
    /// Copy `text` and a null terminator into memory at `addr`
    Put { text: String, addr: Operand },
    Print { value: Operand, base: Base },
    Branch { cond: Cond, target: String },
    Call { target: String },
    Ret,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Mov { dest, imm } => write!(f, "mov {dest} {imm}"),
            Command::Add { dest, lhs, rhs } => write!(f, "add {dest} {lhs} {rhs}"),
            Command::Sub { dest, lhs, rhs } => write!(f, "sub {dest} {lhs} {rhs}"),
            Command::Cmp { lhs, rhs, signed } => {
                let name = if *signed { "cmp" } else { "cmp_u" };
                write!(f, "{name} {lhs} {rhs}")
            }
            Command::And { dest, lhs, rhs } => write!(f, "and {dest} {lhs} {rhs}"),
            Command::Eor { dest, lhs, rhs } => write!(f, "eor {dest} {lhs} {rhs}"),
            Command::Orr { dest, lhs, rhs } => write!(f, "orr {dest} {lhs} {rhs}"),
            Command::Lsl { dest, src, amount } => write!(f, "lsl {dest} {src} {amount}"),
            Command::Lsr { dest, src, amount } => write!(f, "lsr {dest} {src} {amount}"),
            Command::Asr { dest, src, amount } => write!(f, "asr {dest} {src} {amount}"),
            Command::Load { dest, width, addr } => write!(f, "load {dest} {width} {addr}"),
            Command::Store { src, addr, width } => write!(f, "store {src} {addr} {width}"),
            Command::Put { text, addr } => write!(f, "put {text:?} {addr}"),
            Command::Print { value, base } => {
                let base = match base {
                    Base::Dec => 'd',
                    Base::Hex => 'x',
                    Base::Bin => 'b',
                    Base::Str => 's',
                };
                write!(f, "print {value} {base}")
            }
            Command::Branch { cond, target } => write!(f, "{} {target}", cond.mnemonic()),
            Command::Call { target } => write!(f, "call {target}"),
            Command::Ret => f.write_str("ret"),
        }
    }
}

/// A command that can never execute successfully.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ValidationError {
    /// Index of the offending command
    pub idx: usize,
    pub kind: Problem,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Problem {
    ShiftAmount(i64),
    Width(i64),
    Address(i64),
    Label(String),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::ShiftAmount(amount) => {
                write!(f, "shift amount {amount} is outside of 0 to 63")
            }
            Problem::Width(width) => write!(f, "access width {width} is not 1, 2, 4 or 8"),
            Problem::Address(addr) => {
                write!(f, "address {addr} is outside of memory (capacity {MEMORY_CAPACITY})")
            }
            Problem::Label(name) => write!(f, "label `{name}` is never defined"),
        }
    }
}
