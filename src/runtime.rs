use std::{
    fmt,
    io::{self, Write},
};

use log::{debug, trace};

use crate::{
    air::{Command, Operand, Program},
    label::is_exit_label,
    memory::{Memory, MemoryError, Width, MEMORY_CAPACITY},
    symbol::{Base, Cond, Register, NUM_REGISTERS},
};

/// Condition flags. Exactly one is set after any compare; all are clear before the first.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Flags {
    pub greater: bool,
    pub equal: bool,
    pub less: bool,
}

impl Flags {
    fn compare(a: i64, b: i64, signed: bool) -> Self {
        let greater = if signed { a > b } else { (a as u64) > (b as u64) };
        let equal = a == b;
        Flags {
            greater,
            equal,
            less: !(greater || equal),
        }
    }

    pub fn holds(self, cond: Cond) -> bool {
        match cond {
            Cond::Always => true,
            Cond::Eq => self.equal,
            Cond::Ne => !self.equal,
            Cond::Gt => self.greater,
            Cond::Ge => self.greater || self.equal,
            Cond::Lt => self.less,
            Cond::Le => self.less || self.equal,
        }
    }
}

/// Saved state of the caller, pushed by `call` and popped by `ret`.
#[derive(Clone, Copy, Debug)]
struct Frame {
    regs: [i64; NUM_REGISTERS],
    /// Index of the command after the `call`
    resume: usize,
}

/// What the run loop should do after a step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    Continue,
    Halt,
}

/// Fatal error raised while executing. Ends the run.
#[derive(Debug)]
pub enum RunError {
    Memory { pc: usize, error: MemoryError },
    ShiftAmount { pc: usize, amount: i64 },
    UnresolvedLabel { pc: usize, label: String },
    Output(io::Error),
    /// Run was already stopped by an earlier error.
    Stopped,
}

impl std::error::Error for RunError {}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory { pc, error } => write!(f, "command {pc}: {error}"),
            Self::ShiftAmount { pc, amount } => {
                write!(f, "command {pc}: shift amount {amount} is outside of 0 to 63")
            }
            Self::UnresolvedLabel { pc, label } => {
                write!(f, "command {pc}: label not found: {label}")
            }
            Self::Output(e) => write!(f, "failed to write output: {e}"),
            Self::Stopped => write!(f, "execution already stopped by an earlier error"),
        }
    }
}

impl RunError {
    /// Index of the command that failed, if any.
    pub fn pc(&self) -> Option<usize> {
        match self {
            Self::Memory { pc, .. }
            | Self::ShiftAmount { pc, .. }
            | Self::UnresolvedLabel { pc, .. } => Some(*pc),
            Self::Output(_) | Self::Stopped => None,
        }
    }
}

/// Executes a [`Program`], writing `print` output to `out`.
pub struct Interpreter<'a, W: Write> {
    program: &'a Program,
    out: W,
    /// Index of the next command. Past the end means the program is finished.
    pc: usize,
    regs: [i64; NUM_REGISTERS],
    flags: Flags,
    stack: Vec<Frame>,
    mem: Memory,
    had_error: bool,
}

impl<'a, W: Write> Interpreter<'a, W> {
    pub fn new(program: &'a Program, out: W) -> Self {
        Interpreter {
            program,
            out,
            pc: 0,
            regs: [0; NUM_REGISTERS],
            flags: Flags::default(),
            stack: Vec::new(),
            mem: Memory::new(),
            had_error: false,
        }
    }

    /// Run until the program finishes or a command fails.
    ///
    /// The call stack is always empty afterwards.
    pub fn run(&mut self) -> Result<(), RunError> {
        let res = loop {
            match self.step() {
                Ok(Flow::Continue) => continue,
                Ok(Flow::Halt) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.stack.clear();
        match &res {
            Ok(()) => debug!("program finished"),
            Err(e) => debug!("program stopped: {e}"),
        }
        res
    }

    /// Execute a single command.
    ///
    /// After an error the interpreter is stopped and every following call fails without side
    /// effects.
    pub fn step(&mut self) -> Result<Flow, RunError> {
        if self.had_error {
            return Err(RunError::Stopped);
        }
        let program = self.program;
        let Some(command) = program.get(self.pc) else {
            self.pc = self.program.len();
            return Ok(Flow::Halt);
        };
        trace!("{:>4}: {}", self.pc, command);
        match self.execute(command) {
            Ok(flow) => Ok(flow),
            Err(e) => {
                self.had_error = true;
                Err(e)
            }
        }
    }

    fn execute(&mut self, command: &Command) -> Result<Flow, RunError> {
        let pc = self.pc;
        let mut next = pc + 1;
        match command {
            Command::Mov { dest, imm } => *self.reg_mut(*dest) = *imm,
            Command::Add { dest, lhs, rhs } => {
                let res = (self.reg(*lhs) as u64).wrapping_add(self.operand(*rhs) as u64);
                *self.reg_mut(*dest) = res as i64;
            }
            Command::Sub { dest, lhs, rhs } => {
                let res = (self.reg(*lhs) as u64).wrapping_sub(self.operand(*rhs) as u64);
                *self.reg_mut(*dest) = res as i64;
            }
            Command::Cmp { lhs, rhs, signed } => {
                self.flags = Flags::compare(self.reg(*lhs), self.operand(*rhs), *signed);
            }
            Command::And { dest, lhs, rhs } => {
                *self.reg_mut(*dest) = self.reg(*lhs) & self.reg(*rhs);
            }
            Command::Eor { dest, lhs, rhs } => {
                *self.reg_mut(*dest) = self.reg(*lhs) ^ self.reg(*rhs);
            }
            Command::Orr { dest, lhs, rhs } => {
                *self.reg_mut(*dest) = self.reg(*lhs) | self.reg(*rhs);
            }
            Command::Lsl { dest, src, amount } => {
                let amount = self.shift_amount(*amount)?;
                *self.reg_mut(*dest) = ((self.reg(*src) as u64) << amount) as i64;
            }
            Command::Lsr { dest, src, amount } => {
                let amount = self.shift_amount(*amount)?;
                // Fill with zeroes
                *self.reg_mut(*dest) = ((self.reg(*src) as u64) >> amount) as i64;
            }
            Command::Asr { dest, src, amount } => {
                let amount = self.shift_amount(*amount)?;
                // Preserve sign bit
                *self.reg_mut(*dest) = self.reg(*src) >> amount;
            }
            Command::Load { dest, width, addr } => {
                let addr = self.operand(*addr);
                // High bytes must be zero even if the read fails
                *self.reg_mut(*dest) = 0;
                let val = Width::try_from(*width)
                    .and_then(|width| self.mem.load_word(addr, width))
                    .map_err(|error| RunError::Memory { pc, error })?;
                *self.reg_mut(*dest) = val as i64;
            }
            Command::Store { src, addr, width } => {
                let addr = self.operand(*addr);
                let val = self.reg(*src) as u64;
                Width::try_from(*width)
                    .and_then(|width| self.mem.store_word(addr, width, val))
                    .map_err(|error| RunError::Memory { pc, error })?;
            }
            Command::Put { text, addr } => {
                let addr = self.operand(*addr);
                let bytes = text.bytes().chain(std::iter::once(0));
                for (i, byte) in bytes.enumerate() {
                    let offset = addr.wrapping_add(i as i64);
                    self.mem
                        .store_byte(offset, byte)
                        .map_err(|error| RunError::Memory { pc, error })?;
                }
            }
            Command::Print { value, base } => {
                let value = self.operand(*value);
                self.print(value, *base)?;
            }
            Command::Branch { cond, target } => {
                if self.flags.holds(*cond) {
                    match self.program.labels().lookup(target) {
                        Some(idx) => next = idx,
                        None if is_exit_label(target) => {
                            debug!("branch to undefined exit label `{target}`");
                            next = self.program.len();
                        }
                        None => {
                            return Err(RunError::UnresolvedLabel { pc, label: target.clone() })
                        }
                    }
                }
            }
            Command::Call { target } => {
                let Some(idx) = self.program.labels().lookup(target) else {
                    return Err(RunError::UnresolvedLabel { pc, label: target.clone() });
                };
                debug!("call `{target}` from {pc}, depth {}", self.stack.len() + 1);
                self.stack.push(Frame {
                    regs: self.regs,
                    resume: pc + 1,
                });
                next = idx;
            }
            Command::Ret => match self.stack.pop() {
                Some(frame) => {
                    debug!("return to {}", frame.resume);
                    // x0 carries the return value
                    self.regs[1..].copy_from_slice(&frame.regs[1..]);
                    next = frame.resume;
                }
                None => {
                    debug!("return with empty call stack");
                    self.pc = self.program.len();
                    return Ok(Flow::Halt);
                }
            },
        }
        self.pc = next;
        if self.pc >= self.program.len() {
            self.pc = self.program.len();
            return Ok(Flow::Halt);
        }
        Ok(Flow::Continue)
    }

    fn print(&mut self, value: i64, base: Base) -> Result<(), RunError> {
        let line = match base {
            Base::Dec => format!("{value}"),
            Base::Hex => format!("0x{:x}", value as u64),
            Base::Bin => format!("0b{:b}", value as u64),
            Base::Str => self.read_str(value)?,
        };
        writeln!(self.out, "{line}").map_err(RunError::Output)
    }

    /// Read a null-terminated string starting at `offset`, at most `MEMORY_CAPACITY - 1` bytes.
    fn read_str(&self, offset: i64) -> Result<String, RunError> {
        let mut bytes = Vec::new();
        for i in 0..(MEMORY_CAPACITY - 1) as i64 {
            let byte = self
                .mem
                .load_byte(offset.wrapping_add(i))
                .map_err(|error| RunError::Memory { pc: self.pc, error })?;
            if byte == 0 {
                break;
            }
            bytes.push(byte);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn shift_amount(&self, amount: Operand) -> Result<u32, RunError> {
        let amount = self.operand(amount);
        match amount {
            0..=63 => Ok(amount as u32),
            _ => Err(RunError::ShiftAmount { pc: self.pc, amount }),
        }
    }

    #[inline]
    fn operand(&self, op: Operand) -> i64 {
        match op {
            Operand::Imm(val) => val,
            Operand::Reg(reg) => self.reg(reg),
        }
    }

    #[inline]
    pub fn reg(&self, reg: Register) -> i64 {
        self.regs[reg.index()]
    }

    #[inline]
    fn reg_mut(&mut self, reg: Register) -> &mut i64 {
        &mut self.regs[reg.index()]
    }

    pub fn registers(&self) -> &[i64; NUM_REGISTERS] {
        &self.regs
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn call_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Write the error flag, condition flags and all registers.
    pub fn dump_state(&self, mut w: impl Write) -> io::Result<()> {
        writeln!(w, "Error: {}", self.had_error as u8)?;
        writeln!(w, "Flags:")?;
        writeln!(w, "Is greater: {}", self.flags.greater as u8)?;
        writeln!(w, "Is equal: {}", self.flags.equal as u8)?;
        writeln!(w, "Is less: {}", self.flags.less as u8)?;
        writeln!(w)?;
        writeln!(w, "Variable values:")?;
        for (i, val) in self.regs.iter().enumerate() {
            write!(w, "x{i}: {val}")?;
            if i < NUM_REGISTERS - 1 {
                write!(w, ", ")?;
            }
            if (i + 1) % 8 == 0 {
                writeln!(w)?;
            }
        }
        writeln!(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run to completion, returning the interpreter for inspection.
    fn run_with(program: &Program) -> (Interpreter<'_, Vec<u8>>, Result<(), RunError>) {
        let mut interp = Interpreter::new(program, Vec::new());
        let res = interp.run();
        (interp, res)
    }

    fn output(interp: &Interpreter<'_, Vec<u8>>) -> String {
        String::from_utf8(interp.output().clone()).unwrap()
    }

    fn x(idx: u8) -> Register {
        Register::new(idx).unwrap()
    }

    macro_rules! run {
        ( $src:expr ) => {{
            let program = Program::parse($src).unwrap();
            let (interp, res) = run_with(&program);
            let regs = *interp.registers();
            let flags = interp.flags();
            let out = output(&interp);
            let had_error = interp.had_error();
            (regs, flags, out, had_error, res)
        }};
    }

    #[test]
    fn mov_every_register() {
        for idx in 0..NUM_REGISTERS as u8 {
            let src = format!("mov x{idx} {}", -7 * idx as i64 - 1);
            let (regs, _, _, _, res) = run!(&src);
            assert!(res.is_ok());
            assert_eq!(regs[idx as usize], -7 * idx as i64 - 1);
        }
    }

    #[test]
    fn add_prints_sum() {
        let (_, _, out, _, res) = run!("mov x0 5\nmov x1 10\nadd x2 x0 x1\nprint x2 d");
        assert!(res.is_ok());
        assert_eq!(out, "15\n");
    }

    #[test]
    fn wrapping_arithmetic() {
        let (regs, ..) = run!("sub x1 x0 1");
        assert_eq!(regs[1], -1);
        let (regs, ..) = run!("mov x0 0x7fffffffffffffff\nadd x1 x0 1\nadd x2 x0 x0");
        assert_eq!(regs[1], i64::MIN);
        assert_eq!(regs[2], -2);
    }

    #[test]
    fn compare_flags() {
        let (_, flags, ..) = run!("mov x0 -1\ncmp x0 1");
        assert_eq!(flags, Flags { greater: false, equal: false, less: true });
        let (_, flags, ..) = run!("mov x0 -1\ncmp_u x0 1");
        assert_eq!(flags, Flags { greater: true, equal: false, less: false });
        let (_, flags, ..) = run!("mov x0 3\nmov x1 3\ncmp_u x0 x1");
        assert_eq!(flags, Flags { greater: false, equal: true, less: false });
    }

    #[test]
    fn compare_sets_exactly_one_flag() {
        let values = [i64::MIN, -2, -1, 0, 1, 2, i64::MAX];
        for a in values {
            for b in values {
                for signed in [true, false] {
                    let flags = Flags::compare(a, b, signed);
                    let set = [flags.greater, flags.equal, flags.less];
                    assert_eq!(set.iter().filter(|f| **f).count(), 1, "{a} {b} {signed}");
                }
            }
        }
    }

    #[test]
    fn bitwise() {
        let (regs, ..) = run!(
            "mov x0 0b1100\nmov x1 0b1010\nand x2 x0 x1\neor x3 x0 x1\norr x4 x0 x1"
        );
        assert_eq!(regs[2], 0b1000);
        assert_eq!(regs[3], 0b0110);
        assert_eq!(regs[4], 0b1110);
    }

    #[test]
    fn shifts() {
        let (regs, ..) = run!(
            r#"
            mov x0 -8
            lsl x1 x0 1
            lsr x2 x0 60
            asr x3 x0 2
            mov x9 63
            lsl x4 x0 x9
            asr x5 x0 0
            "#
        );
        assert_eq!(regs[1], -16);
        assert_eq!(regs[2], 0xf);
        assert_eq!(regs[3], -2);
        assert_eq!(regs[4], 0);
        assert_eq!(regs[5], -8);
    }

    #[test]
    fn shift_out_of_range() {
        for src in ["mov x0 1\nlsl x1 x0 64", "mov x2 -1\nasr x1 x0 x2", "lsr x1 x0 100"] {
            let (_, _, _, had_error, res) = run!(src);
            assert!(had_error);
            assert!(matches!(res, Err(RunError::ShiftAmount { .. })));
        }
    }

    #[test]
    fn store_load_round_trip() {
        for (width, expected) in [(1, 0xefi64), (2, 0xcdef), (4, 0x89abcdef), (8, 0x0123456789abcdef)] {
            let src = format!(
                "mov x0 0x0123456789abcdef\nmov x1 0x100\nstore x0 x1 {width}\nmov x2 -1\nload x2 {width} 0x100"
            );
            let (regs, _, _, _, res) = run!(&src);
            assert!(res.is_ok());
            assert_eq!(regs[2], expected, "width {width}");
        }
    }

    #[test]
    fn load_zero_extends() {
        let (regs, ..) = run!("mov x0 -1\nstore x0 0 1\nload x1 1 0");
        assert_eq!(regs[1], 0xff);
    }

    #[test]
    fn load_address_from_dest() {
        let (regs, _, out, _, res) = run!(
            r#"
            mov x0 7
            store x0 0 8
            mov x0 42
            mov x1 0x100
            store x0 x1 8
            load x1 8 x1
            print x1 d
            "#
        );
        assert!(res.is_ok());
        assert_eq!(regs[1], 42);
        assert_eq!(out, "42
");
    }

    #[test]
    fn bad_width() {
        let (_, _, _, had_error, res) = run!("store x0 0 3");
        assert!(had_error);
        assert!(matches!(
            res,
            Err(RunError::Memory { pc: 0, error: MemoryError::InvalidWidth(3) })
        ));
        let (regs, _, _, _, res) = run!("mov x1 9\nload x1 5 0");
        assert!(res.is_err());
        assert_eq!(regs[1], 0);
    }

    #[test]
    fn out_of_bounds() {
        let src = format!("store x0 {} 8", MEMORY_CAPACITY - 7);
        let (_, _, _, _, res) = run!(&src);
        assert!(matches!(res, Err(RunError::Memory { error: MemoryError::OutOfBounds { .. }, .. })));
        let (_, _, _, _, res) = run!("mov x0 -1\nload x1 1 x0");
        assert!(res.is_err());
    }

    #[test]
    fn put_and_print_string() {
        let (_, _, out, _, res) = run!("put \"Hello World!\" x0\nprint x0 s");
        assert!(res.is_ok());
        assert_eq!(out, "Hello World!\n");
    }

    #[test]
    fn print_string_stops_at_null() {
        let (_, _, out, ..) = run!("put \"first\\0second\" 10\nprint 10 s\nprint 16 s");
        assert_eq!(out, "first\nsecond\n");
    }

    #[test]
    fn put_writes_to_memory() {
        let program = Program::parse("put \"ok\" 4").unwrap();
        let (interp, res) = run_with(&program);
        assert!(res.is_ok());
        assert_eq!(&interp.memory().as_slice()[3..8], b"\0ok\0\0");
    }

    #[test]
    fn print_string_without_null_fails() {
        let (_, _, out, had_error, res) = run!("mov x0 -1\nstore x0 1016 8\nprint 1016 s");
        assert!(had_error);
        assert!(matches!(
            res,
            Err(RunError::Memory { pc: 2, error: MemoryError::OutOfBounds { offset: 1024, .. } })
        ));
        assert_eq!(out, "");
    }

    #[test]
    fn print_string_is_capped() {
        let fill = "a".repeat(MEMORY_CAPACITY - 2);
        let src = format!(
            "put \"{fill}\" 0\nmov x0 0x6161616161616161\nstore x0 {} 8\nprint 0 s",
            MEMORY_CAPACITY - 8
        );
        let (_, _, out, had_error, res) = run!(&src);
        assert!(res.is_ok());
        assert!(!had_error);
        assert_eq!(out, format!("{}\n", "a".repeat(MEMORY_CAPACITY - 1)));
    }

    #[test]
    fn put_past_end_fails() {
        let src = format!("put \"abc\" {}", MEMORY_CAPACITY - 3);
        let (_, _, _, had_error, _) = run!(&src);
        assert!(had_error);
    }

    #[test]
    fn print_bases() {
        let (_, _, out, ..) = run!(
            "mov x0 -1\nprint x0 d\nprint x0 x\nprint 255 x\nprint 5 b\nprint 0 b\nprint 0 x"
        );
        assert_eq!(
            out,
            "-1\n0xffffffffffffffff\n0xff\n0b101\n0b0\n0x0\n".to_string()
        );
    }

    #[test]
    fn branches() {
        let (_, _, out, ..) = run!(
            r#"
                mov x0 0
            loop:
                cmp x0 3
                b.ge done
                print x0 d
                add x0 x0 1
                b loop
            done:
                print 99 d
            "#
        );
        assert_eq!(out, "0\n1\n2\n99\n");
    }

    #[test]
    fn branch_conditions() {
        let cases = [
            ("b.eq", 1, 1, true),
            ("b.eq", 1, 2, false),
            ("b.ne", 1, 2, true),
            ("b.gt", 2, 1, true),
            ("b.gt", 1, 1, false),
            ("b.ge", 1, 1, true),
            ("b.lt", -5, 1, true),
            ("b.le", 1, 1, true),
            ("b.le", 2, 1, false),
        ];
        for (branch, a, b, taken) in cases {
            let src = format!("mov x0 {a}\ncmp x0 {b}\n{branch} skip\nprint 1 d\nskip:\nprint 2 d");
            let (_, _, out, ..) = run!(&src);
            let expected = if taken { "2\n" } else { "1\n2\n" };
            assert_eq!(out, expected, "{branch} {a} {b}");
        }
    }

    #[test]
    fn unresolved_branch() {
        let (_, _, out, had_error, res) = run!("print 1 d\nb nowhere\nprint 2 d");
        assert!(had_error);
        assert_eq!(out, "1\n");
        match res {
            Err(RunError::UnresolvedLabel { pc, label }) => {
                assert_eq!(pc, 1);
                assert_eq!(label, "nowhere");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn untaken_unresolved_branch_is_fine() {
        let (_, _, out, had_error, _) = run!("mov x0 1\ncmp x0 2\nb.eq nowhere\nprint 3 d");
        assert!(!had_error);
        assert_eq!(out, "3\n");
    }

    #[test]
    fn exit_label_ends_program() {
        let (_, _, out, had_error, res) = run!("print 1 d\nb .L3\nprint 2 d");
        assert!(res.is_ok());
        assert!(!had_error);
        assert_eq!(out, "1\n");
    }

    #[test]
    fn trailing_label_ends_program() {
        let (_, _, out, _, res) = run!("b end\nprint 2 d\nend:");
        assert!(res.is_ok());
        assert_eq!(out, "");
    }

    #[test]
    fn call_restores_all_but_x0() {
        let (regs, _, out, _, res) = run!(
            r#"
                mov x0 1
                mov x1 2
                mov x31 3
                call func
                print x0 d
                print x1 d
                print x31 d
                ret
            func:
                mov x0 10
                mov x1 20
                mov x31 30
                ret
            "#
        );
        assert!(res.is_ok());
        assert_eq!(out, "10\n2\n3\n");
        assert_eq!(regs[0], 10);
    }

    #[test]
    fn recursion() {
        // Sum 1..=5 recursively, result in x0
        let (_, _, out, _, res) = run!(
            r#"
                mov x1 5
                call sum
                print x0 d
                ret
            sum:
                cmp x1 0
                b.ne recurse
                mov x0 0
                ret
            recurse:
                sub x1 x1 1
                call sum
                add x1 x1 1
                add x0 x0 x1
                ret
            "#
        );
        assert!(res.is_ok());
        assert_eq!(out, "15\n");
    }

    #[test]
    fn unresolved_call() {
        let (_, _, _, had_error, res) = run!("call .L1");
        assert!(had_error);
        assert!(matches!(res, Err(RunError::UnresolvedLabel { .. })));
    }

    #[test]
    fn top_level_ret_halts() {
        let (_, _, out, had_error, res) = run!("print 1 d\nret\nprint 2 d");
        assert!(res.is_ok());
        assert!(!had_error);
        assert_eq!(out, "1\n");
    }

    #[test]
    fn stack_drained_after_error() {
        let program = Program::parse("call f\nf:\ncall g\ng:\nb missing").unwrap();
        let (interp, res) = run_with(&program);
        assert!(res.is_err());
        assert_eq!(interp.call_depth(), 0);
    }

    #[test]
    fn stopped_after_error() {
        let program = Program::parse("b missing\nprint 1 d").unwrap();
        let mut interp = Interpreter::new(&program, Vec::new());
        assert!(interp.step().is_err());
        assert!(matches!(interp.step(), Err(RunError::Stopped)));
        assert!(matches!(interp.run(), Err(RunError::Stopped)));
        assert!(interp.output().is_empty());
    }

    #[test]
    fn step_by_step() {
        let program = Program::parse("mov x3 4\nmov x4 5").unwrap();
        let mut interp = Interpreter::new(&program, Vec::new());
        assert_eq!(interp.step().unwrap(), Flow::Continue);
        assert_eq!(interp.reg(x(3)), 4);
        assert_eq!(interp.step().unwrap(), Flow::Halt);
        assert_eq!(interp.step().unwrap(), Flow::Halt);
        assert_eq!(interp.pc(), 2);
    }

    #[test]
    fn empty_program() {
        let program = Program::new();
        let (interp, res) = run_with(&program);
        assert!(res.is_ok());
        assert!(!interp.had_error());
    }

    #[test]
    fn state_dump_format() {
        let program = Program::parse("mov x1 -4\nmov x8 9\ncmp x1 0").unwrap();
        let (interp, _) = run_with(&program);
        let mut dump = Vec::new();
        interp.dump_state(&mut dump).unwrap();
        let dump = String::from_utf8(dump).unwrap();
        let expected = "Error: 0\n\
            Flags:\n\
            Is greater: 0\n\
            Is equal: 0\n\
            Is less: 1\n\
            \n\
            Variable values:\n\
            x0: 0, x1: -4, x2: 0, x3: 0, x4: 0, x5: 0, x6: 0, x7: 0, \n\
            x8: 9, x9: 0, x10: 0, x11: 0, x12: 0, x13: 0, x14: 0, x15: 0, \n\
            x16: 0, x17: 0, x18: 0, x19: 0, x20: 0, x21: 0, x22: 0, x23: 0, \n\
            x24: 0, x25: 0, x26: 0, x27: 0, x28: 0, x29: 0, x30: 0, x31: 0\n\
            \n";
        assert_eq!(dump, expected);
    }
}
