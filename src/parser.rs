use miette::Result;

use crate::{
    air::{Command, Operand, Program},
    error,
    lexer::{tokenize, Token, TokenKind},
    span::{Idx, Span},
    symbol::{Base, InstrKind, Register},
};

/// Transforms token stream into a [`Program`].
///
/// Labels are entered into the table as they are defined, so by the time parsing finishes every
/// forward reference can be resolved. Branch targets themselves are kept as names and only looked
/// up when executed.
pub struct AsmParser<'a> {
    /// Reference to the source file
    src: &'a str,
    toks: Vec<Token>,
    pos: usize,
    program: Program,
}

impl<'a> AsmParser<'a> {
    pub fn new(src: &'a str) -> Result<Self> {
        let toks = tokenize(src)?;
        Ok(AsmParser {
            src,
            toks,
            pos: 0,
            program: Program::new(),
        })
    }

    fn get_span(&self, span: Span) -> &'a str {
        &self.src[span.as_range()]
    }

    /// Current token. The stream always ends with `Eof`, which is never consumed.
    fn peek(&self) -> &Token {
        &self.toks[self.pos.min(self.toks.len() - 1)]
    }

    fn peek_second(&self) -> &Token {
        &self.toks[(self.pos + 1).min(self.toks.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    /// Create program out of token stream
    pub fn parse(mut self) -> Result<Program> {
        loop {
            self.skip_newlines();
            match self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::Ident if self.peek_second().kind == TokenKind::Colon => {
                    let label = self.advance();
                    self.advance();
                    let name = self.get_span(label.span);
                    if !self.program.define_label(name) {
                        return Err(error::parse_duplicate_label(label.span, self.src));
                    }
                }
                TokenKind::Ident => {
                    let start = self.peek().span;
                    let command = self.parse_command()?;
                    let end = self.toks[self.pos - 1].span;
                    let span = Span::new(Idx(start.offs() as u32), (end.end() - start.offs()) as u32);
                    self.program.push(command, span);
                    self.expect_line_end()?;
                }
                _ => {
                    let tok = self.peek().clone();
                    return Err(error::parse_generic_unexpected(
                        self.src,
                        "instruction or label",
                        &tok,
                    ));
                }
            }
        }
        // Consume self to return program
        Ok(self.program)
    }

    fn skip_newlines(&mut self) {
        while self.peek().kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn expect_line_end(&mut self) -> Result<()> {
        match self.peek().kind {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => {
                let tok = self.peek().clone();
                Err(error::parse_generic_unexpected(self.src, "end of line", &tok))
            }
        }
    }

    /// Process several tokens to form a single command
    fn parse_command(&mut self) -> Result<Command> {
        let tok = self.advance();
        let kind: InstrKind = match self.get_span(tok.span).parse() {
            Ok(kind) => kind,
            Err(()) => return Err(error::parse_unknown_instr(tok.span, self.src)),
        };
        let command = match kind {
            InstrKind::Mov => {
                let dest = self.expect_reg()?;
                let imm = self.expect_imm()?;
                Command::Mov { dest, imm }
            }
            InstrKind::Add | InstrKind::Sub => {
                let dest = self.expect_reg()?;
                let lhs = self.expect_reg()?;
                let rhs = self.expect_operand()?;
                if kind == InstrKind::Add {
                    Command::Add { dest, lhs, rhs }
                } else {
                    Command::Sub { dest, lhs, rhs }
                }
            }
            InstrKind::Cmp | InstrKind::CmpU => {
                let lhs = self.expect_reg()?;
                let rhs = self.expect_operand()?;
                Command::Cmp { lhs, rhs, signed: kind == InstrKind::Cmp }
            }
            InstrKind::And | InstrKind::Eor | InstrKind::Orr => {
                let dest = self.expect_reg()?;
                let lhs = self.expect_reg()?;
                let rhs = self.expect_reg()?;
                match kind {
                    InstrKind::And => Command::And { dest, lhs, rhs },
                    InstrKind::Eor => Command::Eor { dest, lhs, rhs },
                    _ => Command::Orr { dest, lhs, rhs },
                }
            }
            InstrKind::Lsl | InstrKind::Lsr | InstrKind::Asr => {
                let dest = self.expect_reg()?;
                let src = self.expect_reg()?;
                let amount = self.expect_operand()?;
                match kind {
                    InstrKind::Lsl => Command::Lsl { dest, src, amount },
                    InstrKind::Lsr => Command::Lsr { dest, src, amount },
                    _ => Command::Asr { dest, src, amount },
                }
            }
            InstrKind::Load => {
                let dest = self.expect_reg()?;
                let width = self.expect_imm()?;
                let addr = self.expect_operand()?;
                Command::Load { dest, width, addr }
            }
            InstrKind::Store => {
                let src = self.expect_reg()?;
                let addr = self.expect_operand()?;
                let width = self.expect_imm()?;
                Command::Store { src, addr, width }
            }
            InstrKind::Put => {
                let text = self.expect_str()?;
                let addr = self.expect_operand()?;
                Command::Put { text, addr }
            }
            InstrKind::Print => {
                let value = self.expect_operand()?;
                let base = self.expect_base()?;
                Command::Print { value, base }
            }
            InstrKind::Branch(cond) => {
                let target = self.expect_label()?;
                Command::Branch { cond, target }
            }
            InstrKind::Call => {
                let target = self.expect_label()?;
                Command::Call { target }
            }
            InstrKind::Ret => Command::Ret,
        };
        Ok(command)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        let tok = self.peek().clone();
        if std::mem::discriminant(&tok.kind) == std::mem::discriminant(&expected) {
            Ok(self.advance())
        } else {
            Err(error::parse_generic_unexpected(self.src, &expected.to_string(), &tok))
        }
    }

    fn expect_reg(&mut self) -> Result<Register> {
        let tok = self.peek().clone();
        if tok.kind != TokenKind::Ident {
            return Err(error::parse_generic_unexpected(self.src, "register", &tok));
        }
        self.advance();
        self.get_span(tok.span)
            .parse()
            .map_err(|()| error::parse_bad_register(tok.span, self.src))
    }

    fn expect_imm(&mut self) -> Result<i64> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Num(val) => {
                self.advance();
                Ok(val)
            }
            _ => Err(error::parse_generic_unexpected(self.src, "numeric literal", &tok)),
        }
    }

    /// Register or immediate.
    fn expect_operand(&mut self) -> Result<Operand> {
        match self.peek().kind {
            TokenKind::Num(_) => Ok(Operand::Imm(self.expect_imm()?)),
            TokenKind::Ident => Ok(Operand::Reg(self.expect_reg()?)),
            _ => {
                let tok = self.peek().clone();
                Err(error::parse_generic_unexpected(
                    self.src,
                    "register or numeric literal",
                    &tok,
                ))
            }
        }
    }

    fn expect_str(&mut self) -> Result<String> {
        match self.expect(TokenKind::Str(String::new()))?.kind {
            TokenKind::Str(text) => Ok(text),
            _ => unreachable!(),
        }
    }

    fn expect_base(&mut self) -> Result<Base> {
        let tok = self.expect(TokenKind::Ident)?;
        self.get_span(tok.span)
            .parse()
            .map_err(|()| error::parse_bad_base(tok.span, self.src))
    }

    fn expect_label(&mut self) -> Result<String> {
        let tok = self.expect(TokenKind::Ident)?;
        Ok(self.get_span(tok.span).to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Cond;

    fn reg(idx: u8) -> Register {
        Register::new(idx).unwrap()
    }

    fn parse(src: &str) -> Program {
        AsmParser::new(src).unwrap().parse().unwrap()
    }

    #[test]
    fn parse_add_basic() {
        let program = parse("add x2 x0 x1");
        assert_eq!(
            program.get(0),
            Some(&Command::Add { dest: reg(2), lhs: reg(0), rhs: Operand::Reg(reg(1)) })
        );
    }

    #[test]
    fn parse_imm_operands() {
        let program = parse(
            r#"
            sub x0, x1, -16
            cmp_u x3 0xff
            lsl x4 x4 3
            "#,
        );
        assert_eq!(program.len(), 3);
        assert_eq!(
            program.get(0),
            Some(&Command::Sub { dest: reg(0), lhs: reg(1), rhs: Operand::Imm(-16) })
        );
        assert_eq!(
            program.get(1),
            Some(&Command::Cmp { lhs: reg(3), rhs: Operand::Imm(255), signed: false })
        );
        assert_eq!(
            program.get(2),
            Some(&Command::Lsl { dest: reg(4), src: reg(4), amount: Operand::Imm(3) })
        );
    }

    #[test]
    fn parse_memory_commands() {
        let program = parse(
            r#"
            load x1 8 x2
            store x1 16 4
            put "hi\n" 0
            print x0 s
            "#,
        );
        assert_eq!(
            program.get(0),
            Some(&Command::Load { dest: reg(1), width: 8, addr: Operand::Reg(reg(2)) })
        );
        assert_eq!(
            program.get(1),
            Some(&Command::Store { src: reg(1), addr: Operand::Imm(16), width: 4 })
        );
        assert_eq!(
            program.get(2),
            Some(&Command::Put { text: "hi\n".into(), addr: Operand::Imm(0) })
        );
        assert_eq!(
            program.get(3),
            Some(&Command::Print { value: Operand::Reg(reg(0)), base: Base::Str })
        );
    }

    #[test]
    fn mov_takes_only_immediates() {
        assert!(AsmParser::new("mov x0 x1").unwrap().parse().is_err());
    }

    #[test]
    fn bitwise_takes_only_registers() {
        assert!(AsmParser::new("and x0 x1 5").unwrap().parse().is_err());
        assert!(AsmParser::new("orr x0 x1 x2").unwrap().parse().is_ok());
    }

    #[test]
    fn bad_register() {
        assert!(AsmParser::new("mov x32 1").unwrap().parse().is_err());
        assert!(AsmParser::new("add x0 y1 x2").unwrap().parse().is_err());
    }

    #[test]
    fn bad_base() {
        assert!(AsmParser::new("print x0 q").unwrap().parse().is_err());
        assert!(AsmParser::new("print x0").unwrap().parse().is_err());
    }

    #[test]
    fn base_letters_are_not_mnemonics() {
        let program = parse("print x0 b\nprint x0 x");
        assert_eq!(
            program.get(0),
            Some(&Command::Print { value: Operand::Reg(reg(0)), base: Base::Bin })
        );
        assert_eq!(
            program.get(1),
            Some(&Command::Print { value: Operand::Reg(reg(0)), base: Base::Hex })
        );
    }

    #[test]
    fn unknown_instruction() {
        assert!(AsmParser::new("jmp x0").unwrap().parse().is_err());
    }

    #[test]
    fn trailing_tokens() {
        assert!(AsmParser::new("ret x0").unwrap().parse().is_err());
        assert!(AsmParser::new("mov x0 1 2").unwrap().parse().is_err());
    }

    #[test]
    fn parse_labels() {
        let program = parse(
            r#"
            main:
                b.ne forward
            loop: again:
                call loop
            forward:
                ret
            end:
            "#,
        );
        let labels = program.labels();
        assert_eq!(labels.lookup("main"), Some(0));
        assert_eq!(labels.lookup("loop"), Some(1));
        assert_eq!(labels.lookup("again"), Some(1));
        assert_eq!(labels.lookup("forward"), Some(2));
        assert_eq!(labels.lookup("end"), Some(3));
        assert_eq!(
            program.get(0),
            Some(&Command::Branch { cond: Cond::Ne, target: "forward".into() })
        );
        assert_eq!(program.get(1), Some(&Command::Call { target: "loop".into() }));
        assert_eq!(program.get(2), Some(&Command::Ret));
    }

    #[test]
    fn label_on_same_line() {
        let program = parse("start: mov x0 1\n b start");
        assert_eq!(program.labels().lookup("start"), Some(0));
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn duplicate_label() {
        assert!(AsmParser::new("a:\nret\na:\nret").unwrap().parse().is_err());
    }

    #[test]
    fn command_spans() {
        let src = "  mov x0 5 ; five\nprint x0 d";
        let program = parse(src);
        assert_eq!(&src[program.span(0).unwrap().as_range()], "mov x0 5");
        assert_eq!(&src[program.span(1).unwrap().as_range()], "print x0 d");
    }

    #[test]
    fn empty_source() {
        assert!(parse("").is_empty());
        assert!(parse("\n ; only a comment\n\n").is_empty());
    }

    #[test]
    fn missing_operand_at_eof() {
        assert!(AsmParser::new("add x0 x1").unwrap().parse().is_err());
    }
}
