// Parsing
mod lexer;
mod parser;
pub use parser::AsmParser;
mod air;
pub use air::{Command, Operand, Problem, Program, ValidationError};
mod label;
pub use label::{is_exit_label, LabelTable, EXIT_LABEL_PREFIX};
mod symbol;
pub use symbol::{Base, Cond, Register, NUM_REGISTERS};

// Running
mod memory;
pub use memory::{Memory, MemoryError, Width, MEMORY_CAPACITY};
mod runtime;
pub use runtime::{Flags, Flow, Interpreter, RunError};

mod error;
mod span;
pub use span::Span;

pub mod env;
pub mod logger;

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 4;
