// File: src/lib.rs
//
// Library entry point for the yy interpreter.
//
// The one-call boundary for embedders is `execute(source, sink)`: it parses
// and evaluates a whole program, delivering output lines through the sink
// and reporting the first fault as a structured error.

pub mod ast;
pub mod builtins;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod repl;

pub use errors::{ErrorKind, YyError};
pub use interpreter::{execute, Interpreter, DEFAULT_FUEL};
