pub mod cli;
pub mod config;
pub mod interpreter;
pub mod lexer;
pub mod repl;
pub mod value;

pub use interpreter::{parse_and_run, Interpreter, LispError};
pub use lexer::Token;
pub use value::Value;
