pub mod parser;
pub mod environment;
pub mod error;
pub mod control_flow;
pub mod builtins;
pub mod evaluator;

pub use error::LispError;
pub use control_flow::ControlFlow;
pub use environment::{Environment, Frame, FrameGuard};
pub use parser::{parse, Continuation, NoContinuation, Parser};
pub use builtins::io::{BufferConsole, Console, StdConsole};
pub use evaluator::{parse_and_run, Interpreter, InterpreterConfig, DEFAULT_MAX_DEPTH};
