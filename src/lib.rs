pub mod ast;
pub mod error;
pub mod interpreter;

// Re-export the embedding surface for convenience
pub use ast::Program;
pub use error::RuntimeError;
pub use interpreter::{Interpreter, InterpreterConfig};
