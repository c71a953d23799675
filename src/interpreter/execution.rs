//! Stepwise program runs.
//!
//! An [`Execution`] owns the cursor over a program's top-level statements.
//! It starts `Running` at the first statement and ends in exactly one of the
//! two halted states; once halted it never resumes.

use crate::ast::Node;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// The cursor moved past the last statement.
    Normal,
    /// A statement raised an error.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted(Halt),
}

pub struct Execution<'a> {
    interpreter: &'a mut Interpreter,
    statements: &'a [Node],
    cursor: usize,
    state: State,
}

impl<'a> Execution<'a> {
    pub(crate) fn new(interpreter: &'a mut Interpreter, statements: &'a [Node]) -> Self {
        Self {
            interpreter,
            statements,
            cursor: 0,
            state: State::Running,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Index of the next statement to evaluate.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn interpreter(&self) -> &Interpreter {
        self.interpreter
    }

    /// Evaluate the statement under the cursor and advance.
    ///
    /// Returns `Ok(true)` when a statement was evaluated and `Ok(false)` once
    /// the run is halted. An error halts the run and is returned once;
    /// later calls return `Ok(false)`.
    pub fn step(&mut self) -> Result<bool, RuntimeError> {
        if self.state != State::Running {
            return Ok(false);
        }
        let statements = self.statements;
        let Some(statement) = statements.get(self.cursor) else {
            self.halt(Halt::Normal);
            return Ok(false);
        };
        if let Some(limit) = self.interpreter.config().step_limit {
            if self.cursor >= limit {
                self.halt(Halt::Error);
                return Err(RuntimeError::StepLimitExceeded { limit });
            }
        }

        tracing::trace!(cursor = self.cursor, "evaluating statement");
        match self.interpreter.evaluate(statement) {
            Ok(_) => {
                self.cursor += 1;
                if self.cursor == statements.len() {
                    self.halt(Halt::Normal);
                }
                Ok(true)
            }
            Err(e) => {
                tracing::debug!(cursor = self.cursor, error = %e, "statement failed");
                self.halt(Halt::Error);
                Err(e)
            }
        }
    }

    /// Step until halted.
    pub fn run(mut self) -> Result<(), RuntimeError> {
        while self.step()? {}
        Ok(())
    }

    fn halt(&mut self, halt: Halt) {
        tracing::debug!(?halt, statements = self.cursor, "program halted");
        self.state = State::Halted(halt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Node, Program};
    use crate::interpreter::InterpreterConfig;

    fn interpreter() -> Interpreter {
        Interpreter::new().with_writer(std::io::sink())
    }

    #[test]
    fn runs_to_normal_halt() {
        let program = Program::new(vec![
            Node::print(Node::integer(1)),
            Node::print(Node::integer(2)),
        ]);
        let mut interp = interpreter();
        let mut execution = interp.execute(&program);
        assert_eq!(execution.state(), State::Running);

        assert!(execution.step().expect("first statement"));
        assert_eq!(execution.cursor(), 1);
        assert_eq!(execution.state(), State::Running);

        assert!(execution.step().expect("second statement"));
        assert_eq!(execution.state(), State::Halted(Halt::Normal));
        assert_eq!(execution.interpreter().output(), ["1", "2"]);

        assert!(!execution.step().expect("halted runs stay halted"));
    }

    #[test]
    fn empty_program_halts_on_first_step() {
        let program = Program::default();
        let mut interp = interpreter();
        let mut execution = interp.execute(&program);
        assert!(!execution.step().expect("nothing to run"));
        assert_eq!(execution.state(), State::Halted(Halt::Normal));
    }

    #[test]
    fn error_halts_and_is_not_repeated() {
        let program = Program::new(vec![
            Node::print(Node::string("before")),
            Node::print(Node::var("missing")),
            Node::print(Node::string("after")),
        ]);
        let mut interp = interpreter();
        let mut execution = interp.execute(&program);
        assert!(execution.step().expect("first statement"));
        let err = execution.step().unwrap_err();
        assert!(matches!(err, RuntimeError::UnboundVariable { .. }));
        assert_eq!(execution.state(), State::Halted(Halt::Error));
        assert_eq!(execution.cursor(), 1);

        assert!(!execution.step().expect("halted runs stay halted"));
        assert_eq!(interp.output(), ["before"]);
    }

    #[test]
    fn side_effects_before_a_failure_are_kept() {
        // x = 1; x = (x = 2) / 0
        let program = Program::new(vec![
            Node::declare("x", Node::integer(1)),
            Node::update(
                "x",
                Node::binary(
                    BinaryOp::Division,
                    Node::update("x", Node::integer(2)),
                    Node::integer(0),
                ),
            ),
        ]);
        let mut interp = interpreter();
        let err = interp.interpret(&program).unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero { .. }));
        assert_eq!(
            interp.evaluate(&Node::var("x")).expect("x is bound"),
            crate::interpreter::value::Value::Integer(2)
        );
    }

    #[test]
    fn step_limit_halts_with_error() {
        let program = Program::new(vec![
            Node::print(Node::integer(1)),
            Node::print(Node::integer(2)),
            Node::print(Node::integer(3)),
        ]);
        let config = InterpreterConfig {
            step_limit: Some(2),
            ..InterpreterConfig::default()
        };
        let mut interp = Interpreter::with_config(config).with_writer(std::io::sink());
        let err = interp.interpret(&program).unwrap_err();
        assert!(matches!(err, RuntimeError::StepLimitExceeded { limit: 2 }));
        assert_eq!(interp.output(), ["1", "2"]);
    }

    #[test]
    fn step_limit_allows_programs_within_budget() {
        let program = Program::new(vec![Node::print(Node::integer(1))]);
        let config = InterpreterConfig {
            step_limit: Some(1),
            ..InterpreterConfig::default()
        };
        let mut interp = Interpreter::with_config(config).with_writer(std::io::sink());
        interp.interpret(&program).expect("within budget");
    }
}
