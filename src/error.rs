use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::ast::Span;
use crate::interpreter::value::Value;

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.offset.into(), span.len)
    }
}

/// Errors raised while evaluating a program. All of them are fatal to the
/// current run; `Return` is the one exception and only ever travels up to the
/// nearest function call.
#[derive(Error, Debug, Diagnostic)]
pub enum RuntimeError {
    #[error("undefined variable '{name}'")]
    #[diagnostic(code(funk::unbound_variable))]
    UnboundVariable {
        name: String,
        #[label("not bound in any enclosing scope")]
        span: SourceSpan,
    },

    #[error("undefined function '{name}'")]
    #[diagnostic(code(funk::undefined_function))]
    UndefinedFunction {
        name: String,
        #[label("called here")]
        span: SourceSpan,
    },

    #[error("'{name}' expects {} but got {got}", describe_arity(.min, .max))]
    #[diagnostic(code(funk::arity_mismatch))]
    ArityMismatch {
        name: String,
        min: usize,
        max: usize,
        got: usize,
        #[label("called here")]
        span: SourceSpan,
    },

    #[error("type mismatch: {message}")]
    #[diagnostic(code(funk::type_mismatch))]
    TypeMismatch {
        message: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("division by zero")]
    #[diagnostic(code(funk::division_by_zero))]
    DivisionByZero {
        #[label("right operand is zero")]
        span: SourceSpan,
    },

    #[error("invalid assignment target")]
    #[diagnostic(
        code(funk::invalid_assignment_target),
        help("only variables can be assigned, incremented or decremented")
    )]
    InvalidAssignmentTarget {
        #[label("not a variable")]
        span: SourceSpan,
    },

    #[error("integer overflow in {operation}")]
    #[diagnostic(code(funk::integer_overflow))]
    IntegerOverflow {
        operation: &'static str,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("maximum call depth of {limit} exceeded")]
    #[diagnostic(code(funk::recursion_limit))]
    RecursionLimit {
        limit: usize,
        #[label("call made here")]
        span: SourceSpan,
    },

    #[error("'return' outside of a function")]
    #[diagnostic(code(funk::return_outside_function))]
    ReturnOutsideFunction {
        #[label("here")]
        span: SourceSpan,
    },

    #[error("program exceeded its budget of {limit} top-level statements")]
    #[diagnostic(code(funk::step_limit))]
    StepLimitExceeded { limit: usize },

    #[error("failed to write program output")]
    #[diagnostic(code(funk::output))]
    Output(#[from] std::io::Error),

    #[error("return")]
    Return { value: Value, span: Span },
}

impl RuntimeError {
    pub fn unbound_variable(name: impl Into<String>, span: Span) -> Self {
        Self::UnboundVariable {
            name: name.into(),
            span: span.into(),
        }
    }

    pub fn undefined_function(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedFunction {
            name: name.into(),
            span: span.into(),
        }
    }

    pub fn arity_mismatch(
        name: impl Into<String>,
        (min, max): (usize, usize),
        got: usize,
        span: Span,
    ) -> Self {
        Self::ArityMismatch {
            name: name.into(),
            min,
            max,
            got,
            span: span.into(),
        }
    }

    pub fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        Self::TypeMismatch {
            message: message.into(),
            span: span.into(),
        }
    }

    pub fn division_by_zero(span: Span) -> Self {
        Self::DivisionByZero { span: span.into() }
    }

    pub fn invalid_assignment_target(span: Span) -> Self {
        Self::InvalidAssignmentTarget { span: span.into() }
    }

    pub fn integer_overflow(operation: &'static str, span: Span) -> Self {
        Self::IntegerOverflow {
            operation,
            span: span.into(),
        }
    }

    /// Byte offset of the offending node, when the error is tied to one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnboundVariable { span, .. }
            | Self::UndefinedFunction { span, .. }
            | Self::ArityMismatch { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::DivisionByZero { span }
            | Self::InvalidAssignmentTarget { span }
            | Self::IntegerOverflow { span, .. }
            | Self::RecursionLimit { span, .. }
            | Self::ReturnOutsideFunction { span } => Some(span.offset()),
            Self::Return { span, .. } => Some(span.offset),
            Self::StepLimitExceeded { .. } | Self::Output(_) => None,
        }
    }
}

fn describe_arity(min: &usize, max: &usize) -> String {
    let plural = |n: usize| if n == 1 { "argument" } else { "arguments" };
    if min == max {
        format!("{min} {}", plural(*min))
    } else {
        format!("{min} to {max} {}", plural(*max))
    }
}
