pub mod callable;
pub mod environment;
pub mod execution;
pub mod operators;
pub mod value;

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::ast::*;
use crate::error::RuntimeError;
use crate::interpreter::callable::UserFunction;
use crate::interpreter::environment::Environment;
use crate::interpreter::execution::Execution;
use crate::interpreter::value::Value;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Maximum number of top-level statements a single run may evaluate.
    pub step_limit: Option<usize>,
    pub max_call_depth: usize,
    /// Keep every printed line for [`Interpreter::output`]. Long-running
    /// hosts that only need the writer turn this off.
    pub capture_output: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            step_limit: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            capture_output: true,
        }
    }
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    config: InterpreterConfig,
    output: Vec<String>,
    /// Writer for print output (allows testing without stdout)
    writer: Box<dyn Write>,
    call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        Self {
            globals: Rc::clone(&globals),
            environment: globals,
            config,
            output: Vec::new(),
            writer: Box::new(std::io::stdout()),
            call_depth: 0,
        }
    }

    /// Send print effects to `writer` instead of stdout.
    pub fn with_writer(mut self, writer: impl Write + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Run every top-level statement in order, stopping at the first error.
    pub fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.execute(program).run()
    }

    /// Start a stepwise run of `program`. Bindings persist in this
    /// interpreter across runs.
    pub fn execute<'a>(&'a mut self, program: &'a Program) -> Execution<'a> {
        Execution::new(self, &program.statements)
    }

    /// Every print effect produced so far, in order. Empty when
    /// [`InterpreterConfig::capture_output`] is off.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Evaluate a single top-level node in the current scope.
    pub fn evaluate(&mut self, node: &Node) -> Result<Value, RuntimeError> {
        self.evaluate_node(node).map_err(|e| match e {
            RuntimeError::Return { span, .. } => RuntimeError::ReturnOutsideFunction {
                span: span.into(),
            },
            other => other,
        })
    }

    fn evaluate_node(&mut self, node: &Node) -> Result<Value, RuntimeError> {
        match node {
            Node::Literal(l) => Ok(Value::from(&l.value)),
            Node::VariableRef(v) => self.look_up_variable(v),
            Node::BinaryOperator(b) => self.evaluate_binary(b),
            Node::UnaryOperator(u) => self.evaluate_unary(u),
            Node::Assignment(a) => self.evaluate_assignment(a),
            Node::Container(c) => c
                .items
                .iter()
                .map(|item| self.evaluate_node(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Node::FunctionDef(f) => {
                let function = UserFunction::new(f.clone(), &self.environment);
                self.environment
                    .borrow_mut()
                    .define_function(f.name.clone(), function);
                tracing::trace!(name = %f.name, "registered function");
                Ok(Value::Null)
            }
            Node::CallExpression(c) => self.evaluate_call(c),
            Node::Condition(c) => {
                self.evaluate_condition(c)?;
                Ok(Value::Null)
            }
            Node::WhileLoop(w) => {
                while self.evaluate_node(&w.test)?.is_truthy() {
                    let env = self.child_scope();
                    self.execute_block(&w.body, env)?;
                }
                if let Some(ref other) = w.other {
                    self.evaluate_condition(other)?;
                }
                Ok(Value::Null)
            }
            Node::Print(p) => {
                let value = self.evaluate_node(&p.expression)?;
                let text = value.to_string();
                writeln!(self.writer, "{text}")?;
                if self.config.capture_output {
                    self.output.push(text);
                }
                Ok(Value::Null)
            }
            Node::Return(r) => {
                let value = match &r.value {
                    Some(val) => self.evaluate_node(val)?,
                    None => Value::Null,
                };
                Err(RuntimeError::Return {
                    value,
                    span: r.span,
                })
            }
        }
    }

    fn child_scope(&self) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &self.environment,
        ))))
    }

    fn scope_for(&self, scope: VariableScope) -> &Rc<RefCell<Environment>> {
        match scope {
            VariableScope::Local => &self.environment,
            VariableScope::Global => &self.globals,
        }
    }

    fn execute_block(
        &mut self,
        statements: &[Node],
        env: Rc<RefCell<Environment>>,
    ) -> Result<(), RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, env);
        let result = statements
            .iter()
            .try_for_each(|s| self.evaluate_node(s).map(drop));
        self.environment = previous;
        result
    }

    fn look_up_variable(&self, v: &VariableExpr) -> Result<Value, RuntimeError> {
        self.scope_for(v.scope)
            .borrow()
            .get(&v.name)
            .ok_or_else(|| RuntimeError::unbound_variable(&v.name, v.span))
    }

    fn evaluate_binary(&mut self, b: &BinaryExpr) -> Result<Value, RuntimeError> {
        match b.operator {
            BinaryOp::LogicalAnd => {
                if !self.evaluate_node(&b.left)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.evaluate_node(&b.right)?.is_truthy()))
            }
            BinaryOp::LogicalOr => {
                if self.evaluate_node(&b.left)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.evaluate_node(&b.right)?.is_truthy()))
            }
            op => {
                let left = self.evaluate_node(&b.left)?;
                let right = self.evaluate_node(&b.right)?;
                operators::evaluate_binary(op, left, right, b.span)
            }
        }
    }

    fn evaluate_unary(&mut self, u: &UnaryExpr) -> Result<Value, RuntimeError> {
        match u.operator {
            UnaryOp::Negation => {
                let operand = self.evaluate_node(&u.operand)?;
                operators::negate(operand, u.span)
            }
            UnaryOp::LogicalNot => Ok(Value::Bool(!self.evaluate_node(&u.operand)?.is_truthy())),
            UnaryOp::PreIncrement | UnaryOp::PreDecrement => {
                let Node::VariableRef(target) = u.operand.as_ref() else {
                    return Err(RuntimeError::invalid_assignment_target(u.operand.span()));
                };
                let current = self.look_up_variable(target)?;
                let delta = if u.operator == UnaryOp::PreIncrement { 1 } else { -1 };
                let updated = operators::offset(&current, delta, u.span)?;
                self.scope_for(target.scope)
                    .borrow_mut()
                    .assign(&target.name, updated.clone());
                Ok(updated)
            }
        }
    }

    fn evaluate_assignment(&mut self, a: &AssignExpr) -> Result<Value, RuntimeError> {
        let Node::VariableRef(target) = a.target.as_ref() else {
            return Err(RuntimeError::invalid_assignment_target(a.target.span()));
        };
        let value = self.evaluate_node(&a.value)?;
        let env = self.scope_for(target.scope);
        match a.kind {
            AssignKind::Declare => env
                .borrow_mut()
                .define(target.name.clone(), value.clone()),
            AssignKind::Update => {
                if !env.borrow_mut().assign(&target.name, value.clone()) {
                    return Err(RuntimeError::unbound_variable(&target.name, target.span));
                }
            }
        }
        Ok(value)
    }

    fn evaluate_condition(&mut self, c: &Condition) -> Result<(), RuntimeError> {
        let taken = match &c.test {
            Some(test) => self.evaluate_node(test)?.is_truthy(),
            None => true,
        };
        if taken {
            let env = self.child_scope();
            self.execute_block(&c.body, env)
        } else if let Some(ref other) = c.other {
            self.evaluate_condition(other)
        } else {
            Ok(())
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(function = %c.callee))]
    fn evaluate_call(&mut self, c: &CallExpr) -> Result<Value, RuntimeError> {
        let function = self
            .environment
            .borrow()
            .get_function(&c.callee)
            .ok_or_else(|| RuntimeError::undefined_function(&c.callee, c.span))?;

        let mut args = Vec::with_capacity(c.arguments.len());
        for arg in &c.arguments {
            args.push(self.evaluate_node(arg)?);
        }

        let (min, max) = function.arity();
        if args.len() < min || args.len() > max {
            return Err(RuntimeError::arity_mismatch(
                &c.callee,
                (min, max),
                args.len(),
                c.span,
            ));
        }
        if self.call_depth >= self.config.max_call_depth {
            return Err(RuntimeError::RecursionLimit {
                limit: self.config.max_call_depth,
                span: c.span.into(),
            });
        }
        self.call_function(&function, args, c.span)
    }

    fn call_function(
        &mut self,
        function: &UserFunction,
        args: Vec<Value>,
        call_site: Span,
    ) -> Result<Value, RuntimeError> {
        let closure = function
            .enclosing()
            .ok_or_else(|| RuntimeError::undefined_function(function.name(), call_site))?;
        let env = Rc::new(RefCell::new(Environment::with_enclosing(closure)));
        let previous = std::mem::replace(&mut self.environment, env);
        self.call_depth += 1;

        let result = self
            .bind_parameters(function, args, call_site)
            .and_then(|()| {
                function
                    .declaration
                    .body
                    .iter()
                    .try_for_each(|s| self.evaluate_node(s).map(drop))
            });

        self.call_depth -= 1;
        self.environment = previous;

        match result {
            Ok(()) => Ok(Value::Null),
            Err(RuntimeError::Return { value, .. }) => Ok(value),
            Err(e) => {
                tracing::debug!(function = function.name(), error = %e, "call failed");
                Err(e)
            }
        }
    }

    /// Bind arguments to parameters in the (already entered) call scope.
    /// Omitted trailing arguments fall back to defaults, which are evaluated
    /// in that scope and so can refer to earlier parameters.
    fn bind_parameters(
        &mut self,
        function: &UserFunction,
        args: Vec<Value>,
        call_site: Span,
    ) -> Result<(), RuntimeError> {
        let got = args.len();
        let mut args = args.into_iter();
        for param in &function.declaration.params {
            let value = match (args.next(), &param.default) {
                (Some(arg), _) => arg,
                (None, Some(default)) => self.evaluate_node(default)?,
                (None, None) => {
                    return Err(RuntimeError::arity_mismatch(
                        function.name(),
                        function.arity(),
                        got,
                        call_site,
                    ));
                }
            };
            let kind = value.kind_name();
            let value = value.coerce_to(param.ty).ok_or_else(|| {
                RuntimeError::type_mismatch(
                    format!(
                        "parameter '{}' of '{}' expects {} but got {kind}",
                        param.name,
                        function.name(),
                        param.ty
                    ),
                    call_site,
                )
            })?;
            self.environment
                .borrow_mut()
                .define(param.name.clone(), value);
        }
        Ok(())
    }
}
