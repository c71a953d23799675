use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::ast::FunctionDef;
use crate::interpreter::environment::Environment;

/// A function registered by a `FunctionDef`.
///
/// The closure is weak: a function is stored in the very scope it captures,
/// and it can only be found by walking a chain that still contains that
/// scope.
#[derive(Debug, Clone)]
pub struct UserFunction {
    pub declaration: Rc<FunctionDef>,
    pub closure: Weak<RefCell<Environment>>,
}

impl UserFunction {
    pub fn new(declaration: FunctionDef, closure: &Rc<RefCell<Environment>>) -> Self {
        Self {
            declaration: Rc::new(declaration),
            closure: Rc::downgrade(closure),
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    /// Accepted argument counts as `(min, max)`. Every parameter after the
    /// last one without a default can be omitted.
    pub fn arity(&self) -> (usize, usize) {
        let params = &self.declaration.params;
        let min = params
            .iter()
            .rposition(|p| p.default.is_none())
            .map_or(0, |i| i + 1);
        (min, params.len())
    }

    pub fn enclosing(&self) -> Option<Rc<RefCell<Environment>>> {
        self.closure.upgrade()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, Param};
    use rstest::rstest;

    fn function_with(params: Vec<Param>) -> (UserFunction, Rc<RefCell<Environment>>) {
        let env = Rc::new(RefCell::new(Environment::new()));
        let declaration = FunctionDef {
            name: "f".to_string(),
            params,
            body: vec![],
            span: Default::default(),
        };
        (UserFunction::new(declaration, &env), env)
    }

    #[rstest]
    #[case(vec![], (0, 0))]
    #[case(vec![Param::new("a"), Param::new("b")], (2, 2))]
    #[case(vec![Param::new("a"), Param::new("b").with_default(Node::integer(1))], (1, 2))]
    #[case(vec![Param::new("a").with_default(Node::integer(1)), Param::new("b")], (2, 2))]
    #[case(vec![Param::new("a").with_default(Node::null())], (0, 1))]
    fn arity(#[case] params: Vec<Param>, #[case] expected: (usize, usize)) {
        let (function, _env) = function_with(params);
        assert_eq!(function.arity(), expected);
    }

    #[test]
    fn closure_follows_scope_lifetime() {
        let (function, env) = function_with(vec![]);
        assert!(function.enclosing().is_some());
        drop(env);
        assert!(function.enclosing().is_none());
    }
}
