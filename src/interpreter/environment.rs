use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::interpreter::callable::UserFunction;
use crate::interpreter::value::Value;

/// One scope in the chain. Variables and functions live in separate
/// namespaces, so a variable never shadows a function of the same name.
#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Value>,
    functions: HashMap<String, UserFunction>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            functions: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Self {
            values: HashMap::new(),
            functions: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn is_global(&self) -> bool {
        self.enclosing.is_none()
    }

    /// Bind `name` in this scope, replacing any previous binding here.
    pub fn define(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(val) = self.values.get(name) {
            return Some(val.clone());
        }
        if let Some(ref enclosing) = self.enclosing {
            return enclosing.borrow().get(name);
        }
        None
    }

    /// Update `name` in the nearest scope that binds it. Returns `false` when
    /// no scope in the chain does.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            return true;
        }
        if let Some(ref enclosing) = self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }
        false
    }

    pub fn define_function(&mut self, name: String, function: UserFunction) {
        self.functions.insert(name, function);
    }

    pub fn get_function(&self, name: &str) -> Option<UserFunction> {
        if let Some(function) = self.functions.get(name) {
            return Some(function.clone());
        }
        if let Some(ref enclosing) = self.enclosing {
            return enclosing.borrow().get_function(name);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FunctionDef;

    fn function_named(name: &str, closure: &Rc<RefCell<Environment>>) -> UserFunction {
        let declaration = FunctionDef {
            name: name.to_string(),
            params: vec![],
            body: vec![],
            span: Default::default(),
        };
        UserFunction::new(declaration, closure)
    }

    #[test]
    fn define_and_get() {
        let mut env = Environment::new();
        env.define("x".to_string(), Value::Integer(42));
        assert_eq!(env.get("x"), Some(Value::Integer(42)));
    }

    #[test]
    fn get_undefined_returns_none() {
        let env = Environment::new();
        assert!(env.get("x").is_none());
    }

    #[test]
    fn enclosing_scope() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer
            .borrow_mut()
            .define("x".to_string(), Value::Integer(1));
        let inner = Environment::with_enclosing(Rc::clone(&outer));
        assert_eq!(inner.get("x"), Some(Value::Integer(1)));
        assert!(!inner.is_global());
        assert!(outer.borrow().is_global());
    }

    #[test]
    fn assign_updates_owning_scope() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer
            .borrow_mut()
            .define("x".to_string(), Value::Integer(1));
        let mut inner = Environment::with_enclosing(Rc::clone(&outer));
        assert!(inner.assign("x", Value::Integer(2)));
        assert_eq!(outer.borrow().get("x"), Some(Value::Integer(2)));
        assert!(inner.values.is_empty());
    }

    #[test]
    fn assign_undefined_returns_false() {
        let mut env = Environment::new();
        assert!(!env.assign("x", Value::Integer(1)));
        assert!(env.get("x").is_none());
    }

    #[test]
    fn define_shadows_enclosing() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer
            .borrow_mut()
            .define("x".to_string(), Value::Integer(1));
        let mut inner = Environment::with_enclosing(Rc::clone(&outer));
        inner.define("x".to_string(), Value::Str("inner".into()));
        assert_eq!(inner.get("x"), Some(Value::Str("inner".into())));
        assert_eq!(outer.borrow().get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn functions_use_separate_namespace() {
        let env = Rc::new(RefCell::new(Environment::new()));
        let function = function_named("f", &env);
        env.borrow_mut().define_function("f".to_string(), function);
        assert!(env.borrow().get("f").is_none());

        let inner = Environment::with_enclosing(Rc::clone(&env));
        let found = inner.get_function("f").expect("function visible from child");
        assert_eq!(found.name(), "f");
        assert!(inner.get_function("g").is_none());
    }
}
