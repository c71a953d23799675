pub mod printer;

use serde::{Deserialize, Serialize};

/// Byte range of a node in the source text it was parsed from.
///
/// Trees built by hand (or by a parser that does not track positions) use
/// `Span::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }
}

/// Top-level program: statements evaluated in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Node>,
}

impl Program {
    pub fn new(statements: Vec<Node>) -> Self {
        Self { statements }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Literal(LiteralExpr),
    VariableRef(VariableExpr),
    BinaryOperator(BinaryExpr),
    UnaryOperator(UnaryExpr),
    Assignment(AssignExpr),
    Container(ContainerExpr),
    FunctionDef(FunctionDef),
    CallExpression(CallExpr),
    Condition(Condition),
    WhileLoop(WhileLoop),
    Print(PrintStmt),
    Return(ReturnStmt),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(n) => n.span,
            Self::VariableRef(n) => n.span,
            Self::BinaryOperator(n) => n.span,
            Self::UnaryOperator(n) => n.span,
            Self::Assignment(n) => n.span,
            Self::Container(n) => n.span,
            Self::FunctionDef(n) => n.span,
            Self::CallExpression(n) => n.span,
            Self::Condition(n) => n.span,
            Self::WhileLoop(n) => n.span,
            Self::Print(n) => n.span,
            Self::Return(n) => n.span,
        }
    }

    /// Replace the span of this node, leaving its children untouched.
    pub fn at(mut self, span: Span) -> Self {
        match &mut self {
            Self::Literal(n) => n.span = span,
            Self::VariableRef(n) => n.span = span,
            Self::BinaryOperator(n) => n.span = span,
            Self::UnaryOperator(n) => n.span = span,
            Self::Assignment(n) => n.span = span,
            Self::Container(n) => n.span = span,
            Self::FunctionDef(n) => n.span = span,
            Self::CallExpression(n) => n.span = span,
            Self::Condition(n) => n.span = span,
            Self::WhileLoop(n) => n.span = span,
            Self::Print(n) => n.span = span,
            Self::Return(n) => n.span = span,
        }
        self
    }

    pub fn literal(value: LiteralValue) -> Self {
        Self::Literal(LiteralExpr {
            value,
            span: Span::default(),
        })
    }

    pub fn integer(value: i64) -> Self {
        Self::literal(LiteralValue::Integer(value))
    }

    pub fn decimal(value: f64) -> Self {
        Self::literal(LiteralValue::Decimal(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(LiteralValue::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Self::literal(LiteralValue::Bool(value))
    }

    pub fn null() -> Self {
        Self::literal(LiteralValue::Null)
    }

    /// A locally scoped variable reference.
    pub fn var(name: impl Into<String>) -> Self {
        Self::VariableRef(VariableExpr::new(name, VariableScope::Local))
    }

    /// A reference that always addresses the global scope.
    pub fn global(name: impl Into<String>) -> Self {
        Self::VariableRef(VariableExpr::new(name, VariableScope::Global))
    }

    pub fn binary(operator: BinaryOp, left: Node, right: Node) -> Self {
        Self::BinaryOperator(BinaryExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span: Span::default(),
        })
    }

    pub fn unary(operator: UnaryOp, operand: Node) -> Self {
        Self::UnaryOperator(UnaryExpr {
            operator,
            operand: Box::new(operand),
            span: Span::default(),
        })
    }

    pub fn assign(kind: AssignKind, target: Node, value: Node) -> Self {
        Self::Assignment(AssignExpr {
            kind,
            target: Box::new(target),
            value: Box::new(value),
            span: Span::default(),
        })
    }

    /// First binding of a local variable.
    pub fn declare(name: impl Into<String>, value: Node) -> Self {
        Self::assign(AssignKind::Declare, Self::var(name), value)
    }

    /// Mutation of an existing variable, wherever it is bound.
    pub fn update(name: impl Into<String>, value: Node) -> Self {
        Self::assign(AssignKind::Update, Self::var(name), value)
    }

    pub fn list(items: Vec<Node>) -> Self {
        Self::Container(ContainerExpr {
            items,
            span: Span::default(),
        })
    }

    pub fn function(name: impl Into<String>, params: Vec<Param>, body: Vec<Node>) -> Self {
        Self::FunctionDef(FunctionDef {
            name: name.into(),
            params,
            body,
            span: Span::default(),
        })
    }

    pub fn call(callee: impl Into<String>, arguments: Vec<Node>) -> Self {
        Self::CallExpression(CallExpr {
            callee: callee.into(),
            arguments,
            span: Span::default(),
        })
    }

    pub fn while_loop(test: Node, body: Vec<Node>, other: Option<Condition>) -> Self {
        Self::WhileLoop(WhileLoop {
            test: Box::new(test),
            body,
            other: other.map(Box::new),
            span: Span::default(),
        })
    }

    pub fn print(expression: Node) -> Self {
        Self::Print(PrintStmt {
            expression: Box::new(expression),
            span: Span::default(),
        })
    }

    pub fn ret(value: Option<Node>) -> Self {
        Self::Return(ReturnStmt {
            value: value.map(Box::new),
            span: Span::default(),
        })
    }
}

impl From<Condition> for Node {
    fn from(condition: Condition) -> Self {
        Self::Condition(condition)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Integer(i64),
    Decimal(f64),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum VariableScope {
    #[default]
    Local,
    Global,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableExpr {
    pub name: String,
    #[serde(default)]
    pub scope: VariableScope,
    #[serde(default)]
    pub span: Span,
}

impl VariableExpr {
    pub fn new(name: impl Into<String>, scope: VariableScope) -> Self {
        Self {
            name: name.into(),
            scope,
            span: Span::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub left: Box<Node>,
    pub operator: BinaryOp,
    pub right: Box<Node>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Addition,
    #[strum(serialize = "-")]
    Subtraction,
    #[strum(serialize = "*")]
    Multiplication,
    #[strum(serialize = "/")]
    Division,
    #[strum(serialize = "%")]
    Modulo,
    #[strum(serialize = "==")]
    Equality,
    #[strum(serialize = "!=")]
    Inequality,
    #[strum(serialize = ">")]
    GreaterThan,
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = ">=")]
    GreaterOrEqual,
    #[strum(serialize = "<=")]
    LessOrEqual,
    #[strum(serialize = "&&")]
    LogicalAnd,
    #[strum(serialize = "||")]
    LogicalOr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub operand: Box<Node>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum UnaryOp {
    #[strum(serialize = "-")]
    Negation,
    #[strum(serialize = "!")]
    LogicalNot,
    #[strum(serialize = "++")]
    PreIncrement,
    #[strum(serialize = "--")]
    PreDecrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AssignKind {
    Declare,
    Update,
}

/// Assignment of `value` to `target`. The target is any node so that a
/// malformed tree (assigning to a literal, say) is representable and
/// rejected at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignExpr {
    pub kind: AssignKind,
    pub target: Box<Node>,
    pub value: Box<Node>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerExpr {
    pub items: Vec<Node>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TypeTag {
    #[default]
    Any,
    Integer,
    Decimal,
    String,
    Boolean,
    List,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default)]
    pub ty: TypeTag,
    pub default: Option<Node>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self::typed(name, TypeTag::Any)
    }

    pub fn typed(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Node) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Node>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: String,
    pub arguments: Vec<Node>,
    #[serde(default)]
    pub span: Span,
}

/// Position of a [`Condition`] within an if/elif/else chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConditionKind {
    If,
    Elif,
    Else,
}

/// One link of an if/elif/else chain. `test` is absent for `else`, which
/// always runs when reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    pub test: Option<Box<Node>>,
    pub body: Vec<Node>,
    pub other: Option<Box<Condition>>,
    #[serde(default)]
    pub span: Span,
}

impl Condition {
    pub fn when(test: Node, body: Vec<Node>) -> Self {
        Self::link(ConditionKind::If, Some(test), body)
    }

    pub fn elif(test: Node, body: Vec<Node>) -> Self {
        Self::link(ConditionKind::Elif, Some(test), body)
    }

    pub fn otherwise(body: Vec<Node>) -> Self {
        Self::link(ConditionKind::Else, None, body)
    }

    fn link(kind: ConditionKind, test: Option<Node>, body: Vec<Node>) -> Self {
        Self {
            kind,
            test: test.map(Box::new),
            body,
            other: None,
            span: Span::default(),
        }
    }

    /// Append `next` at the end of this chain.
    pub fn or_else(mut self, next: Condition) -> Self {
        let tail = match self.other.take() {
            Some(link) => link.or_else(next),
            None => next,
        };
        self.other = Some(Box::new(tail));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhileLoop {
    pub test: Box<Node>,
    pub body: Vec<Node>,
    /// Runs once when the test first evaluates falsy.
    pub other: Option<Box<Condition>>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintStmt {
    pub expression: Box<Node>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub value: Option<Box<Node>>,
    #[serde(default)]
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_else_appends_to_chain_tail() {
        let chain = Condition::when(Node::boolean(false), vec![])
            .or_else(Condition::elif(Node::boolean(true), vec![]))
            .or_else(Condition::otherwise(vec![]));

        let elif = chain.other.as_ref().expect("elif link");
        assert_eq!(elif.kind, ConditionKind::Elif);
        let otherwise = elif.other.as_ref().expect("else link");
        assert_eq!(otherwise.kind, ConditionKind::Else);
        assert!(otherwise.test.is_none());
        assert!(otherwise.other.is_none());
    }

    #[test]
    fn at_sets_span() {
        let node = Node::var("x").at(Span::new(4, 1));
        assert_eq!(node.span(), Span::new(4, 1));
    }

    #[test]
    fn deserializes_without_spans() {
        let json = r#"{
            "statements": [
                {
                    "type": "Assignment",
                    "kind": "Declare",
                    "target": { "type": "VariableRef", "name": "x" },
                    "value": { "type": "Literal", "value": { "Integer": 5 } }
                }
            ]
        }"#;
        let program: Program = serde_json::from_str(json).expect("valid program JSON");
        let Node::Assignment(assign) = &program.statements[0] else {
            panic!("expected assignment, got {:?}", program.statements[0]);
        };
        assert_eq!(assign.kind, AssignKind::Declare);
        assert_eq!(assign.span, Span::default());
        assert!(
            matches!(assign.target.as_ref(), Node::VariableRef(v) if v.scope == VariableScope::Local)
        );
    }

    #[test]
    fn operator_display() {
        assert_eq!(BinaryOp::GreaterOrEqual.to_string(), ">=");
        assert_eq!(BinaryOp::LogicalOr.to_string(), "||");
        assert_eq!(UnaryOp::PreDecrement.to_string(), "--");
        assert_eq!(ConditionKind::Elif.to_string(), "elif");
        assert_eq!(TypeTag::Decimal.to_string(), "decimal");
    }
}
