// Owned syntax tree for the C-family expression/statement language
// rewritten by the marker transform.
//
// Trees come from an external parser (usually as JSON) and go back out to an
// external emitter, so every node derives the serde traits. Each node owns its
// children; rewrites either replace a subtree in its parent's slot or edit an
// owned child list in place.

pub mod builders;
pub mod walk;


use serde::{Deserialize, Serialize};

pub use walk::VisitMut;

/// Line/column pair as reported by the parser (1-based lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Source range of a node. Nodes created by a rewrite carry `Span::SYNTHETIC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub const SYNTHETIC: Span = Span {
        start: Position { line: 0, column: 0 },
        end: Position { line: 0, column: 0 },
    };

    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span starting and ending on a single line.
    pub fn at(line: u32, column: u32, end_column: u32) -> Self {
        Self::new(Position::new(line, column), Position::new(line, end_column))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub value: String,
}

impl Comment {
    pub fn line(value: impl Into<String>) -> Self {
        Self {
            kind: CommentKind::Line,
            value: value.into(),
        }
    }

    pub fn block(value: impl Into<String>) -> Self {
        Self {
            kind: CommentKind::Block,
            value: value.into(),
        }
    }
}

/// Root of one file's tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Statement>,
    #[serde(default)]
    pub span: Span,
}

impl Program {
    pub fn new(body: Vec<Statement>) -> Self {
        Self {
            body,
            span: Span::SYNTHETIC,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading_comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    Expression(Expression),
    VariableDeclaration {
        kind: VariableKind,
        declarations: Vec<VariableDeclarator>,
    },
    FunctionDeclaration(Function),
    Return(Option<Expression>),
    If {
        test: Expression,
        consequent: Box<Statement>,
        alternate: Option<Box<Statement>>,
    },
    While {
        test: Expression,
        body: Box<Statement>,
    },
    Block(Vec<Statement>),
    Throw(Expression),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub id: Identifier,
    pub init: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    Identifier(Identifier),
    Literal(Literal),
    This,
    /// `[a, , b]`; `None` is a hole.
    Array(Vec<Option<Expression>>),
    Object(Vec<ObjectProperty>),
    /// `function name?(params) { ... }` in expression position
    Function(Function),
    /// `(params) => body`
    Arrow(Function),
    Unary {
        operator: UnaryOperator,
        argument: Box<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Logical {
        operator: LogicalOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Assignment {
        operator: AssignmentOperator,
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Conditional {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },
    Member(MemberExpression),
    Call(CallExpression),
    New(NewExpression),
    Sequence(Vec<Expression>),
    /// `...expr` inside an argument list or array literal
    Spread(Box<Expression>),
}

/// Identifier reference or binding.
///
/// `done` is set on identifiers a rewrite has already consumed or produced,
/// so the marker detector never matches them a second time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub done: bool,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
        }
    }

    /// Same identifier, flagged as already handled by a rewrite.
    pub fn into_done(mut self) -> Self {
        self.done = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub key: PropertyKey,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKey {
    Identifier(Identifier),
    Literal(Literal),
    Computed(Expression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// `!`
    Not,
    /// `void`
    Void,
    /// `-`
    Minus,
    /// `+`
    Plus,
    /// `~`
    BitNot,
    TypeOf,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    In,
    InstanceOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubtractAssign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: MemberProperty,
}

impl MemberExpression {
    /// Property name for `obj.name`; `None` for computed access.
    pub fn property_name(&self) -> Option<&str> {
        match &self.property {
            MemberProperty::Identifier(ident) => Some(&ident.name),
            MemberProperty::Computed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberProperty {
    /// `obj.name`
    Identifier(Identifier),
    /// `obj[expr]`
    Computed(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
}

/// Shared shape of function declarations, function expressions and arrows.
/// Which of the three it is follows from where the node sits in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: Option<Identifier>,
    pub params: Vec<Identifier>,
    pub body: FunctionBody,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FunctionBody {
    Block(Vec<Statement>),
    /// Arrow shorthand: `x => x + 1`
    Expression(Box<Expression>),
}
