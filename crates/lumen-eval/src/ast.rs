//! Expression tree produced by the parser.

/// One parsed expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// String literal.
    Text(String),
    /// Boolean literal.
    Bool(bool),
    /// `nil`
    Nil,
    /// Bare lowercase name: variable, builtin, or helper.
    Ident(String),
    /// Bare capitalized name: a model-type reference.
    Const(String),
    /// `name = value` — binds into the session variables.
    Assign {
        /// Variable name being bound.
        name: String,
        /// Right-hand side.
        value: Box<Expr>,
    },
    /// Prefix operator.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// Its operand.
        operand: Box<Expr>,
    },
    /// Infix operator.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Bare call with parentheses: `find_by(Post, id: 1)`.
    Call {
        /// Function name.
        name: String,
        /// Arguments.
        args: ArgList,
    },
    /// Dotted call: `Post.where(views: 3)` or attribute read `post.title`.
    MethodCall {
        /// Receiver expression.
        receiver: Box<Expr>,
        /// Method name.
        name: String,
        /// Arguments (empty for attribute reads).
        args: ArgList,
    },
    /// `[a, b, c]`
    Array(Vec<Expr>),
    /// `{key: value}` or `{"key" => value}`
    Hash(Vec<(String, Expr)>),
}

/// Unevaluated argument list of a call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArgList {
    /// Positional arguments, in order.
    pub positional: Vec<Expr>,
    /// Named (`key: value`) arguments, in order.
    pub named: Vec<(String, Expr)>,
}

impl ArgList {
    /// True when the call carries no arguments at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// Prefix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Numeric negation.
    Neg,
    /// Boolean negation.
    Not,
}

/// Infix operators, loosest to tightest binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Pow,
}

impl BinaryOp {
    /// Operator symbol for error messages.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "**",
        }
    }
}
