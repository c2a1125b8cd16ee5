//! The arrow-function mini-AST ("ar"): the language-neutral tree produced
//! from a lambda's source text, consumed by the `fluq` translator.

use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use crate::lexer::lr::Literal;
use crate::span::Span;

/// A parsed arrow function: one or two parameter names plus a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Expr,
}

impl Lambda {
    pub fn first_param(&self) -> &str {
        self.params.first().map(|p| p.as_str()).unwrap_or_default()
    }

    pub fn second_param(&self) -> Option<&str> {
        self.params.get(1).map(|p| p.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Expr {
    pub fn new<K: Into<ExprKind>>(kind: K) -> Self {
        Expr {
            kind: kind.into(),
            span: None,
        }
    }
}

#[derive(Debug, EnumAsInner, PartialEq, Clone, Serialize, Deserialize, strum::AsRefStr)]
pub enum ExprKind {
    Ident(String),
    Literal(Literal),
    /// One step of a property chain; chains nest through `base`.
    Property(PropertyAccess),
    /// `({ a: …, b, ...c })`
    Object(Vec<ObjectEntry>),
    Array(Vec<Expr>),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Call(FuncCall),
    /// Source text the parser did not recognize, preserved verbatim.
    Opaque(String),
}

impl ExprKind {
    pub fn into_expr(self, span: std::ops::Range<usize>) -> Expr {
        Expr {
            kind: self,
            span: Some(span.into()),
        }
    }
}

/// Expression with two operands and an operator, such as `a.x > 1`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: BinOp,
    pub right: Box<Expr>,
}

/// Expression with one operand and an operator, such as `!a.done`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub expr: Box<Expr>,
}

/// A call; the callee is an identifier (free function) or a property
/// access (method call).
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FuncCall {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PropertyAccess {
    pub base: Box<Expr>,
    pub name: String,
}

/// One entry of an object literal. Shorthand `{u}` is desugared to
/// `u: u` by the parser.
#[derive(Debug, EnumAsInner, PartialEq, Clone, Serialize, Deserialize)]
pub enum ObjectEntry {
    Property { name: String, value: Expr },
    Spread(Expr),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, strum::Display)]
pub enum BinOp {
    #[strum(to_string = "*")]
    Mul,
    #[strum(to_string = "/")]
    Div,
    #[strum(to_string = "%")]
    Mod,
    #[strum(to_string = "+")]
    Add,
    #[strum(to_string = "-")]
    Sub,
    #[strum(to_string = "==")]
    Eq,
    #[strum(to_string = "!=")]
    Ne,
    #[strum(to_string = ">")]
    Gt,
    #[strum(to_string = ">=")]
    Gte,
    #[strum(to_string = "<")]
    Lt,
    #[strum(to_string = "<=")]
    Lte,
    #[strum(to_string = "&&")]
    And,
    #[strum(to_string = "||")]
    Or,
    // parsed so the translator can reject them with a useful error
    #[strum(to_string = "&")]
    BitAnd,
    #[strum(to_string = "^")]
    BitXor,
    #[strum(to_string = "|")]
    BitOr,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, strum::Display)]
pub enum UnOp {
    #[strum(to_string = "!")]
    Not,
    #[strum(to_string = "-")]
    Neg,
}

impl From<Literal> for ExprKind {
    fn from(value: Literal) -> Self {
        ExprKind::Literal(value)
    }
}

impl Expr {
    /// Flattens a property chain into `(head, segments)`, eg
    /// `j.order.amount` into `("j", ["order", "amount"])`. Returns `None`
    /// when the expression is not an identifier-rooted chain.
    pub fn as_chain(&self) -> Option<(&str, Vec<&str>)> {
        match &self.kind {
            ExprKind::Ident(name) => Some((name.as_str(), vec![])),
            ExprKind::Property(PropertyAccess { base, name }) => {
                let (head, mut segments) = base.as_chain()?;
                segments.push(name.as_str());
                Some((head, segments))
            }
            _ => None,
        }
    }

    /// The chain written back as dotted source text, for diagnostics and
    /// provenance paths.
    pub fn chain_text(&self) -> Option<String> {
        let (head, segments) = self.as_chain()?;
        let mut text = head.to_string();
        for segment in segments {
            text.push('.');
            text.push_str(segment);
        }
        Some(text)
    }
}
