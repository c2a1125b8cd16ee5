use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tokens(pub Vec<Token>);

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: std::ops::Range<usize>,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum TokenKind {
    Ident(String),
    /// Only `return`, inside braced lambda bodies.
    Keyword(String),
    Literal(Literal),

    /// single-char control tokens
    Control(char),

    ArrowFat, // =>
    Eq,       // == and ===
    Ne,       // != and !==
    Gte,      // >=
    Lte,      // <=
    And,      // &&
    Or,       // ||
    Spread,   // ...
}

#[derive(Debug, EnumAsInner, PartialEq, Clone, Serialize, Deserialize, strum::AsRefStr)]
pub enum Literal {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl Eq for Literal {}

impl std::hash::Hash for Literal {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Literal::Null => 0u8.hash(state),
            Literal::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            Literal::Float(f) => {
                2u8.hash(state);
                f.to_bits().hash(state);
            }
            Literal::Boolean(b) => {
                3u8.hash(state);
                b.hash(state);
            }
            Literal::String(s) => {
                4u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl Eq for TokenKind {}

impl std::hash::Hash for TokenKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            TokenKind::Ident(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            TokenKind::Keyword(s) => {
                1u8.hash(state);
                s.hash(state);
            }
            TokenKind::Literal(l) => {
                2u8.hash(state);
                l.hash(state);
            }
            TokenKind::Control(c) => {
                3u8.hash(state);
                c.hash(state);
            }
            TokenKind::ArrowFat => 4u8.hash(state),
            TokenKind::Eq => 5u8.hash(state),
            TokenKind::Ne => 6u8.hash(state),
            TokenKind::Gte => 7u8.hash(state),
            TokenKind::Lte => 8u8.hash(state),
            TokenKind::And => 9u8.hash(state),
            TokenKind::Or => 10u8.hash(state),
            TokenKind::Spread => 11u8.hash(state),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Float(n) => write!(f, "{n}"),
            Literal::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Literal::String(s) => write!(f, "'{s}'"),
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Ident(s) => write!(f, "`{s}`"),
            TokenKind::Keyword(s) => write!(f, "keyword {s}"),
            TokenKind::Literal(lit) => write!(f, "{lit}"),
            TokenKind::Control(c) => write!(f, "`{c}`"),
            TokenKind::ArrowFat => f.write_str("`=>`"),
            TokenKind::Eq => f.write_str("`==`"),
            TokenKind::Ne => f.write_str("`!=`"),
            TokenKind::Gte => f.write_str("`>=`"),
            TokenKind::Lte => f.write_str("`<=`"),
            TokenKind::And => f.write_str("`&&`"),
            TokenKind::Or => f.write_str("`||`"),
            TokenKind::Spread => f.write_str("`...`"),
        }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}: {:?}", self.span.start, self.span.end, self.kind)
    }
}
