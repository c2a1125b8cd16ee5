use std::fmt::Debug;

use serde::Serialize;

use crate::span::Span;

/// An error (or warning) produced anywhere in the query compiler. Used
/// internally by both crates; `fluq` re-exports it as its public error type.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: MessageKind,
    pub span: Option<Span>,
    pub reason: Reason,
    pub hints: Vec<String>,
    /// Machine readable identifier error code, eg "E0001"
    pub code: Option<&'static str>,
}

/// Multiple compiler errors.
#[derive(Debug, Clone)]
pub struct Errors(pub Vec<Error>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MessageKind {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub enum Reason {
    Simple(String),
    Expected {
        who: Option<String>,
        expected: String,
        found: String,
    },
    Unexpected {
        found: String,
    },
    /// Lambda source text that could not be parsed at all.
    Unparseable {
        source: String,
    },
    /// A parameter-rooted property chain with no resolution strategy left.
    UnresolvedProperty {
        path: String,
    },
    /// A source operator with no SQL mapping (eg bitwise ops).
    UnsupportedOperator {
        op: String,
    },
    /// A custom table alias colliding with one already registered.
    AliasInUse {
        alias: String,
    },
    /// Bubbled up from the injected data provider.
    Provider {
        message: String,
    },
    Bug {
        details: Option<String>,
    },
}

impl Error {
    pub fn new(reason: Reason) -> Self {
        Error {
            kind: MessageKind::Error,
            span: None,
            reason,
            hints: Vec::new(),
            code: None,
        }
    }

    pub fn new_simple<S: ToString>(reason: S) -> Self {
        Error::new(Reason::Simple(reason.to_string()))
    }

    /// Used for things that you *think* should never happen, but are not sure.
    pub fn new_assert<S: ToString>(details: S) -> Self {
        Error::new(Reason::Bug {
            details: Some(details.to_string()),
        })
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::Simple(text) => f.write_str(text),
            Reason::Expected {
                who,
                expected,
                found,
            } => {
                if let Some(who) = who {
                    write!(f, "{who} ")?;
                }
                write!(f, "expected {expected}, but found {found}")
            }
            Reason::Unexpected { found } => write!(f, "unexpected {found}"),
            Reason::Unparseable { source } => {
                write!(f, "unable to parse lambda `{source}`")
            }
            Reason::UnresolvedProperty { path } => {
                write!(f, "cannot resolve property `{path}`")
            }
            Reason::UnsupportedOperator { op } => {
                write!(f, "operator `{op}` has no SQL mapping")
            }
            Reason::AliasInUse { alias } => {
                write!(f, "table alias `{alias}` is already in use")
            }
            Reason::Provider { message } => write!(f, "data provider failed: {message}"),
            Reason::Bug { details } => {
                write!(f, "internal compiler error")?;
                if let Some(details) = details {
                    write!(f, "; {details}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<Error> for Errors {
    fn from(error: Error) -> Self {
        Errors(vec![error])
    }
}

/// Collapses to the first (primary) error. Lambda sources are one-liners, so
/// the first diagnostic is the story; the rest are cascades.
impl From<Errors> for Error {
    fn from(mut errors: Errors) -> Self {
        if errors.0.is_empty() {
            Error::new_assert("empty error list")
        } else {
            errors.0.swap_remove(0)
        }
    }
}

impl std::error::Error for Error {}

impl std::error::Error for Errors {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self, f)
    }
}

impl std::fmt::Display for Errors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self, f)
    }
}

pub trait WithErrorInfo: Sized {
    fn push_hint<S: Into<String>>(self, hint: S) -> Self;

    fn with_hints<S: Into<String>, I: IntoIterator<Item = S>>(self, hints: I) -> Self;

    fn with_span(self, span: Option<Span>) -> Self;

    fn with_span_fallback(self, span: Option<Span>) -> Self;

    fn with_code(self, code: &'static str) -> Self;
}

impl WithErrorInfo for Error {
    fn push_hint<S: Into<String>>(mut self, hint: S) -> Self {
        self.hints.push(hint.into());
        self
    }

    fn with_hints<S: Into<String>, I: IntoIterator<Item = S>>(mut self, hints: I) -> Self {
        self.hints = hints.into_iter().map(|x| x.into()).collect();
        self
    }

    fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }

    fn with_span_fallback(mut self, span: Option<Span>) -> Self {
        self.span = self.span.or(span);
        self
    }

    fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }
}

impl<T, E: WithErrorInfo> WithErrorInfo for Result<T, E> {
    fn push_hint<S: Into<String>>(self, hint: S) -> Self {
        self.map_err(|e| e.push_hint(hint))
    }

    fn with_hints<S: Into<String>, I: IntoIterator<Item = S>>(self, hints: I) -> Self {
        self.map_err(|e| e.with_hints(hints))
    }

    fn with_span(self, span: Option<Span>) -> Self {
        self.map_err(|e| e.with_span(span))
    }

    fn with_span_fallback(self, span: Option<Span>) -> Self {
        self.map_err(|e| e.with_span_fallback(span))
    }

    fn with_code(self, code: &'static str) -> Self {
        self.map_err(|e| e.with_code(code))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::new(Reason::UnresolvedProperty {
            path: "j.order.amount".to_string(),
        });
        assert_eq!(
            err.reason.to_string(),
            "cannot resolve property `j.order.amount`"
        );
    }

    #[test]
    fn test_errors_collapse_to_first() {
        let errors = Errors(vec![
            Error::new_simple("first"),
            Error::new_simple("second"),
        ]);
        let err = Error::from(errors);
        assert_eq!(err.reason.to_string(), "first");
    }
}
