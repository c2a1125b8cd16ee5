use chrono::NaiveDateTime;
use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use fluq_parser::lexer::lr::Literal;

/// A typed scalar value: constants inlined into SQL, bound-variable values,
/// and provider result cells. Lists are only legal as the right operand of
/// `IN` and as bound-variable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum Scalar {
    Null,
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    String(String),
    DateTime(NaiveDateTime),
    List(Vec<Scalar>),
}

impl From<Literal> for Scalar {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Null => Scalar::Null,
            Literal::Integer(i) => Scalar::Integer(i),
            Literal::Float(f) => Scalar::Decimal(f),
            Literal::Boolean(b) => Scalar::Boolean(b),
            Literal::String(s) => Scalar::String(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Decimal(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(value: NaiveDateTime) -> Self {
        Scalar::DateTime(value)
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Scalar {
    fn from(values: Vec<T>) -> Self {
        Scalar::List(values.into_iter().map(Into::into).collect())
    }
}
