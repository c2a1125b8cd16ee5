use chumsky::error::Simple;
use itertools::Itertools;

use crate::error::{Error, Reason, WithErrorInfo};
use crate::lexer::lr::TokenKind;

pub(crate) type PError = Simple<TokenKind>;

impl From<PError> for Error {
    fn from(error: PError) -> Self {
        let expected = error
            .expected()
            .filter_map(|t| t.as_ref().map(|t| t.to_string()))
            .unique()
            .sorted()
            .join(" or ");

        let found = error
            .found()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "end of input".to_string());

        let reason = if expected.is_empty() {
            Reason::Unexpected { found }
        } else {
            Reason::Expected {
                who: None,
                expected,
                found,
            }
        };

        Error::new(reason)
            .with_span(Some(error.span().into()))
            .with_code("E0001")
    }
}
