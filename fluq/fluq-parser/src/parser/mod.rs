use chumsky::prelude::*;

use crate::error::{Error, Errors, Reason, WithErrorInfo};
use crate::lexer::lex_source;
use crate::lexer::lr::{Token, TokenKind};
use crate::parser::ar::{Expr, ExprKind, Lambda};
use crate::parser::perror::PError;

pub mod ar;
mod expr;
pub(crate) mod perror;

/// Parses the source text of an arrow function into a [Lambda].
///
/// The parameter list and arrow must be well-formed; a body the grammar does
/// not recognize degrades to a single [ExprKind::Opaque] node holding the
/// body text verbatim.
pub fn parse_lambda(source: &str) -> Result<Lambda, Errors> {
    let tokens = lex_source(source)?;

    let arrow = tokens
        .0
        .iter()
        .position(|t| t.kind == TokenKind::ArrowFat)
        .ok_or_else(|| unparseable(source))?;

    let params = parse_params(&tokens.0[..arrow]).ok_or_else(|| unparseable(source))?;

    let body_tokens = tokens.0[arrow + 1..].to_vec();
    let body_start = match body_tokens.first() {
        Some(first) => first.span.start,
        None => return Err(unparseable(source)),
    };

    match parse_body(body_tokens, source.chars().count()) {
        Ok(body) => Ok(Lambda { params, body }),
        Err(errors) => {
            log::debug!("lambda body kept as opaque text: {errors:?}");
            // Spans count chars, not bytes.
            let text = source.chars().skip(body_start).collect::<String>();
            Ok(Lambda {
                params,
                body: Expr::new(ExprKind::Opaque(text.trim().to_string())),
            })
        }
    }
}

fn unparseable(source: &str) -> Errors {
    Error::new(Reason::Unparseable {
        source: source.to_string(),
    })
    .with_code("E0001")
    .into()
}

/// `p`, `(p)` or `(p, q)` before the arrow.
fn parse_params(tokens: &[Token]) -> Option<Vec<String>> {
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind.clone()).collect();
    match kinds.as_slice() {
        [TokenKind::Ident(p)] => Some(vec![p.clone()]),
        [TokenKind::Control('('), TokenKind::Ident(p), TokenKind::Control(')')] => {
            Some(vec![p.clone()])
        }
        [TokenKind::Control('('), TokenKind::Ident(p), TokenKind::Control(','), TokenKind::Ident(q), TokenKind::Control(')')] => {
            Some(vec![p.clone(), q.clone()])
        }
        _ => None,
    }
}

fn parse_body(tokens: Vec<Token>, source_len: usize) -> Result<Expr, Vec<Error>> {
    let stream = chumsky::Stream::from_iter(
        source_len..source_len + 1,
        tokens.into_iter().map(|t| (t.kind, t.span)),
    );

    expr::lambda_body()
        .parse(stream)
        .map_err(|errors| errors.into_iter().map(Error::from).collect())
}

fn ctrl(char: char) -> impl Parser<TokenKind, (), Error = PError> + Clone {
    just(TokenKind::Control(char)).ignored()
}

fn keyword(kw: &str) -> impl Parser<TokenKind, (), Error = PError> + Clone {
    just(TokenKind::Keyword(kw.to_string())).ignored()
}

fn ident_part() -> impl Parser<TokenKind, String, Error = PError> + Clone {
    select! {
        TokenKind::Ident(ident) => ident,
    }
}

/// Parse a comma-separated sequence, allowing a trailing comma. Doesn't
/// include the surrounding delimiters.
fn sequence<'a, P, O>(parser: P) -> impl Parser<TokenKind, Vec<O>, Error = PError> + Clone + 'a
where
    P: Parser<TokenKind, O, Error = PError> + Clone + 'a,
    O: 'a,
{
    parser.separated_by(ctrl(',')).allow_trailing()
}
