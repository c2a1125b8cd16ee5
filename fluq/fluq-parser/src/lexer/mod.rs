use chumsky::{error::Cheap, prelude::*};

use crate::error::{Error, Errors, Reason, WithErrorInfo};

pub mod lr;
#[cfg(test)]
mod test;

use lr::{Literal, Token, TokenKind, Tokens};

/// Lex a whole lambda source into tokens.
pub fn lex_source(source: &str) -> Result<Tokens, Errors> {
    lexer().parse(source).map(Tokens).map_err(|errors| {
        Errors(
            errors
                .into_iter()
                .map(|e| {
                    let found = source
                        .get(e.span())
                        .filter(|s| !s.is_empty())
                        .map(|s| format!("`{s}`"))
                        .unwrap_or_else(|| "end of input".to_string());
                    Error::new(Reason::Unexpected { found })
                        .with_span(Some(e.span().into()))
                        .with_code("E0001")
                })
                .collect(),
        )
    })
}

/// Lex chars to tokens until the end of the input
pub(crate) fn lexer() -> impl Parser<char, Vec<Token>, Error = Cheap<char>> {
    ignored()
        .ignore_then(lex_token())
        .repeated()
        .then_ignore(ignored())
        .then_ignore(end())
}

/// Lex chars to a single token
fn lex_token() -> impl Parser<char, Token, Error = Cheap<char>> {
    let control_multi = choice((
        just("===").to(TokenKind::Eq),
        just("!==").to(TokenKind::Ne),
        just("==").to(TokenKind::Eq),
        just("!=").to(TokenKind::Ne),
        just("=>").to(TokenKind::ArrowFat),
        just(">=").to(TokenKind::Gte),
        just("<=").to(TokenKind::Lte),
        just("&&").to(TokenKind::And),
        just("||").to(TokenKind::Or),
        just("...").to(TokenKind::Spread),
    ));

    let control = one_of("></%=+-*[]().,:;!{}?&|^").map(TokenKind::Control);

    let keyword = just("return")
        .then_ignore(end_expr())
        .map(|x: &str| TokenKind::Keyword(x.to_string()));

    let literal = literal().map(TokenKind::Literal);

    let ident = ident_part().map(TokenKind::Ident);

    choice((control_multi, literal, keyword, ident, control))
        .map_with_span(|kind, span| Token { kind, span })
}

fn ignored() -> impl Parser<char, (), Error = Cheap<char>> {
    filter(|c: &char| c.is_whitespace()).repeated().ignored()
}

/// Look ahead for a token boundary, without consuming it.
fn end_expr() -> impl Parser<char, (), Error = Cheap<char>> {
    choice((
        end(),
        filter(|c: &char| !is_ident_char(*c)).ignored(),
    ))
    .rewind()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

pub(crate) fn ident_part() -> impl Parser<char, String, Error = Cheap<char>> + Clone {
    filter(|c: &char| c.is_alphabetic() || *c == '_' || *c == '$')
        .chain(filter(|c: &char| is_ident_char(*c)).repeated())
        .collect()
}

fn literal() -> impl Parser<char, Literal, Error = Cheap<char>> {
    let integer = filter(|c: &char| c.is_ascii_digit() && *c != '0')
        .chain::<_, Vec<char>, _>(filter(|c: &char| c.is_ascii_digit()).repeated())
        .or(just('0').map(|c| vec![c]));

    let digits = || text::digits(10).map(|s: String| s.chars().collect::<Vec<char>>());

    let frac = just('.').chain::<char, Vec<char>, _>(digits());

    let exp = one_of("eE").chain::<char, Vec<char>, _>(
        one_of("+-").or_not().chain::<char, Vec<char>, _>(digits()),
    );

    let number = integer
        .chain::<char, Vec<char>, _>(frac.or_not().flatten())
        .chain::<char, Vec<char>, _>(exp.or_not().flatten())
        .collect::<String>()
        .try_map(|digits, span| {
            if digits.contains(&['.', 'e', 'E'][..]) {
                digits
                    .parse::<f64>()
                    .map(Literal::Float)
                    .map_err(|_| Cheap::expected_input_found(span, std::iter::empty(), None))
            } else {
                digits
                    .parse::<i64>()
                    .map(Literal::Integer)
                    .map_err(|_| Cheap::expected_input_found(span, std::iter::empty(), None))
            }
        })
        .labelled("number");

    let string = quoted_string('\'').or(quoted_string('"')).map(Literal::String);

    let keyword_literal = choice((
        just("true").to(Literal::Boolean(true)),
        just("false").to(Literal::Boolean(false)),
        just("null").to(Literal::Null),
    ))
    .then_ignore(end_expr());

    choice((number, string, keyword_literal))
}

fn quoted_string(quote: char) -> impl Parser<char, String, Error = Cheap<char>> {
    let escape = just('\\').ignore_then(choice((
        just('\\'),
        just('/'),
        just('"'),
        just('\''),
        just('`'),
        just('b').to('\u{8}'),
        just('f').to('\u{c}'),
        just('n').to('\n'),
        just('r').to('\r'),
        just('t').to('\t'),
    )));

    filter(move |c: &char| *c != quote && *c != '\\')
        .or(escape)
        .repeated()
        .collect()
        .delimited_by(just(quote), just(quote))
        .labelled("string")
}
