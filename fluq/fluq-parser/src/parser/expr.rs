use chumsky::prelude::*;

use crate::lexer::lr::TokenKind;
use crate::parser::ar::*;
use crate::parser::perror::PError;
use crate::parser::{ctrl, ident_part, keyword, sequence};

/// A lambda body: either a bare expression or `{ return <expr>; }`.
pub(crate) fn lambda_body() -> impl Parser<TokenKind, Expr, Error = PError> {
    let block = keyword("return")
        .ignore_then(expr())
        .then_ignore(ctrl(';').or_not())
        .delimited_by(ctrl('{'), ctrl('}'));

    block.or(expr()).then_ignore(end())
}

pub(crate) fn expr() -> impl Parser<TokenKind, Expr, Error = PError> + Clone {
    recursive(|expr| {
        let literal = select! { TokenKind::Literal(lit) => ExprKind::Literal(lit) };

        let ident_kind = ident_part().map(ExprKind::Ident);

        let object = object(expr.clone());

        let array = sequence(expr.clone())
            .delimited_by(ctrl('['), ctrl(']'))
            .map(ExprKind::Array)
            .labelled("array");

        let paren = expr.clone().delimited_by(ctrl('('), ctrl(')'));

        let term = choice((literal, object, array, ident_kind))
            .map_with_span(ExprKind::into_expr)
            .or(paren)
            .boxed();

        let term = postfix(term, expr.clone());
        let term = unary(term);

        // Binary operators, loosest last
        let term = binary_op_parser(term, operator_mul());
        let term = binary_op_parser(term, operator_add());
        let term = binary_op_parser(term, operator_compare());
        let term = binary_op_parser(term, operator_bit());
        let term = binary_op_parser(term, operator_and());
        binary_op_parser(term, operator_or())
    })
}

fn object<'a>(
    expr: impl Parser<TokenKind, Expr, Error = PError> + Clone + 'a,
) -> impl Parser<TokenKind, ExprKind, Error = PError> + Clone + 'a {
    let spread = just(TokenKind::Spread)
        .ignore_then(expr.clone())
        .map(ObjectEntry::Spread);

    let named = ident_part()
        .then_ignore(ctrl(':'))
        .then(expr)
        .map(|(name, value)| ObjectEntry::Property { name, value });

    // `{u}` desugars to `u: u`
    let shorthand = ident_part().map_with_span(|name, span| ObjectEntry::Property {
        name: name.clone(),
        value: ExprKind::Ident(name).into_expr(span),
    });

    sequence(choice((spread, named, shorthand)))
        .delimited_by(ctrl('{'), ctrl('}'))
        .map(ExprKind::Object)
        .labelled("object literal")
}

enum PostfixOp {
    Field(String),
    Call(Vec<Expr>),
}

/// Property access and calls bind tighter than anything else, folding
/// left-to-right onto the base term.
fn postfix<'a>(
    term: impl Parser<TokenKind, Expr, Error = PError> + Clone + 'a,
    expr: impl Parser<TokenKind, Expr, Error = PError> + Clone + 'a,
) -> impl Parser<TokenKind, Expr, Error = PError> + Clone + 'a {
    let op = choice((
        ctrl('.').ignore_then(ident_part()).map(PostfixOp::Field),
        sequence(expr)
            .delimited_by(ctrl('('), ctrl(')'))
            .map(PostfixOp::Call),
    ));

    term.map_with_span(|e, s| (e, s))
        .then(op.map_with_span(|op, s| (op, s)).repeated())
        .foldl(|(base, base_span), (op, op_span)| {
            let span = base_span.start..op_span.end;
            let kind = match op {
                PostfixOp::Field(name) => ExprKind::Property(PropertyAccess {
                    base: Box::new(base),
                    name,
                }),
                PostfixOp::Call(args) => ExprKind::Call(FuncCall {
                    callee: Box::new(base),
                    args,
                }),
            };
            (kind.into_expr(span.clone()), span)
        })
        .map(|(e, _)| e)
}

fn unary<'a>(
    term: impl Parser<TokenKind, Expr, Error = PError> + Clone + 'a,
) -> impl Parser<TokenKind, Expr, Error = PError> + Clone + 'a {
    recursive(move |unary| {
        choice((ctrl('!').to(UnOp::Not), ctrl('-').to(UnOp::Neg)))
            .then(unary)
            .map(|(op, expr)| {
                ExprKind::Unary(UnaryExpr {
                    op,
                    expr: Box::new(expr),
                })
            })
            .map_with_span(ExprKind::into_expr)
            .or(term)
    })
}

fn binary_op_parser<'a, Term, Op>(
    term: Term,
    op: Op,
) -> impl Parser<TokenKind, Expr, Error = PError> + Clone + 'a
where
    Term: Parser<TokenKind, Expr, Error = PError> + Clone + 'a,
    Op: Parser<TokenKind, BinOp, Error = PError> + Clone + 'a,
{
    let term = term.map_with_span(|e, s| (e, s)).boxed();

    term.clone()
        .then(op.then(term).repeated())
        .foldl(|left, (op, right)| {
            let span = left.1.start..right.1.end;
            let kind = ExprKind::Binary(BinaryExpr {
                left: Box::new(left.0),
                op,
                right: Box::new(right.0),
            });
            (kind.into_expr(span.clone()), span)
        })
        .map(|(e, _)| e)
}

fn operator_mul() -> impl Parser<TokenKind, BinOp, Error = PError> + Clone {
    choice((
        ctrl('*').to(BinOp::Mul),
        ctrl('/').to(BinOp::Div),
        ctrl('%').to(BinOp::Mod),
    ))
}

fn operator_add() -> impl Parser<TokenKind, BinOp, Error = PError> + Clone {
    choice((ctrl('+').to(BinOp::Add), ctrl('-').to(BinOp::Sub)))
}

fn operator_compare() -> impl Parser<TokenKind, BinOp, Error = PError> + Clone {
    choice((
        just(TokenKind::Eq).to(BinOp::Eq),
        just(TokenKind::Ne).to(BinOp::Ne),
        just(TokenKind::Gte).to(BinOp::Gte),
        just(TokenKind::Lte).to(BinOp::Lte),
        ctrl('>').to(BinOp::Gt),
        ctrl('<').to(BinOp::Lt),
    ))
}

fn operator_bit() -> impl Parser<TokenKind, BinOp, Error = PError> + Clone {
    choice((
        ctrl('&').to(BinOp::BitAnd),
        ctrl('^').to(BinOp::BitXor),
        ctrl('|').to(BinOp::BitOr),
    ))
}

fn operator_and() -> impl Parser<TokenKind, BinOp, Error = PError> + Clone {
    just(TokenKind::And).to(BinOp::And)
}

fn operator_or() -> impl Parser<TokenKind, BinOp, Error = PError> + Clone {
    just(TokenKind::Or).to(BinOp::Or)
}
