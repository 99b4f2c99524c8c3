//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// A positional argument or a `key=value` pair, before they are split apart
#[derive(Debug, Clone)]
enum Param {
    Positional(Spanned<Argument>),
    Hash(HashPair),
}

fn split_params(params: Vec<Param>) -> (Vec<Spanned<Argument>>, Vec<HashPair>) {
    let mut positional = Vec::new();
    let mut hash = Vec::new();
    for param in params {
        match param {
            Param::Positional(arg) => positional.push(arg),
            Param::Hash(pair) => hash.push(pair),
        }
    }
    (positional, hash)
}

/// Compile template source into an AST
pub fn parse(input: &str) -> Result<Template, Vec<crate::ParseError>> {
    let len = input.len();

    let token_iter = crate::parser::lexer::lex(input)
        .into_iter()
        .map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    template_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn template_parser<'a, I>() -> impl Parser<'a, I, Template, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let path = select! {
        Token::Path(p) => p,
    }
    .map_with(|p, e| Spanned::new(p, span_range(&e.span())));

    let string_literal = select! {
        Token::String(s) => s,
    }
    .map_with(|s, e| Spanned::new(s, span_range(&e.span())));

    let number = select! {
        Token::Number(n) => n,
    }
    .map_with(|n, e| Spanned::new(n, span_range(&e.span())));

    // Names accept both `home` and `"home"`
    let name = choice((path.clone(), string_literal.clone()));

    let argument = choice((
        path.clone()
            .map(|p| Spanned::new(Argument::Path(PropertyPath::new(p.node)), p.span)),
        string_literal
            .clone()
            .map(|s| Spanned::new(Argument::Literal(s.node), s.span)),
        number.map(|n| Spanned::new(Argument::Number(n.node), n.span)),
    ));

    let hash_pair = path
        .clone()
        .then_ignore(just(Token::Equals))
        .then(argument.clone())
        .map(|(key, value)| HashPair { key, value });

    // Hash pairs are tried first so `controller="posts"` is not taken as a
    // positional `controller` followed by a stray `=`
    let params = choice((
        hash_pair.map(Param::Hash),
        argument.map(Param::Positional),
    ))
    .repeated()
    .collect::<Vec<_>>();

    let render = just(Token::Render)
        .ignore_then(name.clone())
        .then(params.clone())
        .try_map(|(name, params), span| {
            let (mut positional, hash) = split_params(params);
            if positional.len() > 1 {
                return Err(Rich::custom(
                    span,
                    "render takes a name and at most one context argument",
                ));
            }
            Ok(Mustache::Render(RenderCall {
                name,
                context: positional.pop(),
                hash,
            }))
        });

    let outlet = just(Token::Outlet)
        .ignore_then(name.clone().or_not())
        .map(Mustache::Outlet);

    let action = just(Token::Action)
        .ignore_then(name)
        .then(params)
        .try_map(|(name, params), span| {
            let (positional, hash) = split_params(params);
            if !positional.is_empty() {
                return Err(Rich::custom(span, "action takes a name and hash arguments only"));
            }
            Ok(Mustache::Action(ActionCall { name, hash }))
        });

    let property = path.map(|p| Mustache::Property(PropertyPath::new(p.node)));

    let mustache = choice((render, outlet, action, property))
        .delimited_by(just(Token::Open), just(Token::Close))
        .map(Node::Mustache);

    let text = select! {
        Token::Text(s) => Node::Text(s),
    };

    choice((text, mustache))
        .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(|nodes| Template { nodes })
}
