//! Declaration parser (C3): turns a single, already comment-stripped
//! schema line into a [`RawDecl`], and a single whitespace-separated
//! parameter token into a [`ParamToken`].
//!
//! Built with `chumsky` parser combinators, operating line-by-line rather
//! than over a whole token stream — TL schema lines are independently
//! parseable once the reader has stripped comments and section markers.
//! The two grammars mirror `generate_tl.py`'s `nametype` and `pnametype`
//! regexes exactly in what they accept.

use chumsky::error::Rich;
use chumsky::prelude::*;

use super::ast::{ParamShape, ParamToken, RawDecl, RawParam};
use crate::error::GenError;

fn ident_char(c: &char) -> bool {
    c.is_ascii_alphanumeric() || *c == '.' || *c == '_'
}

fn type_char(c: &char) -> bool {
    c.is_ascii_alphanumeric() || "._<>".contains(*c)
}

/// `([a-zA-Z\.0-9_]+)(#[0-9a-f]+)?([^=]*)=\s*([a-zA-Z\.<>0-9_]+);`
fn decl_parser<'a>() -> impl Parser<'a, &'a str, RawDecl, extra::Err<Rich<'a, char>>> {
    let name = any()
        .filter(ident_char)
        .repeated()
        .at_least(1)
        .to_slice()
        .map(str::to_string);

    let type_id = just('#')
        .ignore_then(
            any()
                .filter(char::is_ascii_hexdigit)
                .repeated()
                .at_least(1)
                .to_slice()
                .map(str::to_string),
        )
        .or_not();

    let params_text = any()
        .filter(|c: &char| *c != '=')
        .repeated()
        .to_slice()
        .map(str::to_string);

    let result_text = just('=')
        .ignore_then(text::whitespace())
        .ignore_then(
            any()
                .filter(type_char)
                .repeated()
                .at_least(1)
                .to_slice()
                .map(str::to_string),
        )
        .then_ignore(just(';'));

    name.then(type_id)
        .then(params_text)
        .then(result_text)
        .map(|(((original_name, type_id), params_text), result_text)| RawDecl {
            original_name,
            type_id,
            params_text,
            result_text,
        })
}

pub fn parse_declaration(line: &str) -> Result<RawDecl, GenError> {
    decl_parser()
        .parse(line)
        .into_result()
        .map_err(|_| GenError::Grammar {
            line: line.to_string(),
        })
}

/// `^{([A-Za-z]+):Type}$`
fn template_decl_parser<'a>() -> impl Parser<'a, &'a str, String, extra::Err<Rich<'a, char>>> {
    just('{')
        .ignore_then(
            any()
                .filter(char::is_ascii_alphabetic)
                .repeated()
                .at_least(1)
                .to_slice(),
        )
        .then_ignore(just(":Type}"))
        .map(str::to_string)
}

/// `!([a-zA-Z]+)`
fn template_arg_parser<'a>() -> impl Parser<'a, &'a str, String, extra::Err<Rich<'a, char>>> {
    just('!')
        .ignore_then(
            any()
                .filter(char::is_ascii_alphabetic)
                .repeated()
                .at_least(1)
                .to_slice(),
        )
        .map(str::to_string)
}

/// `([a-z_][a-z0-9_]*)\.([0-9]+)\?([A-Za-z0-9<>\._]+)`
fn conditional_parser<'a>() -> impl Parser<'a, &'a str, ParamShape, extra::Err<Rich<'a, char>>> {
    let flags_name = any()
        .filter(|c: &char| c.is_ascii_lowercase() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
                .repeated(),
        )
        .to_slice()
        .map(str::to_string);

    let bit = text::int(10).map(|s: &str| s.parse::<u32>().unwrap());

    let inner = any()
        .filter(type_char)
        .repeated()
        .at_least(1)
        .to_slice()
        .map(str::to_string);

    flags_name
        .then_ignore(just('.'))
        .then(bit)
        .then_ignore(just('?'))
        .then(inner)
        .map(|((flags_name, bit), inner)| ParamShape::Conditional {
            flags_name,
            bit,
            inner,
        })
}

fn param_name_parser<'a>() -> impl Parser<'a, &'a str, String, extra::Err<Rich<'a, char>>> {
    any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
                .repeated(),
        )
        .to_slice()
        .map(str::to_string)
}

fn param_type_parser<'a>() -> impl Parser<'a, &'a str, ParamShape, extra::Err<Rich<'a, char>>> {
    choice((
        just('#').to(ParamShape::FlagsWord),
        template_arg_parser().map(ParamShape::TemplateArg),
        conditional_parser(),
        any()
            .filter(type_char)
            .repeated()
            .at_least(1)
            .to_slice()
            .map(|s: &str| ParamShape::Plain(s.to_string())),
    ))
}

fn param_token_parser<'a>() -> impl Parser<'a, &'a str, ParamToken, extra::Err<Rich<'a, char>>> {
    let template_decl = template_decl_parser().map(ParamToken::TemplateDecl);

    let param = param_name_parser()
        .then_ignore(just(':'))
        .then(param_type_parser())
        .map(|(name, shape)| ParamToken::Param(RawParam { name, shape }));

    choice((template_decl, param))
}

pub fn parse_param_token(token: &str) -> Result<ParamToken, GenError> {
    param_token_parser()
        .parse(token)
        .into_result()
        .map_err(|_| GenError::Grammar {
            line: token.to_string(),
        })
}
