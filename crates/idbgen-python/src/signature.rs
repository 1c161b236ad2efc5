//! Call signatures recovered from doc text.
//!
//! Native callables usually begin their doc with one or more signature lines:
//!
//! ```text
//! center(width[, fillchar]) -> str
//! str(object='') -> str
//! print(value, ..., sep=' ', end='\n', file=sys.stdout)
//! ```
//!
//! Each consecutive leading line of that shape yields one [`Overload`].
//!
//! ## Grammar
//!
//! ```text
//! <line>   := <name> "(" <params> ")" [ "->" <type> ] <anything>
//! <params> := <param> ("," <param>)*        // "[" and "]" mark optional groups
//! <param>  := ["*" | "**"] <ident> [":" <type>] ["=" <default>]
//! ```
//!
//! Bare `*`, `/` and `...` markers carry no parameter and are dropped.
//! Parameters inside an optional group without an explicit default get the
//! default text `None`.

use idbgen_core::types::{ArgFormat, Overload, Parameter, TypeName};
use winnow::ascii::multispace0;
use winnow::combinator::{alt, opt, preceded};
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;
use winnow::token::{rest, take_while};
use winnow::ModalResult;

/// Default text recorded for parameters in an optional `[...]` group.
pub const OPTIONAL_DEFAULT: &str = "None";

/// Parse the leading signature lines of `doc`.
///
/// Unqualified type names resolve into `builtin_module`; a missing return
/// annotation becomes `placeholder`. Returns an empty list when the doc does
/// not start with a signature.
pub fn parse_doc_signatures(doc: &str, builtin_module: &str, placeholder: &TypeName) -> Vec<Overload> {
    let mut overloads = Vec::new();
    for line in doc.lines() {
        let line = line.trim();
        match parse_signature_line(line, builtin_module, placeholder) {
            Some(overload) => overloads.push(overload),
            None => break,
        }
    }
    overloads
}

/// Parse a single signature line.
pub fn parse_signature_line(line: &str, builtin_module: &str, placeholder: &TypeName) -> Option<Overload> {
    let mut input = line;
    let raw = raw_signature(&mut input).ok()?;

    let params = split_params(raw.params)
        .into_iter()
        .filter_map(|piece| build_parameter(&piece, builtin_module))
        .collect();
    let ret_type = match raw.ret {
        Some(ret) => resolve_type_name(ret, builtin_module),
        None => placeholder.clone(),
    };
    Some(Overload::new(params, ret_type))
}

/// Map a type name as written in doc text to a [`TypeName`].
///
/// `None` means the null type; dotted names split at the last dot.
pub fn resolve_type_name(text: &str, builtin_module: &str) -> TypeName {
    let text = text.trim();
    if text == "None" {
        return TypeName::new(builtin_module, "NoneType");
    }
    match text.rsplit_once('.') {
        Some((module, name)) if !module.is_empty() && !name.is_empty() => TypeName::new(module, name),
        _ => TypeName::new(builtin_module, text),
    }
}

// ============================================================================
// Line Parsing
// ============================================================================

struct RawSignature<'a> {
    params: &'a str,
    ret: Option<&'a str>,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_dotted_ident_char(c: char) -> bool {
    is_ident_char(c) || c == '.'
}

fn raw_signature<'a>(input: &mut &'a str) -> ModalResult<RawSignature<'a>> {
    let _name: &str = take_while(1.., is_dotted_ident_char).parse_next(input)?;
    let params = balanced_parens(input)?;
    let ret = opt(preceded(
        (multispace0, "->", multispace0),
        take_while(1.., is_dotted_ident_char),
    ))
    .parse_next(input)?;
    Ok(RawSignature { params, ret })
}

/// Parse `( ... )`, returning the text between the outer parentheses.
///
/// Nested parentheses and quoted strings inside the list are skipped over.
fn balanced_parens<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    let text = *input;
    if !text.starts_with('(') {
        return Err(ErrMode::from_input(input));
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (idx, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    *input = &text[idx + 1..];
                    return Ok(&text[1..idx]);
                }
            }
            _ => {}
        }
    }
    Err(ErrMode::from_input(input))
}

// ============================================================================
// Parameter Parsing
// ============================================================================

/// One comma-separated piece of a parameter list.
#[derive(Debug, PartialEq, Eq)]
struct ParamPiece {
    text: String,
    optional: bool,
}

/// Split a parameter list at top-level commas, stripping optional-group brackets.
///
/// Brackets and braces after a `=` belong to the default's text.
fn split_params(params: &str) -> Vec<ParamPiece> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut optional_depth = 0usize;
    let mut piece_optional = false;
    let mut nest_depth = 0usize;
    let mut in_default = false;
    let mut quote: Option<char> = None;

    for c in params.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            '=' if nest_depth == 0 => {
                in_default = true;
                current.push(c);
            }
            '[' | '{' if in_default => {
                nest_depth += 1;
                current.push(c);
            }
            ']' | '}' if nest_depth > 0 => {
                nest_depth -= 1;
                current.push(c);
            }
            '[' => {
                optional_depth += 1;
                // `width[, fillchar]`: the group opens before the comma of the next piece.
                if current.trim().is_empty() {
                    piece_optional = true;
                }
            }
            ']' => optional_depth = optional_depth.saturating_sub(1),
            '(' => {
                nest_depth += 1;
                current.push(c);
            }
            ')' => {
                nest_depth = nest_depth.saturating_sub(1);
                current.push(c);
            }
            ',' if nest_depth == 0 => {
                push_piece(&mut pieces, &current, piece_optional);
                current.clear();
                in_default = false;
                piece_optional = optional_depth > 0;
            }
            _ => current.push(c),
        }
    }
    push_piece(&mut pieces, &current, piece_optional);
    pieces
}

fn push_piece(pieces: &mut Vec<ParamPiece>, text: &str, optional: bool) {
    let text = text.trim();
    if !text.is_empty() {
        pieces.push(ParamPiece {
            text: text.to_string(),
            optional,
        });
    }
}

struct RawParam<'a> {
    stars: Option<&'a str>,
    name: &'a str,
    annotation: Option<&'a str>,
    default: Option<&'a str>,
}

fn raw_param<'a>(input: &mut &'a str) -> ModalResult<RawParam<'a>> {
    let stars = opt(alt(("**", "*"))).parse_next(input)?;
    let _ = opt('$').parse_next(input)?;
    let name = take_while(0.., is_ident_char).parse_next(input)?;
    let annotation = opt(preceded(
        (multispace0, ':', multispace0),
        take_while(1.., is_dotted_ident_char),
    ))
    .parse_next(input)?;
    let default = opt(preceded((multispace0, '=', multispace0), rest)).parse_next(input)?;
    Ok(RawParam {
        stars,
        name,
        annotation,
        default,
    })
}

fn build_parameter(piece: &ParamPiece, builtin_module: &str) -> Option<Parameter> {
    let mut input = piece.text.as_str();
    let raw = raw_param(&mut input).ok()?;
    if raw.name.is_empty() || !input.trim().is_empty() {
        // Bare `*`, `/`, `...` or something we cannot read.
        return None;
    }

    let mut param = Parameter::named(raw.name);
    match raw.stars {
        Some("**") => param = param.with_arg_format(ArgFormat::VarKeyword),
        Some(_) => param = param.with_arg_format(ArgFormat::VarPositional),
        None => {}
    }
    if let Some(annotation) = raw.annotation {
        param = param.with_type(resolve_type_name(annotation, builtin_module));
    }
    match raw.default {
        Some(default) => param = param.with_default(default.trim()),
        None if piece.optional && raw.stars.is_none() => param = param.with_default(OPTIONAL_DEFAULT),
        None => {}
    }
    Some(param)
}
