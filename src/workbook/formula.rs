//! Formula parsing for the in-memory workbook.
//!
//! The workbook understands one function call per formula, or a single
//! value:
//!
//! - `=NAME(arg, ...)` calls a registered worksheet function
//! - `=arg` evaluates one argument
//!
//! An argument is a number, a `"string"` (`""` escapes a quote), `TRUE` or
//! `FALSE`, an A1 reference, or `#REF!`.

use regex::Regex;
use std::sync::OnceLock;

use resizer_engine::engine::{CellRef, ErrorValue};

use crate::error::{Result, WorkbookError};

#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    Number(f64),
    Text(String),
    Bool(bool),
    Ref(CellRef),
    Error(ErrorValue),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Call { name: String, args: Vec<Arg> },
    Value(Arg),
}

fn call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?<name>[A-Za-z_][A-Za-z0-9_.]*)\s*\((?<args>.*)\)\s*$")
            .expect("valid call regex")
    })
}

/// Parse formula text (with or without the leading `=`).
pub fn parse_formula(text: &str) -> Result<Expr> {
    let body = text.strip_prefix('=').unwrap_or(text);
    let offset = text.len() - body.len();

    if let Some(caps) = call_re().captures(body) {
        let name = caps["name"].to_ascii_uppercase();
        let args_match = caps.name("args").map(|m| (m.start(), m.as_str()));
        let args = match args_match {
            Some((start, args)) => parse_args(args, offset + start)?,
            None => Vec::new(),
        };
        return Ok(Expr::Call { name, args });
    }

    Ok(Expr::Value(parse_arg(body, offset)?))
}

fn parse_args(args: &str, offset: usize) -> Result<Vec<Arg>> {
    if args.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_args(args)
        .into_iter()
        .map(|(start, arg)| parse_arg(arg, offset + start))
        .collect()
}

/// Split on commas outside string literals, keeping each piece's offset.
fn split_args(args: &str) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    for (i, c) in args.char_indices() {
        match c {
            '"' => in_string = !in_string,
            ',' if !in_string => {
                pieces.push((start, &args[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push((start, &args[start..]));
    pieces
}

fn parse_arg(raw: &str, offset: usize) -> Result<Arg> {
    let arg = raw.trim();
    let column = offset + (raw.len() - raw.trim_start().len()) + 1;
    let parse_error = |message: String| WorkbookError::Parse { column, message };

    if arg.is_empty() {
        return Err(parse_error("Expected a value".to_string()));
    }
    if let Some(inner) = arg.strip_prefix('"') {
        let inner = inner
            .strip_suffix('"')
            .ok_or_else(|| parse_error("Unterminated string".to_string()))?;
        return Ok(Arg::Text(inner.replace("\"\"", "\"")));
    }
    if arg.eq_ignore_ascii_case("TRUE") {
        return Ok(Arg::Bool(true));
    }
    if arg.eq_ignore_ascii_case("FALSE") {
        return Ok(Arg::Bool(false));
    }
    if arg == ErrorValue::Ref.as_str() {
        return Ok(Arg::Error(ErrorValue::Ref));
    }
    if let Ok(n) = arg.parse::<f64>() {
        return Ok(Arg::Number(n));
    }
    if let Some(cell) = CellRef::from_str(arg) {
        return Ok(Arg::Ref(cell));
    }
    Err(parse_error(format!("Unrecognised value: {}", arg)))
}
