//! Formula reference style conversion.
//!
//! Formulas are read back from the host in whatever reference style it is
//! displaying. Re-entering one formula across a block of a different shape
//! needs R1C1 text, where each reference is an offset from the anchor cell
//! instead of a fixed A1 coordinate:
//!
//! - `A1` anchored at `B1` becomes `RC[-1]`
//! - `$C$2` becomes `R2C3` regardless of the anchor
//! - `B$4` anchored at `A1` becomes `R4C[1]`
//!
//! References inside string literals and tokens used as function names
//! (`LOG10(`) are left alone. Whole-row and whole-column references are not
//! rewritten.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::cell_ref::CellRef;

fn a1_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?<col_abs>\$?)(?<letters>[A-Za-z]{1,3})(?<row_abs>\$?)(?<row>[0-9]+)")
            .expect("valid A1 token regex")
    })
}

fn r1c1_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)R(?:\[(?<row_rel>-?[0-9]+)\]|(?<row_abs>[0-9]+))?C(?:\[(?<col_rel>-?[0-9]+)\]|(?<col_abs>[0-9]+))?",
        )
        .expect("valid R1C1 token regex")
    })
}

/// Convert every A1 reference in `formula` to R1C1 relative to `anchor`.
pub fn to_r1c1(formula: &str, anchor: CellRef) -> String {
    map_outside_strings(formula, |segment| {
        replace_tokens(segment, a1_token_re(), |caps| a1_to_r1c1(caps, anchor))
    })
}

/// Convert every R1C1 reference in `formula` to A1 relative to `anchor`.
/// References that would fall off the top or left edge become `#REF!`.
pub fn to_a1(formula: &str, anchor: CellRef) -> String {
    map_outside_strings(formula, |segment| {
        replace_tokens(segment, r1c1_token_re(), |caps| r1c1_to_a1(caps, anchor))
    })
}

fn a1_to_r1c1(caps: &Captures, anchor: CellRef) -> Option<String> {
    let col = CellRef::letters_to_col(&caps["letters"])?;
    let row = caps["row"].parse::<u32>().ok()?.checked_sub(1)?;

    let row_part = if caps["row_abs"].is_empty() {
        relative_part('R', row as i64 - anchor.row as i64)
    } else {
        format!("R{}", row as u64 + 1)
    };
    let col_part = if caps["col_abs"].is_empty() {
        relative_part('C', col as i64 - anchor.col as i64)
    } else {
        format!("C{}", col as u64 + 1)
    };
    Some(format!("{}{}", row_part, col_part))
}

fn relative_part(axis: char, delta: i64) -> String {
    if delta == 0 {
        axis.to_string()
    } else {
        format!("{}[{}]", axis, delta)
    }
}

fn r1c1_to_a1(caps: &Captures, anchor: CellRef) -> Option<String> {
    let (row, row_abs) = resolve_axis(caps.name("row_abs"), caps.name("row_rel"), anchor.row)?;
    let (col, col_abs) = resolve_axis(caps.name("col_abs"), caps.name("col_rel"), anchor.col)?;

    let (Some(row), Some(col)) = (row, col) else {
        return Some("#REF!".to_string());
    };
    Some(format!(
        "{}{}{}{}",
        if col_abs { "$" } else { "" },
        CellRef::col_to_letters(col),
        if row_abs { "$" } else { "" },
        row as u64 + 1
    ))
}

/// Resolve one axis of an R1C1 token. The outer `None` means the token is
/// not a valid reference; an inner `None` means it points off the sheet.
fn resolve_axis(
    absolute: Option<regex::Match<'_>>,
    relative: Option<regex::Match<'_>>,
    anchor: u32,
) -> Option<(Option<u32>, bool)> {
    if let Some(abs) = absolute {
        let index = abs.as_str().parse::<u32>().ok()?;
        return Some((index.checked_sub(1), true));
    }
    let delta = match relative {
        Some(rel) => rel.as_str().parse::<i64>().ok()?,
        None => 0,
    };
    let index = anchor as i64 + delta;
    Some((u32::try_from(index).ok(), false))
}

/// Replace regex matches that stand alone as references. A match glued to a
/// preceding identifier character, or followed by an identifier character,
/// `(` or `!`, is part of a name and is kept verbatim, as is any match the
/// converter rejects.
fn replace_tokens(
    segment: &str,
    re: &Regex,
    convert: impl Fn(&Captures) -> Option<String>,
) -> String {
    let bytes = segment.as_bytes();
    re.replace_all(segment, |caps: &Captures| {
        let whole = caps.get(0).map(|m| (m.start(), m.end(), m.as_str()));
        let Some((start, end, text)) = whole else {
            return String::new();
        };
        let glued_before = start > 0 && is_name_byte(bytes[start - 1]);
        let glued_after =
            end < bytes.len() && (is_name_byte(bytes[end]) || matches!(bytes[end], b'(' | b'!'));
        if glued_before || glued_after {
            return text.to_string();
        }
        convert(caps).unwrap_or_else(|| text.to_string())
    })
    .into_owned()
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

/// Apply `f` to the parts of `formula` outside double-quoted string literals.
/// A doubled quote inside a literal is an escaped quote.
fn map_outside_strings(formula: &str, f: impl Fn(&str) -> String) -> String {
    let bytes = formula.as_bytes();
    let mut out = String::with_capacity(formula.len());
    let mut seg_start = 0;
    let mut in_string = false;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }
        if in_string {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            out.push_str(&formula[seg_start..=i]);
            in_string = false;
            seg_start = i + 1;
        } else {
            out.push_str(&f(&formula[seg_start..i]));
            in_string = true;
            seg_start = i;
        }
        i += 1;
    }

    if in_string {
        out.push_str(&formula[seg_start..]);
    } else {
        out.push_str(&f(&formula[seg_start..]));
    }
    out
}
