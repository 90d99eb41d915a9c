//! Name parsing: raw multi-line/delimited text → ordered list of [`Name`]s.
//!
//! People paste recipient lists from everywhere — spreadsheets, chat
//! messages, e-mail threads — so the splitter accepts any mixture of
//! newlines, commas, semicolons and colons, and treats a run of separators
//! as one boundary. Everything else (trim, drop empties) happens in
//! [`Name::parse`], keeping the cleaning rule in exactly one place.
//!
//! The parser itself never fails: an empty result is a validation question
//! for the caller, not a parse error.

use crate::batch::Name;
use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of the accepted separator characters.
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n,;:]+").expect("separator regex is valid"));

/// Split raw input into cleaned names, preserving first-appearance order.
///
/// Pieces that are empty after trimming are dropped; duplicates are kept.
/// The result may be empty — callers decide whether that is an error.
pub fn parse_names(raw: &str) -> Vec<Name> {
    SEPARATORS
        .split(raw)
        .filter_map(Name::parse)
        .collect()
}
