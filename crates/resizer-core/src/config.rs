//! Coordinator settings.

use serde::Deserialize;

const DEFAULT_CONFLICT_MESSAGE: &str =
    "Cannot resize array formula at {address} - result might overlap another array.";
const DEFAULT_TOO_LONG_MESSAGE: &str =
    "Formula too long - Excel supports formulas up to {max} characters";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizerConfig {
    /// Longest formula the host accepts when re-entering it.
    pub max_formula_length: usize,
    /// Prefix that makes the host store a value as literal text.
    pub literal_prefix: String,
    /// Alert shown when a rewrite is rejected; `{address}` names the first cell.
    pub conflict_message: String,
    /// Value returned instead of running a function whose formula is too
    /// long; `{max}` is replaced by `max_formula_length`.
    pub formula_too_long_message: String,
}

impl Default for ResizerConfig {
    fn default() -> Self {
        ResizerConfig {
            max_formula_length: 255,
            literal_prefix: "'".to_string(),
            conflict_message: DEFAULT_CONFLICT_MESSAGE.to_string(),
            formula_too_long_message: DEFAULT_TOO_LONG_MESSAGE.to_string(),
        }
    }
}

impl ResizerConfig {
    pub fn conflict_alert(&self, address: &str) -> String {
        self.conflict_message.replace("{address}", address)
    }

    pub fn too_long_message(&self) -> String {
        self.formula_too_long_message
            .replace("{max}", &self.max_formula_length.to_string())
    }

    pub fn literal_text(&self, formula: &str) -> String {
        format!("{}{}", self.literal_prefix, formula)
    }
}
