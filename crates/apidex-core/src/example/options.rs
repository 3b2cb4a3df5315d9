use serde::{Deserialize, Serialize};

/// Field-inclusion policy for example synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    /// Include properties marked `readOnly`.
    #[serde(alias = "include_read_only")]
    pub include_read_only: bool,
    /// Include properties marked `writeOnly`.
    #[serde(alias = "include_write_only")]
    pub include_write_only: bool,
    /// Only emit properties listed in `required`.
    #[serde(alias = "required_only")]
    pub required_only: bool,
    /// Lower bound on the number of items synthesized for arrays.
    #[serde(alias = "default_min_items")]
    pub default_min_items: u64,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            include_read_only: true,
            include_write_only: true,
            required_only: false,
            default_min_items: 1,
        }
    }
}
