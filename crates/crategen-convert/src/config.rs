//! Converter configuration.

use crategen_core::Strictness;

/// Converter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Re-validate the produced payload against the target schema.
    pub revalidate_output: bool,

    /// Whether unknown fields in TES, WES and WRROC view records are rejected.
    pub strictness: Strictness,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            revalidate_output: true,
            strictness: Strictness::Lenient,
        }
    }
}

impl Config {
    /// Builder method to toggle output re-validation.
    pub fn with_revalidate_output(mut self, revalidate: bool) -> Self {
        self.revalidate_output = revalidate;
        self
    }

    /// Builder method to set the strictness.
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }
}
