use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, ResolveResult};

/// Settings for link, include, and terminology resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveConfig {
    /// Longest chain of links followed before giving up.
    pub max_link_depth: usize,
    /// Deepest nesting of includes inside included documents.
    pub max_include_depth: usize,
    /// Flag sections obtained through the terminology manager as
    /// terminology sections.
    pub mark_terminologies: bool,
    /// After an include is merged, fill unset definitions from the
    /// section's terminology.
    pub backfill_on_include: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_link_depth: 32,
            max_include_depth: 8,
            mark_terminologies: true,
            backfill_on_include: false,
        }
    }
}

impl ResolveConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults;
    /// unknown keys are rejected.
    ///
    /// ```
    /// use odml_resolve::ResolveConfig;
    ///
    /// let config = ResolveConfig::from_toml_str("max_link_depth = 4").unwrap();
    /// assert_eq!(config.max_link_depth, 4);
    /// assert_eq!(config.max_include_depth, 8);
    /// ```
    pub fn from_toml_str(text: &str) -> ResolveResult<Self> {
        toml::from_str(text).map_err(|e| ResolveError::Config(e.to_string()))
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> ResolveResult<String> {
        toml::to_string(self).map_err(|e| ResolveError::Config(e.to_string()))
    }
}
