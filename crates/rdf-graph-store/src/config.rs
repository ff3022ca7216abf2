//! Construction-time configuration (§6 Configuration, §4.L).

use crate::error::StoreResult;
use crate::pattern::Mask;
use serde::{Deserialize, Serialize};

/// Construction-time options for a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Comma-separated subset of the 15 non-empty bind-patterns, each
    /// matching `s?p?o?c?`. `"p"` and `"c"` are implicitly added regardless
    /// of what's listed here.
    pub indexed_patterns: String,
    /// When set, `addStatement` removes any matching quad before inserting
    /// (§4.C step 2), enforcing §3 invariant 5.
    pub unique_statements: bool,
    /// When set, a query iterator may reuse a single `Statement` buffer
    /// across its lifetime; callers must copy fields before advancing.
    pub volatile_statements: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            indexed_patterns: "p,c,pc".to_string(),
            unique_statements: true,
            volatile_statements: false,
        }
    }
}

impl StoreConfig {
    /// Parse `indexed_patterns`, validating each entry and unioning in the
    /// mandatory `"p"`/`"c"` patterns, returning the enabled masks
    /// deduplicated and in no particular order.
    pub fn enabled_patterns(&self) -> StoreResult<Vec<Mask>> {
        let mut masks = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for entry in self
            .indexed_patterns
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let mask = Mask::from_pattern_string(entry)?;
            if seen.insert(mask.0) {
                masks.push(mask);
            }
        }

        for required in ["p", "c"] {
            let mask = Mask::from_pattern_string(required)?;
            if seen.insert(mask.0) {
                masks.push(mask);
            }
        }

        Ok(masks)
    }
}
