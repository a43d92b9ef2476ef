//! Key naming for the store-resident sets.
//!
//! Three kinds of set live in the store:
//!
//! - `<account_prefix><account>`: features enabled for one account
//! - `<feature_prefix><feature>`: accounts that enabled one feature individually
//! - [`GLOBAL_FEATURES_KEY`]: features enabled for every account

use serde::{Deserialize, Serialize};

/// Key of the set holding features launched for all accounts. Not configurable.
pub const GLOBAL_FEATURES_KEY: &str = "feature_for_all";

/// Default prefix for per-account feature sets.
pub const DEFAULT_ACCOUNT_PREFIX: &str = "LP:Account:";

/// Default prefix for per-feature account sets.
pub const DEFAULT_FEATURE_PREFIX: &str = "LP:Feature:";

/// Placeholder returned instead of an account list when a feature is launched globally.
pub const WILDCARD_ACCOUNT: &str = "*";

/// Prefixes used to derive store keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpace {
    account_prefix: String,
    feature_prefix: String,
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNT_PREFIX, DEFAULT_FEATURE_PREFIX)
    }
}

impl KeySpace {
    /// Create a key space with custom prefixes.
    pub fn new(account_prefix: impl Into<String>, feature_prefix: impl Into<String>) -> Self {
        Self {
            account_prefix: account_prefix.into(),
            feature_prefix: feature_prefix.into(),
        }
    }

    /// Key of the set of features enabled for `account`.
    pub fn account_key(&self, account: &str) -> String {
        format!("{}{}", self.account_prefix, account)
    }

    /// Key of the set of accounts that enabled `feature` individually.
    pub fn feature_key(&self, feature: &str) -> String {
        format!("{}{}", self.feature_prefix, feature)
    }

    /// Key of the global feature set.
    pub fn global_key(&self) -> &'static str {
        GLOBAL_FEATURES_KEY
    }

    pub fn account_prefix(&self) -> &str {
        &self.account_prefix
    }

    pub fn feature_prefix(&self) -> &str {
        &self.feature_prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let keys = KeySpace::default();
        assert_eq!(keys.account_key("account9001"), "LP:Account:account9001");
        assert_eq!(keys.feature_key("feature7001"), "LP:Feature:feature7001");
        assert_eq!(keys.global_key(), "feature_for_all");
    }

    #[test]
    fn test_custom_prefixes() {
        let keys = KeySpace::new("acct/", "feat/");
        assert_eq!(keys.account_key("42"), "acct/42");
        assert_eq!(keys.feature_key("beta"), "feat/beta");
        assert_eq!(keys.account_prefix(), "acct/");
        assert_eq!(keys.feature_prefix(), "feat/");
    }

    #[test]
    fn test_empty_name_yields_prefix() {
        let keys = KeySpace::default();
        assert_eq!(keys.account_key(""), keys.account_prefix());
        assert_eq!(keys.feature_key(""), keys.feature_prefix());
    }
}
