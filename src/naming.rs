//! Naming policy for versioned indices and their stable aliases.
//!
//! A concrete index instance is always named `{prefix}-{logical}_v{version}`
//! and the version-independent alias defaults to `{prefix}-{logical}`.
//! Consumers resolve the alias; only migrations ever touch the versioned name.

use std::fmt;

/// Name of a concrete, version-suffixed index instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexName(String);

impl IndexName {
    /// Derive the versioned index name: `{prefix}-{logical}_v{version}`.
    pub fn versioned(prefix: &str, logical: &str, version: u32) -> Self {
        IndexName(format!("{prefix}-{logical}_v{version}"))
    }

    /// Wrap an explicitly supplied index name (e.g. from `--from`).
    pub fn raw(name: impl Into<String>) -> Self {
        IndexName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a stable, version-independent alias.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AliasName(String);

impl AliasName {
    /// Default alias name: `{prefix}-{logical}`.
    pub fn default_for(prefix: &str, logical: &str) -> Self {
        AliasName(format!("{prefix}-{logical}"))
    }

    /// Wrap an explicitly supplied alias name (e.g. from `--alias`).
    pub fn raw(name: impl Into<String>) -> Self {
        AliasName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AliasName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versioned_index_name() {
        let name = IndexName::versioned("app", "users", 2);
        assert_eq!(name.as_str(), "app-users_v2");
    }

    #[test]
    fn default_alias_name() {
        let alias = AliasName::default_for("app", "users");
        assert_eq!(alias.as_str(), "app-users");
    }

    #[test]
    fn versioned_name_differs_from_alias() {
        let name = IndexName::versioned("app", "users", 1);
        let alias = AliasName::default_for("app", "users");
        assert_ne!(name.as_str(), alias.as_str());
    }
}
