//! Backend configuration.
//!
//! Values here are fixed per backend instance and never supplied by builder
//! callers, so every node a backend produces carries the same metadata.

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid flatfilter config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("like metadata characters must be distinct: {0}")]
    DuplicateLikeChar(char),
}

///
/// FlatFilterConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlatFilterConfig {
    pub like: LikeMetadata,
}

impl FlatFilterConfig {
    /// Parse and validate a TOML document such as
    ///
    /// ```toml
    /// [like]
    /// escape_char = "!"
    /// wild_card = "%"
    /// single_char = "_"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.like.validate()
    }
}

///
/// LikeMetadata
///
/// Escape, multi-character wildcard and single-character wildcard attached to
/// every structured like node.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields, rename_all(serialize = "camelCase"))]
pub struct LikeMetadata {
    pub escape_char: char,
    pub wild_card: char,
    pub single_char: char,
}

impl LikeMetadata {
    pub const DEFAULT: Self = Self {
        escape_char: '\\',
        wild_card: '*',
        single_char: '?',
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wild_card == self.escape_char || self.wild_card == self.single_char {
            return Err(ConfigError::DuplicateLikeChar(self.wild_card));
        }
        if self.single_char == self.escape_char {
            return Err(ConfigError::DuplicateLikeChar(self.single_char));
        }

        Ok(())
    }
}

impl Default for LikeMetadata {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = FlatFilterConfig::from_toml_str("").unwrap();

        assert_eq!(config.like, LikeMetadata::DEFAULT);
    }

    #[test]
    fn like_section_overrides_individual_chars() {
        let config = FlatFilterConfig::from_toml_str(
            r#"
            [like]
            wild_card = "%"
            single_char = "_"
            "#,
        )
        .unwrap();

        assert_eq!(config.like.wild_card, '%');
        assert_eq!(config.like.single_char, '_');
        assert_eq!(config.like.escape_char, '\\');
    }

    #[test]
    fn duplicate_chars_are_rejected() {
        let err = FlatFilterConfig::from_toml_str(
            r#"
            [like]
            wild_card = "?"
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::DuplicateLikeChar('?')));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FlatFilterConfig::from_toml_str("[like]\nmatch_case = true\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
