use serde::{Deserialize, Serialize};

use crate::layout::FeedLayout;

/// What to do with a cell whose content cannot be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidValuePolicy {
    /// Abort the read with a parse error.
    Fail,
    /// Leave the field without a value.
    Skip,
    /// Store the type's zero value.
    UseDefault,
}

/// Field-level parsing options, passed to every codec call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub strip_quotes: bool,
    pub invalid_double: InvalidValuePolicy,
    pub invalid_location_type: InvalidValuePolicy,
    pub invalid_time: InvalidValuePolicy,
    pub date_format: String,
}

impl ParserConfig {
    pub fn strict() -> Self {
        Self {
            strip_quotes: false,
            invalid_double: InvalidValuePolicy::Fail,
            invalid_location_type: InvalidValuePolicy::Fail,
            invalid_time: InvalidValuePolicy::UseDefault,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn lenient() -> Self {
        Self {
            strip_quotes: true,
            invalid_double: InvalidValuePolicy::Skip,
            invalid_location_type: InvalidValuePolicy::Skip,
            invalid_time: InvalidValuePolicy::UseDefault,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::strict()
    }
}

pub const DEFAULT_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Enforce required files, file sets and header fields.
    pub strict: bool,
    pub parser: ParserConfig,
    pub layout: FeedLayout,
}

impl ReaderConfig {
    pub fn strict() -> Self {
        Self {
            strict: true,
            parser: ParserConfig::strict(),
            layout: FeedLayout::default(),
        }
    }

    pub fn lenient() -> Self {
        Self {
            strict: false,
            parser: ParserConfig::lenient(),
            layout: FeedLayout::default(),
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::strict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_in_leniency() {
        let strict = ParserConfig::strict();
        let lenient = ParserConfig::lenient();
        assert!(!strict.strip_quotes);
        assert!(lenient.strip_quotes);
        assert_eq!(strict.invalid_double, InvalidValuePolicy::Fail);
        assert_eq!(lenient.invalid_double, InvalidValuePolicy::Skip);
        assert_eq!(strict.invalid_time, lenient.invalid_time);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ReaderConfig =
            serde_json::from_str(r#"{"strict": false, "parser": {"invalid_double": "skip"}}"#)
                .expect("config should deserialize");
        assert!(!config.strict);
        assert_eq!(config.parser.invalid_double, InvalidValuePolicy::Skip);
        assert_eq!(config.parser.date_format, DEFAULT_DATE_FORMAT);
        assert_eq!(config.layout, FeedLayout::default());
    }
}
