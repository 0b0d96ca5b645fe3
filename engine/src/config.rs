//! Engine configuration.
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! [normalize]
//! prune_lists = false
//!
//! [diff]
//! mode = "simple"
//!
//! [input]
//! max_bytes = 10_000_000
//!
//! [prefixes]
//! ex = "http://example.org/"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use owldiff_graph::key::is_prefix_name;
use owldiff_graph::PrefixTable;
use serde::{Deserialize, Serialize};

use crate::diff::DiffMode;
use crate::error::EngineError;
use crate::pipeline::{NormalizeOptions, Normalizer};

/// Default input ceiling in bytes.
pub const DEFAULT_MAX_BYTES: u64 = 50_000_000;

/// Diff settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffSettings {
    /// Strategy used to compare the normalized graphs.
    pub mode: DiffMode,
}

/// Guards applied before an input is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputLimits {
    /// Inputs larger than this many bytes are rejected unread.
    pub max_bytes: u64,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Normalization steps.
    pub normalize: NormalizeOptions,
    /// Diff strategy.
    pub diff: DiffSettings,
    /// Input guards.
    pub input: InputLimits,
    /// Prefix bindings added to the default table.
    pub prefixes: BTreeMap<String, String>,
}

impl EngineConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns the TOML error message if the document is not valid TOML or
    /// contains unknown keys, and names the first prefix that cannot be
    /// written in Turtle.
    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(text).map_err(|e| e.to_string())?;
        if let Some(prefix) = config.prefixes.keys().find(|p| !is_prefix_name(p)) {
            return Err(format!("prefix '{prefix}' is not a valid Turtle prefix name"));
        }
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|message| EngineError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// The default prefix table plus the configured bindings.
    #[must_use]
    pub fn prefix_table(&self) -> PrefixTable {
        let mut table = PrefixTable::default();
        for (prefix, namespace) in &self.prefixes {
            table.bind(prefix.as_str(), namespace.as_str());
        }
        table
    }

    /// A normalizer for these settings.
    #[must_use]
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.normalize, self.prefix_table())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(EngineConfig::from_toml_str(""), Ok(EngineConfig::default()));
        assert_eq!(EngineConfig::default().input.max_bytes, 50_000_000);
    }

    #[test]
    fn partial_document() {
        let cfg = EngineConfig::from_toml_str(
            "[diff]\nmode = \"simple\"\n[normalize]\nsymmetric_canon = false\n[prefixes]\nex = \"http://example.org/\"\n",
        )
        .expect("valid config");
        assert_eq!(cfg.diff.mode, DiffMode::Simple);
        assert!(!cfg.normalize.symmetric_canon);
        assert!(cfg.normalize.list_canon);
        assert_eq!(cfg.prefix_table().namespace("ex"), Some("http://example.org/"));
        assert_eq!(cfg.prefix_table().namespace("owl"), Some("http://www.w3.org/2002/07/owl#"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(EngineConfig::from_toml_str("[normalize]\nsort_lists = true\n").is_err());
        assert!(EngineConfig::from_toml_str("[diff]\nmode = \"fast\"\n").is_err());
    }

    #[test]
    fn invalid_prefix_is_rejected() {
        let err = EngineConfig::from_toml_str("[prefixes]\n\"1ex\" = \"http://example.org/\"\n");
        assert!(err.is_err_and(|e| e.contains("'1ex'")));
        assert!(EngineConfig::from_toml_str("[prefixes]\n\"\" = \"http://example.org/\"\n").is_ok());
    }

    #[test]
    fn load_reports_path() {
        let err = EngineConfig::load(Path::new("/no/such/owldiff.toml"));
        assert!(matches!(err, Err(EngineError::Config { .. })));

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("owldiff.toml");
        std::fs::write(&path, "[input]\nmax_bytes = 10\n").expect("write");
        assert_eq!(EngineConfig::load(&path).expect("load").input.max_bytes, 10);
    }
}
