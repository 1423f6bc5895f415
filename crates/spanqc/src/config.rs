//! `spanq.toml`: optional generator and emission settings.
//!
//! ```toml
//! [generator]
//! unit_name = "SpanLinq"
//! max_rounds = 8
//!
//! [emit]
//! indent_size = 4
//! max_width = 100
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::path::Path;

use serde::Deserialize;
use spanq_gen::GeneratorConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub generator: GeneratorTable,
    pub emit: EmitTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorTable {
    pub unit_name: Option<String>,
    pub max_rounds: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitTable {
    pub indent_size: Option<usize>,
    pub max_width: Option<usize>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<FileConfig, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<FileConfig, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Defaults with every key present in the file applied.
    pub fn into_generator_config(self) -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        if let Some(name) = self.generator.unit_name {
            config.unit_name = name;
        }
        config.max_rounds = self.generator.max_rounds.or(config.max_rounds);
        if let Some(indent) = self.emit.indent_size {
            config.emit.indent_size = indent;
        }
        if let Some(width) = self.emit.max_width {
            config.emit.max_width = width;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = FileConfig::from_str("").unwrap().into_generator_config();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn partial_tables() {
        let config = FileConfig::from_str(
            r#"
[generator]
unit_name = "Queries"

[emit]
max_width = 60
"#,
        )
        .unwrap()
        .into_generator_config();
        assert_eq!(config.unit_name, "Queries");
        assert_eq!(config.max_rounds, None);
        assert_eq!(config.emit.max_width, 60);
        assert_eq!(config.emit.indent_size, 4);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FileConfig::from_str("[generator]\nname = \"x\"\n").unwrap_err();
        assert!(err.starts_with("Failed to parse config"), "{}", err);
    }
}
