//! Generator and emission settings.

/// Settings for one generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Name of the emitted unit.
    pub unit_name: String,
    /// Stop after this many resolution rounds even if not converged.
    pub max_rounds: Option<usize>,
    pub emit: EmitConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            unit_name: "SpanLinq".to_string(),
            max_rounds: None,
            emit: EmitConfig::default(),
        }
    }
}

/// Layout of the rendered unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitConfig {
    /// Spaces per indentation level.
    pub indent_size: usize,
    /// Maximum line width before groups break.
    pub max_width: usize,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            indent_size: 4,
            max_width: 100,
        }
    }
}
