// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # vq-format
//!
//! Rendering of structured operation results into the four output
//! formats: `human` (checkmarked lines and aligned tables), `json`,
//! `yaml`, and `ai` (a narrative summary plus ranked follow-up commands
//! built only from ids actually present in the result).

mod ai;
mod table;

pub use ai::suggestions;
pub use table::Table;

use std::fmt;
use std::str::FromStr;
use vq_core::OperationResult;
use vq_error::{ErrorEnvelope, PlatformError};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Checkmarked line plus aligned tables.
    Human,
    /// Pretty-printed JSON of the structured result.
    Json,
    /// Block-style YAML of the structured result.
    Yaml,
    /// Natural-language summary with follow-up suggestions.
    Ai,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Human
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Human => "human",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Ai => "ai",
        };
        f.write_str(s)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            "ai" => Ok(Self::Ai),
            other => Err(format!(
                "unknown output format '{other}' (expected human, json, yaml or ai)"
            )),
        }
    }
}

/// Renders results and errors in one configured format.
#[derive(Debug, Clone)]
pub struct Renderer {
    format: OutputFormat,
    width: usize,
}

/// Default terminal width used for truncation.
pub const DEFAULT_WIDTH: usize = 100;

impl Renderer {
    /// Renderer with the default terminal width.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            width: DEFAULT_WIDTH,
        }
    }

    /// Override the terminal width used for table truncation.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(20);
        self
    }

    /// Render an operation result.
    #[must_use]
    pub fn result(&self, result: &OperationResult) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(result).unwrap_or_default()
            }
            OutputFormat::Yaml => serde_yaml::to_string(result).unwrap_or_default(),
            OutputFormat::Human => self.result_human(result),
            OutputFormat::Ai => ai::narrative(result),
        }
    }

    /// Render a listing (rows already projected by the caller). The
    /// structured formats emit `payload` verbatim.
    #[must_use]
    pub fn listing(
        &self,
        operation: &str,
        table: &Table,
        payload: &serde_json::Value,
    ) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(payload).unwrap_or_default(),
            OutputFormat::Yaml => serde_yaml::to_string(payload).unwrap_or_default(),
            OutputFormat::Human => {
                if table.is_empty() {
                    format!("{operation}: no results")
                } else {
                    table.render(self.width)
                }
            }
            OutputFormat::Ai => ai::listing_narrative(operation, table),
        }
    }

    /// Render an error.
    #[must_use]
    pub fn error(&self, err: &PlatformError) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&ErrorEnvelope::from(err)).unwrap_or_default()
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(&ErrorEnvelope::from(err)).unwrap_or_default()
            }
            OutputFormat::Human => {
                let mut out = format!("✗ {err}");
                if let Some(hint) = &err.hint {
                    out.push_str(&format!("\n  hint: {hint}"));
                }
                out
            }
            OutputFormat::Ai => ai::error_narrative(err),
        }
    }

    fn result_human(&self, result: &OperationResult) -> String {
        let mut lines = vec![format!("✓ {}", result.operation)];
        if !result.created.is_empty() {
            let mut table = Table::new(&["kind", "id", "name"]);
            for c in &result.created {
                table.push(vec![
                    c.kind.label().to_string(),
                    c.id.to_string(),
                    c.name.clone().unwrap_or_default(),
                ]);
            }
            lines.push(table.render(self.width));
        }
        for w in &result.warnings {
            lines.push(format!("! {w}"));
        }
        lines.join("\n")
    }
}
