//! Output formatting for CLI commands

use serde::Serialize;

use crate::config::OutputFormat;

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                // Callers render text themselves; this is a readable fallback
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Prints a failure object (JSON only; text failures are reported by `main`)
    pub fn failure(&self, kind: &str, titles: &[String], message: &str) {
        if self.format == OutputFormat::Json {
            println!(
                "{}",
                serde_json::json!({
                    "success": false,
                    "error": {
                        "kind": kind,
                        "titles": titles,
                        "message": message,
                    }
                })
            );
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
