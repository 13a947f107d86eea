// Output formatting for CLI

use anyhow::Result;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
    Mermaid,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "yaml" => OutputFormat::Yaml,
            "mermaid" => OutputFormat::Mermaid,
            _ => OutputFormat::Text,
        }
    }

    pub fn print_value<T: Serialize>(&self, value: &T) -> Result<()> {
        match self {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            OutputFormat::Yaml => {
                print!("{}", serde_yaml::to_string(value)?);
            }
            OutputFormat::Text | OutputFormat::Mermaid => {
                // Text format is handled by each command
            }
        }
        Ok(())
    }

    /// Whether the command should render its own text output
    ///
    /// Mermaid only applies to `describe`; everywhere else it reads as text.
    pub fn is_text(&self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Mermaid)
    }
}

/// Print a simple key-value pair for text output
pub fn print_field(label: &str, value: &str) {
    println!("{:<14} {}", format!("{}:", label), value);
}

/// Print a table header
pub fn print_table_header(columns: &[(&str, usize)]) {
    let header: String = columns
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header);
}

/// Print a table row
pub fn print_table_row(values: &[(&str, usize)]) {
    println!("{}", format_table_row(values));
}

fn format_table_row(values: &[(&str, usize)]) -> String {
    values
        .iter()
        .map(|(val, width)| {
            let s = if val.chars().count() > *width {
                let kept: String = val.chars().take(width.saturating_sub(3)).collect();
                format!("{}...", kept)
            } else {
                val.to_string()
            };
            format!("{:<width$}", s, width = width)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(OutputFormat::from_str("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("mermaid"), OutputFormat::Mermaid);
        assert_eq!(OutputFormat::from_str("anything"), OutputFormat::Text);
        assert!(OutputFormat::Mermaid.is_text());
        assert!(!OutputFormat::Yaml.is_text());
    }

    #[test]
    fn test_row_truncation() {
        let row = format_table_row(&[("completed:deploy/upload", 12), ("ok", 4)]);
        assert_eq!(row, "completed...  ok  ");
    }
}
