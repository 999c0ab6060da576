//! Rule-based narrative formatting.

use async_trait::async_trait;
use chrono::Local;

use crate::error::NarrativeError;

use super::NarrativeRewriter;

const METRIC_WORDS: [&str; 4] = ["rate", "percentage", "average", "total"];

/// Formats plain analysis text as a business report without any model.
///
/// Bullets are normalised, headings emphasised, recommendations and metric
/// lines flagged, and a short impact footer appended.
#[derive(Debug, Clone, Default)]
pub struct TemplateRewriter {
    /// Omit the generated-at line (keeps output stable in tests).
    without_timestamp: bool,
}

impl TemplateRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_timestamp(mut self) -> Self {
        self.without_timestamp = true;
        self
    }

    /// Apply the formatting rules synchronously.
    pub fn format(&self, narrative: &str) -> String {
        let mut lines: Vec<String> = narrative.lines().map(format_line).collect();

        lines.extend(
            [
                "",
                "---",
                "**Business Impact Assessment:**",
                "This analysis provides actionable insights for operational improvements.",
                "Implement recommendations in priority order for maximum impact.",
            ]
            .map(String::from),
        );

        if !self.without_timestamp {
            lines.push(String::new());
            lines.push(format!(
                "*Report generated: {}*",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            ));
        }

        lines.join("\n")
    }
}

fn format_line(line: &str) -> String {
    let line = line.trim();
    if line.is_empty() {
        return String::new();
    }

    let lower = line.to_lowercase();

    if let Some(item) = line.strip_prefix("- ") {
        format!("• {}", item)
    } else if is_heading(line) {
        format!("\n**{}**\n", line)
    } else if lower.contains("recommend") || lower.contains("suggest") {
        format!("**Recommendation:** {}", line)
    } else if METRIC_WORDS.iter().any(|word| lower.contains(word)) {
        format!("**Metric:** {}", line)
    } else {
        line.to_string()
    }
}

/// All-caps lines and lines opening with "Analysis" or "Summary".
fn is_heading(line: &str) -> bool {
    let has_letters = line.chars().any(char::is_alphabetic);
    let all_caps = has_letters && !line.chars().any(char::is_lowercase);
    all_caps || line.starts_with("Analysis") || line.starts_with("Summary")
}

#[async_trait]
impl NarrativeRewriter for TemplateRewriter {
    fn name(&self) -> &str {
        "rule_based"
    }

    async fn rewrite(
        &self,
        narrative: &str,
        _context: &serde_json::Value,
    ) -> std::result::Result<String, NarrativeError> {
        Ok(self.format(narrative))
    }
}
