//! Grounding prompt assembly
//!
//! The system message sent before every model call: who the assistant is,
//! the tool catalogue, the behavioral rules, and the temporal facts for the
//! current turn so date questions never need a tool.

use chrono::{DateTime, Datelike, Local, Timelike};

use crate::tools::ToolRegistry;

/// Narrative phrases the model keeps producing despite the rules.
/// Stripped from final answers post-hoc.
const BANNED_PHRASES: &[&str] = &[
    "The chart will be displayed automatically.",
    "The chart will be displayed.",
    "A chart will be displayed below.",
    "The system will render the chart for you.",
    "I cannot generate visual charts",
];

/// Remove banned narrative phrases from a final answer
pub fn strip_banned_phrases(answer: &str) -> String {
    let mut cleaned = answer.to_string();
    for phrase in BANNED_PHRASES {
        while let Some(pos) = cleaned.find(phrase) {
            cleaned.replace_range(pos..pos + phrase.len(), "");
        }
    }
    cleaned.trim().to_string()
}

/// Grounding prompt builder
#[derive(Debug, Clone)]
pub struct SystemPrompt {
    user: String,
}

impl SystemPrompt {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }

    /// Build the full system message for one turn
    pub fn build(&self, registry: &ToolRegistry) -> String {
        self.build_at(registry, Local::now())
    }

    fn build_at(&self, registry: &ToolRegistry, now: DateTime<Local>) -> String {
        format!(
            r#"You are an intelligent AI assistant for an ERP system, helping user "{user}" with their business operations.

You have access to the following tools to query ERP data:
{tools}

CRITICAL RULES:
1. DO NOT explain what you're going to do or your thinking process
2. DO NOT say "I cannot generate", "I will", "Let me", or "However"
3. DIRECTLY execute tools and present results
4. You CAN and SHOULD generate charts when asked
5. Present data in clean tables with totals
6. Ground every factual claim in tool output; never fabricate example data

WHEN USER ASKS FOR CHARTS:
- They will see visual charts automatically
- Just fetch the data and present it in table format
- The system handles chart rendering
- DO NOT say you cannot generate charts

TOOL USAGE FORMAT:
To call a tool, respond with a single line:
TOOL: <tool_name> INPUT: <json object or plain text>

Examples:
- TOOL: get_sales_orders INPUT: {{"summary": "by_status"}}
- TOOL: get_sales_orders INPUT: {{"status": "Draft", "limit": 10}}
- TOOL: query_doctype INPUT: {{"doctype": "Employee", "filters": "status=Active"}}
- TOOL: search_customers INPUT: acme

DATA FORMATTING:
- Tables with | separators
- Include totals and counts
- Group by categories when relevant

CURRENT DATE AND TIME:
{temporal}

Use these facts directly for any date or time question; do not call a tool for them.

Always respect permissions and provide accurate information."#,
            user = self.user,
            tools = catalogue(registry),
            temporal = temporal_facts(now),
        )
    }
}

fn catalogue(registry: &ToolRegistry) -> String {
    registry
        .list()
        .iter()
        .map(|spec| format!("- {}: {}", spec.name, spec.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn temporal_facts(now: DateTime<Local>) -> String {
    let quarter = (now.month() - 1) / 3 + 1;
    format!(
        "- Date: {date}\n- Time: {h:02}:{m:02}\n- Weekday: {weekday}\n- Month: {month}\n- Year: {year}\n- ISO week: {week}\n- Day of year: {doy}\n- Quarter: Q{quarter}",
        date = now.format("%A, %B %-d, %Y"),
        h = now.hour(),
        m = now.minute(),
        weekday = now.format("%A"),
        month = now.format("%B"),
        year = now.year(),
        week = now.iso_week().week(),
        doy = now.ordinal(),
        quarter = quarter,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::tools::standard_registry;
    use chrono::TimeZone;
    use std::sync::Arc;

    #[test]
    fn test_prompt_lists_every_tool() {
        let registry = standard_registry(Arc::new(MemoryBackend::new()));
        let prompt = SystemPrompt::new("tester").build(&registry);
        for spec in registry.list() {
            assert!(prompt.contains(&format!("- {}:", spec.name)));
        }
        assert!(prompt.contains("user \"tester\""));
    }

    #[test]
    fn test_temporal_facts() {
        let now = Local.with_ymd_and_hms(2026, 8, 30, 14, 5, 0).unwrap();
        let facts = temporal_facts(now);
        assert!(facts.contains("Sunday, August 30, 2026"));
        assert!(facts.contains("Time: 14:05"));
        assert!(facts.contains("ISO week: 35"));
        assert!(facts.contains("Day of year: 242"));
        assert!(facts.contains("Quarter: Q3"));
    }

    #[test]
    fn test_strip_banned_phrases() {
        let answer = "Here is the data. The chart will be displayed automatically.";
        assert_eq!(strip_banned_phrases(answer), "Here is the data.");
    }

    #[test]
    fn test_strip_leaves_clean_answers_alone() {
        assert_eq!(strip_banned_phrases("Total: 5 orders"), "Total: 5 orders");
    }
}
