//! Best-effort chart extraction from model answers
//!
//! When the user's message asks for a visualization, the final answer text
//! is scanned for chartable data: an embedded JSON chart block, an HTML
//! table, or a pipe-delimited text table, in that order. Everything here is
//! fallible-by-design; a `None` simply means no chart accompanies the
//! answer.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default chart height in pixels
const DEFAULT_HEIGHT: u32 = 300;

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

/// One named series of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub values: Vec<f64>,
}

/// Renderable chart configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub colors: Option<Vec<String>>,
}

/// Whether the user's message asks for a visualization
pub fn wants_chart(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["chart", "graph", "visualize", "plot"]
        .iter()
        .any(|k| lower.contains(k))
}

/// Chart type implied by the message; bar when nothing more specific
pub fn chart_type_for(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if lower.contains("pie") {
        "pie"
    } else if lower.contains("donut") {
        "donut"
    } else if lower.contains("line") {
        "line"
    } else if lower.contains("percentage") {
        "percentage"
    } else {
        "bar"
    }
}

/// Chart title implied by the message's subject
pub fn chart_title_for(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if lower.contains("sales") {
        "Sales Data"
    } else if lower.contains("purchase") {
        "Purchase Data"
    } else if lower.contains("customer") {
        "Customer Data"
    } else if lower.contains("employee") {
        "Employee Data"
    } else if lower.contains("status") {
        "Status Summary"
    } else {
        "Data Visualization"
    }
}

/// Extract a chart from an answer. Tries, in order, an embedded JSON chart
/// block, an HTML table, and a pipe-delimited table; first success wins.
pub fn chart_from_answer(answer: &str, chart_type: &str, title: &str) -> Option<ChartSpec> {
    if let Some(spec) = json_block_to_chart(answer) {
        debug!("chart extracted from JSON block");
        return Some(spec);
    }
    if let Some(spec) = html_table_to_chart(answer, chart_type, title) {
        debug!("chart extracted from HTML table");
        return Some(spec);
    }
    if let Some(spec) = pipe_table_to_chart(answer, chart_type, title) {
        debug!("chart extracted from pipe table");
        return Some(spec);
    }
    None
}

fn json_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```json\s*([\s\S]+?)```").unwrap())
}

/// A ```json fenced block that deserializes straight into a chart spec
fn json_block_to_chart(answer: &str) -> Option<ChartSpec> {
    let body = json_fence_re().captures(answer)?.get(1)?.as_str();
    let spec: ChartSpec = serde_json::from_str(body.trim()).ok()?;
    if spec.labels.is_empty() || spec.datasets.is_empty() {
        return None;
    }
    Some(spec)
}

fn tr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").unwrap())
}

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<t([hd])[^>]*>(.*?)</t[hd]>").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

/// Very small HTML table reader: the first `<th>` row is the header, later
/// rows are data. Enough for model-emitted tables, not general HTML.
fn html_table_to_chart(answer: &str, chart_type: &str, title: &str) -> Option<ChartSpec> {
    if !answer.to_lowercase().contains("<table") {
        return None;
    }

    let mut headers: Vec<String> = Vec::new();
    let mut data_rows: Vec<Vec<String>> = Vec::new();

    for row in tr_re().captures_iter(answer) {
        let row_html = row.get(1).map_or("", |m| m.as_str());
        let mut cells = Vec::new();
        let mut is_header = false;
        for cell in cell_re().captures_iter(row_html) {
            if cell.get(1).map_or("", |m| m.as_str()).eq_ignore_ascii_case("h") {
                is_header = true;
            }
            let text = tag_re()
                .replace_all(cell.get(2).map_or("", |m| m.as_str()), "")
                .trim()
                .to_string();
            if !text.is_empty() {
                cells.push(text);
            }
        }
        if cells.is_empty() {
            continue;
        }
        if is_header && headers.is_empty() {
            headers = cells;
        } else if !cells[0].to_lowercase().starts_with("total") {
            data_rows.push(cells);
        }
    }

    build_chart(&headers, &data_rows, chart_type, title)
}

/// Pipe-delimited text table reader, tolerating markdown separators and a
/// trailing total row.
fn pipe_table_to_chart(answer: &str, chart_type: &str, title: &str) -> Option<ChartSpec> {
    let mut headers: Vec<String> = Vec::new();
    let mut data_rows: Vec<Vec<String>> = Vec::new();

    for line in answer.lines() {
        let line = line.trim();
        if line.is_empty() || !line.contains('|') {
            continue;
        }
        // markdown separator rows are dashes, pipes and spaces
        if line.chars().all(|c| "-|= \t:".contains(c)) {
            continue;
        }
        if line.to_lowercase().starts_with("total") {
            continue;
        }

        let cells: Vec<String> = line
            .trim_matches('|')
            .split('|')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if cells.is_empty() {
            continue;
        }

        if headers.is_empty() {
            headers = cells;
        } else if !cells[0].to_lowercase().starts_with("total") {
            data_rows.push(cells);
        }
    }

    build_chart(&headers, &data_rows, chart_type, title)
}

/// Assemble a chart from a header row and data rows: first column is the
/// label, every further header column becomes a dataset. Non-numeric cells
/// coerce to zero, short datasets are padded to the label count.
fn build_chart(
    headers: &[String],
    data_rows: &[Vec<String>],
    chart_type: &str,
    title: &str,
) -> Option<ChartSpec> {
    if headers.len() < 2 || data_rows.is_empty() {
        return None;
    }

    let mut labels: Vec<String> = Vec::new();
    let mut datasets: Vec<Dataset> = headers[1..]
        .iter()
        .map(|h| Dataset { name: h.clone(), values: Vec::new() })
        .collect();

    for row in data_rows {
        if row.len() < 2 {
            continue;
        }
        let label = &row[0];
        if labels.contains(label) {
            continue;
        }
        labels.push(label.clone());

        for (i, dataset) in datasets.iter_mut().enumerate() {
            let value = row.get(i + 1).map_or(0.0, |cell| parse_numeric(cell));
            dataset.values.push(value);
        }
    }

    if labels.is_empty() {
        return None;
    }

    for dataset in &mut datasets {
        while dataset.values.len() < labels.len() {
            dataset.values.push(0.0);
        }
    }

    // single-series chart types keep only the first dataset
    if matches!(chart_type, "pie" | "donut") {
        datasets.truncate(1);
    }

    Some(ChartSpec {
        chart_type: chart_type.to_string(),
        title: title.to_string(),
        labels,
        datasets,
        height: DEFAULT_HEIGHT,
        colors: None,
    })
}

/// Numeric cell coercion: currency symbols, commas and spaces stripped,
/// anything unparseable is zero
fn parse_numeric(cell: &str) -> f64 {
    let cleaned: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_chart_keywords() {
        assert!(wants_chart("Show me a CHART of sales"));
        assert!(wants_chart("can you plot this?"));
        assert!(!wants_chart("list my sales orders"));
    }

    #[test]
    fn test_chart_type_detection() {
        assert_eq!(chart_type_for("pie chart of orders"), "pie");
        assert_eq!(chart_type_for("line graph please"), "line");
        assert_eq!(chart_type_for("show a chart"), "bar");
    }

    #[test]
    fn test_chart_title_detection() {
        assert_eq!(chart_title_for("chart my sales orders"), "Sales Data");
        assert_eq!(chart_title_for("graph by status"), "Status Summary");
        assert_eq!(chart_title_for("plot something"), "Data Visualization");
    }

    #[test]
    fn test_pipe_table_bar_chart() {
        let answer = "Sales Orders by Status:\n\n\
            | Status | Orders | Total Amount |\n\
            |--------|--------|---------------|\n\
            | Draft | 5 | $25,000.00 |\n\
            | To Deliver | 12 | $150,000.00 |\n\
            | Total | 17 | $175,000.00 |\n";
        let spec = chart_from_answer(answer, "bar", "Status Summary").unwrap();
        assert_eq!(spec.chart_type, "bar");
        assert_eq!(spec.labels, vec!["Draft", "To Deliver"]);
        assert_eq!(spec.datasets.len(), 2);
        assert_eq!(spec.datasets[0].name, "Orders");
        assert_eq!(spec.datasets[0].values, vec![5.0, 12.0]);
        assert_eq!(spec.datasets[1].values, vec![25000.0, 150000.0]);
    }

    #[test]
    fn test_non_numeric_cells_coerce_to_zero() {
        let answer = "| Status | Count |\n| Draft | n/a |\n| Open | 3 |\n";
        let spec = chart_from_answer(answer, "bar", "t").unwrap();
        assert_eq!(spec.datasets[0].values, vec![0.0, 3.0]);
    }

    #[test]
    fn test_pie_keeps_first_dataset_only() {
        let answer = "| Status | Count | Amount |\n| Draft | 5 | 100 |\n";
        let spec = chart_from_answer(answer, "pie", "t").unwrap();
        assert_eq!(spec.datasets.len(), 1);
        assert_eq!(spec.datasets[0].name, "Count");
    }

    #[test]
    fn test_html_table() {
        let answer = "<table><tr><th>Region</th><th>Sales</th></tr>\
            <tr><td>North</td><td>$1,200</td></tr>\
            <tr><td>Total</td><td>$1,200</td></tr></table>";
        let spec = chart_from_answer(answer, "bar", "Sales Data").unwrap();
        assert_eq!(spec.labels, vec!["North"]);
        assert_eq!(spec.datasets[0].values, vec![1200.0]);
    }

    #[test]
    fn test_json_block_wins() {
        let answer = "Here you go:\n```json\n{\"type\": \"line\", \"title\": \"Trend\", \
            \"labels\": [\"Jan\", \"Feb\"], \"datasets\": [{\"name\": \"Sales\", \"values\": [1, 2]}]}\n```\n\
            | a | b |\n| c | 1 |";
        let spec = chart_from_answer(answer, "bar", "x").unwrap();
        assert_eq!(spec.chart_type, "line");
        assert_eq!(spec.height, 300);
    }

    #[test]
    fn test_no_table_yields_none() {
        assert_eq!(chart_from_answer("Just words.", "bar", "t"), None);
    }

    #[test]
    fn test_prose_with_stray_pipe_yields_none() {
        assert_eq!(chart_from_answer("a | b\n", "bar", "t"), None);
    }
}
