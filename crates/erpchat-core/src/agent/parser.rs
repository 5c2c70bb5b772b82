//! Marker-based tool call extraction
//!
//! The model requests a tool with `TOOL: name INPUT: payload` somewhere in
//! its free text. Only the first marker pair counts; the payload runs to the
//! end of its line. A payload that looks like JSON gets a strict parse, then
//! a single-quote repair pass, then falls through as an opaque string.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::tools::ArgMap;

/// Payload of a parsed tool request
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    /// Named arguments, from a JSON object payload
    Structured(ArgMap),
    /// Free text, for the single-argument call shape
    Text(String),
}

/// A tool request extracted from model output
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedToolCall {
    pub name: String,
    pub input: ToolInput,
}

fn tool_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"TOOL:\s*(\w+)").unwrap())
}

fn input_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"INPUT:\s*(.+?)(\n|$)").unwrap())
}

/// Extract the first tool request from model output, if any
pub fn parse_tool_call(text: &str) -> Option<ParsedToolCall> {
    if !text.contains("TOOL:") || !text.contains("INPUT:") {
        return None;
    }

    let name = tool_re().captures(text)?.get(1)?.as_str().to_string();
    let payload = input_re().captures(text)?.get(1)?.as_str().trim();
    if payload.is_empty() {
        return None;
    }

    let input = if payload.starts_with('{') || payload.starts_with('[') {
        parse_json_payload(payload)?
    } else {
        ToolInput::Text(payload.to_string())
    };

    Some(ParsedToolCall { name, input })
}

/// JSON payload handling: strict parse, quote repair, opaque fallback.
/// An empty object or array parses but carries nothing to call with.
fn parse_json_payload(payload: &str) -> Option<ToolInput> {
    let parsed = serde_json::from_str::<Value>(payload)
        .or_else(|_| serde_json::from_str::<Value>(&payload.replace('\'', "\"")));

    match parsed {
        Ok(Value::Object(map)) => {
            if map.is_empty() {
                None
            } else {
                Some(ToolInput::Structured(map))
            }
        }
        Ok(Value::Array(items)) => {
            if items.is_empty() {
                None
            } else {
                Some(ToolInput::Text(payload.to_string()))
            }
        }
        Ok(_) | Err(_) => Some(ToolInput::Text(payload.to_string())),
    }
}
