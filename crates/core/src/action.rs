//! Action parsing: turns free-form reasoning text into a tool call.
//!
//! Reasoning text embeds at most one call of the form
//! `Action: tool_name(parameters)`. The match is case-insensitive, the tool
//! name is lower-cased, and the parameter text runs up to the first closing
//! parenthesis that is not escaped with a backslash.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)action:\s*(\w+)\(((?:[^)\\]|\\.)*)\)").expect("action pattern is valid")
});

/// A tool call extracted from reasoning text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAction {
    pub tool_name: String,
    /// The raw parameter string lives under [`AgentAction::INPUT_KEY`].
    pub parameters: BTreeMap<String, String>,
    pub reasoning_text: String,
}

impl AgentAction {
    pub const INPUT_KEY: &'static str = "input";

    pub fn new(
        tool_name: impl Into<String>,
        input: impl Into<String>,
        reasoning_text: impl Into<String>,
    ) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert(Self::INPUT_KEY.to_string(), input.into());
        Self {
            tool_name: tool_name.into(),
            parameters,
            reasoning_text: reasoning_text.into(),
        }
    }

    /// Parse the first action embedded in `reasoning_text`.
    pub fn parse(reasoning_text: &str) -> Option<Self> {
        let (tool_name, input) = parse_action(reasoning_text)?;
        Some(Self::new(tool_name, input, reasoning_text))
    }

    /// The raw parameter string handed to the tool.
    pub fn input(&self) -> &str {
        self.parameters
            .get(Self::INPUT_KEY)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// `tool(parameters)`, as shown in traces.
    pub fn render(&self) -> String {
        format!("{}({})", self.tool_name, self.input())
    }
}

/// Extract `(tool_name, parameter_string)` from reasoning text.
///
/// Returns `None` when the text contains no action; that is a valid
/// outcome, not an error.
pub fn parse_action(text: &str) -> Option<(String, String)> {
    let caps = ACTION_RE.captures(text)?;
    let tool_name = caps.get(1)?.as_str().to_lowercase();
    let raw = unescape(caps.get(2)?.as_str());
    Some((tool_name, strip_quotes(&raw).to_string()))
}

/// Escape closing parentheses so `text` can be embedded as action parameters.
pub fn escape_parameters(text: &str) -> String {
    text.replace('\\', "\\\\").replace(')', "\\)")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && (next == ')' || next == '\\')
        {
            out.push(next);
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

fn strip_quotes(s: &str) -> &str {
    let is_quote = |c: char| c == '"' || c == '\'';
    let s = s.strip_prefix(is_quote).unwrap_or(s);
    s.strip_suffix(is_quote).unwrap_or(s)
}
