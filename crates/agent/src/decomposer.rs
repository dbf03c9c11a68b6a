//! Task decomposer: splits compound requests into ordered sub-tasks.
//!
//! A request is split at the leftmost connective phrase ("then",
//! "and then", "after that", ...). When two connectives start at the same
//! position the longer one wins. The remainder is split once more, so a
//! plan holds at most three sub-tasks.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Connective phrases, matched case-insensitively. Each one must be
/// followed by whitespace, so words like "thenceforth" never split.
static CONNECTIVES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\s+then\s+",
        r"(?i)\s+and\s+then\s+",
        r"(?i)\s+after\s+that\s+",
        r"(?i)\s+followed\s+by\s+",
        r"(?i)\s*,\s*then\s+",
        r"(?i)\s*;\s*then\s+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("connective pattern is valid"))
    .collect()
});

/// Splits applied to a request; the last piece is never split further.
const MAX_SPLITS: usize = 2;

/// Ordered sub-tasks of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPlan {
    steps: Vec<String>,
}

impl TaskPlan {
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_multi_step(&self) -> bool {
        self.steps.len() > 1
    }

    pub fn into_steps(self) -> Vec<String> {
        self.steps
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskDecomposer;

impl TaskDecomposer {
    pub fn new() -> Self {
        Self
    }

    /// Split `input` into a plan. Input without a usable connective is a
    /// single-step plan holding the (quote-stripped) request.
    pub fn decompose(&self, input: &str) -> TaskPlan {
        let mut rest = strip_outer_quotes(input.trim()).to_string();
        let mut steps = Vec::new();

        for _ in 0..MAX_SPLITS {
            match split_once(&rest) {
                Some((head, tail)) => {
                    steps.push(head);
                    rest = tail;
                }
                None => break,
            }
        }
        steps.push(rest);

        TaskPlan { steps }
    }
}

/// Split at the leftmost connective; both sides must be non-empty.
fn split_once(text: &str) -> Option<(String, String)> {
    let (start, end) = CONNECTIVES
        .iter()
        .filter_map(|re| re.find(text).map(|m| (m.start(), m.end())))
        .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))?;

    let head = text[..start].trim();
    let tail = text[end..].trim();
    if head.is_empty() || tail.is_empty() {
        return None;
    }
    Some((head.to_string(), tail.to_string()))
}

fn strip_outer_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner.trim();
        }
    }
    s
}
