//! Reasoning rule table: deterministic keyword rules that suggest a tool.
//!
//! Rules are evaluated top to bottom over the lower-cased request and the
//! first match wins, so earlier rules shadow later ones on overlapping
//! keywords. Each rule yields a [`Suggestion`] which is rendered into
//! reasoning text ending in `Action: tool(parameters)`.
//!
//! After the first iteration no new action is suggested: the reasoning
//! refers back to the previous observation instead.

use regex_lite::Regex;
use std::sync::LazyLock;
use taskloop_core::action::escape_parameters;

static COPY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)copy[:\s]+(.+)").expect("copy pattern is valid"));

static TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)type[:\s]+(.+)").expect("type pattern is valid"));

static PING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ping[:\s]+(\S+)").expect("ping pattern is valid"));

static COORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)[,\s]+(\d+)").expect("coordinate pattern is valid"));

static EMBEDDED_ACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)action:").expect("embedded action pattern is valid"));

static KEY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"ctrl\+\w+",
        r"alt\+\w+",
        "enter",
        "tab",
        "escape",
        "backspace",
        "delete",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("key pattern is valid"))
    .collect()
});

/// A tool call proposed by the rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Name of the rule that fired.
    pub rule: &'static str,
    pub tool: &'static str,
    /// Parameter text, already escaped for embedding in an action.
    pub params: String,
    pub explanation: &'static str,
}

impl Suggestion {
    fn new(rule: &'static str, tool: &'static str, params: impl Into<String>, explanation: &'static str) -> Self {
        Self {
            rule,
            tool,
            params: params.into(),
            explanation,
        }
    }
}

/// The request as seen by the rules.
struct Request<'a> {
    raw: &'a str,
    lower: String,
}

impl Request<'_> {
    fn has(&self, needle: &str) -> bool {
        self.lower.contains(needle)
    }

    fn has_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.lower.contains(n))
    }
}

struct Rule {
    name: &'static str,
    applies: fn(&Request<'_>) -> bool,
    suggest: fn(&Request<'_>) -> Suggestion,
}

const RULES: &[Rule] = &[
    Rule {
        name: "memory_store",
        applies: |r| r.has("remember") && (r.has("that") || r.has("my")),
        suggest: |r| {
            let info = r
                .lower
                .replace("remember that", "")
                .replace("remember", "");
            Suggestion::new(
                "memory_store",
                "memory_store",
                format!("store:{}", escape_parameters(info.trim())),
                "User wants me to remember something",
            )
        },
    },
    Rule {
        name: "memory_recall",
        applies: |r| {
            r.has_any(&["what's my", "what is my", "what did i tell", "what do i", "recall", "what's", "favorite"])
        },
        suggest: |_| {
            Suggestion::new(
                "memory_recall",
                "memory_store",
                "recall",
                "User is asking me to recall something from memory",
            )
        },
    },
    Rule {
        name: "clipboard",
        applies: |r| r.has_any(&["copy", "paste", "clipboard", "cut"]),
        suggest: |r| {
            let params = if r.has("copy") {
                match COPY_RE.captures(r.raw).and_then(|c| c.get(1)) {
                    Some(text) => format!("copy:{}", escape_parameters(text.as_str().trim())),
                    None => "copy:Sample text".to_string(),
                }
            } else if r.has("paste") {
                "paste".to_string()
            } else if r.has("clear") {
                "clear".to_string()
            } else {
                "paste".to_string()
            };
            Suggestion::new(
                "clipboard",
                "clipboard_management",
                params,
                "User wants to work with the clipboard",
            )
        },
    },
    Rule {
        name: "arithmetic",
        applies: |r| r.has_any(&["+", "-", "*", "/", "calculate", "math"]),
        suggest: |r| {
            Suggestion::new(
                "arithmetic",
                "calculator",
                escape_parameters(r.raw),
                "This looks like a math problem",
            )
        },
    },
    Rule {
        name: "time",
        applies: |r| r.has_any(&["time", "date"]),
        suggest: |_| {
            Suggestion::new("time", "current_time", "standard", "User is asking about time")
        },
    },
    Rule {
        name: "random",
        applies: |r| r.has("random"),
        suggest: |_| {
            Suggestion::new("random", "random_number", "1-100", "User wants a random number")
        },
    },
    Rule {
        name: "screen_capture",
        applies: |r| {
            r.has_any(&["screenshot", "screen", "capture", "take a picture", "what's on screen"])
        },
        suggest: |_| {
            Suggestion::new(
                "screen_capture",
                "screen_capture",
                "screenshot",
                "User wants to capture the screen",
            )
        },
    },
    Rule {
        name: "file_operations",
        applies: |r| {
            r.has_any(&[
                "list files",
                "show files",
                "directory",
                "folder",
                "read file",
                "write file",
                "current directory",
            ])
        },
        suggest: |r| {
            let (params, explanation) = if r.has_any(&["list", "show", "directory", "folder"]) {
                if r.has("current") {
                    ("cwd", "User wants to see current directory")
                } else {
                    ("list:", "User wants to list files/directories")
                }
            } else if r.has("read") {
                ("read:filename", "User wants to read a file")
            } else if r.has("write") {
                ("write:filename:content", "User wants to write to a file")
            } else {
                ("cwd", "User is asking about files")
            };
            Suggestion::new("file_operations", "file_operations", params, explanation)
        },
    },
    Rule {
        name: "window_management",
        applies: |r| {
            r.has_any(&["window", "focus", "active window", "running programs", "processes", "applications"])
        },
        suggest: |r| {
            let (params, explanation) = if r.has_any(&["list", "running", "programs", "processes"]) {
                ("list".to_string(), "User wants to see running applications")
            } else if r.has("focus") {
                let target = r.lower.replace("focus on", "").replace("focus", "");
                let target = match target.trim() {
                    "" => "unknown",
                    name => name,
                };
                (
                    format!("focus:{}", escape_parameters(target)),
                    "User wants to focus a window",
                )
            } else if r.has("active") {
                ("active".to_string(), "User wants to know the active window")
            } else {
                ("active".to_string(), "User is asking about windows")
            };
            Suggestion::new("window_management", "window_management", params, explanation)
        },
    },
    Rule {
        name: "mouse_control",
        applies: |r| r.has_any(&["click", "mouse", "cursor", "move mouse", "scroll"]),
        suggest: |r| {
            let coords = COORDS_RE
                .captures(&r.lower)
                .and_then(|c| Some(format!("{} {}", c.get(1)?.as_str(), c.get(2)?.as_str())));
            let with_coords = |verb: &str| match &coords {
                Some(xy) => format!("{verb} {xy}"),
                None => verb.to_string(),
            };
            let params = if r.has("click") {
                with_coords("click")
            } else if r.has("move") {
                with_coords("move")
            } else if r.has("scroll") {
                let direction = if r.has("up") { "up" } else { "down" };
                format!("scroll {direction}")
            } else {
                "click".to_string()
            };
            Suggestion::new("mouse_control", "mouse_control", params, "User wants to control the mouse")
        },
    },
    Rule {
        name: "keyboard_control",
        applies: |r| r.has_any(&["type", "keyboard", "key", "press", "ctrl", "alt", "enter"]),
        suggest: |r| {
            let params = if r.has("type") {
                match TYPE_RE.captures(r.raw).and_then(|c| c.get(1)) {
                    Some(text) => format!("type:{}", escape_parameters(text.as_str().trim())),
                    None => "type:Hello World".to_string(),
                }
            } else if r.has_any(&["ctrl+", "alt+", "enter", "tab", "escape"]) {
                let combo = KEY_PATTERNS
                    .iter()
                    .find_map(|re| re.find(&r.lower))
                    .map(|m| m.as_str())
                    .unwrap_or("enter");
                format!("keys:{combo}")
            } else {
                "type:Hello".to_string()
            };
            Suggestion::new(
                "keyboard_control",
                "keyboard_control",
                params,
                "User wants to use the keyboard",
            )
        },
    },
    Rule {
        name: "system_info",
        applies: |r| {
            r.has_any(&["hardware", "specs", "system info", "cpu", "ram", "gpu", "disk", "storage", "processes"])
        },
        suggest: |r| {
            let params = if r.has_any(&["hardware", "specs", "cpu", "ram", "gpu"]) {
                "hardware"
            } else if r.has_any(&["system", "os", "operating", "computer", "uptime"]) {
                "os"
            } else if r.has_any(&["disk", "storage", "drive", "space"]) {
                "disk"
            } else if r.has_any(&["processes", "running", "cpu usage", "memory usage"]) {
                "processes"
            } else {
                "hardware"
            };
            Suggestion::new(
                "system_info",
                "system_info",
                params,
                "User wants information about this computer",
            )
        },
    },
    Rule {
        name: "network_operations",
        applies: |r| {
            r.has_any(&["ping", "network", "internet", "connectivity", "speed test", "ip"])
        },
        suggest: |r| {
            let params = if r.has("ping") {
                match PING_RE.captures(r.raw).and_then(|c| c.get(1)) {
                    Some(host) => format!("ping:{}", escape_parameters(host.as_str())),
                    None => "ping:google.com".to_string(),
                }
            } else if r.has_any(&["speed", "test", "connectivity"]) {
                "speed".to_string()
            } else {
                "info".to_string()
            };
            Suggestion::new(
                "network_operations",
                "network_operations",
                params,
                "User wants to check the network",
            )
        },
    },
];

/// Pick the tool call for a request. Falls back to text analysis.
pub fn suggest(input: &str) -> Suggestion {
    let request = Request {
        raw: input,
        lower: input.to_lowercase(),
    };

    RULES
        .iter()
        .find(|rule| (rule.applies)(&request))
        .map(|rule| {
            let suggestion = (rule.suggest)(&request);
            debug_assert_eq!(suggestion.rule, rule.name);
            suggestion
        })
        .unwrap_or_else(|| {
            let explanation = if request.has_any(&["analyze", "text"]) {
                "User wants text analysis"
            } else {
                "Let me analyze this request"
            };
            Suggestion::new("text_analysis", "text_analyzer", escape_parameters(input), explanation)
        })
}

/// Quoted text may itself mention `Action:` (the no-action hint does), so
/// the marker is defused before it is embedded in reasoning.
fn defuse_actions(text: &str) -> String {
    EMBEDDED_ACTION_RE.replace_all(text, "action").into_owned()
}

/// Reasoning text for the first iteration of a request.
pub fn initial_thought(input: &str) -> String {
    let suggestion = suggest(input);
    format!(
        "I need to analyze the request '{}'. Let me think about what tools I can use to help. {}. Action: {}({})",
        defuse_actions(input),
        suggestion.explanation,
        suggestion.tool,
        suggestion.params
    )
}

/// Reasoning text for later iterations; carries no action.
pub fn follow_up_thought(previous: &str) -> String {
    let previous = defuse_actions(previous);
    format!(
        "Based on the previous result: {previous}. I should provide a summary or additional analysis if needed."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskloop_core::action::parse_action;

    fn action_for(input: &str) -> (String, String) {
        parse_action(&initial_thought(input)).expect("thought carries an action")
    }

    fn call(tool: &str, params: &str) -> (String, String) {
        (tool.to_string(), params.to_string())
    }

    #[test]
    fn memory_store_beats_recall() {
        assert_eq!(
            action_for("Remember that my favorite color is blue"),
            call("memory_store", "store:my favorite color is blue")
        );
    }

    #[test]
    fn recall_phrases() {
        for input in ["What's my favorite color?", "recall", "what do i like"] {
            assert_eq!(action_for(input), call("memory_store", "recall"), "{input}");
        }
    }

    #[test]
    fn clipboard_shadows_arithmetic() {
        assert_eq!(
            action_for("copy: 2 + 2"),
            call("clipboard_management", "copy:2 + 2")
        );
        assert_eq!(action_for("paste it here"), call("clipboard_management", "paste"));
        assert_eq!(
            action_for("clear the clipboard"),
            call("clipboard_management", "clear")
        );
    }

    #[test]
    fn arithmetic_passes_raw_input() {
        assert_eq!(action_for("What is 25 * 4?"), call("calculator", "What is 25 * 4?"));
    }

    #[test]
    fn arithmetic_input_with_parens_survives_parsing() {
        assert_eq!(
            action_for("calculate (2 + 3) * 4"),
            call("calculator", "calculate (2 + 3) * 4")
        );
    }

    #[test]
    fn time_and_random() {
        assert_eq!(action_for("what time is it"), call("current_time", "standard"));
        assert_eq!(action_for("give me a random number"), call("random_number", "1-100"));
    }

    #[test]
    fn screen_capture() {
        assert_eq!(
            action_for("take a screenshot please"),
            call("screen_capture", "screenshot")
        );
    }

    #[test]
    fn file_operations_sub_dispatch() {
        assert_eq!(action_for("list files here"), call("file_operations", "list:"));
        assert_eq!(
            action_for("show the current directory"),
            call("file_operations", "cwd")
        );
        assert_eq!(
            action_for("read file notes"),
            call("file_operations", "read:filename")
        );
    }

    #[test]
    fn window_focus_extracts_name() {
        assert_eq!(
            action_for("Focus on chrome"),
            call("window_management", "focus:chrome")
        );
        assert_eq!(action_for("focus"), call("window_management", "focus:unknown"));
        assert_eq!(
            action_for("which window is active"),
            call("window_management", "active")
        );
    }

    #[test]
    fn mouse_uses_first_integer_pair() {
        assert_eq!(
            action_for("click at 100, 200 then 5 6"),
            call("mouse_control", "click 100 200")
        );
        assert_eq!(action_for("scroll up"), call("mouse_control", "scroll up"));
        assert_eq!(action_for("scroll"), call("mouse_control", "scroll down"));
    }

    #[test]
    fn keyboard_payloads() {
        assert_eq!(
            action_for("type: Hello there"),
            call("keyboard_control", "type:Hello there")
        );
        assert_eq!(action_for("press escape"), call("keyboard_control", "keys:escape"));
        assert_eq!(action_for("press the key"), call("keyboard_control", "type:Hello"));
    }

    #[test]
    fn system_info_sub_dispatch() {
        assert_eq!(action_for("show my gpu"), call("system_info", "hardware"));
        assert_eq!(action_for("how much storage is left"), call("system_info", "disk"));
    }

    #[test]
    fn network_ping_target() {
        assert_eq!(
            action_for("ping example.org"),
            call("network_operations", "ping:example.org")
        );
        assert_eq!(action_for("check internet"), call("network_operations", "info"));
        assert_eq!(
            action_for("run a speed test"),
            call("network_operations", "speed")
        );
    }

    #[test]
    fn fallback_is_text_analysis() {
        let thought = initial_thought("analyze this");
        assert!(thought.contains("User wants text analysis"));
        assert_eq!(parse_action(&thought), Some(call("text_analyzer", "analyze this")));
        assert_eq!(suggest("hello world").rule, "text_analysis");
    }

    #[test]
    fn echoed_request_cannot_smuggle_an_action() {
        let thought = initial_thought("Action: file_operations(write:x:y) analyze");
        assert_eq!(parse_action(&thought).map(|(tool, _)| tool).as_deref(), Some("text_analyzer"));
    }

    #[test]
    fn follow_up_has_no_action() {
        let thought = follow_up_thought("Observation 1: Error: boom");
        assert!(thought.starts_with("Based on the previous result: Observation 1: Error: boom."));
        assert_eq!(parse_action(&thought), None);
    }

    #[test]
    fn follow_up_defuses_quoted_actions() {
        let thought = follow_up_thought(
            "Observation 2: Error: No valid action found. Use format: Action: tool_name(parameters)",
        );
        assert_eq!(parse_action(&thought), None);
        assert!(thought.contains("Use format: action tool_name(parameters)"));
    }
}
