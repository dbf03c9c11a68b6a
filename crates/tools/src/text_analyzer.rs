//! Text analyzer tool: basic statistics about a piece of text.

use async_trait::async_trait;
use taskloop_core::error::ToolError;
use taskloop_core::tool::{Observation, Tool};

pub struct TextAnalyzerTool;

/// Word, character and letter-case counts for a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub words: usize,
    pub characters: usize,
    pub uppercase: usize,
    pub lowercase: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            characters: text.chars().count(),
            uppercase: text.chars().filter(|c| c.is_uppercase()).count(),
            lowercase: text.chars().filter(|c| c.is_lowercase()).count(),
        }
    }
}

#[async_trait]
impl Tool for TextAnalyzerTool {
    fn name(&self) -> &str {
        "text_analyzer"
    }

    fn description(&self) -> &str {
        "Analyze text properties: word count, character count, uppercase and lowercase letters."
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        let stats = TextStats::of(input);
        Ok(Observation::text(format!(
            "Text analysis: {} words, {} characters, {} uppercase, {} lowercase",
            stats.words, stats.characters, stats.uppercase, stats.lowercase
        )))
    }
}
