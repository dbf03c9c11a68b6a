//! File operations tool: list, read and write files, or report the cwd.
//!
//! Commands:
//! - `list:<path>` (empty path means the current directory)
//! - `read:<path>` (returns at most `read_limit` characters)
//! - `write:<path>:<content>`
//! - `cwd`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use taskloop_core::error::ToolError;
use taskloop_core::tool::{Observation, Tool};
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Entries shown per category in a directory listing.
const LISTING_PREVIEW: usize = 5;

pub struct FileOperationsTool {
    read_limit: usize,
}

impl FileOperationsTool {
    pub fn new(read_limit: usize) -> Self {
        Self { read_limit }
    }

    async fn list(&self, path: &str) -> Result<Observation, ToolError> {
        let path = if path.is_empty() { current_dir()? } else { PathBuf::from(path) };
        if !path.is_dir() {
            return Err(ToolError::ExecutionFailed(format!(
                "Directory '{}' does not exist",
                path.display()
            )));
        }

        let mut reader = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.file_type().await {
                Ok(kind) if kind.is_dir() => dirs.push(name),
                Ok(kind) if kind.is_file() => files.push(name),
                _ => {}
            }
        }
        dirs.sort();
        files.sort();

        Ok(Observation::text(format!(
            "Directory '{}': {} folders, {} files. Folders: {}. Files: {}",
            path.display(),
            dirs.len(),
            files.len(),
            preview(&dirs),
            preview(&files)
        )))
    }

    async fn read(&self, path: &str) -> Result<Observation, ToolError> {
        let path = Path::new(path);
        if !path.is_file() {
            return Err(ToolError::ExecutionFailed(format!(
                "File '{}' does not exist or is not readable",
                path.display()
            )));
        }

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?
            .len();

        // A char is at most four bytes, so the prefix always holds one char
        // past the limit when the file is longer than it.
        let cap = (self.read_limit as u64 + 1) * 4;
        let mut prefix = Vec::new();
        file.take(cap)
            .read_to_end(&mut prefix)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        let content = String::from_utf8_lossy(&prefix);
        let mut chars = content.chars();
        let mut excerpt: String = chars.by_ref().take(self.read_limit).collect();
        if chars.next().is_some() {
            excerpt.push_str("...");
        }

        Ok(Observation::text(format!(
            "File '{}' ({} bytes): {}",
            path.display(),
            size,
            excerpt
        )))
    }

    async fn write(&self, args: &str) -> Result<Observation, ToolError> {
        let (path, content) = args.split_once(':').ok_or_else(|| {
            ToolError::InvalidArguments("Use format 'write:filepath:content'".into())
        })?;
        let path = path.trim();
        if path.is_empty() {
            return Err(ToolError::InvalidArguments(
                "Use format 'write:filepath:content'".into(),
            ));
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to write '{path}': {e}")))?;

        Ok(Observation::text(format!(
            "File written: '{}' ({} characters)",
            path,
            content.chars().count()
        )))
    }
}

impl Default for FileOperationsTool {
    fn default() -> Self {
        Self::new(500)
    }
}

fn current_dir() -> Result<PathBuf, ToolError> {
    std::env::current_dir().map_err(|e| ToolError::ExecutionFailed(e.to_string()))
}

fn preview(names: &[String]) -> String {
    let shown = names.iter().take(LISTING_PREVIEW).cloned().collect::<Vec<_>>();
    let suffix = if names.len() > LISTING_PREVIEW { "..." } else { "" };
    format!("{shown:?}{suffix}")
}

#[async_trait]
impl Tool for FileOperationsTool {
    fn name(&self) -> &str {
        "file_operations"
    }

    fn description(&self) -> &str {
        "File and directory operations: 'list:<path>', 'read:<path>', 'write:<path>:<content>', or 'cwd'."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "One of 'list:<path>', 'read:<path>', 'write:<path>:<content>', 'cwd'"
                }
            },
            "required": ["input"]
        })
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        debug!(operation = %input, "File operation");
        if let Some(path) = input.strip_prefix("list:") {
            self.list(path.trim()).await
        } else if let Some(path) = input.strip_prefix("read:") {
            self.read(path.trim()).await
        } else if let Some(args) = input.strip_prefix("write:") {
            self.write(args).await
        } else if input.trim() == "cwd" {
            Ok(Observation::text(format!(
                "Current directory: {}",
                current_dir()?.display()
            )))
        } else {
            Err(ToolError::InvalidArguments(
                "Use 'list:path', 'read:filepath', 'write:filepath:content', or 'cwd'".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let tool = FileOperationsTool::default();

        let obs = tool
            .execute(&format!("write:{}:hello: world", path.display()))
            .await
            .unwrap();
        assert!(obs.render().contains("(12 characters)"));

        let obs = tool.execute(&format!("read:{}", path.display())).await.unwrap();
        assert!(obs.render().ends_with("(12 bytes): hello: world"));
    }

    #[tokio::test]
    async fn read_is_truncated_to_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.txt");
        std::fs::write(&path, "x".repeat(20)).unwrap();

        let obs = FileOperationsTool::new(8)
            .execute(&format!("read:{}", path.display()))
            .await
            .unwrap();
        assert!(obs.render().ends_with(": xxxxxxxx..."));
    }

    #[tokio::test]
    async fn large_file_reports_full_size_but_short_excerpt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        std::fs::write(&path, "y".repeat(1_000_000)).unwrap();

        let obs = FileOperationsTool::default()
            .execute(&format!("read:{}", path.display()))
            .await
            .unwrap();
        let text = obs.render();
        assert!(text.contains("(1000000 bytes): "), "{text}");
        assert!(text.ends_with(&format!("{}...", "y".repeat(500))));
    }

    #[tokio::test]
    async fn multibyte_text_is_cut_on_char_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.txt");
        std::fs::write(&path, "é".repeat(10)).unwrap();

        let tool = FileOperationsTool::new(4);
        let obs = tool.execute(&format!("read:{}", path.display())).await.unwrap();
        assert!(obs.render().ends_with("(20 bytes): éééé..."));

        let exact = FileOperationsTool::new(10);
        let obs = exact.execute(&format!("read:{}", path.display())).await.unwrap();
        assert!(obs.render().ends_with(&"é".repeat(10)));
    }

    #[tokio::test]
    async fn list_counts_files_and_folders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();

        let obs = FileOperationsTool::default()
            .execute(&format!("list:{}", dir.path().display()))
            .await
            .unwrap();
        let text = obs.render();
        assert!(text.contains("1 folders, 2 files"), "{text}");
        assert!(text.contains(r#"Files: ["a.txt", "b.txt"]"#), "{text}");
    }

    #[tokio::test]
    async fn list_without_path_uses_cwd() {
        let obs = FileOperationsTool::default().execute("list:").await.unwrap();
        assert!(obs.render().starts_with("Directory '"));
    }

    #[tokio::test]
    async fn missing_file_is_error() {
        let err = FileOperationsTool::default()
            .execute("read:/definitely/not/here.txt")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn cwd_reports_directory() {
        let obs = FileOperationsTool::default().execute("cwd").await.unwrap();
        assert!(obs.render().starts_with("Current directory: "));
    }

    #[tokio::test]
    async fn unknown_operation_is_usage_error() {
        let err = FileOperationsTool::default().execute("delete:x").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
