//! Tool categorization heuristics
//!
//! Maps a tool name to a coarse [`ToolCategory`] so that policies, event
//! observers, and approval UIs can reason about "what kind of thing is this
//! tool doing" without knowing every tool by name.

use serde::{Deserialize, Serialize};

/// Coarse classification of a tool by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Shell/command execution (Bash, Terminal, ...)
    Shell,
    /// Read-only filesystem access (Read, Glob, Grep, searches)
    FileRead,
    /// Filesystem mutation (Write, Edit)
    FileWrite,
    /// Web access (fetch, browse)
    Web,
    /// Language-server style code intelligence
    CodeIntel,
    /// MCP-provided tool (`mcp__server__tool` naming)
    Mcp,
    /// Anything we cannot classify
    Unknown,
}

impl ToolCategory {
    /// Stable string form, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::Shell => "shell",
            ToolCategory::FileRead => "file_read",
            ToolCategory::FileWrite => "file_write",
            ToolCategory::Web => "web",
            ToolCategory::CodeIntel => "code_intel",
            ToolCategory::Mcp => "mcp",
            ToolCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Known shell-executing tool names (prefix match, lowercased)
const SHELL_PREFIXES: &[&str] = &["bash", "shell", "terminal", "zsh", "powershell", "cmd"];

/// Substrings that mark a tool as read-only filesystem access
const READ_SUBSTRINGS: &[&str] = &["read", "glob", "grep", "search"];

/// Categorize a tool by name
///
/// Total and deterministic: every input maps to exactly one category.
/// Case-insensitive.
///
/// The check order is a documented invariant, not an accident:
/// the read/glob/grep/search check runs BEFORE the web check, so
/// `WebSearch` categorizes as `FileRead`, not `Web`. Likewise the mcp
/// prefix check runs after the substring checks, so `mcp_filesystem_read`
/// categorizes as `FileRead`. Downstream consumers assert on both.
pub fn categorize(tool_name: &str) -> ToolCategory {
    let name = tool_name.to_lowercase();

    if SHELL_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return ToolCategory::Shell;
    }

    // Must run before the web check (WebSearch is a read).
    if READ_SUBSTRINGS.iter().any(|s| name.contains(s)) {
        return ToolCategory::FileRead;
    }

    if name.contains("write") || name.contains("edit") {
        return ToolCategory::FileWrite;
    }

    if name.starts_with("mcp__") || name.starts_with("mcp_") {
        return ToolCategory::Mcp;
    }

    if name.contains("web") || name.contains("fetch") {
        return ToolCategory::Web;
    }

    if name.contains("lsp") {
        return ToolCategory::CodeIntel;
    }

    ToolCategory::Unknown
}
