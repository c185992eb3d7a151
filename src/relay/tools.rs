// External tool discovery (yt-dlp, python3 + instaloader)

use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Python,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Python => "python3",
        }
    }

    fn version_arg(&self) -> &'static str {
        "--version"
    }
}

#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: Option<String>,
    pub is_available: bool,
}

/// Locate a binary on common install paths, then on `PATH`
pub fn locate(tool_type: ToolType) -> Option<String> {
    let binary_name = tool_type.as_str();

    let common_paths = [
        format!("/opt/homebrew/bin/{}", binary_name),
        format!("/usr/local/bin/{}", binary_name),
        format!("/usr/bin/{}", binary_name),
    ];

    for path in common_paths {
        if std::path::Path::new(&path).exists() {
            return Some(path);
        }
    }

    if let Ok(output) = Command::new("which").arg(binary_name).output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return Some(path);
            }
        }
    }

    None
}

/// Path to use for a tool, falling back to the bare name
pub fn resolve(tool_type: ToolType) -> String {
    locate(tool_type).unwrap_or_else(|| tool_type.as_str().to_string())
}

fn version_of(path: &str, tool_type: ToolType) -> Option<String> {
    match Command::new(path).arg(tool_type.version_arg()).output() {
        Ok(output) if output.status.success() => {
            // python prints its version on stderr on older releases
            let raw = if output.stdout.is_empty() {
                output.stderr
            } else {
                output.stdout
            };
            Some(String::from_utf8_lossy(&raw).trim().to_string())
        }
        _ => None,
    }
}

/// Status of the tool at `path`
pub fn tool_info(tool_type: ToolType, path: &str) -> ToolInfo {
    let version = version_of(path, tool_type);
    ToolInfo {
        name: tool_type.as_str().to_string(),
        tool_type,
        is_available: version.is_some(),
        version,
        path: Some(path.to_string()),
    }
}

/// Check that `python` can import `module`
pub fn python_has_module(python: &str, module: &str) -> bool {
    let code = format!("import {}", module);
    match Command::new(python).args(["-c", &code]).output() {
        Ok(out) => out.status.success(),
        Err(_) => false,
    }
}
