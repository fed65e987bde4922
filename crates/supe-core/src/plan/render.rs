//! Render a command plan as a script for a specific shell dialect

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Supported script dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    Bash,
    PowerShell,
    Cmd,
}

impl Shell {
    pub const ALL: [Shell; 3] = [Shell::Bash, Shell::PowerShell, Shell::Cmd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::PowerShell => "powershell",
            Shell::Cmd => "cmd",
        }
    }

    fn prelude(&self) -> &'static [&'static str] {
        match self {
            Shell::Bash => &["set -euo pipefail"],
            Shell::PowerShell => &["$ErrorActionPreference = 'Stop'"],
            Shell::Cmd => &["@echo off", "setlocal"],
        }
    }

    fn line_separator(&self) -> &'static str {
        match self {
            Shell::Cmd => "\r\n",
            _ => "\n",
        }
    }

    fn change_dir(&self, line: &str, target: &str) -> String {
        match self {
            Shell::Bash => line.to_string(),
            Shell::PowerShell => format!("Set-Location '{}'", target.replace('\'', "''")),
            Shell::Cmd => format!("cd /d {}", cmd_quote(target)),
        }
    }

    fn comment(&self, line: &str) -> String {
        match self {
            Shell::Bash | Shell::PowerShell => line.to_string(),
            Shell::Cmd => {
                let text = line.trim_start_matches('#').trim_start();
                format!("REM {}", text)
            }
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bash" | "sh" => Ok(Shell::Bash),
            "powershell" | "pwsh" => Ok(Shell::PowerShell),
            "cmd" => Ok(Shell::Cmd),
            other => Err(format!(
                "unknown shell '{}' (expected bash, powershell or cmd)",
                other
            )),
        }
    }
}

fn is_cmd_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | ':' | '-')
}

/// Quote a cmd.exe argument only when it carries characters outside the safe set
fn cmd_quote(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(is_cmd_safe) {
        arg.to_string()
    } else {
        format!("\"{}\"", arg.replace('"', "\"\""))
    }
}

/// Render `plan` for `shell`.
///
/// Executable lines keep their order; `#` annotations are collected and
/// emitted after them in the dialect's comment syntax.
pub fn render_script<S: AsRef<str>>(plan: &[S], shell: Shell) -> String {
    let mut lines: Vec<String> = shell.prelude().iter().map(|l| l.to_string()).collect();
    let mut comments = Vec::new();

    for line in plan {
        let line = line.as_ref();
        if line.starts_with('#') {
            comments.push(shell.comment(line));
        } else if let Some(target) = line.strip_prefix("cd ") {
            lines.push(shell.change_dir(line, target));
        } else {
            lines.push(line.to_string());
        }
    }
    lines.extend(comments);

    let separator = shell.line_separator();
    let mut script = lines.join(separator);
    script.push_str(separator);
    script
}

/// Render the plan once per dialect, keyed by dialect name
pub fn render_all_scripts<S: AsRef<str>>(plan: &[S]) -> BTreeMap<String, String> {
    Shell::ALL
        .iter()
        .map(|shell| (shell.as_str().to_string(), render_script(plan, *shell)))
        .collect()
}
