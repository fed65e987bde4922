//! Developer environment detection for package managers and script shells

use crate::plan::Shell;
use crate::registry::catalog;
use serde::Serialize;
use std::path::PathBuf;
use std::process::Command;

/// Package manager detection result
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

/// Check whether `name` answers `--version`
pub fn check_tool(name: &'static str) -> ToolInfo {
    let output = Command::new(name).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            ToolInfo {
                name,
                version: Some(version),
                available: true,
            }
        }
        _ => ToolInfo {
            name,
            version: None,
            available: false,
        },
    }
}

/// Probe every known package manager, in catalog order
pub fn check_package_managers() -> Vec<ToolInfo> {
    catalog::PACKAGE_MANAGERS
        .keys()
        .copied()
        .map(check_tool)
        .collect()
}

/// Script dialect that fits the current platform
pub fn recommended_shell() -> Shell {
    if cfg!(windows) {
        Shell::PowerShell
    } else {
        Shell::Bash
    }
}

/// Snapshot reported by `supe doctor`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentReport {
    pub platform: &'static str,
    pub arch: &'static str,
    pub cwd: Option<PathBuf>,
    pub shell: Option<String>,
    pub recommended_shell: Shell,
    pub package_managers: Vec<ToolInfo>,
}

impl EnvironmentReport {
    pub fn available(&self) -> impl Iterator<Item = &ToolInfo> {
        self.package_managers.iter().filter(|t| t.available)
    }
}

pub fn detect_environment() -> EnvironmentReport {
    let shell = std::env::var("SHELL")
        .or_else(|_| std::env::var("ComSpec"))
        .ok();
    EnvironmentReport {
        platform: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        cwd: std::env::current_dir().ok(),
        shell,
        recommended_shell: recommended_shell(),
        package_managers: check_package_managers(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_reported_unavailable() {
        let info = check_tool("supe-definitely-not-installed");
        assert!(!info.available);
        assert!(info.version.is_none());
    }

    #[test]
    fn test_report_covers_every_package_manager() {
        let report = detect_environment();
        let names: Vec<_> = report.package_managers.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["bun", "deno", "npm", "pnpm", "yarn"]);
        assert!(report.available().all(|t| t.version.is_some()));
    }

    #[cfg(unix)]
    #[test]
    fn test_recommends_bash_on_unix() {
        assert_eq!(recommended_shell(), Shell::Bash);
    }
}
