//! Security report and organizational policy evaluation

use crate::error::{Error, Result};
use crate::validate::ensure_compatibility;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

const SCORE_PREVIEW: u32 = 92;
const SCORE_RUN: u32 = 85;

const RECOMMENDATIONS: &[&str] = &[
    "Pin framework generator versions when possible.",
    "Run npm/pnpm/yarn audit (or equivalent) after scaffold.",
    "Use lockfiles and CI dependency scanning.",
    "Enable secret scanning and code scanning in GitHub settings.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub id: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn new(id: &'static str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            id,
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityReport {
    pub score: u32,
    pub checks: Vec<Check>,
    pub recommendations: Vec<&'static str>,
}

/// Score a configuration. Running commands lowers the score and flags run mode.
pub fn security_policy_report<S: AsRef<str>>(
    framework: &str,
    ui: &[S],
    package_manager: &str,
    run: bool,
) -> Result<SecurityReport> {
    let resolved = ensure_compatibility(framework, ui, package_manager)?;

    let run_mode = if run {
        Check::new(
            "run_mode",
            CheckStatus::Warn,
            "Command execution is enabled; review commands before running.",
        )
    } else {
        Check::new(
            "run_mode",
            CheckStatus::Pass,
            "Safe preview mode enabled (no execution).",
        )
    };

    Ok(SecurityReport {
        score: if run { SCORE_RUN } else { SCORE_PREVIEW },
        checks: vec![
            Check::new(
                "ecosystem_compatibility",
                CheckStatus::Pass,
                format!(
                    "Framework ecosystem '{}' matches package manager '{}'.",
                    resolved.framework.ecosystem, package_manager
                ),
            ),
            Check::new(
                "ui_compatibility",
                CheckStatus::Pass,
                format!("All {} UI libraries are compatible.", ui.len()),
            ),
            run_mode,
        ],
        recommendations: RECOMMENDATIONS.to_vec(),
    })
}

/// Organizational policy. Unknown keys are ignored, non-string list entries dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    pub blocked_frameworks: Vec<String>,
    pub blocked_ui: Vec<String>,
    /// Empty means every package manager is allowed
    pub allowed_package_managers: Vec<String>,
}

fn string_list(map: &Map<String, Value>, keys: [&str; 2]) -> Vec<String> {
    keys.iter()
        .find_map(|key| map.get(*key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl PolicyDocument {
    /// Build from parsed JSON; `None` unless the value is an object
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            version: map.get("version").cloned(),
            blocked_frameworks: string_list(map, ["blockedFrameworks", "blocked_frameworks"]),
            blocked_ui: string_list(map, ["blockedUi", "blocked_ui"]),
            allowed_package_managers: string_list(
                map,
                ["allowedPackageManagers", "allowed_package_managers"],
            ),
        })
    }
}

/// Read a policy file; anything but a JSON object is rejected
pub fn load_policy_file(path: &Path) -> Result<PolicyDocument> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let value: Value = serde_json::from_str(&raw).map_err(|e| Error::PolicyFileFormat {
        path: path.to_path_buf(),
        detail: format!("invalid JSON: {}", e),
    })?;
    PolicyDocument::from_value(&value).ok_or_else(|| Error::PolicyFileFormat {
        path: path.to_path_buf(),
        detail: "expected a JSON object".to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyEvaluation {
    pub status: CheckStatus,
    pub checks: Vec<Check>,
    pub report: SecurityReport,
    pub policy: PolicyDocument,
}

impl PolicyEvaluation {
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

fn status_of(ok: bool) -> CheckStatus {
    if ok {
        CheckStatus::Pass
    } else {
        CheckStatus::Fail
    }
}

/// Check a configuration against `policy`; passes only when every rule passes
pub fn evaluate_policy<S: AsRef<str>>(
    policy: &PolicyDocument,
    framework: &str,
    package_manager: &str,
    ui: &[S],
) -> Result<PolicyEvaluation> {
    let report = security_policy_report(framework, ui, package_manager, false)?;

    let framework_blocked = policy.blocked_frameworks.iter().any(|f| f == framework);
    let frameworks = Check::new(
        "blocked_frameworks",
        status_of(!framework_blocked),
        if framework_blocked {
            format!("Framework '{}' is blocked by policy.", framework)
        } else {
            format!("Framework '{}' is not blocked.", framework)
        },
    );

    let blocked_ui: Vec<&str> = ui
        .iter()
        .map(|lib| lib.as_ref())
        .filter(|lib| policy.blocked_ui.iter().any(|b| b == lib))
        .collect();
    let ui_check = Check::new(
        "blocked_ui",
        status_of(blocked_ui.is_empty()),
        if blocked_ui.is_empty() {
            "No blocked UI libraries selected.".to_string()
        } else {
            format!("Blocked UI libraries selected: {}.", blocked_ui.join(", "))
        },
    );

    let allowed = &policy.allowed_package_managers;
    let pm_allowed = allowed.is_empty() || allowed.iter().any(|pm| pm == package_manager);
    let pm_check = Check::new(
        "allowed_package_managers",
        status_of(pm_allowed),
        if allowed.is_empty() {
            "No package manager restriction.".to_string()
        } else if pm_allowed {
            format!("Package manager '{}' is allowed.", package_manager)
        } else {
            format!(
                "Package manager '{}' is not in the allowed list ({}).",
                package_manager,
                allowed.join(", ")
            )
        },
    );

    let checks = vec![frameworks, ui_check, pm_check];
    let status = status_of(checks.iter().all(|c| c.status == CheckStatus::Pass));
    tracing::debug!(framework, package_manager, %status, "evaluated policy");

    Ok(PolicyEvaluation {
        status,
        checks,
        report,
        policy: policy.clone(),
    })
}
