//! Compatibility and project-name validation
//!
//! Checks run in a fixed order so the reported id is always the first
//! offender: framework, package manager, UI libraries in input order, theme.

use crate::error::{Error, Result};
use crate::registry::catalog::{self, Framework, PackageManager};
use regex::Regex;
use std::sync::LazyLock;

static PROJECT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_-]{1,62}$").expect("project name pattern is valid")
});

const WINDOWS_RESERVED: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Registry entries a validated configuration resolves to
#[derive(Debug, Clone, Copy)]
pub struct Resolved {
    pub framework: &'static Framework,
    pub package_manager: &'static PackageManager,
}

/// Validate a project name for use as a directory and in shell commands
pub fn validate_project_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(invalid("path traversal is not allowed"));
    }
    if WINDOWS_RESERVED.contains(&name.to_ascii_lowercase().as_str()) {
        return Err(invalid("it is reserved on Windows"));
    }
    if !PROJECT_NAME.is_match(name) {
        return Err(invalid(
            "use 2-63 chars: letters, numbers, dash, underscore, starting with a letter or number",
        ));
    }
    Ok(())
}

/// Confirm framework, package manager and UI libraries exist and share an ecosystem
pub fn ensure_compatibility<S: AsRef<str>>(
    framework: &str,
    ui: &[S],
    package_manager: &str,
) -> Result<Resolved> {
    let fw = catalog::framework(framework)
        .ok_or_else(|| Error::config(format!("Unsupported framework: {}", framework)))?;
    let pm = catalog::package_manager(package_manager).ok_or_else(|| {
        Error::config(format!("Unsupported package manager: {}", package_manager))
    })?;

    if fw.ecosystem != pm.ecosystem {
        return Err(Error::config(format!(
            "Incompatible package manager '{}' for framework '{}' ({} vs {})",
            package_manager, framework, pm.ecosystem, fw.ecosystem
        )));
    }

    for id in ui {
        let id = id.as_ref();
        let lib = catalog::ui_library(id)
            .ok_or_else(|| Error::config(format!("Unsupported UI component/library: {}", id)))?;
        if !lib.supports(fw.ecosystem) {
            return Err(Error::config(format!(
                "UI component/library '{}' is not compatible with {}",
                id, fw.ecosystem
            )));
        }
    }

    Ok(Resolved {
        framework: fw,
        package_manager: pm,
    })
}

pub fn ensure_theme(theme: &str) -> Result<&'static catalog::Theme> {
    catalog::theme(theme).ok_or_else(|| Error::config(format!("Unsupported theme preset: {}", theme)))
}
