//! Command plan generation

use crate::error::Result;
use crate::registry::catalog::{self, Ecosystem};
use crate::validate::{ensure_compatibility, ensure_theme, validate_project_name};
use serde::{Deserialize, Serialize};

pub const DEFAULT_THEME: &str = "calm_pro";

/// A scaffold request: what to build and with which tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldConfig {
    pub project_name: String,
    pub framework: String,
    pub ui_components: Vec<String>,
    pub package_manager: String,
    pub theme: String,
}

impl ScaffoldConfig {
    pub fn new(
        project_name: impl Into<String>,
        framework: impl Into<String>,
        ui_components: Vec<String>,
        package_manager: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            framework: framework.into(),
            ui_components,
            package_manager: package_manager.into(),
            theme: DEFAULT_THEME.to_string(),
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }
}

/// Dependency install command for a node package manager
fn install_command(package_manager: &str) -> String {
    match package_manager {
        "npm" => "npm install".to_string(),
        "yarn" => "yarn install".to_string(),
        other => format!("{} install", other),
    }
}

/// Build the ordered command plan for a configuration.
///
/// The plan is: generator invocation, `cd` into the project, dependency
/// install (node only), one install line per UI library in input order, then
/// two `#` annotations for the theme and its palette.
pub fn generate_scaffold_plan(config: &ScaffoldConfig) -> Result<Vec<String>> {
    validate_project_name(&config.project_name)?;
    let resolved = ensure_compatibility(
        &config.framework,
        &config.ui_components,
        &config.package_manager,
    )?;
    let theme = ensure_theme(&config.theme)?;

    let starter = resolved
        .framework
        .starter
        .replace("{name}", &config.project_name);
    let create = if resolved.package_manager.runner.is_empty() {
        starter
    } else {
        format!("{} {}", resolved.package_manager.runner, starter)
    };

    let mut steps = vec![create, format!("cd {}", config.project_name)];

    if resolved.package_manager.ecosystem == Ecosystem::Node {
        steps.push(install_command(&config.package_manager));
    }

    for ui in &config.ui_components {
        // ensure_compatibility already resolved every id
        if let Some(lib) = catalog::ui_library(ui) {
            steps.push(lib.install.replace("{pm}", &config.package_manager));
        }
    }

    steps.push(format!("# Theme preset: {}", config.theme));
    steps.push(format!("# Palette: {}", theme.palette.join(", ")));

    Ok(steps)
}
