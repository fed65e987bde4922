//! Scaffold orchestration: plan, scripts, guidance, report and optional execution

use crate::error::{Error, Result};
use crate::plan::{generate_scaffold_plan, is_comment, render_all_scripts, ScaffoldConfig};
use crate::registry::catalog;
use crate::registry::presets::{find_preset, StarterPreset};
use crate::runtime::SafeExecutor;
use crate::security::{security_policy_report, SecurityReport};
use crate::validate::ensure_theme;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const PSYCHOLOGY: &[&str] = &[
    "Use progressive disclosure to reduce overwhelm for new users",
    "Keep primary actions visually consistent to improve decision speed",
    "Favor legible spacing and short labels for developer ergonomics",
];

const DEVELOPER_EXPERIENCE: &[&str] = &[
    "Include copy-pasteable commands and sensible defaults",
    "Prefer strict validation errors with actionable hints",
    "Expose machine-readable JSON outputs for automation",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignGuidance {
    pub theme: String,
    pub palette: Vec<&'static str>,
    pub vibe: &'static str,
    pub psychology: Vec<&'static str>,
    pub developer_experience: Vec<&'static str>,
}

pub fn design_guidance(theme: &str) -> Result<DesignGuidance> {
    let preset = ensure_theme(theme)?;
    Ok(DesignGuidance {
        theme: theme.to_string(),
        palette: preset.palette.to_vec(),
        vibe: preset.vibe,
        psychology: PSYCHOLOGY.to_vec(),
        developer_experience: DEVELOPER_EXPERIENCE.to_vec(),
    })
}

/// A CI workflow ready to be written into the project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CiTemplateFile {
    pub id: String,
    pub filename: &'static str,
    pub content: &'static str,
}

pub fn ci_templates<S: AsRef<str>>(ids: &[S]) -> Result<Vec<CiTemplateFile>> {
    ids.iter()
        .map(|id| {
            let id = id.as_ref();
            catalog::ci_template(id)
                .map(|t| CiTemplateFile {
                    id: id.to_string(),
                    filename: t.filename,
                    content: t.content,
                })
                .ok_or_else(|| Error::config(format!("Unknown CI template: {}", id)))
        })
        .collect()
}

/// Generated documentation file, path relative to the project root
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootFile {
    pub path: String,
    pub content: String,
}

fn boot_files(
    config: &ScaffoldConfig,
    design: &DesignGuidance,
    commands: &[String],
    include_docs_site: bool,
) -> Vec<BootFile> {
    let ui = if config.ui_components.is_empty() {
        "none".to_string()
    } else {
        config.ui_components.join(", ")
    };
    let steps: Vec<&str> = commands
        .iter()
        .map(String::as_str)
        .filter(|c| !is_comment(c))
        .collect();

    let mut files = vec![BootFile {
        path: "SCAFFOLD.md".to_string(),
        content: format!(
            "# {name}\n\n\
             - Framework: {fw}\n\
             - Package manager: {pm}\n\
             - UI: {ui}\n\
             - Theme: {theme} ({vibe})\n\n\
             ## Commands\n\n```bash\n{steps}\n```\n",
            name = config.project_name,
            fw = config.framework,
            pm = config.package_manager,
            ui = ui,
            theme = design.theme,
            vibe = design.vibe,
            steps = steps.join("\n"),
        ),
    }];

    if include_docs_site {
        files.push(BootFile {
            path: "docs/index.md".to_string(),
            content: format!(
                "# {}\n\nBuilt with {} and {}.\n\nSee [Getting started](getting-started.md).\n",
                config.project_name, config.framework, ui
            ),
        });
        files.push(BootFile {
            path: "docs/getting-started.md".to_string(),
            content: format!(
                "# Getting started\n\n\
                 1. Install dependencies: `{}`\n\
                 2. Start the dev server with your framework's `dev` script.\n\n\
                 Palette: {}\n",
                catalog::install_hints()
                    .get(config.package_manager.as_str())
                    .copied()
                    .unwrap_or("npm install"),
                design.palette.join(", ")
            ),
        });
    }
    files
}

/// Options beyond the configuration itself
#[derive(Debug, Clone, Default)]
pub struct ScaffoldOptions {
    pub run: bool,
    pub include_docs_site: bool,
    pub ci_templates: Vec<String>,
    pub executor: SafeExecutor,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldResult {
    #[serde(flatten)]
    pub config: ScaffoldConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<StarterPreset>,
    pub design: DesignGuidance,
    pub security: SecurityReport,
    pub ci_templates: Vec<CiTemplateFile>,
    pub commands: Vec<String>,
    pub scripts: BTreeMap<String, String>,
    pub boot_files: Vec<BootFile>,
    pub executed: bool,
}

/// Build the full result without running anything
pub fn plan_starter_app(config: ScaffoldConfig, options: &ScaffoldOptions) -> Result<ScaffoldResult> {
    let commands = generate_scaffold_plan(&config)?;
    let design = design_guidance(&config.theme)?;
    let security = security_policy_report(
        &config.framework,
        &config.ui_components,
        &config.package_manager,
        options.run,
    )?;
    let ci = ci_templates(&options.ci_templates)?;
    let scripts = render_all_scripts(&commands);
    let boot = boot_files(&config, &design, &commands, options.include_docs_site);

    tracing::debug!(
        project = %config.project_name,
        framework = %config.framework,
        steps = commands.len(),
        "planned scaffold"
    );

    Ok(ScaffoldResult {
        config,
        preset: None,
        design,
        security,
        ci_templates: ci,
        commands,
        scripts,
        boot_files: boot,
        executed: false,
    })
}

/// Write boot files and CI workflows under `project_dir`
pub fn write_project_files(project_dir: &Path, result: &ScaffoldResult) -> Result<Vec<PathBuf>> {
    let files = result
        .boot_files
        .iter()
        .map(|f| (f.path.as_str(), f.content.as_str()))
        .chain(result.ci_templates.iter().map(|t| (t.filename, t.content)));

    let mut written = Vec::new();
    for (relative, content) in files {
        let path = project_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        std::fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
        written.push(path);
    }
    Ok(written)
}

async fn finish(mut result: ScaffoldResult, options: &ScaffoldOptions) -> Result<ScaffoldResult> {
    if !options.run {
        return Ok(result);
    }
    let report = options.executor.execute(&result.commands).await?;
    write_project_files(&report.working_dir, &result)?;
    result.executed = true;
    tracing::info!(
        project = %result.config.project_name,
        commands = report.commands_run.len(),
        "scaffold executed"
    );
    Ok(result)
}

/// Plan a starter app and, when `options.run` is set, execute the plan
pub async fn scaffold_starter_app(
    config: ScaffoldConfig,
    options: &ScaffoldOptions,
) -> Result<ScaffoldResult> {
    let result = plan_starter_app(config, options)?;
    finish(result, options).await
}

/// Plan a starter app from a registry preset without running it
pub fn plan_from_preset(
    project_name: &str,
    preset_id: &str,
    external: &[StarterPreset],
    options: &ScaffoldOptions,
) -> Result<ScaffoldResult> {
    let preset = find_preset(preset_id, external)?;
    let config = ScaffoldConfig::new(
        project_name,
        preset.framework.clone(),
        preset.ui.clone(),
        preset.package_manager.clone(),
    )
    .with_theme(preset.theme.clone());

    let mut options = options.clone();
    // Preset workflows come first, extra ones requested by the caller after
    let mut ci = preset.ci_templates.clone();
    ci.extend(
        options
            .ci_templates
            .iter()
            .filter(|id| !preset.ci_templates.contains(id))
            .cloned(),
    );
    options.ci_templates = ci;

    let mut result = plan_starter_app(config, &options)?;
    result.preset = Some(preset);
    Ok(result)
}

pub async fn scaffold_from_preset(
    project_name: &str,
    preset_id: &str,
    external: &[StarterPreset],
    options: &ScaffoldOptions,
) -> Result<ScaffoldResult> {
    let result = plan_from_preset(project_name, preset_id, external, options)?;
    finish(result, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn demo() -> ScaffoldConfig {
        ScaffoldConfig::new("demo-app", "react", vec!["tailwind".into()], "npm")
    }

    #[test]
    fn test_design_guidance() {
        let design = design_guidance("neon_noir").unwrap();
        assert_eq!(design.palette[0], "#0B1021");
        assert_eq!(design.psychology.len(), 3);
        assert_eq!(design.developer_experience.len(), 3);
        assert!(design_guidance("vaporwave").is_err());
    }

    #[test]
    fn test_plan_starter_app_assembles_result() {
        let result = plan_starter_app(demo(), &ScaffoldOptions::default()).unwrap();
        assert!(!result.executed);
        assert_eq!(result.security.score, 92);
        assert_eq!(result.commands[0], "npx create-vite demo-app --template react-ts");
        assert_eq!(
            result.scripts.keys().collect::<Vec<_>>(),
            vec!["bash", "cmd", "powershell"]
        );
        let paths: Vec<_> = result.boot_files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["SCAFFOLD.md"]);
        assert!(result.boot_files[0].content.contains("npm install"));
        assert!(!result.boot_files[0].content.contains("# Theme preset"));
    }

    #[test]
    fn test_docs_site_adds_boot_files() {
        let options = ScaffoldOptions {
            include_docs_site: true,
            ..Default::default()
        };
        let result = plan_starter_app(demo(), &options).unwrap();
        let paths: Vec<_> = result.boot_files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["SCAFFOLD.md", "docs/index.md", "docs/getting-started.md"]
        );
    }

    #[test]
    fn test_unknown_ci_template() {
        let options = ScaffoldOptions {
            ci_templates: vec!["gitlab".into()],
            ..Default::default()
        };
        let err = plan_starter_app(demo(), &options).unwrap_err();
        assert_eq!(err.to_string(), "Unknown CI template: gitlab");
    }

    #[test]
    fn test_plan_from_preset_uses_preset_fields() {
        let options = ScaffoldOptions {
            ci_templates: vec!["node_basic".into()],
            ..Default::default()
        };
        let result = plan_from_preset("shop", "commerce", &[], &options).unwrap();
        assert_eq!(result.config.framework, "remix");
        assert_eq!(result.config.theme, "sunrise_flow");
        let ci: Vec<_> = result.ci_templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ci, vec!["node_basic", "node_security"]);
        assert_eq!(result.preset.as_ref().unwrap().id, "commerce");
    }

    #[test]
    fn test_write_project_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = ScaffoldOptions {
            include_docs_site: true,
            ci_templates: vec!["node_security".into()],
            ..Default::default()
        };
        let result = plan_starter_app(demo(), &options).unwrap();
        let written = write_project_files(dir.path(), &result).unwrap();
        assert_eq!(written.len(), 4);
        assert!(dir.path().join("docs/getting-started.md").exists());
        let workflow =
            std::fs::read_to_string(dir.path().join(".github/workflows/security.yml")).unwrap();
        assert!(workflow.contains("npm audit --audit-level=high"));
    }

    #[tokio::test]
    async fn test_preview_does_not_execute() {
        let result = scaffold_starter_app(demo(), &ScaffoldOptions::default())
            .await
            .unwrap();
        assert!(!result.executed);
    }
}
