//! Human and JSON rendering of command results

use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::collections::BTreeMap;
use supe_core::plan::{is_comment, Shell};
use supe_core::rank::RankedPreset;
use supe_core::registry::Catalog;
use supe_core::runtime::EnvironmentReport;
use supe_core::scaffold::{DesignGuidance, ScaffoldResult};
use supe_core::security::{CheckStatus, PolicyEvaluation, SecurityReport};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn status_label(status: CheckStatus) -> ColoredString {
    match status {
        CheckStatus::Pass => "pass".green(),
        CheckStatus::Warn => "warn".yellow(),
        CheckStatus::Fail => "fail".red().bold(),
    }
}

fn print_checks(report: &SecurityReport) {
    println!("{} {}/100", "Security score:".bold(), report.score);
    for check in &report.checks {
        println!("  [{}] {} {}", status_label(check.status), check.id, check.detail.dimmed());
    }
}

pub fn print_scaffold(result: &ScaffoldResult, shell: Option<Shell>, json: bool) -> Result<()> {
    if json {
        return print_json(result);
    }
    if let Some(shell) = shell {
        if let Some(script) = result.scripts.get(shell.as_str()) {
            print!("{}", script);
            return Ok(());
        }
    }

    let config = &result.config;
    println!();
    match &result.preset {
        Some(preset) => println!(
            "{} {} from preset {}",
            "Planned".green().bold(),
            config.project_name.cyan(),
            preset.id.cyan()
        ),
        None => println!(
            "{} {} ({} + {})",
            "Planned".green().bold(),
            config.project_name.cyan(),
            config.framework,
            config.package_manager
        ),
    }
    println!();

    println!("{}", "Commands:".bold());
    for command in result.commands.iter().filter(|c| !is_comment(c)) {
        println!("  {}", command.yellow());
    }
    println!();

    let design = &result.design;
    println!("{} {} ({})", "Theme:".bold(), design.theme, design.vibe.dimmed());
    println!("{} {}", "Palette:".bold(), design.palette.join(", "));
    if !result.ci_templates.is_empty() {
        let files: Vec<_> = result.ci_templates.iter().map(|t| t.filename).collect();
        println!("{} {}", "CI:".bold(), files.join(", "));
    }
    let boot: Vec<_> = result.boot_files.iter().map(|f| f.path.as_str()).collect();
    println!("{} {}", "Boot files:".bold(), boot.join(", "));
    println!();

    print_checks(&result.security);
    println!();

    if result.executed {
        println!("{}", "All commands completed.".green());
    } else {
        println!(
            "{}",
            "Preview only. Re-run with --run to execute, or --shell <bash|powershell|cmd> for a script."
                .dimmed()
        );
    }
    Ok(())
}

pub fn print_presets(presets: &[RankedPreset], json: bool) -> Result<()> {
    if json {
        return print_json(presets);
    }
    if presets.is_empty() {
        println!("{}", "No presets match.".yellow());
        return Ok(());
    }
    for ranked in presets {
        let preset = &ranked.preset;
        let source = if preset.trust.is_some() { " (external)" } else { "" };
        println!(
            "- {} [{} / {}] score={}{}: {}",
            preset.id.cyan(),
            preset.category,
            preset.maturity,
            ranked.score,
            source.dimmed(),
            preset.description
        );
    }
    Ok(())
}

pub fn print_security(report: &SecurityReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }
    print_checks(report);
    println!();
    println!("{}", "Recommendations:".bold());
    for rec in &report.recommendations {
        println!("  - {}", rec);
    }
    Ok(())
}

pub fn print_policy(evaluation: &PolicyEvaluation, json: bool) -> Result<()> {
    if json {
        return print_json(evaluation);
    }
    let verdict = if evaluation.passed() {
        "Policy check passed".green().bold()
    } else {
        "Policy check failed".red().bold()
    };
    println!("{}", verdict);
    for check in &evaluation.checks {
        println!("  [{}] {} {}", status_label(check.status), check.id, check.detail.dimmed());
    }
    println!();
    print_checks(&evaluation.report);
    Ok(())
}

pub fn print_design(design: &DesignGuidance, json: bool) -> Result<()> {
    if json {
        return print_json(design);
    }
    println!("{} {}", "Theme:".bold(), design.theme.cyan());
    println!("{} {}", "Vibe:".bold(), design.vibe);
    println!("{} {}", "Palette:".bold(), design.palette.join(", "));
    println!("{}", "Psychology:".bold());
    for item in &design.psychology {
        println!("  - {}", item);
    }
    println!("{}", "Developer experience:".bold());
    for item in &design.developer_experience {
        println!("  - {}", item);
    }
    Ok(())
}

pub fn print_catalog(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        return print_json(catalog);
    }
    println!("{}", "Frameworks:".bold());
    for fw in &catalog.frameworks {
        println!(
            "  - {} [{}] ecosystem={}",
            fw.id.cyan(),
            fw.descriptor.category,
            fw.descriptor.ecosystem
        );
    }
    println!("{}", "UI libraries:".bold());
    for ui in &catalog.ui_libraries {
        let ecosystems: Vec<_> = ui.descriptor.ecosystems.iter().map(|e| e.as_str()).collect();
        println!("  - {} ({})", ui.id.cyan(), ecosystems.join(", "));
    }
    println!("{}", "Animation libraries:".bold());
    for lib in &catalog.animation_libraries {
        println!("  - {} {}", lib.id.cyan(), lib.descriptor.install.dimmed());
    }
    println!("{}", "Mouse interaction libraries:".bold());
    for lib in &catalog.mouse_interaction_libraries {
        println!(
            "  - {}: {}",
            lib.id.cyan(),
            lib.descriptor.focus.unwrap_or_default()
        );
    }
    println!("{}", "Package managers:".bold());
    for pm in &catalog.package_managers {
        println!("  - {} ecosystem={}", pm.id.cyan(), pm.descriptor.ecosystem);
    }
    println!("{}", "Themes:".bold());
    for theme in &catalog.themes {
        println!("  - {}: {}", theme.id.cyan(), theme.descriptor.vibe);
    }
    Ok(())
}

pub fn print_install_hints(hints: &BTreeMap<&'static str, &'static str>, json: bool) -> Result<()> {
    if json {
        return print_json(hints);
    }
    for (manager, command) in hints {
        println!("- {}: {}", manager, command.yellow());
    }
    Ok(())
}

pub fn print_doctor(report: &EnvironmentReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }
    println!("{} {} ({})", "Platform:".bold(), report.platform, report.arch);
    if let Some(cwd) = &report.cwd {
        println!("{} {}", "Directory:".bold(), cwd.display());
    }
    if let Some(shell) = &report.shell {
        println!("{} {}", "Shell:".bold(), shell);
    }
    println!("{} {}", "Recommended script shell:".bold(), report.recommended_shell);
    println!("{}", "Package managers:".bold());
    for tool in &report.package_managers {
        match &tool.version {
            Some(version) => println!("  {} {} {}", "✓".green(), tool.name, version.dimmed()),
            None => println!("  {} {} {}", "✗".red(), tool.name, "not found".dimmed()),
        }
    }
    if report.available().next().is_none() {
        println!();
        println!(
            "{} no package manager found; install Node.js (https://nodejs.org) or Deno (https://deno.com)",
            "Warning:".yellow()
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: &'a str,
    message: String,
}

pub fn print_error(err: &anyhow::Error, json: bool) {
    let kind = err
        .downcast_ref::<supe_core::Error>()
        .map(|e| e.kind())
        .unwrap_or("Error");
    if json {
        let body = serde_json::json!({
            "error": ErrorBody {
                kind,
                message: format!("{:#}", err),
            }
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
        );
    } else {
        eprintln!("{} {:#}", format!("{}:", kind).red().bold(), err);
    }
}
