//! Supe CLI - Plan and scaffold frontend/fullstack starter projects

mod output;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use supe_core::plan::{ScaffoldConfig, Shell, DEFAULT_THEME};
use supe_core::registry::{self, Ecosystem, PresetQuery, StarterPreset};
use supe_core::runtime::SafeExecutor;
use supe_core::scaffold::{self, ScaffoldOptions};
use supe_core::trust::{SignatureOptions, SignatureProvider};
use supe_core::{PresetPackSettings, ProductConfig};
use tracing_subscriber::EnvFilter;

/// Exit code for a configuration that fails policy
const EXIT_POLICY_FAILED: u8 = 2;

/// Supe product configuration
#[derive(Clone)]
pub struct SupeConfig;

impl ProductConfig for SupeConfig {
    fn name(&self) -> &'static str {
        "supe"
    }

    fn cli_description(&self) -> &'static str {
        "Plan, verify and scaffold frontend/fullstack starter projects"
    }

    fn preset_file_env(&self) -> &'static str {
        "SUPE_PRESET_FILE"
    }

    fn preset_sha256_env(&self) -> &'static str {
        "SUPE_PRESET_SHA256"
    }

    fn policy_file_env(&self) -> &'static str {
        "SUPE_POLICY_FILE"
    }

    fn log_env(&self) -> &'static str {
        "SUPE_LOG"
    }
}

#[derive(Parser, Debug)]
#[command(name = "supe")]
#[command(version)]
pub struct Args {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plan (and optionally run) a starter app from explicit choices
    Starter(StarterArgs),
    /// List, rank or scaffold from starter presets
    Preset(PresetArgs),
    /// Security report for a configuration
    Security(SecurityArgs),
    /// Check a configuration against a policy file (exit 2 on failure)
    PolicyCheck(PolicyCheckArgs),
    /// Design guidance for a theme
    Design(DesignArgs),
    /// List known frameworks, UI and add-on libraries, package managers and themes
    Catalog(JsonArg),
    /// Dependency install command per package manager
    InstallHints(JsonArg),
    /// Detect package managers and the recommended script shell
    Doctor(JsonArg),
}

#[derive(ClapArgs, Debug)]
pub struct JsonArg {
    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Flags describing a framework / package manager / UI choice
#[derive(ClapArgs, Debug)]
pub struct StackArgs {
    #[arg(long, default_value = "react")]
    pub framework: String,

    #[arg(long = "package-manager", default_value = "npm")]
    pub package_manager: String,

    /// UI libraries, repeatable or comma-separated
    #[arg(long, num_args = 1.., value_delimiter = ',', default_values = ["tailwind"])]
    pub ui: Vec<String>,
}

/// Flags shared by everything that produces a scaffold result
#[derive(ClapArgs, Debug)]
pub struct ScaffoldOutputArgs {
    /// Execute the planned commands
    #[arg(long)]
    pub run: bool,

    /// Also generate docs/index.md and docs/getting-started.md
    #[arg(long = "with-docs-site")]
    pub with_docs_site: bool,

    /// Print the script for this shell (bash, powershell, cmd)
    #[arg(long, value_parser = Shell::from_str)]
    pub shell: Option<Shell>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct StarterArgs {
    /// Project directory name
    pub name: String,

    #[command(flatten)]
    pub stack: StackArgs,

    #[arg(long, default_value = DEFAULT_THEME)]
    pub theme: String,

    /// CI workflow templates to include (node_basic, node_security)
    #[arg(long = "ci", num_args = 1.., value_delimiter = ',')]
    pub ci: Vec<String>,

    #[command(flatten)]
    pub output: ScaffoldOutputArgs,
}

/// External preset pack flags
#[derive(ClapArgs, Debug)]
pub struct PackArgs {
    /// External preset pack (JSON). Defaults to $SUPE_PRESET_FILE
    #[arg(long = "preset-file")]
    pub preset_file: Option<PathBuf>,

    /// Expected SHA-256 of the pack. Defaults to $SUPE_PRESET_SHA256
    #[arg(long = "preset-sha256")]
    pub preset_sha256: Option<String>,

    /// Detached signature for the pack
    #[arg(long = "preset-signature", requires = "preset_signature_provider")]
    pub preset_signature: Option<PathBuf>,

    /// Public key for rsa-pem, minisign or cosign-blob
    #[arg(long = "preset-public-key")]
    pub preset_public_key: Option<PathBuf>,

    /// none, sha256-file, rsa-pem, minisign or cosign-blob
    #[arg(long = "preset-signature-provider", value_parser = SignatureProvider::from_str)]
    pub preset_signature_provider: Option<SignatureProvider>,
}

impl PackArgs {
    fn settings(&self) -> PresetPackSettings {
        let signature = self.preset_signature_provider.map(|provider| {
            let mut options = SignatureOptions::new(provider);
            if let Some(sig) = &self.preset_signature {
                options = options.with_signature(sig);
            }
            if let Some(key) = &self.preset_public_key {
                options = options.with_public_key(key);
            }
            options
        });
        PresetPackSettings {
            file: self.preset_file.clone(),
            sha256: self.preset_sha256.clone(),
            signature,
        }
    }

    fn load(&self, config: &SupeConfig) -> Result<Vec<StarterPreset>> {
        match self.settings().with_env_defaults(config).source() {
            Some(source) => Ok(source.load()?),
            None => Ok(Vec::new()),
        }
    }
}

fn parse_ecosystem(value: &str) -> std::result::Result<Ecosystem, String> {
    Ecosystem::parse(value).ok_or_else(|| format!("unknown ecosystem '{}' (expected node or deno)", value))
}

#[derive(ClapArgs, Debug)]
pub struct PresetArgs {
    /// List presets instead of scaffolding one
    #[arg(long, conflicts_with = "name")]
    pub list: bool,

    /// Preset id to scaffold from
    #[arg(long, required_unless_present = "list", requires = "project_name")]
    pub name: Option<String>,

    /// Project directory name (with --name)
    pub project_name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_parser = parse_ecosystem)]
    pub ecosystem: Option<Ecosystem>,

    /// Case-insensitive match on id, description and notes
    #[arg(long)]
    pub search: Option<String>,

    /// Minimum rank score (0-100)
    #[arg(long = "min-score")]
    pub min_score: Option<f64>,

    /// Sort by score, highest first
    #[arg(long)]
    pub rank: bool,

    /// Include maintenance and adoption signals in scores
    #[arg(long = "telemetry-score")]
    pub telemetry_score: bool,

    #[command(flatten)]
    pub pack: PackArgs,

    #[command(flatten)]
    pub output: ScaffoldOutputArgs,
}

#[derive(ClapArgs, Debug)]
pub struct SecurityArgs {
    #[command(flatten)]
    pub stack: StackArgs,

    /// Report as if the commands will be executed
    #[arg(long = "run-intent")]
    pub run_intent: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct PolicyCheckArgs {
    /// Policy file (JSON object). Defaults to $SUPE_POLICY_FILE
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub stack: StackArgs,

    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct DesignArgs {
    #[arg(long, default_value = DEFAULT_THEME)]
    pub theme: String,

    #[arg(long)]
    pub json: bool,
}

fn init_tracing(config: &SupeConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(config.log_env()).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Command definition named and described by the product
fn cli(config: &SupeConfig) -> clap::Command {
    Args::command()
        .name(config.name())
        .about(config.cli_description())
}

fn parse_args(config: &SupeConfig) -> Args {
    let matches = cli(config).get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn scaffold_options(output: &ScaffoldOutputArgs, ci: Vec<String>) -> ScaffoldOptions {
    // Child output must not interleave with the JSON document on stdout
    let executor = if output.json {
        SafeExecutor::new().with_stdout_to_stderr()
    } else {
        SafeExecutor::new()
    };
    ScaffoldOptions {
        run: output.run,
        include_docs_site: output.with_docs_site,
        ci_templates: ci,
        executor,
    }
}

async fn starter_command(args: StarterArgs) -> Result<ExitCode> {
    let config = ScaffoldConfig::new(
        args.name,
        args.stack.framework,
        args.stack.ui,
        args.stack.package_manager,
    )
    .with_theme(args.theme);
    let options = scaffold_options(&args.output, args.ci);
    let result = scaffold::scaffold_starter_app(config, &options).await?;
    output::print_scaffold(&result, args.output.shell, args.output.json)?;
    Ok(ExitCode::SUCCESS)
}

async fn preset_command(args: PresetArgs, config: &SupeConfig) -> Result<ExitCode> {
    let external = args.pack.load(config)?;
    if !external.is_empty() {
        tracing::debug!(count = external.len(), "loaded external presets");
    }

    if args.list {
        let query = PresetQuery {
            category: args.category,
            ecosystem: args.ecosystem,
            search: args.search,
            min_score: args.min_score,
            telemetry: args.telemetry_score,
        };
        let presets = registry::query_presets(&query, &external);
        let mut ranked = supe_core::rank_presets(presets, args.telemetry_score);
        if !args.rank {
            ranked.sort_by(|a, b| a.preset.id.cmp(&b.preset.id));
        }
        output::print_presets(&ranked, args.output.json)?;
        return Ok(ExitCode::SUCCESS);
    }

    // clap guarantees both when --list is absent
    let (Some(name), Some(project_name)) = (args.name, args.project_name) else {
        anyhow::bail!("Usage: supe preset --name <preset> <project-name>");
    };
    let options = scaffold_options(&args.output, Vec::new());
    let result = scaffold::scaffold_from_preset(&project_name, &name, &external, &options).await?;
    output::print_scaffold(&result, args.output.shell, args.output.json)?;
    Ok(ExitCode::SUCCESS)
}

fn security_command(args: SecurityArgs) -> Result<ExitCode> {
    let report = supe_core::security_policy_report(
        &args.stack.framework,
        &args.stack.ui,
        &args.stack.package_manager,
        args.run_intent,
    )?;
    output::print_security(&report, args.json)?;
    Ok(ExitCode::SUCCESS)
}

fn policy_check_command(args: PolicyCheckArgs, config: &SupeConfig) -> Result<ExitCode> {
    let path = args
        .file
        .or_else(|| config.default_policy_file())
        .with_context(|| {
            format!(
                "--file is required for policy-check (or set {})",
                config.policy_file_env()
            )
        })?;
    let policy = supe_core::load_policy_file(&path)?;
    let evaluation = supe_core::evaluate_policy(
        &policy,
        &args.stack.framework,
        &args.stack.package_manager,
        &args.stack.ui,
    )?;
    output::print_policy(&evaluation, args.json)?;

    tracing::debug!(policy = %path.display(), passed = evaluation.passed(), "policy evaluated");
    if evaluation.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_POLICY_FAILED))
    }
}

async fn run(args: Args, config: &SupeConfig) -> Result<ExitCode> {
    tracing::debug!(command = ?args.command, "dispatching");
    match args.command {
        Command::Starter(starter) => starter_command(starter).await,
        Command::Preset(preset) => preset_command(preset, config).await,
        Command::Security(security) => security_command(security),
        Command::PolicyCheck(policy) => policy_check_command(policy, config),
        Command::Design(design) => {
            let guidance = scaffold::design_guidance(&design.theme)?;
            output::print_design(&guidance, design.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Catalog(flags) => {
            output::print_catalog(&registry::catalog(), flags.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::InstallHints(flags) => {
            output::print_install_hints(&registry::install_hints(), flags.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Doctor(flags) => {
            output::print_doctor(&supe_core::runtime::detect_environment(), flags.json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// True when the invocation asked for JSON output anywhere
fn wants_json(args: &Args) -> bool {
    match &args.command {
        Command::Starter(a) => a.output.json,
        Command::Preset(a) => a.output.json,
        Command::Security(a) => a.json,
        Command::PolicyCheck(a) => a.json,
        Command::Design(a) => a.json,
        Command::Catalog(a) | Command::InstallHints(a) | Command::Doctor(a) => a.json,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        std::process::exit(130);
    })
    .ok();

    let config = SupeConfig;
    let args = parse_args(&config);
    init_tracing(&config, args.verbose);

    let json = wants_json(&args);
    match run(args, &config).await {
        Ok(code) => code,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            output::print_error(&err, json);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli(&SupeConfig).debug_assert();
    }

    #[test]
    fn test_help_uses_product_identity() {
        let mut command = cli(&SupeConfig);
        assert_eq!(command.get_name(), "supe");
        let help = command.render_help().to_string();
        assert!(help.contains(SupeConfig.cli_description()));
    }

    #[test]
    fn test_json_runs_keep_child_stdout_off_stdout() {
        let args = Args::try_parse_from(["supe", "starter", "x1", "--run", "--json"]).unwrap();
        let Command::Starter(starter) = args.command else {
            panic!("expected starter");
        };
        let options = scaffold_options(&starter.output, Vec::new());
        assert!(options.run);
        assert_eq!(options.executor, SafeExecutor::new().with_stdout_to_stderr());

        let args = Args::try_parse_from(["supe", "starter", "x1", "--run"]).unwrap();
        let Command::Starter(starter) = args.command else {
            panic!("expected starter");
        };
        assert_eq!(scaffold_options(&starter.output, Vec::new()).executor, SafeExecutor::new());
    }

    #[test]
    fn test_starter_defaults() {
        let args = Args::try_parse_from(["supe", "starter", "demo-app"]).unwrap();
        match args.command {
            Command::Starter(s) => {
                assert_eq!(s.stack.framework, "react");
                assert_eq!(s.stack.package_manager, "npm");
                assert_eq!(s.stack.ui, vec!["tailwind"]);
                assert_eq!(s.theme, "calm_pro");
                assert!(!s.output.run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_ui_accepts_commas_and_repeats() {
        let args = Args::try_parse_from([
            "supe", "starter", "x1", "--ui", "tailwind,shadcn", "--ui", "radix",
        ])
        .unwrap();
        match args.command {
            Command::Starter(s) => assert_eq!(s.stack.ui, vec!["tailwind", "shadcn", "radix"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_preset_requires_list_or_name() {
        assert!(Args::try_parse_from(["supe", "preset"]).is_err());
        assert!(Args::try_parse_from(["supe", "preset", "--list"]).is_ok());
        assert!(Args::try_parse_from(["supe", "preset", "--name", "saas"]).is_err());
        assert!(Args::try_parse_from(["supe", "preset", "--name", "saas", "my-app"]).is_ok());
    }

    #[test]
    fn test_signature_requires_provider() {
        assert!(Args::try_parse_from([
            "supe", "preset", "--list", "--preset-signature", "pack.sig"
        ])
        .is_err());
        let args = Args::try_parse_from([
            "supe",
            "preset",
            "--list",
            "--preset-signature",
            "pack.sig",
            "--preset-signature-provider",
            "rsa-pem",
        ])
        .unwrap();
        match args.command {
            Command::Preset(p) => assert_eq!(
                p.pack.preset_signature_provider,
                Some(SignatureProvider::RsaPem)
            ),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_shell_rejected() {
        assert!(Args::try_parse_from(["supe", "starter", "x1", "--shell", "fish"]).is_err());
    }

    #[test]
    fn test_wants_json() {
        let args = Args::try_parse_from(["supe", "doctor", "--json"]).unwrap();
        assert!(wants_json(&args));
        let args = Args::try_parse_from(["supe", "catalog"]).unwrap();
        assert!(!wants_json(&args));
    }

    #[tokio::test]
    async fn test_policy_check_exit_codes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, r#"{"blockedFrameworks": ["angular"]}"#).unwrap();
        let file = path.to_string_lossy().to_string();

        let pass = Args::try_parse_from(["supe", "policy-check", "--file", &file, "--json"]).unwrap();
        assert_eq!(run(pass, &SupeConfig).await.unwrap(), ExitCode::SUCCESS);

        let fail = Args::try_parse_from([
            "supe", "policy-check", "--file", &file, "--framework", "angular", "--json",
        ])
        .unwrap();
        assert_eq!(
            run(fail, &SupeConfig).await.unwrap(),
            ExitCode::from(EXIT_POLICY_FAILED)
        );
    }
}
