//! End-to-end planning: configuration in, plan, scripts and reports out

use pretty_assertions::assert_eq;
use supe_core::plan::{render_script, ScaffoldConfig, Shell};
use supe_core::registry::{list_presets, query_presets, PresetQuery};
use supe_core::runtime::SafeExecutor;
use supe_core::scaffold::{plan_from_preset, scaffold_starter_app, ScaffoldOptions};
use supe_core::{rank_presets, Error};

fn demo_config() -> ScaffoldConfig {
    ScaffoldConfig::new("demo-app", "react", vec!["tailwind".into()], "npm").with_theme("calm_pro")
}

#[tokio::test]
async fn test_demo_app_preview() {
    let result = scaffold_starter_app(demo_config(), &ScaffoldOptions::default())
        .await
        .unwrap();

    assert_eq!(
        result.commands,
        vec![
            "npx create-vite demo-app --template react-ts",
            "cd demo-app",
            "npm install",
            "npm add -D tailwindcss postcss autoprefixer",
            "# Theme preset: calm_pro",
            "# Palette: #0F172A, #334155, #22C55E, #F8FAFC",
        ]
    );
    assert!(!result.executed);
    assert_eq!(result.security.score, 92);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["projectName"], "demo-app");
    assert_eq!(json["packageManager"], "npm");
    assert_eq!(json["executed"], false);
    assert!(json["scripts"]["powershell"]
        .as_str()
        .unwrap()
        .contains("Set-Location 'demo-app'"));
}

#[test]
fn test_every_executable_line_reaches_every_script() {
    let result = supe_core::plan_starter_app(demo_config(), &ScaffoldOptions::default()).unwrap();
    for shell in Shell::ALL {
        let script = &result.scripts[shell.as_str()];
        let lines: Vec<&str> = script.lines().map(|l| l.trim_end_matches('\r')).collect();
        let last_command = lines
            .iter()
            .rposition(|l| l.contains("tailwindcss"))
            .unwrap();
        let first_comment = lines
            .iter()
            .position(|l| l.contains("Theme preset"))
            .unwrap();
        assert!(last_command < first_comment, "{}", shell);
        for line in ["npx create-vite demo-app", "npm install"] {
            assert!(script.contains(line), "{} missing {}", shell, line);
        }
    }
}

#[test]
fn test_cmd_quotes_directory_with_space() {
    let script = render_script(&["cd my app"], Shell::Cmd);
    assert!(script.contains("cd /d \"my app\""));
}

#[tokio::test]
async fn test_blocked_plan_runs_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let executor = SafeExecutor::new().with_working_dir(dir.path());
    let err = executor
        .execute(&["npm --version", "rm -rf demo-app"])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BlockedExecutable { ref executable, .. } if executable == "rm"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_incompatible_and_invalid_inputs() {
    let options = ScaffoldOptions::default();
    let cases = [
        (
            ScaffoldConfig::new("demo-app", "deno_fresh", vec![], "npm"),
            "ConfigurationError",
        ),
        (
            ScaffoldConfig::new("demo-app", "react", vec!["tailwind".into()], "deno"),
            "ConfigurationError",
        ),
        (
            ScaffoldConfig::new("a/b", "react", vec![], "npm"),
            "InvalidNameError",
        ),
        (
            ScaffoldConfig::new("nul", "react", vec![], "npm"),
            "InvalidNameError",
        ),
    ];
    for (config, kind) in cases {
        let err = supe_core::plan_starter_app(config.clone(), &options).unwrap_err();
        assert_eq!(err.kind(), kind, "{:?}", config);
    }
}

#[test]
fn test_ranked_registry_listing() {
    let presets = query_presets(&PresetQuery::default(), &[]);
    assert_eq!(presets.len(), list_presets(&[]).len());
    let ranked = rank_presets(presets, false);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    let json = serde_json::to_value(&ranked[0]).unwrap();
    assert!(json["score"].is_number());
    assert!(json["id"].is_string());
}

#[test]
fn test_every_builtin_preset_plans() {
    for id in list_presets(&[]).keys() {
        let result = plan_from_preset("preset-app", id, &[], &ScaffoldOptions::default()).unwrap();
        assert_eq!(result.preset.as_ref().unwrap().id, *id);
        assert!(result.commands[1] == "cd preset-app");
    }
}
