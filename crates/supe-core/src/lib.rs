//! Supe Core - starter-project planning engine
//!
//! This library turns a framework / UI library / package manager choice into a
//! validated, deterministic command plan, renders that plan as bash, PowerShell
//! and cmd scripts, and can run it under an allow-list.
//!
//! # Architecture
//!
//! - **Registries** (`registry`) - static catalogs, built-in presets, external packs
//! - **Validation and planning** (`validate`, `plan`) - pure functions over the registries
//! - **Trust** (`trust`) - SHA-256 and signature checks for external preset packs
//! - **Ranking** (`rank`) - deterministic preset scores
//! - **Runtime** (`runtime`) - environment detection and the safe executor
//! - **Reports** (`security`, `scaffold`) - policy evaluation and full scaffold results
//!
//! # Example Usage
//!
//! ```ignore
//! use supe_core::{plan::ScaffoldConfig, scaffold};
//!
//! let config = ScaffoldConfig::new("demo-app", "react", vec!["tailwind".into()], "npm");
//! let result = scaffold::plan_starter_app(config, &Default::default())?;
//! println!("{}", result.scripts["bash"]);
//! ```

pub mod error;
pub mod plan;
pub mod product;
pub mod rank;
pub mod registry;
pub mod runtime;
pub mod scaffold;
pub mod security;
pub mod trust;
pub mod validate;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use plan::{generate_scaffold_plan, render_script, ScaffoldConfig, Shell};
pub use product::{PresetPackSettings, ProductConfig};
pub use rank::{rank_presets, score_preset, RankedPreset};
pub use registry::{load_external_presets, PresetQuery, StarterPreset};
pub use runtime::SafeExecutor;
pub use scaffold::{
    plan_from_preset, plan_starter_app, scaffold_from_preset, scaffold_starter_app,
    ScaffoldOptions, ScaffoldResult,
};
pub use security::{evaluate_policy, load_policy_file, security_policy_report, PolicyDocument};
pub use trust::{SignatureOptions, SignatureProvider};
