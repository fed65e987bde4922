//! Command plans and their per-dialect scripts
//!
//! This module provides:
//! - Plan generation from a validated configuration
//! - Script rendering for bash, PowerShell and cmd

pub mod planner;
pub mod render;

pub use planner::{generate_scaffold_plan, ScaffoldConfig, DEFAULT_THEME};
pub use render::{render_all_scripts, render_script, Shell};

/// True for annotation lines that are never executed
pub fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}
