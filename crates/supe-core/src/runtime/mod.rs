//! Environment detection and plan execution
//!
//! This module provides:
//! - Package manager and shell detection for `doctor`
//! - The allow-listed executor that runs command plans

pub mod check;
pub mod executor;

pub use check::{check_package_managers, detect_environment, EnvironmentReport, ToolInfo};
pub use executor::{
    prepare_plan, ExecutionReport, PlanStep, SafeExecutor, ALLOWED_EXECUTABLES, COMMAND_TIMEOUT,
};
