//! Starter presets: built-in catalog, entry validation and merge with external packs

use crate::error::{Error, Result};
use crate::rank;
use crate::registry::catalog::{self, Ecosystem};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// How battle-tested a preset is, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Maturity {
    Stable,
    Advanced,
    Emerging,
    Experimental,
}

impl fmt::Display for Maturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Maturity::Stable => "stable",
            Maturity::Advanced => "advanced",
            Maturity::Emerging => "emerging",
            Maturity::Experimental => "experimental",
        };
        f.write_str(s)
    }
}

/// Where an externally loaded preset came from and how it was checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetTrust {
    pub source: String,
    pub sha256: String,
    pub signature_provider: String,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarterPreset {
    pub id: String,
    pub category: String,
    pub maturity: Maturity,
    pub description: String,
    pub framework: String,
    pub package_manager: String,
    pub ui: Vec<String>,
    pub theme: String,
    pub ci_templates: Vec<String>,
    pub research_notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust: Option<PresetTrust>,
    /// 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_score: Option<f64>,
    /// 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adoption_score: Option<f64>,
}

impl StarterPreset {
    /// Ecosystem of the preset's framework, if the framework is known
    pub fn ecosystem(&self) -> Option<Ecosystem> {
        catalog::framework(&self.framework).map(|fw| fw.ecosystem)
    }
}

/// Active preset lookup for one invocation
pub type PresetMap = BTreeMap<String, StarterPreset>;

pub const REQUIRED_FIELDS: &[&str] = &[
    "category",
    "maturity",
    "description",
    "framework",
    "packageManager",
    "ui",
    "theme",
    "ciTemplates",
    "researchNotes",
];

#[allow(clippy::too_many_arguments)]
fn builtin(
    id: &str,
    category: &str,
    maturity: Maturity,
    description: &str,
    framework: &str,
    package_manager: &str,
    ui: &[&str],
    theme: &str,
    ci_templates: &[&str],
    research_notes: &str,
    scores: (f64, f64),
) -> StarterPreset {
    StarterPreset {
        id: id.to_string(),
        category: category.to_string(),
        maturity,
        description: description.to_string(),
        framework: framework.to_string(),
        package_manager: package_manager.to_string(),
        ui: ui.iter().map(|s| s.to_string()).collect(),
        theme: theme.to_string(),
        ci_templates: ci_templates.iter().map(|s| s.to_string()).collect(),
        research_notes: research_notes.to_string(),
        trust: None,
        maintenance_score: Some(scores.0),
        adoption_score: Some(scores.1),
    }
}

static BUILTIN_PRESETS: LazyLock<PresetMap> = LazyLock::new(|| {
    use Maturity::*;
    [
        builtin(
            "saas",
            "fullstack",
            Stable,
            "Subscription SaaS baseline with auth-ready layout and billing pages.",
            "next",
            "npm",
            &["tailwind", "shadcn"],
            "calm_pro",
            &["node_basic", "node_security"],
            "App Router plus server actions keeps billing and dashboard code in one tree.",
            (92.0, 90.0),
        ),
        builtin(
            "dashboard",
            "frontend",
            Stable,
            "Admin dashboard with data-dense components and chart-ready layout.",
            "react",
            "pnpm",
            &["tailwind", "mantine"],
            "calm_pro",
            &["node_basic"],
            "Mantine tables and hooks cover most admin surfaces without extra libraries.",
            (88.0, 84.0),
        ),
        builtin(
            "commerce",
            "fullstack",
            Advanced,
            "Storefront starter with product grid, cart and checkout routes.",
            "remix",
            "npm",
            &["tailwind", "radix"],
            "sunrise_flow",
            &["node_basic", "node_security"],
            "Remix loaders stream product data; Radix dialogs handle cart drawers accessibly.",
            (80.0, 72.0),
        ),
        builtin(
            "docs_portal",
            "content",
            Stable,
            "Documentation portal with content collections and search-ready pages.",
            "astro",
            "pnpm",
            &["tailwind"],
            "calm_pro",
            &["node_basic"],
            "Astro ships zero JS by default, which keeps docs pages fast on slow networks.",
            (90.0, 82.0),
        ),
        builtin(
            "design_system",
            "frontend",
            Advanced,
            "Component library workspace with accessible primitives and theming tokens.",
            "react",
            "npm",
            &["tailwind", "radix", "headlessui"],
            "neon_noir",
            &["node_basic"],
            "Unstyled primitives let the token layer own every visual decision.",
            (78.0, 70.0),
        ),
        builtin(
            "ai_playground",
            "fullstack",
            Emerging,
            "Prompt playground with streaming responses and model comparison panes.",
            "next",
            "pnpm",
            &["tailwind", "shadcn"],
            "neon_noir",
            &["node_basic"],
            "Route handlers stream tokens; keep provider keys server-side only.",
            (70.0, 64.0),
        ),
        builtin(
            "realtime_hub",
            "backend",
            Emerging,
            "Realtime API hub with websocket fan-out and presence tracking.",
            "hono",
            "bun",
            &["tailwind"],
            "neon_noir",
            &["node_basic", "node_security"],
            "Hono on Bun keeps websocket upgrade latency low for presence updates.",
            (66.0, 58.0),
        ),
        builtin(
            "deno_api_edge",
            "edge",
            Experimental,
            "Edge-deployed API and islands UI on Deno Fresh.",
            "deno_fresh",
            "deno",
            &["tailwind"],
            "sunrise_flow",
            &[],
            "Fresh islands hydrate only interactive parts; deploy targets Deno Deploy.",
            (60.0, 45.0),
        ),
    ]
    .into_iter()
    .map(|preset| (preset.id.clone(), preset))
    .collect()
});

/// Built-in presets keyed by id
pub fn builtin_presets() -> &'static PresetMap {
    &BUILTIN_PRESETS
}

/// Built-in presets overlaid by `external`; an external entry replaces a
/// built-in with the same id. Returns a fresh map, the built-ins are untouched.
pub fn list_presets(external: &[StarterPreset]) -> PresetMap {
    let mut merged = BUILTIN_PRESETS.clone();
    for preset in external {
        merged.insert(preset.id.clone(), preset.clone());
    }
    merged
}

/// Resolve a preset by id from the merged registry
pub fn find_preset(id: &str, external: &[StarterPreset]) -> Result<StarterPreset> {
    list_presets(external)
        .remove(id)
        .ok_or_else(|| Error::config(format!("Unknown preset: {}", id)))
}

fn check_score(id: &str, field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(score) if !(0.0..=100.0).contains(&score) => Err(Error::preset(
            id,
            format!("{} must be between 0 and 100, got {}", field, score),
        )),
        _ => Ok(()),
    }
}

/// Check every reference in a preset resolves and its scores are in range
pub fn validate_preset(preset: &StarterPreset) -> Result<()> {
    let id = preset.id.as_str();

    if preset.ui.is_empty() {
        return Err(Error::preset(id, "ui must list at least one library"));
    }
    if catalog::framework(&preset.framework).is_none() {
        return Err(Error::preset(
            id,
            format!("unknown framework '{}'", preset.framework),
        ));
    }
    if catalog::package_manager(&preset.package_manager).is_none() {
        return Err(Error::preset(
            id,
            format!("unknown package manager '{}'", preset.package_manager),
        ));
    }
    if catalog::theme(&preset.theme).is_none() {
        return Err(Error::preset(id, format!("unknown theme '{}'", preset.theme)));
    }
    if let Some(ui) = preset.ui.iter().find(|ui| catalog::ui_library(ui).is_none()) {
        return Err(Error::preset(id, format!("unknown UI library '{}'", ui)));
    }
    if let Some(ci) = preset
        .ci_templates
        .iter()
        .find(|ci| catalog::ci_template(ci).is_none())
    {
        return Err(Error::preset(id, format!("unknown CI template '{}'", ci)));
    }
    check_score(id, "maintenanceScore", preset.maintenance_score)?;
    check_score(id, "adoptionScore", preset.adoption_score)?;
    Ok(())
}

/// Parse and validate one raw preset entry from an external pack
pub fn parse_preset_entry(id: &str, mut entry: Map<String, Value>) -> Result<StarterPreset> {
    if id.trim().is_empty() {
        return Err(Error::preset(id, "preset id must not be empty"));
    }
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| entry.get(*field).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(Error::preset(
            id,
            format!("missing required field(s): {}", missing.join(", ")),
        ));
    }
    for field in ["maintenanceScore", "adoptionScore"] {
        if let Some(value) = entry.get(field) {
            if !value.is_null() && !value.is_number() {
                return Err(Error::preset(id, format!("{} must be a number", field)));
            }
        }
    }

    // Trust metadata is assigned by the loader, never taken from the pack
    entry.remove("trust");
    entry.insert("id".to_string(), Value::String(id.to_string()));

    let preset: StarterPreset = serde_json::from_value(Value::Object(entry))
        .map_err(|e| Error::preset(id, e.to_string()))?;
    validate_preset(&preset)?;
    Ok(preset)
}

/// Filters for querying the merged preset registry
#[derive(Debug, Clone, Default)]
pub struct PresetQuery {
    pub category: Option<String>,
    pub ecosystem: Option<Ecosystem>,
    /// Case-insensitive match on id, description and research notes
    pub search: Option<String>,
    /// Minimum rank score on the 0-100 scale
    pub min_score: Option<f64>,
    /// Include maintenance/adoption signals when computing scores
    pub telemetry: bool,
}

impl PresetQuery {
    fn matches(&self, preset: &StarterPreset) -> bool {
        if let Some(category) = &self.category {
            if !preset.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(ecosystem) = self.ecosystem {
            if preset.ecosystem() != Some(ecosystem) {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = [&preset.id, &preset.description, &preset.research_notes]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if let Some(min) = self.min_score {
            if rank::score_preset(preset, self.telemetry) < min {
                return false;
            }
        }
        true
    }
}

/// Presets matching `query`, ordered by id
pub fn query_presets(query: &PresetQuery, external: &[StarterPreset]) -> Vec<StarterPreset> {
    list_presets(external)
        .into_values()
        .filter(|preset| query.matches(preset))
        .collect()
}
