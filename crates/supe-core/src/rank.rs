//! Deterministic preset scoring and ranking
//!
//! Scores live on a 0-100 scale:
//!
//! | component            | points                               |
//! |----------------------|--------------------------------------|
//! | maturity             | stable 40, advanced 30, emerging 20, experimental 10 |
//! | category             | up to 10 (see [`category_weight`])   |
//! | CI templates         | 5 each, capped at 10                 |
//! | UI libraries         | 4 each, capped at 10                 |
//! | telemetry (opt-in)   | 0.15 x maintenance + 0.15 x adoption |
//!
//! Stored maintenance/adoption scores are 0-100; a missing score counts as 0.

use crate::registry::presets::{Maturity, StarterPreset};
use serde::Serialize;

const CI_POINTS: f64 = 5.0;
const CI_CAP: f64 = 10.0;
const UI_POINTS: f64 = 4.0;
const UI_CAP: f64 = 10.0;
const TELEMETRY_WEIGHT: f64 = 0.15;

pub fn maturity_weight(maturity: Maturity) -> f64 {
    match maturity {
        Maturity::Stable => 40.0,
        Maturity::Advanced => 30.0,
        Maturity::Emerging => 20.0,
        Maturity::Experimental => 10.0,
    }
}

pub fn category_weight(category: &str) -> f64 {
    match category {
        "fullstack" => 10.0,
        "frontend" => 8.0,
        "edge" => 7.0,
        "backend" | "content" => 6.0,
        "desktop" => 4.0,
        _ => 0.0,
    }
}

/// Score a preset; telemetry signals only count when `telemetry` is set
pub fn score_preset(preset: &StarterPreset, telemetry: bool) -> f64 {
    let mut score = maturity_weight(preset.maturity) + category_weight(&preset.category);
    score += (preset.ci_templates.len() as f64 * CI_POINTS).min(CI_CAP);
    score += (preset.ui.len() as f64 * UI_POINTS).min(UI_CAP);

    if telemetry {
        let maintenance = preset.maintenance_score.unwrap_or(0.0).clamp(0.0, 100.0);
        let adoption = preset.adoption_score.unwrap_or(0.0).clamp(0.0, 100.0);
        score += TELEMETRY_WEIGHT * maintenance + TELEMETRY_WEIGHT * adoption;
    }

    // Two decimals keeps JSON output stable across platforms
    (score * 100.0).round() / 100.0
}

/// A preset together with its computed score
#[derive(Debug, Clone, Serialize)]
pub struct RankedPreset {
    #[serde(flatten)]
    pub preset: StarterPreset,
    pub score: f64,
}

/// Sort by descending score, ties broken by ascending id
pub fn rank_presets(presets: Vec<StarterPreset>, telemetry: bool) -> Vec<RankedPreset> {
    let mut ranked: Vec<RankedPreset> = presets
        .into_iter()
        .map(|preset| RankedPreset {
            score: score_preset(&preset, telemetry),
            preset,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.preset.id.cmp(&b.preset.id))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::presets::builtin_presets;

    fn preset(id: &str, maturity: Maturity) -> StarterPreset {
        let mut p = builtin_presets()["dashboard"].clone();
        p.id = id.to_string();
        p.maturity = maturity;
        p
    }

    #[test]
    fn test_monotonic_in_maturity() {
        let tiers = [
            Maturity::Stable,
            Maturity::Advanced,
            Maturity::Emerging,
            Maturity::Experimental,
        ];
        for telemetry in [false, true] {
            let scores: Vec<f64> = tiers
                .iter()
                .map(|m| score_preset(&preset("p", *m), telemetry))
                .collect();
            assert!(scores.windows(2).all(|w| w[0] > w[1]), "{:?}", scores);
        }
    }

    #[test]
    fn test_caps() {
        let mut p = preset("p", Maturity::Stable);
        p.category = "unknown".into();
        p.ci_templates = vec!["node_basic".into(); 6];
        p.ui = vec!["tailwind".into(); 9];
        assert_eq!(score_preset(&p, false), 40.0 + 10.0 + 10.0);
    }

    #[test]
    fn test_telemetry_only_when_requested() {
        let mut p = preset("p", Maturity::Stable);
        p.maintenance_score = Some(100.0);
        p.adoption_score = Some(100.0);
        let base = score_preset(&p, false);
        assert_eq!(score_preset(&p, true), base + 30.0);

        p.adoption_score = None;
        assert_eq!(score_preset(&p, true), base + 15.0);
    }

    #[test]
    fn test_score_stays_within_scale() {
        for p in builtin_presets().values() {
            let s = score_preset(p, true);
            assert!((0.0..=100.0).contains(&s), "{} scored {}", p.id, s);
        }
    }

    #[test]
    fn test_rank_ties_break_by_id() {
        let ranked = rank_presets(
            vec![
                preset("zeta", Maturity::Stable),
                preset("alpha", Maturity::Stable),
                preset("mid", Maturity::Experimental),
            ],
            false,
        );
        let ids: Vec<_> = ranked.iter().map(|r| r.preset.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta", "mid"]);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let presets: Vec<_> = builtin_presets().values().cloned().collect();
        let first: Vec<_> = rank_presets(presets.clone(), true)
            .into_iter()
            .map(|r| r.preset.id)
            .collect();
        let mut reversed = presets;
        reversed.reverse();
        let second: Vec<_> = rank_presets(reversed, true)
            .into_iter()
            .map(|r| r.preset.id)
            .collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "saas");
    }
}
