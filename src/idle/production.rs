//! Production engine: derives every resource's per-second rate from the
//! current state. Rates are recomputed from scratch, never patched.

use super::catalog::{COMPUTE, DATA, RESEARCH};
use super::state::{GameState, PrestigeEffect, ResearchEffect};

/// Product of every global bonus: completed research, prestige and
/// achievement channels.
pub fn global_multiplier(state: &GameState) -> f64 {
    let research: f64 = state
        .research
        .iter()
        .filter(|r| r.researched)
        .filter_map(|r| match r.effect {
            ResearchEffect::GlobalMultiplier { factor } => Some(factor),
            ResearchEffect::UnlockModels { .. } => None,
        })
        .product();

    let prestige: f64 = state
        .prestige
        .upgrades
        .iter()
        .filter(|u| u.level > 0)
        .filter_map(|u| match u.effect {
            PrestigeEffect::GlobalProduction { .. } => Some(u.effect.factor(u.level)),
            PrestigeEffect::TrainingSpeed { .. } => None,
        })
        .product();

    let bonuses = &state.achievement_bonuses;
    research * prestige * bonuses.global_multiplier * bonuses.all_production * bonuses.all_resources
}

/// Overwrite every resource's `per_second`.
///
/// Order: buildings, per-resource achievement channels, global multiplier,
/// then the active training run (scaled by model performance and the
/// global multiplier). Unknown resource ids are skipped.
pub fn recalculate_production(state: &mut GameState) {
    for r in &mut state.resources {
        r.per_second = 0.0;
    }

    for b in state.buildings.iter().filter(|b| b.count > 0) {
        for (id, rate) in &b.production {
            if let Some(r) = state.resources.iter_mut().find(|r| r.id == *id) {
                r.per_second += rate * b.count as f64;
            }
        }
    }

    let bonuses = &state.achievement_bonuses;
    let channels = [
        (DATA, bonuses.data_generation),
        (COMPUTE, bonuses.compute_power),
        (RESEARCH, bonuses.research_points),
    ];
    for (id, factor) in channels {
        if let Some(r) = state.resources.iter_mut().find(|r| r.id == id) {
            r.per_second *= factor;
        }
    }

    let global = global_multiplier(state);
    for r in &mut state.resources {
        r.per_second *= global;
    }
    state.global_multiplier = global;

    if let Some(id) = state.current_training.clone() {
        let scale = state.achievement_bonuses.model_performance * global;
        if let Some(model) = state.models.iter().find(|m| m.id == id) {
            for (rid, rate) in &model.production {
                if let Some(r) = state.resources.iter_mut().find(|r| r.id == *rid) {
                    r.per_second += rate * scale;
                }
            }
        }
    }
}
