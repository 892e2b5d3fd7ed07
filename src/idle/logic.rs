//! AI-Idle game logic: plain functions over an explicitly passed state.
//!
//! Tick pipeline, in order: production recompute, resource accumulation,
//! training progress, unlock scan, achievement scan.

use super::achievements::check_and_unlock;
use super::catalog::{ACCURACY, COMPUTE, DATA};
use super::production::recalculate_production;
use super::state::{Amounts, GameState, ResearchEffect};
use super::training::advance_training;
use super::unlocks::check_unlocks;

/// Upper bound on a single reconciliation window (24 hours).
pub const MAX_OFFLINE_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Add `amount` of a resource, feeding the lifetime stats. Unknown ids are ignored.
pub fn add_resource(state: &mut GameState, id: &str, amount: f64) {
    let current = match state.resource_mut(id) {
        Some(r) => {
            r.amount += amount;
            r.amount
        }
        None => return,
    };
    if id == DATA {
        state.stats.total_data_generated += amount;
    } else if id == ACCURACY {
        state.stats.total_accuracy += amount;
        state.stats.max_accuracy = state.stats.max_accuracy.max(current);
    }
}

/// Manual "Collect Data" click.
pub fn collect_data(state: &mut GameState) {
    let amount = 1.0 + state.achievement_bonuses.click_power;
    add_resource(state, DATA, amount);
}

pub fn can_afford(state: &GameState, costs: &Amounts) -> bool {
    state.meets(costs)
}

/// Deduct every listed cost, or nothing at all.
pub fn spend_resources(state: &mut GameState, costs: &Amounts) -> bool {
    if !can_afford(state, costs) {
        return false;
    }
    for (id, amount) in costs {
        if let Some(r) = state.resource_mut(id) {
            r.amount -= amount;
        }
    }
    true
}

/// Current cost of the next unit of a building.
pub fn building_cost(state: &GameState, building_id: &str) -> Option<Amounts> {
    state.building(building_id).map(|b| b.cost())
}

/// Try to buy one building. Returns true if successful.
pub fn purchase_building(state: &mut GameState, building_id: &str) -> bool {
    let idx = match state.buildings.iter().position(|b| b.id == building_id) {
        Some(i) => i,
        None => return false,
    };
    if !state.buildings[idx].unlocked {
        return false;
    }
    let cost = state.buildings[idx].cost();
    if !spend_resources(state, &cost) {
        return false;
    }

    state.buildings[idx].count += 1;
    state.stats.total_buildings += 1;
    let msg = format!(
        "Bought {} (owned: {})",
        state.buildings[idx].name, state.buildings[idx].count
    );
    state.add_log(&msg, false);

    recalculate_production(state);
    check_unlocks(state);
    true
}

/// Try to complete a research item. Returns true if successful.
pub fn perform_research(state: &mut GameState, research_id: &str) -> bool {
    let idx = match state.research.iter().position(|r| r.id == research_id) {
        Some(i) => i,
        None => return false,
    };
    let item = &state.research[idx];
    if !item.unlocked || item.researched {
        return false;
    }
    let cost = item.cost.clone();
    if !spend_resources(state, &cost) {
        return false;
    }

    state.research[idx].researched = true;
    state.stats.completed_research.insert(research_id.to_string());

    let effect = state.research[idx].effect.clone();
    if let ResearchEffect::UnlockModels { models } = &effect {
        for id in models {
            if let Some(m) = state.models.iter_mut().find(|m| m.id == *id) {
                m.unlocked = true;
            }
        }
    }
    let msg = format!("🔬 Research complete: {} ({})", state.research[idx].name, effect.description());
    state.add_log(&msg, true);

    check_unlocks(state);
    recalculate_production(state);
    true
}

/// Spend prestige points on the next level of an upgrade.
pub fn purchase_prestige_upgrade(state: &mut GameState, upgrade_id: &str) -> bool {
    let idx = match state.prestige.upgrades.iter().position(|u| u.id == upgrade_id) {
        Some(i) => i,
        None => return false,
    };
    let upgrade = &state.prestige.upgrades[idx];
    if upgrade.level >= upgrade.max_level {
        return false;
    }
    let cost = upgrade.next_cost();
    if state.prestige.points < cost {
        return false;
    }

    state.prestige.points -= cost;
    state.prestige.upgrades[idx].level += 1;
    let msg = format!(
        "👼 {} Lv.{}",
        state.prestige.upgrades[idx].name, state.prestige.upgrades[idx].level
    );
    state.add_log(&msg, true);
    recalculate_production(state);
    true
}

/// Apply `elapsed_ms` (clamped to `[0, cap_ms]`) of production and training
/// at the current rates.
pub fn apply_elapsed(state: &mut GameState, elapsed_ms: f64, cap_ms: f64) {
    let actual_ms = elapsed_ms.max(0.0).min(cap_ms);
    if actual_ms <= 0.0 {
        return;
    }
    let seconds = actual_ms / 1000.0;
    state.stats.total_playtime_ms += actual_ms;

    let produced: Vec<(String, f64)> = state
        .resources
        .iter()
        .filter(|r| r.per_second > 0.0)
        .map(|r| (r.id.clone(), r.per_second * seconds))
        .collect();
    for (id, amount) in produced {
        add_resource(state, &id, amount);
    }

    advance_training(state, seconds);
}

fn reconcile(state: &mut GameState, elapsed_ms: f64) {
    recalculate_production(state);
    apply_elapsed(state, elapsed_ms, MAX_OFFLINE_MS);
    check_unlocks(state);
    check_and_unlock(state);
    state.stats.total_compute = state.amount(COMPUTE);
}

/// One foreground tick of `delta_seconds`.
pub fn update(state: &mut GameState, delta_seconds: f64) {
    reconcile(state, delta_seconds * 1000.0);
}

/// Catch up on time spent away (hidden tab or closed page), capped at 24h.
pub fn process_offline_progress(state: &mut GameState, elapsed_ms: f64) {
    reconcile(state, elapsed_ms);
}
