//! Unlock evaluator. Re-checks every gate from scratch; unlocks are one-way.

use super::state::{requirement_met, GameState};

/// Re-evaluate building, model and research gates. Idempotent.
pub fn check_unlocks(state: &mut GameState) {
    enforce_invariants(state);
    check_building_unlocks(state);
    check_model_unlocks(state);
    check_research_unlocks(state);
}

/// An owned building is always unlocked.
pub fn enforce_invariants(state: &mut GameState) {
    for b in state.buildings.iter_mut().filter(|b| b.count > 0) {
        b.unlocked = true;
    }
}

fn check_building_unlocks(state: &mut GameState) {
    let mut newly = Vec::new();
    for b in state.buildings.iter_mut().filter(|b| !b.unlocked) {
        if let Some(req) = &b.unlock_requirement {
            if requirement_met(&state.resources, req) {
                b.unlocked = true;
                newly.push(b.name.clone());
            }
        }
    }
    for name in newly {
        state.add_log(&format!("🏗 New building available: {}", name), false);
    }
}

fn check_model_unlocks(state: &mut GameState) {
    let mut newly = Vec::new();
    for m in state.models.iter_mut().filter(|m| !m.unlocked) {
        if let Some(req) = &m.unlock_requirement {
            if requirement_met(&state.resources, req) {
                m.unlocked = true;
                newly.push(m.name.clone());
            }
        }
    }
    for name in newly {
        state.add_log(&format!("🧠 New model available: {}", name), false);
    }
}

fn check_research_unlocks(state: &mut GameState) {
    let ready: Vec<usize> = state
        .research
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.unlocked)
        .filter(|(_, r)| {
            r.unlock_requirement.as_deref().is_some_and(|pre| {
                state
                    .research
                    .iter()
                    .any(|other| other.id == pre && other.researched)
            })
        })
        .map(|(i, _)| i)
        .collect();
    for i in ready {
        state.research[i].unlocked = true;
        let name = state.research[i].name.clone();
        state.add_log(&format!("🔬 New research available: {}", name), false);
    }
}
