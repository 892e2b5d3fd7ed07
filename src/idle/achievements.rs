//! Achievement evaluator.
//!
//! Bonus channels are always refolded from every unlocked achievement, so
//! the result does not depend on unlock order or on how many times the
//! scan ran (save/reload included).

use super::production::recalculate_production;
use super::state::{AchievementBonuses, AchievementCondition, AchievementUnlock, GameState};

/// Whether `condition` currently holds.
pub fn is_met(condition: &AchievementCondition, state: &GameState) -> bool {
    let stats = &state.stats;
    match condition {
        AchievementCondition::TotalDataGenerated(n) => stats.total_data_generated >= *n,
        AchievementCondition::MaxAccuracy(n) => stats.max_accuracy >= *n,
        AchievementCondition::ResourceAmount { resource, amount } => {
            state.resource(resource).is_some_and(|r| r.amount >= *amount)
        }
        AchievementCondition::TotalBuildings(n) => stats.total_buildings >= *n,
        AchievementCondition::BuildingCount { building, count } => {
            state.building(building).is_some_and(|b| b.count >= *count)
        }
        AchievementCondition::ModelsTrained(n) => stats.models_trained >= *n,
        AchievementCondition::UniqueModelsTrained(n) => stats.unique_models_trained >= *n,
        AchievementCondition::ResearchCompleted(n) => stats.completed_research.len() >= *n,
        AchievementCondition::PlaytimeMs(ms) => stats.total_playtime_ms >= *ms,
    }
}

/// Refold `achievement_bonuses` from scratch over all unlocked achievements.
pub fn recompute_bonuses(state: &mut GameState) {
    let mut bonuses = AchievementBonuses::default();
    for a in state.achievements.iter().filter(|a| a.unlocked) {
        for effect in &a.effects {
            bonuses.apply(effect);
        }
    }
    state.achievement_bonuses = bonuses;
}

/// Unlock every achievement whose condition now holds. Returns the newly
/// unlocked descriptors and appends them to the pending queue.
pub fn check_and_unlock(state: &mut GameState) -> Vec<AchievementUnlock> {
    let view: &GameState = state;
    let ready: Vec<usize> = view
        .achievements
        .iter()
        .enumerate()
        .filter(|(_, a)| !a.unlocked && is_met(&a.condition, view))
        .map(|(i, _)| i)
        .collect();
    if ready.is_empty() {
        return Vec::new();
    }

    let mut unlocked = Vec::with_capacity(ready.len());
    for i in ready {
        let a = &mut state.achievements[i];
        a.unlocked = true;
        unlocked.push(AchievementUnlock {
            id: a.id.clone(),
            name: a.name.clone(),
            reward: a.reward.clone(),
        });
    }
    for u in &unlocked {
        state.add_log(&format!("🏆 Achievement: {} ({})", u.name, u.reward), true);
    }

    recompute_bonuses(state);
    recalculate_production(state);
    state.pending_achievements.extend(unlocked.iter().cloned());
    unlocked
}

/// Drain achievements unlocked since the last poll.
pub fn pop_newly_unlocked_achievements(state: &mut GameState) -> Vec<AchievementUnlock> {
    std::mem::take(&mut state.pending_achievements)
}
