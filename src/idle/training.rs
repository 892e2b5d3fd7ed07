//! Training state machine: `Idle` -> `Training(model)` -> `Idle`.
//!
//! At most one model trains at a time. Requirements are thresholds checked
//! on start and are never consumed, so stopping needs no rollback.

use super::production::recalculate_production;
use super::state::{GameState, PrestigeEffect, TrainingSnapshot};

/// Progress seconds gained per elapsed second.
pub fn training_speed(state: &GameState) -> f64 {
    let prestige: f64 = state
        .prestige
        .upgrades
        .iter()
        .filter(|u| u.level > 0)
        .filter_map(|u| match u.effect {
            PrestigeEffect::TrainingSpeed { .. } => Some(u.effect.factor(u.level)),
            PrestigeEffect::GlobalProduction { .. } => None,
        })
        .product();
    state.achievement_bonuses.training_speed * prestige
}

/// Start training `model_id`. Returns false, changing nothing, when the
/// model is unknown, locked, or a requirement is unmet. Replaces any run
/// already in progress.
pub fn start_training(state: &mut GameState, model_id: &str, now_ms: f64) -> bool {
    let model = match state.model(model_id) {
        Some(m) => m,
        None => return false,
    };
    if !model.unlocked || !state.meets(&model.requirements) {
        return false;
    }
    let duration = model.training_time;
    let name = model.name.clone();

    state.current_training = Some(model_id.to_string());
    state.training_progress = 0.0;
    state.training_snapshot = Some(TrainingSnapshot {
        model_id: model_id.to_string(),
        elapsed_time: 0.0,
        duration,
        rate_per_second: training_speed(state),
        started_at: now_ms,
    });
    recalculate_production(state);
    state.add_log(&format!("Training {} ...", name), false);
    true
}

/// Stop any active training. Always succeeds.
pub fn stop_training(state: &mut GameState) {
    state.current_training = None;
    state.training_progress = 0.0;
    state.training_snapshot = None;
    recalculate_production(state);
}

/// Advance the active run by `delta_seconds`. Completes it (and returns
/// the model id) once progress reaches the model's training time.
pub fn advance_training(state: &mut GameState, delta_seconds: f64) -> Option<String> {
    let id = state.current_training.clone()?;
    let training_time = match state.model(&id) {
        Some(m) => m.training_time,
        None => {
            // Model vanished from the catalog: nothing left to train.
            stop_training(state);
            return None;
        }
    };

    let speed = training_speed(state);
    state.training_progress += delta_seconds.max(0.0) * speed;
    if let Some(snap) = &mut state.training_snapshot {
        snap.elapsed_time = state.training_progress;
        snap.rate_per_second = speed;
    }

    if state.training_progress >= training_time {
        complete_training(state, &id);
        return Some(id);
    }
    None
}

fn complete_training(state: &mut GameState, model_id: &str) {
    state.stats.models_trained += 1;
    if state.stats.trained_models.insert(model_id.to_string()) {
        state.stats.unique_models_trained += 1;
    }
    let name = state
        .model(model_id)
        .map_or_else(|| model_id.to_string(), |m| m.name.clone());
    state.add_log(&format!("✔ {} finished training!", name), true);
    stop_training(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idle::catalog::*;

    #[test]
    fn start_unknown_model_fails() {
        let mut state = GameState::new(0.0);
        assert!(!start_training(&mut state, "ghost", 0.0));
        assert!(!state.is_training());
    }

    #[test]
    fn start_locked_model_fails() {
        let mut state = GameState::new(0.0);
        state.resource_mut(DATA).unwrap().amount = 1e9;
        state.resource_mut(COMPUTE).unwrap().amount = 1e9;
        assert!(!start_training(&mut state, NEURAL_NETWORK, 0.0));
        assert!(!state.is_training());
    }

    #[test]
    fn start_with_unmet_requirement_fails() {
        let mut state = GameState::new(0.0);
        state.resource_mut(DATA).unwrap().amount = 5.0;
        assert!(!start_training(&mut state, PERCEPTRON, 0.0));
        assert!(state.training_snapshot.is_none());
    }

    #[test]
    fn start_does_not_consume_requirements() {
        let mut state = GameState::new(0.0);
        assert!(start_training(&mut state, PERCEPTRON, 1234.0));
        assert!((state.amount(DATA) - 10.0).abs() < f64::EPSILON);
        assert_eq!(state.current_training.as_deref(), Some(PERCEPTRON));
        let snap = state.training_snapshot.as_ref().unwrap();
        assert_eq!(snap.model_id, PERCEPTRON);
        assert!((snap.duration - 10.0).abs() < f64::EPSILON);
        assert!((snap.started_at - 1234.0).abs() < f64::EPSILON);
    }

    #[test]
    fn start_activates_training_production() {
        let mut state = GameState::new(0.0);
        start_training(&mut state, PERCEPTRON, 0.0);
        assert!((state.per_second(ACCURACY) - 0.5).abs() < 0.001);
        stop_training(&mut state);
        assert!((state.per_second(ACCURACY) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stop_when_idle_is_noop() {
        let mut state = GameState::new(0.0);
        stop_training(&mut state);
        assert!(!state.is_training());
        assert!((state.training_progress - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn advance_while_idle_does_nothing() {
        let mut state = GameState::new(0.0);
        assert_eq!(advance_training(&mut state, 100.0), None);
        assert_eq!(state.stats.models_trained, 0);
    }

    #[test]
    fn partial_progress_accumulates() {
        let mut state = GameState::new(0.0);
        start_training(&mut state, PERCEPTRON, 0.0);
        advance_training(&mut state, 4.0);
        advance_training(&mut state, 3.0);
        assert!((state.training_progress - 7.0).abs() < 0.001);
        assert!((state.training_fraction() - 0.7).abs() < 0.001);
        assert!((state.training_snapshot.as_ref().unwrap().elapsed_time - 7.0).abs() < 0.001);
    }

    #[test]
    fn completion_resets_without_carry_over() {
        let mut state = GameState::new(0.0);
        start_training(&mut state, PERCEPTRON, 0.0);
        assert_eq!(advance_training(&mut state, 25.0).as_deref(), Some(PERCEPTRON));
        assert!(!state.is_training());
        assert!((state.training_progress - 0.0).abs() < f64::EPSILON);
        assert!(state.training_snapshot.is_none());
        assert_eq!(state.stats.models_trained, 1);
        assert_eq!(state.stats.unique_models_trained, 1);
    }

    #[test]
    fn repeat_training_counts_unique_once() {
        let mut state = GameState::new(0.0);
        for _ in 0..3 {
            assert!(start_training(&mut state, PERCEPTRON, 0.0));
            advance_training(&mut state, 10.0);
        }
        assert_eq!(state.stats.models_trained, 3);
        assert_eq!(state.stats.unique_models_trained, 1);
        assert!(state.stats.trained_models.contains(PERCEPTRON));
    }

    #[test]
    fn training_speed_bonus_shortens_run() {
        let mut state = GameState::new(0.0);
        state.achievement_bonuses.training_speed = 2.0;
        start_training(&mut state, PERCEPTRON, 0.0);
        assert_eq!(advance_training(&mut state, 5.0).as_deref(), Some(PERCEPTRON));
    }

    #[test]
    fn prestige_training_speed_stacks() {
        let mut state = GameState::new(0.0);
        state.achievement_bonuses.training_speed = 1.1;
        state
            .prestige
            .upgrades
            .iter_mut()
            .find(|u| u.id == TRANSFER_LEARNING)
            .unwrap()
            .level = 1;
        assert!((training_speed(&state) - 1.1 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn starting_another_model_replaces_run() {
        let mut state = GameState::new(0.0);
        state.resource_mut(DATA).unwrap().amount = 1_000.0;
        state.resource_mut(COMPUTE).unwrap().amount = 100.0;
        state.models.iter_mut().for_each(|m| m.unlocked = true);
        start_training(&mut state, PERCEPTRON, 0.0);
        advance_training(&mut state, 5.0);
        assert!(start_training(&mut state, LINEAR_REGRESSION, 0.0));
        assert_eq!(state.current_training.as_deref(), Some(LINEAR_REGRESSION));
        assert!((state.training_progress - 0.0).abs() < f64::EPSILON);
    }
}
