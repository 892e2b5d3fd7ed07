//! Session driver: owns one game, a wall clock and a storage slot.
//!
//! The host forwards three kinds of events: animation frames, visibility
//! changes and player actions. Everything else (fixed-rate ticking,
//! autosave, catching up after a hidden tab or a cold start) happens here.

use super::achievements;
use super::logic::{self, MAX_OFFLINE_MS};
use super::save::{self, SaveError};
use super::state::{AchievementUnlock, GameState};
use super::storage::{Storage, StorageError};
use super::training;
use crate::console;
use crate::format::{format_number, format_offline_time};
use crate::time::{Clock, GameTime, TICKS_PER_SECOND};

/// localStorage key of the save blob.
pub const STORAGE_KEY: &str = "ai-idle-save";

/// Gaps at or below this are reconciled silently.
pub const OFFLINE_REPORT_THRESHOLD_MS: f64 = 5_000.0;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What happened while the player was away.
#[derive(Clone, Debug, PartialEq)]
pub struct OfflineReport {
    /// Milliseconds actually simulated (after the 24h cap).
    pub elapsed_ms: f64,
    /// Positive gains per resource id, in catalog order.
    pub gains: Vec<(String, f64)>,
}

impl OfflineReport {
    pub fn gained(&self, resource_id: &str) -> f64 {
        self.gains
            .iter()
            .find(|(id, _)| id == resource_id)
            .map_or(0.0, |(_, v)| *v)
    }

    /// One-line "welcome back" message.
    pub fn summary(&self, state: &GameState) -> String {
        let away = format_offline_time(self.elapsed_ms);
        if self.gains.is_empty() {
            return format!(
                "Welcome back! You were away for {}. No production yet. Build infrastructure to gain offline progress!",
                away
            );
        }
        let parts: Vec<String> = self
            .gains
            .iter()
            .map(|(id, v)| match state.resource(id) {
                Some(r) => format!("{} {} {}", r.icon, format_number(*v, 1), r.name),
                None => format!("{} {}", format_number(*v, 1), id),
            })
            .collect();
        format!("Welcome back! You were away for {}. Gained: {}", away, parts.join(", "))
    }
}

pub struct Session<S: Storage, C: Clock> {
    state: GameState,
    storage: S,
    clock: C,
    time: GameTime,
    last_autosave_ms: f64,
    /// Set between `on_hidden` and `on_visible`.
    hidden_since: Option<f64>,
}

impl<S: Storage, C: Clock> Session<S, C> {
    /// Load (or create) the game and catch up on the time since the last
    /// save.
    pub fn start(storage: S, clock: C) -> (Self, Option<OfflineReport>) {
        let now = clock.now_ms();
        let mut session = Self {
            state: GameState::new(now),
            storage,
            clock,
            time: GameTime::new(TICKS_PER_SECOND),
            last_autosave_ms: now,
            hidden_since: None,
        };

        let report = if session.load_from_storage() {
            if session.state.settings.offline_progress {
                let elapsed = now - session.state.last_save_time;
                session.reconcile(elapsed)
            } else {
                None
            }
        } else {
            console::log("AI-Idle: 新規ゲームを開始します。");
            logic::update(&mut session.state, 0.0);
            None
        };

        session.time.resync(now);
        session.state.stats.last_playtime_update = now;
        (session, report)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden_since.is_some()
    }

    // ── Frame loop ───────────────────────────────────────────

    /// Advance by whole 100ms ticks up to `now_ms` and autosave when due.
    /// Returns the number of ticks run. Frames arriving while hidden are
    /// ignored; that interval is reconciled by `on_visible`.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        if self.is_hidden() {
            return 0;
        }
        let ticks = self.time.update(now_ms);
        let dt = self.time.tick_seconds();
        for _ in 0..ticks {
            logic::update(&mut self.state, dt);
        }
        if ticks > 0 {
            self.state.stats.last_playtime_update = now_ms;
        }

        let settings = &self.state.settings;
        if settings.auto_save && now_ms - self.last_autosave_ms >= settings.auto_save_interval_ms {
            self.last_autosave_ms = now_ms;
            if let Err(e) = self.save_at(now_ms) {
                console::warn(&format!("AI-Idle: オートセーブに失敗: {e}"));
            }
        }
        ticks
    }

    /// `frame` at the clock's current time.
    pub fn tick(&mut self) -> u32 {
        let now = self.clock.now_ms();
        self.frame(now)
    }

    // ── Visibility ───────────────────────────────────────────

    pub fn on_hidden(&mut self, now_ms: f64) {
        if self.is_hidden() {
            return;
        }
        self.hidden_since = Some(now_ms);
        if let Err(e) = self.save_at(now_ms) {
            console::warn(&format!("AI-Idle: 非表示時のセーブに失敗: {e}"));
        }
    }

    /// Reconcile the hidden interval. Returns a report when it exceeded
    /// `OFFLINE_REPORT_THRESHOLD_MS`.
    pub fn on_visible(&mut self, now_ms: f64) -> Option<OfflineReport> {
        let since = self.hidden_since.take()?;
        let report = if self.state.settings.offline_progress {
            self.reconcile(now_ms - since)
        } else {
            None
        };
        self.time.resync(now_ms);
        self.state.stats.last_playtime_update = now_ms;
        report
    }

    fn reconcile(&mut self, elapsed_ms: f64) -> Option<OfflineReport> {
        if elapsed_ms <= 0.0 {
            return None;
        }
        let actual = elapsed_ms.min(MAX_OFFLINE_MS);
        let before: Vec<f64> = self.state.resources.iter().map(|r| r.amount).collect();
        logic::process_offline_progress(&mut self.state, actual);

        if actual <= OFFLINE_REPORT_THRESHOLD_MS {
            return None;
        }
        console::log(&format!(
            "AI-Idle: オフライン進行を適用 ({:.0}s)",
            actual / 1000.0
        ));
        let gains = self
            .state
            .resources
            .iter()
            .zip(before)
            .map(|(r, b)| (r.id.clone(), r.amount - b))
            .filter(|(_, gain)| *gain > 0.0)
            .collect();
        Some(OfflineReport {
            elapsed_ms: actual,
            gains,
        })
    }

    // ── Player actions ───────────────────────────────────────

    pub fn collect_data(&mut self) {
        logic::collect_data(&mut self.state);
    }

    pub fn purchase_building(&mut self, building_id: &str) -> bool {
        logic::purchase_building(&mut self.state, building_id)
    }

    pub fn perform_research(&mut self, research_id: &str) -> bool {
        logic::perform_research(&mut self.state, research_id)
    }

    pub fn purchase_prestige_upgrade(&mut self, upgrade_id: &str) -> bool {
        logic::purchase_prestige_upgrade(&mut self.state, upgrade_id)
    }

    pub fn start_training(&mut self, model_id: &str) -> bool {
        let now = self.clock.now_ms();
        training::start_training(&mut self.state, model_id, now)
    }

    pub fn stop_training(&mut self) {
        training::stop_training(&mut self.state);
    }

    pub fn pop_newly_unlocked_achievements(&mut self) -> Vec<AchievementUnlock> {
        achievements::pop_newly_unlocked_achievements(&mut self.state)
    }

    // ── Persistence ──────────────────────────────────────────

    fn save_at(&mut self, now_ms: f64) -> Result<(), SessionError> {
        let json = save::serialize(&self.state, now_ms)?;
        self.storage.set(STORAGE_KEY, &json)?;
        self.state.last_save_time = now_ms;
        Ok(())
    }

    /// Write the save blob now. On failure the previous blob (if any) and
    /// `last_save_time` are left as they were.
    pub fn save_to_storage(&mut self) -> Result<(), SessionError> {
        let now = self.clock.now_ms();
        self.save_at(now)?;
        self.last_autosave_ms = now;
        Ok(())
    }

    /// Replace the game with the stored save. False (game untouched) when
    /// there is no save or it cannot be read. No offline progress is applied.
    pub fn load_from_storage(&mut self) -> bool {
        match self.storage.get(STORAGE_KEY) {
            Ok(Some(json)) => save::load(&mut self.state, &json),
            Ok(None) => false,
            Err(e) => {
                console::warn(&format!("AI-Idle: localStorage の読み込みに失敗: {e}"));
                false
            }
        }
    }

    pub fn export(&mut self) -> Result<String, SaveError> {
        let now = self.clock.now_ms();
        save::export(&mut self.state, now)
    }

    /// Load an export string and persist it. False (game untouched) when
    /// the string is malformed.
    pub fn import(&mut self, text: &str) -> bool {
        if !save::import(&mut self.state, text) {
            return false;
        }
        if let Err(e) = self.save_to_storage() {
            console::warn(&format!("AI-Idle: インポート後のセーブに失敗: {e}"));
        }
        true
    }

    /// Start over: fresh game, stored save removed.
    pub fn reset(&mut self) {
        let now = self.clock.now_ms();
        self.state = GameState::from_catalog(self.state.catalog.clone(), now);
        logic::update(&mut self.state, 0.0);
        if let Err(e) = self.storage.remove(STORAGE_KEY) {
            console::warn(&format!("AI-Idle: セーブデータの削除に失敗: {e}"));
        }
        self.time.resync(now);
        self.last_autosave_ms = now;
        self.hidden_since = None;
    }
}
