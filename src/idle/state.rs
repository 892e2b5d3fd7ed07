/// AI-Idle game state definitions.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::catalog::{self, Catalog};

/// Resource amounts keyed by resource id (costs, production rates, thresholds).
pub type Amounts = BTreeMap<String, f64>;

/// Build an `Amounts` map from `(id, value)` pairs.
pub fn amounts(pairs: &[(&str, f64)]) -> Amounts {
    pairs.iter().map(|(id, v)| (id.to_string(), *v)).collect()
}

/// True when every `(resource, threshold)` pair is met by current amounts.
/// Unknown resources never satisfy a threshold.
pub fn requirement_met(resources: &[Resource], requirement: &Amounts) -> bool {
    requirement.iter().all(|(id, threshold)| {
        resources
            .iter()
            .find(|r| r.id == *id)
            .is_some_and(|r| r.amount >= *threshold)
    })
}

/// A currency the player accumulates.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Display unit (e.g. "TFLOPS").
    pub unit: Option<String>,
    pub amount: f64,
    /// Derived each production recompute; never accumulated.
    pub per_second: f64,
    pub unlocked: bool,
}

impl Resource {
    pub fn new(id: &str, name: &str, icon: &str, amount: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            unit: None,
            amount,
            per_second: 0.0,
            unlocked: true,
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// A repeatedly purchasable production unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub tier: u32,
    pub count: u32,
    pub unlocked: bool,
    pub base_cost: Amounts,
    /// Cost multiplier per owned unit (e.g. 1.15).
    pub cost_growth: f64,
    /// Per unit, per second.
    pub production: Amounts,
    pub unlock_requirement: Option<Amounts>,
}

impl Building {
    /// Current cost to buy the next one.
    pub fn cost(&self) -> Amounts {
        let scale = self.cost_growth.powi(self.count as i32);
        self.base_cost
            .iter()
            .map(|(id, base)| (id.clone(), base * scale))
            .collect()
    }

    /// Per-second output of every owned unit, before any multiplier.
    pub fn base_output(&self) -> Amounts {
        self.production
            .iter()
            .map(|(id, rate)| (id.clone(), rate * self.count as f64))
            .collect()
    }
}

/// A trainable model. Produces resources only while it is the active training.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub unlocked: bool,
    /// Thresholds checked on start. Not consumed.
    pub requirements: Amounts,
    pub production: Amounts,
    /// Seconds of training needed to complete one run.
    pub training_time: f64,
    pub unlock_requirement: Option<Amounts>,
}

/// Permanent effect of a completed research item.
#[derive(Clone, Debug, PartialEq)]
pub enum ResearchEffect {
    GlobalMultiplier { factor: f64 },
    UnlockModels { models: Vec<String> },
}

impl ResearchEffect {
    pub fn description(&self) -> String {
        match self {
            ResearchEffect::GlobalMultiplier { factor } => {
                format!("All production x{}", factor)
            }
            ResearchEffect::UnlockModels { models } => {
                format!("Unlocks {}", models.join(", "))
            }
        }
    }
}

/// A one-time purchase with a permanent effect.
#[derive(Clone, Debug, PartialEq)]
pub struct Research {
    pub id: String,
    pub name: String,
    pub unlocked: bool,
    /// One-way.
    pub researched: bool,
    /// Consumed on purchase.
    pub cost: Amounts,
    pub effect: ResearchEffect,
    /// Research id that must be researched first.
    pub unlock_requirement: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AchievementCategory {
    Production,
    Infrastructure,
    Training,
    Research,
    Dedication,
}

impl AchievementCategory {
    pub fn name(&self) -> &str {
        match self {
            AchievementCategory::Production => "Production",
            AchievementCategory::Infrastructure => "Infrastructure",
            AchievementCategory::Training => "Training",
            AchievementCategory::Research => "Research",
            AchievementCategory::Dedication => "Dedication",
        }
    }
}

/// Predicate over the game state that unlocks an achievement.
#[derive(Clone, Debug, PartialEq)]
pub enum AchievementCondition {
    TotalDataGenerated(f64),
    MaxAccuracy(f64),
    ResourceAmount { resource: String, amount: f64 },
    TotalBuildings(u64),
    BuildingCount { building: String, count: u32 },
    ModelsTrained(u64),
    UniqueModelsTrained(u64),
    ResearchCompleted(usize),
    PlaytimeMs(f64),
}

/// Bonus channels that multiply. Neutral value is 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultChannel {
    DataGeneration,
    ComputePower,
    ResearchPoints,
    GlobalMultiplier,
    AllProduction,
    AllResources,
    ModelPerformance,
    TrainingSpeed,
}

/// Bonus channels that add. Neutral value is 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddChannel {
    ClickPower,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BonusEffect {
    Multiply { channel: MultChannel, factor: f64 },
    Add { channel: AddChannel, amount: f64 },
}

/// A one-way, condition-triggered unlock granting permanent bonuses.
#[derive(Clone, Debug, PartialEq)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub category: AchievementCategory,
    pub unlocked: bool,
    pub condition: AchievementCondition,
    /// Human-readable reward text.
    pub reward: String,
    pub effects: Vec<BonusEffect>,
}

/// Net value of every bonus channel, folded from all unlocked achievements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AchievementBonuses {
    pub data_generation: f64,
    pub compute_power: f64,
    pub research_points: f64,
    pub global_multiplier: f64,
    pub all_production: f64,
    pub all_resources: f64,
    pub model_performance: f64,
    pub training_speed: f64,
    pub click_power: f64,
}

impl Default for AchievementBonuses {
    fn default() -> Self {
        Self {
            data_generation: 1.0,
            compute_power: 1.0,
            research_points: 1.0,
            global_multiplier: 1.0,
            all_production: 1.0,
            all_resources: 1.0,
            model_performance: 1.0,
            training_speed: 1.0,
            click_power: 0.0,
        }
    }
}

impl AchievementBonuses {
    pub fn multiplier(&self, channel: MultChannel) -> f64 {
        match channel {
            MultChannel::DataGeneration => self.data_generation,
            MultChannel::ComputePower => self.compute_power,
            MultChannel::ResearchPoints => self.research_points,
            MultChannel::GlobalMultiplier => self.global_multiplier,
            MultChannel::AllProduction => self.all_production,
            MultChannel::AllResources => self.all_resources,
            MultChannel::ModelPerformance => self.model_performance,
            MultChannel::TrainingSpeed => self.training_speed,
        }
    }

    fn multiplier_mut(&mut self, channel: MultChannel) -> &mut f64 {
        match channel {
            MultChannel::DataGeneration => &mut self.data_generation,
            MultChannel::ComputePower => &mut self.compute_power,
            MultChannel::ResearchPoints => &mut self.research_points,
            MultChannel::GlobalMultiplier => &mut self.global_multiplier,
            MultChannel::AllProduction => &mut self.all_production,
            MultChannel::AllResources => &mut self.all_resources,
            MultChannel::ModelPerformance => &mut self.model_performance,
            MultChannel::TrainingSpeed => &mut self.training_speed,
        }
    }

    pub fn additive(&self, channel: AddChannel) -> f64 {
        match channel {
            AddChannel::ClickPower => self.click_power,
        }
    }

    /// Fold one effect into the running totals.
    pub fn apply(&mut self, effect: &BonusEffect) {
        match effect {
            BonusEffect::Multiply { channel, factor } => {
                *self.multiplier_mut(*channel) *= factor;
            }
            BonusEffect::Add { channel, amount } => match channel {
                AddChannel::ClickPower => self.click_power += amount,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PrestigeEffect {
    /// Contributes `1 + value * level` to the global multiplier.
    GlobalProduction { value: f64 },
    /// Contributes `1 + value * level` to training speed.
    TrainingSpeed { value: f64 },
}

impl PrestigeEffect {
    pub fn factor(&self, level: u32) -> f64 {
        match self {
            PrestigeEffect::GlobalProduction { value } | PrestigeEffect::TrainingSpeed { value } => {
                1.0 + value * level as f64
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrestigeUpgrade {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    /// Prestige points for level 1; level n costs `base_cost * n`.
    pub base_cost: f64,
    pub effect: PrestigeEffect,
}

impl PrestigeUpgrade {
    pub fn next_cost(&self) -> f64 {
        self.base_cost * (self.level + 1) as f64
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Prestige {
    pub points: f64,
    pub upgrades: Vec<PrestigeUpgrade>,
}

/// Presentation copy of the active training run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrainingSnapshot {
    pub model_id: String,
    /// Seconds of progress so far.
    pub elapsed_time: f64,
    /// Seconds needed to complete.
    pub duration: f64,
    /// Progress seconds gained per real second.
    pub rate_per_second: f64,
    /// Wall-clock ms when the run started.
    pub started_at: f64,
}

impl Default for TrainingSnapshot {
    fn default() -> Self {
        Self {
            model_id: String::new(),
            elapsed_time: 0.0,
            duration: 0.0,
            rate_per_second: 1.0,
            started_at: 0.0,
        }
    }
}

/// Monotonic counters.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    pub total_data_generated: f64,
    pub total_accuracy: f64,
    pub max_accuracy: f64,
    pub total_compute: f64,
    pub total_buildings: u64,
    pub models_trained: u64,
    pub unique_models_trained: u64,
    pub trained_models: BTreeSet<String>,
    pub completed_research: BTreeSet<String>,
    pub deployments: u64,
    /// Wall-clock ms when this save was first created.
    pub start_time: f64,
    pub total_playtime_ms: f64,
    /// Wall-clock ms of the last foreground tick.
    pub last_playtime_update: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub auto_save: bool,
    #[serde(rename = "autoSaveInterval")]
    pub auto_save_interval_ms: f64,
    pub offline_progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_save: true,
            auto_save_interval_ms: 30_000.0,
            offline_progress: true,
        }
    }
}

/// Descriptor of an achievement that just unlocked.
#[derive(Clone, Debug, PartialEq)]
pub struct AchievementUnlock {
    pub id: String,
    pub name: String,
    pub reward: String,
}

/// Log entry for the message feed.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

const MAX_LOG_ENTRIES: usize = 50;

/// Full state of an AI-Idle game.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Definitions this state was instantiated from; used to rebuild on load/reset.
    pub catalog: Rc<Catalog>,
    pub resources: Vec<Resource>,
    pub buildings: Vec<Building>,
    pub models: Vec<Model>,
    pub research: Vec<Research>,
    pub achievements: Vec<Achievement>,
    pub prestige: Prestige,
    /// Model currently training, if any.
    pub current_training: Option<String>,
    /// Seconds of progress on the current training run.
    pub training_progress: f64,
    pub training_snapshot: Option<TrainingSnapshot>,
    pub stats: Stats,
    pub achievement_bonuses: AchievementBonuses,
    pub settings: Settings,
    /// Last computed global multiplier (for display).
    pub global_multiplier: f64,
    /// Wall-clock ms of the last save, or of the loaded blob.
    pub last_save_time: f64,
    /// Message log (not persisted).
    pub log: Vec<LogEntry>,
    /// Achievements unlocked since the last poll (not persisted). Hosts drain
    /// it with `pop_newly_unlocked_achievements`; each achievement enters at
    /// most once, so it never exceeds the catalog size.
    pub pending_achievements: Vec<AchievementUnlock>,
}

impl GameState {
    /// New game from the built-in catalog.
    pub fn new(now_ms: f64) -> Self {
        Self::from_catalog(Rc::new(catalog::default_catalog()), now_ms)
    }

    pub fn from_catalog(catalog: Rc<Catalog>, now_ms: f64) -> Self {
        let stats = Stats {
            start_time: now_ms,
            last_playtime_update: now_ms,
            ..Stats::default()
        };
        let mut state = Self {
            resources: catalog.resources.clone(),
            buildings: catalog.buildings.clone(),
            models: catalog.models.clone(),
            research: catalog.research.clone(),
            achievements: catalog.achievements.clone(),
            prestige: Prestige {
                points: 0.0,
                upgrades: catalog.prestige_upgrades.clone(),
            },
            catalog,
            current_training: None,
            training_progress: 0.0,
            training_snapshot: None,
            stats,
            achievement_bonuses: AchievementBonuses::default(),
            settings: Settings::default(),
            global_multiplier: 1.0,
            last_save_time: now_ms,
            log: Vec::new(),
            pending_achievements: Vec::new(),
        };
        state.add_log("Welcome to AI-Idle! Collect data to begin.", true);
        state
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn resource_mut(&mut self, id: &str) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.id == id)
    }

    /// Current amount of a resource (0 when unknown).
    pub fn amount(&self, id: &str) -> f64 {
        self.resource(id).map_or(0.0, |r| r.amount)
    }

    /// Current rate of a resource (0 when unknown).
    pub fn per_second(&self, id: &str) -> f64 {
        self.resource(id).map_or(0.0, |r| r.per_second)
    }

    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn model(&self, id: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn research_item(&self, id: &str) -> Option<&Research> {
        self.research.iter().find(|r| r.id == id)
    }

    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn meets(&self, requirement: &Amounts) -> bool {
        requirement_met(&self.resources, requirement)
    }

    pub fn is_training(&self) -> bool {
        self.current_training.is_some()
    }

    /// Model currently in training.
    pub fn training_model(&self) -> Option<&Model> {
        self.current_training.as_deref().and_then(|id| self.model(id))
    }

    /// Fraction (0..=1) of the current training run completed.
    pub fn training_fraction(&self) -> f64 {
        match self.training_model() {
            Some(m) if m.training_time > 0.0 => (self.training_progress / m.training_time).min(1.0),
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > MAX_LOG_ENTRIES {
            self.log.remove(0);
        }
    }
}
