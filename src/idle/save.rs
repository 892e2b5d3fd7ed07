//! AI-Idle セーブ/ロード機能。
//!
//! ## バージョニング方針
//!
//! - `SAVE_VERSION`: 現在のセーブ形式バージョン (文字列タグ)。
//! - 旧バージョンは `MIGRATIONS` の各ステップを順番に適用して現在形式へ変換する。
//!   ステップは `serde_json::Value` 上で動くので、構造体定義を旧形式に合わせて残す必要はない。
//! - 未知のバージョン (未来のセーブを含む) は現在形式とみなして読み込み、警告だけ出す。
//!
//! 変換後のデータは全フィールド `#[serde(default)]` で読むため、
//! 不足フィールドはカタログの初期値がそのまま残る。

use std::collections::BTreeMap;

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::achievements::recompute_bonuses;
use super::production::recalculate_production;
use super::state::{AchievementBonuses, GameState, Settings, Stats, TrainingSnapshot};
use super::unlocks::enforce_invariants;
use crate::console;

/// セーブデータのフォーマットバージョン。
/// 形式を変えたら新しいタグにして `MIGRATIONS` にステップを足すこと。
pub const SAVE_VERSION: &str = "0.3";

/// `version` フィールドの無いセーブは最初期の形式とみなす。
const LEGACY_VERSION: &str = "0.1";

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("malformed save JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save root is not a JSON object")]
    NotAnObject,
    #[error("export string is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("export string is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// ── セーブ形式 ────────────────────────────────────────────────

/// シリアライズ用のセーブデータ構造体。
/// メッセージログや未通知の実績キューなど一時的な状態は含まない。
#[derive(Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct SaveData {
    version: String,
    /// 保存時刻 (ms)。ロード後の `last_save_time` になる。
    /// 無いセーブはロード時刻を起点にする (オフライン経過ゼロ)。
    timestamp: Option<f64>,
    resources: BTreeMap<String, ResourceSave>,
    buildings: BTreeMap<String, BuildingSave>,
    models: BTreeMap<String, ModelSave>,
    research: BTreeMap<String, ResearchSave>,
    achievements: BTreeMap<String, AchievementSave>,
    /// 表示用。ロード時は解除済み実績から再計算する。
    achievement_bonuses: AchievementBonuses,
    prestige: PrestigeSave,
    current_training_id: Option<String>,
    training_progress_seconds: f64,
    training_snapshot: Option<TrainingSnapshot>,
    stats: Stats,
    settings: Settings,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct ResourceSave {
    amount: f64,
    unlocked: bool,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct BuildingSave {
    count: u32,
    unlocked: bool,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct ModelSave {
    unlocked: bool,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct ResearchSave {
    unlocked: bool,
    researched: bool,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct AchievementSave {
    unlocked: bool,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct PrestigeSave {
    points: f64,
    upgrades: BTreeMap<String, PrestigeUpgradeSave>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct PrestigeUpgradeSave {
    level: u32,
}

/// GameState からセーブ用データを抽出する。
fn extract_save(state: &GameState, now_ms: f64) -> SaveData {
    SaveData {
        version: SAVE_VERSION.to_string(),
        timestamp: Some(now_ms),
        resources: state
            .resources
            .iter()
            .map(|r| {
                let rec = ResourceSave {
                    amount: r.amount,
                    unlocked: r.unlocked,
                };
                (r.id.clone(), rec)
            })
            .collect(),
        buildings: state
            .buildings
            .iter()
            .map(|b| {
                let rec = BuildingSave {
                    count: b.count,
                    unlocked: b.unlocked,
                };
                (b.id.clone(), rec)
            })
            .collect(),
        models: state
            .models
            .iter()
            .map(|m| (m.id.clone(), ModelSave { unlocked: m.unlocked }))
            .collect(),
        research: state
            .research
            .iter()
            .map(|r| {
                let rec = ResearchSave {
                    unlocked: r.unlocked,
                    researched: r.researched,
                };
                (r.id.clone(), rec)
            })
            .collect(),
        achievements: state
            .achievements
            .iter()
            .map(|a| (a.id.clone(), AchievementSave { unlocked: a.unlocked }))
            .collect(),
        achievement_bonuses: state.achievement_bonuses.clone(),
        prestige: PrestigeSave {
            points: state.prestige.points,
            upgrades: state
                .prestige
                .upgrades
                .iter()
                .map(|u| (u.id.clone(), PrestigeUpgradeSave { level: u.level }))
                .collect(),
        },
        current_training_id: state.current_training.clone(),
        training_progress_seconds: state.training_progress,
        training_snapshot: state.training_snapshot.clone(),
        stats: state.stats.clone(),
        settings: state.settings.clone(),
    }
}

/// セーブデータを新規状態に重ねる。
/// カタログに無い id は無視し、セーブに無い id はカタログの初期値のまま。
fn apply_save(state: &mut GameState, save: SaveData) {
    for (id, rec) in &save.resources {
        if let Some(r) = state.resource_mut(id) {
            r.amount = rec.amount.max(0.0);
            r.unlocked |= rec.unlocked;
        }
    }
    for (id, rec) in &save.buildings {
        if let Some(b) = state.buildings.iter_mut().find(|b| b.id == *id) {
            b.count = rec.count;
            b.unlocked |= rec.unlocked;
        }
    }
    for (id, rec) in &save.models {
        if let Some(m) = state.models.iter_mut().find(|m| m.id == *id) {
            m.unlocked |= rec.unlocked;
        }
    }
    for (id, rec) in &save.research {
        if let Some(r) = state.research.iter_mut().find(|r| r.id == *id) {
            r.unlocked |= rec.unlocked;
            r.researched = rec.researched;
        }
    }
    for (id, rec) in &save.achievements {
        if let Some(a) = state.achievements.iter_mut().find(|a| a.id == *id) {
            a.unlocked = rec.unlocked;
        }
    }

    state.prestige.points = save.prestige.points;
    for (id, rec) in &save.prestige.upgrades {
        if let Some(u) = state.prestige.upgrades.iter_mut().find(|u| u.id == *id) {
            u.level = rec.level.min(u.max_level);
        }
    }

    // カタログから消えたモデルの学習は破棄する
    match save.current_training_id {
        Some(id) if state.model(&id).is_some() => {
            state.current_training = Some(id);
            state.training_progress = save.training_progress_seconds.max(0.0);
            state.training_snapshot = save.training_snapshot;
        }
        _ => {
            state.current_training = None;
            state.training_progress = 0.0;
            state.training_snapshot = None;
        }
    }

    state.stats = save.stats;
    state.settings = save.settings;

    enforce_invariants(state);
    recompute_bonuses(state);
    recalculate_production(state);
}

// ── マイグレーション ────────────────────────────────────────────

/// 1 バージョン分の変換。`Value` はルートがオブジェクトであることを保証済み。
type MigrationFn = fn(&mut Map<String, Value>);

/// (from, to, 変換) の連鎖。from の昇順に並べる。
const MIGRATIONS: &[(&str, &str, MigrationFn)] = &[
    ("0.1", "0.2", migrate_0_1_to_0_2),
    ("0.2", "0.3", migrate_0_2_to_0_3),
];

fn rename_key(obj: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(v) = obj.remove(from) {
        obj.entry(to).or_insert(v);
    }
}

/// 0.1: JS 時代のキー名をそのまま保存していた形式。
fn migrate_0_1_to_0_2(root: &mut Map<String, Value>) {
    rename_key(root, "currentTraining", "currentTrainingId");
    rename_key(root, "trainingProgress", "trainingProgressSeconds");
    if let Some(stats) = root.get_mut("stats").and_then(Value::as_object_mut) {
        rename_key(stats, "totalPlaytime", "totalPlaytimeMs");
    }
    if let Some(upgrades) = root
        .get_mut("prestige")
        .and_then(Value::as_object_mut)
        .and_then(|p| p.get_mut("upgrades"))
        .and_then(Value::as_object_mut)
    {
        rename_key(upgrades, "ensemblelearning", "ensembleLearning");
    }
}

/// 0.2: 実績ボーナスと最終プレイ時刻が無い。
fn migrate_0_2_to_0_3(root: &mut Map<String, Value>) {
    root.entry("achievementBonuses")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(timestamp) = root.get("timestamp").filter(|v| v.is_number()).cloned() else {
        return;
    };
    if let Some(stats) = root.get_mut("stats").and_then(Value::as_object_mut) {
        stats.entry("lastPlaytimeUpdate").or_insert(timestamp);
    }
}

/// 旧形式の JSON を現在形式まで変換する。
fn migrate(value: &mut Value) -> Result<(), SaveError> {
    let root = value.as_object_mut().ok_or(SaveError::NotAnObject)?;
    let mut version = match root.get("version") {
        None | Some(Value::Null) => LEGACY_VERSION.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if version == SAVE_VERSION {
        return Ok(());
    }

    if !MIGRATIONS.iter().any(|(from, _, _)| *from == version) {
        // 既知の旧形式でなければ現在形式として default 付きで読む
        console::warn(&format!(
            "AI-Idle: 未知のセーブバージョン {} を現在形式 ({}) として読み込みます。",
            version, SAVE_VERSION
        ));
        root.insert("version".into(), Value::from(SAVE_VERSION));
        return Ok(());
    }

    console::log(&format!(
        "AI-Idle: 旧バージョンのセーブデータをマイグレーション (saved={}, current={})。",
        version, SAVE_VERSION
    ));
    while let Some((_, to, step)) = MIGRATIONS.iter().find(|(from, _, _)| *from == version) {
        step(root);
        version = (*to).to_string();
        root.insert("version".into(), Value::String(version.clone()));
    }
    Ok(())
}

// ── 公開 API ────────────────────────────────────────────────

/// 現在の状態を JSON 文字列にする。状態は変更しない。
pub fn serialize(state: &GameState, now_ms: f64) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&extract_save(state, now_ms))?)
}

/// 保存用 JSON を作り、`last_save_time` を更新する。
pub fn save(state: &mut GameState, now_ms: f64) -> Result<String, SaveError> {
    let json = serialize(state, now_ms)?;
    state.last_save_time = now_ms;
    Ok(json)
}

/// JSON から状態を復元する。失敗したときは `state` に一切触れない。
///
/// オフライン進行は適用しない (呼び出し側が `last_save_time` を見て行う)。
/// `timestamp` の無いセーブは `state.last_save_time` (ロード時点の値) を引き継ぐので、
/// 経過時間はゼロになる。
pub fn deserialize(state: &mut GameState, json: &str) -> Result<(), SaveError> {
    let mut value: Value = serde_json::from_str(json)?;
    migrate(&mut value)?;
    let save: SaveData = serde_json::from_value(value)?;

    let saved_at = save.timestamp.unwrap_or(state.last_save_time);
    let mut fresh = GameState::from_catalog(state.catalog.clone(), saved_at);
    apply_save(&mut fresh, save);
    fresh.log = std::mem::take(&mut state.log);
    fresh.add_log("Save loaded.", false);
    *state = fresh;
    Ok(())
}

/// `deserialize` の bool 版。失敗はコンソールに出して false を返す。
pub fn load(state: &mut GameState, json: &str) -> bool {
    match deserialize(state, json) {
        Ok(()) => true,
        Err(e) => {
            console::warn(&format!("AI-Idle: セーブデータの読み込みに失敗: {e}"));
            false
        }
    }
}

/// エクスポート文字列 (UTF-8 JSON の base64) を作る。`save` と同じく保存時刻を更新する。
pub fn export(state: &mut GameState, now_ms: f64) -> Result<String, SaveError> {
    let json = save(state, now_ms)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json.as_bytes()))
}

/// エクスポート文字列を JSON に戻す。
pub fn decode_export(text: &str) -> Result<String, SaveError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(text.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// エクスポート文字列から状態を復元する。失敗時は状態を変えずに false。
pub fn import(state: &mut GameState, text: &str) -> bool {
    match decode_export(text).and_then(|json| deserialize(state, &json)) {
        Ok(()) => true,
        Err(e) => {
            console::warn(&format!("AI-Idle: インポートに失敗: {e}"));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idle::catalog::*;
    use crate::idle::logic::{
        perform_research, purchase_building, purchase_prestige_upgrade, update,
    };
    use crate::idle::training::start_training;

    /// 研究・建物・学習・実績・転生すべてに手が入った状態。
    fn played_state() -> GameState {
        let mut state = GameState::new(1_000.0);
        for r in &mut state.resources {
            r.amount = 50_000.0;
        }
        state.resource_mut(COMPUTE).unwrap().amount = 5_000.0;
        update(&mut state, 1.0);
        assert!(purchase_building(&mut state, DATA_COLLECTOR));
        assert!(purchase_building(&mut state, DATA_COLLECTOR));
        assert!(purchase_building(&mut state, CPU_CORE));
        assert!(perform_research(&mut state, OPTIMIZED_PIPELINES));
        assert!(start_training(&mut state, PERCEPTRON, 1_000.0));
        update(&mut state, 3.3);
        state.prestige.points = 10.5;
        assert!(purchase_prestige_upgrade(&mut state, ENSEMBLE_LEARNING));
        assert!(purchase_prestige_upgrade(&mut state, ENSEMBLE_LEARNING));
        assert!((state.prestige.points - 7.5).abs() < f64::EPSILON);
        state.settings.auto_save_interval_ms = 60_000.0;
        state
    }

    fn assert_same_persistent_state(a: &GameState, b: &GameState) {
        for (x, y) in a.resources.iter().zip(&b.resources) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.amount, y.amount, "{}", x.id);
            assert_eq!(x.unlocked, y.unlocked);
            assert!((x.per_second - y.per_second).abs() < 1e-9, "{}", x.id);
        }
        for (x, y) in a.buildings.iter().zip(&b.buildings) {
            assert_eq!((x.count, x.unlocked), (y.count, y.unlocked), "{}", x.id);
        }
        for (x, y) in a.models.iter().zip(&b.models) {
            assert_eq!(x.unlocked, y.unlocked, "{}", x.id);
        }
        for (x, y) in a.research.iter().zip(&b.research) {
            assert_eq!((x.unlocked, x.researched), (y.unlocked, y.researched), "{}", x.id);
        }
        for (x, y) in a.achievements.iter().zip(&b.achievements) {
            assert_eq!(x.unlocked, y.unlocked, "{}", x.id);
        }
        assert_eq!(a.prestige, b.prestige);
        assert_eq!(a.current_training, b.current_training);
        assert_eq!(a.training_progress, b.training_progress);
        assert_eq!(a.training_snapshot, b.training_snapshot);
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.settings, b.settings);
        assert_eq!(a.achievement_bonuses, b.achievement_bonuses);
    }

    #[test]
    fn roundtrip_preserves_persistent_state() {
        let original = played_state();
        let json = serialize(&original, 9_999.0).unwrap();

        let mut restored = GameState::new(0.0);
        deserialize(&mut restored, &json).unwrap();

        assert_same_persistent_state(&original, &restored);
        assert!((restored.last_save_time - 9_999.0).abs() < f64::EPSILON);
    }

    #[test]
    fn save_sets_last_save_time() {
        let mut state = GameState::new(0.0);
        let json = save(&mut state, 42.0).unwrap();
        assert!((state.last_save_time - 42.0).abs() < f64::EPSILON);
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], SAVE_VERSION);
        assert_eq!(value["timestamp"], 42.0);
    }

    #[test]
    fn serialized_keys_are_camel_case() {
        let state = played_state();
        let value: Value = serde_json::from_str(&serialize(&state, 0.0).unwrap()).unwrap();
        assert!(value.get("currentTrainingId").is_some());
        assert!(value.get("trainingProgressSeconds").is_some());
        assert!(value["stats"].get("totalDataGenerated").is_some());
        assert!(value["settings"].get("autoSaveInterval").is_some());
        assert_eq!(value["buildings"][DATA_COLLECTOR]["count"], 2);
    }

    #[test]
    fn load_does_not_apply_offline_progress() {
        let original = played_state();
        let json = serialize(&original, 1e12).unwrap();
        let mut restored = GameState::new(0.0);
        assert!(load(&mut restored, &json));
        assert_eq!(restored.amount(DATA), original.amount(DATA));
    }

    /// 旧バージョン (0.1) の JSON を読み、キー名の変換とデフォルト補完を検証。
    #[test]
    fn migrate_legacy_save() {
        let old_json = r#"{
            "version": "0.1",
            "timestamp": 5000,
            "resources": {
                "data": {"id": "data", "name": "Training Data", "amount": 1234.5, "perSecond": 3, "unlocked": true},
                "accuracy": {"amount": 7, "unlocked": true}
            },
            "buildings": {
                "dataCollector": {"count": 4, "unlocked": true, "baseCost": {"data": 10}},
                "cpuCore": {"count": 1, "unlocked": false}
            },
            "models": {"linearRegression": {"unlocked": true}},
            "research": {"optimizedPipelines": {"unlocked": true, "researched": true}},
            "achievements": {"firstSteps": {"unlocked": true}},
            "prestige": {"points": 2, "upgrades": {"ensemblelearning": {"level": 1}}},
            "currentTraining": "perceptron",
            "trainingProgress": 4.5,
            "stats": {"totalDataGenerated": 2000, "modelsTrained": 1, "trainedModels": ["perceptron"], "totalPlaytime": 60000},
            "settings": {"autoSave": false, "autoSaveInterval": 30000, "offlineProgress": true}
        }"#;

        let mut state = GameState::new(0.0);
        deserialize(&mut state, old_json).unwrap();

        assert!((state.amount(DATA) - 1234.5).abs() < f64::EPSILON);
        assert!((state.amount(ACCURACY) - 7.0).abs() < f64::EPSILON);
        assert_eq!(state.building(DATA_COLLECTOR).unwrap().count, 4);
        // 所有している建物は必ず解放済み
        assert!(state.building(CPU_CORE).unwrap().unlocked);
        assert!(state.model(LINEAR_REGRESSION).unwrap().unlocked);
        assert!(state.research_item(OPTIMIZED_PIPELINES).unwrap().researched);
        assert_eq!(state.prestige.upgrades[0].level, 1);
        assert!((state.prestige.points - 2.0).abs() < f64::EPSILON);
        assert_eq!(state.current_training.as_deref(), Some(PERCEPTRON));
        assert!((state.training_progress - 4.5).abs() < f64::EPSILON);
        assert!((state.stats.total_playtime_ms - 60_000.0).abs() < f64::EPSILON);
        assert!((state.stats.last_playtime_update - 5_000.0).abs() < f64::EPSILON);
        assert!(!state.settings.auto_save);
        assert!((state.last_save_time - 5_000.0).abs() < f64::EPSILON);
        // ボーナスは解除済み実績から再計算される
        assert!((state.achievement_bonuses.data_generation - 1.05).abs() < 1e-9);
        // 0.1 data/s * 4 * 1.05 (firstSteps) * 1.25 * 1.1 (ensemble Lv1)
        let expected = 0.4 * 1.05 * 1.25 * 1.1;
        assert!((state.per_second(DATA) - expected).abs() < 1e-9);
    }

    #[test]
    fn missing_version_is_treated_as_legacy() {
        let json = r#"{"timestamp": 1, "currentTraining": "perceptron", "trainingProgress": 2}"#;
        let mut state = GameState::new(0.0);
        deserialize(&mut state, json).unwrap();
        assert_eq!(state.current_training.as_deref(), Some(PERCEPTRON));
        assert!((state.training_progress - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_version_loads_as_current_format() {
        let mut state = GameState::new(0.0);
        let json = r#"{"version": "1.0", "timestamp": 5, "resources": {"data": {"amount": 500}}}"#;
        assert!(load(&mut state, json));
        assert!((state.amount(DATA) - 500.0).abs() < f64::EPSILON);
        assert!((state.last_save_time - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn numeric_version_loads_as_current_format() {
        let mut state = GameState::new(0.0);
        let json = r#"{"version": 3, "buildings": {"dataCollector": {"count": 2}}}"#;
        deserialize(&mut state, json).unwrap();
        assert_eq!(state.building(DATA_COLLECTOR).unwrap().count, 2);
    }

    #[test]
    fn missing_timestamp_keeps_load_time() {
        let mut state = GameState::new(1.7e12);
        let json = r#"{"version": "0.3", "buildings": {"dataCollector": {"count": 10, "unlocked": true}}}"#;
        deserialize(&mut state, json).unwrap();
        assert!((state.last_save_time - 1.7e12).abs() < f64::EPSILON);
        assert_eq!(state.building(DATA_COLLECTOR).unwrap().count, 10);
    }

    #[test]
    fn legacy_save_without_timestamp_migrates() {
        let mut state = GameState::new(400.0);
        deserialize(&mut state, r#"{"stats": {"totalPlaytime": 10}}"#).unwrap();
        assert!((state.last_save_time - 400.0).abs() < f64::EPSILON);
        assert!((state.stats.total_playtime_ms - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn corrupt_json_leaves_state_untouched() {
        let mut state = played_state();
        let before = state.clone();
        assert!(!load(&mut state, "{not json"));
        assert!(!load(&mut state, "[1, 2, 3]"));
        assert!(!load(&mut state, r#"{"version": "0.3", "resources": 5}"#));
        assert_same_persistent_state(&before, &state);
        assert_eq!(state.log.len(), before.log.len());
    }

    #[test]
    fn non_object_root_is_an_error() {
        let mut state = GameState::new(0.0);
        assert!(matches!(deserialize(&mut state, "[]"), Err(SaveError::NotAnObject)));
    }

    #[test]
    fn unknown_ids_are_ignored_and_missing_ids_keep_defaults() {
        let json = r#"{
            "version": "0.3",
            "resources": {"ghost": {"amount": 5}, "compute": {"amount": 3}},
            "buildings": {"ghostFactory": {"count": 9}}
        }"#;
        let mut state = GameState::new(0.0);
        deserialize(&mut state, json).unwrap();
        assert!(state.resource("ghost").is_none());
        assert!((state.amount(COMPUTE) - 3.0).abs() < f64::EPSILON);
        // data は記録が無いのでカタログの初期値
        assert!((state.amount(DATA) - 10.0).abs() < f64::EPSILON);
        assert!(state.building(DATA_COLLECTOR).unwrap().unlocked);
    }

    #[test]
    fn stored_bonuses_are_not_trusted() {
        let json = r#"{"version": "0.3", "achievementBonuses": {"globalMultiplier": 99}}"#;
        let mut state = GameState::new(0.0);
        deserialize(&mut state, json).unwrap();
        assert_eq!(state.achievement_bonuses, AchievementBonuses::default());
    }

    #[test]
    fn training_of_unknown_model_is_dropped() {
        let json = r#"{"version": "0.3", "currentTrainingId": "ghost", "trainingProgressSeconds": 3}"#;
        let mut state = GameState::new(0.0);
        deserialize(&mut state, json).unwrap();
        assert!(!state.is_training());
        assert!((state.training_progress - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn prestige_level_is_clamped() {
        let json = r#"{"version": "0.3", "prestige": {"upgrades": {"transferLearning": {"level": 99}}}}"#;
        let mut state = GameState::new(0.0);
        deserialize(&mut state, json).unwrap();
        let u = state.prestige.upgrades.iter().find(|u| u.id == TRANSFER_LEARNING).unwrap();
        assert_eq!(u.level, u.max_level);
    }

    #[test]
    fn export_import_roundtrip_with_non_ascii() {
        let mut original = played_state();
        original.stats.trained_models.insert("モデル🚀".to_string());
        let text = export(&mut original, 123.0).unwrap();
        assert!(text.is_ascii());

        let mut restored = GameState::new(0.0);
        assert!(import(&mut restored, &text));
        assert_same_persistent_state(&original, &restored);
        assert!(restored.stats.trained_models.contains("モデル🚀"));
    }

    #[test]
    fn import_rejects_garbage() {
        let mut state = played_state();
        let before = state.clone();
        assert!(!import(&mut state, "!!! not base64 !!!"));
        // 有効な base64 だが UTF-8 ではない
        let bad_utf8 = base64::engine::general_purpose::STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(decode_export(&bad_utf8), Err(SaveError::Utf8(_))));
        assert!(!import(&mut state, &bad_utf8));
        // 有効な base64 + UTF-8 だが JSON ではない
        let not_json = base64::engine::general_purpose::STANDARD.encode("hello");
        assert!(!import(&mut state, &not_json));
        assert_same_persistent_state(&before, &state);
    }

    #[test]
    fn migration_chain_reaches_current_version() {
        let mut version = LEGACY_VERSION;
        for (from, to, _) in MIGRATIONS {
            assert_eq!(*from, version);
            version = *to;
        }
        assert_eq!(version, SAVE_VERSION);
    }
}
