//! Built-in content: resources, buildings, models, research, achievements
//! and prestige upgrades. Everything here is an initial template; the
//! mutable copies live in `GameState`.

use super::state::{
    amounts, Achievement, AchievementCategory, AchievementCondition, AddChannel, BonusEffect,
    Building, Model, MultChannel, PrestigeEffect, PrestigeUpgrade, Research, ResearchEffect,
    Resource,
};

// ── Resource ids ────────────────────────────────────────────────
pub const DATA: &str = "data";
pub const COMPUTE: &str = "compute";
pub const ACCURACY: &str = "accuracy";
pub const RESEARCH: &str = "research";

// ── Building ids ────────────────────────────────────────────────
pub const DATA_COLLECTOR: &str = "dataCollector";
pub const CPU_CORE: &str = "cpuCore";
pub const WEB_SCRAPER: &str = "webScraper";
pub const GPU_RIG: &str = "gpuRig";
pub const RESEARCH_LAB: &str = "researchLab";
pub const DATA_CENTER: &str = "dataCenter";
pub const TPU_CLUSTER: &str = "tpuCluster";

// ── Model ids ───────────────────────────────────────────────────
pub const PERCEPTRON: &str = "perceptron";
pub const LINEAR_REGRESSION: &str = "linearRegression";
pub const DECISION_TREE: &str = "decisionTree";
pub const NEURAL_NETWORK: &str = "neuralNetwork";
pub const CNN: &str = "cnn";
pub const TRANSFORMER: &str = "transformer";

// ── Research ids ────────────────────────────────────────────────
pub const OPTIMIZED_PIPELINES: &str = "optimizedPipelines";
pub const DEEP_LEARNING: &str = "deepLearning";
pub const GPU_ACCELERATION: &str = "gpuAcceleration";
pub const CONVOLUTIONS: &str = "convolutions";
pub const ATTENTION: &str = "attention";
pub const DISTRIBUTED_TRAINING: &str = "distributedTraining";

// ── Prestige upgrade ids ────────────────────────────────────────
pub const ENSEMBLE_LEARNING: &str = "ensembleLearning";
pub const TRANSFER_LEARNING: &str = "transferLearning";

/// Immutable templates a `GameState` is instantiated from.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    pub resources: Vec<Resource>,
    pub buildings: Vec<Building>,
    pub models: Vec<Model>,
    pub research: Vec<Research>,
    pub achievements: Vec<Achievement>,
    pub prestige_upgrades: Vec<PrestigeUpgrade>,
}

pub fn default_catalog() -> Catalog {
    Catalog {
        resources: resources(),
        buildings: buildings(),
        models: models(),
        research: research(),
        achievements: achievements(),
        prestige_upgrades: prestige_upgrades(),
    }
}

fn resources() -> Vec<Resource> {
    vec![
        Resource::new(DATA, "Training Data", "📊", 10.0),
        Resource::new(COMPUTE, "Compute Power", "⚡", 0.0).with_unit("TFLOPS"),
        Resource::new(ACCURACY, "Model Accuracy", "🎯", 0.0).with_unit("%"),
        Resource::new(RESEARCH, "Research Points", "🔬", 0.0),
    ]
}

fn building(
    id: &str,
    name: &str,
    tier: u32,
    base_cost: &[(&str, f64)],
    production: &[(&str, f64)],
    unlock_requirement: Option<&[(&str, f64)]>,
) -> Building {
    Building {
        id: id.into(),
        name: name.into(),
        tier,
        count: 0,
        unlocked: unlock_requirement.is_none(),
        base_cost: amounts(base_cost),
        cost_growth: 1.15,
        production: amounts(production),
        unlock_requirement: unlock_requirement.map(amounts),
    }
}

fn buildings() -> Vec<Building> {
    vec![
        building(
            DATA_COLLECTOR,
            "Data Collector",
            1,
            &[(DATA, 10.0)],
            &[(DATA, 0.1)],
            None,
        ),
        building(
            CPU_CORE,
            "CPU Core",
            1,
            &[(DATA, 50.0)],
            &[(COMPUTE, 0.1)],
            Some(&[(DATA, 25.0)]),
        ),
        building(
            WEB_SCRAPER,
            "Web Scraper",
            2,
            &[(DATA, 200.0), (COMPUTE, 10.0)],
            &[(DATA, 1.0)],
            Some(&[(DATA, 150.0)]),
        ),
        building(
            GPU_RIG,
            "GPU Rig",
            2,
            &[(DATA, 500.0), (COMPUTE, 50.0)],
            &[(COMPUTE, 1.0)],
            Some(&[(COMPUTE, 25.0)]),
        ),
        building(
            RESEARCH_LAB,
            "Research Lab",
            3,
            &[(DATA, 2_000.0), (COMPUTE, 200.0), (ACCURACY, 10.0)],
            &[(RESEARCH, 0.1)],
            Some(&[(ACCURACY, 5.0)]),
        ),
        building(
            DATA_CENTER,
            "Data Center",
            3,
            &[(DATA, 10_000.0), (COMPUTE, 2_000.0)],
            &[(DATA, 10.0), (COMPUTE, 5.0)],
            Some(&[(DATA, 5_000.0), (COMPUTE, 1_000.0)]),
        ),
        building(
            TPU_CLUSTER,
            "TPU Cluster",
            4,
            &[(DATA, 100_000.0), (COMPUTE, 20_000.0), (RESEARCH, 100.0)],
            &[(COMPUTE, 50.0)],
            Some(&[(RESEARCH, 50.0)]),
        ),
    ]
}

fn model(
    id: &str,
    name: &str,
    requirements: &[(&str, f64)],
    production: &[(&str, f64)],
    training_time: f64,
    unlocked: bool,
    unlock_requirement: Option<&[(&str, f64)]>,
) -> Model {
    Model {
        id: id.into(),
        name: name.into(),
        unlocked,
        requirements: amounts(requirements),
        production: amounts(production),
        training_time,
        unlock_requirement: unlock_requirement.map(amounts),
    }
}

fn models() -> Vec<Model> {
    vec![
        model(
            PERCEPTRON,
            "Perceptron",
            &[(DATA, 10.0)],
            &[(ACCURACY, 0.5)],
            10.0,
            true,
            None,
        ),
        model(
            LINEAR_REGRESSION,
            "Linear Regression",
            &[(DATA, 100.0), (COMPUTE, 5.0)],
            &[(ACCURACY, 1.0), (RESEARCH, 0.01)],
            30.0,
            false,
            Some(&[(ACCURACY, 5.0)]),
        ),
        model(
            DECISION_TREE,
            "Decision Tree",
            &[(DATA, 500.0), (COMPUTE, 20.0)],
            &[(ACCURACY, 2.5), (RESEARCH, 0.05)],
            60.0,
            false,
            Some(&[(ACCURACY, 25.0)]),
        ),
        // Unlocked by research only.
        model(
            NEURAL_NETWORK,
            "Neural Network",
            &[(DATA, 2_000.0), (COMPUTE, 100.0)],
            &[(ACCURACY, 6.0), (RESEARCH, 0.2)],
            120.0,
            false,
            None,
        ),
        model(
            CNN,
            "Convolutional Network",
            &[(DATA, 10_000.0), (COMPUTE, 500.0)],
            &[(ACCURACY, 15.0), (RESEARCH, 0.5)],
            300.0,
            false,
            None,
        ),
        model(
            TRANSFORMER,
            "Transformer",
            &[(DATA, 100_000.0), (COMPUTE, 5_000.0)],
            &[(ACCURACY, 50.0), (RESEARCH, 2.0)],
            600.0,
            false,
            None,
        ),
    ]
}

fn research_item(
    id: &str,
    name: &str,
    cost: &[(&str, f64)],
    effect: ResearchEffect,
    prerequisite: Option<&str>,
) -> Research {
    Research {
        id: id.into(),
        name: name.into(),
        unlocked: prerequisite.is_none(),
        researched: false,
        cost: amounts(cost),
        effect,
        unlock_requirement: prerequisite.map(String::from),
    }
}

fn research() -> Vec<Research> {
    vec![
        research_item(
            OPTIMIZED_PIPELINES,
            "Optimized Pipelines",
            &[(RESEARCH, 10.0)],
            ResearchEffect::GlobalMultiplier { factor: 1.25 },
            None,
        ),
        research_item(
            DEEP_LEARNING,
            "Deep Learning",
            &[(RESEARCH, 25.0), (ACCURACY, 50.0)],
            ResearchEffect::UnlockModels {
                models: vec![NEURAL_NETWORK.into()],
            },
            Some(OPTIMIZED_PIPELINES),
        ),
        research_item(
            GPU_ACCELERATION,
            "GPU Acceleration",
            &[(RESEARCH, 50.0)],
            ResearchEffect::GlobalMultiplier { factor: 1.5 },
            Some(DEEP_LEARNING),
        ),
        research_item(
            CONVOLUTIONS,
            "Convolutions",
            &[(RESEARCH, 150.0), (ACCURACY, 200.0)],
            ResearchEffect::UnlockModels {
                models: vec![CNN.into()],
            },
            Some(DEEP_LEARNING),
        ),
        research_item(
            ATTENTION,
            "Attention Is All You Need",
            &[(RESEARCH, 1_000.0), (ACCURACY, 2_000.0)],
            ResearchEffect::UnlockModels {
                models: vec![TRANSFORMER.into()],
            },
            Some(CONVOLUTIONS),
        ),
        research_item(
            DISTRIBUTED_TRAINING,
            "Distributed Training",
            &[(RESEARCH, 2_500.0)],
            ResearchEffect::GlobalMultiplier { factor: 2.0 },
            Some(ATTENTION),
        ),
    ]
}

fn achievement(
    id: &str,
    name: &str,
    category: AchievementCategory,
    condition: AchievementCondition,
    reward: &str,
    effects: Vec<BonusEffect>,
) -> Achievement {
    Achievement {
        id: id.into(),
        name: name.into(),
        category,
        unlocked: false,
        condition,
        reward: reward.into(),
        effects,
    }
}

fn mult(channel: MultChannel, factor: f64) -> BonusEffect {
    BonusEffect::Multiply { channel, factor }
}

fn achievements() -> Vec<Achievement> {
    use AchievementCategory as C;
    use AchievementCondition as Cond;
    vec![
        achievement(
            "firstSteps",
            "First Steps",
            C::Production,
            Cond::TotalDataGenerated(100.0),
            "+5% data generation",
            vec![mult(MultChannel::DataGeneration, 1.05)],
        ),
        achievement(
            "dataHoarder",
            "Data Hoarder",
            C::Production,
            Cond::TotalDataGenerated(10_000.0),
            "+10% data generation",
            vec![mult(MultChannel::DataGeneration, 1.1)],
        ),
        achievement(
            "bigData",
            "Big Data",
            C::Production,
            Cond::TotalDataGenerated(1_000_000.0),
            "+10% all production",
            vec![mult(MultChannel::AllProduction, 1.1)],
        ),
        achievement(
            "teraflop",
            "Teraflop Club",
            C::Production,
            Cond::ResourceAmount {
                resource: COMPUTE.into(),
                amount: 1_000.0,
            },
            "+10% compute power",
            vec![mult(MultChannel::ComputePower, 1.1)],
        ),
        achievement(
            "infrastructure",
            "Infrastructure",
            C::Infrastructure,
            Cond::TotalBuildings(25),
            "+10% compute power",
            vec![mult(MultChannel::ComputePower, 1.1)],
        ),
        achievement(
            "serverFarm",
            "Server Farm",
            C::Infrastructure,
            Cond::BuildingCount {
                building: DATA_CENTER.into(),
                count: 10,
            },
            "+5% all resources",
            vec![mult(MultChannel::AllResources, 1.05)],
        ),
        achievement(
            "helloWorld",
            "Hello, World",
            C::Training,
            Cond::ModelsTrained(1),
            "+10% model performance",
            vec![mult(MultChannel::ModelPerformance, 1.1)],
        ),
        achievement(
            "modelZoo",
            "Model Zoo",
            C::Training,
            Cond::UniqueModelsTrained(3),
            "+10% training speed",
            vec![mult(MultChannel::TrainingSpeed, 1.1)],
        ),
        achievement(
            "stateOfTheArt",
            "State of the Art",
            C::Training,
            Cond::MaxAccuracy(1_000.0),
            "+5% global multiplier",
            vec![mult(MultChannel::GlobalMultiplier, 1.05)],
        ),
        achievement(
            "curious",
            "Curious Mind",
            C::Research,
            Cond::ResearchCompleted(1),
            "+10% research points",
            vec![mult(MultChannel::ResearchPoints, 1.1)],
        ),
        achievement(
            "scholar",
            "Scholar",
            C::Research,
            Cond::ResearchCompleted(5),
            "+10% all resources, +10% model performance",
            vec![
                mult(MultChannel::AllResources, 1.1),
                mult(MultChannel::ModelPerformance, 1.1),
            ],
        ),
        achievement(
            "dedicated",
            "Dedicated",
            C::Dedication,
            Cond::PlaytimeMs(3_600_000.0),
            "+1 data per click",
            vec![BonusEffect::Add {
                channel: AddChannel::ClickPower,
                amount: 1.0,
            }],
        ),
    ]
}

fn prestige_upgrades() -> Vec<PrestigeUpgrade> {
    vec![
        PrestigeUpgrade {
            id: ENSEMBLE_LEARNING.into(),
            name: "Ensemble Learning".into(),
            level: 0,
            max_level: 10,
            base_cost: 1.0,
            effect: PrestigeEffect::GlobalProduction { value: 0.1 },
        },
        PrestigeUpgrade {
            id: TRANSFER_LEARNING.into(),
            name: "Transfer Learning".into(),
            level: 0,
            max_level: 5,
            base_cost: 2.0,
            effect: PrestigeEffect::TrainingSpeed { value: 0.2 },
        },
    ]
}
