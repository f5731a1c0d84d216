use super::structure::StructureBlueprint;
use serde::{Deserialize, Serialize};

/// Strategic dispositions an agent can commit to. An intent outlives a
/// single tick; the plan layer turns it into executable steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Explore,
    Gather,
    Farm,
    Build,
    Fortify,
    Migrate,
    Trade,
    Defend,
    Invent,
    Write,
    Negotiate,
    ExpandTerritory,
    DomesticateSpecies,
    Hunt,
}

impl Intent {
    pub const ALL: [Intent; 14] = [
        Intent::Explore,
        Intent::Gather,
        Intent::Farm,
        Intent::Build,
        Intent::Fortify,
        Intent::Migrate,
        Intent::Trade,
        Intent::Defend,
        Intent::Invent,
        Intent::Write,
        Intent::Negotiate,
        Intent::ExpandTerritory,
        Intent::DomesticateSpecies,
        Intent::Hunt,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Intent::Explore => "explore",
            Intent::Gather => "gather",
            Intent::Farm => "farm",
            Intent::Build => "build",
            Intent::Fortify => "fortify",
            Intent::Migrate => "migrate",
            Intent::Trade => "trade",
            Intent::Defend => "defend",
            Intent::Invent => "invent",
            Intent::Write => "write",
            Intent::Negotiate => "negotiate",
            Intent::ExpandTerritory => "expand_territory",
            Intent::DomesticateSpecies => "domesticate_species",
            Intent::Hunt => "hunt",
        }
    }
}

/// Tactical per-tick goals resolved by the decision layer when no plan step
/// applies, and carried by plan steps otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Explore,
    Gather,
    Build,
    Farm,
    Defend,
    Trade,
    Talk,
    Worship,
    PickItem,
    UseItem,
    CraftItem,
    EquipItem,
    Write,
}

impl Goal {
    pub const ALL: [Goal; 13] = [
        Goal::Explore,
        Goal::Gather,
        Goal::Build,
        Goal::Farm,
        Goal::Defend,
        Goal::Trade,
        Goal::Talk,
        Goal::Worship,
        Goal::PickItem,
        Goal::UseItem,
        Goal::CraftItem,
        Goal::EquipItem,
        Goal::Write,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Goal::Explore => "explore",
            Goal::Gather => "gather",
            Goal::Build => "build",
            Goal::Farm => "farm",
            Goal::Defend => "defend",
            Goal::Trade => "trade",
            Goal::Talk => "talk",
            Goal::Worship => "worship",
            Goal::PickItem => "pick_item",
            Goal::UseItem => "use_item",
            Goal::CraftItem => "craft_item",
            Goal::EquipItem => "equip_item",
            Goal::Write => "write",
        }
    }
}

/// The kind of work a plan step performs. `Move` steps complete on arrival;
/// everything else completes on elapsed ticks plus success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Move,
    Work,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    pub action: StepAction,
    pub goal: Goal,
    pub required_ticks: u32,
    pub target_x: u16,
    pub target_y: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blueprint: Option<StructureBlueprint>,
    #[serde(default)]
    pub elapsed_ticks: u32,
}

impl PlanStep {
    pub fn movement(goal: Goal, x: u16, y: u16) -> Self {
        Self {
            action: StepAction::Move,
            goal,
            required_ticks: 0,
            target_x: x,
            target_y: y,
            blueprint: None,
            elapsed_ticks: 0,
        }
    }

    pub fn work(goal: Goal, required_ticks: u32, x: u16, y: u16) -> Self {
        Self {
            action: StepAction::Work,
            goal,
            required_ticks,
            target_x: x,
            target_y: y,
            blueprint: None,
            elapsed_ticks: 0,
        }
    }

    pub fn with_blueprint(mut self, blueprint: StructureBlueprint) -> Self {
        self.blueprint = Some(blueprint);
        self
    }
}

/// An ordered sequence of 1–4 steps realizing an intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub intent: Intent,
    pub steps: Vec<PlanStep>,
    pub current_step: usize,
    pub created_at_tick: u64,
}

impl Plan {
    pub fn new(intent: Intent, steps: Vec<PlanStep>, tick: u64) -> Self {
        debug_assert!(!steps.is_empty() && steps.len() <= 4);
        Self {
            intent,
            steps,
            current_step: 0,
            created_at_tick: tick,
        }
    }

    pub fn step(&self) -> Option<&PlanStep> {
        self.steps.get(self.current_step)
    }

    pub fn step_mut(&mut self) -> Option<&mut PlanStep> {
        self.steps.get_mut(self.current_step)
    }

    /// Moves to the next step; returns false when the plan is exhausted.
    pub fn advance(&mut self) -> bool {
        self.current_step += 1;
        self.current_step < self.steps.len()
    }

    pub fn is_done(&self) -> bool {
        self.current_step >= self.steps.len()
    }
}
