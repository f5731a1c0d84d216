//! Per-faction territorial influence fields.
//!
//! Every territory step decays each faction's scalar field, stamps
//! presence (home, structures, agents), then resolves per-cell ownership,
//! control and borders. The step is invariant to agent iteration order.

use serde::{Deserialize, Serialize};
use tellus_data::{Role, StructureType, WorldGrid};

const DECAY: f32 = 0.958;
const HAZARD_DECAY: f32 = 0.03;
const FOREIGN_DECAY: f32 = 0.025;
const OWNERSHIP_THRESHOLD: f32 = 0.035;
const CLAIM_CONTROL: f32 = 0.5;

const HOME_RADIUS: i32 = 6;
const HOME_PEAK: f32 = 1.45;

const AGENT_RADIUS: i32 = 2;
const AGENT_STRENGTH: f32 = 0.42;

/// Minimal agent view needed for stamping.
#[derive(Debug, Clone, Copy)]
pub struct AgentStamp {
    pub x: u16,
    pub y: u16,
    pub energy: f64,
    pub role: Role,
}

/// Minimal structure view needed for stamping.
#[derive(Debug, Clone, Copy)]
pub struct StructureStamp {
    pub x: u16,
    pub y: u16,
    pub structure_type: StructureType,
    pub completed: bool,
    pub progress: f64,
}

/// Everything the territory pass reads about one faction this step.
#[derive(Debug, Clone)]
pub struct FactionTerritoryInput {
    pub faction_id: String,
    pub home: (u16, u16),
    pub structures: Vec<StructureStamp>,
    pub agents: Vec<AgentStamp>,
}

/// One faction's scalar fields over the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionField {
    pub faction_id: String,
    pub influence: Vec<f32>,
    pub control: Vec<f32>,
    pub claimed: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritoryOverlayCell {
    pub x: u16,
    pub y: u16,
    pub faction_id: String,
    pub control: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritorySystem {
    width: u16,
    height: u16,
    fields: Vec<FactionField>,
    /// 0 = unclaimed, else 1-based index into `fields`.
    pub owner_map: Vec<u16>,
    pub control_map: Vec<u8>,
    pub border_map: Vec<u8>,
    pub version: u64,
}

impl TerritorySystem {
    pub fn new(width: u16, height: u16) -> Self {
        let n = width as usize * height as usize;
        Self {
            width,
            height,
            fields: Vec::new(),
            owner_map: vec![0; n],
            control_map: vec![0; n],
            border_map: vec![0; n],
            version: 0,
        }
    }

    fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn register_faction(&mut self, faction_id: &str) {
        if self.marker_of(faction_id).is_some() {
            return;
        }
        let n = self.cells();
        self.fields.push(FactionField {
            faction_id: faction_id.to_string(),
            influence: vec![0.0; n],
            control: vec![0.0; n],
            claimed: vec![0; n],
        });
    }

    pub fn remove_faction(&mut self, faction_id: &str) {
        if let Some(idx) = self.fields.iter().position(|f| f.faction_id == faction_id) {
            self.fields.remove(idx);
            // Markers shift; drop stale ownership wholesale and let the
            // next step rebuild it.
            self.owner_map.fill(0);
            self.control_map.fill(0);
            self.border_map.fill(0);
        }
    }

    /// 1-based marker of a faction, if registered.
    pub fn marker_of(&self, faction_id: &str) -> Option<u16> {
        self.fields
            .iter()
            .position(|f| f.faction_id == faction_id)
            .map(|i| i as u16 + 1)
    }

    pub fn field_of(&self, faction_id: &str) -> Option<&FactionField> {
        self.fields.iter().find(|f| f.faction_id == faction_id)
    }

    pub fn claimed_count(&self, faction_id: &str) -> usize {
        self.field_of(faction_id)
            .map(|f| f.claimed.iter().filter(|&&c| c == 1).count())
            .unwrap_or(0)
    }

    pub fn owner_at(&self, x: u16, y: u16) -> Option<&str> {
        let marker = self.owner_map[y as usize * self.width as usize + x as usize];
        if marker == 0 {
            None
        } else {
            self.fields
                .get(marker as usize - 1)
                .map(|f| f.faction_id.as_str())
        }
    }

    fn stamp(field: &mut [f32], width: u16, height: u16, cx: u16, cy: u16, radius: i32, strength: f32) {
        let r = radius.max(1);
        for dy in -r..=r {
            for dx in -r..=r {
                let (x, y) = (cx as i32 + dx, cy as i32 + dy);
                if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                    continue;
                }
                let d = ((dx * dx + dy * dy) as f32).sqrt();
                if d > r as f32 {
                    continue;
                }
                let falloff = 0.45 + 0.55 * (1.0 - d / r as f32);
                field[y as usize * width as usize + x as usize] += strength * falloff;
            }
        }
    }

    fn structure_stamp_params(s: &StructureStamp) -> (i32, f32) {
        let (radius, strength) = match s.structure_type {
            StructureType::Temple => (5, 1.18),
            StructureType::WatchTower => (5, 1.15),
            StructureType::Storage => (4, 1.25),
            StructureType::House => (4, 1.1),
            StructureType::Camp => (5, 0.95),
            StructureType::FarmPlot => (3, 0.85),
            StructureType::Wall => (3, 0.58),
            StructureType::Road => (2, 0.42),
        };
        let scale = if s.completed { 1.0 } else { s.progress as f32 };
        (radius, strength * scale)
    }

    /// One full territory step; bumps `version`.
    pub fn step(&mut self, world: &WorldGrid, inputs: &[FactionTerritoryInput]) {
        let n = self.cells();
        let width = self.width;
        let height = self.height;

        // Phase 1: decay, penalized on hazardous and foreign-owned ground.
        for (field_idx, field) in self.fields.iter_mut().enumerate() {
            let marker = field_idx as u16 + 1;
            for i in 0..n {
                let mut v = field.influence[i] * DECAY;
                v -= HAZARD_DECAY * world.hazard[i] as f32 / 255.0;
                let owner = self.owner_map[i];
                if owner != 0 && owner != marker {
                    v -= FOREIGN_DECAY;
                }
                field.influence[i] = v.max(0.0);
            }
        }

        // Phase 2: stamps.
        for input in inputs {
            let Some(idx) = self
                .fields
                .iter()
                .position(|f| f.faction_id == input.faction_id)
            else {
                continue;
            };
            let field = &mut self.fields[idx];
            Self::stamp(
                &mut field.influence,
                width,
                height,
                input.home.0,
                input.home.1,
                HOME_RADIUS,
                HOME_PEAK,
            );
            for s in &input.structures {
                let (radius, strength) = Self::structure_stamp_params(s);
                if strength > 0.0 {
                    Self::stamp(&mut field.influence, width, height, s.x, s.y, radius, strength);
                }
            }
            for a in &input.agents {
                let active = if a.energy > 30.0 { 1.0 } else { 0.6 };
                let role = match a.role {
                    Role::Leader => 1.25,
                    Role::Guard => 1.15,
                    _ => 1.0,
                };
                Self::stamp(
                    &mut field.influence,
                    width,
                    height,
                    a.x,
                    a.y,
                    AGENT_RADIUS,
                    AGENT_STRENGTH * active * role,
                );
            }
        }

        // Phase 3: ownership, control, claims.
        for i in 0..n {
            let mut top = 0.0f32;
            let mut second = 0.0f32;
            let mut top_marker = 0u16;
            for (idx, field) in self.fields.iter().enumerate() {
                let v = field.influence[i];
                if v > top {
                    second = top;
                    top = v;
                    top_marker = idx as u16 + 1;
                } else if v > second {
                    second = v;
                }
            }
            if top > OWNERSHIP_THRESHOLD {
                self.owner_map[i] = top_marker;
                let control = (top - second) / (top + second);
                self.control_map[i] = (control * 255.0) as u8;
                for (idx, field) in self.fields.iter_mut().enumerate() {
                    let is_owner = idx as u16 + 1 == top_marker;
                    field.control[i] = if is_owner { control } else { 0.0 };
                    field.claimed[i] = u8::from(is_owner && control >= CLAIM_CONTROL);
                }
            } else {
                self.owner_map[i] = 0;
                self.control_map[i] = 0;
                for field in &mut self.fields {
                    field.control[i] = 0.0;
                    field.claimed[i] = 0;
                }
            }
        }

        // Phase 4: borders (4-neighborhood ownership changes).
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let i = y as usize * width as usize + x as usize;
                let owner = self.owner_map[i];
                let mut border = 0u8;
                for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                    let (nx, ny) = (x + dx, y + dy);
                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        continue;
                    }
                    let j = ny as usize * width as usize + nx as usize;
                    if self.owner_map[j] != owner {
                        border = 1;
                        break;
                    }
                }
                self.border_map[i] = border;
            }
        }

        self.version += 1;
    }

    /// Samples owned cells with the given stride, up to `max_cells`.
    pub fn build_summary(&self, stride: usize, max_cells: usize) -> Vec<TerritoryOverlayCell> {
        let mut out = Vec::new();
        let stride = stride.max(1);
        let w = self.width as usize;
        for i in (0..self.cells()).step_by(stride) {
            if out.len() >= max_cells {
                break;
            }
            let marker = self.owner_map[i];
            if marker == 0 {
                continue;
            }
            if let Some(field) = self.fields.get(marker as usize - 1) {
                out.push(TerritoryOverlayCell {
                    x: (i % w) as u16,
                    y: (i / w) as u16,
                    faction_id: field.faction_id.clone(),
                    control: self.control_map[i] as f64 / 255.0,
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tellus_data::Biome;

    fn world() -> WorldGrid {
        WorldGrid::new(32, 32, 1, vec![Biome::Grassland as u8; 32 * 32])
    }

    fn input(id: &str, home: (u16, u16)) -> FactionTerritoryInput {
        FactionTerritoryInput {
            faction_id: id.to_string(),
            home,
            structures: vec![],
            agents: vec![],
        }
    }

    #[test]
    fn version_increments_every_step() {
        let world = world();
        let mut territory = TerritorySystem::new(32, 32);
        territory.register_faction("fac-1");
        for expected in 1..=5u64 {
            territory.step(&world, &[input("fac-1", (8, 8))]);
            assert_eq!(territory.version, expected);
        }
    }

    #[test]
    fn home_blob_claims_center() {
        let world = world();
        let mut territory = TerritorySystem::new(32, 32);
        territory.register_faction("fac-1");
        for _ in 0..4 {
            territory.step(&world, &[input("fac-1", (8, 8))]);
        }
        assert_eq!(territory.owner_at(8, 8), Some("fac-1"));
        assert!(territory.claimed_count("fac-1") > 0);
    }

    #[test]
    fn two_homes_split_the_map_with_a_border() {
        let world = world();
        let mut territory = TerritorySystem::new(32, 32);
        territory.register_faction("fac-1");
        territory.register_faction("fac-2");
        let inputs = vec![input("fac-1", (6, 16)), input("fac-2", (25, 16))];
        for _ in 0..6 {
            territory.step(&world, &inputs);
        }
        assert_eq!(territory.owner_at(6, 16), Some("fac-1"));
        assert_eq!(territory.owner_at(25, 16), Some("fac-2"));
        assert!(territory.border_map.iter().any(|&b| b == 1));
    }

    #[test]
    fn claimed_matches_owner_map() {
        let world = world();
        let mut territory = TerritorySystem::new(32, 32);
        territory.register_faction("fac-1");
        for _ in 0..5 {
            territory.step(&world, &[input("fac-1", (8, 8))]);
        }
        let field = territory.field_of("fac-1").unwrap();
        for (i, &claimed) in field.claimed.iter().enumerate() {
            if claimed == 1 {
                assert_eq!(territory.owner_map[i], 1);
            }
        }
    }

    #[test]
    fn summary_respects_caps() {
        let world = world();
        let mut territory = TerritorySystem::new(32, 32);
        territory.register_faction("fac-1");
        for _ in 0..5 {
            territory.step(&world, &[input("fac-1", (8, 8))]);
        }
        let cells = territory.build_summary(1, 10);
        assert!(cells.len() <= 10);
        assert!(!cells.is_empty());
    }
}
