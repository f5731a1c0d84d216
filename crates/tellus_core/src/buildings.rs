//! Structure placement and progressive construction.
//!
//! Placement validates the tile and deducts material costs up front; the
//! build itself is a task that consumes work units over many ticks from a
//! shared build-power budget.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tellus_data::{
    Biome, Stockpile, Structure, StructureBlueprint, StructureType, BuildTask, WorldGrid,
};

/// Per-task work cap per tick.
const MAX_WORK_PER_TASK: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementFailure {
    UnknownStructure,
    InvalidTile,
    InsufficientMaterials,
}

#[derive(Debug, Clone)]
pub struct PlacementOutcome {
    pub ok: bool,
    pub reason: Option<PlacementFailure>,
    pub structure_id: Option<String>,
}

impl PlacementOutcome {
    fn fail(reason: PlacementFailure) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
            structure_id: None,
        }
    }
}

/// Maps logical blueprints onto concrete structure kinds.
pub struct StructureSystem;

impl StructureSystem {
    /// Resolves a blueprint by wire name; unknown names are a placement
    /// failure, not a panic.
    pub fn blueprint_from_name(name: &str) -> Option<StructureBlueprint> {
        StructureBlueprint::ALL
            .into_iter()
            .find(|b| b.label() == name)
    }

    pub fn resolve(blueprint: StructureBlueprint) -> StructureType {
        match blueprint {
            StructureBlueprint::Hut => StructureType::House,
            StructureBlueprint::Storage => StructureType::Storage,
            StructureBlueprint::Palisade => StructureType::Wall,
            StructureBlueprint::Shrine => StructureType::Temple,
            StructureBlueprint::FarmPlot => StructureType::FarmPlot,
            StructureBlueprint::WatchTower => StructureType::WatchTower,
        }
    }

    /// (wood, stone) cost per blueprint.
    pub fn cost(blueprint: StructureBlueprint) -> (f64, f64) {
        match blueprint {
            StructureBlueprint::Hut => (6.0, 0.0),
            StructureBlueprint::Storage => (8.0, 2.0),
            StructureBlueprint::Palisade => (4.0, 2.0),
            StructureBlueprint::Shrine => (0.0, 6.0),
            StructureBlueprint::FarmPlot => (2.0, 0.0),
            StructureBlueprint::WatchTower => (5.0, 4.0),
        }
    }

    /// Required work ticks per blueprint.
    pub fn required_work(blueprint: StructureBlueprint) -> u32 {
        match blueprint {
            StructureBlueprint::Hut => 24,
            StructureBlueprint::Storage => 30,
            StructureBlueprint::Palisade => 14,
            StructureBlueprint::Shrine => 40,
            StructureBlueprint::FarmPlot => 10,
            StructureBlueprint::WatchTower => 36,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingSystem {
    pub structures: Vec<Structure>,
    pub tasks: Vec<BuildTask>,
    #[serde(skip)]
    occupied: HashMap<(u16, u16), usize>,
    next_structure_id: u64,
    next_task_id: u64,
}

impl BuildingSystem {
    pub fn rebuild_index(&mut self) {
        self.occupied = self
            .structures
            .iter()
            .enumerate()
            .map(|(i, s)| ((s.x, s.y), i))
            .collect();
    }

    pub fn structure_at(&self, x: u16, y: u16) -> Option<&Structure> {
        self.occupied.get(&(x, y)).map(|&i| &self.structures[i])
    }

    pub fn structures_of<'a>(&'a self, faction_id: &'a str) -> impl Iterator<Item = &'a Structure> {
        self.structures
            .iter()
            .filter(move |s| s.faction_id == faction_id)
    }

    fn tile_valid(world: &WorldGrid, blueprint: StructureBlueprint, x: i32, y: i32) -> bool {
        if !world.in_bounds(x, y) {
            return false;
        }
        let (x, y) = (x as u16, y as u16);
        let biome = world.biome_at(x, y);
        if biome.is_water() || biome == Biome::Lava {
            return false;
        }
        let idx = world.index(x, y);
        if world.hazard[idx] > 120 {
            return false;
        }
        match blueprint {
            StructureBlueprint::FarmPlot => world.fertility[idx] >= 120 && !biome.is_rocky(),
            StructureBlueprint::Shrine => world.hazard[idx] <= 70,
            StructureBlueprint::WatchTower => biome.is_elevated(),
            _ => true,
        }
    }

    /// Like [`BuildingSystem::request_build`] but resolving the blueprint
    /// from its wire name first.
    #[allow(clippy::too_many_arguments)]
    pub fn request_build_named(
        &mut self,
        world: &WorldGrid,
        blueprint_name: &str,
        x: i32,
        y: i32,
        faction_id: &str,
        stockpile: &mut Stockpile,
        tick: u64,
    ) -> PlacementOutcome {
        match StructureSystem::blueprint_from_name(blueprint_name) {
            Some(blueprint) => {
                self.request_build(world, blueprint, x, y, faction_id, stockpile, tick)
            }
            None => PlacementOutcome::fail(PlacementFailure::UnknownStructure),
        }
    }

    /// Places a structure for a faction, deducting wood/stone from the
    /// given stockpile. On success a build task is queued and the new
    /// structure starts at zero progress.
    #[allow(clippy::too_many_arguments)]
    pub fn request_build(
        &mut self,
        world: &WorldGrid,
        blueprint: StructureBlueprint,
        x: i32,
        y: i32,
        faction_id: &str,
        stockpile: &mut Stockpile,
        tick: u64,
    ) -> PlacementOutcome {
        if !Self::tile_valid(world, blueprint, x, y)
            || self
                .occupied
                .contains_key(&(x.max(0) as u16, y.max(0) as u16))
        {
            return PlacementOutcome::fail(PlacementFailure::InvalidTile);
        }
        let (wood, stone) = StructureSystem::cost(blueprint);
        if stockpile.wood < wood || stockpile.stone < stone {
            return PlacementOutcome::fail(PlacementFailure::InsufficientMaterials);
        }
        stockpile.wood -= wood;
        stockpile.stone -= stone;

        let (x, y) = (x as u16, y as u16);
        self.next_structure_id += 1;
        self.next_task_id += 1;
        let structure_id = format!("struct-{}", self.next_structure_id);
        let required = StructureSystem::required_work(blueprint);
        self.structures.push(Structure {
            id: structure_id.clone(),
            structure_type: StructureSystem::resolve(blueprint),
            blueprint: Some(blueprint),
            x,
            y,
            faction_id: faction_id.to_string(),
            hp: 100.0,
            storage: 0.0,
            built_at_tick: tick,
            completed: false,
            progress: 0.0,
        });
        self.occupied.insert((x, y), self.structures.len() - 1);
        self.tasks.push(BuildTask {
            id: format!("task-{}", self.next_task_id),
            structure_id: structure_id.clone(),
            progress: 0,
            required,
        });
        tracing::debug!(
            faction = faction_id,
            blueprint = blueprint.label(),
            x,
            y,
            "structure placed"
        );
        PlacementOutcome {
            ok: true,
            reason: None,
            structure_id: Some(structure_id),
        }
    }

    /// Spawns an already-complete structure (faction founding camp).
    pub fn place_completed(
        &mut self,
        structure_type: StructureType,
        x: u16,
        y: u16,
        faction_id: &str,
        tick: u64,
    ) -> String {
        self.next_structure_id += 1;
        let id = format!("struct-{}", self.next_structure_id);
        self.structures.push(Structure {
            id: id.clone(),
            structure_type,
            blueprint: None,
            x,
            y,
            faction_id: faction_id.to_string(),
            hp: 100.0,
            storage: 0.0,
            built_at_tick: tick,
            completed: true,
            progress: 1.0,
        });
        self.occupied.insert((x, y), self.structures.len() - 1);
        id
    }

    /// Consumes up to `budget` work units across open tasks. Every task
    /// receives at least one unit per tick while budget remains, capped at
    /// three per task. Returns ids of structures completed this tick.
    pub fn step(&mut self, budget: u32) -> Vec<String> {
        let mut remaining = budget;
        let mut completed = Vec::new();
        for task in &mut self.tasks {
            if remaining == 0 {
                break;
            }
            let missing = task.required.saturating_sub(task.progress);
            let work = missing.min(MAX_WORK_PER_TASK).min(remaining).max(1);
            task.progress += work;
            remaining -= work;

            if let Some(structure) = self
                .structures
                .iter_mut()
                .find(|s| s.id == task.structure_id)
            {
                structure.progress =
                    f64::from(task.progress) / f64::from(task.required.max(1));
                if task.progress >= task.required && !structure.completed {
                    structure.completed = true;
                    structure.progress = 1.0;
                    completed.push(structure.id.clone());
                }
            }
        }
        self.tasks.retain(|t| t.progress < t.required);
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grassland(fertility: u8) -> WorldGrid {
        let mut world = WorldGrid::new(8, 8, 1, vec![Biome::Grassland as u8; 64]);
        world.fertility.fill(fertility);
        world
    }

    fn rich_stockpile() -> Stockpile {
        Stockpile {
            food: 0.0,
            wood: 50.0,
            stone: 50.0,
            ore: 0.0,
        }
    }

    #[test]
    fn farm_needs_fertile_soil() {
        let world = grassland(60);
        let mut buildings = BuildingSystem::default();
        let mut stock = rich_stockpile();
        let out = buildings.request_build(
            &world,
            StructureBlueprint::FarmPlot,
            2,
            2,
            "fac-1",
            &mut stock,
            0,
        );
        assert_eq!(out.reason, Some(PlacementFailure::InvalidTile));
    }

    #[test]
    fn costs_are_deducted() {
        let world = grassland(200);
        let mut buildings = BuildingSystem::default();
        let mut stock = rich_stockpile();
        let out = buildings.request_build(
            &world,
            StructureBlueprint::Hut,
            3,
            3,
            "fac-1",
            &mut stock,
            0,
        );
        assert!(out.ok);
        assert_eq!(stock.wood, 44.0);
    }

    #[test]
    fn poor_faction_cannot_build() {
        let world = grassland(200);
        let mut buildings = BuildingSystem::default();
        let mut stock = Stockpile::default();
        let out = buildings.request_build(
            &world,
            StructureBlueprint::Hut,
            3,
            3,
            "fac-1",
            &mut stock,
            0,
        );
        assert_eq!(out.reason, Some(PlacementFailure::InsufficientMaterials));
    }

    #[test]
    fn tasks_progress_and_complete() {
        let world = grassland(200);
        let mut buildings = BuildingSystem::default();
        let mut stock = rich_stockpile();
        buildings.request_build(
            &world,
            StructureBlueprint::FarmPlot,
            3,
            3,
            "fac-1",
            &mut stock,
            0,
        );
        let mut completed = Vec::new();
        for _ in 0..10 {
            completed.extend(buildings.step(3));
        }
        assert_eq!(completed.len(), 1);
        let s = buildings.structure_at(3, 3).unwrap();
        assert!(s.completed);
        assert_eq!(s.progress, 1.0);
        assert!(buildings.tasks.is_empty());
    }

    #[test]
    fn occupied_tile_rejected() {
        let world = grassland(200);
        let mut buildings = BuildingSystem::default();
        let mut stock = rich_stockpile();
        assert!(buildings
            .request_build(&world, StructureBlueprint::Hut, 3, 3, "fac-1", &mut stock, 0)
            .ok);
        let out = buildings.request_build(
            &world,
            StructureBlueprint::Hut,
            3,
            3,
            "fac-1",
            &mut stock,
            0,
        );
        assert_eq!(out.reason, Some(PlacementFailure::InvalidTile));
    }
}
