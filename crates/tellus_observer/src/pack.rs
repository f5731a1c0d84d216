//! The world knowledge pack: a compact, immutable projection of core
//! state built once per tick for external question-answering.

use serde::{Deserialize, Serialize};
use tellus_core::snapshot::CivSnapshot;
use tellus_core::CivSystem;
use tellus_data::{SpeciesStat, WorldGrid};

/// Length of one era in ticks.
const ERA_LENGTH: u64 = 1000;

const ERA_NAMES: [&str; 8] = [
    "Dawn",
    "Kindling",
    "First Paths",
    "Hearth",
    "Boundary",
    "Chronicle",
    "Dominion",
    "Long Memory",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EraSummary {
    pub id: u64,
    pub name: String,
    pub start_tick: u64,
    pub end_tick: u64,
    pub current: bool,
}

/// Coarse per-region climate stats for `queryRegion`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionStats {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub mean_fertility: f64,
    pub mean_hazard: f64,
    pub mean_humidity: f64,
    pub mean_temperature: f64,
    pub land_cells: usize,
    pub owned_cells: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldKnowledgePack {
    pub tick: u64,
    pub snapshot: CivSnapshot,
    pub species: Vec<SpeciesStat>,
    /// Climate fields retained for region queries.
    pub width: u16,
    pub height: u16,
    pub fertility: Vec<u8>,
    pub hazard: Vec<u8>,
    pub humidity: Vec<u8>,
    pub temperature: Vec<u8>,
    pub tiles: Vec<u8>,
    pub owner_map: Vec<u16>,
}

impl WorldKnowledgePack {
    /// Builds the pack from the live system. Everything is copied; the
    /// pack stays valid after the engine moves on.
    pub fn build(civ: &CivSystem, world: &WorldGrid, species: &[SpeciesStat]) -> Self {
        Self {
            tick: civ.tick_count,
            snapshot: civ.snapshot(world, species),
            species: species.to_vec(),
            width: world.width,
            height: world.height,
            fertility: world.fertility.clone(),
            hazard: world.hazard.clone(),
            humidity: world.humidity.clone(),
            temperature: world.temperature.clone(),
            tiles: world.tiles.clone(),
            owner_map: civ.territory.owner_map.clone(),
        }
    }

    pub fn eras(&self) -> Vec<EraSummary> {
        let current = self.tick / ERA_LENGTH;
        (0..=current)
            .map(|i| EraSummary {
                id: i,
                name: ERA_NAMES[(i as usize) % ERA_NAMES.len()].to_string(),
                start_tick: i * ERA_LENGTH,
                end_tick: (i + 1) * ERA_LENGTH - 1,
                current: i == current,
            })
            .collect()
    }

    pub fn region_stats(&self, x: u16, y: u16, w: u16, h: u16) -> RegionStats {
        let x1 = (x as usize + w as usize).min(self.width as usize);
        let y1 = (y as usize + h as usize).min(self.height as usize);
        let mut sums = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
        let mut land = 0usize;
        let mut owned = 0usize;
        let mut count = 0usize;
        for yy in y as usize..y1 {
            for xx in x as usize..x1 {
                let i = yy * self.width as usize + xx;
                sums.0 += self.fertility[i] as f64 / 255.0;
                sums.1 += self.hazard[i] as f64 / 255.0;
                sums.2 += self.humidity[i] as f64 / 255.0;
                sums.3 += self.temperature[i] as f64 / 255.0;
                if tellus_data::Biome::from_u8(self.tiles[i]).is_land() {
                    land += 1;
                }
                if self.owner_map[i] != 0 {
                    owned += 1;
                }
                count += 1;
            }
        }
        let n = count.max(1) as f64;
        RegionStats {
            x,
            y,
            width: w,
            height: h,
            mean_fertility: sums.0 / n,
            mean_hazard: sums.1 / n,
            mean_humidity: sums.2 / n,
            mean_temperature: sums.3 / n,
            land_cells: land,
            owned_cells: owned,
        }
    }
}
