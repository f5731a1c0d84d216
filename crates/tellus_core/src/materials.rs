//! Material catalog generation from the biome profile.
//!
//! The catalog is built once at world start and frozen: sorted by id,
//! duplicate-free, never empty.

use crate::config::ConfigError;
use tellus_data::{Biome, MaterialCategory, MaterialDef, WorldGrid};

/// Rocky-tile ratio at or above which iron enters the world.
const IRON_ROCKY_RATIO: f64 = 0.04;

#[derive(Debug, Clone)]
pub struct MaterialCatalog {
    entries: Vec<MaterialDef>,
}

impl MaterialCatalog {
    /// Builds a frozen catalog; fails when the entry list would be empty.
    pub fn new(mut entries: Vec<MaterialDef>) -> Result<Self, ConfigError> {
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries.dedup_by(|a, b| a.id == b.id);
        if entries.is_empty() {
            return Err(ConfigError::EmptyCatalog("materials"));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[MaterialDef] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&MaterialDef> {
        self.entries
            .binary_search_by(|m| m.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

/// Profile of the world's biome composition, collected in one pass.
struct BiomeProfile {
    present: Vec<Biome>,
    rocky_ratio: f64,
    has_lava_or_scorched: bool,
    has_beach_or_desert: bool,
}

fn profile(world: &WorldGrid) -> BiomeProfile {
    let mut present = [false; Biome::COUNT];
    let mut land = 0usize;
    let mut rocky = 0usize;
    for &t in &world.tiles {
        let biome = Biome::from_u8(t);
        present[t.min(14) as usize] = true;
        if biome.is_land() {
            land += 1;
            if biome.is_rocky() {
                rocky += 1;
            }
        }
    }
    let present: Vec<Biome> = (0..Biome::COUNT as u8)
        .filter(|&i| present[i as usize])
        .map(Biome::from_u8)
        .collect();
    BiomeProfile {
        rocky_ratio: if land == 0 {
            0.0
        } else {
            rocky as f64 / land as f64
        },
        has_lava_or_scorched: present
            .iter()
            .any(|b| matches!(b, Biome::Lava | Biome::Scorched)),
        has_beach_or_desert: present
            .iter()
            .any(|b| matches!(b, Biome::Beach | Biome::Desert)),
        present,
    }
}

/// Archetype biome set per material, intersected with the world's present
/// biomes (Grassland fallback when the intersection comes up empty).
fn archetype_biomes(id: &str) -> Vec<Biome> {
    match id {
        "wood" | "charcoal" => vec![
            Biome::Forest,
            Biome::Jungle,
            Biome::Savanna,
            Biome::Shrubland,
            Biome::Grassland,
        ],
        "stone" => vec![
            Biome::Hills,
            Biome::Mountain,
            Biome::Rock,
            Biome::Grassland,
        ],
        "clay" => vec![Biome::Swamp, Biome::Beach],
        "iron_ore" | "iron_ingot" => vec![Biome::Hills, Biome::Mountain, Biome::Rock],
        "sand" => vec![Biome::Beach, Biome::Desert],
        "obsidian" => vec![Biome::Lava, Biome::Scorched],
        _ => vec![Biome::Grassland],
    }
}

fn allowed_biomes(id: &str, present: &[Biome]) -> Vec<Biome> {
    let wanted = archetype_biomes(id);
    let out: Vec<Biome> = wanted
        .into_iter()
        .filter(|b| present.contains(b))
        .collect();
    if out.is_empty() {
        vec![Biome::Grassland]
    } else {
        out
    }
}

fn material(
    id: &str,
    category: MaterialCategory,
    hardness: f64,
    heat: f64,
    lava: f64,
    hazard: f64,
    rarity: f64,
    present: &[Biome],
) -> MaterialDef {
    MaterialDef {
        id: id.to_string(),
        category,
        hardness,
        heat_resistance: heat,
        lava_resistance: lava,
        hazard_resistance: hazard,
        rarity,
        allowed_biomes: allowed_biomes(id, present),
    }
}

pub struct MaterialCatalogGenerator;

impl MaterialCatalogGenerator {
    /// Derives the catalog from the world's biome profile. The base set of
    /// wood/stone/clay/charcoal is always present; the rest is gated on
    /// what the terrain actually offers.
    pub fn generate(world: &WorldGrid) -> Result<MaterialCatalog, ConfigError> {
        let p = profile(world);
        let mut out = vec![
            material("wood", MaterialCategory::Raw, 0.3, 0.1, 0.0, 0.2, 0.1, &p.present),
            material("stone", MaterialCategory::Raw, 0.7, 0.6, 0.2, 0.5, 0.2, &p.present),
            material("clay", MaterialCategory::Raw, 0.2, 0.4, 0.0, 0.2, 0.25, &p.present),
            material(
                "charcoal",
                MaterialCategory::Processed,
                0.25,
                0.8,
                0.1,
                0.3,
                0.3,
                &p.present,
            ),
        ];
        if p.rocky_ratio >= IRON_ROCKY_RATIO {
            out.push(material(
                "iron_ore",
                MaterialCategory::Raw,
                0.85,
                0.7,
                0.3,
                0.6,
                0.55,
                &p.present,
            ));
            out.push(material(
                "iron_ingot",
                MaterialCategory::Processed,
                0.95,
                0.85,
                0.4,
                0.7,
                0.7,
                &p.present,
            ));
        }
        if p.has_beach_or_desert {
            out.push(material(
                "sand",
                MaterialCategory::Raw,
                0.1,
                0.5,
                0.1,
                0.1,
                0.15,
                &p.present,
            ));
        }
        if p.has_lava_or_scorched {
            out.push(material(
                "obsidian",
                MaterialCategory::Raw,
                0.9,
                0.95,
                0.9,
                0.8,
                0.8,
                &p.present,
            ));
        }
        tracing::debug!(
            materials = out.len(),
            rocky_ratio = p.rocky_ratio,
            "material catalog generated"
        );
        MaterialCatalog::new(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_of(biome: Biome, n: u16) -> WorldGrid {
        WorldGrid::new(n, n, 1, vec![biome as u8; n as usize * n as usize])
    }

    #[test]
    fn base_set_always_present() {
        let catalog = MaterialCatalogGenerator::generate(&grid_of(Biome::Grassland, 4)).unwrap();
        for id in ["wood", "stone", "clay", "charcoal"] {
            assert!(catalog.contains(id), "missing {id}");
        }
        assert!(!catalog.contains("iron_ore"));
        assert!(!catalog.contains("obsidian"));
    }

    #[test]
    fn iron_requires_rocky_ratio() {
        let catalog = MaterialCatalogGenerator::generate(&grid_of(Biome::Mountain, 4)).unwrap();
        assert!(catalog.contains("iron_ore"));
        assert!(catalog.contains("iron_ingot"));
    }

    #[test]
    fn entries_are_sorted_and_unique() {
        let catalog = MaterialCatalogGenerator::generate(&grid_of(Biome::Mountain, 4)).unwrap();
        let ids: Vec<&str> = catalog.entries().iter().map(|m| m.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn allowed_biomes_fall_back_to_grassland() {
        let catalog = MaterialCatalogGenerator::generate(&grid_of(Biome::Desert, 4)).unwrap();
        let wood = catalog.get("wood").unwrap();
        assert_eq!(wood.allowed_biomes, vec![Biome::Grassland]);
    }
}
