//! Gzip'd JSON save/load of the full simulation state.
//!
//! The persisted layout is plain data only: the world grid's byte fields
//! serialize as ordinary integer arrays, influence maps as float arrays,
//! and every id reference stays a string. Hydration refuses corrupt
//! state instead of building a partial system.

use crate::error::{IoError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tellus_core::civ::CivState;
use tellus_core::genesis::GenesisOutcome;
use tellus_core::CivSystem;
use tellus_data::WorldGrid;

/// Everything needed to resume a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    pub world: WorldGrid,
    pub civ: CivState,
    pub genesis: Option<GenesisOutcome>,
}

impl SaveState {
    pub fn capture(world: &WorldGrid, civ: &CivSystem, genesis: Option<&GenesisOutcome>) -> Self {
        Self {
            world: world.clone(),
            civ: civ.export_state(),
            genesis: genesis.cloned(),
        }
    }

    /// Rebuilds the live system; catalogs are regenerated from the grid.
    pub fn restore(self) -> Result<(WorldGrid, CivSystem, Option<GenesisOutcome>)> {
        let world = self.world;
        if world.tiles.len() != world.len()
            || world.fertility.len() != world.len()
            || world.hazard.len() != world.len()
        {
            return Err(IoError::CorruptState(
                "grid field lengths disagree with dimensions".to_string(),
            ));
        }
        let civ = CivSystem::hydrate_state(self.civ, &world)
            .map_err(|e| IoError::CorruptState(e.to_string()))?;
        Ok((world, civ, self.genesis))
    }
}

pub fn save_state<P: AsRef<Path>>(state: &SaveState, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    let json = serde_json::to_string(state)?;
    encoder.write_all(json.as_bytes())?;
    encoder.finish()?;
    tracing::info!(path = %path.as_ref().display(), tick = state.world.tick, "state saved");
    Ok(())
}

pub fn load_state<P: AsRef<Path>>(path: P) -> Result<SaveState> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::NotFound(path.display().to_string()));
    }
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(file);
    let mut decoded = Vec::new();
    if decoder.read_to_end(&mut decoded).is_ok() {
        Ok(serde_json::from_slice(&decoded)?)
    } else {
        // Fall back to uncompressed JSON.
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}
