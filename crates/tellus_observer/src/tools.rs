//! Read-only tool routing over the knowledge pack.
//!
//! Every tool is a deterministic projection; a failed invocation returns
//! a structured error and never mutates anything.

use crate::pack::WorldKnowledgePack;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub ok: bool,
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    fn ok(tool: &str, data: Value) -> Self {
        Self {
            ok: true,
            tool: tool.to_string(),
            data: Some(data),
            error: None,
        }
    }

    fn err(tool: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            tool: tool.to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

pub const TOOL_NAMES: [&str; 15] = [
    "getWorldSummary",
    "getTopSpecies",
    "getSpecies",
    "getSpeciesLineage",
    "getCreature",
    "searchCreatures",
    "getCiv",
    "listCivs",
    "getTerritory",
    "listActiveEvents",
    "getEvent",
    "listEras",
    "getEra",
    "queryRegion",
    "getRecentLogs",
];

pub struct ToolRouter {
    pack: WorldKnowledgePack,
}

impl ToolRouter {
    pub fn new(pack: WorldKnowledgePack) -> Self {
        Self { pack }
    }

    pub fn pack(&self) -> &WorldKnowledgePack {
        &self.pack
    }

    pub fn call_tool(&self, name: &str, input: &Value) -> ToolResult {
        match name {
            "getWorldSummary" => ToolResult::ok(name, json!(self.pack.snapshot.world)),
            "getTopSpecies" => {
                let limit = read_usize(input, "limit").unwrap_or(5);
                let mut species = self.pack.species.clone();
                species.sort_by(|a, b| b.population.cmp(&a.population));
                species.truncate(limit);
                ToolResult::ok(name, json!(species))
            }
            "getSpecies" => match self.find_species(input) {
                Some(s) => ToolResult::ok(name, json!(s)),
                None => ToolResult::err(name, "species not found"),
            },
            "getSpeciesLineage" => match self.find_species(input) {
                // Lineage depth lives in the ecosystem layer; the pack
                // exposes the species itself plus any factions it founded.
                Some(s) => {
                    let factions: Vec<&str> = self
                        .pack
                        .snapshot
                        .factions
                        .iter()
                        .filter(|f| f.dominant_species_id == s.species_id)
                        .map(|f| f.id.as_str())
                        .collect();
                    ToolResult::ok(
                        name,
                        json!({ "species": s, "factions": factions }),
                    )
                }
                None => ToolResult::err(name, "species not found"),
            },
            "getCreature" => {
                let Some(id) = read_str(input, "id") else {
                    return ToolResult::err(name, "missing id");
                };
                for members in self.pack.snapshot.members.values() {
                    if let Some(m) = members.iter().find(|m| m.id == id) {
                        return ToolResult::ok(name, json!(m));
                    }
                }
                ToolResult::err(name, "creature not found")
            }
            "searchCreatures" => {
                let role = read_str(input, "role");
                let faction = read_str(input, "factionId");
                let limit = read_usize(input, "limit").unwrap_or(20);
                let mut out = Vec::new();
                for (fid, members) in &self.pack.snapshot.members {
                    if faction.as_deref().is_some_and(|f| f != fid) {
                        continue;
                    }
                    for m in members {
                        if role.as_deref().is_some_and(|r| r != m.role) {
                            continue;
                        }
                        out.push(m.clone());
                        if out.len() >= limit {
                            break;
                        }
                    }
                }
                out.truncate(limit);
                ToolResult::ok(name, json!(out))
            }
            "getCiv" => {
                let Some(id) = read_str(input, "id") else {
                    return ToolResult::err(name, "missing id");
                };
                match self.pack.snapshot.factions.iter().find(|f| f.id == id) {
                    Some(f) => ToolResult::ok(name, json!(f)),
                    None => ToolResult::err(name, "civilization not found"),
                }
            }
            "listCivs" => ToolResult::ok(name, json!(self.pack.snapshot.factions)),
            "getTerritory" => ToolResult::ok(
                name,
                json!({
                    "version": self.pack.snapshot.territory_version,
                    "overlay": self.pack.snapshot.territory_overlay,
                }),
            ),
            "listActiveEvents" => {
                ToolResult::ok(name, json!(self.pack.snapshot.world.active_events))
            }
            "getEvent" => {
                let Some(id) = read_str(input, "id") else {
                    return ToolResult::err(name, "missing id");
                };
                match self
                    .pack
                    .snapshot
                    .world
                    .active_events
                    .iter()
                    .find(|e| e.id == id)
                {
                    Some(e) => ToolResult::ok(name, json!(e)),
                    None => ToolResult::err(name, "event not found"),
                }
            }
            "listEras" => ToolResult::ok(name, json!(self.pack.eras())),
            "getEra" => {
                let Some(id) = read_usize(input, "id") else {
                    return ToolResult::err(name, "missing id");
                };
                match self.pack.eras().into_iter().find(|e| e.id == id as u64) {
                    Some(e) => ToolResult::ok(name, json!(e)),
                    None => ToolResult::err(name, "era not found"),
                }
            }
            "queryRegion" => {
                let x = read_usize(input, "x").unwrap_or(0) as u16;
                let y = read_usize(input, "y").unwrap_or(0) as u16;
                let w = read_usize(input, "width").unwrap_or(8) as u16;
                let h = read_usize(input, "height").unwrap_or(8) as u16;
                if x >= self.pack.width || y >= self.pack.height {
                    return ToolResult::err(name, "region out of bounds");
                }
                ToolResult::ok(name, json!(self.pack.region_stats(x, y, w, h)))
            }
            "getRecentLogs" => {
                let limit = read_usize(input, "limit").unwrap_or(20);
                let offset = read_usize(input, "offset").unwrap_or(0);
                let timeline = &self.pack.snapshot.timeline;
                let entries: Vec<_> = timeline
                    .iter()
                    .rev()
                    .skip(offset)
                    .take(limit)
                    .cloned()
                    .collect();
                ToolResult::ok(name, json!(entries))
            }
            _ => ToolResult::err(name, format!("unknown tool: {name}")),
        }
    }

    fn find_species(&self, input: &Value) -> Option<&tellus_data::SpeciesStat> {
        let id = read_str(input, "id")?;
        self.pack.species.iter().find(|s| s.species_id == id)
    }
}

fn read_str(input: &Value, key: &str) -> Option<String> {
    input.get(key).and_then(Value::as_str).map(str::to_string)
}

fn read_usize(input: &Value, key: &str) -> Option<usize> {
    input.get(key).and_then(Value::as_u64).map(|v| v as usize)
}
