//! Diplomatic dynamics and the periodic culture/territory/ethnicity/
//! identity passes, plus narrative trigger emission.

use super::{CivSystem, LiveEvent, RELATION_SERIES_CAP};
use crate::culture::{CulturalEvolutionSystem, CulturePressures};
use crate::identity::{EthnicitySystem, IdentityEvolutionSystem, MemberView};
use crate::narrative::NarrativeRequest;
use crate::territory::{AgentStamp, FactionTerritoryInput, StructureStamp};
use tellus_data::{Goal, RelationPoint, RelationStatus, TimelineKind, WorldGrid};

const WAR_SIGNAL_THRESHOLD: f64 = 0.66;
const WAR_CHANCE: f64 = 0.09;

fn pair_key(a: &str, b: &str) -> String {
    if a < b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

impl CivSystem {
    /// The 30-tick diplomacy pass over every unordered faction pair.
    pub(crate) fn pass_relations(&mut self, live_events: &mut Vec<LiveEvent>) {
        let tick = self.tick_count;
        let n = self.factions.len();
        for ai in 0..n {
            for bi in (ai + 1)..n {
                self.drift_pair(ai, bi, live_events);
            }
        }

        // Sample relation history per pair.
        for ai in 0..n {
            for bi in (ai + 1)..n {
                let (a_id, b_id) = (self.factions[ai].id.clone(), self.factions[bi].id.clone());
                let relation = self.factions[ai].relation(&b_id);
                let series = self
                    .relation_series
                    .entry(pair_key(&a_id, &b_id))
                    .or_default();
                series.push(RelationPoint {
                    tick,
                    trust: relation.trust,
                    tension: relation.tension,
                });
                if series.len() > RELATION_SERIES_CAP {
                    let excess = series.len() - RELATION_SERIES_CAP;
                    series.drain(..excess);
                }
            }
        }
    }

    fn drift_pair(&mut self, ai: usize, bi: usize, live_events: &mut Vec<LiveEvent>) {
        let tick = self.tick_count;
        let (a_id, b_id) = (self.factions[ai].id.clone(), self.factions[bi].id.clone());

        // Symmetric drift toward the neutral point.
        for (fi, other) in [(ai, b_id.clone()), (bi, a_id.clone())] {
            let relation = self.factions[fi].relations.entry(other).or_default();
            relation.trust += (0.5 - relation.trust) * 0.02;
            relation.tension += (0.28 - relation.tension) * 0.02;
        }

        let war_signal = {
            let a = &self.factions[ai];
            let rel = a.relation(&b_id);
            a.culture.aggression * 0.55 + a.stress * 0.25 + rel.tension * 0.2
        };
        if war_signal > WAR_SIGNAL_THRESHOLD && self.rng.chance(WAR_CHANCE) {
            for (fi, other) in [(ai, b_id.clone()), (bi, a_id.clone())] {
                let relation = self.factions[fi].relations.entry(other).or_default();
                relation.status = RelationStatus::Hostile;
                relation.trust = (relation.trust - 0.06).max(0.0);
                relation.tension = (relation.tension + 0.08).min(1.0);
            }
            self.factions[ai].significant_events += 1;
            self.factions[bi].significant_events += 1;
            self.push_timeline(
                TimelineKind::War,
                Some(a_id.clone()),
                format!("Hostility breaks out between {a_id} and {b_id}."),
            );
            live_events.push(LiveEvent::WarDeclared {
                aggressor_id: a_id.clone(),
                defender_id: b_id.clone(),
                tick,
            });
            return;
        }

        // Reconciliation and alliance transitions.
        let rel = self.factions[ai].relation(&b_id);
        let next_status = match rel.status {
            RelationStatus::Hostile if rel.tension < 0.32 && rel.trust > 0.44 => {
                Some(RelationStatus::Neutral)
            }
            RelationStatus::Trade if rel.trust > 0.66 && rel.tension < 0.28 => {
                Some(RelationStatus::Ally)
            }
            _ => None,
        };
        if let Some(status) = next_status {
            for (fi, other) in [(ai, b_id.clone()), (bi, a_id.clone())] {
                self.factions[fi]
                    .relations
                    .entry(other)
                    .or_default()
                    .status = status;
            }
            match status {
                RelationStatus::Neutral => {
                    self.push_timeline(
                        TimelineKind::Peace,
                        Some(a_id.clone()),
                        format!("{a_id} and {b_id} set aside their feud."),
                    );
                    live_events.push(LiveEvent::Reconciliation {
                        a: a_id,
                        b: b_id,
                        tick,
                    });
                }
                RelationStatus::Ally => {
                    self.push_timeline(
                        TimelineKind::Alliance,
                        Some(a_id.clone()),
                        format!("{a_id} and {b_id} bind themselves as allies."),
                    );
                    live_events.push(LiveEvent::AllianceFormed {
                        a: a_id,
                        b: b_id,
                        tick,
                    });
                }
                _ => {}
            }
        }
    }

    /// The 60-tick culture pass; derives pressure inputs from the live
    /// state.
    pub(crate) fn pass_culture(&mut self, world: &WorldGrid, live_events: &mut Vec<LiveEvent>) {
        let tick = self.tick_count;
        let world_cells = world.len().max(1);
        for fi in 0..self.factions.len() {
            let pressures = {
                let faction = &self.factions[fi];
                let population = faction.members.len().max(1) as f64;
                let scarcity = (1.0 - faction.stockpile.food / (population * 4.0)).clamp(0.0, 1.0);
                let mut tension_sum = 0.0;
                let mut hostile = 0usize;
                let mut pairs = 0usize;
                for other in &self.factions {
                    if other.id == faction.id {
                        continue;
                    }
                    let rel = faction.relation(&other.id);
                    tension_sum += rel.tension;
                    pairs += 1;
                    if rel.status == RelationStatus::Hostile {
                        hostile += 1;
                    }
                }
                let external_pressure = if pairs == 0 {
                    0.0
                } else {
                    tension_sum / pairs as f64
                };
                let war_pressure = if pairs == 0 {
                    0.0
                } else {
                    hostile as f64 / pairs as f64
                };
                let home = (faction.home_center.x, faction.home_center.y);
                let mut hazard_sum = 0.0;
                let mut count = 0usize;
                for dy in -4i32..=4 {
                    for dx in -4i32..=4 {
                        let (x, y) = (home.0 as i32 + dx, home.1 as i32 + dy);
                        if world.in_bounds(x, y) {
                            hazard_sum += world.hazard01(x as u16, y as u16);
                            count += 1;
                        }
                    }
                }
                let disaster_pressure = (hazard_sum / count.max(1) as f64 * 2.0).clamp(0.0, 1.0);
                let claimed = self.territory.claimed_count(&faction.id);
                CulturePressures {
                    scarcity,
                    external_pressure,
                    disaster_pressure,
                    war_pressure,
                    territory_claim_ratio: claimed as f64 / world_cells as f64 * 8.0,
                }
            };

            let member_positions: Vec<(u16, u16)> = self.factions[fi]
                .members
                .iter()
                .filter_map(|id| self.agent_index.get(id))
                .map(|&i| (self.agents[i].x, self.agents[i].y))
                .collect();

            let relocation = CulturalEvolutionSystem::step(
                &mut self.factions[fi],
                world,
                &pressures,
                &member_positions,
                tick,
                &mut self.rng,
            );
            if let Some(moved) = relocation {
                let faction_id = self.factions[fi].id.clone();
                self.push_timeline(
                    TimelineKind::Migration,
                    Some(faction_id.clone()),
                    format!(
                        "The seat of {faction_id} moves to ({}, {}).",
                        moved.to.0, moved.to.1
                    ),
                );
                live_events.push(LiveEvent::CapitalMoved {
                    faction_id,
                    from: moved.from,
                    to: moved.to,
                    tick,
                });
            }

            // Faction stress tracks scarcity and conflict.
            let faction = &mut self.factions[fi];
            let stress_target = (pressures.scarcity * 0.4
                + pressures.war_pressure * 0.35
                + pressures.disaster_pressure * 0.25)
                .clamp(0.0, 1.0);
            faction.stress += 0.1 * (stress_target - faction.stress);
        }
    }

    /// The 12-tick territory pass.
    pub(crate) fn pass_territory(&mut self, world: &WorldGrid) {
        let inputs: Vec<FactionTerritoryInput> = self
            .factions
            .iter()
            .map(|faction| {
                let structures = self
                    .buildings
                    .structures_of(&faction.id)
                    .map(|s| StructureStamp {
                        x: s.x,
                        y: s.y,
                        structure_type: s.structure_type,
                        completed: s.completed,
                        progress: s.progress,
                    })
                    .collect();
                let agents = faction
                    .members
                    .iter()
                    .filter_map(|id| self.agent_index.get(id))
                    .map(|&i| {
                        let a = &self.agents[i];
                        AgentStamp {
                            x: a.x,
                            y: a.y,
                            energy: a.energy,
                            role: a.role,
                        }
                    })
                    .collect();
                FactionTerritoryInput {
                    faction_id: faction.id.clone(),
                    home: (faction.home_center.x, faction.home_center.y),
                    structures,
                    agents,
                }
            })
            .collect();
        self.territory.step(world, &inputs);
    }

    /// The 45-tick ethnicity pass.
    pub(crate) fn pass_ethnicity(&mut self, live_events: &mut Vec<LiveEvent>) {
        let tick = self.tick_count;
        for fi in 0..self.factions.len() {
            let members: Vec<(String, String, u16, u16)> = self.factions[fi]
                .members
                .iter()
                .filter_map(|id| self.agent_index.get(id))
                .map(|&i| {
                    let a = &self.agents[i];
                    (a.id.clone(), a.species_id.clone(), a.x, a.y)
                })
                .collect();
            let views: Vec<MemberView<'_>> = members
                .iter()
                .map(|(id, species, x, y)| MemberView {
                    agent_id: id,
                    species_id: species,
                    x: *x,
                    y: *y,
                })
                .collect();
            let existing = self.ethnicities.len();
            let next_id = self.counters.ethnicity + 1;
            let emerged = EthnicitySystem::try_emerge(
                &mut self.factions[fi],
                &views,
                existing,
                tick,
                next_id,
                &mut self.rng,
            );
            let Some((ethnicity, group)) = emerged else {
                continue;
            };
            self.counters.ethnicity = next_id;
            for agent_id in &group {
                if let Some(&idx) = self.agent_index.get(agent_id) {
                    self.agents[idx].ethnicity_id = Some(ethnicity.id.clone());
                }
            }
            let faction_id = self.factions[fi].id.clone();
            self.push_timeline(
                TimelineKind::Ethnicity,
                Some(faction_id.clone()),
                format!(
                    "A distinct people marked {} arises within {faction_id}.",
                    ethnicity.symbol
                ),
            );
            live_events.push(LiveEvent::EthnicityEmerged {
                faction_id,
                ethnicity_id: ethnicity.id.clone(),
                members: group.len(),
                tick,
            });
            self.ethnicities.push(ethnicity);
        }
    }

    /// The 30-tick identity pass: identity smoothing, naming triggers,
    /// religion emergence.
    pub(crate) fn pass_identity(
        &mut self,
        world: &WorldGrid,
        species: &[tellus_data::SpeciesStat],
        live_events: &mut Vec<LiveEvent>,
    ) {
        let tick = self.tick_count;
        for fi in 0..self.factions.len() {
            let territory_tiles = self.territory.claimed_count(&self.factions[fi].id);
            IdentityEvolutionSystem::step(&mut self.factions[fi], territory_tiles, &mut self.rng);

            if IdentityEvolutionSystem::ready_for_name(&self.factions[fi], territory_tiles) {
                let faction_id = self.factions[fi].id.clone();
                let request_id = format!("identity-{faction_id}");
                let world_summary = self.world_summary_text(world, species, fi);
                self.enqueue_request(NarrativeRequest::FactionIdentity {
                    id: request_id,
                    faction_id,
                    world_summary,
                });
            }

            let next_id = self.counters.religion + 1;
            let religion = IdentityEvolutionSystem::try_emerge_religion(
                &mut self.factions[fi],
                &self.religions,
                tick,
                next_id,
                &mut self.rng,
            );
            if let Some(religion) = religion {
                self.counters.religion = next_id;
                let faction_id = self.factions[fi].id.clone();
                self.push_timeline(
                    TimelineKind::Religion,
                    Some(faction_id.clone()),
                    format!(
                        "A faith takes root in {faction_id}: {}.",
                        religion.core_beliefs.join(", ")
                    ),
                );
                live_events.push(LiveEvent::ReligionFounded {
                    faction_id: faction_id.clone(),
                    religion_id: religion.id.clone(),
                    tick,
                });
                self.religions.push(religion);
                // Identity request follows a new faith.
                let request_id = format!("identity-religion-{faction_id}");
                let world_summary = self.world_summary_text(world, species, fi);
                self.enqueue_request(NarrativeRequest::FactionIdentity {
                    id: request_id,
                    faction_id,
                    world_summary,
                });
            }
        }
    }

    /// Chronicle requests for factions whose last chronicle is old enough.
    pub(crate) fn pass_narrative_triggers(&mut self) {
        let tick = self.tick_count;
        let due: Vec<usize> = self
            .factions
            .iter()
            .enumerate()
            .filter(|(_, f)| tick.saturating_sub(f.last_chronicle_tick) >= self.config.chronicle_interval)
            .map(|(i, _)| i)
            .collect();
        for fi in due {
            let faction_id = self.factions[fi].id.clone();
            let recent_logs: Vec<String> = self
                .timeline
                .iter()
                .rev()
                .filter(|t| t.faction_id.as_deref() == Some(faction_id.as_str()))
                .take(12)
                .map(|t| t.text.clone())
                .collect();
            let request_id = format!("chronicle-{faction_id}-{tick}");
            self.enqueue_request(NarrativeRequest::Chronicle {
                id: request_id,
                faction_id: faction_id.clone(),
                recent_logs,
            });
            self.factions[fi].last_chronicle_tick = tick;
        }
    }

    /// Compact textual summary used in identity request payloads.
    fn world_summary_text(
        &self,
        world: &WorldGrid,
        species: &[tellus_data::SpeciesStat],
        fi: usize,
    ) -> String {
        let faction = &self.factions[fi];
        let species_name = species
            .iter()
            .find(|s| s.species_id == faction.dominant_species_id)
            .map(|s| s.display_name().to_string())
            .unwrap_or_else(|| faction.dominant_species_id.clone());
        format!(
            "Tick {}: {} of {} members at ({}, {}), literacy {}, {} claimed tiles, world {}x{}.",
            self.tick_count,
            species_name,
            faction.members.len(),
            faction.home_center.x,
            faction.home_center.y,
            faction.literacy_level,
            self.territory.claimed_count(&faction.id),
            world.width,
            world.height
        )
    }

    /// Builds and enqueues the dialogue narrative request for a fresh
    /// dialogue record.
    pub(crate) fn enqueue_dialogue_request(
        &mut self,
        dialogue_id: &str,
        fi: usize,
        speaker_a: &str,
        speaker_b: &str,
        goal: Goal,
        tokens: Vec<String>,
    ) {
        let faction = &self.factions[fi];
        let recent: Vec<String> = self
            .dialogues
            .iter()
            .rev()
            .filter(|d| d.faction_id == faction.id)
            .take(4)
            .map(|d| d.utterance_tokens.join(" "))
            .collect();
        let lexicon = faction
            .communication
            .lexicon
            .iter()
            .map(|(c, t)| (c.label().to_string(), t.clone()))
            .collect();
        let request = NarrativeRequest::Dialogue {
            id: format!("dialogue-{dialogue_id}"),
            dialogue_id: dialogue_id.to_string(),
            faction_id: faction.id.clone(),
            speaker_a_name: speaker_a.to_string(),
            speaker_b_name: speaker_b.to_string(),
            context_summary: format!(
                "Members of {} at tick {}.",
                faction.id, self.tick_count
            ),
            action_context: crate::cognition::DialogueActionBinding::action_context(goal)
                .to_string(),
            utterance_tokens: tokens,
            recent_faction_utterances: recent,
            grammar_level: faction.communication.grammar_level,
            lexicon,
        };
        self.enqueue_request(request);
    }
}
