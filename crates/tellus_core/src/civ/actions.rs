//! Goal resolution: the per-tick action an agent performs, its side
//! effects, and the plan/reward bookkeeping that follows.

use super::{CivSystem, DIALOGUE_CAP, LiveEvent, NOTES_CAP};
use crate::cognition::{DecisionSystem, DialogueActionBinding, IntentionSystem};
use crate::communication;
use tellus_data::{
    Concept, DialogueRecord, Goal, Note, RelationStatus, StepAction, StructureBlueprint,
    TimelineKind, WorldGrid,
};

/// What one resolved action reports back to the pipeline.
struct ActionOutcome {
    success: bool,
    progress: u32,
    reward: f64,
}

impl ActionOutcome {
    fn new(success: bool, progress: u32, reward: f64) -> Self {
        Self {
            success,
            progress,
            reward,
        }
    }

    fn failed() -> Self {
        Self::new(false, 0, -0.02)
    }
}

impl CivSystem {
    /// Resolves the agent's current goal and applies plan/reward
    /// bookkeeping.
    pub(crate) fn perform_goal(
        &mut self,
        world: &mut WorldGrid,
        i: usize,
        fi: usize,
        live_events: &mut Vec<LiveEvent>,
    ) {
        self.refresh_fallback_goal(world, i, fi);

        let goal = {
            let agent = &self.agents[i];
            match agent.active_plan.as_ref().and_then(|p| p.step()) {
                Some(step) => step.goal,
                None => agent.current_goal,
            }
        };
        {
            let agent = &mut self.agents[i];
            agent.current_goal = goal;
        }

        let outcome = match goal {
            Goal::Gather => self.act_gather(world, i, fi),
            Goal::Farm => self.act_farm(world, i),
            Goal::Build => self.act_build(world, i, fi),
            Goal::PickItem => self.act_pick_item(i, fi),
            Goal::UseItem => self.act_use_item(i),
            Goal::CraftItem => self.act_craft_item(i, fi),
            Goal::EquipItem => self.act_equip_item(i, fi),
            Goal::Talk => self.act_talk(i, fi),
            Goal::Trade => self.act_trade(i, fi, live_events),
            Goal::Defend => self.act_defend(i),
            Goal::Write => self.act_write(i, fi, live_events),
            Goal::Worship => self.act_worship(i),
            Goal::Explore => self.act_explore(world, i),
        };

        // Rewards feed both learned tables.
        {
            let agent = &mut self.agents[i];
            let intent = agent.current_intent;
            IntentionSystem::apply_reward(agent, intent, outcome.reward);
            DecisionSystem::apply_reward(agent, goal, outcome.reward);
        }

        self.advance_plan(i, &outcome);
    }

    /// Plan step completion rules: movement completes on arrival, work
    /// completes on elapsed+success, and everything force-completes two
    /// ticks past its budget.
    fn advance_plan(&mut self, i: usize, outcome: &ActionOutcome) {
        let agent = &mut self.agents[i];
        let Some(plan) = agent.active_plan.as_mut() else {
            return;
        };
        let (ax, ay) = (agent.x, agent.y);
        let mut finished_plan = false;
        if let Some(step) = plan.step_mut() {
            // Movement elapses in real ticks; work elapses by the action's
            // reported progress.
            step.elapsed_ticks += match step.action {
                StepAction::Move => 1,
                StepAction::Work => outcome.progress.max(1),
            };
            let done = match step.action {
                StepAction::Move => (ax, ay) == (step.target_x, step.target_y),
                StepAction::Work => {
                    step.elapsed_ticks >= step.required_ticks && outcome.success
                }
            };
            let stalled = step.elapsed_ticks >= step.required_ticks + 2;
            if done || stalled {
                finished_plan = !plan.advance();
            }
        } else {
            finished_plan = true;
        }
        if finished_plan {
            agent.active_plan = None;
        }
    }

    // ------------------------------------------------------------------
    // Individual actions.
    // ------------------------------------------------------------------

    fn act_gather(&mut self, world: &mut WorldGrid, i: usize, fi: usize) -> ActionOutcome {
        let (ax, ay) = (self.agents[i].x, self.agents[i].y);
        if self.nodes.node_at(ax, ay).is_some() {
            let (tool_tags, power) = {
                let agent = &self.agents[i];
                let tags: Vec<String> = agent
                    .equipped_item_id
                    .as_deref()
                    .and_then(|id| self.items.get(id))
                    .map(|item| item.tool_tags.clone())
                    .unwrap_or_default();
                let power = if tags.is_empty() { 1.0 } else { 2.0 };
                (tags, power)
            };
            let harvest = self.nodes.harvest_at(ax, ay, &tool_tags, power);
            if !harvest.ok {
                return ActionOutcome::failed();
            }
            if let Some(material_id) = harvest.material_id {
                let unit_weight = self.items.unit_weight(&material_id);
                let agent = &mut self.agents[i];
                let accepted =
                    agent.put_item(&material_id, harvest.harvested_amount, unit_weight);
                let overflow = harvest.harvested_amount - accepted;
                let faction = &mut self.factions[fi];
                faction.deposit_item(&material_id, overflow);
                let faction_id = faction.id.clone();
                self.crafting.note_seen(&faction_id, &material_id);
            }
            return ActionOutcome::new(true, 2, 0.12);
        }

        // Foraging on a plain tile.
        if !world.is_land(ax, ay) {
            return ActionOutcome::failed();
        }
        let idx = world.index(ax, ay);
        let fertility = world.fertility[idx] as f64 / 255.0;
        let gain = 1.5 + fertility * 1.8;
        world.fertility[idx] = world.fertility[idx].saturating_sub(1);
        self.agents[i].energy += gain;
        self.factions[fi].stockpile.food += gain * 0.5;
        ActionOutcome::new(true, 1, 0.04)
    }

    fn act_farm(&mut self, world: &mut WorldGrid, i: usize) -> ActionOutcome {
        let (ax, ay) = (self.agents[i].x, self.agents[i].y);
        let idx = world.index(ax, ay);
        if world.fertility[idx] == 0 {
            return ActionOutcome::failed();
        }
        let fertility = world.fertility[idx] as f64 / 255.0;
        self.agents[i].energy += 2.1 + 2.2 / 3.5 * fertility;
        ActionOutcome::new(true, 2, 0.11)
    }

    fn act_build(&mut self, world: &WorldGrid, i: usize, fi: usize) -> ActionOutcome {
        if !self.rng.chance(0.22) {
            return ActionOutcome::new(false, 1, 0.0);
        }
        let (blueprint, x, y) = {
            let agent = &self.agents[i];
            let blueprint = agent
                .active_plan
                .as_ref()
                .and_then(|p| p.step())
                .and_then(|s| s.blueprint)
                .unwrap_or(StructureBlueprint::Hut);
            (blueprint, agent.x as i32, agent.y as i32)
        };
        let faction_id = self.factions[fi].id.clone();
        let tick = self.tick_count;
        let outcome = {
            let stockpile = &mut self.factions[fi].stockpile;
            self.buildings
                .request_build(world, blueprint, x, y, &faction_id, stockpile, tick)
        };
        if !outcome.ok {
            return ActionOutcome::failed();
        }
        self.push_timeline(
            TimelineKind::Construction,
            Some(faction_id),
            format!("Work begins on a {} at ({x}, {y}).", blueprint.label()),
        );
        ActionOutcome::new(true, 2, 0.14)
    }

    fn act_pick_item(&mut self, i: usize, fi: usize) -> ActionOutcome {
        let (ax, ay) = (self.agents[i].x, self.agents[i].y);
        let Some(stack_idx) = self.stack_near(ax, ay, 1) else {
            return ActionOutcome::failed();
        };
        let (item_id, available) = {
            let stack = &self.ground_items[stack_idx];
            (stack.item_id.clone(), stack.quantity)
        };
        let unit_weight = self.items.unit_weight(&item_id);
        let accepted = self.agents[i].put_item(&item_id, available, unit_weight);
        if accepted == 0 {
            return ActionOutcome::failed();
        }
        self.take_from_stack(stack_idx, accepted);
        let faction_id = self.factions[fi].id.clone();
        self.crafting.note_seen(&faction_id, &item_id);
        ActionOutcome::new(true, 1, 0.07)
    }

    /// Food is eaten, tools and weapons are equipped.
    fn act_use_item(&mut self, i: usize) -> ActionOutcome {
        let pick = {
            let agent = &self.agents[i];
            let mut food: Option<(String, f64)> = None;
            let mut equipable: Option<String> = None;
            for (item_id, _) in agent.item_inventory.iter() {
                if let Some(def) = self.items.get(item_id) {
                    if let Some(nutrition) = def.base_properties.nutrition {
                        if food.as_ref().map(|(_, n)| nutrition > *n).unwrap_or(true) {
                            food = Some((item_id.clone(), nutrition));
                        }
                    } else if self.items.is_equipable(item_id)
                        && agent.equipped_item_id.is_none()
                        && equipable.is_none()
                    {
                        equipable = Some(item_id.clone());
                    }
                }
            }
            if agent.hunger > 0.3 {
                food.map(|(id, n)| (id, Some(n))).or(equipable.map(|id| (id, None)))
            } else {
                equipable.map(|id| (id, None)).or(food.map(|(id, n)| (id, Some(n))))
            }
        };
        let Some((item_id, nutrition)) = pick else {
            return ActionOutcome::failed();
        };
        let unit_weight = self.items.unit_weight(&item_id);
        let agent = &mut self.agents[i];
        match nutrition {
            Some(nutrition) => {
                if agent.take_item(&item_id, 1, unit_weight) == 0 {
                    return ActionOutcome::failed();
                }
                agent.energy += nutrition;
                agent.set_hydration(agent.hydration + 2.0);
            }
            None => {
                agent.equipped_item_id = Some(item_id.clone());
                agent.equipment_slots.main_hand = Some(item_id);
            }
        }
        ActionOutcome::new(true, 1, 0.05)
    }

    fn act_craft_item(&mut self, i: usize, fi: usize) -> ActionOutcome {
        let faction_id = self.factions[fi].id.clone();
        let tech_level = self.factions[fi].tech_level;
        let outcome = {
            let agent = &mut self.agents[i];
            self.crafting.attempt_craft(
                &faction_id,
                tech_level,
                &mut agent.item_inventory,
                &self.items,
                &mut self.rng,
            )
        };
        if !outcome.ok {
            return ActionOutcome::failed();
        }
        let Some(result_id) = outcome.result_item_id else {
            return ActionOutcome::failed();
        };
        // attempt_craft consumed inputs from the raw map; rebuild the
        // carry weight, then store the product (overflow to the faction).
        let unit_weight = self.items.unit_weight(&result_id);
        {
            let agent = &mut self.agents[i];
            agent.current_carry_weight = agent
                .item_inventory
                .iter()
                .map(|(id, qty)| self.items.unit_weight(id) * f64::from(*qty))
                .sum();
            let accepted = agent.put_item(&result_id, outcome.produced, unit_weight);
            let overflow = outcome.produced - accepted;
            if overflow > 0 {
                self.factions[fi].deposit_item(&result_id, overflow);
            }
            if agent.equipped_item_id.is_none() && self.items.is_equipable(&result_id) {
                agent.equipped_item_id = Some(result_id.clone());
                agent.equipment_slots.main_hand = Some(result_id.clone());
            }
        }
        self.crafting.note_seen(&faction_id, &result_id);
        ActionOutcome::new(true, 2, 0.12)
    }

    fn act_equip_item(&mut self, i: usize, fi: usize) -> ActionOutcome {
        // Prefer own inventory; fall back to one unit from the faction
        // stores.
        let own_pick = {
            let agent = &self.agents[i];
            agent
                .item_inventory
                .keys()
                .find(|id| self.items.is_equipable(id))
                .cloned()
        };
        if let Some(item_id) = own_pick {
            let agent = &mut self.agents[i];
            agent.equipped_item_id = Some(item_id.clone());
            agent.equipment_slots.main_hand = Some(item_id);
            return ActionOutcome::new(true, 1, 0.04);
        }

        let faction_pick = self.factions[fi]
            .item_inventory
            .keys()
            .find(|id| self.items.is_equipable(id))
            .cloned();
        let Some(item_id) = faction_pick else {
            return ActionOutcome::failed();
        };
        let unit_weight = self.items.unit_weight(&item_id);
        if self.agents[i].put_item(&item_id, 1, unit_weight) == 0 {
            return ActionOutcome::failed();
        }
        self.factions[fi].withdraw_item(&item_id, 1);
        let agent = &mut self.agents[i];
        agent.equipped_item_id = Some(item_id.clone());
        agent.equipment_slots.main_hand = Some(item_id);
        ActionOutcome::new(true, 1, 0.04)
    }

    fn act_talk(&mut self, i: usize, fi: usize) -> ActionOutcome {
        let partner = {
            let agent = &self.agents[i];
            self.agents_near(agent.x, agent.y, 3)
                .into_iter()
                .find(|&j| j != i && self.agents[j].faction_id == agent.faction_id)
        };
        let Some(j) = partner else {
            return ActionOutcome::failed();
        };

        let tick = self.tick_count;
        let (speaker_a, speaker_b, goal) = {
            let a = &self.agents[i];
            let b = &self.agents[j];
            (a.id.clone(), b.id.clone(), a.current_goal)
        };
        let tokens = {
            let faction = &self.factions[fi];
            communication::compose_utterance(
                &faction.communication,
                &[Concept::Food, Concept::Shelter, Concept::Trade],
                &mut self.rng,
            )
        };
        let line = DialogueActionBinding::line_for(goal, &speaker_a, &speaker_b, &mut self.rng);

        let dialogue_id = self.next_id("dlg");
        let faction_id = self.factions[fi].id.clone();
        self.dialogues.push_back(DialogueRecord {
            id: dialogue_id.clone(),
            faction_id: faction_id.clone(),
            speaker_a: speaker_a.clone(),
            speaker_b: speaker_b.clone(),
            tick,
            utterance_tokens: tokens.clone(),
            line_template: line,
            gloss: None,
            tone: None,
        });
        while self.dialogues.len() > DIALOGUE_CAP {
            self.dialogues.pop_front();
        }

        self.agents[i].mental_state.last_talk_tick = tick;
        self.factions[fi].last_dialogue_tick = tick;
        self.enqueue_dialogue_request(&dialogue_id, fi, &speaker_a, &speaker_b, goal, tokens);
        ActionOutcome::new(true, 1, 0.08)
    }

    /// Trade exchanges food for stone with the best-trusted partner
    /// faction, moves one item, and lets tokens travel along.
    fn act_trade(
        &mut self,
        i: usize,
        fi: usize,
        _live_events: &mut Vec<LiveEvent>,
    ) -> ActionOutcome {
        if self.factions.len() < 2 {
            return ActionOutcome::failed();
        }
        let partner_fi = {
            let faction = &self.factions[fi];
            let mut best: Option<(usize, f64)> = None;
            for (j, other) in self.factions.iter().enumerate() {
                if j == fi {
                    continue;
                }
                let trust = faction.relation(&other.id).trust;
                if best.map(|(_, t)| trust > t).unwrap_or(true) {
                    best = Some((j, trust));
                }
            }
            match best {
                Some((j, _)) => j,
                None => return ActionOutcome::failed(),
            }
        };

        // The initiator hands over surplus food and receives stone plus
        // the partner's best spare item.
        let (lo, hi) = (fi.min(partner_fi), fi.max(partner_fi));
        let (left, right) = self.factions.split_at_mut(hi);
        let (me, other) = if fi < partner_fi {
            (&mut left[lo], &mut right[0])
        } else {
            (&mut right[0], &mut left[lo])
        };
        let food_give = (me.stockpile.food * 0.1).min(6.0);
        let stone_give = (other.stockpile.stone * 0.1).min(4.0);
        me.stockpile.food -= food_give;
        other.stockpile.food += food_give;
        other.stockpile.stone -= stone_give;
        me.stockpile.stone += stone_give;

        let best_item = other.item_inventory.keys().next().cloned();
        if let Some(item_id) = best_item {
            if other.withdraw_item(&item_id, 1) > 0 {
                me.deposit_item(&item_id, 1);
            }
        }

        let intensity = {
            let rel = me.relations.entry(other.id.clone()).or_default();
            rel.status = RelationStatus::Trade;
            rel.trust = (rel.trust + 0.02).min(1.0);
            rel.intensity
        };
        let rel = other.relations.entry(me.id.clone()).or_default();
        rel.status = RelationStatus::Trade;
        rel.trust = (rel.trust + 0.02).min(1.0);

        // Language borrowing rides on contact intensity.
        let tick = self.tick_count;
        let donor = other.communication.clone();
        communication::borrow(&mut me.communication, &donor, intensity, tick, &mut self.rng);

        ActionOutcome::new(true, 2, 0.08)
    }

    fn act_defend(&mut self, i: usize) -> ActionOutcome {
        let agent = &mut self.agents[i];
        agent.mental_state.stress_level =
            (agent.mental_state.stress_level - 0.03).max(0.0);
        agent.hazard_stress = (agent.hazard_stress - 0.02).max(0.0);
        ActionOutcome::new(true, 1, 0.06)
    }

    fn act_write(
        &mut self,
        i: usize,
        fi: usize,
        live_events: &mut Vec<LiveEvent>,
    ) -> ActionOutcome {
        let (literacy, faction_id) = {
            let faction = &self.factions[fi];
            (faction.literacy_level, faction.id.clone())
        };
        let role_ok = matches!(
            self.agents[i].role,
            tellus_data::Role::Scribe | tellus_data::Role::Leader
        );
        if literacy < 2 || !role_ok {
            return ActionOutcome::failed();
        }
        if !self
            .rng
            .chance(0.06 + 0.02 * f64::from(literacy))
        {
            return ActionOutcome::new(false, 1, 0.0);
        }

        let tokens = communication::compose_utterance(
            &self.factions[fi].communication,
            &[Concept::Law, Concept::Earth, Concept::God],
            &mut self.rng,
        );
        let note_id = self.next_id("note");
        let (author_id, x, y) = {
            let agent = &self.agents[i];
            (agent.id.clone(), agent.x, agent.y)
        };
        self.notes.push(Note {
            id: note_id.clone(),
            author_id,
            faction_id: faction_id.clone(),
            created_at_tick: self.tick_count,
            token_content: tokens.join(" "),
            translated_content: None,
            x,
            y,
        });
        while self.notes.len() > NOTES_CAP {
            self.notes.remove(0);
        }
        self.factions[fi]
            .writing
            .writing_artifacts
            .push(note_id.clone());
        self.push_timeline(
            TimelineKind::Writing,
            Some(faction_id.clone()),
            format!("A note is inscribed at ({x}, {y})."),
        );
        live_events.push(LiveEvent::NoteWritten {
            faction_id,
            note_id,
            tick: self.tick_count,
        });
        ActionOutcome::new(true, 2, 0.13)
    }

    fn act_worship(&mut self, i: usize) -> ActionOutcome {
        let agent = &mut self.agents[i];
        agent.mental_state.stress_level =
            (agent.mental_state.stress_level - 0.01).max(0.0);
        ActionOutcome::new(true, 1, 0.02)
    }

    fn act_explore(&mut self, world: &WorldGrid, i: usize) -> ActionOutcome {
        // Exploration succeeds by covering ground; knowledge reveal
        // happened earlier in the pipeline.
        let agent = &self.agents[i];
        let on_land = world.is_land(agent.x, agent.y);
        ActionOutcome::new(on_land, 1, if on_land { 0.03 } else { -0.02 })
    }
}
