//! Narrative collaborator contract: requests the core enqueues and
//! responses it accepts back.
//!
//! The queue is FIFO with set-based id deduplication and a hard capacity;
//! the engine never blocks on the collaborator and stays fully functional
//! when responses never arrive.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Queue saturation bound; enqueues beyond it are refused.
const QUEUE_CAP: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrativeRequest {
    FactionIdentity {
        id: String,
        faction_id: String,
        world_summary: String,
    },
    Dialogue {
        id: String,
        dialogue_id: String,
        faction_id: String,
        speaker_a_name: String,
        speaker_b_name: String,
        context_summary: String,
        action_context: String,
        utterance_tokens: Vec<String>,
        recent_faction_utterances: Vec<String>,
        grammar_level: u8,
        lexicon: BTreeMap<String, String>,
    },
    Chronicle {
        id: String,
        faction_id: String,
        recent_logs: Vec<String>,
    },
}

impl NarrativeRequest {
    pub fn id(&self) -> &str {
        match self {
            NarrativeRequest::FactionIdentity { id, .. }
            | NarrativeRequest::Dialogue { id, .. }
            | NarrativeRequest::Chronicle { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrativeResponse {
    FactionIdentity {
        request_id: String,
        faction_id: String,
        name: String,
        motto: String,
        religion_name: Option<String>,
        core_laws: Vec<String>,
    },
    Dialogue {
        request_id: String,
        dialogue_id: String,
        gloss: String,
        tone: String,
        new_terms: Vec<String>,
    },
    Chronicle {
        request_id: String,
        faction_id: String,
        text: String,
    },
}

/// Outcome of an enqueue attempt; saturation is a structured refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueResult {
    Queued,
    Duplicate,
    Saturated,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrativeOutbox {
    queue: VecDeque<NarrativeRequest>,
    seen: HashSet<String>,
}

impl NarrativeOutbox {
    pub fn enqueue(&mut self, request: NarrativeRequest) -> EnqueueResult {
        if self.seen.contains(request.id()) {
            return EnqueueResult::Duplicate;
        }
        if self.queue.len() >= QUEUE_CAP {
            tracing::warn!(id = request.id(), "narrative queue saturated");
            return EnqueueResult::Saturated;
        }
        self.seen.insert(request.id().to_string());
        self.queue.push_back(request);
        EnqueueResult::Queued
    }

    /// Removes and returns up to `max` requests in FIFO order.
    pub fn drain(&mut self, max: usize) -> Vec<NarrativeRequest> {
        let take = max.min(self.queue.len());
        self.queue.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chronicle(id: &str) -> NarrativeRequest {
        NarrativeRequest::Chronicle {
            id: id.to_string(),
            faction_id: "fac-1".to_string(),
            recent_logs: vec![],
        }
    }

    #[test]
    fn duplicate_ids_are_refused() {
        let mut outbox = NarrativeOutbox::default();
        assert_eq!(outbox.enqueue(chronicle("r-1")), EnqueueResult::Queued);
        assert_eq!(outbox.enqueue(chronicle("r-1")), EnqueueResult::Duplicate);
        assert_eq!(outbox.len(), 1);
    }

    #[test]
    fn drain_preserves_fifo_order() {
        let mut outbox = NarrativeOutbox::default();
        outbox.enqueue(chronicle("r-1"));
        outbox.enqueue(chronicle("r-2"));
        outbox.enqueue(chronicle("r-3"));
        let drained = outbox.drain(2);
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].id(), "r-1");
        assert_eq!(drained[1].id(), "r-2");
        assert_eq!(outbox.len(), 1);
    }

    #[test]
    fn saturation_is_a_structured_refusal() {
        let mut outbox = NarrativeOutbox::default();
        for i in 0..QUEUE_CAP {
            assert_eq!(outbox.enqueue(chronicle(&format!("r-{i}"))), EnqueueResult::Queued);
        }
        assert_eq!(outbox.enqueue(chronicle("r-last")), EnqueueResult::Saturated);
    }
}
