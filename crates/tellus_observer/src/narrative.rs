//! The narrative collaborator bridge.
//!
//! Requests drained from the core are answered by a [`Narrator`]
//! implementation under a timeout; on failure the deterministic heuristic
//! narrator answers instead, so the simulation's semantics never depend
//! on an external service being reachable.

use async_trait::async_trait;
use std::time::Duration;
use tellus_core::narrative::{NarrativeRequest, NarrativeResponse};
use tellus_core::rng::Rng;

/// Generates narrative responses for core requests.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn respond(&self, request: &NarrativeRequest) -> Option<NarrativeResponse>;
}

/// Template-based deterministic fallback narrator. Output depends only on
/// the request contents.
pub struct HeuristicNarrator;

const NAME_PREFIXES: [&str; 8] = [
    "Ash", "River", "Stone", "Fen", "Thorn", "Ember", "Gale", "Moss",
];
const NAME_SUFFIXES: [&str; 8] = [
    "hold", "kin", "reach", "veil", "march", "rest", "warden", "root",
];

fn request_seed(text: &str) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    for b in text.bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(0x0100_0193);
    }
    h
}

impl HeuristicNarrator {
    fn identity(faction_id: &str, world_summary: &str) -> NarrativeResponse {
        let mut rng = Rng::new(request_seed(faction_id) ^ request_seed(world_summary));
        let name = format!(
            "{}{}",
            NAME_PREFIXES[rng.next_index(NAME_PREFIXES.len())],
            NAME_SUFFIXES[rng.next_index(NAME_SUFFIXES.len())]
        );
        NarrativeResponse::FactionIdentity {
            request_id: format!("identity-{faction_id}"),
            faction_id: faction_id.to_string(),
            name,
            motto: "endure the seasons".to_string(),
            religion_name: Some("the Old Current".to_string()),
            core_laws: vec![
                "share the harvest".to_string(),
                "keep the border stones".to_string(),
            ],
        }
    }

    fn dialogue(
        request_id: &str,
        dialogue_id: &str,
        tokens: &[String],
        action_context: &str,
    ) -> NarrativeResponse {
        let gloss = if tokens.is_empty() {
            format!("They speak briefly while {action_context}.")
        } else {
            format!(
                "\"{}\", an exchange about {}.",
                tokens.join(" "),
                action_context
            )
        };
        NarrativeResponse::Dialogue {
            request_id: request_id.to_string(),
            dialogue_id: dialogue_id.to_string(),
            gloss,
            tone: "plain".to_string(),
            new_terms: Vec::new(),
        }
    }

    fn chronicle(request_id: &str, faction_id: &str, logs: &[String]) -> NarrativeResponse {
        let text = if logs.is_empty() {
            "Seasons passed without remark.".to_string()
        } else {
            format!("In these seasons: {}", logs.join(" "))
        };
        let text: String = text.chars().take(420).collect();
        NarrativeResponse::Chronicle {
            request_id: request_id.to_string(),
            faction_id: faction_id.to_string(),
            text,
        }
    }
}

#[async_trait]
impl Narrator for HeuristicNarrator {
    async fn respond(&self, request: &NarrativeRequest) -> Option<NarrativeResponse> {
        Some(match request {
            NarrativeRequest::FactionIdentity {
                faction_id,
                world_summary,
                ..
            } => Self::identity(faction_id, world_summary),
            NarrativeRequest::Dialogue {
                id,
                dialogue_id,
                utterance_tokens,
                action_context,
                ..
            } => Self::dialogue(id, dialogue_id, utterance_tokens, action_context),
            NarrativeRequest::Chronicle {
                id,
                faction_id,
                recent_logs,
            } => Self::chronicle(id, faction_id, recent_logs),
        })
    }
}

/// Drives a narrator over drained requests: rate-limited, bounded by a
/// per-request timeout, with the heuristic fallback.
pub struct NarrativeEngine {
    narrator: Box<dyn Narrator>,
    fallback: HeuristicNarrator,
    limiter: crate::limiter::AiRateLimiter,
    timeout: Duration,
}

impl NarrativeEngine {
    pub fn new(narrator: Box<dyn Narrator>, timeout_ms: u64) -> Self {
        Self {
            narrator,
            fallback: HeuristicNarrator,
            limiter: crate::limiter::AiRateLimiter::new(timeout_ms / 4),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    pub fn heuristic(timeout_ms: u64) -> Self {
        Self::new(Box::new(HeuristicNarrator), timeout_ms)
    }

    /// Answers every request, falling back per request on timeout or
    /// refusal.
    pub async fn process(&self, requests: Vec<NarrativeRequest>) -> Vec<NarrativeResponse> {
        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            let answered = self
                .limiter
                .run(async {
                    match tokio::time::timeout(self.timeout, self.narrator.respond(&request))
                        .await
                    {
                        Ok(answer) => answer,
                        Err(_elapsed) => {
                            tracing::warn!(id = request.id(), "narrator timed out");
                            None
                        }
                    }
                })
                .await;
            let response = match answered {
                Some(r) => r,
                None => match self.fallback.respond(&request).await {
                    Some(r) => r,
                    None => continue,
                },
            };
            responses.push(response);
        }
        responses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn heuristic_answers_every_request_kind() {
        let engine = NarrativeEngine::heuristic(50);
        let requests = vec![
            NarrativeRequest::FactionIdentity {
                id: "identity-fac-1".to_string(),
                faction_id: "fac-1".to_string(),
                world_summary: "tick 30".to_string(),
            },
            NarrativeRequest::Chronicle {
                id: "chronicle-fac-1-2000".to_string(),
                faction_id: "fac-1".to_string(),
                recent_logs: vec!["A war began.".to_string()],
            },
        ];
        let responses = engine.process(requests).await;
        assert_eq!(responses.len(), 2);
        match &responses[0] {
            NarrativeResponse::FactionIdentity { name, .. } => assert!(!name.is_empty()),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn identity_is_deterministic_per_request() {
        let engine = NarrativeEngine::heuristic(50);
        let request = NarrativeRequest::FactionIdentity {
            id: "identity-fac-7".to_string(),
            faction_id: "fac-7".to_string(),
            world_summary: "same".to_string(),
        };
        let a = engine.process(vec![request.clone()]).await;
        let b = engine.process(vec![request]).await;
        match (&a[0], &b[0]) {
            (
                NarrativeResponse::FactionIdentity { name: na, .. },
                NarrativeResponse::FactionIdentity { name: nb, .. },
            ) => assert_eq!(na, nb),
            _ => panic!("expected identity responses"),
        }
    }

    struct SilentNarrator;

    #[async_trait]
    impl Narrator for SilentNarrator {
        async fn respond(&self, _request: &NarrativeRequest) -> Option<NarrativeResponse> {
            None
        }
    }

    #[tokio::test]
    async fn refusals_fall_back_to_heuristic() {
        let engine = NarrativeEngine::new(Box::new(SilentNarrator), 50);
        let responses = engine
            .process(vec![NarrativeRequest::Chronicle {
                id: "chronicle-x".to_string(),
                faction_id: "fac-9".to_string(),
                recent_logs: vec![],
            }])
            .await;
        assert_eq!(responses.len(), 1);
    }
}
