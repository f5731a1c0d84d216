//! The question-answering service: tool routing composed with caching,
//! rate limiting, and in-flight deduplication.
//!
//! External collaborators go through this front so repeated questions hit
//! the cache, concurrent identical questions share one computation, and
//! the underlying router is never hammered faster than the configured
//! interval.

use crate::cache::AiCache;
use crate::limiter::{AiRateLimiter, InFlightMap};
use crate::tools::ToolRouter;
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub struct KnowledgeService {
    router: Arc<ToolRouter>,
    cache: Mutex<AiCache>,
    limiter: AiRateLimiter,
    in_flight: InFlightMap,
}

impl KnowledgeService {
    pub fn new(
        router: ToolRouter,
        max_cache_entries: usize,
        cache_ttl_ms: u64,
        min_interval_ms: u64,
    ) -> Self {
        Self {
            router: Arc::new(router),
            cache: Mutex::new(AiCache::new(max_cache_entries, cache_ttl_ms)),
            limiter: AiRateLimiter::new(min_interval_ms),
            in_flight: InFlightMap::new(),
        }
    }

    pub fn router(&self) -> &ToolRouter {
        &self.router
    }

    /// Answers a tool question. Cache hits return immediately; misses run
    /// through the rate limiter, and concurrent callers of the same
    /// question join the live computation.
    pub async fn ask(&self, tool: &str, input: Value, now_ms: u64) -> Value {
        let key = format!("{tool}:{input}");
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = cache.get(&key, now_ms) {
                return hit;
            }
        }

        let computation = self.in_flight.join_or_start(&key, || {
            let router = Arc::clone(&self.router);
            let tool = tool.to_string();
            let input = input.clone();
            async move {
                let result = router.call_tool(&tool, &input);
                serde_json::to_value(result).unwrap_or(Value::Null)
            }
        });
        let value = self.limiter.run(computation).await;
        self.in_flight.finish(&key);

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.set(&key, value.clone(), now_ms);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::WorldKnowledgePack;
    use serde_json::json;
    use tellus_core::{AppConfig, CivSystem};
    use tellus_data::{Biome, WorldGrid};

    fn service() -> KnowledgeService {
        let world = WorldGrid::new(8, 8, 3, vec![Biome::Grassland as u8; 64]);
        let mut config = AppConfig::default();
        config.world.seed = 3;
        config.world.width = 8;
        config.world.height = 8;
        config.genesis.enabled = false;
        let civ = CivSystem::new(&world, &config, 1.0).expect("engine");
        let pack = WorldKnowledgePack::build(&civ, &world, &[]);
        KnowledgeService::new(ToolRouter::new(pack), 8, 60_000, 1)
    }

    #[tokio::test]
    async fn answers_are_cached() {
        let service = service();
        let a = service.ask("getWorldSummary", json!({}), 0).await;
        let b = service.ask("getWorldSummary", json!({}), 10).await;
        assert_eq!(a, b);
        assert!(a["ok"].as_bool().unwrap_or(false));
    }

    #[tokio::test]
    async fn failed_tools_still_answer_structurally() {
        let service = service();
        let v = service.ask("noSuchTool", json!({}), 0).await;
        assert_eq!(v["ok"], json!(false));
        assert!(v["error"].as_str().unwrap_or("").contains("unknown tool"));
    }
}
