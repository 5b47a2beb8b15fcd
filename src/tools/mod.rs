pub mod memory_stats;
pub mod recall;
pub mod remember;

use hippocampus::config::HippoConfig;
use hippocampus::memory::{EngramInput, MemoryService, RecallMode};
use memory_stats::MemoryStatsParams;
use recall::RecallParams;
use remember::RememberParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use std::sync::Arc;

/// The MCP tool handler. Holds the shared memory service and config and
/// exposes `remember`, `recall` and `memory_stats` via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct HippoTools {
    tool_router: ToolRouter<Self>,
    memory: Arc<MemoryService>,
    config: Arc<HippoConfig>,
}

#[tool_router]
impl HippoTools {
    pub fn new(memory: Arc<MemoryService>, config: Arc<HippoConfig>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            memory,
            config,
        }
    }

    /// Save engrams to a role's memory network.
    #[tool(description = "Save knowledge to a role's memory network. Types: ATOMIC (facts, entities), LINK (relationships), PATTERN (processes, methods). Strip content to the essential words; strength 0-1 sets recall priority.")]
    async fn remember(
        &self,
        Parameters(params): Parameters<RememberParams>,
    ) -> Result<String, String> {
        if params.engrams.is_empty() {
            return Err("engrams must contain at least one item".into());
        }

        tracing::info!(
            role = %params.role,
            engrams = params.engrams.len(),
            "remember called"
        );

        let memory = Arc::clone(&self.memory);
        let role = params.role;
        let inputs: Vec<EngramInput> = params.engrams.into_iter().map(Into::into).collect();

        let role_for_task = role.clone();
        let outcome =
            tokio::task::spawn_blocking(move || memory.remember_batch(&role_for_task, inputs))
                .await
                .map_err(|e| format!("memory task failed: {e}"))?;

        let rejected: Vec<serde_json::Value> = outcome
            .rejected
            .iter()
            .map(|(index, e)| {
                serde_json::json!({
                    "index": index,
                    "field": e.field,
                    "reason": e.reason,
                })
            })
            .collect();

        let stored = outcome.stored.clone();
        if let Err(e) = outcome.into_result() {
            tracing::warn!(role = %role, error = %e, "remember rejected input");
            return Err(serde_json::json!({
                "status": "error",
                "error": e.to_string(),
                "stored": stored,
                "rejected": rejected,
            })
            .to_string());
        }

        Ok(serde_json::json!({
            "status": "ok",
            "role": role,
            "stored": stored,
        })
        .to_string())
    }

    /// Recall engrams from a role's memory network.
    #[tool(description = "Retrieve memories from a role's network. query=null runs a DMN scan over the whole network (recommended first step); keywords (space-separated) activate matching engrams. Results are ranked by strength, then recency.")]
    async fn recall(
        &self,
        Parameters(params): Parameters<RecallParams>,
    ) -> Result<String, String> {
        let mode = match params.mode.as_deref() {
            Some(m) => m.parse::<RecallMode>()?,
            None => self.config.recall.default_mode,
        };

        tracing::info!(
            role = %params.role,
            query = params.query.as_deref().unwrap_or(""),
            mode = %mode,
            "recall called"
        );

        let memory = Arc::clone(&self.memory);
        let role = params.role.clone();
        let query = params.query.clone();
        let engrams = tokio::task::spawn_blocking(move || {
            memory.recall(&role, query.as_deref(), mode)
        })
        .await
        .map_err(|e| format!("memory task failed: {e}"))?
        .map_err(|e| e.to_string())?;

        Ok(serde_json::json!({
            "role": params.role,
            "query": params.query,
            "mode": mode,
            "total": engrams.len(),
            "engrams": engrams,
        })
        .to_string())
    }

    /// Describe a role's memory network.
    #[tool(description = "Get statistics for a role's memory network: engram counts by type, distinct cues, time range and persistence health.")]
    async fn memory_stats(
        &self,
        Parameters(params): Parameters<MemoryStatsParams>,
    ) -> Result<String, String> {
        tracing::info!(role = %params.role, "memory_stats called");

        let memory = Arc::clone(&self.memory);
        let stats = tokio::task::spawn_blocking(move || memory.stats(&params.role))
            .await
            .map_err(|e| format!("memory task failed: {e}"))?
            .map_err(|e| e.to_string())?;

        serde_json::to_string(&stats).map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for HippoTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Hippocampus is a per-role associative memory server. Use recall with query=null \
                 to see a role's memory network, recall with keywords to drill down, and \
                 remember to save new engrams."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hippocampus::config::RecallConfig;
    use hippocampus::memory::{MemoryError, ValidationError};
    use remember::EngramParams;

    fn tools() -> HippoTools {
        HippoTools::new(
            Arc::new(MemoryService::in_memory(RecallConfig::default())),
            Arc::new(HippoConfig::default()),
        )
    }

    fn params(content: &str, strength: f64) -> EngramParams {
        EngramParams {
            id: None,
            content: content.into(),
            schema: None,
            strength: Some(strength),
            r#type: "ATOMIC".into(),
        }
    }

    #[tokio::test]
    async fn remember_reports_first_rejection_with_batch_wording() {
        let tools = tools();
        let err = tools
            .remember(Parameters(RememberParams {
                role: "dev".into(),
                engrams: vec![params("kept", 0.5), params("too strong", 1.5)],
            }))
            .await
            .unwrap_err();

        let body: serde_json::Value = serde_json::from_str(&err).unwrap();
        let expected = MemoryError::Batch {
            index: 1,
            source: ValidationError::new("strength", "strength must be between 0.0 and 1.0, got 1.5"),
        };
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], expected.to_string());
        assert_eq!(body["stored"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["rejected"][0]["field"], "strength");
    }

    #[tokio::test]
    async fn remember_ok_lists_stored_ids() {
        let tools = tools();
        let ok = tools
            .remember(Parameters(RememberParams {
                role: "dev".into(),
                engrams: vec![params("redis port 6379", 0.5)],
            }))
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&ok).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["stored"].as_array().map(Vec::len), Some(1));
    }
}
