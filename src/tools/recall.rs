//! MCP `recall` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `recall` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecallParams {
    #[schemars(description = "Role ID to recall memories from, e.g. java-developer, product-manager")]
    pub role: String,

    /// Space-separated keywords, or `null` for a DMN overview.
    #[schemars(
        description = "Space-separated keywords, or null for DMN mode (overview of the whole memory network). Start with null, then drill down with keywords seen in the results."
    )]
    pub query: Option<String>,

    #[schemars(
        description = "Activation mode: 'creative' (broad association), 'balanced' (default), 'focused' (precise lookup, frequently recalled first)"
    )]
    pub mode: Option<String>,
}
