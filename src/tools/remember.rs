//! MCP `remember` tool parameter definitions.

use hippocampus::memory::EngramInput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `remember` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RememberParams {
    #[schemars(description = "Role ID to save memories for, e.g. java-developer, product-manager")]
    pub role: String,

    #[schemars(
        description = "Engrams to store, processed in order. Each has content, optional schema, strength and type."
    )]
    pub engrams: Vec<EngramParams>,
}

/// One engram inside a `remember` call.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EngramParams {
    #[schemars(
        description = "Optional stable ID. Remembering again with the same ID replaces the engram."
    )]
    pub id: Option<String>,

    #[schemars(description = "Raw experience content to save")]
    pub content: String,

    #[schemars(
        description = "Keywords or an indented mind-map outline of the content. Use original words, do not invent new ones."
    )]
    pub schema: Option<String>,

    #[schemars(
        description = "Memory strength 0.0-1.0. Higher = more important, recalled first. Defaults to 0.8."
    )]
    pub strength: Option<f64>,

    #[schemars(
        description = "Engram type: 'ATOMIC' (facts, entities), 'LINK' (relationships), 'PATTERN' (processes, methods)"
    )]
    pub r#type: String,
}

impl From<EngramParams> for EngramInput {
    fn from(params: EngramParams) -> Self {
        EngramInput {
            id: params.id,
            content: params.content,
            schema: params.schema,
            strength: params.strength,
            engram_type: params.r#type,
        }
    }
}
