use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MemoryStatsParams {
    #[schemars(description = "Role ID whose memory network to describe")]
    pub role: String,
}
