use serde::{Deserialize, Serialize};

/// Summary of the best block at a given height, as returned by a node `getbestblock` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestBlockSummary {
    /// Block hash
    pub hash: String,

    /// Block height
    pub height: u64,
}

/// Height and hash extracted from a synthesized block header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHead {
    /// Block height
    pub height: u64,

    /// Block hash
    pub hash: String,
}
