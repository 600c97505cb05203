use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entities::{BlockHead, Deposit, SyntheticBlock};
use crate::provider::ProviderError;

/// Block list as served by the skycoin explorer `blocks` route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyBlocks {
    /// Blocks of the requested range
    pub blocks: Vec<SkyBlock>,
}

/// A skycoin block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyBlock {
    /// Block header
    pub header: SkyBlockHeader,

    /// Block body
    pub body: SkyBlockBody,

    /// Fields not used by coind, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A skycoin block header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyBlockHeader {
    /// Sequence number, ie. the block height
    pub seq: u64,

    /// Block hash
    #[serde(alias = "block_hash")]
    pub hash: String,

    /// Hash of the previous block
    #[serde(default, alias = "previous_block_hash")]
    pub prev_hash: String,

    /// Hash of the block synthesized after this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_hash: Option<String>,

    /// Fields not used by coind, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A skycoin block body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyBlockBody {
    /// Transactions of the block
    #[serde(default)]
    pub txns: Vec<SkyTransaction>,

    /// Fields not used by coind, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A skycoin transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyTransaction {
    /// Transaction id
    pub txid: String,

    /// Transaction outputs
    #[serde(default)]
    pub outputs: Vec<SkyTransactionOutput>,

    /// Fields not used by coind, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A skycoin transaction output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyTransactionOutput {
    /// Output id
    #[serde(default)]
    pub uxid: String,

    /// Destination address
    pub dst: String,

    /// Amount of coins, as a decimal string
    pub coins: String,

    /// Coin hours
    #[serde(default)]
    pub hours: u64,

    /// Fields not used by coind, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SkyBlocks {
    fn first_block(&self) -> Result<&SkyBlock, ProviderError> {
        self.blocks.first().ok_or_else(|| {
            ProviderError::MalformedUpstreamData("skycoin block list is empty".to_string())
        })
    }
}

impl SyntheticBlock for SkyBlocks {
    const COIN_TYPE: &'static str = "SKY";
    const NAME: &'static str = "skycoin";

    fn inject_deposit(&mut self, deposit: &Deposit) -> Result<String, ProviderError> {
        let transaction = self
            .blocks
            .iter_mut()
            .flat_map(|block| block.body.txns.iter_mut())
            .find(|tx| !tx.outputs.is_empty())
            .ok_or_else(|| {
                ProviderError::MalformedUpstreamData(
                    "no skycoin transaction with an output to use as template".to_string(),
                )
            })?;

        let mut output = transaction.outputs[0].clone();
        output.dst = deposit.address.clone();
        output.coins = deposit.value.to_string();
        output.hours = deposit.hours;
        transaction.outputs.push(output);

        Ok(transaction.txid.clone())
    }

    fn head(&self) -> Result<BlockHead, ProviderError> {
        let header = &self.first_block()?.header;

        Ok(BlockHead {
            height: header.seq,
            hash: header.hash.clone(),
        })
    }

    fn transaction_ids(&self) -> Vec<String> {
        self.blocks
            .iter()
            .flat_map(|block| block.body.txns.iter().map(|tx| tx.txid.clone()))
            .collect()
    }

    fn link_next(&mut self, next_hash: &str) {
        if let Some(block) = self.blocks.first_mut() {
            block.header.next_hash = Some(next_hash.to_string());
        }
    }
}
