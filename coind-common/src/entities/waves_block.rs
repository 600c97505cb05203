use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entities::{BlockHead, Deposit, SyntheticBlock};
use crate::provider::ProviderError;

/// A waves block as served by the node `blocks/last` route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WavesBlock {
    /// Block height
    pub height: u64,

    /// Block signature, used as the block hash
    pub signature: String,

    /// Signature of the previous block
    #[serde(default)]
    pub reference: String,

    /// Signature of the block synthesized after this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_signature: Option<String>,

    /// Transactions of the block
    #[serde(default)]
    pub transactions: Vec<WavesTransaction>,

    /// Fields not used by coind, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A waves transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavesTransaction {
    /// Transaction id
    pub id: String,

    /// Recipient address, only set on transfer like transactions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    /// Transferred amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,

    /// Fields not used by coind, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SyntheticBlock for WavesBlock {
    const COIN_TYPE: &'static str = "WAVES";
    const NAME: &'static str = "waves";

    fn inject_deposit(&mut self, deposit: &Deposit) -> Result<String, ProviderError> {
        let mut transaction = self
            .transactions
            .iter()
            .find(|tx| tx.recipient.as_deref().is_some_and(|r| !r.is_empty()))
            .cloned()
            .ok_or_else(|| {
                ProviderError::MalformedUpstreamData(
                    "no waves transaction with a recipient to use as template".to_string(),
                )
            })?;

        transaction.recipient = Some(deposit.address.clone());
        transaction.amount = Some(deposit.value);
        let id = transaction.id.clone();
        self.transactions.push(transaction);

        Ok(id)
    }

    fn head(&self) -> Result<BlockHead, ProviderError> {
        Ok(BlockHead {
            height: self.height,
            hash: self.signature.clone(),
        })
    }

    fn transaction_ids(&self) -> Vec<String> {
        self.transactions.iter().map(|tx| tx.id.clone()).collect()
    }

    fn link_next(&mut self, next_hash: &str) {
        self.next_signature = Some(next_hash.to_string());
    }
}
