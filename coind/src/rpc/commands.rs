//! JSON-RPC command table and dispatch onto the [DepositService].

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use coind_common::entities::Deposit;

use crate::deposit_service::DepositService;
use crate::rpc::protocol::{RpcError, RpcRequest, RpcResponse};

/// A decoded JSON-RPC command.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcCommand {
    /// `get_blocks [coin_type, hash]`
    GetBlocks {
        /// Coin type
        coin_type: String,
        /// Block hash
        hash: String,
    },

    /// `get_blocks_by_seq [coin_type, seq?]`
    GetBlocksBySeq {
        /// Coin type
        coin_type: String,
        /// Height, `0` for the best block
        seq: u64,
    },

    /// `get_lastblocks [coin_type]`
    GetLastBlocks {
        /// Coin type
        coin_type: String,
    },

    /// `getblockcount [coin_type?]`
    GetBlockCount {
        /// Coin type, the default coin type when absent
        coin_type: Option<String>,
    },

    /// `get_transaction [coin_type, tx]`
    GetTransaction {
        /// Coin type
        coin_type: String,
        /// Transaction id
        tx: String,
    },

    /// `nextdeposit [[Deposit...]]`
    NextDeposit(Vec<Deposit>),
}

impl RpcCommand {
    /// Decode the positional parameters of a method.
    pub fn decode(method: &str, params: Value) -> Result<Self, RpcError> {
        let params = match params {
            Value::Null => Vec::new(),
            Value::Array(params) => params,
            other => {
                return Err(RpcError::invalid_params(format!(
                    "params must be an array, got {other}"
                )));
            }
        };

        match method {
            "get_blocks" => {
                expect_params_count(&params, 2, 2)?;
                Ok(Self::GetBlocks {
                    coin_type: string_param(&params, 0, "coin_type")?,
                    hash: string_param(&params, 1, "hash")?,
                })
            }
            "get_blocks_by_seq" => {
                expect_params_count(&params, 1, 2)?;
                Ok(Self::GetBlocksBySeq {
                    coin_type: string_param(&params, 0, "coin_type")?,
                    seq: optional_u64_param(&params, 1, "seq")?.unwrap_or(0),
                })
            }
            "get_lastblocks" => {
                expect_params_count(&params, 1, 1)?;
                Ok(Self::GetLastBlocks {
                    coin_type: string_param(&params, 0, "coin_type")?,
                })
            }
            "getblockcount" => {
                expect_params_count(&params, 0, 1)?;
                let coin_type = match params.first() {
                    Some(_) => Some(string_param(&params, 0, "coin_type")?),
                    None => None,
                };
                Ok(Self::GetBlockCount { coin_type })
            }
            "get_transaction" => {
                expect_params_count(&params, 2, 2)?;
                Ok(Self::GetTransaction {
                    coin_type: string_param(&params, 0, "coin_type")?,
                    tx: string_param(&params, 1, "tx")?,
                })
            }
            "nextdeposit" => {
                expect_params_count(&params, 1, 1)?;
                let deposits = params
                    .into_iter()
                    .next()
                    .map(serde_json::from_value::<Vec<Deposit>>)
                    .transpose()
                    .map_err(|err| RpcError::invalid_params(err.to_string()))?
                    .unwrap_or_default();
                Ok(Self::NextDeposit(deposits))
            }
            _ => Err(RpcError::method_not_found(method)),
        }
    }
}

fn expect_params_count(params: &[Value], min: usize, max: usize) -> Result<(), RpcError> {
    if (min..=max).contains(&params.len()) {
        return Ok(());
    }

    let expected = if min == max {
        min.to_string()
    } else {
        format!("{min} to {max}")
    };
    Err(RpcError::invalid_params(format!(
        "wrong number of params (expected {expected}, received {})",
        params.len()
    )))
}

fn string_param(params: &[Value], index: usize, name: &str) -> Result<String, RpcError> {
    match params.get(index) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(RpcError::invalid_params(format!(
            "parameter #{} '{name}' must be a string, got {other}",
            index + 1
        ))),
        None => Err(RpcError::invalid_params(format!(
            "parameter #{} '{name}' is missing",
            index + 1
        ))),
    }
}

fn optional_u64_param(params: &[Value], index: usize, name: &str) -> Result<Option<u64>, RpcError> {
    match params.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            RpcError::invalid_params(format!(
                "parameter #{} '{name}' must be a positive integer, got {value}",
                index + 1
            ))
        }),
    }
}

/// Turns request bodies into responses.
pub struct RpcDispatcher {
    deposit_service: Arc<dyn DepositService>,
    default_coin_type: String,
    quirks: bool,
}

impl RpcDispatcher {
    /// RpcDispatcher factory
    pub fn new(
        deposit_service: Arc<dyn DepositService>,
        default_coin_type: String,
        quirks: bool,
    ) -> Self {
        Self {
            deposit_service,
            default_coin_type,
            quirks,
        }
    }

    /// Process one request body, `None` meaning the request is a notification.
    ///
    /// A lookup is abandoned if `peer_closed` fires before it completes. A deposit always runs
    /// to completion so the synthesized block is stored as requested.
    pub async fn dispatch(
        &self,
        body: &[u8],
        peer_closed: &CancellationToken,
    ) -> Option<RpcResponse> {
        let request = match RpcRequest::parse(body) {
            Ok(request) => request,
            Err(error) => {
                warn!(code = error.code, "Rejected JSON-RPC request: {}", error.message);
                return Some(RpcResponse::for_unparsable_request(error));
            }
        };
        let is_notification = request.is_notification(self.quirks);

        let outcome = match RpcCommand::decode(&request.method, request.params.clone()) {
            Err(error) => Err(error),
            Ok(command @ RpcCommand::NextDeposit(_)) => {
                self.execute(&request.method, command).await
            }
            Ok(command) => tokio::select! {
                biased;
                _ = peer_closed.cancelled() => {
                    debug!(method = %request.method, "Peer left, command abandoned");
                    Err(RpcError::internal("client disconnected"))
                }
                outcome = self.execute(&request.method, command) => outcome,
            },
        };
        if let Err(error) = &outcome {
            warn!(
                method = %request.method,
                code = error.code,
                "JSON-RPC command failed: {}",
                error.message
            );
        }

        if is_notification {
            debug!(method = %request.method, "Notification processed, no response");
            return None;
        }

        Some(RpcResponse::for_request(&request, outcome))
    }

    async fn execute(&self, method: &str, command: RpcCommand) -> Result<Value, RpcError> {
        debug!(method, "Dispatching JSON-RPC command");

        let service = &self.deposit_service;
        let result = match command {
            RpcCommand::GetBlocks { coin_type, hash } => {
                service.get_block(&coin_type, &hash).await?
            }
            RpcCommand::GetBlocksBySeq { coin_type, seq } => {
                to_result(service.get_best_block(&coin_type, seq).await?)?
            }
            RpcCommand::GetLastBlocks { coin_type } => {
                to_result(service.get_best_block(&coin_type, 0).await?)?
            }
            RpcCommand::GetBlockCount { coin_type } => {
                let coin_type = coin_type.as_deref().unwrap_or(&self.default_coin_type);
                Value::from(service.get_block_count(coin_type).await?)
            }
            RpcCommand::GetTransaction { coin_type, tx } => {
                service.get_transaction_block(&coin_type, &tx).await?
            }
            RpcCommand::NextDeposit(deposits) => service.process_deposits(&deposits).await?,
        };

        Ok(result)
    }
}

fn to_result<T: serde::Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|err| RpcError::internal(err.to_string()))
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use serde_json::json;

    use coind_common::entities::BestBlockSummary;
    use coind_common::provider::ProviderError;
    use coind_common::test_utils::fake_data;

    use crate::deposit_service::{DepositServiceError, MockDepositService};
    use crate::rpc::protocol::{
        RPC_BLOCK_NOT_FOUND, RPC_INTERNAL_ERROR, RPC_INVALID_PARAMS, RPC_METHOD_NOT_FOUND,
        RPC_PARSE_ERROR,
    };

    use super::*;

    fn dispatcher(service: MockDepositService, quirks: bool) -> RpcDispatcher {
        RpcDispatcher::new(Arc::new(service), "SKY".to_string(), quirks)
    }

    async fn dispatch(dispatcher: &RpcDispatcher, body: Value) -> Option<Value> {
        let body = serde_json::to_vec(&body).unwrap();
        dispatcher
            .dispatch(&body, &CancellationToken::new())
            .await
            .map(|response| serde_json::to_value(response).unwrap())
    }

    #[test]
    fn decode_positional_params() {
        assert_eq!(
            RpcCommand::GetBlocks {
                coin_type: "SKY".to_string(),
                hash: "abc".to_string()
            },
            RpcCommand::decode("get_blocks", json!(["SKY", "abc"])).unwrap()
        );
        assert_eq!(
            RpcCommand::GetBlocksBySeq {
                coin_type: "SKY".to_string(),
                seq: 0
            },
            RpcCommand::decode("get_blocks_by_seq", json!(["SKY"])).unwrap()
        );
        assert_eq!(
            RpcCommand::GetBlockCount { coin_type: None },
            RpcCommand::decode("getblockcount", Value::Null).unwrap()
        );
        assert_eq!(
            RpcCommand::NextDeposit(vec![fake_data::sky_deposit()]),
            RpcCommand::decode(
                "nextdeposit",
                json!([[{"Address": "1FeDtFhARLxjKUPPkQqEBL78tisenc9znS", "Value": 10000, "Hours": 3455, "CoinType": "SKY"}]])
            )
            .unwrap()
        );
    }

    #[test]
    fn decode_rejects_shape_mismatches() {
        let invalid_params = [
            ("get_blocks", json!(["SKY"])),
            ("get_blocks", json!(["SKY", 12])),
            ("get_blocks_by_seq", json!(["SKY", "twelve"])),
            ("get_lastblocks", json!({"coin_type": "SKY"})),
            ("nextdeposit", json!([{"Address": "x"}])),
            ("nextdeposit", json!([])),
        ];

        for (method, params) in invalid_params {
            let error = RpcCommand::decode(method, params.clone())
                .expect_err("decode should fail on a parameter shape mismatch");
            assert_eq!(RPC_INVALID_PARAMS, error.code, "{method} {params}");
        }

        let error = RpcCommand::decode("getblockhash", json!([])).unwrap_err();
        assert_eq!(RPC_METHOD_NOT_FOUND, error.code);
    }

    #[tokio::test]
    async fn getblockcount_without_coin_type_uses_the_default_coin_type() {
        let mut service = MockDepositService::new();
        service
            .expect_get_block_count()
            .with(eq("SKY"))
            .returning(|_| Ok(42))
            .once();
        let dispatcher = dispatcher(service, true);

        let response = dispatch(&dispatcher, json!({"method": "getblockcount", "id": 1})).await;

        assert_eq!(
            Some(json!({"result": 42, "error": null, "id": 1})),
            response
        );
    }

    #[tokio::test]
    async fn get_lastblocks_answers_a_version_2_request() {
        let mut service = MockDepositService::new();
        service
            .expect_get_best_block()
            .with(eq("WAVES"), eq(0))
            .returning(|_, _| {
                Ok(BestBlockSummary {
                    hash: "signature-500".to_string(),
                    height: 500,
                })
            })
            .once();
        let dispatcher = dispatcher(service, true);

        let response = dispatch(
            &dispatcher,
            json!({"jsonrpc": "2.0", "method": "get_lastblocks", "params": ["WAVES"], "id": "x"}),
        )
        .await;

        assert_eq!(
            Some(json!({
                "jsonrpc": "2.0",
                "result": {"hash": "signature-500", "height": 500},
                "id": "x"
            })),
            response
        );
    }

    #[tokio::test]
    async fn nextdeposit_returns_the_synthesized_block() {
        let mut service = MockDepositService::new();
        service
            .expect_process_deposits()
            .returning(|deposits| Ok(json!({"deposits": deposits.len()})))
            .once();
        let dispatcher = dispatcher(service, true);

        let response = dispatch(
            &dispatcher,
            json!({
                "method": "nextdeposit",
                "params": [[
                    {"Address": "a", "Value": 1, "CoinType": "SKY"},
                    {"Address": "b", "Value": 2, "CoinType": "WAVES"}
                ]],
                "id": 3
            }),
        )
        .await
        .unwrap();

        assert_eq!(json!({"deposits": 2}), response["result"]);
    }

    #[tokio::test]
    async fn service_errors_become_json_rpc_errors() {
        let mut service = MockDepositService::new();
        service
            .expect_get_block()
            .returning(|_, _| Err(DepositServiceError::Provider(ProviderError::BlockNotFound)));
        service
            .expect_get_transaction_block()
            .returning(|coin_type, _| {
                Err(DepositServiceError::UnsupportedCoinType(coin_type.to_string()))
            });
        let dispatcher = dispatcher(service, true);

        let not_found = dispatch(
            &dispatcher,
            json!({"method": "get_blocks", "params": ["SKY", "nope"], "id": 1}),
        )
        .await
        .unwrap();
        let unsupported = dispatch(
            &dispatcher,
            json!({"method": "get_transaction", "params": ["ETH", "tx"], "id": 2}),
        )
        .await
        .unwrap();

        assert_eq!(RPC_BLOCK_NOT_FOUND, not_found["error"]["code"]);
        assert_eq!(Value::Null, not_found["result"]);
        assert_eq!(RPC_INTERNAL_ERROR, unsupported["error"]["code"]);
        assert_eq!(
            "CoinType (ETH) not supported",
            unsupported["error"]["message"]
        );
    }

    #[tokio::test]
    async fn unparsable_body_is_answered_with_a_parse_error() {
        let dispatcher = dispatcher(MockDepositService::new(), true);

        let response = dispatcher
            .dispatch(b"{\"method\":", &CancellationToken::new())
            .await
            .map(|response| serde_json::to_value(response).unwrap())
            .unwrap();

        assert_eq!(RPC_PARSE_ERROR, response["error"]["code"]);
        assert_eq!(Value::Null, response["id"]);
    }

    #[tokio::test]
    async fn notifications_are_executed_but_not_answered() {
        let mut service = MockDepositService::new();
        service.expect_get_block_count().returning(|_| Ok(1)).times(2);
        let strict = dispatcher(service, false);

        let version_2 = dispatch(&strict, json!({"jsonrpc": "2.0", "method": "getblockcount"})).await;
        let version_1 = dispatch(&strict, json!({"method": "getblockcount", "id": null})).await;

        assert_eq!(None, version_2);
        assert_eq!(None, version_1);
    }

    #[tokio::test]
    async fn quirk_mode_answers_id_less_version_1_requests() {
        let mut service = MockDepositService::new();
        service.expect_get_block_count().returning(|_| Ok(7));
        let dispatcher = dispatcher(service, true);

        let response = dispatch(&dispatcher, json!({"method": "getblockcount"})).await;

        assert_eq!(Some(json!({"result": 7, "error": null, "id": null})), response);
    }

    #[tokio::test]
    async fn a_departed_peer_abandons_the_command() {
        let mut service = MockDepositService::new();
        service.expect_get_block_count().never();
        let dispatcher = dispatcher(service, true);
        let peer_closed = CancellationToken::new();
        peer_closed.cancel();

        let response = dispatcher
            .dispatch(br#"{"method":"getblockcount","id":1}"#, &peer_closed)
            .await
            .unwrap();

        assert_eq!(Err(RpcError::internal("client disconnected")), response.outcome);
    }

    #[tokio::test]
    async fn a_departed_peer_does_not_abandon_a_deposit() {
        let mut service = MockDepositService::new();
        service
            .expect_process_deposits()
            .returning(|_| Ok(json!({"height": 900})))
            .once();
        let dispatcher = dispatcher(service, true);
        let peer_closed = CancellationToken::new();
        peer_closed.cancel();
        let body = serde_json::to_vec(&json!({
            "method": "nextdeposit",
            "params": [[fake_data::waves_deposit()]],
            "id": 1
        }))
        .unwrap();

        let response = dispatcher.dispatch(&body, &peer_closed).await.unwrap();

        assert_eq!(Ok(json!({"height": 900})), response.outcome);
    }
}
