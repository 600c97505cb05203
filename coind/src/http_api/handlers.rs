use axum::{
    body::{Body, Bytes},
    extract::{Query, Request, State},
    http::{HeaderValue, Response, StatusCode, header},
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use coind_common::entities::Deposit;

use crate::StdResult;
use crate::http_api::{AppError, SharedState};

/// Query parameters of the lookup endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    cointype: Option<String>,
    hash: Option<String>,
    seq: Option<String>,
    tx: Option<String>,
}

impl LookupParams {
    fn coin_type(&self) -> Result<&str, AppError> {
        required(&self.cointype, "cointype")
    }

    fn hash(&self) -> Result<&str, AppError> {
        required(&self.hash, "hash")
    }

    fn tx(&self) -> Result<&str, AppError> {
        required(&self.tx, "tx")
    }

    /// Requested height, an absent or unparsable value meaning the best block.
    fn seq(&self) -> u64 {
        self.seq
            .as_deref()
            .and_then(|seq| seq.trim().parse().ok())
            .unwrap_or(0)
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or(AppError::MissingParameter(name))
}

/// Serialize with a four spaces indentation.
fn indented_json<T: Serialize>(value: &T) -> StdResult<Response<Body>> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;

    Ok((StatusCode::OK, buffer).into_response())
}

/// POST /api/nextdeposit
pub async fn next_deposit(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Response<Body>, AppError> {
    let deposits: Vec<Deposit> = serde_json::from_slice(&body).map_err(AppError::InvalidJson)?;
    debug!(deposits = deposits.len(), "HTTP: next deposit");

    let block = state
        .deposit_service
        .process_deposits(&deposits)
        .await
        .map_err(AppError::Processing)?;

    Ok(indented_json(&block)?)
}

/// GET /api/get_blocks
pub async fn get_blocks(
    Query(params): Query<LookupParams>,
    State(state): State<SharedState>,
) -> Result<Response<Body>, AppError> {
    let block = state
        .deposit_service
        .get_block(params.coin_type()?, params.hash()?)
        .await
        .map_err(AppError::Processing)?;

    Ok(indented_json(&block)?)
}

/// GET /api/get_blocks_by_seq
pub async fn get_blocks_by_seq(
    Query(params): Query<LookupParams>,
    State(state): State<SharedState>,
) -> Result<Response<Body>, AppError> {
    let best_block = state
        .deposit_service
        .get_best_block(params.coin_type()?, params.seq())
        .await
        .map_err(AppError::Processing)?;

    Ok(indented_json(&best_block)?)
}

/// GET /api/get_last_blocks
pub async fn get_last_blocks(
    Query(params): Query<LookupParams>,
    State(state): State<SharedState>,
) -> Result<Response<Body>, AppError> {
    let best_block = state
        .deposit_service
        .get_best_block(params.coin_type()?, params.seq())
        .await
        .map_err(AppError::Processing)?;

    Ok(indented_json(&best_block)?)
}

/// GET /api/get_block_count
pub async fn get_block_count(
    Query(params): Query<LookupParams>,
    State(state): State<SharedState>,
) -> Result<Response<Body>, AppError> {
    let count = state
        .deposit_service
        .get_block_count(params.coin_type()?)
        .await
        .map_err(AppError::Processing)?;

    Ok(indented_json(&count)?)
}

/// GET /api/get_transaction
pub async fn get_transaction(
    Query(params): Query<LookupParams>,
    State(state): State<SharedState>,
) -> Result<Response<Body>, AppError> {
    let block = state
        .deposit_service
        .get_transaction_block(params.coin_type()?, params.tx()?)
        .await
        .map_err(AppError::Processing)?;

    Ok(indented_json(&block)?)
}

/// Set the JSON content type on successful responses and close every connection.
pub async fn set_json_app_header(
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut res = next.run(req).await;

    let is_success = res.status() == StatusCode::OK;
    let headers = res.headers_mut();
    if is_success {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }
    headers.insert(header::CONNECTION, HeaderValue::from_static("close"));

    Ok(res)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::predicate::eq;

    use coind_common::entities::BestBlockSummary;
    use coind_common::provider::ProviderError;

    use crate::deposit_service::{DepositServiceError, MockDepositService};
    use crate::http_api::AppState;

    use super::*;

    fn state(service: MockDepositService) -> State<SharedState> {
        State(Arc::new(AppState::new(Arc::new(service))))
    }

    fn params(cointype: Option<&str>, seq: Option<&str>) -> Query<LookupParams> {
        Query(LookupParams {
            cointype: cointype.map(str::to_string),
            seq: seq.map(str::to_string),
            ..LookupParams::default()
        })
    }

    #[test]
    fn unparsable_seq_means_the_best_block() {
        assert_eq!(0, params(None, Some("twelve")).seq());
        assert_eq!(0, params(None, None).seq());
        assert_eq!(12, params(None, Some("12")).seq());
    }

    #[tokio::test]
    async fn get_blocks_by_seq_queries_the_requested_height() {
        let mut service = MockDepositService::new();
        service
            .expect_get_best_block()
            .with(eq("SKY"), eq(12))
            .returning(|_, seq| {
                Ok(BestBlockSummary {
                    hash: format!("hash-{seq}"),
                    height: seq,
                })
            })
            .once();

        let response = get_blocks_by_seq(params(Some("SKY"), Some("12")), state(service))
            .await
            .expect("get_blocks_by_seq should succeed");

        assert_eq!(StatusCode::OK, response.status());
    }

    #[tokio::test]
    async fn missing_coin_type_is_rejected() {
        let error = get_block_count(params(None, None), state(MockDepositService::new()))
            .await
            .expect_err("get_block_count should fail without cointype");

        assert!(matches!(error, AppError::MissingParameter("cointype")));
    }

    #[tokio::test]
    async fn missing_hash_is_rejected() {
        let error = get_blocks(params(Some("SKY"), None), state(MockDepositService::new()))
            .await
            .expect_err("get_blocks should fail without hash");

        assert!(matches!(error, AppError::MissingParameter("hash")));
    }

    #[tokio::test]
    async fn service_errors_are_processing_errors() {
        let mut service = MockDepositService::new();
        service
            .expect_get_best_block()
            .returning(|_, _| Err(DepositServiceError::Provider(ProviderError::BlockNotFound)));

        let error = get_last_blocks(params(Some("SKY"), None), state(service))
            .await
            .expect_err("get_last_blocks should fail when the service fails");

        assert!(matches!(error, AppError::Processing(_)));
    }

    #[tokio::test]
    async fn indented_json_uses_four_spaces() {
        let response = indented_json(&serde_json::json!({"height": 1})).unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!("{\n    \"height\": 1\n}", String::from_utf8_lossy(&body));
    }
}
