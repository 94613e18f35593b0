//! macro request/response handling
//!
//! Field names follow the CloudFormation macro contract and must not change.
use crate::config::MacroConfig;
use crate::transform::transform_in_place;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event CloudFormation sends to the macro
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroRequest {
    pub request_id: String,
    pub fragment: Value,
    #[serde(default)]
    pub transform_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

#[derive(derive_new::new, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroResponse {
    pub request_id: String,
    pub status: Status,
    pub fragment: Value,
}

/// Transforms the request fragment and reports the outcome
///
/// Never fails. Any rejected fragment results in [Status::Failure] with the fragment returned exactly as received.
pub fn handle(request: MacroRequest, config: &MacroConfig) -> MacroResponse {
    let MacroRequest {
        request_id,
        mut fragment,
        transform_id,
        region,
        account_id,
    } = request;

    let _span = tracing::info_span!(
        "handle",
        %request_id,
        transform_id = transform_id.as_deref(),
        region = region.as_deref(),
        account_id = account_id.as_deref(),
    )
    .entered();

    let status = match transform_in_place(&mut fragment, config) {
        Ok(rewritten) => {
            tracing::info!(rewritten, "fragment transformed");
            Status::Success
        }
        Err(error) => {
            tracing::warn!(%error, "fragment rejected");
            Status::Failure
        }
    };

    MacroResponse::new(request_id, status, fragment)
}
