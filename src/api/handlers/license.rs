//! Public handlers: liveness and license verification.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::core::authority::{Verdict, verify_license};
use crate::core::store::DATE_FORMAT;
use crate::errors::Result;

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub key: Option<String>,
    pub hwid: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_left: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hwid: Option<String>,
}

impl From<&Verdict> for VerifyResponse {
    fn from(verdict: &Verdict) -> Self {
        let mut response = Self {
            status: verdict.status_literal().to_string(),
            expire: None,
            days_left: None,
            hwid: None,
        };
        if let Verdict::Valid {
            expire,
            days_left,
            hwid,
        } = verdict
        {
            response.expire = Some(expire.format(DATE_FORMAT).to_string());
            response.days_left = Some(*days_left);
            response.hwid.clone_from(hwid);
        }
        response
    }
}

/// HTTP status for a verdict.
pub const fn verdict_status_code(verdict: &Verdict) -> StatusCode {
    match verdict {
        Verdict::MissingKey => StatusCode::BAD_REQUEST,
        Verdict::Invalid => StatusCode::NOT_FOUND,
        Verdict::HwidMismatch | Verdict::Inactive(_) | Verdict::Expired => StatusCode::FORBIDDEN,
        Verdict::Valid { .. } => StatusCode::OK,
    }
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub message: &'static str,
}

pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "License server active",
    })
}

pub async fn verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Result<(StatusCode, Json<VerifyResponse>)> {
    let verdict = verify_license(
        &state.database,
        &*state.clock,
        params.key.as_deref(),
        params.hwid.as_deref(),
    )
    .await?;

    Ok((
        verdict_status_code(&verdict),
        Json(VerifyResponse::from(&verdict)),
    ))
}
