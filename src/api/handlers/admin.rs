//! Admin handlers. Every one checks the `X-Admin-Token` header first.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::core::{
    admin::{ban_license, require_admin},
    issuance::{IssueRequest, issue_license},
    status::LicenseStatus,
    store::{LicenseFilter, list_licenses, reset_licenses},
};
use crate::entities::license;
use crate::errors::{Error, Result};

/// Header carrying the admin credential.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

fn admin_credential(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateLicenseRequest {
    pub owner: Option<String>,
    pub days: Option<i64>,
    pub hwid: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLicenseResponse {
    pub key: String,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hwid: Option<String>,
    pub expire: String,
}

#[derive(Debug, Deserialize)]
pub struct BanRequest {
    pub key: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BanResponse {
    pub key: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LicenseResponse {
    pub key: String,
    pub owner: String,
    pub hwid: Option<String>,
    pub status: String,
    pub expire: String,
    pub created_at: String,
}

impl From<&license::Model> for LicenseResponse {
    fn from(license: &license::Model) -> Self {
        Self {
            key: license.key.clone(),
            owner: license.owner.clone(),
            hwid: license.bound_hwid().map(str::to_string),
            status: license.status.clone(),
            expire: license.expire_date.clone(),
            created_at: license.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListLicensesResponse {
    pub licenses: Vec<LicenseResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub deleted: u64,
}

pub async fn create_license(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateLicenseRequest>,
) -> Result<(StatusCode, Json<CreateLicenseResponse>)> {
    require_admin(&*state.gate, admin_credential(&headers))?;

    let issued = issue_license(
        &state.database,
        &*state.clock,
        IssueRequest {
            owner: request.owner,
            days: request.days,
            hwid: request.hwid,
        },
        state.default_days,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLicenseResponse {
            hwid: issued.bound_hwid().map(str::to_string),
            key: issued.key,
            owner: issued.owner,
            expire: issued.expire_date,
        }),
    ))
}

pub async fn ban(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<BanRequest>,
) -> Result<Json<BanResponse>> {
    require_admin(&*state.gate, admin_credential(&headers))?;

    let key = request
        .key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| Error::MissingInput {
            field: "key".to_string(),
        })?;

    ban_license(&state.database, &key, request.reason.as_deref()).await?;

    Ok(Json(BanResponse {
        key,
        status: LicenseStatus::Banned.to_string(),
    }))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<ListLicensesResponse>> {
    require_admin(&*state.gate, admin_credential(&headers))?;

    let status = params
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<LicenseStatus>)
        .transpose()?;
    let owner = params.owner.filter(|o| !o.is_empty());

    let licenses = list_licenses(&state.database, &LicenseFilter { status, owner }).await?;
    let licenses: Vec<LicenseResponse> = licenses.iter().map(LicenseResponse::from).collect();

    Ok(Json(ListLicensesResponse {
        total: licenses.len(),
        licenses,
    }))
}

pub async fn reset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ResetResponse>> {
    require_admin(&*state.gate, admin_credential(&headers))?;

    let deleted = reset_licenses(&state.database).await?;
    Ok(Json(ResetResponse { deleted }))
}
