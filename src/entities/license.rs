//! License entity - the single table of the license server.
//!
//! Each row is one issued key with its owner label, the HWID it is bound to
//! (if any), its status and the last calendar day it is usable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// License database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "licenses")]
pub struct Model {
    /// The license key handed to the customer
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Free-text owner label, informational only
    pub owner: String,
    /// Hardware identifier this key is bound to, None until first use
    pub hwid: Option<String>,
    /// `"VALID"` or `"BANNED"`
    pub status: String,
    /// Last usable day, `YYYY-MM-DD`
    pub expire_date: String,
    /// When the license was issued
    pub created_at: DateTimeUtc,
}

/// `License` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The bound HWID, treating an empty string the same as no HWID.
    #[must_use]
    pub fn bound_hwid(&self) -> Option<&str> {
        self.hwid.as_deref().filter(|h| !h.is_empty())
    }
}
