//! Audit trail entries written alongside ledger and status mutations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditAction {
    PaymentRecorded,
    PaymentEdited,
    PaymentDeleted,
    StatusChanged,
    ScheduleRebuilt,
    InstallmentEdited,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub action: AuditAction,
    pub actor: Option<String>,
    pub detail: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        contract_id: Uuid,
        action: AuditAction,
        actor: Option<&str>,
        detail: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id,
            action,
            actor: actor.map(str::to_string),
            detail,
            recorded_at: Utc::now(),
        }
    }
}
