use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker prepended to the lead name on the post-verification save.
pub const VERIFIED_NAME_PREFIX: &str = "OTP_";

/// Campaign context merged into every draft. Comes from configuration,
/// not from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    pub page_url: String,
    pub project_name: String,
}

/// Raw form input as read from the submission surface, untrimmed.
#[derive(Debug, Clone, Default)]
pub struct ContactInput {
    pub name: String,
    pub phone: String,
    pub city: String,
}

/// A validated lead. Immutable once constructed per submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDraft {
    pub page_url: String,
    pub project_name: String,
    pub name: String,
    pub mobile: String,
    pub city: String,
}

/// The single active OTP challenge. The token binds resend/verify calls to
/// the draft that produced it; the draft stored here is what gets persisted
/// after verification, regardless of later form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    pub draft: LeadDraft,
    pub token: String,
}

/// Wire payload for the lead-persist endpoint. The token fields are only
/// present on the verified save.
#[derive(Debug, Clone, Serialize)]
pub struct LeadPayload {
    pub page_url: String,
    pub project_name: String,
    pub name: String,
    pub mobile: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_verified: Option<bool>,
}

impl LeadPayload {
    pub fn unverified(draft: &LeadDraft) -> Self {
        Self {
            page_url: draft.page_url.clone(),
            project_name: draft.project_name.clone(),
            name: draft.name.clone(),
            mobile: draft.mobile.clone(),
            city: draft.city.clone(),
            otp_token: None,
            otp_verified: None,
        }
    }

    pub fn verified(pending: &PendingVerification) -> Self {
        let draft = &pending.draft;
        Self {
            page_url: draft.page_url.clone(),
            project_name: draft.project_name.clone(),
            name: format!("{}{}", VERIFIED_NAME_PREFIX, draft.name),
            mobile: draft.mobile.clone(),
            city: draft.city.clone(),
            otp_token: Some(pending.token.clone()),
            otp_verified: Some(true),
        }
    }
}

/// What the persist endpoint answered on success.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub status: u16,
    pub body_text: String,
    pub body_json: Option<Value>,
}

/// Countdown snapshot owned by the resend timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub running: bool,
}
