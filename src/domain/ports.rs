use crate::domain::model::{LeadDraft, LeadPayload, SubmitReceipt};
use crate::utils::error::ApiResult;
use async_trait::async_trait;
use std::time::Duration;

/// The four remote lead operations. Implementations interpret each
/// endpoint's response shape and never let a raw transport error escape.
#[async_trait]
pub trait LeadGateway: Send + Sync {
    /// Returns the OTP challenge token on success.
    async fn send_otp(&self, draft: &LeadDraft) -> ApiResult<String>;
    async fn resend_otp(&self, token: &str) -> ApiResult<()>;
    async fn verify_otp(&self, token: &str, otp: &str) -> ApiResult<()>;
    async fn submit_lead(&self, payload: &LeadPayload) -> ApiResult<SubmitReceipt>;
}

/// Where the gateway sends its requests.
pub trait EndpointProvider: Send + Sync {
    fn send_otp_url(&self) -> &str;
    fn resend_otp_url(&self) -> &str;
    fn verify_otp_url(&self) -> &str;
    fn lead_save_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Minimal presentation surface the flow drives. Modal ids and redirect
/// targets are opaque to the core.
pub trait Presenter: Send + Sync {
    fn show_modal(&self, id: &str);
    fn hide_modal(&self, id: &str);
    fn notify(&self, kind: NoticeKind, title: &str, message: &str, duration_ms: Option<u64>);
    fn show_busy(&self, title: &str, message: &str);
    fn clear_busy(&self);
    fn schedule_redirect(&self, path: &str, delay_ms: u64);
}

/// Resend-availability display. The timer drives `countdown`/`ready`;
/// the flow drives `resending`/`reset`.
pub trait ResendDisplay: Send + Sync {
    fn countdown(&self, remaining: u64);
    fn ready(&self);
    fn resending(&self);
    fn reset(&self);
}
