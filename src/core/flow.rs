use crate::config::LeadConfig;
use crate::core::timer::ResendTimer;
use crate::domain::model::{Campaign, ContactInput, LeadPayload, PendingVerification, TimerState};
use crate::domain::ports::{LeadGateway, NoticeKind, Presenter, ResendDisplay};
use crate::utils::error::ValidationError;
use crate::utils::validation;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Validating,
    SendingOtp,
    AwaitingOtpEntry,
    VerifyingOtp,
    Reconciling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// OTP challenge issued; the flow now waits for OTP entry.
    OtpSent,
    /// Send-OTP failed but the untokenized lead was captured.
    FallbackSaved,
    /// Send-OTP failed and the fallback capture failed too.
    FallbackFailed,
    Rejected(ValidationError),
    /// A newer submission started while this one was in flight.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Saved,
    /// The persist endpoint reported the contact as already saved;
    /// user-facing success.
    DuplicateSaved,
    /// Verified, but the verified persist failed for another reason.
    PartialFailure,
    /// The OTP was not accepted; the flow awaits another attempt.
    OtpRejected,
    Rejected(ValidationError),
    NoPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent,
    Failed,
    /// The countdown has not expired yet.
    NotReady,
    NoPending,
}

#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub campaign: Campaign,
    pub otp_modal: String,
    pub redirect_path: String,
    pub redirect_delay_ms: u64,
    pub resend_wait_seconds: u64,
    pub resend_retry_seconds: u64,
}

impl From<&LeadConfig> for FlowSettings {
    fn from(config: &LeadConfig) -> Self {
        Self {
            campaign: config.campaign(),
            otp_modal: config.otp_modal().to_string(),
            redirect_path: config.redirect_path().to_string(),
            redirect_delay_ms: config.redirect_delay_ms(),
            resend_wait_seconds: config.resend_wait_seconds(),
            resend_retry_seconds: config.resend_retry_seconds(),
        }
    }
}

/// The submission state machine. One instance serves every form on a page;
/// the single pending-verification slot is last-write-wins and each
/// submission is generation-stamped so a slow response cannot clobber a
/// newer flow.
pub struct SubmissionFlow<G: LeadGateway, P: Presenter> {
    gateway: G,
    presenter: P,
    resend_display: Arc<dyn ResendDisplay>,
    timer: ResendTimer,
    settings: FlowSettings,
    state: Mutex<FlowState>,
    pending: Mutex<Option<PendingVerification>>,
    first_persist_done: AtomicBool,
    generation: AtomicU64,
}

impl<G: LeadGateway, P: Presenter> SubmissionFlow<G, P> {
    pub fn new(
        gateway: G,
        presenter: P,
        resend_display: Arc<dyn ResendDisplay>,
        settings: FlowSettings,
    ) -> Self {
        let timer = ResendTimer::new(resend_display.clone());
        Self {
            gateway,
            presenter,
            resend_display,
            timer,
            settings,
            state: Mutex::new(FlowState::Idle),
            pending: Mutex::new(None),
            first_persist_done: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> FlowState {
        *self.state.lock().unwrap()
    }

    pub fn pending(&self) -> Option<PendingVerification> {
        self.pending.lock().unwrap().clone()
    }

    pub fn first_persist_done(&self) -> bool {
        self.first_persist_done.load(Ordering::SeqCst)
    }

    pub fn timer(&self) -> &ResendTimer {
        &self.timer
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    fn set_state(&self, state: FlowState) {
        *self.state.lock().unwrap() = state;
    }

    fn superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn notify_validation(&self, err: &ValidationError) {
        let kind = match err {
            ValidationError::MissingFields(_) | ValidationError::MissingOtp => NoticeKind::Warning,
            ValidationError::InvalidPhone | ValidationError::InvalidOtp => NoticeKind::Error,
        };
        self.presenter.notify(kind, err.title(), &err.user_message(), None);
    }

    /// Form submit: validate, issue the OTP challenge, capture the lead.
    pub async fn submit(&self, input: ContactInput) -> SubmitOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.set_state(FlowState::Validating);
        self.presenter
            .show_busy("Validating...", "Please wait while we verify your details.");

        let draft = match validation::validate_contact(&input, &self.settings.campaign) {
            Ok(draft) => draft,
            Err(err) => {
                self.presenter.clear_busy();
                self.notify_validation(&err);
                self.set_state(FlowState::Idle);
                return SubmitOutcome::Rejected(err);
            }
        };

        self.set_state(FlowState::SendingOtp);
        self.presenter
            .show_busy("Sending OTP...", "Please wait while we send an OTP to your mobile.");

        let send_result = self.gateway.send_otp(&draft).await;
        if self.superseded(generation) {
            tracing::warn!("discarding stale send OTP response for {}", draft.mobile);
            return SubmitOutcome::Superseded;
        }

        match send_result {
            Err(send_err) => {
                self.presenter.clear_busy();
                tracing::warn!("send OTP failed, capturing lead without OTP: {}", send_err);

                // Single best-effort save so the lead is not lost; never retried.
                let fallback = self
                    .gateway
                    .submit_lead(&LeadPayload::unverified(&draft))
                    .await;
                if self.superseded(generation) {
                    return SubmitOutcome::Superseded;
                }
                self.set_state(FlowState::Idle);

                match fallback {
                    Ok(receipt) => {
                        tracing::info!(status = receipt.status, "fallback lead save succeeded");
                        self.presenter.notify(
                            NoticeKind::Success,
                            "Submitted",
                            "Your details were submitted (OTP not sent).",
                            Some(2500),
                        );
                        SubmitOutcome::FallbackSaved
                    }
                    Err(save_err) => {
                        tracing::error!("fallback lead save failed: {}", save_err);
                        self.presenter.notify(
                            NoticeKind::Error,
                            "Error",
                            &format!(
                                "Could not send OTP and lead submission failed: {}",
                                send_err
                            ),
                            None,
                        );
                        SubmitOutcome::FallbackFailed
                    }
                }
            }
            Ok(token) => {
                // Later submits overwrite the slot; only one OTP flow is
                // meaningful per session.
                *self.pending.lock().unwrap() = Some(PendingVerification {
                    draft: draft.clone(),
                    token,
                });

                // First save is telemetry only; failures are logged, never
                // surfaced.
                let first = self
                    .gateway
                    .submit_lead(&LeadPayload::unverified(&draft))
                    .await;
                if self.superseded(generation) {
                    return SubmitOutcome::Superseded;
                }
                self.first_persist_done.store(first.is_ok(), Ordering::SeqCst);
                if let Err(err) = &first {
                    tracing::warn!("initial lead save failed: {}", err);
                }

                self.presenter.clear_busy();
                self.presenter.notify(
                    NoticeKind::Success,
                    "Check WhatsApp for OTP",
                    "We have sent a One-Time Password (OTP) to your registered mobile number via WhatsApp.",
                    Some(3500),
                );
                self.presenter.show_modal(&self.settings.otp_modal);
                self.timer.start(self.settings.resend_wait_seconds);
                self.set_state(FlowState::AwaitingOtpEntry);
                SubmitOutcome::OtpSent
            }
        }
    }

    /// OTP entry submit: verify, then persist the verified lead and
    /// reconcile the server's answer.
    pub async fn confirm_otp(&self, otp: &str) -> VerifyOutcome {
        let otp = match validation::validate_otp(otp) {
            Ok(otp) => otp,
            Err(err) => {
                self.notify_validation(&err);
                return VerifyOutcome::Rejected(err);
            }
        };

        let pending = match self.pending() {
            Some(pending) => pending,
            None => {
                self.presenter.notify(
                    NoticeKind::Error,
                    "Error",
                    "No form data found. Please fill the form again.",
                    None,
                );
                return VerifyOutcome::NoPending;
            }
        };

        self.set_state(FlowState::VerifyingOtp);
        self.presenter.hide_modal(&self.settings.otp_modal);
        self.presenter.show_busy("Verifying OTP...", "Please wait...");

        let verify_result = self.gateway.verify_otp(&pending.token, &otp).await;
        self.presenter.clear_busy();

        if let Err(err) = verify_result {
            tracing::info!("OTP verification failed: {}", err);
            self.presenter.notify(
                NoticeKind::Error,
                "OTP Verification Failed",
                "Incorrect OTP. Please try again.",
                None,
            );
            // Same token stays pending; the user retries without a new
            // send-OTP round.
            self.presenter.show_modal(&self.settings.otp_modal);
            self.timer.start(self.settings.resend_wait_seconds);
            self.set_state(FlowState::AwaitingOtpEntry);
            return VerifyOutcome::OtpRejected;
        }

        self.set_state(FlowState::Reconciling);
        self.presenter
            .show_busy("Submitting Verified Data...", "Saving verified entry...");

        // The verified payload binds to the stored draft, never to later
        // form state.
        let payload = LeadPayload::verified(&pending);
        let saved = self.gateway.submit_lead(&payload).await;
        self.presenter.clear_busy();

        let outcome = match saved {
            Ok(receipt) => {
                tracing::info!(status = receipt.status, "verified lead saved");
                self.presenter.notify(
                    NoticeKind::Success,
                    "Verified",
                    "OTP verified and data saved.",
                    Some(2000),
                );
                self.presenter
                    .schedule_redirect(&self.settings.redirect_path, self.settings.redirect_delay_ms);
                VerifyOutcome::Saved
            }
            Err(err) if err.indicates_duplicate() => {
                tracing::info!("duplicate on verified save, treated as success: {}", err);
                self.presenter.notify(
                    NoticeKind::Success,
                    "Verified",
                    "OTP verified, your contact is already saved.",
                    Some(2000),
                );
                self.presenter
                    .schedule_redirect(&self.settings.redirect_path, self.settings.redirect_delay_ms);
                VerifyOutcome::DuplicateSaved
            }
            Err(err) => {
                tracing::error!("verified lead save failed: {}", err);
                self.presenter.notify(
                    NoticeKind::Warning,
                    "Partial Success",
                    &format!(
                        "OTP verified but saving verified data failed. Server: {}",
                        err.server_message()
                    ),
                    None,
                );
                VerifyOutcome::PartialFailure
            }
        };

        self.finish_verification(&pending.token);
        outcome
    }

    /// Resend the active OTP challenge. Only available once the countdown
    /// has expired.
    pub async fn resend(&self) -> ResendOutcome {
        if self.timer.is_running() {
            tracing::debug!("resend requested while the countdown is still running");
            return ResendOutcome::NotReady;
        }

        let token = match self.pending.lock().unwrap().as_ref().map(|p| p.token.clone()) {
            Some(token) => token,
            None => {
                self.presenter.notify(
                    NoticeKind::Error,
                    "Error",
                    "No OTP token found to resend.",
                    None,
                );
                return ResendOutcome::NoPending;
            }
        };

        self.resend_display.resending();
        self.presenter.show_busy("Resending OTP...", "Please wait...");

        let result = self.gateway.resend_otp(&token).await;
        self.presenter.clear_busy();

        match result {
            Ok(()) => {
                self.presenter.notify(
                    NoticeKind::Success,
                    "OTP Sent",
                    "OTP has been resent to the mobile number.",
                    Some(2000),
                );
                self.timer.start(self.settings.resend_wait_seconds);
                ResendOutcome::Sent
            }
            Err(err) => {
                tracing::warn!("resend OTP failed: {}", err);
                self.presenter
                    .notify(NoticeKind::Error, "Resend Failed", &err.server_message(), None);
                // Short window so the user can retry quickly.
                self.timer.start(self.settings.resend_retry_seconds);
                ResendOutcome::Failed
            }
        }
    }

    /// Abandon the active challenge, if any.
    pub fn cancel(&self) {
        tracing::debug!("submission flow cancelled");
        *self.pending.lock().unwrap() = None;
        self.first_persist_done.store(false, Ordering::SeqCst);
        self.timer.stop();
        self.resend_display.reset();
        self.presenter.hide_modal(&self.settings.otp_modal);
        self.set_state(FlowState::Idle);
    }

    fn finish_verification(&self, token: &str) {
        {
            let mut slot = self.pending.lock().unwrap();
            // Only clear the slot if it still belongs to this verification.
            if slot.as_ref().is_some_and(|p| p.token == token) {
                *slot = None;
            }
        }
        self.first_persist_done.store(false, Ordering::SeqCst);
        self.timer.stop();
        self.resend_display.reset();
        self.set_state(FlowState::Idle);
    }
}
