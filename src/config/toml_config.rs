use crate::domain::model::Campaign;
use crate::domain::ports::EndpointProvider;
use crate::utils::error::{LeadError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_REDIRECT_PATH: &str = "/thankyou.html";
const DEFAULT_REDIRECT_DELAY_MS: u64 = 1400;
const DEFAULT_RESEND_WAIT_SECONDS: u64 = 30;
const DEFAULT_RESEND_RETRY_SECONDS: u64 = 10;
const DEFAULT_OTP_MODAL: &str = "modal14";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadConfig {
    pub campaign: CampaignConfig,
    pub endpoints: EndpointConfig,
    pub flow: Option<FlowConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub project_name: String,
    pub page_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub send_otp: String,
    pub resend_otp: String,
    pub verify_otp: String,
    pub lead_save: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FlowConfig {
    pub redirect_path: Option<String>,
    pub redirect_delay_ms: Option<u64>,
    pub resend_wait_seconds: Option<u64>,
    pub resend_retry_seconds: Option<u64>,
    pub otp_modal: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

impl LeadConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LeadError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LeadError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` occurrences with the environment value;
    /// unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("endpoints.send_otp", &self.endpoints.send_otp)?;
        crate::utils::validation::validate_url("endpoints.resend_otp", &self.endpoints.resend_otp)?;
        crate::utils::validation::validate_url("endpoints.verify_otp", &self.endpoints.verify_otp)?;
        crate::utils::validation::validate_url("endpoints.lead_save", &self.endpoints.lead_save)?;

        crate::utils::validation::validate_non_empty_string(
            "campaign.project_name",
            &self.campaign.project_name,
        )?;
        crate::utils::validation::validate_non_empty_string(
            "campaign.page_url",
            &self.campaign.page_url,
        )?;

        crate::utils::validation::validate_positive_number(
            "flow.resend_wait_seconds",
            self.resend_wait_seconds(),
            1,
        )?;
        crate::utils::validation::validate_positive_number(
            "flow.resend_retry_seconds",
            self.resend_retry_seconds(),
            1,
        )?;
        crate::utils::validation::validate_positive_number(
            "flow.request_timeout_seconds",
            self.request_timeout_seconds(),
            1,
        )?;

        Ok(())
    }

    pub fn campaign(&self) -> Campaign {
        Campaign {
            page_url: self.campaign.page_url.clone(),
            project_name: self.campaign.project_name.clone(),
        }
    }

    pub fn redirect_path(&self) -> &str {
        self.flow
            .as_ref()
            .and_then(|f| f.redirect_path.as_deref())
            .unwrap_or(DEFAULT_REDIRECT_PATH)
    }

    pub fn redirect_delay_ms(&self) -> u64 {
        self.flow
            .as_ref()
            .and_then(|f| f.redirect_delay_ms)
            .unwrap_or(DEFAULT_REDIRECT_DELAY_MS)
    }

    pub fn resend_wait_seconds(&self) -> u64 {
        self.flow
            .as_ref()
            .and_then(|f| f.resend_wait_seconds)
            .unwrap_or(DEFAULT_RESEND_WAIT_SECONDS)
    }

    pub fn resend_retry_seconds(&self) -> u64 {
        self.flow
            .as_ref()
            .and_then(|f| f.resend_retry_seconds)
            .unwrap_or(DEFAULT_RESEND_RETRY_SECONDS)
    }

    pub fn otp_modal(&self) -> &str {
        self.flow
            .as_ref()
            .and_then(|f| f.otp_modal.as_deref())
            .unwrap_or(DEFAULT_OTP_MODAL)
    }

    pub fn request_timeout_seconds(&self) -> u64 {
        self.flow
            .as_ref()
            .and_then(|f| f.request_timeout_seconds)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS)
    }
}

impl EndpointProvider for LeadConfig {
    fn send_otp_url(&self) -> &str {
        &self.endpoints.send_otp
    }

    fn resend_otp_url(&self) -> &str {
        &self.endpoints.resend_otp
    }

    fn verify_otp_url(&self) -> &str {
        &self.endpoints.verify_otp
    }

    fn lead_save_url(&self) -> &str {
        &self.endpoints.lead_save
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds())
    }
}

impl Validate for LeadConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
