use crate::domain::model::{Campaign, ContactInput, LeadDraft};
use crate::utils::error::{LeadError, Result, ValidationError};
use regex::Regex;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Checks the contact form fields and produces an immutable draft.
/// Field names in `MissingFields` follow form order.
pub fn validate_contact(
    input: &ContactInput,
    campaign: &Campaign,
) -> std::result::Result<LeadDraft, ValidationError> {
    let name = input.name.trim();
    let phone = input.phone.trim();
    let city = input.city.trim();

    let mut missing = Vec::new();
    if name.is_empty() {
        missing.push("Name".to_string());
    }
    if phone.is_empty() {
        missing.push("Phone".to_string());
    }
    if city.is_empty() {
        missing.push("City".to_string());
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    if !Regex::new(r"^\d{10}$").unwrap().is_match(phone) {
        return Err(ValidationError::InvalidPhone);
    }

    Ok(LeadDraft {
        page_url: campaign.page_url.clone(),
        project_name: campaign.project_name.clone(),
        name: name.to_string(),
        mobile: phone.to_string(),
        city: city.to_string(),
    })
}

/// OTP format check, performed before any network call.
pub fn validate_otp(otp: &str) -> std::result::Result<String, ValidationError> {
    let otp = otp.trim();
    if otp.is_empty() {
        return Err(ValidationError::MissingOtp);
    }
    if !Regex::new(r"^\d{4,6}$").unwrap().is_match(otp) {
        return Err(ValidationError::InvalidOtp);
    }
    Ok(otp.to_string())
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LeadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LeadError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(LeadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LeadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(LeadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}
