use crate::core::{ApiResult, EndpointProvider, LeadDraft, LeadGateway, LeadPayload, SubmitReceipt};
use crate::utils::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};

/// HTTP implementation of the four lead operations. Interprets each
/// endpoint's response shape; performs no retries of its own.
pub struct HttpLeadGateway<C: EndpointProvider> {
    config: C,
    client: Client,
}

impl<C: EndpointProvider> HttpLeadGateway<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> ApiResult<reqwest::Response> {
        tracing::debug!("POST {}", url);
        self.client
            .post(url)
            .timeout(self.config.request_timeout())
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::network(format!("request to {} failed: {}", url, e)))
    }
}

/// First non-empty token wins: top-level `token`, then `data.token`.
fn extract_token(body: &Value) -> Option<String> {
    let top = body
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty());
    let nested = body
        .get("data")
        .and_then(|d| d.get("token"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty());
    top.or(nested).map(str::to_string)
}

/// Only an explicit positive signal counts; a 2xx body without one is a
/// failure.
fn is_verified(body: &Value) -> bool {
    if body.get("success").and_then(Value::as_bool) == Some(true) {
        return true;
    }
    if body.get("status").and_then(Value::as_str) == Some("success") {
        return true;
    }
    if body.as_bool() == Some(true) {
        return true;
    }
    if let Some(data) = body.get("data") {
        if data.get("verified").and_then(Value::as_bool) == Some(true)
            || data.get("success").and_then(Value::as_bool) == Some(true)
        {
            return true;
        }
    }
    false
}

#[async_trait]
impl<C: EndpointProvider> LeadGateway for HttpLeadGateway<C> {
    async fn send_otp(&self, draft: &LeadDraft) -> ApiResult<String> {
        let response = self.post_json(self.config.send_otp_url(), draft).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::network(format!(
                "send OTP failed with status {}",
                status.as_u16()
            ))
            .with_status(status.as_u16())
            .with_body(body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::protocol(format!("send OTP returned an unparsable body: {}", e)))?;

        match extract_token(&body) {
            Some(token) => Ok(token),
            None => Err(ApiError::protocol("send OTP response carried no token")
                .with_status(status.as_u16())
                .with_body(body.to_string())),
        }
    }

    async fn resend_otp(&self, token: &str) -> ApiResult<()> {
        let response = self
            .post_json(self.config.resend_otp_url(), &json!({ "token": token }))
            .await?;
        let status = response.status();

        // Success is the 2xx status alone; the body is not inspected.
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::network(format!(
                "resend OTP failed with status {}",
                status.as_u16()
            ))
            .with_status(status.as_u16())
            .with_body(body))
        }
    }

    async fn verify_otp(&self, token: &str, otp: &str) -> ApiResult<()> {
        let response = self
            .post_json(
                self.config.verify_otp_url(),
                &json!({ "token": token, "otp": otp }),
            )
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::network(format!(
                "verify OTP failed with status {}",
                status.as_u16()
            ))
            .with_status(status.as_u16())
            .with_body(body));
        }

        let body: Value = response.json().await.map_err(|e| {
            ApiError::protocol(format!("verify OTP returned an unparsable body: {}", e))
        })?;

        if is_verified(&body) {
            Ok(())
        } else {
            Err(ApiError::protocol("OTP verification rejected by server")
                .with_status(status.as_u16())
                .with_body(body.to_string()))
        }
    }

    async fn submit_lead(&self, payload: &LeadPayload) -> ApiResult<SubmitReceipt> {
        let response = self.post_json(self.config.lead_save_url(), payload).await?;
        let status = response.status().as_u16();

        let body_text = response.text().await.unwrap_or_default();
        let body_json: Option<Value> = serde_json::from_str(&body_text).ok();

        if (200..300).contains(&status) {
            Ok(SubmitReceipt {
                status,
                body_text,
                body_json,
            })
        } else {
            Err(ApiError::network(format!("lead save failed with status {}", status))
                .with_status(status)
                .with_body(body_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ApiErrorKind;
    use httpmock::prelude::*;
    use std::time::Duration;

    struct MockEndpoints {
        send_otp: String,
        resend_otp: String,
        verify_otp: String,
        lead_save: String,
    }

    impl MockEndpoints {
        fn new(server: &MockServer) -> Self {
            Self {
                send_otp: server.url("/lead/sendOTP"),
                resend_otp: server.url("/lead/resendOTP"),
                verify_otp: server.url("/lead/verifyOTP"),
                lead_save: server.url("/lead/save"),
            }
        }
    }

    impl EndpointProvider for MockEndpoints {
        fn send_otp_url(&self) -> &str {
            &self.send_otp
        }

        fn resend_otp_url(&self) -> &str {
            &self.resend_otp
        }

        fn verify_otp_url(&self) -> &str {
            &self.verify_otp
        }

        fn lead_save_url(&self) -> &str {
            &self.lead_save
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(5)
        }
    }

    fn draft() -> LeadDraft {
        LeadDraft {
            page_url: "https://example.com/landing".to_string(),
            project_name: "Max Sector 105".to_string(),
            name: "Jane".to_string(),
            mobile: "9876543210".to_string(),
            city: "Pune".to_string(),
        }
    }

    fn gateway(server: &MockServer) -> HttpLeadGateway<MockEndpoints> {
        HttpLeadGateway::new(MockEndpoints::new(server))
    }

    #[tokio::test]
    async fn test_send_otp_reads_top_level_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/lead/sendOTP")
                .json_body(serde_json::to_value(draft()).unwrap());
            then.status(200).json_body(serde_json::json!({ "token": "abc" }));
        });

        let token = gateway(&server).send_otp(&draft()).await.unwrap();

        mock.assert();
        assert_eq!(token, "abc");
    }

    #[tokio::test]
    async fn test_send_otp_reads_nested_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lead/sendOTP");
            then.status(200)
                .json_body(serde_json::json!({ "data": { "token": "nested-tok" } }));
        });

        let token = gateway(&server).send_otp(&draft()).await.unwrap();
        assert_eq!(token, "nested-tok");
    }

    #[tokio::test]
    async fn test_send_otp_skips_empty_top_level_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lead/sendOTP");
            then.status(200)
                .json_body(serde_json::json!({ "token": "", "data": { "token": "tok2" } }));
        });

        let token = gateway(&server).send_otp(&draft()).await.unwrap();
        assert_eq!(token, "tok2");
    }

    #[tokio::test]
    async fn test_send_otp_missing_token_is_protocol_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lead/sendOTP");
            then.status(200).json_body(serde_json::json!({ "ok": true }));
        });

        let err = gateway(&server).send_otp(&draft()).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Protocol);
    }

    #[tokio::test]
    async fn test_send_otp_non_2xx_is_network_error_with_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lead/sendOTP");
            then.status(500).body("backend down");
        });

        let err = gateway(&server).send_otp(&draft()).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);
        assert_eq!(err.http_status, Some(500));
        assert_eq!(err.body_text.as_deref(), Some("backend down"));
    }

    #[tokio::test]
    async fn test_resend_otp_succeeds_on_2xx_without_body_inspection() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/lead/resendOTP")
                .json_body(serde_json::json!({ "token": "abc" }));
            then.status(200).body("not even json");
        });

        gateway(&server).resend_otp("abc").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_resend_otp_fails_on_non_2xx() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lead/resendOTP");
            then.status(429);
        });

        let err = gateway(&server).resend_otp("abc").await.unwrap_err();
        assert_eq!(err.http_status, Some(429));
    }

    #[tokio::test]
    async fn test_verify_otp_accepts_each_positive_shape() {
        let bodies = [
            serde_json::json!({ "success": true }),
            serde_json::json!({ "status": "success" }),
            serde_json::json!(true),
            serde_json::json!({ "data": { "verified": true } }),
            serde_json::json!({ "data": { "success": true } }),
        ];

        for body in bodies {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(POST)
                    .path("/lead/verifyOTP")
                    .json_body(serde_json::json!({ "token": "abc", "otp": "1234" }));
                then.status(200).json_body(body.clone());
            });

            let result = gateway(&server).verify_otp("abc", "1234").await;
            assert!(result.is_ok(), "body {:?} should verify", body);
        }
    }

    #[tokio::test]
    async fn test_verify_otp_defaults_to_failure_without_positive_signal() {
        let bodies = [
            serde_json::json!({}),
            serde_json::json!({ "success": false }),
            serde_json::json!({ "status": "pending" }),
            serde_json::json!({ "data": { "verified": false } }),
        ];

        for body in bodies {
            let server = MockServer::start();
            server.mock(|when, then| {
                when.method(POST).path("/lead/verifyOTP");
                then.status(200).json_body(body.clone());
            });

            let err = gateway(&server).verify_otp("abc", "1234").await.unwrap_err();
            assert_eq!(err.kind, ApiErrorKind::Protocol, "body {:?}", body);
        }
    }

    #[tokio::test]
    async fn test_verify_otp_non_2xx_is_network_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lead/verifyOTP");
            then.status(401).body("expired");
        });

        let err = gateway(&server).verify_otp("abc", "1234").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);
        assert_eq!(err.http_status, Some(401));
    }

    #[tokio::test]
    async fn test_submit_lead_returns_receipt_with_parsed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lead/save");
            then.status(200)
                .json_body(serde_json::json!({ "id": 42, "saved": true }));
        });

        let receipt = gateway(&server)
            .submit_lead(&LeadPayload::unverified(&draft()))
            .await
            .unwrap();

        assert_eq!(receipt.status, 200);
        assert_eq!(receipt.body_json.unwrap()["id"], 42);
    }

    #[tokio::test]
    async fn test_submit_lead_tolerates_non_json_success_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lead/save");
            then.status(201).body("saved, thanks");
        });

        let receipt = gateway(&server)
            .submit_lead(&LeadPayload::unverified(&draft()))
            .await
            .unwrap();

        assert_eq!(receipt.status, 201);
        assert_eq!(receipt.body_text, "saved, thanks");
        assert!(receipt.body_json.is_none());
    }

    #[tokio::test]
    async fn test_submit_lead_failure_attaches_body_for_inspection() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lead/save");
            then.status(409)
                .json_body(serde_json::json!({ "msg": "Already submitted contact" }));
        });

        let err = gateway(&server)
            .submit_lead(&LeadPayload::unverified(&draft()))
            .await
            .unwrap_err();

        assert_eq!(err.http_status, Some(409));
        assert!(err.indicates_duplicate());
        assert_eq!(err.body_json.unwrap()["msg"], "Already submitted contact");
    }
}
