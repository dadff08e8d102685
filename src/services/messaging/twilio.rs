use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::{fit_sms_body, MessagingProvider, MAX_SMS_CHARS};

const API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Error body Twilio returns on 4xx responses.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<i64>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    sid: String,
}

pub struct TwilioSmsProvider {
    account_sid: String,
    auth_token: String,
    from_number: String,
    api_base: String,
    client: reqwest::Client,
}

impl TwilioSmsProvider {
    pub fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            account_sid,
            auth_token,
            from_number,
            api_base: API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from_number.is_empty()
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }
}

fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(ApiError { code: Some(code), message }) => format!("Twilio {status} (code {code}): {message}"),
        Ok(ApiError { code: None, message }) => format!("Twilio {status}: {message}"),
        Err(_) => format!("Twilio {status}"),
    }
}

#[async_trait]
impl MessagingProvider for TwilioSmsProvider {
    async fn send_message(&self, to: &str, body: &str) -> anyhow::Result<()> {
        anyhow::ensure!(self.is_configured(), "Twilio credentials are not configured");
        anyhow::ensure!(!to.trim().is_empty(), "no recipient number");

        let body = fit_sms_body(body, MAX_SMS_CHARS);
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body.as_str())])
            .send()
            .await
            .context("Twilio request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!(describe_failure(status, &text));
        }

        let sent: SentMessage = response
            .json()
            .await
            .context("unexpected Twilio response")?;
        tracing::info!(%to, sid = %sent.sid, chars = body.chars().count(), "SMS queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> TwilioSmsProvider {
        TwilioSmsProvider::new("AC123".into(), "token".into(), "+15551234567".into())
    }

    #[tokio::test]
    async fn test_unconfigured_provider_refuses_to_send() {
        let provider = TwilioSmsProvider::new(String::new(), String::new(), String::new());
        assert!(!provider.is_configured());
        assert!(provider.send_message("+15550001111", "hi").await.is_err());
    }

    #[tokio::test]
    async fn test_blank_recipient_is_rejected() {
        let err = provider().send_message("  ", "hi").await.unwrap_err();
        assert!(err.to_string().contains("recipient"));
    }

    #[test]
    fn test_messages_url_uses_account_sid() {
        let mut p = provider();
        assert_eq!(
            p.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
        p.api_base = "http://localhost:9000/".into();
        assert_eq!(p.messages_url(), "http://localhost:9000/Accounts/AC123/Messages.json");
    }

    #[test]
    fn test_failure_description_includes_twilio_message() {
        let body = r#"{"code": 21211, "message": "The 'To' number is not valid.", "status": 400}"#;
        assert_eq!(
            describe_failure(reqwest::StatusCode::BAD_REQUEST, body),
            "Twilio 400 Bad Request (code 21211): The 'To' number is not valid."
        );
        assert_eq!(
            describe_failure(reqwest::StatusCode::BAD_GATEWAY, "<html>"),
            "Twilio 502 Bad Gateway"
        );
    }
}
