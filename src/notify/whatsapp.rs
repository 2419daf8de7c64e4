//! Welcome message over the WhatsApp messaging API

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::config::WhatsAppConfig;
use crate::domain::normalize_phone;

use super::{Notifier, NotifyError, WelcomeMessage};

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

pub struct WhatsAppNotifier {
    client: reqwest::Client,
    messages_url: String,
    account_sid: String,
    auth_token: Secret<String>,
    sender: String,
    country_code: String,
}

impl WhatsAppNotifier {
    pub fn new(config: &WhatsAppConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::WhatsApp(e.to_string()))?;

        Ok(Self {
            client,
            messages_url: messages_url(&config.api_base, &config.account_sid),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            sender: config.sender.clone(),
            country_code: config.country_code.clone(),
        })
    }
}

fn messages_url(api_base: &str, account_sid: &str) -> String {
    format!(
        "{}/2010-04-01/Accounts/{}/Messages.json",
        api_base.trim_end_matches('/'),
        account_sid
    )
}

fn welcome_text(message: &WelcomeMessage) -> String {
    format!(
        "Olá {}! A licença SynapseLab de {} foi ativada. Seu login é {}.",
        message.recipient_name, message.organization, message.email
    )
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    fn channel(&self) -> &'static str {
        "whatsapp"
    }

    async fn send_welcome(&self, message: &WelcomeMessage) -> Result<(), NotifyError> {
        let to = format!(
            "whatsapp:{}",
            normalize_phone(&message.phone, &self.country_code)
        );
        let from = format!("whatsapp:{}", self.sender);
        let body = welcome_text(message);

        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[("From", from.as_str()), ("To", to.as_str()), ("Body", body.as_str())])
            .send()
            .await
            .map_err(|e| NotifyError::WhatsApp(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = match response.json::<ApiError>().await {
            Ok(ApiError {
                code: Some(code),
                message: Some(msg),
            }) => format!("{} (code {})", msg, code),
            Ok(ApiError {
                message: Some(msg), ..
            }) => msg,
            _ => "no error body".to_string(),
        };

        Err(NotifyError::WhatsApp(format!("HTTP {}: {}", status, detail)))
    }
}
