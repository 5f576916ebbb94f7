//! Twilio SMS, WhatsApp and voice notifier.

use async_trait::async_trait;
use serde::Deserialize;

use super::http;
use crate::capabilities::{AdapterMode, Capability, Credential};
use crate::config::Settings;
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::notify::{Channel, DeliveryReceipt, Notifier};

const VENDOR: &str = "Twilio";

/// Live [`Notifier`] using the Twilio REST API with basic auth.
pub struct TwilioNotifier {
    client: reqwest::Client,
    base_url: String,
    credential: Credential,
    fingerprint: String,
    from_number: String,
    whatsapp_from: String,
}

#[derive(Debug, Deserialize)]
struct TwilioResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

impl TwilioNotifier {
    /// `credential` is `account_sid:auth_token`.
    pub fn new(client: reqwest::Client, settings: &Settings, credential: Credential) -> Self {
        let fingerprint = credential.fingerprint();
        Self {
            client,
            base_url: settings.endpoints.twilio.trim_end_matches('/').to_string(),
            credential,
            fingerprint,
            from_number: settings.twilio_phone_number.clone(),
            whatsapp_from: settings.twilio_whatsapp_number.clone(),
        }
    }

    fn account(&self) -> (&str, &str) {
        self.credential.pair().unwrap_or_default()
    }

    async fn post(&self, resource: &str, form: &[(&str, &str)]) -> Result<TwilioResource, AdapterError> {
        let (sid, token) = self.account();
        let request = self
            .client
            .post(format!("{}/Accounts/{}/{}.json", self.base_url, sid, resource))
            .basic_auth(sid, Some(token))
            .form(form);
        http::send_json(VENDOR, request).await
    }
}

/// TwiML that reads `message` aloud.
pub fn voice_twiml(message: &str) -> String {
    format!(
        "<Response><Say voice=\"alice\">{}</Say></Response>",
        escape_xml(message)
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{}", number)
    }
}

impl CapabilityAdapter for TwilioNotifier {
    fn name(&self) -> &str {
        "Twilio"
    }

    fn capability(&self) -> Capability {
        Capability::Notify
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Live
    }

    fn credential_fingerprint(&self) -> Option<&str> {
        Some(&self.fingerprint)
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send(
        &self,
        channel: Channel,
        to: &str,
        message: &str,
    ) -> Result<DeliveryReceipt, AdapterError> {
        let resource = match channel {
            Channel::Sms => {
                self.post(
                    "Messages",
                    &[("To", to), ("From", self.from_number.as_str()), ("Body", message)],
                )
                .await?
            }
            Channel::WhatsApp => {
                let to = whatsapp_address(to);
                let from = whatsapp_address(&self.whatsapp_from);
                self.post(
                    "Messages",
                    &[("To", to.as_str()), ("From", from.as_str()), ("Body", message)],
                )
                .await?
            }
            Channel::Voice => {
                let twiml = voice_twiml(message);
                self.post(
                    "Calls",
                    &[("To", to), ("From", self.from_number.as_str()), ("Twiml", twiml.as_str())],
                )
                .await?
            }
        };
        log::info!("Twilio {} accepted: {}", channel, resource.sid);
        Ok(DeliveryReceipt {
            id: resource.sid,
            channel,
            to: to.to_string(),
            status: resource.status.unwrap_or_else(|| "queued".to_string()),
        })
    }
}
