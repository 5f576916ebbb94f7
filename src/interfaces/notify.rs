//! Outbound SMS, WhatsApp and voice messages.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::adapter::{AdapterError, CapabilityAdapter};

/// Delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Sms,
    WhatsApp,
    Voice,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::WhatsApp => "whatsapp",
            Channel::Voice => "voice",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sms" => Ok(Channel::Sms),
            "whatsapp" => Ok(Channel::WhatsApp),
            "voice" => Ok(Channel::Voice),
            other => Err(format!("Unsupported notification method: {}", other)),
        }
    }
}

/// Acknowledgement from the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Provider message/call id; demo receipts start with `demo-`.
    pub id: String,
    pub channel: Channel,
    pub to: String,
    pub status: String,
}

/// Sends a message to a phone number.
#[async_trait]
pub trait Notifier: CapabilityAdapter {
    async fn send(
        &self,
        channel: Channel,
        to: &str,
        message: &str,
    ) -> Result<DeliveryReceipt, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parsing() {
        assert_eq!("SMS".parse::<Channel>().unwrap(), Channel::Sms);
        assert_eq!("WhatsApp".parse::<Channel>().unwrap(), Channel::WhatsApp);
        assert!("pigeon".parse::<Channel>().is_err());
        let ch: Channel = serde_json::from_str("\"whatsapp\"").unwrap();
        assert_eq!(ch, Channel::WhatsApp);
    }
}
