use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::capabilities::{AdapterMode, Capability};
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::notify::{Channel, DeliveryReceipt, Notifier};

/// A message the demo notifier accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub channel: Channel,
    pub to: String,
    pub message: String,
}

/// Accepts every message and keeps it for inspection.
#[derive(Default)]
pub struct DemoNotifier {
    sent: Mutex<Vec<SentMessage>>,
}

impl DemoNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }
}

impl CapabilityAdapter for DemoNotifier {
    fn name(&self) -> &str {
        "Demo notifier"
    }

    fn capability(&self) -> Capability {
        Capability::Notify
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Demo
    }
}

#[async_trait]
impl Notifier for DemoNotifier {
    async fn send(
        &self,
        channel: Channel,
        to: &str,
        message: &str,
    ) -> Result<DeliveryReceipt, AdapterError> {
        log::info!("[demo] {} to {}: {}", channel, to, message);
        self.sent.lock().push(SentMessage {
            channel,
            to: to.to_string(),
            message: message.to_string(),
        });
        Ok(DeliveryReceipt {
            id: format!("demo-{}", Uuid::new_v4()),
            channel,
            to: to.to_string(),
            status: "sent".to_string(),
        })
    }
}
