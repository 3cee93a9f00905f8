//! Notification sink that writes deliveries to the log.
//!
//! Stands in for the chat transport: a deployment that fronts the API with
//! a chat bot swaps this for a sink that sends direct messages.

use kickoff_core::notify::{DeliveryError, Notification, NotificationSink};
use tracing::info;

/// Logs each notification at `info` and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        info!(
            recipient = %notification.recipient.id,
            recipient_name = notification.recipient.display_name,
            kind = ?notification.kind,
            text = notification.text,
            "notification"
        );
        Ok(())
    }
}
