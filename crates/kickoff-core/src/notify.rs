//! Notification outbox and delivery.
//!
//! Commands never talk to the chat transport. They return the
//! notifications they produced; the service queues them on the
//! [`NotificationOutbox`] after releasing its lock, and a separate
//! [`dispatch`] task delivers them through a [`NotificationSink`].
//!
//! Delivery is best-effort: a notification that still fails after
//! `max_attempts` is logged and dropped. State is never rolled back because
//! a message could not be sent.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use kickoff_types::{EventDetails, Participant};

use crate::config::NotificationConfig;

/// Why a notification is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A seat opened after someone declined.
    PromotedAfterDecline,
    /// A seat opened after a no-show.
    PromotedAfterNoShow,
    /// A seat opened after a banned participant was evicted.
    PromotedAfterEviction,
    /// An admin closed voting.
    VotingClosed,
    /// An admin edited the published event.
    EventUpdated,
}

/// A message for one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Who should receive it.
    pub recipient: Participant,
    /// Why it is sent.
    pub kind: NotificationKind,
    /// Message text.
    pub text: String,
}

impl Notification {
    /// Tell a promoted participant they now hold a seat.
    pub fn promoted(recipient: Participant, kind: NotificationKind) -> Self {
        let text = match kind {
            NotificationKind::PromotedAfterNoShow => {
                "A spot opened up for you due to a no-show. You're now confirmed!"
            }
            _ => "A spot opened up for you. You're now confirmed!",
        };
        Self {
            recipient,
            kind,
            text: text.to_owned(),
        }
    }

    /// Tell a confirmed participant that voting is over.
    pub fn voting_closed(recipient: Participant) -> Self {
        Self {
            recipient,
            kind: NotificationKind::VotingClosed,
            text: "Voting has been closed by an admin. Thank you for participating!".to_owned(),
        }
    }

    /// Tell a confirmed participant the event details changed.
    pub fn event_updated(recipient: Participant, event: &EventDetails) -> Self {
        Self {
            recipient,
            kind: NotificationKind::EventUpdated,
            text: format!(
                "Attention: the event details have been updated.\n{}\n{}\nKick-off: {}",
                event.title,
                event.description,
                event.starts_at.format("%Y-%m-%d %H:%M UTC")
            ),
        }
    }
}

/// The sink refused or failed to deliver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("delivery failed: {message}")]
pub struct DeliveryError {
    /// Description of the failure.
    pub message: String,
}

/// Delivers notifications to participants (chat DM, webhook, log, ...).
pub trait NotificationSink: Send + Sync + 'static {
    /// Deliver one notification.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if delivery failed; the dispatcher may retry.
    fn deliver(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Sending half of the notification queue.
#[derive(Debug, Clone)]
pub struct NotificationOutbox {
    tx: mpsc::UnboundedSender<Notification>,
}

/// Receiving half of the notification queue, consumed by [`dispatch`].
#[derive(Debug)]
pub struct NotificationInbox {
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl NotificationInbox {
    /// Take the next queued notification, or `None` once every outbox is
    /// dropped and the queue is drained.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Take a queued notification without waiting.
    pub fn try_recv(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }
}

/// Create a connected outbox/inbox pair.
pub fn outbox() -> (NotificationOutbox, NotificationInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NotificationOutbox { tx }, NotificationInbox { rx })
}

impl NotificationOutbox {
    /// Queue notifications for delivery. Never blocks. If the dispatcher
    /// is gone the notifications are dropped with a warning.
    pub fn enqueue(&self, notifications: impl IntoIterator<Item = Notification>) {
        for notification in notifications {
            let recipient = notification.recipient.id;
            if self.tx.send(notification).is_err() {
                warn!(recipient = %recipient, "notification dropped: dispatcher not running");
            }
        }
    }
}

/// Deliver queued notifications until every outbox is dropped.
///
/// Each notification gets up to `config.max_attempts` tries, waiting
/// `retry_backoff_ms * attempt` between them.
pub async fn dispatch<S: NotificationSink>(
    mut inbox: NotificationInbox,
    sink: S,
    config: NotificationConfig,
) {
    while let Some(notification) = inbox.recv().await {
        deliver_with_retry(&sink, &notification, &config).await;
    }
    debug!("notification dispatcher stopped");
}

/// Try to deliver one notification, retrying with linear backoff.
///
/// Returns `true` if it was delivered.
pub async fn deliver_with_retry<S: NotificationSink>(
    sink: &S,
    notification: &Notification,
    config: &NotificationConfig,
) -> bool {
    let max_attempts = config.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        match sink.deliver(notification).await {
            Ok(()) => {
                debug!(
                    recipient = %notification.recipient.id,
                    kind = ?notification.kind,
                    attempt,
                    "notification delivered"
                );
                return true;
            }
            Err(e) if attempt < max_attempts => {
                let backoff = config.retry_backoff_ms.saturating_mul(u64::from(attempt));
                debug!(
                    recipient = %notification.recipient.id,
                    attempt,
                    backoff_ms = backoff,
                    error = %e,
                    "notification delivery failed, retrying"
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => {
                warn!(
                    recipient = %notification.recipient.id,
                    kind = ?notification.kind,
                    attempts = max_attempts,
                    error = %e,
                    "notification dropped after retries"
                );
            }
        }
    }
    false
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use kickoff_types::ParticipantId;
    use tokio::sync::Mutex;

    use super::*;

    /// Fails the first `failures` deliveries, then records the rest.
    #[derive(Clone, Default)]
    struct FlakySink {
        failures: Arc<AtomicU32>,
        delivered: Arc<Mutex<Vec<Notification>>>,
    }

    impl FlakySink {
        fn failing(times: u32) -> Self {
            Self {
                failures: Arc::new(AtomicU32::new(times)),
                ..Self::default()
            }
        }
    }

    impl NotificationSink for FlakySink {
        async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(DeliveryError {
                    message: "chat API timeout".to_owned(),
                });
            }
            self.delivered.lock().await.push(notification.clone());
            Ok(())
        }
    }

    fn note(id: i64) -> Notification {
        Notification::promoted(
            Participant::new(ParticipantId(id), "Sam"),
            NotificationKind::PromotedAfterDecline,
        )
    }

    fn config(max_attempts: u32) -> NotificationConfig {
        NotificationConfig {
            max_attempts,
            retry_backoff_ms: 10,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_delivered() {
        let sink = FlakySink::failing(2);
        assert!(deliver_with_retry(&sink, &note(1), &config(3)).await);
        assert_eq!(sink.delivered.lock().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let sink = FlakySink::failing(5);
        assert!(!deliver_with_retry(&sink, &note(1), &config(3)).await);
        assert!(sink.delivered.lock().await.is_empty());
        assert_eq!(sink.failures.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatcher_drains_queue_and_stops() {
        let (outbox, inbox) = outbox();
        let sink = FlakySink::default();
        let delivered = Arc::clone(&sink.delivered);

        outbox.enqueue([note(1), note(2)]);
        drop(outbox);
        dispatch(inbox, sink, config(1)).await;

        let delivered = delivered.lock().await;
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].recipient.id, ParticipantId(1));
    }

    #[test]
    fn enqueue_without_dispatcher_does_not_panic() {
        let (outbox, inbox) = outbox();
        drop(inbox);
        outbox.enqueue([note(1)]);
    }

    #[test]
    fn no_show_promotion_mentions_the_no_show() {
        let n = Notification::promoted(
            Participant::new(ParticipantId(1), "Sam"),
            NotificationKind::PromotedAfterNoShow,
        );
        assert!(n.text.contains("no-show"));
    }
}
