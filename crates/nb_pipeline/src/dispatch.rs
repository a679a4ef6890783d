use nb_core::{ChannelId, LinkSubmission, Notifier, Outcome, Stage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::inbound::{route, Inbound};
use crate::manager::Pipeline;

/// Result of one submission, addressed to the chat it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: ChannelId,
    pub outcome: Outcome,
}

/// Spawns one task per submission and reports each outcome on a channel.
#[derive(Clone)]
pub struct Dispatcher {
    pipeline: Arc<Pipeline>,
    tx: mpsc::UnboundedSender<Notification>,
}

impl Dispatcher {
    pub fn new(pipeline: Arc<Pipeline>) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { pipeline, tx }, rx)
    }

    pub fn submit(&self, submission: LinkSubmission) -> JoinHandle<Outcome> {
        let pipeline = self.pipeline.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = pipeline.process(&submission).await;
            let notification = Notification {
                channel: submission.channel,
                outcome: outcome.clone(),
            };
            if tx.send(notification).is_err() {
                warn!("Notification for chat {} dropped: receiver closed", submission.channel);
            }
            outcome
        })
    }

    /// Route an inbound message; only links are submitted.
    pub fn handle_text(&self, text: &str, channel: ChannelId) -> Inbound {
        let inbound = route(text);
        match &inbound {
            Inbound::Link(url) => {
                self.submit(LinkSubmission::new(url.clone(), channel));
            }
            Inbound::Command => debug!("Ignoring command from chat {}", channel),
            Inbound::Unsupported => debug!("Unsupported message from chat {}", channel),
        }
        inbound
    }
}

/// Deliver notifications until every sender is gone.
pub async fn forward_notifications(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    notifier: Arc<dyn Notifier>,
) {
    while let Some(Notification { channel, outcome }) = rx.recv().await {
        match notifier.notify(channel, outcome.message()).await {
            Ok(()) => info!("[chat {}] {} ({})", channel, Stage::Notified, outcome.stage()),
            Err(e) => warn!("[chat {}] Could not deliver '{}': {}", channel, outcome.message(), e),
        }
    }
    debug!("Notification channel closed");
}

/// Stop accepting work and give in-flight submissions up to `grace` to have
/// their replies delivered. Returns `false` if the forwarder had to be aborted.
pub async fn drain_notifications(dispatcher: Dispatcher, mut forwarder: JoinHandle<()>, grace: Duration) -> bool {
    drop(dispatcher);
    match tokio::time::timeout(grace, &mut forwarder).await {
        Ok(_) => {
            debug!("All pending notifications delivered");
            true
        }
        Err(_) => {
            warn!("Pending notifications not delivered within {:?}, dropping them", grace);
            forwarder.abort();
            false
        }
    }
}
