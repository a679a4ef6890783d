use async_trait::async_trait;

use crate::types::ChannelId;
use crate::Result;

/// Delivers replies back to the chat a submission came from.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, channel: ChannelId, text: &str) -> Result<()>;
}
