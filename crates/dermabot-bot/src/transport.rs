//! Transport abstraction and the serve loop.

use async_trait::async_trait;
use dermabot_core::{Reply, UserId};
use tracing::{error, info};

use crate::bot::Bot;

/// A text message tagged with its sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user: UserId,
    pub text: String,
}

impl Inbound {
    pub fn new(user: impl Into<UserId>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
        }
    }
}

/// Something that delivers user messages and renders replies.
#[async_trait]
pub trait Transport: Send {
    /// Wait for the next message. `Ok(None)` means the transport closed.
    async fn next_event(&mut self) -> anyhow::Result<Option<Inbound>>;

    /// Deliver a reply to `user`.
    async fn send(&mut self, user: UserId, reply: &Reply) -> anyhow::Result<()>;
}

/// Answer every inbound message until the transport closes.
///
/// A failed send is logged and does not stop the loop; a failure to
/// receive does.
pub async fn serve<T: Transport + ?Sized>(bot: &Bot, transport: &mut T) -> anyhow::Result<()> {
    info!("Bot started");
    while let Some(event) = transport.next_event().await? {
        let reply = bot.handle_text(event.user, &event.text).await;
        if let Err(e) = transport.send(event.user, &reply).await {
            error!("Failed to send reply to user {}: {:#}", event.user, e);
        }
    }
    info!("Transport closed; bot stopped");
    Ok(())
}
