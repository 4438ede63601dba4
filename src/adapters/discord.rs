use crate::common::context::Notifier;
use crate::common::error::{AppError, ServiceResult};
use crate::models::notifications::{Notification, NotificationKind};
use discord_webhook2::message::Message;
use discord_webhook2::webhook::DiscordWebhook;
use iso8061_timestamp::Timestamp;
use tokio::runtime::Handle;
use tracing::warn;

const SUCCESS_COLOR: u32 = 0xF7578C;
const ERROR_COLOR: u32 = 0xE03E3E;

const FOOTER: &str = "valentine-wall 💌";

fn color(kind: NotificationKind) -> u32 {
    match kind {
        NotificationKind::Success => SUCCESS_COLOR,
        NotificationKind::Error => ERROR_COLOR,
    }
}

/// Posts toasts to a Discord channel through a webhook.
pub struct DiscordNotifier {
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
        }
    }
}

pub async fn send(webhook_url: &str, notification: &Notification) -> ServiceResult<()> {
    let webhook = DiscordWebhook::new(webhook_url)?;
    webhook
        .send(&Message::new(|message| {
            message.embed(|embed| {
                embed
                    .description(&notification.text)
                    .author(|author| author.name(notification.kind.as_str()))
                    .color(color(notification.kind))
                    .footer(|footer| footer.text(FOOTER))
                    .timestamp(Timestamp::now_utc())
            })
        }))
        .await?;
    Ok(())
}

impl Notifier for DiscordNotifier {
    fn notify(&self, notification: &Notification) -> ServiceResult<()> {
        let Ok(runtime) = Handle::try_current() else {
            return Err(AppError::NotificationsDeliveryFailed);
        };
        let webhook_url = self.webhook_url.clone();
        let notification = notification.clone();
        runtime.spawn(async move {
            if let Err(e) = send(&webhook_url, &notification).await {
                warn!(code = e.code(), "Failed to post notification to Discord");
            }
        });
        Ok(())
    }
}
