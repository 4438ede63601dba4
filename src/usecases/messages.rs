use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult};
use crate::entities::pages::RecordPage;
use crate::entities::realtime::RealtimeEvent;
use crate::models::feeds::{LiveEvent, PageRequest};
use crate::models::messages::Message;
use crate::repositories::collections::SubscriptionHandle;
use crate::repositories::messages;
use std::sync::Arc;
use tracing::{info, warn};

/// Fetches one page of history. Transport failures become [`AppError::FeedsFetchFailed`].
pub async fn fetch_page<C: Context + ?Sized>(
    ctx: &C,
    filter: &str,
    request: PageRequest,
) -> ServiceResult<RecordPage<Message>> {
    let page = match messages::fetch_page(ctx, filter, request.page, request.per_page).await {
        Ok(page) => page,
        Err(e) => {
            warn!(filter, page = request.page, "Failed to fetch messages: {e:?}");
            return Err(AppError::FeedsFetchFailed);
        }
    };

    let items = page
        .items
        .into_iter()
        .filter_map(|entity| {
            let id = entity.id.clone();
            match Message::try_from(entity) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!(message_id = %id, code = e.code(), "Skipping invalid message record");
                    None
                }
            }
        })
        .collect();
    Ok(RecordPage {
        items,
        has_next_page: page.has_next_page,
    })
}

/// Opens a live subscription and forwards valid events to `on_event`.
pub async fn subscribe<C, F>(ctx: &C, filter: &str, on_event: F) -> ServiceResult<SubscriptionHandle>
where
    C: Context + ?Sized,
    F: Fn(LiveEvent) + Send + Sync + 'static,
{
    let callback = Arc::new(move |event: RealtimeEvent| {
        let id = event.record.id.clone();
        match LiveEvent::try_from(event) {
            Ok(event) => on_event(event),
            Err(e) => warn!(message_id = %id, code = e.code(), "Skipping invalid live event"),
        }
    });

    match messages::subscribe(ctx, filter, callback).await {
        Ok(handle) => {
            info!(
                filter,
                subscription_id = handle.subscription_id().to_string(),
                "Subscribed to messages"
            );
            Ok(handle)
        }
        Err(e) => {
            warn!(filter, "Failed to subscribe to messages: {e:?}");
            Err(AppError::FeedsSubscriptionFailed)
        }
    }
}
