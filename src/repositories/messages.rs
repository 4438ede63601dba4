use crate::common::context::Context;
use crate::entities::messages::Message;
use crate::entities::pages::RecordPage;
use crate::models::feeds::quote;
use crate::repositories::collections::{EventCallback, MESSAGES_COLLECTION, SubscriptionHandle};

pub async fn fetch_page<C: Context + ?Sized>(
    ctx: &C,
    filter: &str,
    page: u32,
    per_page: u32,
) -> anyhow::Result<RecordPage<Message>> {
    ctx.collections()
        .fetch_page(MESSAGES_COLLECTION, filter, page, per_page)
        .await
}

pub async fn subscribe<C: Context + ?Sized>(
    ctx: &C,
    filter: &str,
    callback: EventCallback,
) -> anyhow::Result<SubscriptionHandle> {
    ctx.collections()
        .subscribe(MESSAGES_COLLECTION, filter, callback)
        .await
}

/// Filter for every private message addressed to `student_id`.
pub fn inbox_filter(student_id: &str) -> String {
    format!("recipient = {} && deleted = false", quote(student_id))
}
