use serde::Deserialize;

/// Envelope of a paginated collection listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
    pub page: u32,
    pub per_page: u32,
    pub total_items: i64,
    pub total_pages: u32,
    pub items: Vec<T>,
}

impl<T> ListResult<T> {
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One page of history handed back by a collection client.
#[derive(Debug, Clone)]
pub struct RecordPage<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
}

impl<T> From<ListResult<T>> for RecordPage<T> {
    fn from(value: ListResult<T>) -> Self {
        let has_next_page = value.has_next_page();
        Self {
            items: value.items,
            has_next_page,
        }
    }
}
