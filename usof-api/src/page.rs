/// Paginated response envelope.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u32,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl<T> Page<T> {
    pub fn plain(items: Vec<T>) -> Page<T> {
        Page {
            total: items.len() as u32,
            items,
            page: None,
            limit: None,
        }
    }
}

/// List endpoints answer with either a bare array or a `{items, total}`
/// envelope depending on the route revision; this normalizes both shapes at
/// the gateway boundary so nothing downstream has to care.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paged(Page<T>),
    Plain(Vec<T>),
}

impl<T> ListResponse<T> {
    pub fn into_page(self) -> Page<T> {
        match self {
            ListResponse::Paged(page) => page,
            ListResponse::Plain(items) => Page::plain(items),
        }
    }
}
