//! URL construction for every remote operation.
//!
//! Each element mode maps onto its endpoint through the closed enums here;
//! there is no string-keyed lookup that could miss at runtime. Query
//! values are interpolated raw, matching what the backend parses — the
//! transport layer percent-encodes anything a URL cannot carry.

use crate::filters::FilterSettings;
use crate::model::ElementType;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    SearchElementList,
    AddOrRemoveItem,
    EventsList,
    PersonalCategoryList,
}

impl Endpoint {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SearchElementList => "searchElementList.php",
            Self::AddOrRemoveItem => "addOrRemoveItem.php",
            Self::EventsList => "getEventsList.php",
            Self::PersonalCategoryList => "getPersonalCategoryList.php",
        }
    }
}

fn endpoint_url(base_url: &str, endpoint: Endpoint, query: &str) -> String {
    format!(
        "{}/{}?{}",
        base_url.trim_end_matches('/'),
        endpoint.path(),
        query
    )
}

/// Plain text search within one element mode.
#[must_use]
pub fn element_search(base_url: &str, text: &str, element_type: ElementType) -> String {
    endpoint_url(
        base_url,
        Endpoint::SearchElementList,
        &format!("element={}&type={}", text, element_type.remote_name()),
    )
}

/// Structured search constrained by the committed filter settings.
#[must_use]
pub fn filtered_element_search(base_url: &str, filters: &FilterSettings) -> String {
    endpoint_url(
        base_url,
        Endpoint::SearchElementList,
        &format!("filtered=true&{}", filters.query_fragment()),
    )
}

/// Paginated event list feeding the map's point set.
#[must_use]
pub fn events_list(base_url: &str, page: u32) -> String {
    endpoint_url(base_url, Endpoint::EventsList, &format!("page={page}"))
}

/// Filtered event list. The backend takes no page parameter on this path.
#[must_use]
pub fn filtered_events_list(base_url: &str, filters: &FilterSettings) -> String {
    endpoint_url(
        base_url,
        Endpoint::EventsList,
        &format!("filtered=true&{}", filters.query_fragment()),
    )
}

/// Membership mutation: add when the item is absent, remove when present.
#[must_use]
pub fn add_or_remove_item(
    base_url: &str,
    to_delete: bool,
    id_element: i64,
    element_type: ElementType,
) -> String {
    endpoint_url(
        base_url,
        Endpoint::AddOrRemoveItem,
        &format!(
            "toDelete={}&idElement={}&type={}",
            to_delete,
            id_element,
            element_type.remote_name()
        ),
    )
}

/// Per-keystroke category auto-complete lookup.
#[must_use]
pub fn personal_category_list(base_url: &str, text: &str) -> String {
    endpoint_url(
        base_url,
        Endpoint::PersonalCategoryList,
        &format!("is_clike=true&element={text}"),
    )
}
