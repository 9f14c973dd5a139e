use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::capabilities::AuthorizationStatus;
use crate::model::{
    BasicResponse, ElementListResponse, ElementType, FilteredElementListResponse,
    PostListResponse, ViewType,
};

/// Shorthand for what the HTTP capability hands back.
pub type HttpResult<T> = crux_http::Result<crux_http::Response<T>>;

#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    /// Shell start-up. An invalid or absent override keeps the compiled
    /// default base URL.
    Started { base_url: Option<String> },

    // --- Search & dispatch ---
    SearchTextChanged(String),
    ElementTypeChanged(ElementType),
    ViewTypeChanged(ViewType),
    LoadMoreEvents,

    // --- Membership toggle ---
    ToggleItem { index: usize },

    // --- Map ---
    /// Fired by the shell on every map layout pass.
    MapShown,
    AnnotationTapped { title: String },
    DetailDismissed,

    // --- Location ---
    LocationAuthorizationChanged(AuthorizationStatus),
    CoordinateUpdated { lat: f64, lon: f64 },
    LocationUnavailable { reason: String },

    // --- Filter settings workflow ---
    FilterSettingsOpened,
    FilterSettingsDismissed,
    FilterDateChanged(NaiveDate),
    FilterTimeChanged(NaiveTime),
    TagEntryChanged(String),
    TagAdded,
    TagRemoved(String),
    CategoryEntryChanged(String),
    /// Debounce expiry for the auto-complete lookup; only the newest
    /// generation is allowed to dispatch.
    CategoryLookupDue { generation: u64 },
    CategoryChosen(String),
    CategoryRemoved(String),
    MaxBudgetChanged(u32),
    FreeOnlyChanged(bool),
    IncludeFurtherEventsChanged(bool),
    FiltersApplied,
    FiltersReset,

    // --- Capability responses ---
    #[serde(skip)]
    ElementSearchResponse {
        generation: u64,
        result: Box<HttpResult<ElementListResponse>>,
    },
    #[serde(skip)]
    FilteredSearchResponse {
        generation: u64,
        result: Box<HttpResult<FilteredElementListResponse>>,
    },
    #[serde(skip)]
    EventsListResponse {
        generation: u64,
        page: u32,
        result: Box<HttpResult<PostListResponse>>,
    },
    /// Carries the `(element type, search text)` pair captured when the
    /// toggle was dispatched, so the ground-truth refresh cannot race a
    /// concurrent search edit.
    #[serde(skip)]
    ToggleResponse {
        element_type: ElementType,
        search_text: String,
        result: Box<HttpResult<BasicResponse>>,
    },
    #[serde(skip)]
    CategoryLookupResponse {
        generation: u64,
        result: Box<HttpResult<ElementListResponse>>,
    },
}
