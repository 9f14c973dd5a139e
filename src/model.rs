use serde::{Deserialize, Serialize};

use crate::capabilities::AuthorizationStatus;
use crate::filters::{FilterDraft, FilterSettings};
use crate::{DEFAULT_BASE_URL, FIRST_EVENTS_PAGE, SELECTED_REGION_SPAN_M};

/// Validated lat/lon pair.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        if !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self { lat, lon })
    }
}

/// A geo-annotated post as returned by the events endpoints.
///
/// Field names on the wire are fixed by the backend; they predate this
/// crate and are not negotiable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    #[serde(rename = "idPost")]
    pub id: i64,
    #[serde(rename = "postName", default)]
    pub name: String,
    #[serde(rename = "eventDate", default)]
    pub event_date: String,
    #[serde(rename = "eventTime", default)]
    pub event_time: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(rename = "locationName", default)]
    pub location_name: String,
    #[serde(rename = "postDescription", default)]
    pub description: String,
    #[serde(default, with = "serde_bytes")]
    pub image: Option<Vec<u8>>,
}

impl PointOfInterest {
    /// The placeable coordinate of this point, if it has one.
    ///
    /// (0, 0) is the backend's "not placed yet" sentinel and never a real
    /// event location, so it maps to `None` along with out-of-range values.
    #[must_use]
    pub fn coordinate(&self) -> Option<LatLon> {
        if self.latitude == 0.0 && self.longitude == 0.0 {
            return None;
        }
        LatLon::new(self.latitude, self.longitude)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    #[default]
    Posts,
    Friends,
    Categories,
}

impl ElementType {
    /// The `type` value the backend expects for this mode.
    #[must_use]
    pub const fn remote_name(self) -> &'static str {
        match self {
            Self::Posts => "post",
            Self::Friends => "user",
            Self::Categories => "event_category",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Posts => "Posts",
            Self::Friends => "Friends",
            Self::Categories => "Categories",
        }
    }

    /// The map view only exists for posts.
    #[must_use]
    pub const fn supports_map(self) -> bool {
        matches!(self, Self::Posts)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    #[default]
    List,
    Map,
}

/// Which query variant produced the current element list.
///
/// The filtered response schema carries no membership flags or ids, so a
/// filtered list is display-only and never offers toggles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListSource {
    #[default]
    Unfiltered,
    Filtered,
}

/// A borrowed view of one element-list row.
#[derive(Debug, PartialEq)]
pub struct ElementEntry<'a> {
    pub id: i64,
    pub label: &'a str,
    pub already_added: bool,
}

/// The three parallel sequences behind the element list.
///
/// Invariant: `items`, `already_added` and `ids` always have equal length
/// with matching index correspondence. All mutation goes through
/// [`ElementList::replace`] and [`ElementList::replace_filtered`], which
/// clip a ragged payload to its shortest sequence rather than exposing a
/// mismatched triple.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementList {
    items: Vec<String>,
    already_added: Vec<bool>,
    ids: Vec<i64>,
    source: ListSource,
}

impl ElementList {
    pub fn replace(&mut self, items: Vec<String>, already_added: Vec<bool>, ids: Vec<i64>) {
        let len = items.len().min(already_added.len()).min(ids.len());

        self.items = items;
        self.already_added = already_added;
        self.ids = ids;

        self.items.truncate(len);
        self.already_added.truncate(len);
        self.ids.truncate(len);
        self.source = ListSource::Unfiltered;

        debug_assert!(self.is_consistent());
    }

    pub fn replace_filtered(&mut self, items: Vec<String>) {
        let len = items.len();

        self.items = items;
        self.already_added = vec![false; len];
        self.ids = vec![0; len];
        self.source = ListSource::Filtered;

        debug_assert!(self.is_consistent());
    }

    #[must_use]
    pub fn entry(&self, index: usize) -> Option<ElementEntry<'_>> {
        let label = self.items.get(index)?.as_str();
        let already_added = *self.already_added.get(index)?;
        let id = *self.ids.get(index)?;
        Some(ElementEntry {
            id,
            label,
            already_added,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementEntry<'_>> {
        self.items
            .iter()
            .zip(&self.already_added)
            .zip(&self.ids)
            .map(|((label, already_added), id)| ElementEntry {
                id: *id,
                label: label.as_str(),
                already_added: *already_added,
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn source(&self) -> ListSource {
        self.source
    }

    #[must_use]
    pub const fn is_toggleable(&self) -> bool {
        matches!(self.source, ListSource::Unfiltered)
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.items.len() == self.already_added.len() && self.items.len() == self.ids.len()
    }
}

/// A viewport directive for the shell's map widget.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: LatLon,
    pub span_m: f64,
}

impl MapRegion {
    #[must_use]
    pub const fn centered_on(center: LatLon) -> Self {
        Self {
            center,
            span_m: SELECTED_REGION_SPAN_M,
        }
    }
}

pub struct Model {
    pub base_url: String,

    // Search & dispatch
    pub element_type: ElementType,
    pub view_type: ViewType,
    pub search_text: String,
    pub element_list: ElementList,
    pub filters: FilterSettings,
    pub filters_on: bool,
    pub draft: Option<FilterDraft>,

    // Map
    pub points: Vec<PointOfInterest>,
    pub selected_point: Option<PointOfInterest>,
    pub detail_point: Option<PointOfInterest>,
    pub should_recenter: bool,
    pub map_region: Option<MapRegion>,
    pub region_generation: u64,
    pub events_page: u32,

    // Location
    pub location_authorization: AuthorizationStatus,
    pub location_enabled: bool,
    pub user_coordinate: Option<LatLon>,

    // Response staleness guards, one per logical query channel
    pub search_generation: u64,
    pub events_generation: u64,
    pub category_lookup_generation: u64,

    pub active_error: Option<crate::AppError>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            element_type: ElementType::default(),
            view_type: ViewType::default(),
            search_text: String::new(),
            element_list: ElementList::default(),
            filters: FilterSettings::default(),
            filters_on: false,
            draft: None,
            points: Vec::new(),
            selected_point: None,
            detail_point: None,
            should_recenter: true,
            map_region: None,
            region_generation: 0,
            events_page: FIRST_EVENTS_PAGE,
            location_authorization: AuthorizationStatus::default(),
            location_enabled: false,
            user_coordinate: None,
            search_generation: 0,
            events_generation: 0,
            category_lookup_generation: 0,
            active_error: None,
        }
    }
}

impl Model {
    /// True while the posts map is the active surface.
    #[must_use]
    pub fn is_map_mode(&self) -> bool {
        self.view_type == ViewType::Map && self.element_type.supports_map()
    }

    /// First point whose location label contains `text`, case-insensitively.
    /// Map-mode search selects locally instead of querying the backend.
    #[must_use]
    pub fn first_location_match(&self, text: &str) -> Option<PointOfInterest> {
        let needle = text.to_lowercase();
        self.points
            .iter()
            .find(|p| p.location_name.to_lowercase().contains(&needle))
            .cloned()
    }

    /// Resolves an annotation title back to a point by exact name match.
    /// Names are expected unique but not guaranteed; first in sequence wins.
    #[must_use]
    pub fn find_point_by_name(&self, title: &str) -> Option<PointOfInterest> {
        self.points.iter().find(|p| p.name == title).cloned()
    }
}

// --- Response payloads ---

/// `searchElementList.php` (unfiltered) and `getPersonalCategoryList.php`.
///
/// Missing fields decode as empty so a thin payload reads as "no matches"
/// rather than a decode failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementListResponse {
    #[serde(rename = "itemsList", default)]
    pub items_list: Vec<String>,
    #[serde(rename = "alreadyAdded", default)]
    pub already_added: Vec<bool>,
    #[serde(rename = "idItemList", default)]
    pub id_item_list: Vec<i64>,
}

/// `searchElementList.php?filtered=true`. The backend omits membership
/// flags and ids on this path.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredElementListResponse {
    #[serde(rename = "itemsList", default)]
    pub items_list: Vec<String>,
}

/// `getEventsList.php`, both variants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostListResponse {
    #[serde(rename = "postList", default)]
    pub post_list: Vec<PointOfInterest>,
}

/// `addOrRemoveItem.php` acknowledgement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}
