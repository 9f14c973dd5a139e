use serde::{Deserialize, Serialize};

use crate::capabilities::{AuthorizationStatus, Capabilities, LocationOutput};
use crate::event::{Event, HttpResult};
use crate::model::{
    BasicResponse, ElementListResponse, ElementType, FilteredElementListResponse, LatLon,
    MapRegion, Model, PointOfInterest, PostListResponse, ViewType,
};
use crate::{query, AppError, ErrorKind, CATEGORY_LOOKUP_DEBOUNCE_MS, FIRST_EVENTS_PAGE};

#[derive(Default)]
pub struct App;

impl App {
    /// Routes the current `(element type, search text)` pair to the query
    /// variant the session is in. While filters are active every dispatch
    /// goes down the filtered path.
    fn dispatch_search(model: &mut Model, caps: &Capabilities) {
        if model.filters_on {
            Self::send_filtered_search(model, caps);
        } else {
            let element_type = model.element_type;
            let text = model.search_text.clone();
            Self::send_element_search(model, caps, element_type, text);
        }
    }

    fn send_element_search(
        model: &mut Model,
        caps: &Capabilities,
        element_type: ElementType,
        text: String,
    ) {
        model.search_generation += 1;
        let generation = model.search_generation;
        let url = query::element_search(&model.base_url, &text, element_type);

        tracing::debug!(%url, generation, "dispatching element search");

        caps.http
            .get(url)
            .expect_json::<ElementListResponse>()
            .send(move |result| Event::ElementSearchResponse {
                generation,
                result: Box::new(result),
            });
    }

    fn send_filtered_search(model: &mut Model, caps: &Capabilities) {
        model.search_generation += 1;
        let generation = model.search_generation;
        let url = query::filtered_element_search(&model.base_url, &model.filters);

        tracing::debug!(%url, generation, "dispatching filtered search");

        caps.http
            .get(url)
            .expect_json::<FilteredElementListResponse>()
            .send(move |result| Event::FilteredSearchResponse {
                generation,
                result: Box::new(result),
            });
    }

    fn send_events_list(model: &mut Model, caps: &Capabilities, page: u32) {
        model.events_generation += 1;
        let generation = model.events_generation;
        let url = if model.filters_on {
            query::filtered_events_list(&model.base_url, &model.filters)
        } else {
            query::events_list(&model.base_url, page)
        };

        tracing::debug!(%url, generation, page, "dispatching events list");

        caps.http
            .get(url)
            .expect_json::<PostListResponse>()
            .send(move |result| Event::EventsListResponse {
                generation,
                page,
                result: Box::new(result),
            });
    }

    fn apply_element_search(
        model: &mut Model,
        generation: u64,
        result: HttpResult<ElementListResponse>,
    ) {
        if generation != model.search_generation {
            tracing::debug!(generation, "discarding stale element search response");
            return;
        }

        match result {
            Ok(mut response) if response.status().is_success() => {
                match response.take_body() {
                    Some(body) => {
                        model.element_list.replace(
                            body.items_list,
                            body.already_added,
                            body.id_item_list,
                        );
                    }
                    None => tracing::warn!("element search response had no body"),
                }
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "element search failed");
            }
            Err(error) => {
                tracing::warn!(%error, "element search transport error");
            }
        }
    }

    fn apply_filtered_search(
        model: &mut Model,
        generation: u64,
        result: HttpResult<FilteredElementListResponse>,
    ) {
        if generation != model.search_generation {
            tracing::debug!(generation, "discarding stale filtered search response");
            return;
        }

        match result {
            Ok(mut response) if response.status().is_success() => match response.take_body() {
                Some(body) => model.element_list.replace_filtered(body.items_list),
                None => tracing::warn!("filtered search response had no body"),
            },
            Ok(response) => {
                tracing::warn!(status = %response.status(), "filtered search failed");
            }
            Err(error) => {
                tracing::warn!(%error, "filtered search transport error");
            }
        }
    }

    fn apply_events_list(
        model: &mut Model,
        generation: u64,
        page: u32,
        result: HttpResult<PostListResponse>,
    ) {
        if generation != model.events_generation {
            tracing::debug!(generation, "discarding stale events list response");
            return;
        }

        match result {
            Ok(mut response) if response.status().is_success() => match response.take_body() {
                Some(body) => {
                    // Page one replaces the point set wholesale; later pages
                    // append to it.
                    if page <= FIRST_EVENTS_PAGE {
                        model.points = body.post_list;
                    } else {
                        model.points.extend(body.post_list);
                    }
                    model.events_page = page;
                }
                None => tracing::warn!("events list response had no body"),
            },
            Ok(response) => {
                tracing::warn!(status = %response.status(), "events list failed");
            }
            Err(error) => {
                tracing::warn!(%error, "events list transport error");
            }
        }
    }

    /// Marks `point` selected and steers the viewport onto it. Re-selecting
    /// the same point recenters again; the generation lets the shell tell
    /// the two apart.
    fn select_point(model: &mut Model, point: &PointOfInterest) {
        model.selected_point = Some(point.clone());
        if let Some(center) = point.coordinate() {
            model.map_region = Some(MapRegion::centered_on(center));
            model.region_generation += 1;
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        match event {
            Event::Started { base_url } => {
                if let Some(candidate) = base_url {
                    match url::Url::parse(&candidate) {
                        Ok(_) => model.base_url = candidate,
                        Err(error) => {
                            tracing::warn!(%error, "ignoring invalid base URL override");
                        }
                    }
                }

                Self::dispatch_search(model, caps);
                caps.location
                    .authorization_status(Event::LocationAuthorizationChanged);
                caps.location.start_updates();
                caps.render.render();
            }

            Event::SearchTextChanged(text) => {
                model.search_text = text;

                if model.is_map_mode() {
                    // Map search is a local select, never a server query.
                    if !model.search_text.is_empty() {
                        if let Some(point) = model.first_location_match(&model.search_text) {
                            Self::select_point(model, &point);
                        }
                    }
                } else {
                    Self::dispatch_search(model, caps);
                }

                caps.render.render();
            }

            Event::ElementTypeChanged(element_type) => {
                model.element_type = element_type;
                if !element_type.supports_map() && model.view_type == ViewType::Map {
                    model.view_type = ViewType::List;
                }

                Self::dispatch_search(model, caps);
                caps.render.render();
            }

            Event::ViewTypeChanged(view_type) => {
                if view_type == ViewType::Map && !model.element_type.supports_map() {
                    tracing::debug!("map view is only available for posts");
                } else {
                    let entering_map =
                        view_type == ViewType::Map && model.view_type != ViewType::Map;
                    model.view_type = view_type;
                    if entering_map {
                        Self::send_events_list(model, caps, FIRST_EVENTS_PAGE);
                    }
                }

                caps.render.render();
            }

            Event::LoadMoreEvents => {
                // The filtered events endpoint is not paginated.
                if model.is_map_mode() && !model.filters_on {
                    let next_page = model.events_page + 1;
                    Self::send_events_list(model, caps, next_page);
                }
            }

            Event::ToggleItem { index } => {
                if !model.element_list.is_toggleable() {
                    tracing::debug!("filtered results carry no membership state to toggle");
                    return;
                }

                let Some((id, already_added)) = model
                    .element_list
                    .entry(index)
                    .map(|entry| (entry.id, entry.already_added))
                else {
                    tracing::warn!(index, "toggle for a row that no longer exists");
                    return;
                };

                let url = query::add_or_remove_item(
                    &model.base_url,
                    already_added,
                    id,
                    model.element_type,
                );

                // Capture the pair now; the refresh must not pick up edits
                // made while the mutation is in flight.
                let element_type = model.element_type;
                let search_text = model.search_text.clone();

                caps.http
                    .get(url)
                    .expect_json::<BasicResponse>()
                    .send(move |result| Event::ToggleResponse {
                        element_type,
                        search_text: search_text.clone(),
                        result: Box::new(result),
                    });
            }

            Event::ToggleResponse {
                element_type,
                search_text,
                result,
            } => {
                match *result {
                    Ok(response) if response.status().is_success() => {
                        Self::send_element_search(model, caps, element_type, search_text);
                    }
                    Ok(response) => {
                        tracing::warn!(status = %response.status(), "toggle mutation failed");
                    }
                    Err(error) => {
                        tracing::warn!(%error, "toggle mutation transport error");
                    }
                }
                caps.render.render();
            }

            Event::MapShown => {
                if model.should_recenter {
                    // One-shot: consumed on first observation, even when no
                    // coordinate is available yet.
                    model.should_recenter = false;

                    if model.location_enabled {
                        if let Some(center) = model.user_coordinate {
                            model.map_region = Some(MapRegion::centered_on(center));
                            model.region_generation += 1;
                        }
                    }

                    caps.render.render();
                }
            }

            Event::AnnotationTapped { title } => {
                if let Some(point) = model.find_point_by_name(&title) {
                    Self::select_point(model, &point);
                    model.detail_point = Some(point);
                } else {
                    tracing::warn!(%title, "tapped annotation matches no point");
                }
                caps.render.render();
            }

            Event::DetailDismissed => {
                model.detail_point = None;
                caps.render.render();
            }

            Event::LocationAuthorizationChanged(status) => {
                model.location_authorization = status;

                match status {
                    AuthorizationStatus::NotDetermined => {
                        caps.location
                            .request_when_in_use_authorization(Event::LocationAuthorizationChanged);
                    }
                    AuthorizationStatus::AuthorizedWhenInUse => {
                        model.location_enabled = true;
                        model.active_error = None;
                        caps.location.current_coordinate(|result| match result {
                            Ok(LocationOutput::Coordinate { lat, lon }) => {
                                Event::CoordinateUpdated { lat, lon }
                            }
                            Ok(_) => Event::LocationUnavailable {
                                reason: "unexpected location output".to_string(),
                            },
                            Err(error) => Event::LocationUnavailable {
                                reason: error.to_string(),
                            },
                        });
                    }
                    AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                        model.location_enabled = false;
                        model.active_error = Some(AppError::new(
                            ErrorKind::LocationPermissionDenied,
                            "location access is not authorized",
                        ));
                    }
                }

                caps.render.render();
            }

            Event::CoordinateUpdated { lat, lon } => {
                match LatLon::new(lat, lon) {
                    Some(coordinate) => model.user_coordinate = Some(coordinate),
                    None => tracing::warn!(lat, lon, "dropping invalid coordinate update"),
                }
                caps.render.render();
            }

            Event::LocationUnavailable { reason } => {
                tracing::warn!(%reason, "no position fix");
            }

            Event::FilterSettingsOpened => {
                // The settings sheet exists for posts only.
                if model.element_type.supports_map() {
                    model.draft = Some(crate::filters::FilterDraft::default());
                }
                caps.render.render();
            }

            Event::FilterSettingsDismissed => {
                model.draft = None;
                caps.render.render();
            }

            Event::FilterDateChanged(date) => {
                if let Some(draft) = model.draft.as_mut() {
                    draft.selected_date = date;
                }
                caps.render.render();
            }

            Event::FilterTimeChanged(time) => {
                if let Some(draft) = model.draft.as_mut() {
                    draft.selected_time = time;
                }
                caps.render.render();
            }

            Event::TagEntryChanged(text) => {
                if let Some(draft) = model.draft.as_mut() {
                    draft.entered_tag = text;
                }
                caps.render.render();
            }

            Event::TagAdded => {
                if let Some(draft) = model.draft.as_mut() {
                    draft.add_entered_tag();
                }
                caps.render.render();
            }

            Event::TagRemoved(tag) => {
                if let Some(draft) = model.draft.as_mut() {
                    draft.remove_tag(&tag);
                }
                caps.render.render();
            }

            Event::CategoryEntryChanged(text) => {
                let Some(draft) = model.draft.as_mut() else {
                    return;
                };

                draft.entered_category = text;
                let is_empty = draft.entered_category.is_empty();
                if is_empty {
                    draft.category_suggestions.clear();
                }

                // Every keystroke supersedes the pending lookup.
                model.category_lookup_generation += 1;
                let generation = model.category_lookup_generation;

                if !is_empty {
                    caps.delay.start(CATEGORY_LOOKUP_DEBOUNCE_MS, move || {
                        Event::CategoryLookupDue { generation }
                    });
                }

                caps.render.render();
            }

            Event::CategoryLookupDue { generation } => {
                if generation != model.category_lookup_generation {
                    tracing::debug!(generation, "debounced category lookup superseded");
                    return;
                }

                let Some(text) = model
                    .draft
                    .as_ref()
                    .map(|d| d.entered_category.clone())
                    .filter(|t| !t.is_empty())
                else {
                    return;
                };

                let url = query::personal_category_list(&model.base_url, &text);
                caps.http
                    .get(url)
                    .expect_json::<ElementListResponse>()
                    .send(move |result| Event::CategoryLookupResponse {
                        generation,
                        result: Box::new(result),
                    });
            }

            Event::CategoryLookupResponse { generation, result } => {
                if generation != model.category_lookup_generation {
                    tracing::debug!(generation, "discarding stale category suggestions");
                    return;
                }

                match *result {
                    Ok(mut response) if response.status().is_success() => {
                        if let Some(body) = response.take_body() {
                            if let Some(draft) = model.draft.as_mut() {
                                draft.set_category_suggestions(body.items_list);
                            }
                        }
                    }
                    Ok(response) => {
                        tracing::warn!(status = %response.status(), "category lookup failed");
                    }
                    Err(error) => {
                        tracing::warn!(%error, "category lookup transport error");
                    }
                }
                caps.render.render();
            }

            Event::CategoryChosen(category) => {
                if let Some(draft) = model.draft.as_mut() {
                    draft.add_category(category);
                }
                caps.render.render();
            }

            Event::CategoryRemoved(category) => {
                if let Some(draft) = model.draft.as_mut() {
                    draft.remove_category(&category);
                }
                caps.render.render();
            }

            Event::MaxBudgetChanged(budget) => {
                if let Some(draft) = model.draft.as_mut() {
                    draft.max_budget = budget;
                }
                caps.render.render();
            }

            Event::FreeOnlyChanged(free_only) => {
                if let Some(draft) = model.draft.as_mut() {
                    draft.free_only = free_only;
                }
                caps.render.render();
            }

            Event::IncludeFurtherEventsChanged(include) => {
                if let Some(draft) = model.draft.as_mut() {
                    draft.include_further_events = include;
                }
                caps.render.render();
            }

            Event::FiltersApplied => {
                if let Some(draft) = model.draft.take() {
                    model.filters = draft.commit();
                    model.filters_on = true;

                    Self::send_filtered_search(model, caps);
                    Self::send_events_list(model, caps, FIRST_EVENTS_PAGE);
                }
                caps.render.render();
            }

            Event::FiltersReset => {
                model.draft = None;
                model.filters = crate::filters::FilterSettings::default();
                model.filters_on = false;

                let element_type = model.element_type;
                let text = model.search_text.clone();
                Self::send_element_search(model, caps, element_type, text);
                Self::send_events_list(model, caps, FIRST_EVENTS_PAGE);
                caps.render.render();
            }

            Event::ElementSearchResponse { generation, result } => {
                Self::apply_element_search(model, generation, *result);
                caps.render.render();
            }

            Event::FilteredSearchResponse { generation, result } => {
                Self::apply_filtered_search(model, generation, *result);
                caps.render.render();
            }

            Event::EventsListResponse {
                generation,
                page,
                result,
            } => {
                Self::apply_events_list(model, generation, page, *result);
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let rows = if model.is_map_mode() {
            Vec::new()
        } else {
            let can_toggle = model.element_list.is_toggleable();
            model
                .element_list
                .iter()
                .map(|entry| ListRow {
                    id: entry.id,
                    label: entry.label.to_string(),
                    already_added: entry.already_added,
                    can_toggle,
                })
                .collect()
        };

        let annotations = if model.is_map_mode() {
            model
                .points
                .iter()
                .filter(|p| matches_search(&p.name, &model.search_text))
                .filter_map(|p| {
                    p.coordinate().map(|center| Annotation {
                        id: p.id,
                        title: p.name.clone(),
                        lat: center.lat,
                        lon: center.lon,
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        ViewModel {
            element_type: model.element_type,
            view_type: model.view_type,
            search_text: model.search_text.clone(),
            rows,
            annotations,
            region: model.map_region,
            region_generation: model.region_generation,
            detail: model.detail_point.as_ref().map(PointDetail::from),
            filters_on: model.filters_on,
            filter_panel: model.draft.as_ref().map(FilterPanel::from),
            location_enabled: model.location_enabled,
            error: model.active_error.as_ref().map(UserFacingError::from),
        }
    }
}

/// Case-insensitive substring match; an empty needle passes everything.
fn matches_search(name: &str, text: &str) -> bool {
    text.is_empty() || name.to_lowercase().contains(&text.to_lowercase())
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ListRow {
    pub id: i64,
    pub label: String,
    pub already_added: bool,
    pub can_toggle: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Annotation {
    pub id: i64,
    pub title: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PointDetail {
    pub id: i64,
    pub name: String,
    pub event_date: String,
    pub event_time: String,
    pub location_name: String,
    pub description: String,
    #[serde(default, with = "serde_bytes")]
    pub image: Option<Vec<u8>>,
}

impl From<&PointOfInterest> for PointDetail {
    fn from(point: &PointOfInterest) -> Self {
        Self {
            id: point.id,
            name: point.name.clone(),
            event_date: point.event_date.clone(),
            event_time: point.event_time.clone(),
            location_name: point.location_name.clone(),
            description: point.description.clone(),
            image: point.image.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FilterPanel {
    pub selected_date: chrono::NaiveDate,
    pub selected_time: chrono::NaiveTime,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub max_budget: u32,
    pub free_only: bool,
    pub include_further_events: bool,
    pub entered_tag: String,
    pub entered_category: String,
    pub category_suggestions: Vec<String>,
}

impl From<&crate::filters::FilterDraft> for FilterPanel {
    fn from(draft: &crate::filters::FilterDraft) -> Self {
        Self {
            selected_date: draft.selected_date,
            selected_time: draft.selected_time,
            categories: draft.categories.clone(),
            tags: draft.tags.clone(),
            max_budget: draft.max_budget,
            free_only: draft.free_only,
            include_further_events: draft.include_further_events,
            entered_tag: draft.entered_tag.clone(),
            entered_category: draft.entered_category.clone(),
            category_suggestions: draft.category_suggestions.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserFacingError {
    pub message: String,
    pub code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(error: &AppError) -> Self {
        Self {
            message: error.user_facing_message(),
            code: error.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub element_type: ElementType,
    pub view_type: ViewType,
    pub search_text: String,
    pub rows: Vec<ListRow>,
    pub annotations: Vec<Annotation>,
    pub region: Option<MapRegion>,
    pub region_generation: u64,
    pub detail: Option<PointDetail>,
    pub filters_on: bool,
    pub filter_panel: Option<FilterPanel>,
    pub location_enabled: bool,
    pub error: Option<UserFacingError>,
}
