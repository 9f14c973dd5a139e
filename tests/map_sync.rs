use crux_core::testing::AppTester;
use crux_core::App as _;
use crux_http::testing::ResponseBuilder;
use proptest::prelude::*;
use wowedo_shared::model::PostListResponse;
use wowedo_shared::{
    App, AuthorizationStatus, Effect, Event, Model, PointOfInterest, ViewType,
};

fn point(id: i64, name: &str, location: &str, lat: f64, lon: f64) -> PointOfInterest {
    PointOfInterest {
        id,
        name: name.into(),
        event_date: "2024-06-01".into(),
        event_time: "21:00".into(),
        latitude: lat,
        longitude: lon,
        location_name: location.into(),
        description: String::new(),
        image: None,
    }
}

fn http_urls(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request.operation.url.clone()),
            _ => None,
        })
        .collect()
}

/// Drives the app into map mode with the given point set loaded.
fn map_with_points(app: &AppTester<App, Effect>, model: &mut Model, points: Vec<PointOfInterest>) {
    let update = app.update(Event::ViewTypeChanged(ViewType::Map), model);
    let urls = http_urls(&update.effects);
    assert_eq!(urls.len(), 1);
    assert!(urls[0].ends_with("getEventsList.php?page=1"));

    let response = ResponseBuilder::ok()
        .body(PostListResponse { post_list: points })
        .build();
    app.update(
        Event::EventsListResponse {
            generation: model.events_generation,
            page: 1,
            result: Box::new(Ok(response)),
        },
        model,
    );
}

#[test]
fn entering_the_map_loads_the_event_list() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    map_with_points(
        &app,
        &mut model,
        vec![point(1, "Jazz night", "Blue Note", 45.46, 9.19)],
    );

    assert_eq!(model.points.len(), 1);
}

#[test]
fn map_text_search_selects_by_location_label_locally() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    map_with_points(
        &app,
        &mut model,
        vec![
            point(1, "Aperitivo", "Navigli District", 45.45, 9.17),
            point(2, "Vernissage", "Brera Gallery", 45.47, 9.19),
        ],
    );

    let update = app.update(Event::SearchTextChanged("BRERA".into()), &mut model);

    assert!(http_urls(&update.effects).is_empty());
    assert_eq!(model.selected_point.as_ref().unwrap().id, 2);

    let region = model.map_region.unwrap();
    assert!((region.center.lat - 45.47).abs() < f64::EPSILON);
    assert!((region.span_m - 500.0).abs() < f64::EPSILON);
    assert_eq!(model.region_generation, 1);
}

#[test]
fn unmatched_map_search_leaves_selection_alone() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    map_with_points(
        &app,
        &mut model,
        vec![point(1, "Aperitivo", "Navigli District", 45.45, 9.17)],
    );

    app.update(Event::SearchTextChanged("navigli".into()), &mut model);
    assert_eq!(model.selected_point.as_ref().unwrap().id, 1);
    let generation = model.region_generation;

    app.update(Event::SearchTextChanged("duomo".into()), &mut model);
    assert_eq!(model.selected_point.as_ref().unwrap().id, 1);
    assert_eq!(model.region_generation, generation);
}

#[test]
fn recenter_on_user_happens_once_per_map_lifetime() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    app.update(
        Event::LocationAuthorizationChanged(AuthorizationStatus::AuthorizedWhenInUse),
        &mut model,
    );
    app.update(
        Event::CoordinateUpdated {
            lat: 45.46,
            lon: 9.19,
        },
        &mut model,
    );

    assert!(model.should_recenter);
    app.update(Event::MapShown, &mut model);

    assert!(!model.should_recenter);
    assert_eq!(model.region_generation, 1);
    let region = model.map_region.unwrap();
    assert!((region.center.lat - 45.46).abs() < f64::EPSILON);

    // Further layout passes must not recenter again.
    app.update(Event::MapShown, &mut model);
    app.update(Event::MapShown, &mut model);
    assert_eq!(model.region_generation, 1);
}

#[test]
fn recenter_flag_is_consumed_even_without_a_coordinate() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    app.update(Event::MapShown, &mut model);
    assert!(!model.should_recenter);
    assert!(model.map_region.is_none());

    // The fix arriving later does not resurrect the one-shot.
    app.update(
        Event::LocationAuthorizationChanged(AuthorizationStatus::AuthorizedWhenInUse),
        &mut model,
    );
    app.update(
        Event::CoordinateUpdated {
            lat: 45.46,
            lon: 9.19,
        },
        &mut model,
    );
    app.update(Event::MapShown, &mut model);

    assert!(model.map_region.is_none());
    assert_eq!(model.region_generation, 0);
}

#[test]
fn denied_authorization_disables_location_features() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    app.update(
        Event::LocationAuthorizationChanged(AuthorizationStatus::AuthorizedWhenInUse),
        &mut model,
    );
    assert!(model.location_enabled);

    app.update(
        Event::LocationAuthorizationChanged(AuthorizationStatus::Denied),
        &mut model,
    );
    assert!(!model.location_enabled);
    assert!(model.active_error.is_some());
}

#[test]
fn undetermined_authorization_triggers_a_permission_request() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    let update = app.update(
        Event::LocationAuthorizationChanged(AuthorizationStatus::NotDetermined),
        &mut model,
    );

    assert!(update
        .effects
        .iter()
        .any(|e| matches!(e, Effect::Location(_))));
}

#[test]
fn tapping_an_annotation_opens_the_detail_for_that_point() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    map_with_points(
        &app,
        &mut model,
        vec![
            point(1, "Open mic", "Bar A", 45.0, 9.0),
            point(2, "Open mic", "Bar B", 46.0, 9.0),
            point(3, "Vernissage", "Brera Gallery", 45.47, 9.19),
        ],
    );

    app.update(
        Event::AnnotationTapped {
            title: "Vernissage".into(),
        },
        &mut model,
    );
    assert_eq!(model.detail_point.as_ref().unwrap().id, 3);

    // Duplicate names resolve to the first point in sequence order.
    app.update(
        Event::AnnotationTapped {
            title: "Open mic".into(),
        },
        &mut model,
    );
    assert_eq!(model.detail_point.as_ref().unwrap().id, 1);

    app.update(Event::DetailDismissed, &mut model);
    assert!(model.detail_point.is_none());
}

#[test]
fn reselecting_the_same_point_recenters_again() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    map_with_points(
        &app,
        &mut model,
        vec![point(1, "Jazz night", "Blue Note", 45.46, 9.19)],
    );

    app.update(
        Event::AnnotationTapped {
            title: "Jazz night".into(),
        },
        &mut model,
    );
    app.update(
        Event::AnnotationTapped {
            title: "Jazz night".into(),
        },
        &mut model,
    );

    assert_eq!(model.region_generation, 2);
}

#[test]
fn load_more_appends_the_next_page() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    map_with_points(
        &app,
        &mut model,
        vec![point(1, "Jazz night", "Blue Note", 45.46, 9.19)],
    );

    let update = app.update(Event::LoadMoreEvents, &mut model);
    let urls = http_urls(&update.effects);
    assert_eq!(urls.len(), 1);
    assert!(urls[0].ends_with("getEventsList.php?page=2"));

    let response = ResponseBuilder::ok()
        .body(PostListResponse {
            post_list: vec![point(2, "Open mic", "Bar A", 45.0, 9.0)],
        })
        .build();
    app.update(
        Event::EventsListResponse {
            generation: model.events_generation,
            page: 2,
            result: Box::new(Ok(response)),
        },
        &mut model,
    );

    assert_eq!(model.points.len(), 2);
    assert_eq!(model.events_page, 2);
}

#[test]
fn unplaced_points_produce_no_annotations() {
    let mut model = Model::default();
    model.view_type = ViewType::Map;
    model.points = vec![
        point(1, "Placed", "Somewhere", 45.46, 9.19),
        point(2, "Unplaced", "Nowhere yet", 0.0, 0.0),
    ];

    let vm = App::default().view(&model);
    assert_eq!(vm.annotations.len(), 1);
    assert_eq!(vm.annotations[0].id, 1);
}

proptest! {
    /// The annotation set is exactly the subset of points whose name
    /// contains the search text case-insensitively; an empty text passes
    /// the whole point set through.
    #[test]
    fn annotations_are_the_name_filtered_point_set(
        names in prop::collection::vec("[A-Za-z ]{0,10}", 0..12),
        text in "[A-Za-z]{0,3}",
    ) {
        let mut model = Model::default();
        model.view_type = ViewType::Map;
        model.search_text = text.clone();
        model.points = names
            .iter()
            .enumerate()
            .map(|(i, name)| point(i as i64, name, "Somewhere", 45.0, 9.0))
            .collect();

        let vm = App::default().view(&model);

        let expected: Vec<&String> = names
            .iter()
            .filter(|name| {
                text.is_empty() || name.to_lowercase().contains(&text.to_lowercase())
            })
            .collect();

        prop_assert_eq!(vm.annotations.len(), expected.len());
        for (annotation, name) in vm.annotations.iter().zip(expected) {
            prop_assert_eq!(&annotation.title, name);
        }
    }
}
