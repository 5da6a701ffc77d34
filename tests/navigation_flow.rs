//! Integration tests driving a navigator end to end

use serde_json::json;
use tokio::sync::broadcast;
use tokio_test::{assert_err, assert_ok};

use pagenav_app::test_utils::{test_session, DisplayCall, LifecycleProbe, TestSession};
use pagenav_app::{NavEventKind, Navigator, PageRegistration, PushOptions};
use pagenav_core::{Error, Idiom, NavEvent, Orientation};

fn register_pages(t: &mut TestSession) {
    let probe: &LifecycleProbe = &t.probe;
    let pages = vec![
        PageRegistration::new(
            "Root",
            probe.page_variant("RootPage"),
            probe.view_model_variant("RootViewModel"),
        ),
        PageRegistration::new(
            "Detail",
            probe.page_variant("DetailPage"),
            probe.view_model_variant("DetailViewModel"),
        ),
        PageRegistration::new(
            "Detail",
            probe.page_variant("TabletDetailPage"),
            probe.view_model_variant("DetailViewModel"),
        )
        .idiom(Idiom::Tablet),
        PageRegistration::new(
            "Settings",
            probe.page_variant("SettingsPage"),
            probe.view_model_variant("SettingsViewModel"),
        )
        .default_args(vec![json!("defaults")]),
    ];

    for page in pages {
        t.session.register(page).unwrap();
    }
}

fn drain(rx: &mut broadcast::Receiver<NavEvent>) -> Vec<NavEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_tablet_session_lifecycle() {
    let mut t = test_session();
    t.device.set_idiom(Idiom::Tablet);
    register_pages(&mut t);

    let TestSession {
        session,
        display,
        probe,
        ..
    } = t;
    let (navigator, handle) = Navigator::spawn(session);
    let mut events = navigator.subscribe();

    assert_ok!(navigator.init("Root").await);
    assert_ok!(navigator.push("Detail", PushOptions::new()).await);
    assert_ok!(
        navigator
            .push(
                "Settings",
                PushOptions::new().modal(true).args(vec![json!("Property1")]),
            )
            .await
    );

    // Idiom narrowing picked the tablet view
    assert_eq!(probe.pages_created("TabletDetailPage"), 1);
    assert_eq!(probe.pages_created("DetailPage"), 0);
    assert_eq!(
        probe.last_view_model_args("SettingsViewModel"),
        Some(vec![json!("Property1")])
    );

    let snapshot = navigator.snapshot().await.unwrap();
    assert_eq!(snapshot.primary_urls(), vec!["Root", "Detail"]);
    assert_eq!(snapshot.modal_urls(), vec!["Settings"]);

    assert_ok!(navigator.pop_to_root().await);
    let snapshot = navigator.snapshot().await.unwrap();
    assert_eq!(snapshot.primary_urls(), vec!["Root"]);
    assert!(snapshot.modal_urls().is_empty());

    assert_eq!(probe.page_disposals("TabletDetailPage"), 1);
    assert_eq!(probe.page_disposals("SettingsPage"), 1);
    assert!(probe.view_model_disposed_before_page_disposed("DetailViewModel", "TabletDetailPage"));

    assert_eq!(
        display.calls(),
        vec![
            DisplayCall::Root {
                url: "Root".to_string()
            },
            DisplayCall::Push {
                url: "Detail".to_string(),
                modal: false
            },
            DisplayCall::Push {
                url: "Settings".to_string(),
                modal: true
            },
            DisplayCall::PopToRoot,
        ]
    );

    let kinds: Vec<_> = drain(&mut events)
        .into_iter()
        .filter(|e| e.url == "Settings")
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            NavEventKind::StartedNavigation,
            NavEventKind::InitializingViewModel,
            NavEventKind::InitializedViewModel,
            NavEventKind::InitializingView,
            NavEventKind::InitializedView,
            NavEventKind::FinishedNavigation,
        ]
    );

    assert_ok!(navigator.shutdown().await);
    handle.await.unwrap();

    // Shutdown disposes the root too
    assert_eq!(probe.page_disposals("RootPage"), 1);
    assert_eq!(probe.live_pages("RootPage"), 0);
}

#[tokio::test]
async fn test_pushing_open_page_reuses_instance() {
    let mut t = test_session();
    register_pages(&mut t);
    let TestSession {
        session,
        display,
        probe,
        ..
    } = t;
    let (navigator, handle) = Navigator::spawn(session);

    assert_ok!(navigator.init("Root").await);
    assert_ok!(navigator.push("Detail", PushOptions::new()).await);
    assert_ok!(navigator.push("Settings", PushOptions::new()).await);
    display.clear();

    assert_ok!(navigator.push("detail", PushOptions::new()).await);

    let snapshot = navigator.snapshot().await.unwrap();
    assert_eq!(snapshot.primary_urls(), vec!["Root", "Settings", "Detail"]);
    assert_eq!(probe.pages_created("DetailPage"), 1);
    assert_eq!(
        display.calls(),
        vec![
            DisplayCall::Remove {
                url: "Detail".to_string()
            },
            DisplayCall::Push {
                url: "Detail".to_string(),
                modal: false
            },
        ]
    );

    // Pushing the root url returns to it
    assert_ok!(navigator.push("Root", PushOptions::new()).await);
    let snapshot = navigator.snapshot().await.unwrap();
    assert_eq!(snapshot.primary_urls(), vec!["Root"]);
    assert_eq!(probe.pages_created("RootPage"), 1);

    assert_ok!(navigator.shutdown().await);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_errors_leave_stacks_untouched() {
    let mut t = test_session();
    register_pages(&mut t);
    let TestSession { session, probe, .. } = t;
    let (navigator, handle) = Navigator::spawn(session);

    let err = assert_err!(navigator.push("Detail", PushOptions::new()).await);
    assert!(matches!(err, Error::InvalidOperation { .. }));

    assert_ok!(navigator.init("Root").await);

    let err = assert_err!(navigator.pop(None).await);
    assert!(matches!(err, Error::InvalidOperation { .. }));

    let err = assert_err!(navigator.push("Missing", PushOptions::new()).await);
    assert!(matches!(err, Error::PageNotFound { .. }));

    let err = assert_err!(navigator.push("  ", PushOptions::new()).await);
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let snapshot = navigator.snapshot().await.unwrap();
    assert_eq!(snapshot.primary_urls(), vec!["Root"]);
    assert_eq!(probe.pages_created("RootPage"), 1);

    assert_ok!(navigator.shutdown().await);
    handle.await.unwrap();
    assert!(navigator.is_closed());

    let err = assert_err!(navigator.init("Root").await);
    assert!(matches!(err, Error::ChannelClosed));
}

#[tokio::test]
async fn test_orientation_change_rebuilds_tailored_page() {
    let mut t = test_session();
    register_pages(&mut t);
    t.session
        .register(
            PageRegistration::new(
                "Detail",
                t.probe.page_variant("LandscapeDetailPage"),
                t.probe.view_model_variant("DetailViewModel"),
            )
            .orientation(Orientation::Landscape),
        )
        .unwrap();

    let TestSession {
        session,
        device,
        probe,
        ..
    } = t;
    let (navigator, handle) = Navigator::spawn(session);

    assert_ok!(navigator.init("Root").await);
    assert_ok!(navigator.push("Detail", PushOptions::new()).await);

    device.set_orientation(Orientation::Landscape);
    assert_ok!(navigator.orientation_changed(Orientation::Landscape).await);

    let snapshot = navigator.snapshot().await.unwrap();
    assert_eq!(snapshot.primary_urls(), vec!["Root", "Detail"]);
    assert_eq!(snapshot.primary[1].page_variant, "LandscapeDetailPage");
    assert_eq!(snapshot.primary[1].orientation, Orientation::Landscape);

    // The view model is carried over by default
    assert_eq!(probe.view_models_created("DetailViewModel"), 1);
    assert_eq!(probe.page_disposals("DetailPage"), 1);
    assert_eq!(probe.view_model_disposals("DetailViewModel"), 0);

    assert_ok!(navigator.shutdown().await);
    handle.await.unwrap();
}
