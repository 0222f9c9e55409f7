//! Cursor pagination tests against the in-memory store
//!
//! Run with: cargo test -p integration-tests --test pagination_tests

use integration_tests::{local_user, nid, note, TestWorld};
use masto_core::{IdSpace, Notification, NotificationType};
use masto_service::{NotificationService, QueryParams, TimelineService};

/// Ten public notes, nid(1) oldest and nid(10) newest
fn timeline_world() -> TestWorld {
    let world = TestWorld::new();
    let alice = local_user(1, "alice");
    world.store.add_user(alice.clone());
    for n in 1..=10 {
        world.store.add_note(note(n, &alice, &format!("note {n}")));
    }
    world
}

fn wire(n: u32) -> String {
    IdSpace::Mastodon.encode(&nid(n)).into_inner()
}

fn params(pairs: &[(&str, String)]) -> QueryParams {
    QueryParams::from_pairs(pairs.iter().map(|(k, v)| (*k, v.clone())))
}

fn ids(statuses: &[masto_service::dto::Status]) -> Vec<String> {
    statuses.iter().map(|s| s.id.clone()).collect()
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_max_id_pages_downwards() {
    let world = timeline_world();
    let ctx = world.request(None);
    let query = params(&[("max_id", wire(10)), ("limit", "3".into())]);

    let page = TimelineService::new(&ctx).public(&query).await.unwrap();

    assert_eq!(ids(&page.items), vec![wire(9), wire(8), wire(7)]);
    assert_eq!(page.min_id, Some(nid(9)));
    assert_eq!(page.max_id, Some(nid(7)));
}

#[tokio::test]
async fn test_min_id_returns_notes_directly_above_newest_first() {
    let world = timeline_world();
    let ctx = world.request(None);
    let query = params(&[("min_id", wire(6)), ("limit", "3".into())]);

    let page = TimelineService::new(&ctx).public(&query).await.unwrap();

    assert_eq!(ids(&page.items), vec![wire(9), wire(8), wire(7)]);
}

#[tokio::test]
async fn test_since_id_returns_newest_above_cursor() {
    let world = timeline_world();
    let ctx = world.request(None);
    let query = params(&[("since_id", wire(6)), ("limit", "3".into())]);

    let page = TimelineService::new(&ctx).public(&query).await.unwrap();

    assert_eq!(ids(&page.items), vec![wire(10), wire(9), wire(8)]);
}

#[tokio::test]
async fn test_max_and_min_bound_both_sides() {
    let world = timeline_world();
    let ctx = world.request(None);
    let query = params(&[("max_id", wire(8)), ("since_id", wire(5))]);

    let page = TimelineService::new(&ctx).public(&query).await.unwrap();

    assert_eq!(ids(&page.items), vec![wire(7), wire(6)]);
}

// ============================================================================
// Limits
// ============================================================================

#[tokio::test]
async fn test_limit_clamped_to_cap() {
    let world = TestWorld::new();
    let alice = local_user(1, "alice");
    world.store.add_user(alice.clone());
    for n in 1..=60 {
        world.store.add_note(note(n, &alice, "x"));
    }
    let ctx = world.request(None);

    let page = TimelineService::new(&ctx)
        .public(&params(&[("limit", "1000".into())]))
        .await
        .unwrap();
    assert_eq!(page.len(), 40);
    assert_eq!(page.limit, 40);
}

#[tokio::test]
async fn test_zero_and_negative_limits_become_one() {
    let world = timeline_world();
    let ctx = world.request(None);

    for raw in ["0", "-5"] {
        let page = TimelineService::new(&ctx)
            .public(&params(&[("limit", raw.into())]))
            .await
            .unwrap();
        assert_eq!(ids(&page.items), vec![wire(10)], "limit={raw}");
    }
}

#[tokio::test]
async fn test_default_limit() {
    let world = TestWorld::new();
    let alice = local_user(1, "alice");
    world.store.add_user(alice.clone());
    for n in 1..=30 {
        world.store.add_note(note(n, &alice, "x"));
    }
    let ctx = world.request(None);

    let page = TimelineService::new(&ctx).public(&QueryParams::new()).await.unwrap();
    assert_eq!(page.len(), 20);
}

#[tokio::test]
async fn test_non_integer_limit_is_rejected() {
    let world = timeline_world();
    let ctx = world.request(None);

    let result = TimelineService::new(&ctx)
        .public(&params(&[("limit", "many".into())]))
        .await;
    assert!(result.is_err());
}

// ============================================================================
// Over-fetch
// ============================================================================

#[tokio::test]
async fn test_failing_query_yields_empty_page() {
    let world = timeline_world();
    world.store.fail_page_queries(true);
    let ctx = world.request(None);

    let page = TimelineService::new(&ctx).public(&QueryParams::new()).await.unwrap();

    assert!(page.is_empty());
    assert_eq!(page.max_id, None);
    assert_eq!(page.min_id, None);
}

/// Unsupported kinds are skipped while paging, so pages still fill
#[tokio::test]
async fn test_skipped_rows_do_not_shorten_page() {
    let world = TestWorld::new();
    let me = local_user(1, "me");
    let bob = local_user(2, "bob");
    world.store.add_user(me.clone());
    world.store.add_user(bob.clone());
    for n in 1..=20 {
        let kind = if n % 2 == 0 {
            NotificationType::Follow
        } else {
            NotificationType::App
        };
        world
            .store
            .add_notification(Notification::new(nid(n), me.id.clone(), kind).from_user(bob.id.clone()));
    }
    let ctx = world.request(Some(&me));

    let page = NotificationService::new(&ctx)
        .list(&params(&[("limit", "4".into())]))
        .await
        .unwrap();

    let got: Vec<String> = page.items.iter().map(|n| n.id.clone()).collect();
    assert_eq!(got, vec![wire(20), wire(18), wire(16), wire(14)]);
    assert!(world.store.page_queries() > 1);
}

#[tokio::test]
async fn test_scan_stops_at_bound() {
    let world = TestWorld::new();
    let me = local_user(1, "me");
    world.store.add_user(me.clone());
    for n in 1..=200 {
        world
            .store
            .add_notification(Notification::new(nid(n), me.id.clone(), NotificationType::App));
    }
    let ctx = world.request(Some(&me));

    let page = NotificationService::new(&ctx)
        .list(&params(&[("limit", "2".into())]))
        .await
        .unwrap();

    assert!(page.is_empty());
    // batches of 3 until 20 rows have been scanned
    assert_eq!(world.store.page_queries(), 7);
}

#[tokio::test]
async fn test_store_running_dry_stops_scanning() {
    let world = timeline_world();
    let ctx = world.request(None);

    let page = TimelineService::new(&ctx)
        .public(&params(&[("limit", "40".into())]))
        .await
        .unwrap();

    assert_eq!(page.len(), 10);
    assert_eq!(world.store.page_queries(), 1);
}

// ============================================================================
// Link header
// ============================================================================

#[tokio::test]
async fn test_link_header_uses_wire_ids() {
    let world = timeline_world();
    let ctx = world.request(None);

    let page = TimelineService::new(&ctx)
        .public(&params(&[("limit", "2".into())]))
        .await
        .unwrap();
    let link = page
        .link_header("https://social.example/api/v1/timelines/public", IdSpace::Mastodon)
        .unwrap();

    assert_eq!(
        link,
        format!(
            "<https://social.example/api/v1/timelines/public?limit=2&max_id={}>; rel=\"next\", \
             <https://social.example/api/v1/timelines/public?limit=2&min_id={}>; rel=\"prev\"",
            wire(9),
            wire(10)
        )
    );
}
