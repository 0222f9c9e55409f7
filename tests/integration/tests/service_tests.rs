//! Query service tests
//!
//! Run with: cargo test -p integration-tests --test service_tests

use integration_tests::{local_user, nid, note, remote_user, renote, test_config, uid, TestWorld};
use masto_core::{
    DomainError, FfVisibility, IdSpace, NativeId, NoteReaction, Notification, NotificationType,
    Relation, User, UserProfile,
};
use masto_service::{
    AccountService, NotificationService, QueryParams, ServiceError, StatusService, TimelineService,
};

fn wire(id: &NativeId) -> String {
    IdSpace::Mastodon.encode(id).into_inner()
}

fn params(pairs: &[(&str, &str)]) -> QueryParams {
    QueryParams::from_pairs(pairs.iter().copied())
}

// ============================================================================
// Timelines
// ============================================================================

#[tokio::test]
async fn test_home_timeline_requires_viewer() {
    let world = TestWorld::new();
    let ctx = world.request(None);

    let err = TimelineService::new(&ctx).home(&QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Unauthenticated));
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn test_home_timeline_includes_followed_users() {
    let world = TestWorld::new();
    let me = local_user(1, "me");
    let friend = local_user(2, "friend");
    let stranger = local_user(3, "stranger");
    for user in [&me, &friend, &stranger] {
        world.store.add_user(user.clone());
    }
    world.store.follow(nid(100), &me, &friend);
    world.store.add_note(note(1, &me, "mine"));
    world.store.add_note(note(2, &friend, "friend's"));
    world.store.add_note(note(3, &stranger, "not followed"));
    let ctx = world.request(Some(&me));

    let page = TimelineService::new(&ctx).home(&QueryParams::new()).await.unwrap();

    let ids: Vec<String> = page.items.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids, vec![wire(&nid(2)), wire(&nid(1))]);
}

#[tokio::test]
async fn test_public_timeline_local_and_remote_are_exclusive() {
    let world = TestWorld::new();
    let ctx = world.request(None);

    let err = TimelineService::new(&ctx)
        .public(&params(&[("local", "true"), ("remote", "true")]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::ValidationError(_))));
}

#[tokio::test]
async fn test_public_timeline_origin_filters() {
    let world = TestWorld::new();
    let alice = local_user(1, "alice");
    let bob = remote_user(2, "bob", "remote.example");
    world.store.add_user(alice.clone());
    world.store.add_user(bob.clone());
    world.store.add_note(note(1, &alice, "local"));
    world.store.add_note(note(2, &bob, "remote"));
    let ctx = world.request(None);
    let service = TimelineService::new(&ctx);

    let local = service.public(&params(&[("local", "true")])).await.unwrap();
    assert_eq!(local.items.len(), 1);
    assert_eq!(local.items[0].account.username, "alice");

    let remote = service.public(&params(&[("remote", "1")])).await.unwrap();
    assert_eq!(remote.items.len(), 1);
    assert_eq!(remote.items[0].account.acct, "bob@remote.example");

    let all = service.public(&QueryParams::new()).await.unwrap();
    assert_eq!(all.items.len(), 2);
}

#[tokio::test]
async fn test_disabled_global_timeline() {
    let mut config = test_config();
    config.compat.disable_global_timeline = true;
    let world = TestWorld::with_config(config);
    let user = local_user(1, "user");
    let mut admin = local_user(2, "admin");
    admin.is_admin = true;
    world.store.add_user(user.clone());
    world.store.add_user(admin.clone());

    let ctx = world.request(Some(&user));
    let err = TimelineService::new(&ctx).public(&QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::TimelineDisabled)));
    assert_eq!(err.status_code(), 403);

    // The local timeline stays available
    assert!(TimelineService::new(&ctx)
        .public(&params(&[("local", "true")]))
        .await
        .is_ok());

    let staff_ctx = world.request(Some(&admin));
    assert!(TimelineService::new(&staff_ctx).public(&QueryParams::new()).await.is_ok());
}

#[tokio::test]
async fn test_hidden_notes_stay_hidden() {
    let world = TestWorld::new();
    let alice = local_user(1, "alice");
    world.store.add_user(alice.clone());
    world.store.add_note(note(1, &alice, "public"));
    world.store.add_note(note(2, &alice, "secret"));
    world.store.hide_note(&nid(2));

    let anon = world.request(None);
    let page = TimelineService::new(&anon).public(&QueryParams::new()).await.unwrap();
    assert_eq!(page.items.len(), 1);

    let err = StatusService::new(&anon).get(&nid(2)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::NoteNotFound(_))));

    let author = world.request(Some(&alice));
    assert!(StatusService::new(&author).get(&nid(2)).await.is_ok());
}

// ============================================================================
// Accounts
// ============================================================================

fn account_world() -> (TestWorld, User) {
    let world = TestWorld::new();
    let alice = local_user(1, "alice");
    world.store.add_user(alice.clone());
    let mut reply = note(2, &alice, "a reply");
    reply.reply_id = Some(nid(1));
    let mut media = note(3, &alice, "a picture");
    media.file_ids = vec![nid(900)];
    world.store.add_note(note(1, &alice, "plain"));
    world.store.add_note(reply);
    world.store.add_note(media);
    world.store.add_note(renote(4, &alice, &note(1, &alice, "plain")));
    (world, alice)
}

async fn account_status_ids(world: &TestWorld, user: &User, query: &[(&str, &str)]) -> Vec<String> {
    let ctx = world.request(None);
    AccountService::new(&ctx)
        .statuses(&user.id, &params(query))
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|s| s.id)
        .collect()
}

#[tokio::test]
async fn test_account_statuses_filters() {
    let (world, alice) = account_world();
    let all = [4, 3, 2, 1].map(|n| wire(&nid(n))).to_vec();

    assert_eq!(account_status_ids(&world, &alice, &[]).await, all);
    assert_eq!(
        account_status_ids(&world, &alice, &[("exclude_replies", "true")]).await,
        [4, 3, 1].map(|n| wire(&nid(n))).to_vec()
    );
    assert_eq!(
        account_status_ids(&world, &alice, &[("exclude_reblogs", "true")]).await,
        [3, 2, 1].map(|n| wire(&nid(n))).to_vec()
    );
    assert_eq!(
        account_status_ids(&world, &alice, &[("only_media", "true")]).await,
        vec![wire(&nid(3))]
    );
}

#[tokio::test]
async fn test_account_statuses_pinned() {
    let (world, alice) = account_world();
    world.store.pin(&alice.id, &nid(1));
    world.store.pin(&alice.id, &nid(3));

    assert_eq!(
        account_status_ids(&world, &alice, &[("pinned", "true")]).await,
        vec![wire(&nid(3)), wire(&nid(1))]
    );
}

#[tokio::test]
async fn test_account_statuses_unknown_user() {
    let world = TestWorld::new();
    let ctx = world.request(None);

    let err = AccountService::new(&ctx)
        .statuses(&uid(42), &QueryParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::UserNotFound(_))));
}

fn follow_world(ff: FfVisibility) -> (TestWorld, User, User, User) {
    let world = TestWorld::new();
    let target = local_user(1, "target");
    let follower = local_user(2, "follower");
    let outsider = local_user(3, "outsider");
    for user in [&target, &follower, &outsider] {
        world.store.add_user(user.clone());
    }
    world.store.follow(nid(100), &follower, &target);
    world.store.add_profile(UserProfile {
        ff_visibility: ff,
        ..UserProfile::for_user(target.id.clone())
    });
    (world, target, follower, outsider)
}

async fn follower_count(world: &TestWorld, target: &User, viewer: Option<&User>) -> usize {
    let ctx = world.request(viewer);
    AccountService::new(&ctx)
        .followers(&target.id, &QueryParams::new())
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn test_follow_lists_public() {
    let (world, target, _, outsider) = follow_world(FfVisibility::Public);
    assert_eq!(follower_count(&world, &target, None).await, 1);
    assert_eq!(follower_count(&world, &target, Some(&outsider)).await, 1);
}

#[tokio::test]
async fn test_follow_lists_followers_only() {
    let (world, target, follower, outsider) = follow_world(FfVisibility::Followers);
    assert_eq!(follower_count(&world, &target, None).await, 0);
    assert_eq!(follower_count(&world, &target, Some(&outsider)).await, 0);
    assert_eq!(follower_count(&world, &target, Some(&follower)).await, 1);
    assert_eq!(follower_count(&world, &target, Some(&target)).await, 1);
}

#[tokio::test]
async fn test_follow_lists_private() {
    let (world, target, follower, _) = follow_world(FfVisibility::Private);
    assert_eq!(follower_count(&world, &target, Some(&follower)).await, 0);
    assert_eq!(follower_count(&world, &target, Some(&target)).await, 1);
}

#[tokio::test]
async fn test_following_list_returns_followees() {
    let (world, target, follower, _) = follow_world(FfVisibility::Public);
    let ctx = world.request(None);

    let page = AccountService::new(&ctx)
        .following(&follower.id, &QueryParams::new())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, wire(&target.id));
    assert_eq!(page.max_id, Some(nid(100)));
}

#[tokio::test]
async fn test_relationships() {
    let (world, target, follower, outsider) = follow_world(FfVisibility::Public);
    world.store.set_relation(
        &follower.id,
        Relation {
            muting: true,
            muting_renotes: true,
            ..Relation::none(outsider.id.clone())
        },
    );
    let ctx = world.request(Some(&follower));
    let ids = [wire(&target.id), wire(&outsider.id)];

    let relationships = AccountService::new(&ctx).relationships(&ids).await.unwrap();

    assert_eq!(relationships.len(), 2);
    assert_eq!(relationships[0].id, ids[0]);
    assert!(relationships[0].following);
    assert!(!relationships[0].followed_by);
    assert!(relationships[0].showing_reblogs);
    assert!(relationships[1].muting);
    assert!(!relationships[1].showing_reblogs);
}

#[tokio::test]
async fn test_relationships_reject_malformed_ids() {
    let (world, _, follower, _) = follow_world(FfVisibility::Public);
    let ctx = world.request(Some(&follower));

    let err = AccountService::new(&ctx)
        .relationships(&["not-a-number"])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::MalformedIdentifier { .. })));
}

// ============================================================================
// Statuses
// ============================================================================

#[tokio::test]
async fn test_status_context() {
    let world = TestWorld::new();
    let alice = local_user(1, "alice");
    world.store.add_user(alice.clone());
    for n in 1..=4 {
        let mut n_note = note(n, &alice, "thread");
        if n > 1 {
            n_note.reply_id = Some(nid(n - 1));
        }
        world.store.add_note(n_note);
    }
    // nid(6) sits three levels below nid(3)
    for n in 5..=6 {
        let mut reply = note(n, &alice, "deeper");
        reply.reply_id = Some(nid(n - 1));
        world.store.add_note(reply);
    }
    let ctx = world.request(None);

    let context = StatusService::new(&ctx).context(&nid(3)).await.unwrap();

    let ancestors: Vec<String> = context.ancestors.iter().map(|s| s.id.clone()).collect();
    let descendants: Vec<String> = context.descendants.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ancestors, vec![wire(&nid(1)), wire(&nid(2))]);
    assert_eq!(descendants, vec![wire(&nid(4)), wire(&nid(5))]);
}

#[tokio::test]
async fn test_context_stops_at_hidden_ancestor() {
    let world = TestWorld::new();
    let alice = local_user(1, "alice");
    world.store.add_user(alice.clone());
    for n in 1..=3 {
        let mut n_note = note(n, &alice, "thread");
        if n > 1 {
            n_note.reply_id = Some(nid(n - 1));
        }
        world.store.add_note(n_note);
    }
    world.store.hide_note(&nid(1));
    let ctx = world.request(None);

    let context = StatusService::new(&ctx).context(&nid(3)).await.unwrap();

    let ancestors: Vec<String> = context.ancestors.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ancestors, vec![wire(&nid(2))]);
}

#[tokio::test]
async fn test_ancestor_walk_is_bounded() {
    let world = TestWorld::new();
    let alice = local_user(1, "alice");
    world.store.add_user(alice.clone());
    for n in 1..=15 {
        let mut n_note = note(n, &alice, "long thread");
        if n > 1 {
            n_note.reply_id = Some(nid(n - 1));
        }
        world.store.add_note(n_note);
    }
    let ctx = world.request(None);

    let context = StatusService::new(&ctx).context(&nid(15)).await.unwrap();

    assert_eq!(context.ancestors.len(), 10);
    assert_eq!(context.ancestors[0].id, wire(&nid(5)));
    assert_eq!(context.ancestors[9].id, wire(&nid(14)));
}

#[tokio::test]
async fn test_favourited_and_reblogged_by() {
    let world = TestWorld::new();
    let alice = local_user(1, "alice");
    let bob = local_user(2, "bob");
    let carol = local_user(3, "carol");
    for user in [&alice, &bob, &carol] {
        world.store.add_user(user.clone());
    }
    let liked = note(1, &alice, "liked");
    world.store.add_note(liked.clone());
    world
        .store
        .add_reaction(NoteReaction::new(nid(10), liked.id.clone(), bob.clone(), "👍"));
    world
        .store
        .add_reaction(NoteReaction::new(nid(11), liked.id.clone(), carol.clone(), ":blob:"));
    world.store.add_note(renote(20, &carol, &liked));
    let ctx = world.request(None);
    let service = StatusService::new(&ctx);

    let favourited = service.favourited_by(&liked.id, &QueryParams::new()).await.unwrap();
    let names: Vec<&str> = favourited.items.iter().map(|a| a.username.as_str()).collect();
    assert_eq!(names, vec!["carol", "bob"]);
    assert_eq!(favourited.max_id, Some(nid(10)));

    let reblogged = service.reblogged_by(&liked.id, &QueryParams::new()).await.unwrap();
    let names: Vec<&str> = reblogged.items.iter().map(|a| a.username.as_str()).collect();
    assert_eq!(names, vec!["carol"]);
}

// ============================================================================
// Notifications
// ============================================================================

fn notifications_world() -> (TestWorld, User, User, User) {
    let world = TestWorld::new();
    let me = local_user(1, "me");
    let bob = local_user(2, "bob");
    let carol = local_user(3, "carol");
    for user in [&me, &bob, &carol] {
        world.store.add_user(user.clone());
    }
    let mine = note(50, &me, "mine");
    world.store.add_note(mine.clone());
    let rows = [
        Notification::new(nid(1), me.id.clone(), NotificationType::Follow).from_user(bob.id.clone()),
        Notification::new(nid(2), me.id.clone(), NotificationType::Reply)
            .from_user(carol.id.clone())
            .with_note(mine.clone()),
        Notification::new(nid(3), me.id.clone(), NotificationType::Mention)
            .from_user(bob.id.clone())
            .with_note(mine.clone()),
        Notification::new(nid(4), me.id.clone(), NotificationType::App),
        Notification::new(nid(5), bob.id.clone(), NotificationType::Follow).from_user(me.id.clone()),
    ];
    for row in rows {
        world.store.add_notification(row);
    }
    (world, me, bob, carol)
}

async fn notification_ids(world: &TestWorld, viewer: &User, query: &[(&str, &str)]) -> Vec<String> {
    let ctx = world.request(Some(viewer));
    NotificationService::new(&ctx)
        .list(&params(query))
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|n| n.id)
        .collect()
}

#[tokio::test]
async fn test_notifications_list_skips_unsupported_and_others() {
    let (world, me, _, _) = notifications_world();
    assert_eq!(
        notification_ids(&world, &me, &[]).await,
        [3, 2, 1].map(|n| wire(&nid(n))).to_vec()
    );
}

#[tokio::test]
async fn test_notifications_type_filters() {
    let (world, me, bob, _) = notifications_world();

    assert_eq!(
        notification_ids(&world, &me, &[("types[]", "mention")]).await,
        [3, 2].map(|n| wire(&nid(n))).to_vec()
    );
    assert_eq!(
        notification_ids(&world, &me, &[("exclude_types[]", "mention")]).await,
        vec![wire(&nid(1))]
    );
    // No native kind maps to a status notification
    assert!(notification_ids(&world, &me, &[("types[]", "status")]).await.is_empty());

    let bob_wire = wire(&bob.id);
    assert_eq!(
        notification_ids(&world, &me, &[("account_id", bob_wire.as_str())]).await,
        [3, 1].map(|n| wire(&nid(n))).to_vec()
    );
}

#[tokio::test]
async fn test_single_notification() {
    let (world, me, bob, _) = notifications_world();
    let ctx = world.request(Some(&me));
    let service = NotificationService::new(&ctx);

    let follow = service.get(&nid(1)).await.unwrap();
    assert_eq!(follow.account.username, "bob");

    let unsupported = service.get(&nid(4)).await.unwrap_err();
    assert!(matches!(
        unsupported,
        ServiceError::Domain(DomainError::NotificationNotFound(_))
    ));

    // Indistinguishable from a notification that does not exist
    let someone_elses = service.get(&nid(5)).await.unwrap_err();
    assert!(matches!(
        someone_elses,
        ServiceError::Domain(DomainError::NotificationNotFound(_))
    ));
    assert_eq!(someone_elses.status_code(), 404);
    assert_eq!(someone_elses.error_code(), "UNKNOWN_NOTIFICATION");

    let bob_ctx = world.request(Some(&bob));
    assert!(NotificationService::new(&bob_ctx).get(&nid(5)).await.is_ok());
}
