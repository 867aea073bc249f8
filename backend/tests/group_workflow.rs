//! End-to-end group workflow: creation, approval gate, membership, and the
//! XP side effects, driven through the services over in-memory stores.

mod support;

use chrono::Utc;
use studysphere::domain::gamification::{LevelCurve, XpAction, XpRewards};
use studysphere::domain::ports::UserRepository;
use studysphere::domain::{
    Actor, Badge, ErrorCode, GroupDraft, GroupStatus, LeaderboardPeriod,
};
use support::World;
use uuid::Uuid;

fn draft(name: &str) -> GroupDraft {
    GroupDraft {
        name: name.to_owned(),
        subject: "CS 201".to_owned(),
        description: "Weekly review".to_owned(),
    }
}

#[tokio::test]
async fn pending_groups_become_visible_after_approval() {
    let world = World::new();
    let creator = world.register("creator", false).await;
    let admin = world.register("site admin", true).await;
    let onlooker = world.register("onlooker", false).await;

    let group = world
        .groups
        .create_group(&creator, draft("Algorithms circle"))
        .await
        .expect("create succeeds");
    assert_eq!(group.status, GroupStatus::Pending);

    // Invisible to non-admins until approved; admins see it immediately.
    let listed = world.groups.list_groups(&onlooker).await.expect("list");
    assert!(listed.is_empty());
    let listed = world.groups.list_groups(&admin).await.expect("admin list");
    assert_eq!(listed.len(), 1);

    world
        .groups
        .approve_group(&admin, &group.id)
        .await
        .expect("approve succeeds");

    let listed = world.groups.list_groups(&onlooker).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, GroupStatus::Approved);
    assert!(!listed[0].is_member);
}

#[tokio::test]
async fn joining_an_approved_group_awards_xp_once() {
    let world = World::new();
    let creator = world.register("creator", false).await;
    let admin = world.register("site admin", true).await;
    let joiner = world.register("joiner", false).await;
    let rewards = XpRewards::default();

    let group = world
        .groups
        .create_group(&creator, draft("Algorithms circle"))
        .await
        .expect("create succeeds");

    // Joining before approval is gated.
    let error = world
        .groups
        .join_group(&joiner, &group.id)
        .await
        .expect_err("not approved yet");
    assert_eq!(error.code(), ErrorCode::Forbidden);

    world
        .groups
        .approve_group(&admin, &group.id)
        .await
        .expect("approve succeeds");

    let awarded = world
        .groups
        .join_group(&joiner, &group.id)
        .await
        .expect("join succeeds");
    assert_eq!(awarded.xp_earned, rewards.amount_for(XpAction::JoinGroup));
    assert_eq!(world.xp_of(&joiner).await, awarded.xp_earned);

    // The pair is unique: a second join conflicts and awards nothing.
    let error = world
        .groups
        .join_group(&joiner, &group.id)
        .await
        .expect_err("already a member");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(world.xp_of(&joiner).await, awarded.xp_earned);

    let view = world
        .groups
        .get_group(&joiner, &group.id)
        .await
        .expect("get succeeds");
    assert!(view.is_member);
    assert_eq!(view.members_count, 2);
}

#[tokio::test]
async fn leaving_a_group_has_no_xp_penalty() {
    let world = World::new();
    let creator = world.register("creator", false).await;
    let admin = world.register("site admin", true).await;
    let joiner = world.register("joiner", false).await;

    let group = world
        .groups
        .create_group(&creator, draft("Algorithms circle"))
        .await
        .expect("create succeeds");
    world
        .groups
        .approve_group(&admin, &group.id)
        .await
        .expect("approve succeeds");
    world
        .groups
        .join_group(&joiner, &group.id)
        .await
        .expect("join succeeds");
    let xp_after_join = world.xp_of(&joiner).await;

    world
        .groups
        .leave_group(&joiner, &group.id)
        .await
        .expect("leave succeeds");
    assert_eq!(world.xp_of(&joiner).await, xp_after_join);

    let error = world
        .groups
        .leave_group(&joiner, &group.id)
        .await
        .expect_err("no membership left");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn xp_awards_are_additive_and_levels_follow_the_curve() {
    let world = World::new();
    let actor = world.register("busy bee", false).await;
    let rewards = XpRewards::default();
    let curve = LevelCurve::default();

    for i in 0..6 {
        world
            .groups
            .create_group(&actor, draft(&format!("Circle {i}")))
            .await
            .expect("create succeeds");
    }

    let expected = rewards.amount_for(XpAction::CreateGroup) * 6;
    let xp = world.xp_of(&actor).await;
    assert_eq!(xp, expected);

    let id = actor.current_user().expect("authenticated").id;
    let user = world
        .users
        .find_by_id(&id)
        .await
        .expect("lookup succeeds")
        .expect("user exists");
    assert_eq!(user.level(), curve.level_for_xp(expected));
    assert!(user.level() > 1, "six group rewards cross the first threshold");
}

#[tokio::test]
async fn admin_overview_buckets_groups_and_counts_members() {
    let world = World::new();
    let creator = world.register("creator", false).await;
    let admin = world.register("site admin", true).await;

    let kept = world
        .groups
        .create_group(&creator, draft("Kept"))
        .await
        .expect("create succeeds");
    let refused = world
        .groups
        .create_group(&creator, draft("Refused"))
        .await
        .expect("create succeeds");
    world
        .groups
        .approve_group(&admin, &kept.id)
        .await
        .expect("approve succeeds");
    world
        .groups
        .reject_group(&admin, &refused.id)
        .await
        .expect("reject succeeds");

    let overview = world
        .reporting
        .admin_overview(&admin)
        .await
        .expect("overview succeeds");
    assert_eq!(overview.stats.total_groups, 2);
    assert_eq!(overview.stats.approved_groups, 1);
    assert_eq!(overview.stats.rejected_groups, 1);
    assert_eq!(overview.approved[0].members_count, 1);

    // Status transitions are admin-only.
    let error = world
        .groups
        .approve_group(&creator, &refused.id)
        .await
        .expect_err("not an admin");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn leaderboard_ranks_by_alltime_xp_for_both_periods() {
    let world = World::new();
    let ada = world.register("ada", false).await;
    let grace = world.register("grace", false).await;

    world
        .groups
        .create_group(&ada, draft("One"))
        .await
        .expect("create succeeds");
    world
        .groups
        .create_group(&ada, draft("Two"))
        .await
        .expect("create succeeds");
    world
        .groups
        .create_group(&grace, draft("Three"))
        .await
        .expect("create succeeds");

    // Ada carries an externally awarded badge; Grace falls back to the
    // default label.
    world.badges.seed(Badge {
        id: Uuid::new_v4(),
        user_id: ada.current_user().expect("authenticated").id,
        name: "Night Owl".to_owned(),
        icon: "owl".to_owned(),
        color: "#eab308".to_owned(),
        bg_color: "#fef9c3".to_owned(),
        earned_at: Utc::now(),
    });

    for period in [LeaderboardPeriod::Week, LeaderboardPeriod::AllTime] {
        let entries = world
            .reporting
            .leaderboard(period)
            .await
            .expect("leaderboard succeeds");
        assert_eq!(entries[0].username, "ada");
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].badge, "Night Owl");
        assert_eq!(entries[1].username, "grace");
        assert_eq!(entries[1].rank, 2);
        assert_eq!(entries[1].badge, "Rising Star");
    }

    // An anonymous reader cannot pull the dashboard.
    let error = world
        .reporting
        .dashboard(&Actor::Anonymous)
        .await
        .expect_err("anonymous");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}
