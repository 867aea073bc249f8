//! In-memory port implementations and wiring for lifecycle tests.
//!
//! These doubles honour the same invariants the Diesel adapters delegate to
//! the database: pair uniqueness for memberships and RSVPs, the single
//! attendance transition, and atomic XP increments.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use studysphere::domain::gamification::{LevelCurve, XpRewards};
use studysphere::domain::ports::{
    BadgeRepository, BadgeRepositoryError, CollabRepository, CollabRepositoryError,
    GroupRepository, GroupRepositoryError, SessionRepository, SessionRepositoryError,
    UserRepository, UserRepositoryError, XpAwardOutcome,
};
use studysphere::domain::{
    Actor, Badge, CollabService, GroupMembership, GroupService, GroupStatus, ReportingService,
    SessionMessage, SessionResource, SessionRsvp, StudyGroup, StudySession, SessionService, User,
    UserDraft, UserId, Username,
};

/// Install a test subscriber so `tracing` output lands in the test log.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

fn rebuild_user(user: &User, xp: u32, level: u32) -> User {
    User::new(UserDraft {
        id: *user.id(),
        username: Username::new(user.username().as_ref()).expect("stored username is valid"),
        email: user.email().to_owned(),
        first_name: user.first_name().map(str::to_owned),
        last_name: user.last_name().map(str::to_owned),
        image: user.image().map(str::to_owned),
        xp,
        level,
        is_admin: user.is_admin(),
        created_at: user.created_at(),
    })
    .expect("stored user is valid")
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        self.users
            .lock()
            .expect("user store lock")
            .push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .users
            .lock()
            .expect("user store lock")
            .iter()
            .find(|user| user.id() == user_id)
            .cloned())
    }

    async fn award_xp(
        &self,
        user_id: &UserId,
        amount: u32,
        curve: &LevelCurve,
    ) -> Result<XpAwardOutcome, UserRepositoryError> {
        let mut users = self.users.lock().expect("user store lock");
        let user = users
            .iter_mut()
            .find(|user| user.id() == user_id)
            .ok_or_else(|| UserRepositoryError::missing(*user_id.as_uuid()))?;

        let xp = user.xp() + amount;
        let level = curve.level_for_xp(xp);
        *user = rebuild_user(user, xp, level);
        Ok(XpAwardOutcome { xp, level })
    }

    async fn list_top_by_xp(&self, limit: u32) -> Result<Vec<User>, UserRepositoryError> {
        let mut users = self.users.lock().expect("user store lock").clone();
        users.sort_by(|a, b| b.xp().cmp(&a.xp()));
        users.truncate(limit as usize);
        Ok(users)
    }
}

#[derive(Default)]
pub struct MemoryGroupRepository {
    groups: Mutex<Vec<StudyGroup>>,
    memberships: Mutex<Vec<GroupMembership>>,
}

#[async_trait]
impl GroupRepository for MemoryGroupRepository {
    async fn create_with_creator(&self, group: &StudyGroup) -> Result<(), GroupRepositoryError> {
        self.groups
            .lock()
            .expect("group store lock")
            .push(group.clone());
        self.memberships
            .lock()
            .expect("membership store lock")
            .push(GroupMembership::new(*group.creator_id(), group.id()));
        Ok(())
    }

    async fn find_by_id(
        &self,
        group_id: &Uuid,
    ) -> Result<Option<StudyGroup>, GroupRepositoryError> {
        Ok(self
            .groups
            .lock()
            .expect("group store lock")
            .iter()
            .find(|group| group.id() == *group_id)
            .cloned())
    }

    async fn list(
        &self,
        status: Option<GroupStatus>,
    ) -> Result<Vec<StudyGroup>, GroupRepositoryError> {
        Ok(self
            .groups
            .lock()
            .expect("group store lock")
            .iter()
            .filter(|group| status.is_none_or(|status| group.status() == status))
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        group_id: &Uuid,
        status: GroupStatus,
    ) -> Result<bool, GroupRepositoryError> {
        let mut groups = self.groups.lock().expect("group store lock");
        let Some(group) = groups.iter_mut().find(|group| group.id() == *group_id) else {
            return Ok(false);
        };
        *group = StudyGroup::from_parts(
            group.id(),
            group.name().to_owned(),
            group.subject().to_owned(),
            group.description().to_owned(),
            *group.creator_id(),
            status,
            group.created_at(),
            Utc::now(),
        );
        Ok(true)
    }

    async fn is_member(
        &self,
        user_id: &UserId,
        group_id: &Uuid,
    ) -> Result<bool, GroupRepositoryError> {
        Ok(self
            .memberships
            .lock()
            .expect("membership store lock")
            .iter()
            .any(|m| m.user_id == *user_id && m.group_id == *group_id))
    }

    async fn add_member(
        &self,
        membership: &GroupMembership,
    ) -> Result<(), GroupRepositoryError> {
        let mut memberships = self.memberships.lock().expect("membership store lock");
        let exists = memberships
            .iter()
            .any(|m| m.user_id == membership.user_id && m.group_id == membership.group_id);
        if exists {
            return Err(GroupRepositoryError::DuplicateMembership);
        }
        memberships.push(membership.clone());
        Ok(())
    }

    async fn remove_member(
        &self,
        user_id: &UserId,
        group_id: &Uuid,
    ) -> Result<bool, GroupRepositoryError> {
        let mut memberships = self.memberships.lock().expect("membership store lock");
        let before = memberships.len();
        memberships.retain(|m| !(m.user_id == *user_id && m.group_id == *group_id));
        Ok(memberships.len() < before)
    }

    async fn member_count(&self, group_id: &Uuid) -> Result<u64, GroupRepositoryError> {
        Ok(self
            .memberships
            .lock()
            .expect("membership store lock")
            .iter()
            .filter(|m| m.group_id == *group_id)
            .count() as u64)
    }

    async fn member_counts(
        &self,
        group_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, GroupRepositoryError> {
        let memberships = self.memberships.lock().expect("membership store lock");
        let mut counts = HashMap::new();
        for membership in memberships.iter() {
            if group_ids.contains(&membership.group_id) {
                *counts.entry(membership.group_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn member_group_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Uuid>, GroupRepositoryError> {
        Ok(self
            .memberships
            .lock()
            .expect("membership store lock")
            .iter()
            .filter(|m| m.user_id == *user_id)
            .map(|m| m.group_id)
            .collect())
    }

    async fn joined_count(&self, user_id: &UserId) -> Result<u64, GroupRepositoryError> {
        Ok(self.member_group_ids(user_id).await?.len() as u64)
    }

    async fn approved_groups_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<StudyGroup>, GroupRepositoryError> {
        let joined = self.member_group_ids(user_id).await?;
        Ok(self
            .groups
            .lock()
            .expect("group store lock")
            .iter()
            .filter(|group| joined.contains(&group.id()) && group.is_approved())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemorySessionRepository {
    sessions: Mutex<Vec<StudySession>>,
    rsvps: Mutex<Vec<SessionRsvp>>,
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn create(&self, session: &StudySession) -> Result<(), SessionRepositoryError> {
        self.sessions
            .lock()
            .expect("session store lock")
            .push(session.clone());
        Ok(())
    }

    async fn update(&self, session: &StudySession) -> Result<(), SessionRepositoryError> {
        let mut sessions = self.sessions.lock().expect("session store lock");
        if let Some(stored) = sessions.iter_mut().find(|s| s.id() == session.id()) {
            *stored = session.clone();
        }
        Ok(())
    }

    async fn delete(&self, session_id: &Uuid) -> Result<bool, SessionRepositoryError> {
        let mut sessions = self.sessions.lock().expect("session store lock");
        let before = sessions.len();
        sessions.retain(|s| s.id() != *session_id);
        Ok(sessions.len() < before)
    }

    async fn find_by_id(
        &self,
        session_id: &Uuid,
    ) -> Result<Option<StudySession>, SessionRepositoryError> {
        Ok(self
            .sessions
            .lock()
            .expect("session store lock")
            .iter()
            .find(|s| s.id() == *session_id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<StudySession>, SessionRepositoryError> {
        Ok(self.sessions.lock().expect("session store lock").clone())
    }

    async fn list_for_group(
        &self,
        group_id: &Uuid,
    ) -> Result<Vec<StudySession>, SessionRepositoryError> {
        Ok(self
            .sessions
            .lock()
            .expect("session store lock")
            .iter()
            .filter(|s| s.group_id() == Some(*group_id))
            .cloned()
            .collect())
    }

    async fn list_attending(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<StudySession>, SessionRepositoryError> {
        let attending: Vec<Uuid> = self
            .rsvps
            .lock()
            .expect("rsvp store lock")
            .iter()
            .filter(|rsvp| rsvp.user_id == *user_id)
            .map(|rsvp| rsvp.session_id)
            .collect();

        let mut sessions: Vec<StudySession> = self
            .sessions
            .lock()
            .expect("session store lock")
            .iter()
            .filter(|s| attending.contains(&s.id()))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| (s.date(), s.time()));
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn hosted_count(&self, user_id: &UserId) -> Result<u64, SessionRepositoryError> {
        Ok(self
            .sessions
            .lock()
            .expect("session store lock")
            .iter()
            .filter(|s| s.host_id() == user_id)
            .count() as u64)
    }

    async fn total_count(&self) -> Result<u64, SessionRepositoryError> {
        Ok(self.sessions.lock().expect("session store lock").len() as u64)
    }

    async fn with_attendees_count(&self) -> Result<u64, SessionRepositoryError> {
        let rsvps = self.rsvps.lock().expect("rsvp store lock");
        let mut ids: Vec<Uuid> = rsvps.iter().map(|rsvp| rsvp.session_id).collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids.len() as u64)
    }

    async fn find_rsvp(
        &self,
        user_id: &UserId,
        session_id: &Uuid,
    ) -> Result<Option<SessionRsvp>, SessionRepositoryError> {
        Ok(self
            .rsvps
            .lock()
            .expect("rsvp store lock")
            .iter()
            .find(|rsvp| rsvp.user_id == *user_id && rsvp.session_id == *session_id)
            .cloned())
    }

    async fn create_rsvp(&self, rsvp: &SessionRsvp) -> Result<(), SessionRepositoryError> {
        let mut rsvps = self.rsvps.lock().expect("rsvp store lock");
        let exists = rsvps
            .iter()
            .any(|r| r.user_id == rsvp.user_id && r.session_id == rsvp.session_id);
        if exists {
            return Err(SessionRepositoryError::DuplicateRsvp);
        }
        rsvps.push(rsvp.clone());
        Ok(())
    }

    async fn delete_rsvp(
        &self,
        user_id: &UserId,
        session_id: &Uuid,
    ) -> Result<bool, SessionRepositoryError> {
        let mut rsvps = self.rsvps.lock().expect("rsvp store lock");
        let before = rsvps.len();
        rsvps.retain(|r| !(r.user_id == *user_id && r.session_id == *session_id));
        Ok(rsvps.len() < before)
    }

    async fn mark_attended(
        &self,
        user_id: &UserId,
        session_id: &Uuid,
    ) -> Result<bool, SessionRepositoryError> {
        let mut rsvps = self.rsvps.lock().expect("rsvp store lock");
        match rsvps
            .iter_mut()
            .find(|r| r.user_id == *user_id && r.session_id == *session_id && !r.attended)
        {
            Some(rsvp) => {
                rsvp.attended = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn rsvp_count(&self, session_id: &Uuid) -> Result<u64, SessionRepositoryError> {
        Ok(self
            .rsvps
            .lock()
            .expect("rsvp store lock")
            .iter()
            .filter(|r| r.session_id == *session_id)
            .count() as u64)
    }

    async fn rsvp_counts(
        &self,
        session_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, SessionRepositoryError> {
        let rsvps = self.rsvps.lock().expect("rsvp store lock");
        let mut counts = HashMap::new();
        for rsvp in rsvps.iter() {
            if session_ids.contains(&rsvp.session_id) {
                *counts.entry(rsvp.session_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn rsvp_count_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<u64, SessionRepositoryError> {
        Ok(self
            .rsvps
            .lock()
            .expect("rsvp store lock")
            .iter()
            .filter(|r| r.user_id == *user_id)
            .count() as u64)
    }

    async fn rsvps_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SessionRsvp>, SessionRepositoryError> {
        Ok(self
            .rsvps
            .lock()
            .expect("rsvp store lock")
            .iter()
            .filter(|r| r.user_id == *user_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryCollabRepository {
    messages: Mutex<Vec<SessionMessage>>,
    resources: Mutex<Vec<SessionResource>>,
}

#[async_trait]
impl CollabRepository for MemoryCollabRepository {
    async fn list_messages(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<SessionMessage>, CollabRepositoryError> {
        Ok(self
            .messages
            .lock()
            .expect("message store lock")
            .iter()
            .filter(|m| m.session_id() == *session_id)
            .cloned()
            .collect())
    }

    async fn append_message(
        &self,
        message: &SessionMessage,
    ) -> Result<(), CollabRepositoryError> {
        self.messages
            .lock()
            .expect("message store lock")
            .push(message.clone());
        Ok(())
    }

    async fn list_resources(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<SessionResource>, CollabRepositoryError> {
        Ok(self
            .resources
            .lock()
            .expect("resource store lock")
            .iter()
            .filter(|r| r.session_id() == *session_id)
            .cloned()
            .collect())
    }

    async fn add_resource(
        &self,
        resource: &SessionResource,
    ) -> Result<(), CollabRepositoryError> {
        self.resources
            .lock()
            .expect("resource store lock")
            .push(resource.clone());
        Ok(())
    }

    async fn find_resource(
        &self,
        session_id: &Uuid,
        resource_id: &Uuid,
    ) -> Result<Option<SessionResource>, CollabRepositoryError> {
        Ok(self
            .resources
            .lock()
            .expect("resource store lock")
            .iter()
            .find(|r| r.id() == *resource_id && r.session_id() == *session_id)
            .cloned())
    }

    async fn delete_resource(&self, resource_id: &Uuid) -> Result<bool, CollabRepositoryError> {
        let mut resources = self.resources.lock().expect("resource store lock");
        let before = resources.len();
        resources.retain(|r| r.id() != *resource_id);
        Ok(resources.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryBadgeRepository {
    badges: Mutex<Vec<Badge>>,
}

impl MemoryBadgeRepository {
    pub fn seed(&self, badge: Badge) {
        self.badges.lock().expect("badge store lock").push(badge);
    }
}

#[async_trait]
impl BadgeRepository for MemoryBadgeRepository {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Badge>, BadgeRepositoryError> {
        let mut badges: Vec<Badge> = self
            .badges
            .lock()
            .expect("badge store lock")
            .iter()
            .filter(|b| b.user_id == *user_id)
            .cloned()
            .collect();
        badges.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));
        Ok(badges)
    }

    async fn latest_name_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<String>, BadgeRepositoryError> {
        Ok(self
            .list_for_user(user_id)
            .await?
            .first()
            .map(|b| b.name.clone()))
    }
}

/// Fully wired services sharing one set of in-memory stores.
pub struct World {
    pub users: Arc<MemoryUserRepository>,
    pub badges: Arc<MemoryBadgeRepository>,
    pub groups:
        GroupService<MemoryGroupRepository, MemoryUserRepository>,
    pub sessions:
        SessionService<MemorySessionRepository, MemoryGroupRepository, MemoryUserRepository>,
    pub collab: CollabService<MemoryCollabRepository, MemorySessionRepository>,
    pub reporting: ReportingService<
        MemoryUserRepository,
        MemoryGroupRepository,
        MemorySessionRepository,
        MemoryBadgeRepository,
    >,
}

impl World {
    pub fn new() -> Self {
        init_tracing();

        let users = Arc::new(MemoryUserRepository::default());
        let groups = Arc::new(MemoryGroupRepository::default());
        let sessions = Arc::new(MemorySessionRepository::default());
        let collab = Arc::new(MemoryCollabRepository::default());
        let badges = Arc::new(MemoryBadgeRepository::default());
        let rewards = XpRewards::default();
        let curve = LevelCurve::default();

        Self {
            users: Arc::clone(&users),
            badges: Arc::clone(&badges),
            groups: GroupService::new(
                Arc::clone(&groups),
                Arc::clone(&users),
                rewards.clone(),
                curve.clone(),
            ),
            sessions: SessionService::new(
                Arc::clone(&sessions),
                Arc::clone(&groups),
                Arc::clone(&users),
                rewards.clone(),
                curve.clone(),
            ),
            collab: CollabService::new(Arc::clone(&collab), Arc::clone(&sessions)),
            reporting: ReportingService::new(users, groups, sessions, badges),
        }
    }

    /// Register a user and return an actor for them.
    pub async fn register(&self, name: &str, is_admin: bool) -> Actor {
        let user = User::new(UserDraft {
            id: UserId::random(),
            username: Username::new(name).expect("valid username"),
            email: format!("{}@example.edu", name.replace(' ', "_")),
            first_name: None,
            last_name: None,
            image: None,
            xp: 0,
            level: 1,
            is_admin,
            created_at: Utc::now(),
        })
        .expect("valid user");
        self.users.create(&user).await.expect("user persists");

        if is_admin {
            Actor::admin(*user.id())
        } else {
            Actor::user(*user.id())
        }
    }

    /// Current XP of the actor's user.
    pub async fn xp_of(&self, actor: &Actor) -> u32 {
        let id = actor.current_user().expect("authenticated actor").id;
        self.users
            .find_by_id(&id)
            .await
            .expect("lookup succeeds")
            .expect("user exists")
            .xp()
    }
}
