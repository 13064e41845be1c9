use spin_sdk::http::{Request, Response};
use spin_sdk::key_value::Store;
use crate::models::models::{User, Post};
use crate::core::errors::AppError;
use crate::core::helpers::{store, redirect};
use crate::auth;
use crate::follow::followers_of;
use crate::posts::posts_of;
use crate::users::find_user_by_username;
use crate::config::*;
use crate::templates;

/// Everything a profile page needs: the user, their follower count and the
/// visibility flags computed against the viewer.
pub struct ProfileView {
    pub user: User,
    pub follower_count: usize,
    pub may_follow: bool,
    pub following: bool,
    pub is_self: bool,
}

pub struct TimelineView {
    pub user: User,
    pub posts: Vec<Post>,
    pub is_self: bool,
}

/// GET /profile and /profile/<username>.
pub fn handle_profile(req: &Request, username: Option<&str>) -> anyhow::Result<Response> {
    let viewer = auth::validate_session(req);
    if username.is_none() && viewer.is_none() {
        return Ok(redirect("/"));
    }

    let store = store();
    match assemble_profile(&store, viewer.as_deref(), username)? {
        Some(view) => templates::render_profile(&view),
        None => Ok(AppError::NotFound("User not found".to_string()).into()),
    }
}

/// GET /timeline and /timeline/<username>.
pub fn handle_timeline(req: &Request, username: Option<&str>) -> anyhow::Result<Response> {
    let viewer = auth::validate_session(req);
    if username.is_none() && viewer.is_none() {
        return Ok(redirect("/"));
    }

    let store = store();
    match assemble_timeline(&store, viewer.as_deref(), username)? {
        Some(view) => templates::render_timeline(&view),
        None => Ok(AppError::NotFound("User not found".to_string()).into()),
    }
}

/// Resolve the profile target and compute the follow visibility flags.
/// Returns None when the requested username does not exist.
pub fn assemble_profile(
    store: &Store,
    viewer: Option<&str>,
    username: Option<&str>,
) -> anyhow::Result<Option<ProfileView>> {
    let Some(user) = resolve_target(store, viewer, username)? else {
        return Ok(None);
    };

    let followers = followers_of(store, &user.id)?;
    let is_self = viewer == Some(user.id.as_str());
    let following = viewer.is_some_and(|v| followers.iter().any(|f| f == v));

    Ok(Some(ProfileView {
        follower_count: followers.len(),
        may_follow: may_follow(viewer, &user.id, &followers),
        following,
        is_self,
        user,
    }))
}

/// Resolve the timeline target and collect their posts, newest first.
/// A user with no posts gets an empty timeline, not an error.
pub fn assemble_timeline(
    store: &Store,
    viewer: Option<&str>,
    username: Option<&str>,
) -> anyhow::Result<Option<TimelineView>> {
    let Some(user) = resolve_target(store, viewer, username)? else {
        return Ok(None);
    };

    let posts = newest_first(posts_of(store, &user.id)?);
    let is_self = viewer == Some(user.id.as_str());

    Ok(Some(TimelineView { posts, is_self, user }))
}

/// An explicit username names the target; without one the viewer is the
/// target.
fn resolve_target(
    store: &Store,
    viewer: Option<&str>,
    username: Option<&str>,
) -> anyhow::Result<Option<User>> {
    match username {
        Some(name) => find_user_by_username(store, name),
        None => match viewer {
            Some(id) => Ok(store.get_json::<User>(&user_key(id))?),
            None => Ok(None),
        },
    }
}

/// True iff there is a viewer, the viewer is not the target, and the viewer
/// does not already follow the target.
pub fn may_follow(viewer: Option<&str>, target_id: &str, followers: &[String]) -> bool {
    match viewer {
        Some(viewer_id) => {
            viewer_id != target_id && !followers.iter().any(|f| f == viewer_id)
        }
        None => false,
    }
}

/// Sort posts by creation time descending. The sort is stable, so posts with
/// equal timestamps keep their insertion order.
pub fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| parse_timestamp(&b.created_at).cmp(&parse_timestamp(&a.created_at)));
    posts
}

fn parse_timestamp(raw: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&chrono::Utc))
        .unwrap_or(chrono::DateTime::UNIX_EPOCH)
}
