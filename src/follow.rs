use spin_sdk::http::{Request, Response};
use spin_sdk::key_value::Store;
use log::info;
use crate::core::errors::AppError;
use crate::core::helpers::{store, redirect};
use crate::auth;
use crate::users::find_user_by_username;
use crate::config::*;

/// Append a follower -> followee edge. Inserting an edge that already
/// exists is a no-op, so the ordered pair is unique by construction.
pub fn follow_user(store: &Store, follower_id: &str, followee_id: &str) -> anyhow::Result<()> {
    let key = followings_key(follower_id);
    let mut followings: Vec<String> = store.get_json(&key)?.unwrap_or_default();

    if !followings.contains(&followee_id.to_string()) {
        followings.push(followee_id.to_string());
        store.set_json(&key, &followings)?;
    }

    Ok(())
}

/// Ids of every user following `user_id`, found by scanning each user's
/// followings list.
pub fn followers_of(store: &Store, user_id: &str) -> anyhow::Result<Vec<String>> {
    let users: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    let mut followers = Vec::new();

    for id in users {
        if let Ok(Some(followings)) = store.get_json::<Vec<String>>(&followings_key(&id)) {
            if followings.contains(&user_id.to_string()) {
                followers.push(id);
            }
        }
    }

    Ok(followers)
}

/// GET /follow/<username>: add an edge from the session user to the target,
/// then bounce back to the target's profile.
pub fn handle_follow(req: &Request) -> anyhow::Result<Response> {
    let viewer_id = match auth::require_session(req) {
        Ok(uid) => uid,
        Err(resp) => return Ok(resp),
    };

    let username = req.path().trim_start_matches("/follow/");
    if username.is_empty() {
        return Ok(AppError::BadRequest("Username required".to_string()).into());
    }

    let store = store();
    let target = match find_user_by_username(&store, username)? {
        Some(user) => user,
        None => return Ok(AppError::NotFound("User not found".to_string()).into()),
    };

    if target.id == viewer_id {
        return Ok(AppError::BadRequest("You can't follow yourself".to_string()).into());
    }

    follow_user(&store, &viewer_id, &target.id)?;
    info!("{} now follows {}", viewer_id, target.id);

    Ok(redirect(&format!("/profile/{}", target.username)))
}
