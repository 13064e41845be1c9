use spin_sdk::http::{Request, Response};
use spin_sdk::key_value::Store;
use uuid::Uuid;
use log::info;
use crate::models::models::Post;
use crate::core::errors::AppError;
use crate::core::forms::{parse_form, get_text};
use crate::core::helpers::{store, now_iso, redirect, sanitize_text};
use crate::auth;
use crate::config::*;

/// Handle a tweet form submission for the session user.
///
/// Posts are immutable once created; there is no edit or delete path.
pub fn post_tweet(req: Request) -> anyhow::Result<Response> {
    let user_id = match auth::require_session(&req) {
        Ok(uid) => uid,
        Err(resp) => return Ok(resp),
    };

    let store = store();
    let fields = parse_form(req.body());

    let Some(text) = get_text(&fields, "text") else {
        return Ok(AppError::BadRequest("Message is required".to_string()).into());
    };
    if text.len() > MAX_TWEET_LENGTH {
        return Ok(AppError::BadRequest("Message can't be more than 140 characters".to_string()).into());
    }

    create_post(&store, &user_id, &sanitize_text(&text))?;
    info!("new post by {}", user_id);

    Ok(redirect("/timeline"))
}

pub fn create_post(store: &Store, user_id: &str, text: &str) -> anyhow::Result<Post> {
    let id = Uuid::new_v4().to_string();
    let post = Post {
        id: id.clone(),
        user_id: user_id.to_string(),
        text: text.to_string(),
        created_at: now_iso(),
    };
    store.set_json(&post_key(&id), &post)?;

    // Append to the owner's post list, oldest first
    let mut post_ids: Vec<String> = store.get_json(&posts_key(user_id))?.unwrap_or_default();
    post_ids.push(id);
    store.set_json(&posts_key(user_id), &post_ids)?;

    Ok(post)
}

/// All posts owned by a user, in insertion order.
pub fn posts_of(store: &Store, user_id: &str) -> anyhow::Result<Vec<Post>> {
    let post_ids: Vec<String> = store.get_json(&posts_key(user_id))?.unwrap_or_default();

    let mut posts = Vec::with_capacity(post_ids.len());
    for id in post_ids {
        if let Some(p) = store.get_json::<Post>(&post_key(&id))? {
            posts.push(p);
        }
    }

    Ok(posts)
}
