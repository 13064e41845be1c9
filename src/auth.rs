use spin_sdk::http::{Request, Response};
use spin_sdk::key_value::Store;
use uuid::Uuid;
use log::warn;
use crate::models::models::{User, SessionData};
use crate::core::forms::{parse_form, get_text, get_flag};
use crate::core::helpers::{store, now_iso, redirect, verify_password};
use crate::users::find_user_by_username;
use crate::config::*;
use crate::templates;

/// Authenticate a login form submission.
///
/// Unknown usernames and wrong passwords get the same generic failure page,
/// so the response never reveals which of the two it was.
pub fn login_user(req: Request) -> anyhow::Result<Response> {
    let store = store();
    let fields = parse_form(req.body());
    let username = get_text(&fields, "username").unwrap_or_default();
    let password = fields.get("password").cloned().unwrap_or_default();
    let remember = get_flag(&fields, "remember");

    if let Some(user) = find_user_by_username(&store, &username)? {
        if verify_password(&password, &user.password) {
            let session_id = create_session(&store, &user.id, remember)?;
            return Ok(Response::builder()
                .status(302)
                .header("Location", "/profile")
                .header("Set-Cookie", session_cookie(&session_id))
                .build());
        }
    }

    warn!("failed login attempt for username {:?}", username);
    templates::render_login(Some("Login failed"), 401)
}

pub fn logout_user(req: Request) -> anyhow::Result<Response> {
    let store = store();

    if let Some(session_id) = session_id_from_request(&req) {
        store.delete(&session_key(&session_id))?;
    }

    Ok(Response::builder()
        .status(302)
        .header("Location", "/")
        .header("Set-Cookie", clear_session_cookie())
        .build())
}

pub fn create_session(store: &Store, user_id: &str, remember: bool) -> anyhow::Result<String> {
    let session_id = Uuid::new_v4().to_string();
    let data = SessionData {
        user_id: user_id.to_string(),
        created_at: now_iso(),
        remember,
    };
    store.set_json(&session_key(&session_id), &data)?;
    Ok(session_id)
}

pub fn session_cookie(session_id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, session_id)
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
}

/// Resolve the session cookie to a user id, or None for missing, expired and
/// orphaned sessions.
pub fn validate_session(req: &Request) -> Option<String> {
    let store = store();
    let session_id = session_id_from_request(req)?;
    let data = store
        .get_json::<SessionData>(&session_key(&session_id))
        .ok()??;

    if let Ok(created) = chrono::DateTime::parse_from_rfc3339(&data.created_at) {
        let age = chrono::Utc::now() - created.with_timezone(&chrono::Utc);
        let limit = if data.remember {
            chrono::Duration::days(remember_expiration_days())
        } else {
            chrono::Duration::hours(session_expiration_hours())
        };
        if age > limit {
            return None;
        }
    }

    // Check the user still exists
    if store.get_json::<User>(&user_key(&data.user_id)).ok()?.is_none() {
        return None;
    }

    Some(data.user_id)
}

/// Short-hand for protected handlers: the user id, or a redirect to the
/// login page.
pub fn require_session(req: &Request) -> Result<String, Response> {
    validate_session(req).ok_or_else(|| redirect("/"))
}

fn session_id_from_request(req: &Request) -> Option<String> {
    let header = req.header("cookie")?.as_str()?;
    header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}
