use spin_sdk::{
    http::{Request, Response, IntoResponse},
    http_component,
};
use crate::core::errors::AppError;

pub mod auth;
pub mod config;
pub mod core;
pub mod feed;
pub mod follow;
pub mod models;
pub mod posts;
pub mod static_server;
pub mod templates;
pub mod users;

/// Dispatch one request. Shared by the wasm component and the native
/// adapter binary, so routing lives in exactly one place.
pub fn route(req: Request) -> anyhow::Result<Response> {
    if config::seed_demo() {
        let _ = crate::core::db::init_demo_data(&crate::core::helpers::store());
    }

    let method = req.method().to_string();
    let path = req.path().to_string();

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => templates::render_login(None, 200),
        ("POST", "/login") => auth::login_user(req),
        ("GET", "/logout") => auth::logout_user(req),
        ("GET", "/register") => templates::render_register(&[], 200),
        ("POST", "/register") => users::register_user(req),
        ("POST", "/post_tweet") => posts::post_tweet(req),
        ("GET", "/profile") => feed::handle_profile(&req, None),
        ("GET", p) if p.starts_with("/profile/") => {
            feed::handle_profile(&req, Some(p.trim_start_matches("/profile/")))
        }
        ("GET", "/timeline") => feed::handle_timeline(&req, None),
        ("GET", p) if p.starts_with("/timeline/") => {
            feed::handle_timeline(&req, Some(p.trim_start_matches("/timeline/")))
        }
        ("GET", p) if p.starts_with("/follow/") => follow::handle_follow(&req),
        ("GET", p) if p.starts_with("/images/") => users::serve_image(p),
        ("GET", p) => static_server::serve_static(p),
        _ => Ok(AppError::NotFound("No route found".to_string()).into()),
    }
}

#[http_component]
fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
    route(req)
}
