pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_USERNAME_LENGTH: usize = 30;
pub const MIN_PASSWORD_LENGTH: usize = 3;
pub const MAX_TWEET_LENGTH: usize = 140;
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

pub const USERS_LIST_KEY: &str = "users_list";
pub const SESSION_COOKIE: &str = "session";

pub fn user_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}

pub fn post_key(post_id: &str) -> String {
    format!("post:{}", post_id)
}

pub fn posts_key(user_id: &str) -> String {
    format!("posts:{}", user_id)
}

pub fn followings_key(user_id: &str) -> String {
    format!("followings:{}", user_id)
}

pub fn session_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

pub fn image_key(filename: &str) -> String {
    format!("image:{}", filename)
}

pub fn session_expiration_hours() -> i64 {
    std::env::var("ENGAGE_SESSION_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(24)
}

pub fn remember_expiration_days() -> i64 {
    std::env::var("ENGAGE_REMEMBER_EXPIRATION_DAYS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(30)
}

pub fn listen_addr() -> String {
    std::env::var("ENGAGE_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

pub fn seed_demo() -> bool {
    std::env::var("ENGAGE_SEED_DEMO")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}
