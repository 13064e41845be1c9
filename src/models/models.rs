use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password: String,
    /// Serving path of the uploaded profile image, e.g. "/images/<id>.png".
    pub image: Option<String>,
    pub joined_at: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: String,
    pub created_at: String,
    #[serde(default)]
    pub remember: bool,
}
