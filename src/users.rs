use spin_sdk::http::{Request, Response};
use spin_sdk::key_value::Store;
use uuid::Uuid;
use regex::Regex;
use std::sync::OnceLock;
use log::info;
use crate::models::models::User;
use crate::core::errors::AppError;
use crate::core::helpers::{store, now_iso, hash_password, sanitize_text};
use crate::core::multipart::{boundary_from_content_type, parse_multipart, MultipartForm, UploadedFile};
use crate::auth;
use crate::config::*;
use crate::templates;

fn username_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_]+$").expect("Regex should compile")
    })
}

pub fn valid_username(username: &str) -> bool {
    username_regex().is_match(username)
}

pub fn find_user_by_username(store: &Store, username: &str) -> anyhow::Result<Option<User>> {
    let users: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    for id in users {
        if let Some(u) = store.get_json::<User>(&user_key(&id))? {
            if u.username == username {
                return Ok(Some(u));
            }
        }
    }
    Ok(None)
}

/// Handle a registration form submission (multipart, because of the image).
///
/// Validation failures re-render the form with the collected field errors;
/// success creates the user, stores the image, logs the new user in and
/// redirects to their profile.
pub fn register_user(req: Request) -> anyhow::Result<Response> {
    let store = store();

    let content_type = req
        .header("content-type")
        .and_then(|h| h.as_str())
        .unwrap_or_default();
    let Some(boundary) = boundary_from_content_type(content_type) else {
        return Ok(AppError::BadRequest("Expected a multipart form".to_string()).into());
    };
    let form = parse_multipart(&boundary, req.body());

    let mut errors = Vec::new();

    let name = sanitize_text(text_field(&form, "name").trim());
    if name.is_empty() {
        errors.push("A full name is required".to_string());
    } else if name.len() > MAX_NAME_LENGTH {
        errors.push("Your name can't be more than 100 characters".to_string());
    }

    let username = text_field(&form, "username").trim().to_string();
    if username.is_empty() {
        errors.push("A username is required".to_string());
    } else if username.len() > MAX_USERNAME_LENGTH {
        errors.push("Your username can't be more than 30 characters".to_string());
    } else if !valid_username(&username) {
        errors.push("Usernames may only contain letters, digits and underscores".to_string());
    }

    let password = text_field(&form, "password");
    if password.is_empty() {
        errors.push("A password is required".to_string());
    } else if password.len() < MIN_PASSWORD_LENGTH {
        errors.push("Your password must be at least 3 characters".to_string());
    }

    let image = form.files.get("image").filter(|f| !f.data.is_empty());
    if let Some(file) = image {
        if !is_image_upload(file) {
            errors.push("Only images are accepted".to_string());
        } else if file.data.len() > MAX_IMAGE_BYTES {
            errors.push("The image can't be larger than 2 MiB".to_string());
        }
    }

    if !errors.is_empty() {
        return templates::render_register(&errors, 400);
    }

    // Usernames are unique; a second registration with the same name fails
    if find_user_by_username(&store, &username)?.is_some() {
        return templates::render_register(&["Username exists".to_string()], 409);
    }

    let id = Uuid::new_v4().to_string();

    let image_path = match image {
        Some(file) => Some(store_image(&store, &id, file)?),
        None => None,
    };

    let user = User {
        id: id.clone(),
        name,
        username,
        password: hash_password(&password)?,
        image: image_path,
        joined_at: now_iso(),
    };
    store.set_json(&user_key(&id), &user)?;

    let mut users: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    users.push(id.clone());
    store.set_json(USERS_LIST_KEY, &users)?;

    info!("registered user {}", user.username);

    // Log the new user straight in
    let session_id = auth::create_session(&store, &id, false)?;
    Ok(Response::builder()
        .status(302)
        .header("Location", "/profile")
        .header("Set-Cookie", auth::session_cookie(&session_id))
        .build())
}

pub fn serve_image(path: &str) -> anyhow::Result<Response> {
    let filename = path.trim_start_matches("/images/");
    if filename.is_empty() || filename.contains('/') {
        return Ok(AppError::BadRequest("Image name required".to_string()).into());
    }

    let store = store();
    match store.get(&image_key(filename))? {
        Some(bytes) => {
            let mime = mime_guess::from_path(filename).first_or_octet_stream();
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", mime.as_ref())
                .body(bytes)
                .build())
        }
        None => Ok(AppError::NotFound("Image not found".to_string()).into()),
    }
}

fn text_field(form: &MultipartForm, key: &str) -> String {
    form.fields.get(key).cloned().unwrap_or_default()
}

fn is_image_upload(file: &UploadedFile) -> bool {
    mime_guess::from_path(&file.filename)
        .first()
        .map(|m| m.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false)
}

fn store_image(store: &Store, user_id: &str, file: &UploadedFile) -> anyhow::Result<String> {
    let extension = std::path::Path::new(&file.filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_ascii_lowercase();
    let filename = format!("{}.{}", user_id, extension);
    store.set(&image_key(&filename), &file.data)?;
    Ok(format!("/images/{}", filename))
}
