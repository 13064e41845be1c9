//! Flow tests against a running server (`cargo run`, then
//! `cargo test -- --ignored`).

use reqwest::multipart;
use reqwest::redirect::Policy;
use std::sync::Mutex;

const BASE_URL: &str = "http://127.0.0.1:3000";
static TEST_LOCK: Mutex<()> = Mutex::new(());

fn lock_test() -> std::sync::MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap()
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

fn register_form(name: &str, username: &str, password: &str) -> multipart::Form {
    multipart::Form::new()
        .text("name", name.to_string())
        .text("username", username.to_string())
        .text("password", password.to_string())
}

async fn register(client: &reqwest::Client, username: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}/register", BASE_URL))
        .multipart(register_form("Flow Test", username, password))
        .send()
        .await
        .expect("Failed to register")
}

async fn login(client: &reqwest::Client, username: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}/login", BASE_URL))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .expect("Failed to login")
}

#[ignore]
#[tokio::test]
async fn test_register_login_post_timeline_flow() {
    let _lock = lock_test();
    let client = client();

    // 1. Register
    let username = format!("flow_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let resp = register(&client, &username, "pw1").await;
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["location"], "/profile");

    // Registration logged us in; drop the session again
    let resp = client
        .get(format!("{}/logout", BASE_URL))
        .send()
        .await
        .expect("Failed to logout");
    assert_eq!(resp.status(), 302);

    // 2. Wrong password fails with the generic message, indistinguishable
    // from an unknown username
    let resp = login(&client, &username, "wrong").await;
    assert_eq!(resp.status(), 401);
    let wrong_password_body = resp.text().await.unwrap();
    assert!(
        wrong_password_body.contains("Login failed"),
        "Missing generic failure: {}",
        wrong_password_body
    );

    let resp = login(&client, "no_such_user_anywhere", "wrong").await;
    assert_eq!(resp.status(), 401);
    let unknown_user_body = resp.text().await.unwrap();
    assert_eq!(wrong_password_body, unknown_user_body);

    // 3. Correct login establishes a session
    let resp = login(&client, &username, "pw1").await;
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["location"], "/profile");

    // 4. Post a tweet
    let resp = client
        .post(format!("{}/post_tweet", BASE_URL))
        .form(&[("text", "hello")])
        .send()
        .await
        .expect("Failed to post");
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["location"], "/timeline");

    // 5. The public timeline shows the post
    let resp = client
        .get(format!("{}/timeline/{}", BASE_URL, username))
        .send()
        .await
        .expect("Failed to fetch timeline");
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("hello"), "Timeline missing post: {}", body);
}

#[ignore]
#[tokio::test]
async fn test_duplicate_username_rejected() {
    let _lock = lock_test();
    let client = client();

    let username = format!("dup_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    let resp = register(&client, &username, "pw1").await;
    assert_eq!(resp.status(), 302);

    let resp = register(&client, &username, "pw2").await;
    assert_eq!(resp.status(), 409);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Username exists"), "Missing error: {}", body);
}

#[ignore]
#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let _lock = lock_test();
    let client = client();

    let username = format!("ghost_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    for path in ["profile", "timeline"] {
        let resp = client
            .get(format!("{}/{}/{}", BASE_URL, path, username))
            .send()
            .await
            .expect("Failed to make request");
        assert_eq!(resp.status(), 404, "{} should be a 404", path);
    }

    // /follow needs a session to get past the login redirect
    let me = format!("seeker_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let resp = register(&client, &me, "pw1").await;
    assert_eq!(resp.status(), 302);

    let resp = client
        .get(format!("{}/follow/{}", BASE_URL, username))
        .send()
        .await
        .expect("Failed to make request");
    assert_eq!(resp.status(), 404);
}

#[ignore]
#[tokio::test]
async fn test_protected_routes_redirect_to_login() {
    let _lock = lock_test();
    let client = client();

    for path in ["/profile", "/timeline"] {
        let resp = client
            .get(format!("{}{}", BASE_URL, path))
            .send()
            .await
            .expect("Failed to make request");
        assert_eq!(resp.status(), 302, "{} should redirect", path);
        assert_eq!(resp.headers()["location"], "/");
    }

    let resp = client
        .post(format!("{}/post_tweet", BASE_URL))
        .form(&[("text", "anonymous")])
        .send()
        .await
        .expect("Failed to make request");
    assert_eq!(resp.status(), 302);
}

#[ignore]
#[tokio::test]
async fn test_follow_changes_visibility_flag() {
    let _lock = lock_test();
    let client_a = client();
    let client_b = client();

    let user_a = format!("fa_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let user_b = format!("fb_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    assert_eq!(register(&client_a, &user_a, "pw1").await.status(), 302);
    assert_eq!(register(&client_b, &user_b, "pw1").await.status(), 302);

    // A sees a follow link on B's profile
    let body = client_a
        .get(format!("{}/profile/{}", BASE_URL, user_b))
        .send()
        .await
        .expect("Failed to fetch profile")
        .text()
        .await
        .unwrap();
    assert!(body.contains(&format!("/follow/{}", user_b)), "Missing follow link: {}", body);

    // A never sees one on their own profile
    let body = client_a
        .get(format!("{}/profile/{}", BASE_URL, user_a))
        .send()
        .await
        .expect("Failed to fetch profile")
        .text()
        .await
        .unwrap();
    assert!(!body.contains(&format!("/follow/{}", user_a)), "Self-follow offered: {}", body);

    // Follow, then the link is gone
    let resp = client_a
        .get(format!("{}/follow/{}", BASE_URL, user_b))
        .send()
        .await
        .expect("Failed to follow");
    assert_eq!(resp.status(), 302);

    let body = client_a
        .get(format!("{}/profile/{}", BASE_URL, user_b))
        .send()
        .await
        .expect("Failed to fetch profile")
        .text()
        .await
        .unwrap();
    assert!(!body.contains(&format!("/follow/{}", user_b)), "Still offering follow: {}", body);
    assert!(body.contains("1 followers"), "Follower count missing: {}", body);
}

#[ignore]
#[tokio::test]
async fn test_register_with_image_upload() {
    let _lock = lock_test();
    let client = client();

    let username = format!("img_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let pixel: &[u8] = &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

    let form = register_form("Image Test", &username, "pw1").part(
        "image",
        multipart::Part::bytes(pixel.to_vec())
            .file_name("me.png")
            .mime_str("image/png")
            .unwrap(),
    );

    let resp = client
        .post(format!("{}/register", BASE_URL))
        .multipart(form)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), 302);

    // The profile references the image, and the image is served back
    let body = client
        .get(format!("{}/profile/{}", BASE_URL, username))
        .send()
        .await
        .expect("Failed to fetch profile")
        .text()
        .await
        .unwrap();
    let src = body
        .split("src=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("Profile has no image tag");
    assert!(src.starts_with("/images/"), "Unexpected image path: {}", src);

    let resp = client
        .get(format!("{}{}", BASE_URL, src))
        .send()
        .await
        .expect("Failed to fetch image");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "image/png");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), pixel);
}
