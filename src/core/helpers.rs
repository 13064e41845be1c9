use spin_sdk::http::Response;
use spin_sdk::key_value::Store;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use argon2::password_hash::SaltString;
use rand::rngs::OsRng;
use ammonia::Builder;

pub fn store() -> Store {
    Store::open_default().expect("KV store must exist")
}

pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn redirect(location: &str) -> Response {
    Response::builder()
        .status(302)
        .header("Location", location)
        .build()
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::PasswordHash;

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Strips all HTML from user-supplied text, leaving plain text only.
pub fn sanitize_text(text: &str) -> String {
    Builder::default()
        .tags(std::collections::HashSet::new())
        .clean(text)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("pw1").unwrap();
        assert_ne!(hash, "pw1");
        assert!(verify_password("pw1", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("pw1", "not-a-phc-string"));
    }

    #[test]
    fn sanitize_strips_markup() {
        assert_eq!(sanitize_text("<script>x</script>hi"), "hi");
        assert_eq!(sanitize_text("<b>bold</b> name"), "bold name");
    }
}
