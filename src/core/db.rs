use spin_sdk::key_value::Store;
use log::info;
use uuid::Uuid;
use crate::models::models::{User, Post};
use crate::core::helpers::{hash_password, now_iso};
use crate::config::*;

struct DemoUser {
    name: &'static str,
    username: &'static str,
    posts: &'static [&'static str],
}

const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        name: "Demo Account",
        username: "demo",
        posts: &["Kicking the tires on engage."],
    },
    DemoUser {
        name: "Maya Reed",
        username: "maya",
        posts: &[
            "First day here, hello everyone!",
            "Shipped a little side project tonight.",
        ],
    },
    DemoUser {
        name: "Tom Okafor",
        username: "tom",
        posts: &["Coffee first, timeline second."],
    },
];

/// Seed a handful of demo users, posts and one follow edge so a fresh store
/// has something to look at. Safe to call on every request: users that
/// already exist are left alone.
pub fn init_demo_data(store: &Store) -> anyhow::Result<()> {
    let mut users: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();

    let mut ids_by_username = std::collections::HashMap::new();
    for id in &users {
        if let Some(u) = store.get_json::<User>(&user_key(id))? {
            ids_by_username.insert(u.username, id.clone());
        }
    }
    if DEMO_USERS.iter().all(|d| ids_by_username.contains_key(d.username)) {
        return Ok(());
    }

    let mut created = 0;
    for demo in DEMO_USERS {
        if ids_by_username.contains_key(demo.username) {
            continue;
        }

        let user_id = Uuid::new_v4().to_string();
        let user = User {
            id: user_id.clone(),
            name: demo.name.to_string(),
            username: demo.username.to_string(),
            // Demo passwords match the username
            password: hash_password(demo.username)?,
            image: None,
            joined_at: now_iso(),
        };
        store.set_json(&user_key(&user_id), &user)?;
        users.push(user_id.clone());

        let mut post_ids = Vec::new();
        for text in demo.posts {
            let post_id = Uuid::new_v4().to_string();
            let post = Post {
                id: post_id.clone(),
                user_id: user_id.clone(),
                text: text.to_string(),
                created_at: now_iso(),
            };
            store.set_json(&post_key(&post_id), &post)?;
            post_ids.push(post_id);
        }
        store.set_json(&posts_key(&user_id), &post_ids)?;

        ids_by_username.insert(demo.username.to_string(), user_id);
        created += 1;
    }

    store.set_json(USERS_LIST_KEY, &users)?;

    // demo follows tom
    if let (Some(demo_id), Some(tom_id)) =
        (ids_by_username.get("demo"), ids_by_username.get("tom"))
    {
        let mut followings: Vec<String> =
            store.get_json(&followings_key(demo_id))?.unwrap_or_default();
        if !followings.contains(tom_id) {
            followings.push(tom_id.clone());
            store.set_json(&followings_key(demo_id), &followings)?;
        }
    }

    info!("seeded {} demo users", created);

    Ok(())
}
