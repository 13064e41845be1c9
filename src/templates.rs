use spin_sdk::http::Response;
use rust_embed::RustEmbed;
use html_escape::{encode_text, encode_double_quoted_attribute};
use crate::feed::{ProfileView, TimelineView};
use crate::config::*;

#[derive(RustEmbed)]
#[folder = "templates"]
struct Templates;

const TEXT_HTML: &str = "text/html; charset=utf-8";

fn load(name: &str) -> anyhow::Result<String> {
    let template = Templates::get(name)
        .ok_or_else(|| anyhow::anyhow!("Template {} not found", name))?;
    Ok(String::from_utf8(template.data.to_vec())?)
}

fn html_response(status: u16, html: String) -> Response {
    Response::builder()
        .status(status)
        .header("Content-Type", TEXT_HTML)
        .body(html.into_bytes())
        .build()
}

pub fn render_login(notice: Option<&str>, status: u16) -> anyhow::Result<Response> {
    let mut html = load("index.html")?;

    let notice_html = notice
        .map(|n| format!(r#"<p class="notice">{}</p>"#, encode_text(n)))
        .unwrap_or_default();
    html = html.replace("LOGIN_NOTICE", &notice_html);

    Ok(html_response(status, html))
}

pub fn render_register(errors: &[String], status: u16) -> anyhow::Result<Response> {
    let mut html = load("register.html")?;

    let errors_html = if errors.is_empty() {
        String::new()
    } else {
        let items: String = errors
            .iter()
            .map(|e| format!("<li>{}</li>", encode_text(e)))
            .collect();
        format!(r#"<ul class="errors">{}</ul>"#, items)
    };
    html = html.replace("REGISTER_ERRORS", &errors_html);

    Ok(html_response(status, html))
}

pub fn render_profile(view: &ProfileView) -> anyhow::Result<Response> {
    let mut html = load("profile.html")?;
    let user = &view.user;

    html = html.replace("PROFILE_NAME", &encode_text(&user.name));
    html = html.replace("PROFILE_USERNAME", &encode_text(&user.username));
    html = html.replace("PROFILE_JOINED", &joined_date(&user.joined_at));
    html = html.replace("PROFILE_FOLLOWERS", &view.follower_count.to_string());

    let image_html = match &user.image {
        Some(src) => format!(
            r#"<img class="avatar" src="{}" alt="">"#,
            encode_double_quoted_attribute(src)
        ),
        None => r#"<div class="avatar avatar-blank"></div>"#.to_string(),
    };
    html = html.replace("PROFILE_IMAGE", &image_html);

    let follow_html = if view.may_follow {
        format!(
            r#"<a class="button" href="/follow/{}">Follow</a>"#,
            encode_double_quoted_attribute(&user.username)
        )
    } else if view.is_self {
        r#"<span class="muted">This is you</span>"#.to_string()
    } else if view.following {
        r#"<span class="muted">Following</span>"#.to_string()
    } else {
        String::new()
    };
    html = html.replace("FOLLOW_SECTION", &follow_html);

    html = html.replace("TIMELINE_LINK", &format!("/timeline/{}", user.username));

    Ok(html_response(200, html))
}

pub fn render_timeline(view: &TimelineView) -> anyhow::Result<Response> {
    let mut html = load("timeline.html")?;

    html = html.replace("TIMELINE_USERNAME", &encode_text(&view.user.username));

    let form_html = if view.is_self {
        format!(
            r#"<form class="card" action="/post_tweet" method="post">
<textarea name="text" maxlength="{}" placeholder="What's happening?" required></textarea>
<button type="submit">Post</button>
</form>"#,
            MAX_TWEET_LENGTH
        )
    } else {
        String::new()
    };
    html = html.replace("TWEET_FORM", &form_html);

    let posts_html = if view.posts.is_empty() {
        r#"<p class="muted">No posts yet.</p>"#.to_string()
    } else {
        view.posts
            .iter()
            .map(|post| {
                format!(
                    r#"<div class="tweet"><span class="tweet-author">@{}</span> <span class="tweet-age">{}</span><p>{}</p></div>"#,
                    encode_text(&view.user.username),
                    time_since(&post.created_at),
                    encode_text(&post.text),
                )
            })
            .collect()
    };
    html = html.replace("TIMELINE_POSTS", &posts_html);

    Ok(html_response(200, html))
}

/// Relative age of a timestamp: "3d", "2h", "14m" or "Just now".
pub fn time_since(created_at: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(created_at) {
        Ok(created) => {
            let delta = chrono::Utc::now() - created.with_timezone(&chrono::Utc);
            format_delta(delta.num_seconds())
        }
        Err(_) => "Just now".to_string(),
    }
}

fn format_delta(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86400;
    let hours = seconds / 3600;
    let minutes = seconds / 60;

    if days > 0 {
        format!("{}d", days)
    } else if hours > 0 {
        format!("{}h", hours)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        "Just now".to_string()
    }
}

fn joined_date(joined_at: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(joined_at)
        .map(|t| t.format("%d %b %Y").to_string())
        .unwrap_or_else(|_| joined_at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_buckets() {
        assert_eq!(format_delta(0), "Just now");
        assert_eq!(format_delta(59), "Just now");
        assert_eq!(format_delta(60), "1m");
        assert_eq!(format_delta(59 * 60), "59m");
        assert_eq!(format_delta(3600), "1h");
        assert_eq!(format_delta(25 * 3600), "1d");
        assert_eq!(format_delta(3 * 86400 + 120), "3d");
    }

    #[test]
    fn negative_delta_is_just_now() {
        assert_eq!(format_delta(-30), "Just now");
    }

    #[test]
    fn joined_date_formats_rfc3339() {
        assert_eq!(joined_date("2024-05-01T10:00:00+00:00"), "01 May 2024");
    }
}
