use spin_sdk::http::Response;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized,
    Forbidden,
    NotFound(String),
    Conflict(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

fn error_page(status: u16, title: &str, detail: &str) -> Response {
    let body = format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title>\
<link rel=\"stylesheet\" href=\"/style.css\"></head>\n<body>\n<div class=\"page\">\
<h1>{title}</h1>\n<p>{}</p>\n<p><a href=\"/\">Back to login</a></p>\n</div>\n</body>\n</html>\n",
        html_escape::encode_text(detail),
    );
    Response::builder()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(body.into_bytes())
        .build()
}

impl From<AppError> for Response {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => error_page(400, "Bad request", &msg),
            AppError::Unauthorized => error_page(401, "Unauthorized", "You need to log in first."),
            AppError::Forbidden => error_page(403, "Forbidden", "You are not allowed to do that."),
            AppError::NotFound(msg) => error_page(404, "Not found", &msg),
            AppError::Conflict(msg) => error_page(409, "Conflict", &msg),
            AppError::InternalError(msg) => error_page(500, "Something went wrong", &msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}
