#[cfg(not(target_arch = "wasm32"))]
mod native {
    use actix_web::{web, App, HttpServer, HttpRequest, HttpResponse};
    use log::{error, info};

    mod adapter {
        use actix_web::HttpRequest;
        use spin_sdk::http::{Request, Response, Method};

        pub fn actix_to_spin_request(
            req: &HttpRequest,
            body: actix_web::web::Bytes,
        ) -> anyhow::Result<Request> {
            let method = match req.method().as_str() {
                "GET" => Method::Get,
                "POST" => Method::Post,
                "PUT" => Method::Put,
                "DELETE" => Method::Delete,
                "HEAD" => Method::Head,
                "OPTIONS" => Method::Options,
                "PATCH" => Method::Patch,
                _ => Method::Get,
            };

            let uri = req.uri().to_string();
            let body_vec = body.to_vec();

            let mut req_builder = Request::builder();
            let method_set = req_builder.method(method);
            let uri_set = method_set.uri(&uri);

            // Copy headers
            let mut with_headers = uri_set;
            for (name, value) in req.headers() {
                if let Ok(val_str) = value.to_str() {
                    with_headers = with_headers.header(name.as_str(), val_str);
                }
            }

            Ok(with_headers.body(body_vec).build())
        }

        pub fn spin_to_actix_response(spin_resp: Response) -> actix_web::HttpResponse {
            let status = *spin_resp.status();
            let body = spin_resp.body().to_vec();

            let mut response = actix_web::HttpResponse::build(
                actix_web::http::StatusCode::from_u16(status)
                    .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
            );

            // Browsers need these to follow redirects and keep the session
            for name in ["content-type", "location", "set-cookie"] {
                if let Some(value) = spin_resp.header(name).and_then(|h| h.as_str()) {
                    response.insert_header((name, value));
                }
            }

            response.body(body)
        }
    }

    pub async fn run() -> std::io::Result<()> {
        env_logger::init();

        let addr = engage::config::listen_addr();
        info!("engage listening on http://{}", addr);

        HttpServer::new(|| {
            App::new()
                .default_service(web::route().to(handle_all))
        })
        .bind(addr)?
        .run()
        .await
    }

    async fn handle_all(req: HttpRequest, body: web::Bytes) -> HttpResponse {
        let spin_req = match adapter::actix_to_spin_request(&req, body) {
            Ok(r) => r,
            Err(_) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({"error": "Invalid request"}))
            }
        };

        match engage::route(spin_req) {
            Ok(spin_resp) => adapter::spin_to_actix_response(spin_resp),
            Err(err) => {
                error!("handler error: {:#}", err);
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({"error": "Internal server error"}))
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
