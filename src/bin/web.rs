//! Single binary web server: leaderboard HTML on any path, results saved via POST to `<path>/results`.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST, PORT, DATA_FILE, SCAN_PAGE_LIMIT, LEADERBOARD_TITLE, STATIC_DIR.

use actix_files::Files;
use actix_web::{
    get,
    http::{header::HeaderMap, Method},
    web::{self, Bytes, Data},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use poker_leaderboard::{
    parse_batch, render::{render_leaderboard, LOAD_ERROR_PAGE}, FileStore, Leaderboard,
    LeaderboardError,
};
use serde_json::json;

/// Shared state: the leaderboard over the durable store. Handlers keep no other state.
type AppState = Data<Leaderboard>;

/// Page heading, read once at startup.
struct Title(String);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "poker-leaderboard",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Current standings as JSON.
#[get("/api/standings")]
async fn api_standings(state: AppState) -> HttpResponse {
    match web::block(move || state.standings()).await {
        Ok(Ok(standings)) => HttpResponse::Ok().json(standings),
        Ok(Err(e)) => {
            log::error!("Failed to load players for standings: {}", e);
            HttpResponse::InternalServerError().json(json!({ "ok": false, "error": "Failed to load tournament data." }))
        }
        Err(e) => {
            log::error!("Standings task failed: {}", e);
            HttpResponse::InternalServerError().json(json!({ "ok": false, "error": "Failed to load tournament data." }))
        }
    }
}

/// Every other request: POST to a path ending in `/results` saves a batch, anything else renders the page.
async fn dispatch(req: HttpRequest, body: Bytes, state: AppState, title: Data<Title>) -> HttpResponse {
    let path = req.path().trim_end_matches('/');
    let path = if path.is_empty() { "/" } else { path };
    let is_results_endpoint = path.ends_with("/results");
    log::info!(
        "Incoming request: method='{}' path='{}' is_results_endpoint={}",
        req.method(),
        path,
        is_results_endpoint
    );

    if req.method() == Method::POST && is_results_endpoint {
        save_results(state, &body, is_base64(req.headers())).await
    } else {
        render_page(state, title).await
    }
}

async fn save_results(state: AppState, body: &[u8], base64: bool) -> HttpResponse {
    log::info!("Received request body length: {}", body.len());
    let rows = match parse_batch(body, base64) {
        Ok(rows) => rows,
        Err(e) => return results_error(e),
    };
    match web::block(move || state.submit(&rows)).await {
        Ok(Ok(summary)) => {
            log::info!("POST /results succeeded: processed {}", summary.processed);
            HttpResponse::Ok().json(json!({ "ok": true, "processed": summary.processed }))
        }
        Ok(Err(e)) => results_error(e),
        Err(e) => {
            log::error!("POST /results unexpected error: {}", e);
            HttpResponse::InternalServerError().json(json!({ "ok": false, "error": "Failed to save results." }))
        }
    }
}

fn results_error(e: LeaderboardError) -> HttpResponse {
    if e.is_validation() {
        log::error!("POST /results validation error: {}", e);
        HttpResponse::BadRequest().json(json!({ "ok": false, "error": e.public_message() }))
    } else {
        log::error!("POST /results store error: {}", e);
        HttpResponse::InternalServerError().json(json!({ "ok": false, "error": e.public_message() }))
    }
}

async fn render_page(state: AppState, title: Data<Title>) -> HttpResponse {
    match web::block(move || state.standings()).await {
        Ok(Ok(standings)) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render_leaderboard(&title.0, &standings)),
        Ok(Err(e)) => {
            log::error!("Failed to load players for HTML response: {}", e);
            load_error_page()
        }
        Err(e) => {
            log::error!("Unexpected error while building HTML response: {}", e);
            load_error_page()
        }
    }
}

fn load_error_page() -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type("text/html; charset=utf-8")
        .body(LOAD_ERROR_PAGE)
}

/// Bodies marked base64 by either encoding header are decoded before JSON parsing.
fn is_base64(headers: &HeaderMap) -> bool {
    ["content-transfer-encoding", "content-encoding"].iter().any(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("base64"))
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_file() -> String {
    "data/players.json".to_string()
}

fn default_title() -> String {
    "Fire N Slice - Winter Tournament Series".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let data_file = std::env::var("DATA_FILE").unwrap_or_else(|_| default_data_file());
    let page_limit: usize = std::env::var("SCAN_PAGE_LIMIT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(poker_leaderboard::store::DEFAULT_PAGE_LIMIT);
    let title = std::env::var("LEADERBOARD_TITLE").unwrap_or_else(|_| default_title());
    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| default_static_dir());

    let store = FileStore::open(&data_file, page_limit).map_err(std::io::Error::other)?;
    let state = Data::new(Leaderboard::new(store));
    let title = Data::new(Title(title));

    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{} (data file {})", bind.0, bind.1, data_file);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(title.clone())
            .service(api_health)
            .service(favicon)
            .service(api_standings)
            .service(Files::new("/static", &static_dir))
            .default_service(web::to(dispatch))
    })
    .bind(bind)?
    .run()
    .await
}
