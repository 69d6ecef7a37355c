//! Request pipeline tests against a booted app, driven through `oneshot`.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use itranswarp::config::RunMode;
use itranswarp::error::{ApiError, AppError, HandlerResult};
use itranswarp::handlers::{FnModule, ModuleRegistry, RouteDef};
use itranswarp::pipeline::{RequestContext, GENERIC_ERROR_BODY};
use itranswarp::routing::Verb;
use itranswarp::AppServer;

mod common;

use common::{get, send, user, EchoRenderer, HeaderResolver, RecordingTap};

async fn article(ctx: RequestContext) -> HandlerResult {
    let id = ctx.param("id").unwrap_or_default().to_string();
    ctx.render("article.html", json!({ "id": id }))
}

async fn first(_ctx: RequestContext) -> HandlerResult {
    Ok("first".into_response())
}

async fn second(_ctx: RequestContext) -> HandlerResult {
    Ok("second".into_response())
}

async fn crash(_ctx: RequestContext) -> HandlerResult {
    Err(AppError::internal("disk on fire"))
}

async fn dashboard(ctx: RequestContext) -> HandlerResult {
    ctx.render("manage/index.html", json!({}))
}

async fn whoami(ctx: RequestContext) -> HandlerResult {
    ctx.json(&json!({ "user": ctx.identity(), "manage": ctx.mode().is_manage() }))
}

async fn list_users(ctx: RequestContext) -> HandlerResult {
    ctx.json(&json!([{ "id": "u1" }]))
}

async fn create_user(ctx: RequestContext) -> HandlerResult {
    ctx.json(&json!({ "id": "u2" }))
}

async fn invalid_email(_ctx: RequestContext) -> HandlerResult {
    Err(ApiError::invalid_param("email").into())
}

async fn plain(_ctx: RequestContext) -> HandlerResult {
    Ok("plain".into_response())
}

fn pages() -> Vec<RouteDef> {
    vec![
        RouteDef::new("GET /article/{id}", article),
        RouteDef::new("GET /x", first),
        RouteDef::new("GET /crash", crash),
        RouteDef::new("GET /whoami", whoami),
        RouteDef::new("GET /manage/", dashboard),
        RouteDef::new("GET /manage/whoami", whoami),
    ]
}

fn api() -> Vec<RouteDef> {
    vec![
        RouteDef::new("GET /x", second),
        RouteDef::new("GET /api/users", list_users).with_source("async fn list() {\n/** List users. */\n}"),
        RouteDef::new("POST /api/users", create_user).with_doc("Create a user."),
        RouteDef::new("GET /api/fail", invalid_email),
        RouteDef::new("GET /api/plain", plain),
        RouteDef::new("PUT /api/users", plain),
        RouteDef::new("GET", plain),
    ]
}

fn modules() -> ModuleRegistry {
    ModuleRegistry::new()
        .with(FnModule::new("tests/pages.rs", pages))
        .with(FnModule::new("tests/api.rs", api))
}

fn boot(environment: RunMode) -> (AppServer, RecordingTap) {
    let tap = RecordingTap::default();
    let recorder = tap.clone();
    let server = AppServer::builder(common::test_config(environment))
        .modules(modules())
        .identity(Arc::new(HeaderResolver))
        .renderer(Arc::new(EchoRenderer))
        .error_tap(move |e: &AppError| recorder.observe(e))
        .build()
        .unwrap();
    (server, tap)
}

#[test]
fn test_route_table_from_modules() {
    let (server, _) = boot(RunMode::Development);
    let routes = server.routes();

    // 6 pages + 4 valid api routes (GET /x replaced) + GET /error
    assert_eq!(routes.len(), 11);
    assert_eq!(routes.lookup(Verb::Get, "/x").unwrap().module, "api");
    assert_eq!(routes.lookup(Verb::Get, "/article/{id}").unwrap().module, "pages");
    assert!(routes.lookup(Verb::Get, "/error").is_some());
}

#[test]
fn test_api_docs_collected_at_boot() {
    let (server, _) = boot(RunMode::Development);
    let docs = server.api_docs();

    assert_eq!(docs.len(), 2);
    assert_eq!(docs.find(Verb::Get, "/api/users").unwrap().doc, " List users. ");
    assert_eq!(docs.find(Verb::Post, "/api/users").unwrap().doc, "Create a user.");
    assert!(docs.find(Verb::Get, "/api/plain").is_none());
}

#[tokio::test]
async fn test_collision_last_registration_wins() {
    let (server, _) = boot(RunMode::Development);
    let res = get(&server.router(), "/x", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "second");
}

#[tokio::test]
async fn test_theme_render_model() {
    let (server, _) = boot(RunMode::Development);
    let res = get(&server.router(), "/article/42", Some(&user("u9", 1000))).await;
    assert_eq!(res.status, StatusCode::OK);

    let out = res.json();
    assert_eq!(out["view"], "themes/default/article.html");
    assert_eq!(out["model"]["id"], "42");
    assert_eq!(out["model"]["__theme__"], "themes/default/");
    assert_eq!(out["model"]["__user__"]["id"], "u9");
    assert_eq!(out["model"]["__website__"]["name"], "Test Site");
    assert!(out["model"]["__time__"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_manage_denied_redirects_to_auth() {
    let (server, _) = boot(RunMode::Development);
    let router = server.router();

    for who in [None, Some(user("s", 1000)), Some(user("g", 101))] {
        for path in ["/manage/", "/manage/whoami", "/manage/missing"] {
            let res = get(&router, path, who.as_deref()).await;
            assert_eq!(res.status, StatusCode::FOUND, "{path} as {who:?}");
            assert_eq!(res.headers["location"], "/auth/");
        }
    }
}

#[tokio::test]
async fn test_manage_allowed_for_contributor_and_above() {
    let (server, _) = boot(RunMode::Development);
    let router = server.router();

    for role in [0, 10, 100] {
        let res = get(&router, "/manage/", Some(&user("c", role))).await;
        assert_eq!(res.status, StatusCode::OK, "role {role}");
        let out = res.json();
        assert_eq!(out["view"], "manage/index.html");
        assert_eq!(out["model"]["__user__"]["role"], role);
        assert!(out["model"].get("__website__").is_none());
    }

    let res = get(&router, "/manage/whoami", Some(&user("c", 100))).await;
    assert_eq!(res.json()["manage"], true);
}

#[tokio::test]
async fn test_theme_area_is_open() {
    let (server, _) = boot(RunMode::Development);
    let router = server.router();

    let res = get(&router, "/whoami", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({ "user": null, "manage": false }));

    // Only the exact "/manage/" prefix is gated.
    let res = get(&router, "/manage", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_responses_are_json() {
    let (server, _) = boot(RunMode::Development);
    let router = server.router();

    let res = get(&router, "/api/plain", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.content_type(), "application/json");

    let res = send(&router, Method::POST, "/api/users", None).await;
    assert_eq!(res.json()["id"], "u2");

    let res = get(&router, "/x", None).await;
    assert_ne!(res.content_type(), "application/json");
}

#[tokio::test]
async fn test_api_error_verbatim_in_every_mode() {
    for mode in [RunMode::Development, RunMode::Production] {
        let (server, tap) = boot(mode);
        let res = get(&server.router(), "/api/fail", None).await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            res.json(),
            json!({
                "error": "parameter:invalid",
                "data": "email",
                "message": "Invalid parameter: email"
            })
        );
        assert_eq!(tap.seen().len(), 1);
    }
}

#[tokio::test]
async fn test_production_hides_error_detail() {
    let (server, tap) = boot(RunMode::Production);
    let res = get(&server.router(), "/crash", None).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body, GENERIC_ERROR_BODY);
    assert_eq!(tap.seen(), vec!["disk on fire".to_string()]);
}

#[tokio::test]
async fn test_development_shows_error_detail() {
    let (server, tap) = boot(RunMode::Development);
    let res = get(&server.router(), "/crash", None).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.body.contains("disk on fire"));
    assert_eq!(tap.seen(), vec!["disk on fire".to_string()]);
}

#[tokio::test]
async fn test_error_route_raises_test_error() {
    for mode in [RunMode::Development, RunMode::Production] {
        let (server, tap) = boot(mode);
        let res = get(&server.router(), "/error", None).await;

        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(tap.seen(), vec!["test error.".to_string()]);
        assert_eq!(res.body.contains("test error."), mode == RunMode::Development);
    }
}

#[tokio::test]
async fn test_identity_failure_is_translated() {
    let (server, tap) = boot(RunMode::Production);
    let res = get(&server.router(), "/whoami", Some("broken")).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body, GENERIC_ERROR_BODY);
    assert_eq!(tap.seen(), vec!["identity store unavailable".to_string()]);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (server, tap) = boot(RunMode::Development);
    let res = get(&server.router(), "/nowhere", None).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(tap.seen().is_empty());
}

#[tokio::test]
async fn test_head_served_by_get_and_request_id_set() {
    let (server, _) = boot(RunMode::Development);
    let res = send(&server.router(), Method::HEAD, "/x", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.is_empty());
    assert!(res.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_static_files_only_in_development() {
    let static_dir = common::temp_upload_dir();
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("app.css"), "body {}").unwrap();

    for (mode, expected) in [
        (RunMode::Development, StatusCode::OK),
        (RunMode::Production, StatusCode::NOT_FOUND),
    ] {
        let mut config = common::test_config(mode);
        config.paths.static_dir = static_dir.to_string_lossy().into_owned();
        let server = AppServer::builder(config)
            .renderer(Arc::new(EchoRenderer))
            .build()
            .unwrap();

        let res = get(&server.router(), "/static/app.css", None).await;
        assert_eq!(res.status, expected, "{mode:?}");
    }

    std::fs::remove_dir_all(&static_dir).unwrap();
}
