use axum::http::StatusCode;
use chookgu::api;
use chookgu::config::Config;
use chookgu::db::{init_db, PlayerProfile};
use chookgu::domain::{Decimal, PlayerId, PricePoint, Season, TimeMs, UserId};
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    repo: Arc<chookgu::Repository>,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(chookgu::Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        starting_balance: Decimal::from_str("1000000000").unwrap(),
        default_season: Season::from_str("standard").unwrap(),
        session_cookie: "chookgu_session".to_string(),
        transaction_history_limit: 100,
        seed_players_path: None,
    };

    let app = api::create_router(api::AppState::new(repo.clone(), config));

    TestApp {
        app,
        repo,
        _temp: temp_dir,
    }
}

async fn request(
    app: axum::Router,
    uri: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = builder.body(axum::body::Body::empty()).unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_and_ready() {
    let t = setup_test_app().await;

    let (status, json) = request(t.app.clone(), "/health", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");

    let (status, json) = request(t.app, "/ready", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ready");
}

#[tokio::test]
async fn test_players_listing_and_detail() {
    let t = setup_test_app().await;
    for (id, name) in [(10, "Harry Kane"), (7, "Son Heung-min")] {
        t.repo
            .upsert_player(&PlayerProfile {
                id: PlayerId::new(id),
                name: name.to_string(),
                team: "Tottenham".to_string(),
                position: "FW".to_string(),
            })
            .await
            .unwrap();
    }
    for (time_ms, amount) in [(1628899200000, "80000000"), (1628985600000, "85000000")] {
        t.repo
            .append_price(
                PlayerId::new(7),
                PricePoint::new(TimeMs::new(time_ms), Decimal::from_str(amount).unwrap()),
            )
            .await
            .unwrap();
    }

    let (status, json) = request(t.app.clone(), "/players", &[]).await;
    assert_eq!(status, StatusCode::OK);
    let players = json["players"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    assert_eq!(players[0]["id"], 7);
    assert_eq!(players[0]["currentValue"].as_f64(), Some(85000000.0));
    assert!(players[0].get("valueHistory").is_none());

    let (status, json) = request(t.app.clone(), "/players/7", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Son Heung-min");
    let history = json["valueHistory"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["date"], "2021-08-14");
    assert_eq!(history[1]["timeMs"], 1628985600000i64);

    let (status, json) = request(t.app.clone(), "/players/99", &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());

    let (status, json) = request(t.app, "/players/son", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_user_endpoints_require_session() {
    let t = setup_test_app().await;

    for uri in ["/portfolio", "/portfolio/value", "/transaction"] {
        let (status, json) = request(t.app.clone(), uri, &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert!(json["error"].is_string());
    }

    let (status, _) = request(
        t.app,
        "/portfolio",
        &[("authorization", "Bearer not-a-session")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_and_bearer_are_accepted() {
    let t = setup_test_app().await;
    t.repo
        .insert_session("cookie-tok", &UserId::new("carol".to_string()), None)
        .await
        .unwrap();

    let (status, json) = request(
        t.app.clone(),
        "/portfolio",
        &[("cookie", "theme=dark; chookgu_session=cookie-tok")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["userId"], "carol");

    let (status, json) = request(
        t.app,
        "/portfolio",
        &[("authorization", "Bearer cookie-tok")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["userId"], "carol");
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let t = setup_test_app().await;
    t.repo
        .insert_session(
            "old-tok",
            &UserId::new("dave".to_string()),
            Some(TimeMs::new(1)),
        )
        .await
        .unwrap();

    let (status, _) = request(t.app, "/portfolio", &[("authorization", "Bearer old-tok")]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
