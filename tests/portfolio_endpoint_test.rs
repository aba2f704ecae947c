use axum::http::StatusCode;
use chookgu::api;
use chookgu::config::Config;
use chookgu::db::{init_db, PlayerProfile};
use chookgu::domain::{Decimal, PlayerId, PricePoint, Season, TimeMs, UserId};
use chrono::NaiveDate;
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
        starting_balance: Decimal::from_str("1000").unwrap(),
        default_season: Season::from_str("standard").unwrap(),
        session_cookie: "token".to_string(),
        transaction_history_limit: 100,
        seed_players_path: None,
    };

    repo.insert_session("alice-token", &UserId::new("alice".to_string()), None)
        .await
        .unwrap();
    repo.insert_session("bob-token", &UserId::new("bob".to_string()), None)
        .await
        .unwrap();

    let app = api::create_router(api::AppState::new(repo.clone(), config));

    TestApp {
        app,
        repo,
        _temp: temp_dir,
    }
}

fn day_ms(y: i32, m: u32, d: u32, hour: u32) -> i64 {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp_millis()
}

async fn add_player(repo: &chookgu::Repository, id: i64, prices: &[(i64, &str)]) {
    repo.upsert_player(&PlayerProfile {
        id: PlayerId::new(id),
        name: format!("Player {}", id),
        team: "Team".to_string(),
        position: "MF".to_string(),
    })
    .await
    .unwrap();
    for (time_ms, amount) in prices {
        repo.append_price(
            PlayerId::new(id),
            PricePoint::new(TimeMs::new(*time_ms), Decimal::from_str(amount).unwrap()),
        )
        .await
        .unwrap();
    }
}

async fn request(
    app: axum::Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json");
    let req = builder
        .body(match body {
            Some(b) => axum::body::Body::from(b.to_string()),
            None => axum::body::Body::empty(),
        })
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_new_portfolio_starts_with_configured_balance() {
    let t = setup_test_app().await;

    let (status, json) = request(t.app, "GET", "/portfolio", "alice-token", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["userId"], "alice");
    assert_eq!(json["season"], "standard");
    assert_eq!(json["balance"].as_f64(), Some(1000.0));
    assert!(json["assets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_portfolios_are_scoped_to_caller() {
    let t = setup_test_app().await;
    add_player(&t.repo, 7, &[(day_ms(2021, 8, 14, 12), "10")]).await;

    let (status, _) = request(
        t.app.clone(),
        "POST",
        "/transaction/buy",
        "alice-token",
        Some(serde_json::json!({"playerId": 7, "amount": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, alice) = request(t.app.clone(), "GET", "/portfolio", "alice-token", None).await;
    let (_, bob) = request(t.app, "GET", "/portfolio", "bob-token", None).await;
    assert_eq!(alice["assets"].as_array().unwrap().len(), 1);
    assert!(bob["assets"].as_array().unwrap().is_empty());
    assert_eq!(bob["balance"].as_f64(), Some(1000.0));
}

#[tokio::test]
async fn test_value_without_assets_is_empty_series() {
    let t = setup_test_app().await;
    add_player(&t.repo, 7, &[(day_ms(2021, 8, 14, 12), "10")]).await;

    let (status, json) = request(t.app, "GET", "/portfolio/value", "alice-token", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["season"], "standard");
    assert_eq!(json["balance"].as_f64(), Some(1000.0));
    assert!(json["history"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_value_history_sums_holdings_per_day() {
    let t = setup_test_app().await;
    add_player(
        &t.repo,
        7,
        &[
            (day_ms(2021, 8, 14, 9), "10"),
            (day_ms(2021, 8, 15, 9), "12"),
        ],
    )
    .await;
    add_player(
        &t.repo,
        10,
        &[
            (day_ms(2021, 8, 14, 9), "50"),
            (day_ms(2021, 8, 16, 9), "40"),
        ],
    )
    .await;

    for (player, amount) in [(7, 2), (10, 1)] {
        let (status, _) = request(
            t.app.clone(),
            "POST",
            "/transaction/buy",
            "alice-token",
            Some(serde_json::json!({"playerId": player, "amount": amount})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // 2 x player 7 at 12 and 1 x player 10 at 40 cost 64; balance 936
    let (status, json) = request(t.app, "GET", "/portfolio/value", "alice-token", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["balance"].as_f64(), Some(936.0));

    let history = json["history"].as_array().unwrap();
    let points: Vec<(String, f64)> = history
        .iter()
        .map(|p| {
            (
                p["date"].as_str().unwrap().to_string(),
                p["totalValue"].as_f64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        points,
        vec![
            ("2021-08-14".to_string(), 936.0 + 20.0 + 50.0),
            ("2021-08-15".to_string(), 936.0 + 24.0),
            ("2021-08-16".to_string(), 936.0 + 40.0),
        ]
    );
}

#[tokio::test]
async fn test_value_history_uses_last_price_of_day() {
    let t = setup_test_app().await;
    add_player(
        &t.repo,
        7,
        &[
            (day_ms(2021, 8, 14, 9), "10"),
            (day_ms(2021, 8, 14, 18), "11"),
        ],
    )
    .await;

    request(
        t.app.clone(),
        "POST",
        "/transaction/buy",
        "alice-token",
        Some(serde_json::json!({"playerId": 7, "amount": 1})),
    )
    .await;

    let (_, json) = request(t.app, "GET", "/portfolio/value", "alice-token", None).await;
    let history = json["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["date"], "2021-08-14");
    assert_eq!(history[0]["totalValue"].as_f64(), Some(989.0 + 11.0));
}

#[tokio::test]
async fn test_value_season_parameter() {
    let t = setup_test_app().await;
    add_player(&t.repo, 7, &[(day_ms(2021, 8, 14, 9), "10")]).await;

    request(
        t.app.clone(),
        "POST",
        "/transaction/buy",
        "alice-token",
        Some(serde_json::json!({"playerId": 7, "amount": 1, "season": "2021"})),
    )
    .await;

    let (_, json) = request(
        t.app.clone(),
        "GET",
        "/portfolio/value?season=2021",
        "alice-token",
        None,
    )
    .await;
    assert_eq!(json["season"], "2021");
    assert_eq!(json["history"].as_array().unwrap().len(), 1);

    let (_, json) = request(t.app.clone(), "GET", "/portfolio/value", "alice-token", None).await;
    assert!(json["history"].as_array().unwrap().is_empty());

    let (status, _) = request(
        t.app,
        "GET",
        "/portfolio/value?season=no%20spaces",
        "alice-token",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
