use axum::http::StatusCode;
use rust_decimal::Decimal;
use stashkeeper::api;
use stashkeeper::config::Config;
use stashkeeper::db::init_db;
use stashkeeper::domain::{Group, GroupId, Material, MaterialId, Recipe, RecipeId, Space, TimeMs};
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;
use tower::util::ServiceExt;

const T0: i64 = 1_700_000_000_000;

struct TestApp {
    app: axum::Router,
    repo: Arc<stashkeeper::Repository>,
    _clock: watch::Sender<TimeMs>,
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
    let repo = Arc::new(stashkeeper::Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        time_reduction_hours: 1,
        house_cut_percent: 50,
        launder_percent_options: vec![20, 30],
        revenue_window_days: 7,
    };
    let (clock_tx, clock_rx) = watch::channel(TimeMs::new(T0));
    let state = api::AppState::new(repo.clone(), config, clock_rx);
    let app = api::create_router(state);

    TestApp {
        app,
        repo,
        _clock: clock_tx,
        _temp: temp_dir,
    }
}

async fn request(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn seed_catalog(repo: &stashkeeper::Repository) {
    // Batch 10 @ 5 and batch 3 @ 20, for the two-line composition totals.
    for (id, name, batch, price) in [("r-a", "Alpha", 10, 5), ("r-b", "Bravo", 3, 20)] {
        repo.insert_recipe(&Recipe {
            id: RecipeId::new(id),
            space: Space::Crafting,
            name: name.to_string(),
            category: None,
            batch_size: batch,
            duration_hours: 24,
            unit_price: Decimal::from(price),
            tool_cost: None,
            materials: BTreeMap::from([(MaterialId::new("acier"), 1)]),
        })
        .await
        .unwrap();
    }
    repo.insert_material(&Material {
        id: MaterialId::new("acier"),
        space: Space::Crafting,
        name: "Acier".to_string(),
        unit: "unités".to_string(),
    })
    .await
    .unwrap();
    repo.insert_group(&Group {
        id: GroupId::new("g1"),
        name: "Les Affranchis".to_string(),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_compose_totals_and_price_override() {
    let test_app = setup_test_app().await;
    seed_catalog(&test_app.repo).await;

    // 10 @ 5 = 50 plus 3 @ 20 = 60.
    let (status, order) = request(
        test_app.app.clone(),
        "POST",
        "/v1/orders",
        Some(serde_json::json!({
            "user": "u1", "space": "crafting",
            "recipient": {"kind": "group", "id": "g1"},
            "items": [
                {"type": "recipe", "recipeId": "r-a", "requestedQty": 10},
                {"type": "recipe", "recipeId": "r-b", "requestedQty": 3}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["totalAmount"], "110");
    assert_eq!(order["status"], "pending");
    assert_eq!(order["recipient"]["name"], "Les Affranchis");

    // The same composition with the first line re-priced at 7 totals 130.
    let (status, order) = request(
        test_app.app.clone(),
        "POST",
        "/v1/orders",
        Some(serde_json::json!({
            "user": "u1", "space": "crafting",
            "recipient": {"kind": "person", "name": "Mika"},
            "items": [
                {"type": "recipe", "recipeId": "r-a", "requestedQty": 10, "unitPrice": 7},
                {"type": "recipe", "recipeId": "r-b", "requestedQty": 3}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["totalAmount"], "130");
    assert_eq!(order["items"][0]["unitPrice"], "7");
    assert_eq!(order["items"][0]["totalPrice"], "70");
}

#[tokio::test]
async fn test_recipe_item_carries_batch_math_and_materials() {
    let test_app = setup_test_app().await;
    seed_catalog(&test_app.repo).await;

    let (_, order) = request(
        test_app.app.clone(),
        "POST",
        "/v1/orders",
        Some(serde_json::json!({
            "user": "u1", "space": "crafting",
            "recipient": {"kind": "person", "name": "Mika"},
            "items": [{"type": "recipe", "recipeId": "r-b", "requestedQty": 4}]
        })),
    )
    .await;
    // 4 on batch 3: 2 crafts, 6 produced, surplus 2, priced on the 6.
    let item = &order["items"][0];
    assert_eq!(item["craftsNeeded"], 2);
    assert_eq!(item["actualProduction"], 6);
    assert_eq!(item["surplus"], 2);
    assert_eq!(item["totalPrice"], "120");
    assert_eq!(item["materials"][0]["materialName"], "Acier");
    assert_eq!(item["materials"][0]["quantity"], 2);
}

#[tokio::test]
async fn test_complete_sets_completed_at_once_and_filters() {
    let test_app = setup_test_app().await;
    seed_catalog(&test_app.repo).await;

    let (_, order) = request(
        test_app.app.clone(),
        "POST",
        "/v1/orders",
        Some(serde_json::json!({
            "user": "u1", "space": "crafting",
            "recipient": {"kind": "person", "name": "Mika"},
            "items": [{"type": "material", "materialId": "acier", "requestedQty": 4, "unitPrice": 25}]
        })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();
    assert_eq!(order["totalAmount"], "100");

    let (status, completed) = request(
        test_app.app.clone(),
        "POST",
        &format!("/v1/orders/{}/complete?user=u1", order_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");
    let completed_at = completed["completedAt"].as_i64().unwrap();

    // Completing again keeps the original timestamp.
    let (status, again) = request(
        test_app.app.clone(),
        "POST",
        &format!("/v1/orders/{}/complete?user=u1", order_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["completedAt"].as_i64().unwrap(), completed_at);

    let (_, pending) = request(
        test_app.app.clone(),
        "GET",
        "/v1/orders?user=u1&status=pending",
        None,
    )
    .await;
    assert_eq!(pending, serde_json::json!([]));
    let (_, completed_list) = request(
        test_app.app,
        "GET",
        "/v1/orders?user=u1&status=completed",
        None,
    )
    .await;
    assert_eq!(completed_list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_order_validation_failures() {
    let test_app = setup_test_app().await;
    seed_catalog(&test_app.repo).await;

    // Empty order.
    let (status, _) = request(
        test_app.app.clone(),
        "POST",
        "/v1/orders",
        Some(serde_json::json!({
            "user": "u1", "space": "crafting",
            "recipient": {"kind": "person", "name": "Mika"},
            "items": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown group recipient.
    let (status, _) = request(
        test_app.app.clone(),
        "POST",
        "/v1/orders",
        Some(serde_json::json!({
            "user": "u1", "space": "crafting",
            "recipient": {"kind": "group", "id": "nope"},
            "items": [{"type": "recipe", "recipeId": "r-a", "requestedQty": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Non-positive quantity.
    let (status, _) = request(
        test_app.app.clone(),
        "POST",
        "/v1/orders",
        Some(serde_json::json!({
            "user": "u1", "space": "crafting",
            "recipient": {"kind": "person", "name": "Mika"},
            "items": [{"type": "recipe", "recipeId": "r-a", "requestedQty": 0}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Blank recipient name.
    let (status, _) = request(
        test_app.app,
        "POST",
        "/v1/orders",
        Some(serde_json::json!({
            "user": "u1", "space": "crafting",
            "recipient": {"kind": "person", "name": "  "},
            "items": [{"type": "recipe", "recipeId": "r-a", "requestedQty": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_order() {
    let test_app = setup_test_app().await;
    seed_catalog(&test_app.repo).await;

    let (_, order) = request(
        test_app.app.clone(),
        "POST",
        "/v1/orders",
        Some(serde_json::json!({
            "user": "u1", "space": "crafting",
            "recipient": {"kind": "person", "name": "Mika"},
            "items": [{"type": "material", "materialId": "acier", "requestedQty": 1, "unitPrice": 5}]
        })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        test_app.app.clone(),
        "DELETE",
        &format!("/v1/orders/{}?user=u1", order_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        test_app.app,
        "DELETE",
        &format!("/v1/orders/{}?user=u1", order_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
