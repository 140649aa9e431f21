//! Integration tests for the API client.
//!
//! These tests cover the request shape (headers, paths, bodies), the
//! `{ "error": string }` failure contract, and the one-shot database
//! fallback for catalog reads.

#![allow(clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;

use manavault_core::{Condition, Finish, OrderId, OrderStatus, PrintingId};
use manavault_integration_tests::{ANON_KEY, FakeApi, Reply, function_route, rpc_route};
use manavault_storefront::{ApiClient, ApiError, CardCache};
use manavault_storefront::api::{
    CardSearch, CollectionItemUpdate, InventoryFilter, InventoryUpsert, NewCollectionItem,
};

const USER_TOKEN: &str = "eyJ0eXAi.Qm9iIEJ1eWVy.k3Jd8sL2pW";

// =============================================================================
// Request Shape
// =============================================================================

#[tokio::test]
async fn test_requests_carry_apikey_and_anon_bearer() {
    let api = FakeApi::start().await;
    api.on_function("/api/games", Reply::ok(json!([{ "id": "mtg", "name": "Magic" }])));

    let games = api.client().games().await.expect("Games should load");
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].name, "Magic");

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].path, function_route("/api/games"));
    assert_eq!(requests[0].apikey.as_deref(), Some(ANON_KEY));
    assert_eq!(
        requests[0].authorization,
        Some(format!("Bearer {ANON_KEY}"))
    );
}

#[tokio::test]
async fn test_access_token_replaces_anon_bearer() {
    let api = FakeApi::start().await;
    api.on_function("/api/collections", Reply::ok(json!([])));

    let config = api.config_with(&[("MANAVAULT_ACCESS_TOKEN", USER_TOKEN)]);
    let client = ApiClient::new(&config, CardCache::default())
        .expect("Client should build");
    let items = client.collection().await.expect("Collection should load");
    assert!(items.is_empty());

    let request = &api.requests()[0];
    assert_eq!(request.apikey.as_deref(), Some(ANON_KEY));
    assert_eq!(
        request.authorization,
        Some(format!("Bearer {USER_TOKEN}"))
    );
}

#[tokio::test]
async fn test_collection_writes() {
    let api = FakeApi::start().await;
    let item = json!({
        "id": "row-1",
        "printing_id": "p1",
        "quantity": 3,
        "condition": "LP",
        "finish": "foil"
    });
    api.on_function("/api/collections", Reply::ok(item));

    let client = api.client();
    let added = client
        .add_to_collection(&NewCollectionItem {
            printing_id: PrintingId::new("p1"),
            quantity: 3,
            condition: Condition::LP,
            finish: Finish::Foil,
            purchase_price: None,
        })
        .await
        .expect("Add should succeed");
    assert_eq!(added.quantity, 3);
    assert_eq!(added.condition, Condition::LP);

    client
        .update_collection_item(
            "row-1",
            &CollectionItemUpdate {
                quantity: Some(4),
                ..CollectionItemUpdate::default()
            },
        )
        .await
        .expect("Update should succeed");

    api.clear_replies(&function_route("/api/collections"));
    api.on_function("/api/collections", Reply::ok(json!(null)));
    client
        .remove_from_collection("row-1")
        .await
        .expect("Delete should succeed");

    let requests = api.requests();
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].body["printing_id"], "p1");
    assert_eq!(requests[0].body["condition"], "LP");
    assert!(requests[0].body.get("purchase_price").is_none());

    assert_eq!(requests[1].method, Method::PUT);
    assert_eq!(requests[1].query_param("id").as_deref(), Some("row-1"));
    assert_eq!(requests[1].body, json!({ "quantity": 4 }));

    assert_eq!(requests[2].method, Method::DELETE);
    assert_eq!(requests[2].query_param("id").as_deref(), Some("row-1"));
}

#[tokio::test]
async fn test_watch_and_unwatch() {
    let api = FakeApi::start().await;
    api.on_function(
        "/api/watchlists",
        Reply::ok(json!({ "id": "w1", "printing_id": "p1", "target_price": "4.50" })),
    );

    let client = api.client();
    let entry = client
        .watch(&PrintingId::new("p1"), Some(Decimal::new(450, 2)))
        .await
        .expect("Watch should succeed");
    assert_eq!(entry.target_price, Some(Decimal::new(450, 2)));

    api.clear_replies(&function_route("/api/watchlists"));
    api.on_function("/api/watchlists", Reply::text(StatusCode::OK, ""));
    client
        .unwatch(&PrintingId::new("p1"))
        .await
        .expect("Unwatch should accept an empty body");

    let requests = api.requests();
    assert_eq!(requests[0].body["target_price"], "4.50");
    assert_eq!(requests[1].method, Method::DELETE);
    assert_eq!(requests[1].query_param("printing_id").as_deref(), Some("p1"));
}

#[tokio::test]
async fn test_stats_defaults_for_missing_fields() {
    let api = FakeApi::start().await;
    api.on_function(
        "/api/stats/collection",
        Reply::ok(json!({ "total_cards": 12, "total_value": "31.40" })),
    );

    let stats = api
        .client()
        .collection_stats()
        .await
        .expect("Stats should load");
    assert_eq!(stats.total_cards, 12);
    assert_eq!(stats.unique_cards, 0);
    assert_eq!(stats.total_value, Decimal::new(3140, 2));
    assert!(stats.by_game.is_empty());
}

// =============================================================================
// Error Contract
// =============================================================================

#[tokio::test]
async fn test_handler_error_message_is_surfaced() {
    let api = FakeApi::start().await;
    api.on_function(
        "/api/collections",
        Reply::error(StatusCode::BAD_REQUEST, "quantity must be positive"),
    );

    let err = api
        .client()
        .update_collection_item("row-1", &CollectionItemUpdate::default())
        .await
        .expect_err("Handler rejects the update");

    match err {
        ApiError::Service { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "quantity must be positive");
        }
        other => panic!("Expected Service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_message_maps_to_unauthorized() {
    let api = FakeApi::start().await;
    api.on_function(
        "/api/collections",
        Reply::error(StatusCode::BAD_REQUEST, "Unauthorized"),
    );

    let err = api
        .client()
        .collection()
        .await
        .expect_err("No user behind the token");
    assert!(matches!(err, ApiError::Unauthorized(_)), "{err:?}");
}

#[tokio::test]
async fn test_non_json_error_body_is_kept() {
    let api = FakeApi::start().await;
    api.on_function(
        "/api/stats/prices",
        Reply::text(StatusCode::BAD_GATEWAY, "upstream connect error"),
    );

    let err = api
        .client()
        .price_stats()
        .await
        .expect_err("Gateway failure");
    match err {
        ApiError::Service { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "upstream connect error");
        }
        other => panic!("Expected Service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let api = FakeApi::start().await;
    api.on_function("/api/games", Reply::rate_limited(7));

    let err = api.client().games().await.expect_err("Rate limited");
    assert!(matches!(err, ApiError::RateLimited(7)), "{err:?}");
    // Not retried
    assert_eq!(api.requests().len(), 1);
}

// =============================================================================
// Database Fallback
// =============================================================================

#[tokio::test]
async fn test_search_falls_back_to_database_on_server_error() {
    let api = FakeApi::start().await;
    api.on_function(
        "/api/search",
        Reply::error(StatusCode::INTERNAL_SERVER_ERROR, "Missing configuration"),
    );
    api.on_rpc(
        "search_cards_with_prices",
        Reply::ok(json!([{
            "id": "p1",
            "name": "Lightning Bolt",
            "set_code": "2xm",
            "collector_number": "117",
            "is_foil": true,
            "price_usd": "3.10"
        }])),
    );

    let search = CardSearch {
        set: Some("2xm".to_owned()),
        limit: Some(5),
        ..CardSearch::new("bolt")
    };
    let printings = api
        .client()
        .search_cards(&search)
        .await
        .expect("Fallback should answer");

    assert_eq!(printings.len(), 1);
    assert_eq!(printings[0].finish, Finish::Foil);
    assert_eq!(printings[0].price, Some(Decimal::new(310, 2)));

    let requests = api.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body["query"], "bolt");
    assert_eq!(requests[1].path, rpc_route("search_cards_with_prices"));
    assert_eq!(requests[1].body["search_query"], "bolt");
    assert_eq!(requests[1].body["set_filter"], "2xm");
    assert_eq!(requests[1].body["result_limit"], 5);
}

#[tokio::test]
async fn test_search_accepts_wrapped_response() {
    let api = FakeApi::start().await;
    api.on_function(
        "/api/search",
        Reply::ok(json!({
            "results": [{ "printing_id": "p1", "name": "Opt", "set_code": "xln", "collector_number": "65" }],
            "total": 1
        })),
    );

    let printings = api
        .client()
        .search_cards(&CardSearch::new("opt"))
        .await
        .expect("Search should succeed");
    assert_eq!(printings.len(), 1);
    assert_eq!(printings[0].name, "Opt");
    assert_eq!(printings[0].finish, Finish::Nonfoil);
}

#[tokio::test]
async fn test_client_error_does_not_fall_back() {
    let api = FakeApi::start().await;
    api.on_function(
        "/api/search",
        Reply::error(StatusCode::BAD_REQUEST, "query too short"),
    );

    let err = api
        .client()
        .search_cards(&CardSearch::new("a"))
        .await
        .expect_err("Bad request is final");
    assert_eq!(err.status(), Some(400));
    assert!(api.requests_to(&rpc_route("search_cards_with_prices")).is_empty());
}

#[tokio::test]
async fn test_card_fallback_has_no_versions_and_is_cached() {
    let api = FakeApi::start().await;
    api.on_function(
        "/api/cards",
        Reply::error(StatusCode::SERVICE_UNAVAILABLE, "Function timed out"),
    );
    api.on_rpc(
        "search_cards_with_prices",
        Reply::ok(json!([{ "printing_id": "p1", "name": "Opt", "set_code": "xln", "collector_number": "65" }])),
    );

    let client = api.client();
    let card = client
        .card(&PrintingId::new("p1"))
        .await
        .expect("Fallback should answer");
    assert_eq!(card.printing.name, "Opt");
    assert!(card.all_versions.is_empty());

    let rpc = api.requests_to(&rpc_route("search_cards_with_prices"));
    assert_eq!(rpc.len(), 1);
    assert_eq!(rpc[0].body["printing_filter"], "p1");

    client
        .card(&PrintingId::new("p1"))
        .await
        .expect("Cached");
    assert_eq!(api.requests().len(), 2);
}

#[tokio::test]
async fn test_card_fallback_not_found() {
    let api = FakeApi::start().await;
    api.on_function(
        "/api/cards",
        Reply::error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
    );
    api.on_rpc("search_cards_with_prices", Reply::ok(json!([])));

    let err = api
        .client()
        .card(&PrintingId::new("ghost"))
        .await
        .expect_err("Neither path knows the printing");
    assert!(matches!(err, ApiError::NotFound(_)), "{err:?}");
}

// =============================================================================
// Admin RPCs
// =============================================================================

#[tokio::test]
async fn test_admin_rpcs_post_named_functions() {
    let api = FakeApi::start().await;
    api.on_rpc(
        "get_inventory_list",
        Reply::ok(json!([{ "printing_id": "p1", "name": "Opt", "quantity": 2, "condition": "NM" }])),
    );
    api.on_rpc(
        "upsert_product_inventory",
        Reply::ok(json!({ "printing_id": "p1", "quantity": 5, "condition": "LP", "price": "0.25" })),
    );
    api.on_rpc(
        "update_order_status",
        Reply::ok(json!({ "id": "1042", "status": "shipped" })),
    );
    api.on_rpc("soft_delete_order", Reply::ok(json!(true)));
    api.on_rpc(
        "calculate_price_trends",
        Reply::ok(json!([{
            "printing_id": "p1",
            "name": "Opt",
            "current_price": "0.30",
            "previous_price": "0.20",
            "change_percent": "50"
        }])),
    );

    let client = api.client();

    let stock = client
        .inventory_list(&InventoryFilter {
            max_quantity: Some(3),
            ..InventoryFilter::default()
        })
        .await
        .expect("Inventory should load");
    assert_eq!(stock[0].quantity, 2);

    let row = client
        .upsert_inventory(&InventoryUpsert {
            printing_id: PrintingId::new("p1"),
            condition: Condition::LP,
            quantity: 5,
            price: Some(Decimal::new(25, 2)),
        })
        .await
        .expect("Upsert should succeed");
    assert_eq!(row.condition, Condition::LP);

    let order = client
        .update_order_status(&OrderId::new("1042"), OrderStatus::Shipped)
        .await
        .expect("Status update should succeed");
    assert_eq!(order.status, OrderStatus::Shipped);

    client
        .soft_delete_order(&OrderId::new("1042"))
        .await
        .expect("Soft delete should succeed");

    let trends = client
        .price_trends(7, Some(10))
        .await
        .expect("Trends should load");
    assert_eq!(trends[0].change_percent, Decimal::from(50));

    let requests = api.requests();
    let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/rest/v1/rpc/get_inventory_list",
            "/rest/v1/rpc/upsert_product_inventory",
            "/rest/v1/rpc/update_order_status",
            "/rest/v1/rpc/soft_delete_order",
            "/rest/v1/rpc/calculate_price_trends",
        ]
    );
    assert!(requests.iter().all(|r| r.method == Method::POST));
    assert_eq!(requests[0].body, json!({ "max_quantity": 3 }));
    assert_eq!(requests[1].body["price"], "0.25");
    assert_eq!(
        requests[2].body,
        json!({ "order_id": "1042", "new_status": "shipped" })
    );
    assert_eq!(requests[3].body, json!({ "order_id": "1042" }));
    assert_eq!(requests[4].body, json!({ "days": 7, "result_limit": 10 }));
}
