mod common;

use axum::http::Method;
use serde_json::json;

use common::{closed_port_url, ok, StubBackend};
use crm_admin::{
    client::{ResourceClient, ResourceId},
    common::error::{AppError, NETWORK_ERROR_MESSAGE},
    config::ClientConfig,
    models::{
        crm::{Leads, Territories, TerritoryPayload, TerritoryStatus},
        inventory::{InventoryItems, StockAdjustmentPayload},
        query::{ListQuery, PaginationStyle, SortDirection},
    },
    screens::InventoryActions,
};
use rust_decimal::Decimal;

#[tokio::test]
async fn create_territory_posts_exact_form_body() {
    let backend = StubBackend::start().await;
    backend.respond(
        Method::POST,
        "/api/v1/territories",
        201,
        ok(json!({
            "id": 5,
            "territoryName": "West",
            "territoryManager": "2",
            "region": "West Coast",
            "territoryStatus": "Active"
        })),
    );

    let payload = TerritoryPayload {
        territory_name: "West".into(),
        territory_manager: "2".into(),
        region: "West Coast".into(),
        territory_status: Some(TerritoryStatus::Active),
    };
    let created = backend.client().create::<Territories>(&payload).await.unwrap();
    assert_eq!(created.id, ResourceId::Int(5));

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path, "/api/v1/territories");
    assert_eq!(
        requests[0].body,
        Some(json!({
            "territoryName": "West",
            "territoryManager": "2",
            "region": "West Coast",
            "territoryStatus": "Active"
        }))
    );
}

#[tokio::test]
async fn empty_page_without_success_flag_is_valid() {
    let backend = StubBackend::start().await;
    backend.respond(Method::GET, "/api/v1/items", 200, json!({ "data": { "content": [], "totalPages": 0 } }));

    let page = backend.client().list::<InventoryItems>(&ListQuery::new(0, 10)).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total_pages, 0);

    let query = backend.requests()[0].query.clone().unwrap();
    assert!(query.contains("pageNumber=0"));
    assert!(query.contains("pageSize=10"));
}

#[tokio::test]
async fn page_size_style_and_server_filters_go_in_the_query() {
    let backend = StubBackend::start().await;
    backend.respond(
        Method::GET,
        "/api/v1/leads",
        200,
        ok(json!({ "content": [], "totalElements": 0, "totalPages": 0, "number": 1, "size": 20 })),
    );

    let mut query = ListQuery::new(1, 20).sorted_by("lastName", SortDirection::Desc);
    query.search = Some("ana".into());
    query.filters.insert("status".into(), "NEW".into());

    backend
        .client_with_style(PaginationStyle::PageSize)
        .list::<Leads>(&query)
        .await
        .unwrap();

    let raw = backend.requests()[0].query.clone().unwrap();
    let params: Vec<(String, String)> = reqwest::Url::parse(&format!("http://x/?{raw}"))
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect();
    for expected in [
        ("page", "1"),
        ("size", "20"),
        ("sort", "lastName,desc"),
        ("search", "ana"),
        ("filter[status]", "NEW"),
    ] {
        assert!(
            params.contains(&(expected.0.to_string(), expected.1.to_string())),
            "missing {expected:?} in {params:?}"
        );
    }
}

#[tokio::test]
async fn backend_message_is_surfaced_verbatim() {
    let backend = StubBackend::start().await;
    backend.respond(
        Method::POST,
        "/api/v1/territories",
        409,
        json!({ "success": false, "message": "Territory name already exists", "statusCode": 409 }),
    );

    let err = backend
        .client()
        .create::<Territories>(&TerritoryPayload::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Request { status: 409, .. }));
    assert_eq!(err.user_message("Failed to create territory"), "Territory name already exists");
}

#[tokio::test]
async fn error_without_message_uses_fallback() {
    let backend = StubBackend::start().await;
    backend.respond_raw(Method::DELETE, "/api/v1/leads/3", 500, "<html>oops</html>");

    let err = backend.client().remove::<Leads>(&ResourceId::Int(3)).await.unwrap_err();
    assert!(matches!(err, AppError::Request { status: 500, message: None }));
    assert_eq!(err.user_message("Failed to delete lead"), "Failed to delete lead");
}

#[tokio::test]
async fn success_false_with_http_200_is_an_error() {
    let backend = StubBackend::start().await;
    backend.respond(
        Method::GET,
        "/api/v1/leads/9",
        200,
        json!({ "success": false, "message": "Lead is archived", "data": null }),
    );

    let err = backend.client().get::<Leads>(&ResourceId::Int(9)).await.unwrap_err();
    assert_eq!(err.user_message("Failed to load lead"), "Lead is archived");
}

#[tokio::test]
async fn malformed_bodies_are_reported() {
    let backend = StubBackend::start().await;
    backend.respond_raw(Method::GET, "/api/v1/leads", 200, "not json");
    backend.respond(Method::GET, "/api/v1/leads/1", 200, json!({ "success": true }));

    let client = backend.client();
    assert!(matches!(
        client.list::<Leads>(&ListQuery::new(0, 10)).await,
        Err(AppError::MalformedResponse(_))
    ));
    assert!(matches!(
        client.get::<Leads>(&ResourceId::Int(1)).await,
        Err(AppError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let client = ResourceClient::new(ClientConfig::new(closed_port_url().await));
    let err = client.list::<Leads>(&ListQuery::new(0, 10)).await.unwrap_err();

    assert!(matches!(err, AppError::Network(_)));
    assert_eq!(err.user_message("Failed to load leads"), NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn update_uses_patch_and_delete_accepts_empty_body() {
    let backend = StubBackend::start().await;
    backend.respond(
        Method::PATCH,
        "/api/v1/territories/LD-7",
        200,
        ok(json!({ "id": "LD-7", "territoryName": "East" })),
    );
    backend.respond_raw(Method::DELETE, "/api/v1/territories/LD-7", 204, "");

    let client = backend.client();
    let id = ResourceId::from("LD-7");
    let payload = TerritoryPayload { territory_name: "East".into(), ..Default::default() };

    let updated = client.update::<Territories>(&id, &payload).await.unwrap();
    assert_eq!(updated.territory_name, "East");
    client.remove::<Territories>(&id).await.unwrap();

    let methods: Vec<_> = backend.requests().into_iter().map(|r| r.method).collect();
    assert_eq!(methods, [Method::PATCH, Method::DELETE]);
}

#[tokio::test]
async fn stock_adjustment_posts_to_action_route() {
    let backend = StubBackend::start().await;
    backend.respond(
        Method::POST,
        "/api/v1/items/4/adjustments",
        200,
        ok(json!({ "id": 4, "sku": "SKU-4", "name": "Bolt", "quantityOnHand": -2 })),
    );

    let payload = StockAdjustmentPayload {
        adjustment: Decimal::from(-5),
        reason: "Damaged".into(),
        notes: None,
    };
    let item = backend.client().adjust(&ResourceId::Int(4), &payload).await.unwrap();
    assert_eq!(item.quantity_on_hand, Decimal::from(-2));

    let body = backend.requests()[0].body.clone().unwrap();
    assert_eq!(body["reason"], "Damaged");
    assert_eq!(body["adjustment"].as_f64(), Some(-5.0));
}
