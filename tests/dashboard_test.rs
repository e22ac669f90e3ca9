mod common;

use axum::http::Method;
use serde_json::json;

use common::{ok, StubBackend};
use crm_admin::services::DashboardService;

#[tokio::test]
async fn overview_reads_totals_and_tolerates_failing_resources() {
    let backend = StubBackend::start().await;
    backend.respond(
        Method::GET,
        "/api/v1/leads",
        200,
        ok(json!({ "content": [{ "id": 1, "firstName": "Ana", "lastName": "Souza" }], "totalElements": 7, "totalPages": 7 })),
    );
    backend.respond(
        Method::GET,
        "/api/v1/items",
        200,
        json!({ "data": { "content": [], "totalPages": 0 } }),
    );
    backend.respond(
        Method::GET,
        "/api/v1/invoices",
        500,
        json!({ "success": false, "message": "Database unavailable" }),
    );

    let overview = DashboardService::new(backend.client()).overview().await;

    assert_eq!(overview.cards.len(), 12);
    assert_eq!(overview.card("leads").unwrap().total, Some(7));
    assert_eq!(overview.card("items").unwrap().total, Some(0));
    assert_eq!(overview.card("invoices").unwrap().total, None);
    assert_eq!(overview.loaded(), 2);

    // Cada cartão pede só um registro
    let leads = backend
        .requests()
        .into_iter()
        .find(|r| r.path == "/api/v1/leads")
        .unwrap();
    assert!(leads.query.unwrap().contains("pageSize=1"));
}
