//! Tests for the users HTTP handlers.

use std::sync::Arc;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{UsersCommand, UsersQuery};
use crate::domain::{OrderDraft, UserService};
use crate::outbound::memory::InMemoryStore;

#[fixture]
fn store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new())
}

fn test_app(
    store: Arc<InMemoryStore>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::from_repositories(store.clone(), store);
    App::new()
        .app_data(web::Data::new(state))
        .configure(configure)
}

async fn init_app(
    store: Arc<InMemoryStore>,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    actix_test::init_service(test_app(store)).await
}

async fn body_text(res: ServiceResponse) -> String {
    let bytes = actix_test::read_body(res).await;
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

fn john() -> Value {
    json!({"name": "John Doe", "email": "john.doe@example.com"})
}

async fn create<S>(app: &S, body: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = actix_test::TestRequest::post()
        .uri("/api/users")
        .set_json(body)
        .to_request();
    let res = actix_test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    actix_test::read_body_json(res).await
}

#[rstest]
#[actix_web::test]
async fn create_then_get_round_trips(store: Arc<InMemoryStore>) {
    let app = init_app(store).await;

    let created = create(&app, john()).await;
    let id = created["id"].as_i64().expect("generated id");
    assert_eq!(created["orders"], json!([]));

    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/users/{id}"))
        .to_request();
    let fetched: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["name"], "John Doe");
    assert_eq!(fetched["email"], "john.doe@example.com");
    assert_eq!(fetched["orders"], json!([]));
}

#[rstest]
#[actix_web::test]
async fn list_uses_summary_view(store: Arc<InMemoryStore>) {
    let app = init_app(store).await;
    create(&app, john()).await;
    create(&app, json!({"name": "Jane", "email": "jane@example.com"})).await;

    let req = actix_test::TestRequest::get().uri("/api/users").to_request();
    let listed: Value = actix_test::call_and_read_body_json(&app, req).await;
    let users = listed.as_array().expect("array body");
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("orders").is_none());
        assert!(user.get("id").is_some());
    }
}

#[rstest]
#[actix_web::test]
async fn create_attaches_orders_from_body(store: Arc<InMemoryStore>) {
    let app = init_app(store).await;
    let created = create(
        &app,
        json!({
            "name": "John Doe",
            "email": "john.doe@example.com",
            "orders": [
                {"product": "Lamp", "amount": 10.5, "status": "pending"},
                {"product": "Desk"}
            ]
        }),
    )
    .await;
    let id = created["id"].as_i64().expect("generated id");
    let orders = created["orders"].as_array().expect("orders array");
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|order| order["id"].as_i64().is_some()));

    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/users/{id}"))
        .to_request();
    let fetched: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["orders"][0]["product"], "Lamp");
    assert_eq!(fetched["orders"][0]["amount"], 10.5);
    assert_eq!(fetched["orders"][1]["product"], "Desk");
    assert_eq!(fetched["orders"][1]["status"], Value::Null);
}

#[rstest]
#[case(json!({"product": ""}))]
#[case(json!({"amount": 3.0}))]
#[actix_web::test]
async fn create_rejects_order_without_product(store: Arc<InMemoryStore>, #[case] order: Value) {
    let app = init_app(store.clone()).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "name": "John Doe",
            "email": "john.doe@example.com",
            "orders": [order]
        }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(res).await, "product: must not be blank");
    let users = UsersQuery::list_users(&UserService::new(store.clone(), store))
        .await
        .expect("list");
    assert!(users.is_empty());
}

#[rstest]
#[actix_web::test]
async fn update_ignores_orders_in_body(store: Arc<InMemoryStore>) {
    let app = init_app(store).await;
    let created = create(
        &app,
        json!({
            "name": "John Doe",
            "email": "john.doe@example.com",
            "orders": [{"product": "Lamp"}]
        }),
    )
    .await;
    let id = created["id"].as_i64().expect("generated id");

    let req = actix_test::TestRequest::put()
        .uri(&format!("/api/users/{id}"))
        .set_json(json!({
            "name": "Johnny",
            "email": "john.doe@example.com",
            "orders": [{"product": ""}, {"product": "Desk"}]
        }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = actix_test::read_body_json(res).await;

    assert_eq!(updated["name"], "Johnny");
    assert_eq!(updated["orders"], created["orders"]);
}

#[rstest]
#[case(json!({"name": "", "email": "john.doe@example.com"}), "name:")]
#[case(json!({"email": "john.doe@example.com"}), "name:")]
#[case(json!({"name": "John", "email": "invalid-email"}), "email:")]
#[actix_web::test]
async fn create_rejects_invalid_payloads(
    store: Arc<InMemoryStore>,
    #[case] body: Value,
    #[case] expected: &str,
) {
    let app = init_app(store.clone()).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/users")
        .set_json(body)
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(res).await.contains(expected));
    let users = UsersQuery::list_users(&UserService::new(store.clone(), store))
        .await
        .expect("list");
    assert!(users.is_empty());
}

#[rstest]
#[case(actix_test::TestRequest::get())]
#[case(actix_test::TestRequest::delete())]
#[actix_web::test]
async fn unknown_ids_return_not_found(
    store: Arc<InMemoryStore>,
    #[case] request: actix_test::TestRequest,
) {
    let app = init_app(store).await;
    let res = actix_test::call_service(&app, request.uri("/api/users/999").to_request()).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(res).await, "User not found");
}

#[rstest]
#[actix_web::test]
async fn update_unknown_id_returns_not_found(store: Arc<InMemoryStore>) {
    let app = init_app(store).await;
    let req = actix_test::TestRequest::put()
        .uri("/api/users/999")
        .set_json(john())
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(res).await, "User not found");
}

#[rstest]
#[actix_web::test]
async fn update_merges_profile_and_keeps_orders(store: Arc<InMemoryStore>) {
    let service = UserService::new(store.clone(), store.clone());
    let app = init_app(store).await;
    let created = create(&app, john()).await;
    let id = created["id"].as_i64().expect("generated id");
    service
        .add_order(
            UserId::new(id),
            OrderDraft {
                product: Some("Product A".to_owned()),
                amount: Some(100.0),
                status: Some("pending".to_owned()),
            },
        )
        .await
        .expect("order attached");

    let req = actix_test::TestRequest::put()
        .uri(&format!("/api/users/{id}"))
        .set_json(json!({"name": "Johnny", "email": "john.doe@example.com"}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = actix_test::read_body_json(res).await;

    assert_eq!(updated["name"], "Johnny");
    assert_eq!(updated["orders"].as_array().map(Vec::len), Some(1));
    assert_eq!(updated["orders"][0]["product"], "Product A");
}

#[rstest]
#[actix_web::test]
async fn update_validates_payload(store: Arc<InMemoryStore>) {
    let app = init_app(store).await;
    let created = create(&app, john()).await;
    let id = created["id"].as_i64().expect("generated id");

    let req = actix_test::TestRequest::put()
        .uri(&format!("/api/users/{id}"))
        .set_json(json!({"name": "John", "email": "nope"}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(res).await.starts_with("email:"));
}

#[rstest]
#[actix_web::test]
async fn delete_cascades_to_orders(store: Arc<InMemoryStore>) {
    let service = UserService::new(store.clone(), store.clone());
    let app = init_app(store).await;
    let created = create(&app, john()).await;
    let id = created["id"].as_i64().expect("generated id");
    let user = service
        .add_order(
            UserId::new(id),
            OrderDraft {
                product: Some("Product A".to_owned()),
                ..OrderDraft::default()
            },
        )
        .await
        .expect("order attached");
    let order_id = user.orders()[0].id().expect("persisted order");

    let req = actix_test::TestRequest::delete()
        .uri(&format!("/api/users/{id}"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(body_text(res).await.is_empty());

    let order = service.find_order(order_id).await.expect("lookup");
    assert!(order.is_none());
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_bad_request(store: Arc<InMemoryStore>) {
    let app = init_app(store).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/users")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(res).await, MALFORMED_BODY_MESSAGE);
}

#[rstest]
#[actix_web::test]
async fn non_numeric_id_is_bad_request(store: Arc<InMemoryStore>) {
    let app = init_app(store).await;
    let req = actix_test::TestRequest::get()
        .uri("/api/users/abc")
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(res).await, INVALID_ID_MESSAGE);
}
