use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Order, User, FIRST_ORDER_ID};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- users ---

#[tokio::test]
async fn list_users_returns_seeded_users() {
    let resp = app().oneshot(get("/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<User> = body_json(resp).await;
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Ana");
}

#[tokio::test]
async fn get_user_found() {
    let resp = app().oneshot(get("/users/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    let expected = User {
        id: 1,
        name: "Ana".to_string(),
    };
    assert_eq!(user, expected);
}

#[tokio::test]
async fn get_user_not_found_has_text_body() {
    let resp = app().oneshot(get("/users/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(resp).await, "user 42 not found");
}

#[tokio::test]
async fn get_user_bad_id_returns_400() {
    let resp = app().oneshot(get("/users/not-a-number")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- orders ---

#[tokio::test]
async fn create_order_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/orders", r#"{"userId":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Order = body_json(resp).await;
    let expected = Order {
        order_id: FIRST_ORDER_ID,
        user_id: 1,
    };
    assert_eq!(order, expected);
}

#[tokio::test]
async fn create_order_for_unknown_user_returns_404() {
    let resp = app()
        .oneshot(json_request("POST", "/orders", r#"{"userId":7}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_order_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/orders", r#"{"user":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_order_not_found() {
    let resp = app().oneshot(get("/orders/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- failure injection ---

#[tokio::test]
async fn status_route_echoes_requested_code() {
    let resp = app().oneshot(get("/status/503")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_bytes(resp).await, "status 503");
}

#[tokio::test]
async fn moved_route_redirects_to_first_user() {
    let resp = app().oneshot(get("/moved")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[http::header::LOCATION], "/users/1");
    assert_eq!(body_bytes(resp).await, "moved");
}

// --- order lifecycle ---

#[tokio::test]
async fn order_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create two orders
    let mut ids = Vec::new();
    for user_id in [1, 2] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/orders", &format!(r#"{{"userId":{user_id}}}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let order: Order = body_json(resp).await;
        assert_eq!(order.user_id, user_id);
        ids.push(order.order_id);
    }
    assert_eq!(ids, vec![FIRST_ORDER_ID, FIRST_ORDER_ID + 1]);

    // fetch the second one back
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/orders/{}", ids[1])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Order = body_json(resp).await;
    let expected = Order {
        order_id: ids[1],
        user_id: 2,
    };
    assert_eq!(fetched, expected);
}
