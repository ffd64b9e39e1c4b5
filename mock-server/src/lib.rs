use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "orderId")]
    pub order_id: u64,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[derive(Deserialize)]
pub struct CreateOrder {
    #[serde(rename = "userId")]
    pub user_id: u64,
}

/// First id handed out by `POST /orders`.
pub const FIRST_ORDER_ID: u64 = 99;

pub struct Store {
    users: BTreeMap<u64, User>,
    orders: BTreeMap<u64, Order>,
    next_order_id: u64,
}

impl Default for Store {
    fn default() -> Self {
        let users = [(1, "Ana"), (2, "Bruno")]
            .into_iter()
            .map(|(id, name)| {
                let user = User {
                    id,
                    name: name.to_string(),
                };
                (id, user)
            })
            .collect();
        Self {
            users,
            orders: BTreeMap::new(),
            next_order_id: FIRST_ORDER_ID,
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/status/{code}", get(status))
        .route("/moved", get(moved).post(moved))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let store = db.read().await;
    Json(store.users.values().cloned().collect())
}

async fn get_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<User>, (StatusCode, String)> {
    let store = db.read().await;
    store
        .users
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("user {id} not found")))
}

async fn create_order(
    State(db): State<Db>,
    Json(input): Json<CreateOrder>,
) -> Result<(StatusCode, Json<Order>), (StatusCode, String)> {
    let mut store = db.write().await;
    if !store.users.contains_key(&input.user_id) {
        return Err((StatusCode::NOT_FOUND, format!("user {} not found", input.user_id)));
    }
    let order = Order {
        order_id: store.next_order_id,
        user_id: input.user_id,
    };
    store.next_order_id += 1;
    store.orders.insert(order.order_id, order.clone());
    info!(order_id = order.order_id, user_id = order.user_id, "order created");
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Order>, (StatusCode, String)> {
    let store = db.read().await;
    store
        .orders
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("order {id} not found")))
}

/// Answer with the requested status code, for failure injection.
async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, format!("status {}", status.as_u16()))
}

/// Redirect to `/users/1`, for checking that clients do not follow it.
async fn moved() -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    (StatusCode::FOUND, [(header::LOCATION, "/users/1")], "moved")
}
