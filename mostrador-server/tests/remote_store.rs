//! RemoteStore against a minimal in-process PostgREST stand-in

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use shared::models::{Product, ProductUpdate, Sale, SaleLine, SaleStatus};

use mostrador_server::store::{RemoteStore, RepoError, Repository};

const API_KEY: &str = "test-key";

type Tables = Arc<Mutex<HashMap<String, Vec<Value>>>>;

/// `column=op.value` filter
fn matches(row: &Value, column: &str, filter: &str) -> bool {
    let Some((op, raw)) = filter.split_once('.') else {
        return true;
    };
    let Some(field) = row.get(column).and_then(Value::as_i64) else {
        return false;
    };
    let Ok(value) = raw.parse::<i64>() else {
        return false;
    };
    match op {
        "eq" => field == value,
        "gte" => field >= value,
        "lt" => field < value,
        _ => true,
    }
}

fn filtered(rows: &[Value], params: &[(String, String)]) -> Vec<Value> {
    rows.iter()
        .filter(|row| {
            params
                .iter()
                .filter(|(k, _)| !matches!(k.as_str(), "select" | "order" | "limit"))
                .all(|(k, v)| matches(row, k, v))
        })
        .cloned()
        .collect()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

async fn select(
    State(tables): State<Tables>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let tables = tables.lock().unwrap();
    let rows = tables.get(&table).map(Vec::as_slice).unwrap_or_default();
    Ok(Json(filtered(rows, &params)))
}

async fn insert(
    State(tables): State<Tables>,
    Path(table): Path<String>,
    Json(row): Json<Value>,
) -> (StatusCode, Json<Vec<Value>>) {
    let mut tables = tables.lock().unwrap();
    let rows = tables.entry(table).or_default();
    if rows.iter().any(|r| r["id"] == row["id"]) {
        return (StatusCode::CONFLICT, Json(Vec::new()));
    }
    rows.push(row.clone());
    (StatusCode::CREATED, Json(vec![row]))
}

async fn patch(
    State(tables): State<Tables>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    Json(changes): Json<Value>,
) -> Json<Vec<Value>> {
    let mut tables = tables.lock().unwrap();
    let rows = tables.entry(table).or_default();
    let mut updated = Vec::new();
    for row in rows.iter_mut() {
        if params.iter().all(|(k, v)| matches(row, k, v)) {
            if let (Some(target), Some(changes)) = (row.as_object_mut(), changes.as_object()) {
                for (k, v) in changes {
                    target.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
    }
    Json(updated)
}

async fn remove(
    State(tables): State<Tables>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Vec<Value>> {
    let mut tables = tables.lock().unwrap();
    let rows = tables.entry(table).or_default();
    let (gone, kept): (Vec<Value>, Vec<Value>) = rows
        .drain(..)
        .partition(|row| params.iter().all(|(k, v)| matches(row, k, v)));
    *rows = kept;
    Json(gone)
}

async fn spawn_fake_rest(tables: Tables) -> String {
    let app = Router::new()
        .route(
            "/rest/v1/{table}",
            get(select).post(insert).patch(patch).delete(remove),
        )
        .with_state(tables);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

fn product(id: i64, name: &str, stock: i64) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: None,
        category_id: None,
        legacy_category: None,
        sale_price: 100.0,
        cost_price: 60.0,
        stock,
        min_stock: 0,
        is_active: true,
        created_at: 0,
        updated_at: 0,
    }
}

fn sale(id: i64, sold_at: i64) -> Sale {
    Sale {
        id,
        client_id: None,
        customer_name: None,
        lines: vec![SaleLine {
            product_id: Some(1),
            product_name: "Yerba".into(),
            quantity: 1,
            unit_price: 100.0,
            subtotal: 100.0,
        }],
        subtotal: 100.0,
        discount: 0.0,
        total: 100.0,
        payment_method: Default::default(),
        status: SaleStatus::Completed,
        sold_at,
        notes: None,
    }
}

async fn remote(tables: Tables) -> RemoteStore {
    let url = spawn_fake_rest(tables).await;
    RemoteStore::new(&url, API_KEY, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_crud_round_trip() {
    let tables = Tables::default();
    let store = remote(tables.clone()).await;

    let created = Repository::<Product>::create(&store, product(7, "Yerba", 10))
        .await
        .unwrap();
    assert_eq!(created.id, 7);
    assert_eq!(tables.lock().unwrap()["productos"].len(), 1);

    let fetched = Repository::<Product>::get(&store, 7).await.unwrap();
    assert_eq!(fetched.map(|p| p.name), Some("Yerba".to_string()));
    assert!(Repository::<Product>::get(&store, 8).await.unwrap().is_none());

    let updated = Repository::<Product>::update(
        &store,
        7,
        ProductUpdate {
            stock: Some(4),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.stock, 4);
    assert_eq!(updated.name, "Yerba");

    assert!(Repository::<Product>::delete(&store, 7).await.unwrap());
    assert!(!Repository::<Product>::delete(&store, 7).await.unwrap());
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() {
    let store = remote(Tables::default()).await;
    let err = Repository::<Product>::update(&store, 99, ProductUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn test_list_between_filters_by_date() {
    let tables = Tables::default();
    let store = remote(tables).await;
    for (id, sold_at) in [(1, 1_000), (2, 2_000), (3, 3_000)] {
        Repository::<Sale>::create(&store, sale(id, sold_at))
            .await
            .unwrap();
    }

    let sales = Repository::<Sale>::list_between(&store, 1_500, 3_000)
        .await
        .unwrap();
    let ids: Vec<i64> = sales.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn test_duplicate_id_maps_to_duplicate() {
    let store = remote(Tables::default()).await;
    Repository::<Product>::create(&store, product(5, "Arroz", 1))
        .await
        .unwrap();
    let err = Repository::<Product>::create(&store, product(5, "Arroz", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}

#[tokio::test]
async fn test_wrong_key_is_a_remote_error() {
    let url = spawn_fake_rest(Tables::default()).await;
    let store = RemoteStore::new(&url, "wrong", Duration::from_secs(5)).unwrap();
    let err = Repository::<Product>::list(&store).await.unwrap_err();
    assert!(matches!(err, RepoError::Remote { status: 401, .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    let store = RemoteStore::new("http://127.0.0.1:1", API_KEY, Duration::from_secs(2)).unwrap();
    let err = Repository::<Product>::list(&store).await.unwrap_err();
    assert!(matches!(err, RepoError::Unavailable(_)));
}
