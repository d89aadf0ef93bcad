use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{TimeZone, Utc};
use qrledger_client::{ApiClient, ClientError, RegistryService};
use qrledger_model::{
    CreateRecordResponse, ErrorBody, NewQrRecord, QrRecord, QrRecordId,
    RecordPage, RegistryStats, VerifyOutcome, VerifyRequest,
};
use serde_json::json;

#[derive(Clone, Default)]
struct Stub {
    records: Arc<Mutex<Vec<QrRecord>>>,
    paginated: bool,
}

fn record(id: i64, number: &str) -> QrRecord {
    let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
    QrRecord {
        id: QrRecordId(id),
        number: number.into(),
        name: None,
        description: None,
        raw_content: number.into(),
        created_at: at,
        updated_at: at,
    }
}

fn error(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
            status: Some(status.as_u16()),
        }),
    )
        .into_response()
}

async fn list(State(stub): State<Stub>) -> axum::response::Response {
    let records = stub.records.lock().unwrap().clone();
    if stub.paginated {
        Json(RecordPage {
            count: records.len() as u64,
            results: records,
        })
        .into_response()
    } else {
        Json(records).into_response()
    }
}

async fn create(
    State(stub): State<Stub>,
    Json(body): Json<NewQrRecord>,
) -> axum::response::Response {
    let mut records = stub.records.lock().unwrap();
    if records.iter().any(|r| r.number == body.number) {
        let message = format!("number {} already exists", body.number);
        return error(StatusCode::CONFLICT, &message);
    }
    let created = record(records.len() as i64 + 1, &body.number);
    records.push(created.clone());
    (
        StatusCode::CREATED,
        Json(CreateRecordResponse {
            message: "QR code created successfully".into(),
            qr_code: created,
        }),
    )
        .into_response()
}

async fn delete(
    State(stub): State<Stub>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    let mut records = stub.records.lock().unwrap();
    let before = records.len();
    records.retain(|r| r.id != QrRecordId(id));
    if records.len() == before {
        return error(StatusCode::NOT_FOUND, &format!("QR code {id} not found"));
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn verify(
    State(stub): State<Stub>,
    Json(body): Json<VerifyRequest>,
) -> axum::response::Response {
    let records = stub.records.lock().unwrap();
    let outcome = match records.iter().find(|r| r.raw_content == body.content) {
        Some(found) => VerifyOutcome::found(found.clone()),
        None => VerifyOutcome::not_found(body.content),
    };
    Json(outcome).into_response()
}

async fn stats() -> Json<RegistryStats> {
    Json(RegistryStats {
        total_qr_codes: 4,
        created_today: 1,
        created_this_week: 2,
        created_this_month: 3,
    })
}

async fn spawn_stub(stub: Stub) -> ApiClient {
    let app = Router::new()
        .route("/api/qrcodes/", get(list).post(create))
        .route("/api/qrcodes/verify/", post(verify))
        .route("/api/qrcodes/stats/", get(stats))
        .route("/api/qrcodes/{id}/", axum::routing::delete(delete))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ApiClient::new(format!("{addr}/"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn create_then_list_round_trips_records() {
    let client = spawn_stub(Stub::default()).await;

    let created = client
        .create(NewQrRecord::new("1001").with_name("Gate"))
        .await
        .unwrap();
    assert_eq!(created.number, "1001");

    let records = client.list().await.unwrap();
    assert_eq!(records, vec![created]);
}

#[tokio::test]
async fn duplicate_number_surfaces_server_message() {
    let client = spawn_stub(Stub::default()).await;
    client.create(NewQrRecord::new("1001")).await.unwrap();

    let err = client.create(NewQrRecord::new("1001")).await.unwrap_err();
    assert!(matches!(err, ClientError::Duplicate(_)));
    assert_eq!(err.user_message(), "number 1001 already exists");
}

#[tokio::test]
async fn paginated_list_is_accepted() {
    let stub = Stub {
        paginated: true,
        ..Stub::default()
    };
    stub.records.lock().unwrap().push(record(7, "2002"));
    let client = spawn_stub(stub).await;

    assert_eq!(client.list().await.unwrap(), vec![record(7, "2002")]);
}

#[tokio::test]
async fn deleting_unknown_id_is_not_found() {
    let stub = Stub::default();
    stub.records.lock().unwrap().push(record(1, "1001"));
    let client = spawn_stub(stub).await;

    client.delete(QrRecordId(1)).await.unwrap();
    let err = client.delete(QrRecordId(1)).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(message) if message == "QR code 1 not found"));
}

#[tokio::test]
async fn verify_reports_found_and_not_found() {
    let stub = Stub::default();
    stub.records.lock().unwrap().push(record(1, "1001"));
    let client = spawn_stub(stub).await;

    let hit = client.verify("1001").await.unwrap();
    assert!(hit.found);
    assert_eq!(hit.record().map(|r| r.id), Some(QrRecordId(1)));

    let miss = client.verify("nope").await.unwrap();
    assert!(!miss.found);
    assert_eq!(miss.content.as_deref(), Some("nope"));
}

#[tokio::test]
async fn stats_decode_all_counters() {
    let client = spawn_stub(Stub::default()).await;
    let stats = client.stats().await.unwrap();
    assert_eq!(
        serde_json::to_value(stats).unwrap(),
        json!({
            "total_qr_codes": 4,
            "created_today": 1,
            "created_this_week": 2,
            "created_this_month": 3,
        })
    );
}

#[tokio::test]
async fn unreachable_registry_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(addr.to_string(), Duration::from_secs(2)).unwrap();
    let err = client.list().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.user_message(), "Could not reach the registry");
}
