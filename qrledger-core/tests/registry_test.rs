use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use qrledger_core::{InMemoryQrCodeRepository, Registry, RegistryError};
use qrledger_model::{ModelError, NewQrRecord, QrRecordId};

fn registry() -> Registry {
    Registry::new(Arc::new(InMemoryQrCodeRepository::new()))
}

#[tokio::test]
async fn create_stores_number_as_raw_content() {
    let registry = registry();
    let record = registry
        .create(NewQrRecord::new(" 1001 ").with_name("Gate A"))
        .await
        .unwrap();

    assert_eq!(record.number, "1001");
    assert_eq!(record.raw_content, "1001");
    assert_eq!(record.name.as_deref(), Some("Gate A"));
    assert_eq!(record.created_at, record.updated_at);
}

#[tokio::test]
async fn create_rejects_blank_and_duplicate_numbers() {
    let registry = registry();

    let err = registry.create(NewQrRecord::new("  ")).await.unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Validation(ModelError::MissingField("number"))
    ));

    registry.create(NewQrRecord::new("7")).await.unwrap();
    let err = registry.create(NewQrRecord::new("7 ")).await.unwrap_err();
    assert_eq!(err.to_string(), "number 7 already exists");
}

#[tokio::test]
async fn verify_prefers_exact_raw_content() {
    let registry = registry();
    let exact = registry.create(NewQrRecord::new("A-55")).await.unwrap();
    registry.create(NewQrRecord::new("55")).await.unwrap();

    let outcome = registry.verify("A-55").await.unwrap();
    assert!(outcome.found);
    assert_eq!(outcome.record().map(|r| r.id), Some(exact.id));
}

#[tokio::test]
async fn verify_falls_back_to_extracted_number() {
    let registry = registry();
    let record = registry.create(NewQrRecord::new("98765")).await.unwrap();

    let outcome = registry
        .verify("https://example.org/item?id=12&serial=98765")
        .await
        .unwrap();
    assert!(outcome.found);
    assert_eq!(outcome.record().map(|r| r.id), Some(record.id));
}

#[tokio::test]
async fn verify_echoes_unknown_content() {
    let registry = registry();
    let outcome = registry.verify("  hello world ").await.unwrap();
    assert!(!outcome.found);
    assert_eq!(outcome.content.as_deref(), Some("hello world"));
    assert!(outcome.qr_code.is_none());
}

#[tokio::test]
async fn verify_rejects_blank_content() {
    let err = registry().verify(" \n ").await.unwrap_err();
    assert!(matches!(err, RegistryError::EmptyContent));
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let registry = registry();
    let err = registry.delete(QrRecordId(404)).await.unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(QrRecordId(404))));
}

#[tokio::test]
async fn stats_bucket_by_utc_midnights() {
    let registry = registry();
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let created = [
        ("today", now - Duration::hours(1)),
        ("yesterday", now - Duration::days(1)),
        ("week-edge", Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap()),
        ("before-week", Utc.with_ymd_and_hms(2024, 6, 7, 23, 59, 0).unwrap()),
        ("month-edge", Utc.with_ymd_and_hms(2024, 5, 16, 0, 0, 0).unwrap()),
        ("old", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
    ];
    for (number, at) in created {
        registry
            .create_at(NewQrRecord::new(number), at)
            .await
            .unwrap();
    }

    let stats = registry.stats_at(now).await.unwrap();
    assert_eq!(stats.total_qr_codes, 6);
    assert_eq!(stats.created_today, 1);
    assert_eq!(stats.created_this_week, 3);
    assert_eq!(stats.created_this_month, 5);
}
