use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use dealer_visits::domain::types::AgencyId;
use dealer_visits::repository::DatasetReader;
use dealer_visits::repository::errors::LoadError;

mod common;

fn agency(id: &str) -> AgencyId {
    AgencyId::new(id).unwrap()
}

#[tokio::test]
async fn test_load_agency_dataset() {
    let data = common::TestData::new();
    let repo = data.repository();

    let dataset = repo.load_clientes(&agency("monterrey"), Some(500)).await.unwrap();

    assert_eq!(dataset.clientes.len(), 4);
    let ids: Vec<i32> = dataset.clientes.iter().map(|c| c.id.get()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    let vento = &dataset.clientes[1];
    assert_eq!(vento.modelo, "Vento");
    assert_eq!(vento.paquete, None);
    assert_eq!(vento.ultima_visita, NaiveDate::from_ymd_opt(2024, 2, 15));
    assert_eq!(vento.dias_sin_venir, 200);

    assert_eq!(dataset.metadata.models, vec!["Jetta", "Tiguan", "Vento"]);
    assert_eq!(dataset.metadata.years, vec![2022, 2021, 2019, 2018]);
    assert_eq!(dataset.metadata.packages, vec!["Oro", "Plata", "null"]);
    assert_eq!(dataset.metadata.advisors, vec!["Carla", "Luis"]);
}

#[tokio::test]
async fn test_second_load_hits_cache() {
    let data = common::TestData::new();
    let repo = data.repository();

    let first = repo.load_clientes(&agency("monterrey"), None).await.unwrap();
    // a changed file is not picked up until the cache is cleared
    data.write("monterrey.csv", common::SALTILLO_CSV.as_bytes());
    let second = repo.load_clientes(&agency("monterrey"), None).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));

    repo.clear_cache();
    assert!(repo.current().is_none());

    let reloaded = repo.load_clientes(&agency("monterrey"), None).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &reloaded));
    assert_eq!(reloaded.clientes.len(), 2);
}

#[tokio::test]
async fn test_switching_agency_replaces_cache() {
    let data = common::TestData::new();
    let repo = data.repository();

    repo.load_clientes(&agency("monterrey"), None).await.unwrap();
    let saltillo = repo.load_clientes(&agency("saltillo"), None).await.unwrap();

    assert_eq!(saltillo.clientes[0].nombre_factura, "José Peña");
    assert_eq!(saltillo.clientes[1].nombre_factura, "Nuñez Hermanos");

    let current = repo.current().unwrap();
    assert_eq!(current.agency.as_str(), "saltillo");
    assert!(repo.cache().get("monterrey.csv").is_none());
}

#[tokio::test]
async fn test_missing_file_fails_after_retries_and_clears_cache() {
    let data = common::TestData::new();
    let repo = data.repository();

    repo.load_clientes(&agency("monterrey"), None).await.unwrap();
    let err = repo
        .load_clientes(&agency("apodaca"), None)
        .await
        .unwrap_err();

    match err {
        LoadError::Failed { agency, file, .. } => {
            assert_eq!(agency, "apodaca");
            assert_eq!(file, "apodaca.csv");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(repo.current().is_none());
}

#[tokio::test]
async fn test_html_body_is_rejected() {
    let data = common::TestData::new();
    data.write(
        "apodaca.csv",
        b"<!DOCTYPE html><html><head><title>Index</title></head><body></body></html>",
    );
    let repo = data.repository();

    let err = repo
        .load_clientes(&agency("apodaca"), None)
        .await
        .unwrap_err();

    match err {
        LoadError::Failed { reason, .. } => assert!(reason.contains("HTML")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_header_only_file_is_empty() {
    let data = common::TestData::new();
    let header = common::MONTERREY_CSV.lines().next().unwrap();
    data.write("apodaca.csv", format!("{header}\n").as_bytes());
    let repo = data.repository();

    let err = repo
        .load_clientes(&agency("apodaca"), None)
        .await
        .unwrap_err();

    match err {
        LoadError::Failed { reason, .. } => assert!(reason.starts_with("Empty dataset")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_agency() {
    let data = common::TestData::new();
    let repo = data.repository();

    let err = repo
        .load_clientes(&agency("guadalupe"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::UnknownAgency(id) if id == "guadalupe"));
}

#[tokio::test]
async fn test_concurrent_loads_of_same_agency_both_succeed() {
    let data = common::TestData::new();
    let repo = data.repository();
    let monterrey = agency("monterrey");

    let (first, second) = tokio::join!(
        repo.load_clientes(&monterrey, None),
        repo.load_clientes(&monterrey, None)
    );

    assert_eq!(first.unwrap().clientes.len(), 4);
    assert_eq!(second.unwrap().clientes.len(), 4);
    assert_eq!(repo.current().unwrap().agency.as_str(), "monterrey");
}

#[tokio::test]
async fn test_stale_failure_keeps_newer_agency_cached() {
    let data = common::TestData::new();
    // the missing file keeps retrying well after saltillo is stored
    let repo = data.repository_with_delay(50);

    let apodaca_agency = agency("apodaca");
    let saltillo_agency = agency("saltillo");
    let (apodaca, saltillo) = tokio::join!(
        repo.load_clientes(&apodaca_agency, None),
        repo.load_clientes(&saltillo_agency, None)
    );

    assert!(matches!(apodaca, Err(LoadError::Failed { .. })));
    assert_eq!(saltillo.unwrap().clientes.len(), 2);
    assert_eq!(repo.current().unwrap().agency.as_str(), "saltillo");
}

#[tokio::test]
async fn test_transient_failure_recovers_on_retry() {
    let data = common::TestData::new();
    let repo = data.repository_with_delay(200);

    let path = data.path().join("apodaca.csv");
    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        tokio::fs::write(path, common::MONTERREY_CSV).await.unwrap();
    });

    let started = Instant::now();
    let dataset = repo.load_clientes(&agency("apodaca"), None).await.unwrap();
    writer.await.unwrap();

    assert_eq!(dataset.clientes.len(), 4);
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_permanent_failure_gives_up_after_three_attempts() {
    let data = common::TestData::new();
    let repo = data.repository_with_delay(150);

    let started = Instant::now();
    let err = repo
        .load_clientes(&agency("apodaca"), None)
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, LoadError::Failed { .. }));
    // two pauses between three attempts, never a third
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(450));
}
