use std::time::Duration;

use async_race::{
    DriveOutcome, DriveScript, DriveStatus, EngineApi, EngineClient, EngineStats, InMemoryBackend,
};

use crate::support::{connect, start_server};

#[tokio::test]
async fn start_reports_engine_stats() {
    let backend = InMemoryBackend::new();
    let car = backend.seed_car("Tesla", "#ffffff");
    backend.script_engine(car.id, EngineStats::new(125.0, 500_000.0), DriveScript::Complete);
    let (client, _) = connect(backend).await;

    let stats = client.start_engine(car.id).await.unwrap();

    assert_eq!(stats, EngineStats::new(125.0, 500_000.0));
    assert_eq!(stats.travel_time(), Duration::from_millis(4000));
    client.stop_engine(car.id).await.unwrap();
}

#[tokio::test]
async fn drive_distinguishes_breakdown_from_success() {
    let backend = InMemoryBackend::new();
    let good = backend.seed_car("Tesla", "#ffffff");
    let bad = backend.seed_car("Ford", "#000000");
    backend.script_engine(bad.id, EngineStats::new(100.0, 500_000.0), DriveScript::Breakdown);
    let (client, _) = connect(backend).await;

    assert_eq!(client.drive(good.id).await.unwrap(), DriveStatus::Completed);
    assert_eq!(client.drive(bad.id).await.unwrap(), DriveStatus::Breakdown);
    assert!(client.drive(99).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn breakdown_answers_500() {
    let backend = InMemoryBackend::new();
    let car = backend.seed_car("Ford", "#000000");
    backend.script_engine(car.id, EngineStats::new(100.0, 500_000.0), DriveScript::Breakdown);
    let base = start_server(backend).await;

    let resp = reqwest::Client::new()
        .patch(format!("{base}/engine?id={}&status=drive", car.id))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
}

#[tokio::test]
async fn unknown_engine_status_is_rejected() {
    let backend = InMemoryBackend::new();
    let car = backend.seed_car("Ford", "#000000");
    let base = start_server(backend).await;

    let resp = reqwest::Client::new()
        .patch(format!("{base}/engine?id={}&status=parked", car.id))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn hanging_drive_times_out_client_side() {
    let backend = InMemoryBackend::new();
    let car = backend.seed_car("Ford", "#000000");
    backend.script_engine(car.id, EngineStats::new(100.0, 500_000.0), DriveScript::Hang);
    let (client, _) = connect(backend).await;
    let engine = EngineClient::new(client, Duration::from_millis(200));

    assert_eq!(engine.drive(car.id).await, DriveOutcome::TimedOut);
}
