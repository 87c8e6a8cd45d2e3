use std::time::Duration;

use async_race::{
    App, AppEvent, Config, DriveScript, EngineStats, HttpBackend, InMemoryBackend, Intent,
    NoopAnimator, PageStep, RaceResult, SortField,
};

use crate::support::start_server;

async fn app(backend: InMemoryBackend) -> App<HttpBackend, NoopAnimator> {
    let base = start_server(backend).await;
    let config = Config::default()
        .with_base_url(base)
        .with_drive_timeout(Duration::from_millis(500));
    let client = HttpBackend::new(&config).unwrap();
    let mut app = App::new(config, client, NoopAnimator);
    app.load().await.unwrap();
    app
}

#[tokio::test]
async fn full_race_over_http() {
    let backend = InMemoryBackend::new();
    let tesla = backend.seed_car("Tesla", "#ff0000");
    let ford = backend.seed_car("Ford", "#0000ff");
    let audi = backend.seed_car("Audi", "#00ff00");
    backend.script_engine(tesla.id, EngineStats::new(200.0, 500_000.0), DriveScript::Complete);
    backend.script_engine(ford.id, EngineStats::new(100.0, 500_000.0), DriveScript::Complete);
    backend.script_engine(audi.id, EngineStats::new(250.0, 500_000.0), DriveScript::Breakdown);
    backend.set_drive_latency(tesla.id, Duration::from_millis(80));

    let mut app = app(backend.clone()).await;
    let summary = match app.dispatch(Intent::StartRace).await.unwrap() {
        AppEvent::RaceCompleted(summary) => summary,
        other => panic!("unexpected event {:?}", other),
    };

    assert_eq!(summary.announcement.as_deref(), Some("Tesla won in 2.50s!"));
    match &summary.result {
        RaceResult::Finished(report) => assert_eq!(report.finishers(), 2),
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(backend.winner(tesla.id).map(|w| w.wins), Some(1));
    assert_eq!(app.winners().rows()[0].car.as_ref(), Some(&tesla));

    assert_eq!(app.dispatch(Intent::ResetRace).await.unwrap(), AppEvent::RaceReset);
}

#[tokio::test]
async fn deleting_a_winner_car_cleans_the_table() {
    let backend = InMemoryBackend::new();
    let car = backend.seed_car("Tesla", "#ff0000");
    backend.seed_winner(async_race::WinnerRecord { id: car.id, wins: 2, time: 3000.0 });

    let mut app = app(backend.clone()).await;
    assert_eq!(app.winners().total(), 1);

    app.dispatch(Intent::DeleteCar(car.id)).await.unwrap();

    assert_eq!(app.garage().total(), 0);
    assert_eq!(app.winners().total(), 0);
    assert!(backend.winners().is_empty());
}

#[tokio::test]
async fn paging_and_sorting_through_intents() {
    let backend = InMemoryBackend::new();
    let mut app = app(backend.clone()).await;

    app.dispatch(Intent::GenerateCars).await.unwrap();
    assert_eq!(app.garage().total(), 100);
    assert_eq!(app.garage().cars().len(), 7);

    let event = app.dispatch(Intent::GaragePage(PageStep::Next)).await.unwrap();
    assert_eq!(event, AppEvent::GarageChanged);
    assert_eq!(app.garage().page(), 2);

    let event = app.dispatch(Intent::SortWinners(SortField::Time)).await.unwrap();
    assert_eq!(event, AppEvent::WinnersChanged);
    assert_eq!(app.winners().total(), 0);
}
