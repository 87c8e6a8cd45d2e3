use std::time::Duration;

use async_race::{DriveScript, EngineCall, FailReason, Outcome, RaceError, RaceState};

use crate::support::Track;

#[tokio::test(start_paused = true)]
async fn single_car_drives_without_recording() {
    let track = Track::new();
    let car = track.car("Ford", 3000, DriveScript::Complete);

    let outcome = track.race.drive_car(&car).await.unwrap();

    assert_eq!(outcome.outcome, Outcome::Finished(Duration::from_millis(3000)));
    assert!(track.backend.winners().is_empty());
    assert_eq!(track.race.state(), RaceState::Idle);
}

#[tokio::test(start_paused = true)]
async fn single_car_breakdown_is_reported() {
    let track = Track::new();
    let car = track.car("Ford", 3000, DriveScript::Breakdown);

    let outcome = track.race.drive_car(&car).await.unwrap();

    assert_eq!(outcome.outcome, Outcome::Failed(FailReason::Breakdown));
    assert!(track.backend.engine_calls().contains(&EngineCall::Stop(car.id)));
}

#[tokio::test(start_paused = true)]
async fn race_waits_for_single_car_runs() {
    let track = Track::new();
    let solo = track.car("Ford", 3000, DriveScript::Complete);
    track.backend.set_drive_latency(solo.id, Duration::from_millis(500));

    let race = track.race.clone();
    let car = solo.clone();
    let driving = tokio::spawn(async move { race.drive_car(&car).await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let err = track.race.start_race(&[solo.clone()]).await.unwrap_err();
    assert!(matches!(err, RaceError::AlreadyRunning));

    driving.await.unwrap().unwrap();
    assert!(track.race.start_race(&[solo]).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn single_car_controls_are_locked_during_a_race() {
    let track = Track::new();
    let car = track.car("Ford", 1000, DriveScript::Hang);
    let cars = vec![car.clone()];

    let race = track.race.clone();
    let running = tokio::spawn(async move { race.start_race(&cars).await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(matches!(track.race.drive_car(&car).await, Err(RaceError::AlreadyRunning)));
    assert!(matches!(track.race.stop_car(car.id).await, Err(RaceError::AlreadyRunning)));

    track.race.reset_race().await;
    running.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn stop_car_returns_it_to_the_start() {
    let track = Track::new();
    let car = track.car("Ford", 1000, DriveScript::Complete);
    track.race.drive_car(&car).await.unwrap();

    track.race.stop_car(car.id).await.unwrap();

    assert!(track.backend.engine_calls().contains(&EngineCall::Stop(car.id)));
    assert_eq!(track.observer.resets(), vec![car.id]);
}
