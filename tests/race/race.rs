use std::time::Duration;

use async_race::{
    ApiError, DriveScript, EngineCall, FailReason, Outcome, RaceError, RaceResult, RaceState,
    WinnerRecord,
};

use crate::support::Track;

fn finished(result: RaceResult) -> async_race::RaceReport {
    match result {
        RaceResult::Finished(report) => report,
        other => panic!("expected a finished race, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn fastest_car_wins_even_when_it_settles_last() {
    let track = Track::new();
    let fast = track.car("Tesla", 5000, DriveScript::Complete);
    let slow = track.car("Ford", 10000, DriveScript::Complete);
    track.backend.set_drive_latency(fast.id, Duration::from_millis(3000));
    track.backend.set_drive_latency(slow.id, Duration::from_millis(100));

    let report = finished(track.race.start_race(&[fast.clone(), slow.clone()]).await.unwrap());

    let winner = report.winner.unwrap();
    assert_eq!(winner.car_id, fast.id);
    assert_eq!(winner.time, Duration::from_millis(5000));
    assert_eq!(
        report.record,
        Some(WinnerRecord { id: fast.id, wins: 1, time: 5000.0 })
    );
    assert_eq!(track.backend.winner(fast.id), report.record);
    assert_eq!(track.backend.winner(slow.id), None);

    // The slow car settled first.
    let settled: Vec<_> = track.observer.outcomes().iter().map(|o| o.car_id).collect();
    assert_eq!(settled, vec![slow.id, fast.id]);
    assert_eq!(track.race.state(), RaceState::Idle);
}

#[tokio::test(start_paused = true)]
async fn existing_record_is_incremented_with_best_time() {
    let track = Track::new();
    let car = track.car("Tesla", 3500, DriveScript::Complete);
    track.backend.seed_winner(WinnerRecord { id: car.id, wins: 2, time: 4000.0 });

    let report = finished(track.race.start_race(&[car.clone()]).await.unwrap());

    assert_eq!(
        report.record,
        Some(WinnerRecord { id: car.id, wins: 3, time: 3500.0 })
    );
}

#[tokio::test(start_paused = true)]
async fn timed_out_drive_fails_the_car_and_stops_its_engine() {
    let track = Track::new();
    let stuck = track.car("Ford", 2000, DriveScript::Hang);

    let report = finished(track.race.start_race(&[stuck.clone()]).await.unwrap());

    assert_eq!(
        report.outcome_of(stuck.id).map(|o| o.outcome.clone()),
        Some(Outcome::Failed(FailReason::TimedOut))
    );
    assert_eq!(report.winner, None);
    assert!(track.backend.winners().is_empty());
    assert!(track.backend.engine_calls().contains(&EngineCall::Stop(stuck.id)));
    assert_eq!(track.animator.cancelled(), 1);
    assert_eq!(track.observer.resets(), vec![stuck.id]);
}

#[tokio::test(start_paused = true)]
async fn failed_cars_do_not_stop_the_race() {
    let track = Track::new();
    let broken = track.car("Ford", 1000, DriveScript::Breakdown);
    let offline = track.car("Audi", 1500, DriveScript::Fail);
    let dead = track.car("BMW", 1200, DriveScript::Complete);
    track.backend.fail_start(dead.id);
    let finisher = track.car("Honda", 9000, DriveScript::Complete);

    let cars = [broken.clone(), offline.clone(), dead.clone(), finisher.clone()];
    let report = finished(track.race.start_race(&cars).await.unwrap());

    assert_eq!(report.finishers(), 1);
    assert_eq!(report.winner.map(|w| w.car_id), Some(finisher.id));
    assert_eq!(
        report.outcome_of(broken.id).map(|o| o.outcome.clone()),
        Some(Outcome::Failed(FailReason::Breakdown))
    );
    assert!(matches!(
        report.outcome_of(offline.id).map(|o| &o.outcome),
        Some(Outcome::Failed(FailReason::Network(_)))
    ));
    assert!(matches!(
        report.outcome_of(dead.id).map(|o| &o.outcome),
        Some(Outcome::Failed(FailReason::StartFailed(_)))
    ));
    // No drive without a started engine.
    assert!(!track.backend.engine_calls().contains(&EngineCall::Drive(dead.id)));
}

#[tokio::test(start_paused = true)]
async fn no_finisher_means_no_winner_and_no_write() {
    let track = Track::new();
    let a = track.car("Ford", 1000, DriveScript::Breakdown);
    let b = track.car("Audi", 1000, DriveScript::Hang);

    let report = finished(track.race.start_race(&[a, b]).await.unwrap());

    assert_eq!(report.winner, None);
    assert_eq!(report.record, None);
    assert!(track.backend.winners().is_empty());
    assert_eq!(track.race.state(), RaceState::Idle);
}

#[tokio::test(start_paused = true)]
async fn tie_goes_to_first_entrant() {
    let track = Track::new();
    let first = track.car("Ford", 4000, DriveScript::Complete);
    let second = track.car("Audi", 4000, DriveScript::Complete);

    let report = finished(track.race.start_race(&[second.clone(), first.clone()]).await.unwrap());

    assert_eq!(report.winner.map(|w| w.car_id), Some(second.id));
}

#[tokio::test]
async fn empty_race_is_a_no_op() {
    let track = Track::new();

    let result = track.race.start_race(&[]).await.unwrap();

    assert_eq!(result, RaceResult::Empty);
    assert_eq!(track.race.state(), RaceState::Idle);
    assert!(track.backend.engine_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_start_is_rejected_without_side_effects() {
    let track = Track::new();
    let a = track.car("Ford", 1000, DriveScript::Complete);
    let b = track.car("Audi", 2000, DriveScript::Complete);
    track.backend.set_drive_latency(a.id, Duration::from_millis(500));
    track.backend.set_drive_latency(b.id, Duration::from_millis(500));
    let cars = vec![a.clone(), b.clone()];

    let race = track.race.clone();
    let entrants = cars.clone();
    let running = tokio::spawn(async move { race.start_race(&entrants).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(track.race.state(), RaceState::Running);

    let err = track.race.start_race(&cars).await.unwrap_err();
    assert!(matches!(err, RaceError::AlreadyRunning));

    let report = finished(running.await.unwrap().unwrap());
    assert_eq!(report.winner.map(|w| w.car_id), Some(a.id));

    let starts = track
        .backend
        .engine_calls()
        .into_iter()
        .filter(|call| matches!(call, EngineCall::Start(_)))
        .count();
    assert_eq!(starts, 2);
}

#[tokio::test(start_paused = true)]
async fn winner_write_failure_is_surfaced() {
    let track = Track::new();
    let car = track.car("Tesla", 1000, DriveScript::Complete);
    track.backend.fail_winner_writes(true);

    let err = track.race.start_race(&[car.clone()]).await.unwrap_err();

    match err {
        RaceError::Record { winner, source } => {
            assert_eq!(winner.car_id, car.id);
            assert!(matches!(source, ApiError::Network(_)));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(track.race.state(), RaceState::Idle);

    track.backend.fail_winner_writes(false);
    finished(track.race.start_race(&[car.clone()]).await.unwrap());
    assert_eq!(track.backend.winner(car.id).map(|r| r.wins), Some(1));
}

#[tokio::test(start_paused = true)]
async fn animations_last_the_travel_time() {
    let track = Track::new();
    let a = track.car("Ford", 2500, DriveScript::Complete);
    let b = track.car("Audi", 4000, DriveScript::Complete);

    track.race.start_race(&[a, b]).await.unwrap();

    assert_eq!(
        track.animator.started(),
        vec![Duration::from_millis(2500), Duration::from_millis(4000)]
    );
    // Finishers stay at the finish line.
    assert_eq!(track.animator.cancelled(), 0);
    assert!(track.observer.resets().is_empty());
}
