use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::join_all;
use log::{debug, info};
use tokio::sync::watch;

use super::outcome::{pick_winner, CarOutcome, FailReason};
use super::{RaceError, RaceObserver, RaceReport, RaceResult, RaceState, SilentObserver};
use crate::animation::{AnimationDriver, AnimationHandle};
use crate::backend::{EngineApi, WinnersApi};
use crate::engine::{DriveOutcome, EngineClient};
use crate::ledger::WinnerLedger;
use crate::model::{Car, CarId};

/// Runs races over a set of cars and hands the winner to the ledger.
///
/// All mutable race bookkeeping lives behind one mutex owned here; callers
/// only see it through `state()` and the results of the async operations.
pub struct RaceOrchestrator<E, W, A> {
    engine: EngineClient<E>,
    ledger: Arc<WinnerLedger<W>>,
    animator: A,
    observer: Arc<dyn RaceObserver>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    state: RaceState,
    /// Sequence number of the latest race.
    race: u64,
    entrants: Vec<CarId>,
    /// Cars whose engines may be running: stopped by the next reset.
    touched: BTreeSet<CarId>,
    animations: HashMap<CarId, AnimationHandle>,
    abort: Option<watch::Sender<bool>>,
    solo_runs: usize,
}

#[derive(Debug, Clone, Copy)]
enum Run {
    Race(u64),
    Solo,
}

/// Counts a single-car run for as long as it is alive.
struct SoloRun<'a> {
    inner: &'a Mutex<Inner>,
}

impl Drop for SoloRun<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.solo_runs = inner.solo_runs.saturating_sub(1);
    }
}

/// Moves a finished race back to `Idle` when dropped, also when the
/// `start_race` future is dropped while the win is being recorded.
struct Finishing<'a> {
    inner: &'a Mutex<Inner>,
    race: u64,
}

impl Drop for Finishing<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.race == self.race && inner.state == RaceState::Finished {
            inner.state = RaceState::Idle;
        }
    }
}

impl<E, W, A> RaceOrchestrator<E, W, A>
where
    E: EngineApi,
    W: WinnersApi,
    A: AnimationDriver,
{
    pub fn new(engine: EngineClient<E>, ledger: Arc<WinnerLedger<W>>, animator: A) -> Self {
        Self {
            engine,
            ledger,
            animator,
            observer: Arc::new(SilentObserver),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RaceObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> RaceState {
        self.lock().state
    }

    /// Cars entered in the latest race, in entrant order.
    pub fn entrants(&self) -> Vec<CarId> {
        self.lock().entrants.clone()
    }

    pub fn engine(&self) -> &EngineClient<E> {
        &self.engine
    }

    pub fn ledger(&self) -> &WinnerLedger<W> {
        &self.ledger
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Race every car in `cars` and record the winner.
    ///
    /// Rejected with `AlreadyRunning`, before any backend call, while another
    /// race or single-car run is in progress. An empty list is a no-op.
    pub async fn start_race(&self, cars: &[Car]) -> Result<RaceResult, RaceError> {
        let (race, mut abort) = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            if inner.state != RaceState::Idle || inner.solo_runs > 0 {
                debug!("race rejected: state {:?}, {} solo run(s)", inner.state, inner.solo_runs);
                return Err(RaceError::AlreadyRunning);
            }
            if cars.is_empty() {
                return Ok(RaceResult::Empty);
            }

            inner.race += 1;
            inner.state = RaceState::Running;
            inner.entrants = cars.iter().map(|car| car.id).collect();
            inner.touched.extend(inner.entrants.iter().copied());
            let (abort_tx, abort_rx) = watch::channel(false);
            inner.abort = Some(abort_tx);
            (inner.race, abort_rx)
        };
        info!("race {} started with {} car(s)", race, cars.len());

        let attempts = join_all(
            cars.iter()
                .map(|car| self.attempt(car.id, Run::Race(race))),
        );
        let outcomes = tokio::select! {
            outcomes = attempts => outcomes,
            _ = wait_for_abort(&mut abort) => {
                info!("race {} aborted", race);
                return Ok(RaceResult::Aborted);
            }
        };

        let winner = pick_winner(&outcomes);
        {
            let mut inner = self.lock();
            if inner.race != race || inner.state != RaceState::Running {
                info!("race {} aborted after the last car settled", race);
                return Ok(RaceResult::Aborted);
            }
            inner.state = RaceState::Finished;
            inner.abort = None;
        }
        let _finishing = Finishing {
            inner: &self.inner,
            race,
        };

        let record = match winner {
            Some(winner) => {
                info!(
                    "race {} won by car {} in {} ms",
                    race,
                    winner.car_id,
                    winner.time.as_millis()
                );
                let recorded = self.ledger.record_win(winner.car_id, winner.time).await;
                Some(recorded.map_err(|source| RaceError::Record { winner, source })?)
            }
            None => {
                info!("race {} finished without a winner", race);
                None
            }
        };

        Ok(RaceResult::Finished(RaceReport {
            outcomes,
            winner,
            record,
        }))
    }

    /// Abort a running race, put every car back on the start line and stop
    /// every engine started since the last reset. Always ends `Idle`, also
    /// when a finished race is still waiting on the ledger.
    pub async fn reset_race(&self) {
        let (cars, animations) = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            if inner.state == RaceState::Running {
                inner.state = RaceState::Aborted;
                if let Some(abort) = inner.abort.take() {
                    let _ = abort.send(true);
                }
            }
            let animations: Vec<AnimationHandle> =
                inner.animations.drain().map(|(_, handle)| handle).collect();
            (std::mem::take(&mut inner.touched), animations)
        };

        for animation in animations {
            animation.cancel();
        }
        for car_id in &cars {
            self.observer.on_progress(*car_id, 0.0);
        }
        join_all(cars.iter().map(|car_id| self.engine.stop_engine(*car_id))).await;

        let mut inner = self.lock();
        if matches!(inner.state, RaceState::Aborted | RaceState::Finished) {
            inner.state = RaceState::Idle;
        }
        info!("reset {} car(s)", cars.len());
    }

    /// Start and drive one car outside a race. Never touches the ledger.
    pub async fn drive_car(&self, car: &Car) -> Result<CarOutcome, RaceError> {
        let _solo = {
            let mut inner = self.lock();
            if inner.state != RaceState::Idle {
                return Err(RaceError::AlreadyRunning);
            }
            inner.solo_runs += 1;
            inner.touched.insert(car.id);
            SoloRun { inner: &self.inner }
        };
        Ok(self.attempt(car.id, Run::Solo).await)
    }

    /// Stop one car and put it back on the start line.
    pub async fn stop_car(&self, car_id: CarId) -> Result<(), RaceError> {
        {
            let mut inner = self.lock();
            if inner.state == RaceState::Running {
                return Err(RaceError::AlreadyRunning);
            }
            inner.touched.remove(&car_id);
        }
        self.halt(car_id).await;
        Ok(())
    }

    async fn attempt(&self, car_id: CarId, run: Run) -> CarOutcome {
        let stats = match self.engine.start_engine(car_id).await {
            Ok(stats) => stats,
            Err(err) => {
                let outcome = CarOutcome::failed(car_id, FailReason::StartFailed(err.to_string()));
                self.settle(&outcome, run).await;
                return outcome;
            }
        };

        let time = stats.travel_time();
        self.animate(car_id, time, run);

        let outcome = match self.engine.drive(car_id).await {
            DriveOutcome::Completed => CarOutcome::finished(car_id, time),
            DriveOutcome::Breakdown => CarOutcome::failed(car_id, FailReason::Breakdown),
            DriveOutcome::TimedOut => CarOutcome::failed(car_id, FailReason::TimedOut),
            DriveOutcome::Failed(err) => {
                CarOutcome::failed(car_id, FailReason::Network(err.to_string()))
            }
        };
        self.settle(&outcome, run).await;
        outcome
    }

    async fn settle(&self, outcome: &CarOutcome, run: Run) {
        if !self.is_current(run) {
            return;
        }
        debug!("car {} settled: {:?}", outcome.car_id, outcome.outcome);
        if !outcome.is_finished() {
            self.halt(outcome.car_id).await;
        }
        self.observer.on_outcome(outcome);
    }

    fn animate(&self, car_id: CarId, duration: Duration, run: Run) {
        if !self.is_current(run) {
            return;
        }
        let observer = self.observer.clone();
        let handle = self.animator.start(
            duration,
            Box::new(move |progress| observer.on_progress(car_id, progress)),
        );

        let stale = {
            let mut guard = self.lock();
            if current(&guard, run) {
                guard.animations.insert(car_id, handle)
            } else {
                Some(handle)
            }
        };
        if let Some(stale) = stale {
            stale.cancel();
        }
    }

    /// Cancel the car's animation, reset its position and stop its engine.
    async fn halt(&self, car_id: CarId) {
        let animation = self.lock().animations.remove(&car_id);
        if let Some(animation) = animation {
            animation.cancel();
        }
        self.observer.on_progress(car_id, 0.0);
        self.engine.stop_engine(car_id).await;
    }

    fn is_current(&self, run: Run) -> bool {
        current(&self.lock(), run)
    }
}

fn current(inner: &Inner, run: Run) -> bool {
    match run {
        Run::Race(race) => inner.race == race && inner.state == RaceState::Running,
        Run::Solo => true,
    }
}

/// Resolves once the race is aborted; never resolves otherwise.
async fn wait_for_abort(abort: &mut watch::Receiver<bool>) {
    let closed = abort.wait_for(|aborted| *aborted).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
