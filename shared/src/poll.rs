//! Bookkeeping for the live-position poller: at most one fetch in flight,
//! stale responses discarded by generation, and a failure streak that feeds
//! the backoff in [`PollConfig`](crate::config::PollConfig).

use crate::api::FetchError;
use crate::config::PollConfig;
use crate::live::LiveSnapshot;
use crate::reconcile::{MarkerSet, MarkerSurface, ReconcileReport};

/// Issued by [`PollState::begin_tick`]; hand it back to [`PollState::finish`].
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct PollTicket {
    generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    generation: u64,
    in_flight: bool,
    consecutive_failures: u32,
    stopped: bool,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// `None` while a previous tick is still in flight or after [`stop`](Self::stop).
    pub fn begin_tick(&mut self) -> Option<PollTicket> {
        if self.stopped || self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(PollTicket {
            generation: self.generation,
        })
    }

    /// Close out a tick. Returns whether its response may be applied: `false`
    /// when the ticket predates a [`stop`](Self::stop) or the fetch failed.
    pub fn finish(&mut self, ticket: PollTicket, succeeded: bool) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.in_flight = false;
        if succeeded {
            self.consecutive_failures = 0;
        } else {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        }
        succeeded && !self.stopped
    }

    /// Invalidate every outstanding ticket and refuse new ones.
    pub fn stop(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = false;
        self.stopped = true;
    }

    pub fn next_delay_ms(&self, config: &PollConfig) -> u32 {
        config.delay_after_failures(self.consecutive_failures)
    }
}

/// What became of one finished tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Applied(ReconcileReport),
    /// The fetch failed; markers are left exactly as they were.
    Failed(FetchError),
    /// The ticket was invalidated by a stop before the response came back.
    Discarded,
}

/// Close out `ticket` with the fetch `result`, reconciling `markers` only when
/// the response is a fresh success.
pub fn apply_tick<S: MarkerSurface>(
    state: &mut PollState,
    markers: &mut MarkerSet<S::Marker>,
    surface: &mut S,
    ticket: PollTicket,
    result: Result<LiveSnapshot, FetchError>,
) -> TickOutcome {
    match result {
        Ok(snapshot) => {
            if state.finish(ticket, true) {
                TickOutcome::Applied(markers.reconcile(surface, &snapshot))
            } else {
                TickOutcome::Discarded
            }
        }
        Err(error) => {
            let current = ticket.generation == state.generation;
            let _ = state.finish(ticket, false);
            if current {
                TickOutcome::Failed(error)
            } else {
                TickOutcome::Discarded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::{TrainPosition, TripKey};
    use crate::reconcile::SurfaceError;

    /// Markers are plain positions; every call is counted.
    #[derive(Default)]
    struct CountingSurface {
        calls: usize,
    }

    impl MarkerSurface for CountingSurface {
        type Marker = (f64, f64);

        fn create_marker(&mut self, entity: &TrainPosition) -> Result<(f64, f64), SurfaceError> {
            self.calls += 1;
            Ok((entity.lat, entity.lon))
        }

        fn update_marker(
            &mut self,
            marker: &mut (f64, f64),
            entity: &TrainPosition,
        ) -> Result<(), SurfaceError> {
            self.calls += 1;
            *marker = (entity.lat, entity.lon);
            Ok(())
        }

        fn destroy_marker(&mut self, _marker: (f64, f64)) {
            self.calls += 1;
        }
    }

    fn train(id: i64, lat: f64) -> TrainPosition {
        TrainPosition {
            trip_id: TripKey::Id(id),
            lat,
            lon: 30.0,
            train_number: None,
            previous_station: None,
            next_station: None,
            speed_ratio: None,
        }
    }

    fn seeded() -> (PollState, MarkerSet<(f64, f64)>, CountingSurface) {
        let mut state = PollState::new();
        let mut markers = MarkerSet::new();
        let mut surface = CountingSurface::default();
        let ticket = state.begin_tick().unwrap();
        let outcome = apply_tick(
            &mut state,
            &mut markers,
            &mut surface,
            ticket,
            Ok(vec![train(1, 50.0), train(2, 51.0)]),
        );
        assert!(matches!(outcome, TickOutcome::Applied(ref r) if r.created == 2));
        (state, markers, surface)
    }

    #[test]
    fn failed_fetch_leaves_markers_untouched() {
        let (mut state, mut markers, mut surface) = seeded();
        let calls = surface.calls;

        let ticket = state.begin_tick().unwrap();
        let outcome = apply_tick(
            &mut state,
            &mut markers,
            &mut surface,
            ticket,
            Err(FetchError::Status(503)),
        );

        assert_eq!(outcome, TickOutcome::Failed(FetchError::Status(503)));
        assert_eq!(surface.calls, calls);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers.get(&TripKey::Id(1)), Some(&(50.0, 30.0)));
        assert_eq!(state.consecutive_failures(), 1);
    }

    #[test]
    fn response_arriving_after_stop_is_not_drawn() {
        let (mut state, mut markers, mut surface) = seeded();
        let calls = surface.calls;

        let ticket = state.begin_tick().unwrap();
        state.stop();
        let outcome = apply_tick(
            &mut state,
            &mut markers,
            &mut surface,
            ticket,
            Ok(vec![train(3, 52.0)]),
        );

        assert_eq!(outcome, TickOutcome::Discarded);
        assert_eq!(surface.calls, calls);
        assert!(markers.contains(&TripKey::Id(1)));
        assert!(!markers.contains(&TripKey::Id(3)));
    }

    #[test]
    fn fresh_snapshot_is_reconciled() {
        let (mut state, mut markers, mut surface) = seeded();

        let ticket = state.begin_tick().unwrap();
        let outcome = apply_tick(
            &mut state,
            &mut markers,
            &mut surface,
            ticket,
            Ok(vec![train(2, 51.5)]),
        );

        let TickOutcome::Applied(report) = outcome else {
            panic!("expected an applied tick, got {outcome:?}");
        };
        assert_eq!((report.updated, report.removed), (1, 1));
        assert_eq!(markers.get(&TripKey::Id(2)), Some(&(51.5, 30.0)));
        assert!(!state.in_flight());
    }

    #[test]
    fn overlapping_ticks_are_refused() {
        let mut state = PollState::new();
        let ticket = state.begin_tick().unwrap();
        assert!(state.begin_tick().is_none());
        assert!(state.finish(ticket, true));
        assert!(state.begin_tick().is_some());
    }

    #[test]
    fn response_after_stop_is_discarded() {
        let mut state = PollState::new();
        let ticket = state.begin_tick().unwrap();
        state.stop();
        assert!(!state.finish(ticket, true));
        assert!(state.begin_tick().is_none());
        assert!(state.is_stopped());
    }

    #[test]
    fn failed_tick_is_not_applied_and_counts() {
        let mut state = PollState::new();
        let ticket = state.begin_tick().unwrap();
        assert!(!state.finish(ticket, false));
        assert_eq!(state.consecutive_failures(), 1);
        assert!(!state.in_flight());

        let ticket = state.begin_tick().unwrap();
        assert!(state.finish(ticket, true));
        assert_eq!(state.consecutive_failures(), 0);
    }

    #[test]
    fn delay_follows_failure_streak() {
        let config = PollConfig {
            initial_delay_ms: 500,
            interval_ms: 1_000,
            max_backoff_ms: 3_000,
        };
        let mut state = PollState::new();
        assert_eq!(state.next_delay_ms(&config), 1_000);
        for _ in 0..3 {
            let ticket = state.begin_tick().unwrap();
            let _ = state.finish(ticket, false);
        }
        assert_eq!(state.next_delay_ms(&config), 3_000);
    }
}
