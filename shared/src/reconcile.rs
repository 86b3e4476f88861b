//! Keyed diff of a live snapshot against the markers currently on the map.
//!
//! The [`MarkerSet`] is the only owner of marker handles. A pass creates
//! markers for unseen trips, moves existing ones in place, and destroys the
//! ones whose trip left the feed. Surface failures are collected per trip and
//! never abort the pass.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::live::{TrainPosition, TripKey};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("invalid coordinates ({lat}, {lon})")]
    InvalidCoordinates { lat: f64, lon: f64 },
    #[error("map rejected marker: {0}")]
    Rejected(String),
}

impl SurfaceError {
    pub fn invalid_position(entity: &TrainPosition) -> Self {
        Self::InvalidCoordinates {
            lat: entity.lat,
            lon: entity.lon,
        }
    }
}

/// The rendering side of a marker set. Borrowed for one pass, never owned.
pub trait MarkerSurface {
    type Marker;

    fn create_marker(&mut self, entity: &TrainPosition) -> Result<Self::Marker, SurfaceError>;

    /// Move `marker` and refresh its popup without recreating it.
    fn update_marker(
        &mut self,
        marker: &mut Self::Marker,
        entity: &TrainPosition,
    ) -> Result<(), SurfaceError>;

    fn destroy_marker(&mut self, marker: Self::Marker);
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityFailure {
    pub key: TripKey,
    pub error: SurfaceError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub failures: Vec<EntityFailure>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct MarkerSet<M> {
    markers: HashMap<TripKey, M>,
}

impl<M> Default for MarkerSet<M> {
    fn default() -> Self {
        Self {
            markers: HashMap::new(),
        }
    }
}

impl<M> MarkerSet<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn contains(&self, key: &TripKey) -> bool {
        self.markers.contains_key(key)
    }

    pub fn get(&self, key: &TripKey) -> Option<&M> {
        self.markers.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TripKey> {
        self.markers.keys()
    }

    /// Bring the set in line with `snapshot`.
    ///
    /// Stale keys are destroyed first, then every snapshot entity is updated
    /// or created. A repeated key in a malformed feed updates the marker made
    /// for its first occurrence, so the later record wins.
    pub fn reconcile<S>(&mut self, surface: &mut S, snapshot: &[TrainPosition]) -> ReconcileReport
    where
        S: MarkerSurface<Marker = M>,
    {
        let mut report = ReconcileReport::default();

        let active: HashSet<&TripKey> = snapshot.iter().map(|entity| &entity.trip_id).collect();
        let stale: Vec<TripKey> = self
            .markers
            .keys()
            .filter(|key| !active.contains(key))
            .cloned()
            .collect();
        for key in stale {
            if let Some(marker) = self.markers.remove(&key) {
                surface.destroy_marker(marker);
                report.removed += 1;
            }
        }

        for entity in snapshot {
            match self.markers.get_mut(&entity.trip_id) {
                Some(marker) => match surface.update_marker(marker, entity) {
                    Ok(()) => report.updated += 1,
                    Err(error) => report.failures.push(EntityFailure {
                        key: entity.trip_id.clone(),
                        error,
                    }),
                },
                None => match surface.create_marker(entity) {
                    Ok(marker) => {
                        self.markers.insert(entity.trip_id.clone(), marker);
                        report.created += 1;
                    }
                    Err(error) => report.failures.push(EntityFailure {
                        key: entity.trip_id.clone(),
                        error,
                    }),
                },
            }
        }

        report
    }

    /// Destroy every marker on `surface`, e.g. before handing the map to a new
    /// poller. Returns how many were removed.
    pub fn clear<S>(&mut self, surface: &mut S) -> usize
    where
        S: MarkerSurface<Marker = M>,
    {
        self.reconcile(surface, &[]).removed
    }
}

/// Functional form of [`MarkerSet::reconcile`]: consumes the previous set and
/// returns the new one.
pub fn reconcile<S>(
    mut previous: MarkerSet<S::Marker>,
    surface: &mut S,
    snapshot: &[TrainPosition],
) -> (MarkerSet<S::Marker>, ReconcileReport)
where
    S: MarkerSurface,
{
    let report = previous.reconcile(surface, snapshot);
    (previous, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestMarker {
        id: u32,
        lat: f64,
        lon: f64,
        popup: String,
    }

    #[derive(Default)]
    struct TestSurface {
        next_id: u32,
        live: HashSet<u32>,
        destroyed: Vec<u32>,
        created: u32,
    }

    impl MarkerSurface for TestSurface {
        type Marker = TestMarker;

        fn create_marker(&mut self, entity: &TrainPosition) -> Result<TestMarker, SurfaceError> {
            if !entity.has_valid_position() {
                return Err(SurfaceError::invalid_position(entity));
            }
            self.next_id += 1;
            self.created += 1;
            self.live.insert(self.next_id);
            Ok(TestMarker {
                id: self.next_id,
                lat: entity.lat,
                lon: entity.lon,
                popup: entity.popup_html(),
            })
        }

        fn update_marker(
            &mut self,
            marker: &mut TestMarker,
            entity: &TrainPosition,
        ) -> Result<(), SurfaceError> {
            if !entity.has_valid_position() {
                return Err(SurfaceError::invalid_position(entity));
            }
            marker.lat = entity.lat;
            marker.lon = entity.lon;
            marker.popup = entity.popup_html();
            Ok(())
        }

        fn destroy_marker(&mut self, marker: TestMarker) {
            self.live.remove(&marker.id);
            self.destroyed.push(marker.id);
        }
    }

    fn train(id: i64, lat: f64, lon: f64) -> TrainPosition {
        TrainPosition {
            trip_id: TripKey::Id(id),
            lat,
            lon,
            train_number: Some(format!("{id}")),
            previous_station: Some("A".into()),
            next_station: Some("B".into()),
            speed_ratio: None,
        }
    }

    fn sorted_keys<M>(set: &MarkerSet<M>) -> Vec<TripKey> {
        let mut keys: Vec<TripKey> = set.keys().cloned().collect();
        keys.sort_by_key(|k| k.to_string());
        keys
    }

    #[test]
    fn key_set_follows_latest_snapshot() {
        let mut surface = TestSurface::default();
        let first = vec![train(1, 50.0, 30.0), train(2, 51.0, 31.0), train(3, 49.0, 29.0)];
        let second = vec![train(3, 49.5, 29.5), train(4, 48.0, 28.0)];

        let (set, _) = reconcile(MarkerSet::new(), &mut surface, &first);
        let (set, report) = reconcile(set, &mut surface, &second);

        assert_eq!(sorted_keys(&set), vec![TripKey::Id(3), TripKey::Id(4)]);
        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.removed, 2);
        assert_eq!(surface.live.len(), 2);
    }

    #[test]
    fn same_snapshot_twice_creates_nothing_new() {
        let mut surface = TestSurface::default();
        let snapshot = vec![train(1, 50.0, 30.0), train(2, 51.0, 31.0)];
        let mut set = MarkerSet::new();

        set.reconcile(&mut surface, &snapshot);
        let report = set.reconcile(&mut surface, &snapshot);

        assert_eq!(surface.created, 2);
        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 2);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn moved_marker_keeps_identity() {
        let mut surface = TestSurface::default();
        let mut set = MarkerSet::new();
        set.reconcile(&mut surface, &[train(7, 50.0, 30.0)]);
        let id_before = set.get(&TripKey::Id(7)).map(|m| m.id);

        let mut moved = train(7, 50.25, 30.75);
        moved.next_station = Some("C".into());
        set.reconcile(&mut surface, &[moved]);

        let marker = set.get(&TripKey::Id(7)).unwrap();
        assert_eq!(Some(marker.id), id_before);
        assert_eq!((marker.lat, marker.lon), (50.25, 30.75));
        assert!(marker.popup.ends_with("A ➔ C"));
        assert!(surface.destroyed.is_empty());
    }

    #[test]
    fn departed_train_is_destroyed() {
        let mut surface = TestSurface::default();
        let mut set = MarkerSet::new();
        set.reconcile(&mut surface, &[train(1, 50.0, 30.0), train(2, 51.0, 31.0)]);
        let first_id = set.get(&TripKey::Id(1)).unwrap().id;

        let report = set.reconcile(&mut surface, &[train(2, 51.5, 31.5)]);

        assert_eq!(set.len(), 1);
        let remaining = set.get(&TripKey::Id(2)).unwrap();
        assert_eq!((remaining.lat, remaining.lon), (51.5, 31.5));
        assert_eq!(surface.destroyed, vec![first_id]);
        assert_eq!(report.removed, 1);
    }

    #[test]
    fn empty_snapshot_clears_everything() {
        let mut surface = TestSurface::default();
        let mut set = MarkerSet::new();
        set.reconcile(&mut surface, &[train(1, 50.0, 30.0), train(2, 51.0, 31.0)]);

        let report = set.reconcile(&mut surface, &[]);

        assert!(set.is_empty());
        assert!(surface.live.is_empty());
        assert_eq!(report.removed, 2);
    }

    #[test]
    fn clear_destroys_markers_of_a_replaced_set() {
        let mut surface = TestSurface::default();
        let mut old = MarkerSet::new();
        old.reconcile(&mut surface, &[train(1, 50.0, 30.0), train(2, 51.0, 31.0)]);

        assert_eq!(old.clear(&mut surface), 2);
        assert!(old.is_empty());
        assert!(surface.live.is_empty());
        assert_eq!(old.clear(&mut surface), 0);

        let mut fresh = MarkerSet::new();
        fresh.reconcile(&mut surface, &[train(1, 50.0, 30.0)]);
        assert_eq!(surface.live.len(), 1);
    }

    #[test]
    fn bad_coordinates_do_not_abort_the_pass() {
        let mut surface = TestSurface::default();
        let mut set = MarkerSet::new();
        set.reconcile(&mut surface, &[train(1, 50.0, 30.0)]);

        let report = set.reconcile(
            &mut surface,
            &[train(1, f64::NAN, 30.0), train(2, 200.0, 0.0), train(3, 48.0, 28.0)],
        );

        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].key, TripKey::Id(1));
        assert!(matches!(
            report.failures[1].error,
            SurfaceError::InvalidCoordinates { .. }
        ));
        // failed update keeps the old marker where it was; failed create leaves no key
        assert_eq!(set.get(&TripKey::Id(1)).map(|m| m.lat), Some(50.0));
        assert!(!set.contains(&TripKey::Id(2)));
        assert!(set.contains(&TripKey::Id(3)));
    }

    #[test]
    fn repeated_key_keeps_one_marker_with_last_record() {
        let mut surface = TestSurface::default();
        let mut set = MarkerSet::new();
        let report = set.reconcile(&mut surface, &[train(5, 50.0, 30.0), train(5, 50.5, 30.5)]);

        assert_eq!(set.len(), 1);
        assert_eq!(surface.created, 1);
        assert_eq!((report.created, report.updated), (1, 1));
        assert_eq!(set.get(&TripKey::Id(5)).map(|m| m.lat), Some(50.5));
    }

    #[test]
    fn result_is_independent_of_snapshot_order() {
        let forward = vec![train(1, 50.0, 30.0), train(2, 51.0, 31.0), train(3, 52.0, 32.0)];
        let mut backward = forward.clone();
        backward.reverse();

        let mut surface_a = TestSurface::default();
        let mut set_a = MarkerSet::new();
        set_a.reconcile(&mut surface_a, &[train(9, 1.0, 1.0), train(2, 0.0, 0.0)]);
        set_a.reconcile(&mut surface_a, &forward);

        let mut surface_b = TestSurface::default();
        let mut set_b = MarkerSet::new();
        set_b.reconcile(&mut surface_b, &[train(2, 0.0, 0.0), train(9, 1.0, 1.0)]);
        set_b.reconcile(&mut surface_b, &backward);

        assert_eq!(sorted_keys(&set_a), sorted_keys(&set_b));
        for key in set_a.keys() {
            let a = set_a.get(key).unwrap();
            let b = set_b.get(key).unwrap();
            assert_eq!((a.lat, a.lon), (b.lat, b.lon));
        }
    }
}
