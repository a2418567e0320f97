//! Storage interfaces for entities, with in-memory implementations.

use gtfs_io_model::{GroupedEntity, UniqueEntity};
use rustc_hash::FxHashMap;

pub type EntityIter<'a, T> = Box<dyn Iterator<Item = &'a T> + 'a>;

/// Entities stored as groups sharing a key, e.g. all stop times of a trip.
pub trait EntityCollection<T: GroupedEntity> {
    fn add(&mut self, entity: T);

    fn add_range(&mut self, entities: Vec<T>) {
        for entity in entities {
            self.add(entity);
        }
    }

    fn get(&self) -> EntityIter<'_, T>;

    fn get_by_key<'a>(&'a self, key: &str) -> EntityIter<'a, T>;

    /// Removes every entity of the group. Returns whether any was removed.
    fn remove(&mut self, key: &str) -> bool;

    fn remove_all(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entities addressed by a natural key.
pub trait UniqueEntityCollection<T: UniqueEntity> {
    fn add(&mut self, entity: T);

    fn add_range(&mut self, entities: Vec<T>) {
        for entity in entities {
            self.add(entity);
        }
    }

    fn get(&self) -> EntityIter<'_, T>;

    fn get_by_id(&self, key: &T::Key) -> Option<&T>;

    fn get_at(&self, index: usize) -> Option<&T>;

    /// Replaces the first entity with `key`. Returns false when none exists.
    fn update(&mut self, key: &T::Key, entity: T) -> bool;

    /// Removes every entity with `key`. Returns whether any was removed.
    fn remove(&mut self, key: &T::Key) -> bool;

    /// Same result as `remove` then `add` for each entity in turn: existing
    /// entities sharing a key with an incoming one are dropped, and of
    /// several incoming entities with one key only the last is kept.
    fn replace_range(&mut self, entities: Vec<T>) {
        for entity in entities {
            self.remove(&entity.key());
            self.add(entity);
        }
    }

    fn remove_all(&mut self);

    fn count(&self) -> usize;
}

/// Insertion-ordered list indexed by group key.
#[derive(Debug, Clone)]
pub struct ListCollection<T> {
    entities: Vec<T>,
    index: FxHashMap<String, Vec<usize>>,
}

impl<T> Default for ListCollection<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T: GroupedEntity> ListCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds index entries for positions at or after `start`.
    fn reindex_from(&mut self, start: usize) {
        for entity in &self.entities[start..] {
            if let Some(positions) = self.index.get_mut(entity.group_key()) {
                let keep = positions.partition_point(|&position| position < start);
                positions.truncate(keep);
            }
        }
        for (offset, entity) in self.entities[start..].iter().enumerate() {
            self.index
                .entry(entity.group_key().to_string())
                .or_default()
                .push(start + offset);
        }
    }
}

impl<T: GroupedEntity> EntityCollection<T> for ListCollection<T> {
    fn add(&mut self, entity: T) {
        self.index
            .entry(entity.group_key().to_string())
            .or_default()
            .push(self.entities.len());
        self.entities.push(entity);
    }

    fn get(&self) -> EntityIter<'_, T> {
        Box::new(self.entities.iter())
    }

    fn get_by_key<'a>(&'a self, key: &str) -> EntityIter<'a, T> {
        match self.index.get(key) {
            Some(positions) => Box::new(positions.iter().map(move |&position| &self.entities[position])),
            None => Box::new(std::iter::empty()),
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        let Some(removed) = self.index.remove(key) else {
            return false;
        };
        let start = removed.first().copied().unwrap_or(0);
        let mut position = 0;
        self.entities.retain(|_| {
            let keep = removed.binary_search(&position).is_err();
            position += 1;
            keep
        });
        self.reindex_from(start);
        true
    }

    fn remove_all(&mut self) {
        self.entities.clear();
        self.index.clear();
    }

    fn len(&self) -> usize {
        self.entities.len()
    }
}

/// Insertion-ordered list indexed by natural key. Adding a key that is
/// already present keeps both entities; lookups return the first.
#[derive(Debug, Clone)]
pub struct UniqueCollection<T: UniqueEntity> {
    entities: Vec<T>,
    index: FxHashMap<T::Key, Vec<usize>>,
}

impl<T: UniqueEntity> Default for UniqueCollection<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T: UniqueEntity> UniqueCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn reindex(&mut self) {
        self.index.clear();
        self.reindex_from(0);
    }

    /// Rebuilds index entries for positions at or after `start`.
    fn reindex_from(&mut self, start: usize) {
        for entity in &self.entities[start..] {
            if let Some(positions) = self.index.get_mut(&entity.key()) {
                let keep = positions.partition_point(|&position| position < start);
                positions.truncate(keep);
            }
        }
        for (offset, entity) in self.entities[start..].iter().enumerate() {
            self.index.entry(entity.key()).or_default().push(start + offset);
        }
    }
}

impl<T: UniqueEntity> UniqueEntityCollection<T> for UniqueCollection<T> {
    fn add(&mut self, entity: T) {
        self.index
            .entry(entity.key())
            .or_default()
            .push(self.entities.len());
        self.entities.push(entity);
    }

    fn get(&self) -> EntityIter<'_, T> {
        Box::new(self.entities.iter())
    }

    fn get_by_id(&self, key: &T::Key) -> Option<&T> {
        let position = *self.index.get(key)?.first()?;
        self.entities.get(position)
    }

    fn get_at(&self, index: usize) -> Option<&T> {
        self.entities.get(index)
    }

    fn update(&mut self, key: &T::Key, entity: T) -> bool {
        let Some(&position) = self.index.get(key).and_then(|positions| positions.first()) else {
            return false;
        };
        let rekeyed = entity.key() != *key;
        self.entities[position] = entity;
        if rekeyed {
            self.reindex();
        }
        true
    }

    fn remove(&mut self, key: &T::Key) -> bool {
        let Some(removed) = self.index.remove(key) else {
            return false;
        };
        let start = removed.first().copied().unwrap_or(0);
        let mut position = 0;
        self.entities.retain(|_| {
            let keep = removed.binary_search(&position).is_err();
            position += 1;
            keep
        });
        self.reindex_from(start);
        true
    }

    fn replace_range(&mut self, entities: Vec<T>) {
        let mut last: FxHashMap<T::Key, usize> = FxHashMap::default();
        for (position, entity) in entities.iter().enumerate() {
            last.insert(entity.key(), position);
        }
        let before = self.entities.len();
        self.entities.retain(|entity| !last.contains_key(&entity.key()));
        if self.entities.len() != before {
            self.reindex();
        }
        for (position, entity) in entities.into_iter().enumerate() {
            if last.get(&entity.key()) == Some(&position) {
                self.add(entity);
            }
        }
    }

    fn remove_all(&mut self) {
        self.entities.clear();
        self.index.clear();
    }

    fn count(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtfs_io_model::{Stop, StopTime};

    fn stop(id: &str, name: &str) -> Stop {
        Stop {
            stop_id: id.to_string(),
            stop_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn stop_time(trip: &str, sequence: u32) -> StopTime {
        StopTime {
            trip_id: trip.to_string(),
            stop_sequence: sequence,
            ..Default::default()
        }
    }

    #[test]
    fn unique_lookup_by_id_and_position() {
        let mut stops = UniqueCollection::new();
        stops.add_range(vec![stop("A", "Alpha"), stop("B", "Beta")]);
        assert_eq!(stops.count(), 2);
        assert_eq!(
            stops.get_by_id(&"B".to_string()).and_then(|s| s.stop_name.as_deref()),
            Some("Beta")
        );
        assert_eq!(stops.get_at(0).map(|s| s.stop_id.as_str()), Some("A"));
        assert!(stops.get_at(2).is_none());
        assert!(stops.get_by_id(&"C".to_string()).is_none());
    }

    #[test]
    fn unique_duplicates_are_kept_and_removed_together() {
        let mut stops = UniqueCollection::new();
        stops.add(stop("A", "First"));
        stops.add(stop("B", "Other"));
        stops.add(stop("A", "Second"));
        assert_eq!(stops.count(), 3);
        assert_eq!(
            stops.get_by_id(&"A".to_string()).and_then(|s| s.stop_name.as_deref()),
            Some("First")
        );

        assert!(stops.remove(&"A".to_string()));
        assert_eq!(stops.count(), 1);
        assert!(!stops.remove(&"A".to_string()));
        assert_eq!(stops.get_at(0).map(|s| s.stop_id.as_str()), Some("B"));
    }

    #[test]
    fn unique_update_replaces_entity() {
        let mut stops = UniqueCollection::new();
        stops.add(stop("A", "Old"));
        assert!(stops.update(&"A".to_string(), stop("A", "New")));
        assert!(!stops.update(&"Z".to_string(), stop("Z", "Missing")));
        assert_eq!(
            stops.get_by_id(&"A".to_string()).and_then(|s| s.stop_name.as_deref()),
            Some("New")
        );

        assert!(stops.update(&"A".to_string(), stop("A2", "Renamed")));
        assert!(stops.get_by_id(&"A".to_string()).is_none());
        assert!(stops.get_by_id(&"A2".to_string()).is_some());
    }

    #[test]
    fn unique_removal_keeps_later_positions_indexed() {
        let mut stops = UniqueCollection::new();
        stops.add_range(vec![
            stop("A", "Alpha"),
            stop("B", "Beta"),
            stop("C", "Gamma"),
            stop("B", "Beta again"),
            stop("D", "Delta"),
        ]);
        assert!(stops.remove(&"B".to_string()));
        assert_eq!(stops.count(), 3);
        for (position, id) in ["A", "C", "D"].into_iter().enumerate() {
            assert_eq!(stops.get_at(position).map(|s| s.stop_id.as_str()), Some(id));
            assert_eq!(
                stops.get_by_id(&id.to_string()).map(|s| s.stop_id.as_str()),
                Some(id)
            );
        }
        assert!(stops.get_by_id(&"B".to_string()).is_none());
    }

    #[test]
    fn replace_range_matches_remove_then_add() {
        let initial = vec![stop("A", "Alpha"), stop("B", "Beta"), stop("C", "Gamma")];
        let incoming = vec![stop("B", "Beta 2"), stop("D", "Delta"), stop("B", "Beta 3")];

        let mut batched = UniqueCollection::new();
        batched.add_range(initial.clone());
        batched.replace_range(incoming.clone());

        let mut sequential = UniqueCollection::new();
        sequential.add_range(initial);
        for entity in incoming {
            sequential.remove(&entity.stop_id);
            sequential.add(entity);
        }

        let ids = |stops: &UniqueCollection<Stop>| -> Vec<(String, Option<String>)> {
            stops
                .get()
                .map(|s| (s.stop_id.clone(), s.stop_name.clone()))
                .collect()
        };
        assert_eq!(ids(&batched), ids(&sequential));
        assert_eq!(batched.count(), 4);
        assert_eq!(
            batched.get_by_id(&"B".to_string()).and_then(|s| s.stop_name.as_deref()),
            Some("Beta 3")
        );
        assert_eq!(batched.get_at(3).map(|s| s.stop_id.as_str()), Some("B"));
    }

    #[test]
    fn grouped_lookup_and_removal() {
        let mut stop_times = ListCollection::new();
        stop_times.add(stop_time("T1", 1));
        stop_times.add(stop_time("T2", 1));
        stop_times.add(stop_time("T1", 2));
        assert_eq!(stop_times.len(), 3);

        let sequences: Vec<u32> = stop_times.get_by_key("T1").map(|st| st.stop_sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
        assert_eq!(stop_times.get_by_key("T9").count(), 0);

        stop_times.add(stop_time("T3", 1));
        assert!(stop_times.remove("T1"));
        assert!(!stop_times.remove("T1"));
        assert_eq!(stop_times.len(), 2);
        assert_eq!(stop_times.get_by_key("T2").count(), 1);
        assert_eq!(
            stop_times.get_by_key("T3").map(|st| st.trip_id.as_str()).collect::<Vec<_>>(),
            vec!["T3"]
        );

        stop_times.remove_all();
        assert!(stop_times.is_empty());
    }
}
