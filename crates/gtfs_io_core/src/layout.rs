use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub const AGENCY_FILE: &str = "agency";
pub const STOPS_FILE: &str = "stops";
pub const ROUTES_FILE: &str = "routes";
pub const TRIPS_FILE: &str = "trips";
pub const STOP_TIMES_FILE: &str = "stop_times";
pub const CALENDAR_FILE: &str = "calendar";
pub const CALENDAR_DATES_FILE: &str = "calendar_dates";
pub const FARE_ATTRIBUTES_FILE: &str = "fare_attributes";
pub const FARE_RULES_FILE: &str = "fare_rules";
pub const SHAPES_FILE: &str = "shapes";
pub const FREQUENCIES_FILE: &str = "frequencies";
pub const TRANSFERS_FILE: &str = "transfers";
pub const LEVELS_FILE: &str = "levels";
pub const PATHWAYS_FILE: &str = "pathways";
pub const FEED_INFO_FILE: &str = "feed_info";
pub const ATTRIBUTIONS_FILE: &str = "attributions";

/// Every table the engine knows, in the order the writer emits them.
pub const GTFS_FILE_NAMES: &[&str] = &[
    AGENCY_FILE,
    STOPS_FILE,
    ROUTES_FILE,
    TRIPS_FILE,
    STOP_TIMES_FILE,
    CALENDAR_FILE,
    CALENDAR_DATES_FILE,
    FARE_ATTRIBUTES_FILE,
    FARE_RULES_FILE,
    SHAPES_FILE,
    FREQUENCIES_FILE,
    TRANSFERS_FILE,
    LEVELS_FILE,
    PATHWAYS_FILE,
    FEED_INFO_FILE,
    ATTRIBUTIONS_FILE,
];

/// Structural rules of a feed: which tables must exist and which tables must
/// be loaded before others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedLayout {
    /// Checked in order; the first absent one is reported.
    pub required_files: Vec<String>,
    /// At least one member of every set must be present.
    pub required_file_sets: Vec<BTreeSet<String>>,
    /// Table name to the tables it references.
    pub dependencies: BTreeMap<String, Vec<String>>,
}

impl FeedLayout {
    pub fn dependencies_of(&self, table: &str) -> &[String] {
        self.dependencies
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for FeedLayout {
    fn default() -> Self {
        let required_files = [
            AGENCY_FILE,
            STOPS_FILE,
            ROUTES_FILE,
            TRIPS_FILE,
            STOP_TIMES_FILE,
        ]
        .iter()
        .map(|name| name.to_string())
        .collect();

        let required_file_sets = vec![[CALENDAR_FILE, CALENDAR_DATES_FILE]
            .iter()
            .map(|name| name.to_string())
            .collect()];

        let dependencies = [
            (FARE_RULES_FILE, ROUTES_FILE),
            (ROUTES_FILE, AGENCY_FILE),
            (TRIPS_FILE, ROUTES_FILE),
            (STOP_TIMES_FILE, TRIPS_FILE),
            (FREQUENCIES_FILE, TRIPS_FILE),
            (TRANSFERS_FILE, STOPS_FILE),
        ]
        .iter()
        .map(|(table, dependency)| (table.to_string(), vec![dependency.to_string()]))
        .collect();

        Self {
            required_files,
            required_file_sets,
            dependencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_dependencies() {
        let layout = FeedLayout::default();
        assert_eq!(layout.dependencies_of(STOP_TIMES_FILE), [TRIPS_FILE]);
        assert!(layout.dependencies_of(AGENCY_FILE).is_empty());
        assert_eq!(
            layout.required_files,
            [AGENCY_FILE, STOPS_FILE, ROUTES_FILE, TRIPS_FILE, STOP_TIMES_FILE]
        );
        assert!(!layout.required_files.iter().any(|file| file == CALENDAR_FILE));
    }
}
