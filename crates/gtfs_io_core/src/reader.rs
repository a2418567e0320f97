use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::codec::{self, CodecError};
use crate::config::ReaderConfig;
use crate::feed::Feed;
use crate::layout::*;
use crate::progress::{NoOpProgressHandler, ProgressHandler};
use crate::schema::{EntitySchema, FieldCodec, Schemas};
use crate::source::{SourceError, SourceFile};

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("required file {0} is missing")]
    RequiredFileMissing(String),
    #[error("at least one of {0:?} is required")]
    RequiredFileSetMissing(Vec<String>),
    #[error("{entity}: required field {field} is missing from the header")]
    RequiredFieldMissing { entity: &'static str, field: String },
    #[error("{entity} row {row}: cannot parse '{value}' in {field}: {source}")]
    FieldParse {
        entity: &'static str,
        field: String,
        value: String,
        /// 1-based data row, header excluded.
        row: usize,
        #[source]
        source: CodecError,
    },
    #[error("cannot order files by dependencies, unresolved: {0}")]
    DependencyResolution(String),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Turns table sources into feed entities.
pub struct Reader {
    config: ReaderConfig,
    schemas: Schemas,
    progress: Box<dyn ProgressHandler>,
}

impl Reader {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            schemas: Schemas::default(),
            progress: Box::new(NoOpProgressHandler),
        }
    }

    pub fn strict() -> Self {
        Self::new(ReaderConfig::strict())
    }

    pub fn lenient() -> Self {
        Self::new(ReaderConfig::lenient())
    }

    pub fn with_schemas(mut self, schemas: Schemas) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn schemas_mut(&mut self) -> &mut Schemas {
        &mut self.schemas
    }

    /// Reads every source into `feed`, each file after the files it depends on.
    pub fn read(&self, feed: &mut Feed, sources: &[Box<dyn SourceFile>]) -> Result<(), ReadError> {
        let present: FxHashSet<&str> = sources.iter().map(|source| source.name()).collect();
        if self.config.strict {
            self.check_required_files(&present)?;
        }

        self.progress.set_total_files(sources.len());
        let pending: Vec<&dyn SourceFile> = sources.iter().map(|source| source.as_ref()).collect();
        self.read_in_dependency_order(feed, pending, &present)
    }

    /// Reads one table together with the tables it depends on, dependencies
    /// first. Required files are not checked.
    pub fn read_file(
        &self,
        feed: &mut Feed,
        sources: &[Box<dyn SourceFile>],
        name: &str,
    ) -> Result<(), ReadError> {
        let mut closure: FxHashSet<String> = FxHashSet::default();
        let mut queue = VecDeque::from([name.to_string()]);
        while let Some(table) = queue.pop_front() {
            if closure.contains(&table) {
                continue;
            }
            for dependency in self.config.layout.dependencies_of(&table) {
                queue.push_back(dependency.clone());
            }
            closure.insert(table);
        }

        let present: FxHashSet<&str> = sources.iter().map(|source| source.name()).collect();
        let pending: Vec<&dyn SourceFile> = sources
            .iter()
            .map(|source| source.as_ref())
            .filter(|source| closure.contains(source.name()))
            .collect();
        for table in closure.iter().filter(|table| !present.contains(table.as_str())) {
            debug!(file = table.as_str(), "no source for table");
        }
        self.read_in_dependency_order(feed, pending, &present)
    }

    pub fn read_feed(&self, sources: &[Box<dyn SourceFile>]) -> Result<Feed, ReadError> {
        let mut feed = Feed::new();
        self.read(&mut feed, sources)?;
        Ok(feed)
    }

    /// Repeatedly loads the first pending source whose dependencies are all
    /// loaded or absent from `present`.
    fn read_in_dependency_order(
        &self,
        feed: &mut Feed,
        mut pending: Vec<&dyn SourceFile>,
        present: &FxHashSet<&str>,
    ) -> Result<(), ReadError> {
        let mut loaded: FxHashSet<String> = FxHashSet::default();
        while !pending.is_empty() {
            let next = pending.iter().position(|source| {
                self.config
                    .layout
                    .dependencies_of(source.name())
                    .iter()
                    .all(|dependency| {
                        loaded.contains(dependency) || !present.contains(dependency.as_str())
                    })
            });
            let Some(position) = next else {
                let unresolved: Vec<&str> = pending.iter().map(|source| source.name()).collect();
                return Err(ReadError::DependencyResolution(unresolved.join(", ")));
            };
            let source = pending.remove(position);
            debug!(file = source.name(), remaining = pending.len(), "selected file");
            self.read_source(feed, source)?;
            loaded.insert(source.name().to_string());
        }
        Ok(())
    }

    fn check_required_files(&self, present: &FxHashSet<&str>) -> Result<(), ReadError> {
        let layout = &self.config.layout;
        if let Some(missing) = layout
            .required_files
            .iter()
            .find(|file| !present.contains(file.as_str()))
        {
            return Err(ReadError::RequiredFileMissing(missing.clone()));
        }
        for set in &layout.required_file_sets {
            if !set.iter().any(|file| present.contains(file.as_str())) {
                return Err(ReadError::RequiredFileSetMissing(set.iter().cloned().collect()));
            }
        }
        Ok(())
    }

    fn read_source(&self, feed: &mut Feed, source: &dyn SourceFile) -> Result<(), ReadError> {
        let name = source.name();
        self.progress.on_start_file_load(name);
        let schemas = &self.schemas;
        let rows = match name {
            AGENCY_FILE => self.read_table(&schemas.agency, source, |e| feed.agencies.add(e))?,
            STOPS_FILE => self.read_table(&schemas.stops, source, |e| feed.stops.add(e))?,
            ROUTES_FILE => self.read_table(&schemas.routes, source, |e| feed.routes.add(e))?,
            TRIPS_FILE => self.read_table(&schemas.trips, source, |e| feed.trips.add(e))?,
            STOP_TIMES_FILE => {
                self.read_table(&schemas.stop_times, source, |e| feed.stop_times.add(e))?
            }
            CALENDAR_FILE => {
                self.read_table(&schemas.calendar, source, |e| feed.calendars.add(e))?
            }
            CALENDAR_DATES_FILE => self.read_table(&schemas.calendar_dates, source, |e| {
                feed.calendar_dates.add(e)
            })?,
            FARE_ATTRIBUTES_FILE => self.read_table(&schemas.fare_attributes, source, |e| {
                feed.fare_attributes.add(e)
            })?,
            FARE_RULES_FILE => {
                self.read_table(&schemas.fare_rules, source, |e| feed.fare_rules.add(e))?
            }
            SHAPES_FILE => self.read_table(&schemas.shapes, source, |e| feed.shapes.add(e))?,
            FREQUENCIES_FILE => {
                self.read_table(&schemas.frequencies, source, |e| feed.frequencies.add(e))?
            }
            TRANSFERS_FILE => {
                self.read_table(&schemas.transfers, source, |e| feed.transfers.add(e))?
            }
            LEVELS_FILE => self.read_table(&schemas.levels, source, |e| feed.levels.add(e))?,
            PATHWAYS_FILE => {
                self.read_table(&schemas.pathways, source, |e| feed.pathways.add(e))?
            }
            FEED_INFO_FILE => {
                self.read_table(&schemas.feed_info, source, |e| feed.feed_info = Some(e))?
            }
            ATTRIBUTIONS_FILE => self.read_table(&schemas.attributions, source, |e| {
                feed.attributions.add(e)
            })?,
            other => {
                warn!(file = other, "skipping unknown table");
                0
            }
        };
        self.progress.on_finish_file_load(name, rows);
        Ok(())
    }

    /// Parses every data row of `source` and hands the entities to `sink`.
    /// Returns the number of rows read.
    fn read_table<E: Default>(
        &self,
        schema: &EntitySchema<E>,
        source: &dyn SourceFile,
        mut sink: impl FnMut(E),
    ) -> Result<usize, ReadError> {
        let parser = &self.config.parser;
        let mut rows = source.rows()?;
        let Some(header) = rows.next().transpose()? else {
            debug!(file = schema.file_name, "empty file");
            return Ok(0);
        };

        let columns: Vec<Option<&FieldCodec<E>>> = header
            .iter()
            .map(|cell| {
                let cleaned = clean_header(cell, parser.strip_quotes);
                schema.field(schema.resolve(&cleaned))
            })
            .collect();

        if self.config.strict {
            for required in &schema.required {
                if !columns.iter().flatten().any(|field| field.name == *required) {
                    return Err(ReadError::RequiredFieldMissing {
                        entity: schema.entity_name,
                        field: required.to_string(),
                    });
                }
            }
        }

        let mut buffered = schema.natural_order.map(|_| Vec::new());
        let mut count = 0;
        for (index, row) in rows.enumerate() {
            let row = row?;
            let mut entity = E::default();
            for (value, field) in row.iter().zip(&columns) {
                let Some(field) = field else {
                    continue;
                };
                (field.parse)(&mut entity, value, parser).map_err(|source| {
                    ReadError::FieldParse {
                        entity: schema.entity_name,
                        field: field.name.to_string(),
                        value: value.clone(),
                        row: index + 1,
                        source,
                    }
                })?;
            }
            match buffered.as_mut() {
                Some(buffer) => buffer.push(entity),
                None => sink(entity),
            }
            count += 1;
        }

        if let (Some(mut buffer), Some(order)) = (buffered, schema.natural_order) {
            buffer.sort_by(order);
            buffer.into_iter().for_each(&mut sink);
        }

        info!(file = schema.file_name, rows = count, "read file");
        Ok(count)
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::strict()
    }
}

fn clean_header(cell: &str, strip_quotes: bool) -> String {
    let trimmed = cell.trim();
    if strip_quotes {
        codec::strip_quotes(trimmed).trim().to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use gtfs_io_model::TimeOfDay;
    use std::sync::{Arc, Mutex};

    fn text(name: &str, content: &str) -> Box<dyn SourceFile> {
        Box::new(MemorySource::from_text(name, content))
    }

    fn minimal_sources() -> Vec<Box<dyn SourceFile>> {
        vec![
            text(
                "stop_times",
                "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
                 T1,06:10:00,06:10:00,S2,2\n\
                 T1,06:00:00,06:00:00,S1,1\n",
            ),
            text(
                "trips",
                "route_id,service_id,trip_id\nR1,WK,T1\n",
            ),
            text(
                "routes",
                "route_id,route_short_name,route_long_name,route_type\nR1,1,Main,3\n",
            ),
            text(
                "agency",
                "agency_name,agency_url,agency_timezone\nDemo,http://example.com,UTC\n",
            ),
            text(
                "stops",
                "stop_id,stop_name,stop_lat,stop_lon\nS1,One,1.0,2.0\nS2,Two,1.5,2.5\n",
            ),
            text(
                "calendar_dates",
                "service_id,date,exception_type\nWK,20240101,1\n",
            ),
        ]
    }

    /// Records the order files are loaded in.
    struct RecordingProgress {
        files: Arc<Mutex<Vec<String>>>,
    }

    impl ProgressHandler for RecordingProgress {
        fn on_start_file_load(&self, file: &str) {
            if let Ok(mut files) = self.files.lock() {
                files.push(file.to_string());
            }
        }

        fn on_finish_file_load(&self, _file: &str, _rows: usize) {}
    }

    #[test]
    fn reads_dependencies_first() {
        let files = Arc::new(Mutex::new(Vec::new()));
        let reader = Reader::strict().with_progress(Box::new(RecordingProgress {
            files: Arc::clone(&files),
        }));
        let feed = reader.read_feed(&minimal_sources()).expect("feed should read");

        let order = files.lock().expect("lock").clone();
        let position = |name: &str| order.iter().position(|file| file == name).expect("loaded");
        assert!(position("agency") < position("routes"));
        assert!(position("routes") < position("trips"));
        assert!(position("trips") < position("stop_times"));

        assert_eq!(feed.agencies.count(), 1);
        assert_eq!(feed.stop_times.len(), 2);
    }

    #[test]
    fn sorts_stop_times_by_sequence() {
        let feed = Reader::strict()
            .read_feed(&minimal_sources())
            .expect("feed should read");
        let first = feed.stop_times.get().next().expect("stop time");
        assert_eq!(first.stop_sequence, 1);
        assert_eq!(first.arrival_time, Some(TimeOfDay::from_total_seconds(6 * 3600)));
    }

    #[test]
    fn strict_requires_files() {
        let mut sources = minimal_sources();
        sources.retain(|source| source.name() != "stops");
        let err = Reader::strict().read_feed(&sources).unwrap_err();
        assert!(matches!(err, ReadError::RequiredFileMissing(file) if file == "stops"));

        let mut sources = minimal_sources();
        sources.retain(|source| source.name() != "calendar_dates");
        let err = Reader::strict().read_feed(&sources).unwrap_err();
        assert!(matches!(err, ReadError::RequiredFileSetMissing(_)));

        let feed = Reader::lenient().read_feed(&sources).expect("lenient read");
        assert_eq!(feed.calendar_dates.len(), 0);
    }

    #[test]
    fn reports_first_missing_file_in_listed_order() {
        let mut sources = minimal_sources();
        sources.retain(|source| source.name() != "routes" && source.name() != "stops");
        let err = Reader::strict().read_feed(&sources).unwrap_err();
        assert!(matches!(err, ReadError::RequiredFileMissing(file) if file == "stops"));

        let mut config = ReaderConfig::strict();
        config.layout.required_files = vec!["trips".to_string(), "routes".to_string()];
        let mut sources = minimal_sources();
        sources.retain(|source| source.name() != "routes" && source.name() != "trips");
        let err = Reader::new(config).read_feed(&sources).unwrap_err();
        assert!(matches!(err, ReadError::RequiredFileMissing(file) if file == "trips"));
    }

    #[test]
    fn strict_requires_header_fields() {
        let mut sources = minimal_sources();
        sources.retain(|source| source.name() != "agency");
        sources.push(text("agency", "agency_name,agency_url\nDemo,http://example.com\n"));
        let err = Reader::strict().read_feed(&sources).unwrap_err();
        assert!(matches!(
            err,
            ReadError::RequiredFieldMissing { entity: "Agency", ref field } if field == "agency_timezone"
        ));
    }

    #[test]
    fn reports_field_parse_errors_with_row() {
        let sources = vec![text(
            "calendar",
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
             WK,1,1,1,1,1,0,0,20240101,20241231\n\
             WE,0,0,0,0,0,yes,1,20240101,20241231\n",
        )];
        let err = Reader::lenient().read_feed(&sources).unwrap_err();
        match err {
            ReadError::FieldParse {
                entity,
                field,
                value,
                row,
                source,
            } => {
                assert_eq!(entity, "Calendar");
                assert_eq!(field, "saturday");
                assert_eq!(value, "yes");
                assert_eq!(row, 2);
                assert!(matches!(source, CodecError::InvalidBoolean(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn detects_dependency_cycles() {
        let mut config = ReaderConfig::lenient();
        config
            .layout
            .dependencies
            .insert("agency".to_string(), vec!["trips".to_string()]);
        let err = Reader::new(config)
            .read_feed(&minimal_sources())
            .unwrap_err();
        assert!(matches!(err, ReadError::DependencyResolution(_)));
    }

    #[test]
    fn read_file_pulls_in_dependencies() {
        let mut feed = Feed::new();
        Reader::strict()
            .read_file(&mut feed, &minimal_sources(), "trips")
            .expect("read trips");
        assert_eq!(feed.trips.count(), 1);
        assert_eq!(feed.routes.count(), 1);
        assert_eq!(feed.agencies.count(), 1);
        assert_eq!(feed.stops.count(), 0);
        assert_eq!(feed.stop_times.len(), 0);
    }

    #[test]
    fn read_file_orders_shared_dependencies() {
        let mut config = ReaderConfig::strict();
        config.layout.dependencies = [
            ("trips", vec!["stops", "routes"]),
            ("routes", vec!["stops"]),
        ]
        .into_iter()
        .map(|(table, deps)| {
            (table.to_string(), deps.into_iter().map(String::from).collect::<Vec<_>>())
        })
        .collect();

        let files = Arc::new(Mutex::new(Vec::new()));
        let reader = Reader::new(config).with_progress(Box::new(RecordingProgress {
            files: Arc::clone(&files),
        }));
        let mut feed = Feed::new();
        reader
            .read_file(&mut feed, &minimal_sources(), "trips")
            .expect("read trips");

        let order = files.lock().expect("lock").clone();
        assert_eq!(order, vec!["stops", "routes", "trips"]);
        assert_eq!(feed.stops.count(), 2);
        assert_eq!(feed.agencies.count(), 0);
    }

    #[test]
    fn read_file_detects_dependency_cycles() {
        let mut config = ReaderConfig::strict();
        config
            .layout
            .dependencies
            .insert("agency".to_string(), vec!["trips".to_string()]);
        let mut feed = Feed::new();
        let err = Reader::new(config)
            .read_file(&mut feed, &minimal_sources(), "trips")
            .unwrap_err();
        assert!(matches!(err, ReadError::DependencyResolution(_)));
    }

    #[test]
    fn lenient_strips_quotes_and_skips_bad_doubles() {
        let sources = vec![text(
            "stops",
            "\"stop_id\",\"stop_name\",stop_lat,stop_lon\nS1,\"\"\"Quoted\"\"\",north,2.0\n",
        )];
        let feed = Reader::lenient().read_feed(&sources).expect("lenient read");
        let stop = feed.stops.get_at(0).expect("stop");
        assert_eq!(stop.stop_id, "S1");
        assert_eq!(stop.stop_name.as_deref(), Some("Quoted"));
        assert_eq!(stop.stop_lat, None);
        assert_eq!(stop.stop_lon, Some(2.0));

        let err = Reader::new(ReaderConfig {
            strict: false,
            ..ReaderConfig::strict()
        })
        .read_feed(&sources)
        .unwrap_err();
        assert!(matches!(err, ReadError::FieldParse { ref field, .. } if field == "stop_lat"));
    }

    #[test]
    fn ignores_unknown_tables_and_columns() {
        let sources = vec![
            text("translations", "table_name\nstops\n"),
            text(
                "levels",
                "level_id,level_index,level_color\nL0,0,red\nL1,-1.5,blue\n",
            ),
        ];
        let feed = Reader::lenient().read_feed(&sources).expect("lenient read");
        assert_eq!(feed.levels.count(), 2);
        assert_eq!(
            feed.levels.get_by_id(&"L1".to_string()).map(|level| level.level_index),
            Some(-1.5)
        );
    }

    #[test]
    fn resolves_header_aliases() {
        let sources = vec![text(
            "stop_times",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence,drop_off_time\n\
             T1,25:00:00,25:00:00,S1,1,1\n",
        )];
        let feed = Reader::lenient().read_feed(&sources).expect("lenient read");
        let stop_time = feed.stop_times.get().next().expect("stop time");
        assert_eq!(
            stop_time.drop_off_type,
            Some(gtfs_io_model::PickupDropOffType::NotAvailable)
        );
        assert_eq!(stop_time.arrival_time.map(|t| t.hours()), Some(25));
    }
}
