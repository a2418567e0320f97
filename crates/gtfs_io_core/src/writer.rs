use tracing::{debug, info};

use crate::config::ParserConfig;
use crate::feed::Feed;
use crate::layout::*;
use crate::schema::{EntitySchema, Schemas};
use crate::target::{TargetError, TargetProvider};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("unknown table {0}")]
    UnknownTable(String),
    #[error(transparent)]
    Target(#[from] TargetError),
}

/// Writes feed entities as tables, one target per non-empty table.
///
/// Rows are sorted with each table's write order, so the output does not
/// depend on insertion order.
pub struct Writer {
    config: ParserConfig,
    schemas: Schemas,
}

impl Writer {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            schemas: Schemas::default(),
        }
    }

    pub fn with_schemas(mut self, schemas: Schemas) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn schemas_mut(&mut self) -> &mut Schemas {
        &mut self.schemas
    }

    pub fn write(&self, feed: &Feed, targets: &mut dyn TargetProvider) -> Result<(), WriteError> {
        for table in GTFS_FILE_NAMES {
            self.write_table(feed, targets, table)?;
        }
        Ok(())
    }

    /// Writes a single table. Returns the number of rows written, zero when
    /// the table is empty and nothing was written.
    pub fn write_table(
        &self,
        feed: &Feed,
        targets: &mut dyn TargetProvider,
        name: &str,
    ) -> Result<usize, WriteError> {
        let schemas = &self.schemas;
        match name {
            AGENCY_FILE => self.write_rows(&schemas.agency, feed.agencies.get().collect(), targets),
            STOPS_FILE => self.write_rows(&schemas.stops, feed.stops.get().collect(), targets),
            ROUTES_FILE => self.write_rows(&schemas.routes, feed.routes.get().collect(), targets),
            TRIPS_FILE => self.write_rows(&schemas.trips, feed.trips.get().collect(), targets),
            STOP_TIMES_FILE => {
                self.write_rows(&schemas.stop_times, feed.stop_times.get().collect(), targets)
            }
            CALENDAR_FILE => {
                self.write_rows(&schemas.calendar, feed.calendars.get().collect(), targets)
            }
            CALENDAR_DATES_FILE => self.write_rows(
                &schemas.calendar_dates,
                feed.calendar_dates.get().collect(),
                targets,
            ),
            FARE_ATTRIBUTES_FILE => self.write_rows(
                &schemas.fare_attributes,
                feed.fare_attributes.get().collect(),
                targets,
            ),
            FARE_RULES_FILE => {
                self.write_rows(&schemas.fare_rules, feed.fare_rules.get().collect(), targets)
            }
            SHAPES_FILE => self.write_rows(&schemas.shapes, feed.shapes.get().collect(), targets),
            FREQUENCIES_FILE => {
                self.write_rows(&schemas.frequencies, feed.frequencies.get().collect(), targets)
            }
            TRANSFERS_FILE => {
                self.write_rows(&schemas.transfers, feed.transfers.get().collect(), targets)
            }
            LEVELS_FILE => self.write_rows(&schemas.levels, feed.levels.get().collect(), targets),
            PATHWAYS_FILE => {
                self.write_rows(&schemas.pathways, feed.pathways.get().collect(), targets)
            }
            FEED_INFO_FILE => {
                self.write_rows(&schemas.feed_info, feed.feed_info.iter().collect(), targets)
            }
            ATTRIBUTIONS_FILE => self.write_rows(
                &schemas.attributions,
                feed.attributions.get().collect(),
                targets,
            ),
            other => Err(WriteError::UnknownTable(other.to_string())),
        }
    }

    fn write_rows<E>(
        &self,
        schema: &EntitySchema<E>,
        mut entities: Vec<&E>,
        targets: &mut dyn TargetProvider,
    ) -> Result<usize, WriteError> {
        if entities.is_empty() {
            debug!(file = schema.file_name, "nothing to write");
            return Ok(0);
        }
        entities.sort_by(|a, b| (schema.write_order)(a, b));

        let mut target = targets.open(schema.file_name)?;
        if target.exists() {
            target.clear()?;
        }
        target.write(&schema.header())?;
        for entity in &entities {
            target.write(&schema.format_row(entity, &self.config))?;
        }
        target.close()?;

        info!(file = schema.file_name, rows = entities.len(), "wrote file");
        Ok(entities.len())
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new(ParserConfig::strict())
    }
}
