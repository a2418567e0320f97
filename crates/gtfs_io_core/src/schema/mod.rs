//! Per-table column definitions driving both the reader and the writer.

mod tables;

use std::cmp::Ordering;

use gtfs_io_model::{
    Agency, Attribution, Calendar, CalendarDate, FareAttribute, FareRule, FeedInfo, Frequency,
    Level, Pathway, Route, Shape, Stop, StopTime, Transfer, Trip,
};
use rustc_hash::FxHashMap;

use crate::codec::CodecError;
use crate::config::ParserConfig;

pub type ParseFn<E> = fn(&mut E, &str, &ParserConfig) -> Result<(), CodecError>;
pub type FormatFn<E> = fn(&E, &ParserConfig) -> String;
pub type OrderFn<E> = fn(&E, &E) -> Ordering;

/// Parser and formatter for one column of a table.
pub struct FieldCodec<E> {
    pub name: &'static str,
    pub parse: ParseFn<E>,
    pub format: FormatFn<E>,
}

impl<E> Clone for FieldCodec<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            parse: self.parse,
            format: self.format,
        }
    }
}

pub struct EntitySchema<E> {
    /// Table name without extension.
    pub file_name: &'static str,
    pub entity_name: &'static str,
    /// Columns in written header order.
    pub fields: Vec<FieldCodec<E>>,
    pub required: Vec<&'static str>,
    /// Header spelling to canonical column name.
    pub aliases: FxHashMap<String, String>,
    /// Order rows are inserted in after a read, when the table has one.
    pub natural_order: Option<OrderFn<E>>,
    pub write_order: OrderFn<E>,
}

impl<E> Clone for EntitySchema<E> {
    fn clone(&self) -> Self {
        Self {
            file_name: self.file_name,
            entity_name: self.entity_name,
            fields: self.fields.clone(),
            required: self.required.clone(),
            aliases: self.aliases.clone(),
            natural_order: self.natural_order,
            write_order: self.write_order,
        }
    }
}

impl<E> EntitySchema<E> {
    pub fn field(&self, name: &str) -> Option<&FieldCodec<E>> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Maps a cleaned header cell to its canonical column name.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn add_alias(&mut self, alias: impl Into<String>, canonical: impl Into<String>) {
        self.aliases.insert(alias.into(), canonical.into());
    }

    /// Replaces the parser of a column. Returns false for unknown columns.
    pub fn set_parser(&mut self, name: &str, parse: ParseFn<E>) -> bool {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.parse = parse;
                true
            }
            None => false,
        }
    }

    /// Replaces the formatter of a column. Returns false for unknown columns.
    pub fn set_formatter(&mut self, name: &str, format: FormatFn<E>) -> bool {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.format = format;
                true
            }
            None => false,
        }
    }

    pub fn header(&self) -> Vec<String> {
        self.fields.iter().map(|field| field.name.to_string()).collect()
    }

    pub fn format_row(&self, entity: &E, config: &ParserConfig) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| (field.format)(entity, config))
            .collect()
    }
}

/// One schema per entity type.
#[derive(Clone)]
pub struct Schemas {
    pub agency: EntitySchema<Agency>,
    pub stops: EntitySchema<Stop>,
    pub routes: EntitySchema<Route>,
    pub trips: EntitySchema<Trip>,
    pub stop_times: EntitySchema<StopTime>,
    pub calendar: EntitySchema<Calendar>,
    pub calendar_dates: EntitySchema<CalendarDate>,
    pub fare_attributes: EntitySchema<FareAttribute>,
    pub fare_rules: EntitySchema<FareRule>,
    pub shapes: EntitySchema<Shape>,
    pub frequencies: EntitySchema<Frequency>,
    pub transfers: EntitySchema<Transfer>,
    pub levels: EntitySchema<Level>,
    pub pathways: EntitySchema<Pathway>,
    pub feed_info: EntitySchema<FeedInfo>,
    pub attributions: EntitySchema<Attribution>,
}

impl Default for Schemas {
    fn default() -> Self {
        Self {
            agency: tables::agency(),
            stops: tables::stops(),
            routes: tables::routes(),
            trips: tables::trips(),
            stop_times: tables::stop_times(),
            calendar: tables::calendar(),
            calendar_dates: tables::calendar_dates(),
            fare_attributes: tables::fare_attributes(),
            fare_rules: tables::fare_rules(),
            shapes: tables::shapes(),
            frequencies: tables::frequencies(),
            transfers: tables::transfers(),
            levels: tables::levels(),
            pathways: tables::pathways(),
            feed_info: tables::feed_info(),
            attributions: tables::attributions(),
        }
    }
}
