use std::cmp::Ordering;

use gtfs_io_model::{
    Agency, Attribution, Calendar, CalendarDate, FareAttribute, FareRule, FeedInfo, Frequency,
    Level, Pathway, Route, Shape, Stop, StopTime, Transfer, Trip, UniqueEntity,
};
use rustc_hash::FxHashMap;

use super::{EntitySchema, FieldCodec, OrderFn};
use crate::codec::{self, CodecError};
use crate::config::ParserConfig;
use crate::layout::*;

macro_rules! text {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    config: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_string(value, config);
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_string(&entity.$field),
        }
    };
}

macro_rules! opt_text {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    config: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_optional_string(value, config);
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| {
                codec::format_optional_string(entity.$field.as_deref())
            },
        }
    };
}

macro_rules! double {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    config: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_double(value, config)?.unwrap_or_default();
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_double(Some(entity.$field)),
        }
    };
}

macro_rules! opt_double {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    config: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_double(value, config)?;
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_double(entity.$field),
        }
    };
}

macro_rules! int {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    _: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_integer(value)?.unwrap_or_default();
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_integer(Some(entity.$field)),
        }
    };
}

macro_rules! opt_int {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    _: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_integer(value)?;
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_integer(entity.$field),
        }
    };
}

macro_rules! flag {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    _: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_bool(value)?.unwrap_or_default();
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_bool(Some(entity.$field)),
        }
    };
}

macro_rules! opt_flag {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    _: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_bool(value)?;
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_bool(entity.$field),
        }
    };
}

macro_rules! date {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    config: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_date(value, config)?.unwrap_or_default();
                Ok(())
            },
            format: |entity: &$entity, config: &ParserConfig| {
                codec::format_date(Some(entity.$field), config)
            },
        }
    };
}

macro_rules! opt_date {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    config: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_date(value, config)?;
                Ok(())
            },
            format: |entity: &$entity, config: &ParserConfig| {
                codec::format_date(entity.$field, config)
            },
        }
    };
}

macro_rules! time {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    config: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_time(value, config)?.unwrap_or_default();
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_time(Some(entity.$field)),
        }
    };
}

macro_rules! opt_time {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    config: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_time(value, config)?;
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_time(entity.$field),
        }
    };
}

macro_rules! color {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    _: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_color(value)?;
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_color(entity.$field),
        }
    };
}

macro_rules! coded {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    _: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_enum(value)?.unwrap_or_default();
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_enum(Some(entity.$field)),
        }
    };
}

macro_rules! opt_coded {
    ($entity:ty, $field:ident) => {
        FieldCodec::<$entity> {
            name: stringify!($field),
            parse: |entity: &mut $entity,
                    value: &str,
                    _: &ParserConfig|
             -> Result<(), CodecError> {
                entity.$field = codec::parse_enum(value)?;
                Ok(())
            },
            format: |entity: &$entity, _: &ParserConfig| codec::format_enum(entity.$field),
        }
    };
}

fn schema<E>(
    file_name: &'static str,
    entity_name: &'static str,
    fields: Vec<FieldCodec<E>>,
    required: &[&'static str],
    write_order: OrderFn<E>,
) -> EntitySchema<E> {
    EntitySchema {
        file_name,
        entity_name,
        fields,
        required: required.to_vec(),
        aliases: FxHashMap::default(),
        natural_order: None,
        write_order,
    }
}

pub(super) fn agency() -> EntitySchema<Agency> {
    schema(
        AGENCY_FILE,
        "Agency",
        vec![
            opt_text!(Agency, agency_id),
            text!(Agency, agency_name),
            text!(Agency, agency_url),
            text!(Agency, agency_timezone),
            opt_text!(Agency, agency_lang),
            opt_text!(Agency, agency_phone),
            opt_text!(Agency, agency_fare_url),
            opt_text!(Agency, agency_email),
        ],
        &["agency_name", "agency_url", "agency_timezone"],
        |a, b| a.agency_id.cmp(&b.agency_id),
    )
}

pub(super) fn stops() -> EntitySchema<Stop> {
    schema(
        STOPS_FILE,
        "Stop",
        vec![
            text!(Stop, stop_id),
            opt_text!(Stop, stop_code),
            opt_text!(Stop, stop_name),
            opt_text!(Stop, stop_desc),
            opt_double!(Stop, stop_lat),
            opt_double!(Stop, stop_lon),
            opt_text!(Stop, zone_id),
            opt_text!(Stop, stop_url),
            FieldCodec {
                name: "location_type",
                parse: |stop: &mut Stop,
                        value: &str,
                        config: &ParserConfig|
                 -> Result<(), CodecError> {
                    stop.location_type = codec::parse_location_type(value, config)?;
                    Ok(())
                },
                format: |stop: &Stop, _: &ParserConfig| codec::format_enum(stop.location_type),
            },
            opt_text!(Stop, parent_station),
            opt_text!(Stop, stop_timezone),
            opt_coded!(Stop, wheelchair_boarding),
            opt_text!(Stop, level_id),
            opt_text!(Stop, platform_code),
        ],
        &["stop_id", "stop_name", "stop_lat", "stop_lon"],
        |a, b| a.stop_id.cmp(&b.stop_id),
    )
}

pub(super) fn routes() -> EntitySchema<Route> {
    schema(
        ROUTES_FILE,
        "Route",
        vec![
            text!(Route, route_id),
            opt_text!(Route, agency_id),
            opt_text!(Route, route_short_name),
            opt_text!(Route, route_long_name),
            opt_text!(Route, route_desc),
            coded!(Route, route_type),
            opt_text!(Route, route_url),
            color!(Route, route_color),
            color!(Route, route_text_color),
            opt_int!(Route, route_sort_order),
            opt_coded!(Route, continuous_pickup),
            opt_coded!(Route, continuous_drop_off),
        ],
        &[
            "route_id",
            "route_short_name",
            "route_long_name",
            "route_type",
        ],
        |a, b| a.route_id.cmp(&b.route_id),
    )
}

pub(super) fn trips() -> EntitySchema<Trip> {
    schema(
        TRIPS_FILE,
        "Trip",
        vec![
            text!(Trip, route_id),
            text!(Trip, service_id),
            text!(Trip, trip_id),
            opt_text!(Trip, trip_headsign),
            opt_text!(Trip, trip_short_name),
            opt_coded!(Trip, direction_id),
            opt_text!(Trip, block_id),
            opt_text!(Trip, shape_id),
            opt_coded!(Trip, wheelchair_accessible),
        ],
        &["route_id", "service_id", "trip_id"],
        |a, b| a.trip_id.cmp(&b.trip_id),
    )
}

pub(super) fn stop_times() -> EntitySchema<StopTime> {
    let mut schema = schema(
        STOP_TIMES_FILE,
        "StopTime",
        vec![
            text!(StopTime, trip_id),
            opt_time!(StopTime, arrival_time),
            opt_time!(StopTime, departure_time),
            text!(StopTime, stop_id),
            int!(StopTime, stop_sequence),
            opt_text!(StopTime, stop_headsign),
            opt_coded!(StopTime, pickup_type),
            opt_coded!(StopTime, drop_off_type),
            opt_coded!(StopTime, continuous_pickup),
            opt_coded!(StopTime, continuous_drop_off),
            opt_double!(StopTime, shape_dist_traveled),
            opt_coded!(StopTime, timepoint),
        ],
        &[
            "trip_id",
            "arrival_time",
            "departure_time",
            "stop_id",
            "stop_sequence",
        ],
        StopTime::natural_cmp,
    );
    schema.natural_order = Some(StopTime::natural_cmp);
    // Misspelling found in published feeds.
    schema.add_alias("drop_off_time", "drop_off_type");
    schema.add_alias("shape_dist_travelled", "shape_dist_traveled");
    schema
}

pub(super) fn calendar() -> EntitySchema<Calendar> {
    let mut schema = schema(
        CALENDAR_FILE,
        "Calendar",
        vec![
            text!(Calendar, service_id),
            flag!(Calendar, monday),
            flag!(Calendar, tuesday),
            flag!(Calendar, wednesday),
            flag!(Calendar, thursday),
            flag!(Calendar, friday),
            flag!(Calendar, saturday),
            flag!(Calendar, sunday),
            date!(Calendar, start_date),
            date!(Calendar, end_date),
        ],
        &[
            "service_id",
            "monday",
            "tuesday",
            "wednesday",
            "thursday",
            "friday",
            "saturday",
            "sunday",
            "start_date",
            "end_date",
        ],
        Calendar::natural_cmp,
    );
    schema.natural_order = Some(Calendar::natural_cmp);
    schema
}

pub(super) fn calendar_dates() -> EntitySchema<CalendarDate> {
    let mut schema = schema(
        CALENDAR_DATES_FILE,
        "CalendarDate",
        vec![
            text!(CalendarDate, service_id),
            date!(CalendarDate, date),
            coded!(CalendarDate, exception_type),
        ],
        &["service_id", "date", "exception_type"],
        |a, b| {
            a.date
                .cmp(&b.date)
                .then(a.exception_type.cmp(&b.exception_type))
                .then(a.service_id.cmp(&b.service_id))
        },
    );
    schema.natural_order = Some(CalendarDate::natural_cmp);
    schema
}

pub(super) fn fare_attributes() -> EntitySchema<FareAttribute> {
    schema(
        FARE_ATTRIBUTES_FILE,
        "FareAttribute",
        vec![
            text!(FareAttribute, fare_id),
            double!(FareAttribute, price),
            text!(FareAttribute, currency_type),
            coded!(FareAttribute, payment_method),
            opt_int!(FareAttribute, transfers),
            opt_text!(FareAttribute, agency_id),
            opt_int!(FareAttribute, transfer_duration),
        ],
        &[
            "fare_id",
            "price",
            "currency_type",
            "payment_method",
            "transfers",
        ],
        |a, b| a.fare_id.cmp(&b.fare_id),
    )
}

pub(super) fn fare_rules() -> EntitySchema<FareRule> {
    schema(
        FARE_RULES_FILE,
        "FareRule",
        vec![
            text!(FareRule, fare_id),
            opt_text!(FareRule, route_id),
            opt_text!(FareRule, origin_id),
            opt_text!(FareRule, destination_id),
            opt_text!(FareRule, contains_id),
        ],
        &["fare_id"],
        |a, b| a.key().cmp(&b.key()),
    )
}

pub(super) fn shapes() -> EntitySchema<Shape> {
    let mut schema = schema(
        SHAPES_FILE,
        "Shape",
        vec![
            text!(Shape, shape_id),
            double!(Shape, shape_pt_lat),
            double!(Shape, shape_pt_lon),
            int!(Shape, shape_pt_sequence),
            opt_double!(Shape, shape_dist_traveled),
        ],
        &[
            "shape_id",
            "shape_pt_lat",
            "shape_pt_lon",
            "shape_pt_sequence",
        ],
        |a, b| {
            a.shape_id
                .cmp(&b.shape_id)
                .then(a.shape_pt_sequence.cmp(&b.shape_pt_sequence))
        },
    );
    schema.add_alias("shape_dist_travelled", "shape_dist_traveled");
    schema
}

pub(super) fn frequencies() -> EntitySchema<Frequency> {
    schema(
        FREQUENCIES_FILE,
        "Frequency",
        vec![
            text!(Frequency, trip_id),
            time!(Frequency, start_time),
            time!(Frequency, end_time),
            int!(Frequency, headway_secs),
            opt_flag!(Frequency, exact_times),
        ],
        &["trip_id", "start_time", "end_time", "headway_secs"],
        |a, b| {
            a.trip_id
                .cmp(&b.trip_id)
                .then(a.start_time.cmp(&b.start_time))
        },
    )
}

pub(super) fn transfers() -> EntitySchema<Transfer> {
    schema(
        TRANSFERS_FILE,
        "Transfer",
        vec![
            text!(Transfer, from_stop_id),
            text!(Transfer, to_stop_id),
            coded!(Transfer, transfer_type),
            opt_int!(Transfer, min_transfer_time),
        ],
        &["from_stop_id", "to_stop_id", "transfer_type"],
        |a, b| {
            a.from_stop_id
                .cmp(&b.from_stop_id)
                .then(a.to_stop_id.cmp(&b.to_stop_id))
        },
    )
}

pub(super) fn levels() -> EntitySchema<Level> {
    schema(
        LEVELS_FILE,
        "Level",
        vec![
            text!(Level, level_id),
            double!(Level, level_index),
            opt_text!(Level, level_name),
        ],
        &["level_id", "level_index"],
        |a, b| a.level_id.cmp(&b.level_id),
    )
}

pub(super) fn pathways() -> EntitySchema<Pathway> {
    schema(
        PATHWAYS_FILE,
        "Pathway",
        vec![
            text!(Pathway, pathway_id),
            text!(Pathway, from_stop_id),
            text!(Pathway, to_stop_id),
            coded!(Pathway, pathway_mode),
            coded!(Pathway, is_bidirectional),
            opt_double!(Pathway, length),
            opt_int!(Pathway, traversal_time),
            opt_int!(Pathway, stair_count),
            opt_double!(Pathway, max_slope),
            opt_double!(Pathway, min_width),
            opt_text!(Pathway, signposted_as),
            opt_text!(Pathway, reversed_signposted_as),
        ],
        &[
            "pathway_id",
            "from_stop_id",
            "to_stop_id",
            "pathway_mode",
            "is_bidirectional",
        ],
        |a, b| a.pathway_id.cmp(&b.pathway_id),
    )
}

pub(super) fn feed_info() -> EntitySchema<FeedInfo> {
    schema(
        FEED_INFO_FILE,
        "FeedInfo",
        vec![
            text!(FeedInfo, feed_publisher_name),
            text!(FeedInfo, feed_publisher_url),
            text!(FeedInfo, feed_lang),
            opt_text!(FeedInfo, default_lang),
            opt_date!(FeedInfo, feed_start_date),
            opt_date!(FeedInfo, feed_end_date),
            opt_text!(FeedInfo, feed_version),
            opt_text!(FeedInfo, feed_contact_email),
            opt_text!(FeedInfo, feed_contact_url),
        ],
        &["feed_publisher_name", "feed_publisher_url", "feed_lang"],
        |_, _| Ordering::Equal,
    )
}

pub(super) fn attributions() -> EntitySchema<Attribution> {
    schema(
        ATTRIBUTIONS_FILE,
        "Attribution",
        vec![
            opt_text!(Attribution, attribution_id),
            opt_text!(Attribution, agency_id),
            opt_text!(Attribution, route_id),
            opt_text!(Attribution, trip_id),
            text!(Attribution, organization_name),
            opt_flag!(Attribution, is_producer),
            opt_flag!(Attribution, is_operator),
            opt_flag!(Attribution, is_authority),
            opt_text!(Attribution, attribution_url),
            opt_text!(Attribution, attribution_email),
            opt_text!(Attribution, attribution_phone),
        ],
        &["organization_name"],
        |a, b| {
            a.attribution_id
                .cmp(&b.attribution_id)
                .then(a.organization_name.cmp(&b.organization_name))
        },
    )
}
