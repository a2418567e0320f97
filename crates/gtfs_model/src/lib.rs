use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GtfsParseError {
    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),
    #[error("invalid time value: {0}")]
    InvalidTimeValue(String),
}

/// Time since midnight of the service day.
///
/// Hours are not wrapped at 24, so `25:10:00` is ten past one on the
/// following calendar day. Comparison, equality and hashing only look at the
/// total number of seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOfDay {
    hours: u32,
    minutes: u8,
    seconds: u8,
}

/// Keeps `total_seconds` within `u32`.
const MAX_HOURS: u32 = u32::MAX / 3600 - 1;

impl TimeOfDay {
    pub fn new(hours: u32, minutes: u8, seconds: u8) -> Result<Self, GtfsParseError> {
        if minutes > 59 || seconds > 59 || hours > MAX_HOURS {
            return Err(GtfsParseError::InvalidTimeValue(format!(
                "{}:{:02}:{:02}",
                hours, minutes, seconds
            )));
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    pub fn from_total_seconds(total_seconds: u32) -> Self {
        Self {
            hours: total_seconds / 3600,
            minutes: ((total_seconds % 3600) / 60) as u8,
            seconds: (total_seconds % 60) as u8,
        }
    }

    /// Parses `H:MM:SS` or `HH:MM:SS`.
    pub fn parse(value: &str) -> Result<Self, GtfsParseError> {
        let trimmed = value.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() != 3
            || parts[0].is_empty()
            || parts[1].len() != 2
            || parts[2].len() != 2
            || !parts
                .iter()
                .all(|part| part.chars().all(|ch| ch.is_ascii_digit()))
        {
            return Err(GtfsParseError::InvalidTimeFormat(value.to_string()));
        }

        let hours: u32 = parts[0]
            .parse()
            .map_err(|_| GtfsParseError::InvalidTimeFormat(value.to_string()))?;
        let minutes: u8 = parts[1]
            .parse()
            .map_err(|_| GtfsParseError::InvalidTimeFormat(value.to_string()))?;
        let seconds: u8 = parts[2]
            .parse()
            .map_err(|_| GtfsParseError::InvalidTimeFormat(value.to_string()))?;

        if minutes > 59 || seconds > 59 || hours > MAX_HOURS {
            return Err(GtfsParseError::InvalidTimeValue(value.to_string()));
        }

        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    pub fn total_seconds(&self) -> u32 {
        self.hours * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }
}

impl PartialEq for TimeOfDay {
    fn eq(&self, other: &Self) -> bool {
        self.total_seconds() == other.total_seconds()
    }
}

impl Eq for TimeOfDay {}

impl PartialOrd for TimeOfDay {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeOfDay {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_seconds().cmp(&other.total_seconds())
    }
}

impl Hash for TimeOfDay {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.total_seconds().hash(state);
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TimeOfDayVisitor;

        impl<'de> Visitor<'de> for TimeOfDayVisitor {
            type Value = TimeOfDay;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a GTFS time in HH:MM:SS format")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<TimeOfDay, E> {
                TimeOfDay::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimeOfDayVisitor)
    }
}

/// A GTFS enumeration with a small numeric text encoding.
pub trait CodedEnum: Sized + Copy {
    /// Name used in error messages.
    const NAME: &'static str;

    fn from_code(code: u16) -> Option<Self>;

    fn code(&self) -> u16;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RouteType {
    Tram,
    Subway,
    Rail,
    #[default]
    Bus,
    Ferry,
    CableTram,
    AerialLift,
    Funicular,
    Trolleybus,
    Monorail,
    Extended(u16),
}

impl CodedEnum for RouteType {
    const NAME: &'static str = "route_type";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(RouteType::Tram),
            1 => Some(RouteType::Subway),
            2 => Some(RouteType::Rail),
            3 => Some(RouteType::Bus),
            4 => Some(RouteType::Ferry),
            5 => Some(RouteType::CableTram),
            6 => Some(RouteType::AerialLift),
            7 => Some(RouteType::Funicular),
            11 => Some(RouteType::Trolleybus),
            12 => Some(RouteType::Monorail),
            100..=1702 => Some(RouteType::Extended(code)),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            RouteType::Tram => 0,
            RouteType::Subway => 1,
            RouteType::Rail => 2,
            RouteType::Bus => 3,
            RouteType::Ferry => 4,
            RouteType::CableTram => 5,
            RouteType::AerialLift => 6,
            RouteType::Funicular => 7,
            RouteType::Trolleybus => 11,
            RouteType::Monorail => 12,
            RouteType::Extended(code) => *code,
        }
    }
}

impl Serialize for RouteType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

impl<'de> Deserialize<'de> for RouteType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RouteTypeVisitor;

        impl<'de> Visitor<'de> for RouteTypeVisitor {
            type Value = RouteType;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a GTFS route_type numeric value")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<RouteType, E> {
                let parsed: u16 = value.trim().parse().map_err(E::custom)?;
                self.visit_u64(parsed as u64)
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<RouteType, E> {
                let code = u16::try_from(value).map_err(E::custom)?;
                self.visit_u64(code as u64)
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<RouteType, E> {
                u16::try_from(value)
                    .ok()
                    .and_then(RouteType::from_code)
                    .ok_or_else(|| E::custom(format!("unknown route_type {}", value)))
            }
        }

        deserializer.deserialize_any(RouteTypeVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "0")]
    OnBoard,
    #[serde(rename = "1")]
    BeforeBoarding,
}

impl CodedEnum for PaymentMethod {
    const NAME: &'static str = "payment_method";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(PaymentMethod::OnBoard),
            1 => Some(PaymentMethod::BeforeBoarding),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            PaymentMethod::OnBoard => 0,
            PaymentMethod::BeforeBoarding => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransferType {
    #[default]
    #[serde(rename = "0")]
    Recommended,
    #[serde(rename = "1")]
    Timed,
    #[serde(rename = "2")]
    MinimumTime,
    #[serde(rename = "3")]
    NotPossible,
    #[serde(rename = "4")]
    InSeat,
    #[serde(rename = "5")]
    InSeatNotAllowed,
}

impl CodedEnum for TransferType {
    const NAME: &'static str = "transfer_type";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(TransferType::Recommended),
            1 => Some(TransferType::Timed),
            2 => Some(TransferType::MinimumTime),
            3 => Some(TransferType::NotPossible),
            4 => Some(TransferType::InSeat),
            5 => Some(TransferType::InSeatNotAllowed),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            TransferType::Recommended => 0,
            TransferType::Timed => 1,
            TransferType::MinimumTime => 2,
            TransferType::NotPossible => 3,
            TransferType::InSeat => 4,
            TransferType::InSeatNotAllowed => 5,
        }
    }
}

/// Shared by `stops.wheelchair_boarding` and `trips.wheelchair_accessible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelchairAccessibility {
    #[serde(rename = "0")]
    NoInformation,
    #[serde(rename = "1")]
    SomeAccommodation,
    #[serde(rename = "2")]
    NotAccessible,
}

impl CodedEnum for WheelchairAccessibility {
    const NAME: &'static str = "wheelchair accessibility";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(WheelchairAccessibility::NoInformation),
            1 => Some(WheelchairAccessibility::SomeAccommodation),
            2 => Some(WheelchairAccessibility::NotAccessible),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            WheelchairAccessibility::NoInformation => 0,
            WheelchairAccessibility::SomeAccommodation => 1,
            WheelchairAccessibility::NotAccessible => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupDropOffType {
    #[serde(rename = "0")]
    Regular,
    #[serde(rename = "1")]
    NotAvailable,
    #[serde(rename = "2")]
    PhoneAgency,
    #[serde(rename = "3")]
    CoordinateWithDriver,
}

impl CodedEnum for PickupDropOffType {
    const NAME: &'static str = "pickup/drop-off type";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(PickupDropOffType::Regular),
            1 => Some(PickupDropOffType::NotAvailable),
            2 => Some(PickupDropOffType::PhoneAgency),
            3 => Some(PickupDropOffType::CoordinateWithDriver),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            PickupDropOffType::Regular => 0,
            PickupDropOffType::NotAvailable => 1,
            PickupDropOffType::PhoneAgency => 2,
            PickupDropOffType::CoordinateWithDriver => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContinuousPickupDropOff {
    #[serde(rename = "0")]
    Continuous,
    #[serde(rename = "1")]
    NotContinuous,
    #[serde(rename = "2")]
    PhoneAgency,
    #[serde(rename = "3")]
    CoordinateWithDriver,
}

impl CodedEnum for ContinuousPickupDropOff {
    const NAME: &'static str = "continuous pickup/drop-off";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(ContinuousPickupDropOff::Continuous),
            1 => Some(ContinuousPickupDropOff::NotContinuous),
            2 => Some(ContinuousPickupDropOff::PhoneAgency),
            3 => Some(ContinuousPickupDropOff::CoordinateWithDriver),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            ContinuousPickupDropOff::Continuous => 0,
            ContinuousPickupDropOff::NotContinuous => 1,
            ContinuousPickupDropOff::PhoneAgency => 2,
            ContinuousPickupDropOff::CoordinateWithDriver => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationType {
    #[serde(rename = "0")]
    Stop,
    #[serde(rename = "1")]
    Station,
    #[serde(rename = "2")]
    EntranceOrExit,
    #[serde(rename = "3")]
    GenericNode,
    #[serde(rename = "4")]
    BoardingArea,
}

impl CodedEnum for LocationType {
    const NAME: &'static str = "location_type";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(LocationType::Stop),
            1 => Some(LocationType::Station),
            2 => Some(LocationType::EntranceOrExit),
            3 => Some(LocationType::GenericNode),
            4 => Some(LocationType::BoardingArea),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            LocationType::Stop => 0,
            LocationType::Station => 1,
            LocationType::EntranceOrExit => 2,
            LocationType::GenericNode => 3,
            LocationType::BoardingArea => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionType {
    #[serde(rename = "0")]
    OneDirection,
    #[serde(rename = "1")]
    OppositeDirection,
}

impl CodedEnum for DirectionType {
    const NAME: &'static str = "direction_id";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(DirectionType::OneDirection),
            1 => Some(DirectionType::OppositeDirection),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            DirectionType::OneDirection => 0,
            DirectionType::OppositeDirection => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum ExceptionType {
    #[default]
    #[serde(rename = "1")]
    Added,
    #[serde(rename = "2")]
    Removed,
}

impl CodedEnum for ExceptionType {
    const NAME: &'static str = "exception_type";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(ExceptionType::Added),
            2 => Some(ExceptionType::Removed),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            ExceptionType::Added => 1,
            ExceptionType::Removed => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PathwayMode {
    #[default]
    #[serde(rename = "1")]
    Walkway,
    #[serde(rename = "2")]
    Stairs,
    #[serde(rename = "3")]
    MovingSidewalk,
    #[serde(rename = "4")]
    Escalator,
    #[serde(rename = "5")]
    Elevator,
    #[serde(rename = "6")]
    FareGate,
    #[serde(rename = "7")]
    ExitGate,
}

impl CodedEnum for PathwayMode {
    const NAME: &'static str = "pathway_mode";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(PathwayMode::Walkway),
            2 => Some(PathwayMode::Stairs),
            3 => Some(PathwayMode::MovingSidewalk),
            4 => Some(PathwayMode::Escalator),
            5 => Some(PathwayMode::Elevator),
            6 => Some(PathwayMode::FareGate),
            7 => Some(PathwayMode::ExitGate),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            PathwayMode::Walkway => 1,
            PathwayMode::Stairs => 2,
            PathwayMode::MovingSidewalk => 3,
            PathwayMode::Escalator => 4,
            PathwayMode::Elevator => 5,
            PathwayMode::FareGate => 6,
            PathwayMode::ExitGate => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Bidirectional {
    #[default]
    #[serde(rename = "0")]
    Unidirectional,
    #[serde(rename = "1")]
    Bidirectional,
}

impl CodedEnum for Bidirectional {
    const NAME: &'static str = "is_bidirectional";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Bidirectional::Unidirectional),
            1 => Some(Bidirectional::Bidirectional),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            Bidirectional::Unidirectional => 0,
            Bidirectional::Bidirectional => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimepointType {
    #[serde(rename = "0")]
    Approximate,
    #[serde(rename = "1")]
    Exact,
}

impl CodedEnum for TimepointType {
    const NAME: &'static str = "timepoint";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(TimepointType::Approximate),
            1 => Some(TimepointType::Exact),
            _ => None,
        }
    }

    fn code(&self) -> u16 {
        match self {
            TimepointType::Approximate => 0,
            TimepointType::Exact => 1,
        }
    }
}

/// Entity with exactly one logical row per natural key within a feed.
pub trait UniqueEntity {
    type Key: Clone + Eq + Hash + fmt::Debug;

    fn key(&self) -> Self::Key;
}

/// Entity stored as many rows sharing a grouping key (e.g. stop times per trip).
pub trait GroupedEntity {
    fn group_key(&self) -> &str;
}

fn hash_f64<H: Hasher>(value: f64, state: &mut H) {
    // 0.0 and -0.0 compare equal, so they have to hash equal too.
    let normalized = if value == 0.0 { 0.0 } else { value };
    normalized.to_bits().hash(state);
}

fn hash_optional_f64<H: Hasher>(value: Option<f64>, state: &mut H) {
    value.is_some().hash(state);
    if let Some(value) = value {
        hash_f64(value, state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Agency {
    pub agency_id: Option<String>,
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
    pub agency_lang: Option<String>,
    pub agency_phone: Option<String>,
    pub agency_fare_url: Option<String>,
    pub agency_email: Option<String>,
}

impl UniqueEntity for Agency {
    type Key = String;

    /// Single-agency feeds may leave `agency_id` out; those key as "".
    fn key(&self) -> String {
        self.agency_id.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    pub stop_code: Option<String>,
    pub stop_name: Option<String>,
    pub stop_desc: Option<String>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
    pub zone_id: Option<String>,
    pub stop_url: Option<String>,
    pub location_type: Option<LocationType>,
    pub parent_station: Option<String>,
    pub stop_timezone: Option<String>,
    pub wheelchair_boarding: Option<WheelchairAccessibility>,
    pub level_id: Option<String>,
    pub platform_code: Option<String>,
}

impl Hash for Stop {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stop_id.hash(state);
        self.stop_code.hash(state);
        self.stop_name.hash(state);
        self.stop_desc.hash(state);
        hash_optional_f64(self.stop_lat, state);
        hash_optional_f64(self.stop_lon, state);
        self.zone_id.hash(state);
        self.stop_url.hash(state);
        self.location_type.hash(state);
        self.parent_station.hash(state);
        self.stop_timezone.hash(state);
        self.wheelchair_boarding.hash(state);
        self.level_id.hash(state);
        self.platform_code.hash(state);
    }
}

impl UniqueEntity for Stop {
    type Key = String;

    fn key(&self) -> String {
        self.stop_id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Route {
    pub route_id: String,
    pub agency_id: Option<String>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    pub route_desc: Option<String>,
    pub route_type: RouteType,
    pub route_url: Option<String>,
    /// ARGB, alpha is `FF` unless the source spelled out all eight digits.
    pub route_color: Option<i32>,
    pub route_text_color: Option<i32>,
    pub route_sort_order: Option<u32>,
    pub continuous_pickup: Option<ContinuousPickupDropOff>,
    pub continuous_drop_off: Option<ContinuousPickupDropOff>,
}

impl UniqueEntity for Route {
    type Key = String;

    fn key(&self) -> String {
        self.route_id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Trip {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    pub trip_headsign: Option<String>,
    pub trip_short_name: Option<String>,
    pub direction_id: Option<DirectionType>,
    pub block_id: Option<String>,
    pub shape_id: Option<String>,
    pub wheelchair_accessible: Option<WheelchairAccessibility>,
}

impl UniqueEntity for Trip {
    type Key = String;

    fn key(&self) -> String {
        self.trip_id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StopTime {
    pub trip_id: String,
    pub arrival_time: Option<TimeOfDay>,
    pub departure_time: Option<TimeOfDay>,
    pub stop_id: String,
    pub stop_sequence: u32,
    pub stop_headsign: Option<String>,
    pub pickup_type: Option<PickupDropOffType>,
    pub drop_off_type: Option<PickupDropOffType>,
    pub continuous_pickup: Option<ContinuousPickupDropOff>,
    pub continuous_drop_off: Option<ContinuousPickupDropOff>,
    pub shape_dist_traveled: Option<f64>,
    pub timepoint: Option<TimepointType>,
}

impl StopTime {
    /// Orders by trip, then by position within the trip.
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        self.trip_id
            .cmp(&other.trip_id)
            .then(self.stop_sequence.cmp(&other.stop_sequence))
    }
}

impl Hash for StopTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.trip_id.hash(state);
        self.arrival_time.hash(state);
        self.departure_time.hash(state);
        self.stop_id.hash(state);
        self.stop_sequence.hash(state);
        self.stop_headsign.hash(state);
        self.pickup_type.hash(state);
        self.drop_off_type.hash(state);
        self.continuous_pickup.hash(state);
        self.continuous_drop_off.hash(state);
        hash_optional_f64(self.shape_dist_traveled, state);
        self.timepoint.hash(state);
    }
}

impl GroupedEntity for StopTime {
    fn group_key(&self) -> &str {
        &self.trip_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Calendar {
    pub service_id: String,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Calendar {
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        self.service_id.cmp(&other.service_id)
    }
}

impl GroupedEntity for Calendar {
    fn group_key(&self) -> &str {
        &self.service_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CalendarDate {
    pub service_id: String,
    pub date: NaiveDate,
    pub exception_type: ExceptionType,
}

impl CalendarDate {
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        self.service_id
            .cmp(&other.service_id)
            .then(self.date.cmp(&other.date))
            .then(self.exception_type.cmp(&other.exception_type))
    }
}

impl GroupedEntity for CalendarDate {
    fn group_key(&self) -> &str {
        &self.service_id
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FareAttribute {
    pub fare_id: String,
    pub price: f64,
    pub currency_type: String,
    pub payment_method: PaymentMethod,
    /// `None` means unlimited transfers.
    pub transfers: Option<u32>,
    pub agency_id: Option<String>,
    pub transfer_duration: Option<u32>,
}

impl Hash for FareAttribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fare_id.hash(state);
        hash_f64(self.price, state);
        self.currency_type.hash(state);
        self.payment_method.hash(state);
        self.transfers.hash(state);
        self.agency_id.hash(state);
        self.transfer_duration.hash(state);
    }
}

impl GroupedEntity for FareAttribute {
    fn group_key(&self) -> &str {
        &self.fare_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FareRule {
    pub fare_id: String,
    pub route_id: Option<String>,
    pub origin_id: Option<String>,
    pub destination_id: Option<String>,
    pub contains_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FareRuleKey {
    pub fare_id: String,
    pub route_id: Option<String>,
    pub origin_id: Option<String>,
    pub destination_id: Option<String>,
    pub contains_id: Option<String>,
}

impl UniqueEntity for FareRule {
    type Key = FareRuleKey;

    fn key(&self) -> FareRuleKey {
        FareRuleKey {
            fare_id: self.fare_id.clone(),
            route_id: self.route_id.clone(),
            origin_id: self.origin_id.clone(),
            destination_id: self.destination_id.clone(),
            contains_id: self.contains_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Frequency {
    pub trip_id: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub headway_secs: u32,
    pub exact_times: Option<bool>,
}

impl GroupedEntity for Frequency {
    fn group_key(&self) -> &str {
        &self.trip_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Transfer {
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub transfer_type: TransferType,
    pub min_transfer_time: Option<u32>,
}

impl GroupedEntity for Transfer {
    fn group_key(&self) -> &str {
        &self.from_stop_id
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shape {
    pub shape_id: String,
    pub shape_pt_lat: f64,
    pub shape_pt_lon: f64,
    pub shape_pt_sequence: u32,
    pub shape_dist_traveled: Option<f64>,
}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shape_id.hash(state);
        hash_f64(self.shape_pt_lat, state);
        hash_f64(self.shape_pt_lon, state);
        self.shape_pt_sequence.hash(state);
        hash_optional_f64(self.shape_dist_traveled, state);
    }
}

impl GroupedEntity for Shape {
    fn group_key(&self) -> &str {
        &self.shape_id
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Level {
    pub level_id: String,
    pub level_index: f64,
    pub level_name: Option<String>,
}

impl Hash for Level {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.level_id.hash(state);
        hash_f64(self.level_index, state);
        self.level_name.hash(state);
    }
}

impl UniqueEntity for Level {
    type Key = String;

    fn key(&self) -> String {
        self.level_id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pathway {
    pub pathway_id: String,
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub pathway_mode: PathwayMode,
    pub is_bidirectional: Bidirectional,
    pub length: Option<f64>,
    pub traversal_time: Option<u32>,
    /// Negative when the stairs go down from `from_stop_id`.
    pub stair_count: Option<i32>,
    pub max_slope: Option<f64>,
    pub min_width: Option<f64>,
    pub signposted_as: Option<String>,
    pub reversed_signposted_as: Option<String>,
}

impl Hash for Pathway {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pathway_id.hash(state);
        self.from_stop_id.hash(state);
        self.to_stop_id.hash(state);
        self.pathway_mode.hash(state);
        self.is_bidirectional.hash(state);
        hash_optional_f64(self.length, state);
        self.traversal_time.hash(state);
        self.stair_count.hash(state);
        hash_optional_f64(self.max_slope, state);
        hash_optional_f64(self.min_width, state);
        self.signposted_as.hash(state);
        self.reversed_signposted_as.hash(state);
    }
}

impl UniqueEntity for Pathway {
    type Key = String;

    fn key(&self) -> String {
        self.pathway_id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Attribution {
    pub attribution_id: Option<String>,
    pub agency_id: Option<String>,
    pub route_id: Option<String>,
    pub trip_id: Option<String>,
    pub organization_name: String,
    pub is_producer: Option<bool>,
    pub is_operator: Option<bool>,
    pub is_authority: Option<bool>,
    pub attribution_url: Option<String>,
    pub attribution_email: Option<String>,
    pub attribution_phone: Option<String>,
}

impl GroupedEntity for Attribution {
    fn group_key(&self) -> &str {
        self.attribution_id.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FeedInfo {
    pub feed_publisher_name: String,
    pub feed_publisher_url: String,
    pub feed_lang: String,
    pub default_lang: Option<String>,
    pub feed_start_date: Option<NaiveDate>,
    pub feed_end_date: Option<NaiveDate>,
    pub feed_version: Option<String>,
    pub feed_contact_email: Option<String>,
    pub feed_contact_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn parses_time_of_day() {
        let time = TimeOfDay::parse("25:10:05").unwrap();
        assert_eq!(time.total_seconds(), 25 * 3600 + 10 * 60 + 5);
        assert_eq!(time.hours(), 25);
        assert_eq!(time.to_string(), "25:10:05");
    }

    #[test]
    fn parses_single_digit_hour() {
        let time = TimeOfDay::parse("6:05:00").unwrap();
        assert_eq!(time.total_seconds(), 6 * 3600 + 5 * 60);
        assert_eq!(time.to_string(), "06:05:00");
    }

    #[test]
    fn parses_time_with_whitespace() {
        let time = TimeOfDay::parse(" 08:00:00 ").unwrap();
        assert_eq!(time, TimeOfDay::from_total_seconds(8 * 3600));
    }

    #[test]
    fn rejects_invalid_time() {
        assert!(TimeOfDay::parse("25:99:00").is_err());
        assert!(TimeOfDay::parse("8:0:00").is_err());
        assert!(TimeOfDay::parse("bad").is_err());
        assert!(TimeOfDay::parse("").is_err());
    }

    #[test]
    fn time_equality_is_by_total_seconds() {
        let a = TimeOfDay::new(1, 30, 0).unwrap();
        let b = TimeOfDay::from_total_seconds(5400);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert!(TimeOfDay::parse("24:00:00").unwrap() > TimeOfDay::parse("23:59:59").unwrap());
    }

    #[test]
    fn time_serializes_as_string() {
        let time = TimeOfDay::parse("7:45:00").unwrap();
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "\"07:45:00\"");
        let back: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, time);
    }

    #[test]
    fn route_type_codes() {
        assert_eq!(RouteType::from_code(3), Some(RouteType::Bus));
        assert_eq!(RouteType::from_code(700), Some(RouteType::Extended(700)));
        assert_eq!(RouteType::from_code(8), None);
        assert_eq!(RouteType::Extended(1100).code(), 1100);
        assert_eq!(RouteType::Monorail.code(), 12);
    }

    #[test]
    fn exception_type_rejects_zero() {
        assert_eq!(ExceptionType::from_code(0), None);
        assert_eq!(ExceptionType::from_code(2), Some(ExceptionType::Removed));
    }

    #[test]
    fn equal_stops_hash_equal() {
        let stop = Stop {
            stop_id: "S1".to_string(),
            stop_lat: Some(36.425288),
            stop_lon: Some(-117.133162),
            ..Default::default()
        };
        let copy = stop.clone();
        assert_eq!(stop, copy);
        assert_eq!(hash_of(&stop), hash_of(&copy));

        let moved = Stop {
            stop_lat: Some(36.0),
            ..stop.clone()
        };
        assert_ne!(stop, moved);
    }

    #[test]
    fn stop_times_order_by_trip_then_sequence() {
        let a = StopTime {
            trip_id: "A".to_string(),
            stop_sequence: 2,
            ..Default::default()
        };
        let b = StopTime {
            trip_id: "A".to_string(),
            stop_sequence: 10,
            ..Default::default()
        };
        let c = StopTime {
            trip_id: "B".to_string(),
            stop_sequence: 1,
            ..Default::default()
        };
        assert_eq!(a.natural_cmp(&b), Ordering::Less);
        assert_eq!(b.natural_cmp(&c), Ordering::Less);
    }

    #[test]
    fn agency_without_id_keys_as_empty() {
        let agency = Agency::default();
        assert_eq!(agency.key(), "");
    }
}
