//! Conversions between raw cell text and typed field values.
//!
//! Every parser treats an empty (or whitespace only) cell as "no value".
//! Formatters are the inverse: a missing value becomes an empty cell.

use std::fmt::Display;
use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;

use chrono::NaiveDate;
use gtfs_io_model::{CodedEnum, GtfsParseError, LocationType, TimeOfDay};

use crate::config::{InvalidValuePolicy, ParserConfig, DEFAULT_DATE_FORMAT};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid boolean '{0}', expected 0 or 1")]
    InvalidBoolean(String),
    #[error("invalid floating point number: {0}")]
    InvalidDouble(#[from] ParseFloatError),
    #[error("invalid integer: {0}")]
    InvalidInteger(#[from] ParseIntError),
    #[error("unknown {kind} code '{value}'")]
    UnknownCode { kind: &'static str, value: String },
    #[error("invalid color '{0}'")]
    InvalidColor(String),
    #[error("invalid date: {0}")]
    InvalidDate(#[from] chrono::ParseError),
    #[error("invalid date '{0}', expected 8 digits YYYYMMDD")]
    DateDigits(String),
    #[error("invalid time: {0}")]
    InvalidTime(#[from] GtfsParseError),
}

/// Removes one pair of surrounding double quotes.
pub fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

pub fn parse_string(value: &str, config: &ParserConfig) -> String {
    if config.strip_quotes {
        strip_quotes(value).to_string()
    } else {
        value.to_string()
    }
}

pub fn parse_optional_string(value: &str, config: &ParserConfig) -> Option<String> {
    let parsed = parse_string(value, config);
    if parsed.trim().is_empty() {
        None
    } else {
        Some(parsed)
    }
}

/// Quotes the value when it contains the column separator.
pub fn format_string(value: &str) -> String {
    if value.contains(',') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn format_optional_string(value: Option<&str>) -> String {
    value.map(format_string).unwrap_or_default()
}

pub fn parse_double(value: &str, config: &ParserConfig) -> Result<Option<f64>, CodecError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => match config.invalid_double {
            InvalidValuePolicy::Fail => Err(err.into()),
            InvalidValuePolicy::Skip => Ok(None),
            InvalidValuePolicy::UseDefault => Ok(Some(0.0)),
        },
    }
}

pub fn format_double(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

/// Integers reject malformed input regardless of leniency.
pub fn parse_integer<T>(value: &str) -> Result<Option<T>, CodecError>
where
    T: FromStr<Err = ParseIntError>,
{
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.parse::<T>()?))
}

pub fn format_integer<T: Display>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

pub fn parse_bool(value: &str) -> Result<Option<bool>, CodecError> {
    match value.trim() {
        "" => Ok(None),
        "0" => Ok(Some(false)),
        "1" => Ok(Some(true)),
        other => Err(CodecError::InvalidBoolean(other.to_string())),
    }
}

pub fn format_bool(value: Option<bool>) -> String {
    match value {
        Some(true) => "1".to_string(),
        Some(false) => "0".to_string(),
        None => String::new(),
    }
}

pub fn parse_date(value: &str, config: &ParserConfig) -> Result<Option<NaiveDate>, CodecError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    // chrono accepts fewer digits for %Y%m%d, e.g. 2007111.
    if config.date_format == DEFAULT_DATE_FORMAT
        && (trimmed.len() != 8 || !trimmed.bytes().all(|byte| byte.is_ascii_digit()))
    {
        return Err(CodecError::DateDigits(value.to_string()));
    }
    Ok(Some(NaiveDate::parse_from_str(
        trimmed,
        &config.date_format,
    )?))
}

pub fn format_date(value: Option<NaiveDate>, config: &ParserConfig) -> String {
    value
        .map(|date| date.format(&config.date_format).to_string())
        .unwrap_or_default()
}

pub fn parse_time(value: &str, config: &ParserConfig) -> Result<Option<TimeOfDay>, CodecError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match TimeOfDay::parse(trimmed) {
        Ok(time) => Ok(Some(time)),
        Err(err) => match config.invalid_time {
            InvalidValuePolicy::Fail => Err(err.into()),
            InvalidValuePolicy::Skip => Ok(None),
            InvalidValuePolicy::UseDefault => Ok(Some(TimeOfDay::default())),
        },
    }
}

pub fn format_time(value: Option<TimeOfDay>) -> String {
    value.map(|time| time.to_string()).unwrap_or_default()
}

/// Parses `RRGGBB` (opaque) or `AARRGGBB` into a signed ARGB value.
pub fn parse_color(value: &str) -> Result<Option<i32>, CodecError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(CodecError::InvalidColor(value.to_string()));
    }
    let argb = match digits.len() {
        6 => u32::from_str_radix(digits, 16).map(|rgb| rgb | 0xFF00_0000),
        8 => u32::from_str_radix(digits, 16),
        _ => return Err(CodecError::InvalidColor(value.to_string())),
    }
    .map_err(|_| CodecError::InvalidColor(value.to_string()))?;
    Ok(Some(argb as i32))
}

/// Writes `RRGGBB` for opaque colors and `AARRGGBB` otherwise.
pub fn format_color(value: Option<i32>) -> String {
    value
        .map(|argb| {
            let argb = argb as u32;
            if argb >> 24 == 0xFF {
                format!("{:06X}", argb & 0x00FF_FFFF)
            } else {
                format!("{:08X}", argb)
            }
        })
        .unwrap_or_default()
}

pub fn parse_enum<T: CodedEnum>(value: &str) -> Result<Option<T>, CodecError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u16>()
        .ok()
        .and_then(T::from_code)
        .map(Some)
        .ok_or_else(|| CodecError::UnknownCode {
            kind: T::NAME,
            value: trimmed.to_string(),
        })
}

pub fn format_enum<T: CodedEnum>(value: Option<T>) -> String {
    value.map(|value| value.code().to_string()).unwrap_or_default()
}

pub fn parse_location_type(
    value: &str,
    config: &ParserConfig,
) -> Result<Option<LocationType>, CodecError> {
    match parse_enum::<LocationType>(value) {
        Ok(parsed) => Ok(parsed),
        Err(err) => match config.invalid_location_type {
            InvalidValuePolicy::Fail => Err(err),
            InvalidValuePolicy::Skip => Ok(None),
            InvalidValuePolicy::UseDefault => Ok(Some(LocationType::Stop)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtfs_io_model::{ExceptionType, RouteType};

    #[test]
    fn strings_quote_only_with_commas() {
        assert_eq!(format_string("Airport"), "Airport");
        assert_eq!(format_string("Airport, Terminal 2"), "\"Airport, Terminal 2\"");
        assert_eq!(format_optional_string(None), "");
    }

    #[test]
    fn quote_stripping_follows_config() {
        let strict = ParserConfig::strict();
        let lenient = ParserConfig::lenient();
        assert_eq!(parse_string("\"Main St\"", &strict), "\"Main St\"");
        assert_eq!(parse_string("\"Main St\"", &lenient), "Main St");
        assert_eq!(parse_optional_string("\"\"", &lenient), None);
        assert_eq!(parse_optional_string("", &strict), None);
    }

    #[test]
    fn doubles_depend_on_policy() {
        let strict = ParserConfig::strict();
        let lenient = ParserConfig::lenient();
        assert_eq!(parse_double("36.425288", &strict).unwrap(), Some(36.425288));
        assert_eq!(parse_double("  ", &strict).unwrap(), None);
        assert!(matches!(
            parse_double("north", &strict),
            Err(CodecError::InvalidDouble(_))
        ));
        assert_eq!(parse_double("north", &lenient).unwrap(), None);
        assert_eq!(format_double(Some(-117.133162)), "-117.133162");
    }

    #[test]
    fn integers_always_reject_garbage() {
        assert_eq!(parse_integer::<u32>("12").unwrap(), Some(12));
        assert_eq!(parse_integer::<i32>("-3").unwrap(), Some(-3));
        assert_eq!(parse_integer::<u32>("").unwrap(), None);
        assert!(matches!(
            parse_integer::<u32>("1.5"),
            Err(CodecError::InvalidInteger(_))
        ));
    }

    #[test]
    fn booleans_accept_only_zero_and_one() {
        assert_eq!(parse_bool("1").unwrap(), Some(true));
        assert_eq!(parse_bool("0").unwrap(), Some(false));
        assert_eq!(parse_bool("").unwrap(), None);
        assert!(matches!(parse_bool("true"), Err(CodecError::InvalidBoolean(_))));
        assert!(matches!(parse_bool("2"), Err(CodecError::InvalidBoolean(_))));
        assert_eq!(format_bool(Some(true)), "1");
    }

    #[test]
    fn dates_use_configured_format() {
        let mut config = ParserConfig::strict();
        let date = parse_date("20070101", &config).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2007, 1, 1));
        assert_eq!(format_date(date, &config), "20070101");
        assert!(parse_date("2007-01-01", &config).is_err());
        assert!(matches!(
            parse_date("2007111", &config),
            Err(CodecError::DateDigits(_))
        ));
        assert!(matches!(
            parse_date("+2007111", &config),
            Err(CodecError::DateDigits(_))
        ));

        config.date_format = "%Y-%m-%d".to_string();
        assert_eq!(
            parse_date("2007-01-01", &config).unwrap(),
            NaiveDate::from_ymd_opt(2007, 1, 1)
        );
    }

    #[test]
    fn malformed_time_defaults_to_midnight() {
        let mut config = ParserConfig::strict();
        assert_eq!(
            parse_time("bogus", &config).unwrap(),
            Some(TimeOfDay::default())
        );
        config.invalid_time = InvalidValuePolicy::Fail;
        assert!(matches!(
            parse_time("bogus", &config),
            Err(CodecError::InvalidTime(_))
        ));
        config.invalid_time = InvalidValuePolicy::Skip;
        assert_eq!(parse_time("bogus", &config).unwrap(), None);
        assert_eq!(format_time(parse_time("6:20:00", &config).unwrap()), "06:20:00");
    }

    #[test]
    fn colors_parse_to_argb() {
        assert_eq!(parse_color("C4008F").unwrap(), Some(-3932017));
        assert_eq!(parse_color("#FFFFFF").unwrap(), Some(-1));
        assert_eq!(parse_color("0x000000").unwrap(), Some(0xFF00_0000_u32 as i32));
        assert_eq!(parse_color("80FF0000").unwrap(), Some(0x80FF_0000_u32 as i32));
        assert_eq!(parse_color("").unwrap(), None);
        assert!(matches!(parse_color("C4008"), Err(CodecError::InvalidColor(_))));
        assert!(matches!(parse_color("+C4008"), Err(CodecError::InvalidColor(_))));
    }

    #[test]
    fn colors_format_as_rgb() {
        assert_eq!(format_color(Some(-3932017)), "C4008F");
        assert_eq!(format_color(None), "");
        let parsed = parse_color(&format_color(Some(-16777216))).unwrap();
        assert_eq!(parsed, Some(-16777216));
    }

    #[test]
    fn translucent_colors_keep_alpha() {
        let translucent = 0x80FF_0000u32 as i32;
        assert_eq!(format_color(Some(translucent)), "80FF0000");
        assert_eq!(parse_color("80FF0000").unwrap(), Some(translucent));
        assert_eq!(format_color(Some(0x00C4_008F)), "00C4008F");
        assert_eq!(parse_color(&format_color(Some(0x00C4_008F))).unwrap(), Some(0x00C4_008F));
        assert_eq!(format_color(parse_color("FFC4008F").unwrap()), "C4008F");
    }

    #[test]
    fn enums_reject_unknown_codes() {
        assert_eq!(parse_enum::<RouteType>("3").unwrap(), Some(RouteType::Bus));
        assert_eq!(parse_enum::<RouteType>("715").unwrap(), Some(RouteType::Extended(715)));
        assert!(matches!(
            parse_enum::<ExceptionType>("0"),
            Err(CodecError::UnknownCode { kind: "exception_type", .. })
        ));
        assert!(parse_enum::<RouteType>("bus").is_err());
        assert_eq!(format_enum(Some(ExceptionType::Removed)), "2");
        assert_eq!(format_enum::<RouteType>(None), "");
    }

    #[test]
    fn location_type_follows_policy() {
        let strict = ParserConfig::strict();
        let lenient = ParserConfig::lenient();
        assert!(parse_location_type("9", &strict).is_err());
        assert_eq!(parse_location_type("9", &lenient).unwrap(), None);
        assert_eq!(
            parse_location_type("1", &strict).unwrap(),
            Some(LocationType::Station)
        );
    }
}
