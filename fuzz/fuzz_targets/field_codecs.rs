#![no_main]
use gtfs_io_core::codec;
use gtfs_io_core::ParserConfig;
use gtfs_io_model::{RouteType, TimeOfDay};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let config = ParserConfig::lenient();

    if let Ok(Some(color)) = codec::parse_color(data) {
        let formatted = codec::format_color(Some(color));
        let reparsed = codec::parse_color(&formatted).ok().flatten();
        assert_eq!(reparsed, Some(color));
    }

    if let Ok(time) = TimeOfDay::parse(data) {
        assert_eq!(TimeOfDay::parse(&time.to_string()).ok(), Some(time));
    }

    if let Ok(Some(date)) = codec::parse_date(data, &config) {
        let formatted = codec::format_date(Some(date), &config);
        assert_eq!(codec::parse_date(&formatted, &config).ok().flatten(), Some(date));
    }

    if let Ok(Some(route_type)) = codec::parse_enum::<RouteType>(data) {
        let formatted = codec::format_enum(Some(route_type));
        assert_eq!(codec::parse_enum::<RouteType>(&formatted).ok().flatten(), Some(route_type));
    }

    let _ = codec::parse_double(data, &config);
    let _ = codec::parse_bool(data);
    let _ = codec::parse_integer::<i32>(data);
});
