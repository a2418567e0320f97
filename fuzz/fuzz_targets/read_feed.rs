#![no_main]
use arbitrary::Arbitrary;
use gtfs_io_core::{MemorySource, MemoryTargets, Reader, SourceFile, Writer};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Table {
    selector: u8,
    content: String,
}

const TABLES: &[&str] = &[
    "agency",
    "stops",
    "routes",
    "trips",
    "stop_times",
    "calendar",
    "calendar_dates",
    "frequencies",
    "shapes",
];

fuzz_target!(|tables: Vec<Table>| {
    let sources: Vec<Box<dyn SourceFile>> = tables
        .into_iter()
        .map(|table| {
            let name = TABLES[table.selector as usize % TABLES.len()];
            Box::new(MemorySource::from_text(name, table.content)) as Box<dyn SourceFile>
        })
        .collect();

    // Whatever reads must also write and read back.
    if let Ok(feed) = Reader::lenient().read_feed(&sources) {
        let mut targets = MemoryTargets::new();
        if Writer::default().write(&feed, &mut targets).is_ok() {
            let _ = Reader::lenient().read_feed(&targets.into_sources());
        }
    }
});
