use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gtfs_io_core::{MemorySource, MemoryTargets, Reader, SourceFile, Writer};

// Synthetic feed with many trips so stop_times dominates, as in real feeds.
fn generate_sources(num_trips: usize, stops_per_trip: usize) -> Vec<Box<dyn SourceFile>> {
    let mut stops = String::from("stop_id,stop_name,stop_lat,stop_lon\n");
    for i in 0..stops_per_trip {
        stops.push_str(&format!("S{},Stop {},{},{}\n", i, i, 36.0 + i as f64 * 0.001, -116.0));
    }

    let mut trips = String::from("route_id,service_id,trip_id\n");
    let mut stop_times =
        String::from("trip_id,arrival_time,departure_time,stop_id,stop_sequence\n");
    for trip in 0..num_trips {
        trips.push_str(&format!("R1,WK,T{}\n", trip));
        // Reverse sequence order so the reader has to sort.
        for seq in (0..stops_per_trip).rev() {
            let seconds = 6 * 3600 + trip * 60 + seq * 90;
            stop_times.push_str(&format!(
                "T{},{}:{:02}:{:02},{}:{:02}:{:02},S{},{}\n",
                trip,
                seconds / 3600,
                (seconds % 3600) / 60,
                seconds % 60,
                seconds / 3600,
                (seconds % 3600) / 60,
                seconds % 60,
                seq,
                seq + 1
            ));
        }
    }

    vec![
        Box::new(MemorySource::from_text(
            "agency",
            "agency_id,agency_name,agency_url,agency_timezone\nA,Bench,http://example.com,UTC\n",
        )),
        Box::new(MemorySource::from_text(
            "routes",
            "route_id,agency_id,route_short_name,route_long_name,route_type\nR1,A,1,Bench,3\n",
        )),
        Box::new(MemorySource::from_text(
            "calendar_dates",
            "service_id,date,exception_type\nWK,20240101,1\n",
        )),
        Box::new(MemorySource::from_text("stops", stops)),
        Box::new(MemorySource::from_text("trips", trips)),
        Box::new(MemorySource::from_text("stop_times", stop_times)),
    ]
}

fn bench_loading(c: &mut Criterion) {
    let sources = generate_sources(2_000, 30);
    let reader = Reader::strict();

    c.bench_function("read_feed_60k_stop_times", |b| {
        b.iter(|| {
            let feed = reader.read_feed(black_box(&sources)).expect("feed should load");
            black_box(feed.stop_times.len())
        })
    });

    let feed = reader.read_feed(&sources).expect("feed should load");
    let writer = Writer::default();
    c.bench_function("write_feed_60k_stop_times", |b| {
        b.iter(|| {
            let mut targets = MemoryTargets::new();
            writer.write(black_box(&feed), &mut targets).expect("feed should write");
            black_box(targets)
        })
    });
}

criterion_group!(benches, bench_loading);
criterion_main!(benches);
