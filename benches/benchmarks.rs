use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array3;
use reflectio::{
    engines::{
        memory::{Grid, MemoryEngine},
        Engine,
    },
    pipeline::{pca, BandSelection, CollectionViews, Compositor},
    sensors::SensorBands,
    DateRange, Footprint, PipelineConfig,
};

const SIZE: (usize, usize) = (128, 128);
const BANDS: usize = 32;
const ASSET: &str = "BENCH/HYPER";

fn sensor() -> SensorBands {
    let wavelengths = (0..BANDS).map(|idx| 400. + 10. * idx as f64).collect();
    SensorBands::new("BENCH", Some(ASSET), wavelengths, vec![(0, 11), (16, BANDS - 1)]).unwrap()
}

fn engine() -> MemoryEngine {
    let footprint = Footprint::new((0., 0.), (SIZE.1 as f64 * 30., SIZE.0 as f64 * 30.));
    let mut engine = MemoryEngine::new(Grid::new(footprint, SIZE.0, SIZE.1));
    for day in 1..=5u32 {
        let data = Array3::from_shape_fn((BANDS, SIZE.0, SIZE.1), |(band, row, col)| {
            ((band * 7 + row * 3 + col * day as usize) % 101) as f64 / 100.
        });
        let time = Utc.with_ymd_and_hms(2024, 6, day, 10, 0, 0).unwrap();
        engine
            .add_scene(ASSET, &format!("scene_{day}"), time, footprint, data)
            .unwrap();
    }
    engine
}

fn bench_composite(c: &mut Criterion) {
    let engine = engine();
    let compositor = Compositor::new(CollectionViews::new(&sensor()).unwrap());
    let range = DateRange::days(
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 6).unwrap(),
    )
    .unwrap();
    let image = compositor
        .composite(*engine.grid().footprint(), range, BandSelection::Subset)
        .unwrap();
    c.bench_function("composite_subset", |b| {
        b.iter(|| engine.compute_pixels(&image))
    });
}

fn bench_pca(c: &mut Criterion) {
    let engine = engine();
    let views = CollectionViews::new(&sensor()).unwrap();
    let scene = engine
        .compute_images(&views.full())
        .unwrap()
        .remove(0)
        .select(0..8)
        .unwrap();
    let image = pca(&scene, &PipelineConfig::default()).unwrap();
    c.bench_function("pca_8_bands", |b| b.iter(|| engine.compute_pixels(&image)));
}

criterion_group!(benches, bench_composite, bench_pca);
criterion_main!(benches);
