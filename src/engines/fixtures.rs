use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use ndarray::Array3;

use crate::{
    components::{Footprint, Image, PixelType},
    engines::{
        memory::{Grid, MemoryEngine},
        Engine,
    },
};

pub const ASSET: &str = "TEST/HYPER";

/// 4 x 4 pixels of 10 m over (0, 0) - (40, 40).
pub fn grid() -> Grid {
    Grid::new(Footprint::new((0., 0.), (40., 40.)), 4, 4)
}

pub fn june(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 10, 0, 0).unwrap()
}

pub fn band_names(count: usize) -> Arc<[String]> {
    (0..count).map(|idx| format!("B{:03}", idx + 1)).collect()
}

/// Every pixel of band `b` holds `values[b]`.
pub fn flat(values: &[f64]) -> Array3<f64> {
    Array3::from_shape_fn((values.len(), 4, 4), |(band, _, _)| values[band])
}

/// Band `b` holds `(b + 1) * k` at the `k`th pixel in row major order.
pub fn ramp(bands: usize) -> Array3<f64> {
    Array3::from_shape_fn((bands, 4, 4), |(band, row, col)| {
        ((band + 1) * (row * 4 + col)) as f64
    })
}

/// Engine holding full grid scenes under [ASSET], ids `scene_0`, `scene_1`...
pub fn engine(scenes: &[(DateTime<Utc>, Array3<f64>)]) -> MemoryEngine {
    let mut engine = MemoryEngine::new(grid());
    for (idx, (time_start, data)) in scenes.iter().enumerate() {
        engine
            .add_scene(
                ASSET,
                &format!("scene_{idx}"),
                *time_start,
                *grid().footprint(),
                data.clone(),
            )
            .unwrap();
    }
    engine
}

pub fn first_scene(engine: &MemoryEngine, bands: usize) -> Image {
    let info = engine.scenes(ASSET).unwrap().remove(0);
    Image::scene(info, band_names(bands), PixelType::Float64)
}
