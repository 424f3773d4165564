use chrono::{Duration, TimeZone, Utc};
use rand::Rng;
use zestra::models::SeriesPoint;

/// Daily points starting 1960 with a random walk for values.
pub fn generate_random_series(length: u64) -> Vec<SeriesPoint> {
    let mut rng = rand::rng();
    let start = Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap();
    let mut value = 100.0;

    (0..length)
        .map(|day| {
            value += rng.random_range(-1.0..=1.0);
            SeriesPoint::new(start + Duration::days(day as i64), value)
        })
        .collect()
}
