//! Synthetic customer record generators.
//!
//! All generators take a seed so a failing test reproduces exactly.

use cluster_common::Record;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lower-48 lon/lat box used for uniform scatter: (min_lon, min_lat, max_lon, max_lat).
pub const LOWER48: (f64, f64, f64, f64) = (-124.0, 25.5, -67.5, 48.5);

/// Metro centers (lon, lat) for clustered data.
pub const METROS: &[(&str, f64, f64)] = &[
    ("New York", -74.006, 40.713),
    ("Chicago", -87.630, 41.878),
    ("Dallas", -96.797, 32.777),
    ("Denver", -104.990, 39.739),
    ("Seattle", -122.332, 47.606),
    ("Atlanta", -84.388, 33.749),
    ("Kansas City", -94.578, 39.100),
];

/// Records spread uniformly over the lower 48 with integer values in `1..=max_value`.
///
/// # Example
///
/// ```
/// use test_utils::random_records;
///
/// let a = random_records(100, 20, 7);
/// let b = random_records(100, 20, 7);
/// assert_eq!(a, b);
/// assert!(a.iter().all(|r| r.value >= 1.0 && r.value <= 20.0));
/// ```
pub fn random_records(count: usize, max_value: u32, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (min_lon, min_lat, max_lon, max_lat) = LOWER48;
    (0..count)
        .map(|i| {
            let mut record = Record::at(
                rng.gen_range(min_lon..max_lon),
                rng.gen_range(min_lat..max_lat),
                rng.gen_range(1..=max_value.max(1)) as f64,
            );
            record.address = format!("{} Test Ave", i + 1);
            record
        })
        .collect()
}

/// Records scattered around `METROS`, `per_metro` each, within `spread` degrees.
pub fn metro_records(per_metro: usize, spread: f64, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(per_metro * METROS.len());
    for (name, lon, lat) in METROS {
        for i in 0..per_metro {
            let mut record = Record::at(
                lon + rng.gen_range(-spread..=spread),
                lat + rng.gen_range(-spread..=spread),
                rng.gen_range(1..=10) as f64,
            );
            record.city = name.to_string();
            record.address = format!("{} Metro Rd", i + 1);
            records.push(record);
        }
    }
    records
}

/// Records far outside any US projection domain.
pub fn overseas_records() -> Vec<Record> {
    vec![
        Record::at(-0.128, 51.507, 10.0),  // London
        Record::at(139.692, 35.690, 10.0), // Tokyo
        Record::at(151.209, -33.868, 10.0), // Sydney
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metro_records_counts() {
        let records = metro_records(5, 0.2, 1);
        assert_eq!(records.len(), 5 * METROS.len());
        assert!(records.iter().all(|r| r.is_valid()));
    }

    #[test]
    fn test_random_records_within_box() {
        let (min_lon, min_lat, max_lon, max_lat) = LOWER48;
        for r in random_records(500, 5, 3) {
            assert!(r.lon >= min_lon && r.lon < max_lon);
            assert!(r.lat >= min_lat && r.lat < max_lat);
        }
    }
}
