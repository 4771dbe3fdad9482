use crate::types::{CategoricalInput, DayOfWeek, HourlyRecord, Location, Season, TrafficLevel};

/// Representative hours and their intraday shape factor.
pub const HOUR_SHAPE: [(u8, f64); 13] = [
    (6, 0.4),
    (7, 0.8),
    (8, 1.2),
    (9, 1.0),
    (10, 0.7),
    (12, 0.8),
    (14, 0.6),
    (16, 0.9),
    (17, 1.3),
    (18, 1.5),
    (19, 1.1),
    (20, 0.8),
    (22, 0.5),
];

pub const PEAK_HOURS: [u8; 6] = [7, 8, 9, 17, 18, 19];

pub fn is_peak(hour: u8) -> bool {
    PEAK_HOURS.contains(&hour)
}

// Unrecognised values scale by 1.0.

pub fn day_multiplier(day: Option<DayOfWeek>) -> f64 {
    match day {
        Some(DayOfWeek::Monday) => 1.1,
        Some(DayOfWeek::Friday) => 1.2,
        Some(DayOfWeek::Saturday) => 0.8,
        Some(DayOfWeek::Sunday) => 0.7,
        Some(DayOfWeek::Tuesday | DayOfWeek::Wednesday | DayOfWeek::Thursday) | None => 1.0,
    }
}

pub fn season_multiplier(season: Option<Season>) -> f64 {
    match season {
        Some(Season::Summer) => 1.1,
        Some(Season::Autumn) => 0.9,
        Some(Season::Winter) => 0.8,
        Some(Season::Spring) | None => 1.0,
    }
}

pub fn location_multiplier(location: Option<Location>) -> f64 {
    match location {
        Some(Location::East) => 1.2,
        Some(Location::West) => 1.1,
        Some(Location::North) => 0.9,
        Some(Location::South) | None => 1.0,
    }
}

/// Spreads a daily base value over the 13 representative hours.
pub fn expand(base: f64, input: &CategoricalInput) -> Vec<HourlyRecord> {
    let day = day_multiplier(input.known_day);
    let season = season_multiplier(input.known_season);
    let location = location_multiplier(input.known_location);

    HOUR_SHAPE
        .iter()
        .map(|&(hour, shape)| {
            let raw = base * shape * day * season * location;
            HourlyRecord {
                hour,
                traffic_level: TrafficLevel::from_raw(raw),
                is_peak: is_peak(hour),
                raw_prediction: raw,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_hours_and_peaks() {
        let input = CategoricalInput::resolve("Wednesday", "Autumn", "North");
        let records = expand(60.0, &input);
        let hours: Vec<u8> = records.iter().map(|r| r.hour).collect();
        assert_eq!(hours, vec![6, 7, 8, 9, 10, 12, 14, 16, 17, 18, 19, 20, 22]);
        for r in &records {
            assert_eq!(r.is_peak, [7, 8, 9, 17, 18, 19].contains(&r.hour));
        }
    }

    #[test]
    fn test_peaks_independent_of_magnitude() {
        let input = CategoricalInput::resolve("Sunday", "Winter", "North");
        for base in [0.0, 1.0, 500.0] {
            let peaks: Vec<u8> = expand(base, &input)
                .iter()
                .filter(|r| r.is_peak)
                .map(|r| r.hour)
                .collect();
            assert_eq!(peaks, PEAK_HOURS.to_vec());
        }
    }

    #[test]
    fn test_raw_value_at_evening_rush() {
        let input = CategoricalInput::resolve("Friday", "Summer", "East");
        let records = expand(100.0, &input);
        let six_pm = records.iter().find(|r| r.hour == 18).unwrap();
        let expected = 100.0 * 1.5 * 1.2 * 1.1 * 1.2;
        assert!((six_pm.raw_prediction - expected).abs() < 1e-9);
        assert_eq!(six_pm.traffic_level, TrafficLevel::Heavy);
    }

    #[test]
    fn test_unknown_values_scale_by_one() {
        assert_eq!(day_multiplier(None), 1.0);
        assert_eq!(season_multiplier(None), 1.0);
        assert_eq!(location_multiplier(None), 1.0);

        let input = CategoricalInput::resolve("Funday", "Rainy", "Mars");
        let records = expand(49.0, &input);
        let six_pm = records.iter().find(|r| r.hour == 18).unwrap();
        assert!((six_pm.raw_prediction - 49.0 * 1.5).abs() < 1e-9);
        assert_eq!(six_pm.traffic_level, TrafficLevel::High);

        // Monday/Spring/East would scale by 1.1 * 1.0 * 1.2
        let monday = expand(49.0, &CategoricalInput::resolve("Monday", "Spring", "East"));
        assert!(monday[9].raw_prediction > six_pm.raw_prediction);
    }

    #[test]
    fn test_levels_follow_raw_values() {
        let input = CategoricalInput::resolve("Tuesday", "Spring", "South");
        for r in expand(55.0, &input) {
            assert_eq!(r.traffic_level, TrafficLevel::from_raw(r.raw_prediction));
        }
    }
}
