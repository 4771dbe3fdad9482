//! Read-only aggregation over history snapshots: the dashboard summary and
//! the series behind the traffic charts.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::hash::Hash;

use crate::pattern;
use crate::types::{CategoricalInput, DayOfWeek, Location, PredictionResult, PredictionSource, Season};

pub const DEFAULT_WINDOW: usize = 10;
pub const CHART_WINDOW: usize = 20;
pub const CHART_MIN_HISTORY: usize = 5;
pub const SAMPLE_ENTRIES: usize = 15;

/// Most frequent value, or "N/A" when there was nothing to count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode<T> {
    Value(T),
    NotAvailable,
}

impl<T: Serialize> Serialize for Mode<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Mode::Value(v) => v.serialize(serializer),
            Mode::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

/// Ties go to whichever value appeared first.
pub fn mode<T, I>(values: I) -> Mode<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut order: Vec<T> = Vec::new();
    let mut counts: HashMap<T, usize> = HashMap::new();
    for v in values {
        let c = counts.entry(v.clone()).or_insert(0);
        if *c == 0 {
            order.push(v);
        }
        *c += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for v in order {
        let c = counts[&v];
        if best.as_ref().map_or(true, |(_, bc)| c > *bc) {
            best = Some((v, c));
        }
    }
    best.map_or(Mode::NotAvailable, |(v, _)| Mode::Value(v))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub total_predictions: usize,
    pub most_common_day: Mode<String>,
    pub most_common_season: Mode<String>,
    pub most_common_location: Mode<String>,
    pub most_common_peak_hour: Mode<u8>,
    pub most_common_heavy_hour: Mode<u8>,
}

/// Modes over the last `window` entries of `history`; the total counts
/// every retained entry.
pub fn summarize(history: &[PredictionResult], window: usize) -> HistorySummary {
    let recent = &history[history.len().saturating_sub(window)..];

    HistorySummary {
        message: history.is_empty().then_some("No prediction history available"),
        total_predictions: history.len(),
        most_common_day: mode(recent.iter().map(|p| p.input.day.name().to_string())),
        most_common_season: mode(recent.iter().map(|p| p.input.season.name().to_string())),
        most_common_location: mode(recent.iter().map(|p| p.input.location.name().to_string())),
        most_common_peak_hour: mode(recent.iter().flat_map(|p| p.peak_hours())),
        most_common_heavy_hour: mode(recent.iter().flat_map(|p| p.heavy_hours())),
    }
}

// ---------- Chart series ----------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub hour: u8,
    pub raw_prediction: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAverage {
    pub key: String,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub sample_data: bool,
    pub entries_used: usize,
    pub hourly_points: Vec<HourlyPoint>,
    pub peak_hour_frequency: Vec<HourCount>,
    pub avg_by_location: Vec<CategoryAverage>,
    pub avg_by_day: Vec<CategoryAverage>,
    pub avg_by_season: Vec<CategoryAverage>,
    pub heavy_hour_frequency: Vec<HourCount>,
}

/// Synthetic entries used while the history is too short to chart.
pub fn sample_entries() -> Vec<PredictionResult> {
    (0..SAMPLE_ENTRIES)
        .map(|i| {
            let day = DayOfWeek::ALL[i % 7];
            let season = Season::ALL[i % 4];
            let location = Location::ALL[i % 4];
            let input = CategoricalInput::resolve(day.key(), season.key(), location.key());
            let base = 50.0 + (i % 30) as f64;
            PredictionResult {
                hourly: pattern::expand(base, &input),
                input,
                source: PredictionSource::Fallback,
                base,
                timestamp_ms: 0,
            }
        })
        .collect()
}

fn hour_frequency(hours: impl Iterator<Item = u8>) -> Vec<HourCount> {
    let mut out: Vec<HourCount> = Vec::new();
    for hour in hours {
        match out.iter_mut().find(|c| c.hour == hour) {
            Some(c) => c.count += 1,
            None => out.push(HourCount { hour, count: 1 }),
        }
    }
    out
}

fn average_by<'a>(
    entries: &'a [PredictionResult],
    key: impl Fn(&'a PredictionResult) -> &'static str,
) -> Vec<CategoryAverage> {
    let mut groups: Vec<(&'static str, Vec<f64>)> = Vec::new();
    for entry in entries {
        if entry.hourly.is_empty() {
            continue;
        }
        let mean = entry.hourly.iter().map(|h| h.raw_prediction).sum::<f64>() / entry.hourly.len() as f64;
        let k = key(entry);
        match groups.iter_mut().find(|(g, _)| *g == k) {
            Some((_, v)) => v.push(mean),
            None => groups.push((k, vec![mean])),
        }
    }
    groups
        .into_iter()
        .map(|(k, v)| CategoryAverage {
            key: k.to_string(),
            average: v.iter().sum::<f64>() / v.len() as f64,
        })
        .collect()
}

/// Series for the six chart panels, from the last 20 entries or from
/// sample data when fewer than 5 predictions exist.
pub fn chart_data(history: &[PredictionResult]) -> ChartData {
    let sample_data = history.len() < CHART_MIN_HISTORY;
    let samples;
    let entries: &[PredictionResult] = if sample_data {
        samples = sample_entries();
        &samples
    } else {
        &history[history.len().saturating_sub(CHART_WINDOW)..]
    };

    ChartData {
        sample_data,
        entries_used: entries.len(),
        hourly_points: entries
            .iter()
            .flat_map(|e| e.hourly.iter())
            .map(|h| HourlyPoint {
                hour: h.hour,
                raw_prediction: h.raw_prediction,
            })
            .collect(),
        peak_hour_frequency: hour_frequency(entries.iter().flat_map(|e| e.peak_hours())),
        avg_by_location: average_by(entries, |e| e.input.location.name()),
        avg_by_day: average_by(entries, |e| e.input.day.name()),
        avg_by_season: average_by(entries, |e| e.input.season.name()),
        heavy_hour_frequency: hour_frequency(entries.iter().flat_map(|e| e.heavy_hours())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::now_ms;

    fn result(day: &str, season: &str, location: &str, base: f64) -> PredictionResult {
        let input = CategoricalInput::resolve(day, season, location);
        PredictionResult {
            hourly: pattern::expand(base, &input),
            input,
            source: PredictionSource::Fallback,
            base,
            timestamp_ms: now_ms(),
        }
    }

    #[test]
    fn test_mode_tie_prefers_first_seen() {
        assert_eq!(mode(vec!["b", "a", "a", "b"]), Mode::Value("b"));
        assert_eq!(mode(vec![3, 1, 1]), Mode::Value(1));
        assert_eq!(mode(Vec::<u8>::new()), Mode::NotAvailable);
    }

    #[test]
    fn test_empty_summary() {
        let s = summarize(&[], DEFAULT_WINDOW);
        assert_eq!(s.total_predictions, 0);
        let json = serde_json::to_value(&s).unwrap();
        for field in [
            "most_common_day",
            "most_common_season",
            "most_common_location",
            "most_common_peak_hour",
            "most_common_heavy_hour",
        ] {
            assert_eq!(json[field], "N/A", "{} should be N/A", field);
        }
        assert_eq!(json["message"], "No prediction history available");
    }

    #[test]
    fn test_identical_entries() {
        let history: Vec<_> = (0..10).map(|_| result("Friday", "Summer", "East", 100.0)).collect();
        let s = summarize(&history, DEFAULT_WINDOW);
        assert_eq!(s.total_predictions, 10);
        assert_eq!(s.most_common_day, Mode::Value("Friday".to_string()));
        assert_eq!(s.most_common_season, Mode::Value("Summer".to_string()));
        assert_eq!(s.most_common_location, Mode::Value("East".to_string()));
        assert_eq!(s.most_common_peak_hour, Mode::Value(7));
        // base 100 Friday/Summer/East: 6am is 0.4 * 158.4 = 63.36, first heavy hour is 7
        assert_eq!(s.most_common_heavy_hour, Mode::Value(7));
        assert!(s.message.is_none());
    }

    #[test]
    fn test_window_limits_modes_not_total() {
        let mut history: Vec<_> = (0..5).map(|_| result("Monday", "Winter", "North", 30.0)).collect();
        history.extend((0..10).map(|_| result("Sunday", "Autumn", "West", 30.0)));
        let s = summarize(&history, DEFAULT_WINDOW);
        assert_eq!(s.total_predictions, 15);
        assert_eq!(s.most_common_day, Mode::Value("Sunday".to_string()));
    }

    #[test]
    fn test_no_heavy_hours_is_na() {
        let history = vec![result("Sunday", "Winter", "North", 10.0)];
        let s = summarize(&history, DEFAULT_WINDOW);
        assert_eq!(s.most_common_heavy_hour, Mode::NotAvailable);
    }

    #[test]
    fn test_chart_uses_samples_for_short_history() {
        let chart = chart_data(&[]);
        assert!(chart.sample_data);
        assert_eq!(chart.entries_used, SAMPLE_ENTRIES);
        assert_eq!(chart.hourly_points.len(), SAMPLE_ENTRIES * 13);
        assert_eq!(chart.avg_by_day.len(), 7);
        assert_eq!(chart.avg_by_season.len(), 4);
        assert_eq!(chart.avg_by_location.len(), 4);
        assert_eq!(chart.avg_by_day[0].key, "Monday");
    }

    #[test]
    fn test_chart_uses_last_twenty() {
        let history: Vec<_> = (0..30).map(|_| result("Tuesday", "Spring", "South", 60.0)).collect();
        let chart = chart_data(&history);
        assert!(!chart.sample_data);
        assert_eq!(chart.entries_used, CHART_WINDOW);
        let seven = chart.peak_hour_frequency.iter().find(|c| c.hour == 7).unwrap();
        assert_eq!(seven.count, CHART_WINDOW);
        assert_eq!(chart.avg_by_location.len(), 1);
    }
}
