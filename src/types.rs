use serde::Serialize;

// ---------- Categorical inputs ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    East,
    West,
    North,
    South,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Case-insensitive lookup.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL.into_iter().find(|v| v.key() == lower)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, DayOfWeek::Saturday | DayOfWeek::Sunday)
    }

    pub fn key(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// Case-insensitive lookup.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL.into_iter().find(|v| v.key() == lower)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

impl Location {
    pub const ALL: [Location; 4] = [Location::East, Location::West, Location::North, Location::South];

    /// Case-insensitive lookup.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL.into_iter().find(|v| v.key() == lower)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            Location::East => "east",
            Location::West => "west",
            Location::North => "north",
            Location::South => "south",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Location::East => "East",
            Location::West => "West",
            Location::North => "North",
            Location::South => "South",
        }
    }
}

/// Resolved request triple.
///
/// `day`, `season` and `location` fall back to the first variant and feed
/// the model encoding. The `known_*` fields keep what was actually
/// recognised, so the heuristic tables can use their neutral defaults for
/// anything else. `seed_key` is the lower-cased raw strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalInput {
    pub day: DayOfWeek,
    pub season: Season,
    pub location: Location,
    pub known_day: Option<DayOfWeek>,
    pub known_season: Option<Season>,
    pub known_location: Option<Location>,
    pub seed_key: String,
}

impl CategoricalInput {
    pub fn resolve(day: &str, season: &str, location: &str) -> Self {
        let known_day = DayOfWeek::parse(day);
        let known_season = Season::parse(season);
        let known_location = Location::parse(location);
        Self {
            day: known_day.unwrap_or(DayOfWeek::Monday),
            season: known_season.unwrap_or(Season::Spring),
            location: known_location.unwrap_or(Location::East),
            known_day,
            known_season,
            known_location,
            seed_key: format!("{}{}{}", day, season, location).to_lowercase(),
        }
    }
}

// ---------- Outputs ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLevel {
    Light,
    Moderate,
    High,
    Heavy,
}

impl TrafficLevel {
    /// <30 light, <60 moderate, <90 high, otherwise heavy.
    pub fn from_raw(raw: f64) -> Self {
        if raw < 30.0 {
            TrafficLevel::Light
        } else if raw < 60.0 {
            TrafficLevel::Moderate
        } else if raw < 90.0 {
            TrafficLevel::High
        } else {
            TrafficLevel::Heavy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRecord {
    pub hour: u8,
    pub traffic_level: TrafficLevel,
    pub is_peak: bool,
    pub raw_prediction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSource {
    Model,
    Fallback,
}

impl PredictionSource {
    /// Label used on the wire (`model_used`).
    pub fn label(self) -> &'static str {
        match self {
            PredictionSource::Model => "ML Model",
            PredictionSource::Fallback => "Fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub input: CategoricalInput,
    pub hourly: Vec<HourlyRecord>,
    pub source: PredictionSource,
    pub base: f64,
    pub timestamp_ms: i64,
}

impl PredictionResult {
    pub fn peak_hours(&self) -> Vec<u8> {
        self.hourly.iter().filter(|r| r.is_peak).map(|r| r.hour).collect()
    }

    pub fn heavy_hours(&self) -> Vec<u8> {
        self.hourly
            .iter()
            .filter(|r| r.traffic_level == TrafficLevel::Heavy)
            .map(|r| r.hour)
            .collect()
    }
}

pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
