use crate::types::CategoricalInput;

pub const FEATURE_COUNT: usize = 9;

/// Column labels of the trained feature schema.
pub const SEMANTIC_COLUMNS: [&str; FEATURE_COUNT] = [
    "day_of_week",
    "season",
    "location",
    "is_weekend",
    "hour_morning",
    "hour_evening",
    "weather",
    "month",
    "temperature",
];

/// Generic labels for models fitted on anonymous columns.
pub const GENERIC_COLUMNS: [&str; FEATURE_COUNT] =
    ["f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9"];

/// [day, season, location, is_weekend, 1, 0, 1, season*3+6, 25.0]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn from_input(input: &CategoricalInput) -> Self {
        let season = input.season.index() as f64;
        FeatureVector([
            input.day.index() as f64,
            season,
            input.location.index() as f64,
            if input.day.is_weekend() { 1.0 } else { 0.0 },
            1.0,
            0.0,
            1.0,
            season * 3.0 + 6.0,
            25.0,
        ])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// One layout a model may be fed. Every variant carries the same values.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelInput {
    Array(FeatureVector),
    Table {
        columns: &'static [&'static str; FEATURE_COUNT],
        values: FeatureVector,
    },
}

impl ModelInput {
    pub fn values(&self) -> &FeatureVector {
        match self {
            ModelInput::Array(v) => v,
            ModelInput::Table { values, .. } => values,
        }
    }

    pub fn columns(&self) -> Option<&'static [&'static str; FEATURE_COUNT]> {
        match self {
            ModelInput::Array(_) => None,
            ModelInput::Table { columns, .. } => Some(*columns),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelInput::Array(_) => "array",
            ModelInput::Table { columns, .. } if columns[0] == SEMANTIC_COLUMNS[0] => "table:semantic",
            ModelInput::Table { .. } => "table:generic",
        }
    }
}

/// Candidate layouts in the order they are tried: raw array, then the
/// semantic table, then the generic table.
pub fn encode(input: &CategoricalInput) -> Vec<ModelInput> {
    let values = FeatureVector::from_input(input);
    vec![
        ModelInput::Array(values),
        ModelInput::Table {
            columns: &SEMANTIC_COLUMNS,
            values,
        },
        ModelInput::Table {
            columns: &GENERIC_COLUMNS,
            values,
        },
    ]
}
