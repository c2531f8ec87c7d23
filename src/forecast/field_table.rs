//! Which message field feeds which tracked variable.
//!
//! The initial (hour 0) message carries no interval maximum/minimum, no
//! accumulated precipitation and no precipitation-type flags, so its recipes
//! differ from the ones used for every later lead time.

use crate::types::variable::Variable;

pub const TEMPERATURE_2M: &str = "2 metre temperature";
pub const RELATIVE_HUMIDITY_2M: &str = "2 metre relative humidity";
pub const MAXIMUM_TEMPERATURE: &str = "Maximum temperature";
pub const MINIMUM_TEMPERATURE: &str = "Minimum temperature";
pub const TOTAL_PRECIPITATION: &str = "Total Precipitation";
pub const CATEGORICAL_SNOW: &str = "Categorical snow";
pub const CATEGORICAL_ICE_PELLETS: &str = "Categorical ice pellets";
pub const CATEGORICAL_FREEZING_RAIN: &str = "Categorical freezing rain";
pub const CATEGORICAL_RAIN: &str = "Categorical rain";

/// The set of fields a message is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadRegime {
    /// The analysis-time message at forecast hour 0.
    Initial,
    /// Every message after hour 0.
    Forecast,
}

impl LeadRegime {
    pub fn for_lead_time(lead_time: usize) -> Self {
        if lead_time == 0 {
            LeadRegime::Initial
        } else {
            LeadRegime::Forecast
        }
    }

    /// Field whose lat/lon grid is used to locate the target point.
    pub fn grid_reference_field(&self) -> &'static str {
        match self {
            LeadRegime::Initial => TEMPERATURE_2M,
            LeadRegime::Forecast => MAXIMUM_TEMPERATURE,
        }
    }
}

/// Where the raw value of a variable comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRecipe {
    /// Read the named field directly.
    Direct(&'static str),
    /// The variable is exactly zero in this regime.
    Zero,
    /// Derive dewpoint from a temperature (K) and a relative humidity (%) field.
    Dewpoint {
        temperature: &'static str,
        humidity: &'static str,
    },
}

impl FieldRecipe {
    /// Field names this recipe reads.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            FieldRecipe::Direct(name) => vec![*name],
            FieldRecipe::Zero => vec![],
            FieldRecipe::Dewpoint {
                temperature,
                humidity,
            } => vec![*temperature, *humidity],
        }
    }
}

const DEWPOINT: FieldRecipe = FieldRecipe::Dewpoint {
    temperature: TEMPERATURE_2M,
    humidity: RELATIVE_HUMIDITY_2M,
};

/// (variable, hour-0 recipe, later recipe)
const FIELD_TABLE: [(Variable, FieldRecipe, FieldRecipe); 8] = [
    (
        Variable::MaxTemperature,
        FieldRecipe::Direct(TEMPERATURE_2M),
        FieldRecipe::Direct(MAXIMUM_TEMPERATURE),
    ),
    (
        Variable::MinTemperature,
        FieldRecipe::Direct(TEMPERATURE_2M),
        FieldRecipe::Direct(MINIMUM_TEMPERATURE),
    ),
    (Variable::Dewpoint, DEWPOINT, DEWPOINT),
    (
        Variable::Precipitation,
        FieldRecipe::Zero,
        FieldRecipe::Direct(TOTAL_PRECIPITATION),
    ),
    (
        Variable::CategoricalSnow,
        FieldRecipe::Zero,
        FieldRecipe::Direct(CATEGORICAL_SNOW),
    ),
    (
        Variable::CategoricalIcePellets,
        FieldRecipe::Zero,
        FieldRecipe::Direct(CATEGORICAL_ICE_PELLETS),
    ),
    (
        Variable::CategoricalFreezingRain,
        FieldRecipe::Zero,
        FieldRecipe::Direct(CATEGORICAL_FREEZING_RAIN),
    ),
    (
        Variable::CategoricalRain,
        FieldRecipe::Zero,
        FieldRecipe::Direct(CATEGORICAL_RAIN),
    ),
];

pub fn recipe(variable: Variable, regime: LeadRegime) -> FieldRecipe {
    FIELD_TABLE
        .iter()
        .find(|(v, _, _)| *v == variable)
        .map(|(_, initial, forecast)| match regime {
            LeadRegime::Initial => *initial,
            LeadRegime::Forecast => *forecast,
        })
        // FIELD_TABLE lists every variable
        .unwrap_or(FieldRecipe::Zero)
}

/// Every distinct field a message of this regime must provide, grid reference first.
pub fn required_fields(regime: LeadRegime) -> Vec<&'static str> {
    let mut names = vec![regime.grid_reference_field()];
    for variable in Variable::ALL {
        for name in recipe(variable, regime).fields() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}
