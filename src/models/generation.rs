//! Plant and generation-series records

use crate::models::error::{IngestError, MonthParseError};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Calendar month, serialized as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthParseError> {
        if !(1..=12).contains(&month) {
            return Err(MonthParseError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// Number of days in this month, leap years included
    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        // Both dates are valid for any month in 1..=12
        match (
            NaiveDate::from_ymd_opt(self.year, self.month, 1),
            NaiveDate::from_ymd_opt(next_year, next_month, 1),
        ) {
            (Some(start), Some(end)) => end.signed_duration_since(start).num_days() as u32,
            _ => 30,
        }
    }

    pub fn hours(&self) -> f64 {
        f64::from(self.days_in_month() * 24)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| MonthParseError::Format(trimmed.to_string()))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(MonthParseError::Format(trimmed.to_string()));
        }
        let year = year
            .parse::<i32>()
            .map_err(|_| MonthParseError::Format(trimmed.to_string()))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| MonthParseError::Format(trimmed.to_string()))?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Generation technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum FuelType {
    Wind,
    Solar,
    Nuclear,
}

impl FuelType {
    pub const WIND_TYPICAL: f64 = 0.35;
    pub const SOLAR_TYPICAL: f64 = 0.22;
    pub const NUCLEAR_TYPICAL: f64 = 0.92;

    /// National-typical capacity factor used when no peer benchmark exists
    pub fn national_typical_factor(&self) -> f64 {
        match self {
            FuelType::Wind => Self::WIND_TYPICAL,
            FuelType::Solar => Self::SOLAR_TYPICAL,
            FuelType::Nuclear => Self::NUCLEAR_TYPICAL,
        }
    }

    /// Word used when building plant-targeted news queries
    pub fn news_keyword(&self) -> &'static str {
        match self {
            FuelType::Wind => "wind farm",
            FuelType::Solar => "solar",
            FuelType::Nuclear => "nuclear plant",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Wind => "Wind",
            FuelType::Solar => "Solar",
            FuelType::Nuclear => "Nuclear",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wind" | "wnd" => Ok(FuelType::Wind),
            "solar" | "sun" => Ok(FuelType::Solar),
            "nuclear" | "nuc" => Ok(FuelType::Nuclear),
            other => Err(IngestError::UnknownFuel(other.to_string())),
        }
    }
}

/// One reported month; `None` means the source had no value, distinct from zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSample {
    pub month: YearMonth,
    #[serde(rename = "energyMWh")]
    pub energy_mwh: Option<f64>,
}

impl GenerationSample {
    pub fn new(month: YearMonth, energy_mwh: Option<f64>) -> Self {
        Self { month, energy_mwh }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub code: String,
    pub name: String,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
    pub fuel: FuelType,
    pub nameplate_mw: f64,
    #[serde(default)]
    pub samples: Vec<GenerationSample>,
}

/// Derived monthly capacity factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityFactorPoint {
    pub month: YearMonth,
    pub factor: Option<f64>,
    /// The underlying sample was missing or exactly 0 MWh
    #[serde(default)]
    pub idle: bool,
}

impl CapacityFactorPoint {
    /// Point for an already-derived factor; idle when the factor is missing or 0
    pub fn new(month: YearMonth, factor: Option<f64>) -> Self {
        Self {
            month,
            factor,
            idle: factor.map_or(true, |f| f == 0.0),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }
}

/// Storage-layer shape of a plant before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlantRow {
    pub code: String,
    pub name: String,
    pub owner: String,
    pub state: Option<String>,
    pub region: String,
    pub subregion: Option<String>,
    pub fuel: String,
    pub nameplate_mw: Option<f64>,
    pub samples: Vec<SampleRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleRow {
    pub month: String,
    #[serde(rename = "energyMWh")]
    pub energy_mwh: Option<f64>,
}

impl TryFrom<PlantRow> for Plant {
    type Error = IngestError;

    fn try_from(row: PlantRow) -> Result<Self, Self::Error> {
        let code = row.code.trim().to_string();
        if code.is_empty() {
            return Err(IngestError::MissingField("code".to_string()));
        }
        let fuel: FuelType = row.fuel.parse()?;
        let nameplate_mw = row
            .nameplate_mw
            .ok_or_else(|| IngestError::MissingField(format!("{}: nameplate_mw", code)))?;

        let mut seen = BTreeSet::new();
        let mut samples = Vec::with_capacity(row.samples.len());
        for sample in row.samples {
            let month: YearMonth = sample.month.parse().map_err(|e| IngestError::BadMonth {
                plant: code.clone(),
                source: e,
            })?;
            if !seen.insert(month) {
                return Err(IngestError::DuplicateMonth {
                    plant: code.clone(),
                    month: month.to_string(),
                });
            }
            let energy_mwh = sample.energy_mwh.filter(|v| v.is_finite());
            samples.push(GenerationSample { month, energy_mwh });
        }
        samples.sort_by_key(|s| s.month);

        let state = row
            .state
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty());
        let subregion = row
            .subregion
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Plant {
            code,
            name: row.name.trim().to_string(),
            owner: row.owner.trim().to_string(),
            state,
            region: row.region.trim().to_string(),
            subregion,
            fuel,
            nameplate_mw,
            samples,
        })
    }
}
