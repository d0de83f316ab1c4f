//! Classification output for a single plant and fleet-level rollups

use crate::models::generation::FuelType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantStatus {
    pub ttm_average: f64,
    pub is_likely_curtailed: bool,
    pub curtailment_score: u8,
    pub has_no_recent_data: bool,
    pub is_maintenance_offline: bool,
    pub trailing_zero_run_length: usize,
}

impl PlantStatus {
    /// Effective state, evaluated in priority order
    pub fn display_state(&self) -> DisplayState {
        if self.is_maintenance_offline {
            DisplayState::MaintenanceOffline
        } else if self.has_no_recent_data {
            DisplayState::NoRecentData
        } else if self.is_likely_curtailed {
            DisplayState::Curtailed
        } else {
            DisplayState::Optimal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DisplayState {
    MaintenanceOffline,
    NoRecentData,
    Curtailed,
    Optimal,
}

impl DisplayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayState::MaintenanceOffline => "MaintenanceOffline",
            DisplayState::NoRecentData => "NoRecentData",
            DisplayState::Curtailed => "Curtailed",
            DisplayState::Optimal => "Optimal",
        }
    }
}

/// A plant's identity joined with its computed status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedPlant {
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
    pub display_state: DisplayState,
    pub status: PlantStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub total: usize,
    pub by_state: BTreeMap<DisplayState, usize>,
    pub by_fuel: BTreeMap<FuelType, BTreeMap<DisplayState, usize>>,
}

impl FleetSummary {
    pub fn from_plants(plants: &[ClassifiedPlant]) -> Self {
        let mut summary = Self {
            total: plants.len(),
            ..Self::default()
        };
        for plant in plants {
            *summary.by_state.entry(plant.display_state).or_insert(0) += 1;
            *summary
                .by_fuel
                .entry(plant.fuel)
                .or_default()
                .entry(plant.display_state)
                .or_insert(0) += 1;
        }
        summary
    }
}
