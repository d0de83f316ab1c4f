//! Article to plant matching
//!
//! Owner names and plant names are matched case-insensitively as substrings.
//! State mentions only widen a match that an owner name already produced.

use crate::models::generation::Plant;
use crate::news::keywords::{contains_word, state_name};
use std::collections::{BTreeMap, BTreeSet};

/// Owner names shorter than this never match
pub const MIN_OWNER_LEN: usize = 5;
/// Plant names shorter than this never match
pub const MIN_PLANT_NAME_LEN: usize = 8;

#[derive(Debug, Clone)]
struct StateEntry {
    code: String,
    name_lower: Option<String>,
    plants: Vec<String>,
}

/// Lookup tables built once per population snapshot
#[derive(Debug, Clone, Default)]
pub struct PlantDirectory {
    owners: BTreeMap<String, Vec<String>>,
    names: Vec<(String, String)>,
    states: Vec<StateEntry>,
}

impl PlantDirectory {
    pub fn from_plants(plants: &[Plant]) -> Self {
        let mut owners: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut names = Vec::new();
        let mut by_state: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for plant in plants {
            let owner = plant.owner.trim().to_lowercase();
            if owner.chars().count() >= MIN_OWNER_LEN {
                owners.entry(owner).or_default().push(plant.code.clone());
            }

            let name = plant.name.trim().to_lowercase();
            if name.chars().count() >= MIN_PLANT_NAME_LEN {
                names.push((name, plant.code.clone()));
            }

            if let Some(state) = &plant.state {
                by_state
                    .entry(state.to_ascii_uppercase())
                    .or_default()
                    .push(plant.code.clone());
            }
        }

        let states = by_state
            .into_iter()
            .map(|(code, plants)| StateEntry {
                name_lower: state_name(&code).map(str::to_lowercase),
                code,
                plants,
            })
            .collect();

        Self {
            owners,
            names,
            states,
        }
    }

    /// Plant codes an article refers to
    ///
    /// `hint` is the plant a targeted query was issued for and is always included.
    pub fn match_article(&self, text: &str, hint: Option<&str>) -> BTreeSet<String> {
        let lowered = text.to_lowercase();
        let mut matched = BTreeSet::new();

        let mut owner_fired = false;
        for (owner, codes) in &self.owners {
            if lowered.contains(owner.as_str()) {
                owner_fired = true;
                matched.extend(codes.iter().cloned());
            }
        }

        for (name, code) in &self.names {
            if lowered.contains(name.as_str()) {
                matched.insert(code.clone());
            }
        }

        if owner_fired {
            for state in &self.states {
                let code_hit = contains_word(text, &state.code);
                let name_hit = state
                    .name_lower
                    .as_deref()
                    .is_some_and(|name| contains_word(&lowered, name));
                if code_hit || name_hit {
                    matched.extend(state.plants.iter().cloned());
                }
            }
        }

        if let Some(code) = hint.map(str::trim).filter(|c| !c.is_empty()) {
            matched.insert(code.to_string());
        }

        matched
    }
}
