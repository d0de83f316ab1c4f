//! Fleet classification and article tagging

use crate::fixtures::{article, named_plant, plant};
use plantwatch::models::generation::FuelType;
use plantwatch::models::news::TopicTag;
use plantwatch::models::status::{DisplayState, FleetSummary};
use plantwatch::news::PlantDirectory;
use plantwatch::pipeline::{classify_fleet, tag_articles};

#[test]
fn fleet_is_benchmarked_against_its_own_region() {
    let strong = plant("A", FuelType::Wind, 100.0, "SPP", &[Some(0.50); 12]);
    let weak = plant("B", FuelType::Wind, 100.0, "SPP", &[Some(0.20); 12]);
    let offline = plant("C", FuelType::Wind, 100.0, "SPP", &[Some(0.0); 12]);

    let classified = classify_fleet(&[strong, weak, offline]);

    let states: Vec<DisplayState> = classified.iter().map(|c| c.display_state).collect();
    assert_eq!(
        states,
        vec![DisplayState::Optimal, DisplayState::Curtailed, DisplayState::MaintenanceOffline]
    );
    // Peer mean is 0.35 because the idle plant is excluded
    assert_eq!(classified[1].status.curtailment_score, 43);
}

#[test]
fn summary_counts_by_state_and_fuel() {
    let classified = classify_fleet(&[
        plant("A", FuelType::Solar, 10.0, "CAISO", &[Some(0.0); 12]),
        plant("B", FuelType::Solar, 10.0, "CAISO", &[Some(0.25); 12]),
        plant("C", FuelType::Nuclear, 1000.0, "PJM", &[None; 12]),
    ]);

    let summary = FleetSummary::from_plants(&classified);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.by_state[&DisplayState::MaintenanceOffline], 2);
    assert_eq!(summary.by_state[&DisplayState::Optimal], 1);
    assert_eq!(summary.by_fuel[&FuelType::Nuclear][&DisplayState::MaintenanceOffline], 1);
}

#[test]
fn duplicate_fetches_merge_their_plant_hints() {
    let directory = PlantDirectory::from_plants(&[named_plant("300", "Sandstone Wind", "Orsted Onshore", "TX")]);
    let mut first = article("Turbine fire halts generation", "Unplanned outage reported", 2);
    first.plant_code = Some("300".to_string());
    let mut again = first.clone();
    again.plant_code = Some("301".to_string());
    let unrelated = article("Regional grid update", "Nothing notable", 1);

    let tagged = tag_articles(vec![first.clone(), again, unrelated], &directory);

    assert_eq!(tagged.len(), 2);
    assert_eq!(tagged[0].id, first.stable_id());
    assert!(tagged[0].matched_plant_codes.contains("300"));
    assert!(tagged[0].matched_plant_codes.contains("301"));
    assert!(tagged[0].topics.contains(&TopicTag::Outage));
    assert!(tagged[1].matched_plant_codes.is_empty());
}
