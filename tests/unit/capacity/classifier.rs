//! Trend classifier scenarios over whole trailing-year histories

use crate::fixtures::{months, plant, points};
use plantwatch::models::generation::GenerationSample;
use plantwatch::capacity::{analyze_plant, BenchmarkSource, PeerSeries, RegionalPeerTable, TrendClassifier};
use plantwatch::models::generation::FuelType;
use plantwatch::models::status::DisplayState;

fn flat_peer(factor: f64, count: usize) -> PeerSeries {
    months(count).into_iter().map(|m| (m, factor)).collect()
}

#[test]
fn solar_plant_reporting_twelve_zero_months_is_offline() {
    let solar = plant("SOL1", FuelType::Solar, 100.0, "CAISO", &[Some(0.0); 12]);
    let peers = RegionalPeerTable::build(std::slice::from_ref(&solar));

    let analysis = analyze_plant(&solar, &peers);

    assert!(analysis.status.is_maintenance_offline);
    assert_eq!(analysis.status.curtailment_score, 0);
    assert_eq!(analysis.status.ttm_average, 0.0);
    assert_eq!(analysis.status.trailing_zero_run_length, 12);
    assert_eq!(analysis.status.display_state(), DisplayState::MaintenanceOffline);
}

#[test]
fn wind_plant_with_five_active_months_has_no_recent_data() {
    let mut factors = vec![None; 7];
    factors.extend([Some(0.10); 5]);
    let wind = plant("WND1", FuelType::Wind, 50.0, "ERCOT", &factors);
    let peers = RegionalPeerTable::build(std::slice::from_ref(&wind));

    let analysis = analyze_plant(&wind, &peers);

    assert_eq!(analysis.active_months, 5);
    assert!(analysis.status.has_no_recent_data);
    assert!(!analysis.status.is_maintenance_offline);
    assert!(!analysis.status.is_likely_curtailed);
    assert_eq!(analysis.status.curtailment_score, 0);
    assert!((analysis.status.ttm_average - 0.10).abs() < 1e-9);
    assert_eq!(analysis.status.display_state(), DisplayState::NoRecentData);
}

#[test]
fn three_trailing_idle_months_mean_maintenance() {
    let mut factors = vec![Some(0.3); 9];
    factors.extend([None, Some(0.0), None]);

    let status = TrendClassifier::classify(&points(&factors), None, FuelType::Nuclear);

    assert!(status.is_maintenance_offline);
    assert_eq!(status.trailing_zero_run_length, 3);
    assert_eq!(status.curtailment_score, 0);
    assert!(!status.has_no_recent_data);
}

#[test]
fn two_trailing_idle_months_are_not_maintenance() {
    let mut factors = vec![Some(0.3); 10];
    factors.extend([Some(0.0), None]);

    let status = TrendClassifier::classify(&points(&factors), None, FuelType::Wind);

    assert!(!status.is_maintenance_offline);
    assert_eq!(status.trailing_zero_run_length, 2);
    assert!(!status.has_no_recent_data);
}

#[test]
fn average_exactly_at_threshold_is_not_curtailed() {
    let history = points(&[Some(0.5); 12]);
    let peer = flat_peer(0.625, 12);

    let analysis = TrendClassifier::analyze(&history, Some(&peer), FuelType::Wind);

    assert_eq!(analysis.benchmark, BenchmarkSource::Peer);
    assert!(!analysis.status.is_likely_curtailed);
    assert_eq!(analysis.status.curtailment_score, 20);
    assert_eq!(analysis.status.display_state(), DisplayState::Optimal);
}

#[test]
fn average_below_threshold_is_curtailed() {
    let history = points(&[Some(0.49); 12]);
    let peer = flat_peer(0.625, 12);

    let status = TrendClassifier::classify(&history, Some(&peer), FuelType::Wind);

    assert!(status.is_likely_curtailed);
    assert_eq!(status.curtailment_score, 22);
    assert_eq!(status.display_state(), DisplayState::Curtailed);
}

#[test]
fn missing_peer_series_falls_back_to_national_factor() {
    let history = points(&[Some(0.20); 12]);

    let analysis = TrendClassifier::analyze(&history, None, FuelType::Wind);

    assert_eq!(analysis.benchmark, BenchmarkSource::National);
    assert_eq!(analysis.regional_reference, FuelType::Wind.national_typical_factor());
    assert!(analysis.status.is_likely_curtailed);
    assert_eq!(analysis.status.curtailment_score, 43);
}

#[test]
fn outperforming_plant_scores_zero() {
    let status = TrendClassifier::classify(&points(&[Some(0.9); 12]), None, FuelType::Wind);

    assert!(!status.is_likely_curtailed);
    assert_eq!(status.curtailment_score, 0);
}

#[test]
fn only_the_trailing_twelve_months_count() {
    let mut factors = vec![Some(0.0); 12];
    factors.extend([Some(0.3); 12]);

    let status = TrendClassifier::classify(&points(&factors), None, FuelType::Solar);

    assert!(!status.is_maintenance_offline);
    assert!((status.ttm_average - 0.3).abs() < 1e-12);
}

#[test]
fn unreported_months_do_not_dilute_the_average() {
    let mut factors = vec![None; 6];
    factors.extend([Some(0.4); 6]);

    let status = TrendClassifier::classify(&points(&factors), None, FuelType::Wind);

    assert!((status.ttm_average - 0.4).abs() < 1e-12);
    assert!(!status.has_no_recent_data);
}

#[test]
fn reported_energy_on_zero_nameplate_is_not_maintenance() {
    let mut broken = plant("ZNP1", FuelType::Solar, 0.0, "CAISO", &[Some(0.0); 12]);
    broken.samples = months(12)
        .into_iter()
        .map(|m| GenerationSample::new(m, Some(1000.0)))
        .collect();
    let peers = RegionalPeerTable::build(std::slice::from_ref(&broken));

    let analysis = analyze_plant(&broken, &peers);

    assert_eq!(analysis.status.trailing_zero_run_length, 0);
    assert!(!analysis.status.is_maintenance_offline);
    assert!(analysis.status.has_no_recent_data);
    assert_eq!(analysis.active_months, 0);
    assert_eq!(analysis.status.display_state(), DisplayState::NoRecentData);
}

#[test]
fn peer_reference_uses_only_the_plants_active_months() {
    let mut factors = vec![None; 6];
    factors.extend([Some(0.5); 6]);
    let history = points(&factors);

    // Peers run hot while the plant was unreported; the last month has no peer entry
    let peer: PeerSeries = months(11)
        .into_iter()
        .enumerate()
        .map(|(i, m)| (m, if i < 6 { 0.9 } else { 0.4 }))
        .collect();

    let analysis = TrendClassifier::analyze(&history, Some(&peer), FuelType::Wind);

    assert_eq!(analysis.benchmark, BenchmarkSource::Peer);
    assert!((analysis.regional_reference - 0.4).abs() < 1e-12);
    assert!(!analysis.status.is_likely_curtailed);
    assert_eq!(analysis.status.curtailment_score, 0);
}
