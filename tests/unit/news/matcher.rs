//! Article matching against the plant population

use crate::fixtures::named_plant;
use plantwatch::news::PlantDirectory;
use std::collections::BTreeSet;

fn codes(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn directory() -> PlantDirectory {
    PlantDirectory::from_plants(&[
        named_plant("100", "Prairie Winds Farm", "NextEra Energy", "IA"),
        named_plant("101", "Hawkeye Ridge Wind", "NextEra Energy", "MN"),
        named_plant("200", "Big Sky Solar Array", "Acme", "IA"),
        named_plant("300", "Sandstone Wind", "Orsted Onshore", "TX"),
    ])
}

#[test]
fn owner_mention_matches_every_plant_of_that_owner() {
    let matched = directory().match_article("NextEra Energy reports strong quarter", None);
    assert_eq!(matched, codes(&["100", "101"]));
}

#[test]
fn short_owner_never_matches() {
    let matched = directory().match_article("Acme announces layoffs in Iowa", None);
    assert!(matched.is_empty());
}

#[test]
fn bare_state_mention_matches_nothing() {
    let matched = directory().match_article("Ice storm knocks out turbines across IA and Texas", None);
    assert!(matched.is_empty());
}

#[test]
fn state_widens_an_owner_match() {
    let matched = directory().match_article("Orsted Onshore expands, citing demand in Iowa", None);
    assert_eq!(matched, codes(&["100", "200", "300"]));
}

#[test]
fn plant_name_matches_that_plant_only() {
    let matched = directory().match_article("Crews inspect the big sky solar array after hail", None);
    assert_eq!(matched, codes(&["200"]));
}

#[test]
fn query_hint_is_always_included() {
    let matched = directory().match_article("Nothing relevant here", Some("300"));
    assert_eq!(matched, codes(&["300"]));
}
