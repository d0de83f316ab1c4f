//! Fixed keyword lists for topic and sentiment tagging
//!
//! All entries are lowercase and matched as substrings of the lowercased text.

use crate::models::news::TopicTag;

pub const OUTAGE_KEYWORDS: &[&str] = &[
    "outage",
    "shutdown",
    "shut down",
    "offline",
    "tripped",
    "scram",
    "refueling",
    "unplanned",
    "curtail",
    "forced out",
    "maintenance",
];

pub const REGULATORY_KEYWORDS: &[&str] = &[
    "nrc",
    "ferc",
    "regulator",
    "regulatory",
    "permit",
    "license",
    "licence",
    "compliance",
    "violation",
    "penalty",
    "public utility commission",
    "interconnection queue",
];

pub const FINANCIAL_KEYWORDS: &[&str] = &[
    "earnings",
    "revenue",
    "profit",
    "bankrupt",
    "acquisition",
    "acquire",
    "divest",
    "financing",
    "investment",
    "debt",
    "quarterly",
    "stock",
    "shares",
    "tax credit",
];

pub const WEATHER_KEYWORDS: &[&str] = &[
    "storm",
    "hurricane",
    "tornado",
    "hail",
    "wildfire",
    "drought",
    "heat wave",
    "heatwave",
    "freeze",
    "icing",
    "snow",
    "flood",
    "lightning",
];

pub const CONSTRUCTION_KEYWORDS: &[&str] = &[
    "construction",
    "groundbreaking",
    "expansion",
    "repower",
    "uprate",
    "build-out",
    "buildout",
    "install",
    "commissioning",
    "under development",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "outage",
    "shut",
    "fail",
    "accident",
    "leak",
    "fire",
    "damage",
    "loss",
    "lawsuit",
    "violation",
    "penalty",
    "fined",
    "decline",
    "delay",
    "cancel",
    "crisis",
    "emergency",
    "curtail",
    "bankrupt",
    "closure",
    "halt",
    "warning",
    "problem",
    "concern",
];

pub const POSITIVE_WORDS: &[&str] = &[
    "record",
    "growth",
    "increase",
    "approve",
    "success",
    "expand",
    "expansion",
    "milestone",
    "profit",
    "gain",
    "improve",
    "upgrade",
    "restored",
    "restart",
    "award",
    "boost",
    "strong",
    "efficient",
];

/// Topic tags in evaluation order, paired with their keyword lists
pub const TOPIC_KEYWORDS: &[(TopicTag, &[&str])] = &[
    (TopicTag::Outage, OUTAGE_KEYWORDS),
    (TopicTag::Regulatory, REGULATORY_KEYWORDS),
    (TopicTag::Financial, FINANCIAL_KEYWORDS),
    (TopicTag::Weather, WEATHER_KEYWORDS),
    (TopicTag::Construction, CONSTRUCTION_KEYWORDS),
];

/// Two-letter postal codes and full names (50 states + DC)
pub const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

pub fn state_name(code: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Total substring occurrences of every keyword in already-lowercased text
pub fn count_occurrences(lowered: &str, keywords: &[&str]) -> usize {
    keywords.iter().map(|kw| lowered.matches(kw).count()).sum()
}

/// True when `needle` occurs in `haystack` bounded by non-alphanumeric characters
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}
