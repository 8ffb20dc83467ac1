//! # Text Classifier Module
//!
//! Keyword heuristics that turn a page `(title, content)` pair into the
//! filterable metadata stored alongside every vector in the index.
//!
//! ## Key Components
//!
//! - `LocationType` / `AttractionCategory`: closed taxonomies
//! - `classify_location` / `classify_attraction`: first-match-wins over the
//!   ordered rule tables in `rules`
//! - `extract_features`, `extract_price_range`, `extract_opening_hours`,
//!   `is_tourism_related`, `extract_county`, `region_for_county`
//! - `classify`: bundles everything into a `Classification`
//!
//! Everything here is pure and deterministic. An ambiguous page is never an
//! error, it simply ends up `Unknown` with empty optional fields.

mod extract;
mod rules;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub use extract::{
    extract_county, extract_features, extract_opening_hours, extract_price_range,
    is_tourism_related, region_for_county,
};
pub use rules::{ATTRACTION_RULES, LOCATION_RULES, Rule, classify_link_title};

/// Kind of place a page describes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    County,
    City,
    Town,
    Village,
    Natural,
    Historical,
    Cultural,
    Entertainment,
    Accommodation,
    #[default]
    Unknown,
}

impl LocationType {
    pub const ALL: [LocationType; 10] = [
        LocationType::County,
        LocationType::City,
        LocationType::Town,
        LocationType::Village,
        LocationType::Natural,
        LocationType::Historical,
        LocationType::Cultural,
        LocationType::Entertainment,
        LocationType::Accommodation,
        LocationType::Unknown,
    ];

    /// Payload value for this location type
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::County => "county",
            LocationType::City => "city",
            LocationType::Town => "town",
            LocationType::Village => "village",
            LocationType::Natural => "natural",
            LocationType::Historical => "historical",
            LocationType::Cultural => "cultural",
            LocationType::Entertainment => "entertainment",
            LocationType::Accommodation => "accommodation",
            LocationType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocationType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown location type: {}", s))
    }
}

/// Category of attraction a page describes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttractionCategory {
    Heritage,
    Nature,
    Culture,
    Entertainment,
    Sports,
    FoodDrink,
    Shopping,
    Accommodation,
    Transport,
    #[default]
    Unknown,
}

impl AttractionCategory {
    pub const ALL: [AttractionCategory; 10] = [
        AttractionCategory::Heritage,
        AttractionCategory::Nature,
        AttractionCategory::Culture,
        AttractionCategory::Entertainment,
        AttractionCategory::Sports,
        AttractionCategory::FoodDrink,
        AttractionCategory::Shopping,
        AttractionCategory::Accommodation,
        AttractionCategory::Transport,
        AttractionCategory::Unknown,
    ];

    /// Payload value for this category
    pub fn as_str(&self) -> &'static str {
        match self {
            AttractionCategory::Heritage => "heritage",
            AttractionCategory::Nature => "nature",
            AttractionCategory::Culture => "culture",
            AttractionCategory::Entertainment => "entertainment",
            AttractionCategory::Sports => "sports",
            AttractionCategory::FoodDrink => "food_drink",
            AttractionCategory::Shopping => "shopping",
            AttractionCategory::Accommodation => "accommodation",
            AttractionCategory::Transport => "transport",
            AttractionCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AttractionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttractionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttractionCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown attraction category: {}", s))
    }
}

/// How a discovered link was classified from its title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Place,
    Attraction,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Place => "place",
            LinkKind::Attraction => "attraction",
        }
    }
}

/// Everything the classifier derives from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub location_type: LocationType,
    pub attraction_category: AttractionCategory,
    pub features: BTreeSet<String>,
    pub price_range: Option<String>,
    pub opening_hours: Option<String>,
    pub tourism_related: bool,
    pub county: Option<String>,
    pub region: Option<String>,
}

/// Resolve the location type of a page, first matching rule wins
pub fn classify_location(title: &str, content: &str) -> LocationType {
    rules::first_match(&LOCATION_RULES, title, content).unwrap_or(LocationType::Unknown)
}

/// Resolve the attraction category of a page, first matching rule wins
pub fn classify_attraction(title: &str, content: &str) -> AttractionCategory {
    rules::first_match(&ATTRACTION_RULES, title, content).unwrap_or(AttractionCategory::Unknown)
}

/// Run every classifier over a fetched page
pub fn classify(title: &str, content: &str) -> Classification {
    let county = extract_county(content);
    let region = county
        .as_deref()
        .and_then(region_for_county)
        .map(str::to_string);

    Classification {
        location_type: classify_location(title, content),
        attraction_category: classify_attraction(title, content),
        features: extract_features(content),
        price_range: extract_price_range(content),
        opening_hours: extract_opening_hours(content),
        tourism_related: is_tourism_related(content),
        county,
        region,
    }
}

/// Classification for a lightweight record, which only has a title to go on
pub fn classify_title(title: &str) -> Classification {
    Classification {
        location_type: classify_location(title, ""),
        attraction_category: classify_attraction(title, ""),
        features: BTreeSet::new(),
        price_range: None,
        opening_hours: None,
        tourism_related: false,
        county: None,
        region: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_cases() {
        assert_eq!(classify_location("County Clare", ""), LocationType::County);
        assert_eq!(
            classify_location("Blarney Castle", "ruins of a castle"),
            LocationType::Historical
        );
        assert_eq!(
            classify_attraction("Blarney Castle", "heritage site, historic monument"),
            AttractionCategory::Heritage
        );
        assert_eq!(
            extract_price_range("Free admission to all visitors").as_deref(),
            Some("free")
        );
    }

    #[test]
    fn test_location_priority_order() {
        // county beats city even when a known city is named
        assert_eq!(classify_location("County Dublin", ""), LocationType::County);
        assert_eq!(classify_location("Cork (city)", ""), LocationType::City);
        assert_eq!(classify_location("Galway", ""), LocationType::City);
        assert_eq!(classify_location("Sligo (town)", ""), LocationType::Town);
        assert_eq!(
            classify_location("Westport", "a market town on Clew Bay"),
            LocationType::Town
        );
        assert_eq!(classify_location("Cong village", ""), LocationType::Village);
        assert_eq!(
            classify_location("Killarney National Park", ""),
            LocationType::Natural
        );
        assert_eq!(
            classify_location("Hunt Museum", "exhibits"),
            LocationType::Cultural
        );
        assert_eq!(
            classify_location("Temple Bar pub", ""),
            LocationType::Entertainment
        );
        assert_eq!(
            classify_location("Ashford resort", ""),
            LocationType::Accommodation
        );
        assert_eq!(classify_location("Irish dance", ""), LocationType::Unknown);
    }

    #[test]
    fn test_location_content_only_matters_for_town() {
        // "castle" in content alone must not make a page historical
        assert_eq!(
            classify_location("Newgrange", "near a ruined castle"),
            LocationType::Unknown
        );
    }

    #[test]
    fn test_attraction_uses_content() {
        assert_eq!(
            classify_attraction("Croke Park", "a stadium used for sport"),
            AttractionCategory::Nature
        );
        assert_eq!(
            classify_attraction("Aviva", "a venue for sport and fitness"),
            AttractionCategory::Sports
        );
        assert_eq!(
            classify_attraction("Heuston", "a railway station"),
            AttractionCategory::Transport
        );
        assert_eq!(classify_attraction("Irish dance", ""), AttractionCategory::Unknown);
    }

    #[test]
    fn test_classify_bundles_metadata() {
        let content = "Bunratty Castle is a tower house in County Clare. \
                       Guided tour available, admission €10 to €15. \
                       Opening hours: 9am to 5pm daily. A popular tourist attraction.";
        let classification = classify("Bunratty Castle", content);

        assert_eq!(classification.location_type, LocationType::Historical);
        assert_eq!(classification.attraction_category, AttractionCategory::Heritage);
        assert_eq!(classification.county.as_deref(), Some("Clare"));
        assert_eq!(classification.region.as_deref(), Some("Southwest"));
        assert_eq!(classification.price_range.as_deref(), Some("€10-€15"));
        assert_eq!(
            classification.opening_hours.as_deref(),
            Some("9am to 5pm daily")
        );
        assert!(classification.tourism_related);
        assert!(classification.features.contains("guided_tours"));
        assert!(classification.features.contains("paid_entry"));
    }

    #[test]
    fn test_classify_title_has_no_content_metadata() {
        let classification = classify_title("Lough Derg");
        assert_eq!(classification.location_type, LocationType::Unknown);
        assert!(classification.features.is_empty());
        assert!(!classification.tourism_related);
        assert!(classification.county.is_none());
    }

    #[test]
    fn test_taxonomy_round_trip_names() {
        assert_eq!(AttractionCategory::FoodDrink.as_str(), "food_drink");
        assert_eq!("food_drink".parse(), Ok(AttractionCategory::FoodDrink));
        assert_eq!("Natural".parse(), Ok(LocationType::Natural));
        assert!("harbour".parse::<LocationType>().is_err());
        assert_eq!(
            serde_json::to_string(&AttractionCategory::FoodDrink).unwrap(),
            "\"food_drink\""
        );
    }
}
