//! Conjunctive search filters
//!
//! A `SearchFilter` pins metadata fields to values. Backends render it through
//! `predicates()`, so every backend sees the same list of conditions; a record
//! matches only when all of them hold.

use serde::{Deserialize, Serialize};

use super::{PagePayload, RecordKind};
use crate::classifier::{AttractionCategory, LocationType};

/// Right hand side of an equality predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Keyword(String),
    Bool(bool),
}

/// A single condition on a payload field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Field equals value
    Equals {
        field: &'static str,
        value: FieldValue,
    },
    /// List field contains value
    Contains { field: &'static str, value: String },
    /// Field is present and non-empty
    NotEmpty { field: &'static str },
}

/// Metadata constraints for a similarity search; the default is unrestricted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_type: Option<LocationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attraction_category: Option<AttractionCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tourism_related: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default)]
    pub has_opening_hours: bool,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: RecordKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn location_type(mut self, location_type: LocationType) -> Self {
        self.location_type = Some(location_type);
        self
    }

    pub fn attraction_category(mut self, category: AttractionCategory) -> Self {
        self.attraction_category = Some(category);
        self
    }

    pub fn county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Require membership of `feature`; repeatable
    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        let feature = feature.into();
        if !self.features.contains(&feature) {
            self.features.push(feature);
        }
        self
    }

    pub fn tourism_related(mut self, tourism_related: bool) -> Self {
        self.tourism_related = Some(tourism_related);
        self
    }

    pub fn price_range(mut self, price_range: impl Into<String>) -> Self {
        self.price_range = Some(price_range.into());
        self
    }

    pub fn with_opening_hours(mut self) -> Self {
        self.has_opening_hours = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    /// Flatten into the list of conditions a record must satisfy
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        let mut keyword = |field: &'static str, value: Option<&str>| {
            if let Some(value) = value {
                predicates.push(Predicate::Equals {
                    field,
                    value: FieldValue::Keyword(value.to_string()),
                });
            }
        };

        keyword("type", self.kind.as_ref().map(RecordKind::as_str));
        keyword(
            "location_type",
            self.location_type.as_ref().map(LocationType::as_str),
        );
        keyword(
            "attraction_category",
            self.attraction_category
                .as_ref()
                .map(AttractionCategory::as_str),
        );
        keyword("county", self.county.as_deref());
        keyword("region", self.region.as_deref());
        keyword("price_range", self.price_range.as_deref());

        for feature in &self.features {
            predicates.push(Predicate::Contains {
                field: "features",
                value: feature.clone(),
            });
        }
        if let Some(tourism_related) = self.tourism_related {
            predicates.push(Predicate::Equals {
                field: "tourism_related",
                value: FieldValue::Bool(tourism_related),
            });
        }
        if self.has_opening_hours {
            predicates.push(Predicate::NotEmpty {
                field: "opening_hours",
            });
        }
        predicates
    }

    /// Whether `payload` satisfies every predicate
    pub fn matches(&self, payload: &PagePayload) -> bool {
        self.predicates().iter().all(|predicate| predicate.matches(payload))
    }
}

impl Predicate {
    pub fn matches(&self, payload: &PagePayload) -> bool {
        match self {
            Predicate::Equals { field, value } => match value {
                FieldValue::Keyword(expected) => {
                    keyword_field(payload, field).as_deref() == Some(expected.as_str())
                }
                FieldValue::Bool(expected) => {
                    *field == "tourism_related" && payload.tourism_related == *expected
                }
            },
            Predicate::Contains { value, .. } => payload.features.iter().any(|f| f == value),
            Predicate::NotEmpty { .. } => payload
                .opening_hours
                .as_deref()
                .is_some_and(|hours| !hours.is_empty()),
        }
    }
}

fn keyword_field(payload: &PagePayload, field: &str) -> Option<String> {
    match field {
        "type" => Some(payload.kind.as_str().to_string()),
        "location_type" => Some(payload.location_type.as_str().to_string()),
        "attraction_category" => Some(payload.attraction_category.as_str().to_string()),
        "county" => payload.county.clone(),
        "region" => payload.region.clone(),
        "price_range" => payload.price_range.clone(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;

    fn payload(title: &str, content: &str) -> PagePayload {
        PagePayload::origin(
            format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
            title,
            content,
            classify(title, content),
        )
    }

    #[test]
    fn test_empty_filter() {
        let filter = SearchFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&payload("Anything", "")));
    }

    #[test]
    fn test_predicates_in_field_order() {
        let filter = SearchFilter::new()
            .county("Dublin")
            .location_type(LocationType::City)
            .feature("historical")
            .feature("historical")
            .tourism_related(true)
            .with_opening_hours();

        assert_eq!(
            filter.predicates(),
            vec![
                Predicate::Equals {
                    field: "location_type",
                    value: FieldValue::Keyword("city".to_string()),
                },
                Predicate::Equals {
                    field: "county",
                    value: FieldValue::Keyword("Dublin".to_string()),
                },
                Predicate::Contains {
                    field: "features",
                    value: "historical".to_string(),
                },
                Predicate::Equals {
                    field: "tourism_related",
                    value: FieldValue::Bool(true),
                },
                Predicate::NotEmpty {
                    field: "opening_hours"
                },
            ]
        );
    }

    #[test]
    fn test_conjunction() {
        let dublin = payload("Dublin", "Dublin is the capital, in County Dublin.");
        let cork = payload("Cork", "Cork is a city in County Cork.");
        let filter = SearchFilter::new()
            .county("Dublin")
            .location_type(LocationType::City);

        assert!(filter.matches(&dublin));
        assert!(!filter.matches(&cork));
        assert!(!SearchFilter::new()
            .county("Dublin")
            .location_type(LocationType::Town)
            .matches(&dublin));
    }

    #[test]
    fn test_feature_membership_and_hours() {
        let museum = payload(
            "Hunt Museum",
            "A museum with a gift shop. Opening hours: 10am to 5pm.",
        );
        assert!(SearchFilter::new().feature("gift_shop").matches(&museum));
        assert!(SearchFilter::new()
            .feature("gift_shop")
            .feature("indoor_activities")
            .matches(&museum));
        assert!(!SearchFilter::new().feature("parking_available").matches(&museum));
        assert!(SearchFilter::new().with_opening_hours().matches(&museum));
        assert!(!SearchFilter::new()
            .with_opening_hours()
            .matches(&payload("Burren", "Limestone landscape")));
    }
}
