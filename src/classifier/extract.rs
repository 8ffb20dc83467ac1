//! Pattern based metadata extraction from page content

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Feature tags and the patterns that detect them. Tags are independent.
const FEATURE_PATTERNS: &[(&str, &str)] = &[
    ("wheelchair_accessible", r"wheelchair|accessible"),
    ("family_friendly", r"family|children|kids"),
    ("guided_tours", r"guided tour|guide|tour"),
    ("parking_available", r"parking|car park"),
    ("food_available", r"restaurant|café|cafe|food|dining"),
    ("gift_shop", r"shop|souvenir|gift"),
    ("scenic_views", r"scenic|view|panoramic"),
    ("historical", r"historic|ancient|heritage"),
    ("outdoor_activities", r"outdoor|hiking|walking|cycling"),
    ("indoor_activities", r"indoor|museum|gallery"),
    ("free_entry", r"free entry|free admission"),
    ("paid_entry", r"ticket|admission|fee"),
];

const TOURISM_KEYWORDS: &[&str] = &[
    "tourism",
    "tourist",
    "visit",
    "attraction",
    "guide",
    "heritage",
    "historic",
    "sightseeing",
    "tour",
    "travel",
    "accommodation",
    "hotel",
    "restaurant",
    "pub",
    "café",
    "festival",
    "event",
    "experience",
    "activity",
    "adventure",
];

/// Counties grouped into the rough tourism regions used for filtering
const REGIONS: &[(&str, &[&str])] = &[
    ("West", &["Galway", "Mayo", "Roscommon"]),
    ("Northwest", &["Sligo", "Leitrim", "Donegal"]),
    ("Southwest", &["Kerry", "Cork", "Clare"]),
    ("Southeast", &["Waterford", "Wexford", "Kilkenny"]),
    ("East", &["Dublin", "Wicklow", "Meath"]),
    ("Midlands", &["Laois", "Offaly", "Westmeath", "Longford"]),
    ("Border", &["Cavan", "Monaghan", "Louth"]),
];

static FEATURE_REGEXES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    FEATURE_PATTERNS
        .iter()
        .map(|(tag, pattern)| (*tag, compile(&format!("(?i){}", pattern))))
        .collect()
});

static FREE_REGEX: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)free entry|free admission"));
static EURO_REGEX: LazyLock<Regex> = LazyLock::new(|| compile(r"€(\d+)"));
static HOURS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:opening times?|opening hours|hours|open)\b:?\s*([^.]*)")
});
static TOURISM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i)\b(?:{})\b", TOURISM_KEYWORDS.join("|"))));
static COUNTY_REGEX: LazyLock<Regex> = LazyLock::new(|| compile(r"\bCounty\s+([A-Z][a-z]+)"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern {}: {}", pattern, e))
}

/// Every feature tag whose pattern occurs anywhere in `content`
pub fn extract_features(content: &str) -> BTreeSet<String> {
    FEATURE_REGEXES
        .iter()
        .filter(|(_, regex)| regex.is_match(content))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

/// `"free"`, a single euro amount, a `min-max` euro range, or nothing
pub fn extract_price_range(content: &str) -> Option<String> {
    if FREE_REGEX.is_match(content) {
        return Some("free".to_string());
    }

    let prices: Vec<u64> = EURO_REGEX
        .captures_iter(content)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect();
    let min = prices.iter().min()?;
    let max = prices.iter().max()?;

    if min == max {
        Some(format!("€{}", min))
    } else {
        Some(format!("€{}-€{}", min, max))
    }
}

/// Text following the first opening-hours marker, up to the next full stop
pub fn extract_opening_hours(content: &str) -> Option<String> {
    let caps = HOURS_REGEX.captures(content)?;
    let hours = caps.get(1)?.as_str().trim();
    if hours.is_empty() {
        None
    } else {
        Some(hours.to_string())
    }
}

/// True if any tourism keyword occurs as a whole word
pub fn is_tourism_related(content: &str) -> bool {
    TOURISM_REGEX.is_match(content)
}

/// Name following the first `County ` mention, e.g. `Clare`
pub fn extract_county(content: &str) -> Option<String> {
    COUNTY_REGEX
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Tourism region a county belongs to
pub fn region_for_county(county: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(_, counties)| counties.iter().any(|c| county.contains(c)))
        .map(|(region, _)| *region)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_are_not_exclusive() {
        let features = extract_features(
            "Wheelchair access, a family cafe, free parking and panoramic views.",
        );
        let expected: BTreeSet<String> = [
            "wheelchair_accessible",
            "family_friendly",
            "food_available",
            "parking_available",
            "scenic_views",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(features, expected);
    }

    #[test]
    fn test_features_empty_content() {
        assert!(extract_features("").is_empty());
    }

    #[test]
    fn test_price_range() {
        assert_eq!(extract_price_range("Free entry all year").as_deref(), Some("free"));
        assert_eq!(extract_price_range("Tickets cost €12.").as_deref(), Some("€12"));
        assert_eq!(
            extract_price_range("Adults €15, children €5, families €15").as_deref(),
            Some("€5-€15")
        );
        assert_eq!(extract_price_range("No prices listed"), None);
    }

    #[test]
    fn test_free_wins_over_amounts() {
        assert_eq!(
            extract_price_range("Free admission; guided tours €8").as_deref(),
            Some("free")
        );
    }

    #[test]
    fn test_opening_hours() {
        assert_eq!(
            extract_opening_hours("Open: 10am-6pm. Closed Mondays.").as_deref(),
            Some("10am-6pm")
        );
        assert_eq!(
            extract_opening_hours("Opening times 9:30 to 17:00 in summer. More text").as_deref(),
            Some("9:30 to 17:00 in summer")
        );
        assert_eq!(extract_opening_hours("The castle opened in 1450."), None);
        assert_eq!(extract_opening_hours("No schedule"), None);
        assert_eq!(extract_opening_hours("It is open."), None);
    }

    #[test]
    fn test_tourism_related() {
        assert!(is_tourism_related("A popular tourist destination"));
        assert!(is_tourism_related("Visit the Heritage centre"));
        assert!(!is_tourism_related("A townland in the barony of Burren"));
        assert!(!is_tourism_related(""));
    }

    #[test]
    fn test_county_and_region() {
        assert_eq!(
            extract_county("Ennis is the county town of County Clare, Ireland").as_deref(),
            Some("Clare")
        );
        assert_eq!(extract_county("no county here"), None);
        assert_eq!(region_for_county("Clare"), Some("Southwest"));
        assert_eq!(region_for_county("Dublin"), Some("East"));
        assert_eq!(region_for_county("Antrim"), None);
    }
}
