//! Ordered keyword rule tables for the classifier
//!
//! Each table is evaluated top to bottom and the first rule whose keywords
//! occur in the lowercased title (or content, where a rule lists content
//! keywords) decides the tag.

use std::sync::LazyLock;

use regex::Regex;

use super::{AttractionCategory, LinkKind, LocationType};

/// A single `(predicate, tag)` entry
#[derive(Debug, Clone, Copy)]
pub struct Rule<T: Copy> {
    pub tag: T,
    /// Matched as substrings of the lowercased title
    pub title_keywords: &'static [&'static str],
    /// Matched as substrings of the lowercased content
    pub content_keywords: &'static [&'static str],
}

impl<T: Copy> Rule<T> {
    const fn title(tag: T, title_keywords: &'static [&'static str]) -> Self {
        Self {
            tag,
            title_keywords,
            content_keywords: &[],
        }
    }

    const fn anywhere(tag: T, keywords: &'static [&'static str]) -> Self {
        Self {
            tag,
            title_keywords: keywords,
            content_keywords: keywords,
        }
    }

    /// Both arguments must already be lowercased
    pub fn matches(&self, title: &str, content: &str) -> bool {
        self.title_keywords.iter().any(|k| title.contains(k))
            || self.content_keywords.iter().any(|k| content.contains(k))
    }
}

pub static LOCATION_RULES: [Rule<LocationType>; 9] = [
    Rule::title(LocationType::County, &["county"]),
    Rule::title(
        LocationType::City,
        &["city", "dublin", "cork", "galway", "limerick", "waterford"],
    ),
    Rule {
        tag: LocationType::Town,
        title_keywords: &["town"],
        content_keywords: &["market town", "town centre", "town hall"],
    },
    Rule::title(LocationType::Village, &["village"]),
    Rule::title(
        LocationType::Natural,
        &["park", "mountain", "beach", "lake", "river", "forest", "island"],
    ),
    Rule::title(
        LocationType::Historical,
        &["castle", "fort", "abbey", "monument", "ruins"],
    ),
    Rule::title(
        LocationType::Cultural,
        &["museum", "theatre", "gallery", "cultural"],
    ),
    Rule::title(
        LocationType::Entertainment,
        &["pub", "restaurant", "shopping", "entertainment"],
    ),
    Rule::title(
        LocationType::Accommodation,
        &["hotel", "hostel", "accommodation", "resort"],
    ),
];

pub static ATTRACTION_RULES: [Rule<AttractionCategory>; 9] = [
    Rule::anywhere(
        AttractionCategory::Heritage,
        &["heritage", "historic", "castle", "monument"],
    ),
    Rule::anywhere(
        AttractionCategory::Nature,
        &["park", "garden", "beach", "mountain", "nature"],
    ),
    Rule::anywhere(
        AttractionCategory::Culture,
        &["museum", "gallery", "theatre", "cultural"],
    ),
    Rule::anywhere(
        AttractionCategory::Entertainment,
        &["pub", "nightclub", "cinema", "entertainment"],
    ),
    Rule::anywhere(
        AttractionCategory::Sports,
        &["sport", "golf", "swimming", "fitness"],
    ),
    Rule::anywhere(
        AttractionCategory::FoodDrink,
        &["restaurant", "café", "cafe", "brewery"],
    ),
    Rule::anywhere(
        AttractionCategory::Shopping,
        &["shop", "shopping", "market", "store"],
    ),
    Rule::anywhere(
        AttractionCategory::Accommodation,
        &["hotel", "hostel", "accommodation"],
    ),
    Rule::anywhere(
        AttractionCategory::Transport,
        &["station", "airport", "port", "transport"],
    ),
];

/// Return the tag of the first rule matching `title`/`content`
pub(crate) fn first_match<T: Copy>(rules: &[Rule<T>], title: &str, content: &str) -> Option<T> {
    let title = title.to_lowercase();
    let content = content.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&title, &content))
        .map(|rule| rule.tag)
}

const PLACE_KEYWORDS: &[&str] = &[
    "town", "village", "city", "county", "castle", "abbey", "monastery", "lough", "river", "fort",
    "mount", "hill", "island", "peninsula", "park", "beach", "cliff", "bay", "harbour", "glen",
    "valley", "garden", "forest", "woods", "lake", "waterfall", "cave", "strand", "ruins",
    "tower house", "round tower", "dolmen", "ring fort", "stone circle", "holy well",
    "ancient site", "resort", "marina", "pier", "promenade", "viewpoint", "trail",
    "walking route", "golf course",
];

const ATTRACTION_KEYWORDS: &[&str] = &[
    "museum", "zoo", "cathedral", "tower", "heritage", "landmark", "tourism", "visitor centre",
    "aquarium", "gallery", "tourist", "monument", "historical site", "festival", "music venue",
    "theatre", "arts centre", "cultural center", "craft center", "brewery", "distillery",
    "folk park", "surfing", "hiking", "climbing", "fishing", "sailing", "kayaking",
    "horse riding", "cycling route", "walking tour", "entertainment", "nightlife",
    "shopping district", "market", "food hall", "concert venue", "historic hotel",
    "castle hotel", "manor house", "country house", "church", "friary", "religious site",
    "pilgrimage", "railway station", "historic port", "lighthouse", "bridge", "stadium",
    "race course", "sports venue",
];

fn keyword_regex(keywords: &[&str], extra: &str) -> Regex {
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{}){}", alternation, extra))
        .unwrap_or_else(|e| panic!("invalid keyword pattern: {}", e))
}

static PLACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| keyword_regex(PLACE_KEYWORDS, r"\b|^List of|^Geography of"));
static ATTRACTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| keyword_regex(ATTRACTION_KEYWORDS, r"\b"));

/// Classify a link from its title alone; `None` means the link is irrelevant
pub fn classify_link_title(title: &str) -> Option<LinkKind> {
    if PLACE_REGEX.is_match(title) {
        Some(LinkKind::Place)
    } else if ATTRACTION_REGEX.is_match(title) {
        Some(LinkKind::Attraction)
    } else {
        None
    }
}
