//! Content extraction functionality for the crawler module
//!
//! Best effort: missing elements give empty strings, never errors.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use scraper::{Html, Selector};

/// Characters escaped in an article slug. Everything else, `'` and `,`
/// included, is written literally, so decoding and re-encoding a slug is
/// stable.
const SLUG_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

static CONTENT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("#mw-content-text"));
static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("#firstHeading"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {}: {}", css, e))
}

/// Title and body text of an article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub content: String,
}

/// Canonical article URL for a title
///
/// Every URL that ends up in the index is built here, so a title always maps
/// to the same string and therefore the same point id.
///
/// # Examples
///
/// ```
/// use wikiatlas::crawler::wiki_url;
///
/// assert_eq!(
///     wiki_url("https://en.wikipedia.org", "Cliffs of Moher"),
///     "https://en.wikipedia.org/wiki/Cliffs_of_Moher"
/// );
/// assert_eq!(
///     wiki_url("https://en.wikipedia.org", "Lough Corán"),
///     "https://en.wikipedia.org/wiki/Lough_Cor%C3%A1n"
/// );
/// ```
pub fn wiki_url(base_url: &str, title: &str) -> String {
    let slug = title.trim().replace(' ', "_");
    format!(
        "{}/wiki/{}",
        base_url.trim_end_matches('/'),
        utf8_percent_encode(&slug, SLUG_ESCAPES)
    )
}

/// Human title for an article slug: escapes decoded, underscores as spaces
pub fn title_from_slug(slug: &str) -> String {
    percent_decode_str(slug)
        .decode_utf8_lossy()
        .replace('_', " ")
        .trim()
        .to_string()
}

/// Title derived from the last path segment of an article URL
pub fn title_from_url(url: &str) -> String {
    title_from_slug(
        url.trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default(),
    )
}

/// Extract the article title and up to `max_chars` of body text
///
/// # Arguments
///
/// * `url` - The URL of the page, used when the page has no heading
/// * `html` - The HTML of the page
/// * `max_chars` - Characters of body text to keep
pub fn extract_page(url: &str, html: &str, max_chars: usize) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = document
        .select(&HEADING_SELECTOR)
        .next()
        .map(|heading| collapse_whitespace(&heading.text().collect::<String>()))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| title_from_url(url));

    let content = document
        .select(&CONTENT_SELECTOR)
        .next()
        .map(|body| collapse_whitespace(&body.text().collect::<String>()))
        .map(|text| truncate_chars(&text, max_chars))
        .unwrap_or_default();

    ExtractedPage { title, content }
}

/// Collapse every whitespace run into a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].trim_end().to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_page() {
        let html = r#"
            <html><body>
              <h1 id="firstHeading"><span>Cliffs of Moher</span></h1>
              <div id="mw-content-text">
                <p>The Cliffs of Moher are sea cliffs
                   in   County Clare.</p>
              </div>
            </body></html>
        "#;
        let page = extract_page("https://en.wikipedia.org/wiki/Cliffs_of_Moher", html, 2000);
        assert_eq!(page.title, "Cliffs of Moher");
        assert_eq!(
            page.content,
            "The Cliffs of Moher are sea cliffs in County Clare."
        );
    }

    #[test]
    fn test_missing_elements_fall_back() {
        let page = extract_page(
            "https://en.wikipedia.org/wiki/Rock_of_Cashel",
            "<html><body><p>nothing here</p></body></html>",
            2000,
        );
        assert_eq!(page.title, "Rock of Cashel");
        assert_eq!(page.content, "");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("Café Rua", 4), "Café");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("€15 entry", 3), "€15");
    }

    #[test]
    fn test_wiki_url_round_trip() {
        let url = wiki_url("https://en.wikipedia.org/", "Ring of Kerry");
        assert_eq!(url, "https://en.wikipedia.org/wiki/Ring_of_Kerry");
        assert_eq!(title_from_url(&url), "Ring of Kerry");
    }

    #[test]
    fn test_wiki_url_is_canonical_for_escaped_slugs() {
        let seed = wiki_url("https://en.wikipedia.org", "St Patrick's Cathedral, Dublin");
        assert_eq!(
            seed,
            "https://en.wikipedia.org/wiki/St_Patrick's_Cathedral,_Dublin"
        );

        let title = title_from_slug("St_Patrick%27s_Cathedral,_Dublin");
        assert_eq!(title, "St Patrick's Cathedral, Dublin");
        assert_eq!(wiki_url("https://en.wikipedia.org", &title), seed);

        let title = title_from_slug("Lough_Cor%C3%A1n");
        assert_eq!(title, "Lough Corán");
        assert_eq!(
            wiki_url("https://en.wikipedia.org", &title),
            "https://en.wikipedia.org/wiki/Lough_Cor%C3%A1n"
        );
        assert_eq!(title_from_url(&wiki_url("https://en.wikipedia.org", &title)), title);
    }
}
