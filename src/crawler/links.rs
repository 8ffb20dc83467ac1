//! Internal article link discovery
//!
//! Finds `/wiki/` links in a page, drops namespaced pages and the main page,
//! and keeps the ones whose title reads like a place or an attraction.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::content_extraction::{collapse_whitespace, title_from_slug, truncate_chars, wiki_url};
use crate::classifier::{LinkKind, classify_link_title};

static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href^='/wiki/']")
        .unwrap_or_else(|e| panic!("invalid link selector: {}", e))
});

/// A link worth recording, found on a fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub title: String,
    /// Canonical article URL, as `wiki_url` builds it from `title`
    pub url: String,
    pub kind: LinkKind,
    /// Text of the enclosing paragraph, or the link text
    pub context: String,
}

/// Relevant links of `html` in document order, one per URL
///
/// `base_url` is the scheme and host the `/wiki/` paths resolve against.
/// Titles are percent-decoded and URLs rebuilt canonically, so an escaped
/// href and a plain title name the same article.
///
/// Repeat links to one URL collapse into the first, context included. A
/// later copy with a different context would name the same point id and be
/// skipped as already stored anyway.
pub fn extract_links(html: &str, base_url: &str, context_chars: usize) -> Vec<LinkCandidate> {
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for link in document.select(&LINK_SELECTOR) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let path = href.split('#').next().unwrap_or_default();
        let Some(slug) = path.strip_prefix("/wiki/").filter(|s| !s.is_empty()) else {
            continue;
        };

        let title = title_from_slug(slug);
        if title.is_empty() || title.contains(':') || title == "Main Page" {
            continue;
        }
        let Some(kind) = classify_link_title(&title) else {
            continue;
        };

        let url = wiki_url(base_url, &title);
        if !seen.insert(url.clone()) {
            continue;
        }

        candidates.push(LinkCandidate {
            title,
            url,
            kind,
            context: link_context(link, context_chars),
        });
    }

    candidates
}

/// Text of the nearest enclosing `<p>`, else the anchor text
fn link_context(link: ElementRef<'_>, context_chars: usize) -> String {
    let paragraph = link
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "p");

    let text = match paragraph {
        Some(p) => collapse_whitespace(&p.text().collect::<String>()),
        None => collapse_whitespace(&link.text().collect::<String>()),
    };
    truncate_chars(&text, context_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::PointId;

    const BASE: &str = "https://en.wikipedia.org";

    const PAGE: &str = r#"
        <html><body><div id="mw-content-text">
          <p>County Clare borders <a href="/wiki/County_Galway">Galway</a> and is home to
             <a href="/wiki/Bunratty_Castle">Bunratty Castle</a>.</p>
          <ul>
            <li><a href="/wiki/Ennis_(town)">Ennis</a></li>
            <li><a href="/wiki/File:Clare.png">map</a></li>
            <li><a href="/wiki/Main_Page">Main page</a></li>
            <li><a href="/wiki/Irish_language">Irish</a></li>
            <li><a href="https://example.org/wiki/Kilkee_beach">external</a></li>
            <li><a href="/wiki/County_Galway#History">Galway history</a></li>
            <li><a href="/wiki/Hunt_Museum">Hunt Museum</a></li>
          </ul>
        </div></body></html>
    "#;

    #[test]
    fn test_extracts_relevant_links_in_order() {
        let links = extract_links(PAGE, BASE, 200);
        let titles: Vec<&str> = links.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["County Galway", "Bunratty Castle", "Ennis (town)", "Hunt Museum"]
        );

        assert_eq!(links[0].url, "https://en.wikipedia.org/wiki/County_Galway");
        assert_eq!(links[0].kind, LinkKind::Place);
        assert_eq!(links[1].kind, LinkKind::Place);
        assert_eq!(links[3].kind, LinkKind::Attraction);
    }

    #[test]
    fn test_context_from_paragraph_or_anchor() {
        let links = extract_links(PAGE, BASE, 200);
        assert!(links[0].context.starts_with("County Clare borders Galway"));
        assert_eq!(links[0].context, links[1].context);
        assert_eq!(links[2].context, "Ennis");

        let short = extract_links(PAGE, BASE, 12);
        assert_eq!(short[0].context, "County Clare");
    }

    #[test]
    fn test_escaped_href_matches_seed_identity() {
        let html = r#"
            <p>See <a href="/wiki/St_Patrick%27s_Cathedral,_Dublin">the cathedral</a>,
               <a href="/wiki/St_Patrick's_Cathedral,_Dublin#Music">its choir</a> and
               <a href="/wiki/Lough_Cor%C3%A1n">Lough Corán</a>.</p>
        "#;
        let links = extract_links(html, BASE, 200);
        assert_eq!(links.len(), 2);

        let seed = "St Patrick's Cathedral, Dublin";
        assert_eq!(links[0].title, seed);
        assert_eq!(links[0].url, wiki_url(BASE, seed));
        assert_eq!(
            PointId::from_url(&links[0].url),
            PointId::from_url(&wiki_url(BASE, seed))
        );

        assert_eq!(links[1].title, "Lough Corán");
        assert_eq!(links[1].url, "https://en.wikipedia.org/wiki/Lough_Cor%C3%A1n");
    }

    #[test]
    fn test_escaped_namespace_is_dropped() {
        let html = r#"<p><a href="/wiki/Category%3ACastles_in_Ireland">castles</a></p>"#;
        assert!(extract_links(html, BASE, 200).is_empty());
    }

    #[test]
    fn test_malformed_html_yields_nothing() {
        assert!(extract_links("<p><a href='/wiki/", BASE, 200).is_empty());
        assert!(extract_links("", BASE, 200).is_empty());
    }
}
