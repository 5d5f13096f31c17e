//! §4.F: tolerant HTML parsing for OpenGraph/title/preview-image metadata.
//! Never errors on malformed markup — missing fields just come back `None`.

use scraper::{Html, Selector};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

pub fn scrape(html: &str, base_url: &str) -> ScrapedMetadata {
    let document = Html::parse_document(html);

    let title = meta_content(&document, "og:title")
        .or_else(|| first_text(&document, "title"));
    let description = meta_content(&document, "og:description")
        .or_else(|| meta_content(&document, "description"));
    let image_url = meta_content(&document, "og:image")
        .or_else(|| first_img_src(&document))
        .map(|url| resolve_url(base_url, &url));

    ScrapedMetadata {
        title,
        description,
        image_url,
    }
}

fn meta_content(document: &Html, property: &str) -> Option<String> {
    let by_property = Selector::parse(&format!(r#"meta[property="{property}"]"#)).ok()?;
    let by_name = Selector::parse(&format!(r#"meta[name="{property}"]"#)).ok()?;
    document
        .select(&by_property)
        .chain(document.select(&by_name))
        .find_map(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_text(document: &Html, tag: &str) -> Option<String> {
    let selector = Selector::parse(tag).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn first_img_src(document: &Html) -> Option<String> {
    let selector = Selector::parse("img").ok()?;
    document
        .select(&selector)
        .find_map(|el| el.value().attr("src"))
        .map(str::to_string)
}

/// Resolves a possibly-relative image URL against the page's own URL. Falls
/// back to the raw string when the base can't be parsed (same tolerant
/// posture as the rest of this module).
fn resolve_url(base_url: &str, candidate: &str) -> String {
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return candidate.to_string();
    }
    match reqwest::Url::parse(base_url).and_then(|base| base.join(candidate)) {
        Ok(joined) => joined.to_string(),
        Err(_) => candidate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_opengraph_over_title_tag() {
        let html = r#"<html><head>
            <title>Fallback Title</title>
            <meta property="og:title" content="Real Title">
        </head></html>"#;
        let meta = scrape(html, "https://example.com/page");
        assert_eq!(meta.title.as_deref(), Some("Real Title"));
    }

    #[test]
    fn falls_back_to_title_tag_when_no_og_title() {
        let html = "<html><head><title>Only Title</title></head></html>";
        let meta = scrape(html, "https://example.com/page");
        assert_eq!(meta.title.as_deref(), Some("Only Title"));
    }

    #[test]
    fn falls_back_to_first_img_when_no_og_image() {
        let html = r#"<html><body><img src="/hero.png"></body></html>"#;
        let meta = scrape(html, "https://example.com/page");
        assert_eq!(meta.image_url.as_deref(), Some("https://example.com/hero.png"));
    }

    #[test]
    fn markup_with_no_recognizable_fields_yields_empty_metadata_not_an_error() {
        let meta = scrape("just some plain text, not a single tag in sight", "https://e.com");
        assert_eq!(meta, ScrapedMetadata::default());
    }
}
