//! Resource and link extraction from rendered page content
//!
//! Maps page content plus the per-category configuration toggles to a list
//! of `(url, category)` pairs and the page's outbound links. A category
//! whose toggle is off is simply not emitted: not counted, not downloaded,
//! not logged.

use crate::config::ResourceToggles;
use crate::storage::ResourceCategory;
use crate::url::is_document_url;
use scraper::{Html, Selector};
use url::Url;

/// Everything extracted from one rendered page
#[derive(Debug, Default)]
pub struct Extraction {
    /// Resource references, in document order, possibly with duplicates
    /// (the frontier's dispatched set dedups across the whole run)
    pub resources: Vec<(Url, ResourceCategory)>,

    /// Outbound hyperlinks, absolute, http(s) only
    pub links: Vec<Url>,
}

/// Scans rendered content for resource references and outbound links
///
/// Every relative reference is resolved against `base_url`. Malformed
/// content degrades to an empty extraction rather than an error.
///
/// Collection rules per category:
/// - images: `img` tags, `src` / `data-src` / `data-original` attributes
/// - videos: `video[src]` and `source` children of `video`
/// - audios: `audio[src]` and `source` children of `audio`
/// - stylesheets: `link[rel=stylesheet]`
/// - scripts: `script[src]`
/// - documents: `a[href]` targets whose path extension is a known
///   document format (applied to hyperlinks only, not media tags)
pub fn extract(html: &str, base_url: &Url, toggles: &ResourceToggles) -> Extraction {
    let document = Html::parse_document(html);
    let mut out = Extraction::default();

    if toggles.images {
        collect_images(&document, base_url, &mut out.resources);
    }

    if toggles.videos {
        collect_media(
            &document,
            base_url,
            "video[src], video > source[src]",
            ResourceCategory::Video,
            &mut out.resources,
        );
    }

    if toggles.audios {
        collect_media(
            &document,
            base_url,
            "audio[src], audio > source[src]",
            ResourceCategory::Audio,
            &mut out.resources,
        );
    }

    if toggles.stylesheets {
        collect_attr(
            &document,
            base_url,
            "link[rel='stylesheet'][href]",
            "href",
            ResourceCategory::Stylesheet,
            &mut out.resources,
        );
    }

    if toggles.scripts {
        collect_attr(
            &document,
            base_url,
            "script[src]",
            "src",
            ResourceCategory::Script,
            &mut out.resources,
        );
    }

    collect_anchors(&document, base_url, toggles.documents, &mut out);

    out
}

/// Images allow lazy-loading attribute fallbacks
fn collect_images(document: &Html, base_url: &Url, resources: &mut Vec<(Url, ResourceCategory)>) {
    if let Ok(selector) = Selector::parse("img") {
        for element in document.select(&selector) {
            let src = element
                .value()
                .attr("src")
                .or_else(|| element.value().attr("data-src"))
                .or_else(|| element.value().attr("data-original"));

            if let Some(url) = src.and_then(|s| resolve_resource(s, base_url)) {
                resources.push((url, ResourceCategory::Image));
            }
        }
    }
}

fn collect_media(
    document: &Html,
    base_url: &Url,
    selector: &str,
    category: ResourceCategory,
    resources: &mut Vec<(Url, ResourceCategory)>,
) {
    collect_attr(document, base_url, selector, "src", category, resources);
}

fn collect_attr(
    document: &Html,
    base_url: &Url,
    selector: &str,
    attr: &str,
    category: ResourceCategory,
    resources: &mut Vec<(Url, ResourceCategory)>,
) {
    if let Ok(selector) = Selector::parse(selector) {
        for element in document.select(&selector) {
            if let Some(url) = element
                .value()
                .attr(attr)
                .and_then(|s| resolve_resource(s, base_url))
            {
                resources.push((url, category));
            }
        }
    }
}

/// One pass over anchors yields both document resources and outbound links
fn collect_anchors(document: &Html, base_url: &Url, documents: bool, out: &mut Extraction) {
    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_link(href, base_url) else {
                continue;
            };

            if documents && is_document_url(&url) {
                out.resources.push((url.clone(), ResourceCategory::Document));
            }

            out.links.push(url);
        }
    }
}

/// Resolves a resource reference to an absolute http(s) URL
fn resolve_resource(src: &str, base_url: &Url) -> Option<Url> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }

    match base_url.join(src) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        _ => None,
    }
}

/// Resolves a hyperlink href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links (same page anchors)
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        _ => None,
    }
}
