//! Structural extraction of wallpaper links and URL resolution.
//!
//! The gallery page nests its wallpaper anchors in a fixed structure:
//! `body > div.container > div.row > div#hl_links > div > a.liimagelink`,
//! where each qualifying anchor wraps a thumbnail `img`. The query below
//! walks exactly that path, in document order. A branch that fails any
//! predicate (wrong attribute, missing level) simply drops out.

use url::Url;

use crate::dom::Document;

/// Lazily yield the `href` of every wallpaper anchor, in document order.
///
/// Missing or repeated structural levels and absent attributes exclude
/// branches silently; an empty sequence is a normal result.
pub fn image_links(doc: &Document) -> impl Iterator<Item = &str> {
    doc.root()
        .children_named("html")
        .flat_map(|html| html.children_named("body"))
        .flat_map(|body| body.children_named("div"))
        .filter(|div| div.attr("class") == Some("container"))
        .flat_map(|container| container.children_named("div"))
        .filter(|div| div.attr("class") == Some("row"))
        .flat_map(|row| row.children_named("div"))
        .filter(|div| div.attr("id") == Some("hl_links"))
        .flat_map(|links| links.children_named("div"))
        .flat_map(|cell| cell.children_named("a"))
        .filter(|anchor| anchor.attr("class") == Some("liimagelink"))
        .filter(|anchor| anchor.children_named("img").next().is_some())
        .filter_map(|anchor| anchor.attr("href"))
}

/// Resolve an href against the page URL into an absolute, fetchable URL.
///
/// Relative candidates join against `base`; absolute candidates stand on
/// their own. Candidates that fail to parse, or that resolve to a scheme we
/// cannot fetch over, yield `None` rather than an error.
pub fn resolve(base: &Url, candidate: &str) -> Option<Url> {
    let url = base.join(candidate).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

/// The full link pipeline: extracted hrefs resolved against the base, with
/// unresolvable ones dropped.
pub fn resolved_image_links<'a>(
    doc: &'a Document,
    base: &'a Url,
) -> impl Iterator<Item = Url> + 'a {
    image_links(doc).filter_map(move |href| resolve(base, href))
}
