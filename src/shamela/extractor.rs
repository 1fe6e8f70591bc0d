use scraper::{ElementRef, Html};
use serde::Serialize;

/// Class on the inline element shamela uses to highlight a hit's title.
pub const TITLE_CLASS: &str = "text-primaryy";
const TITLE_TAG: &str = "span";
const PREVIEW_TAG: &str = "p";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub link: String,
    pub title: String,
    pub preview: String,
}

/// How far the preview scan may travel from an anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreviewScope {
    /// First paragraph anywhere after the anchor. Anchors that precede the
    /// same paragraph all share its text.
    #[default]
    Document,
    /// First paragraph before the next result anchor.
    UntilNextAnchor,
}

/// How an element's text nodes become one string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextJoin {
    /// Each text node is trimmed and the pieces are concatenated with no
    /// separator; whitespace-only nodes vanish. `<p>a <b>b</b></p>` reads "ab".
    #[default]
    Stripped,
    /// Text nodes are concatenated untouched and only the ends are trimmed,
    /// so inner spacing survives. `<p>a <b>b</b></p>` reads "a b".
    Spaced,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub preview_scope: PreviewScope,
    pub text_join: TextJoin,
}

/// Extract every `<a href>` in document order as a fully populated result.
///
/// Missing structure never drops a result: title and preview both fall back
/// to the anchor's own text.
pub fn extract_results(html: &str, options: ExtractOptions) -> Vec<SearchResult> {
    if html.is_empty() {
        return Vec::new();
    }

    let document = Html::parse_fragment(html);
    let elements: Vec<ElementRef<'_>> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect();

    let next_paragraph = next_index_where(&elements, |el| el.value().name() == PREVIEW_TAG);
    let next_anchor = next_index_where(&elements, is_result_anchor);

    elements
        .iter()
        .enumerate()
        .filter(|(_, el)| is_result_anchor(el))
        .filter_map(|(i, anchor)| {
            let link = anchor.value().attr("href")?.to_string();
            let own_text = element_text(anchor, options.text_join);

            let title = anchor
                .descendants()
                .filter_map(ElementRef::wrap)
                .find(is_title_marker)
                .map(|el| element_text(&el, options.text_join))
                .unwrap_or_else(|| own_text.clone());

            let preview = next_paragraph[i + 1]
                .filter(|&p| match options.preview_scope {
                    PreviewScope::Document => true,
                    PreviewScope::UntilNextAnchor => next_anchor[i + 1].is_none_or(|a| p < a),
                })
                .map(|p| element_text(&elements[p], options.text_join))
                .unwrap_or(own_text);

            Some(SearchResult {
                link,
                title,
                preview,
            })
        })
        .collect()
}

fn is_result_anchor(el: &ElementRef<'_>) -> bool {
    el.value().name() == "a" && el.value().attr("href").is_some()
}

fn is_title_marker(el: &ElementRef<'_>) -> bool {
    el.value().name() == TITLE_TAG && el.value().classes().any(|c| c == TITLE_CLASS)
}

fn element_text(el: &ElementRef<'_>, join: TextJoin) -> String {
    match join {
        TextJoin::Stripped => el.text().map(str::trim).collect(),
        TextJoin::Spaced => el.text().collect::<String>().trim().to_string(),
    }
}

/// `out[i]` is the first index `>= i` whose element matches, so the lookup
/// for "after element i" is `out[i + 1]`. Has `len + 1` entries.
fn next_index_where(
    elements: &[ElementRef<'_>],
    matches: impl Fn(&ElementRef<'_>) -> bool,
) -> Vec<Option<usize>> {
    let mut out = vec![None; elements.len() + 1];
    for i in (0..elements.len()).rev() {
        out[i] = if matches(&elements[i]) {
            Some(i)
        } else {
            out[i + 1]
        };
    }
    out
}
