use serde::Serialize;

use crate::shamela::SearchResult;

pub const DEFAULT_PER_PAGE: usize = 10;

/// A window onto the result list, as shown one screen at a time.
#[derive(Debug)]
pub struct ResultPage<'a> {
    /// 1-based.
    pub number: usize,
    pub total_pages: usize,
    pub total_results: usize,
    /// Absolute index of `rows[0]` in the full result list.
    pub first_index: usize,
    pub rows: &'a [SearchResult],
}

/// Slice out page `page` (1-based). Pages past the end clamp to the last
/// page, page 0 reads as page 1, and an empty list is a single empty page.
pub fn paginate(results: &[SearchResult], page: usize, per_page: usize) -> ResultPage<'_> {
    let per_page = per_page.max(1);
    let total_pages = results.len().div_ceil(per_page).max(1);
    let number = page.clamp(1, total_pages);
    let start = (number - 1) * per_page;
    let end = (start + per_page).min(results.len());

    ResultPage {
        number,
        total_pages,
        total_results: results.len(),
        first_index: start,
        rows: &results[start..end],
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Translation {
    #[default]
    NotRequested,
    Done(String),
    Failed,
}

/// Per-row extras gathered by the shell before rendering.
#[derive(Debug, Default, Clone)]
pub struct RowNotes {
    /// `None` when classification was not requested.
    pub primary_source: Option<bool>,
    pub translation: Translation,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    result: &'a SearchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_source: Option<bool>,
    /// Absent when not requested, `null` when the translation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    translation: Option<Option<&'a str>>,
}

/// The page's rows as a JSON array, each carrying whatever notes were
/// gathered for it.
pub fn format_page_json(page: &ResultPage<'_>, notes: &[RowNotes]) -> serde_json::Result<String> {
    let rows: Vec<JsonRow<'_>> = page
        .rows
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let note = notes.get(i);
            JsonRow {
                result,
                primary_source: note.and_then(|n| n.primary_source),
                translation: note.and_then(|n| match &n.translation {
                    Translation::NotRequested => None,
                    Translation::Done(text) => Some(Some(text.as_str())),
                    Translation::Failed => Some(None),
                }),
            }
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}

pub fn format_page(term: &str, page: &ResultPage<'_>, notes: &[RowNotes]) -> String {
    let mut output = format!("Results for \"{}\"", single_line(term));

    if page.total_results == 0 {
        output.push_str(": no results\n");
        return output;
    }

    output.push_str(&format!(
        " (page {}/{}, {} total)\n\n",
        page.number, page.total_pages, page.total_results
    ));

    for (i, row) in page.rows.iter().enumerate() {
        let note = notes.get(i);
        let marker = if note.is_some_and(|n| n.primary_source == Some(true)) {
            " [primary source]"
        } else {
            ""
        };

        output.push_str(&format!(
            "{}. {}{}\n   {}\n",
            page.first_index + i + 1,
            single_line(&row.title),
            marker,
            row.link
        ));

        match note.map(|n| &n.translation) {
            Some(Translation::Done(text)) => output.push_str(&format!("   {}\n", single_line(text))),
            Some(Translation::Failed) => {
                output.push_str(&format!("   {}\n", single_line(&row.preview)));
                output.push_str("   (translation unavailable)\n");
            }
            _ => output.push_str(&format!("   {}\n", single_line(&row.preview))),
        }
        output.push('\n');
    }

    if page.number < page.total_pages {
        output.push_str(&format!("(use --page {} for more)\n", page.number + 1));
    }

    output
}

/// Collapse runs of whitespace, newlines included, so each field stays on
/// its own line.
fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results(n: usize) -> Vec<SearchResult> {
        (1..=n)
            .map(|i| SearchResult {
                link: format!("/book/{i}"),
                title: format!("Title {i}"),
                preview: format!("Preview {i}"),
            })
            .collect()
    }

    #[test]
    fn first_page() {
        let all = results(25);
        let page = paginate(&all, 1, 10);
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.rows[0].link, "/book/1");
    }

    #[test]
    fn last_page_is_partial() {
        let all = results(25);
        let page = paginate(&all, 3, 10);
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.first_index, 20);
        assert_eq!(page.rows[0].link, "/book/21");
    }

    #[test]
    fn page_past_end_clamps_to_last() {
        let all = results(25);
        let page = paginate(&all, 99, 10);
        assert_eq!(page.number, 3);
        assert_eq!(page.rows.len(), 5);
    }

    #[test]
    fn page_zero_reads_as_first() {
        let all = results(3);
        assert_eq!(paginate(&all, 0, 10).number, 1);
    }

    #[test]
    fn empty_results_is_one_empty_page() {
        let page = paginate(&[], 4, 10);
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.rows.is_empty());
    }

    #[test]
    fn zero_per_page_treated_as_one() {
        let all = results(3);
        let page = paginate(&all, 2, 0);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].link, "/book/2");
    }

    #[test]
    fn exact_multiple_has_no_extra_page() {
        let all = results(20);
        assert_eq!(paginate(&all, 1, 10).total_pages, 2);
    }

    #[test]
    fn format_lists_rows_with_absolute_numbers() {
        let all = results(12);
        let page = paginate(&all, 2, 10);
        let text = format_page("term", &page, &[]);
        assert!(text.contains("page 2/2, 12 total"));
        assert!(text.contains("11. Title 11"));
        assert!(text.contains("   /book/12"));
        assert!(text.contains("   Preview 12"));
        assert!(!text.contains("--page"));
    }

    #[test]
    fn format_hints_next_page() {
        let all = results(12);
        let text = format_page("term", &paginate(&all, 1, 10), &[]);
        assert!(text.contains("(use --page 2 for more)"));
    }

    #[test]
    fn format_empty_results() {
        let text = format_page("nothing", &paginate(&[], 1, 10), &[]);
        assert_eq!(text, "Results for \"nothing\": no results\n");
    }

    #[test]
    fn format_applies_row_notes() {
        let all = results(2);
        let notes = vec![
            RowNotes {
                primary_source: Some(true),
                translation: Translation::Done("English text".into()),
            },
            RowNotes {
                primary_source: Some(false),
                translation: Translation::Failed,
            },
        ];
        let text = format_page("term", &paginate(&all, 1, 10), &notes);
        assert!(text.contains("1. Title 1 [primary source]"));
        assert!(text.contains("   English text"));
        assert!(!text.contains("Preview 1\n"));
        assert!(text.contains("2. Title 2\n"));
        assert!(text.contains("   Preview 2\n   (translation unavailable)"));
    }

    #[test]
    fn json_without_notes_is_plain_rows() {
        let all = results(1);
        let text = format_page_json(&paginate(&all, 1, 10), &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!([{"link": "/book/1", "title": "Title 1", "preview": "Preview 1"}])
        );
    }

    #[test]
    fn json_carries_row_notes() {
        let all = results(3);
        let notes = vec![
            RowNotes {
                primary_source: Some(true),
                translation: Translation::Done("English text".into()),
            },
            RowNotes {
                primary_source: Some(false),
                translation: Translation::Failed,
            },
            RowNotes {
                primary_source: None,
                translation: Translation::NotRequested,
            },
        ];
        let text = format_page_json(&paginate(&all, 1, 10), &notes).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!([
                {
                    "link": "/book/1",
                    "title": "Title 1",
                    "preview": "Preview 1",
                    "primary_source": true,
                    "translation": "English text"
                },
                {
                    "link": "/book/2",
                    "title": "Title 2",
                    "preview": "Preview 2",
                    "primary_source": false,
                    "translation": null
                },
                {"link": "/book/3", "title": "Title 3", "preview": "Preview 3"}
            ])
        );
    }

    #[test]
    fn multiline_fields_are_flattened() {
        assert_eq!(single_line("line1\n  line2\r\nline3"), "line1 line2 line3");
    }
}
