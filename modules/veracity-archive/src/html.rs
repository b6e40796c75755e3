// Generic heuristic extraction: og:title / <title> and paragraph text.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

/// Pages without an <article> container contribute at most this many <p>.
const MAX_FALLBACK_PARAGRAPHS: usize = 12;

static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static ARTICLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article").expect("valid selector"));
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArticle {
    pub title: Option<String>,
    pub text: String,
}

/// Parse a page with the generic heuristics. `text` is empty when no
/// paragraph content was found.
pub fn extract_article(html: &str) -> ParsedArticle {
    let document = Html::parse_document(html);
    ParsedArticle {
        title: extract_title(&document),
        text: extract_body(&document),
    }
}

/// Title preference: `og:title` meta, then `<title>`.
pub fn extract_title(document: &Html) -> Option<String> {
    let og = document
        .select(&OG_TITLE)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|t| !t.is_empty());
    if let Some(title) = og {
        return Some(title.to_string());
    }

    document
        .select(&TITLE)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
}

/// Paragraphs inside the first `<article>`, else the first 12 on the page,
/// joined by blank lines with empty paragraphs dropped.
fn extract_body(document: &Html) -> String {
    let paragraphs: Vec<String> = match document.select(&ARTICLE).next() {
        Some(article) => article.select(&PARAGRAPH).map(paragraph_text).collect(),
        None => document
            .select(&PARAGRAPH)
            .take(MAX_FALLBACK_PARAGRAPHS)
            .map(paragraph_text)
            .collect(),
    };

    paragraphs
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn paragraph_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
