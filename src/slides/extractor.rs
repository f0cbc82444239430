//! Regex scan of markdown text for mermaid fences and image references.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::SlidesError;
use super::types::{DiagramType, Slide, SlideCollection};

/// A ```` ```mermaid ```` fence up to the next closing fence that starts a
/// line (up to three spaces of indent). Backticks mid-line are content.
static DIAGRAM_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```mermaid[ \t]*\r?\n(?:(.*?)\r?\n)? {0,3}```").expect("diagram fence regex")
});

/// `![alt](source)`, with optional `<...>` around the destination.
static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[([^\]]*)\]\((?:\s*<([^>\n]+)>[^)]*|([^)]+))\)").expect("image regex")
});

/// Keywords checked in order; the first one found wins.
const CLASSIFIERS: &[(&str, DiagramType)] = &[
    ("sequenceDiagram", DiagramType::Sequence),
    ("erDiagram", DiagramType::Er),
    ("graph", DiagramType::Flowchart),
    ("flowchart", DiagramType::Flowchart),
    ("gantt", DiagramType::Gantt),
    ("pie", DiagramType::Pie),
    ("gitGraph", DiagramType::Git),
    ("classDiagram", DiagramType::Class),
    ("stateDiagram", DiagramType::State),
];

enum Found {
    Diagram(String),
    Image { source: String, alt_text: String },
}

/// Extract all slides from markdown text, in document order.
///
/// Never fails; text without diagrams or images gives an empty collection.
///
/// ```
/// use mermaid_slides::slides::{extract, DiagramType};
///
/// let slides = extract("```mermaid\ngraph TD\n  A-->B\n```\n\n![alt](x.png)");
/// assert_eq!(slides.len(), 2);
/// assert_eq!(slides.get(0).unwrap().diagram_type(), Some(DiagramType::Flowchart));
/// ```
pub fn extract(text: &str) -> SlideCollection {
    let mut found: Vec<(usize, Found)> = Vec::new();
    let mut fences: Vec<Range<usize>> = Vec::new();

    for caps in DIAGRAM_FENCE.captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always present");
        fences.push(whole.range());
        let code = caps.get(1).map_or("", |m| m.as_str()).trim();
        if code.is_empty() {
            debug!(offset = whole.start(), "skipping empty mermaid fence");
            continue;
        }
        found.push((whole.start(), Found::Diagram(code.to_string())));
    }

    for caps in IMAGE.captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always present");
        if fences.iter().any(|fence| fence.contains(&whole.start())) {
            continue;
        }
        let alt_text = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let source = match (caps.get(2), caps.get(3)) {
            (Some(bracketed), _) => bracketed.as_str().trim().to_string(),
            (None, Some(raw)) => strip_title(raw.as_str()).to_string(),
            (None, None) => String::new(),
        };
        if source.is_empty() {
            continue;
        }
        found.push((whole.start(), Found::Image { source, alt_text }));
    }

    // Both scans are already ordered; a stable sort interleaves them.
    found.sort_by_key(|(offset, _)| *offset);

    let slides = found
        .into_iter()
        .enumerate()
        .map(|(index, (_, item))| match item {
            Found::Diagram(code) => {
                let diagram_type = classify(&code);
                Slide::diagram(index, code, diagram_type)
            }
            Found::Image { source, alt_text } => Slide::image(index, source, alt_text),
        })
        .collect();
    SlideCollection::new(slides)
}

/// Like [`extract`], but an empty result is an error the caller must report.
///
/// # Errors
///
/// Returns [`SlidesError::EmptyExtractionResult`] when the text contains no
/// mermaid fences and no images.
pub fn extract_required(text: &str) -> Result<SlideCollection, SlidesError> {
    let slides = extract(text);
    if slides.is_empty() {
        return Err(SlidesError::EmptyExtractionResult);
    }
    Ok(slides)
}

/// Classify diagram source by its first matching keyword.
pub fn classify(code: &str) -> DiagramType {
    CLASSIFIERS
        .iter()
        .find(|(keyword, _)| code.contains(keyword))
        .map_or(DiagramType::Diagram, |(_, diagram_type)| *diagram_type)
}

/// Drop a trailing `"title"` or `'title'` from a link destination.
fn strip_title(raw: &str) -> &str {
    let raw = raw.trim();
    if let Some((dest, rest)) = raw.split_once(char::is_whitespace) {
        let rest = rest.trim_start();
        if rest.starts_with('"') || rest.starts_with('\'') {
            return dest;
        }
    }
    raw
}
