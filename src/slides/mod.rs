//! Slide extraction from markdown.
//!
//! This module handles:
//! - Scanning markdown for ```` ```mermaid ```` fences and `![alt](src)` images
//! - Classifying diagram source by keyword
//! - Producing an ordered, immutable [`SlideCollection`]

mod extractor;
mod types;

pub use extractor::{classify, extract, extract_required};
pub use types::{DiagramType, Slide, SlideCollection, SlideKind};

use std::path::Path;

/// File extensions accepted as markdown input.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Errors reported by slide extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlidesError {
    /// The text parsed fine but contained no diagrams or images.
    #[error("no mermaid diagrams or images found")]
    EmptyExtractionResult,
}

/// Returns true if the path looks like a markdown (or plain text) file.
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Decode raw file bytes as UTF-8, replacing invalid sequences.
pub fn decode_source(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

/// Markdown shown by `--sample`.
pub const SAMPLE_MARKDOWN: &str = r#"# Project Documentation

This is some regular markdown content.

```mermaid
graph TD
    A[Start] --> B{Is it working?}
    B -->|Yes| C[Great!]
    B -->|No| D[Debug]
    D --> B
    C --> E[End]
```

## Database Schema

```mermaid
erDiagram
    USER ||--o{ ORDER : places
    ORDER ||--|{ ORDER_ITEM : contains
    PRODUCT ||--o{ ORDER_ITEM : "ordered in"
```

## Login Flow

```mermaid
sequenceDiagram
    participant U as User
    participant A as API
    U->>A: POST /login
    A-->>U: 200 OK + token
```

## Release Plan

```mermaid
gantt
    title Release Plan
    dateFormat YYYY-MM-DD
    section Build
    Core      :a1, 2024-01-01, 14d
    Viewer    :after a1, 10d
```

## Order Lifecycle

```mermaid
stateDiagram-v2
    [*] --> Pending
    Pending --> Paid
    Paid --> Shipped
    Shipped --> [*]
```
"#;
