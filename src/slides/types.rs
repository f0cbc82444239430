//! Core slide types.

use serde::Serialize;

/// Classification tag for a diagram slide.
///
/// Best-effort metadata used for labels only; it never affects which
/// slides are extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    Sequence,
    Er,
    Flowchart,
    Gantt,
    Pie,
    Git,
    Class,
    State,
    /// Nothing more specific matched.
    Diagram,
}

impl DiagramType {
    /// Stable lowercase tag.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::Er => "er",
            Self::Flowchart => "flowchart",
            Self::Gantt => "gantt",
            Self::Pie => "pie",
            Self::Git => "git",
            Self::Class => "class",
            Self::State => "state",
            Self::Diagram => "diagram",
        }
    }

    /// Human readable label for grid cards and the status bar.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sequence => "Sequence diagram",
            Self::Er => "Entity relationship",
            Self::Flowchart => "Flowchart",
            Self::Gantt => "Gantt chart",
            Self::Pie => "Pie chart",
            Self::Git => "Git graph",
            Self::Class => "Class diagram",
            Self::State => "State diagram",
            Self::Diagram => "Diagram",
        }
    }
}

impl std::fmt::Display for DiagramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// What a slide shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SlideKind {
    Diagram {
        code: String,
        #[serde(rename = "diagramType")]
        diagram_type: DiagramType,
    },
    Image {
        source: String,
        #[serde(rename = "altText")]
        alt_text: String,
    },
}

/// One unit of presented content.
///
/// Fields are private: a slide never changes after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slide {
    id: String,
    #[serde(flatten)]
    kind: SlideKind,
}

impl Slide {
    pub(crate) fn diagram(index: usize, code: String, diagram_type: DiagramType) -> Self {
        debug_assert!(!code.is_empty());
        Self {
            id: format!("diagram-{index}"),
            kind: SlideKind::Diagram { code, diagram_type },
        }
    }

    pub(crate) fn image(index: usize, source: String, alt_text: String) -> Self {
        debug_assert!(!source.is_empty());
        Self {
            id: format!("image-{index}"),
            kind: SlideKind::Image { source, alt_text },
        }
    }

    /// Identifier unique within one extraction result.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn kind(&self) -> &SlideKind {
        &self.kind
    }

    pub const fn is_diagram(&self) -> bool {
        matches!(self.kind, SlideKind::Diagram { .. })
    }

    /// Diagram source, if this is a diagram slide.
    pub fn code(&self) -> Option<&str> {
        match &self.kind {
            SlideKind::Diagram { code, .. } => Some(code),
            SlideKind::Image { .. } => None,
        }
    }

    pub const fn diagram_type(&self) -> Option<DiagramType> {
        match &self.kind {
            SlideKind::Diagram { diagram_type, .. } => Some(*diagram_type),
            SlideKind::Image { .. } => None,
        }
    }

    /// Short tag shown on grid cards: the diagram type or `image`.
    pub const fn type_tag(&self) -> &'static str {
        match &self.kind {
            SlideKind::Diagram { diagram_type, .. } => diagram_type.tag(),
            SlideKind::Image { .. } => "image",
        }
    }

    /// Title for the slide at `position` (0-based), e.g. `Diagram 3`.
    pub fn title(&self, position: usize) -> String {
        let noun = if self.is_diagram() { "Diagram" } else { "Image" };
        format!("{noun} {}", position + 1)
    }
}

/// Ordered slides from one extraction pass, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SlideCollection {
    slides: Vec<Slide>,
}

impl SlideCollection {
    pub(crate) const fn new(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slide> {
        self.slides.iter()
    }

    pub fn as_slice(&self) -> &[Slide] {
        &self.slides
    }

    /// Number of diagram slides.
    pub fn diagram_count(&self) -> usize {
        self.slides.iter().filter(|s| s.is_diagram()).count()
    }

    /// Number of image slides.
    pub fn image_count(&self) -> usize {
        self.len() - self.diagram_count()
    }

    /// Position of the slide with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.slides.iter().position(|s| s.id == id)
    }
}

impl<'a> IntoIterator for &'a SlideCollection {
    type Item = &'a Slide;
    type IntoIter = std::slice::Iter<'a, Slide>;

    fn into_iter(self) -> Self::IntoIter {
        self.slides.iter()
    }
}
