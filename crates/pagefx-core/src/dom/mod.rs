//! Host DOM contract
//!
//! The engine never touches a browser directly. Every read and write goes
//! through [`Page`], which the browser host implements over `web-sys` and
//! [`MemoryPage`] implements in memory for tests and native simulation.
//!
//! Style properties use their CSS (kebab-case) names, e.g. `box-shadow`.

mod memory;

pub use memory::{ElementSpec, MemoryPage, Mutation};

/// Handle to an element owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// Viewport-relative position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport-relative bounding box, as returned by `getBoundingClientRect`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// True when any part of the box lies inside a viewport of the given height
    #[inline]
    pub fn overlaps_viewport(&self, viewport_height: f64) -> bool {
        self.top < viewport_height && self.bottom() > 0.0
    }
}

/// The handful of selector shapes the engine needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    /// `#id`
    Id(&'a str),
    /// `.class`
    Class(&'a str),
    /// `.a, .b, .c` (document order)
    AnyClass(&'a [&'a str]),
    /// `[attr]`
    Attr(&'a str),
    /// `tag[attr]`
    TagWithAttr { tag: &'a str, attr: &'a str },
    /// `tag[attr="value"]`
    AttrEquals {
        tag: &'a str,
        attr: &'a str,
        value: &'a str,
    },
    /// `tag[attr^="prefix"]`
    AttrPrefix {
        tag: &'a str,
        attr: &'a str,
        prefix: &'a str,
    },
    /// `.class[attr*="needle"]`
    ClassWithAttrContaining {
        class: &'a str,
        attr: &'a str,
        needle: &'a str,
    },
    /// `a, button, [tabindex]:not([tabindex="-1"])`
    Focusable,
}

impl Selector<'_> {
    /// CSS text for hosts with a native selector engine
    pub fn to_css(&self) -> String {
        match self {
            Selector::Id(id) => format!("#{}", id),
            Selector::Class(class) => format!(".{}", class),
            Selector::AnyClass(classes) => classes
                .iter()
                .map(|c| format!(".{}", c))
                .collect::<Vec<_>>()
                .join(", "),
            Selector::Attr(attr) => format!("[{}]", attr),
            Selector::TagWithAttr { tag, attr } => format!("{}[{}]", tag, attr),
            Selector::AttrEquals { tag, attr, value } => {
                format!("{}[{}=\"{}\"]", tag, attr, value)
            }
            Selector::AttrPrefix { tag, attr, prefix } => {
                format!("{}[{}^=\"{}\"]", tag, attr, prefix)
            }
            Selector::ClassWithAttrContaining {
                class,
                attr,
                needle,
            } => format!(".{}[{}*=\"{}\"]", class, attr, needle),
            Selector::Focusable => "a, button, [tabindex]:not([tabindex=\"-1\"])".to_string(),
        }
    }
}

/// Nodes the engine appends to the document head
#[derive(Debug, Clone, PartialEq)]
pub enum HeadNode {
    /// `<style>` block
    Style(String),
    /// `<link rel="preload" as="style" href=...>`
    PreloadStyle(String),
}

/// DOM operations the engine relies on
pub trait Page {
    // Viewport

    fn scroll_y(&self) -> f64;
    fn scroll_to(&mut self, y: f64);
    fn viewport_height(&self) -> f64;
    /// Whether the host can report element/viewport intersections
    fn supports_intersection(&self) -> bool {
        true
    }

    // Lookup

    fn body(&self) -> ElementId;
    fn query(&self, selector: &Selector<'_>) -> Vec<ElementId>;
    fn query_within(&self, root: ElementId, selector: &Selector<'_>) -> Vec<ElementId>;
    fn parent(&self, element: ElementId) -> Option<ElementId>;
    fn children(&self, element: ElementId) -> Vec<ElementId>;
    /// True if `node` is `ancestor` or lies inside it
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool;

    fn query_one(&self, selector: &Selector<'_>) -> Option<ElementId> {
        self.query(selector).into_iter().next()
    }

    // Attributes, classes, text

    fn attr(&self, element: ElementId, name: &str) -> Option<String>;
    fn set_attr(&mut self, element: ElementId, name: &str, value: &str);
    fn remove_attr(&mut self, element: ElementId, name: &str);
    fn has_class(&self, element: ElementId, class: &str) -> bool;
    fn add_class(&mut self, element: ElementId, class: &str);
    fn remove_class(&mut self, element: ElementId, class: &str);
    fn text(&self, element: ElementId) -> String;
    fn set_text(&mut self, element: ElementId, text: &str);

    // Inline style

    fn style(&self, element: ElementId, property: &str) -> Option<String>;
    /// Setting an empty value removes the property
    fn set_style(&mut self, element: ElementId, property: &str, value: &str);

    // Geometry

    fn offset_top(&self, element: ElementId) -> f64;
    fn offset_height(&self, element: ElementId) -> f64;
    fn bounding_rect(&self, element: ElementId) -> Rect;

    // Structure

    /// Append an absolutely styled `<span>` to `host` and return it
    fn append_overlay(&mut self, host: ElementId, styles: &[(&str, String)]) -> ElementId;
    fn remove(&mut self, element: ElementId);
    fn is_attached(&self, element: ElementId) -> bool;
    fn append_head(&mut self, node: HeadNode);

    // Focus and forms

    fn active_element(&self) -> Option<ElementId>;
    fn focus(&mut self, element: ElementId);
    fn reset_form(&mut self, form: ElementId);

    // Environment

    fn location(&self) -> String;
    fn user_agent(&self) -> String;
}

/// Walk up from `node` (inclusive) to the first element satisfying `pred`
pub fn closest(
    page: &dyn Page,
    node: ElementId,
    pred: impl Fn(&dyn Page, ElementId) -> bool,
) -> Option<ElementId> {
    let mut current = Some(node);
    while let Some(element) = current {
        if pred(page, element) {
            return Some(element);
        }
        current = page.parent(element);
    }
    None
}

/// Format a pixel length the way a template literal would (no `-0`)
pub fn px(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{}px", value)
}

/// `translateY(...)` for a pixel offset
pub fn translate_y(offset: f64) -> String {
    format!("translateY({})", px(offset))
}
