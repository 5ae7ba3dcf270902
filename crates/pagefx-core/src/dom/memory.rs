//! In-memory page used by tests and native simulation
//!
//! Geometry is static: every element carries a document-space box and the
//! viewport-relative rect is derived from the current scroll offset.

use std::collections::BTreeMap;

use super::{ElementId, HeadNode, Page, Rect, Selector};

/// Observable change made through the [`Page`] API
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Style {
        element: ElementId,
        property: String,
        value: String,
    },
    ClassAdded {
        element: ElementId,
        class: String,
    },
    ClassRemoved {
        element: ElementId,
        class: String,
    },
    Appended(ElementId),
    Removed(ElementId),
    Scrolled(f64),
    Focused(ElementId),
    FormReset(ElementId),
}

/// Declarative description of an element to insert
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    /// `position: fixed`: the rect ignores the scroll offset
    pub fixed: bool,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Document-space vertical placement
    pub fn at(mut self, top: f64, height: f64) -> Self {
        self.top = top;
        self.height = height;
        self
    }

    /// Horizontal placement
    pub fn span(mut self, left: f64, width: f64) -> Self {
        self.left = left;
        self.width = width;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    rect: Rect,
    fixed: bool,
    attached: bool,
}

impl Node {
    fn from_spec(spec: ElementSpec, parent: Option<ElementId>) -> Self {
        let mut attrs: BTreeMap<String, String> = spec.attrs.into_iter().collect();
        if let Some(id) = spec.id {
            attrs.insert("id".to_string(), id);
        }
        Self {
            tag: spec.tag,
            classes: spec.classes,
            attrs,
            styles: BTreeMap::new(),
            text: spec.text,
            parent,
            children: Vec::new(),
            rect: Rect::new(spec.top, spec.left, spec.width, spec.height),
            fixed: spec.fixed,
            attached: true,
        }
    }

    fn matches(&self, selector: &Selector<'_>) -> bool {
        let attr = |name: &str| self.attrs.get(name).map(String::as_str);
        match *selector {
            Selector::Id(id) => attr("id") == Some(id),
            Selector::Class(class) => self.classes.iter().any(|c| c == class),
            Selector::AnyClass(classes) => self
                .classes
                .iter()
                .any(|c| classes.contains(&c.as_str())),
            Selector::Attr(name) => attr(name).is_some(),
            Selector::TagWithAttr { tag, attr: name } => {
                self.tag == tag && attr(name).is_some()
            }
            Selector::AttrEquals {
                tag,
                attr: name,
                value,
            } => self.tag == tag && attr(name) == Some(value),
            Selector::AttrPrefix {
                tag,
                attr: name,
                prefix,
            } => self.tag == tag && attr(name).is_some_and(|v| v.starts_with(prefix)),
            Selector::ClassWithAttrContaining {
                class,
                attr: name,
                needle,
            } => {
                self.classes.iter().any(|c| c == class)
                    && attr(name).is_some_and(|v| v.contains(needle))
            }
            Selector::Focusable => {
                matches!(self.tag.as_str(), "a" | "button")
                    || attr("tabindex").is_some_and(|v| v != "-1")
            }
        }
    }
}

/// In-memory [`Page`] implementation
#[derive(Debug, Clone)]
pub struct MemoryPage {
    nodes: Vec<Node>,
    head: Vec<HeadNode>,
    scroll_y: f64,
    viewport_height: f64,
    document_height: Option<f64>,
    intersection: bool,
    active: Option<ElementId>,
    location: String,
    user_agent: String,
    log: Vec<Mutation>,
}

impl MemoryPage {
    /// Empty document with a `<body>` and the given viewport height
    pub fn new(viewport_height: f64) -> Self {
        let body = Node::from_spec(ElementSpec::new("body"), None);
        Self {
            nodes: vec![body],
            head: Vec::new(),
            scroll_y: 0.0,
            viewport_height,
            document_height: None,
            intersection: true,
            active: None,
            location: "about:blank".to_string(),
            user_agent: "pagefx-memory".to_string(),
            log: Vec::new(),
        }
    }

    /// Append a new element under `parent` (or the body)
    pub fn insert(&mut self, spec: ElementSpec, parent: Option<ElementId>) -> ElementId {
        let parent = parent.unwrap_or_else(|| self.body());
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node::from_spec(spec, Some(parent)));
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(id);
        }
        id
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the scrollable height (defaults to the lowest element bottom)
    pub fn with_document_height(mut self, height: f64) -> Self {
        self.document_height = Some(height);
        self
    }

    /// Simulate a host without intersection support
    pub fn without_intersection(mut self) -> Self {
        self.intersection = false;
        self
    }

    pub fn max_scroll(&self) -> f64 {
        let height = self.document_height.unwrap_or_else(|| {
            self.nodes
                .iter()
                .filter(|n| n.attached && !n.fixed)
                .map(|n| n.rect.bottom())
                .fold(0.0, f64::max)
        });
        (height - self.viewport_height).max(0.0)
    }

    pub fn head(&self) -> &[HeadNode] {
        &self.head
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    pub fn clear_mutations(&mut self) {
        self.log.clear();
    }

    /// Number of times `property` was written with exactly `value`
    pub fn style_writes(&self, element: ElementId, property: &str, value: &str) -> usize {
        self.log
            .iter()
            .filter(|m| {
                matches!(m, Mutation::Style { element: e, property: p, value: v }
                    if *e == element && p == property && v == value)
            })
            .count()
    }

    pub fn tag(&self, element: ElementId) -> Option<&str> {
        self.nodes.get(element.0).map(|n| n.tag.as_str())
    }

    /// Attached elements in document order, body first
    pub fn elements(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        self.walk(self.body(), true, &mut out);
        out
    }

    fn walk(&self, from: ElementId, include_self: bool, out: &mut Vec<ElementId>) {
        let Some(node) = self.nodes.get(from.0) else {
            return;
        };
        if !node.attached {
            return;
        }
        if include_self {
            out.push(from);
        }
        for &child in &node.children {
            self.walk(child, true, out);
        }
    }

    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(element.0)
    }

    fn node_mut(&mut self, element: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(element.0)
    }
}

impl Page for MemoryPage {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to(&mut self, y: f64) {
        let y = y.clamp(0.0, self.max_scroll());
        self.scroll_y = y;
        self.log.push(Mutation::Scrolled(y));
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn supports_intersection(&self) -> bool {
        self.intersection
    }

    fn body(&self) -> ElementId {
        ElementId(0)
    }

    fn query(&self, selector: &Selector<'_>) -> Vec<ElementId> {
        self.elements()
            .into_iter()
            .filter(|&e| self.node(e).is_some_and(|n| n.matches(selector)))
            .collect()
    }

    fn query_within(&self, root: ElementId, selector: &Selector<'_>) -> Vec<ElementId> {
        let mut scope = Vec::new();
        self.walk(root, false, &mut scope);
        scope
            .into_iter()
            .filter(|&e| self.node(e).is_some_and(|n| n.matches(selector)))
            .collect()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.node(element).and_then(|n| n.parent)
    }

    fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.node(element)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|&c| self.is_attached(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(element) = current {
            if element == ancestor {
                return true;
            }
            current = self.parent(element);
        }
        false
    }

    fn attr(&self, element: ElementId, name: &str) -> Option<String> {
        self.node(element).and_then(|n| n.attrs.get(name).cloned())
    }

    fn set_attr(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(element) {
            node.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attr(&mut self, element: ElementId, name: &str) {
        if let Some(node) = self.node_mut(element) {
            node.attrs.remove(name);
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.node(element)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        let Some(node) = self.node_mut(element) else {
            return;
        };
        if node.classes.iter().any(|c| c == class) {
            return;
        }
        node.classes.push(class.to_string());
        self.log.push(Mutation::ClassAdded {
            element,
            class: class.to_string(),
        });
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        let Some(node) = self.node_mut(element) else {
            return;
        };
        let before = node.classes.len();
        node.classes.retain(|c| c != class);
        if node.classes.len() != before {
            self.log.push(Mutation::ClassRemoved {
                element,
                class: class.to_string(),
            });
        }
    }

    fn text(&self, element: ElementId) -> String {
        self.node(element).map(|n| n.text.clone()).unwrap_or_default()
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(node) = self.node_mut(element) {
            node.text = text.to_string();
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.node(element).and_then(|n| n.styles.get(property).cloned())
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        let Some(node) = self.node_mut(element) else {
            return;
        };
        if value.is_empty() {
            node.styles.remove(property);
        } else {
            node.styles.insert(property.to_string(), value.to_string());
        }
        self.log.push(Mutation::Style {
            element,
            property: property.to_string(),
            value: value.to_string(),
        });
    }

    fn offset_top(&self, element: ElementId) -> f64 {
        self.node(element).map(|n| n.rect.top).unwrap_or(0.0)
    }

    fn offset_height(&self, element: ElementId) -> f64 {
        self.node(element).map(|n| n.rect.height).unwrap_or(0.0)
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        let Some(node) = self.node(element) else {
            return Rect::default();
        };
        let shift = if node.fixed { 0.0 } else { self.scroll_y };
        Rect {
            top: node.rect.top - shift,
            ..node.rect
        }
    }

    fn append_overlay(&mut self, host: ElementId, styles: &[(&str, String)]) -> ElementId {
        let id = self.insert(ElementSpec::new("span"), Some(host));
        if let Some(node) = self.node_mut(id) {
            for (property, value) in styles {
                node.styles.insert(property.to_string(), value.clone());
            }
        }
        self.log.push(Mutation::Appended(id));
        id
    }

    fn remove(&mut self, element: ElementId) {
        if element == self.body() {
            return;
        }
        let Some(node) = self.node_mut(element) else {
            return;
        };
        if !node.attached {
            return;
        }
        node.attached = false;
        let parent = node.parent;
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|&c| c != element);
        }
        if self.active.is_some_and(|a| self.contains(element, a)) {
            self.active = None;
        }
        self.log.push(Mutation::Removed(element));
    }

    fn is_attached(&self, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(e) = current {
            match self.node(e) {
                Some(node) if node.attached => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    fn append_head(&mut self, node: HeadNode) {
        self.head.push(node);
    }

    fn active_element(&self) -> Option<ElementId> {
        self.active
    }

    fn focus(&mut self, element: ElementId) {
        if self.is_attached(element) {
            self.active = Some(element);
            self.log.push(Mutation::Focused(element));
        }
    }

    fn reset_form(&mut self, form: ElementId) {
        self.log.push(Mutation::FormReset(form));
    }

    fn location(&self) -> String {
        self.location.clone()
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MemoryPage, ElementId, ElementId, ElementId) {
        let mut page = MemoryPage::new(800.0);
        let section = page.insert(
            ElementSpec::new("section").id("about").class("section").at(600.0, 400.0),
            None,
        );
        let card = page.insert(
            ElementSpec::new("div").class("product__card").at(650.0, 200.0),
            Some(section),
        );
        let header = page.insert(ElementSpec::new("header").class("header").at(0.0, 80.0).fixed(), None);
        (page, section, card, header)
    }

    #[test]
    fn test_query_document_order() {
        let (page, section, card, _) = sample();
        assert_eq!(page.query(&Selector::Id("about")), vec![section]);
        assert_eq!(
            page.query(&Selector::AnyClass(&["product__card", "section"])),
            vec![section, card]
        );
        assert_eq!(
            page.query_within(section, &Selector::Class("section")),
            Vec::<ElementId>::new()
        );
    }

    #[test]
    fn test_bounding_rect_tracks_scroll() {
        let (mut page, section, _, header) = sample();
        page.scroll_to(100.0);
        assert_eq!(page.bounding_rect(section).top, 500.0);
        assert_eq!(page.bounding_rect(header).top, 0.0);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let (mut page, _, _, _) = sample();
        page.scroll_to(10_000.0);
        assert_eq!(page.scroll_y(), 200.0);
        page.scroll_to(-5.0);
        assert_eq!(page.scroll_y(), 0.0);
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let (mut page, section, card, _) = sample();
        page.remove(section);
        assert!(!page.is_attached(card));
        assert!(page.query(&Selector::Class("product__card")).is_empty());
    }

    #[test]
    fn test_class_mutations_only_logged_on_change() {
        let (mut page, section, _, _) = sample();
        page.add_class(section, "visible");
        page.add_class(section, "visible");
        page.remove_class(section, "missing");
        assert_eq!(page.mutations().len(), 1);
    }
}
