//! [`Page`] over the live browser DOM

use std::cell::RefCell;

use pagefx_core::dom::{HeadNode, Rect, Selector};
use pagefx_core::{ElementId, Page};
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, NodeList, Window};

use crate::registry::{parse_key, Registry};

/// Id handed out when the document has no usable root
const DETACHED: ElementId = ElementId(usize::MAX);

/// Attribute carrying a node's registry id
pub const KEY_ATTR: &str = "data-pagefx-id";

pub struct DomPage {
    window: Window,
    document: Document,
    registry: RefCell<Registry<Element>>,
}

impl DomPage {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            registry: RefCell::new(Registry::new()),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Id for a DOM element, e.g. an event target
    ///
    /// Known nodes are found through their key attribute. A copied attribute
    /// (from `cloneNode`) does not match and gets a fresh id.
    pub fn intern(&self, element: Element) -> ElementId {
        let known = element
            .get_attribute(KEY_ATTR)
            .and_then(|value| parse_key(&value))
            .filter(|&id| self.registry.borrow().get(id) == Some(&element));
        if let Some(id) = known {
            return id;
        }

        let id = self.registry.borrow_mut().insert(element.clone());
        if element.set_attribute(KEY_ATTR, &id.0.to_string()).is_err() {
            warn!("Failed to tag element");
        }
        id
    }

    pub fn element(&self, id: ElementId) -> Option<Element> {
        self.registry.borrow().get(id).cloned()
    }

    fn html(&self, id: ElementId) -> Option<HtmlElement> {
        self.element(id)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    }

    fn collect(&self, nodes: NodeList) -> Vec<ElementId> {
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.intern(element))
            .collect()
    }
}

impl Page for DomPage {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&mut self, y: f64) {
        self.window.scroll_to_with_x_and_y(0.0, y);
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn supports_intersection(&self) -> bool {
        js_sys::Reflect::has(&self.window, &"IntersectionObserver".into()).unwrap_or(false)
    }

    fn body(&self) -> ElementId {
        self.document
            .body()
            .map(Element::from)
            .or_else(|| self.document.document_element())
            .map(|root| self.intern(root))
            .unwrap_or(DETACHED)
    }

    fn query(&self, selector: &Selector<'_>) -> Vec<ElementId> {
        match self.document.query_selector_all(&selector.to_css()) {
            Ok(nodes) => self.collect(nodes),
            Err(_) => {
                warn!(selector = %selector.to_css(), "Invalid selector");
                Vec::new()
            }
        }
    }

    fn query_within(&self, root: ElementId, selector: &Selector<'_>) -> Vec<ElementId> {
        self.element(root)
            .and_then(|root| root.query_selector_all(&selector.to_css()).ok())
            .map(|nodes| self.collect(nodes))
            .unwrap_or_default()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.element(element)
            .and_then(|e| e.parent_element())
            .map(|p| self.intern(p))
    }

    fn children(&self, element: ElementId) -> Vec<ElementId> {
        let Some(element) = self.element(element) else {
            return Vec::new();
        };
        let children = element.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .map(|child| self.intern(child))
            .collect()
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Some(ancestor), Some(node)) => ancestor.contains(Some(&*node)),
            _ => false,
        }
    }

    fn attr(&self, element: ElementId, name: &str) -> Option<String> {
        self.element(element).and_then(|e| e.get_attribute(name))
    }

    fn set_attr(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(e) = self.element(element) {
            if e.set_attribute(name, value).is_err() {
                warn!(name, "Failed to set attribute");
            }
        }
    }

    fn remove_attr(&mut self, element: ElementId, name: &str) {
        if let Some(e) = self.element(element) {
            let _ = e.remove_attribute(name);
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.element(element)
            .is_some_and(|e| e.class_list().contains(class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(e) = self.element(element) {
            let _ = e.class_list().add_1(class);
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(e) = self.element(element) {
            let _ = e.class_list().remove_1(class);
        }
    }

    fn text(&self, element: ElementId) -> String {
        self.element(element)
            .and_then(|e| e.text_content())
            .unwrap_or_default()
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(e) = self.element(element) {
            e.set_text_content(Some(text));
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.html(element)
            .and_then(|e| e.style().get_property_value(property).ok())
            .filter(|v| !v.is_empty())
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        let Some(e) = self.html(element) else {
            return;
        };
        let style = e.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
        if result.is_err() {
            warn!(property, value, "Failed to set style");
        }
    }

    fn offset_top(&self, element: ElementId) -> f64 {
        self.html(element).map(|e| f64::from(e.offset_top())).unwrap_or(0.0)
    }

    fn offset_height(&self, element: ElementId) -> f64 {
        self.html(element).map(|e| f64::from(e.offset_height())).unwrap_or(0.0)
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        self.element(element)
            .map(|e| {
                let r = e.get_bounding_client_rect();
                Rect::new(r.top(), r.left(), r.width(), r.height())
            })
            .unwrap_or_default()
    }

    fn append_overlay(&mut self, host: ElementId, styles: &[(&str, String)]) -> ElementId {
        let Some(host) = self.element(host) else {
            return DETACHED;
        };
        let Ok(span) = self.document.create_element("span") else {
            return DETACHED;
        };
        if let Some(html) = span.dyn_ref::<HtmlElement>() {
            let style = html.style();
            for (property, value) in styles {
                let _ = style.set_property(property, value);
            }
        }
        if host.append_child(&span).is_err() {
            warn!("Failed to append overlay");
            return DETACHED;
        }
        self.intern(span)
    }

    fn remove(&mut self, element: ElementId) {
        if let Some(e) = self.registry.borrow_mut().release(element) {
            e.remove();
        }
    }

    fn is_attached(&self, element: ElementId) -> bool {
        self.element(element).is_some_and(|e| e.is_connected())
    }

    fn append_head(&mut self, node: HeadNode) {
        let Some(head) = self.document.head() else {
            warn!("Document has no <head>");
            return;
        };
        let created = match node {
            HeadNode::Style(css) => self.document.create_element("style").map(|style| {
                style.set_text_content(Some(&css));
                style
            }),
            HeadNode::PreloadStyle(href) => self.document.create_element("link").map(|link| {
                let _ = link.set_attribute("rel", "preload");
                let _ = link.set_attribute("as", "style");
                let _ = link.set_attribute("href", &href);
                link
            }),
        };
        match created {
            Ok(element) => {
                let _ = head.append_child(&element);
            }
            Err(_) => warn!("Failed to create head element"),
        }
    }

    fn active_element(&self) -> Option<ElementId> {
        self.document.active_element().map(|e| self.intern(e))
    }

    fn focus(&mut self, element: ElementId) {
        if let Some(e) = self.html(element) {
            let _ = e.focus();
        }
    }

    fn reset_form(&mut self, form: ElementId) {
        if let Some(form) = self
            .element(form)
            .and_then(|e| e.dyn_into::<HtmlFormElement>().ok())
        {
            form.reset();
        }
    }

    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn user_agent(&self) -> String {
        self.window.navigator().user_agent().unwrap_or_default()
    }
}
