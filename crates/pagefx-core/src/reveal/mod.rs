//! Entrance animations driven by viewport intersection
//!
//! A [`Watcher`] tracks a set of elements and reveals each one the first time
//! it crosses its intersection threshold. Reveals are one-way: once visible an
//! element never returns to its hidden state.
//!
//! Intersections are computed from element geometry on every scroll dispatch,
//! so the same code runs in the browser and against [`crate::dom::MemoryPage`].
//! Only the vertical axis is considered.

pub mod divider;

use std::time::Duration;

use tracing::debug;

use crate::config::RevealConfig;
use crate::dom::{translate_y, ElementId, Page, Rect, Selector};
use crate::scheduler::{Scheduler, Task};
use crate::scroll::{ScrollFrame, ScrollSubscriber};

pub use divider::{AnimationDescriptor, DividerKind};

/// Cards and feature blocks that fade in on their own
pub const CARD_CLASSES: &[&str] = &[
    "product__card",
    "brand__card",
    "testimonial__card",
    "about__feature",
    "contact__card",
];

/// Cards that also pull their siblings in, staggered
pub const STAGGER_SIBLING_CLASSES: &[&str] = &["product__card", "brand__card", "testimonial__card"];

/// Children revealed one after another when their section appears
pub const SECTION_CHILD_CLASSES: &[&str] = &[
    "section__header",
    "about__feature",
    "product__card",
    "brand__card",
    "testimonial__card",
    "contact__card",
];

pub const VISIBLE_CLASS: &str = "visible";
pub const LAZY_CLASS: &str = "lazy";

const HIDDEN_OFFSET: f64 = 30.0;
const TRANSITION: &str = "opacity 0.6s ease, transform 0.6s ease";

/// Vertical root margin; positive grows the viewport, negative shrinks it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
    pub top: f64,
    pub bottom: f64,
}

impl RootMargin {
    pub fn all(px: f64) -> Self {
        Self { top: px, bottom: px }
    }

    pub fn bottom(px: f64) -> Self {
        Self { top: 0.0, bottom: px }
    }
}

/// Fraction of `rect` inside the (margin-adjusted) viewport
///
/// `None` when the element does not touch the root at all. Zero-height
/// elements count as fully visible when their edge lies within the root.
pub fn intersection_ratio(rect: Rect, viewport_height: f64, margin: RootMargin) -> Option<f64> {
    let root_top = -margin.top;
    let root_bottom = viewport_height + margin.bottom;
    let overlap = rect.bottom().min(root_bottom) - rect.top.max(root_top);
    if overlap < 0.0 {
        return None;
    }
    if rect.height <= 0.0 {
        return Some(1.0);
    }
    Some((overlap / rect.height).clamp(0.0, 1.0))
}

/// Whether an intersection ratio counts as "is intersecting" at `threshold`
#[inline]
pub fn crosses(ratio: Option<f64>, threshold: f64) -> bool {
    match ratio {
        Some(ratio) if threshold <= 0.0 => ratio >= 0.0,
        Some(ratio) => ratio > 0.0 && ratio >= threshold,
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub threshold: f64,
    pub margin: RootMargin,
    /// Stop tracking an element once it has been revealed
    pub unobserve_on_reveal: bool,
}

/// What happens to an element when it becomes visible
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealBehavior {
    /// Fade in and play the divider kind's entrance animation
    Divider,
    /// Mark `.visible` and reveal section children one by one
    Section { stagger: Duration },
    /// Fade in and pull sibling cards in, staggered by sibling index
    Card { stagger: Duration },
    /// Swap in `data-src` and drop the `lazy` class
    LazyImage,
}

impl RevealBehavior {
    /// Elements start hidden and offset until revealed
    fn starts_hidden(&self) -> bool {
        matches!(self, RevealBehavior::Divider | RevealBehavior::Card { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct Watched {
    element: ElementId,
    revealed: bool,
}

/// One intersection watcher over a fixed element set
#[derive(Debug)]
pub struct Watcher {
    name: &'static str,
    options: WatchOptions,
    behavior: RevealBehavior,
    entries: Vec<Watched>,
}

/// Fade an element to its resting state
pub fn show(page: &mut dyn Page, element: ElementId) {
    page.set_style(element, "opacity", "1");
    page.set_style(element, "transform", "translateY(0)");
}

impl Watcher {
    pub fn new(
        name: &'static str,
        elements: Vec<ElementId>,
        options: WatchOptions,
        behavior: RevealBehavior,
    ) -> Self {
        let entries = elements
            .into_iter()
            .map(|element| Watched {
                element,
                revealed: false,
            })
            .collect();
        Self {
            name,
            options,
            behavior,
            entries,
        }
    }

    /// `.section-divider` elements
    pub fn dividers(page: &dyn Page, config: &RevealConfig) -> Self {
        Self::new(
            "dividers",
            page.query(&Selector::Class("section-divider")),
            WatchOptions {
                threshold: config.divider_threshold,
                margin: RootMargin::all(config.margin),
                unobserve_on_reveal: false,
            },
            RevealBehavior::Divider,
        )
    }

    /// `.section` containers
    pub fn sections(page: &dyn Page, config: &RevealConfig) -> Self {
        Self::new(
            "sections",
            page.query(&Selector::Class("section")),
            WatchOptions {
                threshold: config.section_threshold,
                margin: RootMargin::all(config.margin),
                unobserve_on_reveal: false,
            },
            RevealBehavior::Section {
                stagger: config.stagger(),
            },
        )
    }

    /// Product, brand and testimonial cards, about features, contact cards
    pub fn cards(page: &dyn Page, config: &RevealConfig) -> Self {
        Self::new(
            "cards",
            page.query(&Selector::AnyClass(CARD_CLASSES)),
            WatchOptions {
                threshold: config.card_threshold,
                margin: RootMargin::bottom(config.card_bottom_margin),
                unobserve_on_reveal: false,
            },
            RevealBehavior::Card {
                stagger: config.stagger(),
            },
        )
    }

    /// `img[loading="lazy"]`
    pub fn lazy_images(page: &dyn Page) -> Self {
        Self::new(
            "lazy-images",
            page.query(&Selector::AttrEquals {
                tag: "img",
                attr: "loading",
                value: "lazy",
            }),
            WatchOptions {
                threshold: 0.0,
                margin: RootMargin::default(),
                unobserve_on_reveal: true,
            },
            RevealBehavior::LazyImage,
        )
    }

    pub fn behavior(&self) -> RevealBehavior {
        self.behavior
    }

    /// Elements still tracked
    pub fn watched(&self) -> Vec<ElementId> {
        self.entries.iter().map(|e| e.element).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_revealed(&self, element: ElementId) -> bool {
        self.entries
            .iter()
            .any(|e| e.element == element && e.revealed)
    }

    pub fn revealed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.revealed).count()
    }

    /// Apply the hidden starting state
    pub fn prime(&self, page: &mut dyn Page) {
        if !self.behavior.starts_hidden() {
            return;
        }
        for entry in &self.entries {
            page.set_style(entry.element, "opacity", "0");
            page.set_style(entry.element, "transform", &translate_y(HIDDEN_OFFSET));
            page.set_style(entry.element, "transition", TRANSITION);
        }
    }

    /// Reveal everything at once, without animation
    ///
    /// Used when the host cannot report intersections. Lazy images keep their
    /// markup untouched.
    pub fn reveal_all_immediately(&mut self, page: &mut dyn Page) {
        if self.behavior == RevealBehavior::LazyImage {
            return;
        }
        for entry in self.entries.iter_mut() {
            match self.behavior {
                RevealBehavior::Divider | RevealBehavior::Card { .. } => show(page, entry.element),
                RevealBehavior::Section { .. } => {
                    page.add_class(entry.element, VISIBLE_CLASS);
                    for child in page.query_within(entry.element, &Selector::AnyClass(SECTION_CHILD_CLASSES)) {
                        show(page, child);
                    }
                }
                RevealBehavior::LazyImage => {}
            }
            entry.revealed = true;
        }
        debug!(watcher = self.name, count = self.entries.len(), "Revealed without intersection support");
        if self.options.unobserve_on_reveal {
            self.entries.clear();
        }
    }

    /// Reveal every tracked element that currently crosses the threshold
    pub fn check(&mut self, page: &mut dyn Page, tasks: &mut Scheduler<Task>) {
        let viewport_height = page.viewport_height();
        let mut revealed_any = false;

        for entry in self.entries.iter_mut().filter(|e| !e.revealed) {
            let ratio = intersection_ratio(page.bounding_rect(entry.element), viewport_height, self.options.margin);
            if !crosses(ratio, self.options.threshold) {
                continue;
            }
            debug!(watcher = self.name, element = entry.element.0, ratio = ?ratio, "Element revealed");
            reveal(self.behavior, entry.element, page, tasks);
            entry.revealed = true;
            revealed_any = true;
        }

        if revealed_any && self.options.unobserve_on_reveal {
            self.entries.retain(|e| !e.revealed);
        }
    }
}

impl ScrollSubscriber for Watcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn on_scroll(&mut self, _: &ScrollFrame, page: &mut dyn Page, tasks: &mut Scheduler<Task>) {
        self.check(page, tasks);
    }
}

fn reveal(behavior: RevealBehavior, element: ElementId, page: &mut dyn Page, tasks: &mut Scheduler<Task>) {
    match behavior {
        RevealBehavior::Divider => {
            show(page, element);
            if let Some(animation) = DividerKind::of(page, element).entrance_css() {
                page.set_style(element, "animation", &animation);
            }
        }
        RevealBehavior::Section { stagger } => {
            page.add_class(element, VISIBLE_CLASS);
            let children = page.query_within(element, &Selector::AnyClass(SECTION_CHILD_CLASSES));
            for (index, child) in children.into_iter().enumerate() {
                tasks.schedule(stagger * index as u32, Task::Reveal(child));
            }
        }
        RevealBehavior::Card { stagger } => {
            show(page, element);
            let Some(parent) = page.parent(element) else {
                return;
            };
            for (index, sibling) in page.children(parent).into_iter().enumerate() {
                let staggered = STAGGER_SIBLING_CLASSES
                    .iter()
                    .any(|class| page.has_class(sibling, class));
                if staggered {
                    tasks.schedule(stagger * index as u32, Task::Reveal(sibling));
                }
            }
        }
        RevealBehavior::LazyImage => load_image(page, element),
    }
}

fn load_image(page: &mut dyn Page, image: ElementId) {
    if let Some(source) = page.attr(image, "data-src") {
        page.set_attr(image, "src", &source);
    }
    page.remove_class(image, LAZY_CLASS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryPage};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_intersection_ratio() {
        let rect = Rect::new(700.0, 0.0, 100.0, 200.0);
        assert_eq!(intersection_ratio(rect, 800.0, RootMargin::default()), Some(0.5));
        assert_eq!(intersection_ratio(rect, 800.0, RootMargin::bottom(-50.0)), Some(0.25));
        assert_eq!(intersection_ratio(Rect::new(900.0, 0.0, 10.0, 10.0), 800.0, RootMargin::default()), None);
        // A root margin lets elements below the fold count
        assert_eq!(intersection_ratio(Rect::new(820.0, 0.0, 10.0, 100.0), 800.0, RootMargin::all(50.0)), Some(0.3));
    }

    #[test]
    fn test_crosses_threshold() {
        assert!(crosses(Some(0.3), 0.3));
        assert!(!crosses(Some(0.29), 0.3));
        assert!(!crosses(Some(0.0), 0.1));
        assert!(crosses(Some(0.0), 0.0));
        assert!(!crosses(None, 0.0));
    }

    #[test]
    fn test_card_reveal_staggers_siblings() {
        let mut page = MemoryPage::new(800.0).with_document_height(3000.0);
        let grid = page.insert(ElementSpec::new("div").class("products__grid").at(1000.0, 400.0), None);
        let first = page.insert(ElementSpec::new("div").class("product__card").at(1000.0, 400.0), Some(grid));
        let note = page.insert(ElementSpec::new("p").at(1000.0, 20.0), Some(grid));
        let third = page.insert(ElementSpec::new("div").class("product__card").at(1000.0, 400.0), Some(grid));

        let mut watcher = Watcher::cards(&page, &RevealConfig::default());
        watcher.prime(&mut page);
        assert_eq!(page.style(third, "opacity").as_deref(), Some("0"));

        let mut tasks = Scheduler::new();
        watcher.check(&mut page, &mut tasks);
        assert_eq!(watcher.revealed_count(), 0);

        page.scroll_to(500.0);
        watcher.check(&mut page, &mut tasks);
        assert!(watcher.is_revealed(first));
        assert_eq!(page.style(first, "opacity").as_deref(), Some("1"));

        let due = tasks.advance(ms(200));
        assert!(due.contains(&Task::Reveal(first)));
        assert!(due.contains(&Task::Reveal(third)));
        assert!(!due.contains(&Task::Reveal(note)));
        assert_eq!(tasks.pending(), 0);
    }

    #[test]
    fn test_section_reveal_schedules_children() {
        let mut page = MemoryPage::new(800.0);
        let section = page.insert(ElementSpec::new("section").class("section").at(0.0, 600.0), None);
        let header = page.insert(ElementSpec::new("div").class("section__header").at(0.0, 50.0), Some(section));
        let feature = page.insert(ElementSpec::new("div").class("about__feature").at(60.0, 50.0), Some(section));

        let mut watcher = Watcher::sections(&page, &RevealConfig::default());
        let mut tasks = Scheduler::new();
        watcher.check(&mut page, &mut tasks);

        assert!(page.has_class(section, VISIBLE_CLASS));
        assert_eq!(tasks.advance(ms(0)), vec![Task::Reveal(header)]);
        assert_eq!(tasks.advance(ms(100)), vec![Task::Reveal(feature)]);
    }

    #[test]
    fn test_reveal_is_one_way() {
        let mut page = MemoryPage::new(800.0).with_document_height(4000.0);
        let divider = page.insert(
            ElementSpec::new("div")
                .class("section-divider")
                .class("section-divider--dots")
                .at(100.0, 40.0),
            None,
        );
        let mut watcher = Watcher::dividers(&page, &RevealConfig::default());
        watcher.prime(&mut page);
        let mut tasks = Scheduler::new();

        watcher.check(&mut page, &mut tasks);
        assert_eq!(page.style(divider, "animation").as_deref(), Some("dots-entrance 0.8s ease-out"));

        page.scroll_to(2000.0);
        page.clear_mutations();
        watcher.check(&mut page, &mut tasks);
        assert!(watcher.is_revealed(divider));
        assert!(page.mutations().is_empty());
    }

    #[test]
    fn test_lazy_image_unobserved_after_load() {
        let mut page = MemoryPage::new(800.0).with_document_height(4000.0);
        let image = page.insert(
            ElementSpec::new("img")
                .class("lazy")
                .attr("loading", "lazy")
                .attr("data-src", "/img/phone.webp")
                .at(1200.0, 300.0),
            None,
        );
        let mut watcher = Watcher::lazy_images(&page);
        let mut tasks = Scheduler::new();

        watcher.check(&mut page, &mut tasks);
        assert_eq!(page.attr(image, "src"), None);

        page.scroll_to(600.0);
        watcher.check(&mut page, &mut tasks);
        assert_eq!(page.attr(image, "src").as_deref(), Some("/img/phone.webp"));
        assert!(!page.has_class(image, LAZY_CLASS));
        assert!(watcher.is_empty());
    }

    #[test]
    fn test_fallback_reveals_everything() {
        let mut page = MemoryPage::new(800.0).without_intersection();
        let card = page.insert(ElementSpec::new("div").class("brand__card").at(5000.0, 100.0), None);
        let mut watcher = Watcher::cards(&page, &RevealConfig::default());
        watcher.prime(&mut page);

        watcher.reveal_all_immediately(&mut page);
        assert_eq!(page.style(card, "opacity").as_deref(), Some("1"));
        assert_eq!(page.style(card, "transform").as_deref(), Some("translateY(0)"));
        assert_eq!(watcher.revealed_count(), 1);
    }
}
