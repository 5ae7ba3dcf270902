//! Scroll-driven presentation effects
//!
//! Each subscriber owns one presentation property and recomputes it from the
//! shared [`ScrollFrame`].

use tracing::debug;

use super::coordinator::{ScrollFrame, ScrollSubscriber};
use crate::config::{HeaderConfig, ParallaxConfig};
use crate::dom::{px, translate_y, ElementId, Page, Selector};
use crate::scheduler::{Scheduler, Task};

pub const ACTIVE_LINK_CLASS: &str = "active-link";
pub const SHOW_CLASS: &str = "show";

/// Header appearance for one scroll sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderState {
    /// Past the shade threshold: denser background and a drop shadow
    pub shaded: bool,
    /// Translated off-screen
    pub hidden: bool,
}

impl HeaderState {
    pub fn at(frame: &ScrollFrame, config: &HeaderConfig) -> Self {
        Self {
            shaded: frame.y > config.shade_threshold,
            hidden: frame.scrolling_down() && frame.y > config.hide_threshold,
        }
    }
}

/// Header shading and hide-on-scroll-down
#[derive(Debug)]
pub struct HeaderEffect {
    header: ElementId,
    config: HeaderConfig,
    applied: Option<HeaderState>,
}

impl HeaderEffect {
    pub fn new(header: ElementId, config: HeaderConfig) -> Self {
        Self {
            header,
            config,
            applied: None,
        }
    }

    pub fn state(&self) -> Option<HeaderState> {
        self.applied
    }
}

impl ScrollSubscriber for HeaderEffect {
    fn name(&self) -> &'static str {
        "header"
    }

    fn on_scroll(&mut self, frame: &ScrollFrame, page: &mut dyn Page, _: &mut Scheduler<Task>) {
        let state = HeaderState::at(frame, &self.config);
        if self.applied == Some(state) {
            return;
        }

        if state.shaded {
            page.set_style(self.header, "background", &self.config.background_scrolled);
            page.set_style(self.header, "box-shadow", &self.config.shadow_scrolled);
        } else {
            page.set_style(self.header, "background", &self.config.background);
            page.set_style(self.header, "box-shadow", "none");
        }
        let transform = if state.hidden { "translateY(-100%)" } else { "translateY(0)" };
        page.set_style(self.header, "transform", transform);

        debug!(y = frame.y, shaded = state.shaded, hidden = state.hidden, "Header state changed");
        self.applied = Some(state);
    }
}

/// Scroll range of one labelled section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionBounds {
    /// Section top minus the activation offset
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    /// Active iff `top < y <= top + height`
    #[inline]
    pub fn contains(&self, y: f64) -> bool {
        y > self.top && y <= self.top + self.height
    }
}

/// Index of the active section; on overlap the last one in document order wins
pub fn active_section(sections: &[SectionBounds], y: f64) -> Option<usize> {
    sections.iter().rposition(|s| s.contains(y))
}

#[derive(Debug, Clone)]
struct TrackedSection {
    section: ElementId,
    link: Option<ElementId>,
}

/// Highlights the nav link of the section under the scroll position
#[derive(Debug)]
pub struct ActiveLinkTracker {
    sections: Vec<TrackedSection>,
    offset: f64,
    active: Option<ElementId>,
}

impl ActiveLinkTracker {
    /// Pair every `section[id]` with the `.nav__link` whose href mentions its id
    pub fn discover(page: &dyn Page, offset: f64) -> Self {
        let sections = page
            .query(&Selector::TagWithAttr {
                tag: "section",
                attr: "id",
            })
            .into_iter()
            .map(|section| {
                let link = page.attr(section, "id").and_then(|id| {
                    page.query_one(&Selector::ClassWithAttrContaining {
                        class: "nav__link",
                        attr: "href",
                        needle: &id,
                    })
                });
                TrackedSection { section, link }
            })
            .collect();
        Self {
            sections,
            offset,
            active: None,
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section currently highlighted
    pub fn active(&self) -> Option<ElementId> {
        self.active
    }

    fn bounds(&self, page: &dyn Page) -> Vec<SectionBounds> {
        self.sections
            .iter()
            .map(|s| SectionBounds {
                top: page.offset_top(s.section) - self.offset,
                height: page.offset_height(s.section),
            })
            .collect()
    }
}

impl ScrollSubscriber for ActiveLinkTracker {
    fn name(&self) -> &'static str {
        "active-link"
    }

    fn on_scroll(&mut self, frame: &ScrollFrame, page: &mut dyn Page, _: &mut Scheduler<Task>) {
        let bounds = self.bounds(page);
        let active_index = active_section(&bounds, frame.y);

        for (index, tracked) in self.sections.iter().enumerate() {
            let Some(link) = tracked.link else {
                continue;
            };
            if Some(index) == active_index {
                page.add_class(link, ACTIVE_LINK_CLASS);
            } else {
                page.remove_class(link, ACTIVE_LINK_CLASS);
            }
        }

        let active = active_index.map(|i| self.sections[i].section);
        if active != self.active {
            debug!(y = frame.y, section = ?active, "Active section changed");
            self.active = active;
        }
    }
}

/// Hero background drifts up at a fraction of the scroll speed
#[derive(Debug)]
pub struct HeroParallax {
    hero: ElementId,
    rate: f64,
}

impl HeroParallax {
    pub fn new(hero: ElementId, rate: f64) -> Self {
        Self { hero, rate }
    }
}

impl ScrollSubscriber for HeroParallax {
    fn name(&self) -> &'static str {
        "hero-parallax"
    }

    fn on_scroll(&mut self, frame: &ScrollFrame, page: &mut dyn Page, _: &mut Scheduler<Task>) {
        let offset = -frame.y * self.rate;
        page.set_style(self.hero, "background-position", &format!("center {}", px(offset)));
    }
}

/// Divider offset derived from how far it has travelled through the viewport
///
/// Returns `None` while the divider is outside the viewport.
pub fn divider_offset(
    rect_top: f64,
    rect_height: f64,
    viewport_height: f64,
    config: &ParallaxConfig,
) -> Option<f64> {
    let visible = rect_top < viewport_height && rect_top + rect_height > 0.0;
    if !visible {
        return None;
    }
    let progress = (viewport_height - rect_top) / (viewport_height + rect_height);
    Some(progress * config.divider_travel + config.divider_base)
}

/// Subtle vertical drift of section dividers
#[derive(Debug)]
pub struct DividerParallax {
    dividers: Vec<ElementId>,
    config: ParallaxConfig,
}

impl DividerParallax {
    pub fn new(dividers: Vec<ElementId>, config: ParallaxConfig) -> Self {
        Self { dividers, config }
    }
}

impl ScrollSubscriber for DividerParallax {
    fn name(&self) -> &'static str {
        "divider-parallax"
    }

    fn on_scroll(&mut self, frame: &ScrollFrame, page: &mut dyn Page, _: &mut Scheduler<Task>) {
        for &divider in &self.dividers {
            let rect = page.bounding_rect(divider);
            if let Some(offset) =
                divider_offset(rect.top, rect.height, frame.viewport_height, &self.config)
            {
                page.set_style(divider, "transform", &translate_y(offset));
            }
        }
    }
}

/// `[data-parallax]` elements, each moving at its own speed
#[derive(Debug)]
pub struct ElementParallax {
    elements: Vec<(ElementId, f64)>,
}

impl ElementParallax {
    /// Read every `[data-parallax]` speed; empty or invalid values use `default_speed`
    pub fn discover(page: &dyn Page, default_speed: f64) -> Self {
        let elements = page
            .query(&Selector::Attr("data-parallax"))
            .into_iter()
            .map(|element| {
                let speed = page
                    .attr(element, "data-parallax")
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .filter(|v| v.is_finite())
                    .unwrap_or(default_speed);
                (element, speed)
            })
            .collect();
        Self { elements }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn speeds(&self) -> &[(ElementId, f64)] {
        &self.elements
    }
}

impl ScrollSubscriber for ElementParallax {
    fn name(&self) -> &'static str {
        "element-parallax"
    }

    fn on_scroll(&mut self, frame: &ScrollFrame, page: &mut dyn Page, _: &mut Scheduler<Task>) {
        for &(element, speed) in &self.elements {
            page.set_style(element, "transform", &translate_y(-(frame.y * speed)));
        }
    }
}

/// Back-to-top button visibility
#[derive(Debug)]
pub struct BackToTop {
    button: ElementId,
    threshold: f64,
    shown: Option<bool>,
}

impl BackToTop {
    pub fn new(button: ElementId, threshold: f64) -> Self {
        Self {
            button,
            threshold,
            shown: None,
        }
    }
}

impl ScrollSubscriber for BackToTop {
    fn name(&self) -> &'static str {
        "back-to-top"
    }

    fn on_scroll(&mut self, frame: &ScrollFrame, page: &mut dyn Page, _: &mut Scheduler<Task>) {
        let show = frame.y > self.threshold;
        if self.shown == Some(show) {
            return;
        }
        if show {
            page.add_class(self.button, SHOW_CLASS);
        } else {
            page.remove_class(self.button, SHOW_CLASS);
        }
        self.shown = Some(show);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dom::{ElementSpec, MemoryPage};

    fn frame(y: f64, previous_y: f64) -> ScrollFrame {
        ScrollFrame {
            y,
            previous_y,
            viewport_height: 800.0,
            timestamp: Duration::ZERO,
        }
    }

    #[test]
    fn test_header_state_thresholds() {
        let config = HeaderConfig::default();
        assert_eq!(
            HeaderState::at(&frame(50.0, 0.0), &config),
            HeaderState { shaded: false, hidden: false }
        );
        assert_eq!(
            HeaderState::at(&frame(150.0, 100.0), &config),
            HeaderState { shaded: true, hidden: false }
        );
        assert_eq!(
            HeaderState::at(&frame(600.0, 550.0), &config),
            HeaderState { shaded: true, hidden: true }
        );
        // Scrolling back up past 500 brings it back
        assert_eq!(
            HeaderState::at(&frame(550.0, 600.0), &config),
            HeaderState { shaded: true, hidden: false }
        );
    }

    #[test]
    fn test_header_applies_styles() {
        let mut page = MemoryPage::new(800.0);
        let header = page.insert(ElementSpec::new("header").class("header").fixed(), None);
        let mut effect = HeaderEffect::new(header, HeaderConfig::default());
        let mut tasks = Scheduler::new();

        effect.on_scroll(&frame(700.0, 600.0), &mut page, &mut tasks);
        assert_eq!(page.style(header, "background").as_deref(), Some("rgba(28, 28, 30, 0.98)"));
        assert_eq!(page.style(header, "transform").as_deref(), Some("translateY(-100%)"));

        effect.on_scroll(&frame(20.0, 700.0), &mut page, &mut tasks);
        assert_eq!(page.style(header, "box-shadow").as_deref(), Some("none"));
        assert_eq!(page.style(header, "transform").as_deref(), Some("translateY(0)"));
    }

    #[test]
    fn test_active_section_boundaries() {
        let sections = [
            SectionBounds { top: 200.0, height: 400.0 },
            SectionBounds { top: 600.0, height: 300.0 },
        ];
        assert_eq!(active_section(&sections, 200.0), None);
        assert_eq!(active_section(&sections, 201.0), Some(0));
        assert_eq!(active_section(&sections, 600.0), Some(0));
        assert_eq!(active_section(&sections, 650.0), Some(1));
        assert_eq!(active_section(&sections, 901.0), None);
    }

    #[test]
    fn test_overlapping_sections_last_wins() {
        let sections = [
            SectionBounds { top: 0.0, height: 500.0 },
            SectionBounds { top: 100.0, height: 100.0 },
        ];
        assert_eq!(active_section(&sections, 150.0), Some(1));
    }

    #[test]
    fn test_divider_offset_progress() {
        let config = ParallaxConfig::default();
        // Just entering from the bottom
        assert_eq!(divider_offset(800.0, 100.0, 800.0, &config), None);
        assert_eq!(divider_offset(700.0, 100.0, 800.0, &config), Some(100.0 / 900.0 * 20.0 - 30.0));
        // Leaving at the top
        assert_eq!(divider_offset(-100.0, 100.0, 800.0, &config), None);
    }

    #[test]
    fn test_element_parallax_speed_parsing() {
        let mut page = MemoryPage::new(800.0);
        let slow = page.insert(ElementSpec::new("div").attr("data-parallax", "0.2"), None);
        let empty = page.insert(ElementSpec::new("div").attr("data-parallax", ""), None);
        let bogus = page.insert(ElementSpec::new("div").attr("data-parallax", "fast"), None);

        let mut parallax = ElementParallax::discover(&page, 0.5);
        assert_eq!(parallax.speeds(), &[(slow, 0.2), (empty, 0.5), (bogus, 0.5)]);

        let mut tasks = Scheduler::new();
        parallax.on_scroll(&frame(100.0, 0.0), &mut page, &mut tasks);
        assert_eq!(page.style(slow, "transform").as_deref(), Some("translateY(-20px)"));
        assert_eq!(page.style(empty, "transform").as_deref(), Some("translateY(-50px)"));
    }

    #[test]
    fn test_hero_background_position() {
        let mut page = MemoryPage::new(800.0);
        let hero = page.insert(ElementSpec::new("section").class("hero"), None);
        let mut parallax = HeroParallax::new(hero, 0.5);
        let mut tasks = Scheduler::new();

        parallax.on_scroll(&frame(240.0, 0.0), &mut page, &mut tasks);
        assert_eq!(page.style(hero, "background-position").as_deref(), Some("center -120px"));
        parallax.on_scroll(&frame(0.0, 240.0), &mut page, &mut tasks);
        assert_eq!(page.style(hero, "background-position").as_deref(), Some("center 0px"));
    }
}
