//! Scenario replay against an in-memory page

use std::fmt;
use std::sync::mpsc;
use std::time::Duration;

use pagefx_core::dom::{MemoryPage, Point, Selector};
use pagefx_core::{
    ElementId, EventTracker, MenuState, Page, PageEvent, PageFxConfig, Result, Site, TrackedEvent,
};
use serde::Serialize;
use tracing::debug;

use crate::scenario::{BuiltPage, ElementNames, Scenario, Step};

/// Drives a [`Site`] over a scenario page with a virtual frame clock
pub struct Simulator {
    site: Site<MemoryPage>,
    names: ElementNames,
    clock: Duration,
    frame_interval: Duration,
    events_rx: mpsc::Receiver<TrackedEvent>,
    events: Vec<TrackedEvent>,
}

impl Simulator {
    pub fn new(scenario: &Scenario, config: PageFxConfig) -> Result<Self> {
        let BuiltPage { page, names } = scenario.build_page()?;
        let frame_interval = config.scroll.frame_interval();
        let (tx, events_rx) = mpsc::channel();
        let tracker = EventTracker::new(config.tracking.enabled).with_sender(tx);
        let site = Site::mount(page, config).with_tracker(tracker);

        Ok(Self {
            site,
            names,
            clock: Duration::ZERO,
            frame_interval,
            events_rx,
            events: Vec::new(),
        })
    }

    pub fn site(&self) -> &Site<MemoryPage> {
        &self.site
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    fn resolve(&self, name: &str) -> Result<ElementId> {
        self.names.resolve(name)
    }

    /// Advance one frame
    pub fn frame(&mut self) {
        self.clock += self.frame_interval;
        let _ = self.site.handle(PageEvent::Frame { timestamp: self.clock });
        self.events.extend(self.events_rx.try_iter());
    }

    /// Frames a step needs after it has been applied
    pub fn frames_for(&self, step: &Step) -> u64 {
        match step {
            Step::Wait { ms } => {
                let interval = self.frame_interval.as_millis().max(1) as u64;
                ms.div_ceil(interval)
            }
            _ => 1,
        }
    }

    /// Deliver a step's events without advancing time
    pub fn apply(&mut self, step: &Step) -> Result<()> {
        debug!(?step, at_ms = self.clock.as_millis() as u64, "Applying step");
        match step {
            Step::Scroll { y } => {
                self.site.page_mut().scroll_to(*y);
                self.dispatch(PageEvent::Scroll { timestamp: self.clock });
            }
            Step::Click { target, x, y } => {
                let target = self.resolve(target)?;
                let pointer = match (x, y) {
                    (Some(x), Some(y)) => Some(Point::new(*x, *y)),
                    _ => None,
                };
                self.dispatch(PageEvent::Click { target, pointer });
            }
            Step::Key { key, shift } => {
                self.dispatch(PageEvent::KeyDown {
                    key: key.as_str().into(),
                    shift: *shift,
                });
            }
            Step::Touch { target, from, to } => {
                let target = self.resolve(target)?;
                self.dispatch(PageEvent::TouchStart { target, y: *from });
                self.dispatch(PageEvent::TouchMove { target, y: *to });
                self.dispatch(PageEvent::TouchEnd { target });
            }
            Step::Hover { target, leave } => {
                let target = self.resolve(target)?;
                let event = if *leave {
                    PageEvent::PointerLeave(target)
                } else {
                    PageEvent::PointerEnter(target)
                };
                self.dispatch(event);
            }
            Step::Load { load_time_ms } => {
                self.dispatch(PageEvent::Load {
                    load_time_ms: *load_time_ms,
                });
            }
            Step::Submit { target } => {
                let form = self.resolve(target)?;
                self.dispatch(PageEvent::Submit(form));
            }
            Step::Wait { .. } => {}
            Step::Error { message } => {
                self.dispatch(PageEvent::Error {
                    message: message.clone(),
                });
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, event: PageEvent) {
        let outcome = self.site.handle_at(self.clock, event);
        if outcome.prevent_default {
            debug!("Default action prevented");
        }
        self.events.extend(self.events_rx.try_iter());
    }

    fn name_of(&self, element: ElementId) -> String {
        self.names
            .name_of(element)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", element.0))
    }

    /// Snapshot of the presentation state
    pub fn report(&self) -> Report {
        let page = self.site.page();

        let active_link = page
            .query_one(&Selector::Class("active-link"))
            .map(|link| self.name_of(link));
        let header = page.query_one(&Selector::Class("header")).map(|header| HeaderReport {
            shaded: page
                .style(header, "box-shadow")
                .is_some_and(|shadow| shadow != "none"),
            hidden: page.style(header, "transform").as_deref() == Some("translateY(-100%)"),
        });

        let visible: Vec<String> = page
            .elements()
            .into_iter()
            .filter(|&e| {
                page.has_class(e, "visible") || page.style(e, "opacity").as_deref() == Some("1")
            })
            .map(|e| self.name_of(e))
            .collect();

        Report {
            elapsed_ms: self.clock.as_millis() as u64,
            scroll_y: page.scroll_y(),
            menu: match self.site.menu().state() {
                MenuState::Closed => "closed",
                MenuState::Open => "open",
                MenuState::Closing => "closing",
            },
            active_link,
            header,
            visible,
            errors: self.site.errors_reported(),
            events: self.events.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderReport {
    pub shaded: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub elapsed_ms: u64,
    pub scroll_y: f64,
    pub menu: &'static str,
    pub active_link: Option<String>,
    pub header: Option<HeaderReport>,
    pub visible: Vec<String>,
    pub errors: usize,
    pub events: Vec<TrackedEvent>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Elapsed:      {}ms", self.elapsed_ms)?;
        writeln!(f, "Scroll:       {}px", self.scroll_y)?;
        writeln!(f, "Menu:         {}", self.menu)?;
        writeln!(f, "Active link:  {}", self.active_link.as_deref().unwrap_or("(none)"))?;
        match &self.header {
            Some(header) => writeln!(
                f,
                "Header:       {}{}",
                if header.shaded { "shaded" } else { "transparent" },
                if header.hidden { ", hidden" } else { "" }
            )?,
            None => writeln!(f, "Header:       (none)")?,
        }
        writeln!(f, "Errors:       {}", self.errors)?;

        writeln!(f, "\nVisible ({}):", self.visible.len())?;
        for name in &self.visible {
            writeln!(f, "  {}", name)?;
        }

        writeln!(f, "\nTracked events ({}):", self.events.len())?;
        for event in &self.events {
            writeln!(
                f,
                "  {} {}",
                event.name,
                serde_json::Value::Object(event.payload.clone())
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOREFRONT: &str = r##"
viewport_height = 800
document_height = 4000
location = "https://dagadgetmart.example/"

[[element]]
key = "header"
tag = "header"
classes = ["header"]
height = 80
fixed = true

[[element]]
tag = "div"
id = "nav-menu"
parent = "header"
fixed = true

[[element]]
key = "link-products"
tag = "a"
classes = ["nav__link"]
attrs = { href = "#products" }
parent = "nav-menu"

[[element]]
tag = "div"
id = "nav-toggle"
parent = "header"

[[element]]
tag = "section"
id = "products"
classes = ["section"]
top = 1200
height = 600

[[element]]
key = "card"
tag = "div"
classes = ["product__card"]
parent = "products"
top = 1300
height = 300

[[element]]
key = "shop"
tag = "a"
classes = ["btn"]
text = "Shop Now"
parent = "products"
top = 1650
height = 40
width = 160
"##;

    fn simulator() -> Simulator {
        let scenario = Scenario::from_toml_str(STOREFRONT).unwrap();
        Simulator::new(&scenario, PageFxConfig::default()).unwrap()
    }

    fn run(sim: &mut Simulator, step: Step) {
        sim.apply(&step).unwrap();
        for _ in 0..sim.frames_for(&step) {
            sim.frame();
        }
    }

    #[test]
    fn test_anchor_navigation_report() {
        let mut sim = simulator();
        run(&mut sim, Step::Click { target: "link-products".to_string(), x: None, y: None });
        run(&mut sim, Step::Wait { ms: 1100 });

        let report = sim.report();
        assert_eq!(report.scroll_y, 1120.0);
        assert_eq!(report.active_link.as_deref(), Some("link-products"));
        assert!(report.visible.contains(&"products".to_string()));
        assert!(report.visible.contains(&"card".to_string()));
        assert_eq!(report.header.map(|h| h.hidden), Some(true));
    }

    #[test]
    fn test_menu_and_tracking() {
        let mut sim = simulator();
        run(&mut sim, Step::Click { target: "nav-toggle".to_string(), x: None, y: None });
        assert_eq!(sim.report().menu, "open");

        run(&mut sim, Step::Key { key: "Escape".to_string(), shift: false });
        assert_eq!(sim.report().menu, "closing");
        run(&mut sim, Step::Wait { ms: 300 });
        assert_eq!(sim.report().menu, "closed");

        run(&mut sim, Step::Click { target: "shop".to_string(), x: Some(10.0), y: Some(10.0) });
        run(&mut sim, Step::Load { load_time_ms: 640.0 });
        let report = sim.report();
        let names: Vec<_> = report.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["button_click", "page_performance"]);
        assert!(report.to_string().contains("button_click"));
    }

    #[test]
    fn test_unknown_target_is_an_error() {
        let mut sim = simulator();
        let step = Step::Click { target: "checkout".to_string(), x: None, y: None };
        assert!(sim.apply(&step).is_err());
    }

    #[test]
    fn test_wait_frame_count() {
        let sim = simulator();
        assert_eq!(sim.frames_for(&Step::Wait { ms: 300 }), 19);
        assert_eq!(sim.frames_for(&Step::Wait { ms: 0 }), 0);
        assert_eq!(sim.frames_for(&Step::Scroll { y: 10.0 }), 1);
    }
}
