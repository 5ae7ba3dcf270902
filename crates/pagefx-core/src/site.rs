//! Page engine: wires every behavior to host events
//!
//! A [`Site`] owns the page, the task scheduler and every controller. Hosts
//! feed it [`PageEvent`]s; all work happens synchronously inside
//! [`Site::handle`], and anything deferred runs from a later
//! [`PageEvent::Frame`].

use std::time::Duration;

use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::config::PageFxConfig;
use crate::dom::{closest, ElementId, Page, Point, Selector};
use crate::event::{EventOutcome, Key, PageEvent};
use crate::form::ContactForm;
use crate::menu::{MenuController, SwipeDirection, SwipeTracker};
use crate::reveal::{self, divider::HIGHLIGHT, Watcher};
use crate::ripple::RippleEffect;
use crate::scheduler::{Scheduler, Task};
use crate::scroll::{
    ActiveLinkTracker, BackToTop, DividerParallax, ElementParallax, HeaderEffect, HeroParallax,
    ScrollAnimator, ScrollCoordinator,
};
use crate::styles::{self, BRAND_TAGLINE, BRAND_TITLE};
use crate::tracker::EventTracker;

const BUTTON_CLASS: &str = "btn";
const HOVER_TRANSFORM: &str = "translateY(-2px) scale(1.02)";
const REST_TRANSFORM: &str = "translateY(0) scale(1)";
const LOADER_FADE: Duration = Duration::from_millis(300);
const HERO_ENTRANCE: &str = "fadeInUp 1s ease-out";

pub struct Site<P: Page> {
    page: P,
    config: PageFxConfig,
    tasks: Scheduler<Task>,
    animator: ScrollAnimator,
    coordinator: ScrollCoordinator,
    menu: MenuController,
    swipe: SwipeTracker,
    ripple: RippleEffect,
    tracker: EventTracker,
    contact: Option<ContactForm>,
    header: Option<ElementId>,
    back_to_top: Option<ElementId>,
    instagram: Option<ElementId>,
    dividers: Vec<ElementId>,
    now: Duration,
    errors_reported: usize,
}

impl<P: Page> Site<P> {
    /// Attach every behavior to `page`
    pub fn mount(mut page: P, config: PageFxConfig) -> Self {
        info!("{}", BRAND_TITLE);
        info!("{}", BRAND_TAGLINE);

        styles::inject(&mut page, &config.ripple);

        let menu = MenuController::discover(&page, config.nav.clone());
        let header = page.query_one(&Selector::Class("header"));
        let back_to_top = page.query_one(&Selector::Id("back-to-top"));
        let dividers = page.query(&Selector::Class("section-divider"));
        let instagram = page.query_one(&Selector::Class("nav__instagram")).or_else(|| {
            page.query_one(&Selector::ClassWithAttrContaining {
                class: BUTTON_CLASS,
                attr: "href",
                needle: "instagram",
            })
        });

        let mut coordinator = ScrollCoordinator::new(config.scroll.debounce());

        match header {
            Some(header) => coordinator.subscribe(Box::new(HeaderEffect::new(header, config.header.clone()))),
            None => warn!(".header not found, header effects disabled"),
        }
        let links = ActiveLinkTracker::discover(&page, config.nav.section_offset);
        if !links.is_empty() {
            coordinator.subscribe(Box::new(links));
        }
        if let Some(hero) = page.query_one(&Selector::Class("hero")) {
            coordinator.subscribe(Box::new(HeroParallax::new(hero, config.parallax.hero_rate)));
        }

        let intersection = page.supports_intersection();
        if !intersection {
            warn!("Intersection not supported, revealing all elements");
        }
        let watchers = [
            Watcher::cards(&page, &config.reveal),
            Watcher::dividers(&page, &config.reveal),
            Watcher::sections(&page, &config.reveal),
            Watcher::lazy_images(&page),
        ];
        for mut watcher in watchers {
            if watcher.is_empty() {
                continue;
            }
            watcher.prime(&mut page);
            if intersection {
                coordinator.subscribe(Box::new(watcher));
            } else {
                watcher.reveal_all_immediately(&mut page);
            }
        }

        if !dividers.is_empty() {
            coordinator.subscribe(Box::new(DividerParallax::new(dividers.clone(), config.parallax.clone())));
        }
        if let Some(button) = back_to_top {
            coordinator.subscribe(Box::new(BackToTop::new(button, config.back_to_top.threshold)));
        }
        let parallax = ElementParallax::discover(&page, config.parallax.default_speed);
        if !parallax.is_empty() {
            coordinator.subscribe(Box::new(parallax));
        }

        // Initial intersection pass, as observers report on observe
        coordinator.request_pass();

        let contact = ContactForm::discover(&page);
        debug!(subscribers = ?coordinator.subscriber_names(), "Site mounted");

        Self {
            animator: ScrollAnimator::new(config.scroll.clone()),
            swipe: SwipeTracker::new(config.nav.swipe_threshold),
            ripple: RippleEffect::new(config.ripple.clone()),
            tracker: EventTracker::new(config.tracking.enabled),
            tasks: Scheduler::new(),
            page,
            config,
            coordinator,
            menu,
            contact,
            header,
            back_to_top,
            instagram,
            dividers,
            now: Duration::ZERO,
            errors_reported: 0,
        }
    }

    /// Replace the event tracker, e.g. to attach a listener
    pub fn with_tracker(mut self, tracker: EventTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    pub fn config(&self) -> &PageFxConfig {
        &self.config
    }

    pub fn menu(&self) -> &MenuController {
        &self.menu
    }

    pub fn animator(&self) -> &ScrollAnimator {
        &self.animator
    }

    pub fn coordinator(&self) -> &ScrollCoordinator {
        &self.coordinator
    }

    pub fn tasks(&self) -> &Scheduler<Task> {
        &self.tasks
    }

    pub fn contact_form(&self) -> Option<&ContactForm> {
        self.contact.as_ref()
    }

    /// Latest host time seen, from a frame or a stamped event
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn errors_reported(&self) -> usize {
        self.errors_reported
    }

    /// Whether another frame would do any work
    pub fn needs_frame(&self) -> bool {
        self.animator.is_animating() || self.coordinator.is_dirty() || self.tasks.pending() > 0
    }

    /// Dispatch a host event stamped with the host clock
    ///
    /// Hosts stop sending frames while idle, so the clock is brought up to
    /// `now` first. Timers the event starts then count from `now`.
    pub fn handle_at(&mut self, now: Duration, event: PageEvent) -> EventOutcome {
        self.now = self.now.max(now);
        self.run_due(self.now);
        self.handle(event)
    }

    /// Dispatch one host event at the time of the latest frame
    pub fn handle(&mut self, event: PageEvent) -> EventOutcome {
        match event {
            PageEvent::Scroll { timestamp } => {
                self.coordinator.notify_scroll(timestamp);
                EventOutcome::default()
            }
            PageEvent::Frame { timestamp } => {
                self.frame(timestamp);
                EventOutcome::default()
            }
            PageEvent::Click { target, pointer } => self.click(target, pointer),
            PageEvent::KeyDown { key, shift } => self.key_down(key, shift),
            PageEvent::TouchStart { target, y } => {
                if self.in_menu(target) {
                    self.swipe.start(y);
                }
                EventOutcome::default()
            }
            PageEvent::TouchMove { target, y } => {
                if self.in_menu(target) && self.swipe.moved(y) == Some(SwipeDirection::Down) {
                    debug!("Swipe down over menu");
                    self.menu.close(&mut self.page, &mut self.tasks);
                }
                EventOutcome::default()
            }
            PageEvent::TouchEnd { target } => {
                if self.in_menu(target) {
                    self.swipe.end();
                }
                EventOutcome::default()
            }
            PageEvent::PointerEnter(target) => {
                self.hover(target, HOVER_TRANSFORM);
                EventOutcome::default()
            }
            PageEvent::PointerLeave(target) => {
                self.hover(target, REST_TRANSFORM);
                EventOutcome::default()
            }
            PageEvent::Load { load_time_ms } => {
                self.load(load_time_ms);
                EventOutcome::default()
            }
            PageEvent::Submit(form) => self.submit(form),
            PageEvent::Error { message } => {
                self.report_error(&message);
                EventOutcome::default()
            }
        }
    }

    /// Log an uncaught runtime error; there is no recovery
    pub fn report_error(&mut self, message: &str) {
        error!("Dagadget Mart Website Error: {}", message);
        self.errors_reported += 1;
    }

    /// Animate the viewport to `target`
    pub fn smooth_scroll_to(&mut self, target: f64) {
        if let Some(y) = self.animator.scroll_to(self.page.scroll_y(), target) {
            self.page.scroll_to(y);
            self.coordinator.notify_scroll(self.now);
        }
    }

    fn frame(&mut self, timestamp: Duration) {
        self.now = self.now.max(timestamp);
        let now = self.now;

        self.run_due(now);
        if let Some(y) = self.animator.update(now) {
            self.page.scroll_to(y);
            self.coordinator.notify_scroll(now);
        }
        self.coordinator.on_frame(now, &mut self.page, &mut self.tasks);
        // Reveals scheduled with no delay land in the same frame
        self.run_due(now);
    }

    fn run_due(&mut self, now: Duration) {
        for task in self.tasks.advance(now) {
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::FinishMenuClose => self.menu.finish_close(&mut self.page),
            Task::RemoveNode(element) => self.page.remove(element),
            Task::Reveal(element) => reveal::show(&mut self.page, element),
            Task::Animate { element, animation } => {
                self.page.set_style(element, "animation", &animation)
            }
            Task::FormSent { form } => {
                if let Some(contact) = self.contact.as_mut().filter(|c| c.element() == form) {
                    contact.sent(&mut self.page, &mut self.tasks);
                }
            }
            Task::FormRestore { form } => {
                if let Some(contact) = self.contact.as_mut().filter(|c| c.element() == form) {
                    contact.restore(&mut self.page);
                }
            }
        }
    }

    fn in_menu(&self, target: ElementId) -> bool {
        self.menu
            .menu()
            .is_some_and(|menu| self.page.contains(menu, target))
    }

    fn within(&self, root: Option<ElementId>, target: ElementId) -> bool {
        root.is_some_and(|root| self.page.contains(root, target))
    }

    fn click(&mut self, target: ElementId, pointer: Option<Point>) -> EventOutcome {
        let mut outcome = EventOutcome::default();

        // Menu
        if self.within(self.menu.toggle(), target) {
            self.menu.open(&mut self.page, &mut self.tasks);
        }
        if self.within(self.menu.close_button(), target) {
            self.menu.close(&mut self.page, &mut self.tasks);
        }
        let on_nav_link = closest(&self.page, target, |p, e| p.has_class(e, "nav__link")).is_some();
        if on_nav_link && self.menu.is_open() {
            self.menu.close(&mut self.page, &mut self.tasks);
        }
        if self.menu.is_open() && self.menu.is_outside(&self.page, target) {
            self.menu.close(&mut self.page, &mut self.tasks);
        }

        // Back to top
        if let Some(button) = self.back_to_top.filter(|&b| self.page.contains(b, target)) {
            self.smooth_scroll_to(0.0);
            self.ripple.spawn(&mut self.page, &mut self.tasks, button, None);
        }

        // In-page anchors
        if let Some(anchor) = self.anchor_for(target) {
            outcome = outcome.merge(EventOutcome::prevent_default());
            self.navigate(anchor);
        }

        // Buttons
        if let Some(button) = closest(&self.page, target, |p, e| p.has_class(e, BUTTON_CLASS)) {
            self.ripple.spawn(&mut self.page, &mut self.tasks, button, pointer);
        }
        if self.within(self.instagram, target) {
            self.tracker.track(
                "social_media_click",
                [("platform", json!("instagram")), ("location", json!("navigation"))],
            );
        }
        if self.page.has_class(target, BUTTON_CLASS) {
            let text = self.page.text(target);
            self.tracker.track(
                "button_click",
                [
                    ("button_text", json!(text.trim())),
                    ("page_location", json!(self.page.location())),
                ],
            );
        }

        outcome
    }

    /// Innermost `a[href^="#"]` containing `target`
    fn anchor_for(&self, target: ElementId) -> Option<ElementId> {
        self.page
            .query(&Selector::AttrPrefix {
                tag: "a",
                attr: "href",
                prefix: "#",
            })
            .into_iter()
            .rev()
            .find(|&anchor| self.page.contains(anchor, target))
    }

    fn navigate(&mut self, anchor: ElementId) {
        let Some(href) = self.page.attr(anchor, "href") else {
            return;
        };
        let id = href.trim_start_matches('#');
        let Some(section) = (!id.is_empty())
            .then(|| self.page.query_one(&Selector::Id(id)))
            .flatten()
        else {
            debug!(href = %href, "Anchor target not found");
            return;
        };

        let header_height = self.header.map(|h| self.page.offset_height(h)).unwrap_or(0.0);
        let target = self.page.offset_top(section) - header_height;
        debug!(href = %href, target, "Anchor navigation");
        self.smooth_scroll_to(target);

        let stagger = self.config.reveal.divider_stagger();
        for (index, &divider) in self.dividers.iter().enumerate() {
            self.tasks.schedule(
                stagger * index as u32,
                Task::Animate {
                    element: divider,
                    animation: HIGHLIGHT.css(),
                },
            );
        }
    }

    fn key_down(&mut self, key: Key, shift: bool) -> EventOutcome {
        match key {
            Key::Escape if self.menu.is_open() => {
                self.menu.close(&mut self.page, &mut self.tasks);
                EventOutcome::default()
            }
            Key::Tab if self.menu.trap_tab(&mut self.page, shift) => EventOutcome::prevent_default(),
            _ => EventOutcome::default(),
        }
    }

    fn hover(&mut self, target: ElementId, transform: &str) {
        if self.page.has_class(target, BUTTON_CLASS) {
            self.page.set_style(target, "transform", transform);
        }
    }

    fn load(&mut self, load_time_ms: f64) {
        if let Some(loader) = self.page.query_one(&Selector::Class("loader")) {
            self.page.set_style(loader, "opacity", "0");
            self.tasks.schedule(LOADER_FADE, Task::RemoveNode(loader));
        }
        if let Some(hero) = self.page.query_one(&Selector::Class("hero__content")) {
            self.page.set_style(hero, "animation", HERO_ENTRANCE);
        }

        info!("Page load time: {}ms", load_time_ms);
        let user_agent = self.page.user_agent();
        self.tracker.track(
            "page_performance",
            [("load_time", json!(load_time_ms)), ("user_agent", json!(user_agent))],
        );
    }

    fn submit(&mut self, form: ElementId) -> EventOutcome {
        match self.contact.as_mut() {
            Some(contact) if contact.element() == form => {
                contact.submit(&mut self.page, &mut self.tasks);
                EventOutcome::prevent_default()
            }
            _ => EventOutcome::default(),
        }
    }
}

impl<P: Page + std::fmt::Debug> std::fmt::Debug for Site<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("page", &self.page)
            .field("menu", &self.menu)
            .field("coordinator", &self.coordinator)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}
