//! Mobile navigation menu
//!
//! The menu moves through `Closed -> Open -> Closing -> Closed`. Closing plays
//! an exit animation and clears the open state on a scheduled task; opening
//! again before that task fires cancels it.

use tracing::{debug, warn};

use crate::config::NavConfig;
use crate::dom::{ElementId, Page, Selector};
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::scroll::subscribers::SHOW_CLASS;

const SLIDE_IN: &str = "slideInRight 0.3s ease-out";
const SLIDE_OUT: &str = "slideOutRight 0.3s ease-out";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
    /// Exit animation playing, close task pending
    Closing,
}

#[derive(Debug)]
pub struct MenuController {
    menu: Option<ElementId>,
    toggle: Option<ElementId>,
    close_button: Option<ElementId>,
    state: MenuState,
    pending_close: Option<TaskHandle>,
    config: NavConfig,
}

impl MenuController {
    /// Look up `#nav-menu`, `#nav-toggle` and `#nav-close`
    pub fn discover(page: &dyn Page, config: NavConfig) -> Self {
        let menu = page.query_one(&Selector::Id("nav-menu"));
        if menu.is_none() {
            warn!("#nav-menu not found, menu controls disabled");
        }
        Self {
            menu,
            toggle: page.query_one(&Selector::Id("nav-toggle")),
            close_button: page.query_one(&Selector::Id("nav-close")),
            state: MenuState::Closed,
            pending_close: None,
            config,
        }
    }

    pub fn menu(&self) -> Option<ElementId> {
        self.menu
    }

    pub fn toggle(&self) -> Option<ElementId> {
        self.toggle
    }

    pub fn close_button(&self) -> Option<ElementId> {
        self.close_button
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state == MenuState::Open
    }

    /// Show the menu and lock page scrolling
    pub fn open(&mut self, page: &mut dyn Page, tasks: &mut Scheduler<Task>) {
        let Some(menu) = self.menu else {
            return;
        };
        if let Some(handle) = self.pending_close.take() {
            tasks.cancel(handle);
            debug!("Pending menu close superseded");
        }
        if self.state == MenuState::Open {
            return;
        }

        page.add_class(menu, SHOW_CLASS);
        let body = page.body();
        page.set_style(body, "overflow", "hidden");
        page.set_style(menu, "animation", SLIDE_IN);
        self.state = MenuState::Open;
        debug!("Menu opened");
    }

    /// Start the exit animation; the menu hides once it has played
    pub fn close(&mut self, page: &mut dyn Page, tasks: &mut Scheduler<Task>) {
        let Some(menu) = self.menu else {
            return;
        };
        if self.state != MenuState::Open {
            return;
        }

        page.set_style(menu, "animation", SLIDE_OUT);
        self.pending_close = Some(tasks.schedule(self.config.close_delay(), Task::FinishMenuClose));
        self.state = MenuState::Closing;
        debug!("Menu closing");
    }

    /// Complete a close started by [`close`](Self::close)
    pub fn finish_close(&mut self, page: &mut dyn Page) {
        let Some(menu) = self.menu else {
            return;
        };
        if self.state != MenuState::Closing {
            return;
        }

        page.remove_class(menu, SHOW_CLASS);
        let body = page.body();
        page.set_style(body, "overflow", "");
        page.set_style(menu, "animation", "");
        self.pending_close = None;
        self.state = MenuState::Closed;
        debug!("Menu closed");
    }

    /// True when `target` is neither inside the menu nor inside the toggle
    pub fn is_outside(&self, page: &dyn Page, target: ElementId) -> bool {
        let inside = |root: Option<ElementId>| root.is_some_and(|r| page.contains(r, target));
        !inside(self.menu) && !inside(self.toggle)
    }

    /// Keep Tab focus cycling inside the open menu
    ///
    /// Returns true when focus was moved and the host default should be
    /// suppressed.
    pub fn trap_tab(&self, page: &mut dyn Page, shift: bool) -> bool {
        let Some(menu) = self.menu else {
            return false;
        };
        if !self.is_open() {
            return false;
        }
        let focusable = page.query_within(menu, &Selector::Focusable);
        let (Some(&first), Some(&last)) = (focusable.first(), focusable.last()) else {
            return false;
        };

        let active = page.active_element();
        if shift && active == Some(first) {
            page.focus(last);
            true
        } else if !shift && active == Some(last) {
            page.focus(first);
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
}

/// Vertical swipe detection over the menu
///
/// Fires at most once per touch sequence.
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start_y: f64,
    engaged: bool,
    threshold: f64,
}

impl SwipeTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            start_y: 0.0,
            engaged: false,
            threshold,
        }
    }

    pub fn start(&mut self, y: f64) {
        self.start_y = y;
    }

    /// Report a swipe once the finger has travelled past the threshold
    pub fn moved(&mut self, y: f64) -> Option<SwipeDirection> {
        let travel = y - self.start_y;
        if self.engaged || travel.abs() <= self.threshold {
            return None;
        }
        self.engaged = true;
        Some(if travel > 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        })
    }

    pub fn end(&mut self) {
        self.engaged = false;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dom::{ElementSpec, MemoryPage};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    struct Fixture {
        page: MemoryPage,
        tasks: Scheduler<Task>,
        menu: MenuController,
        links: Vec<ElementId>,
    }

    fn fixture() -> Fixture {
        let mut page = MemoryPage::new(800.0);
        let nav = page.insert(ElementSpec::new("div").id("nav-menu"), None);
        let links = (0..3)
            .map(|i| {
                page.insert(
                    ElementSpec::new("a").class("nav__link").attr("href", format!("#s{}", i)),
                    Some(nav),
                )
            })
            .collect();
        page.insert(ElementSpec::new("div").id("nav-toggle"), None);
        let menu = MenuController::discover(&page, NavConfig::default());
        Fixture {
            page,
            tasks: Scheduler::new(),
            menu,
            links,
        }
    }

    #[test]
    fn test_open_close_cycle() {
        let Fixture { mut page, mut tasks, mut menu, .. } = fixture();
        let nav = menu.menu().unwrap();
        let body = page.body();

        menu.open(&mut page, &mut tasks);
        assert!(menu.is_open());
        assert!(page.has_class(nav, SHOW_CLASS));
        assert_eq!(page.style(body, "overflow").as_deref(), Some("hidden"));

        menu.close(&mut page, &mut tasks);
        assert_eq!(menu.state(), MenuState::Closing);
        assert_eq!(page.style(nav, "animation").as_deref(), Some(SLIDE_OUT));
        assert!(page.has_class(nav, SHOW_CLASS));

        assert_eq!(tasks.advance(ms(300)), vec![Task::FinishMenuClose]);
        menu.finish_close(&mut page);
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(!page.has_class(nav, SHOW_CLASS));
        assert_eq!(page.style(body, "overflow"), None);
        assert_eq!(page.style(nav, "animation"), None);
    }

    #[test]
    fn test_reopen_cancels_pending_close() {
        let Fixture { mut page, mut tasks, mut menu, .. } = fixture();

        menu.open(&mut page, &mut tasks);
        menu.close(&mut page, &mut tasks);
        tasks.advance(ms(100));
        menu.open(&mut page, &mut tasks);

        assert!(tasks.advance(ms(1000)).is_empty());
        assert!(menu.is_open());
        assert_eq!(page.style(menu.menu().unwrap(), "animation").as_deref(), Some(SLIDE_IN));
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let Fixture { mut page, mut tasks, mut menu, .. } = fixture();
        page.clear_mutations();
        menu.close(&mut page, &mut tasks);
        menu.finish_close(&mut page);
        assert!(page.mutations().is_empty());
        assert_eq!(tasks.pending(), 0);
    }

    #[test]
    fn test_missing_menu_is_tolerated() {
        let mut page = MemoryPage::new(800.0);
        let mut tasks = Scheduler::new();
        let mut menu = MenuController::discover(&page, NavConfig::default());
        menu.open(&mut page, &mut tasks);
        assert!(!menu.is_open());
        assert!(!menu.trap_tab(&mut page, false));
    }

    #[test]
    fn test_outside_detection() {
        let Fixture { mut page, menu, links, .. } = fixture();
        let toggle = menu.toggle().unwrap();
        let elsewhere = page.insert(ElementSpec::new("p"), None);
        assert!(!menu.is_outside(&page, links[1]));
        assert!(!menu.is_outside(&page, toggle));
        assert!(menu.is_outside(&page, elsewhere));
    }

    #[test]
    fn test_focus_trap_wraps() {
        let Fixture { mut page, mut tasks, mut menu, links } = fixture();
        menu.open(&mut page, &mut tasks);

        page.focus(links[2]);
        assert!(menu.trap_tab(&mut page, false));
        assert_eq!(page.active_element(), Some(links[0]));

        assert!(menu.trap_tab(&mut page, true));
        assert_eq!(page.active_element(), Some(links[2]));

        page.focus(links[1]);
        assert!(!menu.trap_tab(&mut page, false));
    }

    #[test]
    fn test_swipe_fires_once_per_touch() {
        let mut swipe = SwipeTracker::new(50.0);
        swipe.start(100.0);
        assert_eq!(swipe.moved(140.0), None);
        assert_eq!(swipe.moved(151.0), Some(SwipeDirection::Down));
        assert_eq!(swipe.moved(300.0), None);
        swipe.end();

        swipe.start(300.0);
        assert_eq!(swipe.moved(200.0), Some(SwipeDirection::Up));
    }
}
