//! Scroll handling for the page engine
//!
//! # Layers
//!
//! ## Atomic
//! - `easing` - Pure easing functions
//! - `timing` - Progress and interpolation helpers
//!
//! ## Molecular
//! - `animation` - Frame-driven smooth scroll animator
//! - `coordinator` - One scroll sample per frame, fanned out to subscribers
//! - `subscribers` - Header, active link, parallax and back-to-top effects
//!
//! # Usage
//!
//! ```ignore
//! use pagefx_core::scroll::{ScrollAnimator, ScrollCoordinator};
//!
//! let mut animator = ScrollAnimator::new(config.scroll.clone());
//! animator.scroll_to(page.scroll_y(), 1200.0);
//!
//! // Once per animation frame
//! if let Some(y) = animator.update(now) {
//!     page.scroll_to(y);
//!     coordinator.notify_scroll(now);
//! }
//! coordinator.on_frame(now, &mut page, &mut tasks);
//! ```

pub mod easing;
pub mod timing;

pub mod animation;
pub mod coordinator;
pub mod subscribers;

pub use animation::ScrollAnimator;
pub use coordinator::{ScrollCoordinator, ScrollFrame, ScrollSubscriber};
pub use easing::{ease_in_out_cubic, EasingType};
pub use subscribers::{
    active_section, divider_offset, ActiveLinkTracker, BackToTop, DividerParallax,
    ElementParallax, HeaderEffect, HeaderState, HeroParallax, SectionBounds,
};
