//! Section divider kinds and their entrance animations

use crate::dom::{ElementId, Page};

/// One entry of a CSS `animation` shorthand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationDescriptor {
    pub name: &'static str,
    pub duration_ms: u32,
    pub timing: &'static str,
    pub infinite: bool,
    pub delay_ms: u32,
}

impl AnimationDescriptor {
    const fn once(name: &'static str, duration_ms: u32) -> Self {
        Self {
            name,
            duration_ms,
            timing: "ease-out",
            infinite: false,
            delay_ms: 0,
        }
    }

    /// e.g. `gradient-flow 3s ease-in-out infinite 1s`
    pub fn css(&self) -> String {
        let mut out = format!("{} {} {}", self.name, seconds(self.duration_ms), self.timing);
        if self.infinite {
            out.push_str(" infinite");
        }
        if self.delay_ms > 0 {
            out.push(' ');
            out.push_str(&seconds(self.delay_ms));
        }
        out
    }
}

fn seconds(ms: u32) -> String {
    format!("{}s", f64::from(ms) / 1000.0)
}

/// Join several descriptors into one `animation` value
pub fn animation_css(descriptors: &[AnimationDescriptor]) -> String {
    descriptors
        .iter()
        .map(AnimationDescriptor::css)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Visual style of a `.section-divider`, from its modifier class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividerKind {
    Gradient,
    Dots,
    Lines,
    Geometric,
    Particles,
    Pulse,
    /// No modifier: fades in without a dedicated animation
    Plain,
}

const GRADIENT: &[AnimationDescriptor] = &[
    AnimationDescriptor::once("gradient-entrance", 1000),
    AnimationDescriptor {
        name: "gradient-flow",
        duration_ms: 3000,
        timing: "ease-in-out",
        infinite: true,
        delay_ms: 1000,
    },
];
const DOTS: &[AnimationDescriptor] = &[AnimationDescriptor::once("dots-entrance", 800)];
const LINES: &[AnimationDescriptor] = &[AnimationDescriptor::once("lines-entrance", 1200)];
const GEOMETRIC: &[AnimationDescriptor] = &[AnimationDescriptor::once("geometric-entrance", 1000)];
const PARTICLES: &[AnimationDescriptor] = &[AnimationDescriptor::once("particles-entrance", 1500)];
const PULSE: &[AnimationDescriptor] = &[AnimationDescriptor::once("pulse-entrance", 1000)];

/// Played on every divider, staggered, after anchor navigation
pub const HIGHLIGHT: AnimationDescriptor = AnimationDescriptor::once("divider-highlight", 800);

impl DividerKind {
    /// Modifier classes in precedence order
    const MODIFIERS: [(&'static str, DividerKind); 6] = [
        ("section-divider--gradient", DividerKind::Gradient),
        ("section-divider--dots", DividerKind::Dots),
        ("section-divider--lines", DividerKind::Lines),
        ("section-divider--geometric", DividerKind::Geometric),
        ("section-divider--particles", DividerKind::Particles),
        ("section-divider--pulse", DividerKind::Pulse),
    ];

    /// First matching modifier class wins
    pub fn of(page: &dyn Page, divider: ElementId) -> Self {
        Self::MODIFIERS
            .iter()
            .find(|(class, _)| page.has_class(divider, class))
            .map(|&(_, kind)| kind)
            .unwrap_or(DividerKind::Plain)
    }

    pub fn entrance(&self) -> &'static [AnimationDescriptor] {
        match self {
            DividerKind::Gradient => GRADIENT,
            DividerKind::Dots => DOTS,
            DividerKind::Lines => LINES,
            DividerKind::Geometric => GEOMETRIC,
            DividerKind::Particles => PARTICLES,
            DividerKind::Pulse => PULSE,
            DividerKind::Plain => &[],
        }
    }

    /// `animation` value for the entrance, `None` for plain dividers
    pub fn entrance_css(&self) -> Option<String> {
        let entrance = self.entrance();
        (!entrance.is_empty()).then(|| animation_css(entrance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryPage};

    #[test]
    fn test_entrance_table() {
        assert_eq!(
            DividerKind::Gradient.entrance_css().as_deref(),
            Some("gradient-entrance 1s ease-out, gradient-flow 3s ease-in-out infinite 1s")
        );
        assert_eq!(DividerKind::Dots.entrance_css().as_deref(), Some("dots-entrance 0.8s ease-out"));
        assert_eq!(DividerKind::Lines.entrance_css().as_deref(), Some("lines-entrance 1.2s ease-out"));
        assert_eq!(
            DividerKind::Particles.entrance_css().as_deref(),
            Some("particles-entrance 1.5s ease-out")
        );
        assert_eq!(DividerKind::Plain.entrance_css(), None);
        assert_eq!(HIGHLIGHT.css(), "divider-highlight 0.8s ease-out");
    }

    #[test]
    fn test_kind_from_modifier_class() {
        let mut page = MemoryPage::new(800.0);
        let dots = page.insert(
            ElementSpec::new("div").class("section-divider").class("section-divider--dots"),
            None,
        );
        let plain = page.insert(ElementSpec::new("div").class("section-divider"), None);
        let both = page.insert(
            ElementSpec::new("div")
                .class("section-divider--pulse")
                .class("section-divider--gradient"),
            None,
        );

        assert_eq!(DividerKind::of(&page, dots), DividerKind::Dots);
        assert_eq!(DividerKind::of(&page, plain), DividerKind::Plain);
        assert_eq!(DividerKind::of(&page, both), DividerKind::Gradient);
    }
}
