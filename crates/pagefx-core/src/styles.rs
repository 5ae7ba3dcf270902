//! Head injections: keyframes, font preloads and console branding

use crate::config::RippleConfig;
use crate::dom::{HeadNode, Page};

/// Font stylesheets preloaded at mount
pub const FONT_PRELOADS: [&str; 2] = [
    "https://fonts.googleapis.com/css2?family=Geist+Sans:wght@300;400;500;600;700;800;900&display=swap",
    "https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap",
];

pub const BRAND_TITLE: &str = "Gadget Mart - Premium Electronics Store";
pub const BRAND_TAGLINE: &str =
    "Website developed for the best electronics shopping experience in Durg, Chhattisgarh";

/// Keyframes used by the menu, ripples and entrance animations
pub fn keyframes(ripple: &RippleConfig) -> String {
    format!(
        r#"@keyframes slideInRight {{
    from {{
        transform: translateX(100%);
        opacity: 0;
    }}
    to {{
        transform: translateX(0);
        opacity: 1;
    }}
}}

@keyframes slideOutRight {{
    from {{
        transform: translateX(0);
        opacity: 1;
    }}
    to {{
        transform: translateX(100%);
        opacity: 0;
    }}
}}

@keyframes ripple {{
    to {{
        transform: scale({scale});
        opacity: 0;
    }}
}}

@keyframes fadeInUp {{
    from {{
        opacity: 0;
        transform: translateY(30px);
    }}
    to {{
        opacity: 1;
        transform: translateY(0);
    }}
}}

@keyframes pulse {{
    0%, 100% {{
        transform: scale(1);
    }}
    50% {{
        transform: scale(1.05);
    }}
}}

@keyframes glow {{
    0%, 100% {{
        box-shadow: 0 0 5px rgba(78, 226, 236, 0.3);
    }}
    50% {{
        box-shadow: 0 0 20px rgba(78, 226, 236, 0.6);
    }}
}}
"#,
        scale = ripple.scale
    )
}

/// Append the keyframes and font preloads to the document head
pub fn inject(page: &mut dyn Page, ripple: &RippleConfig) {
    page.append_head(HeadNode::Style(keyframes(ripple)));
    for href in FONT_PRELOADS {
        page.append_head(HeadNode::PreloadStyle(href.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryPage;

    #[test]
    fn test_keyframes_names() {
        let css = keyframes(&RippleConfig::default());
        for name in ["slideInRight", "slideOutRight", "ripple", "fadeInUp", "pulse", "glow"] {
            assert!(css.contains(&format!("@keyframes {} {{", name)), "missing {}", name);
        }
        assert!(css.contains("transform: scale(4);"));
    }

    #[test]
    fn test_inject_appends_head_nodes() {
        let mut page = MemoryPage::new(800.0);
        inject(&mut page, &RippleConfig::default());

        let head = page.head();
        assert_eq!(head.len(), 3);
        assert!(matches!(&head[0], HeadNode::Style(css) if css.contains("fadeInUp")));
        assert_eq!(head[2], HeadNode::PreloadStyle(FONT_PRELOADS[1].to_string()));
    }
}
