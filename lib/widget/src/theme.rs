//! Theme renderer.
//!
//! Pure functions from the configured accent color and theme to a palette and
//! a stylesheet. Never touches conversation state.

use crate::config::{ButtonShape, Theme, WidgetConfig};
use std::fmt;

const DEFAULT_ACCENT: Rgb = Rgb {
    r: 0x4a,
    g: 0x6c,
    b: 0xf7,
};

/// The host's light/dark preference, used to resolve [`Theme::Auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Whether this theme renders dark under the given host preference.
    #[must_use]
    pub fn is_dark(&self, scheme: ColorScheme) -> bool {
        match self {
            Self::Light => false,
            Self::Dark => true,
            Self::Auto => scheme == ColorScheme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    /// Parses `#rgb` or `#rrggbb`; the `#` is optional.
    fn parse(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let double = |i: usize| channel(&hex[i..=i].repeat(2));
                Some(Self {
                    r: double(0)?,
                    g: double(1)?,
                    b: double(2)?,
                })
            }
            6 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            _ => None,
        }
    }

    fn rgba(&self, alpha: f32) -> String {
        format!("rgba({}, {}, {}, {alpha})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colors derived from the accent and theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub accent: String,
    pub accent_light: String,
    pub accent_medium: String,
    pub background: String,
    pub text: String,
    pub container_background: String,
    pub input_background: String,
    pub input_border: String,
    pub user_bubble_background: String,
    pub user_bubble_text: String,
    pub bot_bubble_background: String,
    pub bot_bubble_text: String,
    pub timestamp: String,
    pub scrollbar_thumb: String,
    pub scrollbar_track: String,
}

/// Derives the palette for `accent` under `theme`.
///
/// An accent that is not a valid hex color falls back to the default accent.
#[must_use]
pub fn derive_palette(accent: &str, theme: Theme, scheme: ColorScheme) -> Palette {
    let rgb = Rgb::parse(accent).unwrap_or_else(|| {
        tracing::debug!(accent, "invalid accent color, using default");
        DEFAULT_ACCENT
    });
    let dark = theme.is_dark(scheme);
    let pick = |dark_value: &str, light_value: &str| {
        (if dark { dark_value } else { light_value }).to_string()
    };
    let text = pick("#e9ecef", "#333333");

    Palette {
        accent: rgb.to_string(),
        accent_light: rgb.rgba(0.1),
        accent_medium: rgb.rgba(0.5),
        background: pick("#1e1e2e", "white"),
        container_background: pick("#2a2a3c", "#f9fafc"),
        input_background: pick("#1e1e2e", "white"),
        input_border: pick("#3f3f5a", "#e0e0e0"),
        user_bubble_background: rgb.to_string(),
        user_bubble_text: "white".to_string(),
        bot_bubble_background: pick("#3a3a4a", "white"),
        bot_bubble_text: text.clone(),
        text,
        timestamp: "#9ca3af".to_string(),
        scrollbar_thumb: pick("#4a4a5a", "#d1d5db"),
        scrollbar_track: pick("#2a2a3c", "#f1f5f9"),
    }
}

fn rule(css: &mut String, selector: &str, declarations: &[(&str, &str)]) {
    css.push_str(selector);
    css.push_str(" {\n");
    for (property, value) in declarations {
        css.push_str("  ");
        css.push_str(property);
        css.push_str(": ");
        css.push_str(value);
        css.push_str(";\n");
    }
    css.push_str("}\n");
}

/// Renders the widget stylesheet.
#[must_use]
pub fn render_stylesheet(config: &WidgetConfig, palette: &Palette) -> String {
    let (vertical, horizontal) = (
        if config.position.is_top() { "top" } else { "bottom" },
        if config.position.is_left() { "left" } else { "right" },
    );
    let button_radius = match config.button_shape {
        ButtonShape::Circle => "50%",
        ButtonShape::Pill => "30px",
    };

    let mut css = String::new();
    rule(
        &mut css,
        ".qa-chatbot-widget",
        &[
            ("position", "fixed"),
            (vertical, "20px"),
            (horizontal, "20px"),
            ("z-index", "9999"),
            ("font-family", config.font_family.as_str()),
            ("color", palette.text.as_str()),
        ],
    );
    rule(&mut css, ".qa-chatbot-widget *", &[("box-sizing", "border-box")]);
    rule(
        &mut css,
        ".qa-chatbot-button",
        &[
            ("width", "60px"),
            ("height", "60px"),
            ("border-radius", button_radius),
            ("background-color", palette.accent.as_str()),
            ("color", "white"),
            ("border", "none"),
            ("cursor", "pointer"),
            ("box-shadow", "0 4px 12px rgba(0, 0, 0, 0.15)"),
        ],
    );
    rule(
        &mut css,
        ".qa-chatbot-container",
        &[
            ("position", "absolute"),
            // The panel opens away from the anchored edge.
            (vertical, "80px"),
            (horizontal, "0"),
            ("width", "350px"),
            ("height", "500px"),
            ("display", "none"),
            ("flex-direction", "column"),
            ("background-color", palette.background.as_str()),
            ("border-radius", config.border_radius.as_str()),
            ("box-shadow", "0 4px 24px rgba(0, 0, 0, 0.2)"),
            ("overflow", "hidden"),
        ],
    );
    rule(&mut css, ".qa-chatbot-container.active", &[("display", "flex")]);
    rule(
        &mut css,
        ".qa-chatbot-header",
        &[
            ("background-color", palette.accent.as_str()),
            ("color", "white"),
            ("padding", "15px"),
        ],
    );
    rule(
        &mut css,
        ".qa-chatbot-messages",
        &[
            ("flex", "1"),
            ("overflow-y", "auto"),
            ("padding", "15px"),
            ("background-color", palette.container_background.as_str()),
        ],
    );
    rule(
        &mut css,
        ".qa-chatbot-messages::-webkit-scrollbar-track",
        &[("background", palette.scrollbar_track.as_str())],
    );
    rule(
        &mut css,
        ".qa-chatbot-messages::-webkit-scrollbar-thumb",
        &[("background", palette.scrollbar_thumb.as_str())],
    );
    rule(
        &mut css,
        ".qa-chatbot-input",
        &[
            ("flex", "1"),
            ("background-color", palette.input_background.as_str()),
            ("color", palette.text.as_str()),
            ("border", format!("1px solid {}", palette.input_border).as_str()),
            ("border-radius", "20px"),
        ],
    );
    rule(
        &mut css,
        ".qa-chatbot-input:focus",
        &[
            ("border-color", palette.accent.as_str()),
            ("box-shadow", format!("0 0 0 2px {}", palette.accent_light).as_str()),
        ],
    );
    rule(
        &mut css,
        ".qa-chatbot-send",
        &[
            ("background-color", palette.accent.as_str()),
            ("color", "white"),
            ("border", "none"),
            ("border-radius", "20px"),
        ],
    );
    rule(
        &mut css,
        ".qa-chatbot-send:disabled",
        &[("background-color", palette.accent_medium.as_str()), ("cursor", "not-allowed")],
    );
    rule(
        &mut css,
        ".qa-user-message",
        &[
            ("background-color", palette.user_bubble_background.as_str()),
            ("color", palette.user_bubble_text.as_str()),
        ],
    );
    rule(
        &mut css,
        ".qa-bot-message",
        &[
            ("background-color", palette.bot_bubble_background.as_str()),
            ("color", palette.bot_bubble_text.as_str()),
        ],
    );
    rule(
        &mut css,
        ".qa-avatar.bot",
        &[("background-color", palette.accent_light.as_str()), ("color", palette.accent.as_str())],
    );
    if !config.show_avatar {
        rule(&mut css, ".qa-avatar", &[("display", "none")]);
    }
    rule(
        &mut css,
        ".qa-timestamp",
        &[
            ("font-size", "11px"),
            ("color", palette.timestamp.as_str()),
            ("display", if config.show_timestamp { "block" } else { "none" }),
        ],
    );
    rule(&mut css, ".qa-dot", &[("background-color", palette.accent.as_str())]);
    rule(
        &mut css,
        ".qa-error",
        &[("background-color", "#fff0f0"), ("color", "#e74c3c")],
    );
    css
}
