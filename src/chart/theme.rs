use serde::{Deserialize, Serialize, Serializer};
use std::{fmt::Display, str::FromStr};

/// Degrees between generated hues once a palette runs out (golden angle).
pub const HUE_STEP: f64 = 137.5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn colors(self) -> &'static ThemeColors {
        match self {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = std::convert::Infallible;

    /// Anything but `dark` is light.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.trim().eq_ignore_ascii_case("dark") {
            Theme::Dark
        } else {
            Theme::Light
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub grid: &'static str,
    pub text: &'static str,
    pub tooltip_bg: &'static str,
    pub tooltip_text: &'static str,
    pub bar_bg: &'static str,
    #[serde(skip)]
    pub lines: [&'static str; 10],
}

static LIGHT: ThemeColors = ThemeColors {
    grid: "rgba(0, 0, 0, 0.05)",
    text: "#5b7083",
    tooltip_bg: "rgba(255, 255, 255, 0.95)",
    tooltip_text: "#14171a",
    bar_bg: "rgba(0, 188, 212, 0.8)",
    lines: [
        "#00BCD4", "#FF5722", "#4CAF50", "#9C27B0", "#FFEB3B", "#3F51B5", "#E91E63", "#795548",
        "#009688", "#FF9800",
    ],
};

static DARK: ThemeColors = ThemeColors {
    grid: "rgba(255, 255, 255, 0.08)",
    text: "#8899a6",
    tooltip_bg: "rgba(21, 32, 43, 0.95)",
    tooltip_text: "#ffffff",
    bar_bg: "rgba(38, 198, 218, 0.8)",
    lines: [
        "#26C6DA", "#FF7043", "#66BB6A", "#D450FF", "#FFF176", "#7986CB", "#F06292", "#A1887F",
        "#4DB6AC", "#FFB74D",
    ],
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Hex(&'static str),
    Hsl { hue: f64, saturation: u8, lightness: u8 },
}

impl Color {
    /// Same colour at roughly 8% opacity, for area fills.
    pub fn translucent(&self) -> String {
        match self {
            Color::Hex(hex) => format!("{hex}15"),
            Color::Hsl {
                hue,
                saturation,
                lightness,
            } => format!("hsla({hue}, {saturation}%, {lightness}%, 0.08)"),
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Hex(hex) => write!(f, "{hex}"),
            Color::Hsl {
                hue,
                saturation,
                lightness,
            } => write!(f, "hsl({hue}, {saturation}%, {lightness}%)"),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Colour of the series at `index` (0 is the primary, comparison `i` is
/// `i + 1`). Palette entries are used first; past the palette the hue steps
/// by the comparison's own position `i`.
pub fn series_color(index: usize, theme: Theme) -> Color {
    match theme.colors().lines.get(index).copied() {
        Some(hex) => Color::Hex(hex),
        None => Color::Hsl {
            hue: (index.saturating_sub(1) as f64 * HUE_STEP) % 360.0,
            saturation: 75,
            lightness: 50,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_order() {
        assert_eq!(series_color(0, Theme::Light), Color::Hex("#00BCD4"));
        assert_eq!(series_color(1, Theme::Light), Color::Hex("#FF5722"));
        assert_eq!(series_color(0, Theme::Dark), Color::Hex("#26C6DA"));
        assert_eq!(series_color(9, Theme::Dark), Color::Hex("#FFB74D"));
    }

    #[test]
    fn test_fallback_hue() {
        // Colour index 10 is comparison 9.
        let color = series_color(10, Theme::Light);
        assert_eq!(
            color,
            Color::Hsl {
                hue: 157.5,
                saturation: 75,
                lightness: 50
            }
        );
        assert_eq!(color.to_string(), "hsl(157.5, 75%, 50%)");
        assert_eq!(series_color(10, Theme::Dark), color);
        assert_eq!(series_color(11, Theme::Light).to_string(), "hsl(295, 75%, 50%)");
        assert_eq!(series_color(12, Theme::Light).to_string(), "hsl(72.5, 75%, 50%)");
    }

    #[test]
    fn test_translucent() {
        assert_eq!(Color::Hex("#00BCD4").translucent(), "#00BCD415");
        assert_eq!(
            series_color(11, Theme::Light).translucent(),
            "hsla(295, 75%, 50%, 0.08)"
        );
    }

    #[test]
    fn test_theme_parse_and_toggle() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("anything".parse::<Theme>().unwrap(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.to_string(), "dark");
    }
}
