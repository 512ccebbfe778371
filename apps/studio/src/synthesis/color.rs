//! Hex color parsing, foreground contrast resolution and the palette presets
//! offered by the configuration UI.
//!
//! Luminance uses the Rec. 601 weights (0.299 R + 0.587 G + 0.114 B), normalized
//! to [0, 1]. Anything brighter than 0.55 gets the dark foreground.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const LUMINANCE_THRESHOLD: f32 = 0.55;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color {input:?}: expected a 6-digit hex color like #RRGGBB")]
pub struct InvalidColorFormat {
    pub input: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Rgb
// ────────────────────────────────────────────────────────────────────────────

/// An opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the `#` is optional). Shorthand and alpha forms are rejected.
    pub fn parse_hex(input: &str) -> Result<Self, InvalidColorFormat> {
        let invalid = || InvalidColorFormat {
            input: input.to_string(),
        };
        let digits = input.trim().strip_prefix('#').unwrap_or(input.trim());
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Perceived luminance in [0, 1].
    pub fn luminance(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Foreground
// ────────────────────────────────────────────────────────────────────────────

/// The two text colors a banner ever draws on a filled surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Foreground {
    #[serde(rename = "#111")]
    Dark,
    #[serde(rename = "#fff")]
    Light,
}

impl Foreground {
    pub fn as_css(self) -> &'static str {
        match self {
            Foreground::Dark => "#111",
            Foreground::Light => "#fff",
        }
    }
}

/// Picks a legible foreground for text drawn on `background_hex`.
pub fn resolve(background_hex: &str) -> Result<Foreground, InvalidColorFormat> {
    Ok(resolve_rgb(Rgb::parse_hex(background_hex)?))
}

pub fn resolve_rgb(background: Rgb) -> Foreground {
    if background.luminance() > LUMINANCE_THRESHOLD {
        Foreground::Dark
    } else {
        Foreground::Light
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Presets
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PalettePreset {
    pub name: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_on_primary: Option<Foreground>,
}

impl PalettePreset {
    const fn new(
        name: &'static str,
        primary: &'static str,
        secondary: &'static str,
        background: &'static str,
    ) -> Self {
        Self {
            name,
            primary,
            secondary,
            background,
            text_on_primary: None,
        }
    }

    const fn with_text(self, text_on_primary: Foreground) -> Self {
        Self {
            text_on_primary: Some(text_on_primary),
            ..self
        }
    }
}

/// Vertical-specific palettes shown in the configuration UI.
#[rustfmt::skip]
pub static PALETTE_PRESETS: [PalettePreset; 6] = [
    PalettePreset::new("Tecnologia",  "#6366f1", "#8b5cf6", "#f8fafc"),
    PalettePreset::new("Saúde",       "#10b981", "#06b6d4", "#f0fdf4"),
    PalettePreset::new("Finanças",    "#3b82f6", "#1d4ed8", "#eff6ff"),
    PalettePreset::new("E-commerce",  "#f59e0b", "#ef4444", "#fffbeb"),
    PalettePreset::new("Educação",    "#8b5cf6", "#ec4899", "#faf5ff"),
    PalettePreset::new("Alimentação", "#ef4444", "#f97316", "#fef2f2"),
];

/// Batch color variants offered next to the size picker. The foreground on
/// `primary` is fixed per palette rather than derived.
#[rustfmt::skip]
pub static BASE_PALETTES: [PalettePreset; 5] = [
    PalettePreset::new("Azul",     "#2563EB", "#1E40AF", "#FFFFFF").with_text(Foreground::Light),
    PalettePreset::new("Verde",    "#16A34A", "#065F46", "#FFFFFF").with_text(Foreground::Light),
    PalettePreset::new("Laranja",  "#F97316", "#9A3412", "#FFFFFF").with_text(Foreground::Dark),
    PalettePreset::new("Vermelho", "#EF4444", "#991B1B", "#FFFFFF").with_text(Foreground::Light),
    PalettePreset::new("Grafite",  "#374151", "#111827", "#F7F7F7").with_text(Foreground::Light),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_background_gets_dark_text() {
        assert_eq!(resolve("#FFFFFF").unwrap(), Foreground::Dark);
        assert_eq!(resolve("#FFFFFF").unwrap().as_css(), "#111");
    }

    #[test]
    fn test_black_background_gets_light_text() {
        assert_eq!(resolve("#000000").unwrap(), Foreground::Light);
        assert_eq!(resolve("#000000").unwrap().as_css(), "#fff");
    }

    #[test]
    fn test_saturated_blue_gets_light_text() {
        // #2563EB → (37*0.299 + 99*0.587 + 235*0.114) / 255 ≈ 0.37
        assert_eq!(resolve("#2563EB").unwrap(), Foreground::Light);
    }

    #[test]
    fn test_hash_prefix_is_optional() {
        assert_eq!(Rgb::parse_hex("f8fafc").unwrap(), Rgb::new(0xf8, 0xfa, 0xfc));
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        // Mid grey 0x8c (140) → 140/255 ≈ 0.549 → light text.
        assert_eq!(resolve("#8c8c8c").unwrap(), Foreground::Light);
        // 0x8d (141) → ≈ 0.553 → dark text.
        assert_eq!(resolve("#8d8d8d").unwrap(), Foreground::Dark);
    }

    #[test]
    fn test_malformed_hex_is_rejected() {
        for bad in ["", "#fff", "#12345", "#1234567", "#GGGGGG", "red", "#ffffff80"] {
            assert!(
                resolve(bad).is_err(),
                "{bad:?} should be rejected as InvalidColorFormat"
            );
        }
    }

    #[test]
    fn test_to_hex_normalizes_case() {
        assert_eq!(Rgb::parse_hex("#2563EB").unwrap().to_hex(), "#2563eb");
    }

    #[test]
    fn test_foreground_serializes_as_css_value() {
        assert_eq!(serde_json::to_string(&Foreground::Dark).unwrap(), "\"#111\"");
        let parsed: Foreground = serde_json::from_str("\"#fff\"").unwrap();
        assert_eq!(parsed, Foreground::Light);
    }

    #[test]
    fn test_all_presets_parse() {
        for preset in PALETTE_PRESETS.iter().chain(&BASE_PALETTES) {
            Rgb::parse_hex(preset.primary).unwrap();
            Rgb::parse_hex(preset.secondary).unwrap();
            Rgb::parse_hex(preset.background).unwrap();
        }
    }

    #[test]
    fn test_base_palettes_carry_explicit_text_on_primary() {
        assert!(BASE_PALETTES.iter().all(|p| p.text_on_primary.is_some()));
        // Orange is bright enough that the UI pins dark text on it.
        let orange = &BASE_PALETTES[2];
        assert_eq!(orange.text_on_primary, Some(Foreground::Dark));
        let json = serde_json::to_value(orange).unwrap();
        assert_eq!(json["textOnPrimary"], "#111");
        assert!(serde_json::to_value(PALETTE_PRESETS[0]).unwrap().get("textOnPrimary").is_none());
    }
}
