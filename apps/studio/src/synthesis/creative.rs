//! Creative configuration: the immutable input to one synthesis call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::synthesis::color::Foreground;

// ────────────────────────────────────────────────────────────────────────────
// SizeKey
// ────────────────────────────────────────────────────────────────────────────

/// Pixel dimensions of a banner, displayed and parsed as `"{width}x{height}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SizeKey {
    pub width: u32,
    pub height: u32,
}

impl SizeKey {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for SizeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid size key {0:?}: expected \"{{width}}x{{height}}\"")]
pub struct InvalidSizeKey(pub String);

impl FromStr for SizeKey {
    type Err = InvalidSizeKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSizeKey(s.to_string());
        let (w, h) = s.trim().split_once('x').ok_or_else(invalid)?;
        Ok(SizeKey {
            width: w.parse().map_err(|_| invalid())?,
            height: h.parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for SizeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SizeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Mode / Palette / Overrides
// ────────────────────────────────────────────────────────────────────────────

/// Content variant of the selectable-option row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Fixed calendar-day options: 05 / 15 / 30.
    #[serde(rename = "datas", alias = "dates")]
    Dates,
    /// Currency-like value options, defaulted or user-supplied.
    #[serde(rename = "limite", alias = "limit")]
    Limit,
}

pub const DATE_OPTION_LABELS: [&str; 3] = ["05", "15", "30"];
pub const DEFAULT_LIMIT_OPTION_LABELS: [&str; 3] = ["R$600", "R$1200", "Outro valor"];

impl Mode {
    /// Option labels for this mode. Dates mode ignores `supplied` entirely.
    pub fn option_labels(self, supplied: &[String]) -> Vec<String> {
        let non_empty: Vec<String> = supplied
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        match self {
            Mode::Dates => DATE_OPTION_LABELS.iter().map(|s| s.to_string()).collect(),
            Mode::Limit if non_empty.is_empty() => DEFAULT_LIMIT_OPTION_LABELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            Mode::Limit => non_empty,
        }
    }
}

/// Banner colors as `#RRGGBB` strings. Validated at synthesis time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    #[serde(alias = "bg")]
    pub background: String,
    /// Explicit foreground for text on `primary`; derived from `primary` when absent.
    #[serde(default)]
    pub text_on_primary: Option<Foreground>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: "#2563EB".to_string(),
            secondary: "#1E40AF".to_string(),
            background: "#FFFFFF".to_string(),
            text_on_primary: None,
        }
    }
}

/// Horizontal placement of a banner element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    pub fn as_text_align(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }

    /// Flexbox value that places items at this side of the main or cross axis.
    pub fn as_flex(self) -> &'static str {
        match self {
            Alignment::Left => "flex-start",
            Alignment::Center => "center",
            Alignment::Right => "flex-end",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alignments {
    pub title: Alignment,
    pub buttons: Alignment,
    pub logo: Alignment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleOverrides {
    /// Base headline size in px, replacing the typography table's.
    pub font_size: Option<u32>,
    pub margin_bottom: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonOverrides {
    /// Option labels for this size. Dates mode still ignores them.
    pub texts: Option<Vec<String>>,
    pub height: Option<u32>,
    pub spacing: Option<u32>,
    pub radius: Option<u32>,
    #[serde(alias = "textAlign")]
    pub align: Option<Alignment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoOverrides {
    pub align: Option<Alignment>,
}

/// Per-size adjustments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Overrides {
    pub hide_sub: bool,
    pub compact_cta: bool,
    /// Extra headline font delta in px. Together with the auto-fit delta,
    /// clamped to [-3, 0].
    pub font_adjust: i32,
    /// Replaces the per-size headline character budget.
    pub headline_max_chars: Option<usize>,
    pub title: TitleOverrides,
    pub buttons: ButtonOverrides,
    pub logo: LogoOverrides,
}

// ────────────────────────────────────────────────────────────────────────────
// CreativeConfig
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeConfig {
    pub width: u32,
    pub height: u32,
    pub headline: String,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default, alias = "cta")]
    pub cta_label: String,
    pub mode: Mode,
    #[serde(default)]
    pub option_labels: Vec<String>,
    #[serde(default)]
    pub palette: Palette,
    #[serde(alias = "clickTag")]
    pub destination_url: String,
    #[serde(default)]
    pub alignments: Alignments,
    #[serde(default)]
    pub overrides: Overrides,
}

impl CreativeConfig {
    pub fn size_key(&self) -> SizeKey {
        SizeKey::new(self.width, self.height)
    }

    /// Option labels after per-size text overrides and the mode rules.
    pub fn resolved_option_labels(&self) -> Vec<String> {
        let supplied = self
            .overrides
            .buttons
            .texts
            .as_deref()
            .unwrap_or(&self.option_labels);
        self.mode.option_labels(supplied)
    }

    /// A copy of this configuration at another size and palette.
    pub fn with_size_and_palette(&self, size: SizeKey, palette: &Palette) -> Self {
        Self {
            width: size.width,
            height: size.height,
            palette: palette.clone(),
            ..self.clone()
        }
    }
}
