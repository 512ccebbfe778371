//! Static per-size typography table and the standard banner size catalog.
//!
//! Font sizes are px. Sizes outside the table get proportional values derived
//! from the banner height, clamped to readable bounds, so a lookup never fails.

use serde::Serialize;

use crate::synthesis::creative::SizeKey;

/// Base font sizes for one banner size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeSpec {
    pub headline: u32,
    /// `None` means the size has no room for a secondary line.
    pub sub: Option<u32>,
    /// Shared by the option buttons and the call-to-action bar.
    pub button: u32,
}

impl TypeSpec {
    const fn new(headline: u32, sub: Option<u32>, button: u32) -> Self {
        Self {
            headline,
            sub,
            button,
        }
    }
}

/// Banners 320px wide or narrower never show a secondary line, so their
/// entries carry no sub size.
#[rustfmt::skip]
static TYPE_TABLE: [(SizeKey, TypeSpec); 11] = [
    (SizeKey::new(200, 200), TypeSpec::new(17, None,     13)),
    (SizeKey::new(250, 250), TypeSpec::new(19, None,     14)),
    (SizeKey::new(300, 250), TypeSpec::new(19, None,     14)),
    (SizeKey::new(320, 50),  TypeSpec::new(12, None,     11)),
    (SizeKey::new(320, 100), TypeSpec::new(14, None,     12)),
    (SizeKey::new(320, 480), TypeSpec::new(21, None,     15)),
    (SizeKey::new(336, 280), TypeSpec::new(21, Some(14), 15)),
    (SizeKey::new(728, 90),  TypeSpec::new(23, Some(13), 15)),
    (SizeKey::new(300, 600), TypeSpec::new(22, None,     16)),
    (SizeKey::new(160, 600), TypeSpec::new(17, None,     13)),
    (SizeKey::new(970, 250), TypeSpec::new(28, Some(16), 18)),
];

/// Shortest banner that still gets a derived secondary line.
const MIN_SUB_HEIGHT: u32 = 90;

pub fn lookup(size: SizeKey) -> TypeSpec {
    TYPE_TABLE
        .iter()
        .find(|(key, _)| *key == size)
        .map(|(_, spec)| *spec)
        .unwrap_or_else(|| derive_from_height(size.height))
}

fn derive_from_height(height: u32) -> TypeSpec {
    let scaled = |factor: f64, min: u32, max: u32| {
        ((height as f64 * factor).round() as u32).clamp(min, max)
    };
    TypeSpec {
        headline: scaled(0.09, 12, 28),
        sub: (height >= MIN_SUB_HEIGHT).then(|| scaled(0.055, 11, 16)),
        button: scaled(0.07, 11, 18),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Standard size catalog
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StandardSize {
    pub size: SizeKey,
    pub name: &'static str,
    pub category: &'static str,
    pub popular: bool,
}

#[rustfmt::skip]
pub static STANDARD_SIZES: [StandardSize; 11] = [
    StandardSize { size: SizeKey::new(300, 250), name: "Medium Rectangle",    category: "Popular",      popular: true },
    StandardSize { size: SizeKey::new(728, 90),  name: "Leaderboard",         category: "Popular",      popular: true },
    StandardSize { size: SizeKey::new(320, 50),  name: "Mobile Banner",       category: "Mobile",       popular: true },
    StandardSize { size: SizeKey::new(336, 280), name: "Large Rectangle",     category: "Popular",      popular: false },
    StandardSize { size: SizeKey::new(320, 100), name: "Large Mobile Banner", category: "Mobile",       popular: false },
    StandardSize { size: SizeKey::new(320, 480), name: "Mobile Interstitial", category: "Mobile",       popular: false },
    StandardSize { size: SizeKey::new(300, 600), name: "Half Page",           category: "Sidebar",      popular: false },
    StandardSize { size: SizeKey::new(160, 600), name: "Wide Skyscraper",     category: "Sidebar",      popular: false },
    StandardSize { size: SizeKey::new(970, 250), name: "Billboard",           category: "Large Format", popular: false },
    StandardSize { size: SizeKey::new(250, 250), name: "Square",              category: "Square",       popular: false },
    StandardSize { size: SizeKey::new(200, 200), name: "Small Square",        category: "Square",       popular: false },
];
