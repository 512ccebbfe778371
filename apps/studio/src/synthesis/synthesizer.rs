//! Document Synthesizer: turns one creative configuration into one
//! self-contained HTML banner.
//!
//! Flow: resolve_layout (typography, auto-fit, colors, option set, visibility)
//!       → build_document (typed tree) → render → guard::validate.
//!
//! Pure and deterministic. Two calls with the
//! same configuration return byte-identical documents.

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::synthesis::autofit::{self, FittedText, MIN_FONT_ADJUST};
use crate::synthesis::color::{resolve_rgb, Foreground, Rgb};
use crate::synthesis::creative::{Alignment, CreativeConfig, SizeKey};
use crate::synthesis::document::{
    AdDocument, Keyframes, Node, StyleRule, StyleSheet, LOGO_ASSET, ROOT_ID,
};
use crate::synthesis::error::SynthesisError;
use crate::synthesis::guard;
use crate::synthesis::typography::{self, TypeSpec};

pub const DISCLAIMER: &str =
    "Este anúncio pode conter elementos visuais não interativos. Sujeito à análise do emissor.";
pub const DEFAULT_CTA_LABEL: &str = "FAÇA O TESTE";
/// Inert click target, substituted only by `synthesize_preview`.
pub const PREVIEW_PLACEHOLDER_URL: &str = "https://example.com";

/// Banners this narrow never show a secondary line.
const NARROW_WIDTH: u32 = 320;
/// Banners this short get the compact option row and a side CTA.
const COMPACT_HEIGHT: u32 = 100;
const MIN_FONT_PX: u32 = 9;
const FONT_STACK: &str = "system-ui,Arial,sans-serif";

// ────────────────────────────────────────────────────────────────────────────
// Output / plan types
// ────────────────────────────────────────────────────────────────────────────

/// A synthesized banner. Never edited after creation: changes mean re-synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDocument {
    pub size: SizeKey,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColors {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub background: Rgb,
    pub text_on_primary: Foreground,
    pub text_on_secondary: Foreground,
    pub text_on_background: Foreground,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRowLayout {
    pub labels: Vec<String>,
    /// Options side by side instead of stacked.
    pub horizontal: bool,
    /// Short banner: reduced button height and spacing.
    pub compact: bool,
    pub button_height_px: u32,
    pub gap_px: u32,
    pub radius_px: u32,
    pub font_px: u32,
    pub align: Alignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtaPlacement {
    /// Full-width bar along the bottom edge.
    Bottom { height_px: u32 },
    /// Full-height block along the right edge.
    Right { width_px: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtaLayout {
    pub label: String,
    pub placement: CtaPlacement,
    pub font_px: u32,
    pub compact: bool,
}

/// Every decision the synthesizer makes before building markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub size: SizeKey,
    pub headline: FittedText,
    pub headline_px: u32,
    pub headline_margin_px: u32,
    pub title_align: Alignment,
    /// Secondary line and its font size; `None` when suppressed.
    pub sub: Option<(String, u32)>,
    pub options: OptionRowLayout,
    pub cta: CtaLayout,
    pub logo_align: Alignment,
    pub colors: ResolvedColors,
    pub destination: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Synthesizes and validates the banner for `config`.
pub fn synthesize(config: &CreativeConfig) -> Result<GeneratedDocument, SynthesisError> {
    let plan = resolve_layout(config)?;
    let document = build_document(&plan);
    let html = document.render();

    guard::validate(&document, &html, config)?;

    debug!(
        size = %plan.size,
        bytes = html.len(),
        options = plan.options.labels.len(),
        sub = plan.sub.is_some(),
        "synthesized banner"
    );

    Ok(GeneratedDocument {
        size: plan.size,
        html,
    })
}

/// Like `synthesize`, but an empty destination becomes `PREVIEW_PLACEHOLDER_URL`.
/// For live previews only; exported artifacts always go through `synthesize`.
pub fn synthesize_preview(config: &CreativeConfig) -> Result<GeneratedDocument, SynthesisError> {
    if config.destination_url.trim().is_empty() {
        let preview = CreativeConfig {
            destination_url: PREVIEW_PLACEHOLDER_URL.to_string(),
            ..config.clone()
        };
        return synthesize(&preview);
    }
    synthesize(config)
}

// ────────────────────────────────────────────────────────────────────────────
// Layout resolution
// ────────────────────────────────────────────────────────────────────────────

pub fn resolve_layout(config: &CreativeConfig) -> Result<LayoutPlan, SynthesisError> {
    let (width, height) = (config.width, config.height);
    if width == 0 || height == 0 {
        return Err(SynthesisError::InvalidSize { width, height });
    }
    let destination = config.destination_url.trim();
    if destination.is_empty() {
        return Err(SynthesisError::MissingDestination);
    }
    check_destination(destination)?;

    let size = config.size_key();
    let colors = resolve_colors(config)?;
    let type_spec = typography::lookup(size);
    let overrides = &config.overrides;

    let headline = match overrides.headline_max_chars {
        Some(limit) => autofit::fit_to_budget(Some(limit), &config.headline),
        None => autofit::fit_headline(size, &config.headline),
    };
    let budget = overrides
        .headline_max_chars
        .or_else(|| autofit::headline_budget(size));
    let font_adjust = (headline.font_adjust + overrides.font_adjust).clamp(MIN_FONT_ADJUST, 0);
    let headline_base = overrides.title.font_size.unwrap_or(type_spec.headline);
    let headline_px = adjusted_px(headline_base, font_adjust);

    let sub = resolve_sub(config, type_spec, budget);

    let compact = height <= COMPACT_HEIGHT;
    let buttons = &overrides.buttons;
    let options = OptionRowLayout {
        labels: config.resolved_option_labels(),
        horizontal: compact || u64::from(width) > 2 * u64::from(height),
        compact,
        button_height_px: match buttons.height {
            Some(px) => px.clamp(1, height),
            None if compact => scaled(height, 0.5, 18, 28),
            None => scaled(height, 0.12, 24, 50),
        },
        gap_px: buttons.spacing.unwrap_or(if compact { 4 } else { 6 }),
        radius_px: buttons.radius.unwrap_or(if compact { 4 } else { 6 }),
        font_px: type_spec.button,
        align: buttons.align.unwrap_or(config.alignments.buttons),
    };

    let label = match config.cta_label.trim() {
        "" => DEFAULT_CTA_LABEL.to_string(),
        label => label.to_string(),
    };
    let placement = if compact {
        CtaPlacement::Right {
            width_px: scaled(width, 0.25, 60, 180),
        }
    } else if overrides.compact_cta {
        CtaPlacement::Bottom {
            height_px: scaled(height, 0.10, 16, 48),
        }
    } else {
        CtaPlacement::Bottom {
            height_px: scaled(height, 0.14, 24, 64),
        }
    };
    let cta = CtaLayout {
        label,
        placement,
        font_px: if overrides.compact_cta {
            adjusted_px(type_spec.button, -2)
        } else {
            type_spec.button
        },
        compact: overrides.compact_cta,
    };

    Ok(LayoutPlan {
        size,
        headline,
        headline_px,
        headline_margin_px: overrides
            .title
            .margin_bottom
            .unwrap_or(if compact { 2 } else { 6 }),
        title_align: config.alignments.title,
        sub,
        options,
        cta,
        logo_align: overrides.logo.align.unwrap_or(config.alignments.logo),
        colors,
        destination: destination.to_string(),
    })
}

/// Only absolute http(s) URLs may become the click tag.
fn check_destination(destination: &str) -> Result<(), SynthesisError> {
    let invalid = || SynthesisError::InvalidDestination(destination.to_string());
    let url = Url::parse(destination).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(())
}

fn resolve_colors(config: &CreativeConfig) -> Result<ResolvedColors, SynthesisError> {
    let palette = &config.palette;
    let primary = Rgb::parse_hex(&palette.primary)?;
    let secondary = Rgb::parse_hex(&palette.secondary)?;
    let background = Rgb::parse_hex(&palette.background)?;

    Ok(ResolvedColors {
        primary,
        secondary,
        background,
        text_on_primary: palette
            .text_on_primary
            .unwrap_or_else(|| resolve_rgb(primary)),
        text_on_secondary: resolve_rgb(secondary),
        text_on_background: resolve_rgb(background),
    })
}

/// Any one of: narrow banner, `hide_sub`, no sub text, no sub size → suppressed.
fn resolve_sub(
    config: &CreativeConfig,
    type_spec: TypeSpec,
    headline_budget: Option<usize>,
) -> Option<(String, u32)> {
    if config.width <= NARROW_WIDTH || config.overrides.hide_sub {
        return None;
    }
    let text = config.sub.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    let px = type_spec.sub?;
    Some((autofit::fit_sub_to_budget(headline_budget, text), px))
}

fn adjusted_px(base: u32, delta: i32) -> u32 {
    (base as i32 + delta).max(MIN_FONT_PX as i32) as u32
}

fn scaled(dimension: u32, factor: f64, min: u32, max: u32) -> u32 {
    ((dimension as f64 * factor).round() as u32).clamp(min, max)
}

// ────────────────────────────────────────────────────────────────────────────
// Tree construction
// ────────────────────────────────────────────────────────────────────────────

pub fn build_document(plan: &LayoutPlan) -> AdDocument {
    let mut top = vec![Node::text("headline", plan.headline.text.clone())];
    if let Some((sub, _)) = &plan.sub {
        top.push(Node::text("sub", sub.clone()));
    }

    let root = Node::Container {
        id: Some(ROOT_ID),
        class: None,
        clickable: true,
        children: vec![
            Node::container("top", top),
            Node::OptionRow {
                options: plan.options.labels.clone(),
                selected: 0,
            },
            Node::CallToAction {
                label: plan.cta.label.clone(),
            },
            Node::Logo { asset: LOGO_ASSET },
            Node::Disclaimer {
                text: DISCLAIMER.to_string(),
            },
        ],
    };

    AdDocument {
        ad_size: plan.size,
        title: format!("Ad {}", plan.size),
        styles: build_styles(plan),
        root,
        click_tag: plan.destination.clone(),
    }
}

fn build_styles(plan: &LayoutPlan) -> StyleSheet {
    let SizeKey { width, height } = plan.size;
    let colors = &plan.colors;
    let compact = plan.options.compact;
    let foot_px = scaled(height, 0.03, 7, 10);

    // Space reserved for the CTA (and the disclaimer line above a bottom bar).
    let (reserve_bottom, reserve_right) = match plan.cta.placement {
        CtaPlacement::Bottom { height_px } => (height_px + foot_px + 6, 0),
        CtaPlacement::Right { width_px } => (0, width_px),
    };

    let mut rules = vec![
        StyleRule::new("html,body").decl("margin", 0).decl("padding", 0),
        StyleRule::new(format!("#{ROOT_ID}"))
            .decl("width", format!("{width}px"))
            .decl("height", format!("{height}px"))
            .decl("position", "relative")
            .decl("overflow", "hidden")
            .decl("box-sizing", "border-box")
            .decl("padding", format!("0 {reserve_right}px {reserve_bottom}px 0"))
            .decl("background", colors.background)
            .decl("color", colors.text_on_background.as_css())
            .decl("font-family", FONT_STACK)
            .decl("display", "flex")
            .decl("flex-direction", "column")
            .decl("cursor", "pointer"),
        StyleRule::new(".top")
            .decl("padding", if compact { "4px 6px 0 6px" } else { "8px 10px 0 10px" })
            .decl("text-align", plan.title_align.as_text_align()),
        StyleRule::new(".headline")
            .decl("font-size", format!("{}px", plan.headline_px))
            .decl("font-weight", 700)
            .decl("line-height", 1.15)
            .decl("margin-bottom", format!("{}px", plan.headline_margin_px)),
    ];

    if let Some((_, sub_px)) = &plan.sub {
        rules.push(
            StyleRule::new(".sub")
                .decl("font-size", format!("{sub_px}px"))
                .decl("line-height", 1.3)
                .decl("opacity", 0.8),
        );
    }

    let options = &plan.options;
    // A row spreads options along its main axis, a column along its cross axis.
    let (stack_justify, stack_align) = if options.horizontal {
        (options.align.as_flex(), "center")
    } else {
        ("center", options.align.as_flex())
    };
    let mut opt = StyleRule::new(".opt")
        .decl("display", "inline-flex")
        .decl("align-items", "center")
        .decl("justify-content", "center")
        .decl("height", format!("{}px", options.button_height_px))
        .decl("padding", if compact { "0 6px" } else { "0 12px" })
        .decl("border", 0)
        .decl("border-radius", format!("{}px", options.radius_px))
        .decl("background", colors.primary)
        .decl("color", colors.text_on_primary.as_css())
        .decl("font-size", format!("{}px", options.font_px))
        .decl("font-weight", 700)
        .decl("font-family", FONT_STACK)
        .decl("cursor", "pointer");
    opt = if options.horizontal {
        opt.decl("flex", 1).decl("min-width", 0)
    } else {
        opt.decl("min-width", "40%")
    };

    rules.extend([
        StyleRule::new(".options")
            .decl("flex", 1)
            .decl("display", "flex")
            .decl("align-items", "center")
            .decl("justify-content", "center")
            .decl("padding", if compact { "0 4px" } else { "0 8px" }),
        StyleRule::new(".stack")
            .decl("display", "flex")
            .decl(
                "flex-direction",
                if options.horizontal { "row" } else { "column" },
            )
            .decl("gap", format!("{}px", options.gap_px))
            .decl("align-items", stack_align)
            .decl("justify-content", stack_justify)
            .decl("width", "100%"),
        opt,
        StyleRule::new(".opt.selected")
            .decl("outline", format!("2px solid {}", colors.secondary))
            .decl("outline-offset", "1px"),
        StyleRule::new(".opt-txt")
            .decl("max-width", format!("{}px", scaled(width, 0.6, 1, u32::MAX)))
            .decl("overflow", "hidden")
            .decl("text-overflow", "ellipsis")
            .decl("white-space", "nowrap"),
    ]);

    let cta = &plan.cta;
    let mut cta_rule = StyleRule::new(".cta").decl("position", "absolute");
    cta_rule = match cta.placement {
        CtaPlacement::Bottom { height_px } => cta_rule
            .decl("left", 0)
            .decl("right", 0)
            .decl("bottom", 0)
            .decl("height", format!("{height_px}px")),
        CtaPlacement::Right { width_px } => cta_rule
            .decl("top", 0)
            .decl("right", 0)
            .decl("bottom", 0)
            .decl("width", format!("{width_px}px")),
    };
    rules.push(
        cta_rule
            .decl("background", colors.secondary)
            .decl("color", colors.text_on_secondary.as_css())
            .decl("display", "flex")
            .decl("align-items", "center")
            .decl("justify-content", "center")
            .decl("text-align", "center")
            .decl("font-size", format!("{}px", cta.font_px))
            .decl("font-weight", 700)
            .decl("text-transform", "uppercase")
            .decl("letter-spacing", if cta.compact { "0" } else { ".3px" }),
    );

    let (logo_inset, logo_bottom, logo_w, logo_h) = match cta.placement {
        CtaPlacement::Bottom { height_px } => (8, height_px + foot_px + 8, 40, 20),
        CtaPlacement::Right { .. } => (4, 4, 24, 12),
    };
    let (logo_side, logo_offset) = match plan.logo_align {
        Alignment::Left => ("left", logo_inset),
        Alignment::Center => (
            "left",
            width.saturating_sub(reserve_right).saturating_sub(logo_w) / 2,
        ),
        Alignment::Right => ("right", reserve_right + logo_inset),
    };
    rules.push(
        StyleRule::new(".logo")
            .decl("position", "absolute")
            .decl(logo_side, format!("{logo_offset}px"))
            .decl("bottom", format!("{logo_bottom}px"))
            .decl("width", format!("{logo_w}px"))
            .decl("height", format!("{logo_h}px"))
            .decl(
                "background",
                format!("{}80 url('{LOGO_ASSET}') center/contain no-repeat", colors.secondary),
            ),
    );

    let foot_bottom = match cta.placement {
        CtaPlacement::Bottom { height_px } => height_px + 2,
        CtaPlacement::Right { .. } => 1,
    };
    rules.push(
        StyleRule::new(".foot")
            .decl("position", "absolute")
            .decl("left", "4px")
            .decl("right", format!("{}px", reserve_right + 4))
            .decl("bottom", format!("{foot_bottom}px"))
            .decl("font-size", format!("{foot_px}px"))
            .decl("line-height", 1.2)
            .decl("text-align", "center")
            .decl("opacity", 0.7)
            .decl("white-space", "nowrap")
            .decl("overflow", "hidden")
            .decl("text-overflow", "ellipsis"),
    );

    rules.push(StyleRule::new(".headline,.opt,.cta").decl("animation", "fadeUp 3s ease-in-out 3"));

    StyleSheet {
        rules,
        keyframes: vec![Keyframes {
            name: "fadeUp",
            stops: vec![
                StyleRule::new("0%")
                    .decl("opacity", 0)
                    .decl("transform", "translateY(6px)"),
                StyleRule::new("60%")
                    .decl("opacity", 1)
                    .decl("transform", "translateY(0)"),
                StyleRule::new("100%").decl("opacity", 1),
            ],
        }],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
