//! Validation Guard: compliance invariants every generated document must hold.
//!
//! # Checks
//! - Exactly one ad-size meta declaration, matching the requested dimensions
//! - The click-tag slot is assigned exactly once, to the configured destination
//! - No absolute URL (`scheme://`) survives outside that one assignment, and no
//!   asset reference points anywhere but the package asset paths. Stylesheet
//!   references are only looked for inside `<style>` and attribute references
//!   only inside tags: escaped copy in text nodes cannot fetch anything.
//! - The root container's declared box equals the requested dimensions exactly
//!
//! Each check runs against the typed tree and the rendered text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::synthesis::creative::CreativeConfig;
use crate::synthesis::document::{AdDocument, Node, PACKAGE_ASSETS, ROOT_ID};
use crate::synthesis::error::{InvariantViolation, ViolationKind};

/// A statement assigning the slot. Matched at line start, so the destination
/// string inside the emitted assignment never counts as a second one.
static CLICK_TAG_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*window\.clickTag\s*=([^=]|$)").expect("valid click-tag regex")
});

static ABSOLUTE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[a-z][a-z0-9+.\-]*://").expect("valid URL-scheme regex"));

static CSS_URL_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)url\(\s*['"]?([^'")\s]*)"#).expect("valid css url() regex")
});

static MARKUP_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s(?:src|href|srcset|poster|action)\s*=\s*["']?([^"'\s>]*)"#)
        .expect("valid markup reference regex")
});

static CSS_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@import").expect("valid @import regex"));

static STYLE_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("valid style body regex"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[A-Za-z][^<>]*>").expect("valid tag regex"));

const AD_SIZE_MARKER: &str = "name=\"ad.size\"";

/// Runs every invariant check. The first violation wins.
pub fn validate(
    document: &AdDocument,
    html: &str,
    config: &CreativeConfig,
) -> Result<(), InvariantViolation> {
    check_ad_size(document, html, config)?;
    check_click_tag(document, html, config)?;
    check_external_references(document, html, config)?;
    check_root_box(document, html, config)?;
    Ok(())
}

fn check_ad_size(
    document: &AdDocument,
    html: &str,
    config: &CreativeConfig,
) -> Result<(), InvariantViolation> {
    let expected = config.size_key();
    if document.ad_size != expected {
        return Err(InvariantViolation::new(
            ViolationKind::SizeMismatch,
            format!("ad.size declares {}, requested {expected}", document.ad_size),
        ));
    }

    let declarations = html.matches(AD_SIZE_MARKER).count();
    if declarations != 1 {
        return Err(InvariantViolation::new(
            ViolationKind::SizeMismatch,
            format!("expected exactly one ad.size declaration, found {declarations}"),
        ));
    }
    if !html.contains(&AdDocument::ad_size_meta(expected)) {
        return Err(InvariantViolation::new(
            ViolationKind::SizeMismatch,
            format!("ad.size declaration does not match {expected}"),
        ));
    }
    Ok(())
}

fn check_click_tag(
    document: &AdDocument,
    html: &str,
    config: &CreativeConfig,
) -> Result<(), InvariantViolation> {
    let destination = config.destination_url.trim();
    if document.click_tag != destination {
        return Err(InvariantViolation::new(
            ViolationKind::MultipleOrMissingClickTag,
            "click tag is not initialized from the destination URL",
        ));
    }

    let clickable_roots = document
        .root
        .find_all(|n| matches!(n, Node::Container { clickable: true, .. }));
    let root_is_clickable = matches!(
        &document.root,
        Node::Container { id: Some(id), clickable: true, .. } if *id == ROOT_ID
    );
    if clickable_roots.len() != 1 || !root_is_clickable {
        return Err(InvariantViolation::new(
            ViolationKind::MultipleOrMissingClickTag,
            format!(
                "navigation must go through the root container only, found {} navigating containers",
                clickable_roots.len()
            ),
        ));
    }

    let assignments = CLICK_TAG_ASSIGNMENT.find_iter(html).count();
    if assignments != 1 {
        return Err(InvariantViolation::new(
            ViolationKind::MultipleOrMissingClickTag,
            format!("click tag assigned {assignments} times"),
        ));
    }
    if html.matches(&AdDocument::click_tag_assignment(destination)).count() != 1 {
        return Err(InvariantViolation::new(
            ViolationKind::MultipleOrMissingClickTag,
            "click tag assignment does not carry the destination URL",
        ));
    }
    Ok(())
}

fn check_external_references(
    document: &AdDocument,
    html: &str,
    config: &CreativeConfig,
) -> Result<(), InvariantViolation> {
    let leak = |detail: String| InvariantViolation::new(ViolationKind::LeakedExternalReference, detail);

    let mut bad_asset = None;
    document.root.walk(&mut |node| {
        if let Node::Logo { asset } = node {
            if !PACKAGE_ASSETS.contains(asset) && bad_asset.is_none() {
                bad_asset = Some(*asset);
            }
        }
    });
    if let Some(asset) = bad_asset {
        return Err(leak(format!("logo references non-package asset {asset:?}")));
    }

    // The destination may legitimately carry a scheme, so blank it before scanning.
    let destination = config.destination_url.trim();
    let scrubbed = html.replacen(
        &AdDocument::click_tag_assignment(destination),
        &AdDocument::click_tag_assignment(""),
        1,
    );

    if let Some(m) = ABSOLUTE_URL.find(&scrubbed) {
        return Err(leak(format!(
            "absolute URL outside the click tag near {:?}",
            excerpt(&scrubbed, m.start())
        )));
    }

    let styles: Vec<&str> = STYLE_BODY
        .captures_iter(&scrubbed)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    if styles.iter().any(|css| CSS_IMPORT.is_match(css)) {
        return Err(leak("stylesheet @import is not allowed".to_string()));
    }
    let style_refs = styles.iter().flat_map(|&css| CSS_URL_REF.captures_iter(css));
    let markup_refs = TAG
        .find_iter(&scrubbed)
        .flat_map(|tag| MARKUP_REF.captures_iter(tag.as_str()));
    for caps in style_refs.chain(markup_refs) {
        let target = caps.get(1).map_or("", |m| m.as_str());
        if !PACKAGE_ASSETS.contains(&target) {
            return Err(leak(format!("reference to non-package resource {target:?}")));
        }
    }
    Ok(())
}

fn check_root_box(
    document: &AdDocument,
    html: &str,
    config: &CreativeConfig,
) -> Result<(), InvariantViolation> {
    let width = format!("{}px", config.width);
    let height = format!("{}px", config.height);
    let selector = format!("#{ROOT_ID}");

    let rule = document.styles.rule(&selector).ok_or_else(|| {
        InvariantViolation::new(ViolationKind::SizeMismatch, "root container has no style rule")
    })?;
    if rule.value("width") != Some(width.as_str()) || rule.value("height") != Some(height.as_str())
    {
        return Err(InvariantViolation::new(
            ViolationKind::SizeMismatch,
            format!(
                "root box declares {}x{}, requested {}x{}",
                rule.value("width").unwrap_or("?"),
                rule.value("height").unwrap_or("?"),
                width,
                height
            ),
        ));
    }

    let serialized = format!("{selector}{{width:{width};height:{height}");
    if !html.contains(&serialized) {
        return Err(InvariantViolation::new(
            ViolationKind::SizeMismatch,
            format!("serialized root box does not start with {serialized:?}"),
        ));
    }
    Ok(())
}

fn excerpt(text: &str, at: usize) -> String {
    text[at..].chars().take(40).collect()
}
