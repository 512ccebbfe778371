//! Batch Orchestrator: sizes × palette variants → one document per combination.
//!
//! Fail-fast: the first failing combination aborts the whole batch with
//! `BatchSynthesisFailure`, carrying the key of the combination and its cause.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::synthesis::creative::{CreativeConfig, Overrides, Palette, SizeKey};
use crate::synthesis::error::SynthesisError;
use crate::synthesis::synthesizer::{synthesize, GeneratedDocument};

/// Result key → document. Keys are unique per batch.
pub type BatchResult = BTreeMap<String, GeneratedDocument>;

/// Per-size overrides replacing the base configuration's overrides.
pub type SizeOverrides = BTreeMap<SizeKey, Overrides>;

/// Key for one combination: `"{size}"` for single-palette batches,
/// `"{size}-v{n}"` (1-based) otherwise.
pub fn batch_key(size: SizeKey, variant: usize, variant_count: usize) -> String {
    if variant_count <= 1 {
        size.to_string()
    } else {
        format!("{size}-v{}", variant + 1)
    }
}

/// Number of documents a batch request would produce.
pub fn batch_item_count(sizes: &[SizeKey], palettes: &[Palette]) -> usize {
    let unique = sizes.iter().collect::<BTreeSet<_>>().len();
    unique * palettes.len().max(1)
}

pub fn generate_batch(
    sizes: &[SizeKey],
    palettes: &[Palette],
    base: &CreativeConfig,
    size_overrides: &SizeOverrides,
) -> Result<BatchResult, SynthesisError> {
    let default_palette;
    let palettes = if palettes.is_empty() {
        default_palette = [base.palette.clone()];
        &default_palette[..]
    } else {
        palettes
    };

    let mut seen = BTreeSet::new();
    let mut result = BatchResult::new();

    for &size in sizes {
        if !seen.insert(size) {
            continue;
        }
        for (variant, palette) in palettes.iter().enumerate() {
            let key = batch_key(size, variant, palettes.len());

            let mut config = base.with_size_and_palette(size, palette);
            if let Some(overrides) = size_overrides.get(&size) {
                config.overrides = overrides.clone();
            }

            let document =
                synthesize(&config).map_err(|source| SynthesisError::BatchSynthesisFailure {
                    key: key.clone(),
                    source: Box::new(source),
                })?;
            result.insert(key, document);
        }
    }

    info!(
        sizes = seen.len(),
        variants = palettes.len(),
        documents = result.len(),
        "batch synthesized"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::creative::{Alignments, Mode};
    use proptest::prelude::*;

    fn base() -> CreativeConfig {
        CreativeConfig {
            width: 300,
            height: 250,
            headline: "Escolha seu limite".to_string(),
            sub: Some("Crédito rápido".to_string()),
            cta_label: "Simule agora".to_string(),
            mode: Mode::Limit,
            option_labels: vec![],
            palette: Palette::default(),
            destination_url: "https://example.com".to_string(),
            alignments: Alignments::default(),
            overrides: Overrides::default(),
        }
    }

    fn palette_a() -> Palette {
        Palette::default()
    }

    fn palette_b() -> Palette {
        Palette {
            primary: "#16A34A".to_string(),
            secondary: "#15803D".to_string(),
            background: "#F0FDF4".to_string(),
            text_on_primary: None,
        }
    }

    fn sizes(keys: &[&str]) -> Vec<SizeKey> {
        keys.iter().map(|k| k.parse().unwrap()).collect()
    }

    #[test]
    fn test_two_sizes_two_palettes_gives_four_documents() {
        let result = generate_batch(
            &sizes(&["300x250", "728x90"]),
            &[palette_a(), palette_b()],
            &base(),
            &SizeOverrides::new(),
        )
        .unwrap();

        let keys: Vec<&str> = result.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["300x250-v1", "300x250-v2", "728x90-v1", "728x90-v2"]
        );
        assert_eq!(result["728x90-v2"].size, SizeKey::new(728, 90));
        assert!(result["300x250-v2"].html.contains("#16a34a"));
        assert!(result["300x250-v1"].html.contains("#2563eb"));
    }

    #[test]
    fn test_single_palette_keys_by_size() {
        let result = generate_batch(
            &sizes(&["320x50", "160x600"]),
            &[palette_b()],
            &base(),
            &SizeOverrides::new(),
        )
        .unwrap();
        assert!(result.contains_key("320x50"));
        assert!(result.contains_key("160x600"));
    }

    #[test]
    fn test_no_palettes_uses_base_palette() {
        let result =
            generate_batch(&sizes(&["300x250"]), &[], &base(), &SizeOverrides::new()).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result["300x250"].html.contains("#2563eb"));
    }

    #[test]
    fn test_duplicate_sizes_synthesized_once() {
        let requested = sizes(&["300x250", "300x250", "728x90"]);
        let result =
            generate_batch(&requested, &[], &base(), &SizeOverrides::new()).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(batch_item_count(&requested, &[]), 2);
    }

    #[test]
    fn test_size_override_applies_only_to_its_size() {
        let mut overrides = SizeOverrides::new();
        overrides.insert(
            SizeKey::new(970, 250),
            Overrides {
                hide_sub: true,
                ..Overrides::default()
            },
        );
        let result = generate_batch(
            &sizes(&["728x90", "970x250"]),
            &[],
            &base(),
            &overrides,
        )
        .unwrap();
        assert!(result["728x90"].html.contains("class=\"sub\""));
        assert!(!result["970x250"].html.contains("class=\"sub\""));
    }

    #[test]
    fn test_button_overrides_stay_on_their_size() {
        let mut overrides = SizeOverrides::new();
        let mut leaderboard = Overrides::default();
        leaderboard.buttons.texts = Some(vec!["R$300".to_string()]);
        leaderboard.buttons.radius = Some(14);
        overrides.insert(SizeKey::new(728, 90), leaderboard);

        let result =
            generate_batch(&sizes(&["728x90", "970x250"]), &[], &base(), &overrides).unwrap();
        assert!(result["728x90"].html.contains(">R$300<"));
        assert!(result["728x90"].html.contains("border-radius:14px"));
        assert!(!result["970x250"].html.contains(">R$300<"));
        assert!(!result["970x250"].html.contains("border-radius:14px"));
    }

    #[test]
    fn test_failure_aborts_batch_with_key() {
        let err = generate_batch(
            &sizes(&["300x250", "728x90"]),
            &[
                palette_a(),
                Palette {
                    primary: "red".to_string(),
                    ..Palette::default()
                },
            ],
            &base(),
            &SizeOverrides::new(),
        )
        .unwrap_err();

        match &err {
            SynthesisError::BatchSynthesisFailure { key, source } => {
                assert_eq!(key, "300x250-v2");
                assert!(matches!(**source, SynthesisError::InvalidColorFormat(_)));
            }
            other => panic!("expected BatchSynthesisFailure, got {other:?}"),
        }
        assert!(err.is_input_error());
    }

    #[test]
    fn test_missing_destination_fails_batch() {
        let config = CreativeConfig {
            destination_url: String::new(),
            ..base()
        };
        let err =
            generate_batch(&sizes(&["300x250"]), &[], &config, &SizeOverrides::new()).unwrap_err();
        assert_eq!(err.root_cause(), &SynthesisError::MissingDestination);
    }

    #[test]
    fn test_batch_key_format() {
        assert_eq!(batch_key(SizeKey::new(728, 90), 0, 1), "728x90");
        assert_eq!(batch_key(SizeKey::new(728, 90), 2, 3), "728x90-v3");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_batch_matches_individual_synthesis(
            dims in proptest::collection::vec((1u32..1000, 1u32..1000), 1..4),
            variants in 1usize..3,
        ) {
            let requested: Vec<SizeKey> = dims.iter().map(|&(w, h)| SizeKey::new(w, h)).collect();
            let palettes: Vec<Palette> = [palette_a(), palette_b()][..variants].to_vec();
            let result = generate_batch(&requested, &palettes, &base(), &SizeOverrides::new()).unwrap();

            prop_assert_eq!(result.len(), batch_item_count(&requested, &palettes));
            for &size in &requested {
                for (i, palette) in palettes.iter().enumerate() {
                    let key = batch_key(size, i, palettes.len());
                    let alone = synthesize(&base().with_size_and_palette(size, palette)).unwrap();
                    prop_assert_eq!(&result[&key], &alone);
                }
            }
        }
    }
}
