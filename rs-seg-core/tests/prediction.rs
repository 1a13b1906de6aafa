//! End-to-end prediction tests against trained hierarchies.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rs_seg_core::model::hierarchy::Hierarchy;
use rs_seg_core::model::segmentation_input::SegmentationInput;
use rs_seg_core::model::segmenter::Segmenter;

// ─── helpers ─────────────────────────────────────────────────────────────────

fn sequence(text: &str) -> Vec<String> {
    text.chars().map(String::from).collect()
}

fn segmenter(max_depth: usize) -> Segmenter {
    let mut input = SegmentationInput::new();
    input.set_max_depth(max_depth).unwrap();
    Segmenter::new(input)
}

/// Depth-2 hierarchy trained on repeated aabb blocks; tier 1 holds the units
/// "aa" and "bb".
fn trained_on_blocks() -> (Segmenter, Hierarchy) {
    let segmenter = segmenter(25);
    let hierarchy = segmenter.segmentation(sequence(&"aabb".repeat(3))).unwrap();
    assert_eq!(hierarchy.depth(), 2);
    (segmenter, hierarchy)
}

// ─── tests ───────────────────────────────────────────────────────────────────

#[test]
fn held_out_repetition_is_predicted_almost_perfectly() {
    let (segmenter, hierarchy) = trained_on_blocks();

    // Walk "aabbaabb": partway through a unit the continuation evidence
    // votes, at a completed unit the transition evidence votes; every one of
    // the 7 pairs is guessed right.
    let outcome = segmenter.prediction(&sequence("aabbaabb"), &hierarchy).unwrap();
    assert_eq!(outcome.matches, 7);
    assert!((outcome.proportion - 7.0 / 8.0).abs() < 1e-12);
}

#[test]
fn single_tier_hierarchy_never_predicts() {
    let segmenter = segmenter(25);
    let hierarchy = segmenter.segmentation(sequence("ababab")).unwrap();
    assert_eq!(hierarchy.depth(), 1);

    assert_eq!(hierarchy.predict("a"), None);

    // Every abstention counts as a non-match rather than failing.
    let outcome = segmenter.prediction(&sequence("ababab"), &hierarchy).unwrap();
    assert_eq!(outcome.matches, 0);
    assert_eq!(outcome.proportion, 0.0);
}

#[test]
fn unknown_symbols_in_held_out_data_are_tolerated() {
    let (segmenter, hierarchy) = trained_on_blocks();

    // z was never seen in training: its entropies read as 0 and prediction
    // simply scores non-matches instead of failing.
    let outcome = segmenter.prediction(&sequence("zzzz"), &hierarchy).unwrap();
    assert_eq!(outcome.matches, 0);
}

#[test]
fn eval_limit_truncates_the_held_out_sequence() {
    let (_, hierarchy) = trained_on_blocks();

    let mut input = SegmentationInput::new();
    input.eval_limit = 4;
    let capped = Segmenter::new(input);

    // Only "aabb" is evaluated: 3 pairs, all matched, over 4 symbols.
    let outcome = capped.prediction(&sequence("aabbaabb"), &hierarchy).unwrap();
    assert_eq!(outcome.matches, 3);
    assert!((outcome.proportion - 3.0 / 4.0).abs() < 1e-12);
}

#[test]
fn repetition_beats_a_random_sequence_over_the_same_alphabet() {
    let segmenter = segmenter(25);
    let hierarchy = segmenter.segmentation(sequence(&"aabb".repeat(30))).unwrap();

    let repeated = segmenter
        .prediction(&sequence(&"aabb".repeat(30)), &hierarchy)
        .unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let random: Vec<String> = (0..240)
        .map(|_| if rng.random_range(0..2) == 0 { "a" } else { "b" })
        .map(String::from)
        .collect();
    let control = segmenter.prediction(&random, &hierarchy).unwrap();

    assert!(
        repeated.proportion > control.proportion,
        "repetition {} should beat random {}",
        repeated.proportion,
        control.proportion
    );
}

#[test]
fn hierarchy_survives_a_postcard_round_trip() {
    let (segmenter, hierarchy) = trained_on_blocks();

    let bytes = postcard::to_stdvec(&hierarchy).unwrap();
    let restored: Hierarchy = postcard::from_bytes(&bytes).unwrap();

    assert_eq!(restored.depth(), hierarchy.depth());
    for context in ["a", "aa", "b", "bb"] {
        assert_eq!(restored.predict(context), hierarchy.predict(context));
    }

    let held_out = sequence("aabbaabb");
    let before = segmenter.prediction(&held_out, &hierarchy).unwrap();
    let after = segmenter.prediction(&held_out, &restored).unwrap();
    assert_eq!(before.matches, after.matches);
}

#[test]
fn load_or_build_caches_and_reloads_the_same_hierarchy() {
    let mut corpus = std::env::temp_dir();
    corpus.push(format!("rs-seg-cache-{}.txt", std::process::id()));
    let mut cache = corpus.clone();
    cache.set_extension("bin");

    std::fs::write(&corpus, "aabb".repeat(30)).unwrap();
    std::fs::remove_file(&cache).ok();

    let segmenter = segmenter(25);
    let built = segmenter.load_or_build(&corpus).unwrap();
    assert!(cache.exists());

    let reloaded = segmenter.load_or_build(&corpus).unwrap();
    assert_eq!(reloaded.depth(), built.depth());
    for context in ["a", "aa", "b", "bb"] {
        assert_eq!(reloaded.predict(context), built.predict(context));
    }

    std::fs::remove_file(&corpus).ok();
    std::fs::remove_file(&cache).ok();
}
