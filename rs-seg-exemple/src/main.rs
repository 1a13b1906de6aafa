use rand::seq::IndexedRandom;

use rs_seg_core::io::load_text;
use rs_seg_core::model::segmentation_input::SegmentationInput;
use rs_seg_core::model::segmenter::Segmenter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Surface the core's per-tier diagnostics (RUST_LOG overrides)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Build at most two tiers: the raw characters, then the discovered units
    let mut input = SegmentationInput::new();
    input.set_max_depth(2)?;
    let segmenter = Segmenter::new(input);

    // Build the hierarchy from the corpus, or reload the cached .bin if a
    // previous run already built it
    let corpus = "./data/moby-dick.txt";
    let hierarchy = segmenter.load_or_build(corpus)?;

    for (stage, level) in hierarchy.levels().iter().enumerate() {
        println!(
            "Stage {}: {} symbols, sequence of {}",
            stage,
            level.symbols().len(),
            level.segmented().len()
        );
    }

    // Evaluate next-symbol prediction against the same corpus (capped at the
    // configured evaluation limit)
    let data = load_text(corpus)?;
    let outcome = segmenter.prediction(&data, &hierarchy)?;
    println!("Matches: {}", outcome.matches);
    println!("Proportion: {}", outcome.proportion);

    // Control: a uniformly random sequence over the same alphabet should
    // score well below the corpus itself
    let alphabet: Vec<String> = match hierarchy.base() {
        Some(base) => base.symbols().iter().cloned().collect(),
        None => return Err("Hierarchy has no base level".into()),
    };

    let mut rng = rand::rng();
    let mut control = Vec::with_capacity(data.len().min(10_000));
    for _ in 0..data.len().min(10_000) {
        let symbol = alphabet.choose(&mut rng).ok_or("Empty alphabet")?;
        control.push(symbol.clone());
    }

    let control_outcome = segmenter.prediction(&control, &hierarchy)?;
    println!("Random-control proportion: {}", control_outcome.proportion);

    Ok(())
}
