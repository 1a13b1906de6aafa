use std::path::Path;

use log::info;

use super::hierarchy::Hierarchy;
use super::level::Level;
use super::segmentation_input::SegmentationInput;
use crate::io::{build_output_path, get_filename, load_binary, load_text};

/// Outcome of evaluating a hierarchy against a held-out sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
	/// Number of symbols predicted correctly.
	pub matches: usize,
	/// `matches` divided by the evaluated sequence length.
	pub proportion: f64,
}

/// High-level interface: builds hierarchies from symbol sequences and
/// evaluates them against held-out data.
///
/// # Responsibilities
/// - Stack levels bottom-up until the sequence collapses or `max_depth` is hit
/// - Walk a held-out sequence symbol by symbol, counting correct predictions
/// - Load-or-build hierarchies with a binary cache next to the corpus file
#[derive(Clone, Debug)]
pub struct Segmenter {
	input: SegmentationInput,
}

impl Segmenter {
	/// Creates a segmenter from a run configuration.
	pub fn new(input: SegmentationInput) -> Self {
		Self { input }
	}

	/// The run configuration this segmenter was created with.
	pub fn input(&self) -> &SegmentationInput {
		&self.input
	}

	/// Builds a hierarchy over `data`, one tier per pass.
	///
	/// Each level consumes the previous level's segment output as its own
	/// symbol sequence. Building stops after `max_depth` tiers or as soon as
	/// a tier's output collapses to a single unit. Per-tier diagnostics
	/// (tier index, distinct symbols, resulting sequence length) are logged
	/// at info level.
	///
	/// # Errors
	/// Returns an error on an empty input sequence.
	pub fn segmentation(&self, data: Vec<String>) -> Result<Hierarchy, String> {
		let mut hierarchy = Hierarchy::new();
		let mut data = data;

		for stage in 0..self.input.max_depth() {
			let mut level = Level::new();
			level.process(&data)?;
			data = level.segmented();

			info!(
				"stage {}: {} symbols, sequence of {}",
				stage,
				level.symbols().len(),
				data.len()
			);

			hierarchy.push(level);
			if data.len() == 1 {
				break;
			}
		}

		Ok(hierarchy)
	}

	/// Evaluates `hierarchy` against a held-out sequence.
	///
	/// Maintains an ongoing context seeded with the first symbol. For every
	/// subsequent symbol the hierarchy's prediction is compared to the actual
	/// symbol, then the context is either extended or, when the trained
	/// tier-0 snapshot places a boundary between the pair, reset before
	/// appending. The held-out data's own statistics are never consulted, so
	/// the context stays aligned with the boundaries discovered in training.
	///
	/// The input is truncated to the configured `eval_limit`. A hierarchy
	/// that abstains (no prediction) simply scores a non-match.
	///
	/// # Errors
	/// Returns an error on an empty sequence or an empty hierarchy.
	pub fn prediction(&self, data: &[String], hierarchy: &Hierarchy) -> Result<Prediction, String> {
		let data = &data[..data.len().min(self.input.eval_limit)];
		if data.is_empty() {
			return Err("Cannot evaluate an empty sequence".to_owned());
		}
		let base = hierarchy
			.base()
			.ok_or_else(|| "Cannot evaluate against an empty hierarchy".to_owned())?;
		let snapshot = base.snapshot();

		let mut ongoing: Vec<String> = vec![data[0].clone()];
		let mut matches = 0;

		for pair in data.windows(2) {
			let guess = hierarchy.predict(&ongoing.concat());
			if matched(guess, &pair[1]) {
				matches += 1;
			}

			if snapshot.is_boundary(&pair[0], &pair[1]) {
				ongoing.clear();
			}
			ongoing.push(pair[1].clone());
		}

		Ok(Prediction {
			matches,
			proportion: matches as f64 / data.len() as f64,
		})
	}

	/// Loads a cached hierarchy for `filepath`, or builds one from the corpus
	/// and caches it.
	///
	/// - Checks for a `.bin` file next to the corpus for fast loading.
	/// - Uses `postcard` for compact serialization/deserialization.
	/// - Loads the corpus per the configured `binary` mode when no cache
	///   exists, builds the hierarchy, and writes the cache for next time.
	pub fn load_or_build<P: AsRef<Path>>(
		&self,
		filepath: P,
	) -> Result<Hierarchy, Box<dyn std::error::Error>> {
		let cache_path = build_output_path(&filepath, "bin")?;
		let name = get_filename(&filepath)?;

		if cache_path.exists() {
			info!("loading cached hierarchy for {}", name);
			let bytes = std::fs::read(cache_path)?;
			return Ok(postcard::from_bytes(&bytes)?);
		}

		info!("building hierarchy for {}", name);
		let data = if self.input.binary {
			load_binary(&filepath)?
		} else {
			load_text(&filepath)?
		};
		let hierarchy = self.segmentation(data)?;

		let bytes = postcard::to_stdvec(&hierarchy)?;
		std::fs::write(cache_path, bytes)?;

		Ok(hierarchy)
	}
}

/// Whether a predicted character equals a single-character actual symbol.
fn matched(guess: Option<char>, actual: &str) -> bool {
	match guess {
		Some(c) => {
			let mut chars = actual.chars();
			chars.next() == Some(c) && chars.next().is_none()
		}
		None => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn matched_compares_single_characters() {
		assert!(matched(Some('a'), "a"));
		assert!(!matched(Some('a'), "b"));
		assert!(!matched(Some('a'), "ab"));
		assert!(!matched(None, "a"));
	}

	#[test]
	fn empty_sequence_is_rejected() {
		let segmenter = Segmenter::new(SegmentationInput::new());
		assert!(segmenter.segmentation(Vec::new()).is_err());
		assert!(segmenter.prediction(&[], &Hierarchy::new()).is_err());
	}

	#[test]
	fn empty_hierarchy_is_rejected() {
		let segmenter = Segmenter::new(SegmentationInput::new());
		let data = vec!["a".to_owned(), "b".to_owned()];
		assert!(segmenter.prediction(&data, &Hierarchy::new()).is_err());
	}
}
