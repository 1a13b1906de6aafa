use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::level::Level;

/// Ordered stack of [`Level`]s, finest tier first.
///
/// Level 0 covers the raw symbols; level i + 1 covers the segments produced
/// by level i, each segment treated as one opaque symbol. The stack is
/// append-only and, once built, read-only: prediction queries reuse the
/// levels' graphs and counts.
///
/// # Invariants
/// - Level i + 1 was processed over exactly level i's `segmented()` output
///   (enforced by the build loop, not re-validated here)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Hierarchy {
	levels: Vec<Level>,
}

impl Hierarchy {
	/// Creates an empty hierarchy.
	pub fn new() -> Self {
		Self { levels: Vec::new() }
	}

	/// Appends a level as the next-coarser tier.
	pub fn push(&mut self, level: Level) {
		self.levels.push(level);
	}

	/// All levels, finest tier first.
	pub fn levels(&self) -> &[Level] {
		&self.levels
	}

	/// The finest (tier-0) level, if any level was pushed yet.
	pub fn base(&self) -> Option<&Level> {
		self.levels.first()
	}

	/// Number of tiers built.
	pub fn depth(&self) -> usize {
		self.levels.len()
	}

	/// Predicts the single most likely next tier-0 symbol after `ongoing`,
	/// the concatenation of the context seen so far.
	///
	/// Two kinds of evidence from the tier directly above the base are
	/// merged, per candidate character:
	/// - **Continuation**: every tier-1 unit that `ongoing` is a proper
	///   prefix of votes for its next character, weighted by the unit's
	///   total observed occurrence count. Votes on the same character sum.
	/// - **Transition**: when `ongoing` itself is a known tier-1 unit, each
	///   successor unit votes for its first character, weighted by
	///   `transitions * occurrences(ongoing) / total transitions` so the two
	///   kinds of evidence stay commensurate.
	///
	/// Returns the character with the maximum merged weight; ties resolve to
	/// whichever maximum is encountered first. Returns `None` when there is
	/// no tier above the base or no candidate at all.
	pub fn predict(&self, ongoing: &str) -> Option<char> {
		let level = self.levels.get(1)?;
		let mut weights: HashMap<char, f64> = HashMap::new();

		for symbol in level.symbols() {
			if !is_proper_prefix(ongoing, symbol) {
				continue;
			}
			// A proper prefix always leaves at least one character.
			if let Some(next) = symbol[ongoing.len()..].chars().next() {
				*weights.entry(next).or_insert(0.0) += level.count(symbol) as f64;
			}
		}

		if level.symbols().contains(ongoing) {
			let occurrences = level.count(ongoing) as f64;
			if let Some(successors) = level.graph().successors(ongoing) {
				let total = level.graph().total_out(ongoing) as f64;
				for (successor, transitions) in successors {
					if let Some(first) = successor.chars().next() {
						*weights.entry(first).or_insert(0.0) +=
							*transitions as f64 * occurrences / total;
					}
				}
			}
		}

		weights
			.into_iter()
			.max_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(symbol, _)| symbol)
	}
}

/// Whether `prefix` is a strict, literal prefix of `symbol`.
fn is_proper_prefix(prefix: &str, symbol: &str) -> bool {
	prefix.len() < symbol.len() && symbol.starts_with(prefix)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn level_over(symbols: &[&str]) -> Level {
		let data: Vec<String> = symbols.iter().map(|s| (*s).to_owned()).collect();
		let mut level = Level::new();
		level.process(&data).unwrap();
		level
	}

	fn hierarchy_over(base: &[&str], tier1: &[&str]) -> Hierarchy {
		let mut hierarchy = Hierarchy::new();
		hierarchy.push(level_over(base));
		hierarchy.push(level_over(tier1));
		hierarchy
	}

	#[test]
	fn proper_prefix_is_strict() {
		assert!(is_proper_prefix("a", "ab"));
		assert!(is_proper_prefix("", "a"));
		assert!(!is_proper_prefix("ab", "ab"));
		assert!(!is_proper_prefix("b", "ab"));
	}

	#[test]
	fn predict_without_a_second_tier_is_none() {
		let mut hierarchy = Hierarchy::new();
		assert_eq!(hierarchy.predict("a"), None);
		hierarchy.push(level_over(&["a", "b", "a", "b"]));
		assert_eq!(hierarchy.predict("a"), None);
	}

	#[test]
	fn predict_without_any_candidate_is_none() {
		let hierarchy = hierarchy_over(&["a", "b"], &["aa", "bb", "aa", "bb", "aa"]);
		// Neither a proper prefix of a known unit nor a known unit itself.
		assert_eq!(hierarchy.predict("ab"), None);
		assert_eq!(hierarchy.predict("zzz"), None);
	}

	#[test]
	fn prefix_votes_follow_occurrence_counts() {
		// "ac" was observed as a successor twice, "ab" once.
		let hierarchy = hierarchy_over(&["a", "b"], &["ab", "ac", "ab", "ac"]);
		assert_eq!(hierarchy.predict("a"), Some('c'));
	}

	#[test]
	fn prefix_votes_on_the_same_character_are_summed() {
		// 'b' collects in-counts from both "ab" (1) and "abz" (2), beating
		// the single 'c' vote from "ac" (also 2).
		let tier1 = ["x", "ab", "x", "abz", "x", "abz", "x", "ac", "x", "ac"];
		let hierarchy = hierarchy_over(&["a", "b"], &tier1);
		assert_eq!(hierarchy.predict("a"), Some('b'));
	}

	#[test]
	fn completed_unit_votes_for_its_successor() {
		let hierarchy = hierarchy_over(&["a", "b"], &["aa", "bb", "aa", "bb", "aa"]);
		// "aa" is a known unit whose only successor is "bb".
		assert_eq!(hierarchy.predict("aa"), Some('b'));
		assert_eq!(hierarchy.predict("bb"), Some('a'));
	}
}
