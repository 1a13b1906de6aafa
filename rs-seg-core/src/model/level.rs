use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::graph::{EntropySnapshot, TransitionGraph};

/// One abstraction tier: a transition graph over one symbol sequence plus the
/// entropy-driven segmentation of that sequence.
///
/// # Responsibilities
/// - Build the transition graph from the adjacent pairs of a sequence
/// - Capture the entropy snapshot once, after the whole graph is built
/// - Partition the sequence into segments wherever the boundary predicate holds
/// - Expose the sealed segments, joined, as the next tier's sequence
///
/// # Invariants
/// - The snapshot is captured exactly once per level, from the complete
///   transition counts; every boundary decision reads that fixed snapshot
/// - Sealed segments, in order, followed by the open segment, reproduce the
///   input sequence exactly: no symbol duplicated, dropped, or reordered
/// - Once [`process`] returns, the sealed output never changes; the level
///   stays queryable for prediction
///
/// [`process`]: Level::process
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Level {
	/// Transition counts over this tier's symbols.
	graph: TransitionGraph,
	/// Entropies captured after the graph was fully built.
	snapshot: EntropySnapshot,
	/// Sealed segments, in input order.
	segments: Vec<Vec<String>>,
	/// The segment currently being accumulated.
	ongoing: Vec<String>,
}

impl Level {
	/// Creates an empty level.
	pub fn new() -> Self {
		Self {
			graph: TransitionGraph::new(),
			snapshot: EntropySnapshot::default(),
			segments: Vec::new(),
			ongoing: Vec::new(),
		}
	}

	/// Consumes one symbol sequence: builds the graph, captures the entropy
	/// snapshot, then segments the sequence in a single greedy pass.
	///
	/// The two passes are deliberate: boundary decisions must read entropies
	/// of the complete sequence, never counts accumulated so far.
	///
	/// # Notes
	/// - A length-1 sequence yields no pairs: the graph and the sealed list
	///   stay empty and the output is the input, already collapsed.
	///
	/// # Errors
	/// Returns an error on an empty sequence.
	pub fn process(&mut self, data: &[String]) -> Result<(), String> {
		if data.is_empty() {
			return Err("Cannot process an empty sequence".to_owned());
		}

		for pair in data.windows(2) {
			self.graph.step(&pair[0], &pair[1]);
		}
		self.snapshot = EntropySnapshot::capture(&self.graph);

		self.ongoing.push(data[0].clone());
		for pair in data.windows(2) {
			self.segment(&pair[0], &pair[1]);
		}

		Ok(())
	}

	/// Advances the segmentation by one adjacent pair.
	///
	/// Seals the open segment when the boundary predicate fires, then appends
	/// `curr` to the (possibly just-reset) open segment.
	fn segment(&mut self, prev: &str, curr: &str) {
		if self.snapshot.is_boundary(prev, curr) {
			self.segments.push(std::mem::take(&mut self.ongoing));
		}
		self.ongoing.push(curr.to_owned());
	}

	/// The sequence this level hands to the next tier: each sealed segment
	/// joined into one opaque symbol.
	///
	/// When no boundary ever fired the whole input is one unit, so the single
	/// open segment is returned instead. Otherwise the open tail is not
	/// counted; only complete, stable groupings are reported upward.
	pub fn segmented(&self) -> Vec<String> {
		if self.segments.is_empty() {
			vec![self.ongoing.concat()]
		} else {
			self.segments.iter().map(|segment| segment.concat()).collect()
		}
	}

	/// Every symbol observed by this level's graph.
	pub fn symbols(&self) -> &HashSet<String> {
		self.graph.symbols()
	}

	/// Total observed occurrence count of `symbol` as a successor.
	///
	/// 0 for symbols never observed as a successor, such as a unit that only
	/// ever opened the sequence.
	pub fn count(&self, symbol: &str) -> usize {
		self.graph.total_in(symbol)
	}

	/// The level's transition graph.
	pub fn graph(&self) -> &TransitionGraph {
		&self.graph
	}

	/// The entropy snapshot this level's boundaries were decided against.
	pub fn snapshot(&self) -> &EntropySnapshot {
		&self.snapshot
	}

	/// The sealed segments, in input order.
	pub fn segments(&self) -> &[Vec<String>] {
		&self.segments
	}

	/// The open (not yet sealed) trailing segment.
	pub fn ongoing(&self) -> &[String] {
		&self.ongoing
	}
}
