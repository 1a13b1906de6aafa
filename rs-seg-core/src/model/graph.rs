use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Directed, weighted transition graph over symbols.
///
/// Records how often each symbol is followed by each other symbol, together
/// with the reverse view. Both views are updated together, so the graph is
/// always a consistent pair of adjacency maps over the same multiset of
/// observed ordered pairs.
///
/// # Responsibilities
/// - Accumulate transition counts, forward and backward, via [`step`]
/// - Compute Shannon entropy (base 2) of a node's outgoing/incoming distribution
/// - Provide whole-graph entropy snapshots for segmentation
///
/// # Invariants
/// - For all `a`, `b`: `counts_out[a][b] == counts_in[b][a]`
/// - `totals_out[a]` is the sum of `counts_out[a]`, same for the incoming side
/// - The key set is the union of all symbols ever seen on either side of a step
/// - Counts never decrease; read accessors never create entries
///
/// [`step`]: TransitionGraph::step
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TransitionGraph {
	/// Every symbol seen on either side of a transition.
	keys: HashSet<String>,
	/// Successor counts per symbol. Example: { "a" => { "b" => 3, "a" => 1 } }
	counts_out: HashMap<String, HashMap<String, usize>>,
	/// Predecessor counts per symbol (reverse view of `counts_out`).
	counts_in: HashMap<String, HashMap<String, usize>>,
	/// Total outgoing transitions per symbol.
	totals_out: HashMap<String, usize>,
	/// Total incoming transitions per symbol.
	totals_in: HashMap<String, usize>,
}

impl TransitionGraph {
	/// Creates an empty graph.
	pub fn new() -> Self {
		Self {
			keys: HashSet::new(),
			counts_out: HashMap::new(),
			counts_in: HashMap::new(),
			totals_out: HashMap::new(),
			totals_in: HashMap::new(),
		}
	}

	/// Records one observed transition from `a` to `b`.
	///
	/// Increments `counts_out[a][b]` and `counts_in[b][a]` together, updates
	/// both totals, and registers both symbols in the key set. Purely
	/// additive; there are no error conditions.
	pub fn step(&mut self, a: &str, b: &str) {
		*self
			.counts_out
			.entry(a.to_owned())
			.or_default()
			.entry(b.to_owned())
			.or_insert(0) += 1;
		*self.totals_out.entry(a.to_owned()).or_insert(0) += 1;
		*self
			.counts_in
			.entry(b.to_owned())
			.or_default()
			.entry(a.to_owned())
			.or_insert(0) += 1;
		*self.totals_in.entry(b.to_owned()).or_insert(0) += 1;
		self.keys.insert(a.to_owned());
		self.keys.insert(b.to_owned());
	}

	/// Every symbol seen so far, on either side of a transition.
	pub fn symbols(&self) -> &HashSet<String> {
		&self.keys
	}

	/// Total number of times `symbol` was observed as a successor.
	///
	/// Returns 0 for a symbol with no incoming transitions (including symbols
	/// never seen at all), without creating an entry.
	pub fn total_in(&self, symbol: &str) -> usize {
		self.totals_in.get(symbol).copied().unwrap_or(0)
	}

	/// Total number of outgoing transitions recorded from `symbol`.
	pub fn total_out(&self, symbol: &str) -> usize {
		self.totals_out.get(symbol).copied().unwrap_or(0)
	}

	/// Successor counts for `symbol`, if it has any outgoing transitions.
	pub fn successors(&self, symbol: &str) -> Option<&HashMap<String, usize>> {
		self.counts_out.get(symbol)
	}

	/// Shannon entropy (base 2) of the outgoing distribution of `symbol`.
	///
	/// A symbol with a single successor, or no outgoing entry at all,
	/// yields 0.
	pub fn entropy_out(&self, symbol: &str) -> f64 {
		self.counts_out.get(symbol).map(shannon_entropy).unwrap_or(0.0)
	}

	/// Shannon entropy (base 2) of the incoming distribution of `symbol`.
	pub fn entropy_in(&self, symbol: &str) -> f64 {
		self.counts_in.get(symbol).map(shannon_entropy).unwrap_or(0.0)
	}

	/// Entropy of every node present in the outgoing map, as one snapshot.
	pub fn entropies_out(&self) -> HashMap<String, f64> {
		self.counts_out
			.iter()
			.map(|(symbol, counts)| (symbol.clone(), shannon_entropy(counts)))
			.collect()
	}

	/// Entropy of every node present in the incoming map, as one snapshot.
	pub fn entropies_in(&self) -> HashMap<String, f64> {
		self.counts_in
			.iter()
			.map(|(symbol, counts)| (symbol.clone(), shannon_entropy(counts)))
			.collect()
	}
}

/// Shannon entropy, base 2, of a count distribution normalized to probabilities.
///
/// Depends only on the multiset of counts, never on which successor holds
/// which count. A concentrated (single-bucket) distribution yields 0.
fn shannon_entropy(counts: &HashMap<String, usize>) -> f64 {
	let total: usize = counts.values().sum();
	if total == 0 {
		return 0.0;
	}
	let total = total as f64;
	counts
		.values()
		.filter(|&&count| count > 0)
		.map(|&count| {
			let p = count as f64 / total;
			-p * p.log2()
		})
		.sum()
}

/// Point-in-time entropy values for every node of a [`TransitionGraph`],
/// together with the segmentation boundary predicate.
///
/// A snapshot is captured exactly once per level, after the graph has been
/// fed the entire input sequence. All boundary decisions for that level read
/// this fixed snapshot; entropies are never recomputed mid-stream.
///
/// # Invariants
/// - [`is_boundary`] is a pure function of the snapshot and the two symbols
/// - Symbols absent from a map read as entropy 0
///
/// [`is_boundary`]: EntropySnapshot::is_boundary
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct EntropySnapshot {
	outgoing: HashMap<String, f64>,
	incoming: HashMap<String, f64>,
}

impl EntropySnapshot {
	/// Captures both entropy maps of `graph` at this instant.
	pub fn capture(graph: &TransitionGraph) -> Self {
		Self {
			outgoing: graph.entropies_out(),
			incoming: graph.entropies_in(),
		}
	}

	/// Whether a segment boundary holds between adjacent symbols `a` and `b`.
	///
	/// Fires when the incoming or the outgoing entropy strictly rises from
	/// `a` to `b`, the point where statistical coupling with the previous
	/// symbol breaks. Equal entropies never trigger a boundary.
	pub fn is_boundary(&self, a: &str, b: &str) -> bool {
		let in_a = self.incoming.get(a).copied().unwrap_or(0.0);
		let in_b = self.incoming.get(b).copied().unwrap_or(0.0);
		let out_a = self.outgoing.get(a).copied().unwrap_or(0.0);
		let out_b = self.outgoing.get(b).copied().unwrap_or(0.0);
		in_a < in_b || out_a < out_b
	}
}
