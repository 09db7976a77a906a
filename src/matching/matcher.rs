use std::collections::HashMap;

use tracing::{debug, info};

use crate::filesystem::{ContentHandle, Forest, NodeId};

/// A target file paired with the source file that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPair {
    pub source: NodeId,
    pub target: NodeId,
    /// Content of the source file, taken over into the output archive.
    pub replacement: ContentHandle,
}

/// Result of one matching run, in target submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    pairs: Vec<MatchPair>,
    by_target: HashMap<NodeId, usize>,
}

impl MatchSet {
    fn from_pairs(pairs: Vec<MatchPair>) -> Self {
        let by_target = pairs
            .iter()
            .enumerate()
            .map(|(index, pair)| (pair.target, index))
            .collect();
        Self { pairs, by_target }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchPair> {
        self.pairs.iter()
    }

    pub fn pair_for_target(&self, target: NodeId) -> Option<&MatchPair> {
        self.by_target.get(&target).map(|&index| &self.pairs[index])
    }
}

/// Pairs every target file with the source file of the same name.
///
/// Directory position is ignored, only the file name is compared. When several
/// source files share a name, the first one in submission order is used.
/// Previous annotations on `target` are cleared first, then every matched file
/// and all of its ancestor directories are marked and those directories expanded.
/// `source` is left untouched.
pub fn match_forests(source: &Forest, target: &mut Forest) -> MatchSet {
    let mut lookup: HashMap<&str, NodeId> = HashMap::with_capacity(source.len());
    for (id, entry) in source.entries() {
        lookup.entry(entry.name()).or_insert(id);
    }
    debug!(
        "Indexed {} distinct source names out of {} files",
        lookup.len(),
        source.len()
    );

    target.clear_matches();

    let pairs: Vec<MatchPair> = target
        .entries()
        .filter_map(|(target_id, entry)| {
            let &source_id = lookup.get(entry.name())?;
            let source_entry = source.entry(source_id)?;
            debug!(
                "Matched '{}' with '{}'",
                entry.full_path(),
                source_entry.full_path()
            );
            Some(MatchPair {
                source: source_id,
                target: target_id,
                replacement: source_entry.content().clone(),
            })
        })
        .collect();

    for pair in &pairs {
        target.mark_matched(pair.target);
    }
    target.expand_matched();

    info!("Found {} matching files", pairs.len());
    MatchSet::from_pairs(pairs)
}
