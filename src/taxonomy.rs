//! Taxonomic tree aggregation.
//!
//! Records are folded into a phylum -> species tree where each node counts
//! how many records pass through it. Nodes live in a flat arena and refer to
//! their children by index.

use crate::record::{is_missing, PrimaryRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Taxonomic classification levels, from broadest to narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaxonomicLevel {
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl TaxonomicLevel {
    /// Returns the column name of this level in the primary dataset.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonomicLevel::Phylum => "phylum",
            TaxonomicLevel::Class => "class",
            TaxonomicLevel::Order => "order",
            TaxonomicLevel::Family => "family",
            TaxonomicLevel::Genus => "genus",
            TaxonomicLevel::Species => "species",
        }
    }

    /// Returns the hierarchical depth of this level (phylum = 1).
    pub fn depth(&self) -> usize {
        match self {
            TaxonomicLevel::Phylum => 1,
            TaxonomicLevel::Class => 2,
            TaxonomicLevel::Order => 3,
            TaxonomicLevel::Family => 4,
            TaxonomicLevel::Genus => 5,
            TaxonomicLevel::Species => 6,
        }
    }

    /// Level at a given depth, if any.
    pub fn from_depth(depth: usize) -> Option<TaxonomicLevel> {
        Self::all_levels().get(depth.checked_sub(1)?).copied()
    }

    /// Returns all taxonomic levels in hierarchical order.
    pub fn all_levels() -> &'static [TaxonomicLevel] {
        &[
            TaxonomicLevel::Phylum,
            TaxonomicLevel::Class,
            TaxonomicLevel::Order,
            TaxonomicLevel::Family,
            TaxonomicLevel::Genus,
            TaxonomicLevel::Species,
        ]
    }
}

/// Name recorded for `level` on a record.
pub fn level_value(record: &PrimaryRecord, level: TaxonomicLevel) -> &str {
    let f = &record.fields;
    match level {
        TaxonomicLevel::Phylum => &f.phylum,
        TaxonomicLevel::Class => &f.class,
        TaxonomicLevel::Order => &f.order,
        TaxonomicLevel::Family => &f.family,
        TaxonomicLevel::Genus => &f.genus,
        TaxonomicLevel::Species => &f.species,
    }
}

/// The record's lineage, truncated at the first missing level.
pub fn lineage(record: &PrimaryRecord) -> Vec<(TaxonomicLevel, &str)> {
    TaxonomicLevel::all_levels()
        .iter()
        .map(|&level| (level, level_value(record, level)))
        .take_while(|(_, name)| !is_missing(name))
        .collect()
}

/// Index of a node within a [`TaxonomyTree`].
pub type NodeId = usize;

/// One taxon in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyNode {
    pub name: String,
    /// `None` for the synthetic root.
    pub level: Option<TaxonomicLevel>,
    /// Number of records whose lineage passes through this node.
    pub count: usize,
    /// Child name -> node index, in first-seen order.
    pub children: IndexMap<String, NodeId>,
}

impl TaxonomyNode {
    fn new(name: &str, level: Option<TaxonomicLevel>) -> Self {
        TaxonomyNode {
            name: name.to_string(),
            level,
            count: 0,
            children: IndexMap::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Nested, owned view of a subtree for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyView {
    pub name: String,
    pub level: Option<TaxonomicLevel>,
    pub count: usize,
    pub children: Vec<TaxonomyView>,
}

/// One line of a depth-first walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry<'a> {
    pub depth: usize,
    pub node: NodeId,
    pub level: Option<TaxonomicLevel>,
    pub name: &'a str,
    pub count: usize,
}

/// Arena-backed taxonomy tree. Node 0 is the unnamed root.
///
/// Only [`build_tree`] creates one, so every child index points into `nodes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyTree {
    nodes: Vec<TaxonomyNode>,
}

impl Default for TaxonomyTree {
    fn default() -> Self {
        TaxonomyTree {
            nodes: vec![TaxonomyNode::new("", None)],
        }
    }
}

impl TaxonomyTree {
    pub const ROOT: NodeId = 0;

    pub fn root(&self) -> &TaxonomyNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> Option<&TaxonomyNode> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Child nodes of `id`, in first-seen order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TaxonomyNode> + '_ {
        self.nodes
            .get(id)
            .into_iter()
            .flat_map(|node| node.children.values())
            .map(move |&child| &self.nodes[child])
    }

    /// Follows a path of names from the root, e.g. `["Firmicutes", "Clostridia"]`.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&TaxonomyNode> {
        let mut current = Self::ROOT;
        for name in path {
            current = *self.nodes[current].children.get(name.as_ref())?;
        }
        Some(&self.nodes[current])
    }

    /// Sum of counts over the nodes at `depth` (phylum = 1).
    pub fn total_at_depth(&self, depth: usize) -> usize {
        self.walk()
            .filter(|entry| entry.depth == depth)
            .map(|entry| entry.count)
            .sum()
    }

    fn child_or_insert(&mut self, parent: NodeId, name: &str, level: TaxonomicLevel) -> NodeId {
        if let Some(&existing) = self.nodes[parent].children.get(name) {
            return existing;
        }
        let id = self.nodes.len();
        self.nodes.push(TaxonomyNode::new(name, Some(level)));
        self.nodes[parent].children.insert(name.to_string(), id);
        id
    }

    fn insert_lineage(&mut self, record: &PrimaryRecord) {
        let mut current = Self::ROOT;
        for (level, name) in lineage(record) {
            current = self.child_or_insert(current, name, level);
            self.nodes[current].count += 1;
        }
    }

    /// Depth-first, pre-order walk below the root.
    pub fn walk(&self) -> impl Iterator<Item = WalkEntry<'_>> + '_ {
        let mut stack: Vec<(NodeId, usize)> = self.nodes[Self::ROOT]
            .children
            .values()
            .rev()
            .map(|&id| (id, 1))
            .collect();
        std::iter::from_fn(move || {
            let (id, depth) = stack.pop()?;
            let node = &self.nodes[id];
            stack.extend(node.children.values().rev().map(|&child| (child, depth + 1)));
            Some(WalkEntry {
                depth,
                node: id,
                level: node.level,
                name: &node.name,
                count: node.count,
            })
        })
    }

    /// Owned nested view of the subtree rooted at `id`.
    pub fn view(&self, id: NodeId) -> Option<TaxonomyView> {
        let node = self.nodes.get(id)?;
        Some(TaxonomyView {
            name: node.name.clone(),
            level: node.level,
            count: node.count,
            children: node
                .children
                .values()
                .filter_map(|&child| self.view(child))
                .collect(),
        })
    }
}

/// Builds a fresh taxonomy tree from `records`.
///
/// Each record descends from the root one level at a time, stopping at the
/// first empty or `NA` level; every node it passes through gains one count.
pub fn build_tree(records: &[PrimaryRecord]) -> TaxonomyTree {
    let mut tree = TaxonomyTree::default();
    for record in records {
        tree.insert_lineage(record);
    }
    log::debug!(
        "Built taxonomy tree with {} nodes from {} records.",
        tree.node_count() - 1,
        records.len()
    );
    tree
}

/// Every record whose genus is exactly `genus` (case-sensitive).
pub fn records_for_genus(records: &[PrimaryRecord], genus: &str) -> Vec<PrimaryRecord> {
    records
        .iter()
        .filter(|record| record.fields.genus == genus)
        .cloned()
        .collect()
}

/// Columns shown for each entry of a genus drill-down.
pub const GENUS_SUMMARY_COLUMNS: [&str; 6] =
    ["ID", "species", "TAXid", "Loop", "Length", "OriginalGene"];
