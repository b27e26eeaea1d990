//! A browsing session over one pair of loaded snapshots.
//!
//! Both snapshots are fetched exactly once when the session is opened and
//! then reused by every query. Queries never mutate the cached records;
//! each returns a freshly derived collection.

use crate::config::BrowseConfig;
use crate::error::Result;
use crate::filter::{apply_filters, matched_ids, search_records, Predicates};
use crate::io::source::{SnapshotKind, SnapshotSource};
use crate::loader::{parse_delimited, LoadedTable};
use crate::matrix::{to_matrix, ProjectedMatrix};
use crate::metadata::MetadataIndex;
use crate::projection::{project, ProjectedRow};
use crate::record::{MetadataRecord, PrimaryRecord};
use crate::taxonomy::{build_tree, records_for_genus, TaxonomyTree};
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Result of filtering samples and projecting the primary dataset onto them.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossReference {
    /// Sample identifiers that passed the metadata filter, in snapshot order.
    pub matched_ids: Vec<String>,
    pub rows: Vec<ProjectedRow>,
    pub matrix: ProjectedMatrix,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: BrowseConfig,
    primary: LoadedTable<PrimaryRecord>,
    metadata: MetadataIndex,
}

impl Session {
    /// Fetches and parses both snapshots from `source`.
    pub fn open<S: SnapshotSource + ?Sized>(source: &S, config: BrowseConfig) -> Result<Self> {
        let delimiter = config.delimiter_byte()?;

        let primary_text = source.fetch(SnapshotKind::Primary)?;
        let primary = parse_delimited(&primary_text, delimiter);
        if primary.is_empty() {
            warn!("Primary snapshot contains no records.");
        }

        let metadata_text = source.fetch(SnapshotKind::Metadata)?;
        let metadata = MetadataIndex::from_text(&metadata_text, delimiter);
        if metadata.is_empty() {
            warn!("Metadata snapshot contains no records.");
        }

        Ok(Self::assemble(config, primary, metadata))
    }

    /// Opens a session over in-memory comma-separated snapshot text with
    /// default settings.
    pub fn from_text(primary: &str, metadata: &str) -> Self {
        Self::assemble(
            BrowseConfig::default(),
            parse_delimited(primary, b','),
            MetadataIndex::from_text(metadata, b','),
        )
    }

    fn assemble(
        config: BrowseConfig,
        primary: LoadedTable<PrimaryRecord>,
        metadata: MetadataIndex,
    ) -> Self {
        info!(
            "Session ready: {} records, {} samples.",
            primary.records.len(),
            metadata.sample_count()
        );
        Session {
            config,
            primary,
            metadata,
        }
    }

    pub fn config(&self) -> &BrowseConfig {
        &self.config
    }

    pub fn primary_records(&self) -> &[PrimaryRecord] {
        &self.primary.records
    }

    /// Primary columns in display order (ID first).
    pub fn display_columns(&self) -> Vec<String> {
        self.primary.display_columns()
    }

    pub fn metadata(&self) -> &MetadataIndex {
        &self.metadata
    }

    /// Filters the primary dataset by per-column predicates.
    pub fn filter_primary(&self, predicates: &Predicates) -> Vec<PrimaryRecord> {
        apply_filters(&self.primary.records, predicates)
    }

    /// Free-text search over the configured search columns.
    pub fn search_primary(&self, term: &str) -> Vec<PrimaryRecord> {
        search_records(&self.primary.records, &self.config.search_columns, term)
    }

    /// Filters the sample metadata by per-column predicates.
    pub fn filter_metadata(&self, predicates: &Predicates) -> Vec<MetadataRecord> {
        apply_filters(self.metadata.records(), predicates)
    }

    /// Filters samples, then projects the primary dataset onto the matches.
    pub fn cross_reference(&self, predicates: &Predicates) -> CrossReference {
        let samples = self.filter_metadata(predicates);
        let ids = matched_ids(&samples);
        let rows = project(&self.primary.records, &ids);
        let matrix = to_matrix(&rows);
        info!(
            "{} samples matched; {} records carry abundance for them.",
            ids.len(),
            rows.len()
        );
        CrossReference {
            matched_ids: ids,
            rows,
            matrix,
        }
    }

    /// Taxonomy tree over the whole primary dataset.
    pub fn taxonomy(&self) -> TaxonomyTree {
        build_tree(&self.primary.records)
    }

    /// Records of one genus, for drill-down tables.
    pub fn genus_records(&self, genus: &str) -> Vec<PrimaryRecord> {
        records_for_genus(&self.primary.records, genus)
    }

    /// Sorted pick-list values for the configured suggestion fields.
    pub fn suggestions(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.metadata.distinct_values(&self.config.suggestion_fields)
    }
}
