//! Query engine behind the GUS dataset browser.
//!
//! Loads the beta-glucuronidase catalogue and its sample metadata from
//! delimited-text snapshots and answers the browse views' queries:
//! 1. Column filtering and free-text search over either dataset.
//! 2. Filtering samples by metadata and projecting the catalogue onto the
//!    matching abundance columns.
//! 3. Turning that projection into a dense heatmap matrix.
//! 4. Aggregating the catalogue into a phylum -> species tree.

pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod loader;
pub mod matrix;
pub mod metadata;
pub mod projection;
pub mod record;
pub mod session;
pub mod taxonomy;

pub use error::BrowseError;
pub use filter::{apply_filters, search_records, Predicates};
pub use matrix::{to_matrix, ProjectedMatrix};
pub use metadata::MetadataIndex;
pub use projection::{project, ProjectedRow};
pub use record::{FieldAccess, MetadataRecord, PrimaryRecord};
pub use session::{CrossReference, Session};
pub use taxonomy::{build_tree, records_for_genus, TaxonomicLevel, TaxonomyTree};
