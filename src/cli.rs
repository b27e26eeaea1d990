use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use gus_browse::config::{load_config, BrowseConfig};
use gus_browse::io::{write_matrix, write_projected, write_records, write_tree_json, FileSource};
use gus_browse::taxonomy::GENUS_SUMMARY_COLUMNS;
use gus_browse::{Predicates, Session};
use itertools::Itertools;
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Catalogue snapshot (CSV, optionally .gz/.bz2/.zst)
    #[arg(short, long)]
    pub primary: Option<PathBuf>,

    /// Sample metadata snapshot
    #[arg(short, long)]
    pub metadata: Option<PathBuf>,

    /// Column separator, overriding the config file
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter the catalogue table
    Table {
        /// Column filter as COLUMN=SUBSTRING (repeatable)
        #[arg(short, long, value_parser = parse_predicate)]
        filter: Vec<(String, String)>,

        /// Free-text search across the configured search columns
        #[arg(short, long, default_value = "")]
        search: String,

        /// Output CSV (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Filter samples by metadata and project abundances onto them
    CrossRef {
        /// Metadata filter as COLUMN=SUBSTRING (repeatable)
        #[arg(short, long, value_parser = parse_predicate)]
        filter: Vec<(String, String)>,

        /// Output CSV for the projected rows (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output CSV for the dense heatmap matrix
        #[arg(long)]
        matrix: Option<PathBuf>,
    },

    /// Print the taxonomy tree with counts
    Tree {
        /// Also write the tree as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// List the entries of one genus
    Genus {
        /// Genus name (exact, case-sensitive)
        name: String,
    },

    /// Show pick-list values for the metadata filters
    Suggest,
}

fn parse_predicate(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty column name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn resolve_config(cli: &Cli) -> Result<BrowseConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BrowseConfig::default(),
    };
    if let Some(path) = &cli.primary {
        config.primary_path = Some(path.clone());
    }
    if let Some(path) = &cli.metadata {
        config.metadata_path = Some(path.clone());
    }
    if let Some(delimiter) = cli.delimiter {
        config.delimiter = delimiter;
    }
    Ok(config)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}

/// Writes the summary table of one genus to `out`; the banner goes to stderr.
fn write_genus<W: Write>(session: &Session, name: &str, out: W) -> Result<()> {
    let records = session.genus_records(name);
    eprintln!("Genus: {} ({} entries)", name, records.len());
    write_records(&records, &GENUS_SUMMARY_COLUMNS, out)?;
    Ok(())
}

/// Main entry point for CLI
pub fn run_cli(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let primary = config
        .primary_path
        .clone()
        .ok_or_else(|| anyhow!("No catalogue snapshot given (--primary or config)"))?;
    let metadata = config
        .metadata_path
        .clone()
        .ok_or_else(|| anyhow!("No metadata snapshot given (--metadata or config)"))?;

    let source = FileSource::new(primary, metadata);
    let session = Session::open(&source, config).context("Failed to load snapshots")?;

    match cli.command {
        Commands::Table {
            filter,
            search,
            output,
        } => {
            let predicates: Predicates = filter.into_iter().collect();
            let filtered = session.filter_primary(&predicates);
            let hits = gus_browse::search_records(
                &filtered,
                &session.config().search_columns,
                &search,
            );
            info!(
                "Showing {} of {} results",
                hits.len(),
                session.primary_records().len()
            );
            write_records(&hits, &session.display_columns(), open_output(output.as_deref())?)?;
        }

        Commands::CrossRef {
            filter,
            output,
            matrix,
        } => {
            let predicates: Predicates = filter.into_iter().collect();
            let xref = session.cross_reference(&predicates);
            eprintln!(
                "{} samples matched: {}",
                xref.matched_ids.len(),
                xref.matched_ids.iter().take(10).join(", ")
            );
            write_projected(&xref.rows, open_output(output.as_deref())?)?;
            if let Some(path) = matrix {
                write_matrix(&xref.matrix, open_output(Some(path.as_path()))?)?;
                eprintln!(
                    "Wrote {}x{} matrix to {}",
                    xref.matrix.dimensions().0,
                    xref.matrix.dimensions().1,
                    path.display()
                );
            }
        }

        Commands::Tree { json } => {
            let tree = session.taxonomy();
            let mut out = io::stdout().lock();
            for entry in tree.walk() {
                writeln!(
                    out,
                    "{}{} ({})",
                    "  ".repeat(entry.depth - 1),
                    entry.name,
                    entry.count
                )?;
            }
            if let Some(path) = json {
                write_tree_json(&tree, open_output(Some(path.as_path()))?)?;
            }
        }

        Commands::Genus { name } => {
            write_genus(&session, &name, io::stdout().lock())?;
        }

        Commands::Suggest => {
            for (field, values) in session.suggestions() {
                println!("{}: {}", field, values.iter().join(" | "));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_predicate() {
        assert_eq!(
            parse_predicate("Country=USA").unwrap(),
            ("Country".to_string(), "USA".to_string())
        );
        assert_eq!(
            parse_predicate("Stage=").unwrap(),
            ("Stage".to_string(), String::new())
        );
        assert_eq!(
            parse_predicate("Group=a=b").unwrap(),
            ("Group".to_string(), "a=b".to_string())
        );
        assert!(parse_predicate("Country").is_err());
        assert!(parse_predicate("=USA").is_err());
    }

    #[test]
    fn test_cli_parses_cross_ref() {
        let cli = Cli::try_parse_from([
            "gus-browse",
            "--primary",
            "GUS707.csv",
            "--metadata",
            "metadata1359.csv",
            "cross-ref",
            "-f",
            "Country=USA",
            "-f",
            "Group=CRC",
            "--matrix",
            "heat.csv",
        ])
        .unwrap();

        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.primary_path, Some(PathBuf::from("GUS707.csv")));
        match cli.command {
            Commands::CrossRef { filter, matrix, .. } => {
                assert_eq!(filter.len(), 2);
                assert_eq!(matrix, Some(PathBuf::from("heat.csv")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_genus_output_is_plain_csv() {
        let session = Session::from_text(
            "ID,genus,species,Loop\nG1,Bacteroides,B. fragilis,L1\nG2,Escherichia,E. coli,L2\n",
            "ID,Country\nS1,USA\n",
        );
        let mut out = Vec::new();
        write_genus(&session, "Bacteroides", &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ID,species,TAXid,Loop,Length,OriginalGene"));
        assert_eq!(lines.next(), Some("G1,B. fragilis,,L1,,"));
        assert_eq!(lines.next(), None);
    }
}
