//! fdiff - flat-path XML comparison and editing tool

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use xml_flatdiff::{
    flatten_str, parse_file, spawn_compare, write_csv, CompareEvent, CompareRequest, DiffRecord,
    DiffStatus, EditTree, Editor, PrintOptions,
};

/// Flat-path XML comparison and editing tool
#[derive(Parser)]
#[command(name = "fdiff")]
#[command(version)]
#[command(about = "Compare and edit XML configuration documents by canonical path", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two documents and list differing paths
    #[command(visible_alias = "d")]
    Diff {
        /// Left (reference) file
        left: String,
        /// Right (candidate) file
        right: String,

        /// Only list records with this status (added, removed, changed)
        #[arg(short, long)]
        status: Option<DiffStatus>,

        /// Also write the listed records to a CSV file
        #[arg(long)]
        csv: Option<String>,
    },

    /// Print the flat path mapping of a document
    #[command(visible_alias = "f")]
    Flatten {
        /// Input file
        file: String,
    },

    /// Apply edits to a document and write the result
    #[command(visible_alias = "e")]
    Edit {
        /// Input file
        file: String,
        /// Output file (default: stdout)
        output: Option<String>,

        /// Set the direct text of a node (ID=VALUE)
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(String, String)>,

        /// Rename a node (ID=NAME)
        #[arg(long = "rename", value_parser = parse_assignment)]
        renames: Vec<(String, String)>,

        /// Duplicate a node in place
        #[arg(long = "duplicate")]
        duplicates: Vec<String>,

        /// Delete a node and its subtree
        #[arg(long = "delete")]
        deletes: Vec<String>,

        /// Indent the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let result = match cli.command {
        Commands::Diff {
            left,
            right,
            status,
            csv,
        } => run_diff(&left, &right, status, csv.as_deref()),
        Commands::Flatten { file } => run_flatten(&file),
        Commands::Edit {
            file,
            output,
            values,
            renames,
            duplicates,
            deletes,
            pretty,
        } => {
            let edits = EditArgs {
                values,
                renames,
                duplicates,
                deletes,
            };
            let ordered = match matches.subcommand_matches("edit") {
                Some(edit_matches) => edits.in_command_line_order(edit_matches),
                None => Vec::new(),
            };
            run_edit(&file, output.as_deref(), ordered, pretty)
        }
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((id, value)) if !id.is_empty() => Ok((id.to_string(), value.to_string())),
        _ => Err(format!("expected ID=VALUE, got '{}'", s)),
    }
}

/// Runs a comparison on a worker thread and prints the differences.
fn run_diff(
    left_path: &str,
    right_path: &str,
    status: Option<DiffStatus>,
    csv_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(left = left_path, right = right_path, "comparing");
    let request = CompareRequest::new(fs::read_to_string(left_path)?, fs::read_to_string(right_path)?);

    let mut report = None;
    for event in spawn_compare(request)? {
        match event {
            CompareEvent::Progress(p) => debug!(phase = %p.phase, percent = p.percent, "{}", p.message),
            CompareEvent::Completed(r) => report = Some(r),
            CompareEvent::Failed(failure) => return Err(failure.into()),
        }
    }
    let report = report.ok_or("comparison ended without a result")?;

    let records: Vec<&DiffRecord> = match status {
        Some(status) => report.filtered(status).collect(),
        None => report.differences.iter().collect(),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for record in &records {
        writeln!(
            out,
            "{:<8} {}  {} -> {}",
            record.status(),
            record.key,
            record.left_value().unwrap_or("-"),
            record.right_value().unwrap_or("-")
        )?;
    }
    out.flush()?;

    if let Some(path) = csv_path {
        let mut file = BufWriter::new(File::create(path)?);
        write_csv(&mut file, records.iter().copied())?;
        info!(path, rows = records.len(), "wrote csv");
    }

    eprintln!(
        "{} added, {} removed, {} changed",
        report.stats.added, report.stats.removed, report.stats.changed
    );
    Ok(())
}

/// Prints `key = value` lines in sorted key order.
fn run_flatten(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let xml = fs::read_to_string(path)?;
    let mapping = flatten_str(&xml, &mut |percent: u8| debug!(percent, "flattening"))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (key, value) in mapping.sorted() {
        writeln!(out, "{} = {}", key, value)?;
    }
    out.flush()?;
    Ok(())
}

struct EditArgs {
    values: Vec<(String, String)>,
    renames: Vec<(String, String)>,
    duplicates: Vec<String>,
    deletes: Vec<String>,
}

/// One edit requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EditOp {
    SetValue { id: String, value: String },
    Rename { id: String, name: String },
    Duplicate { id: String },
    Delete { id: String },
}

impl EditArgs {
    /// Merges the per-flag lists back into the order the flags were given.
    fn in_command_line_order(self, matches: &ArgMatches) -> Vec<EditOp> {
        let position = |arg: &str| -> Vec<usize> {
            matches
                .indices_of(arg)
                .map(|indices| indices.collect())
                .unwrap_or_default()
        };

        let mut ops: Vec<(usize, EditOp)> = Vec::new();
        ops.extend(
            position("values")
                .into_iter()
                .zip(self.values)
                .map(|(i, (id, value))| (i, EditOp::SetValue { id, value })),
        );
        ops.extend(
            position("renames")
                .into_iter()
                .zip(self.renames)
                .map(|(i, (id, name))| (i, EditOp::Rename { id, name })),
        );
        ops.extend(
            position("duplicates")
                .into_iter()
                .zip(self.duplicates)
                .map(|(i, id)| (i, EditOp::Duplicate { id })),
        );
        ops.extend(
            position("deletes")
                .into_iter()
                .zip(self.deletes)
                .map(|(i, id)| (i, EditOp::Delete { id })),
        );
        ops.sort_by_key(|(i, _)| *i);
        ops.into_iter().map(|(_, op)| op).collect()
    }
}

/// Applies edits in order and writes the resulting document.
///
/// Each edit sees the tree produced by the previous one, so IDs given after
/// a structural edit or a rename refer to the renumbered tree.
fn run_edit(
    path: &str,
    output_path: Option<&str>,
    edits: Vec<EditOp>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = parse_file(path)?;
    let mut editor = Editor::new(EditTree::from_document(&document));

    for op in &edits {
        debug!(?op, "applying edit");
        editor.apply(|tree| match op {
            EditOp::SetValue { id, value } => tree.set_value(id, value),
            EditOp::Rename { id, name } => tree.rename(id, name),
            EditOp::Duplicate { id } => tree.duplicate(id),
            EditOp::Delete { id } => tree.delete(id),
        })?;
    }
    info!(edits = edits.len(), "edits applied");

    let options = PrintOptions {
        pretty,
        ..PrintOptions::default()
    };
    let xml = editor.tree().to_xml(&options)?;

    let mut output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    output.write_all(xml.as_bytes())?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edits(args: &[&str]) -> Vec<EditOp> {
        let matches = Cli::command().get_matches_from(args);
        let Commands::Edit {
            values,
            renames,
            duplicates,
            deletes,
            ..
        } = Cli::from_arg_matches(&matches).unwrap().command
        else {
            panic!("expected edit command");
        };
        let edit_args = EditArgs {
            values,
            renames,
            duplicates,
            deletes,
        };
        edit_args.in_command_line_order(matches.subcommand_matches("edit").unwrap())
    }

    #[test]
    fn test_edits_keep_command_line_order() {
        let ops = edits(&[
            "fdiff",
            "edit",
            "in.xml",
            "--delete",
            "a[1].b[1]",
            "--set",
            "a[1].b[1]=7",
            "--rename",
            "a[1].c[1]=b",
            "--delete",
            "a[1].b[2]",
            "--duplicate",
            "a[1].b[1]",
        ]);
        assert_eq!(
            ops,
            vec![
                EditOp::Delete {
                    id: "a[1].b[1]".to_string()
                },
                EditOp::SetValue {
                    id: "a[1].b[1]".to_string(),
                    value: "7".to_string()
                },
                EditOp::Rename {
                    id: "a[1].c[1]".to_string(),
                    name: "b".to_string()
                },
                EditOp::Delete {
                    id: "a[1].b[2]".to_string()
                },
                EditOp::Duplicate {
                    id: "a[1].b[1]".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_assignment_parsing() {
        assert_eq!(
            parse_assignment("a[1]/x=1=2"),
            Ok(("a[1]/x".to_string(), "1=2".to_string()))
        );
        assert!(parse_assignment("=v").is_err());
        assert!(parse_assignment("novalue").is_err());
    }
}
