//! Command line definition and dispatch

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use enrollment::{list_form_fields, read_data_file, FormFiller, Layout, FIELD_DELIMITER};
use pdf_core::FieldMap;
use std::io::Write;
use std::path::PathBuf;

/// Printed by `list-fields` when the template reports no field
pub const NO_FIELDS_MESSAGE: &str = "No form fields detected.";

#[derive(Parser, Debug)]
#[command(
    name = "formfill",
    version,
    about = "Fill and inspect PDF AcroForm templates",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List form field names and current values
    ListFields {
        /// Path to template PDF
        template: PathBuf,
    },
    /// Fill a PDF template from a tab-delimited string
    Fill(FillArgs),
}

#[derive(Args, Debug)]
pub struct FillArgs {
    /// Path to template PDF
    pub template: PathBuf,

    /// Path to save the filled PDF
    pub output: PathBuf,

    #[command(flatten)]
    pub source: DataSource,

    /// Layout JSON replacing the built-in enrollment column and field tables
    #[arg(long, env = "FORMFILL_LAYOUT", value_name = "PATH")]
    pub layout: Option<PathBuf>,
}

/// Exactly one of the two record sources
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct DataSource {
    /// Tab-delimited input string
    #[arg(long, value_name = "STRING", allow_hyphen_values = true)]
    pub data: Option<String>,

    /// Path to a text file containing the tab-delimited string
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,
}

impl DataSource {
    /// The raw record, read from the file when one was given
    pub fn load(&self) -> anyhow::Result<String> {
        match (&self.data, &self.data_file) {
            (Some(data), _) => Ok(data.clone()),
            (None, Some(path)) => Ok(read_data_file(path)?),
            (None, None) => anyhow::bail!("Provide --data or --data-file for fill command"),
        }
    }
}

/// Log level for a `-v` count
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Run a parsed command line, writing user output to `out`
pub fn run<W: Write>(cli: Cli, out: &mut W) -> anyhow::Result<()> {
    match cli.command {
        Command::ListFields { template } => {
            let fields = list_form_fields(&template)
                .with_context(|| format!("Cannot list fields of {}", template.display()))?;
            print_fields(&fields, out)?;
        }
        Command::Fill(args) => {
            let layout = match &args.layout {
                Some(path) => Layout::from_path(path)?,
                None => Layout::default(),
            };
            let raw = args.source.load()?;
            log::debug!("Record has {} column(s)", raw.split(FIELD_DELIMITER).count());

            let report = FormFiller::new(layout)
                .fill(&raw, &args.template, &args.output)
                .with_context(|| format!("Cannot fill {}", args.template.display()))?;
            if !report.need_appearances {
                log::warn!("Viewers may show stale field appearances");
            }
            writeln!(out, "Created filled PDF: {}", report.output.display())?;
        }
    }
    Ok(())
}

/// One `name<TAB>value` line per field
pub fn print_fields<W: Write>(fields: &FieldMap, out: &mut W) -> std::io::Result<()> {
    if fields.is_empty() {
        return writeln!(out, "{NO_FIELDS_MESSAGE}");
    }
    for (name, value) in fields {
        writeln!(out, "{name}\t{value}")?;
    }
    Ok(())
}
