use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Builds a Word table from selected Excel rows, laid out like a Word template.
#[derive(Debug, Parser)]
#[command(author, version, bin_name = "exp-table")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// JSON configuration file (sheet, header row, inference tuning).
    #[arg(long = "config", global = true)]
    pub config_path: Option<String>,
}

/// Sheet selection shared by the commands that read the spreadsheet.
#[derive(Debug, Clone, Args)]
pub struct SheetArgs {
    /// Sheet name [default: ESP]
    #[arg(long)]
    pub sheet: Option<String>,

    /// 1-based header row; the row below it is read as a second header line [default: 3]
    #[arg(long = "header-row")]
    pub header_row: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the title, page setup and columns read from a template.
    Inspect(InspectCommand),

    /// List the spreadsheet headers by column letter.
    Headers(HeadersCommand),

    /// Preview the first values of columns A and B below the headers.
    Peek(PeekCommand),

    /// Infer the column mapping, print it and optionally save it for editing.
    Map(MapCommand),

    /// Generate the table document for the selected rows.
    Generate(GenerateCommand),
}

#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Word template (.docx)
    #[arg(long, short = 't')]
    pub template: String,
}

#[derive(Debug, Args)]
pub struct HeadersCommand {
    /// Excel workbook (.xlsx, .xlsm)
    #[arg(long, short = 's')]
    pub spreadsheet: String,

    #[command(flatten)]
    pub sheet: SheetArgs,
}

#[derive(Debug, Args)]
pub struct PeekCommand {
    /// Excel workbook (.xlsx, .xlsm)
    #[arg(long, short = 's')]
    pub spreadsheet: String,

    #[command(flatten)]
    pub sheet: SheetArgs,

    /// Number of values listed before stopping
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct MapCommand {
    /// Word template (.docx)
    #[arg(long, short = 't')]
    pub template: String,

    /// Excel workbook (.xlsx, .xlsm)
    #[arg(long, short = 's')]
    pub spreadsheet: String,

    #[command(flatten)]
    pub sheet: SheetArgs,

    /// Save the mapping as JSON, to edit and pass to `generate --mapping`
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Word template (.docx)
    #[arg(long, short = 't')]
    pub template: String,

    /// Excel workbook (.xlsx, .xlsm)
    #[arg(long, short = 's')]
    pub spreadsheet: String,

    /// Row numbers, e.g. "50, 51" or "10-15"
    #[arg(long, short = 'r', allow_hyphen_values = true)]
    pub rows: String,

    #[command(flatten)]
    pub sheet: SheetArgs,

    /// Edited mapping file written by `map --output`; inferred when absent
    #[arg(long, short = 'm')]
    pub mapping: Option<String>,

    /// Output document [default: Tabla_filas_<rows>.docx next to the workbook]
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}
