use std::path::PathBuf;

use clap::Parser;

use crate::config::UnparseablePolicy;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Clean healthcare claims (CSV/XLSX) and write a cleaned CSV",
    long_about = None
)]
pub struct CleanArgs {
    /// Path to the claims file (.csv, .tsv, .xlsx, .xlsm, .xls or .ods)
    pub input: PathBuf,
    /// Spreadsheet sheet to read (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Comma-separated date column names to normalize (e.g. 'DOB,DOS,ServiceDate')
    #[arg(long = "date-cols", value_delimiter = ',')]
    pub date_cols: Vec<String>,
    /// Output CSV path (defaults to cleaned_<input>.csv next to the input)
    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,
    /// Input delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<char>,
    /// Character encoding of delimited input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// What to do with date values that match no accepted format
    #[arg(long = "unparseable-dates", value_enum)]
    pub unparseable_dates: Option<UnparseablePolicy>,
    /// Keep surrounding whitespace in text cells
    #[arg(long = "no-trim")]
    pub no_trim: bool,
    /// YAML configuration file; command-line options override its values
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// Also write the cleaning report as JSON to this path
    #[arg(long = "report-json")]
    pub report_json: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<char, String> {
    match value {
        "tab" | "\t" | "\\t" => Ok('\t'),
        "comma" | "," => Ok(','),
        "|" | "pipe" => Ok('|'),
        ";" | "semicolon" => Ok(';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first)
        }
    }
}
