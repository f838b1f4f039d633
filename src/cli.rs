use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Rank wallet records and flag near-duplicate rows",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the ranked wallet workbook from a record CSV and an identifier list
    Build(BuildArgs),
    /// Scan a workbook for near-duplicate rows and append a highlighted sheet
    Scan(ScanArgs),
    /// Build the workbook, scan it, and save it once
    Run(RunArgs),
    /// Write the default scan configuration as YAML
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Clone, Args)]
pub struct BuildOptions {
    /// Record CSV file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Newline-delimited wallet identifiers defining row order
    #[arg(short = 'w', long = "wallets")]
    pub wallets: PathBuf,
    /// Column holding the wallet identifier in the record CSV
    #[arg(long = "key-column", default_value = "ua")]
    pub key_column: String,
    /// Name of the synthesized 1-based rank column
    #[arg(long = "rank-column", default_value = "wallet_number")]
    pub rank_column: String,
    /// Derived columns as `name=expression` (defaults to `atad=dwm/lzd` and `average=amt/tc`)
    #[arg(long = "derive", action = clap::ArgAction::Append)]
    pub derives: Vec<String>,
    /// Name of the wallet sheet
    #[arg(long = "data-sheet", default_value = "Sheet")]
    pub data_sheet: String,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the record and wallet files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ScanOptions {
    /// YAML scan configuration; flags below override its values
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Sheet to scan (defaults to the first sheet)
    #[arg(long = "sheet")]
    pub sheet: Option<String>,
    /// Column dropped before comparison
    #[arg(long = "exclude")]
    pub exclude: Option<String>,
    /// Minimum number of exactly equal fields for two rows to be grouped
    #[arg(long = "threshold")]
    pub threshold: Option<usize>,
    /// Name of the appended similarity sheet
    #[arg(long = "output-sheet")]
    pub output_sheet: Option<String>,
    /// Print the similarity groups as a table on stdout
    #[arg(long = "print")]
    pub print: bool,
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub build: BuildOptions,
    /// Destination workbook (.xlsx)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Workbook to scan
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination workbook (the input is rewritten when omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub scan: ScanOptions,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub build: BuildOptions,
    #[command(flatten)]
    pub scan: ScanOptions,
    /// Destination workbook (.xlsx)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Destination YAML file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
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
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_delimiter_accepts_names_and_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("pipe"), Ok(b'|'));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
    }

    #[test]
    fn run_accepts_build_and_scan_flags() {
        let cli = Cli::try_parse_from([
            "wallet-sim",
            "run",
            "-i",
            "lz.csv",
            "-w",
            "wallets.txt",
            "-o",
            "out.xlsx",
            "--threshold",
            "5",
            "--print",
        ])
        .expect("parse run");
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.build.key_column, "ua");
                assert_eq!(args.scan.threshold, Some(5));
                assert!(args.scan.print);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
