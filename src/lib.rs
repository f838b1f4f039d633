pub mod builder;
pub mod cli;
pub mod config;
pub mod data;
pub mod derive;
pub mod io_utils;
pub mod metadata;
pub mod similarity;
pub mod table;
pub mod workbook;
pub mod xlsx;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    builder::{IdentifierList, RecordTable, TableBuilder},
    cli::{BuildOptions, Cli, Commands, ScanOptions},
    config::ScanConfig,
    derive::parse_derived_columns,
    workbook::Workbook,
    xlsx::FillColors,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("wallet_sim", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Build(args) => {
            let workbook = build_workbook(&args.build)?;
            xlsx::save_workbook(&args.output, &workbook, FillColors::default())
        }
        Commands::Scan(args) => {
            let config = resolve_scan_config(&args.scan)?;
            let mut workbook = xlsx::load_workbook(&args.input)
                .with_context(|| format!("Loading workbook {:?}", args.input))?;
            scan_workbook(&mut workbook, &config, args.scan.print)?;
            let output = args.output.as_deref().unwrap_or(args.input.as_path());
            xlsx::save_workbook(output, &workbook, fill_colors(&config)?)
        }
        Commands::Run(args) => {
            let config = resolve_scan_config(&args.scan)?;
            let mut workbook = build_workbook(&args.build)?;
            scan_workbook(&mut workbook, &config, args.scan.print)?;
            xlsx::save_workbook(&args.output, &workbook, fill_colors(&config)?)
        }
        Commands::InitConfig(args) => {
            ScanConfig::default().save(&args.output)?;
            info!("Default scan configuration written to {:?}", args.output);
            Ok(())
        }
    }
}

fn build_workbook(args: &BuildOptions) -> Result<Workbook> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Loading records from '{}' with delimiter '{}'",
        args.input.display(),
        printable_delimiter(delimiter)
    );
    let records = RecordTable::load(&args.input, delimiter, encoding)
        .with_context(|| format!("Loading records from {:?}", args.input))?;
    let identifiers = IdentifierList::load(&args.wallets, encoding)?;
    info!(
        "Loaded {} record(s) and {} identifier(s)",
        records.rows.len(),
        identifiers.len()
    );

    let mut builder = TableBuilder {
        key_column: args.key_column.clone(),
        rank_column: args.rank_column.clone(),
        sheet_name: args.data_sheet.clone(),
        ..TableBuilder::default()
    };
    if !args.derives.is_empty() {
        builder.derived = parse_derived_columns(&args.derives)?;
    }
    builder.build(&records, &identifiers)
}

/// File values first, then command-line overrides.
pub fn resolve_scan_config(options: &ScanOptions) -> Result<ScanConfig> {
    let mut config = match &options.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    if let Some(sheet) = &options.sheet {
        config.sheet = Some(sheet.clone());
    }
    if let Some(exclude) = &options.exclude {
        config.exclude_column = exclude.clone();
    }
    if let Some(threshold) = options.threshold {
        config.threshold = threshold;
    }
    if let Some(output_sheet) = &options.output_sheet {
        config.output_sheet = output_sheet.clone();
    }
    config.validate()?;
    debug!("Scan configuration: {config:?}");
    Ok(config)
}

fn scan_workbook(workbook: &mut Workbook, config: &ScanConfig, print: bool) -> Result<()> {
    let summary = similarity::scan(workbook, config).context("Scanning for similar rows")?;
    if print {
        if let Some(sheet) = workbook.sheet(&summary.sheet_name) {
            table::print_sheet(&summary.columns, &sheet.rows);
        }
    }
    Ok(())
}

fn fill_colors(config: &ScanConfig) -> Result<FillColors> {
    Ok(FillColors {
        anchor: config.anchor_rgb()?,
        matched: config.match_rgb()?,
    })
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
