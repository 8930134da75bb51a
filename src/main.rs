mod args;

use anyhow::{Context, Result};
use args::{Cli, Command, GenerateCommand, HeadersCommand, MapCommand, PeekCommand, SheetArgs};
use clap::Parser;
use exp_table::config::Config;
use exp_table::generator;
use exp_table::generator::GenerateRequest;
use exp_table::mapping;
use exp_table::spreadsheet::headers::peek_rows;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load(cli.global.config_path.as_deref())?;

    match cli.command {
        Command::Inspect(command) => handle_inspect(&command.template),
        Command::Headers(command) => handle_headers(&config, command),
        Command::Peek(command) => handle_peek(&config, command),
        Command::Map(command) => handle_map(&config, command),
        Command::Generate(command) => handle_generate(&config, command),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Command-line sheet flags take precedence over the configuration file.
fn with_sheet(config: &Config, sheet: SheetArgs) -> Config {
    let mut config = config.clone();
    if let Some(name) = sheet.sheet {
        config.sheet = name;
    }
    if let Some(row) = sheet.header_row {
        config.header_row = row;
    }
    config
}

fn handle_inspect(template: &str) -> Result<()> {
    let template = generator::load_template(template)?;
    let page = &template.page;
    println!("Title: {}", template.title);
    println!(
        "Page: {} x {} twips, {}, margins L{} R{} T{} B{}",
        page.width,
        page.height,
        if page.landscape { "landscape" } else { "portrait" },
        page.left_margin,
        page.right_margin,
        page.top_margin,
        page.bottom_margin,
    );
    for (index, column) in template.columns.iter().enumerate() {
        println!(
            "  {}. {} (width {}, {:?}{})",
            index + 1,
            column.header.replace('\n', " "),
            column.width,
            column.alignment,
            if column.bold { ", bold" } else { "" },
        );
    }
    Ok(())
}

fn handle_headers(config: &Config, command: HeadersCommand) -> Result<()> {
    let config = with_sheet(config, command.sheet);
    let headers = generator::load_headers(&command.spreadsheet, &config)?;
    if headers.is_empty() {
        println!("No headers found in sheet '{}' row {}", config.sheet, config.header_row);
    }
    for (letter, header) in headers.iter() {
        println!("{letter}: {header}");
    }
    Ok(())
}

fn handle_peek(config: &Config, command: PeekCommand) -> Result<()> {
    let config = with_sheet(config, command.sheet);
    let sheet = generator::load_sheet(&command.spreadsheet, &config.sheet)?;
    println!("Sheet: {}", sheet.name());
    for line in peek_rows(&sheet, config.header_row, command.limit) {
        println!("  {line}");
    }
    Ok(())
}

fn handle_map(config: &Config, command: MapCommand) -> Result<()> {
    let config = with_sheet(config, command.sheet);
    let mapping = generator::infer(&command.template, &command.spreadsheet, &config)?;
    for column in &mapping {
        let format = match column.format {
            Some(mapping::ValueFormat::ShortDate) => " [short-date]",
            None => "",
        };
        println!("{} -> {}{}", column.header.replace('\n', " "), column.source, format);
    }
    if let Some(output) = command.output {
        mapping::save_mapping(&output, &mapping)
            .with_context(|| format!("Could not save the mapping to '{output}'"))?;
        println!("Mapping saved to {output}");
    }
    Ok(())
}

fn handle_generate(config: &Config, command: GenerateCommand) -> Result<()> {
    let config = with_sheet(config, command.sheet);
    let mapping = match command.mapping.as_deref() {
        Some(path) => Some(
            mapping::load_mapping(path).with_context(|| format!("Could not read the mapping '{path}'"))?,
        ),
        None => None,
    };
    let request = GenerateRequest {
        template: command.template,
        spreadsheet: command.spreadsheet,
        rows: command.rows,
        output: command.output,
        mapping,
    };
    let report = generator::generate(&request, &config)?;
    println!(
        "Generated {} with {} rows and {} columns",
        report.output.display(),
        report.records,
        report.columns.len(),
    );
    Ok(())
}
