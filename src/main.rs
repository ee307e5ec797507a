use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};

use tableq::config::{default_config_path, AppConfig, TableConfig};
use tableq::infra::export::csv::CsvExporter;
use tableq::infra::export::json::JsonExporter;
use tableq::infra::notify::log::TracingNotifier;
use tableq::usecase::ports::exporter::{ExportFormat, Exporter};
use tableq::usecase::ports::notifier::Notifier;
use tableq::usecase::services::export_service::{default_export_file_name, ExportService};
use tableq::usecase::services::import_service::ImportService;
use tableq::usecase::services::query_service::QueryService;
use tableq::{FilterValue, Record, SortDirection, SortSpec, TableState, Value};

#[derive(Parser)]
#[command(name = "tableq", about = "Search, filter, sort and page through console tables")]
struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long, env = "TABLEQ_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one page of a table.
    Query(QueryArgs),

    /// Export every matching record, ignoring the page.
    Export {
        #[command(flatten)]
        query: QueryArgs,

        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Output file; defaults to `<table>_<YYYYMMDD>.<ext>`. Use `-` for stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Count records per value of a field.
    Summary {
        #[arg(long)]
        table: String,

        #[arg(long)]
        field: String,
    },
}

#[derive(Args)]
struct QueryArgs {
    #[arg(long)]
    table: String,

    #[arg(long, default_value = "")]
    search: String,

    /// `field=value`; `field=all` clears the constraint. Repeatable.
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// `field`, `field:asc` or `field:desc`.
    #[arg(long, value_parser = parse_sort)]
    sort: Option<SortSpec>,

    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Overrides the table's configured page size.
    #[arg(long)]
    page_size: Option<usize>,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got {raw}"))?;
    if field.trim().is_empty() {
        return Err(format!("filter field is empty: {raw}"));
    }
    Ok((field.trim().to_string(), value.to_string()))
}

fn parse_sort(raw: &str) -> Result<SortSpec, String> {
    let (field, direction) = match raw.split_once(':') {
        Some((field, direction)) => (field, direction.parse::<SortDirection>()?),
        None => (raw, SortDirection::Ascending),
    };
    if field.trim().is_empty() {
        return Err(format!("sort field is empty: {raw}"));
    }
    Ok(SortSpec {
        field: field.trim().to_string(),
        direction,
    })
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("failed to load config: {}", config_path.display()))?;
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

    match cli.command {
        Command::Query(args) => run_query(&config, &args, notifier),
        Command::Export { query, format, out } => {
            run_export(&config, &query, format, out, notifier)
        }
        Command::Summary { table, field } => run_summary(&config, &table, &field, notifier),
    }
}

fn find_table<'a>(config: &'a AppConfig, name: &str) -> Result<&'a TableConfig> {
    config
        .table(name)
        .ok_or_else(|| anyhow!("unknown table: {name}"))
}

fn load_records(table: &TableConfig, notifier: Arc<dyn Notifier>) -> Result<Vec<Record>> {
    let import = ImportService::new(table.provider()?, notifier);
    import
        .load()
        .with_context(|| format!("failed to load table: {}", table.name))
}

fn build_state(table: &TableConfig, records: Vec<Record>, args: &QueryArgs) -> TableState<Record> {
    let mut state = TableState::new(records, args.page_size.unwrap_or(table.page_size));
    state.set_search(args.search.as_str());
    for (field, raw) in &args.filters {
        let value = if table.is_numeric(field) && raw != tableq::domain::entities::query::ALL_SENTINEL
        {
            FilterValue::Exact(Value::parse_number(raw))
        } else {
            FilterValue::parse(raw)
        };
        state.set_filter(field.as_str(), value);
    }
    state.set_sort(args.sort.clone());
    state.set_page(args.page);
    state
}

fn run_query(config: &AppConfig, args: &QueryArgs, notifier: Arc<dyn Notifier>) -> Result<()> {
    let table = find_table(config, &args.table)?;
    let records = load_records(table, notifier)?;
    let state = build_state(table, records, args);
    let columns = table.export_columns(state.records());

    let query = QueryService::new(table.engine());
    let result = query.view(&state)?;

    let headers: Vec<String> = columns.iter().map(|column| column.header.clone()).collect();
    let rows: Vec<Vec<String>> = result
        .visible
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| {
                    record
                        .get(&column.field)
                        .map(ToString::to_string)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_table(&mut out, &headers, &rows)?;
    writeln!(out, "{result}")?;
    writeln!(out, "Page {} of {}", result.page, result.total_pages)?;
    Ok(())
}

fn write_table(out: &mut dyn Write, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    writeln!(out, "{}", render(headers).trim_end())?;
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    writeln!(out, "{}", rule.join("  "))?;
    for row in rows {
        writeln!(out, "{}", render(row).trim_end())?;
    }
    Ok(())
}

fn run_export(
    config: &AppConfig,
    args: &QueryArgs,
    format: ExportFormat,
    out: Option<PathBuf>,
    notifier: Arc<dyn Notifier>,
) -> Result<()> {
    let table = find_table(config, &args.table)?;
    let records = load_records(table, notifier.clone())?;
    let state = build_state(table, records, args);
    let columns = table.export_columns(state.records());

    let exporter: Box<dyn Exporter> = match format {
        ExportFormat::Csv => Box::new(CsvExporter),
        ExportFormat::Json => Box::new(JsonExporter),
    };
    let service = ExportService::new(table.engine(), notifier);

    let out_path = out.unwrap_or_else(|| {
        PathBuf::from(default_export_file_name(
            &table.name,
            format,
            Local::now().date_naive(),
        ))
    });

    if out_path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        service.export(&state, exporter.as_ref(), &columns, &mut writer)?;
        return Ok(());
    }

    let file = File::create(&out_path)
        .with_context(|| format!("failed to create export file: {}", out_path.display()))?;
    let mut writer = BufWriter::new(file);
    let count = service.export(&state, exporter.as_ref(), &columns, &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("failed to write export file: {}", out_path.display()))?;
    eprintln!("wrote {count} records to {}", out_path.display());
    Ok(())
}

fn run_summary(
    config: &AppConfig,
    name: &str,
    field: &str,
    notifier: Arc<dyn Notifier>,
) -> Result<()> {
    let table = find_table(config, name)?;
    let records = load_records(table, notifier)?;
    let state = TableState::new(records, table.page_size);
    let counts = QueryService::new(table.engine()).summary(&state, field);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (value, count) in &counts {
        writeln!(out, "{value}: {count}")?;
    }
    writeln!(out, "Total: {}", state.records().len())?;
    Ok(())
}
