use super::VERSION;
use crate::error::DashboardError;
use crate::plot::ChartSet;
use crate::report::{preview_table, summary_lines, Banner};
use crate::table::RawTable;
use crate::{Dataset, Summary, PREVIEW_ROWS};
use chrono::prelude::*;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// Settings of one dashboard run.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardArgs {
    pub csvin: Option<PathBuf>,
    pub outdir: PathBuf,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub currency: String,
    pub charts: bool,
    pub verbose: bool,
}

/// Everything a run shows, in order.
#[derive(Debug, Clone)]
pub struct DashboardOutput {
    pub banner: Banner,
    pub preview: String,
    pub charts: Vec<PathBuf>,
    pub period: Option<(NaiveDate, NaiveDate)>,
    pub summary: Summary,
}

pub fn command() -> Command {
    let arg_csvin = Arg::new("input_csvfile")
        .help("csv file with Data/Hora, Consumo em kWh and Custo Total columns")
        .short('f')
        .long("csvfile")
        .num_args(1)
        .value_parser(value_parser!(PathBuf));
    let arg_outdir = Arg::new("outdir")
        .help("directory for the svg charts")
        .short('o')
        .long("outdir")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value(".");
    let arg_start = Arg::new("start")
        .help("first day of the summary period, YYYY-MM-DD, defaults to the first day in the data")
        .long("start")
        .num_args(1)
        .value_parser(value_parser!(NaiveDate));
    let arg_end = Arg::new("end")
        .help("last day of the summary period, YYYY-MM-DD, defaults to the last day in the data")
        .long("end")
        .num_args(1)
        .value_parser(value_parser!(NaiveDate));
    let arg_currency = Arg::new("currency")
        .help("currency symbol for the total cost")
        .long("currency")
        .num_args(1)
        .default_value("R$");
    let arg_no_charts = Arg::new("no_charts")
        .help("skip the svg charts, print preview and summary only")
        .long("no-charts")
        .action(ArgAction::SetTrue);
    let arg_verbose = Arg::new("verbose")
        .help("print verbose information")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue);
    Command::new("Energy_dashboard")
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about("cli app to validate, aggregate, and plot residential energy consumption")
        .arg(arg_csvin)
        .arg(arg_outdir)
        .arg(arg_start)
        .arg(arg_end)
        .arg(arg_currency)
        .arg(arg_no_charts)
        .arg(arg_verbose)
}

/// Takes the CLI arguments of the dashboard.
/// Unwrapping get_one is safe where a default is given.
pub fn parse_cli() -> DashboardArgs {
    args_from_matches(&command().get_matches())
}

pub fn args_from_matches(cli_args: &ArgMatches) -> DashboardArgs {
    let csvin = cli_args.get_one::<PathBuf>("input_csvfile").cloned();
    let outdir = cli_args.get_one::<PathBuf>("outdir").unwrap().to_owned();
    let start = cli_args.get_one::<NaiveDate>("start").copied();
    let end = cli_args.get_one::<NaiveDate>("end").copied();
    let currency = cli_args.get_one::<String>("currency").unwrap().to_owned();
    let charts = !cli_args.get_flag("no_charts");
    let verbose = cli_args.get_flag("verbose");
    DashboardArgs {
        csvin,
        outdir,
        start,
        end,
        currency,
        charts,
        verbose,
    }
}

/// Run the dashboard once over the given file:
/// validate, preview, enrich, aggregate, plot, and summarize.
/// Nothing is rendered unless the whole file is valid.
pub fn run(args: &DashboardArgs) -> Result<DashboardOutput, DashboardError> {
    let csvin = match &args.csvin {
        Some(p) => p,
        None => {
            return Ok(DashboardOutput {
                banner: Banner::idle(),
                preview: String::new(),
                charts: Vec::new(),
                period: None,
                summary: Summary::default(),
            })
        }
    };

    tracing::info!(path = %csvin.display(), "> read data");
    let table = RawTable::from_csv(csvin)?;
    table.validate_schema()?;
    let preview = preview_table(&table, PREVIEW_ROWS);

    tracing::info!("> parse timestamps and derive day, hour and category");
    let dataset = Dataset::from_table(&table)?;

    let charts = if args.charts {
        tracing::info!(outdir = %args.outdir.display(), "> aggregate and plot");
        ChartSet::from_dataset(&dataset).render(&args.outdir)?
    } else {
        Vec::new()
    };

    let period = select_period(&dataset, args.start, args.end);
    let summary = match period {
        Some((start, end)) => dataset.summarize(start, end),
        None => Summary::default(),
    };

    Ok(DashboardOutput {
        banner: Banner::validated(),
        preview,
        charts,
        period,
        summary,
    })
}

/// The summary period: explicit dates win, each missing end
/// falls back to the first or last day in the data.
pub fn select_period(
    dataset: &Dataset,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Option<(NaiveDate, NaiveDate)> {
    let observed = dataset.day_range();
    let start = start.or(observed.map(|r| r.0))?;
    let end = end.or(observed.map(|r| r.1))?;
    if start > end {
        tracing::warn!(%start, %end, "start is after end, the period selects nothing");
    }
    Some((start, end))
}

/// Print a run to stdout, in the order of the dashboard.
pub fn print_output(output: &DashboardOutput, currency: &str) {
    println!("{}", output.banner);
    if let Banner::Warning(_) = output.banner {
        return;
    }
    println!("first rows of the file:");
    print!("{}", output.preview);
    for c in output.charts.iter() {
        println!("chart saved to {}", c.display());
    }
    if let Some((start, end)) = output.period {
        println!("period: {} to {}", start, end);
    }
    for line in summary_lines(&output.summary, currency).iter() {
        println!("{}", line);
    }
}
