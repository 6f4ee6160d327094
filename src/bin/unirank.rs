use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use unirank::models::RankingSystem;
use unirank::view::{Content, Table};
use unirank::viz::FileChartBackend;
use unirank::{Client, Dashboard, Settings, storage};

#[derive(Parser, Debug)]
#[command(
    name = "unirank",
    version,
    about = "Browse, search, compare & chart university rankings (ARWU, QS, THE)"
)]
struct Cli {
    /// Ranking backend root URL (overrides config and UNIRANK_BASE_URL).
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Settings file (TOML). Defaults to the platform config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the years the backend has rankings for, newest first.
    Years,
    /// Print a year's rankings (and optionally save them).
    Rankings(RankingsArgs),
    /// Search universities by keyword in one year.
    Search(SearchArgs),
    /// Compare two to five universities side by side.
    Compare(CompareArgs),
    /// Show a university's rank across years.
    Trend(TrendArgs),
}

#[derive(Args, Debug)]
struct RankingsArgs {
    /// Year (defaults to the newest available).
    #[arg(short, long)]
    year: Option<i32>,
    /// Only this system (ARWU, QS or THE).
    #[arg(short, long)]
    system: Option<RankingSystem>,
    /// Print at most this many rows per system.
    #[arg(short, long)]
    limit: Option<usize>,
    /// Save all rows to file (.json for JSON, CSV otherwise).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SearchArgs {
    query: String,
    #[arg(short, long)]
    year: Option<i32>,
}

#[derive(Args, Debug)]
struct CompareArgs {
    #[arg(required = true, num_args = 1..=5)]
    universities: Vec<String>,
    #[arg(short, long)]
    year: Option<i32>,
}

#[derive(Args, Debug)]
struct TrendArgs {
    university: String,
    /// Create a chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Width of the plot (defaults to the configured chart width).
    #[arg(long)]
    width: Option<u32>,
    /// Height of the plot (defaults to the configured chart height).
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(url) = cli.base_url {
        settings.base_url = url.trim().trim_end_matches('/').to_string();
    }
    let client = Client::new(&settings);

    let backend = match &cli.cmd {
        Command::Trend(args) => FileChartBackend {
            path: args.plot.clone(),
            width: args.width.unwrap_or(settings.chart_width),
            height: args.height.unwrap_or(settings.chart_height),
        },
        _ => FileChartBackend {
            path: None,
            width: settings.chart_width,
            height: settings.chart_height,
        },
    };
    let mut dash = Dashboard::new(settings, backend);

    match cli.cmd {
        Command::Years => {
            start(&mut dash, &client, None)?;
            for y in dash.state().years() {
                println!("{y}");
            }
        }
        Command::Rankings(args) => cmd_rankings(&mut dash, &client, args)?,
        Command::Search(args) => {
            start(&mut dash, &client, args.year)?;
            dash.search.input = args.query;
            let req = dash.submit_search();
            dash.run(&client, req);
            check_notice(&mut dash)?;
            if let Some(content) = dash.search.panel.content() {
                print_content(content);
            }
        }
        Command::Compare(args) => {
            start(&mut dash, &client, args.year)?;
            dash.set_compare_count(args.universities.len());
            for (slot, name) in dash.compare.inputs.iter_mut().zip(args.universities) {
                *slot = name;
            }
            let req = dash.submit_compare();
            dash.run(&client, req);
            check_notice(&mut dash)?;
            if let Some(content) = dash.compare.panel.content() {
                print_content(content);
            }
        }
        Command::Trend(args) => {
            dash.trend.input = args.university;
            let req = dash.submit_trend();
            dash.run(&client, req);
            check_notice(&mut dash)?;
            if let Some(content) = dash.trend.panel.content() {
                print_content(content);
            }
            if let Some(Some(path)) = dash.trend.canvas.active() {
                eprintln!("Wrote plot to {}", path.display());
            }
        }
    }
    Ok(())
}

/// Load the year list (and the first year's rankings), then switch to `year` if given.
fn start(dash: &mut Dashboard<FileChartBackend>, client: &Client, year: Option<i32>) -> Result<()> {
    let first = dash.initialize();
    dash.run(client, Some(first));
    check_notice(dash)?;
    if let Some(y) = year
        && dash.current_year() != Some(y)
    {
        let req = dash.select_year(&y.to_string());
        check_notice(dash)?;
        dash.run(client, req);
        check_notice(dash)?;
    }
    Ok(())
}

fn check_notice(dash: &mut Dashboard<FileChartBackend>) -> Result<()> {
    match dash.take_notice() {
        Some(n) => bail!("{}", n.message),
        None => Ok(()),
    }
}

fn cmd_rankings(dash: &mut Dashboard<FileChartBackend>, client: &Client, args: RankingsArgs) -> Result<()> {
    start(dash, client, args.year)?;

    for section in &dash.board.sections {
        if args.system.is_some_and(|s| s != section.system) {
            continue;
        }
        println!("== {} ==", dash.board.title(section.system));
        match &section.content {
            Some(Content::Table(t)) => print_table(t, args.limit),
            Some(other) => print_content(other),
            None => println!("(loading failed)"),
        }
        println!();
    }

    if let Some(path) = args.out.as_ref() {
        let (Some(year), Some(snapshot)) = (dash.state().snapshot_year(), dash.state().snapshot()) else {
            bail!("no rankings loaded, nothing to save");
        };
        let mut rows = storage::export_rows(snapshot, year);
        if let Some(system) = args.system {
            rows.retain(|r| r.system == system);
        }
        storage::save(&rows, path)?;
        eprintln!("Saved {} rows to {}", rows.len(), path.display());
    }
    Ok(())
}

fn print_content(content: &Content) {
    match content {
        Content::Message(m) => println!("{m}"),
        Content::Table(t) => print_table(t, None),
        Content::Sections(sections) => {
            for s in sections {
                println!("== {} ==", s.heading);
                print_table(&s.table, None);
                println!();
            }
        }
        Content::Trend { chart, table } => {
            println!("{}", chart.title);
            print_table(table, None);
        }
    }
}

/// Left-aligned text table, columns padded to their widest cell.
fn print_table(table: &Table, limit: Option<usize>) {
    let rows: Vec<&Vec<_>> = table.rows.iter().take(limit.unwrap_or(usize::MAX)).collect();
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.text.chars().count());
            }
        }
    }
    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}", w = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    println!("{}", line(table.headers.iter().map(String::as_str).collect()));
    for row in rows {
        println!("{}", line(row.iter().map(|c| c.text.as_str()).collect()));
    }
    if let Some(note) = &table.note {
        println!("{note}");
    }
}
