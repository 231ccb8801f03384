//! `tabula` renders CSV or JSON data as styled table images.
//!
//! ```text
//! tabula render members.csv -o out/members.png --layout modern --auto-highlight
//! tabula render members.csv --split --max-rows 20 -o out/
//! tabula classify members.csv
//! tabula layouts --layouts-dir ./styles
//! ```
//!
//! Logging goes to stderr. `-v` shows debug output, `-vv` trace output;
//! `RUST_LOG` overrides both.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tabula_render::{
    classify, next_table_path, CellValue, Highlight, ImageFormat, LayoutRegistry, StyleResolver,
    TableOptions, TableRenderer, TabularDataset,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Styled table images from tabular data
#[derive(Debug, Parser)]
#[command(name = "tabula")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory of extra layout files (.yaml / .yml)
    #[arg(long, global = true, value_name = "DIR")]
    layouts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a table image
    Render(RenderArgs),
    /// Print the category of each column
    Classify {
        /// CSV or JSON input file
        input: PathBuf,
    },
    /// List the available layouts
    Layouts,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// CSV or JSON input file
    input: PathBuf,

    /// Output file, or output directory with --split
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Layout name
    #[arg(short, long, default_value = tabula_render::style::DEFAULT_LAYOUT)]
    layout: String,

    /// Highlight a column with a gradient (repeatable)
    #[arg(long = "highlight", value_name = "COLUMN", conflicts_with = "auto_highlight")]
    highlight: Vec<String>,

    /// Highlight the columns the classifier picks
    #[arg(long)]
    auto_highlight: bool,

    /// Gradient palette for highlighted columns
    #[arg(long)]
    palette: Option<String>,

    /// Image format; defaults to the output extension, then png
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Output resolution
    #[arg(long, default_value_t = tabula_render::pipeline::DEFAULT_DPI)]
    dpi: f64,

    /// Drop a column before rendering (repeatable)
    #[arg(long = "hide", value_name = "COLUMN")]
    hide: Vec<String>,

    /// Keep only rows where COLUMN equals VALUE
    #[arg(long, value_name = "COLUMN=VALUE")]
    filter: Option<String>,

    /// Sort rows by a column
    #[arg(long, value_name = "COLUMN")]
    sort: Option<String>,

    /// Split into numbered tables of at most --max-rows rows
    #[arg(long)]
    split: bool,

    /// Row limit per table with --split
    #[arg(long, default_value_t = tabula_render::pipeline::DEFAULT_MAX_ROWS)]
    max_rows: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Png,
    Svg,
}

impl From<FormatArg> for ImageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Svg => ImageFormat::Svg,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn registry(layouts_dir: Option<&Path>) -> Result<LayoutRegistry> {
    let mut registry = LayoutRegistry::builtin()?;
    if let Some(dir) = layouts_dir {
        registry
            .add_dir(dir)
            .with_context(|| format!("loading layouts from {}", dir.display()))?;
    }
    Ok(registry)
}

fn load_dataset(path: &Path) -> Result<TabularDataset> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let dataset = if is_json {
        TabularDataset::from_json_str(&content)
    } else {
        TabularDataset::from_csv_str(&content)
    };
    dataset.with_context(|| format!("parsing {}", path.display()))
}

fn prepare(mut dataset: TabularDataset, args: &RenderArgs) -> Result<TabularDataset> {
    if !args.hide.is_empty() {
        dataset = dataset.without_columns(&args.hide[..])?;
    }
    if let Some(filter) = &args.filter {
        let Some((column, value)) = filter.split_once('=') else {
            bail!("--filter expects COLUMN=VALUE, got '{}'", filter);
        };
        dataset = dataset.filter_eq(column.trim(), &CellValue::parse(value.trim()))?;
    }
    if let Some(column) = &args.sort {
        dataset = dataset.sorted_by(column)?;
    }
    Ok(dataset)
}

fn options(args: &RenderArgs) -> TableOptions {
    let format = args
        .format
        .map(ImageFormat::from)
        .or_else(|| {
            args.output
                .as_deref()
                .filter(|_| !args.split)
                .and_then(ImageFormat::from_path)
        })
        .unwrap_or_default();

    let highlight = if args.auto_highlight {
        Highlight::AutoDetect
    } else if !args.highlight.is_empty() {
        Highlight::Columns(args.highlight.clone())
    } else {
        Highlight::None
    };

    let mut options = TableOptions::new(&args.layout)
        .highlight(highlight)
        .format(format)
        .dpi(args.dpi)
        .max_rows_per_table(args.max_rows);
    options.palette = args.palette.clone();
    options
}

fn render(args: &RenderArgs, layouts_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let dataset = prepare(load_dataset(&args.input)?, args)?;
    let options = options(args);
    debug!(?options, rows = dataset.num_rows(), "rendering");

    let renderer = TableRenderer::new(registry(layouts_dir)?);
    let written = if args.split {
        let dir = args.output.clone().unwrap_or_else(|| PathBuf::from("."));
        renderer.render_parts(&dataset, &options, dir)?
    } else {
        let path = match &args.output {
            Some(path) => path.clone(),
            None => next_table_path(".", options.format)?,
        };
        vec![renderer.render(&dataset, &options, path)?]
    };
    Ok(written)
}

fn run(cli: Cli) -> Result<()> {
    let layouts_dir = cli.layouts_dir.as_deref();
    match &cli.command {
        Command::Render(args) => {
            for path in render(args, layouts_dir)? {
                println!("{}", path.display());
            }
        }
        Command::Classify { input } => {
            let dataset = load_dataset(input)?;
            let registry = registry(layouts_dir)?;
            let result = classify(&dataset, registry.categories());
            println!("table: {}", result.table_category);
            for (index, name) in dataset.columns().iter().enumerate() {
                let marker = if result.is_candidate(index) { " *" } else { "" };
                println!("{}: {}{}", name, result.category(index), marker);
            }
        }
        Command::Layouts => {
            for name in registry(layouts_dir)?.layout_names() {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn render_args(cli: Cli) -> RenderArgs {
        match cli.command {
            Command::Render(args) => args,
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_defaults() {
        let args = render_args(parse(&["tabula", "render", "data.csv"]));
        assert_eq!(args.layout, "corporate");
        assert_eq!(args.dpi, 300.0);
        assert_eq!(args.max_rows, 25);
        assert!(!args.split);

        let options = options(&args);
        assert_eq!(options.format, ImageFormat::Png);
        assert_eq!(options.highlight, Highlight::None);
    }

    #[test]
    fn format_from_output_extension() {
        let args = render_args(parse(&["tabula", "render", "d.csv", "-o", "t.svg"]));
        assert_eq!(options(&args).format, ImageFormat::Svg);

        let args = render_args(parse(&[
            "tabula", "render", "d.csv", "-o", "t.svg", "--format", "png",
        ]));
        assert_eq!(options(&args).format, ImageFormat::Png);
    }

    #[test]
    fn highlight_flags() {
        let args = render_args(parse(&[
            "tabula", "render", "d.csv", "--highlight", "A", "--highlight", "B",
        ]));
        assert_eq!(
            options(&args).highlight,
            Highlight::Columns(vec!["A".into(), "B".into()])
        );

        let args = render_args(parse(&["tabula", "render", "d.csv", "--auto-highlight"]));
        assert_eq!(options(&args).highlight, Highlight::AutoDetect);

        assert!(Cli::try_parse_from([
            "tabula", "render", "d.csv", "--auto-highlight", "--highlight", "A"
        ])
        .is_err());
    }

    #[test]
    fn verbosity_counts() {
        assert_eq!(parse(&["tabula", "-vv", "layouts"]).verbose, 2);
    }

    #[test]
    fn prepare_applies_hide_filter_sort() {
        let dataset =
            TabularDataset::from_csv_str("Member,Group,Load\nB1,a,3\nB2,b,1\nB3,a,2\n").unwrap();
        let args = render_args(parse(&[
            "tabula", "render", "d.csv", "--hide", "Group", "--filter", "Group=a", "--sort",
            "Load",
        ]));
        // hide runs first, so filtering on the hidden column fails
        assert!(prepare(dataset.clone(), &args).is_err());

        let args = render_args(parse(&[
            "tabula", "render", "d.csv", "--filter", "Group = a", "--sort", "Load",
        ]));
        let prepared = prepare(dataset, &args).unwrap();
        let members: Vec<String> = prepared.column_values(0).map(CellValue::display).collect();
        assert_eq!(members, vec!["B3", "B1"]);
    }

    #[test]
    fn malformed_filter() {
        let dataset = TabularDataset::from_csv_str("A\n1\n").unwrap();
        let args = render_args(parse(&["tabula", "render", "d.csv", "--filter", "A"]));
        assert!(prepare(dataset, &args).is_err());
    }

    #[test]
    fn render_svg_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.json");
        fs::write(
            &input,
            r#"[{"Node": "N1", "Force_kN": 10.5}, {"Node": "N2", "Force_kN": null}]"#,
        )
        .unwrap();
        let output = dir.path().join("out").join("table.svg");

        let cli = parse(&[
            "tabula",
            "render",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--auto-highlight",
        ]);
        let args = render_args(cli);
        let written = render(&args, None).unwrap();

        assert_eq!(written, vec![output.clone()]);
        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.contains(">N1</tspan>"));
        assert!(svg.contains(">---</tspan>"));
    }

    #[test]
    fn missing_layouts_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = registry(Some(dir.path().join("nope").as_path())).unwrap_err();
        assert!(format!("{:#}", err).contains("loading layouts"));
    }
}
