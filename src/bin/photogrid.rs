use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use photogrid::{
    Canvas, Edges, ExportFormat, Job, PresetCatalog, Studio, compute_grid, write_export,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "photogrid", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a job file to a JPEG or PNG.
    Compose(ComposeArgs),
    /// List the presets in a catalog.
    Presets(PresetsArgs),
    /// Print the grid placements for a canvas as JSON.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Job JSON; relative paths inside it resolve against its directory.
    #[arg(long)]
    job: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Output format (`jpeg` or `png`); inferred from `--out` when omitted.
    #[arg(long)]
    format: Option<String>,

    /// JPEG quality (1-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Also write the preview surface as a PNG.
    #[arg(long)]
    preview: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PresetsArgs {
    /// Preset catalog JSON.
    #[arg(long)]
    catalog: PathBuf,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    #[arg(long)]
    width: u32,

    #[arg(long)]
    height: u32,

    /// Margins as `top,bottom,left,right`.
    #[arg(long, value_parser = parse_edges, default_value = "0,0,0,0")]
    margins: Edges,

    /// Padding as `top,bottom,left,right`.
    #[arg(long, value_parser = parse_edges, default_value = "0,0,0,0")]
    padding: Edges,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Presets(args) => cmd_presets(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let job = Job::from_path(&args.job)?;
    let base = args.job.parent().unwrap_or_else(|| Path::new("."));
    let state = job
        .build_session(base)
        .with_context(|| format!("load inputs for '{}'", args.job.display()))?;

    let format = match &args.format {
        Some(name) => ExportFormat::from_name(name, args.quality)?,
        None => match ExportFormat::from_extension(&args.out) {
            Some(ExportFormat::Jpeg { .. }) | None => ExportFormat::Jpeg {
                quality: args.quality.unwrap_or(photogrid::DEFAULT_JPEG_QUALITY),
            },
            Some(f) => f,
        },
    };

    let mut studio = Studio::new();
    if let Some(preview_path) = &args.preview {
        studio.refresh_preview(&state)?;
        write_export(preview_path, &studio.preview_frame()?, ExportFormat::Png)?;
    }

    let out = studio.export(&state, format)?;
    for w in &out.report.warnings {
        eprintln!("warning: {w}");
    }
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &out.bytes)
        .with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{}, {} photo(s))",
        args.out.display(),
        out.report.canvas.width,
        out.report.canvas.height,
        out.report.drawn_count()
    );
    Ok(())
}

fn cmd_presets(args: PresetsArgs) -> anyhow::Result<()> {
    let catalog = PresetCatalog::from_path(&args.catalog)?;
    for (i, p) in catalog.presets.iter().enumerate() {
        let m = p.margins;
        println!(
            "{i}\t{}\toverlay={}\tmargins={},{},{},{}\tbackground={}",
            p.name,
            p.url.as_deref().unwrap_or("-"),
            m.top,
            m.bottom,
            m.left,
            m.right,
            match &p.background {
                None => "-".to_owned(),
                Some(photogrid::BackgroundSource::Color { value }) => value.to_string(),
                Some(photogrid::BackgroundSource::Image { url }) => url.clone(),
            }
        );
    }
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let canvas = Canvas::new(args.width, args.height)?;
    let grid = compute_grid(canvas, args.margins, args.padding);
    let json = serde_json::to_string_pretty(&grid).context("serialize grid")?;
    println!("{json}");
    Ok(())
}

fn parse_edges(s: &str) -> Result<Edges, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<u32>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        &[v] => Ok(Edges::uniform(v)),
        &[top, bottom, left, right] => Ok(Edges::new(top, bottom, left, right)),
        _ => Err("expected `N` or `top,bottom,left,right`".to_owned()),
    }
}
