use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use posterkit::{
    CommandClipboard, EditorConfig, ImageSource, LoadOutcome, Point, PointerEvent, Session, Slot,
    Unsupported,
};
use tracing_subscriber::EnvFilter;

const LOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "posterkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Place a photo on the template and export the JPEG.
    Compose(ComposeArgs),
    /// Share the configured link, falling back to the clipboard.
    Share(ShareArgs),
    /// Print the default configuration as JSON.
    Config,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Overlay photo.
    #[arg(long)]
    photo: PathBuf,

    /// Background template; defaults to `background_path` next to the config file.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Editor configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the export is written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Overlay left edge, in canvas pixels.
    #[arg(long, allow_hyphen_values = true)]
    x: Option<f64>,

    /// Overlay top edge, in canvas pixels.
    #[arg(long, allow_hyphen_values = true)]
    y: Option<f64>,

    /// Overlay scale.
    #[arg(long)]
    scale: Option<f64>,

    /// Simulated drag `x0,y0:x1,y1` in canvas pixels. Repeatable; applied in order.
    #[arg(long = "drag", allow_hyphen_values = true)]
    drags: Vec<DragArg>,
}

#[derive(Parser, Debug)]
struct ShareArgs {
    /// Editor configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Link to share; overrides the configured one.
    #[arg(long)]
    url: Option<String>,
}

#[derive(Clone, Copy, Debug)]
struct DragArg {
    from: Point,
    to: Point,
}

impl FromStr for DragArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn point(s: &str) -> Result<Point, String> {
            let (x, y) = s
                .split_once(',')
                .ok_or_else(|| format!("expected 'x,y', got '{s}'"))?;
            let x: f64 = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
            let y: f64 = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
            Ok(Point::new(x, y))
        }

        let (from, to) = s
            .split_once(':')
            .ok_or_else(|| format!("expected 'x0,y0:x1,y1', got '{s}'"))?;
        Ok(Self {
            from: point(from)?,
            to: point(to)?,
        })
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Share(args) => cmd_share(args),
        Command::Config => cmd_config(),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<EditorConfig> {
    match path {
        Some(p) => EditorConfig::from_json_file(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(EditorConfig::default()),
    }
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let mut session = match &args.background {
        Some(bg) => Session::with_background_source(config, ImageSource::Path(bg.clone()))?,
        None => {
            let root = args
                .config
                .as_deref()
                .and_then(Path::parent)
                .unwrap_or_else(|| Path::new("."));
            Session::open(config, root)?
        }
    };

    session.select_overlay(Some(ImageSource::Path(args.photo.clone())));
    for outcome in session.wait_for_loads(LOAD_TIMEOUT) {
        match outcome {
            LoadOutcome::Failed {
                slot: Slot::Overlay,
                error,
                ..
            } => bail!("decode photo '{}': {error}", args.photo.display()),
            LoadOutcome::Failed {
                slot: Slot::Background,
                error,
                ..
            } => eprintln!("warning: background unavailable, exporting on white: {error}"),
            _ => {}
        }
    }
    if !session.has_overlay() {
        bail!("photo '{}' did not finish loading", args.photo.display());
    }

    if args.x.is_some() || args.y.is_some() {
        let t = session.transform();
        session.set_position(Point::new(
            args.x.unwrap_or(t.position.x),
            args.y.unwrap_or(t.position.y),
        ))?;
    }
    if let Some(scale) = args.scale {
        session.set_scale(scale)?;
    }
    for d in &args.drags {
        let start = session.handle_pointer(&PointerEvent::down(d.from.x, d.from.y));
        if !start.consumed {
            eprintln!(
                "warning: drag start ({}, {}) is not on the photo",
                d.from.x, d.from.y
            );
            continue;
        }
        session.handle_pointer(&PointerEvent::moved(d.to.x, d.to.y));
        session.handle_pointer(&PointerEvent::up(d.to.x, d.to.y));
    }

    let path = session.save_export(&args.out_dir)?;
    let t = session.transform();
    eprintln!(
        "wrote {} (position {}, {}; scale {})",
        path.display(),
        t.position.x,
        t.position.y,
        t.scale
    );
    Ok(())
}

fn cmd_share(args: ShareArgs) -> anyhow::Result<()> {
    let mut config = read_config(args.config.as_deref())?;
    if let Some(url) = args.url {
        config.share.url = url;
    }
    if config.share.url.trim().is_empty() {
        bail!("no link to share: pass --url or set share.url in the config");
    }
    let outcome = posterkit::share(&config.share, &mut Unsupported, &mut CommandClipboard);
    match outcome.notice() {
        Some(notice) => println!("{notice}"),
        None => println!("shared"),
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&EditorConfig::default())
        .context("serialize default config")?;
    println!("{json}");
    Ok(())
}
