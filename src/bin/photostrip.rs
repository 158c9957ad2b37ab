use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use photostrip::catalog::{frames, layouts};
use photostrip::{
    CompositeEngine, DeliveryMeta, DirectorySink, EngineConfig, FilterKind, FrameCategory,
    FrameId, LayoutType, Orientation, PhotoSession, SessionConfig,
};

#[derive(Parser, Debug)]
#[command(name = "photostrip", version, about = "Photo booth strips from the command line")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available layouts.
    Layouts,
    /// List the available frames.
    Frames(FramesArgs),
    /// Apply one filter to an image file.
    Filter(FilterArgs),
    /// Compose images directly with the engine.
    Compose(ComposeArgs),
    /// Run a full booth session over image files and write the composite.
    Session(SessionArgs),
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Only frames of this category (pop-icon, aesthetic, seasonal, classic).
    #[arg(long)]
    category: Option<FrameCategory>,
}

#[derive(Parser, Debug)]
struct FilterArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Filter name (none, warm, cool, monochrome, grain).
    #[arg(long)]
    filter: FilterKind,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    /// Fixed seed for grain.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Layout id, e.g. 3-strip.
    #[arg(long)]
    layout: LayoutType,

    /// Override the layout's orientation.
    #[arg(long)]
    orientation: Option<Orientation>,

    /// Frame id, e.g. classic-white.
    #[arg(long)]
    frame: Option<FrameId>,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    /// Photos in slot order.
    #[arg(required = true)]
    photos: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct SessionArgs {
    /// Layout id, e.g. 2x2-grid.
    #[arg(long)]
    layout: LayoutType,

    /// Frame id; omit to skip the frame.
    #[arg(long)]
    frame: Option<FrameId>,

    /// Filter applied to every capture.
    #[arg(long, default_value_t = FilterKind::None)]
    filter: FilterKind,

    /// Session config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the composite is written into.
    #[arg(long)]
    out_dir: PathBuf,

    /// Replace an existing file with the same name.
    #[arg(long)]
    overwrite: bool,

    /// Captured photos, in capture order.
    #[arg(required = true)]
    photos: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Layouts => cmd_layouts(),
        Command::Frames(args) => cmd_frames(args),
        Command::Filter(args) => cmd_filter(args),
        Command::Compose(args) => cmd_compose(args),
        Command::Session(args) => cmd_session(args),
    }
}

fn cmd_layouts() -> anyhow::Result<()> {
    for l in layouts::all() {
        println!(
            "{:<10} {:>2} photos  {:<9} {:>4}x{:<4}  {:<8} {}",
            l.id.as_str(),
            l.photo_count,
            l.orientation.as_str(),
            l.width,
            l.height,
            l.print_size,
            l.name
        );
    }
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let list: Vec<_> = match args.category {
        Some(c) => frames::list_by_category(c).collect(),
        None => frames::list_all().iter().collect(),
    };
    for f in list {
        println!(
            "{:<18} {:<10} {:<8} {}",
            f.id.as_str(),
            f.category.as_str(),
            if f.premium { "premium" } else { "free" },
            f.name
        );
    }
    Ok(())
}

fn cmd_filter(args: FilterArgs) -> anyhow::Result<()> {
    let bytes = read_file(&args.in_path)?;
    let out = match args.seed {
        Some(seed) => photostrip::apply_filter_seeded(&bytes, args.filter, seed),
        None => photostrip::apply_filter(&bytes, args.filter),
    };
    write_file(&args.out, &out)
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let cfg = match &args.config {
        Some(p) => EngineConfig::from_path(p)?,
        None => EngineConfig::default(),
    };
    let engine = CompositeEngine::new(cfg)?;
    let photos = args
        .photos
        .iter()
        .map(|p| read_file(p))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let orientation = args
        .orientation
        .unwrap_or(layouts::get(args.layout).orientation);

    let output = engine.compose(args.layout, orientation, &photos, args.frame)?;
    write_file(&args.out, &output.bytes)?;
    eprintln!(
        "wrote {} ({}x{} {})",
        args.out.display(),
        output.width,
        output.height,
        output.mime_type()
    );
    Ok(())
}

fn cmd_session(args: SessionArgs) -> anyhow::Result<()> {
    let cfg = match &args.config {
        Some(p) => SessionConfig::from_path(p)?,
        None => SessionConfig::default(),
    };
    let mut session = PhotoSession::new(cfg)?;
    session.set_filter(args.filter);
    session.choose_layout(args.layout);
    session.choose_frame(args.frame)?;
    for p in &args.photos {
        session.capture_photo(read_file(p)?)?;
    }
    session.enter_review()?;
    if session.composite().is_none()
        && let Some(job) = session.composite_job()
    {
        let output = job.run()?;
        session.accept_composite(job.key().clone(), output);
    }

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_millis() as u64;
    let mut sink = DirectorySink::new(&args.out_dir).overwrite(args.overwrite);
    session.deliver(&mut sink, &DeliveryMeta::at(ts))?;
    for p in sink.written() {
        println!("{}", p.display());
    }
    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
