use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "toonloop", version)]
struct Cli {
    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a description and print the action plan as JSON.
    Plan(PlanArgs),
    /// Animate one image into a PNG sequence plus manifest.
    Render(RenderArgs),
    /// Animate several images with the same description, one output directory each.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Description text.
    #[arg(long)]
    text: String,

    /// Vocabulary JSON overriding the builtin tables.
    #[arg(long)]
    vocab: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AnimateArgs {
    /// Description text.
    #[arg(long)]
    text: String,

    /// Vocabulary JSON overriding the builtin tables.
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// Options JSON (frame overrides, synthesis, compositor, threading).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Total frame count override.
    #[arg(long)]
    frames: Option<u32>,

    /// Per-frame duration override in milliseconds.
    #[arg(long)]
    duration_ms: Option<u32>,

    /// Loop count, 0 = infinite.
    #[arg(long = "loop")]
    loop_count: Option<u16>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Stylized input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Detected part regions JSON. Without it the whole image is animated as one body.
    #[arg(long)]
    parts: Option<PathBuf>,

    #[command(flatten)]
    animate: AnimateArgs,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Stylized input images.
    #[arg(long = "in", required = true)]
    in_paths: Vec<PathBuf>,

    /// Output root; each input gets a sub-directory named after its file stem.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    animate: AnimateArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Render(args) => cmd_render(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_parser(vocab: Option<&Path>) -> anyhow::Result<toonloop::Parser> {
    match vocab {
        Some(path) => {
            let vocab = toonloop::Vocabulary::from_path(path)
                .with_context(|| format!("load vocabulary '{}'", path.display()))?;
            Ok(toonloop::Parser::new(&vocab)?)
        }
        None => Ok(toonloop::Parser::builtin()),
    }
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let parser = load_parser(args.vocab.as_deref())?;
    let plan = parser.parse(&args.text);
    let json = serde_json::to_string_pretty(&plan).context("serialize action plan")?;
    println!("{json}");
    Ok(())
}

impl AnimateArgs {
    fn opts(&self) -> anyhow::Result<toonloop::AnimateOpts> {
        let mut opts = match &self.config {
            Some(path) => toonloop::AnimateOpts::from_path(path)
                .with_context(|| format!("load options '{}'", path.display()))?,
            None => toonloop::AnimateOpts::default(),
        };
        if self.frames.is_some() {
            opts.frame_count = self.frames;
        }
        if self.duration_ms.is_some() {
            opts.frame_duration_ms = self.duration_ms;
        }
        if let Some(n) = self.loop_count {
            opts.loop_count = n;
        }
        if self.parallel {
            opts.threading.parallel = true;
        }
        if self.threads.is_some() {
            opts.threading.threads = self.threads;
        }
        opts.validate()?;
        Ok(opts)
    }
}

fn animate_one(
    in_path: &Path,
    parts_path: Option<&Path>,
    out: &Path,
    plan: &toonloop::ActionPlan,
    opts: &toonloop::AnimateOpts,
) -> anyhow::Result<()> {
    let base = toonloop::BaseImage::from_path(in_path)
        .with_context(|| format!("load image '{}'", in_path.display()))?;
    let parts = match parts_path {
        Some(p) => toonloop::PartSet::from_path(base.canvas(), p)
            .with_context(|| format!("load part regions '{}'", p.display()))?,
        None => toonloop::PartSet::whole_image(base.canvas()),
    };
    let mut sink = toonloop::PngSequenceSink::new(out);
    toonloop::render_to_sink(&base, &parts, plan, opts, &mut sink)
        .with_context(|| format!("animate '{}'", in_path.display()))?;
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let parser = load_parser(args.animate.vocab.as_deref())?;
    let opts = args.animate.opts()?;
    let plan = parser.parse(&args.animate.text);

    animate_one(&args.in_path, args.parts.as_deref(), &args.out, &plan, &opts)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let parser = load_parser(args.animate.vocab.as_deref())?;
    let opts = args.animate.opts()?;
    let plan = parser.parse(&args.animate.text);

    let mut written = 0usize;
    for (i, in_path) in args.in_paths.iter().enumerate() {
        let stem = in_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("input_{i}"));
        let out = args.out.join(format!("{i:02}_{stem}"));
        match animate_one(in_path, None, &out, &plan, &opts) {
            Ok(()) => {
                written += 1;
                eprintln!("wrote {}", out.display());
            }
            Err(e) => tracing::warn!(
                input = %in_path.display(),
                error = %format!("{e:#}"),
                "skipping input"
            ),
        }
    }

    if written == 0 {
        anyhow::bail!("no input could be animated");
    }
    Ok(())
}
