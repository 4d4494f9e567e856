use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scenecut::Clock as _;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scenecut", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite the output at a point in time and write it as a PNG.
    Frame(FrameArgs),
    /// Run the real-time render loop and print render statistics as JSON.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input show JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Time to render at, in milliseconds after the show is loaded.
    #[arg(long, default_value_t = 0)]
    at_ms: u64,

    /// Perform a studio take (preview into program) before rendering.
    #[arg(long)]
    take: bool,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input show JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Wall-clock run time in seconds.
    #[arg(long)]
    seconds: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn load_show(path: &Path) -> anyhow::Result<scenecut::ShowFile> {
    scenecut::ShowFile::load(path).with_context(|| format!("load show '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let show = load_show(&args.in_path)?;
    let clock = scenecut::ManualClock::shared();
    let mut studio = show
        .build(clock.clone())
        .context("build studio session")?;
    studio.attach_sink(Box::new(scenecut::InMemorySink::keep_last(1)))?;

    if args.take {
        let taken = studio.take().context("take")?;
        if !taken {
            tracing::warn!("take had no effect");
        }
    }

    let target = Duration::from_millis(args.at_ms);
    let interval = studio.config().fps()?.frame_interval();
    studio.tick();
    while clock.now() < target {
        clock.advance(interval.min(target - clock.now()));
        studio.tick();
    }

    let output = studio
        .last_output()
        .context("show has no active scene to render")?;
    let png = scenecut::sources::decode::encode_png(&output.frame)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    tracing::info!(out = %args.out.display(), at_ms = args.at_ms, "frame written");
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "--seconds must be a non-negative number"
    );
    let show = load_show(&args.in_path)?;
    let mut studio = show
        .build(Arc::new(scenecut::SystemClock::new()))
        .context("build studio session")?;

    let mut sink = scenecut::InMemorySink::keep_last(1);
    let stats = studio.run_realtime(Duration::from_secs_f64(args.seconds), &mut sink)?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
