use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "lamina", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a project to a PNG.
    Still(StillArgs),
    /// Render a looping parallax GIF from a project.
    Parallax(ParallaxArgs),
}

#[derive(Parser, Debug)]
struct ProjectArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Register a font face, as `family=path/to/font.ttf`. Repeatable.
    #[arg(long = "font", value_parser = parse_font_arg)]
    fonts: Vec<(lamina::FontFamily, PathBuf)>,
}

#[derive(Parser, Debug)]
struct StillArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output size relative to the canvas.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
}

#[derive(Parser, Debug)]
struct ParallaxArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Loop length in seconds.
    #[arg(long, default_value_t = 3.0)]
    duration: f32,

    #[arg(long, default_value_t = 15)]
    fps: u32,

    /// Motion strength in `0..=1`.
    #[arg(long, default_value_t = 0.6)]
    intensity: f32,

    #[arg(long, value_enum, default_value_t = MotionArg::Zoom)]
    motion: MotionArg,

    #[arg(long = "loop-mode", value_enum, default_value_t = LoopArg::PingPong)]
    loop_mode: LoopArg,

    /// Keep the topmost layer still.
    #[arg(long, default_value_t = false)]
    lock_top: bool,

    #[arg(long, value_enum, default_value_t = QualityArg::Standard)]
    quality: QualityArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MotionArg {
    Zoom,
    PanX,
    PanY,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LoopArg {
    PingPong,
    Forward,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QualityArg {
    Draft,
    Standard,
    High,
}

fn parse_font_arg(s: &str) -> Result<(lamina::FontFamily, PathBuf), String> {
    let (family, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected family=path, got '{s}'"))?;
    let family = lamina::FontFamily::from_slug(family).map_err(|e| e.to_string())?;
    Ok((family, PathBuf::from(path)))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Still(args) => cmd_still(args),
        Command::Parallax(args) => cmd_parallax(args),
    }
}

fn open_session(args: &ProjectArgs) -> anyhow::Result<lamina::CompositionSession> {
    let def = lamina::ProjectDef::from_path(&args.in_path)?;
    let base_dir = args.in_path.parent().unwrap_or_else(|| Path::new("."));

    let mut sess = lamina::CompositionSession::new(lamina::SessionOpts::from_env())?;
    for (family, path) in &args.fonts {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        sess.register_font(*family, bytes)
            .with_context(|| format!("register font '{}'", path.display()))?;
    }
    sess.import_project(&def, Some(base_dir))
        .with_context(|| format!("load project '{}'", args.in_path.display()))?;
    Ok(sess)
}

fn write_output(out: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, bytes).with_context(|| format!("write '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_still(args: StillArgs) -> anyhow::Result<()> {
    let mut sess = open_session(&args.project)?;
    let img = sess.export_still(args.scale)?;
    let png = lamina::raster::decode::encode_png(&img)?;
    write_output(&args.out, &png)
}

fn cmd_parallax(args: ParallaxArgs) -> anyhow::Result<()> {
    let mut sess = open_session(&args.project)?;
    let opts = lamina::ParallaxOpts {
        duration_sec: args.duration,
        fps: args.fps,
        intensity: args.intensity,
        motion: match args.motion {
            MotionArg::Zoom => lamina::MotionType::Zoom,
            MotionArg::PanX => lamina::MotionType::PanX,
            MotionArg::PanY => lamina::MotionType::PanY,
        },
        loop_mode: match args.loop_mode {
            LoopArg::PingPong => lamina::LoopMode::PingPong,
            LoopArg::Forward => lamina::LoopMode::Forward,
        },
        lock_top: args.lock_top,
        quality: match args.quality {
            QualityArg::Draft => lamina::QualityPreset::Draft,
            QualityArg::Standard => lamina::QualityPreset::Standard,
            QualityArg::High => lamina::QualityPreset::High,
        },
        loop_count: 0,
    };

    let (tx, rx) = std::sync::mpsc::channel::<lamina::Progress>();
    let reporter = std::thread::spawn(move || {
        let mut last = None;
        for p in rx {
            let pct = (p.progress * 10.0).floor() as u32 * 10;
            if last != Some((p.stage, pct)) {
                eprintln!("{:?} {pct}%", p.stage);
                last = Some((p.stage, pct));
            }
        }
    });

    let mut sink = lamina::GifSink::new();
    let result = sess.export_parallax(&opts, &mut sink, Some(&tx));
    drop(tx);
    let _ = reporter.join();

    let gif = result?;
    write_output(&args.out, &gif)
}
