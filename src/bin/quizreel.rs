use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use quizreel::{
    core::{Fps, FrameIndex},
    generate::Generator,
    model::{ExportDocument, Quiz},
    pipeline::{self, RenderOpts},
    render::Canvas,
    server::{self, ServerConfig},
    timeline::Timeline,
};

#[derive(Parser, Debug)]
#[command(name = "quizreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single absolute frame as a PNG.
    Frame(FrameArgs),
    /// Render the full quiz as an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Run the render backend (status, render, and download endpoints).
    Serve(ServeArgs),
    /// Generate questions for a topic via a chat-completion service.
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input quiz props JSON.
    #[arg(long = "props")]
    props_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    geometry: GeometryArgs,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input quiz props JSON.
    #[arg(long = "props")]
    props_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    geometry: GeometryArgs,
}

#[derive(Parser, Debug)]
struct GeometryArgs {
    /// Output width in pixels.
    #[arg(long, default_value_t = 1080)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 1920)]
    height: u32,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Port to listen on.
    #[arg(long, default_value_t = server::DEFAULT_PORT)]
    port: u16,

    /// Directory for the props document and the rendered video.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// Renderer executable; defaults to this binary.
    #[arg(long)]
    renderer: Option<PathBuf>,

    /// Base URL used in download links.
    #[arg(long)]
    public_base_url: Option<String>,

    /// Kill a render that runs longer than this many seconds.
    #[arg(long, default_value_t = 600)]
    render_timeout_secs: u64,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Topic to generate questions about.
    #[arg(long)]
    topic: String,

    /// Chat-completion model name.
    #[arg(long, default_value = quizreel::generate::DEFAULT_MODEL)]
    model: String,

    /// API key; falls back to $OPENAI_API_KEY.
    #[arg(long)]
    api_key: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Serve(args) => cmd_serve(args),
        Command::Generate(args) => cmd_generate(args),
    }
}

fn read_quiz(path: &Path) -> anyhow::Result<Quiz> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("open props '{}'", path.display()))?;
    let doc = ExportDocument::from_json(&s).with_context(|| "parse props JSON")?;
    Ok(doc.into_quiz())
}

fn geometry(args: &GeometryArgs) -> anyhow::Result<(Canvas, Fps)> {
    let canvas = Canvas {
        width: args.width,
        height: args.height,
    };
    let fps = Fps::new(args.fps)?;
    Ok((canvas, fps))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let quiz = read_quiz(&args.props_path)?;
    quiz.validate()?;
    let (canvas, fps) = geometry(&args.geometry)?;

    let timeline = Timeline::compile(&quiz.questions, fps);
    let frame = pipeline::render_frame(&quiz, &timeline, FrameIndex(args.frame), canvas)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let quiz = read_quiz(&args.props_path)?;
    let (canvas, fps) = geometry(&args.geometry)?;

    let opts = RenderOpts {
        canvas,
        fps,
        overwrite: true,
    };
    pipeline::render_quiz_to_mp4(&quiz, &opts, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let renderer = match args.renderer {
        Some(path) => path,
        None => std::env::current_exe().context("resolve current executable as renderer")?,
    };

    let mut cfg = ServerConfig::new(args.port, args.out_dir, renderer);
    if let Some(base) = args.public_base_url {
        cfg.public_base_url = base;
    }
    cfg.render_timeout = std::time::Duration::from_secs(args.render_timeout_secs);

    tokio::runtime::Runtime::new()
        .context("start async runtime")?
        .block_on(server::serve(cfg))?;
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let api_key = match args.api_key {
        Some(key) => key,
        None => std::env::var("OPENAI_API_KEY")
            .context("no --api-key given and OPENAI_API_KEY is not set")?,
    };

    let generator = Generator::new(api_key).with_model(args.model);
    let questions = tokio::runtime::Runtime::new()
        .context("start async runtime")?
        .block_on(generator.generate(&args.topic))?;

    serde_json::to_writer_pretty(std::io::stdout().lock(), &questions)
        .context("write questions JSON")?;
    println!();
    Ok(())
}
