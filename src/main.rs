use clap::{Parser, Subcommand};
use multicrop::config::{self, Config};
use multicrop::crop::CropSpec;
use multicrop::export::{DeliveryMode, DirectorySink};
use multicrop::imaging::{FrameColor, SkiaBackend, ToneFilters};
use multicrop::output::{self, SourceReport, WrittenPreview};
use multicrop::session::{Session, SessionError};
use multicrop::source::{self, ImageSource, Orientation};
use multicrop::state::StateEvent;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{Level, error, info};

/// Which image to load and how to orient it.
#[derive(clap::Args)]
struct SourceArgs {
    /// Image to crop. Only the first is used when several are given
    #[arg(required = true, value_name = "IMAGE")]
    images: Vec<PathBuf>,

    /// Rotate the image by this many degrees (clockwise) before cropping
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotate: f32,

    /// Mirror left to right
    #[arg(long)]
    flip_h: bool,

    /// Mirror top to bottom
    #[arg(long)]
    flip_v: bool,
}

impl SourceArgs {
    fn load(&self) -> Result<ImageSource, source::SourceError> {
        let path = source::select_upload(&self.images)?;
        let orientation = Orientation {
            rotation_degrees: self.rotate,
            flip_horizontal: self.flip_h,
            flip_vertical: self.flip_v,
        };
        ImageSource::open(path)?.oriented(&orientation)
    }
}

/// Crop placement shared by `preview` and `export`.
#[derive(clap::Args)]
struct CropArgs {
    /// Crop spec, repeatable: square, landscape:zoom=1.5, portrait:zoom=2,pan=30:-10,
    /// square:x,y,w,h. Without any, all three ratios use their centred default
    #[arg(long = "crop", value_name = "SPEC")]
    crops: Vec<CropSpec>,

    /// Brightness in percent (100 = unchanged)
    #[arg(long, default_value_t = 100.0)]
    brightness: f32,

    /// Saturation in percent (100 = unchanged)
    #[arg(long, default_value_t = 100.0)]
    saturation: f32,

    /// Contrast in percent (100 = unchanged)
    #[arg(long, default_value_t = 100.0)]
    contrast: f32,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

impl CropArgs {
    fn tone(&self) -> ToneFilters {
        ToneFilters {
            brightness: self.brightness,
            saturation: self.saturation,
            contrast: self.contrast,
        }
    }

    fn mount(&self, session: &mut Session, now: Instant) -> Result<(), SessionError> {
        if self.crops.is_empty() {
            return session.mount_all(now);
        }
        for spec in &self.crops {
            session.mount(spec, now)?;
        }
        Ok(())
    }
}

#[derive(clap::Args)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    crop: CropArgs,

    /// Base name for output files (extension is dropped). Defaults to the image's name
    #[arg(long)]
    name: Option<String>,

    /// Frame colour: hex, palette name (red, blue, green, yellow, purple, white, black) or "none"
    #[arg(long, value_name = "COLOR")]
    frame_color: Option<String>,

    /// Frame thickness as a percentage of the short edge
    #[arg(long, value_name = "PCT")]
    thickness: Option<f32>,

    /// Produce the circular PNG
    #[arg(long, conflicts_with = "no_circle")]
    circle: bool,

    /// Skip the circular PNG
    #[arg(long)]
    no_circle: bool,

    /// Delivery mode: archive or sequential
    #[arg(long)]
    mode: Option<DeliveryMode>,

    /// Print the delivery report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
#[command(name = "multicrop")]
#[command(about = "Crop one photo into square, landscape and portrait sets")]
#[command(long_about = "\
Crop one photo into square, landscape and portrait sets

Every export can produce up to five files:

  {name}_1x1.jpg          square crop
  {name}_1x1_framed.jpg   square crop with a frame (when a frame colour is set)
  {name}_1x1_circle.png   circular square crop, transparent corners (when enabled)
  {name}_16x9.jpg         landscape crop
  {name}_9x16.jpg         portrait crop

Files are bundled into cropped-images.zip, or saved one by one with
--mode sequential.

Run 'multicrop gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show an image's size and default crops
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the plain preview of each crop
    Preview {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        crop: CropArgs,
    },
    /// Render every variant and deliver them
    Export(ExportArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Inspect { source, json } => {
            let report = SourceReport::new(&source.load()?);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_source_info(&report);
            }
        }
        Command::Preview { source, crop } => {
            let config = config::load_config(&cli.config)?;
            run_preview(&config, &source, &crop)?;
        }
        Command::Export(args) => {
            let config = config::load_config(&cli.config)?;
            run_export(&config, &args)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_preview(
    config: &Config,
    source: &SourceArgs,
    crop: &CropArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(config)?;
    session.load(source.load()?);
    session.apply(StateEvent::ToneChanged(crop.tone()))?;

    let now = Instant::now();
    crop.mount(&mut session, now)?;

    // Nothing moves after mounting, so every crop settles after one window.
    let settled = now + config.preview.debounce();
    let backend = SkiaBackend::new();
    let base = session.state().base_name().unwrap_or_default();
    std::fs::create_dir_all(&crop.out)?;

    let mut written = Vec::new();
    for (aspect, request) in session.poll_previews(settled) {
        let encoded = session.render_preview(&backend, &request)?;
        let file_name = format!("{base}_{}_preview.{}", aspect.tag(), encoded.format.extension());
        std::fs::write(crop.out.join(&file_name), &encoded.bytes)?;
        written.push(WrittenPreview {
            aspect,
            crop: request.crop,
            file_name,
        });
    }
    output::print_previews(&written);
    Ok(())
}

fn run_export(config: &Config, args: &ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(config)?;
    session.load(args.source.load()?);

    if let Some(color) = &args.frame_color {
        session.apply(StateEvent::FrameColorChanged(FrameColor::parse_optional(
            color,
        )?))?;
    }
    if let Some(pct) = args.thickness {
        session.apply(StateEvent::ThicknessChanged(pct))?;
    }
    if args.circle || args.no_circle {
        session.apply(StateEvent::CircularChanged(args.circle))?;
    }
    if let Some(name) = &args.name {
        session.apply(StateEvent::CustomNameChanged(name.clone()))?;
    }
    session.apply(StateEvent::ToneChanged(args.crop.tone()))?;
    if let Some(mode) = args.mode {
        session.delivery_mut().mode = mode;
    }

    args.crop.mount(&mut session, Instant::now())?;

    let mode = session.delivery().mode;
    info!(%mode, out = %args.crop.out.display(), "exporting");
    let mut sink = DirectorySink::new(&args.crop.out)?;
    let report = match session.export(&SkiaBackend::new(), &mut sink) {
        Ok(report) => report,
        Err(SessionError::Export(e)) => {
            error!("{e}");
            return Err(e.user_message(mode).into());
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_delivery(&report, &args.crop.out);
    }
    Ok(())
}
