use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use mercy_core::{ConstantLabel, ExpectedLabels, GroundTruth, Hero, Label, WeaponAction};
use mercy_cv::template::loader::WEAPON_ACTION_DIR;
use mercy_cv::{DetectionConfig, FrameDetector, MatchingMethod, TemplateLoader};
use std::path::{Path, PathBuf};
use tracing::info;

mod evaluate;

#[derive(Parser)]
#[command(name = "mercy")]
#[command(about = "Identify the hero and weapon action shown in gameplay frames")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify hero and weapon action in one frame
    Identify {
        /// Path to the frame image
        #[arg(long)]
        image: PathBuf,

        #[command(flatten)]
        detection: DetectionArgs,
    },

    /// Measure accuracy of every matching method over a directory of frames
    Evaluate {
        /// Directory of frame images, ordered by file name
        #[arg(long)]
        frames: PathBuf,

        /// Ground-truth CSV with one row per frame
        #[arg(long, conflicts_with = "hero", required_unless_present = "hero")]
        ground_truth: Option<PathBuf>,

        /// Hero shown in every frame
        #[arg(long, value_parser = parse_hero)]
        hero: Option<Hero>,

        /// Output directory (defaults to the configured one)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Also write the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        detection: DetectionArgs,
    },

    /// Write `<Name>_Edge.png` maps for the configured hero and weapon-action templates
    ExportEdges {
        /// Output directory; weapon actions go to its `Weapon_Actions` subdirectory
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        detection: DetectionArgs,
    },

    /// Write a blank ground-truth file
    InitGroundTruth {
        /// Number of frames
        #[arg(long)]
        frames: usize,

        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args)]
struct DetectionArgs {
    /// Detection configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Matching method: sqdiff, sqdiff-normed, ccorr, ccorr-normed
    #[arg(long, value_parser = parse_method)]
    method: Option<MatchingMethod>,
}

impl DetectionArgs {
    fn load_config(&self) -> Result<DetectionConfig> {
        let mut config = match &self.config {
            Some(path) => DetectionConfig::from_json_file(path)?,
            None => DetectionConfig::default(),
        };
        if let Some(method) = self.method {
            config.template_config.matching_method = method;
        }
        Ok(config)
    }
}

fn parse_hero(name: &str) -> Result<Hero, String> {
    Hero::parse_name(name).map_err(|e| e.to_string())
}

fn parse_method(name: &str) -> Result<MatchingMethod, String> {
    MatchingMethod::from_name(name).ok_or_else(|| format!("unknown matching method: '{}'", name))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Identify { image, detection } => run_identify(&image, &detection),
        Commands::Evaluate {
            frames,
            ground_truth,
            hero,
            out,
            json,
            detection,
        } => run_evaluate(&frames, ground_truth.as_deref(), hero, out, json, &detection),
        Commands::ExportEdges { out, detection } => run_export_edges(&out, &detection),
        Commands::InitGroundTruth { frames, out } => {
            GroundTruth::new(frames)?.save(&out)?;
            info!("Blank ground truth for {} frames written to {:?}", frames, out);
            Ok(())
        }
    }
}

fn run_identify(image: &Path, args: &DetectionArgs) -> Result<()> {
    let detector = FrameDetector::new(args.load_config()?)?;

    let detections = match args.method {
        Some(method) => {
            let frame = mercy_cv::ImageUtils::load_color(image)?;
            vec![detector.detect_with(&frame, method)]
        }
        None => detector.detect_file(image)?,
    };

    for detection in detections {
        match detection.action {
            Some(action) => println!(
                "{:<14} hero: {:<14} action: {} ({}ms)",
                detection.method, detection.hero, action, detection.processing_time_ms
            ),
            None => println!(
                "{:<14} hero: {} ({}ms)",
                detection.method, detection.hero, detection.processing_time_ms
            ),
        }
    }

    Ok(())
}

fn run_export_edges(out: &Path, args: &DetectionArgs) -> Result<()> {
    let config = args.load_config()?;
    let params = &config.template_config.preprocessing_params;

    let loader = config
        .template_dirs
        .iter()
        .fold(TemplateLoader::new(), |loader, dir| loader.add_template_dir(dir));

    let heroes = loader.export_edge_templates(params, out)?;
    let actions = loader
        .weapon_action_loader()
        .export_edge_templates(params, out.join(WEAPON_ACTION_DIR))?;
    if heroes.is_empty() && actions.is_empty() {
        bail!("No templates found in {:?}", config.template_dirs);
    }

    println!("Wrote {} hero and {} weapon action edge templates", heroes.len(), actions.len());
    Ok(())
}

fn run_evaluate(
    frames_dir: &Path,
    ground_truth: Option<&Path>,
    hero: Option<Hero>,
    out: Option<PathBuf>,
    json: bool,
    args: &DetectionArgs,
) -> Result<()> {
    let config = args.load_config()?;
    let out_dir = out.unwrap_or_else(|| config.output_dir.clone());
    let detector = FrameDetector::new(config)?;

    let frames = evaluate::list_frames(frames_dir)?;
    if frames.is_empty() {
        bail!("No frames found in {:?}", frames_dir);
    }
    info!("Evaluating {} frames from {:?}", frames.len(), frames_dir);

    let evaluation = match (ground_truth, hero) {
        (Some(path), _) => {
            let truth = GroundTruth::load(path)?;
            if truth.len() != frames.len() {
                tracing::warn!(
                    "Ground truth covers {} frames, directory holds {}",
                    truth.len(),
                    frames.len()
                );
            }
            let actions: &dyn ExpectedLabels<WeaponAction> = &truth;
            evaluate::evaluate_sequence(
                &detector,
                evaluate::load_frames(&frames),
                &truth,
                Some(actions),
            )?
        }
        (None, Some(hero)) if !hero.is_none() => {
            let truth = ConstantLabel {
                label: hero,
                frame_count: frames.len(),
            };
            evaluate::evaluate_sequence(&detector, evaluate::load_frames(&frames), &truth, None)?
        }
        _ => bail!("Either --ground-truth or a detectable --hero is required"),
    };

    evaluate::print_summary(&evaluation);

    let source = frames_dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| frames_dir.to_string_lossy().to_string());
    evaluate::write_report(&evaluation.report(&source), &out_dir, json)?;

    Ok(())
}
