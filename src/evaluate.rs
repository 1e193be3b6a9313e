//! Accuracy evaluation of every matching method over a frame sequence

use anyhow::{Context, Result};
use chrono::Local;
use image::RgbImage;
use mercy_core::{
    EvalReport, EvaluationHarness, ExpectedLabels, Hero, Label, LabelSmoother, Recognizer,
    WeaponAction,
};
use mercy_cv::{ActionTemplateMatcher, FrameDetector, HeroTemplateMatcher, ImageUtils, MatchingMethod};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// A matching method, optionally followed by temporal smoothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub method: MatchingMethod,
    pub smoothed: bool,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.method.variant_id(), self.method)?;
        if self.smoothed {
            f.write_str("-smoothed")?;
        }
        Ok(())
    }
}

/// Tallies for both label universes
#[derive(Debug, Default)]
pub struct Evaluation {
    pub heroes: EvaluationHarness<Variant>,
    pub actions: EvaluationHarness<Variant>,
}

impl Evaluation {
    pub fn report(&self, source: &str) -> EvalReport {
        let mut report = EvalReport::new();
        report.extend_from(source, "Hero", &self.heroes);
        report.extend_from(source, "Weapon Action", &self.actions);
        report
    }
}

/// Recognizers and smoothing state of one matching method
struct MethodRun {
    method: MatchingMethod,
    heroes: HeroTemplateMatcher,
    actions: HashMap<Hero, ActionTemplateMatcher>,
    hero_smoother: Option<LabelSmoother<Hero>>,
    action_smoother: Option<LabelSmoother<WeaponAction>>,
}

impl MethodRun {
    fn new(detector: &FrameDetector, method: MatchingMethod) -> Result<Self> {
        let smoothing = &detector.config().smoothing;
        let heroes = detector.heroes();

        let (hero_smoother, action_smoother) = if smoothing.enabled {
            (
                Some(LabelSmoother::new(heroes.iter().copied(), smoothing.window)?),
                Some(LabelSmoother::new(WeaponAction::known(), smoothing.window)?),
            )
        } else {
            (None, None)
        };

        let actions = heroes
            .iter()
            .filter_map(|&hero| {
                detector
                    .action_recognizer(hero, method)
                    .map(|recognizer| (hero, recognizer))
            })
            .collect();

        Ok(Self {
            method,
            heroes: detector.hero_recognizer(method),
            actions,
            hero_smoother,
            action_smoother,
        })
    }

    fn raw(&self) -> Variant {
        Variant {
            method: self.method,
            smoothed: false,
        }
    }

    fn smoothed(&self) -> Variant {
        Variant {
            method: self.method,
            smoothed: true,
        }
    }
}

/// Run every matching method over `frames`, in order
///
/// Frame `i` is compared with expected label `i`. Frames whose expected
/// label is the sentinel are not recorded, but still feed the smoothers.
/// Frames that failed to decode are skipped without shifting later indices.
pub fn evaluate_sequence<I>(
    detector: &FrameDetector,
    frames: I,
    expected_heroes: &dyn ExpectedLabels<Hero>,
    expected_actions: Option<&dyn ExpectedLabels<WeaponAction>>,
) -> Result<Evaluation>
where
    I: IntoIterator<Item = Result<RgbImage>>,
{
    let mut runs = MatchingMethod::ALL
        .into_iter()
        .map(|method| MethodRun::new(detector, method))
        .collect::<Result<Vec<_>>>()?;
    let mut evaluation = Evaluation::default();

    for (index, frame) in frames.into_iter().enumerate() {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping frame {}: {:#}", index, e);
                continue;
            }
        };
        let expected_hero = expected_heroes.expected_label(index);
        let expected_action = expected_actions.map(|truth| truth.expected_label(index));

        for run in &mut runs {
            let (raw, smoothed) = (run.raw(), run.smoothed());

            let hero = run.heroes.identify(&frame);
            let smoothed_hero = run.hero_smoother.as_mut().map(|s| s.observe(hero));

            if !expected_hero.is_none() {
                evaluation.heroes.record(raw, &expected_hero, &hero);
                if let Some(smoothed_hero) = smoothed_hero {
                    evaluation.heroes.record(smoothed, &expected_hero, &smoothed_hero);
                }
            }

            let Some(expected_action) = expected_action else {
                continue;
            };

            let action = run
                .actions
                .get(&hero)
                .map(|recognizer| recognizer.identify(&frame))
                .unwrap_or(WeaponAction::NONE);
            let smoothed_action = run.action_smoother.as_mut().map(|s| s.observe(action));

            if !expected_action.is_none() {
                evaluation.actions.record(raw, &expected_action, &action);
                if let Some(smoothed_action) = smoothed_action {
                    evaluation.actions.record(smoothed, &expected_action, &smoothed_action);
                }
            }
        }
    }

    Ok(evaluation)
}

/// Frame images in `dir`, sorted by file name
pub fn list_frames<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut frames: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read frame directory: {:?}", dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|path| {
            path.extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect();

    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(frames)
}

/// Decode frames lazily, one result per path
pub fn load_frames(paths: &[PathBuf]) -> impl Iterator<Item = Result<RgbImage>> + '_ {
    paths.iter().map(ImageUtils::load_color)
}

/// Print one line per variant, guarding empty tallies
pub fn print_summary(evaluation: &Evaluation) {
    for (title, harness) in [("Hero", &evaluation.heroes), ("Weapon Action", &evaluation.actions)] {
        if harness.is_empty() {
            continue;
        }

        println!("{} detection:", title);
        for row in harness.summarize() {
            match row.tally().success_rate() {
                Some(rate) => println!(
                    "  {:<24} {:>6}/{:<6} {:6.2}%",
                    row.variant.to_string(),
                    row.correct,
                    row.total,
                    rate
                ),
                None => println!("  {:<24} no frames with ground truth", row.variant.to_string()),
            }
        }
    }
}

/// Write the report as `Template-Matching-<timestamp>.csv` (and `.json`)
pub fn write_report(report: &EvalReport, out_dir: &Path, json: bool) -> Result<PathBuf> {
    let stem = format!("Template-Matching-{}", Local::now().format("%d%m%Y%H%M%S"));
    let csv_path = out_dir.join(format!("{}.csv", stem));
    report.save_csv(&csv_path)?;
    info!("Evaluation written to {:?}", csv_path);

    if json {
        let json_path = out_dir.join(format!("{}.json", stem));
        fs::write(&json_path, report.to_json()?)
            .with_context(|| format!("Failed to write {:?}", json_path))?;
        info!("Evaluation written to {:?}", json_path);
    }

    Ok(csv_path)
}
