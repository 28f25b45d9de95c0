use clap::Parser;
use objloc::image::io::load_gray_image;
use objloc::label::{append_label, truncate};
use objloc::{
    BruteForceMatcher, ClassParams, CornerConfig, CornerExtractor, Evaluation, Label, ObjLocError,
    ObjectClass, OwnedImage, Outcome, PipelineConfig, ReferenceSet, SceneDetector,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Locate the sugar box, mustard bottle and power drill in a scene"
)]
struct Cli {
    /// Directory of power drill reference views.
    #[arg(short = 'p', long, value_name = "DIR", required_unless_present_any = ["print_schema", "print_example"])]
    power_drill: Option<PathBuf>,
    /// Directory of mustard bottle reference views.
    #[arg(short = 'm', long, value_name = "DIR", required_unless_present_any = ["print_schema", "print_example"])]
    mustard_bottle: Option<PathBuf>,
    /// Directory of sugar box reference views.
    #[arg(short = 's', long, value_name = "DIR", required_unless_present_any = ["print_schema", "print_example"])]
    sugar_box: Option<PathBuf>,
    /// Scene image.
    #[arg(short = 'i', long, value_name = "FILE", required_unless_present_any = ["print_schema", "print_example"])]
    scene: Option<PathBuf>,
    /// Ground-truth label file.
    #[arg(short = 'l', long, value_name = "FILE", required_unless_present_any = ["print_schema", "print_example"])]
    labels: Option<PathBuf>,
    /// Predicted label file, recreated on every run.
    #[arg(short = 'o', long, value_name = "FILE", default_value = "output_label.txt")]
    output: PathBuf,
    /// Metrics file; each run appends one block.
    #[arg(long, value_name = "FILE", default_value = "metrics.txt")]
    metrics: PathBuf,
    /// Optional JSON tuning file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Log pipeline stages to stderr.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CornerConfigJson {
    max_levels: usize,
    min_level_side: usize,
    window_radius: usize,
    harris_k: f32,
    quality: f32,
    nms_radius: usize,
    max_per_level: usize,
    patch_radius: usize,
    patch_grid: usize,
}

impl Default for CornerConfigJson {
    fn default() -> Self {
        let cfg = CornerConfig::default();
        Self {
            max_levels: cfg.max_levels,
            min_level_side: cfg.min_level_side,
            window_radius: cfg.window_radius,
            harris_k: cfg.harris_k,
            quality: cfg.quality,
            nms_radius: cfg.nms_radius,
            max_per_level: cfg.max_per_level,
            patch_radius: cfg.patch_radius,
            patch_grid: cfg.patch_grid,
        }
    }
}

impl From<CornerConfigJson> for CornerConfig {
    fn from(value: CornerConfigJson) -> Self {
        Self {
            max_levels: value.max_levels,
            min_level_side: value.min_level_side,
            window_radius: value.window_radius,
            harris_k: value.harris_k,
            quality: value.quality,
            nms_radius: value.nms_radius,
            max_per_level: value.max_per_level,
            patch_radius: value.patch_radius,
            patch_grid: value.patch_grid,
        }
    }
}

/// Per-class overrides; unset fields keep the class defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ClassParamsJson {
    ratio_threshold: Option<f32>,
    center_radius: Option<f64>,
    neighbor_radius: Option<f64>,
    min_neighbors: Option<usize>,
    min_density: Option<f64>,
    min_points: Option<usize>,
    box_expansion: Option<f64>,
}

impl ClassParamsJson {
    fn apply(&self, base: ClassParams) -> ClassParams {
        ClassParams {
            ratio_threshold: self.ratio_threshold.unwrap_or(base.ratio_threshold),
            center_radius: self.center_radius.unwrap_or(base.center_radius),
            neighbor_radius: self.neighbor_radius.unwrap_or(base.neighbor_radius),
            min_neighbors: self.min_neighbors.unwrap_or(base.min_neighbors),
            min_density: self.min_density.unwrap_or(base.min_density),
            min_points: self.min_points.unwrap_or(base.min_points),
            box_expansion: self.box_expansion.unwrap_or(base.box_expansion),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ClassTableJson {
    sugar_box: ClassParamsJson,
    mustard_bottle: ClassParamsJson,
    power_drill: ClassParamsJson,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    max_points: usize,
    knn: usize,
    clamp_to_scene: bool,
    parallel: bool,
    features: CornerConfigJson,
    classes: ClassTableJson,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = PipelineConfig::default();
        Self {
            max_points: cfg.max_points,
            knn: cfg.knn,
            clamp_to_scene: cfg.clamp_to_scene,
            parallel: false,
            features: CornerConfigJson::default(),
            classes: ClassTableJson::default(),
        }
    }
}

impl Config {
    fn pipeline_config(&self) -> Result<PipelineConfig, ObjLocError> {
        let mut cfg = PipelineConfig {
            max_points: self.max_points,
            knn: self.knn,
            clamp_to_scene: self.clamp_to_scene,
            ..PipelineConfig::default()
        };
        let overrides = [
            (ObjectClass::SugarBox, &self.classes.sugar_box),
            (ObjectClass::MustardBottle, &self.classes.mustard_bottle),
            (ObjectClass::PowerDrill, &self.classes.power_drill),
        ];
        for (class, json) in overrides {
            let params = json.apply(ClassParams::for_class(class));
            cfg.params.set(class, params)?;
        }
        Ok(cfg)
    }
}

/// Image files of a reference directory in name order.
fn list_reference_views(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| format!("{}: {e}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Loads every readable view; unreadable files are skipped with a warning.
fn load_reference_views(class: ObjectClass, dir: &Path) -> Result<Vec<OwnedImage>, Box<dyn std::error::Error>> {
    let mut images = Vec::new();
    for path in list_reference_views(dir)? {
        match load_gray_image(&path) {
            Ok(img) => images.push(img),
            Err(err) => tracing::warn!(class = class.label_id(), "skipping reference view: {err}"),
        }
    }
    if images.is_empty() {
        return Err(ObjLocError::EmptyReferenceSet {
            class: class.label_id(),
        }
        .into());
    }
    Ok(images)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let directive = if cli.trace { "objloc=info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let (Some(power_drill), Some(mustard_bottle), Some(sugar_box), Some(scene_path), Some(labels)) = (
        cli.power_drill,
        cli.mustard_bottle,
        cli.sugar_box,
        cli.scene,
        cli.labels,
    ) else {
        return Err("reference directories, scene and labels must all be set".into());
    };

    let config: Config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
            serde_json::from_str(&text)?
        }
        None => Config::default(),
    };
    let pipeline = config.pipeline_config()?;
    let parallel = config.parallel;
    let extractor = CornerExtractor::new(CornerConfig::from(config.features))?;
    let matcher = BruteForceMatcher::new().with_parallel(parallel);
    let detector = SceneDetector::new(extractor, matcher, pipeline)?;

    let scene = load_gray_image(&scene_path)?;
    let scene_size = (scene.width(), scene.height());
    let scene_features = detector.extract_scene(scene.view())?;

    let dirs = [
        (ObjectClass::SugarBox, sugar_box),
        (ObjectClass::MustardBottle, mustard_bottle),
        (ObjectClass::PowerDrill, power_drill),
    ];
    let mut refs: Vec<ReferenceSet> = Vec::with_capacity(dirs.len());
    for (class, dir) in &dirs {
        let images = load_reference_views(*class, dir)?;
        let views: Vec<_> = images.iter().map(OwnedImage::view).collect();
        refs.push(detector.extract_references(*class, &views)?);
    }

    #[cfg(feature = "rayon")]
    let outcomes = if parallel {
        detector.detect_all_par(&refs, &scene_features, scene_size)?
    } else {
        detector.detect_all(&refs, &scene_features, scene_size)?
    };
    #[cfg(not(feature = "rayon"))]
    let outcomes = detector.detect_all(&refs, &scene_features, scene_size)?;

    truncate(&cli.output)?;
    for outcome in &outcomes {
        match outcome {
            Outcome::Detected(det) => {
                let label = Label::new(det.class, det.bbox);
                println!(
                    "{}: density {:.2}, {} points, box {label}",
                    det.class.display_name(),
                    det.score.density,
                    det.score.count
                );
                append_label(&cli.output, &label)?;
            }
            Outcome::NotDetected { class, stage, .. } => {
                println!("{}: not detected ({stage})", class.display_name());
            }
        }
    }

    let report = Evaluation::from_files(&cli.output, &labels)?.score().report();
    print!("{report}");
    match report.mean_iou() {
        Some(miou) => println!("mIoU = {miou:.4}"),
        None => println!("mIoU = n/a (no ground-truth labels)"),
    }
    report.append_to(&cli.metrics)?;

    Ok(())
}
