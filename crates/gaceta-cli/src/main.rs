//! gaceta - batch digitizer for scanned gazette PDFs.
//!
//! Walks a source tree of gazette subfolders, detects layout regions on
//! every page with a pretrained model, recovers region text from the
//! embedded text layer (or OCR) and writes one JSON record per document.
//! Reruns skip documents whose output already exists.

// Job and page counts fit comfortably in the progress bar's u64.
#![allow(clippy::cast_possible_truncation)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

use gaceta_core::{Job, TextRepairer, Vocabulary};
use gaceta_layout::onnx::DEFAULT_SCORE_THRESHOLD;
use gaceta_layout::{Device, OnnxDetectorConfig};
use gaceta_ocr::{OcrFactory, TesseractFactory};
use gaceta_pdf::{PdfiumSource, PdfiumSourceFactory};
use gaceta_pipeline::{run_with_observer, ProcessOptions, RunContext};

#[derive(Parser, Debug)]
#[command(
    name = "gaceta",
    version,
    about = "Digitize folders of scanned gazette PDFs into per-document layout records"
)]
struct Args {
    /// Root folder containing the gazette subfolders
    #[arg(long)]
    source: PathBuf,

    /// Output folder template; `{}` is replaced by each subfolder name
    #[arg(long)]
    output: String,

    /// Named subset of subfolders to process (default: every subfolder)
    #[arg(long)]
    subset: Option<String>,

    /// Subset definition file
    #[arg(long, default_value = "subsets.json")]
    subsets_file: PathBuf,

    /// Repair vocabulary, one word per line
    #[arg(long)]
    vocab: PathBuf,

    /// Exported ONNX layout model
    #[arg(long)]
    model: PathBuf,

    /// JSON file mapping class ids to region labels (default: PRIMA labels)
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Minimum detection confidence
    #[arg(long, default_value_t = DEFAULT_SCORE_THRESHOLD)]
    threshold: f32,

    /// Compute device for layout detection (cpu, cuda or cuda:<index>)
    #[arg(long, default_value = "cpu")]
    device: Device,

    /// Folder pool width; 0 processes folders sequentially
    #[arg(long, default_value_t = 0)]
    folder_workers: usize,

    /// Crop pool width per page; 0 extracts region text inline
    #[arg(long, default_value_t = 0)]
    crop_workers: usize,

    /// Recover region text with OCR instead of the embedded text layer
    #[arg(long)]
    ocr: bool,

    /// Tesseract language for OCR
    #[arg(long, default_value = "spa")]
    ocr_lang: String,

    /// Additive pixel margin around detected regions
    #[arg(long, default_value_t = 10.0)]
    margin: f64,

    /// Page render scale factor (1.0 = 72 DPI)
    #[arg(long, default_value_t = 2.0)]
    scale: f32,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

/// Subset definition file: named groups of subfolders.
#[derive(Debug, Deserialize)]
struct SubsetsFile {
    subsets: Vec<Subset>,
}

#[derive(Debug, Deserialize)]
struct Subset {
    name: String,
    subfolders: Vec<String>,
}

/// Resolve which subfolders of the source root this run covers.
///
/// With `--subset`, the named group from the subsets file; otherwise every
/// immediate subdirectory, or the root itself when it has none.
fn select_subfolders(args: &Args) -> Result<Vec<String>> {
    if let Some(name) = &args.subset {
        let raw = std::fs::read_to_string(&args.subsets_file).with_context(|| {
            format!("failed to read subsets file {}", args.subsets_file.display())
        })?;
        let file: SubsetsFile = serde_json::from_str(&raw).with_context(|| {
            format!("failed to parse subsets file {}", args.subsets_file.display())
        })?;
        let known: Vec<String> = file.subsets.iter().map(|s| s.name.clone()).collect();
        let Some(subset) = file.subsets.into_iter().find(|s| &s.name == name) else {
            bail!("unknown subset '{name}' (known subsets: {})", known.join(", "));
        };
        return Ok(subset.subfolders);
    }

    let entries = std::fs::read_dir(&args.source)
        .with_context(|| format!("failed to read source folder {}", args.source.display()))?;
    let mut subfolders: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    subfolders.sort();
    if subfolders.is_empty() {
        // A flat source folder is treated as one job over the root.
        return Ok(vec![String::new()]);
    }
    Ok(subfolders)
}

/// One job per subfolder, with the output template applied.
fn build_jobs(args: &Args, subfolders: &[String]) -> Vec<Job> {
    subfolders
        .iter()
        .map(|sub| {
            let source_folder = if sub.is_empty() {
                args.source.clone()
            } else {
                args.source.join(sub)
            };
            let output_folder = if args.output.contains("{}") {
                PathBuf::from(args.output.replace("{}", sub))
            } else {
                Path::new(&args.output).join(sub)
            };
            Job {
                source_folder,
                output_folder,
                crop_parallelism: args.crop_workers,
                ocr_enabled: args.ocr,
            }
        })
        .collect()
}

/// Class-id to label mapping from a JSON object like `{"1": "TextRegion"}`.
fn load_label_map(path: &Path) -> Result<BTreeMap<i64, String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read label map {}", path.display()))?;
    let parsed: BTreeMap<String, String> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse label map {}", path.display()))?;
    let mut map = BTreeMap::new();
    for (key, label) in parsed {
        let id: i64 = key
            .parse()
            .with_context(|| format!("label map key '{key}' is not a class id"))?;
        map.insert(id, label);
    }
    Ok(map)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Fatal configuration is validated up front; no folder work starts
    // until every shared resource is known to load.
    let vocabulary = Arc::new(Vocabulary::from_file(&args.vocab)?);
    let repairer = TextRepairer::new(vocabulary);

    let subfolders = select_subfolders(&args)?;
    let jobs = build_jobs(&args, &subfolders);

    let mut detector_config = OnnxDetectorConfig::new(args.model.clone());
    detector_config.score_threshold = args.threshold;
    detector_config.device = args.device;
    if let Some(path) = &args.labels {
        detector_config.label_map = load_label_map(path)?;
    }
    if !args.model.is_file() {
        bail!("layout model not found at {}", args.model.display());
    }

    drop(PdfiumSource::bind().context("failed to bind the PDFium library")?);
    let ocr_factory = if args.ocr {
        Some(TesseractFactory::new(&args.ocr_lang)?)
    } else {
        None
    };

    let pages = PdfiumSourceFactory;
    let ctx = RunContext {
        pages: &pages,
        detectors: &detector_config,
        ocr: ocr_factory.as_ref().map(|f| f as &dyn OcrFactory),
        repairer: &repairer,
        options: ProcessOptions {
            margin: args.margin,
            render_scale: args.scale,
        },
    };

    let bar = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(jobs.len() as u64).with_style(
            ProgressStyle::default_bar()
                .template("{bar:40.green} {pos}/{len} folders {msg}")
                .context("progress bar template")?,
        )
    };

    log::info!(
        "digitizing {} folders from {} on {}",
        jobs.len(),
        args.source.display(),
        args.device
    );
    let summary = run_with_observer(&jobs, args.folder_workers, &ctx, |job, job_summary| {
        bar.println(format!(
            "{}: {} written, {} skipped, {} failed",
            job.source_folder.display(),
            job_summary.written,
            job_summary.skipped,
            job_summary.failed
        ));
        bar.inc(1);
    })?;
    bar.finish_and_clear();

    println!(
        "done: {} written, {} skipped, {} failed",
        summary.written, summary.skipped, summary.failed
    );
    Ok(())
}
