//! Folder-level batch orchestration.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use gaceta_core::{Job, TextRepairer};
use gaceta_layout::DetectorFactory;
use gaceta_ocr::OcrFactory;
use gaceta_pdf::PageSourceFactory;

use crate::document::{DocumentOutcome, DocumentProcessor, ProcessOptions};
use crate::error::PipelineError;

/// Shared read-only state of one batch run.
///
/// The factories are the per-worker binding points: each folder worker
/// creates its own page source, detector and OCR engine from them, while
/// the repairer and options are shared directly.
pub struct RunContext<'a> {
    pub pages: &'a dyn PageSourceFactory,
    pub detectors: &'a dyn DetectorFactory,
    /// OCR binding point; `None` when the run has no OCR configured.
    pub ocr: Option<&'a dyn OcrFactory>,
    pub repairer: &'a TextRepairer,
    pub options: ProcessOptions,
}

/// Per-folder document counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Aggregate counts across every folder of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn absorb(&mut self, job: &JobSummary) {
        self.written += job.written;
        self.skipped += job.skipped;
        self.failed += job.failed;
    }
}

/// Process every job, distributing whole folders across a bounded pool.
///
/// A folder is never split across workers. `width == 0` processes the
/// jobs sequentially on the calling thread; any other width builds a
/// dedicated pool of that many workers.
///
/// # Errors
///
/// Only configuration-level failures abort the run: pool construction,
/// worker resource binding (PDFium, model session, OCR language) and
/// source-folder scanning. Per-document failures are logged and counted
/// in the summary instead.
pub fn run(jobs: &[Job], width: usize, ctx: &RunContext<'_>) -> Result<RunSummary, PipelineError> {
    run_with_observer(jobs, width, ctx, |_, _| {})
}

/// [`run`] with a per-job completion callback.
///
/// The observer fires once per finished folder, possibly from a worker
/// thread, and is how the CLI drives its progress bar.
pub fn run_with_observer<F>(
    jobs: &[Job],
    width: usize,
    ctx: &RunContext<'_>,
    on_job_done: F,
) -> Result<RunSummary, PipelineError>
where
    F: Fn(&Job, &JobSummary) + Sync,
{
    let summaries: Vec<JobSummary> = if width == 0 {
        jobs.iter()
            .map(|job| {
                let summary = run_job(job, ctx)?;
                on_job_done(job, &summary);
                Ok(summary)
            })
            .collect::<Result<_, PipelineError>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(width)
            .build()
            .map_err(|e| PipelineError::Pool(e.to_string()))?;
        pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    let summary = run_job(job, ctx)?;
                    on_job_done(job, &summary);
                    Ok(summary)
                })
                .collect::<Result<_, PipelineError>>()
        })?
    };

    let mut total = RunSummary::default();
    for summary in &summaries {
        total.absorb(summary);
    }
    log::info!(
        "run finished: {} written, {} skipped, {} failed across {} folders",
        total.written,
        total.skipped,
        total.failed,
        jobs.len()
    );
    Ok(total)
}

/// Process one folder on the calling worker.
fn run_job(job: &Job, ctx: &RunContext<'_>) -> Result<JobSummary, PipelineError> {
    std::fs::create_dir_all(&job.output_folder).map_err(|source| PipelineError::OutputWrite {
        path: job.output_folder.clone(),
        source,
    })?;
    let files = collect_pdfs(&job.source_folder)?;
    log::info!(
        "processing {} documents from {}",
        files.len(),
        job.source_folder.display()
    );

    // Bind this worker's own resources; neither PDFium nor the model
    // session is shared across threads.
    let source = ctx.pages.create()?;
    let mut detector = ctx.detectors.create()?;
    let mut ocr = if job.ocr_enabled {
        if job.crop_parallelism > 0 {
            log::warn!(
                "crop pool only does positional extraction; OCR disabled for {}",
                job.source_folder.display()
            );
            None
        } else {
            match ctx.ocr {
                Some(factory) => Some(factory.create()?),
                None => {
                    log::warn!(
                        "OCR requested for {} but no engine is configured",
                        job.source_folder.display()
                    );
                    None
                }
            }
        }
    } else {
        None
    };

    let mut summary = JobSummary::default();
    for file in &files {
        let mut processor = DocumentProcessor {
            pages: source.as_ref(),
            page_factory: ctx.pages,
            detector: detector.as_mut(),
            ocr: ocr.as_deref_mut(),
            repairer: ctx.repairer,
            options: &ctx.options,
        };
        match processor.process(file, &job.output_folder, job.crop_parallelism) {
            Ok(DocumentOutcome::Written(out)) => {
                log::info!("wrote {}", out.display());
                summary.written += 1;
            }
            Ok(DocumentOutcome::Skipped) => summary.skipped += 1,
            // One bad document never stops its siblings.
            Err(e) => {
                log::error!("failed to process {}: {e}", file.display());
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// All `.pdf` files under `root`, recursively, in sorted path order.
///
/// Extension matching is case-insensitive; everything else is ignored.
fn collect_pdfs(root: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let scan_err = |source: std::io::Error| PipelineError::FolderScan {
        path: root.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).map_err(scan_err)? {
            let path = entry.map_err(scan_err)?.path();
            if path.is_dir() {
                stack.push(path);
            } else if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}
