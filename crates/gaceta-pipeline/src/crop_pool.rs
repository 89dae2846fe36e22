//! Bounded pool dispatch for one page's region-extraction tasks.

use std::sync::mpsc;

use gaceta_core::{CropTask, TextRepairer};
use gaceta_pdf::{extract_in_rect, PageSourceFactory};

use crate::error::PipelineError;

/// Run every task on a bounded pool and collect results in task order.
///
/// The pool lives for the duration of one call (one page); there is no
/// cross-page pool reuse. Workers send `(index, result)` pairs over a
/// channel and results land in a pre-sized slot vector addressed by the
/// task's original index, so the returned ordering matches submission
/// order regardless of completion order.
///
/// A failed task is isolated to its slot: it is logged and left as `None`,
/// never aborting the rest of the page.
///
/// # Errors
///
/// Only pool construction can fail; task failures never propagate.
pub fn dispatch_with<F>(
    tasks: &[CropTask],
    width: usize,
    run: F,
) -> Result<Vec<Option<String>>, PipelineError>
where
    F: Fn(&CropTask) -> Result<String, PipelineError> + Sync,
{
    let mut slots: Vec<Option<String>> = vec![None; tasks.len()];
    if tasks.is_empty() {
        return Ok(slots);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(width.max(1))
        .build()
        .map_err(|e| PipelineError::Pool(e.to_string()))?;

    let (tx, rx) = mpsc::channel();
    pool.scope(|scope| {
        for (index, task) in tasks.iter().enumerate() {
            let tx = tx.clone();
            let run = &run;
            scope.spawn(move |_| {
                let _ = tx.send((index, run(task)));
            });
        }
    });
    drop(tx);

    while let Ok((index, result)) = rx.recv() {
        match result {
            Ok(text) => slots[index] = Some(text),
            Err(e) => log::warn!(
                "crop task {index} on page {} of {} failed: {e}",
                tasks[index].page_index,
                tasks[index].source_path.display()
            ),
        }
    }
    Ok(slots)
}

/// Dispatch positional-extraction tasks on a bounded pool.
///
/// Each task independently binds a page source, parses its page's
/// character layer, filters it by the task rectangle and repairs the
/// result; tasks share nothing but the read-only vocabulary.
///
/// # Errors
///
/// Only pool construction can fail; task failures leave `None` slots.
pub fn dispatch(
    tasks: &[CropTask],
    width: usize,
    repairer: &TextRepairer,
    pages: &dyn PageSourceFactory,
) -> Result<Vec<Option<String>>, PipelineError> {
    dispatch_with(tasks, width, |task| {
        let source = pages.create()?;
        let chars = source.char_spans(&task.source_path, task.page_index)?;
        let raw = extract_in_rect(&chars, task.page_width, task.page_height, &task.rect);
        Ok(repairer.repair(&raw))
    })
}
