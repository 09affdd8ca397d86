use std::path::PathBuf;
use std::sync::mpsc::Sender;

use eframe::egui;

use super::loader::ingest_file;
use super::model::{IngestOptions, Ingested};

// ---------------------------------------------------------------------------
// Background ingestion
// ---------------------------------------------------------------------------

/// Completion message of one background load.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Token handed out when the load was requested.
    pub generation: u64,
    pub path: PathBuf,
    pub result: anyhow::Result<Ingested>,
}

/// Ingest `path` on a worker thread and send the outcome back.
///
/// The UI only applies an outcome whose `generation` is still the latest
/// one it asked for.
pub fn spawn_load(
    path: PathBuf,
    options: IngestOptions,
    generation: u64,
    tx: Sender<LoadOutcome>,
    ctx: Option<egui::Context>,
) {
    std::thread::spawn(move || {
        log::debug!("load #{generation} started for {}", path.display());
        let result = ingest_file(&path, &options);

        if tx
            .send(LoadOutcome {
                generation,
                path,
                result,
            })
            .is_err()
        {
            log::debug!("load #{generation} finished after the receiver went away");
            return;
        }

        if let Some(ctx) = ctx {
            ctx.request_repaint();
        }
    });
}
