use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use eframe::egui;

use crate::color::ColorMap;
use crate::data::filter::{apply_filters, FilterState};
use crate::data::model::{IngestOptions, IngestReport, Ingested, Property};
use crate::data::stats::{calculate_statistics, Statistics};
use crate::data::worker::{spawn_load, LoadOutcome};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// Message shown in the top bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// A load or export failed.
    Error(String),
    /// The last load succeeded but something was skipped or coerced.
    Warnings(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Error(msg) | Status::Warnings(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// All listings of the last successful load, sorted by $/sqft.
    pub listings: Vec<Property>,

    /// Raw text of the filter inputs.
    pub filters: FilterState,

    /// Listings passing the current filters (cached).
    pub visible: Vec<Property>,

    /// Statistics over `visible` (cached).
    pub statistics: Statistics,

    /// Colour per bedroom count.
    pub color_map: ColorMap,

    /// Options used for the next load.
    pub options: IngestOptions,

    /// File the current listings came from.
    pub source: Option<PathBuf>,

    /// Diagnostics of the last successful load.
    pub report: Option<IngestReport>,

    /// Error or load warnings shown in the UI.
    pub status: Option<Status>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,

    /// Token of the most recently requested load.
    generation: u64,
    load_tx: Sender<LoadOutcome>,
    load_rx: Receiver<LoadOutcome>,
}

impl Default for AppState {
    fn default() -> Self {
        let (load_tx, load_rx) = mpsc::channel();
        Self {
            listings: Vec::new(),
            filters: FilterState::default(),
            visible: Vec::new(),
            statistics: Statistics::default(),
            color_map: ColorMap::default(),
            options: IngestOptions::default(),
            source: None,
            report: None,
            status: None,
            loading: false,
            generation: 0,
            load_tx,
            load_rx,
        }
    }
}

impl AppState {
    /// Start loading `path` in the background.  Any load still in flight
    /// becomes stale.
    pub fn start_load(&mut self, path: PathBuf, ctx: Option<&egui::Context>) -> u64 {
        self.generation += 1;
        self.loading = true;
        log::info!("Loading {} (load #{})", path.display(), self.generation);
        spawn_load(
            path,
            self.options,
            self.generation,
            self.load_tx.clone(),
            ctx.cloned(),
        );
        self.generation
    }

    /// Re-ingest the current source with the current options.
    pub fn reload(&mut self, ctx: Option<&egui::Context>) {
        if let Some(path) = self.source.clone() {
            self.start_load(path, ctx);
        }
    }

    /// Apply every finished load waiting on the channel.
    pub fn poll_loads(&mut self) {
        while let Ok(outcome) = self.load_rx.try_recv() {
            self.apply_outcome(outcome);
        }
    }

    /// Apply one load outcome.  Returns `false` when it was stale.
    pub fn apply_outcome(&mut self, outcome: LoadOutcome) -> bool {
        if outcome.generation != self.generation {
            log::warn!(
                "Ignoring stale load #{} of {} (latest is #{})",
                outcome.generation,
                outcome.path.display(),
                self.generation
            );
            return false;
        }

        self.loading = false;
        match outcome.result {
            Ok(ingested) => {
                log::info!(
                    "Loaded {} from {}",
                    ingested.report.summary(),
                    outcome.path.display()
                );
                self.source = Some(outcome.path);
                self.set_listings(ingested);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", outcome.path.display());
                self.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
        true
    }

    /// Replace the whole collection and recompute derived state.
    pub fn set_listings(&mut self, ingested: Ingested) {
        let warnings = ingested.report.warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        self.status = (!warnings.is_empty()).then(|| Status::Warnings(warnings.join("; ")));

        self.color_map = ColorMap::from_listings(&ingested.listings);
        self.listings = ingested.listings;
        self.report = Some(ingested.report);
        self.refilter();
    }

    /// Recompute `visible` and `statistics` after a data or filter change.
    pub fn refilter(&mut self) {
        self.visible = apply_filters(&self.listings, &self.filters);
        self.statistics = calculate_statistics(&self.visible);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::data::model::{IngestOptions, IngestReport, SourceFormat};

    fn temp_csv(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "rusty-estate-state-{}-{name}.csv",
            std::process::id()
        ));
        std::fs::write(&path, body).unwrap();
        path
    }

    fn listing(beds: i64, zip: &str, price: f64) -> Property {
        Property {
            price,
            beds,
            baths: 1.0,
            zip_code: zip.to_string(),
            square_feet: 1000.0,
            lot_size: 0.0,
            price_per_square_foot: price / 1000.0,
            days_on_market: None,
            year_built: None,
        }
    }

    fn ingested(listings: Vec<Property>) -> Ingested {
        let mut report = IngestReport::new(SourceFormat::Csv, IngestOptions::default());
        report.rows_read = listings.len();
        report.listings = listings.len();
        Ingested { listings, report }
    }

    #[test]
    fn filter_edits_update_visible_and_statistics() {
        let mut state = AppState::default();
        state.set_listings(ingested(vec![
            listing(3, "98103", 100.0),
            listing(2, "98103", 300.0),
            listing(3, "98105", 500.0),
        ]));
        assert_eq!(state.visible.len(), 3);
        assert_eq!(state.statistics.average_price, "300.00");

        state.filters.bedrooms = "3".to_string();
        state.refilter();
        assert_eq!(state.visible.len(), 2);
        assert_eq!(state.statistics.average_price, "300.00");
        assert_eq!(state.statistics.median_price, "500.00");

        state.filters.zip_code = "99999".to_string();
        state.refilter();
        assert!(state.visible.is_empty());
        assert_eq!(state.statistics.average_price, "0.00");

        state.clear_filters();
        assert_eq!(state.visible, state.listings);
    }

    #[test]
    fn stale_outcomes_are_ignored() {
        let mut state = AppState::default();
        let first = state.start_load(PathBuf::from("first.csv"), None);
        let second = state.start_load(PathBuf::from("second.csv"), None);
        assert!(second > first);

        let stale = LoadOutcome {
            generation: first,
            path: PathBuf::from("first.csv"),
            result: Ok(ingested(vec![listing(1, "1", 1.0)])),
        };
        assert!(!state.apply_outcome(stale));
        assert!(state.listings.is_empty());
        assert!(state.loading);

        let current = LoadOutcome {
            generation: second,
            path: PathBuf::from("second.csv"),
            result: Ok(ingested(vec![listing(2, "2", 2.0), listing(3, "3", 3.0)])),
        };
        assert!(state.apply_outcome(current));
        assert_eq!(state.listings.len(), 2);
        assert!(!state.loading);
        assert_eq!(state.source, Some(PathBuf::from("second.csv")));
    }

    #[test]
    fn overlapping_background_loads_keep_the_latest() {
        let header = "PRICE,BEDS,SQUARE FEET,$/SQUARE FEET\n";
        let older = temp_csv("older", &format!("{header}100000,1,500,200\n"));
        let newer = temp_csv("newer", &format!("{header}200000,2,1000,200\n300000,3,1000,300\n"));

        let mut state = AppState::default();
        state.start_load(older.clone(), None);
        state.start_load(newer.clone(), None);

        for _ in 0..2 {
            let outcome = state.load_rx.recv_timeout(Duration::from_secs(10)).unwrap();
            state.apply_outcome(outcome);
        }
        std::fs::remove_file(&older).ok();
        std::fs::remove_file(&newer).ok();

        assert_eq!(state.source, Some(newer));
        assert_eq!(state.listings.len(), 2);
        assert_eq!(state.statistics.average_price, "250000.00");
    }

    #[test]
    fn failed_load_keeps_previous_listings() {
        let mut state = AppState::default();
        state.set_listings(ingested(vec![listing(2, "98103", 1.0)]));
        let generation = state.start_load(PathBuf::from("missing.csv"), None);

        let outcome = LoadOutcome {
            generation,
            path: PathBuf::from("missing.csv"),
            result: Err(anyhow::anyhow!("opening missing.csv")),
        };
        state.apply_outcome(outcome);
        assert_eq!(state.listings.len(), 1);
        assert!(matches!(state.status, Some(Status::Error(_))));
        assert!(!state.loading);
    }

    #[test]
    fn warnings_stay_warnings_whatever_their_text() {
        let mut state = AppState::default();
        let mut load = ingested(vec![listing(2, "98103", 1.0)]);
        load.report.missing_columns = vec!["Error: bad header".to_string()];
        state.set_listings(load);

        let status = state.status.clone().unwrap();
        assert!(!status.is_error());
        assert!(status.text().contains("Error: bad header"));

        state.set_listings(ingested(vec![listing(2, "98103", 1.0)]));
        assert_eq!(state.status, None);
    }

    #[test]
    fn five_row_file_with_blank_square_feet() {
        let body = "\
PRICE,BEDS,ZIP OR POSTAL CODE,SQUARE FEET,$/SQUARE FEET
400000,3,98103,1000,400
300000,2,98103,1500,200
900000,3,98105,3000,300
500000,3,98105,,
250000,1,98107,1000,250
";
        let path = temp_csv("five", body);

        // default: the blank row is excluded everywhere
        let mut state = AppState::default();
        let generation = state.start_load(path.clone(), None);
        let outcome = state.load_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(outcome.generation, generation);
        state.apply_outcome(outcome);
        assert_eq!(state.listings.len(), 4);
        assert!(state.listings.iter().all(|p| p.square_feet > 0.0));
        state.filters.bedrooms = "3".to_string();
        state.refilter();
        assert_eq!(state.visible.len(), 2);
        assert_eq!(state.statistics.average_price, "650000.00");
        assert_eq!(state.statistics.average_price_per_sq_ft, "350.00");

        // legacy: first row dropped, blank row kept with zeroes
        let mut legacy = AppState {
            options: IngestOptions::legacy(),
            ..AppState::default()
        };
        legacy.start_load(path.clone(), None);
        let outcome = legacy.load_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        legacy.apply_outcome(outcome);
        std::fs::remove_file(&path).ok();

        assert_eq!(legacy.listings.len(), 4);
        assert!(legacy.listings.iter().all(|p| p.price != 400_000.0));
        let blank = legacy.listings.iter().find(|p| p.price == 500_000.0).unwrap();
        assert_eq!(blank.square_feet, 0.0);
        legacy.filters.bedrooms = "3".to_string();
        legacy.refilter();
        assert_eq!(legacy.visible.len(), 2);
        assert_eq!(legacy.statistics.average_price, "700000.00");
        assert_eq!(legacy.statistics.average_price_per_sq_ft, "150.00");
        assert!(matches!(legacy.status, Some(Status::Warnings(_))));
    }
}
