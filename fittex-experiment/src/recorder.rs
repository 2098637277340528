use crate::metrics;
use fittex_core::{TrialRecord, TrialSpec};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CSV_HEADER: [&str; 9] = [
    "Size", "Gap", "Side", "Error", "Time(ms)", "Distance", "A", "W", "ID",
];

/// Accumulates per-trial records in chronological order and serializes them
/// to a comma-separated file at session end.
#[derive(Debug, Default)]
pub struct SessionRecorder {
    log: Vec<TrialRecord>,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.log
    }

    /// Opens a pending slot for a freshly drawn spec
    pub fn open(&mut self, spec: TrialSpec) {
        self.log.push(TrialRecord::pending(spec));
    }

    /// Fills elapsed time and path distance on the most recent slot. Called
    /// on every attempt; a retry's values overwrite the miss's.
    pub fn score_last(&mut self, time_ms: u64, distance: f64) {
        if let Some(record) = self.log.last_mut() {
            record.time_ms = Some(time_ms);
            record.distance = Some(distance);
        }
    }

    /// Fills the accumulated miss count on the most recent slot. Called once,
    /// on the hit that completes the logical trial.
    pub fn record_errors(&mut self, errors: u32) {
        if let Some(record) = self.log.last_mut() {
            record.errors = Some(errors);
        }
    }

    /// Expands every record into its output row, header first. The derived
    /// columns A, W and ID are computed here from the stored spec.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.log.len() + 1);
        rows.push(CSV_HEADER.iter().map(|s| s.to_string()).collect());
        for record in &self.log {
            let geometry = record.spec.geometry();
            let amplitude = geometry.amplitude();
            let width = geometry.width();
            let id = metrics::index_of_difficulty(amplitude, width);
            rows.push(vec![
                record.spec.size.to_string(),
                record.spec.gap.to_string(),
                record.spec.side.to_string(),
                record.errors.unwrap_or(0).to_string(),
                record.time_ms.unwrap_or(0).to_string(),
                record.distance.unwrap_or(0.0).to_string(),
                amplitude.to_string(),
                width.to_string(),
                id.to_string(),
            ]);
        }
        rows
    }

    /// Writes the full log as CSV, newline-terminated rows. Overwrites any
    /// existing file at `path` without warning.
    pub fn write_csv(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        for row in self.rows() {
            writeln!(out, "{}", row.join(","))?;
        }
        out.flush()
    }
}

/// Desktop of the current user, falling back to the working directory when
/// no desktop directory exists.
#[allow(deprecated)] // env::home_dir is fine on supported platforms
pub fn default_output_path(file_name: &str) -> PathBuf {
    let base = std::env::home_dir()
        .map(|home| home.join("Desktop"))
        .filter(|desktop| desktop.is_dir())
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fittex_core::{Gap, Side, TargetSize};

    fn spec() -> TrialSpec {
        TrialSpec::new(TargetSize::Small, Gap::Short, Side::Left)
    }

    #[test]
    fn scoring_fills_the_most_recent_slot() {
        let mut recorder = SessionRecorder::new();
        recorder.open(spec());
        recorder.score_last(431, 212.4);
        recorder.record_errors(1);
        let record = &recorder.records()[0];
        assert_eq!(record.time_ms, Some(431));
        assert_eq!(record.distance, Some(212.4));
        assert_eq!(record.errors, Some(1));
        assert!(record.is_complete());
    }

    #[test]
    fn retry_scores_overwrite_the_open_slot() {
        let mut recorder = SessionRecorder::new();
        recorder.open(spec());
        recorder.score_last(900, 310.0);
        recorder.score_last(400, 120.0);
        let record = &recorder.records()[0];
        assert_eq!(record.time_ms, Some(400));
        assert_eq!(record.distance, Some(120.0));
    }

    #[test]
    fn rows_prepend_the_header_and_derive_fitts_columns() {
        let mut recorder = SessionRecorder::new();
        recorder.open(spec());
        recorder.score_last(500, 150.0);
        recorder.record_errors(0);

        let rows = recorder.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], CSV_HEADER.map(String::from).to_vec());
        // small/short/left: A = 100, W = 25, ID = log2(5)
        assert_eq!(rows[1][0], "small");
        assert_eq!(rows[1][1], "short");
        assert_eq!(rows[1][2], "left");
        assert_eq!(rows[1][3], "0");
        assert_eq!(rows[1][4], "500");
        assert_eq!(rows[1][5], "150");
        assert_eq!(rows[1][6], "100");
        assert_eq!(rows[1][7], "25");
        let id: f64 = rows[1][8].parse().unwrap();
        assert!((id - 5.0f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn empty_log_exports_header_only() {
        assert_eq!(SessionRecorder::new().rows().len(), 1);
    }

    #[test]
    fn write_csv_produces_one_line_per_row() {
        let mut recorder = SessionRecorder::new();
        recorder.open(spec());
        recorder.score_last(10, 0.0);
        recorder.record_errors(2);

        let path = std::env::temp_dir().join("fittex_recorder_test.csv");
        recorder.write_csv(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Size,Gap,Side,Error,Time(ms),Distance,A,W,ID");
        assert!(lines[1].starts_with("small,short,left,2,10,0,"));
        assert!(contents.ends_with('\n'));
    }
}
