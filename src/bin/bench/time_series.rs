// Per-Round JSONL Time Series Recorder
// Outputs one JSON line per round for independent analysis

use serde::Serialize;
use std::io::Write;
use tokenomics_engine::RoundRecord;

/// Flat view of a round; the per-AP breakdown is kept nested.
#[derive(Debug, Serialize)]
pub struct RoundSnapshot<'a> {
    pub seed: u64,
    #[serde(flatten)]
    pub record: &'a RoundRecord,
}

/// Writes the records of one run as JSONL.
pub struct TimeSeriesRecorder {
    seed: u64,
}

impl TimeSeriesRecorder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn write_jsonl<'a, I>(&self, path: &std::path::Path, records: I) -> std::io::Result<usize>
    where
        I: IntoIterator<Item = &'a RoundRecord>,
    {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        let mut lines = 0;
        for record in records {
            let snapshot = RoundSnapshot { seed: self.seed, record };
            let line = serde_json::to_string(&snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
            lines += 1;
        }
        file.flush()?;
        Ok(lines)
    }
}
