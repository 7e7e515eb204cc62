//! Drive analysis
//!
//! Combines drive probing and consumer discovery into one result, and
//! flags the usage imbalance that makes relocation plans worthwhile: a
//! nearly full primary drive next to a mostly empty secondary one.

mod scanner;

pub use scanner::DriveScanner;

use chrono::Utc;

use crate::models::AnalysisResult;

pub struct DriveAnalyzer {
    scanner: DriveScanner,
}

impl DriveAnalyzer {
    pub fn new(scanner: DriveScanner) -> Self {
        Self { scanner }
    }

    pub fn analyze(&self) -> Result<AnalysisResult, String> {
        let drives = self.scanner.probe_drives()?;
        let consumers = self.scanner.identify_space_consumers();
        let total_recoverable: u64 = consumers.iter().map(|c| c.size_bytes).sum();

        let mut has_imbalance = false;
        let mut imbalance_message = None;
        if drives.len() >= 2 {
            // busiest drive vs the rest
            let primary = drives
                .iter()
                .max_by(|a, b| a.percent_used.total_cmp(&b.percent_used))
                .expect("non-empty drive list");
            if primary.percent_used > 70.0 {
                for other in drives.iter().filter(|d| d.letter != primary.letter) {
                    if other.percent_used < 30.0 {
                        has_imbalance = true;
                        let free_gb = other.free_bytes as f64 / 1024f64.powi(3);
                        imbalance_message = Some(format!(
                            "{} drive is {}% full while {} has {:.0}GB free",
                            primary.letter, primary.percent_used, other.letter, free_gb
                        ));
                        break;
                    }
                }
            }
        }

        Ok(AnalysisResult {
            drives,
            top_consumers: consumers,
            total_recoverable_bytes: total_recoverable,
            has_imbalance,
            imbalance_message,
            analyzed_at: Utc::now(),
        })
    }
}
