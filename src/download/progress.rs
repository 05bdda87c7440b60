//! Download progress reporting.

use serde::Serialize;

/// Bytes written so far against the advertised total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DownloadProgress {
    /// Bytes written to disk.
    pub written: u64,
    /// Advertised content length.
    pub total: u64,
}

impl DownloadProgress {
    /// Completion percentage in `0.0..=100.0` (0 when the total is zero).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.written as f64 / self.total as f64 * 100.0).min(100.0)
    }
}

/// Receives a progress value after every chunk written.
pub trait ProgressObserver {
    /// Called once per chunk.
    fn on_progress(&mut self, progress: DownloadProgress);
}

impl<F> ProgressObserver for F
where
    F: FnMut(DownloadProgress),
{
    fn on_progress(&mut self, progress: DownloadProgress) {
        self(progress);
    }
}

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

/// Formats a byte count as `Kb`, switching to `Mb` above 1 MiB and `Gb` above
/// 1 GiB, e.g. `"  1.50Kb"` or `"  2.00Mb"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    let size = bytes as f64;
    if size > GIB {
        format!("{:6.2}Gb", size / GIB)
    } else if size > MIB {
        format!("{:6.2}Mb", size / MIB)
    } else {
        format!("{:6.2}Kb", size / KIB)
    }
}

/// Formats a percentage, e.g. `" 42.00%"`.
#[must_use]
pub fn format_percent(percent: f64) -> String {
    format!("{percent:6.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        let progress = DownloadProgress {
            written: 50,
            total: 200,
        };
        assert!((progress.percent() - 25.0).abs() < f64::EPSILON);
        let empty = DownloadProgress {
            written: 0,
            total: 0,
        };
        assert!(empty.percent().abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(1536), "  1.50Kb");
        assert_eq!(format_size(0), "  0.00Kb");
    }

    #[test]
    fn test_format_size_scales_units() {
        assert_eq!(format_size(1024 * 1024), "1024.00Kb");
        assert_eq!(format_size(2 * 1024 * 1024), "  2.00Mb");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "  3.00Gb");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(42.0), " 42.00%");
        assert_eq!(format_percent(100.0), "100.00%");
    }

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |p: DownloadProgress| seen.push(p.written);
            observer.on_progress(DownloadProgress {
                written: 10,
                total: 20,
            });
        }
        assert_eq!(seen, vec![10]);
    }
}
