//! Region download status reporting.

use std::fmt;

/// Whether a region is actively transferring data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    /// The store is downloading resources for this region.
    Active,
    /// The download is paused or has never been started.
    Inactive,
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Point-in-time snapshot of a region's download progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStatus {
    /// Current download state.
    pub download_state: DownloadState,
    /// Number of resources the store expects to download.
    ///
    /// Negative while the store has not yet determined the total.
    pub required_resource_count: i64,
    /// Number of resources downloaded so far.
    pub completed_resource_count: u64,
    /// Bytes downloaded so far.
    pub completed_resource_size: u64,
    /// True once every required resource has been downloaded.
    pub complete: bool,
}

impl RegionStatus {
    /// An inactive status with no progress, as reported before a download starts.
    pub fn inactive() -> Self {
        Self {
            download_state: DownloadState::Inactive,
            required_resource_count: -1,
            completed_resource_count: 0,
            completed_resource_size: 0,
            complete: false,
        }
    }
}

/// Percent complete for a status, as an integer 0-100.
///
/// Returns `100 * completed / required` when the required count is known
/// (non-negative); an unknown total reports 0 rather than dividing by a
/// sentinel. Values are clamped to 100 in case the store over-reports.
pub fn progress_percent(status: &RegionStatus) -> u8 {
    if status.required_resource_count <= 0 {
        return 0;
    }
    let percent =
        100.0 * status.completed_resource_count as f64 / status.required_resource_count as f64;
    (percent as u64).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(completed: u64, required: i64) -> RegionStatus {
        RegionStatus {
            download_state: DownloadState::Active,
            required_resource_count: required,
            completed_resource_count: completed,
            completed_resource_size: completed * 1024,
            complete: false,
        }
    }

    #[test]
    fn test_progress_partial() {
        assert_eq!(progress_percent(&status(50, 200)), 25);
    }

    #[test]
    fn test_progress_complete() {
        assert_eq!(progress_percent(&status(200, 200)), 100);
    }

    #[test]
    fn test_progress_unknown_total_is_zero() {
        assert_eq!(progress_percent(&status(50, -1)), 0);
    }

    #[test]
    fn test_progress_zero_total_is_zero() {
        assert_eq!(progress_percent(&status(0, 0)), 0);
    }

    #[test]
    fn test_progress_over_report_clamped() {
        assert_eq!(progress_percent(&status(300, 200)), 100);
    }

    #[test]
    fn test_inactive_status_defaults() {
        let status = RegionStatus::inactive();
        assert_eq!(status.download_state, DownloadState::Inactive);
        assert_eq!(status.required_resource_count, -1);
        assert!(!status.complete);
        assert_eq!(progress_percent(&status), 0);
    }

    #[test]
    fn test_download_state_display() {
        assert_eq!(DownloadState::Active.to_string(), "active");
        assert_eq!(DownloadState::Inactive.to_string(), "inactive");
    }
}
