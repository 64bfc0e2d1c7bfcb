//! Pipeline entry points for the scheduled jobs.
//!
//! - `run_repo_watch`: Alert on repositories new since the last snapshot
//! - `run_sweep`: Alert on project pages left as an untouched template
//! - `run_status_report`: Rebuild the registry project status report
//! - `run_link_scan`: Collect related repositories linked from project pages

pub mod collect;
pub mod diff;
pub mod filter;
pub mod links;
pub mod repos;
pub mod status;
pub mod sweep;

pub use collect::{Pagination, collect_org_repos, collect_pages};
pub use diff::{DiffResult, calculate_diff, diff_new};
pub use filter::RepoFilter;
pub use links::{LinkScanSummary, run_link_scan};
pub use repos::{WatchSummary, run_repo_watch};
pub use status::{StatusSummary, run_status_report};
pub use sweep::{SweepSummary, run_sweep};
