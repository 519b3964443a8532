//! Usage monitoring: run ccusage and parse its `blocks` / `daily` tables.
//!
//! The reports are box-drawn, ANSI-colored tables. They are decoded into
//! cells, the current session is picked out of the `blocks` report and
//! per-day costs are aggregated from `daily` (or, failing that, `blocks`).

pub mod blocks;
pub mod costs;
pub mod fetcher;
pub mod table;
pub mod time;
pub mod types;

pub use blocks::extract_session;
pub use costs::{aggregate_costs, CostStrategy, ReportTexts};
pub use fetcher::{CcusageRunner, ReportError, ReportKind, ReportOutput, ReportRunner};
pub use time::Remaining;
pub use types::{CostHistory, CostSummary, DailyCostEntry, LifecycleState, SessionRecord};
