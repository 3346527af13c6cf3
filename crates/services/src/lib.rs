#![forbid(unsafe_code)]

pub mod app_services;
pub mod coordinator;
pub mod error;
pub mod progress_store;
pub mod report;

pub use tracker_core::Clock;

pub use app_services::{ExportFormat, TrackerServices};
pub use coordinator::{LoadStatus, Notice, NoticeLevel, ProgressCoordinator, ProgressSnapshot};
pub use error::{AppServicesError, CoordinatorError, ExportError, StoreError};
pub use progress_store::{ProgressStore, StoreConfig, WriteTicket};
pub use report::{ProgressReport, ReportRow, ReportSection};
