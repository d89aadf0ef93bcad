//! Client side of qrledger.
//!
//! * [`api`]: typed access to the registry over HTTP.
//! * [`manager`]: the page controller behind every user action.
//! * [`scanner`]: the scan loop and its swappable decoder.
//! * [`offline`]: the versioned asset cache and its local proxy.
//! * [`ui`]: views, render surfaces and notifications.
//!
//! Everything with side effects sits behind a trait so the [`testing`]
//! fakes can stand in for it.

pub mod api;
pub mod manager;
pub mod offline;
pub mod scanner;
pub mod testing;
pub mod time;
pub mod ui;

pub use api::{ApiClient, ClientError, RegistryService};
pub use manager::{AddForm, QrManager};
pub use time::{SystemTimeProvider, TimeProvider};
