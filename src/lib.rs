//! # Agromate - market sentiment dashboard
//!
//! A terminal client for the agricultural news sentiment backend. It shows
//! classified news, aggregate sentiment, trends and commodity prices, and
//! lets the user filter the data and trigger a fresh analysis run.
//!
//! ## Architecture
//!
//! - **API**: typed HTTP client for the backend endpoints
//! - **State**: immutable filter snapshots and the store/reducer
//! - **Dashboard**: concurrent loads, pipeline triggers and market polling
//! - **Events**: key mapping and the terminal event stream
//! - **UI**: layout and widgets
//! - **Config**: layered configuration

pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod state;
pub mod ui;

pub use api::{ApiClient, SentimentApi};
pub use app::App;
pub use config::Config;
pub use dashboard::Orchestrator;
pub use error::{Error, Result};
pub use state::{FilterState, FilterUpdate};
