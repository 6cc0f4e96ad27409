//! Core of the greenhouse dashboard: dataset and model loading, day
//! selection and energy prediction. The egui front end lives in the binary.

pub mod config;
pub mod data;
pub mod error;
pub mod forest;
pub mod predict;
pub mod store;

pub use config::AppConfig;
pub use error::{InferenceError, LoadError};
pub use store::Dashboard;
