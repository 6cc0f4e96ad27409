use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Static application configuration
// ---------------------------------------------------------------------------

pub const DATA_FILE: &str = "greenhouse_data.csv";
pub const MODEL_FILE: &str = "rand_forest.json";

/// Where the dashboard finds its inputs and how the window opens.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub window_title: String,
    pub inner_size: [f32; 2],
    pub min_inner_size: [f32; 2],
}

impl AppConfig {
    /// Default file names inside `dir`.
    pub fn with_data_dir(dir: &Path) -> Self {
        AppConfig {
            data_path: dir.join(DATA_FILE),
            model_path: dir.join(MODEL_FILE),
            ..AppConfig::default()
        }
    }

    /// Directory shipped next to the sources, written by `generate_sample`.
    pub fn default_data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let dir = AppConfig::default_data_dir();
        AppConfig {
            data_path: dir.join(DATA_FILE),
            model_path: dir.join(MODEL_FILE),
            window_title: "Greenhouse Energy and Climate Dashboard".to_string(),
            inner_size: [1280.0, 900.0],
            min_inner_size: [720.0, 480.0],
        }
    }
}
