use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::data::filter::select_day;
use crate::data::loader::load_table;
use crate::data::location::LocationMap;
use crate::data::model::{GreenhouseTable, Reading};
use crate::error::{InferenceError, LoadError};
use crate::forest::RandomForestRegressor;
use crate::predict::{predict, FeatureInputs, Prediction};

// ---------------------------------------------------------------------------
// Load-once stores
// ---------------------------------------------------------------------------

/// Loads the dataset on first use and hands out the same table afterwards.
#[derive(Debug)]
pub struct DataStore {
    path: PathBuf,
    table: OnceLock<Arc<GreenhouseTable>>,
}

impl DataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DataStore {
            path: path.into(),
            table: OnceLock::new(),
        }
    }

    pub fn load(&self) -> Result<Arc<GreenhouseTable>, LoadError> {
        if let Some(table) = self.table.get() {
            return Ok(Arc::clone(table));
        }

        let table = load_table(&self.path)?;
        let (first, last) = table.date_range();
        log::info!(
            "Loaded {} readings from {} ({} locations, {first} to {last})",
            table.len(),
            self.path.display(),
            table.locations.len()
        );
        Ok(Arc::clone(self.table.get_or_init(|| Arc::new(table))))
    }
}

/// Loads the model artifact on first use and hands out the same model afterwards.
#[derive(Debug)]
pub struct ModelStore {
    path: PathBuf,
    model: OnceLock<Arc<RandomForestRegressor>>,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ModelStore {
            path: path.into(),
            model: OnceLock::new(),
        }
    }

    pub fn load(&self) -> Result<Arc<RandomForestRegressor>, LoadError> {
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }

        let model = RandomForestRegressor::load(&self.path)?;
        log::info!(
            "Loaded random forest from {} ({} trees, max depth {})",
            self.path.display(),
            model.n_trees(),
            model.max_depth()
        );
        Ok(Arc::clone(self.model.get_or_init(|| Arc::new(model))))
    }
}

// ---------------------------------------------------------------------------
// Dashboard – the read-only state every request works against
// ---------------------------------------------------------------------------

/// Loaded table, loaded model and the location lookup derived from the table.
///
/// Built once at startup; cloning is cheap and shares the same table and model.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub table: Arc<GreenhouseTable>,
    pub model: Arc<RandomForestRegressor>,
    pub locations: LocationMap,
}

impl Dashboard {
    pub fn new(table: Arc<GreenhouseTable>, model: Arc<RandomForestRegressor>) -> Self {
        let locations = LocationMap::new(&table.locations);
        Dashboard {
            table,
            model,
            locations,
        }
    }

    /// Load both inputs named by `config`. Either failure is fatal.
    pub fn load(config: &AppConfig) -> Result<Self, LoadError> {
        let table = DataStore::new(&config.data_path).load()?;
        let model = ModelStore::new(&config.model_path).load()?;
        Ok(Dashboard::new(table, model))
    }

    /// Readings for a greenhouse picked by display name. Unknown names select
    /// nothing.
    pub fn day_readings(&self, date: NaiveDate, display_name: &str) -> Vec<Reading> {
        match self.locations.raw_for(display_name) {
            Some(raw) => select_day(&self.table, date, raw),
            None => Vec::new(),
        }
    }

    pub fn predict(&self, inputs: &FeatureInputs) -> Result<Prediction, InferenceError> {
        predict(&self.model, inputs)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::forest::RegressionTreeNode;

    const CSV: &str = "Timestamp,Location,PPFD_GH,Temperature_GH,Humidity,CO2,Dew Point,VPD_GH,Pressure_GH,PPFD_amb,Temperature_amb,Pressure_amb,VPD_amb,Energy\n\
        2024-06-01 01:00:00,GH1 West Cool Wall,0,20,90,600,18,0.5,100,0,20,100,0.5,3.2\n\
        2024-06-01 00:00:00,GH1 West Cool Wall,0,20,90,600,18,0.5,100,0,20,100,0.5,3.1\n";

    #[test]
    fn data_store_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, CSV).unwrap();

        let store = DataStore::new(&path);
        let first = store.load().unwrap();
        // The file is gone; the memoized table must still be returned.
        std::fs::remove_file(&path).unwrap();
        let second = store.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn model_store_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let forest = RandomForestRegressor::new(vec![RegressionTreeNode::leaf(2.0)]);
        std::fs::write(&path, serde_json::to_string(&forest).unwrap()).unwrap();

        let store = ModelStore::new(&path);
        let first = store.load().unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = store.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, forest);
    }

    #[test]
    fn missing_inputs_are_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataStore::new(dir.path().join("absent.csv"));
        assert!(matches!(data.load(), Err(LoadError::Io { .. })));

        let model = ModelStore::new(dir.path().join("absent.json"));
        assert!(matches!(model.load(), Err(LoadError::Io { .. })));
    }

    #[test]
    fn dashboard_maps_display_names_to_raw_locations() {
        let readings = crate::data::loader::read_csv(CSV.as_bytes(), Path::new("t.csv")).unwrap();
        let table = Arc::new(GreenhouseTable::from_readings(readings).unwrap());
        let model = Arc::new(RandomForestRegressor::new(vec![RegressionTreeNode::leaf(2.0)]));
        let dashboard = Dashboard::new(table, model);

        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let day = dashboard.day_readings(date, "GH1 West");
        assert_eq!(day.len(), 2);
        assert!(day[0].timestamp < day[1].timestamp);
        assert!(dashboard.day_readings(date, "GH1 West Cool Wall").is_empty());
        assert!(dashboard.day_readings(date, "GH7").is_empty());
    }
}
