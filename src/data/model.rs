use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Measure – one numeric column of the dataset
// ---------------------------------------------------------------------------

/// The numeric columns of a greenhouse reading.
///
/// Declaration order is significant: the first eleven variants are the model's
/// feature order, `Energy` is the target and always comes last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Measure {
    PpfdGh,
    TemperatureGh,
    Humidity,
    Co2,
    DewPoint,
    VpdGh,
    PressureGh,
    PpfdAmb,
    TemperatureAmb,
    PressureAmb,
    VpdAmb,
    Energy,
}

impl Measure {
    pub const COUNT: usize = 12;
    pub const N_FEATURES: usize = 11;

    pub const ALL: [Measure; Measure::COUNT] = [
        Measure::PpfdGh,
        Measure::TemperatureGh,
        Measure::Humidity,
        Measure::Co2,
        Measure::DewPoint,
        Measure::VpdGh,
        Measure::PressureGh,
        Measure::PpfdAmb,
        Measure::TemperatureAmb,
        Measure::PressureAmb,
        Measure::VpdAmb,
        Measure::Energy,
    ];

    /// The eleven model inputs, in training order.
    pub const FEATURES: [Measure; Measure::N_FEATURES] = [
        Measure::PpfdGh,
        Measure::TemperatureGh,
        Measure::Humidity,
        Measure::Co2,
        Measure::DewPoint,
        Measure::VpdGh,
        Measure::PressureGh,
        Measure::PpfdAmb,
        Measure::TemperatureAmb,
        Measure::PressureAmb,
        Measure::VpdAmb,
    ];

    /// Position of this measure inside a reading's value array.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header name in the data file (and feature name in the model artifact).
    pub fn column(self) -> &'static str {
        match self {
            Measure::PpfdGh => "PPFD_GH",
            Measure::TemperatureGh => "Temperature_GH",
            Measure::Humidity => "Humidity",
            Measure::Co2 => "CO2",
            Measure::DewPoint => "Dew Point",
            Measure::VpdGh => "VPD_GH",
            Measure::PressureGh => "Pressure_GH",
            Measure::PpfdAmb => "PPFD_amb",
            Measure::TemperatureAmb => "Temperature_amb",
            Measure::PressureAmb => "Pressure_amb",
            Measure::VpdAmb => "VPD_amb",
            Measure::Energy => "Energy",
        }
    }

    /// Human-readable caption used on charts and form fields.
    pub fn label(self) -> &'static str {
        match self {
            Measure::PpfdGh => "Greenhouse PPFD",
            Measure::TemperatureGh => "Greenhouse Temperature",
            Measure::Humidity => "Humidity",
            Measure::Co2 => "Greenhouse CO₂",
            Measure::DewPoint => "Dew Point",
            Measure::VpdGh => "Greenhouse VPD",
            Measure::PressureGh => "Greenhouse Pressure",
            Measure::PpfdAmb => "Ambient PPFD",
            Measure::TemperatureAmb => "Ambient Temperature",
            Measure::PressureAmb => "Ambient Pressure",
            Measure::VpdAmb => "Ambient VPD",
            Measure::Energy => "Energy Consumption",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Measure::PpfdGh | Measure::PpfdAmb => "μmol/m2/s",
            Measure::TemperatureGh | Measure::TemperatureAmb | Measure::DewPoint => "°C",
            Measure::Humidity => "%",
            Measure::Co2 => "ppm",
            Measure::VpdGh | Measure::VpdAmb | Measure::PressureGh | Measure::PressureAmb => {
                "kPa"
            }
            Measure::Energy => "kWh",
        }
    }

    pub fn from_column(name: &str) -> Option<Measure> {
        Measure::ALL.into_iter().find(|m| m.column() == name)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.unit())
    }
}

// ---------------------------------------------------------------------------
// Reading – one row of the dataset
// ---------------------------------------------------------------------------

/// A single timestamped observation for one greenhouse.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    /// Raw location identifier as it appears in the file.
    pub location: String,
    /// Indexed by [`Measure::index`].
    pub values: [f64; Measure::COUNT],
}

impl Reading {
    pub fn value(&self, measure: Measure) -> f64 {
        self.values[measure.index()]
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

// ---------------------------------------------------------------------------
// GreenhouseTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed location and date indices.
#[derive(Debug, Clone)]
pub struct GreenhouseTable {
    /// All readings, in file order.
    pub readings: Vec<Reading>,
    /// Sorted distinct raw location identifiers.
    pub locations: BTreeSet<String>,
    first_date: NaiveDate,
    last_date: NaiveDate,
}

impl GreenhouseTable {
    /// Build the indices from loaded readings. Returns `None` for an empty set,
    /// which has no date range to offer.
    pub fn from_readings(readings: Vec<Reading>) -> Option<Self> {
        let first_date = readings.iter().map(Reading::date).min()?;
        let last_date = readings.iter().map(Reading::date).max()?;
        let locations = readings.iter().map(|r| r.location.clone()).collect();

        Some(GreenhouseTable {
            readings,
            locations,
            first_date,
            last_date,
        })
    }

    /// Inclusive `(min, max)` calendar dates present in the table.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.first_date, self.last_date)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Test helper: a reading whose every measure is `fill`, except Energy.
    pub(crate) fn reading(ts: &str, location: &str, fill: f64, energy: f64) -> Reading {
        let mut values = [fill; Measure::COUNT];
        values[Measure::Energy.index()] = energy;
        Reading {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            location: location.to_string(),
            values,
        }
    }

    #[test]
    fn features_are_every_measure_but_energy_in_order() {
        assert_eq!(&Measure::ALL[..11], &Measure::FEATURES[..]);
        assert_eq!(Measure::ALL[11], Measure::Energy);
        for (i, m) in Measure::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn column_names_round_trip() {
        for m in Measure::ALL {
            assert_eq!(Measure::from_column(m.column()), Some(m));
        }
        assert_eq!(Measure::from_column("Location"), None);
        assert_eq!(Measure::DewPoint.column(), "Dew Point");
    }

    #[test]
    fn table_indexes_locations_and_dates() {
        let table = GreenhouseTable::from_readings(vec![
            reading("2024-06-02 05:00:00", "GH2", 1.0, 2.0),
            reading("2024-06-01 23:00:00", "GH1 West Cool Wall", 1.0, 2.0),
            reading("2024-06-03 00:00:00", "GH2", 1.0, 2.0),
        ])
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.locations.iter().cloned().collect::<Vec<_>>(),
            vec!["GH1 West Cool Wall".to_string(), "GH2".to_string()]
        );
        assert_eq!(
            table.date_range(),
            (
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
            )
        );
    }

    #[test]
    fn empty_table_has_no_range() {
        assert!(GreenhouseTable::from_readings(Vec::new()).is_none());
    }
}
