use std::collections::BTreeMap;
use std::fmt;

use crate::data::model::Measure;
use crate::error::InferenceError;
use crate::forest::RandomForestRegressor;

/// Named model inputs, as collected by the prediction form.
pub type FeatureInputs = BTreeMap<String, f64>;

// ---------------------------------------------------------------------------
// FeatureVector – the model's fixed-order input row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; Measure::N_FEATURES]);

impl FeatureVector {
    /// Reorder named inputs into training order. Every feature must be present
    /// exactly once and no other names are allowed.
    pub fn from_inputs(inputs: &FeatureInputs) -> Result<Self, InferenceError> {
        if let Some(extra) = inputs
            .keys()
            .find(|name| !Measure::FEATURES.iter().any(|m| m.column() == name.as_str()))
        {
            return Err(InferenceError::UnexpectedFeature(extra.clone()));
        }

        let mut row = [0.0; Measure::N_FEATURES];
        for (slot, m) in row.iter_mut().zip(Measure::FEATURES) {
            *slot = *inputs
                .get(m.column())
                .ok_or_else(|| InferenceError::MissingFeature(m.column().to_string()))?;
        }
        Ok(FeatureVector(row))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// Predicted hourly energy consumption in kWh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction(pub f64);

impl Prediction {
    pub fn kwh(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicted energy consumption: {:.3} kWh", self.0)
    }
}

/// Map named inputs onto the model's feature order and run a single-row
/// inference.
pub fn predict(
    model: &RandomForestRegressor,
    inputs: &FeatureInputs,
) -> Result<Prediction, InferenceError> {
    let features = FeatureVector::from_inputs(inputs)?;
    let value = model.predict_row(features.as_slice())?;
    if !value.is_finite() {
        return Err(InferenceError::NonFinite(value));
    }
    Ok(Prediction(value))
}

// ---------------------------------------------------------------------------
// PredictionForm – the values behind the form widgets
// ---------------------------------------------------------------------------

/// Editable form state. Every field always holds a number, so the inputs it
/// produces are complete by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionForm {
    values: [f64; Measure::N_FEATURES],
}

impl PredictionForm {
    pub fn default_value(measure: Measure) -> f64 {
        match measure {
            Measure::PpfdGh => 0.0,
            Measure::TemperatureGh => 20.0,
            Measure::Humidity => 90.0,
            Measure::Co2 => 600.0,
            Measure::DewPoint => 18.0,
            Measure::VpdGh => 0.5,
            Measure::PressureGh => 100.0,
            Measure::PpfdAmb => 0.0,
            Measure::TemperatureAmb => 20.0,
            Measure::PressureAmb => 100.0,
            Measure::VpdAmb => 0.5,
            Measure::Energy => 0.0,
        }
    }

    /// Mutable handle for a form widget. `Energy` is not a model input and
    /// returns `None`.
    pub fn value_mut(&mut self, measure: Measure) -> Option<&mut f64> {
        if measure == Measure::Energy {
            None
        } else {
            Some(&mut self.values[measure.index()])
        }
    }

    pub fn value(&self, measure: Measure) -> Option<f64> {
        (measure != Measure::Energy).then(|| self.values[measure.index()])
    }

    pub fn reset(&mut self) {
        *self = PredictionForm::default();
    }

    pub fn to_inputs(&self) -> FeatureInputs {
        Measure::FEATURES
            .iter()
            .map(|m| (m.column().to_string(), self.values[m.index()]))
            .collect()
    }
}

impl Default for PredictionForm {
    fn default() -> Self {
        let mut values = [0.0; Measure::N_FEATURES];
        for m in Measure::FEATURES {
            values[m.index()] = PredictionForm::default_value(m);
        }
        PredictionForm { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::RegressionTreeNode;

    fn model() -> RandomForestRegressor {
        let temp_amb = Measure::TemperatureAmb.index();
        let co2 = Measure::Co2.index();
        RandomForestRegressor::new(vec![
            RegressionTreeNode::split(
                temp_amb,
                18.0,
                RegressionTreeNode::leaf(5.25),
                RegressionTreeNode::leaf(3.5),
            ),
            RegressionTreeNode::split(
                co2,
                700.0,
                RegressionTreeNode::leaf(2.0),
                RegressionTreeNode::leaf(4.0),
            ),
        ])
    }

    #[test]
    fn form_defaults_match_documented_values() {
        let inputs = PredictionForm::default().to_inputs();
        assert_eq!(inputs.len(), 11);
        assert_eq!(inputs["PPFD_GH"], 0.0);
        assert_eq!(inputs["Temperature_GH"], 20.0);
        assert_eq!(inputs["Humidity"], 90.0);
        assert_eq!(inputs["CO2"], 600.0);
        assert_eq!(inputs["Dew Point"], 18.0);
        assert_eq!(inputs["VPD_GH"], 0.5);
        assert_eq!(inputs["Pressure_GH"], 100.0);
        assert_eq!(inputs["PPFD_amb"], 0.0);
        assert_eq!(inputs["Temperature_amb"], 20.0);
        assert_eq!(inputs["Pressure_amb"], 100.0);
        assert_eq!(inputs["VPD_amb"], 0.5);
    }

    #[test]
    fn feature_vector_follows_training_order() {
        let mut form = PredictionForm::default();
        for (i, m) in Measure::FEATURES.iter().enumerate() {
            *form.value_mut(*m).unwrap() = i as f64;
        }
        let fv = FeatureVector::from_inputs(&form.to_inputs()).unwrap();
        let expected: Vec<f64> = (0..11).map(|i| i as f64).collect();
        assert_eq!(fv.as_slice(), expected.as_slice());
    }

    #[test]
    fn defaults_predict_a_finite_value() {
        let p = predict(&model(), &PredictionForm::default().to_inputs()).unwrap();
        // temp_amb 20 > 18 -> 3.5, co2 600 <= 700 -> 2.0
        assert_eq!(p.kwh(), 2.75);
        assert!(p.kwh().is_finite());
    }

    #[test]
    fn prediction_is_deterministic() {
        let m = model();
        let mut form = PredictionForm::default();
        *form.value_mut(Measure::Co2).unwrap() = 950.0;
        let inputs = form.to_inputs();
        let first = predict(&m, &inputs).unwrap();
        for _ in 0..10 {
            assert_eq!(predict(&m, &inputs).unwrap(), first);
        }
    }

    #[test]
    fn display_rounds_to_three_decimals() {
        assert_eq!(
            Prediction(2.71828).to_string(),
            "Predicted energy consumption: 2.718 kWh"
        );
        assert_eq!(
            Prediction(3.0).to_string(),
            "Predicted energy consumption: 3.000 kWh"
        );
        assert_eq!(
            Prediction(1.23456).to_string(),
            "Predicted energy consumption: 1.235 kWh"
        );
    }

    #[test]
    fn missing_and_extra_inputs_are_rejected() {
        let mut inputs = PredictionForm::default().to_inputs();
        inputs.remove("Dew Point");
        assert_eq!(
            predict(&model(), &inputs).unwrap_err(),
            InferenceError::MissingFeature("Dew Point".to_string())
        );

        let mut inputs = PredictionForm::default().to_inputs();
        inputs.insert("Energy".to_string(), 1.0);
        assert_eq!(
            predict(&model(), &inputs).unwrap_err(),
            InferenceError::UnexpectedFeature("Energy".to_string())
        );
    }

    #[test]
    fn non_finite_output_is_an_error() {
        let m = RandomForestRegressor::new(vec![RegressionTreeNode::leaf(f64::INFINITY)]);
        let err = predict(&m, &PredictionForm::default().to_inputs()).unwrap_err();
        assert_eq!(err, InferenceError::NonFinite(f64::INFINITY));
    }

    #[test]
    fn out_of_range_split_is_an_inference_error() {
        let m = RandomForestRegressor::new(vec![RegressionTreeNode::split(
            Measure::N_FEATURES,
            1.0,
            RegressionTreeNode::leaf(1.0),
            RegressionTreeNode::leaf(2.0),
        )]);
        let err = predict(&m, &PredictionForm::default().to_inputs()).unwrap_err();
        assert!(matches!(err, InferenceError::ShapeMismatch { found: 11, .. }));
    }

    #[test]
    fn energy_is_not_a_form_field() {
        let mut form = PredictionForm::default();
        assert!(form.value_mut(Measure::Energy).is_none());
        assert_eq!(form.value(Measure::Energy), None);
        *form.value_mut(Measure::Humidity).unwrap() = 40.0;
        form.reset();
        assert_eq!(form, PredictionForm::default());
    }
}
