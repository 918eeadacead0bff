//! Normalized single-row model input

use serde::Serialize;
use serde_json::Value;

use crate::error::ServiceError;
use crate::schema::{self, FEATURE_COUNT, FEATURE_SCHEMA};

/// A single normalized feature value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Numeric input or a mapped categorical code.
    Number(f64),
    /// String that was not a known label; carried through untranslated.
    Text(String),
    /// Any other JSON value (null, bool, array, object), carried as-is.
    Other(Value),
}

impl FeatureValue {
    /// Convert the raw JSON value without any categorical mapping.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(FeatureValue::Number)
                .unwrap_or_else(|| FeatureValue::Other(value.clone())),
            Value::String(s) => FeatureValue::Text(s.clone()),
            other => FeatureValue::Other(other.clone()),
        }
    }

    /// Numeric view used for the model tensor.
    ///
    /// Text that parses as a number is accepted, so pre-encoded codes sent
    /// as strings still reach the model.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            FeatureValue::Other(_) => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            FeatureValue::Number(n) => n.to_string(),
            FeatureValue::Text(s) => format!("{:?}", s),
            FeatureValue::Other(v) => v.to_string(),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

/// One input row in feature schema order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    values: Vec<FeatureValue>,
}

impl FeatureRow {
    /// Build a row from values already in schema order.
    ///
    /// Returns `None` when the value count does not match the schema.
    pub fn new(values: Vec<FeatureValue>) -> Option<Self> {
        (values.len() == FEATURE_COUNT).then_some(Self { values })
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    /// Value for a named feature.
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        schema::index_of(name).map(|idx| &self.values[idx])
    }

    /// Flatten the row to the `f32` vector fed to the model.
    pub fn to_f32_vec(&self) -> Result<Vec<f32>, ServiceError> {
        FEATURE_SCHEMA
            .iter()
            .zip(&self.values)
            .map(|(spec, value)| {
                value
                    .as_f64()
                    .map(|n| n as f32)
                    .ok_or_else(|| ServiceError::Conversion {
                        feature: spec.name,
                        value: value.describe(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numeric_row(fill: f64) -> FeatureRow {
        FeatureRow::new(vec![FeatureValue::Number(fill); FEATURE_COUNT]).unwrap()
    }

    #[test]
    fn test_from_json() {
        assert_eq!(FeatureValue::from_json(&json!(23.1)), FeatureValue::Number(23.1));
        assert_eq!(FeatureValue::from_json(&json!(180)), FeatureValue::Number(180.0));
        assert_eq!(FeatureValue::from_json(&json!("Good")), FeatureValue::from("Good"));
        assert_eq!(FeatureValue::from_json(&json!(null)), FeatureValue::Other(Value::Null));
        assert_eq!(
            FeatureValue::from_json(&json!(true)),
            FeatureValue::Other(Value::Bool(true))
        );
    }

    #[test]
    fn test_numeric_strings_convert() {
        assert_eq!(FeatureValue::from("2").as_f64(), Some(2.0));
        assert_eq!(FeatureValue::from(" 23.5 ").as_f64(), Some(23.5));
        assert_eq!(FeatureValue::from("good").as_f64(), None);
        assert_eq!(FeatureValue::from("NaN").as_f64(), None);
        assert_eq!(FeatureValue::Other(json!([1])).as_f64(), None);
    }

    #[test]
    fn test_row_length_checked() {
        assert!(FeatureRow::new(vec![FeatureValue::Number(1.0); 3]).is_none());
        assert!(FeatureRow::new(vec![FeatureValue::Number(1.0); FEATURE_COUNT]).is_some());
    }

    #[test]
    fn test_get_by_name() {
        let mut values = vec![FeatureValue::Number(0.0); FEATURE_COUNT];
        values[12] = FeatureValue::Number(23.1);
        let row = FeatureRow::new(values).unwrap();
        assert_eq!(row.get("BMI"), Some(&FeatureValue::Number(23.1)));
        assert_eq!(row.get("Nope"), None);
    }

    #[test]
    fn test_to_f32_vec() {
        let row = numeric_row(1.5);
        let floats = row.to_f32_vec().unwrap();
        assert_eq!(floats.len(), FEATURE_COUNT);
        assert!(floats.iter().all(|&v| v == 1.5));
    }

    #[test]
    fn test_to_f32_vec_rejects_text() {
        let mut values = vec![FeatureValue::Number(0.0); FEATURE_COUNT];
        values[0] = FeatureValue::from("good");
        let row = FeatureRow::new(values).unwrap();

        match row.to_f32_vec() {
            Err(ServiceError::Conversion { feature, value }) => {
                assert_eq!(feature, "General_Health");
                assert_eq!(value, "\"good\"");
            }
            other => panic!("expected conversion error, got {:?}", other),
        }
    }

    #[test]
    fn test_to_f32_vec_rejects_bool() {
        let mut values = vec![FeatureValue::Number(0.0); FEATURE_COUNT];
        values[2] = FeatureValue::from_json(&json!(true));
        let row = FeatureRow::new(values).unwrap();

        match row.to_f32_vec() {
            Err(ServiceError::Conversion { feature, value }) => {
                assert_eq!(feature, "Exercise");
                assert_eq!(value, "true");
            }
            other => panic!("expected conversion error, got {:?}", other),
        }
    }
}
