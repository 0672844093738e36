use crate::storage::DocumentKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// One dish's production, waste and earnings for the current day.
///
/// `total_earning` is computed by the client and stored as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Serving {
    pub name: String,
    pub cost_per_plate: f64,
    pub total_ingredients_cost: f64,
    pub total_plates: u32,
    pub plates_wasted: u32,
    pub total_earning: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl Serving {
    pub fn validate(&self) -> Result<(), String> {
        if self.total_plates == 0 {
            return Err("totalPlates must be greater than zero".to_string());
        }
        let amounts = [
            ("costPerPlate", self.cost_per_plate),
            ("totalIngredientsCost", self.total_ingredients_cost),
            ("totalEarning", self.total_earning),
        ];
        if let Some((field, _)) = amounts.iter().find(|(_, value)| !value.is_finite()) {
            return Err(format!("{field} must be a finite number"));
        }
        Ok(())
    }
}

/// A dated snapshot of the day's servings. Several entries may share a date.
///
/// Items are kept as stored; readers pick out the fields they need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: String,
}

/// Externally produced forecast row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedEntry {
    pub date: String,
    #[serde(default, alias = "predictedServings")]
    pub predicted: f64,
    #[serde(default)]
    pub predicted_earning: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Weekly,
    Monthly,
}

impl Period {
    pub fn window(self) -> usize {
        match self {
            Period::Weekly => 7,
            Period::Monthly => 30,
        }
    }

    pub fn predicted_key(self) -> DocumentKey {
        match self {
            Period::Weekly => DocumentKey::PredictedWeekly,
            Period::Monthly => DocumentKey::PredictedMonthly,
        }
    }

    pub fn metrics_key(self) -> DocumentKey {
        match self {
            Period::Weekly => DocumentKey::MetricsWeekly,
            Period::Monthly => DocumentKey::MetricsMonthly,
        }
    }
}

impl FromStr for Period {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualPoint {
    pub date: String,
    pub actual: u64,
    pub actual_earning: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedPoint {
    pub date: String,
    pub predicted: f64,
    pub predicted_earning: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub date: String,
    pub actual: u64,
    pub actual_earning: f64,
    pub predicted: f64,
    pub predicted_earning: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecalibrateResponse {
    pub message: String,
    pub output: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serving_uses_camel_case_fields() {
        let serving: Serving = serde_json::from_value(json!({
            "name": "Dal",
            "costPerPlate": 40.0,
            "totalIngredientsCost": 300.0,
            "totalPlates": 20,
            "platesWasted": 2,
            "totalEarning": 450.0
        }))
        .unwrap();
        assert_eq!(serving.total_plates, 20);
        assert_eq!(serving.remark, None);

        let value = serde_json::to_value(&serving).unwrap();
        assert_eq!(value["platesWasted"], 2);
        assert!(value.get("remark").is_none());
    }

    #[test]
    fn serving_with_zero_plates_is_rejected() {
        let serving: Serving = serde_json::from_value(json!({
            "name": "Rice",
            "costPerPlate": 10.0,
            "totalIngredientsCost": 5.0,
            "totalPlates": 0,
            "platesWasted": 0,
            "totalEarning": 0.0
        }))
        .unwrap();
        assert!(serving.validate().is_err());
    }

    #[test]
    fn serving_missing_a_number_does_not_parse() {
        let result = serde_json::from_value::<Serving>(json!({
            "name": "Rice",
            "costPerPlate": 10.0,
            "totalPlates": 4,
            "platesWasted": 0,
            "totalEarning": 20.0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn archive_entry_tolerates_missing_fields() {
        let entry: ArchiveEntry = serde_json::from_value(json!({
            "items": [{ "totalPlates": 10 }]
        }))
        .unwrap();
        assert_eq!(entry.date, "");
        assert_eq!(entry.items.len(), 1);
    }

    #[test]
    fn predicted_entry_accepts_either_servings_field() {
        let a: PredictedEntry =
            serde_json::from_value(json!({ "date": "2024-01-01", "predictedServings": 12 })).unwrap();
        let b: PredictedEntry =
            serde_json::from_value(json!({ "date": "2024-01-01", "predicted": 12 })).unwrap();
        assert_eq!(a.predicted, 12.0);
        assert_eq!(a, b);
    }

    #[test]
    fn period_parses_only_known_windows() {
        assert_eq!("weekly".parse::<Period>().map(Period::window), Ok(7));
        assert_eq!("monthly".parse::<Period>().map(Period::window), Ok(30));
        assert!("daily".parse::<Period>().is_err());
    }
}
