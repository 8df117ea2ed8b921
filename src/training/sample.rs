use serde::{Deserialize, Serialize};

use crate::agent::argmax;

/// One supervised example: a board encoding and the move it should produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSample {
    pub input: Vec<f64>,
    pub expected_output: Vec<f64>,
}

impl TrainingSample {
    pub fn new(input: Vec<f64>, expected_output: Vec<f64>) -> Self {
        TrainingSample {
            input,
            expected_output,
        }
    }

    /// Whether `output` already picks the same action as the target.
    pub fn is_hit(&self, output: &[f64]) -> bool {
        match (argmax(output), argmax(&self.expected_output)) {
            (Some(got), Some(want)) => got == want,
            _ => false,
        }
    }

    /// Sum of squared differences against the target.
    pub fn squared_error(&self, output: &[f64]) -> f64 {
        output
            .iter()
            .zip(&self.expected_output)
            .map(|(o, e)| (o - e).powi(2))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hit_compares_argmax() {
        let sample = TrainingSample::new(vec![0.0; 3], vec![0.0, 1.0, 0.0]);
        assert!(sample.is_hit(&[0.1, 0.8, -0.3]));
        assert!(!sample.is_hit(&[0.9, 0.8, -0.3]));
        assert!(!sample.is_hit(&[]));
    }

    #[test]
    fn test_squared_error() {
        let sample = TrainingSample::new(vec![], vec![1.0, 0.0]);
        assert!((sample.squared_error(&[0.5, 0.5]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_json_field_names() {
        let sample = TrainingSample::new(vec![1.0], vec![0.0, 1.0]);
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"input":[1.0],"expectedOutput":[0.0,1.0]}"#);
        let back: TrainingSample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }
}
