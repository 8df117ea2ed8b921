use rand::Rng;
use serde::{Deserialize, Serialize};

/// Per-neuron nonlinearity `tanh(a * x + b)`.
///
/// `a` (slope) and `b` (bias) are drawn once when the neuron is built and are
/// not touched by the weight-update rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub a: f64,
    pub b: f64,
}

impl Activation {
    pub fn new(a: f64, b: f64) -> Self {
        Activation { a, b }
    }

    /// Slope and bias drawn uniformly from `[-1, 1]`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Activation {
            a: rng.random_range(-1.0..=1.0),
            b: rng.random_range(-1.0..=1.0),
        }
    }

    pub fn apply(&self, x: f64) -> f64 {
        (self.a * x + self.b).tanh()
    }

    /// `d/dx tanh(a * x + b) = a / cosh(a * x + b)^2`
    pub fn derivative(&self, x: f64) -> f64 {
        let c = (self.a * x + self.b).cosh();
        self.a / (c * c)
    }
}

impl Default for Activation {
    fn default() -> Self {
        Activation { a: 1.0, b: 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_is_plain_tanh() {
        let act = Activation::default();
        assert!((act.apply(0.5) - 0.5f64.tanh()).abs() < 1e-12);
        assert!((act.derivative(0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let act = Activation::new(-0.7, 0.3);
        let h = 1e-6;
        for &x in &[-2.0, -0.4, 0.0, 0.9, 3.0] {
            let numeric = (act.apply(x + h) - act.apply(x - h)) / (2.0 * h);
            assert!(
                (numeric - act.derivative(x)).abs() < 1e-6,
                "x={x}: numeric {numeric} vs analytic {}",
                act.derivative(x)
            );
        }
    }

    #[test]
    fn test_random_stays_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let act = Activation::random(&mut rng);
            assert!((-1.0..=1.0).contains(&act.a));
            assert!((-1.0..=1.0).contains(&act.b));
        }
    }
}
