use serde::Deserialize;

/// 被積函數：`f64 -> f64` 的純函數。
///
/// 收斂迴圈每一輪都會在更細的網格上重新求值，因此實作必須沒有副作用、
/// 結果可重現，並且能同時被多個 worker 呼叫。
pub trait Integrand: Send + Sync {
    fn value(&self, x: f64) -> f64;
}

impl<F> Integrand for F where
    F: Fn(f64) -> f64 + Send + Sync {
    fn value(&self, x: f64) -> f64 {
        self(x)
    }
}

/// 可由 JSON 設定檔選取的被積函數。
///
/// ```json
/// { "integrand_type": "Polynomial", "coefficients": [1.0, 0.0, 3.0] }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(tag = "integrand_type")]
pub enum IntegrandSpec {
    /// `x^3`
    #[default]
    Cubic,
    Constant { value: f64 },
    /// `Σ a_k·x^k`，係數由低次到高次
    Polynomial { coefficients: Vec<f64> }
}

impl IntegrandSpec {
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            IntegrandSpec::Cubic => x * x * x,
            IntegrandSpec::Constant { value } => *value,
            IntegrandSpec::Polynomial { coefficients } => {
                // Horner
                coefficients.iter().rev().fold(0.0, |acc, a| acc * x + a)
            }
        }
    }

    /// 解析積分，供輸出時與數值結果對照。
    pub fn antiderivative(&self, x: f64) -> f64 {
        match self {
            IntegrandSpec::Cubic => x.powi(4) / 4.0,
            IntegrandSpec::Constant { value } => value * x,
            IntegrandSpec::Polynomial { coefficients } => {
                coefficients
                    .iter()
                    .enumerate()
                    .rev()
                    .fold(0.0, |acc, (k, a)| acc * x + a / (k as f64 + 1.0)) * x
            }
        }
    }

    pub fn exact_integral(&self, begin: f64, end: f64) -> f64 {
        self.antiderivative(end) - self.antiderivative(begin)
    }
}

impl Integrand for IntegrandSpec {
    fn value(&self, x: f64) -> f64 {
        self.evaluate(x)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn call<I: Integrand>(f: &I, x: f64) -> f64 {
        f.value(x)
    }

    #[test]
    fn closures_are_integrands() {
        let offset = 2.0;
        assert_eq!(call(&|x: f64| x + offset, 1.0), 3.0);
    }

    #[test]
    fn polynomial_uses_ascending_coefficients() {
        let spec = IntegrandSpec::Polynomial { coefficients: vec![1.0, 0.0, 3.0] };
        assert_eq!(spec.evaluate(2.0), 13.0);
        assert_relative_eq!(spec.exact_integral(0.0, 2.0), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn cubic_matches_closed_form() {
        let spec = IntegrandSpec::Cubic;
        assert_eq!(spec.evaluate(3.0), 27.0);
        assert_relative_eq!(spec.exact_integral(0.0, 70.0), 6_002_500.0);
    }

    #[test]
    fn defaults_to_cubic() {
        assert_eq!(IntegrandSpec::default(), IntegrandSpec::Cubic);
    }

    #[test]
    fn deserializes_tagged_objects() {
        let spec: IntegrandSpec = serde_json::from_str(r#"{"integrand_type": "Constant", "value": 2.5}"#).unwrap();
        assert_eq!(spec, IntegrandSpec::Constant { value: 2.5 });
        let spec: IntegrandSpec = serde_json::from_str(r#"{"integrand_type": "Cubic"}"#).unwrap();
        assert_eq!(spec, IntegrandSpec::Cubic);
    }
}
