use serde::Deserialize;
use tracing::trace;

use super::integrand::Integrand;
use super::integrationerror::IntegrationError;
use super::interval::Interval;
use super::tolerance::Tolerance;

// ─────────────────────────────────────────────────────────────────────────────
// RightRectangleIntegrator - 單一區間的自適應右矩形積分
// ─────────────────────────────────────────────────────────────────────────────
//
//   I_n = h · Σ_{i=1..n} f(a + i·h),  h = (b - a) / n
//
// n 從 1 開始每輪加倍，直到 Runge 法則 |I_n - I_{n/2}| / 3 < ε 成立。
// 初始 current = -1 作為哨兵；ε >= 1/3 時哨兵本身就會通過檢查，
// 所以第一輪一律執行，保證至少做一次加倍。
//
// 注意：
//   - ε 極小時，收斂要等到浮點捨入讓兩次估計相等才成立，迭代次數沒有上界。
//     預設不設上限；需要時以 max_refinements 明確開啟，超過即回傳錯誤。
//   - n 溢位 u64 時同樣回傳 RefinementLimitExceeded。

/// 每次加倍時如何取得樣本和。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SamplingStrategy {
    /// 每輪重新計算全部 n 個右端點
    #[default]
    Recompute,
    /// 沿用上一輪的樣本和，只補算新增的奇數索引點
    ReuseSamples
}

/// 單一葉區間的積分結果與診斷資訊。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinementOutcome {
    pub value: f64,
    /// 迴圈執行次數（含取代哨兵的第一輪）
    pub iterations: u32,
    /// 最終的等分數 n
    pub subdivisions: u64,
    /// 被積函數的總呼叫次數
    pub evaluations: u64
}

#[derive(Debug, Clone, Copy)]
pub struct RightRectangleIntegrator {
    tolerance: Tolerance,
    sampling: SamplingStrategy,
    max_refinements: Option<u32>
}

impl RightRectangleIntegrator {
    pub fn new(tolerance: Tolerance) -> RightRectangleIntegrator {
        RightRectangleIntegrator {
            tolerance,
            sampling: SamplingStrategy::Recompute,
            max_refinements: None
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingStrategy) -> RightRectangleIntegrator {
        self.sampling = sampling;
        self
    }

    pub fn with_max_refinements(mut self, max_refinements: Option<u32>) -> RightRectangleIntegrator {
        self.max_refinements = max_refinements;
        self
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn sampling(&self) -> SamplingStrategy {
        self.sampling
    }

    pub fn max_refinements(&self) -> Option<u32> {
        self.max_refinements
    }

    pub fn integrate<F: Integrand + ?Sized>(&self, range: &Interval, f: &F) -> Result<f64, IntegrationError> {
        self.refine(range, f).map(|outcome| outcome.value)
    }

    pub fn refine<F: Integrand + ?Sized>(&self, range: &Interval, f: &F) -> Result<RefinementOutcome, IntegrationError> {
        if range.is_degenerate() {
            return Ok(RefinementOutcome {
                value: 0.0,
                iterations: 0,
                subdivisions: 0,
                evaluations: 0
            });
        }

        let a = range.begin();
        let b = range.end();
        let mut n: u64 = 1;
        let mut previous: f64 = 0.0;
        let mut current: f64 = -1.0;
        let mut sample_sum: f64 = 0.0;
        let mut iterations: u32 = 0;
        let mut evaluations: u64 = 0;

        while iterations == 0 || !self.tolerance.is_converged(current, previous) {
            if self.max_refinements.is_some_and(|limit| iterations >= limit) {
                return Err(IntegrationError::RefinementLimitExceeded { begin: a, end: b, subdivisions: n });
            }
            n = n.checked_mul(2).ok_or(IntegrationError::RefinementLimitExceeded {
                begin: a,
                end: b,
                subdivisions: n
            })?;
            previous = current;
            let h = (b - a) / n as f64;

            match self.sampling {
                SamplingStrategy::Recompute => {
                    sample_sum = (1..=n).map(|i| f.value(a + i as f64 * h)).sum();
                    evaluations += n;
                }
                SamplingStrategy::ReuseSamples => {
                    // 偶數索引點即上一輪的全部樣本；第一輪 (n = 2) 上一輪樣本為空
                    let fresh: f64 = if iterations == 0 {
                        (1..=n).map(|i| f.value(a + i as f64 * h)).sum()
                    } else {
                        (1..n).step_by(2).map(|i| f.value(a + i as f64 * h)).sum()
                    };
                    evaluations += if iterations == 0 { n } else { n / 2 };
                    sample_sum += fresh;
                }
            }

            current = h * sample_sum;
            iterations += 1;
            trace!(begin = a, end = b, n, estimate = current, "refinement pass");

            if !current.is_finite() {
                return Err(IntegrationError::NonFiniteResult { begin: a, end: b, subdivisions: n });
            }
        }

        Ok(RefinementOutcome {
            value: current,
            iterations,
            subdivisions: n,
            evaluations
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    fn integrator(epsilon: f64) -> RightRectangleIntegrator {
        RightRectangleIntegrator::new(Tolerance::new(epsilon).unwrap())
    }

    fn cube(x: f64) -> f64 {
        x * x * x
    }

    #[test]
    fn zero_width_returns_zero_without_sampling() {
        let range = Interval::new(4.0, 4.0).unwrap();
        let outcome = integrator(1e-9).refine(&range, &|_x: f64| f64::NAN).unwrap();
        assert_eq!(outcome.value, 0.0);
        assert_eq!(outcome.evaluations, 0);
    }

    #[test]
    fn cubic_on_reference_interval() {
        let range = Interval::new(0.0, 70.0).unwrap();
        let value = integrator(1.0).integrate(&range, &cube).unwrap();
        // 收斂時 |I_n - I_{n/2}| < 3ε，一階方法的真實誤差與該差距同階
        assert_abs_diff_eq!(value, 6_002_500.0, epsilon = 10.0);
    }

    #[test]
    fn cubic_on_unit_scale() {
        let range = Interval::new(0.0, 2.0).unwrap();
        let value = integrator(1e-4).integrate(&range, &cube).unwrap();
        assert_abs_diff_eq!(value, 4.0, epsilon = 1e-3);
    }

    #[test]
    fn constant_stops_after_confirming_pass() {
        let range = Interval::new(1.0, 3.0).unwrap();
        let outcome = integrator(1e-12).refine(&range, &|_x: f64| 2.5).unwrap();
        assert_eq!(outcome.value, 5.0);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.subdivisions, 4);
    }

    #[test]
    fn sentinel_forces_at_least_one_doubling() {
        // ε 很大時第一輪就收斂，但仍需算出一次估計
        let range = Interval::new(0.0, 1.0).unwrap();
        let outcome = integrator(1e6).refine(&range, &|x: f64| x).unwrap();
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.subdivisions, 2);
        assert_abs_diff_eq!(outcome.value, 0.75);
    }

    #[test]
    fn tighter_tolerance_never_reduces_iterations() {
        let range = Interval::new(0.0, 2.0).unwrap();
        let mut last_iterations = 0;
        for epsilon in [1e-1, 1e-2, 1e-3, 1e-4, 1e-5, 1e-6] {
            let outcome = integrator(epsilon).refine(&range, &|x: f64| x.sin() + x * x).unwrap();
            assert!(outcome.iterations >= last_iterations);
            last_iterations = outcome.iterations;
        }
    }

    #[test]
    fn splitting_matches_direct_integration() {
        let epsilon = 1e-4;
        let whole = Interval::new(0.0, 3.0).unwrap();
        let direct = integrator(epsilon).integrate(&whole, &cube).unwrap();
        let (left, right) = whole.split();
        let split = integrator(epsilon).integrate(&left, &cube).unwrap()
            + integrator(epsilon).integrate(&right, &cube).unwrap();
        assert_abs_diff_eq!(direct, 20.25, epsilon = 1e-3);
        assert_abs_diff_eq!(split, direct, epsilon = 1e-3);
    }

    #[test]
    fn reuse_samples_matches_recompute() {
        let range = Interval::new(0.0, 5.0).unwrap();
        let recompute = integrator(1e-3).refine(&range, &cube).unwrap();
        let reuse = integrator(1e-3)
            .with_sampling(SamplingStrategy::ReuseSamples)
            .refine(&range, &cube)
            .unwrap();
        assert_eq!(reuse.subdivisions, recompute.subdivisions);
        assert!(reuse.evaluations < recompute.evaluations);
        assert_relative_eq!(reuse.value, recompute.value, max_relative = 1e-9);
    }

    #[test]
    fn non_finite_integrand_is_reported() {
        let range = Interval::new(-1.0, 1.0).unwrap();
        let result = integrator(1e-6).integrate(&range, &|x: f64| 1.0 / x);
        assert!(matches!(result, Err(IntegrationError::NonFiniteResult { subdivisions: 2, .. })));
    }

    #[test]
    fn explicit_refinement_limit_is_an_error() {
        let range = Interval::new(0.0, 1.0).unwrap();
        let result = integrator(1e-12)
            .with_max_refinements(Some(3))
            .integrate(&range, &|x: f64| x.sqrt());
        assert!(matches!(result, Err(IntegrationError::RefinementLimitExceeded { subdivisions: 8, .. })));
    }
}
