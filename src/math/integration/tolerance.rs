use super::integrationerror::IntegrationError;

/// Runge 法則的除數。右矩形法為一階方法，`2^1 - 1 = 1`，
/// 但這裡固定使用 3，與參考數值行為一致，不要改成一般化的 Richardson 公式。
pub const RUNGE_DIVISOR: f64 = 3.0;

/// 收斂容許誤差 ε，必為有限正數。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    epsilon: f64
}

impl Tolerance {
    pub fn new(epsilon: f64) -> Result<Tolerance, IntegrationError> {
        if epsilon.is_finite() && epsilon > 0.0 {
            Ok(Tolerance { epsilon })
        } else {
            Err(IntegrationError::InvalidTolerance(epsilon))
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Runge 法則：`|I2 - I| / 3 < ε` 視為收斂。
    ///
    /// 任一估計值為 NaN 時比較結果為 false，呼叫端需自行攔截非有限值。
    pub fn is_converged(&self, refined: f64, coarse: f64) -> bool {
        (refined - coarse).abs() / RUNGE_DIVISOR < self.epsilon
    }
}
