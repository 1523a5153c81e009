use serde::Deserialize;

use super::integrationerror::IntegrationError;

/// 積分區間 `[begin, end]`。
///
/// 建構時即檢查 `begin <= end`、兩端皆為有限值且寬度 `end - begin` 不溢位，之後不可變更；
/// 每個區間只屬於負責積分它的那個 task。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "IntervalJsonProp")]
pub struct Interval {
    begin: f64,
    end: f64
}

#[derive(Deserialize)]
struct IntervalJsonProp {
    begin: f64,
    end: f64
}

impl TryFrom<IntervalJsonProp> for Interval {
    type Error = IntegrationError;

    fn try_from(json_prop: IntervalJsonProp) -> Result<Self, Self::Error> {
        Interval::new(json_prop.begin, json_prop.end)
    }
}

impl Interval {
    pub fn new(begin: f64, end: f64) -> Result<Interval, IntegrationError> {
        if !begin.is_finite() || !end.is_finite() || end < begin || !(end - begin).is_finite() {
            return Err(IntegrationError::InvalidInterval { begin, end });
        }
        Ok(Interval { begin, end })
    }

    pub fn begin(&self) -> f64 {
        self.begin
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn width(&self) -> f64 {
        self.end - self.begin
    }

    pub fn midpoint(&self) -> f64 {
        self.begin + 0.5 * self.width()
    }

    pub fn is_degenerate(&self) -> bool {
        self.begin == self.end
    }

    /// 在中點切成左右兩段，兩段共用中點且仍滿足 `begin <= end`。
    pub fn split(&self) -> (Interval, Interval) {
        let middle = self.midpoint();
        (
            Interval { begin: self.begin, end: middle },
            Interval { begin: middle, end: self.end }
        )
    }
}
