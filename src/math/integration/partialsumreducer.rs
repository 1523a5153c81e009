/// 合併兩個部分和：結合律、交換律成立的加法，種子為 `0.0`。
///
/// 浮點加法本身不滿足嚴格結合律，不同合併順序只會造成捨入等級的差異。
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialSumReducer;

impl PartialSumReducer {
    pub const IDENTITY: f64 = 0.0;

    pub fn new() -> PartialSumReducer {
        PartialSumReducer
    }

    pub fn identity(&self) -> f64 {
        Self::IDENTITY
    }

    pub fn combine(&self, lhs: f64, rhs: f64) -> f64 {
        lhs + rhs
    }
}
