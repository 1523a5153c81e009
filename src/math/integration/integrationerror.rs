use thiserror::Error;

/// 積分過程中可能出現的錯誤。
///
/// 所有錯誤都直接回傳給最外層呼叫者，不做任何自動重試：
/// 數值上無效的輸入重跑一次結果也不會改變。
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("invalid interval [{begin}, {end}]: bounds must be finite with begin <= end and a finite width")]
    InvalidInterval { begin: f64, end: f64 },

    #[error("invalid tolerance {0}: must be finite and strictly positive")]
    InvalidTolerance(f64),

    #[error("invalid grain size {0}: must be finite and non-negative")]
    InvalidGrainSize(f64),

    #[error("invalid split depth {0}: at most 32 levels of bisection are allowed")]
    InvalidSplitDepth(u32),

    #[error("degree of parallelism must be at least 1")]
    InvalidParallelism,

    #[error("integrand produced a non-finite estimate on [{begin}, {end}] with {subdivisions} subdivisions")]
    NonFiniteResult { begin: f64, end: f64, subdivisions: u64 },

    #[error("refinement limit reached on [{begin}, {end}] with {subdivisions} subdivisions")]
    RefinementLimitExceeded { begin: f64, end: f64, subdivisions: u64 },

    #[error("worker failed while integrating a leaf range: {0}")]
    WorkerFailure(String),

    #[error("integration cancelled")]
    Cancelled,

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl IntegrationError {
    /// `Cancelled` 只是其他葉節點失敗後的連帶結果，合併錯誤時優先保留真正的原因。
    pub fn is_secondary(&self) -> bool {
        matches!(self, IntegrationError::Cancelled)
    }

    pub fn prefer(self, other: IntegrationError) -> IntegrationError {
        if self.is_secondary() && !other.is_secondary() {
            other
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefer_keeps_root_cause_over_cancellation() {
        let root = IntegrationError::WorkerFailure("boom".to_owned());
        let merged = IntegrationError::Cancelled.prefer(root);
        assert!(matches!(merged, IntegrationError::WorkerFailure(_)));

        let merged = IntegrationError::InvalidTolerance(0.0).prefer(IntegrationError::Cancelled);
        assert!(matches!(merged, IntegrationError::InvalidTolerance(_)));
    }

    #[test]
    fn messages_name_the_offending_values() {
        let error = IntegrationError::InvalidInterval { begin: 2.0, end: 1.0 };
        assert_eq!(
            error.to_string(),
            "invalid interval [2, 1]: bounds must be finite with begin <= end and a finite width"
        );
    }
}
