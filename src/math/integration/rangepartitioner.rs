use serde::Deserialize;

use super::integrationerror::IntegrationError;
use super::interval::Interval;

/// 切分深度上限：葉區間數為 `2^max_split_depth`，超過此值的設定視為錯誤。
pub const MAX_SPLIT_DEPTH: u32 = 32;

/// 區間切分策略：遞迴二分，直到寬度不大於 `grain_size` 或深度達到 `max_split_depth`。
///
/// 切分樹的形狀只由區間與本策略決定，與執行緒數量無關，
/// 因此不同平行度下的結果只有合併順序造成的捨入差異。
/// 葉區間數量隨 `max_split_depth` 指數成長，深度上限為 [`MAX_SPLIT_DEPTH`]。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PartitionPolicy {
    grain_size: f64,
    max_split_depth: u32
}

impl Default for PartitionPolicy {
    fn default() -> Self {
        PartitionPolicy {
            grain_size: 0.0,
            max_split_depth: 6
        }
    }
}

impl PartitionPolicy {
    pub fn new(grain_size: f64, max_split_depth: u32) -> Result<PartitionPolicy, IntegrationError> {
        let policy = PartitionPolicy { grain_size, max_split_depth };
        policy.validate()?;
        Ok(policy)
    }

    /// 不切分，整個區間就是唯一的葉節點。
    pub fn single_leaf() -> PartitionPolicy {
        PartitionPolicy {
            grain_size: 0.0,
            max_split_depth: 0
        }
    }

    pub fn validate(&self) -> Result<(), IntegrationError> {
        if !self.grain_size.is_finite() || self.grain_size < 0.0 {
            return Err(IntegrationError::InvalidGrainSize(self.grain_size));
        }
        if self.max_split_depth > MAX_SPLIT_DEPTH {
            return Err(IntegrationError::InvalidSplitDepth(self.max_split_depth));
        }
        Ok(())
    }

    pub fn grain_size(&self) -> f64 {
        self.grain_size
    }

    pub fn max_split_depth(&self) -> u32 {
        self.max_split_depth
    }

    pub fn is_divisible(&self, range: &Interval, depth: u32) -> bool {
        depth < self.max_split_depth && range.width() > self.grain_size
    }

    /// 位於 `depth` 的區間若還能切分，回傳中點切開的左右兩段；否則就是葉區間。
    pub fn bisect(&self, range: &Interval, depth: u32) -> Option<(Interval, Interval)> {
        if self.is_divisible(range, depth) {
            Some(range.split())
        } else {
            None
        }
    }
}
