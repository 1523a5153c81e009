use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::thread;

use serde::Deserialize;

use crate::configurationerror::ConfigurationError;
use crate::math::integration::integrand::IntegrandSpec;
use crate::math::integration::interval::Interval;
use crate::math::integration::parallelintegrator::ParallelIntegrator;
use crate::math::integration::rangepartitioner::PartitionPolicy;
use crate::math::integration::rightrectangleintegrator::{
    RightRectangleIntegrator,
    SamplingStrategy
};
use crate::math::integration::tolerance::Tolerance;

const REFERENCE_EPSILON: f64 = 1e-5;
const REFERENCE_END: f64 = 70.0;

#[derive(Deserialize)]
struct ConfigurationJsonProp {
    #[serde(default)]
    integrand: IntegrandSpec,
    interval: Interval,
    epsilon: f64,
    #[serde(default)]
    max_parallelism: Option<usize>,
    #[serde(default)]
    partition: PartitionPolicy,
    #[serde(default)]
    sampling: SamplingStrategy,
    #[serde(default)]
    max_refinements: Option<u32>
}

/// 一次積分掃描所需的全部設定。
///
/// ```json
/// {
///     "integrand": { "integrand_type": "Cubic" },
///     "interval": { "begin": 0.0, "end": 70.0 },
///     "epsilon": 1e-5,
///     "max_parallelism": 4,
///     "partition": { "grain_size": 0.0, "max_split_depth": 6 },
///     "sampling": "ReuseSamples"
/// }
/// ```
///
/// 只有 `interval` 與 `epsilon` 為必填。
#[derive(Debug, Clone)]
pub struct Configuration {
    integrand: IntegrandSpec,
    interval: Interval,
    tolerance: Tolerance,
    max_parallelism: Option<NonZeroUsize>,
    partition: PartitionPolicy,
    sampling: SamplingStrategy,
    max_refinements: Option<u32>
}

impl Configuration {
    /// `x^3` 在 `[0, 70]` 上、`ε = 1e-5` 的基準設定。
    pub fn reference() -> Result<Configuration, ConfigurationError> {
        Ok(Configuration {
            integrand: IntegrandSpec::Cubic,
            interval: Interval::new(0.0, REFERENCE_END)?,
            tolerance: Tolerance::new(REFERENCE_EPSILON)?,
            max_parallelism: None,
            partition: PartitionPolicy::default(),
            sampling: SamplingStrategy::Recompute,
            max_refinements: None
        })
    }

    pub fn from_reader(file_path: &str) -> Result<Configuration, ConfigurationError> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let json_prop: ConfigurationJsonProp = serde_json::from_reader(reader)?;
        Configuration::from_json_prop(json_prop)
    }

    pub fn from_json_str(json: &str) -> Result<Configuration, ConfigurationError> {
        let json_prop: ConfigurationJsonProp = serde_json::from_str(json)?;
        Configuration::from_json_prop(json_prop)
    }

    fn from_json_prop(json_prop: ConfigurationJsonProp) -> Result<Configuration, ConfigurationError> {
        json_prop.partition.validate()?;
        Ok(Configuration {
            integrand: json_prop.integrand,
            interval: json_prop.interval,
            tolerance: Tolerance::new(json_prop.epsilon)?,
            max_parallelism: json_prop.max_parallelism.and_then(NonZeroUsize::new),
            partition: json_prop.partition,
            sampling: json_prop.sampling,
            max_refinements: json_prop.max_refinements
        })
    }

    pub fn integrand(&self) -> &IntegrandSpec {
        &self.integrand
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn partition(&self) -> &PartitionPolicy {
        &self.partition
    }

    pub fn sampling(&self) -> SamplingStrategy {
        self.sampling
    }

    /// 掃描的最大 worker 數；未指定時取硬體可用的平行度。
    pub fn max_parallelism(&self) -> usize {
        self.max_parallelism
            .or_else(|| thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }

    pub fn integrator(&self) -> RightRectangleIntegrator {
        RightRectangleIntegrator::new(self.tolerance)
            .with_sampling(self.sampling)
            .with_max_refinements(self.max_refinements)
    }

    pub fn parallel_integrator(&self, degree_of_parallelism: usize) -> Result<ParallelIntegrator, ConfigurationError> {
        let parallel_integrator = ParallelIntegrator::with_policy(
            self.integrator(),
            self.partition,
            degree_of_parallelism
        )?;
        Ok(parallel_integrator)
    }
}
