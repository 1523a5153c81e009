use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, info_span, warn};

use super::integrand::Integrand;
use super::integrationerror::IntegrationError;
use super::interval::Interval;
use super::partialsumreducer::PartialSumReducer;
use super::rangepartitioner::PartitionPolicy;
use super::rightrectangleintegrator::RightRectangleIntegrator;
use super::tolerance::Tolerance;

// ─────────────────────────────────────────────────────────────────────────────
// ParallelIntegrator - 切分、派工與歸約
// ─────────────────────────────────────────────────────────────────────────────
//
// 1. PartitionPolicy 把 [a, b] 遞迴二分成葉區間。
// 2. 每個分支以 rayon::join 分叉，葉區間在專屬 thread pool 的某個 worker 上
//    由 RightRectangleIntegrator 一次跑完，中途不讓出。
// 3. 葉區間結果以種子 0.0 起算，左右結果再以 PartialSumReducer 兩兩相加。
//
// 任一葉區間失敗即設定 abort 旗標，尚未開始的葉區間直接略過；
// 已完成的部分結果一律丟棄，不回傳部分和。
// 取消只在葉區間開始前檢查，不會中斷進行中的收斂迴圈。

pub struct ParallelIntegrator {
    integrator: RightRectangleIntegrator,
    policy: PartitionPolicy,
    reducer: PartialSumReducer,
    pool: ThreadPool,
    degree_of_parallelism: usize
}

impl ParallelIntegrator {
    pub fn new(tolerance: Tolerance, degree_of_parallelism: usize) -> Result<ParallelIntegrator, IntegrationError> {
        ParallelIntegrator::with_policy(
            RightRectangleIntegrator::new(tolerance),
            PartitionPolicy::default(),
            degree_of_parallelism
        )
    }

    pub fn with_policy(
        integrator: RightRectangleIntegrator,
        policy: PartitionPolicy,
        degree_of_parallelism: usize,
    ) -> Result<ParallelIntegrator, IntegrationError> {
        if degree_of_parallelism == 0 {
            return Err(IntegrationError::InvalidParallelism);
        }
        policy.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(degree_of_parallelism)
            .thread_name(|index| format!("rectquad-worker-{}", index))
            .build()?;
        Ok(ParallelIntegrator {
            integrator,
            policy,
            reducer: PartialSumReducer::new(),
            pool,
            degree_of_parallelism
        })
    }

    pub fn integrator(&self) -> &RightRectangleIntegrator {
        &self.integrator
    }

    pub fn policy(&self) -> &PartitionPolicy {
        &self.policy
    }

    pub fn degree_of_parallelism(&self) -> usize {
        self.degree_of_parallelism
    }

    pub fn integrate<F: Integrand + ?Sized>(&self, f: &F, begin: f64, end: f64) -> Result<f64, IntegrationError> {
        let cancel = AtomicBool::new(false);
        self.integrate_cancellable(f, begin, end, &cancel)
    }

    pub fn integrate_cancellable<F: Integrand + ?Sized>(
        &self,
        f: &F,
        begin: f64,
        end: f64,
        cancel: &AtomicBool,
    ) -> Result<f64, IntegrationError> {
        let range = Interval::new(begin, end)?;
        let span = info_span!(
            "parallel_integrate",
            begin,
            end,
            epsilon = self.integrator.tolerance().epsilon(),
            workers = self.degree_of_parallelism
        );
        let _enter = span.enter();

        let abort = AtomicBool::new(false);
        let result = self.pool.install(|| self.reduce(&range, 0, f, cancel, &abort));
        match &result {
            Ok(value) => info!(value, "integration finished"),
            Err(error) => warn!(%error, "integration aborted")
        }
        result
    }

    fn reduce<F: Integrand + ?Sized>(
        &self,
        range: &Interval,
        depth: u32,
        f: &F,
        cancel: &AtomicBool,
        abort: &AtomicBool,
    ) -> Result<f64, IntegrationError> {
        let Some((left, right)) = self.policy.bisect(range, depth) else {
            return self.integrate_leaf(range, f, cancel, abort);
        };

        let (lhs, rhs) = rayon::join(
            || self.reduce(&left, depth + 1, f, cancel, abort),
            || self.reduce(&right, depth + 1, f, cancel, abort)
        );
        match (lhs, rhs) {
            (Ok(lhs), Ok(rhs)) => Ok(self.reducer.combine(lhs, rhs)),
            (Err(error), Ok(_)) | (Ok(_), Err(error)) => Err(error),
            (Err(lhs), Err(rhs)) => Err(lhs.prefer(rhs))
        }
    }

    fn integrate_leaf<F: Integrand + ?Sized>(
        &self,
        range: &Interval,
        f: &F,
        cancel: &AtomicBool,
        abort: &AtomicBool,
    ) -> Result<f64, IntegrationError> {
        if cancel.load(Ordering::Relaxed) || abort.load(Ordering::Relaxed) {
            return Err(IntegrationError::Cancelled);
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.integrator.refine(range, f)))
            .map_err(|payload| IntegrationError::WorkerFailure(panic_message(payload.as_ref())))
            .and_then(|outcome| outcome);

        match result {
            Ok(outcome) => {
                debug!(
                    begin = range.begin(),
                    end = range.end(),
                    value = outcome.value,
                    iterations = outcome.iterations,
                    subdivisions = outcome.subdivisions,
                    "leaf converged"
                );
                Ok(self.reducer.combine(self.reducer.identity(), outcome.value))
            }
            Err(error) => {
                abort.store(true, Ordering::Relaxed);
                Err(error)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "integrand panicked".to_owned()
    }
}

/// 單一入口：以 `degree_of_parallelism` 個 worker 計算 `f` 在 `[begin, end]` 上的積分。
///
/// ```
/// use rectquad::math::integration::parallelintegrator::parallel_integrate;
///
/// let value = parallel_integrate(&|x: f64| 3.0 * x * x, 0.0, 1.0, 1e-3, 2).unwrap();
/// assert!((value - 1.0).abs() < 1e-2);
/// ```
pub fn parallel_integrate<F: Integrand + ?Sized>(
    f: &F,
    begin: f64,
    end: f64,
    epsilon: f64,
    degree_of_parallelism: usize,
) -> Result<f64, IntegrationError> {
    let tolerance = Tolerance::new(epsilon)?;
    ParallelIntegrator::new(tolerance, degree_of_parallelism)?.integrate(f, begin, end)
}
