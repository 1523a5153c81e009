use std::env;
use std::process::ExitCode;
use std::time::Instant;

use tracing::error;
use tracing_subscriber::EnvFilter;

use rectquad::configuration::Configuration;
use rectquad::configurationerror::ConfigurationError;

/// 對 1..=P_max 個 worker 逐一執行同一個積分並計時。
fn sweep(config: &Configuration) -> Result<(), ConfigurationError> {
    let interval = config.interval();
    let integrand = config.integrand();
    let exact = integrand.exact_integral(interval.begin(), interval.end());
    println!(
        "integrating {:?} on [{}, {}] with epsilon = {:e} (exact = {})",
        integrand,
        interval.begin(),
        interval.end(),
        config.tolerance().epsilon(),
        exact
    );

    for workers in 1..=config.max_parallelism() {
        let integrator = config.parallel_integrator(workers)?;
        let t0 = Instant::now();
        let value = integrator.integrate(integrand, interval.begin(), interval.end())?;
        let elapsed = t0.elapsed().as_secs_f64();
        println!("{}", value);
        println!("time = {} with {} threads", elapsed, workers);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config_result = match env::args().nth(1) {
        Some(config_path) => Configuration::from_reader(&config_path),
        None => Configuration::reference()
    };

    match config_result.and_then(|config| sweep(&config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "integration sweep failed");
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
