//! Engine configuration: simulation limits and validator settings

use std::env;
use std::time::Duration;

/// Hard bounds on the simulation.
///
/// The defaults are part of the engine's observable contract: loop expansion
/// is clamped to 50 iterations and `while` bodies replay a fixed 10 times.
/// Tests may tighten these.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Upper clamp on any single loop's iteration count.
    pub max_loop_iterations: u32,

    /// Fixed replay count for `while` loops (their condition is never consulted).
    pub while_iterations: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_loop_iterations: 50,
            while_iterations: 10,
        }
    }
}

/// Settings for the native toolchain validator.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Compiler binary, resolved on `PATH`.
    pub compiler: String,

    /// Arguments placed before the source path.
    pub args: Vec<String>,

    /// Wall-clock budget for one compilation.
    pub timeout: Duration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            compiler: "g++".to_string(),
            args: vec!["-std=c++17".to_string()],
            timeout: Duration::from_secs(30),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub limits: Limits,
    pub validator: ValidatorConfig,
}

impl EngineConfig {
    /// Build a configuration from the environment.
    ///
    /// `CXX` overrides the compiler binary and
    /// `STEPTRACE_COMPILE_TIMEOUT_SECS` the compilation budget; everything
    /// else keeps its default.
    pub fn from_env() -> Self {
        let mut config = EngineConfig::default();

        if let Ok(compiler) = env::var("CXX") {
            if !compiler.is_empty() {
                config.validator.compiler = compiler;
            }
        }

        if let Ok(secs) = env::var("STEPTRACE_COMPILE_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                config.validator.timeout = Duration::from_secs(secs);
            }
        }

        config
    }
}
