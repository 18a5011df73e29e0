use anyhow::Result;
use tracing::{debug, warn};

/// A cleanup action declared by an abort-class workflow step. Compensations
/// run in order when their step fails; a compensation's own failure is
/// swallowed and logged, never escalated.
pub struct Compensation {
    what: String,
    run: Box<dyn FnOnce() -> Result<()>>,
}

impl Compensation {
    pub fn new(what: impl Into<String>, run: impl FnOnce() -> Result<()> + 'static) -> Self {
        Self {
            what: what.into(),
            run: Box::new(run),
        }
    }
}

/// Runs an abort-class step. On failure the step's compensations run in
/// order, then a contextual error halts the workflow. No retries.
pub fn abort_on_failure<T>(
    step: &str,
    compensations: Vec<Compensation>,
    action: impl FnOnce() -> Result<T>,
) -> Result<T> {
    match action() {
        Ok(value) => Ok(value),
        Err(err) => {
            for compensation in compensations {
                debug!("running compensation: {}", compensation.what);
                if let Err(cleanup_err) = (compensation.run)() {
                    warn!(
                        "compensation '{}' failed: {:#}",
                        compensation.what, cleanup_err
                    );
                }
            }
            Err(err.context(format!("{step} failed")))
        }
    }
}

/// Runs a best-effort step. A failure is logged and recorded as a warning
/// naming the retained artifact, and the workflow still reports success.
pub fn warn_on_failure(
    step: &str,
    artifact: &str,
    warnings: &mut Vec<String>,
    action: impl FnOnce() -> Result<()>,
) {
    if let Err(err) = action() {
        let message = format!(
            "{step} failed; '{artifact}' was left behind and may need manual removal ({err:#})"
        );
        warn!("{message}");
        warnings.push(message);
    }
}
