//! Bounded polling over the driver's fail-fast lookups.
//!
//! The target UI renders asynchronously after navigations and clicks with no
//! reliable completion signal, so a single immediate lookup is flaky and an
//! unbounded wait can hang. Each wait probes once up front, then sleeps one
//! interval between further probes until the budget is exhausted.

use crate::driver::{Driver, DriverError, ElementHandle};
use crate::locator::WaitSpec;
use tokio::time::sleep;
use tracing::debug;

/// Poll until the element resolves or the budget runs out. An exhausted
/// budget is `Ok(None)`, not an error; hard resolver errors propagate.
pub async fn await_element<D: Driver + ?Sized>(
    driver: &mut D,
    spec: &WaitSpec,
) -> Result<Option<ElementHandle>, DriverError> {
    if let Some(found) = driver.find(&spec.locator).await? {
        return Ok(Some(found));
    }

    // A zero timeout degenerates to the single probe above.
    let rounds = spec
        .timeout
        .as_millis()
        .div_ceil(spec.poll_interval.as_millis());
    for _ in 0..rounds {
        sleep(spec.poll_interval).await;
        if let Some(found) = driver.find(&spec.locator).await? {
            return Ok(Some(found));
        }
    }

    debug!("element not found with {}", spec.locator);
    Ok(None)
}

/// Presence-only variant of [`await_element`].
pub async fn await_presence<D: Driver + ?Sized>(
    driver: &mut D,
    spec: &WaitSpec,
) -> Result<bool, DriverError> {
    Ok(await_element(driver, spec).await?.is_some())
}
