use crate::driver::{Driver, DriverError};
use crate::runlog::RunLog;

/// Exclusive owner of one launched browser context for the run's lifetime.
pub struct Session {
    driver: Box<dyn Driver>,
}

impl Session {
    /// Launch the driver and navigate to the entry URL. Failure here is the
    /// one error class that aborts a run before any step executes.
    pub async fn open(mut driver: Box<dyn Driver>, entry_url: &str) -> Result<Self, DriverError> {
        driver.launch().await?;
        driver.goto(entry_url).await?;
        Ok(Self { driver })
    }

    pub fn driver_mut(&mut self) -> &mut dyn Driver {
        self.driver.as_mut()
    }

    /// Close-window and quit are separate commands, not a transactional pair:
    /// each is attempted and logged independently so a failure in one never
    /// skips the other.
    pub async fn teardown(mut self, log: &mut RunLog) {
        match self.driver.close_window().await {
            Ok(()) => log.append("Driver Closed Successfully"),
            Err(e) => log.append(format!("Driver close failed: {e}")),
        }
        match self.driver.quit().await {
            Ok(()) => log.append("Driver Quit Successfully"),
            Err(e) => log.append(format!("Driver quit failed: {e}")),
        }
    }
}
