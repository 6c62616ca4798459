use crate::locator::Locator;
use async_trait::async_trait;
use std::path::Path;

/// Opaque token for a resolved element. Minted by the driver on a successful
/// [`Driver::find`]; invalidated by the next navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("driver not launched")]
    NotReady,
    #[error("failed to reach WebDriver server: {0}")]
    Connect(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    #[error("element handle is no longer valid")]
    StaleHandle,
    #[error("webdriver command failed: {0}")]
    Command(String),
}

/// The capability set the engine consumes from a browser backend.
///
/// Resolution contract: [`Driver::find`] returns `Ok(None)` when the element
/// is simply not rendered; absence is a normal outcome, never an error. A
/// malformed selector or any other driver fault is a hard `Err`; callers must
/// not retry those.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Launch the browser context (or connect to a running one).
    async fn launch(&mut self) -> Result<(), DriverError>;

    async fn goto(&mut self, url: &str) -> Result<(), DriverError>;

    async fn title(&mut self) -> Result<String, DriverError>;

    /// One native lookup attempt. Must fail fast internally; all waiting is
    /// the poller's job.
    async fn find(&mut self, locator: &Locator) -> Result<Option<ElementHandle>, DriverError>;

    async fn click(&mut self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn clear(&mut self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn type_text(
        &mut self,
        element: &ElementHandle,
        text: &str,
    ) -> Result<(), DriverError>;

    /// Send an Enter keypress to the element (form submission).
    async fn press_enter(&mut self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn text(&mut self, element: &ElementHandle) -> Result<String, DriverError>;

    /// Attach a local file to a file-input element.
    async fn attach_file(
        &mut self,
        element: &ElementHandle,
        path: &Path,
    ) -> Result<(), DriverError>;

    /// Close the current browser window. Part of teardown; [`Driver::quit`]
    /// is still attempted when this fails.
    async fn close_window(&mut self) -> Result<(), DriverError>;

    /// End the session and release the browser context.
    async fn quit(&mut self) -> Result<(), DriverError>;
}
