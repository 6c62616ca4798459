use crate::caps::chrome_capabilities;
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::key::Key;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator as WdLocator};
use jobup_engine::driver::{Driver, DriverError, ElementHandle};
use jobup_engine::locator::Locator;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// A locator translated to one of the query strategies the wire protocol
/// actually supports. Owns its selector string because the non-native kinds
/// (`Name`, `Tag`, `Class`) are rewritten into CSS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeQuery {
    Css(String),
    Id(String),
    XPath(String),
    LinkText(String),
}

/// Exhaustive translation: every `Locator` kind has exactly one native
/// strategy.
pub fn to_native(locator: &Locator) -> NativeQuery {
    match locator {
        Locator::Id(v) => NativeQuery::Id(v.clone()),
        Locator::Css(v) => NativeQuery::Css(v.clone()),
        Locator::XPath(v) => NativeQuery::XPath(v.clone()),
        Locator::LinkText(v) => NativeQuery::LinkText(v.clone()),
        Locator::Name(v) => NativeQuery::Css(format!("[name='{v}']")),
        Locator::Tag(v) => NativeQuery::Css(v.clone()),
        Locator::Class(v) => NativeQuery::Css(format!(".{v}")),
    }
}

impl NativeQuery {
    fn as_wd(&self) -> WdLocator<'_> {
        match self {
            NativeQuery::Css(s) => WdLocator::Css(s),
            NativeQuery::Id(s) => WdLocator::Id(s),
            NativeQuery::XPath(s) => WdLocator::XPath(s),
            NativeQuery::LinkText(s) => WdLocator::LinkText(s),
        }
    }
}

fn command_error(e: CmdError) -> DriverError {
    let message = e.to_string();
    if message.contains("invalid selector") {
        DriverError::InvalidSelector(message)
    } else {
        DriverError::Command(message)
    }
}

/// `Driver` over a W3C WebDriver session.
pub struct WebDriverBackend {
    webdriver_url: String,
    headless: bool,
    client: Option<Client>,
    elements: HashMap<u64, Element>,
    next_handle: u64,
}

impl WebDriverBackend {
    pub fn new(webdriver_url: impl Into<String>, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
            client: None,
            elements: HashMap::new(),
            next_handle: 0,
        }
    }

    fn client(&self) -> Result<&Client, DriverError> {
        self.client.as_ref().ok_or(DriverError::NotReady)
    }

    fn element(&self, handle: &ElementHandle) -> Result<&Element, DriverError> {
        self.elements.get(&handle.0).ok_or(DriverError::StaleHandle)
    }

    fn mint(&mut self, element: Element) -> ElementHandle {
        let id = self.next_handle;
        self.next_handle += 1;
        self.elements.insert(id, element);
        ElementHandle(id)
    }
}

#[async_trait]
impl Driver for WebDriverBackend {
    async fn launch(&mut self) -> Result<(), DriverError> {
        info!("Connecting to WebDriver at {}...", self.webdriver_url);
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(self.headless))
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| DriverError::Connect(e.to_string()))?;

        // All waiting lives in the poller; a nonzero implicit wait here would
        // compound with every polling round.
        let timeouts = TimeoutConfiguration::new(None, None, Some(Duration::ZERO));
        client
            .update_timeouts(timeouts)
            .await
            .map_err(command_error)?;

        self.client = Some(client);
        info!("Browser session established");
        Ok(())
    }

    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        // Element references do not survive navigation.
        self.elements.clear();
        self.client()?
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))
    }

    async fn title(&mut self) -> Result<String, DriverError> {
        self.client()?.title().await.map_err(command_error)
    }

    async fn find(&mut self, locator: &Locator) -> Result<Option<ElementHandle>, DriverError> {
        let query = to_native(locator);
        let found = self.client()?.find(query.as_wd()).await;
        match found {
            Ok(element) => Ok(Some(self.mint(element))),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(command_error(e)),
        }
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<(), DriverError> {
        self.element(element)?.click().await.map_err(command_error)
    }

    async fn clear(&mut self, element: &ElementHandle) -> Result<(), DriverError> {
        self.element(element)?.clear().await.map_err(command_error)
    }

    async fn type_text(
        &mut self,
        element: &ElementHandle,
        text: &str,
    ) -> Result<(), DriverError> {
        self.element(element)?
            .send_keys(text)
            .await
            .map_err(command_error)
    }

    async fn press_enter(&mut self, element: &ElementHandle) -> Result<(), DriverError> {
        let enter = char::from(Key::Enter).to_string();
        self.element(element)?
            .send_keys(&enter)
            .await
            .map_err(command_error)
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String, DriverError> {
        self.element(element)?.text().await.map_err(command_error)
    }

    async fn attach_file(
        &mut self,
        element: &ElementHandle,
        path: &Path,
    ) -> Result<(), DriverError> {
        // File inputs take the absolute path as keystrokes.
        let absolute = path
            .canonicalize()
            .map_err(|e| DriverError::Command(format!("cannot resolve {}: {e}", path.display())))?;
        self.element(element)?
            .send_keys(&absolute.display().to_string())
            .await
            .map_err(command_error)
    }

    async fn close_window(&mut self) -> Result<(), DriverError> {
        self.client()?.close_window().await.map_err(command_error)
    }

    async fn quit(&mut self) -> Result<(), DriverError> {
        if let Some(client) = self.client.take() {
            client.close().await.map_err(command_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_locator_kind_translates_to_a_native_strategy() {
        assert_eq!(
            to_native(&Locator::Id("attachCV".into())),
            NativeQuery::Id("attachCV".into())
        );
        assert_eq!(
            to_native(&Locator::Css("#main".into())),
            NativeQuery::Css("#main".into())
        );
        assert_eq!(
            to_native(&Locator::XPath("//a".into())),
            NativeQuery::XPath("//a".into())
        );
        assert_eq!(
            to_native(&Locator::LinkText("Sign out".into())),
            NativeQuery::LinkText("Sign out".into())
        );
        assert_eq!(
            to_native(&Locator::Name("mobile".into())),
            NativeQuery::Css("[name='mobile']".into())
        );
        assert_eq!(
            to_native(&Locator::Tag("input".into())),
            NativeQuery::Css("input".into())
        );
        assert_eq!(
            to_native(&Locator::Class("crossIcon".into())),
            NativeQuery::Css(".crossIcon".into())
        );
    }
}
