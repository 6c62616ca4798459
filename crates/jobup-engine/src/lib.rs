//! Driver-agnostic core for the portal-refresh workflow.
//!
//! The engine owns the locator model, the bounded poller, the session
//! lifecycle and the step orchestrator. Browser specifics live behind the
//! [`driver::Driver`] trait so backends are swappable; the shipped WebDriver
//! implementation is in the `jobup-wd` crate.

pub mod config;
pub mod document;
pub mod driver;
pub mod freshness;
pub mod locator;
pub mod notify;
pub mod orchestrator;
pub mod poll;
pub mod runlog;
pub mod selectors;
pub mod session;
