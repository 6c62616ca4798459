use async_trait::async_trait;
use chrono::Local;
use jobup_engine::config::RunConfig;
use jobup_engine::document::{DocumentProducer, PassthroughProducer};
use jobup_engine::driver::{Driver, DriverError, ElementHandle};
use jobup_engine::locator::Locator;
use jobup_engine::notify::{Notifier, NotifyError, NullNotifier};
use jobup_engine::orchestrator::{self, RunState, StepName};
use jobup_engine::selectors;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory portal: which selectors currently resolve, what their elements
/// read back as, and everything the run did to them.
#[derive(Default)]
struct Inner {
    present: HashSet<String>,
    texts: HashMap<String, String>,
    fail_close_window: bool,
    handles: HashMap<u64, String>,
    next_handle: u64,
    clicked: Vec<String>,
    typed: Vec<(String, String)>,
    submitted: Vec<String>,
    attached: Vec<PathBuf>,
    navigations: Vec<String>,
    close_calls: usize,
    quit_calls: usize,
}

#[derive(Clone)]
struct ScriptedDriver {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedDriver {
    fn new(inner: Inner) -> (Self, Arc<Mutex<Inner>>) {
        let shared = Arc::new(Mutex::new(inner));
        (
            Self {
                inner: Arc::clone(&shared),
            },
            shared,
        )
    }

    fn value_of(&self, element: &ElementHandle) -> Result<String, DriverError> {
        self.inner
            .lock()
            .unwrap()
            .handles
            .get(&element.0)
            .cloned()
            .ok_or(DriverError::StaleHandle)
    }
}

#[async_trait]
impl Driver for ScriptedDriver {
    async fn launch(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        self.inner.lock().unwrap().navigations.push(url.to_string());
        Ok(())
    }

    async fn title(&mut self) -> Result<String, DriverError> {
        Ok("Portal Login".to_string())
    }

    async fn find(&mut self, locator: &Locator) -> Result<Option<ElementHandle>, DriverError> {
        let mut inner = self.inner.lock().unwrap();
        let value = locator.value().to_string();
        if inner.present.contains(&value) {
            let id = inner.next_handle;
            inner.next_handle += 1;
            inner.handles.insert(id, value);
            Ok(Some(ElementHandle(id)))
        } else {
            Ok(None)
        }
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<(), DriverError> {
        let value = self.value_of(element)?;
        self.inner.lock().unwrap().clicked.push(value);
        Ok(())
    }

    async fn clear(&mut self, _element: &ElementHandle) -> Result<(), DriverError> {
        Ok(())
    }

    async fn type_text(&mut self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        let value = self.value_of(element)?;
        self.inner
            .lock()
            .unwrap()
            .typed
            .push((value, text.to_string()));
        Ok(())
    }

    async fn press_enter(&mut self, element: &ElementHandle) -> Result<(), DriverError> {
        let value = self.value_of(element)?;
        self.inner.lock().unwrap().submitted.push(value);
        Ok(())
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String, DriverError> {
        let value = self.value_of(element)?;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .texts
            .get(&value)
            .cloned()
            .unwrap_or_default())
    }

    async fn attach_file(
        &mut self,
        _element: &ElementHandle,
        path: &Path,
    ) -> Result<(), DriverError> {
        self.inner
            .lock()
            .unwrap()
            .attached
            .push(path.to_path_buf());
        Ok(())
    }

    async fn close_window(&mut self) -> Result<(), DriverError> {
        let mut inner = self.inner.lock().unwrap();
        inner.close_calls += 1;
        if inner.fail_close_window {
            Err(DriverError::Command("window already gone".into()))
        } else {
            Ok(())
        }
    }

    async fn quit(&mut self) -> Result<(), DriverError> {
        self.inner.lock().unwrap().quit_calls += 1;
        Ok(())
    }
}

struct RecordingNotifier {
    published: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, body: &str) -> Result<(), NotifyError> {
        self.published.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

struct FailingProducer;

impl DocumentProducer for FailingProducer {
    fn produce(&self, _source: &Path) -> io::Result<PathBuf> {
        Err(io::Error::other("mutation exploded"))
    }
}

fn today_marker_text() -> String {
    format!(
        "Uploaded on {}",
        Local::now().date_naive().format("%b %d, %Y")
    )
}

/// Everything the happy path needs, rendered all at once.
fn happy_fixture() -> Inner {
    let present: HashSet<String> = [
        selectors::USERNAME_FIELD,
        selectors::PASSWORD_FIELD,
        selectors::LOGIN_SUBMIT,
        selectors::LOGIN_CHECKPOINT,
        selectors::VIEW_PROFILE,
        selectors::SKILL_EDIT,
        selectors::SKILL_DRAWER,
        selectors::SKILL_SAVE,
        selectors::SKILL_CONFIRM,
        selectors::ATTACH_INPUT,
        selectors::UPLOAD_SAVE,
        selectors::FRESHNESS_MARKER,
    ]
    .into_iter()
    .map(str::to_string)
    .collect();

    let mut texts = HashMap::new();
    texts.insert(selectors::FRESHNESS_MARKER.to_string(), today_marker_text());

    Inner {
        present,
        texts,
        ..Inner::default()
    }
}

fn test_config(dir: &tempfile::TempDir) -> RunConfig {
    let source = dir.path().join("resume.pdf");
    std::fs::write(&source, b"%PDF-1.4\nstub\n%%EOF\n").unwrap();
    RunConfig {
        username: "someone".into(),
        password: "hunter2".into(),
        resume: jobup_engine::config::ResumeConfig {
            source,
            output: dir.path().join("resume-updated.pdf"),
            mutate: true,
        },
        ..RunConfig::default()
    }
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[tokio::test(start_paused = true)]
async fn happy_path_logs_each_milestone_once_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let (driver, state) = ScriptedDriver::new(happy_fixture());

    let report = orchestrator::run(
        Box::new(driver),
        config,
        &PassthroughProducer,
        &NullNotifier,
    )
    .await;

    assert_eq!(report.state, RunState::Done);
    assert!(report.results.iter().all(|r| r.succeeded));

    let log = report.log.render();
    assert_eq!(count(&log, "Login Successful"), 1);
    assert_eq!(count(&log, "Profile Update Successful"), 1);
    assert_eq!(count(&log, "Upload Successful"), 1);
    let login_at = log.find("Login Successful").unwrap();
    let skills_at = log.find("Profile Update Successful").unwrap();
    let upload_at = log.find("Upload Successful").unwrap();
    assert!(login_at < skills_at && skills_at < upload_at);

    let inner = state.lock().unwrap();
    assert_eq!(inner.close_calls, 1);
    assert_eq!(inner.quit_calls, 1);
    assert!(
        inner
            .typed
            .contains(&(selectors::USERNAME_FIELD.to_string(), "someone".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn login_failure_halts_the_run_before_any_other_step() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let login_url = config.login_url.clone();

    let mut fixture = happy_fixture();
    fixture.present.remove(selectors::LOGIN_CHECKPOINT);
    let (driver, state) = ScriptedDriver::new(fixture);

    let report = orchestrator::run(
        Box::new(driver),
        config,
        &PassthroughProducer,
        &NullNotifier,
    )
    .await;

    assert_eq!(report.state, RunState::Failed);
    assert!(report.fatal());
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].step, StepName::Login);
    assert!(!report.results[0].succeeded);
    assert!(report.log.render().contains("Site Login Failed"));

    let inner = state.lock().unwrap();
    // Entry navigation only; nothing ever opened the profile.
    assert_eq!(inner.navigations, vec![login_url]);
    assert!(!inner.clicked.contains(&selectors::VIEW_PROFILE.to_string()));
    // Teardown still ran, exactly once.
    assert_eq!(inner.close_calls, 1);
    assert_eq!(inner.quit_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn missing_skill_confirmation_is_recorded_but_does_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    let mut fixture = happy_fixture();
    fixture.present.remove(selectors::SKILL_CONFIRM);
    let (driver, _state) = ScriptedDriver::new(fixture);

    let report = orchestrator::run(
        Box::new(driver),
        config,
        &PassthroughProducer,
        &NullNotifier,
    )
    .await;

    // The resume step still ran and the run still completed.
    assert_eq!(report.state, RunState::Done);
    let skills = report
        .results
        .iter()
        .find(|r| r.step == StepName::UpdateSkills)
        .unwrap();
    assert!(!skills.succeeded);
    assert!(report.log.render().contains("Profile Update Failed"));
    assert!(report.log.render().contains("Upload Successful"));
}

#[tokio::test(start_paused = true)]
async fn teardown_quits_even_when_close_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    let mut fixture = happy_fixture();
    fixture.fail_close_window = true;
    let (driver, state) = ScriptedDriver::new(fixture);

    let report = orchestrator::run(
        Box::new(driver),
        config,
        &PassthroughProducer,
        &NullNotifier,
    )
    .await;

    let log = report.log.render();
    assert!(log.contains("Driver close failed"));
    assert!(log.contains("Driver Quit Successfully"));

    let inner = state.lock().unwrap();
    assert_eq!(inner.close_calls, 1);
    assert_eq!(inner.quit_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn producer_failure_falls_back_to_the_source_document() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let source = config.resume.source.clone();
    let (driver, state) = ScriptedDriver::new(happy_fixture());

    let report =
        orchestrator::run(Box::new(driver), config, &FailingProducer, &NullNotifier).await;

    assert_eq!(report.state, RunState::Done);
    assert!(report.log.render().contains("uploading original"));

    let inner = state.lock().unwrap();
    assert_eq!(inner.attached, vec![source]);
}

#[tokio::test(start_paused = true)]
async fn missing_source_document_skips_the_upload() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    config.resume.source = dir.path().join("not-there.pdf");
    let (driver, state) = ScriptedDriver::new(happy_fixture());

    let report = orchestrator::run(
        Box::new(driver),
        config,
        &PassthroughProducer,
        &NullNotifier,
    )
    .await;

    assert_eq!(report.state, RunState::SkillsUpdated);
    assert!(!report.fatal());
    let resume = report
        .results
        .iter()
        .find(|r| r.step == StepName::RefreshResume)
        .unwrap();
    assert!(!resume.succeeded);
    assert!(report.log.render().contains("Resume not found"));

    let inner = state.lock().unwrap();
    assert!(inner.attached.is_empty());
    assert_eq!(inner.quit_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn stale_freshness_marker_fails_the_upload_step() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    let mut fixture = happy_fixture();
    fixture.texts.insert(
        selectors::FRESHNESS_MARKER.to_string(),
        "Uploaded on Jan 5, 1999".to_string(),
    );
    let (driver, _state) = ScriptedDriver::new(fixture);

    let report = orchestrator::run(
        Box::new(driver),
        config,
        &PassthroughProducer,
        &NullNotifier,
    )
    .await;

    assert_eq!(report.state, RunState::SkillsUpdated);
    assert!(report.log.render().contains("Upload failed"));
}

#[tokio::test(start_paused = true)]
async fn run_log_is_published_whole_at_run_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let (driver, _state) = ScriptedDriver::new(happy_fixture());
    let notifier = RecordingNotifier::new();

    let report =
        orchestrator::run(Box::new(driver), config, &PassthroughProducer, &notifier).await;

    let published = notifier.published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0], report.log.render());
    assert!(published[0].contains("----- Run begin -----"));
    assert!(published[0].contains("----- Run end -----"));
}

#[tokio::test(start_paused = true)]
async fn configured_mobile_number_enables_the_basic_details_step() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    config.mobile = Some("9876543210".into());

    let mut fixture = happy_fixture();
    for value in [
        selectors::DETAILS_EDIT.to_string(),
        selectors::MOBILE_FIELD.to_string(),
        selectors::DETAILS_SAVE.to_string(),
        selectors::DETAILS_CONFIRM_TODAY.to_string(),
        format!("{} | {}", selectors::DETAILS_EDIT, selectors::DETAILS_SAVE),
    ] {
        fixture.present.insert(value);
    }
    let (driver, state) = ScriptedDriver::new(fixture);

    let report = orchestrator::run(
        Box::new(driver),
        config,
        &PassthroughProducer,
        &NullNotifier,
    )
    .await;

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.results.len(), 4);
    let details = report
        .results
        .iter()
        .find(|r| r.step == StepName::UpdateBasicDetails)
        .unwrap();
    assert!(details.succeeded);
    assert!(report.log.render().contains("Basic Details Update Successful"));

    let inner = state.lock().unwrap();
    assert!(
        inner
            .typed
            .contains(&(selectors::MOBILE_FIELD.to_string(), "9876543210".to_string()))
    );
    assert!(inner.submitted.contains(&selectors::DETAILS_SAVE.to_string()));
}
