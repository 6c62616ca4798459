//! The linear step state machine: login, basic details, skills, résumé.
//!
//! Policy: step failures are non-fatal except login. Only a failure to
//! establish the session or to authenticate aborts the run; every later step
//! records its own success or failure and the run always proceeds to teardown
//! and log publication.

use crate::config::RunConfig;
use crate::document::DocumentProducer;
use crate::driver::{Driver, DriverError};
use crate::freshness;
use crate::locator::{Locator, WaitSpec};
use crate::notify::Notifier;
use crate::poll;
use crate::runlog::RunLog;
use crate::selectors;
use crate::session::Session;
use chrono::Local;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

const FORM_TIMEOUT: Duration = Duration::from_secs(15);
const SKIP_PROMPT_TIMEOUT: Duration = Duration::from_secs(10);
const CHECKPOINT_TIMEOUT: Duration = Duration::from_secs(40);
const OVERLAY_TIMEOUT: Duration = Duration::from_secs(10);
const PANEL_TIMEOUT: Duration = Duration::from_secs(20);
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(10);
const ATTACH_TIMEOUT: Duration = Duration::from_secs(10);
const UPLOAD_SAVE_TIMEOUT: Duration = Duration::from_secs(5);
const FRESHNESS_TIMEOUT: Duration = Duration::from_secs(30);

const SETTLE_SHORT: Duration = Duration::from_secs(1);
const SETTLE_LONG: Duration = Duration::from_secs(2);

/// Fixed pause for client-side rendering that exposes no completion signal.
async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    LoggedIn,
    SkillsUpdated,
    ResumeUploaded,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepName {
    Login,
    UpdateBasicDetails,
    UpdateSkills,
    RefreshResume,
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepName::Login => "login",
            StepName::UpdateBasicDetails => "update-basic-details",
            StepName::UpdateSkills => "update-skills",
            StepName::RefreshResume => "refresh-resume",
        };
        f.write_str(name)
    }
}

/// Outcome of one step. Failures never propagate past the step boundary;
/// they are captured here and in the run log.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub step: StepName,
    pub succeeded: bool,
    pub detail: String,
}

impl StepResult {
    fn ok(step: StepName, detail: impl Into<String>) -> Self {
        Self {
            step,
            succeeded: true,
            detail: detail.into(),
        }
    }

    fn fail(step: StepName, detail: impl Into<String>) -> Self {
        Self {
            step,
            succeeded: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub results: Vec<StepResult>,
    pub log: RunLog,
}

impl RunReport {
    /// True only for the unrecoverable cases: session never opened, or login
    /// never succeeded.
    pub fn fatal(&self) -> bool {
        self.state == RunState::Failed
    }
}

struct Orchestrator {
    config: RunConfig,
    state: RunState,
    results: Vec<StepResult>,
    log: RunLog,
}

/// Execute the whole workflow against the given driver and collaborators.
///
/// The session and run log are owned here for the run's duration; teardown
/// and log publication happen no matter how the steps went.
pub async fn run(
    driver: Box<dyn Driver>,
    config: RunConfig,
    documents: &dyn DocumentProducer,
    notifier: &dyn Notifier,
) -> RunReport {
    let mut orch = Orchestrator {
        config,
        state: RunState::Idle,
        results: Vec::new(),
        log: RunLog::new(),
    };
    orch.log.append("----- Run begin -----");

    let opened = Session::open(driver, &orch.config.login_url).await;
    match opened {
        Ok(mut session) => {
            if orch.login(&mut session).await {
                orch.state = RunState::LoggedIn;

                orch.update_basic_details(&mut session).await;

                // Skills always advance the machine; a missing confirmation
                // is recorded, not fatal.
                orch.update_skills(&mut session).await;
                orch.state = RunState::SkillsUpdated;

                if orch.refresh_resume(&mut session, documents).await {
                    orch.state = RunState::ResumeUploaded;
                }
            } else {
                orch.log.append("Site Login Failed");
                orch.state = RunState::Failed;
            }
            session.teardown(&mut orch.log).await;
        }
        Err(e) => {
            orch.log.append(format!("Failed to open browser session: {e}"));
            orch.state = RunState::Failed;
        }
    }

    if orch.state == RunState::ResumeUploaded {
        orch.state = RunState::Done;
    }
    orch.log.append("----- Run end -----");

    if let Err(e) = notifier.publish(&orch.log.render()).await {
        warn!("run log could not be delivered: {e}");
    }

    RunReport {
        state: orch.state,
        results: orch.results,
        log: orch.log,
    }
}

impl Orchestrator {
    async fn login(&mut self, session: &mut Session) -> bool {
        let result = match self.try_login(session).await {
            Ok(result) => result,
            Err(e) => {
                self.log.append(format!("Login error: {e}"));
                StepResult::fail(StepName::Login, e.to_string())
            }
        };
        let succeeded = result.succeeded;
        self.results.push(result);
        succeeded
    }

    async fn try_login(&mut self, session: &mut Session) -> Result<StepResult, DriverError> {
        let driver = session.driver_mut();

        if let Ok(title) = driver.title().await {
            self.log.append(format!("Website Loaded Successfully: {title}"));
        }

        // The login form renders after a client-side bootstrap.
        let form = WaitSpec::new(Locator::Id(selectors::USERNAME_FIELD.into()), FORM_TIMEOUT);
        let Some(username) = poll::await_element(driver, &form).await? else {
            self.log.append("Login Form Elements Not Found");
            return Ok(StepResult::fail(StepName::Login, "login form not found"));
        };
        let Some(password) = driver
            .find(&Locator::Id(selectors::PASSWORD_FIELD.into()))
            .await?
        else {
            self.log.append("Password field not found");
            return Ok(StepResult::fail(StepName::Login, "password field not found"));
        };
        let Some(submit) = driver
            .find(&Locator::XPath(selectors::LOGIN_SUBMIT.into()))
            .await?
        else {
            self.log.append("Login button not found");
            return Ok(StepResult::fail(StepName::Login, "login button not found"));
        };

        driver.clear(&username).await?;
        driver.type_text(&username, &self.config.username).await?;
        settle(SETTLE_SHORT).await;
        driver.clear(&password).await?;
        driver.type_text(&password, &self.config.password).await?;
        settle(SETTLE_SHORT).await;
        driver.press_enter(&submit).await?;
        settle(SETTLE_SHORT).await;

        // Optional interstitial; absence means nothing to dismiss.
        let skip = WaitSpec::new(
            Locator::XPath(selectors::SKIP_PROMPT.into()),
            SKIP_PROMPT_TIMEOUT,
        );
        if let Some(prompt) = poll::await_element(driver, &skip).await? {
            self.log.append("Dismissing post-login prompt");
            driver.click(&prompt).await?;
        }

        let checkpoint = WaitSpec::new(
            Locator::Id(selectors::LOGIN_CHECKPOINT.into()),
            CHECKPOINT_TIMEOUT,
        );
        if poll::await_presence(driver, &checkpoint).await? {
            self.log.append("Site Login Successful");
            Ok(StepResult::ok(StepName::Login, "authenticated checkpoint visible"))
        } else {
            self.log.append("Unknown Login Error");
            Ok(StepResult::fail(
                StepName::Login,
                "authenticated checkpoint never appeared",
            ))
        }
    }

    /// Click through to the profile view and dismiss the promotional overlay
    /// if one is covering it.
    async fn open_profile_view(&mut self, session: &mut Session) -> Result<bool, DriverError> {
        let driver = session.driver_mut();

        let view = WaitSpec::new(Locator::XPath(selectors::VIEW_PROFILE.into()), PANEL_TIMEOUT);
        let Some(link) = poll::await_element(driver, &view).await? else {
            self.log.append("Profile link not found");
            return Ok(false);
        };
        driver.click(&link).await?;
        settle(SETTLE_SHORT).await;

        self.dismiss_overlay(session).await?;
        Ok(true)
    }

    async fn dismiss_overlay(&mut self, session: &mut Session) -> Result<(), DriverError> {
        let driver = session.driver_mut();
        let overlay = WaitSpec::new(
            Locator::XPath(selectors::CLOSE_OVERLAY.into()),
            OVERLAY_TIMEOUT,
        );
        if let Some(close) = poll::await_element(driver, &overlay).await? {
            driver.click(&close).await?;
            settle(SETTLE_LONG).await;
        }
        Ok(())
    }

    /// Re-saves the basic-details form with the configured mobile number.
    /// Skipped entirely when no number is configured.
    async fn update_basic_details(&mut self, session: &mut Session) {
        let Some(mobile) = self.config.mobile.clone() else {
            return;
        };
        let result = match self.try_update_basic_details(session, &mobile).await {
            Ok(result) => result,
            Err(e) => {
                self.log.append(format!("Basic Details Update Failed: {e}"));
                StepResult::fail(StepName::UpdateBasicDetails, e.to_string())
            }
        };
        self.results.push(result);
    }

    async fn try_update_basic_details(
        &mut self,
        session: &mut Session,
        mobile: &str,
    ) -> Result<StepResult, DriverError> {
        if !self.open_profile_view(session).await? {
            return Ok(StepResult::fail(
                StepName::UpdateBasicDetails,
                "profile view unreachable",
            ));
        }
        let driver = session.driver_mut();

        // The details form renders either behind a pencil-edit icon or as an
        // inline save form; wait for whichever shows up.
        let either = WaitSpec::new(
            Locator::XPath(format!(
                "{} | {}",
                selectors::DETAILS_EDIT,
                selectors::DETAILS_SAVE
            )),
            PANEL_TIMEOUT,
        );
        poll::await_presence(driver, &either).await?;

        let confirm = if let Some(edit) = driver
            .find(&Locator::XPath(selectors::DETAILS_EDIT.into()))
            .await?
        {
            driver.click(&edit).await?;
            if !self.fill_mobile_and_save(session, mobile).await? {
                return Ok(StepResult::fail(
                    StepName::UpdateBasicDetails,
                    "mobile number element not found",
                ));
            }
            WaitSpec::new(
                Locator::XPath(selectors::DETAILS_CONFIRM_TODAY.into()),
                CONFIRM_TIMEOUT,
            )
        } else if driver
            .find(&Locator::XPath(selectors::DETAILS_SAVE.into()))
            .await?
            .is_some()
        {
            if !self.fill_mobile_and_save(session, mobile).await? {
                return Ok(StepResult::fail(
                    StepName::UpdateBasicDetails,
                    "mobile number element not found",
                ));
            }
            WaitSpec::new(
                Locator::Id(selectors::DETAILS_CONFIRM_INLINE.into()),
                CONFIRM_TIMEOUT,
            )
        } else {
            self.log.append("Basic details form not found");
            return Ok(StepResult::fail(
                StepName::UpdateBasicDetails,
                "details form not found",
            ));
        };

        let driver = session.driver_mut();
        if poll::await_presence(driver, &confirm).await? {
            self.log.append("Basic Details Update Successful");
            Ok(StepResult::ok(
                StepName::UpdateBasicDetails,
                "save confirmation visible",
            ))
        } else {
            self.log.append("Basic Details Update Failed");
            Ok(StepResult::fail(
                StepName::UpdateBasicDetails,
                "save confirmation never appeared",
            ))
        }
    }

    async fn fill_mobile_and_save(
        &mut self,
        session: &mut Session,
        mobile: &str,
    ) -> Result<bool, DriverError> {
        let driver = session.driver_mut();

        let field = WaitSpec::new(Locator::XPath(selectors::MOBILE_FIELD.into()), PANEL_TIMEOUT);
        let Some(input) = poll::await_element(driver, &field).await? else {
            self.log.append("Mobile number element not found in UI");
            return Ok(false);
        };
        driver.clear(&input).await?;
        driver.type_text(&input, mobile).await?;
        settle(SETTLE_LONG).await;

        let Some(save) = driver
            .find(&Locator::XPath(selectors::DETAILS_SAVE.into()))
            .await?
        else {
            self.log.append("Save button not found");
            return Ok(false);
        };
        driver.press_enter(&save).await?;
        settle(SETTLE_LONG).await;
        Ok(true)
    }

    /// Opens the key-skills editor and re-saves it. The tag list itself is
    /// left untouched: the mutation is a deliberate no-op passthrough until
    /// product intent for the skill rotation is settled.
    async fn update_skills(&mut self, session: &mut Session) {
        let result = match self.try_update_skills(session).await {
            Ok(result) => result,
            Err(e) => {
                self.log.append(format!("Profile Update Failed: {e}"));
                StepResult::fail(StepName::UpdateSkills, e.to_string())
            }
        };
        self.results.push(result);
    }

    async fn try_update_skills(
        &mut self,
        session: &mut Session,
    ) -> Result<StepResult, DriverError> {
        if !self.open_profile_view(session).await? {
            return Ok(StepResult::fail(
                StepName::UpdateSkills,
                "profile view unreachable",
            ));
        }
        let driver = session.driver_mut();

        let edit = WaitSpec::new(Locator::XPath(selectors::SKILL_EDIT.into()), PANEL_TIMEOUT);
        let Some(edit_icon) = poll::await_element(driver, &edit).await? else {
            self.log.append("Skill editor not found");
            return Ok(StepResult::fail(
                StepName::UpdateSkills,
                "skill editor not found",
            ));
        };
        driver.click(&edit_icon).await?;
        settle(SETTLE_LONG).await;

        // The editor drawer is optional; when it opened, save it as-is.
        if driver
            .find(&Locator::XPath(selectors::SKILL_DRAWER.into()))
            .await?
            .is_some()
        {
            if let Some(save) = driver
                .find(&Locator::XPath(selectors::SKILL_SAVE.into()))
                .await?
            {
                driver.click(&save).await?;
            }
        }

        let confirm = WaitSpec::new(
            Locator::XPath(selectors::SKILL_CONFIRM.into()),
            CONFIRM_TIMEOUT,
        );
        if poll::await_presence(driver, &confirm).await? {
            self.log.append("Profile Update Successful");
            Ok(StepResult::ok(StepName::UpdateSkills, "save confirmation visible"))
        } else {
            self.log.append("Profile Update Failed");
            Ok(StepResult::fail(
                StepName::UpdateSkills,
                "save confirmation never appeared",
            ))
        }
    }

    /// Produce the upload document (falling back to the source on collaborator
    /// failure), upload it, and verify the portal's freshness marker shows
    /// today's date.
    async fn refresh_resume(
        &mut self,
        session: &mut Session,
        documents: &dyn DocumentProducer,
    ) -> bool {
        let source = self.config.resume.source.clone();
        if !source.exists() {
            self.log
                .append(format!("Resume not found at {}", source.display()));
            self.results.push(StepResult::fail(
                StepName::RefreshResume,
                "source document missing",
            ));
            return false;
        }

        let upload_path = if self.config.resume.mutate {
            match documents.produce(&source) {
                Ok(path) => {
                    self.log
                        .append(format!("Prepared updated document: {}", path.display()));
                    path
                }
                Err(e) => {
                    self.log.append(format!(
                        "Document mutation failed ({e}); uploading original"
                    ));
                    source.clone()
                }
            }
        } else {
            source.clone()
        };

        let result = match self.try_upload(session, &upload_path).await {
            Ok(result) => result,
            Err(e) => {
                self.log.append(format!("Resume Document Upload failed: {e}"));
                StepResult::fail(StepName::RefreshResume, e.to_string())
            }
        };
        let succeeded = result.succeeded;
        self.results.push(result);
        succeeded
    }

    async fn try_upload(
        &mut self,
        session: &mut Session,
        path: &Path,
    ) -> Result<StepResult, DriverError> {
        let profile_url = self.config.profile_url.clone();
        session.driver_mut().goto(&profile_url).await?;
        settle(SETTLE_LONG).await;

        self.dismiss_overlay(session).await?;
        let driver = session.driver_mut();

        let attach = WaitSpec::new(Locator::Id(selectors::ATTACH_INPUT.into()), ATTACH_TIMEOUT);
        let Some(input) = poll::await_element(driver, &attach).await? else {
            self.log.append("Upload control not found");
            return Ok(StepResult::fail(
                StepName::RefreshResume,
                "attach control not found",
            ));
        };
        driver.attach_file(&input, path).await?;

        // Some layouts require an explicit save after attaching.
        let save = WaitSpec::new(
            Locator::XPath(selectors::UPLOAD_SAVE.into()),
            UPLOAD_SAVE_TIMEOUT,
        );
        if let Some(button) = poll::await_element(driver, &save).await? {
            driver.click(&button).await?;
        }

        let marker = WaitSpec::new(
            Locator::XPath(selectors::FRESHNESS_MARKER.into()),
            FRESHNESS_TIMEOUT,
        );
        let Some(marker_el) = poll::await_element(driver, &marker).await? else {
            self.log
                .append("Resume Document Upload failed. Last updated marker not found.");
            return Ok(StepResult::fail(
                StepName::RefreshResume,
                "freshness marker not found",
            ));
        };

        let last_updated = driver.text(&marker_el).await?;
        let today = Local::now().date_naive();
        if freshness::matches_date(&last_updated, today) {
            self.log.append(format!(
                "Resume Document Upload Successful. Last updated: {last_updated}"
            ));
            Ok(StepResult::ok(
                StepName::RefreshResume,
                format!("freshness marker reads {last_updated}"),
            ))
        } else {
            self.log.append(format!(
                "Resume Document Upload failed. Last updated: {last_updated}"
            ));
            Ok(StepResult::fail(
                StepName::RefreshResume,
                format!("stale freshness marker: {last_updated}"),
            ))
        }
    }
}
