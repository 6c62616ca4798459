//! Anchors into the portal's markup. Everything the orchestrator touches on
//! the page is named here; when the portal ships a redesign, this is the file
//! that changes.

/// Login form.
pub const USERNAME_FIELD: &str = "usernameField";
pub const PASSWORD_FIELD: &str = "passwordField";
pub const LOGIN_SUBMIT: &str = "//*[@type='submit' and normalize-space()='Login']";

/// Optional post-login interstitial.
pub const SKIP_PROMPT: &str = "//*[text() = 'SKIP AND CONTINUE']";

/// Present only once authenticated.
pub const LOGIN_CHECKPOINT: &str = "ff-inventory";

/// Profile surface.
pub const VIEW_PROFILE: &str = "//*[contains(@class, 'view-profile')]//a";
pub const CLOSE_OVERLAY: &str = "//*[contains(@class, 'crossIcon')]";

/// Basic-details form, which renders in two variants: a pencil-edit drawer or
/// an inline save form.
pub const DETAILS_EDIT: &str = "(//*[contains(@class, 'icon edit')])[1]";
pub const MOBILE_FIELD: &str = "//*[@name='mobile'] | //*[@id='mob_number']";
pub const DETAILS_SAVE: &str =
    "//button[@type='submit'][@value='Save Changes'] | //*[@id='saveBasicDetailsBtn']";
pub const DETAILS_CONFIRM_TODAY: &str = "//*[text()='today' or text()='Today']";
pub const DETAILS_CONFIRM_INLINE: &str = "confirmMessage";

/// Key-skills editor.
pub const SKILL_EDIT: &str = "(//span[@class='edit icon'])[2]";
pub const SKILL_DRAWER: &str = "//div[@class='lightbox profileEditDrawer keySkillsEdit model_open flipOpen']//span[@class='icon'][normalize-space()='CrossLayer']";
pub const SKILL_SAVE: &str = "//button[@id='saveKeySkills']";
pub const SKILL_CONFIRM: &str = "//i[normalize-space()='GreenTick']";

/// Resume upload.
pub const ATTACH_INPUT: &str = "attachCV";
pub const UPLOAD_SAVE: &str = "//button[@type='button']";
pub const FRESHNESS_MARKER: &str = "//*[contains(@class, 'updateOn')]";
