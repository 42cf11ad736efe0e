use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{LevelId, StudentId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Failure to resolve a student identity from the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionResolutionError {
    /// No current-user record at all; the student has to sign in again.
    #[error("no signed-in user in session")]
    MissingUser,

    #[error("current user record is malformed")]
    MalformedUser,

    #[error("current user record carries no id or account number")]
    MissingIdentity,
}

impl SessionResolutionError {
    /// Whether this failure should send the user to the login flow rather
    /// than degrade to the fallback view.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::MissingUser)
    }
}

//
// ─── ROLE ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    /// Any non-student role (admin, teacher, staff...). Kept verbatim.
    Other(String),
}

impl Role {
    pub const STUDENT: &'static str = "student";

    /// Parse a stored role string. Blank input means "no role"; only the
    /// exact string `student` is a student.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        if raw == Self::STUDENT {
            Some(Self::Student)
        } else {
            Some(Self::Other(raw.to_owned()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Student => Self::STUDENT,
            Self::Other(name) => name,
        }
    }

    #[must_use]
    pub fn is_student(&self) -> bool {
        matches!(self, Self::Student)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── CURRENT USER ──────────────────────────────────────────────────────────────
//

/// An identity field that may be stored as a JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentityValue {
    Number(serde_json::Number),
    Text(String),
}

impl IdentityValue {
    /// Zero and blank strings count as "no identity".
    #[must_use]
    pub fn to_student_id(&self) -> Option<StudentId> {
        match self {
            Self::Number(n) => {
                if n.as_f64() == Some(0.0) {
                    None
                } else {
                    StudentId::new(integral_text(n))
                }
            }
            Self::Text(text) => StudentId::new(text),
        }
    }
}

/// `17.0` and `17` name the same user.
fn integral_text(n: &serde_json::Number) -> String {
    if let Some(value) = n.as_u64() {
        return value.to_string();
    }
    if let Some(value) = n.as_i64() {
        return value.to_string();
    }
    match n.as_f64() {
        Some(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 => {
            #[allow(clippy::cast_possible_truncation)]
            let whole = value as i64;
            whole.to_string()
        }
        _ => n.to_string(),
    }
}

/// The signed-in user record cached by the login flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IdentityValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<IdentityValue>,
}

impl CurrentUser {
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(IdentityValue::Text(id.into())),
            account_number: None,
        }
    }

    #[must_use]
    pub fn with_account_number(account: impl Into<String>) -> Self {
        Self {
            id: None,
            account_number: Some(IdentityValue::Text(account.into())),
        }
    }

    /// `id` first, then `account_number`.
    #[must_use]
    pub fn student_id(&self) -> Option<StudentId> {
        self.id
            .as_ref()
            .and_then(IdentityValue::to_student_id)
            .or_else(|| {
                self.account_number
                    .as_ref()
                    .and_then(IdentityValue::to_student_id)
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentUserEntry {
    Parsed(CurrentUser),
    Malformed,
}

//
// ─── UNLOCK SET ────────────────────────────────────────────────────────────────
//

/// Client-cached set of levels the student has unlocked.
///
/// Advisory only: the server-side lock flag decides what is locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockSet(BTreeSet<LevelId>);

impl Default for UnlockSet {
    fn default() -> Self {
        Self(BTreeSet::from([LevelId::new(1)]))
    }
}

impl UnlockSet {
    #[must_use]
    pub fn from_levels(levels: impl IntoIterator<Item = LevelId>) -> Self {
        Self(levels.into_iter().collect())
    }

    /// Parse the cached JSON array of level numbers.
    ///
    /// Missing or unparseable values yield the default `{1}`.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| serde_json::from_str::<Vec<u32>>(value).ok())
            .map_or_else(Self::default, |levels| {
                Self::from_levels(levels.into_iter().map(LevelId::new))
            })
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        let levels: Vec<u32> = self.0.iter().map(LevelId::value).collect();
        serde_json::to_string(&levels).unwrap_or_else(|_| "[1]".to_string())
    }

    #[must_use]
    pub fn contains(&self, id: LevelId) -> bool {
        self.0.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = LevelId> + '_ {
        self.0.iter().copied()
    }
}

//
// ─── SESSION CONTEXT ───────────────────────────────────────────────────────────
//

/// Raw session values as persisted by the session store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSession {
    pub logged_in: Option<String>,
    pub role: Option<String>,
    pub unlocked_levels: Option<String>,
    pub current_user: Option<String>,
    pub student_id: Option<String>,
}

/// Which view the pathway screen should build for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Non-student or anonymous: every level open, nothing completed.
    Open,
    /// Student role without an active login.
    LoginRequired,
    Student,
}

/// Session state passed explicitly into a pathway load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    logged_in: bool,
    role: Option<Role>,
    current_user: Option<CurrentUserEntry>,
    student_id: Option<StudentId>,
    unlocked: UnlockSet,
}

impl SessionContext {
    /// No login, no role.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A logged-in student with the given user record.
    #[must_use]
    pub fn student(user: CurrentUser) -> Self {
        Self {
            logged_in: true,
            role: Some(Role::Student),
            current_user: Some(CurrentUserEntry::Parsed(user)),
            student_id: None,
            unlocked: UnlockSet::default(),
        }
    }

    /// Build a context from raw stored values. Never fails: malformed values
    /// are kept as such so the load can decide how to degrade.
    #[must_use]
    pub fn from_raw(raw: &RawSession) -> Self {
        let current_user = raw.current_user.as_deref().map(|json| {
            serde_json::from_str::<CurrentUser>(json)
                .map_or(CurrentUserEntry::Malformed, CurrentUserEntry::Parsed)
        });

        Self {
            logged_in: raw.logged_in.as_deref() == Some("true"),
            role: raw.role.as_deref().and_then(Role::parse),
            current_user,
            student_id: raw.student_id.as_deref().and_then(StudentId::new),
            unlocked: UnlockSet::parse(raw.unlocked_levels.as_deref()),
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: Option<Role>) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn with_logged_in(mut self, logged_in: bool) -> Self {
        self.logged_in = logged_in;
        self
    }

    #[must_use]
    pub fn with_student_id(mut self, student_id: Option<StudentId>) -> Self {
        self.student_id = student_id;
        self
    }

    #[must_use]
    pub fn with_current_user(mut self, entry: Option<CurrentUserEntry>) -> Self {
        self.current_user = entry;
        self
    }

    #[must_use]
    pub fn with_unlocked(mut self, unlocked: UnlockSet) -> Self {
        self.unlocked = unlocked;
        self
    }

    #[must_use]
    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    #[must_use]
    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    #[must_use]
    pub fn unlocked(&self) -> &UnlockSet {
        &self.unlocked
    }

    #[must_use]
    pub fn access_mode(&self) -> AccessMode {
        match (self.role.as_ref(), self.logged_in) {
            (Some(Role::Student), true) => AccessMode::Student,
            (Some(Role::Student), false) => AccessMode::LoginRequired,
            _ => AccessMode::Open,
        }
    }

    /// Resolve the student identity used to query completions.
    ///
    /// Order: explicit cached student id, then the user's `id`, then its
    /// `account_number`. The explicit id is only honoured while a user
    /// record exists.
    ///
    /// # Errors
    ///
    /// Returns `SessionResolutionError::MissingUser` without a user record,
    /// `MalformedUser` when it could not be parsed, and `MissingIdentity`
    /// when no identity field is usable.
    pub fn resolve_student(&self) -> Result<StudentId, SessionResolutionError> {
        let user = match &self.current_user {
            None => return Err(SessionResolutionError::MissingUser),
            Some(CurrentUserEntry::Malformed) => return Err(SessionResolutionError::MalformedUser),
            Some(CurrentUserEntry::Parsed(user)) => user,
        };

        self.student_id
            .clone()
            .or_else(|| user.student_id())
            .ok_or(SessionResolutionError::MissingIdentity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_student(user_json: &str) -> RawSession {
        RawSession {
            logged_in: Some("true".into()),
            role: Some("student".into()),
            unlocked_levels: None,
            current_user: Some(user_json.into()),
            student_id: None,
        }
    }

    #[test]
    fn role_parse_distinguishes_student() {
        assert_eq!(Role::parse("student"), Some(Role::Student));
        assert_eq!(Role::parse("admin"), Some(Role::Other("admin".into())));
        assert_eq!(Role::parse("  "), None);
    }

    #[test]
    fn padded_student_role_is_not_a_student() {
        assert_eq!(
            Role::parse(" student "),
            Some(Role::Other(" student ".into()))
        );
        assert_eq!(Role::parse("Student"), Some(Role::Other("Student".into())));
    }

    #[test]
    fn access_mode_follows_role_and_login() {
        let student = SessionContext::student(CurrentUser::with_id("9"));
        assert_eq!(student.access_mode(), AccessMode::Student);
        assert_eq!(
            student.clone().with_logged_in(false).access_mode(),
            AccessMode::LoginRequired
        );
        assert_eq!(
            student
                .with_role(Some(Role::Other("teacher".into())))
                .access_mode(),
            AccessMode::Open
        );
        assert_eq!(SessionContext::anonymous().access_mode(), AccessMode::Open);
    }

    #[test]
    fn resolves_numeric_user_id() {
        let ctx = SessionContext::from_raw(&raw_student(r#"{"id": 17, "name": "Sara"}"#));
        assert_eq!(ctx.resolve_student().unwrap().as_str(), "17");
    }

    #[test]
    fn integral_float_id_reads_as_integer() {
        let ctx = SessionContext::from_raw(&raw_student(r#"{"id": 17.0}"#));
        assert_eq!(ctx.resolve_student().unwrap().as_str(), "17");

        let ctx = SessionContext::from_raw(&raw_student(r#"{"id": 0.0, "account_number": 2.5}"#));
        assert_eq!(ctx.resolve_student().unwrap().as_str(), "2.5");
    }

    #[test]
    fn falls_back_to_account_number() {
        let ctx = SessionContext::from_raw(&raw_student(r#"{"id": null, "account_number": "A-5"}"#));
        assert_eq!(ctx.resolve_student().unwrap().as_str(), "A-5");
    }

    #[test]
    fn zero_id_counts_as_missing() {
        let ctx = SessionContext::from_raw(&raw_student(r#"{"id": 0, "account_number": 88}"#));
        assert_eq!(ctx.resolve_student().unwrap().as_str(), "88");
    }

    #[test]
    fn explicit_student_id_wins() {
        let mut raw = raw_student(r#"{"id": 17}"#);
        raw.student_id = Some("S-1".into());
        let ctx = SessionContext::from_raw(&raw);
        assert_eq!(ctx.resolve_student().unwrap().as_str(), "S-1");
    }

    #[test]
    fn missing_user_requires_login() {
        let mut raw = raw_student("{}");
        raw.current_user = None;
        raw.student_id = Some("S-1".into());
        let err = SessionContext::from_raw(&raw).resolve_student().unwrap_err();
        assert_eq!(err, SessionResolutionError::MissingUser);
        assert!(err.requires_login());
    }

    #[test]
    fn malformed_user_does_not_require_login() {
        let err = SessionContext::from_raw(&raw_student("{not json"))
            .resolve_student()
            .unwrap_err();
        assert_eq!(err, SessionResolutionError::MalformedUser);
        assert!(!err.requires_login());
    }

    #[test]
    fn user_without_identity_is_unresolvable() {
        let err = SessionContext::from_raw(&raw_student(r#"{"name": "x"}"#))
            .resolve_student()
            .unwrap_err();
        assert_eq!(err, SessionResolutionError::MissingIdentity);
    }

    #[test]
    fn unlock_set_defaults_to_first_level() {
        let set = UnlockSet::parse(None);
        assert!(set.contains(LevelId::new(1)));
        assert_eq!(set.iter().count(), 1);
        assert_eq!(UnlockSet::parse(Some("oops")), UnlockSet::default());
    }

    #[test]
    fn unlock_set_parses_json_array() {
        let set = UnlockSet::parse(Some("[1, 2, 5]"));
        assert!(set.contains(LevelId::new(5)));
        assert!(!set.contains(LevelId::new(3)));
        assert_eq!(set.to_json(), "[1,2,5]");
    }

    #[test]
    fn logged_in_requires_literal_true() {
        let mut raw = raw_student("{}");
        raw.logged_in = Some("yes".into());
        assert!(!SessionContext::from_raw(&raw).logged_in());
    }
}
