//! Credentials and the prompt used to complete them

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

/// Username and password sent with every request
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name on the build server
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value of the `Authorization` header: `Basic base64(username:password)`
    ///
    /// # Examples
    ///
    /// ```
    /// use tcad::Credentials;
    ///
    /// let credentials = Credentials::new("Aladdin", "open sesame");
    /// assert_eq!(credentials.basic_auth_header(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    /// ```
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw.as_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Which half of the credentials is being asked for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialField {
    /// The account name
    Username,
    /// The account password
    Password,
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialField::Username => f.write_str("username"),
            CredentialField::Password => f.write_str("password"),
        }
    }
}

/// Source of credentials that were not supplied up front
///
/// The sync run asks for the username first, then the password. Returning
/// `None` cancels the run; the run then ends successfully without touching the
/// server.
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    /// Ask for one credential field
    async fn prompt(&self, field: CredentialField) -> Option<String>;
}

/// Prompt for non-interactive use: always cancels
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

#[async_trait]
impl CredentialPrompt for NoPrompt {
    async fn prompt(&self, field: CredentialField) -> Option<String> {
        tracing::debug!(%field, "no credential prompt available");
        None
    }
}

/// Prompt that hands out pre-seeded answers in order, then cancels
#[derive(Debug, Default)]
pub struct StaticPrompt {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<CredentialField>>,
}

impl StaticPrompt {
    /// Create a prompt answering with `answers`, one per question
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Fields asked for so far, in order
    pub fn asked(&self) -> Vec<CredentialField> {
        self.asked.lock().map(|asked| asked.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CredentialPrompt for StaticPrompt {
    async fn prompt(&self, field: CredentialField) -> Option<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(field);
        }
        self.answers.lock().ok()?.pop_front()
    }
}
