use std::fmt;

/// Long-lived authentication credential handed to every client the manager creates.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    principal: String,
    secret: Option<String>,
}

impl Credential {
    pub fn new(principal: impl Into<String>) -> Self {
        Credential {
            principal: principal.into(),
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// An unauthenticated principal, used when no identity is configured.
    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }

    /// Read `PUBLISHER_CLIENT_ID` / `PUBLISHER_CLIENT_SECRET`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("PUBLISHER_CLIENT_ID").filter(|id| !id.is_empty()) {
            Some(id) => {
                let credential = Credential::new(id);
                match lookup("PUBLISHER_CLIENT_SECRET").filter(|s| !s.is_empty()) {
                    Some(secret) => credential.with_secret(secret),
                    None => credential,
                }
            }
            None => Credential::anonymous(),
        }
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("principal", &self.principal)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
