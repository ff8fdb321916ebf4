//! Parameters delivered by the OAuth success redirect.

use url::Url;

use crate::credential::Credential;
use crate::error::{DomainError, DomainResult};
use crate::user::SessionUser;

/// Base used to resolve callback locations given as a bare path.
const RELATIVE_BASE: &str = "http://localhost/";

/// Query parameters of `/oauth-success?token=..&email=..&name=..`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthCallbackParams {
    /// Bearer token issued by the backend.
    pub token: Option<String>,
    /// Email of the signed-in account.
    pub email: Option<String>,
    /// Display name, when the provider shared one.
    pub name: Option<String>,
}

impl OAuthCallbackParams {
    /// Parses the callback location.
    ///
    /// Accepts an absolute URL or a path with a query string.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be parsed as a URL.
    pub fn parse(location: &str) -> DomainResult<Self> {
        let url = match Url::parse(location) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
                .and_then(|base| base.join(location))
                .map_err(|e| DomainError::InvalidUrl(format!("{e}: {location}")))?,
            Err(e) => return Err(DomainError::InvalidUrl(format!("{e}: {location}"))),
        };

        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let value = Some(value.into_owned()).filter(|v| !v.is_empty());
            match key.as_ref() {
                "token" => params.token = value,
                "email" => params.email = value,
                "name" => params.name = value,
                _ => {}
            }
        }
        Ok(params)
    }

    /// Returns the session the callback establishes, if it carries one.
    ///
    /// Both a token and an email are required.
    #[must_use]
    pub fn session(&self) -> Option<(Credential, SessionUser)> {
        let credential = Credential::new(self.token.clone()?).ok()?;
        let user = SessionUser::new(self.email.clone()?, self.name.clone());
        user.validate().ok()?;
        Some((credential, user))
    }
}
