//! Route guard policies and the route table that assigns them.

use scm_domain::{AuthState, GuardDecision, RouteConfig};

/// Access policy for a route subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    /// Anyone may render the route.
    Public,
    /// Only signed-in users.
    Authenticated,
    /// Only signed-in users holding the admin role.
    Admin,
}

impl RouteGuard {
    /// Decides whether the route may render for the given state.
    ///
    /// Nothing is decided while the state is loading. The decision is never
    /// cached; callers evaluate it on every navigation.
    #[must_use]
    pub fn evaluate(self, state: &AuthState, routes: &RouteConfig) -> GuardDecision {
        if self == Self::Public {
            return GuardDecision::Allow;
        }
        if state.is_loading() {
            return GuardDecision::Wait;
        }
        let Some(user) = state.user() else {
            return GuardDecision::redirect(&routes.login);
        };

        match self {
            Self::Admin if !user.has_role(&routes.admin_role) => {
                GuardDecision::redirect(&routes.landing)
            }
            _ => GuardDecision::Allow,
        }
    }
}

/// Maps path prefixes to guards.
///
/// The longest matching prefix wins; unmatched paths are public. A prefix
/// matches the path itself and anything below it (`/user` matches
/// `/user/notes` but not `/username`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<(String, RouteGuard)>,
}

impl RouteTable {
    /// Creates a table where every path is public.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Puts a subtree behind a guard.
    #[must_use]
    pub fn protect(mut self, prefix: impl Into<String>, guard: RouteGuard) -> Self {
        let prefix = prefix.into().trim_end_matches('/').to_string();
        self.rules.retain(|(existing, _)| *existing != prefix);
        self.rules.push((prefix, guard));
        self
    }

    /// Returns the guard for a path.
    #[must_use]
    pub fn resolve(&self, path: &str) -> RouteGuard {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        self.rules
            .iter()
            .filter(|(prefix, _)| {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or(RouteGuard::Public, |(_, guard)| *guard)
    }
}

impl Default for RouteTable {
    /// The application's route map: user pages behind sign-in, admin pages
    /// behind the admin role, everything else public.
    fn default() -> Self {
        Self::new()
            .protect("/user", RouteGuard::Authenticated)
            .protect("/admin", RouteGuard::Admin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scm_domain::{ADMIN_ROLE, SessionUser};

    fn user() -> SessionUser {
        SessionUser::new("a@b.com", Some("A".to_string())).with_roles(["ROLE_USER"])
    }

    fn admin() -> SessionUser {
        user().with_roles(["ROLE_USER", ADMIN_ROLE])
    }

    #[test]
    fn test_guards_wait_while_loading() {
        let routes = RouteConfig::default();
        let loading = AuthState::initial();

        assert_eq!(
            RouteGuard::Authenticated.evaluate(&loading, &routes),
            GuardDecision::Wait
        );
        assert_eq!(
            RouteGuard::Admin.evaluate(&loading, &routes),
            GuardDecision::Wait
        );
        assert_eq!(
            RouteGuard::Public.evaluate(&loading, &routes),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_authenticated_guard() {
        let routes = RouteConfig::default();

        assert_eq!(
            RouteGuard::Authenticated.evaluate(&AuthState::unauthenticated(), &routes),
            GuardDecision::redirect("/login")
        );
        assert_eq!(
            RouteGuard::Authenticated.evaluate(&AuthState::authenticated(user()), &routes),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_admin_guard_sends_non_admin_to_landing() {
        let routes = RouteConfig::default();

        assert_eq!(
            RouteGuard::Admin.evaluate(&AuthState::authenticated(user()), &routes),
            GuardDecision::redirect("/user/dashboard")
        );
        assert_eq!(
            RouteGuard::Admin.evaluate(&AuthState::unauthenticated(), &routes),
            GuardDecision::redirect("/login")
        );
        assert_eq!(
            RouteGuard::Admin.evaluate(&AuthState::authenticated(admin()), &routes),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_admin_role_is_configurable() {
        let routes = RouteConfig {
            admin_role: "ROLE_USER".to_string(),
            ..RouteConfig::default()
        };
        assert_eq!(
            RouteGuard::Admin.evaluate(&AuthState::authenticated(user()), &routes),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_default_table() {
        let table = RouteTable::default();

        assert_eq!(table.resolve("/user/dashboard"), RouteGuard::Authenticated);
        assert_eq!(table.resolve("/user/contacts/view/42"), RouteGuard::Authenticated);
        assert_eq!(table.resolve("/user"), RouteGuard::Authenticated);
        assert_eq!(table.resolve("/admin/dashboard"), RouteGuard::Admin);
        assert_eq!(table.resolve("/admin/dashboard?tab=users"), RouteGuard::Admin);
        assert_eq!(table.resolve("/login"), RouteGuard::Public);
        assert_eq!(table.resolve("/oauth-success"), RouteGuard::Public);
        assert_eq!(table.resolve("/username"), RouteGuard::Public);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = RouteTable::default().protect("/user/admin-tools/", RouteGuard::Admin);

        assert_eq!(table.resolve("/user/admin-tools/export"), RouteGuard::Admin);
        assert_eq!(table.resolve("/user/notes"), RouteGuard::Authenticated);
    }
}
