/// Access class of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable without a session.
    Public,
    /// Needs a session.
    Protected,
    /// Needs a session with an admin or director role.
    Admin,
}

/// Path prefixes driving [`RouteClass`] and the gate's redirect targets.
///
/// Prefixes are matched on segment boundaries: `/rank` covers `/rank` and
/// `/rank/2024` but not `/ranking`. The root prefix `/` only covers `/` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    pub public_prefixes: Vec<String>,
    pub admin_root: String,
    /// Self-service page under the admin root that skips the role check.
    pub admin_exempt: String,
    pub login_path: String,
    pub home_path: String,
    /// Mark session cookies `Secure`. Disable only when serving over plain http.
    pub secure_cookies: bool,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            public_prefixes: [
                "/",
                "/login",
                "/signup",
                "/forgot-password",
                "/auth",
                "/rachas",
                "/campeonatos",
                "/galeria",
                "/stats",
                "/rank",
                "/integrantes",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            admin_root: "/admin".into(),
            admin_exempt: "/admin/perfil".into(),
            login_path: "/login".into(),
            home_path: "/".into(),
            secure_cookies: true,
        }
    }
}

impl RouteTable {
    /// Classify `path`. Admin wins over the public list so a misconfigured public
    /// prefix can never expose the admin area.
    pub fn classify(&self, path: &str) -> RouteClass {
        if matches_prefix(path, &self.admin_root) {
            RouteClass::Admin
        } else if self
            .public_prefixes
            .iter()
            .any(|prefix| matches_prefix(path, prefix))
        {
            RouteClass::Public
        } else {
            RouteClass::Protected
        }
    }

    /// Whether `path` is the admin self-service area.
    pub fn is_admin_exempt(&self, path: &str) -> bool {
        matches_prefix(path, &self.admin_exempt)
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return path == "/" || path.is_empty();
    }

    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_sections_are_public() {
        let routes = RouteTable::default();
        for path in [
            "/",
            "/login",
            "/signup",
            "/forgot-password",
            "/auth/callback",
            "/rachas",
            "/rachas/4b1c/events",
            "/campeonatos/2025",
            "/galeria",
            "/stats",
            "/rank",
            "/integrantes",
        ] {
            assert_eq!(routes.classify(path), RouteClass::Public, "{path}");
        }
    }

    #[test]
    fn root_prefix_does_not_cover_everything() {
        let routes = RouteTable::default();
        assert_eq!(routes.classify("/presenca/1"), RouteClass::Protected);
        assert_eq!(routes.classify("/dashboard"), RouteClass::Protected);
    }

    #[test]
    fn prefixes_respect_segment_boundaries() {
        let routes = RouteTable::default();
        assert_eq!(routes.classify("/ranking"), RouteClass::Protected);
        assert_eq!(routes.classify("/authority"), RouteClass::Protected);
        assert_eq!(routes.classify("/administration"), RouteClass::Protected);
    }

    #[test]
    fn admin_root_and_children_are_admin() {
        let routes = RouteTable::default();
        assert_eq!(routes.classify("/admin"), RouteClass::Admin);
        assert_eq!(routes.classify("/admin/rachas/1/start"), RouteClass::Admin);
        assert_eq!(routes.classify("/admin/perfil"), RouteClass::Admin);
    }

    #[test]
    fn admin_exemption_is_its_own_prefix() {
        let routes = RouteTable::default();
        assert!(routes.is_admin_exempt("/admin/perfil"));
        assert!(routes.is_admin_exempt("/admin/perfil/editar"));
        assert!(!routes.is_admin_exempt("/admin/perfis"));
        assert!(!routes.is_admin_exempt("/admin"));
    }

    #[test]
    fn admin_beats_a_public_entry() {
        let routes = RouteTable {
            public_prefixes: vec!["/admin".into()],
            ..RouteTable::default()
        };
        assert_eq!(routes.classify("/admin/rachas"), RouteClass::Admin);
    }
}
