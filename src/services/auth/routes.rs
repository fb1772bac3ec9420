/// Public/protected classification of request paths.
///
/// Routes are mounted under a versioned prefix the policy does not know about,
/// so matching is by suffix: `/api/v2/auth/signup` matches `/auth/signup`.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    public_suffixes: Vec<String>,
}

impl RoutePolicy {
    pub fn new<I, S>(public_suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public_suffixes: public_suffixes
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    // exact, case-sensitive; no trailing-slash or query normalization
    pub fn is_public_route(&self, path: &str) -> bool {
        self.public_suffixes
            .iter()
            .any(|suffix| path.ends_with(suffix.as_str()))
    }
}
