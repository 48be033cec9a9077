use serde::Serialize;

/// Readiness payload served on `/health`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Health {
    pub ready: bool,
    pub authenticated: bool,
}

impl Health {
    pub fn readiness(authenticated: bool) -> Self {
        Self {
            ready: true,
            authenticated,
        }
    }
}
