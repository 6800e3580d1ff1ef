use serde::{Deserialize, Serialize};

/// Account role carried in the bearer token. Anything unrecognised is a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Candidate,
    Employer,
    Admin,
}

impl Role {
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim.map(str::to_ascii_lowercase).as_deref() {
            Some("admin") => Role::Admin,
            Some("employer") => Role::Employer,
            _ => Role::Candidate,
        }
    }
}
