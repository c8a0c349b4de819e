use intervue_db::models::{Interview, UserRole};

use crate::auth::Identity;

/// How a user relates to an interview room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admin,
    Interviewer,
    Candidate,
    /// No candidate is bound yet; this candidate-role user becomes the
    /// session's candidate on join.
    BindCandidate,
    Denied,
}

impl Admission {
    pub fn is_allowed(self) -> bool {
        self != Admission::Denied
    }
}

pub fn evaluate(user: &Identity, interview: &Interview) -> Admission {
    if user.role == UserRole::Admin {
        return Admission::Admin;
    }
    if interview.interviewer_id == user.user_id {
        return Admission::Interviewer;
    }
    match interview.candidate_id {
        Some(candidate) if candidate == user.user_id => Admission::Candidate,
        Some(_) => Admission::Denied,
        None if user.role == UserRole::Candidate => Admission::BindCandidate,
        None => Admission::Denied,
    }
}

pub fn can_join(user: &Identity, interview: &Interview) -> bool {
    evaluate(user, interview).is_allowed()
}
