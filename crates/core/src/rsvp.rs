//! RSVP submission rules.
//!
//! A guest family answers for every member on its invitation and may add a
//! limited number of extra members (plus-ones, children). Submissions are
//! rejected once the wedding's cutoff has passed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;

/// Most members a guest may add to their own family, across all submissions.
pub const MAX_GUEST_ADDED_MEMBERS: usize = 10;

// ---------------------------------------------------------------------------
// Member type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberType {
    Adult,
    Child,
    Infant,
}

impl MemberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adult => "ADULT",
            Self::Child => "CHILD",
            Self::Infant => "INFANT",
        }
    }

    /// Parse a member type, case-insensitively.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADULT" => Ok(Self::Adult),
            "CHILD" => Ok(Self::Child),
            "INFANT" => Ok(Self::Infant),
            other => Err(CoreError::Validation(format!(
                "Invalid member type '{other}'. Must be one of: ADULT, CHILD, INFANT"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Family-level RSVP state derived from member attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Pending,
    Attending,
    Declined,
}

/// Derive the family status from each member's `attending` flag.
///
/// Any unanswered member keeps the family pending unless somebody already
/// said yes.
pub fn family_rsvp_status(attending: &[Option<bool>]) -> RsvpStatus {
    if attending.iter().any(|a| *a == Some(true)) {
        RsvpStatus::Attending
    } else if !attending.is_empty() && attending.iter().all(|a| *a == Some(false)) {
        RsvpStatus::Declined
    } else {
        RsvpStatus::Pending
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Answer for an existing member.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct MemberResponse {
    pub member_id: DbId,
    pub attending: bool,
    #[validate(length(max = 500))]
    pub dietary_restrictions: Option<String>,
    #[validate(length(max = 500))]
    pub accessibility_needs: Option<String>,
}

/// A member the guest adds to their own family.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct NewMember {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub member_type: MemberType,
    #[validate(range(min = 0, max = 120))]
    pub age: Option<i32>,
    pub attending: bool,
    #[validate(length(max = 500))]
    pub dietary_restrictions: Option<String>,
}

/// Body of `POST /api/guest/{token}/rsvp`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RsvpSubmission {
    #[validate(nested)]
    pub members: Vec<MemberResponse>,
    #[serde(default)]
    #[validate(nested)]
    pub new_members: Vec<NewMember>,
    pub preferred_language: Option<String>,
}

impl RsvpSubmission {
    /// Trim the free-text answers so they are stored the way guest-list
    /// exports read them back. Blank answers become `None`.
    pub fn trimmed(mut self) -> Self {
        for answer in &mut self.members {
            answer.dietary_restrictions = trim_text(answer.dietary_restrictions.take());
            answer.accessibility_needs = trim_text(answer.accessibility_needs.take());
        }
        for member in &mut self.new_members {
            member.name = member.name.trim().to_string();
            member.dietary_restrictions = trim_text(member.dietary_restrictions.take());
        }
        self
    }
}

fn trim_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Check a submission against the family it targets.
///
/// `family_member_ids` are the ids currently on the family. The cutoff check
/// runs first so late guests get a clear "closed" answer.
pub fn validate_submission(
    family_member_ids: &[DbId],
    submission: &RsvpSubmission,
    cutoff_passed: bool,
) -> Result<(), CoreError> {
    if cutoff_passed {
        return Err(CoreError::RsvpClosed);
    }

    submission.validate()?;

    if submission.members.is_empty() && submission.new_members.is_empty() {
        return Err(CoreError::Validation(
            "An RSVP must answer for at least one member".into(),
        ));
    }

    let known: HashSet<DbId> = family_member_ids.iter().copied().collect();
    let mut seen = HashSet::with_capacity(submission.members.len());
    for response in &submission.members {
        if !known.contains(&response.member_id) {
            return Err(CoreError::Validation(format!(
                "Member {} does not belong to this family",
                response.member_id
            )));
        }
        if !seen.insert(response.member_id) {
            return Err(CoreError::Validation(format!(
                "Member {} is answered more than once",
                response.member_id
            )));
        }
    }

    if submission.new_members.len() > MAX_GUEST_ADDED_MEMBERS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_GUEST_ADDED_MEMBERS} members can be added"
        )));
    }
    if submission
        .new_members
        .iter()
        .any(|m| m.name.trim().is_empty())
    {
        return Err(CoreError::Validation("New members need a name".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn answer(member_id: DbId, attending: bool) -> MemberResponse {
        MemberResponse {
            member_id,
            attending,
            dietary_restrictions: None,
            accessibility_needs: None,
        }
    }

    fn submission(members: Vec<MemberResponse>) -> RsvpSubmission {
        RsvpSubmission {
            members,
            new_members: vec![],
            preferred_language: None,
        }
    }

    #[test]
    fn valid_submission_passes() {
        let s = submission(vec![answer(1, true), answer(2, false)]);
        assert!(validate_submission(&[1, 2], &s, false).is_ok());
    }

    #[test]
    fn cutoff_passed_closes_rsvp() {
        let s = submission(vec![answer(1, true)]);
        assert_matches!(validate_submission(&[1], &s, true), Err(CoreError::RsvpClosed));
    }

    #[test]
    fn foreign_member_is_rejected() {
        let s = submission(vec![answer(99, true)]);
        let err = validate_submission(&[1, 2], &s, false).unwrap_err();
        assert!(err.to_string().contains("does not belong"));
    }

    #[test]
    fn duplicate_answers_are_rejected() {
        let s = submission(vec![answer(1, true), answer(1, false)]);
        assert_matches!(
            validate_submission(&[1], &s, false),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn empty_submission_is_rejected() {
        assert!(validate_submission(&[1], &submission(vec![]), false).is_err());
    }

    #[test]
    fn blank_new_member_name_is_rejected() {
        let mut s = submission(vec![]);
        s.new_members.push(NewMember {
            name: "   ".into(),
            member_type: MemberType::Adult,
            age: None,
            attending: true,
            dietary_restrictions: None,
        });
        assert!(validate_submission(&[], &s, false).is_err());
    }

    #[test]
    fn answers_are_trimmed() {
        let mut s = submission(vec![MemberResponse {
            member_id: 1,
            attending: true,
            dietary_restrictions: Some(" vegan ".into()),
            accessibility_needs: Some("   ".into()),
        }]);
        s.new_members.push(NewMember {
            name: " Ann ".into(),
            member_type: MemberType::Adult,
            age: None,
            attending: true,
            dietary_restrictions: None,
        });
        let s = s.trimmed();
        assert_eq!(s.members[0].dietary_restrictions.as_deref(), Some("vegan"));
        assert_eq!(s.members[0].accessibility_needs, None);
        assert_eq!(s.new_members[0].name, "Ann");
    }

    #[test]
    fn too_many_new_members_are_rejected() {
        let mut s = submission(vec![]);
        for i in 0..=MAX_GUEST_ADDED_MEMBERS {
            s.new_members.push(NewMember {
                name: format!("Guest {i}"),
                member_type: MemberType::Child,
                age: Some(5),
                attending: true,
                dietary_restrictions: None,
            });
        }
        assert!(validate_submission(&[], &s, false).is_err());
    }

    #[test]
    fn status_derivation() {
        assert_eq!(family_rsvp_status(&[]), RsvpStatus::Pending);
        assert_eq!(family_rsvp_status(&[None, None]), RsvpStatus::Pending);
        assert_eq!(family_rsvp_status(&[Some(false), None]), RsvpStatus::Pending);
        assert_eq!(family_rsvp_status(&[Some(false), Some(true)]), RsvpStatus::Attending);
        assert_eq!(family_rsvp_status(&[Some(false), Some(false)]), RsvpStatus::Declined);
    }

    #[test]
    fn member_type_parsing_is_case_insensitive() {
        assert_eq!(MemberType::from_str_db("child").unwrap(), MemberType::Child);
        assert_eq!(MemberType::from_str_db(" INFANT ").unwrap(), MemberType::Infant);
        assert!(MemberType::from_str_db("teen").is_err());
    }
}
