//! Attendance reporting.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::rsvp::{family_rsvp_status, MemberType, RsvpStatus};

/// A member as seen by reports.
#[derive(Debug, Clone)]
pub struct ReportMember {
    pub member_type: MemberType,
    pub attending: Option<bool>,
    pub dietary_restrictions: Option<String>,
}

/// A family as seen by reports.
#[derive(Debug, Clone)]
pub struct ReportFamily {
    pub members: Vec<ReportMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemberTypeCounts {
    pub attending: i64,
    pub declined: i64,
    pub pending: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceReport {
    pub families_total: i64,
    pub families_attending: i64,
    pub families_declined: i64,
    pub families_pending: i64,
    pub members_total: i64,
    pub members_attending: i64,
    pub members_declined: i64,
    pub members_pending: i64,
    pub by_member_type: BTreeMap<&'static str, MemberTypeCounts>,
    /// Dietary restriction (lowercased, trimmed) to attending-member count.
    pub dietary: BTreeMap<String, i64>,
    /// Responded families over all families, 0.0..=1.0.
    pub response_rate: f64,
}

pub fn attendance_report(families: &[ReportFamily]) -> AttendanceReport {
    let mut report = AttendanceReport {
        families_total: families.len() as i64,
        ..Default::default()
    };

    for family in families {
        let attendance: Vec<Option<bool>> = family.members.iter().map(|m| m.attending).collect();
        match family_rsvp_status(&attendance) {
            RsvpStatus::Attending => report.families_attending += 1,
            RsvpStatus::Declined => report.families_declined += 1,
            RsvpStatus::Pending => report.families_pending += 1,
        }

        for member in &family.members {
            report.members_total += 1;
            let counts = report
                .by_member_type
                .entry(member.member_type.as_str())
                .or_default();
            match member.attending {
                Some(true) => {
                    report.members_attending += 1;
                    counts.attending += 1;
                    if let Some(diet) = member
                        .dietary_restrictions
                        .as_deref()
                        .map(|d| d.trim().to_lowercase())
                        .filter(|d| !d.is_empty())
                    {
                        *report.dietary.entry(diet).or_default() += 1;
                    }
                }
                Some(false) => {
                    report.members_declined += 1;
                    counts.declined += 1;
                }
                None => {
                    report.members_pending += 1;
                    counts.pending += 1;
                }
            }
        }
    }

    if report.families_total > 0 {
        let responded = report.families_attending + report.families_declined;
        report.response_rate = responded as f64 / report.families_total as f64;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(member_type: MemberType, attending: Option<bool>, diet: Option<&str>) -> ReportMember {
        ReportMember {
            member_type,
            attending,
            dietary_restrictions: diet.map(String::from),
        }
    }

    #[test]
    fn empty_report_has_zero_rate() {
        let report = attendance_report(&[]);
        assert_eq!(report.families_total, 0);
        assert_eq!(report.response_rate, 0.0);
    }

    #[test]
    fn report_counts_families_members_and_diets() {
        let families = vec![
            ReportFamily {
                members: vec![
                    member(MemberType::Adult, Some(true), Some(" Vegan ")),
                    member(MemberType::Child, Some(true), Some("vegan")),
                    member(MemberType::Infant, Some(false), None),
                ],
            },
            ReportFamily {
                members: vec![member(MemberType::Adult, Some(false), Some("gluten-free"))],
            },
            ReportFamily {
                members: vec![member(MemberType::Adult, None, None)],
            },
            ReportFamily { members: vec![] },
        ];
        let report = attendance_report(&families);

        assert_eq!(report.families_total, 4);
        assert_eq!(report.families_attending, 1);
        assert_eq!(report.families_declined, 1);
        assert_eq!(report.families_pending, 2);
        assert_eq!(report.members_total, 5);
        assert_eq!(report.members_attending, 2);
        assert_eq!(report.members_declined, 2);
        assert_eq!(report.members_pending, 1);
        assert_eq!(report.by_member_type["ADULT"].attending, 1);
        assert_eq!(report.by_member_type["ADULT"].pending, 1);
        assert_eq!(report.dietary.get("vegan"), Some(&2));
        assert!(!report.dietary.contains_key("gluten-free"), "only attending guests count");
        assert_eq!(report.response_rate, 0.5);
    }
}
