//! Attendance report for the admin console.

use axum::extract::State;
use axum::Json;
use vowline_core::reports::{attendance_report, AttendanceReport, ReportFamily, ReportMember};
use vowline_core::rsvp::MemberType;
use vowline_db::models::family::FamilyWithMembers;
use vowline_db::repositories::FamilyRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireWeddingAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn to_report_families(families: &[FamilyWithMembers]) -> Vec<ReportFamily> {
    families
        .iter()
        .map(|f| ReportFamily {
            members: f
                .members
                .iter()
                .map(|m| ReportMember {
                    member_type: MemberType::from_str_db(&m.member_type)
                        .unwrap_or(MemberType::Adult),
                    attending: m.attending,
                    dietary_restrictions: m.dietary_restrictions.clone(),
                })
                .collect(),
        })
        .collect()
}

/// GET /api/admin/reports/attendance
pub async fn attendance(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<AttendanceReport>>> {
    let families = FamilyRepo::list_with_members(&state.pool, access.wedding_id).await?;
    Ok(Json(DataResponse {
        data: attendance_report(&to_report_families(&families)),
    }))
}
