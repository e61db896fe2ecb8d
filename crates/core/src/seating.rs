//! Seating capacity checks and statistics.
//!
//! Assignments are validated against the full post-change picture so that a
//! batch that moves people between two full tables is accepted as long as the
//! end state fits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// A table and how many seats it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCapacity {
    pub table_id: DbId,
    pub capacity: i32,
}

/// Where a member sits. `table_id = None` means unseated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub member_id: DbId,
    pub table_id: Option<DbId>,
}

/// A member as seen by seating statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatedMember {
    pub member_id: DbId,
    pub attending: Option<bool>,
    pub table_id: Option<DbId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOccupancy {
    pub table_id: DbId,
    pub capacity: i32,
    pub assigned: i64,
}

/// Seating overview returned by `GET /api/admin/seating`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatingStats {
    pub total_seats: i64,
    pub assigned_seats: i64,
    pub unassigned_attending: i64,
    pub tables: Vec<TableOccupancy>,
}

/// Validate a batch of assignment changes against the current seating.
///
/// `current` is every member's present table; `changes` override it. Members
/// only present in `changes` are treated as newly seated.
pub fn validate_assignments(
    tables: &[TableCapacity],
    current: &[SeatAssignment],
    changes: &[SeatAssignment],
) -> Result<(), CoreError> {
    let capacities: HashMap<DbId, i32> = tables.iter().map(|t| (t.table_id, t.capacity)).collect();

    for change in changes {
        if let Some(table_id) = change.table_id {
            if !capacities.contains_key(&table_id) {
                return Err(CoreError::Validation(format!(
                    "Table {table_id} does not belong to this wedding"
                )));
            }
        }
    }

    let mut seating: HashMap<DbId, Option<DbId>> =
        current.iter().map(|a| (a.member_id, a.table_id)).collect();
    for change in changes {
        seating.insert(change.member_id, change.table_id);
    }

    let mut occupancy: HashMap<DbId, i64> = HashMap::new();
    for table_id in seating.values().flatten() {
        *occupancy.entry(*table_id).or_default() += 1;
    }

    // Only tables touched by this batch are checked.
    for change in changes {
        let Some(table_id) = change.table_id else {
            continue;
        };
        let assigned = occupancy.get(&table_id).copied().unwrap_or(0);
        let capacity = i64::from(capacities[&table_id]);
        if assigned > capacity {
            return Err(CoreError::Validation(format!(
                "Table {table_id} would seat {assigned} guests but has {capacity} seats"
            )));
        }
    }

    Ok(())
}

/// Compute seating statistics for a wedding.
pub fn seating_stats(tables: &[TableCapacity], members: &[SeatedMember]) -> SeatingStats {
    let mut per_table: HashMap<DbId, i64> = HashMap::new();
    for member in members {
        if let Some(table_id) = member.table_id {
            *per_table.entry(table_id).or_default() += 1;
        }
    }

    let tables: Vec<TableOccupancy> = tables
        .iter()
        .map(|t| TableOccupancy {
            table_id: t.table_id,
            capacity: t.capacity,
            assigned: per_table.get(&t.table_id).copied().unwrap_or(0),
        })
        .collect();

    let unassigned_attending = members
        .iter()
        .filter(|m| m.attending == Some(true) && m.table_id.is_none())
        .count() as i64;

    SeatingStats {
        total_seats: tables.iter().map(|t| i64::from(t.capacity)).sum(),
        assigned_seats: tables.iter().map(|t| t.assigned).sum(),
        unassigned_attending,
        tables,
    }
}

/// Validate a table definition.
pub fn validate_table(name: &str, capacity: i32) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Table name must not be empty".into()));
    }
    if !(1..=100).contains(&capacity) {
        return Err(CoreError::Validation(
            "Table capacity must be between 1 and 100".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(table_id: DbId, capacity: i32) -> TableCapacity {
        TableCapacity { table_id, capacity }
    }

    fn seat(member_id: DbId, table_id: Option<DbId>) -> SeatAssignment {
        SeatAssignment {
            member_id,
            table_id,
        }
    }

    #[test]
    fn assignment_within_capacity_passes() {
        let tables = [table(1, 2)];
        let current = [seat(10, Some(1)), seat(11, None)];
        assert!(validate_assignments(&tables, &current, &[seat(11, Some(1))]).is_ok());
    }

    #[test]
    fn assignment_over_capacity_fails() {
        let tables = [table(1, 1)];
        let current = [seat(10, Some(1)), seat(11, None)];
        let err = validate_assignments(&tables, &current, &[seat(11, Some(1))]).unwrap_err();
        assert!(err.to_string().contains("has 1 seats"));
    }

    #[test]
    fn swap_between_full_tables_passes() {
        let tables = [table(1, 1), table(2, 1)];
        let current = [seat(10, Some(1)), seat(11, Some(2))];
        let changes = [seat(10, Some(2)), seat(11, Some(1))];
        assert!(validate_assignments(&tables, &current, &changes).is_ok());
    }

    #[test]
    fn unknown_table_fails() {
        let err = validate_assignments(&[table(1, 4)], &[], &[seat(10, Some(7))]).unwrap_err();
        assert!(err.to_string().contains("does not belong"));
    }

    #[test]
    fn unseating_always_passes() {
        let tables = [table(1, 1)];
        let current = [seat(10, Some(1)), seat(11, Some(1))];
        assert!(validate_assignments(&tables, &current, &[seat(11, None)]).is_ok());
    }

    #[test]
    fn stats_never_exceed_total_after_valid_assignment() {
        let tables = [table(1, 2), table(2, 3)];
        let members = [
            SeatedMember { member_id: 1, attending: Some(true), table_id: Some(1) },
            SeatedMember { member_id: 2, attending: Some(true), table_id: Some(1) },
            SeatedMember { member_id: 3, attending: Some(true), table_id: Some(2) },
            SeatedMember { member_id: 4, attending: Some(true), table_id: None },
            SeatedMember { member_id: 5, attending: Some(false), table_id: None },
        ];
        let stats = seating_stats(&tables, &members);
        assert_eq!(stats.total_seats, 5);
        assert_eq!(stats.assigned_seats, 3);
        assert_eq!(stats.unassigned_attending, 1);
        assert!(stats.assigned_seats <= stats.total_seats);
        assert_eq!(stats.tables[0].assigned, 2);
    }

    #[test]
    fn table_validation() {
        assert!(validate_table("Table 1", 8).is_ok());
        assert!(validate_table(" ", 8).is_err());
        assert!(validate_table("Head", 0).is_err());
        assert!(validate_table("Head", 101).is_err());
    }
}
