//! Per-family transition tables.
//!
//! Each table is a total, explicit directed graph over the status enum:
//! any (from, to) pair not listed is illegal, including self-transitions
//! and skip-ahead jumps. Terminal states have no outgoing edges.

use regidesk_entity::request::{RequestStatus, WorkflowFamily};

/// Legal destination statuses from `from` under the given family.
pub fn allowed_destinations(
    family: WorkflowFamily,
    from: RequestStatus,
) -> &'static [RequestStatus] {
    use RequestStatus::*;
    match family {
        // pending -> {approved, rejected}; approved -> stub-generated;
        // stub-generated -> completed.
        WorkflowFamily::AppointmentStub => match from {
            Pending => &[Approved, Rejected],
            Approved => &[StubGenerated],
            StubGenerated => &[Completed],
            Rejected | Completed | Ready => &[],
        },
        // pending -> {approved, rejected}; approved -> {ready, completed};
        // ready -> completed.
        WorkflowFamily::DirectFulfillment => match from {
            Pending => &[Approved, Rejected],
            Approved => &[Ready, Completed],
            Ready => &[Completed],
            Rejected | Completed | StubGenerated => &[],
        },
    }
}

/// Whether `from -> to` is in the family's table.
pub fn is_allowed(family: WorkflowFamily, from: RequestStatus, to: RequestStatus) -> bool {
    allowed_destinations(family, from).contains(&to)
}
