//! sea-orm entities for every table the desk reads or writes.

pub mod incident_reports;
pub mod journal_entries;
pub mod org_chart_members;
pub mod personnel_profiles;
pub mod rewards;
pub mod users;
