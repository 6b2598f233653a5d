//! The five record screens.

use crate::spec::{FieldKind, FieldSpec, TableSpec};

pub const PERSONNEL_STATUSES: &[&str] = &["active", "inactive"];
pub const INCIDENT_STATUSES: &[&str] = &["open", "investigating", "closed"];

pub static ORG_CHART: TableSpec = TableSpec {
    key: "org_chart",
    table: "org_chart_members",
    title: "Organization Chart",
    fields: &[
        FieldSpec::text("name", "Name").required(),
        FieldSpec::text("position", "Position").required(),
        FieldSpec::text("unit", "Unit"),
        FieldSpec::new("supervisor_id", "Supervisor ID", FieldKind::Integer),
        FieldSpec::text("phone", "Phone"),
        FieldSpec::text("email", "Email"),
    ],
    listed: &["id", "name", "position", "unit", "supervisor_id", "phone"],
};

pub static PERSONNEL: TableSpec = TableSpec {
    key: "personnel",
    table: "personnel_profiles",
    title: "Personnel Profiles",
    fields: &[
        FieldSpec::text("name", "Name").required(),
        FieldSpec::text("national_id", "National ID").required(),
        FieldSpec::text("rank", "Rank"),
        FieldSpec::text("unit", "Unit"),
        FieldSpec::text("phone", "Phone"),
        FieldSpec::text("address", "Address"),
        FieldSpec::new("joined_on", "Joined On", FieldKind::Date),
        FieldSpec::new("status", "Status", FieldKind::Choice(PERSONNEL_STATUSES))
            .with_default("active"),
    ],
    listed: &["id", "name", "national_id", "rank", "unit", "status"],
};

pub static REWARDS: TableSpec = TableSpec {
    key: "rewards",
    table: "rewards",
    title: "Rewards",
    fields: &[
        FieldSpec::text("recipient_name", "Recipient").required(),
        FieldSpec::text("national_id", "National ID"),
        FieldSpec::text("reward_type", "Reward Type").required(),
        FieldSpec::new("awarded_on", "Awarded On", FieldKind::Date),
        FieldSpec::text("description", "Description"),
    ],
    listed: &["id", "recipient_name", "reward_type", "awarded_on"],
};

pub static INCIDENTS: TableSpec = TableSpec {
    key: "incidents",
    table: "incident_reports",
    title: "Incident Reports",
    fields: &[
        FieldSpec::text("report_no", "Report No"),
        FieldSpec::text("title", "Title").required(),
        FieldSpec::text("location", "Location"),
        FieldSpec::new("occurred_on", "Occurred On", FieldKind::Date),
        FieldSpec::text("description", "Description"),
        FieldSpec::new("status", "Status", FieldKind::Choice(INCIDENT_STATUSES))
            .with_default("open"),
    ],
    listed: &["id", "report_no", "title", "occurred_on", "status"],
};

pub static JOURNAL: TableSpec = TableSpec {
    key: "journal",
    table: "journal_entries",
    title: "Journal",
    fields: &[
        FieldSpec::new("entry_date", "Date", FieldKind::Date).required(),
        FieldSpec::text("title", "Title").required(),
        FieldSpec::text("body", "Body"),
        FieldSpec::text("author", "Author"),
    ],
    listed: &["id", "entry_date", "title", "author"],
};

pub static ALL: [&TableSpec; 5] = [&ORG_CHART, &PERSONNEL, &REWARDS, &INCIDENTS, &JOURNAL];

pub fn by_key(key: &str) -> Option<&'static TableSpec> {
    ALL.iter().copied().find(|spec| spec.key == key)
}
