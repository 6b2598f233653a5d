//! Authorization primitives: which menu entries each role may open.

pub use entity::users::Role;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("{subject} ({role}) may not open {resource}")]
    Denied {
        subject: String,
        role: Role,
        resource: MenuKey,
    },
}

/// One sidebar entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKey {
    OrgChart,
    PersonnelInput,
    PersonnelRecords,
    IncidentReports,
    RewardInput,
    RewardRecords,
    Journal,
    ManageUsers,
}

impl MenuKey {
    /// Sidebar order.
    pub const ALL: [MenuKey; 8] = [
        MenuKey::OrgChart,
        MenuKey::PersonnelInput,
        MenuKey::PersonnelRecords,
        MenuKey::IncidentReports,
        MenuKey::RewardInput,
        MenuKey::RewardRecords,
        MenuKey::Journal,
        MenuKey::ManageUsers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MenuKey::OrgChart => "org_chart",
            MenuKey::PersonnelInput => "personnel_input",
            MenuKey::PersonnelRecords => "personnel_records",
            MenuKey::IncidentReports => "incident_reports",
            MenuKey::RewardInput => "reward_input",
            MenuKey::RewardRecords => "reward_records",
            MenuKey::Journal => "journal",
            MenuKey::ManageUsers => "manage_users",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuKey::OrgChart => "Organization Chart",
            MenuKey::PersonnelInput => "Personnel Profiles",
            MenuKey::PersonnelRecords => "Personnel Records",
            MenuKey::IncidentReports => "Incident Reports",
            MenuKey::RewardInput => "Rewards",
            MenuKey::RewardRecords => "Reward Records",
            MenuKey::Journal => "Journal",
            MenuKey::ManageUsers => "Manage Users",
        }
    }
}

impl std::fmt::Display for MenuKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const STAFF_MENU: &[MenuKey] = &[
    MenuKey::OrgChart,
    MenuKey::PersonnelInput,
    MenuKey::IncidentReports,
    MenuKey::RewardInput,
    MenuKey::RewardRecords,
    MenuKey::Journal,
];

/// The role table. `host` and `admin` see everything.
pub fn permissions(role: Role) -> &'static [MenuKey] {
    match role {
        Role::Host | Role::Admin => &MenuKey::ALL,
        Role::User => STAFF_MENU,
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PolicyContext {
    pub subject: String,
    pub role: Role,
    pub resource: MenuKey,
}

#[derive(Default, Debug)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn check(&self, ctx: &PolicyContext) -> Result<(), AuthzError> {
        if permissions(ctx.role).contains(&ctx.resource) {
            Ok(())
        } else {
            Err(AuthzError::Denied {
                subject: ctx.subject.clone(),
                role: ctx.role,
                resource: ctx.resource,
            })
        }
    }

    /// Entries to draw in the sidebar, in sidebar order.
    pub fn visible_menu(&self, role: Role) -> Vec<MenuKey> {
        MenuKey::ALL
            .into_iter()
            .filter(|key| permissions(role).contains(key))
            .collect()
    }
}
