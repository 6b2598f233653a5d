//! Sidebar entries and the record screens behind them.

use clap::ValueEnum;
use platform_authz::{MenuKey, PolicyContext, PolicyEngine, Role};
use products_records::{TableSpec, tables};

/// The editable record screens, as named on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Module {
    #[value(name = "org_chart")]
    OrgChart,
    Personnel,
    Rewards,
    Incidents,
    Journal,
}

impl Module {
    pub fn spec(self) -> &'static TableSpec {
        match self {
            Module::OrgChart => &tables::ORG_CHART,
            Module::Personnel => &tables::PERSONNEL,
            Module::Rewards => &tables::REWARDS,
            Module::Incidents => &tables::INCIDENTS,
            Module::Journal => &tables::JOURNAL,
        }
    }

    pub fn menu_key(self) -> MenuKey {
        match self {
            Module::OrgChart => MenuKey::OrgChart,
            Module::Personnel => MenuKey::PersonnelInput,
            Module::Rewards => MenuKey::RewardInput,
            Module::Incidents => MenuKey::IncidentReports,
            Module::Journal => MenuKey::Journal,
        }
    }
}

/// The command that opens a sidebar entry.
pub fn command_for(key: MenuKey) -> &'static str {
    match key {
        MenuKey::OrgChart => "list org_chart",
        MenuKey::PersonnelInput => "list personnel",
        MenuKey::PersonnelRecords => "records personnel",
        MenuKey::IncidentReports => "list incidents",
        MenuKey::RewardInput => "list rewards",
        MenuKey::RewardRecords => "records rewards",
        MenuKey::Journal => "list journal",
        MenuKey::ManageUsers => "users list",
    }
}

pub fn open(username: &str, role: Role, key: MenuKey) -> Result<(), platform_authz::AuthzError> {
    PolicyEngine.check(&PolicyContext {
        subject: username.to_string(),
        role,
        resource: key,
    })
}

/// `(label, command)` for every entry `role` may open.
pub fn entries(role: Role) -> Vec<(&'static str, &'static str)> {
    PolicyEngine
        .visible_menu(role)
        .into_iter()
        .map(|key| (key.label(), command_for(key)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_menu_hides_records_and_users() {
        let commands: Vec<_> = entries(Role::User).into_iter().map(|(_, c)| c).collect();
        assert!(commands.contains(&"list personnel"));
        assert!(!commands.contains(&"records personnel"));
        assert!(!commands.contains(&"users list"));
        assert_eq!(entries(Role::Admin).len(), MenuKey::ALL.len());
    }

    #[test]
    fn every_module_is_gated_by_its_entry() {
        for module in Module::value_variants() {
            assert!(open("siti", Role::User, module.menu_key()).is_ok());
        }
        let err = open("siti", Role::User, MenuKey::ManageUsers).unwrap_err();
        assert_eq!(err.to_string(), "siti (user) may not open manage_users");
    }
}
