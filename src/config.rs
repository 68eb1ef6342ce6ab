//! Typed configuration schema and account resolution.
//!
//! The configuration tree is delivered by an external loader; this module
//! gives it a strongly-typed shape. Fields that older configurations leave
//! out keep their established defaults: explicit names for roles, users,
//! and groups but not policies, and template outputs enabled.

use std::fmt::{Display, Formatter, Result as FmtResult};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::Display as StrumDisplay;

use crate::error::BuildError;

/// The account context entry that expands to every configured account.
pub const ALL_ACCOUNTS: &str = "all";

/// The kinds of entity the configuration declares, used for identifying the
/// owner of a failure and for section iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Policy,
    Role,
    Group,
    User,
}

impl EntityKind {
    /// Suffix appended to the scrubbed entity name to form the logical id.
    /// Policies carry no suffix.
    pub fn logical_suffix(&self) -> &'static str {
        match self {
            EntityKind::Policy => "",
            EntityKind::Role => "Role",
            EntityKind::Group => "Group",
            EntityKind::User => "User",
        }
    }
}

/// A configured account: friendly name plus numeric account id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub id: String,
}

impl Display for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// The accounts section: friendly-name to numeric-id map in configuration
/// order, the designated parent account, and an optional SAML provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    pub ids: IndexMap<String, String>,
    pub parent_account: String,
    #[serde(default)]
    pub saml_provider: Option<String>,
}

impl AccountsConfig {
    /// Every configured account, in configuration order.
    pub fn all(&self) -> Vec<Account> {
        self.ids
            .iter()
            .map(|(name, id)| Account {
                name: name.clone(),
                id: id.clone(),
            })
            .collect()
    }

    /// Look up a single account by friendly name.
    pub fn get(&self, name: &str) -> Option<Account> {
        self.ids.get(name).map(|id| Account {
            name: name.to_string(),
            id: id.clone(),
        })
    }

    /// Expand a symbolic account context into concrete accounts.
    ///
    /// `["all"]` expands to every configured account in configuration order.
    /// Any other entry is matched against friendly names; entries that match
    /// nothing are silently dropped rather than failing.
    pub fn search<S: AsRef<str>>(&self, context: &[S]) -> Vec<Account> {
        if let [only] = context {
            if only.as_ref() == ALL_ACCOUNTS {
                return self.all();
            }
        }
        context
            .iter()
            .filter_map(|name| self.get(name.as_ref()))
            .collect()
    }

    /// Resolve an entity's `in_accounts` list; an absent list means all
    /// configured accounts.
    pub fn targets(&self, in_accounts: Option<&[String]>) -> Vec<Account> {
        match in_accounts {
            Some(context) => self.search(context),
            None => self.all(),
        }
    }

    /// Map a friendly name to its numeric account id.
    pub fn map_account(&self, name: &str) -> Result<&str, BuildError> {
        self.ids
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| BuildError::UnknownAccount(name.to_string()))
    }

    /// Numeric id of the designated parent account.
    pub fn parent_account_id(&self) -> Result<&str, BuildError> {
        self.map_account(&self.parent_account)
    }
}

/// Which entity kinds receive explicit names in the generated templates,
/// as opposed to names assigned by CloudFormation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    pub policies: bool,
    pub roles: bool,
    pub users: bool,
    pub groups: bool,
}

impl Default for NamingConfig {
    fn default() -> Self {
        NamingConfig {
            policies: false,
            roles: true,
            users: true,
            groups: true,
        }
    }
}

impl NamingConfig {
    pub fn named(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Policy => self.policies,
            EntityKind::Role => self.roles,
            EntityKind::Group => self.groups,
            EntityKind::User => self.users,
        }
    }
}

/// Whether export outputs are appended to each generated resource. Any value
/// other than `enabled` disables them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputsMode {
    #[default]
    Enabled,
    #[serde(other)]
    Disabled,
}

impl OutputsMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, OutputsMode::Enabled)
    }
}

/// The `global` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub names: NamingConfig,
    #[serde(default)]
    pub template_outputs: OutputsMode,
}

/// One managed policy declaration.
///
/// Content comes from exactly one of `policy_file` (rendered through the
/// template engine) or `assume` (a generated assume-role statement set);
/// when both are present the assume document wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyModel {
    #[serde(default)]
    pub policy_file: Option<String>,
    #[serde(default)]
    pub template_vars: Option<Value>,
    #[serde(default)]
    pub assume: Option<AssumeSpec>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub groups: Option<Vec<String>>,
    #[serde(default)]
    pub users: Option<Vec<String>>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    #[serde(default)]
    pub in_accounts: Option<Vec<String>>,
    #[serde(default)]
    pub retain_on_delete: Option<bool>,
}

/// The `assume` shorthand: every (account, role) pair becomes one
/// `sts:AssumeRole` statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssumeSpec {
    pub accounts: Vec<String>,
    pub roles: Vec<String>,
}

/// One role declaration. `trusts` is required; its absence is reported at
/// the point of use rather than at load time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleModel {
    #[serde(default)]
    pub trusts: Option<Vec<String>>,
    #[serde(default)]
    pub managed_policies: Option<Vec<String>>,
    #[serde(default)]
    pub in_accounts: Option<Vec<String>>,
    #[serde(default)]
    pub retain_on_delete: Option<bool>,
}

/// One group declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupModel {
    #[serde(default)]
    pub managed_policies: Option<Vec<String>>,
    #[serde(default)]
    pub in_accounts: Option<Vec<String>>,
    #[serde(default)]
    pub retain_on_delete: Option<bool>,
}

/// One user declaration. A `password` triggers a login profile with a
/// forced reset on first sign-in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserModel {
    #[serde(default)]
    pub groups: Option<Vec<String>>,
    #[serde(default)]
    pub managed_policies: Option<Vec<String>>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub in_accounts: Option<Vec<String>>,
    #[serde(default)]
    pub retain_on_delete: Option<bool>,
}

/// The full configuration tree, immutable for the lifetime of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub policies: IndexMap<String, PolicyModel>,
    #[serde(default)]
    pub roles: IndexMap<String, RoleModel>,
    #[serde(default)]
    pub groups: IndexMap<String, GroupModel>,
    #[serde(default)]
    pub users: IndexMap<String, UserModel>,
}

impl Config {
    /// Whether a managed-policy name is declared in this configuration.
    pub fn is_local_managed_policy(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    /// Whether a declared managed policy is scheduled to be created in the
    /// given account. Callers must check existence first; an undeclared name
    /// is simply not in any account.
    pub fn is_managed_policy_in_account(&self, name: &str, account: &Account) -> bool {
        self.policies.get(name).is_some_and(|model| {
            self.accounts
                .targets(model.in_accounts.as_deref())
                .iter()
                .any(|a| a.name == account.name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yare::parameterized;

    fn accounts() -> AccountsConfig {
        serde_json::from_value(json!({
            "ids": { "prod": "111111111111", "dev": "222222222222", "audit": "333333333333" },
            "parent_account": "prod",
            "saml_provider": "corp-idp",
        }))
        .unwrap()
    }

    #[test]
    fn search_all_returns_every_account_in_configuration_order() {
        let names: Vec<String> = accounts()
            .search(&[ALL_ACCOUNTS])
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["prod", "dev", "audit"]);
    }

    #[test]
    fn search_silently_drops_unknown_friendly_names() {
        // Unmatched entries disappear instead of failing; pinned behavior.
        let found = accounts().search(&["dev", "no-such-account"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "dev");
        assert!(accounts().search(&["no-such-account"]).is_empty());
    }

    #[test]
    fn targets_without_context_means_all_accounts() {
        assert_eq!(accounts().targets(None).len(), 3);
        let explicit = vec!["audit".to_string()];
        assert_eq!(accounts().targets(Some(explicit.as_slice())).len(), 1);
    }

    #[test]
    fn map_account_resolves_or_fails() {
        let accounts = accounts();
        assert_eq!(accounts.map_account("prod").unwrap(), "111111111111");
        assert!(matches!(
            accounts.map_account("qa"),
            Err(BuildError::UnknownAccount(name)) if name == "qa"
        ));
        assert_eq!(accounts.parent_account_id().unwrap(), "111111111111");
    }

    #[parameterized(
        enabled = { json!("enabled"), true },
        disabled = { json!("disabled"), false },
        anything_else = { json!("off"), false },
    )]
    fn outputs_mode_treats_non_enabled_as_disabled(raw: Value, expected: bool) {
        let mode: OutputsMode = serde_json::from_value(raw).unwrap();
        assert_eq!(mode.is_enabled(), expected);
    }

    #[test]
    fn global_defaults_match_pre_global_configurations() {
        let global = GlobalConfig::default();
        assert!(!global.names.policies);
        assert!(global.names.roles);
        assert!(global.names.users);
        assert!(global.names.groups);
        assert!(global.template_outputs.is_enabled());
    }

    #[test]
    fn config_sections_default_to_empty() {
        let config: Config = serde_json::from_value(json!({
            "accounts": { "ids": { "prod": "111111111111" }, "parent_account": "prod" },
        }))
        .unwrap();
        assert!(config.policies.is_empty());
        assert!(config.roles.is_empty());
        assert!(config.groups.is_empty());
        assert!(config.users.is_empty());
    }

    #[test]
    fn managed_policy_membership_follows_in_accounts() {
        let config: Config = serde_json::from_value(json!({
            "accounts": {
                "ids": { "prod": "111111111111", "dev": "222222222222" },
                "parent_account": "prod",
            },
            "policies": {
                "Everywhere": {},
                "ProdOnly": { "in_accounts": ["prod"] },
            },
        }))
        .unwrap();
        let prod = config.accounts.get("prod").unwrap();
        let dev = config.accounts.get("dev").unwrap();

        assert!(config.is_local_managed_policy("Everywhere"));
        assert!(!config.is_local_managed_policy("Phantom"));

        assert!(config.is_managed_policy_in_account("Everywhere", &dev));
        assert!(config.is_managed_policy_in_account("ProdOnly", &prod));
        assert!(!config.is_managed_policy_in_account("ProdOnly", &dev));
    }
}
