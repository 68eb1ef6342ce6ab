//! Per-entity resource assembly.
//!
//! Every function follows the same skeleton: scrub the entity name into a
//! logical id (with the kind's suffix), start from default properties,
//! overlay whatever optional fields the model carries, register the resource
//! into the target account's document, and append the export output when
//! outputs are enabled. Each call mutates exactly one account's document.

use tracing::debug;

use crate::config::{Account, Config, EntityKind, GroupModel, PolicyModel, RoleModel, UserModel};
use crate::error::BuildError;
use crate::ident::scrub_name;
use crate::managed_policy::{expand_imports, resolve_managed_policies};
use crate::trust::build_role_trust;
use crate::types::{
    GroupProperties, InstanceProfileProperties, LoginProfile, ManagedPolicyProperties, Output,
    PolicyContent, Resource, RoleProperties, TemplateDocument, TemplateValue, UserProperties,
};

fn logical_id(kind: EntityKind, name: &str) -> String {
    scrub_name(&format!("{name}{}", kind.logical_suffix()))
}

fn retention(retain_on_delete: Option<bool>) -> bool {
    retain_on_delete == Some(true)
}

/// Register a managed policy (content already resolved) and its ARN output.
pub(crate) fn add_managed_policy(
    config: &Config,
    name: &str,
    content: PolicyContent,
    model: &PolicyModel,
    account: &Account,
    document: &mut TemplateDocument,
) {
    let id = logical_id(EntityKind::Policy, name);
    debug!(
        event = "Assemble",
        kind = "policy",
        name = name,
        account = %account,
        logical_id = id
    );

    let description = model
        .description
        .clone()
        .unwrap_or_else(|| format!("Managed Policy {name}"));
    let properties = ManagedPolicyProperties {
        managed_policy_name: config.global.names.policies.then(|| name.to_string()),
        description: description.clone(),
        policy_document: content,
        groups: model.groups.as_deref().map(expand_imports).unwrap_or_default(),
        roles: model.roles.as_deref().map(expand_imports).unwrap_or_default(),
        users: model.users.as_deref().map(expand_imports).unwrap_or_default(),
    };

    document.add_resource(
        id.clone(),
        Resource::new(properties).with_retention(retention(model.retain_on_delete)),
    );

    if config.global.template_outputs.is_enabled() {
        let output_id = format!("{id}PolicyArn");
        document.add_output(
            output_id.clone(),
            Output::exported(
                format!("{description} Policy Document ARN"),
                TemplateValue::Ref(id),
                &output_id,
            ),
        );
    }
}

/// Register a role, resolving its trust document and managed policies.
pub(crate) fn add_role(
    config: &Config,
    name: &str,
    model: &RoleModel,
    account: &Account,
    document: &mut TemplateDocument,
) -> Result<(), BuildError> {
    let trusts = model.trusts.as_deref().ok_or_else(|| BuildError::MissingField {
        kind: EntityKind::Role,
        name: name.to_string(),
        field: "trusts",
    })?;
    let id = logical_id(EntityKind::Role, name);
    debug!(
        event = "Assemble",
        kind = "role",
        name = name,
        account = %account,
        logical_id = id
    );

    let properties = RoleProperties {
        role_name: config.global.names.roles.then(|| name.to_string()),
        assume_role_policy_document: build_role_trust(config, trusts)?,
        managed_policy_arns: match model.managed_policies.as_deref() {
            Some(refs) => resolve_managed_policies(config, refs, name, account)?,
            None => Vec::new(),
        },
        ..RoleProperties::default()
    };

    document.add_resource(
        id.clone(),
        Resource::new(properties).with_retention(retention(model.retain_on_delete)),
    );

    if config.global.template_outputs.is_enabled() {
        let output_id = format!("{id}Arn");
        document.add_output(
            output_id.clone(),
            Output::exported(
                format!("Role {name} ARN"),
                TemplateValue::get_att_arn(id),
                &output_id,
            ),
        );
    }
    Ok(())
}

/// Register the instance profile accompanying a role with an EC2 trust.
pub(crate) fn add_instance_profile(
    config: &Config,
    role_name: &str,
    model: &RoleModel,
    document: &mut TemplateDocument,
) {
    let id = scrub_name(&format!("{role_name}InstanceProfile"));
    debug!(
        event = "Assemble",
        kind = "instance_profile",
        name = role_name,
        logical_id = id
    );

    let properties = InstanceProfileProperties {
        instance_profile_name: config.global.names.roles.then(|| role_name.to_string()),
        roles: vec![TemplateValue::Ref(logical_id(EntityKind::Role, role_name))],
        ..InstanceProfileProperties::default()
    };

    document.add_resource(
        id.clone(),
        Resource::new(properties).with_retention(retention(model.retain_on_delete)),
    );

    if config.global.template_outputs.is_enabled() {
        let output_id = format!("{id}Arn");
        // The profile export is a Ref, not a GetAtt; consuming stacks
        // import it under that shape.
        document.add_output(
            output_id.clone(),
            Output::exported(
                format!("Instance profile for Role {role_name} ARN"),
                TemplateValue::Ref(id),
                &output_id,
            ),
        );
    }
}

/// Register a group and its managed-policy attachments.
pub(crate) fn add_group(
    config: &Config,
    name: &str,
    model: &GroupModel,
    account: &Account,
    document: &mut TemplateDocument,
) -> Result<(), BuildError> {
    let id = logical_id(EntityKind::Group, name);
    debug!(
        event = "Assemble",
        kind = "group",
        name = name,
        account = %account,
        logical_id = id
    );

    let properties = GroupProperties {
        group_name: config.global.names.groups.then(|| name.to_string()),
        managed_policy_arns: match model.managed_policies.as_deref() {
            Some(refs) => resolve_managed_policies(config, refs, name, account)?,
            None => Vec::new(),
        },
        ..GroupProperties::default()
    };

    document.add_resource(
        id.clone(),
        Resource::new(properties).with_retention(retention(model.retain_on_delete)),
    );

    if config.global.template_outputs.is_enabled() {
        let output_id = format!("{id}Arn");
        document.add_output(
            output_id.clone(),
            Output::exported(
                format!("Group {name} ARN"),
                TemplateValue::get_att_arn(id),
                &output_id,
            ),
        );
    }
    Ok(())
}

/// Register a user, with group memberships, attachments, and an optional
/// login profile.
pub(crate) fn add_user(
    config: &Config,
    name: &str,
    model: &UserModel,
    account: &Account,
    document: &mut TemplateDocument,
) -> Result<(), BuildError> {
    let id = logical_id(EntityKind::User, name);
    debug!(
        event = "Assemble",
        kind = "user",
        name = name,
        account = %account,
        logical_id = id
    );

    let properties = UserProperties {
        user_name: config.global.names.users.then(|| name.to_string()),
        groups: model.groups.as_deref().map(expand_imports).unwrap_or_default(),
        managed_policy_arns: match model.managed_policies.as_deref() {
            Some(refs) => resolve_managed_policies(config, refs, name, account)?,
            None => Vec::new(),
        },
        login_profile: model.password.as_deref().map(LoginProfile::new),
        ..UserProperties::default()
    };

    document.add_resource(
        id.clone(),
        Resource::new(properties).with_retention(retention(model.retain_on_delete)),
    );

    if config.global.template_outputs.is_enabled() {
        let output_id = format!("{id}Arn");
        document.add_output(
            output_id.clone(),
            Output::exported(
                format!("User {name} ARN"),
                TemplateValue::get_att_arn(id),
                &output_id,
            ),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceType;
    use serde_json::json;

    fn config() -> Config {
        serde_json::from_value(json!({
            "accounts": {
                "ids": { "prod": "111111111111" },
                "parent_account": "prod",
            },
            "policies": { "base-access": {} },
        }))
        .unwrap()
    }

    fn prod(config: &Config) -> Account {
        config.accounts.get("prod").unwrap()
    }

    #[test]
    fn role_without_trusts_is_a_missing_field() {
        let config = config();
        let account = prod(&config);
        let mut document = TemplateDocument::new();
        let err = add_role(&config, "Admin", &RoleModel::default(), &account, &mut document)
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::MissingField { name, field, .. } if name == "Admin" && field == "trusts"
        ));
    }

    #[test]
    fn group_gets_suffix_scrub_and_getatt_output() {
        let config = config();
        let account = prod(&config);
        let model: GroupModel = serde_json::from_value(json!({
            "managed_policies": ["base-access"],
        }))
        .unwrap();

        let mut document = TemplateDocument::new();
        add_group(&config, "dev-ops", &model, &account, &mut document).unwrap();

        let resource = document.resource("devopsGroup").unwrap();
        assert_eq!(resource.resource_type(), ResourceType::Group);
        assert_eq!(
            serde_json::to_value(resource).unwrap()["Properties"]["ManagedPolicyArns"],
            json!([{ "Ref": "baseaccess" }])
        );

        let output = document.output("devopsGroupArn").unwrap();
        assert_eq!(
            serde_json::to_value(output).unwrap()["Value"],
            json!({ "Fn::GetAtt": ["devopsGroup", "Arn"] })
        );
    }

    #[test]
    fn user_password_becomes_login_profile_with_forced_reset() {
        let config = config();
        let account = prod(&config);
        let model: UserModel = serde_json::from_value(json!({
            "password": "changeme-now",
            "groups": ["devs", "import:shared-Admins"],
        }))
        .unwrap();

        let mut document = TemplateDocument::new();
        add_user(&config, "alice", &model, &account, &mut document).unwrap();

        let value = serde_json::to_value(document.resource("aliceUser").unwrap()).unwrap();
        assert_eq!(
            value["Properties"]["LoginProfile"],
            json!({ "Password": "changeme-now", "PasswordResetRequired": true })
        );
        assert_eq!(
            value["Properties"]["Groups"],
            json!(["devs", { "Fn::ImportValue": "shared-Admins" }])
        );
        // Users are named by default.
        assert_eq!(value["Properties"]["UserName"], json!("alice"));
    }

    #[test]
    fn policy_description_defaults_and_flows_into_the_output() {
        let config = config();
        let account = prod(&config);
        let model = PolicyModel::default();

        let mut document = TemplateDocument::new();
        add_managed_policy(
            &config,
            "base-access",
            PolicyContent::Raw(json!({})),
            &model,
            &account,
            &mut document,
        );

        let value = serde_json::to_value(document.resource("baseaccess").unwrap()).unwrap();
        assert_eq!(
            value["Properties"]["Description"],
            json!("Managed Policy base-access")
        );
        // Policies are unnamed by default.
        assert!(value["Properties"].get("ManagedPolicyName").is_none());

        let output = document.output("baseaccessPolicyArn").unwrap();
        assert_eq!(
            output.description,
            "Managed Policy base-access Policy Document ARN"
        );
    }

    #[test]
    fn outputs_are_suppressed_when_disabled() {
        let mut config = config();
        config.global.template_outputs =
            serde_json::from_value(json!("disabled")).unwrap();
        let account = prod(&config);
        let model: RoleModel = serde_json::from_value(json!({
            "trusts": ["ec2.amazonaws.com"],
        }))
        .unwrap();

        let mut document = TemplateDocument::new();
        add_role(&config, "Admin", &model, &account, &mut document).unwrap();
        add_instance_profile(&config, "Admin", &model, &mut document);

        assert!(document.outputs().is_empty());
        assert!(document.resource("AdminRole").is_some());
        assert!(document.resource("AdminInstanceProfile").is_some());
    }

    #[test]
    fn retention_flag_marks_the_resource() {
        let config = config();
        let account = prod(&config);
        let model: GroupModel = serde_json::from_value(json!({
            "retain_on_delete": true,
        }))
        .unwrap();

        let mut document = TemplateDocument::new();
        add_group(&config, "devs", &model, &account, &mut document).unwrap();
        let value = serde_json::to_value(document.resource("devsGroup").unwrap()).unwrap();
        assert_eq!(value["DeletionPolicy"], json!("Retain"));
    }
}
