//! IAM resource definitions as they appear under a template's `Resources`.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use strum_macros::{AsRefStr, Display as StrumDisplay};

use super::policy_document::{PolicyContent, PolicyDocument};
use super::value::TemplateValue;

/// The default resource path.
pub const DEFAULT_PATH: &str = "/";

/// CloudFormation resource type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, StrumDisplay)]
pub enum ResourceType {
    #[strum(serialize = "AWS::IAM::ManagedPolicy")]
    ManagedPolicy,
    #[strum(serialize = "AWS::IAM::Role")]
    Role,
    #[strum(serialize = "AWS::IAM::Group")]
    Group,
    #[strum(serialize = "AWS::IAM::User")]
    User,
    #[strum(serialize = "AWS::IAM::InstanceProfile")]
    InstanceProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagedPolicyProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_policy_name: Option<String>,
    pub description: String,
    pub policy_document: PolicyContent,
    pub groups: Vec<TemplateValue>,
    pub roles: Vec<TemplateValue>,
    pub users: Vec<TemplateValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    pub path: String,
    pub assume_role_policy_document: PolicyDocument,
    pub managed_policy_arns: Vec<TemplateValue>,
    pub policies: Vec<Value>,
}

impl Default for RoleProperties {
    fn default() -> Self {
        RoleProperties {
            role_name: None,
            path: DEFAULT_PATH.to_string(),
            assume_role_policy_document: PolicyDocument::new(),
            managed_policy_arns: Vec::new(),
            policies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    pub path: String,
    pub managed_policy_arns: Vec<TemplateValue>,
    pub policies: Vec<Value>,
}

impl Default for GroupProperties {
    fn default() -> Self {
        GroupProperties {
            group_name: None,
            path: DEFAULT_PATH.to_string(),
            managed_policy_arns: Vec::new(),
            policies: Vec::new(),
        }
    }
}

/// A console login profile; the password reset is always forced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginProfile {
    pub password: String,
    pub password_reset_required: bool,
}

impl LoginProfile {
    pub fn new(password: impl Into<String>) -> Self {
        LoginProfile {
            password: password.into(),
            password_reset_required: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub path: String,
    pub groups: Vec<TemplateValue>,
    pub managed_policy_arns: Vec<TemplateValue>,
    pub policies: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_profile: Option<LoginProfile>,
}

impl Default for UserProperties {
    fn default() -> Self {
        UserProperties {
            user_name: None,
            path: DEFAULT_PATH.to_string(),
            groups: Vec::new(),
            managed_policy_arns: Vec::new(),
            policies: Vec::new(),
            login_profile: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProfileProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_profile_name: Option<String>,
    pub path: String,
    pub roles: Vec<TemplateValue>,
}

impl Default for InstanceProfileProperties {
    fn default() -> Self {
        InstanceProfileProperties {
            instance_profile_name: None,
            path: DEFAULT_PATH.to_string(),
            roles: Vec::new(),
        }
    }
}

/// The per-kind property payload of a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceProperties {
    ManagedPolicy(ManagedPolicyProperties),
    Role(RoleProperties),
    Group(GroupProperties),
    User(UserProperties),
    InstanceProfile(InstanceProfileProperties),
}

impl ResourceProperties {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceProperties::ManagedPolicy(_) => ResourceType::ManagedPolicy,
            ResourceProperties::Role(_) => ResourceType::Role,
            ResourceProperties::Group(_) => ResourceType::Group,
            ResourceProperties::User(_) => ResourceType::User,
            ResourceProperties::InstanceProfile(_) => ResourceType::InstanceProfile,
        }
    }
}

impl From<ManagedPolicyProperties> for ResourceProperties {
    fn from(properties: ManagedPolicyProperties) -> Self {
        ResourceProperties::ManagedPolicy(properties)
    }
}

impl From<RoleProperties> for ResourceProperties {
    fn from(properties: RoleProperties) -> Self {
        ResourceProperties::Role(properties)
    }
}

impl From<GroupProperties> for ResourceProperties {
    fn from(properties: GroupProperties) -> Self {
        ResourceProperties::Group(properties)
    }
}

impl From<UserProperties> for ResourceProperties {
    fn from(properties: UserProperties) -> Self {
        ResourceProperties::User(properties)
    }
}

impl From<InstanceProfileProperties> for ResourceProperties {
    fn from(properties: InstanceProfileProperties) -> Self {
        ResourceProperties::InstanceProfile(properties)
    }
}

/// A resource entry: type, properties, and an optional retention directive.
///
/// Serializes as `{"Type": ..., "Properties": ..., "DeletionPolicy": "Retain"?}`
/// with the deletion policy present only when retention is requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub properties: ResourceProperties,
    pub retain_on_delete: bool,
}

impl Resource {
    pub fn new(properties: impl Into<ResourceProperties>) -> Self {
        Resource {
            properties: properties.into(),
            retain_on_delete: false,
        }
    }

    pub fn with_retention(mut self, retain: bool) -> Self {
        self.retain_on_delete = retain;
        self
    }

    pub fn resource_type(&self) -> ResourceType {
        self.properties.resource_type()
    }
}

impl Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries = if self.retain_on_delete { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(entries))?;
        map.serialize_entry("Type", self.resource_type().as_ref())?;
        map.serialize_entry("Properties", &self.properties)?;
        if self.retain_on_delete {
            map.serialize_entry("DeletionPolicy", "Retain")?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_type_names_match_cloudformation() {
        assert_eq!(ResourceType::ManagedPolicy.as_ref(), "AWS::IAM::ManagedPolicy");
        assert_eq!(ResourceType::Role.as_ref(), "AWS::IAM::Role");
        assert_eq!(ResourceType::InstanceProfile.as_ref(), "AWS::IAM::InstanceProfile");
    }

    #[test]
    fn retention_adds_deletion_policy() {
        let retained = Resource::new(GroupProperties::default()).with_retention(true);
        let value = serde_json::to_value(&retained).unwrap();
        assert_eq!(value["DeletionPolicy"], json!("Retain"));

        let plain = Resource::new(GroupProperties::default());
        let value = serde_json::to_value(&plain).unwrap();
        assert!(value.get("DeletionPolicy").is_none());
    }

    #[test]
    fn group_resource_serializes_with_defaults() {
        let resource = Resource::new(GroupProperties::default());
        assert_eq!(
            serde_json::to_value(&resource).unwrap(),
            json!({
                "Type": "AWS::IAM::Group",
                "Properties": {
                    "Path": "/",
                    "ManagedPolicyArns": [],
                    "Policies": [],
                },
            })
        );
    }

    #[test]
    fn login_profile_always_forces_reset() {
        let profile = LoginProfile::new("hunter2");
        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            json!({ "Password": "hunter2", "PasswordResetRequired": true })
        );
    }
}
