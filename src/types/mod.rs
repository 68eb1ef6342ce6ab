//! The CloudFormation-facing document model.
//!
//! Serialized forms follow what the provisioning engine expects:
//! - resources as `{"Type": ..., "Properties": ..., "DeletionPolicy"?}`
//! - intrinsic values as `Ref` / `Fn::GetAtt` / `Fn::ImportValue` / `Fn::Sub`
//! - one document per account as `{"Resources": ..., "Outputs"?}`

mod policy_document;
mod resources;
mod template;
mod value;

pub use policy_document::{
    Effect, PolicyContent, PolicyDocument, PolicyPrincipal, Statement, POLICY_VERSION,
    SAML_AUDIENCE,
};
pub use resources::{
    GroupProperties, InstanceProfileProperties, LoginProfile, ManagedPolicyProperties, Resource,
    ResourceProperties, ResourceType, RoleProperties, UserProperties, DEFAULT_PATH,
};
pub use template::{Export, Output, TemplateDocument};
pub use value::TemplateValue;
