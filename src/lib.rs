// src/lib.rs
pub use builder::{AccountTemplate, TemplateBuilder};
pub use config::{
    Account, AccountsConfig, AssumeSpec, Config, EntityKind, GlobalConfig, GroupModel,
    NamingConfig, OutputsMode, PolicyModel, RoleModel, UserModel, ALL_ACCOUNTS,
};
pub use error::BuildError;
pub use ident::scrub_name;
pub use managed_policy::{
    expand_imports, parse_managed_policy, resolve_managed_policies, ManagedPolicyRef,
};
pub use render::{render_policy_document, RenderBindings, TemplateEngine};
pub use trust::{
    build_assume_role_policy_document, build_role_trust, classify_trust, PrincipalKind,
    EC2_SERVICE,
};

mod assembler;
mod builder;
mod config;
mod error;
mod ident;
mod managed_policy;
mod render;
mod trust;
pub mod types;

#[cfg(test)]
mod tests;
