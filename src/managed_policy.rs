//! Managed-policy reference resolution and `import:` expansion.
//!
//! A managed-policy attachment must end up as an ARN. A reference is either
//! already an ARN, an `import:` link to another template's export, or the
//! name of a policy declared locally. Local names are validated in two
//! stages — declared at all, then scheduled for the account being assembled —
//! so that a misspelled name never silently becomes a dangling reference.

use crate::config::{Account, Config};
use crate::error::BuildError;
use crate::ident::scrub_name;
use crate::types::TemplateValue;

const ARN_PREFIX: &str = "arn:aws";
const IMPORT_PREFIX: &str = "import:";

/// A classified managed-policy reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagedPolicyRef {
    /// A literal ARN, passed through verbatim.
    Literal(String),
    /// A cross-template import of the named export.
    Import(String),
    /// A reference to a policy in the same document, by scrubbed logical id.
    LocalRef(String),
}

impl ManagedPolicyRef {
    pub fn to_value(&self) -> TemplateValue {
        match self {
            ManagedPolicyRef::Literal(arn) => TemplateValue::Literal(arn.clone()),
            ManagedPolicyRef::Import(export_name) => {
                TemplateValue::ImportValue(export_name.clone())
            }
            ManagedPolicyRef::LocalRef(logical_id) => TemplateValue::Ref(logical_id.clone()),
        }
    }
}

/// Classify and validate one managed-policy reference for the given owner
/// and target account.
pub fn parse_managed_policy(
    config: &Config,
    raw: &str,
    owner: &str,
    account: &Account,
) -> Result<ManagedPolicyRef, BuildError> {
    if raw.starts_with(ARN_PREFIX) {
        return Ok(ManagedPolicyRef::Literal(raw.to_string()));
    }
    if let Some(export_name) = raw.strip_prefix(IMPORT_PREFIX) {
        return Ok(ManagedPolicyRef::Import(export_name.to_string()));
    }
    if !config.is_local_managed_policy(raw) {
        return Err(BuildError::UnknownManagedPolicy {
            policy: raw.to_string(),
            owner: owner.to_string(),
        });
    }
    if !config.is_managed_policy_in_account(raw, account) {
        return Err(BuildError::PolicyNotInAccount {
            policy: raw.to_string(),
            owner: owner.to_string(),
            account: account.name.clone(),
        });
    }
    Ok(ManagedPolicyRef::LocalRef(scrub_name(raw)))
}

/// Resolve a full managed-policy reference list into template values.
pub fn resolve_managed_policies(
    config: &Config,
    refs: &[String],
    owner: &str,
    account: &Account,
) -> Result<Vec<TemplateValue>, BuildError> {
    refs.iter()
        .map(|raw| parse_managed_policy(config, raw, owner, account).map(|r| r.to_value()))
        .collect()
}

/// Expand `import:` entries in a membership list; everything else passes
/// through verbatim since externally-defined names cannot be validated.
pub fn expand_imports(entries: &[String]) -> Vec<TemplateValue> {
    entries
        .iter()
        .map(|entry| match entry.strip_prefix(IMPORT_PREFIX) {
            Some(export_name) => TemplateValue::ImportValue(export_name.to_string()),
            None => TemplateValue::Literal(entry.clone()),
        })
        .collect()
}
