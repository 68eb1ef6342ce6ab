//! Trust specifier resolution and trust document assembly.
//!
//! A trust specifier is classified up front into a [`PrincipalKind`] rather
//! than pattern-matched inline: an account friendly name, the configured
//! SAML provider, or a dotted service principal. Classification is first
//! match wins, in that order, and anything unmatched is a hard error.

use itertools::iproduct;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{Account, Config};
use crate::error::BuildError;
use crate::types::{PolicyDocument, PolicyPrincipal, Statement};

/// The machine-instance service principal. A role trusting it also gets an
/// accompanying instance profile.
pub const EC2_SERVICE: &str = "ec2.amazonaws.com";

/// Dotted names denote service principals (e.g. `ec2.amazonaws.com`).
static SERVICE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.+\..+$").expect("static regex"));

/// What a trust specifier resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalKind {
    /// An account trust, carrying the numeric account id.
    Account(String),
    /// A SAML federation trust, carrying the full provider ARN.
    Saml(String),
    /// A service principal, carried verbatim.
    Service(String),
}

/// Resolve one trust specifier against the configuration.
pub fn classify_trust(config: &Config, specifier: &str) -> Result<PrincipalKind, BuildError> {
    if let Some(account) = config.accounts.get(specifier) {
        return Ok(PrincipalKind::Account(account.id));
    }
    if let Some(provider) = &config.accounts.saml_provider {
        if specifier == provider {
            let parent_id = config.accounts.parent_account_id()?;
            return Ok(PrincipalKind::Saml(format!(
                "arn:aws:iam::{parent_id}:saml-provider/{provider}"
            )));
        }
    }
    if SERVICE_PATTERN.is_match(specifier) {
        return Ok(PrincipalKind::Service(specifier.to_string()));
    }
    Err(BuildError::UnresolvedTrust(specifier.to_string()))
}

/// Build the assume-role trust document for a role's trust list.
///
/// Statement order is contractual: all account and service principals first,
/// grouped as `sts:AssumeRole`, then all SAML principals grouped as
/// `sts:AssumeRoleWithSAML` with the fixed audience condition.
pub fn build_role_trust(config: &Config, trusts: &[String]) -> Result<PolicyDocument, BuildError> {
    let mut sts_principals = Vec::new();
    let mut saml_principals = Vec::new();

    for trust in trusts {
        match classify_trust(config, trust)? {
            PrincipalKind::Account(id) => {
                sts_principals.push(PolicyPrincipal::Aws(format!("arn:aws:iam::{id}:root")));
            }
            PrincipalKind::Saml(provider_arn) => {
                saml_principals.push(PolicyPrincipal::Federated(provider_arn));
            }
            PrincipalKind::Service(name) => {
                sts_principals.push(PolicyPrincipal::Service(name));
            }
        }
    }

    let mut document = PolicyDocument::new();
    for principal in sts_principals {
        document.push(Statement::assume_role(principal));
    }
    for principal in saml_principals {
        document.push(Statement::assume_role_with_saml(principal));
    }
    Ok(document)
}

/// Build the `assume` shorthand document: one `sts:AssumeRole` grant per
/// (role, account) pair, role-major.
pub fn build_assume_role_policy_document(accounts: &[Account], roles: &[String]) -> PolicyDocument {
    let statements = iproduct!(roles, accounts)
        .map(|(role, account)| Statement::assume_role_target(&account.id, role))
        .collect();
    PolicyDocument::with_statements(statements)
}
