//! IAM policy documents and statements.
//!
//! Only the statement shapes the generator itself produces are modeled here:
//! assume-role trust statements and assume-role grants. Policy content that
//! arrives from a rendered template stays as raw JSON ([`PolicyContent::Raw`])
//! since validating arbitrary policy documents is out of scope.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The fixed IAM policy language version.
pub const POLICY_VERSION: &str = "2012-10-17";

/// The fixed audience condition attached to SAML trust statements.
pub const SAML_AUDIENCE: &str = "https://signin.aws.amazon.com/saml";

/// A principal entry in a trust statement, externally tagged the way IAM
/// expects: `{"AWS": ...}`, `{"Federated": ...}`, or `{"Service": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyPrincipal {
    #[serde(rename = "AWS")]
    Aws(String),
    Federated(String),
    Service(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One policy statement. Optional slots are omitted from the serialized
/// document entirely rather than emitted as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<PolicyPrincipal>,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

impl Statement {
    /// An `sts:AssumeRole` trust statement for an account or service
    /// principal.
    pub fn assume_role(principal: PolicyPrincipal) -> Self {
        Statement {
            effect: Effect::Allow,
            principal: Some(principal),
            action: "sts:AssumeRole".to_string(),
            resource: None,
            condition: None,
        }
    }

    /// An `sts:AssumeRoleWithSAML` trust statement with the fixed audience
    /// condition.
    pub fn assume_role_with_saml(principal: PolicyPrincipal) -> Self {
        Statement {
            effect: Effect::Allow,
            principal: Some(principal),
            action: "sts:AssumeRoleWithSAML".to_string(),
            resource: None,
            condition: Some(json!({ "StringEquals": { "SAML:aud": SAML_AUDIENCE } })),
        }
    }

    /// An `sts:AssumeRole` grant targeting a role in another account.
    pub fn assume_role_target(account_id: &str, role: &str) -> Self {
        Statement {
            effect: Effect::Allow,
            principal: None,
            action: "sts:AssumeRole".to_string(),
            resource: Some(format!("arn:aws:iam::{account_id}:role/{role}")),
            condition: None,
        }
    }
}

/// An ordered policy document with the fixed language version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        PolicyDocument {
            version: POLICY_VERSION.to_string(),
            statement: Vec::new(),
        }
    }
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statements(statement: Vec<Statement>) -> Self {
        PolicyDocument {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }

    pub fn push(&mut self, statement: Statement) {
        self.statement.push(statement);
    }

    pub fn len(&self) -> usize {
        self.statement.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statement.is_empty()
    }
}

/// Content of a managed policy: a document the generator built itself, or
/// raw JSON parsed from a rendered policy template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PolicyContent {
    Document(PolicyDocument),
    Raw(Value),
}
