use thiserror::Error;

use crate::config::EntityKind;

/// Fatal errors raised while resolving configuration into templates.
///
/// Every variant carries enough context (entity, account, underlying cause)
/// to diagnose from the message alone; the run aborts on the first error and
/// no partial output is committed.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{kind} '{name}' is missing required field '{field}'")]
    MissingField {
        kind: EntityKind,
        name: String,
        field: &'static str,
    },

    #[error("unknown account '{0}', assure it exists in the accounts section")]
    UnknownAccount(String),

    #[error(
        "unable to resolve trust '{0}' to an account friendly name, the SAML \
         provider, or a service principal"
    )]
    UnresolvedTrust(String),

    #[error("working on '{owner}': managed policy '{policy}' does not exist in the configuration")]
    UnknownManagedPolicy { policy: String, owner: String },

    #[error(
        "working on '{owner}': managed policy '{policy}' is not configured to go \
         into account '{account}'"
    )]
    PolicyNotInAccount {
        policy: String,
        owner: String,
        account: String,
    },

    #[error("failed to render policy template '{file}': {reason}")]
    TemplateRender { file: String, reason: String },

    #[error(
        "failed to parse rendered policy template '{file}' as JSON: {reason}\n\
         contents returned by the render:\n{rendered}"
    )]
    TemplateParse {
        file: String,
        reason: String,
        rendered: String,
    },
}
