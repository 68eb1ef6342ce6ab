//! Logical identifier scrubbing.
//!
//! CloudFormation logical ids must be alphanumeric. Configuration names may
//! contain anything a human finds readable, so every name is scrubbed before
//! it becomes a logical id or an output name.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("static regex"));

/// Reduce a name to the characters valid in a CloudFormation logical id.
///
/// Deterministic and idempotent: `scrub_name(scrub_name(x)) == scrub_name(x)`.
pub fn scrub_name(name: &str) -> String {
    NON_ALPHANUMERIC.replace_all(name, "").into_owned()
}
