//! Policy content rendering behind a template-engine seam.
//!
//! The substitution mechanism itself (and the file access it needs) lives
//! outside this crate: implementors of [`TemplateEngine`] receive the policy
//! file name and the contextual bindings and return rendered text. This
//! module owns what happens around that call — binding construction, JSON
//! parsing of the result, and the error context both failure modes carry.

use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::config::{Account, Config};
use crate::error::BuildError;

/// Variable bindings handed to the template engine for one policy render.
#[derive(Debug, Clone, Serialize)]
pub struct RenderBindings<'a> {
    /// The full configuration tree, exposed to templates as `config`.
    pub config: &'a Config,
    /// Numeric id of the account being assembled.
    pub account: &'a str,
    /// Numeric id of the designated parent account.
    pub parent_account: &'a str,
    /// Free-form per-policy variables, absent when the model declares none.
    pub template_vars: Option<&'a Value>,
}

/// The black-box templating collaborator.
pub trait TemplateEngine {
    /// Load and render the named policy template with the given bindings.
    fn render(
        &self,
        file: &str,
        bindings: &RenderBindings<'_>,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// Render a policy file and parse the result as a JSON policy document.
///
/// Render failures report the file name and the engine's cause; parse
/// failures additionally echo the rendered text, since the text is what has
/// to be debugged.
pub fn render_policy_document(
    engine: &dyn TemplateEngine,
    config: &Config,
    file: &str,
    template_vars: Option<&Value>,
    account: &Account,
) -> Result<Value, BuildError> {
    let parent_account = config.accounts.parent_account_id()?;
    let bindings = RenderBindings {
        config,
        account: &account.id,
        parent_account,
        template_vars,
    };

    let rendered = engine
        .render(file, &bindings)
        .map_err(|e| BuildError::TemplateRender {
            file: file.to_string(),
            reason: e.to_string(),
        })?;

    serde_json::from_str(&rendered).map_err(|e| {
        error!(
            event = "Render",
            phase = "Parse",
            file = file,
            account = %account,
            rendered = rendered,
            "rendered policy template is not valid JSON"
        );
        BuildError::TemplateParse {
            file: file.to_string(),
            reason: e.to_string(),
            rendered,
        }
    })
}


#[cfg(test)]
mod tests {
    use super::testing::StaticEngine;
    use super::*;
    use serde_json::json;

    fn config() -> Config {
        serde_json::from_value(json!({
            "accounts": {
                "ids": { "prod": "111111111111" },
                "parent_account": "prod",
            },
        }))
        .unwrap()
    }

    #[test]
    fn renders_and_parses_policy_json() {
        let engine = StaticEngine::new([(
            "s3.json",
            r#"{"Version": "2012-10-17", "Statement": []}"#,
        )]);
        let config = config();
        let prod = config.accounts.get("prod").unwrap();
        let document =
            render_policy_document(&engine, &config, "s3.json", None, &prod).unwrap();
        assert_eq!(document["Version"], json!("2012-10-17"));
    }

    #[test]
    fn render_failure_names_the_file() {
        let engine = StaticEngine::new([("other.json", "{}")]);
        let config = config();
        let prod = config.accounts.get("prod").unwrap();
        let err =
            render_policy_document(&engine, &config, "missing.json", None, &prod).unwrap_err();
        match err {
            BuildError::TemplateRender { file, reason } => {
                assert_eq!(file, "missing.json");
                assert!(reason.contains("missing.json"));
            }
            other => panic!("expected TemplateRender, got: {other}"),
        }
    }

    #[test]
    fn parse_failure_echoes_the_rendered_text() {
        let engine = StaticEngine::new([("broken.json", "{ not json")]);
        let config = config();
        let prod = config.accounts.get("prod").unwrap();
        let err =
            render_policy_document(&engine, &config, "broken.json", None, &prod).unwrap_err();
        match err {
            BuildError::TemplateParse { file, rendered, .. } => {
                assert_eq!(file, "broken.json");
                assert_eq!(rendered, "{ not json");
            }
            other => panic!("expected TemplateParse, got: {other}"),
        }
        // The message itself carries both as well.
    }
}
