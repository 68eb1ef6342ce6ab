//! The template multiplexer: entity iteration fanned out across accounts.
//!
//! Sections are walked in a fixed order (policies, roles, groups, users);
//! each entity resolves its target account set and is assembled once per
//! target, with the account passed explicitly all the way down. Documents
//! are created lazily on first touch and owned exclusively by the builder
//! until [`TemplateBuilder::build`] hands them back, one per configured
//! account.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::assembler::{
    add_group, add_instance_profile, add_managed_policy, add_role, add_user,
};
use crate::config::{Account, Config, EntityKind};
use crate::error::BuildError;
use crate::render::{render_policy_document, TemplateEngine};
use crate::trust::{build_assume_role_policy_document, EC2_SERVICE};
use crate::types::{PolicyContent, TemplateDocument};

/// One finished per-account document, keyed by the account it belongs to.
#[derive(Debug)]
pub struct AccountTemplate {
    pub account: Account,
    pub document: TemplateDocument,
}

/// Drives a full run over one configuration.
pub struct TemplateBuilder<'a> {
    config: &'a Config,
    engine: &'a dyn TemplateEngine,
    documents: IndexMap<String, TemplateDocument>,
}

impl<'a> TemplateBuilder<'a> {
    pub fn new(config: &'a Config, engine: &'a dyn TemplateEngine) -> Self {
        TemplateBuilder {
            config,
            engine,
            documents: IndexMap::new(),
        }
    }

    /// Assemble every configured entity into its target accounts' documents.
    ///
    /// Returns one template per configured account in configuration order;
    /// accounts no entity targeted get an empty document. Any failure aborts
    /// the whole run — partial per-account output is never returned.
    pub fn build(mut self) -> Result<Vec<AccountTemplate>, BuildError> {
        info!(
            event = "Build",
            phase = "Start",
            accounts = self.config.accounts.ids.len(),
            policies = self.config.policies.len(),
            roles = self.config.roles.len(),
            groups = self.config.groups.len(),
            users = self.config.users.len()
        );

        self.build_policies()?;
        self.build_roles()?;
        self.build_groups()?;
        self.build_users()?;

        let templates = self.finish();
        info!(event = "Build", phase = "Done", templates = templates.len());
        Ok(templates)
    }

    fn document_for(&mut self, account: &Account) -> &mut TemplateDocument {
        self.documents.entry(account.name.clone()).or_default()
    }

    fn build_policies(&mut self) -> Result<(), BuildError> {
        let config = self.config;
        let engine = self.engine;
        for (name, model) in &config.policies {
            for account in config.accounts.targets(model.in_accounts.as_deref()) {
                debug!(event = "Build", phase = "Policy", name = name, account = %account);

                // The rendered file is produced first so its failures
                // surface even when the assume document supersedes it.
                let mut content = None;
                if let Some(file) = &model.policy_file {
                    let rendered = render_policy_document(
                        engine,
                        config,
                        file,
                        model.template_vars.as_ref(),
                        &account,
                    )?;
                    content = Some(PolicyContent::Raw(rendered));
                }
                if let Some(assume) = &model.assume {
                    let accounts = config.accounts.search(&assume.accounts);
                    content = Some(PolicyContent::Document(build_assume_role_policy_document(
                        &accounts,
                        &assume.roles,
                    )));
                }
                let content = content.ok_or_else(|| BuildError::MissingField {
                    kind: EntityKind::Policy,
                    name: name.clone(),
                    field: "policy_file or assume",
                })?;

                let document = self.document_for(&account);
                add_managed_policy(config, name, content, model, &account, document);
            }
        }
        Ok(())
    }

    fn build_roles(&mut self) -> Result<(), BuildError> {
        let config = self.config;
        for (name, model) in &config.roles {
            for account in config.accounts.targets(model.in_accounts.as_deref()) {
                debug!(event = "Build", phase = "Role", name = name, account = %account);
                let document = self.document_for(&account);
                add_role(config, name, model, &account, document)?;

                let has_ec2_trust = model
                    .trusts
                    .as_deref()
                    .is_some_and(|trusts| trusts.iter().any(|t| t == EC2_SERVICE));
                if has_ec2_trust {
                    add_instance_profile(config, name, model, document);
                }
            }
        }
        Ok(())
    }

    fn build_groups(&mut self) -> Result<(), BuildError> {
        let config = self.config;
        for (name, model) in &config.groups {
            for account in config.accounts.targets(model.in_accounts.as_deref()) {
                debug!(event = "Build", phase = "Group", name = name, account = %account);
                let document = self.document_for(&account);
                add_group(config, name, model, &account, document)?;
            }
        }
        Ok(())
    }

    fn build_users(&mut self) -> Result<(), BuildError> {
        let config = self.config;
        for (name, model) in &config.users {
            for account in config.accounts.targets(model.in_accounts.as_deref()) {
                debug!(event = "Build", phase = "User", name = name, account = %account);
                let document = self.document_for(&account);
                add_user(config, name, model, &account, document)?;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<AccountTemplate> {
        self.config
            .accounts
            .all()
            .into_iter()
            .map(|account| {
                let document = self
                    .documents
                    .shift_remove(&account.name)
                    .unwrap_or_default();
                AccountTemplate { account, document }
            })
            .collect()
    }
}
