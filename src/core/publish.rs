//! Formula publisher.
//!
//! Generates the formula, validates it, then decrypts the deploy key and
//! pushes the formula to the formula repository. Every step is fatal.
//! Nothing remote changes before the final push, so a failure at any point
//! leaves the formula repository untouched.

use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::credential::{self, CredentialSecret};
use crate::core::domain::BuildContext;
use crate::core::formula::{Formula, FormulaBuilder, FormulaSummary};
use crate::core::matrix;
use crate::core::remote::{Author, FormulaRepository};
use crate::error::{ConfigError, Result};

/// What a publish run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// One commit pushed
    Published { message: String },
    /// The repository already had this exact formula
    Unchanged,
}

/// Publishes the formula for one release.
pub struct Publisher<'a> {
    config: &'a Config,
    project: PathBuf,
    secret: CredentialSecret,
}

impl<'a> Publisher<'a> {
    /// `secret` decrypts the committed deploy key; it is never read from
    /// the environment here.
    pub fn new(config: &'a Config, project: impl Into<PathBuf>, secret: CredentialSecret) -> Self {
        Self {
            config,
            project: project.into(),
            secret,
        }
    }

    /// Commit message for a build and tag.
    pub fn message(&self, build: &str, tag: &str) -> String {
        self.config
            .publish
            .message
            .replace("{build}", build)
            .replace("{tag}", tag)
    }

    /// Publish without displaying the formula.
    pub fn publish(&self, ctx: &BuildContext) -> Result<PublishOutcome> {
        self.publish_with(ctx, |_, _| {})
    }

    /// Publish, calling `display` once the formula is generated and before
    /// it is validated.
    ///
    /// # Errors
    ///
    /// Fails if the context lacks a tag or build id, or if any step fails.
    pub fn publish_with(
        &self,
        ctx: &BuildContext,
        display: impl FnOnce(&Formula, &FormulaSummary),
    ) -> Result<PublishOutcome> {
        let vars = &self.config.context;
        let tag = ctx.tag.as_deref().ok_or_else(|| ConfigError::MissingContext {
            what: "release tag",
            var: vars.tag.clone(),
            flag: "tag",
        })?;
        let build = ctx.build.as_deref().ok_or_else(|| ConfigError::MissingContext {
            what: "build id",
            var: vars.build.clone(),
            flag: "build",
        })?;

        let publish = &self.config.publish;
        let release = self
            .config
            .require_descriptor(&self.config.release.os, &self.config.release.version)?;
        let runner = matrix::descriptor_runner(self.config, release, &self.project);

        // Dropped last: holds the generated formula, the key and the clone.
        let scratch = tempfile::Builder::new().prefix("brewgate-").tempdir()?;
        debug!(scratch = %scratch.path().display(), "publish scratch dir");

        let builder = FormulaBuilder::new(&runner, publish, &self.config.project.name);
        builder.install_generator()?;
        let formula = builder.generate()?;

        let file_name = std::path::Path::new(&publish.formula)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "formula.rb".into());
        let generated = scratch.path().join(file_name);
        formula.write(&generated)?;

        let summary = formula.inspect()?;
        display(&formula, &summary);
        builder.validate(&generated)?;

        let key = credential::decrypt_to(
            &self.project.join(&publish.credential.path),
            &self.secret,
            &scratch.path().join("deploy_key"),
        )?;

        let repo = FormulaRepository::clone(
            &publish.repository,
            &publish.branch,
            &scratch.path().join("formula-repository"),
            &key,
        )?;
        repo.write_formula(&publish.formula, &formula)?;

        if !repo.formula_changed(&publish.formula)? {
            info!(formula = %publish.formula, "formula unchanged, nothing to publish");
            return Ok(PublishOutcome::Unchanged);
        }

        let message = self.message(build, tag);
        let author = Author {
            name: publish.author_name.clone(),
            email: publish.author_email.clone(),
        };
        repo.commit(&publish.formula, &message, &author)?;
        repo.push(&publish.branch, &key)?;

        info!(tag, build, "formula published");
        Ok(PublishOutcome::Published { message })
    }
}
