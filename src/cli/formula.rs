//! Formula command - generate without publishing.

use std::path::Path;
use tracing::debug;

use crate::cli::{output, project};
use crate::core::formula::{Formula, FormulaBuilder, FormulaSummary};
use crate::core::matrix::descriptor_runner;
use crate::error::Result;

/// Print the structure check of a formula.
pub(crate) fn print_summary(summary: &FormulaSummary) {
    output::kv("class:", &summary.class_name);
    output::kv("url:", &summary.url);
    output::kv("sha256:", &summary.sha256);
    output::kv("resources:", summary.resources.len());
    for resource in &summary.resources {
        output::list_item(resource);
    }
}

/// Print a generated formula with its summary.
pub(crate) fn display(formula: &Formula, summary: &FormulaSummary) {
    output::section("Formula");
    print!("{}", formula.text());
    output::section("Summary");
    print_summary(summary);
    println!();
}

/// Generate the formula in the current environment.
pub fn execute(dest: Option<&Path>, validate: bool, config: Option<&Path>) -> Result<()> {
    let project = project::load(config)?;
    let config = &project.config;
    let release = config.require_descriptor(&config.release.os, &config.release.version)?;
    let runner = descriptor_runner(config, release, &project.root);

    let builder = FormulaBuilder::new(&runner, &config.publish, &config.project.name);
    builder.install_generator()?;
    let formula = builder.generate()?;
    let summary = formula.inspect()?;

    let Some(dest) = dest else {
        print!("{}", formula.text());
        if validate {
            let scratch = tempfile::Builder::new().prefix("brewgate-").tempdir()?;
            let path = scratch.path().join(&config.publish.formula);
            formula.write(&path)?;
            builder.validate(&path)?;
            debug!("formula validated");
        }
        return Ok(());
    };

    formula.write(dest)?;
    output::success(&format!("wrote {}", output::path(&dest.display().to_string())));
    print_summary(&summary);
    if validate {
        builder.validate(dest)?;
        output::success("validator passed");
    }
    Ok(())
}
