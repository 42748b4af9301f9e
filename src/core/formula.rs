//! Homebrew formula generation.
//!
//! The formula is produced by an external generator that reads the installed
//! package's dependency graph and prints Ruby on stdout. We normalize that
//! output, check its structure and hand it to a third-party validator.

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::core::config::PublishConfig;
use crate::core::step::StepRunner;
use crate::error::{Error, FormulaError, Result, Stage};

/// Generated formula text, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    text: String,
}

/// What the structure check found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaSummary {
    pub class_name: String,
    pub url: String,
    pub sha256: String,
    /// Resource names in file order
    pub resources: Vec<String>,
}

impl Formula {
    /// Normalize raw generator output.
    ///
    /// Line endings become LF, trailing whitespace is stripped from every
    /// line, leading and trailing blank lines are dropped and the text ends
    /// with exactly one newline.
    pub fn from_output(raw: &[u8]) -> Result<Self> {
        let raw = std::str::from_utf8(raw).map_err(|_| FormulaError::NotUtf8)?;
        let lines: Vec<&str> = raw.lines().map(str::trim_end).collect();

        let start = lines.iter().position(|l| !l.is_empty());
        let end = lines.iter().rposition(|l| !l.is_empty());
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            _ => return Err(FormulaError::Empty.into()),
        };

        let mut text = lines[start..=end].join("\n");
        text.push('\n');
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Write the formula to a file, replacing any existing one.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.text)?;
        debug!(path = %path.display(), bytes = self.text.len(), "formula written");
        Ok(())
    }

    /// Check the formula's structure.
    ///
    /// Requires a `class X < Formula` declaration, a top-level `url` and
    /// `sha256`, and a `url` and `sha256` inside every `resource` block.
    ///
    /// # Errors
    ///
    /// Returns `FormulaError::Malformed` describing the first problem found.
    pub fn inspect(&self) -> Result<FormulaSummary> {
        let mut class_name = None;
        let mut url = None;
        let mut sha256 = None;
        let mut resources = Vec::new();
        let mut names = HashSet::new();
        let mut open: Option<OpenResource> = None;

        for (index, line) in self.text.lines().enumerate() {
            let lineno = index + 1;
            let indent = line.len() - line.trim_start().len();
            let trimmed = line.trim();

            if let Some(resource) = open.as_mut() {
                if trimmed == "end" && indent == resource.indent {
                    let resource = open.take().ok_or_else(|| malformed("resource state lost"))?;
                    resource.finish()?;
                    continue;
                }
                if let Some(value) = quoted_value(trimmed, "url") {
                    resource.url = Some(value);
                } else if let Some(value) = quoted_value(trimmed, "sha256") {
                    check_sha256(&value, lineno)?;
                    resource.sha256 = true;
                }
                continue;
            }

            if let Some(name) = parse_class(trimmed) {
                if class_name.is_some() {
                    return Err(malformed(format!("line {}: second class declaration", lineno)));
                }
                class_name = Some(name);
            } else if let Some(name) = parse_resource(trimmed) {
                if !names.insert(name.clone()) {
                    return Err(malformed(format!("line {}: duplicate resource {}", lineno, name)));
                }
                resources.push(name.clone());
                open = Some(OpenResource {
                    name,
                    indent,
                    url: None,
                    sha256: false,
                });
            } else if url.is_none() {
                if let Some(value) = quoted_value(trimmed, "url") {
                    url = Some(value);
                }
            }
            if sha256.is_none() {
                if let Some(value) = quoted_value(trimmed, "sha256") {
                    check_sha256(&value, lineno)?;
                    sha256 = Some(value);
                }
            }
        }

        if let Some(resource) = open {
            return Err(malformed(format!("resource {} is never closed", resource.name)));
        }
        if self.text.lines().last().map(str::trim) != Some("end") {
            return Err(malformed("formula does not end with `end`"));
        }

        let summary = FormulaSummary {
            class_name: class_name.ok_or_else(|| malformed("no `class ... < Formula` declaration"))?,
            url: url.ok_or_else(|| malformed("no top-level url"))?,
            sha256: sha256.ok_or_else(|| malformed("no top-level sha256"))?,
            resources,
        };
        debug!(
            class = %summary.class_name,
            resources = summary.resources.len(),
            "formula inspected"
        );
        Ok(summary)
    }
}

struct OpenResource {
    name: String,
    indent: usize,
    url: Option<String>,
    sha256: bool,
}

impl OpenResource {
    fn finish(self) -> Result<()> {
        if self.url.is_none() {
            return Err(malformed(format!("resource {} has no url", self.name)));
        }
        if !self.sha256 {
            return Err(malformed(format!("resource {} has no sha256", self.name)));
        }
        Ok(())
    }
}

fn malformed(reason: impl Into<String>) -> Error {
    FormulaError::Malformed(reason.into()).into()
}

fn check_sha256(value: &str, lineno: usize) -> Result<()> {
    if value.len() != 64 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(malformed(format!("line {}: sha256 is not 64 hex digits", lineno)));
    }
    Ok(())
}

/// `class Name < Formula` -> `Name`
fn parse_class(line: &str) -> Option<String> {
    let rest = line.strip_prefix("class ")?;
    let (name, parent) = rest.split_once('<')?;
    let name = name.trim();
    let starts_upper = name.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false);
    if parent.trim() == "Formula" && starts_upper && name.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(name.to_string())
    } else {
        None
    }
}

/// `resource "name" do` -> `name`
fn parse_resource(line: &str) -> Option<String> {
    let rest = line.strip_prefix("resource ")?.strip_suffix(" do")?;
    unquote(rest.trim())
}

/// `key "value"` -> `value`
fn quoted_value(line: &str, key: &str) -> Option<String> {
    let rest = line.strip_prefix(key)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    unquote(rest.trim())
}

fn unquote(s: &str) -> Option<String> {
    let inner = s.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.to_string())
}

/// Substitute `{name}` with a shell-quoted value.
pub fn substitute(command: &str, name: &str, value: &str) -> Result<String> {
    let quoted = shlex::try_quote(value)
        .map_err(|e| Error::Other(format!("cannot quote {}: {}", value, e)))?;
    Ok(command.replace(&format!("{{{}}}", name), &quoted))
}

/// Runs the configured generator and validator.
pub struct FormulaBuilder<'a> {
    runner: &'a StepRunner,
    config: &'a PublishConfig,
    package: &'a str,
}

impl<'a> FormulaBuilder<'a> {
    pub fn new(runner: &'a StepRunner, config: &'a PublishConfig, package: &'a str) -> Self {
        Self {
            runner,
            config,
            package,
        }
    }

    /// Install the generator tool, if an install command is configured.
    pub fn install_generator(&self) -> Result<()> {
        match &self.config.install_generator {
            Some(command) => self.runner.run(Stage::GeneratorInstall, command),
            None => Ok(()),
        }
    }

    /// Run the generator and normalize its output.
    pub fn generate(&self) -> Result<Formula> {
        let command = substitute(&self.config.generator, "package", self.package)?;
        let raw = self.runner.stdout(Stage::Generate, &command)?;
        let formula = Formula::from_output(&raw)?;
        info!(package = self.package, bytes = formula.text().len(), "formula generated");
        Ok(formula)
    }

    /// Run the validator against a written formula file.
    pub fn validate(&self, path: &Path) -> Result<()> {
        let Some(validator) = &self.config.validator else {
            debug!("no validator configured");
            return Ok(());
        };
        let command = substitute(validator, "formula", &path.to_string_lossy())?;
        self.runner.run(Stage::Validate, &command)
    }
}
