//! Minijinja template rendering for insight messages.
//!
//! Rule templates use `{{ name }}` placeholders over the render context
//! built by [`build_context`]. Rendering is strict: a placeholder must
//! resolve either from the context or from the field schema's defaults
//! (with a warning). Anything else is a [`TemplateError`].
//!
//! Values are formatted by naming convention before interpolation (see
//! [`format_value`]), and three filters are available: `currency`,
//! `percentage` and `date`.

mod context;
mod filters;
mod format;

use std::collections::{BTreeMap, BTreeSet};

use credit_core::{EngineConfig, Field};
use minijinja::{Environment, UndefinedBehavior};
use tracing::warn;

pub use self::context::{build_context, RenderContext};
pub use self::format::{format_value, group_thousands, number_style, NumberStyle};

/// Names minijinja provides itself; never looked up in the context.
const BUILTIN_GLOBALS: &[&str] = &["range", "dict", "namespace", "debug", "loop", "self"];

/// Errors raised while rendering a single insight message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    /// The template text does not parse.
    #[error("malformed template '{template}': {message}")]
    Syntax { template: String, message: String },

    /// A placeholder names neither a context value nor a schema field.
    #[error("unresolved variable '{variable}' in template '{template}'")]
    Unresolved { template: String, variable: String },

    /// Rendering failed after all placeholders resolved.
    #[error("failed to render template '{template}': {message}")]
    Render { template: String, message: String },
}

/// A rendered message plus the placeholders that fell back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub message: String,
    pub defaulted: Vec<String>,
}

/// Renders rule templates using minijinja.
///
/// Unlike per-call environments, one configured environment is built up
/// front and shared; templates are compiled from strings on each call.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            env: Self::build_env(config.currency_symbol.clone()),
        }
    }

    /// Build a configured minijinja environment with the custom filters.
    fn build_env(currency_symbol: String) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        env.add_filter("currency", move |value: minijinja::Value| {
            filters::currency(&currency_symbol, &value)
        });
        env.add_filter("percentage", |value: minijinja::Value| filters::percentage(&value));
        env.add_filter("date", |value: minijinja::Value| filters::date(&value));

        env
    }

    /// Check that a template parses.
    pub fn validate(&self, template: &str) -> Result<(), TemplateError> {
        self.env
            .template_from_str(template)
            .map(|_| ())
            .map_err(|e| syntax_error(template, &e))
    }

    /// Top-level variables a template reads, excluding minijinja builtins.
    pub fn placeholders(&self, template: &str) -> Result<BTreeSet<String>, TemplateError> {
        let tmpl = self
            .env
            .template_from_str(template)
            .map_err(|e| syntax_error(template, &e))?;
        Ok(tmpl
            .undeclared_variables(false)
            .into_iter()
            .filter(|name| !BUILTIN_GLOBALS.contains(&name.as_str()))
            .collect())
    }

    /// Render `template` against `context`.
    ///
    /// Placeholders missing from the context but known to the field schema
    /// are filled with the field default and reported in
    /// [`Rendered::defaulted`].
    pub fn render(&self, template: &str, context: &RenderContext) -> Result<Rendered, TemplateError> {
        let tmpl = self
            .env
            .template_from_str(template)
            .map_err(|e| syntax_error(template, &e))?;

        let mut values: BTreeMap<String, String> = context
            .iter()
            .map(|(name, value)| (name.clone(), format_value(name, value)))
            .collect();

        let mut defaulted = Vec::new();
        let mut needed: Vec<String> = tmpl.undeclared_variables(false).into_iter().collect();
        needed.sort();
        for name in needed {
            if values.contains_key(&name) || BUILTIN_GLOBALS.contains(&name.as_str()) {
                continue;
            }
            match Field::from_name(&name) {
                Some(field) => {
                    warn!(variable = %name, template = %template, "template variable missing; using default");
                    values.insert(name.clone(), format_value(&name, &field.default_value()));
                    defaulted.push(name);
                }
                None => {
                    return Err(TemplateError::Unresolved {
                        template: template.to_string(),
                        variable: name,
                    })
                }
            }
        }

        let message = tmpl.render(&values).map_err(|e| TemplateError::Render {
            template: template.to_string(),
            message: e.to_string(),
        })?;

        Ok(Rendered { message, defaulted })
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

fn syntax_error(template: &str, err: &minijinja::Error) -> TemplateError {
    TemplateError::Syntax {
        template: template.to_string(),
        message: err.to_string(),
    }
}
