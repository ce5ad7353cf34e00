//! Template interpolation for YAML configs
//!
//! Handles `{{ env.NAME }}` interpolation in the string scalars of a parsed
//! pipeline configuration so secrets such as geocoder API keys can stay out
//! of the config file. Comments never reach the renderer, and substituted
//! values are never parsed as YAML.

use crate::error::{Error, Result};
use regex::Regex;
use serde_yaml::value::{Mapping, TaggedValue};
use serde_yaml::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ namespace.NAME }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\.([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}").unwrap()
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Environment variables (`env.*`)
    env: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context holding the current process environment
    pub fn from_env() -> Self {
        Self {
            env: std::env::vars().collect(),
        }
    }

    /// Set an environment value
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Look up `namespace.name`
    pub fn get(&self, namespace: &str, name: &str) -> Option<&str> {
        match namespace {
            "env" => self.env.get(name).map(String::as_str),
            _ => None,
        }
    }
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    check_unrendered(template)?;

    let mut errors = Vec::new();
    let rendered = TEMPLATE_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let (namespace, name) = (&cap[1], &cap[2]);
        match ctx.get(namespace, name) {
            Some(value) => value.to_string(),
            None => {
                errors.push(format!("{namespace}.{name}"));
                String::new()
            }
        }
    });

    if errors.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Reject `{{` that is not part of a well-formed placeholder
fn check_unrendered(s: &str) -> Result<()> {
    let stripped = TEMPLATE_REGEX.replace_all(s, "");
    if let Some(pos) = stripped.find("{{") {
        let snippet: String = stripped[pos..].chars().take(40).collect();
        return Err(Error::template(format!("malformed placeholder near '{snippet}'")));
    }
    Ok(())
}

/// Render every string scalar of a YAML document, keys included
pub fn render_value(value: &Value, ctx: &TemplateContext) -> Result<Value> {
    match value {
        Value::String(s) if has_templates(s) => Ok(Value::String(render(s, ctx)?)),
        Value::String(s) => {
            check_unrendered(s)?;
            Ok(value.clone())
        }
        Value::Sequence(items) => items
            .iter()
            .map(|item| render_value(item, ctx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        Value::Mapping(map) => {
            let mut rendered = Mapping::new();
            for (key, item) in map {
                if key.is_mapping() {
                    return Err(Error::template(
                        "unquoted placeholder; wrap '{{ env.NAME }}' in quotes",
                    ));
                }
                rendered.insert(render_value(key, ctx)?, render_value(item, ctx)?);
            }
            Ok(Value::Mapping(rendered))
        }
        Value::Tagged(tagged) => Ok(Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: render_value(&tagged.value, ctx)?,
        }))),
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_env_substitution() {
        let ctx = TemplateContext::new().with_env("GEOCODER_KEY", "abc123");

        let result = render("key={{ env.GEOCODER_KEY }}", &ctx).unwrap();
        assert_eq!(result, "key=abc123");
    }

    #[test]
    fn test_multiple_substitutions() {
        let ctx = TemplateContext::new()
            .with_env("DATA_DIR", "/srv/data")
            .with_env("CITY", "Longmont");

        let result = render("{{ env.DATA_DIR }}/{{ env.CITY }}.csv", &ctx).unwrap();
        assert_eq!(result, "/srv/data/Longmont.csv");
    }

    #[test]
    fn test_undefined_variable() {
        let ctx = TemplateContext::new();
        let result = render("{{ env.MISSING_KEY }}", &ctx);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("env.MISSING_KEY"));
    }

    #[test]
    fn test_unknown_namespace_is_undefined() {
        let ctx = TemplateContext::new().with_env("KEY", "v");
        assert!(render("{{ config.KEY }}", &ctx).is_err());
    }

    #[test]
    fn test_no_templates() {
        let ctx = TemplateContext::new();
        let result = render("https://example.com/pub?output=csv", &ctx).unwrap();
        assert_eq!(result, "https://example.com/pub?output=csv");
    }

    #[test]
    fn test_whitespace_in_template() {
        let ctx = TemplateContext::new().with_env("KEY", "value");

        assert_eq!(render("{{env.KEY}}", &ctx).unwrap(), "value");
        assert_eq!(render("{{ env.KEY }}", &ctx).unwrap(), "value");
        assert_eq!(render("{{  env.KEY  }}", &ctx).unwrap(), "value");
    }

    #[test]
    fn test_value_is_not_rescanned() {
        let ctx = TemplateContext::new().with_env("KEY", "{{ env.OTHER }}");
        assert_eq!(render("{{ env.KEY }}", &ctx).unwrap(), "{{ env.OTHER }}");
    }

    #[test]
    fn test_malformed_placeholder_rejected() {
        let ctx = TemplateContext::new();
        assert!(matches!(
            render("key: {{ KEY }}", &ctx),
            Err(Error::Template { .. })
        ));
    }

    #[test]
    fn test_has_templates() {
        assert!(has_templates("{{ env.KEY }}"));
        assert!(!has_templates("{{ KEY }}"));
        assert!(!has_templates("no templates here"));
    }

    #[test]
    fn test_render_value_walks_document() {
        let ctx = TemplateContext::new().with_env("KEY", "k-1").with_env("DIR", "/data");
        let doc = yaml(
            r#"
download_dir: "{{ env.DIR }}"
timeout: 10
params:
  api_key: "{{ env.KEY }}"
list:
  - "{{ env.DIR }}/a"
  - plain
"#,
        );

        let rendered = render_value(&doc, &ctx).unwrap();

        assert_eq!(rendered["download_dir"], Value::from("/data"));
        assert_eq!(rendered["timeout"], Value::from(10));
        assert_eq!(rendered["params"]["api_key"], Value::from("k-1"));
        assert_eq!(rendered["list"][0], Value::from("/data/a"));
        assert_eq!(rendered["list"][1], Value::from("plain"));
    }

    #[test]
    fn test_render_value_keeps_yaml_syntax_in_values() {
        let ctx = TemplateContext::new().with_env("KEY", "abc#def: x");
        let doc = yaml(r#"api_key: "{{ env.KEY }}""#);

        let rendered = render_value(&doc, &ctx).unwrap();
        assert_eq!(rendered["api_key"], Value::from("abc#def: x"));
    }

    #[test]
    fn test_render_value_rejects_unquoted_placeholder() {
        let ctx = TemplateContext::new().with_env("KEY", "v");
        let doc = yaml("api_key: {{ env.KEY }}");

        assert!(matches!(
            render_value(&doc, &ctx),
            Err(Error::Template { .. })
        ));
    }
}
