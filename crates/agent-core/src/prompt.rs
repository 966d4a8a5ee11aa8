//! Prompt Templates
//!
//! `{name}` placeholders are substituted at render time and `{{name}}`
//! renders as the literal `{name}`. A brace that does not enclose a plain
//! identifier is kept as text, so JSON snippets can sit in a template
//! unescaped.
//!
//! [`PromptChain`] is the unit every role agent is built from: one template
//! piped into one provider with fixed generation options.

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::provider::{GenerationOptions, LlmProvider};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(String),
    Var(String),
}

/// A parsed prompt template
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl PromptTemplate {
    pub fn new(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = source;

        while let Some(pos) = rest.find('{') {
            text.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            // `{{name}}` renders as the literal `{name}`
            if let Some(name) = tail
                .strip_prefix("{{")
                .and_then(|inner| inner.find("}}").map(|end| &inner[..end]))
                .filter(|name| is_identifier(name))
            {
                text.push('{');
                text.push_str(name);
                text.push('}');
                rest = &tail[name.len() + 4..];
                continue;
            }

            if let Some(name) = tail[1..]
                .find('}')
                .map(|end| &tail[1..=end])
                .filter(|name| is_identifier(name))
            {
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Var(name.to_string()));
                rest = &tail[name.len() + 2..];
                continue;
            }

            text.push('{');
            rest = &tail[1..];
        }

        text.push_str(rest);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Self { segments }
    }

    /// Placeholder names in order of first appearance
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Var(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute every placeholder. Unused variables are ignored; a missing
    /// one is an error.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Var(name) => {
                    let value = vars
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            AgentError::Template(format!("missing variable '{name}'"))
                        })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// A template bound to a provider and generation options
#[derive(Clone)]
pub struct PromptChain {
    provider: Arc<dyn LlmProvider>,
    template: PromptTemplate,
    options: GenerationOptions,
}

impl PromptChain {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        template: PromptTemplate,
        options: GenerationOptions,
    ) -> Self {
        Self {
            provider,
            template,
            options,
        }
    }

    /// Render the template and send it to the model
    pub async fn invoke(&self, vars: &[(&str, &str)]) -> Result<String> {
        let prompt = self.template.render(vars)?;
        tracing::debug!(model = %self.options.model, prompt_len = prompt.len(), "Invoking prompt chain");
        self.provider.invoke(&prompt, &self.options).await
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }
}
