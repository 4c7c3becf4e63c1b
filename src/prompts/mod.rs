//! Prompt template management
//!
//! Templates are minijinja strings registered by name. A template directory
//! of `*.yaml` files (each with a `template:` key) overrides or extends the
//! built-in roles, mirroring how prompt packs ship alongside the binary.

pub mod roles;

use crate::utils::error::{AppError, AppResult};
use crate::utils::output::OutputStyle;
use minijinja::Environment;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TemplateFile {
    template: String,
}

pub struct PromptManager {
    env: Environment<'static>,
    names: Vec<String>,
}

impl PromptManager {
    /// Manager preloaded with the built-in expert roles
    pub fn builtin() -> Self {
        let mut manager = Self {
            env: Environment::new(),
            names: Vec::new(),
        };

        for (role, template) in roles::BUILTIN_ROLES {
            // Built-in templates are static and known-good
            let _ = manager.register(&format!("{}_system", role), template);
        }

        manager
    }

    /// Built-ins plus any YAML templates found in `template_dir`
    pub fn with_template_dir(template_dir: &Path) -> AppResult<Self> {
        let mut manager = Self::builtin();

        if !template_dir.exists() {
            return Ok(manager);
        }

        let entries = std::fs::read_dir(template_dir)
            .map_err(|e| AppError::Io(format!("Failed to read template dir: {}", e)))?;

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };

            let content = std::fs::read_to_string(&path)
                .map_err(|e| AppError::Io(format!("Failed to read template {}: {}", name, e)))?;

            match serde_yaml::from_str::<TemplateFile>(&content) {
                Ok(file) => {
                    if let Err(err) = manager.register(&name, &file.template) {
                        println!(
                            "⚠️  {}",
                            OutputStyle::warning(&format!(
                                "Skipping template '{}': {}",
                                name, err
                            ))
                        );
                    }
                }
                Err(e) => {
                    println!(
                        "⚠️  {}",
                        OutputStyle::warning(&format!(
                            "Skipping template file {}: {}",
                            path.display(),
                            e
                        ))
                    );
                }
            }
        }

        Ok(manager)
    }

    /// Register (or replace) a template under a name
    pub fn register(&mut self, name: &str, template: &str) -> AppResult<()> {
        self.env
            .add_template_owned(name.to_string(), template.to_string())
            .map_err(|e| AppError::Parse(format!("Invalid template '{}': {}", name, e)))?;
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Render a named template, falling back to a literal template string
    pub fn get_prompt(
        &self,
        name: &str,
        context: &HashMap<String, String>,
        fallback: Option<&str>,
    ) -> AppResult<String> {
        let context = self.full_context(context);

        if let Ok(template) = self.env.get_template(name) {
            return template
                .render(&context)
                .map_err(|e| AppError::Parse(format!("Failed to render '{}': {}", name, e)));
        }

        if let Some(fallback) = fallback {
            let mut env = Environment::new();
            env.add_template("__fallback", fallback)
                .map_err(|e| AppError::Parse(format!("Invalid fallback template: {}", e)))?;
            return env
                .get_template("__fallback")
                .and_then(|t| t.render(&context))
                .map_err(|e| AppError::Parse(format!("Failed to render fallback: {}", e)));
        }

        Err(AppError::Parse(format!(
            "Template '{}' not found and no fallback provided",
            name
        )))
    }

    /// System prompt for an expert role, using the `<role>_system` convention
    pub fn get_system_prompt(
        &self,
        expert_role: &str,
        context: &HashMap<String, String>,
    ) -> AppResult<String> {
        let fallback = format!("You are a {} expert. Please help the user.", expert_role);
        self.get_prompt(&format!("{}_system", expert_role), context, Some(&fallback))
    }

    /// Every template context carries the shared output-format block
    fn full_context(&self, context: &HashMap<String, String>) -> HashMap<String, String> {
        let mut full = context.clone();
        full.entry("output_format".to_string())
            .or_insert_with(|| roles::REACT_MASTER_PROMPT.to_string());
        full.entry("context".to_string()).or_default();
        full
    }
}
