//! Template resolution.
//!
//! A template type `T` maps to `T.template.yml` in the template directory
//! (the main variant) plus any `T.<suffix>.template.yml` variants. Each
//! enabled package produces one artifact per variant. Resolution is cached
//! for the duration of a run: one disk load per type, no matter how many
//! packages reference it.

use crate::error::{Result, WfgenError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TemplateVariant {
    /// Empty for the main template.
    pub suffix: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub template_type: String,
    /// Main variant first, then suffix variants in lexicographic order.
    pub variants: Vec<TemplateVariant>,
}

// ---------------------------------------------------------------------------
// TemplateResolver
// ---------------------------------------------------------------------------

pub struct TemplateResolver {
    dir: PathBuf,
    cache: RefCell<HashMap<String, Rc<TemplateSet>>>,
}

impl TemplateResolver {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Lookup-or-load. A type with no template files at all is a hard error
    /// for every package referencing it.
    pub fn resolve(&self, template_type: &str) -> Result<Rc<TemplateSet>> {
        if let Some(set) = self.cache.borrow().get(template_type) {
            return Ok(Rc::clone(set));
        }
        let set = Rc::new(self.load(template_type)?);
        self.cache
            .borrow_mut()
            .insert(template_type.to_string(), Rc::clone(&set));
        Ok(set)
    }

    fn load(&self, template_type: &str) -> Result<TemplateSet> {
        debug!(template_type, dir = ?self.dir, "loading templates");

        let mut variants = Vec::new();

        let main = crate::paths::template_path(&self.dir, template_type);
        if main.is_file() {
            variants.push(TemplateVariant {
                suffix: String::new(),
                body: std::fs::read_to_string(&main)?,
            });
        }

        if self.dir.is_dir() {
            let mut suffixed = Vec::new();
            for entry in std::fs::read_dir(&self.dir)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if let Some(suffix) = variant_suffix(&name, template_type) {
                    suffixed.push((suffix, entry.path()));
                }
            }
            suffixed.sort();
            for (suffix, path) in suffixed {
                variants.push(TemplateVariant {
                    suffix,
                    body: std::fs::read_to_string(&path)?,
                });
            }
        }

        if variants.is_empty() {
            return Err(WfgenError::TemplateNotFound {
                template_type: template_type.to_string(),
                dir: self.dir.clone(),
            });
        }

        Ok(TemplateSet {
            template_type: template_type.to_string(),
            variants,
        })
    }
}

/// Extract `suffix` from `{type}.{suffix}.template.yml`, if `filename`
/// matches that shape for the given type.
fn variant_suffix(filename: &str, template_type: &str) -> Option<String> {
    let parts: Vec<&str> = filename.split('.').collect();
    if parts.len() == 4
        && parts[0] == template_type
        && parts[2] == "template"
        && parts[3] == "yml"
    {
        Some(parts[1].to_string())
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
