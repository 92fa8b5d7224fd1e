//! Template catalog
//!
//! Owns every [`BranchTemplate`] of a project. Templates refer to each other
//! through [`TemplateId`]s on their sockets, so cycles (a branch that grows
//! copies of itself) are plain data. Socket lists are resolved lazily and
//! memoized per template the first time growth asks for them.

use std::collections::HashMap;
use std::ops::Index;
use std::sync::OnceLock;

use crate::core::{Error, Result};
use crate::math::Pose;

use super::template::{BranchTemplate, Socket, TemplateId, MAX_SOCKETS};

/// Collection of branch templates addressed by [`TemplateId`].
#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
    templates: Vec<BranchTemplate>,
    resolved: Vec<OnceLock<Vec<Socket>>>,
    by_name: HashMap<String, TemplateId>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template. Names must be unique.
    pub fn add(&mut self, template: BranchTemplate) -> Result<TemplateId> {
        if self.by_name.contains_key(&template.name) {
            return Err(Error::InvalidTemplate(format!(
                "duplicate template name '{}'",
                template.name
            )));
        }
        let id = TemplateId(self.templates.len() as u32);
        self.by_name.insert(template.name.clone(), id);
        self.templates.push(template);
        self.resolved.push(OnceLock::new());
        Ok(id)
    }

    pub fn get(&self, id: TemplateId) -> Option<&BranchTemplate> {
        self.templates.get(id.index())
    }

    /// Mutable access, e.g. to wire sockets after all templates exist.
    /// Drops the memoized socket list of that template.
    pub fn get_mut(&mut self, id: TemplateId) -> Option<&mut BranchTemplate> {
        let slot = self.resolved.get_mut(id.index())?;
        *slot = OnceLock::new();
        self.templates.get_mut(id.index())
    }

    pub fn find(&self, name: &str) -> Option<TemplateId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, id: TemplateId) -> bool {
        id.index() < self.templates.len()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TemplateId> + '_ {
        (0..self.templates.len() as u32).map(TemplateId)
    }

    /// Resolved sockets of a template (preprocessed once, then cached).
    ///
    /// Unknown ids resolve to an empty list.
    pub fn sockets(&self, id: TemplateId) -> &[Socket] {
        match self.resolved.get(id.index()) {
            Some(cell) => cell.get_or_init(|| self.preprocess(id)),
            None => &[],
        }
    }

    /// Check every template and every socket reference.
    pub fn validate(&self) -> Result<()> {
        for template in &self.templates {
            template.validate().map_err(Error::InvalidTemplate)?;
            for socket in &template.sockets {
                for option in &socket.options {
                    if !self.contains(option.template) {
                        return Err(Error::UnknownTemplate(format!(
                            "'{}' socket refers to template #{}",
                            template.name, option.template.0
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn preprocess(&self, id: TemplateId) -> Vec<Socket> {
        let template = &self.templates[id.index()];
        if template.sockets.len() > MAX_SOCKETS {
            log::warn!(
                "Template '{}' has {} sockets, only the first {} are used",
                template.name,
                template.sockets.len(),
                MAX_SOCKETS
            );
        }

        template
            .sockets
            .iter()
            .take(MAX_SOCKETS)
            .map(|spec| {
                let options = spec
                    .options
                    .iter()
                    .filter(|o| {
                        let known = self.contains(o.template);
                        if !known {
                            log::warn!(
                                "Template '{}' socket option refers to unknown template #{}",
                                template.name,
                                o.template.0
                            );
                        }
                        known
                    })
                    .copied()
                    .collect();
                Socket {
                    local: Pose::new(spec.position, spec.rotation()),
                    options,
                }
            })
            .collect()
    }
}

impl Index<TemplateId> for TemplateCatalog {
    type Output = BranchTemplate;

    fn index(&self, id: TemplateId) -> &BranchTemplate {
        &self.templates[id.index()]
    }
}
