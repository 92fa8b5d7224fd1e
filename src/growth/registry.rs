//! Per-plant branch type registry
//!
//! Every distinct template reachable from the root gets a dense type index
//! with a live population count and a growable flag. The flags are
//! recomputed whenever the plant's population changes.

use std::collections::HashMap;

use crate::catalog::{TemplateCatalog, TemplateId};
use crate::core::{Error, Result};

/// Live population record of one template in one plant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BranchType {
    pub template: TemplateId,
    pub total_count: u32,
    pub growable: bool,
}

#[derive(Clone, Debug, Default)]
pub struct BranchTypeRegistry {
    types: Vec<BranchType>,
    index: HashMap<TemplateId, usize>,
}

impl BranchTypeRegistry {
    /// Visit `root` and every template its sockets can lead to, depth first.
    ///
    /// Each template is visited once, so self-references and diamonds are
    /// fine. Fails when more than `limit` templates are reachable.
    pub fn discover(catalog: &TemplateCatalog, root: TemplateId, limit: usize) -> Result<Self> {
        if !catalog.contains(root) {
            return Err(Error::UnknownTemplate(format!("root template #{}", root.0)));
        }

        let mut registry = Self::default();
        let mut stack = vec![root];
        while let Some(template) = stack.pop() {
            if registry.index.contains_key(&template) {
                continue;
            }
            if registry.types.len() == limit {
                return Err(Error::CatalogTooLarge {
                    found: registry.types.len() + 1,
                    limit,
                });
            }
            registry.index.insert(template, registry.types.len());
            registry.types.push(BranchType {
                template,
                total_count: 0,
                growable: false,
            });

            // Reverse so the first socket option is visited first
            for socket in catalog.sockets(template).iter().rev() {
                for option in socket.options.iter().rev() {
                    if !registry.index.contains_key(&option.template) {
                        stack.push(option.template);
                    }
                }
            }
        }

        log::debug!(
            "Discovered {} branch types from '{}'",
            registry.types.len(),
            catalog[root].name
        );
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, template: TemplateId) -> Option<&BranchType> {
        self.index.get(&template).map(|&i| &self.types[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BranchType> + '_ {
        self.types.iter()
    }

    pub fn is_growable(&self, template: TemplateId) -> bool {
        self.get(template).is_some_and(|t| t.growable)
    }

    pub fn any_growable(&self) -> bool {
        self.types.iter().any(|t| t.growable)
    }

    pub fn record_added(&mut self, template: TemplateId) {
        if let Some(&i) = self.index.get(&template) {
            self.types[i].total_count += 1;
        }
    }

    /// Recompute every growable flag for a plant of `total` branches.
    /// Returns whether any type can still grow.
    pub fn update_growability(&mut self, catalog: &TemplateCatalog, total: usize) -> bool {
        let total = total as u32;
        for branch_type in &mut self.types {
            let template = &catalog[branch_type.template];
            let count = branch_type.total_count;
            let share = (count + 1) as f32 / (total + 1) as f32;
            branch_type.growable = total >= template.min_total_other_branches
                && count < template.max_count
                && share <= template.quota_percent / 100.0;
        }
        self.any_growable()
    }

    pub fn clear(&mut self) {
        self.types.clear();
        self.index.clear();
    }
}
