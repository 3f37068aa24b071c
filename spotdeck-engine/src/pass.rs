//! Refresh pass descriptors.

use spotdeck_core::{ActionRequest, Category};
use std::collections::BTreeSet;

/// What one refresh pass must do beyond the regular fetch cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshPass {
    /// A confirmed action to execute before fetching.
    pub preceding_action: Option<ActionRequest>,
    /// Categories that must be refetched regardless of their budget.
    pub invalidated: BTreeSet<Category>,
}

impl RefreshPass {
    /// A plain refresh with no action and nothing forced.
    pub fn periodic() -> Self {
        Self::default()
    }

    pub fn after_action(action: ActionRequest) -> Self {
        Self {
            preceding_action: Some(action),
            invalidated: BTreeSet::new(),
        }
    }

    /// Force every category to refetch.
    pub fn full() -> Self {
        Self {
            preceding_action: None,
            invalidated: Category::all().iter().copied().collect(),
        }
    }

    pub fn invalidate(mut self, category: Category) -> Self {
        self.invalidated.insert(category);
        self
    }

    /// Fold a later request into this one.
    ///
    /// A later action replaces an earlier one; invalidations accumulate.
    /// Returns the action that was displaced, if any.
    pub fn merge(&mut self, later: RefreshPass) -> Option<ActionRequest> {
        self.invalidated.extend(later.invalidated);
        match later.preceding_action {
            Some(action) => self.preceding_action.replace(action),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminate(id: &str) -> ActionRequest {
        ActionRequest::Terminate {
            instance_id: id.to_string(),
            instance_type: "t1.micro".to_string(),
            address: "-".to_string(),
        }
    }

    #[test]
    fn test_merge_unions_invalidations() {
        let mut pass = RefreshPass::periodic().invalidate(Category::Images);
        pass.merge(RefreshPass::periodic().invalidate(Category::Instances));
        assert_eq!(
            pass.invalidated.into_iter().collect::<Vec<_>>(),
            vec![Category::Instances, Category::Images]
        );
    }

    #[test]
    fn test_later_action_replaces_earlier() {
        let mut pass = RefreshPass::after_action(terminate("i-1"));
        let displaced = pass.merge(RefreshPass::after_action(terminate("i-2")));
        assert_eq!(displaced, Some(terminate("i-1")));
        assert_eq!(pass.preceding_action, Some(terminate("i-2")));
    }

    #[test]
    fn test_plain_refresh_keeps_queued_action() {
        let mut pass = RefreshPass::after_action(terminate("i-1"));
        assert_eq!(pass.merge(RefreshPass::periodic()), None);
        assert_eq!(pass.preceding_action, Some(terminate("i-1")));
    }

    #[test]
    fn test_full_covers_every_category() {
        assert_eq!(RefreshPass::full().invalidated.len(), Category::all().len());
    }
}
