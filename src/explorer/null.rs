use super::{Explorer, Trial};
use crate::error::Result;
use crate::model::{Model, NullModel};

/// An explorer over [`NullModel`] whose changes never happen.
#[derive(Debug, Clone, Default)]
pub struct NullExplorer {
    id: String,
    model: NullModel,
    trial: Trial,
}

impl Explorer for NullExplorer {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn try_random_change(&mut self, _temperature: f64) -> Result<()> {
        Ok(())
    }

    fn trial(&self) -> &Trial {
        &self.trial
    }

    fn model(&self) -> &dyn Model {
        &self.model
    }

    fn model_mut(&mut self) -> &mut dyn Model {
        &mut self.model
    }

    fn clone_explorer(&self) -> Box<dyn Explorer> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_explorer_is_inert() {
        let mut explorer = NullExplorer::default();
        explorer.try_random_change(10.0).unwrap();
        assert_eq!(explorer.objective_value(), 0.0);
        assert!(!explorer.change_accepted());
        assert!(explorer.archive_summary("x").is_none());
    }
}
