//! In-memory catalog of Types and their stage templates.
//!
//! Every command works on a copy of the Type's stage list and only commits
//! it once all checks pass, so a rejected command leaves the catalog exactly
//! as it was. Successful commands return the updated Type.

use super::ordering::{renumber, sort_and_renumber, validate_stage_keys};
use crate::error::{ValidationError, WorkflowError, WorkflowResult};
use crate::ports::TypeLookup;
use lf_protocol::{LabType, StageTemplate};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;
use tracing::info;

/// Input for [`TemplateStore::add_stage`].
#[derive(Debug, Clone, Default)]
pub struct NewStageTemplate {
    pub key: String,
    pub name: String,
    /// Position to insert at. Appends when `None`.
    pub order: Option<u32>,
    pub color: Option<String>,
    pub allowed_roles: BTreeSet<String>,
}

/// Partial update for [`TemplateStore::update_stage`]. `None` leaves a field
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct StageTemplatePatch {
    pub name: Option<String>,
    /// New position; the stage is moved and the list renumbered.
    pub order: Option<u32>,
    /// `Some(None)` clears the color.
    pub color: Option<Option<String>>,
    pub allowed_roles: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Catalog of Types keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    types: BTreeMap<String, LabType>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from loaded Types, validating each one.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, including a repeated Type id.
    pub fn from_types(types: Vec<LabType>) -> WorkflowResult<Self> {
        let mut store = Self::new();
        for lab_type in types {
            if store.types.contains_key(&lab_type.id) {
                return Err(ValidationError::DuplicateType(lab_type.id).into());
            }
            store.insert_type(lab_type)?;
        }
        Ok(store)
    }

    pub fn get_type(&self, type_id: &str) -> Option<&LabType> {
        self.types.get(type_id)
    }

    /// All Types, sorted by id.
    pub fn list_types(&self) -> Vec<&LabType> {
        self.types.values().collect()
    }

    /// Insert or replace a whole Type after validating its stages.
    pub fn insert_type(&mut self, mut lab_type: LabType) -> WorkflowResult<LabType> {
        if lab_type.id.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "id" }.into());
        }
        trim_keys(&mut lab_type.stages);
        validate_stage_keys(&lab_type.stages)?;
        sort_and_renumber(&mut lab_type.stages);
        self.types.insert(lab_type.id.clone(), lab_type.clone());
        Ok(lab_type)
    }

    /// Create an empty Type.
    pub fn create_type(&mut self, id: &str, name: &str) -> WorkflowResult<LabType> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ValidationError::EmptyField { field: "id" }.into());
        }
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "name" }.into());
        }
        if self.types.contains_key(id) {
            return Err(ValidationError::DuplicateType(id.to_string()).into());
        }

        let lab_type = LabType {
            id: id.to_string(),
            name: name.trim().to_string(),
            stages: Vec::new(),
        };
        self.types.insert(lab_type.id.clone(), lab_type.clone());
        info!(type_id = %lab_type.id, "type created");
        Ok(lab_type)
    }

    /// Delete a Type. Cases already created from it keep their own stages.
    pub fn delete_type(&mut self, type_id: &str) -> WorkflowResult<LabType> {
        let removed = self
            .types
            .remove(type_id)
            .ok_or_else(|| WorkflowError::type_not_found(type_id))?;
        info!(type_id, "type deleted");
        Ok(removed)
    }

    /// Add a stage template to a Type.
    ///
    /// # Errors
    ///
    /// - `EmptyField` when the key or name is blank
    /// - `InvalidOrder` when an explicit order of 0 is given
    /// - `DuplicateKeys` when the key already exists (ignoring case)
    pub fn add_stage(&mut self, type_id: &str, template: NewStageTemplate) -> WorkflowResult<LabType> {
        if template.order == Some(0) {
            return Err(ValidationError::InvalidOrder(0).into());
        }

        self.edit_stages(type_id, |stages| {
            let order = template
                .order
                .unwrap_or_else(|| stages.iter().map(|s| s.order).max().unwrap_or(0) + 1);

            let stage = StageTemplate {
                key: template.key.trim().to_string(),
                name: template.name.trim().to_string(),
                order,
                color: template.color,
                allowed_roles: template.allowed_roles,
            };

            let position = (order as usize - 1).min(stages.len());
            stages.insert(position, stage);
            Ok(())
        })
    }

    /// Patch a stage template, moving it when the patch carries a new order.
    pub fn update_stage(
        &mut self,
        type_id: &str,
        key: &str,
        patch: StageTemplatePatch,
    ) -> WorkflowResult<LabType> {
        if patch.order == Some(0) {
            return Err(ValidationError::InvalidOrder(0).into());
        }

        self.edit_stages(type_id, |stages| {
            let index = position_of(stages, key)?;
            let mut stage = stages.remove(index);

            if let Some(name) = patch.name {
                stage.name = name.trim().to_string();
            }
            if let Some(color) = patch.color {
                stage.color = color;
            }
            if let Some(roles) = patch.allowed_roles {
                stage.allowed_roles = roles;
            }

            let position = match patch.order {
                Some(order) => (order as usize - 1).min(stages.len()),
                None => index,
            };
            stages.insert(position, stage);
            Ok(())
        })
    }

    /// Swap a stage with its neighbour. Moving past either end is a no-op.
    pub fn move_stage(
        &mut self,
        type_id: &str,
        key: &str,
        direction: MoveDirection,
    ) -> WorkflowResult<LabType> {
        self.edit_stages(type_id, |stages| {
            let index = position_of(stages, key)?;
            match direction {
                MoveDirection::Up if index > 0 => stages.swap(index, index - 1),
                MoveDirection::Down if index + 1 < stages.len() => stages.swap(index, index + 1),
                _ => {}
            }
            Ok(())
        })
    }

    pub fn remove_stage(&mut self, type_id: &str, key: &str) -> WorkflowResult<LabType> {
        self.edit_stages(type_id, |stages| {
            let index = position_of(stages, key)?;
            stages.remove(index);
            Ok(())
        })
    }

    /// Copy chosen templates from one Type into another.
    ///
    /// Templates are appended in source order. Keys already present in the
    /// target are skipped silently. Returns the updated target.
    pub fn duplicate_stages<S: AsRef<str>>(
        &mut self,
        source_type_id: &str,
        chosen_keys: &[S],
        target_type_id: &str,
    ) -> WorkflowResult<LabType> {
        let source = self
            .types
            .get(source_type_id)
            .ok_or_else(|| WorkflowError::type_not_found(source_type_id))?;

        for key in chosen_keys {
            if source.stage(key.as_ref()).is_none() {
                return Err(WorkflowError::stage_not_found(key.as_ref()));
            }
        }

        let chosen: Vec<StageTemplate> = source
            .stages
            .iter()
            .filter(|stage| chosen_keys.iter().any(|key| stage.key_matches(key.as_ref())))
            .cloned()
            .collect();

        self.edit_stages(target_type_id, |stages| {
            for template in chosen {
                if stages.iter().any(|existing| existing.key_matches(&template.key)) {
                    continue;
                }
                stages.push(template);
            }
            Ok(())
        })
    }

    /// Replace a Type's whole stage list, as when an editor saves.
    ///
    /// The list is validated, sorted by its declared orders and renumbered.
    pub fn save_stages(
        &mut self,
        type_id: &str,
        mut stages: Vec<StageTemplate>,
    ) -> WorkflowResult<LabType> {
        if let Some(stage) = stages.iter().find(|stage| stage.order == 0) {
            return Err(ValidationError::InvalidOrder(stage.order).into());
        }
        trim_keys(&mut stages);
        sort_and_renumber(&mut stages);
        self.edit_stages(type_id, move |current| {
            *current = stages;
            Ok(())
        })
    }

    /// Apply a structural edit to a copy of the stage list, validate and
    /// renumber it, then commit.
    fn edit_stages<F>(&mut self, type_id: &str, edit: F) -> WorkflowResult<LabType>
    where
        F: FnOnce(&mut Vec<StageTemplate>) -> WorkflowResult<()>,
    {
        let lab_type = self
            .types
            .get_mut(type_id)
            .ok_or_else(|| WorkflowError::type_not_found(type_id))?;

        let mut stages = lab_type.stages.clone();
        edit(&mut stages)?;
        validate_stage_keys(&stages)?;
        renumber(&mut stages);

        lab_type.stages = stages;
        info!(type_id, stage_count = lab_type.stages.len(), "stage templates saved");
        Ok(lab_type.clone())
    }
}

fn trim_keys(stages: &mut [StageTemplate]) {
    for stage in stages {
        stage.key = stage.key.trim().to_string();
    }
}

fn position_of(stages: &[StageTemplate], key: &str) -> WorkflowResult<usize> {
    stages
        .iter()
        .position(|stage| stage.key_matches(key))
        .ok_or_else(|| WorkflowError::stage_not_found(key))
}

impl TypeLookup for TemplateStore {
    fn lookup_type(&self, type_id: &str) -> Option<LabType> {
        self.get_type(type_id).cloned()
    }
}

impl TypeLookup for RwLock<TemplateStore> {
    fn lookup_type(&self, type_id: &str) -> Option<LabType> {
        self.read().ok()?.lookup_type(type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_stage(key: &str) -> NewStageTemplate {
        NewStageTemplate {
            key: key.to_string(),
            name: format!("Stage {}", key),
            ..Default::default()
        }
    }

    fn store_with(type_id: &str, keys: &[&str]) -> TemplateStore {
        let mut store = TemplateStore::new();
        store.create_type(type_id, "Test type").unwrap();
        for key in keys {
            store.add_stage(type_id, new_stage(key)).unwrap();
        }
        store
    }

    fn keys_and_orders(lab_type: &LabType) -> Vec<(String, u32)> {
        lab_type
            .stages
            .iter()
            .map(|s| (s.key.clone(), s.order))
            .collect()
    }

    #[test]
    fn test_add_stage_appends_with_next_order() {
        let store = store_with("crown", &["scan", "design", "mill"]);
        let crown = store.get_type("crown").unwrap();
        assert_eq!(
            keys_and_orders(crown),
            vec![
                ("scan".to_string(), 1),
                ("design".to_string(), 2),
                ("mill".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_add_stage_with_explicit_order_inserts() {
        let mut store = store_with("crown", &["scan", "mill"]);
        let updated = store
            .add_stage(
                "crown",
                NewStageTemplate {
                    order: Some(2),
                    ..new_stage("design")
                },
            )
            .unwrap();

        assert_eq!(updated.stages[1].key, "design");
        assert_eq!(updated.stages[2].order, 3);
    }

    #[test]
    fn test_add_stage_rejects_empty_name() {
        let mut store = store_with("crown", &[]);
        let result = store.add_stage(
            "crown",
            NewStageTemplate {
                key: "scan".to_string(),
                name: "   ".to_string(),
                ..Default::default()
            },
        );

        assert!(matches!(
            result,
            Err(WorkflowError::Validation(ValidationError::EmptyField { field: "name" }))
        ));
        assert!(store.get_type("crown").unwrap().stages.is_empty());
    }

    #[test]
    fn test_add_stage_rejects_duplicate_key_ignoring_case() {
        let mut store = store_with("crown", &["scan"]);
        let result = store.add_stage("crown", new_stage("SCAN"));

        match result {
            Err(WorkflowError::Validation(ValidationError::DuplicateKeys(keys))) => {
                assert_eq!(keys, vec!["scan".to_string()]);
            }
            other => panic!("Expected DuplicateKeys, got {:?}", other),
        }
        assert_eq!(store.get_type("crown").unwrap().stages.len(), 1);
    }

    #[test]
    fn test_add_stage_rejects_zero_order() {
        let mut store = store_with("crown", &[]);
        let result = store.add_stage(
            "crown",
            NewStageTemplate {
                order: Some(0),
                ..new_stage("scan")
            },
        );
        assert!(matches!(
            result,
            Err(WorkflowError::Validation(ValidationError::InvalidOrder(0)))
        ));
    }

    #[test]
    fn test_update_stage_moves_and_renumbers() {
        let mut store = store_with("crown", &["scan", "design", "mill", "glaze"]);
        let updated = store
            .update_stage(
                "crown",
                "Glaze",
                StageTemplatePatch {
                    order: Some(2),
                    name: Some("Glazing".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let keys: Vec<_> = updated.stages.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["scan", "glaze", "design", "mill"]);
        assert_eq!(updated.stages[1].name, "Glazing");
        let orders: Vec<_> = updated.stages.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_update_stage_clears_color() {
        let mut store = store_with("crown", &[]);
        store
            .add_stage(
                "crown",
                NewStageTemplate {
                    color: Some("#ff0000".to_string()),
                    ..new_stage("scan")
                },
            )
            .unwrap();

        let updated = store
            .update_stage(
                "crown",
                "scan",
                StageTemplatePatch {
                    color: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.stages[0].color, None);
    }

    #[test]
    fn test_move_stage_at_boundary_is_noop() {
        let mut store = store_with("crown", &["scan", "design"]);
        let updated = store.move_stage("crown", "scan", MoveDirection::Up).unwrap();
        assert_eq!(updated.stages[0].key, "scan");

        let updated = store.move_stage("crown", "scan", MoveDirection::Down).unwrap();
        assert_eq!(updated.stages[0].key, "design");
        assert_eq!(updated.stages[1].order, 2);
    }

    #[test]
    fn test_remove_stage_renumbers() {
        let mut store = store_with("crown", &["scan", "design", "mill"]);
        let updated = store.remove_stage("crown", "design").unwrap();
        assert_eq!(
            keys_and_orders(&updated),
            vec![("scan".to_string(), 1), ("mill".to_string(), 2)]
        );

        assert!(matches!(
            store.remove_stage("crown", "design"),
            Err(WorkflowError::NotFound { kind: "Stage", .. })
        ));
    }

    #[test]
    fn test_duplicate_stages_skips_existing_keys() {
        let mut store = store_with("crown", &["scan", "design", "mill"]);
        store.create_type("bridge", "Bridge").unwrap();
        store.add_stage("bridge", new_stage("Design")).unwrap();

        let updated = store
            .duplicate_stages("crown", &["scan", "design", "mill"], "bridge")
            .unwrap();

        assert_eq!(
            keys_and_orders(&updated),
            vec![
                ("Design".to_string(), 1),
                ("scan".to_string(), 2),
                ("mill".to_string(), 3)
            ]
        );
        // Source is untouched.
        assert_eq!(store.get_type("crown").unwrap().stages.len(), 3);
    }

    #[test]
    fn test_duplicate_stages_skips_keys_equal_after_normalizing() {
        let mut store = store_with("crown", &["scan", "Étch", "mill"]);
        store
            .insert_type(LabType {
                id: "bridge".to_string(),
                name: "Bridge".to_string(),
                stages: vec![
                    StageTemplate {
                        key: "scan ".to_string(),
                        name: "Scan".to_string(),
                        order: 1,
                        color: None,
                        allowed_roles: BTreeSet::new(),
                    },
                    StageTemplate {
                        key: "étch".to_string(),
                        name: "Etch".to_string(),
                        order: 2,
                        color: None,
                        allowed_roles: BTreeSet::new(),
                    },
                ],
            })
            .unwrap();

        let updated = store
            .duplicate_stages("crown", &["scan", "étch", "mill"], "bridge")
            .unwrap();

        assert_eq!(
            keys_and_orders(&updated),
            vec![
                ("scan".to_string(), 1),
                ("étch".to_string(), 2),
                ("mill".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_duplicate_stages_unknown_source() {
        let mut store = store_with("crown", &["scan"]);
        let result = store.duplicate_stages("nope", &["scan"], "crown");
        assert!(matches!(
            result,
            Err(WorkflowError::NotFound { kind: "Type", .. })
        ));
    }

    #[test]
    fn test_save_stages_reports_all_duplicates() {
        let mut store = store_with("crown", &["scan"]);
        let stage = |key: &str, order: u32| StageTemplate {
            key: key.to_string(),
            name: key.to_string(),
            order,
            color: None,
            allowed_roles: BTreeSet::new(),
        };

        let result = store.save_stages(
            "crown",
            vec![stage("a", 1), stage("A", 2), stage("b", 3), stage("b", 4)],
        );
        match result {
            Err(WorkflowError::Validation(ValidationError::DuplicateKeys(keys))) => {
                assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("Expected DuplicateKeys, got {:?}", other),
        }
        assert_eq!(store.get_type("crown").unwrap().stages[0].key, "scan");

        let saved = store
            .save_stages("crown", vec![stage("late", 10), stage("early", 4)])
            .unwrap();
        assert_eq!(
            keys_and_orders(&saved),
            vec![("early".to_string(), 1), ("late".to_string(), 2)]
        );
    }

    #[test]
    fn test_create_and_delete_type() {
        let mut store = TemplateStore::new();
        store.create_type("crown", "Crown").unwrap();
        assert!(matches!(
            store.create_type("crown", "Again"),
            Err(WorkflowError::Validation(ValidationError::DuplicateType(_)))
        ));

        let deleted = store.delete_type("crown").unwrap();
        assert_eq!(deleted.id, "crown");
        assert!(store.lookup_type("crown").is_none());
    }
}
