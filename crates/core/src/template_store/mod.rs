//! Stage Template Store.
//!
//! Design-time authoring of the ordered stage catalog each Type owns.
//! Orders are renumbered to a dense 1..N sequence after every structural
//! edit and keys must be unique within a Type, ignoring case.

pub mod ordering;
pub mod store;

pub use ordering::{renumber, sort_and_renumber, validate_stage_keys};
pub use store::{MoveDirection, NewStageTemplate, StageTemplatePatch, TemplateStore};
