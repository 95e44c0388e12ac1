//! Resource metadata, serialized items, and form submission shapes.

#![forbid(unsafe_code)]

mod item;
mod resource;
mod submission;

pub use item::{ResourceItem, scalar_to_string};
pub use resource::{
    Cardinality, CrudAction, FieldDescriptor, FieldType, RelationshipDescriptor,
    ResourceDefinition,
};
pub use submission::{FormNode, FormTree, LinkableValue, SubmissionPayload};
