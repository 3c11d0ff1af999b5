//! Small value types shared by the graph, attribute and layout modules.

mod attribute_scope;
mod find_or_create;
#[cfg(test)]
mod find_or_create_test;
mod graph_kind;
mod layout_state;
mod process_result;
mod program;

pub use attribute_scope::AttributeScope;
pub use find_or_create::FindOrCreate;
pub use graph_kind::GraphKind;
pub use layout_state::LayoutState;
pub use process_result::ProcessResult;
pub use program::Program;
