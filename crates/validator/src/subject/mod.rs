//! Subject declarations: members, schemas, bindings and data extraction.

pub mod extract;
pub mod member;
pub mod schema;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use extract::{DataSet, Extractor, MapData};
pub use member::{Member, MemberSet, ValueGetter, Visibility, VisibilityMask};
pub use schema::{
    MemberBuilder, MethodTable, RuleDecl, Schema, SchemaBuilder, Subject, SubjectBinding, member,
};
