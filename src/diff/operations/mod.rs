//! Hierarchical and scalable migration operations
//!
//! This module provides a more maintainable approach to migration steps
//! using hierarchical enums and trait-based rendering.

use crate::catalog::id::DbObjectId;

// Re-export SqlRenderer from render module
pub use crate::render::SqlRenderer;

pub use aggregate::*;
pub use comments::*;
pub use constraint::*;
pub use domain::*;
pub use event_trigger::*;
pub use extension::*;
pub use foreign_server::*;
pub use function::*;
pub use grant::*;
pub use index::*;
pub use language::*;
pub use policy::*;
pub use publication::*;
pub use role::*;
pub use rule::*;
pub use schema::*;
pub use sequence::*;
pub use subscription::*;
pub use table::*;
pub use trigger::*;
pub use types::*;
pub use user_mapping::*;
pub use view::*;

pub mod aggregate;
pub mod comments;
pub mod constraint;
pub mod domain;
pub mod event_trigger;
pub mod extension;
pub mod foreign_server;
pub mod function;
pub mod grant;
pub mod index;
pub mod language;
pub mod policy;
pub mod publication;
pub mod role;
pub mod rule;
pub mod schema;
pub mod sequence;
pub mod subscription;
pub mod table;
pub mod trigger;
pub mod types;
pub mod user_mapping;
pub mod view;

/// A change's DDL shape, per the spec's `operation` tag on every `Change`.
/// Drives the logical pre-sort's phase split (drop vs. create_alter_object)
/// and the phased dependency sort's per-phase catalog selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Alter,
    Drop,
}

/// A change's `scope` tag: whether it is the core object change, an
/// attached comment, or a privilege grant/revoke. Used by the logical
/// pre-sort's within-parent ordering (object, then comment, then privilege).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Object,
    Comment,
    Privilege,
}

/// Main migration step - hierarchical structure for scalability
#[derive(Debug, Clone)]
pub enum MigrationStep {
    Schema(SchemaOperation),
    Table(TableOperation),
    View(ViewOperation),
    Type(TypeOperation),
    Domain(DomainOperation),
    Sequence(SequenceOperation),
    Function(FunctionOperation),
    Aggregate(AggregateOperation),
    Index(IndexOperation),
    Constraint(ConstraintOperation),
    Trigger(TriggerOperation),
    Extension(ExtensionOperation),
    Grant(GrantOperation),
    Policy(PolicyOperation),
    Role(RoleOperation),
    Language(LanguageOperation),
    ForeignServer(ForeignServerOperation),
    UserMapping(UserMappingOperation),
    Publication(PublicationOperation),
    Subscription(SubscriptionOperation),
    EventTrigger(EventTriggerOperation),
    Rule(RuleOperation),
}

impl MigrationStep {
    /// Returns the database object ID for this migration step
    pub fn id(&self) -> DbObjectId {
        self.db_object_id()
    }

    /// Returns true if this step is a destructive operation (drop)
    pub fn is_drop(&self) -> bool {
        self.is_destructive()
    }

    /// Returns true if this step is a create operation
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            MigrationStep::Schema(SchemaOperation::Create { .. })
                | MigrationStep::Extension(ExtensionOperation::Create { .. })
                | MigrationStep::Table(TableOperation::Create { .. })
                | MigrationStep::View(ViewOperation::Create { .. })
                | MigrationStep::Type(TypeOperation::Create { .. })
                | MigrationStep::Domain(DomainOperation::Create { .. })
                | MigrationStep::Sequence(SequenceOperation::Create { .. })
                | MigrationStep::Function(FunctionOperation::Create { .. })
                | MigrationStep::Aggregate(AggregateOperation::Create { .. })
                | MigrationStep::Index(IndexOperation::Create { .. })
                | MigrationStep::Constraint(ConstraintOperation::Create(_))
                | MigrationStep::Trigger(TriggerOperation::Create { .. })
                | MigrationStep::Grant(GrantOperation::Grant { .. })
                | MigrationStep::Policy(PolicyOperation::Create { .. })
                | MigrationStep::Role(RoleOperation::Create { .. })
                | MigrationStep::Language(LanguageOperation::Create { .. })
                | MigrationStep::ForeignServer(ForeignServerOperation::Create { .. })
                | MigrationStep::UserMapping(UserMappingOperation::Create { .. })
                | MigrationStep::Publication(PublicationOperation::Create { .. })
                | MigrationStep::Subscription(SubscriptionOperation::Create { .. })
                | MigrationStep::EventTrigger(EventTriggerOperation::Create { .. })
                | MigrationStep::Rule(RuleOperation::Create { .. })
        )
    }

    /// The spec's `operation` tag: create, alter, or drop. Dispatches to
    /// each kind's own `operation_kind()`, which knows about its alter-only
    /// variants (e.g. `AlterOwnership`, `Comment`, `Cluster`) that `is_drop`/
    /// `is_create` above collapse to "neither".
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            MigrationStep::Schema(op) => op.operation_kind(),
            MigrationStep::Table(op) => op.operation_kind(),
            MigrationStep::View(op) => op.operation_kind(),
            MigrationStep::Type(op) => op.operation_kind(),
            MigrationStep::Domain(op) => op.operation_kind(),
            MigrationStep::Sequence(op) => op.operation_kind(),
            MigrationStep::Function(op) => op.operation_kind(),
            MigrationStep::Aggregate(op) => op.operation_kind(),
            MigrationStep::Index(op) => op.operation_kind(),
            MigrationStep::Constraint(op) => op.operation_kind(),
            MigrationStep::Trigger(op) => op.operation_kind(),
            MigrationStep::Extension(op) => op.operation_kind(),
            MigrationStep::Grant(op) => op.operation_kind(),
            MigrationStep::Policy(op) => op.operation_kind(),
            MigrationStep::Role(op) => op.operation_kind(),
            MigrationStep::Language(op) => op.operation_kind(),
            MigrationStep::ForeignServer(op) => op.operation_kind(),
            MigrationStep::UserMapping(op) => op.operation_kind(),
            MigrationStep::Publication(op) => op.operation_kind(),
            MigrationStep::Subscription(op) => op.operation_kind(),
            MigrationStep::EventTrigger(op) => op.operation_kind(),
            MigrationStep::Rule(op) => op.operation_kind(),
        }
    }

    /// The spec's `scope` tag. Grants are always privilege-scope; comments
    /// are identified by their `comment:<id>` stable-ID shape; everything
    /// else is the core object change.
    pub fn scope(&self) -> Scope {
        if matches!(self, MigrationStep::Grant(_)) {
            return Scope::Privilege;
        }
        if self.is_comment() {
            return Scope::Comment;
        }
        Scope::Object
    }

    /// True for every kind's `CommentOperation` variant. `db_object_id()`
    /// on a comment target returns the *parent* object's id (not a
    /// `DbObjectId::Comment` wrapper), so scope detection has to match on
    /// the step shape rather than on `id()`.
    pub fn is_comment(&self) -> bool {
        matches!(
            self,
            MigrationStep::Schema(SchemaOperation::Comment(_))
                | MigrationStep::Table(TableOperation::Comment(_))
                | MigrationStep::View(ViewOperation::Comment(_))
                | MigrationStep::Type(TypeOperation::Comment(_))
                | MigrationStep::Domain(DomainOperation::Comment(_))
                | MigrationStep::Sequence(SequenceOperation::Comment(_))
                | MigrationStep::Function(FunctionOperation::Comment(_))
                | MigrationStep::Aggregate(AggregateOperation::Comment(_))
                | MigrationStep::Index(IndexOperation::Comment(_))
                | MigrationStep::Constraint(ConstraintOperation::Comment(_))
                | MigrationStep::Trigger(TriggerOperation::Comment(_))
                | MigrationStep::Extension(ExtensionOperation::Comment(_))
                | MigrationStep::Policy(PolicyOperation::Comment(_))
                | MigrationStep::Role(RoleOperation::Comment(_))
                | MigrationStep::Language(LanguageOperation::Comment(_))
                | MigrationStep::ForeignServer(ForeignServerOperation::Comment(_))
                | MigrationStep::Publication(PublicationOperation::Comment(_))
                | MigrationStep::Subscription(SubscriptionOperation::Comment(_))
                | MigrationStep::EventTrigger(EventTriggerOperation::Comment(_))
                | MigrationStep::Rule(RuleOperation::Comment(_))
        )
    }

    /// True if any statement this step renders is `Safety::Destructive`.
    pub fn has_destructive_sql(&self) -> bool {
        self.to_sql()
            .iter()
            .any(|rendered| rendered.safety == crate::render::Safety::Destructive)
    }

    /// True for grant/revoke steps, which the concise plan view collapses
    /// into a single count rather than listing individually.
    pub fn is_grant(&self) -> bool {
        matches!(self, MigrationStep::Grant(_))
    }

    /// One-line human description of the change, used by the concise plan
    /// view and apply-round reporting.
    pub fn summary(&self) -> String {
        self.to_sql()
            .first()
            .map(|rendered| rendered.sql.lines().next().unwrap_or("").trim().to_string())
            .unwrap_or_default()
    }

    /// Returns step-level dependencies that may not be in the catalog's forward_deps.
    /// This is used for dynamically generated steps (like REVOKE for missing defaults)
    /// that aren't part of the catalog but still need proper ordering.
    pub fn dependencies(&self) -> Vec<DbObjectId> {
        match self {
            MigrationStep::Grant(GrantOperation::Grant { grant }) => grant.depends_on.clone(),
            MigrationStep::Grant(GrantOperation::Revoke { grant }) => grant.depends_on.clone(),
            // Other operations use catalog.forward_deps exclusively
            _ => vec![],
        }
    }
}
