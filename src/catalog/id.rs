use std::fmt;

/// A globally unique identifier for any database object pgmt tracks.
///
/// This is the tagged-sum-type side of object identity: structured fields,
/// pattern-matchable, used throughout the catalog and diff layers. For the
/// dependency graph and plan fingerprints, convert to [`StableId`] via
/// [`DbObjectId::stable_id`] instead of matching on this type directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DbObjectId {
    Schema {
        name: String,
    },
    Table {
        schema: String,
        name: String,
    },
    Column {
        schema: String,
        table: String,
        column: String,
    },
    View {
        schema: String,
        name: String,
    },
    Type {
        schema: String,
        name: String,
    },
    Domain {
        schema: String,
        name: String,
    },
    Function {
        schema: String,
        name: String,
        arguments: String,
    },
    Aggregate {
        schema: String,
        name: String,
        arguments: String,
    },
    Sequence {
        schema: String,
        name: String,
    },
    Index {
        schema: String,
        name: String,
    },
    Constraint {
        schema: String,
        table: String,
        name: String,
    },
    Trigger {
        schema: String,
        table: String,
        name: String,
    },
    Rule {
        schema: String,
        table: String,
        name: String,
    },
    Policy {
        schema: String,
        table: String,
        name: String,
    },
    Extension {
        name: String,
    },
    Role {
        name: String,
    },
    Language {
        name: String,
    },
    ForeignServer {
        name: String,
    },
    UserMapping {
        server: String,
        user_name: String,
    },
    Publication {
        name: String,
    },
    Subscription {
        name: String,
    },
    EventTrigger {
        name: String,
    },
    Grant {
        id: String, // "grantee@object_type:object_name"
    },
    Comment {
        object_id: Box<DbObjectId>,
    },
}

impl DbObjectId {
    /// Get the schema name for this object, if applicable.
    pub fn schema(&self) -> Option<&str> {
        match self {
            DbObjectId::Schema { name } => Some(name.as_str()),
            DbObjectId::Table { schema, .. }
            | DbObjectId::Column { schema, .. }
            | DbObjectId::View { schema, .. }
            | DbObjectId::Type { schema, .. }
            | DbObjectId::Domain { schema, .. }
            | DbObjectId::Function { schema, .. }
            | DbObjectId::Aggregate { schema, .. }
            | DbObjectId::Sequence { schema, .. }
            | DbObjectId::Index { schema, .. }
            | DbObjectId::Constraint { schema, .. }
            | DbObjectId::Trigger { schema, .. }
            | DbObjectId::Rule { schema, .. }
            | DbObjectId::Policy { schema, .. } => Some(schema.as_str()),
            DbObjectId::Grant { .. }
            | DbObjectId::Extension { .. }
            | DbObjectId::Role { .. }
            | DbObjectId::Language { .. }
            | DbObjectId::ForeignServer { .. }
            | DbObjectId::UserMapping { .. }
            | DbObjectId::Publication { .. }
            | DbObjectId::Subscription { .. }
            | DbObjectId::EventTrigger { .. } => None,
            DbObjectId::Comment { object_id } => object_id.schema(),
        }
    }

    /// The object kind this ID identifies, used for kind-ranking in the
    /// logical pre-sort and for plan risk/statement-class bookkeeping.
    pub fn kind(&self) -> ObjectKind {
        match self {
            DbObjectId::Schema { .. } => ObjectKind::Schema,
            DbObjectId::Table { .. } => ObjectKind::Table,
            DbObjectId::Column { .. } => ObjectKind::Column,
            DbObjectId::View { .. } => ObjectKind::View,
            DbObjectId::Type { .. } => ObjectKind::Type,
            DbObjectId::Domain { .. } => ObjectKind::Domain,
            DbObjectId::Function { .. } => ObjectKind::Function,
            DbObjectId::Aggregate { .. } => ObjectKind::Aggregate,
            DbObjectId::Sequence { .. } => ObjectKind::Sequence,
            DbObjectId::Index { .. } => ObjectKind::Index,
            DbObjectId::Constraint { .. } => ObjectKind::Constraint,
            DbObjectId::Trigger { .. } => ObjectKind::Trigger,
            DbObjectId::Rule { .. } => ObjectKind::Rule,
            DbObjectId::Policy { .. } => ObjectKind::Policy,
            DbObjectId::Extension { .. } => ObjectKind::Extension,
            DbObjectId::Role { .. } => ObjectKind::Role,
            DbObjectId::Language { .. } => ObjectKind::Language,
            DbObjectId::ForeignServer { .. } => ObjectKind::ForeignServer,
            DbObjectId::UserMapping { .. } => ObjectKind::UserMapping,
            DbObjectId::Publication { .. } => ObjectKind::Publication,
            DbObjectId::Subscription { .. } => ObjectKind::Subscription,
            DbObjectId::EventTrigger { .. } => ObjectKind::EventTrigger,
            DbObjectId::Grant { .. } => ObjectKind::Grant,
            DbObjectId::Comment { object_id } => object_id.kind(),
        }
    }

    /// Render this identity in the spec's stable-ID grammar:
    /// `kind:qualifier[.qualifier...]`.
    pub fn stable_id(&self) -> StableId {
        let s = match self {
            DbObjectId::Schema { name } => format!("schema:{name}"),
            DbObjectId::Table { schema, name } => format!("table:{schema}.{name}"),
            DbObjectId::Column {
                schema,
                table,
                column,
            } => format!("column:{schema}.{table}.{column}"),
            DbObjectId::View { schema, name } => format!("view:{schema}.{name}"),
            DbObjectId::Type { schema, name } => format!("type:{schema}.{name}"),
            DbObjectId::Domain { schema, name } => format!("domain:{schema}.{name}"),
            DbObjectId::Function {
                schema,
                name,
                arguments,
            } => format!("function:{schema}.{name}({arguments})"),
            DbObjectId::Aggregate {
                schema,
                name,
                arguments,
            } => format!("aggregate:{schema}.{name}({arguments})"),
            DbObjectId::Sequence { schema, name } => format!("sequence:{schema}.{name}"),
            DbObjectId::Index { schema, name } => format!("index:{schema}.{name}"),
            DbObjectId::Constraint {
                schema,
                table,
                name,
            } => format!("constraint:{schema}.{table}.{name}"),
            DbObjectId::Trigger {
                schema,
                table,
                name,
            } => format!("trigger:{schema}.{table}.{name}"),
            DbObjectId::Rule {
                schema,
                table,
                name,
            } => format!("rule:{schema}.{table}.{name}"),
            DbObjectId::Policy {
                schema,
                table,
                name,
            } => format!("policy:{schema}.{table}.{name}"),
            DbObjectId::Extension { name } => format!("extension:{name}"),
            DbObjectId::Role { name } => format!("role:{name}"),
            DbObjectId::Language { name } => format!("language:{name}"),
            DbObjectId::ForeignServer { name } => format!("server:{name}"),
            DbObjectId::UserMapping { server, user_name } => {
                format!("user_mapping:{server}.{user_name}")
            }
            DbObjectId::Publication { name } => format!("publication:{name}"),
            DbObjectId::Subscription { name } => format!("subscription:{name}"),
            DbObjectId::EventTrigger { name } => format!("event_trigger:{name}"),
            DbObjectId::Grant { id } => format!("acl:{id}"),
            DbObjectId::Comment { object_id } => {
                format!("comment:{}", object_id.stable_id().0)
            }
        };
        StableId(s)
    }
}

impl fmt::Display for DbObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stable_id().0)
    }
}

/// Environment-independent string identity of a schema entity, per the
/// `kind:qualifier[.qualifier...]` grammar. The dependency sort and plan
/// fingerprints key exclusively on this type; OIDs and `DbObjectId`'s
/// structured fields are implementation details of extraction and diffing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StableId(String);

impl StableId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&DbObjectId> for StableId {
    fn from(id: &DbObjectId) -> Self {
        id.stable_id()
    }
}

/// The ~25 object kinds pgmt's diff engine knows how to produce changes
/// for. Used by the logical pre-sort's kind ranking and by the plan's
/// statement-class bookkeeping; not used as dependency-graph identity
/// (that's `StableId`'s job).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKind {
    Role,
    Language,
    Extension,
    Schema,
    Type,
    Domain,
    Sequence,
    Table,
    Column,
    Index,
    Constraint,
    Trigger,
    Rule,
    Policy,
    View,
    Function,
    Aggregate,
    ForeignServer,
    UserMapping,
    Publication,
    Subscription,
    EventTrigger,
    Grant,
}

impl ObjectKind {
    /// Fixed rank used for the logical pre-sort's within-phase, within-
    /// schema ordering. Lower sorts first. This is a readability heuristic
    /// only — correctness comes from the phased dependency sort (§4.3).
    pub fn rank(self) -> u8 {
        match self {
            ObjectKind::Role => 0,
            ObjectKind::Language => 1,
            ObjectKind::Extension => 2,
            ObjectKind::Schema => 3,
            ObjectKind::Type => 4,
            ObjectKind::Domain => 5,
            ObjectKind::Sequence => 6,
            ObjectKind::Table => 7,
            ObjectKind::Column => 8,
            ObjectKind::Index => 9,
            ObjectKind::Constraint => 10,
            ObjectKind::Trigger => 11,
            ObjectKind::Rule => 12,
            ObjectKind::Policy => 13,
            ObjectKind::View => 14,
            ObjectKind::Function => 15,
            ObjectKind::Aggregate => 16,
            ObjectKind::ForeignServer => 17,
            ObjectKind::UserMapping => 18,
            ObjectKind::Publication => 19,
            ObjectKind::Subscription => 20,
            ObjectKind::EventTrigger => 21,
            ObjectKind::Grant => 22,
        }
    }
}

pub trait DependsOn {
    fn id(&self) -> DbObjectId;
    fn depends_on(&self) -> &[DbObjectId];
}

/// One fact from a catalog's `pg_depend`: `dependent` requires `referenced`
/// to already exist. Kept alongside the derived `forward_deps`/
/// `reverse_deps` adjacency maps as the raw material the phased dependency
/// sort's "catalog" constraint origin consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgDependRow {
    pub dependent: DbObjectId,
    pub referenced: DbObjectId,
    pub deptype: DepType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepType {
    Normal,
    Auto,
    Internal,
}
