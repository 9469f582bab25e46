//! Contact Tidy Common Library
//!
//! 表記揺れ正規化エンジン（I/Oなし）とフィールド別の正規化ポリシー

pub mod types;
pub mod policy;
pub mod canonical;
pub mod format;
pub mod tags;
pub mod alias;
pub mod names;
pub mod error;

pub use types::{ChangeEntry, ChangeSet, FieldValue, Member, NormalizationGroup, RecordRef};
pub use policy::{collapse_whitespace, FieldKind, FieldPolicy, TieBreak};
pub use canonical::{
    build_change_set, canonicalize, choose_canonical, group, normalize_key, CanonicalChoice,
    Canonicalization, GroupPreview,
};
pub use format::{format_title, has_cjk};
pub use tags::{
    distribution, plan_tag_migration, plan_tag_votes, split_tags, tag_tokens, TagOutcome, TagPlan,
    TagRecordPlan,
};
pub use alias::{MigrationMap, TagMigration};
pub use names::{repair_name_columns, NameRepair};
pub use error::{Error, Result};
