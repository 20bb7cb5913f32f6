//! Entity trait shared by every domain record

use crate::core::record::Record;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Base trait for all records owned by the record source.
///
/// All entities have:
/// - id: Unique identifier
/// - resource names used in routes and error messages
/// - created_at / updated_at timestamps
/// - the field selection their list views search and sort on
pub trait Entity: Record + Clone + Send + Sync + 'static {
    /// The plural resource name used in URLs (e.g., "candidates")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "candidate")
    fn resource_name_singular() -> &'static str;

    /// Fields concatenated for substring search, in order
    fn searchable_fields() -> &'static [&'static str];

    /// Fields a list view may order by
    fn sortable_fields() -> &'static [&'static str];

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc> {
        self.created_at()
    }
}
