//! The list-view engine: search, sort and paginate an in-memory collection
//!
//! [`compute_view`] is a pure projection from a record collection and a set
//! of [`Controls`] to the slice of records to render. It never mutates its
//! input and keeps no state between calls, so every view (candidates,
//! feedback inbox, job board, resume report) shares the same implementation
//! and only differs in the fields it searches and sorts on ([`ListView`]).

use crate::core::entity::Entity;
use crate::core::error::ViewError;
use crate::core::field::FieldValue;
use crate::core::query::{Controls, PaginationMeta, ViewResult};
use crate::core::record::Record;
use std::cmp::Ordering;

/// Project `records` through `controls`.
///
/// 1. Filter: keep records whose lowercased, space-joined `fields` contain
///    the trimmed, lowercased search term. An empty term keeps everything.
/// 2. Sort: if `sort_key` names a field at least one matched record
///    carries, stable-sort by its natural ordering in the requested
///    direction. Records missing the field sort after those that have it
///    (ascending). An unknown key leaves insertion order untouched.
/// 3. Paginate: clamp the requested page into `1..=total_pages` and slice.
///
/// # Errors
///
/// [`ViewError::InvalidConfiguration`] when `page_size` is zero.
pub fn compute_view<R>(
    records: &[R],
    fields: &[&str],
    controls: &Controls,
) -> Result<ViewResult<R>, ViewError>
where
    R: Record + Clone,
{
    if controls.page_size == 0 {
        return Err(ViewError::InvalidConfiguration {
            field: "page_size".to_string(),
            message: "page size must be a positive integer".to_string(),
        });
    }

    let needle = controls.search.trim().to_lowercase();
    let matched = records
        .iter()
        .filter(|record| needle.is_empty() || record.search_text(fields).contains(&needle));

    let ordered: Vec<&R> = match controls.sort_key.as_deref() {
        Some(key) => sort_matched(matched, key, controls),
        None => matched.collect(),
    };

    let pagination = PaginationMeta::new(controls.page, controls.page_size, ordered.len());
    let visible_records = ordered[pagination.range()]
        .iter()
        .map(|record| (*record).clone())
        .collect();

    Ok(ViewResult {
        visible_records,
        pagination,
    })
}

fn sort_matched<'a, R, I>(matched: I, key: &str, controls: &Controls) -> Vec<&'a R>
where
    R: Record + 'a,
    I: Iterator<Item = &'a R>,
{
    let mut keyed: Vec<(Option<FieldValue>, &R)> = matched
        .map(|record| (record.field_value(key).filter(|v| !v.is_null()), record))
        .collect();

    if keyed.iter().all(|(value, _)| value.is_none()) {
        tracing::debug!(sort_key = key, "sort key absent from every record, keeping insertion order");
        return keyed.into_iter().map(|(_, record)| record).collect();
    }

    // slice::sort_by is stable, so ties keep insertion order in both directions
    keyed.sort_by(|(a, _), (b, _)| controls.direction.apply(compare_present_first(a, b)));
    keyed.into_iter().map(|(_, record)| record).collect()
}

fn compare_present_first(a: &Option<FieldValue>, b: &Option<FieldValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.natural_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Field selection and default controls for one screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// View name, used in logs
    pub name: String,

    /// Fields concatenated for search, in order
    pub searchable: Vec<String>,

    /// Fields the view may order by; empty means any field
    pub sortable: Vec<String>,

    /// Controls a freshly mounted view starts with
    pub defaults: Controls,
}

impl ListView {
    pub fn new(name: impl Into<String>, searchable: &[&str], sortable: &[&str]) -> Self {
        Self {
            name: name.into(),
            searchable: searchable.iter().map(|f| f.to_string()).collect(),
            sortable: sortable.iter().map(|f| f.to_string()).collect(),
            defaults: Controls::default(),
        }
    }

    /// Build a view from an entity's declared field selection
    pub fn for_entity<T: Entity>() -> Self {
        Self::new(
            T::resource_name(),
            T::searchable_fields(),
            T::sortable_fields(),
        )
    }

    pub fn with_defaults(mut self, defaults: Controls) -> Self {
        self.defaults = defaults;
        self
    }

    /// Whether `field` may be used as a sort key for this view
    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable.is_empty() || self.sortable.iter().any(|f| f == field)
    }

    /// Run the engine with this view's field selection
    ///
    /// A sort key the view does not allow is treated like an unknown key.
    pub fn compute<R>(&self, records: &[R], controls: &Controls) -> Result<ViewResult<R>, ViewError>
    where
        R: Record + Clone,
    {
        let fields: Vec<&str> = self.searchable.iter().map(String::as_str).collect();

        match controls.sort_key.as_deref() {
            Some(key) if !self.is_sortable(key) => {
                tracing::debug!(view = %self.name, sort_key = key, "ignoring non-sortable key");
                let mut unsorted = controls.clone();
                unsorted.clear_sort();
                compute_view(records, &fields, &unsorted)
            }
            _ => compute_view(records, &fields, controls),
        }
    }
}
