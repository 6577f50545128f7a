//! Materializes one occurrence of a series as a standalone override event.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};

use crate::event::{slugify, Event, EventId, ScheduleOffsets, SLUG_MAX_LEN};
use crate::recurrence::RecurrenceRule;
use crate::zone::Zone;

/// Lookup of slugs already taken by persisted events.
pub trait SlugRegistry {
    fn contains_slug(&self, slug: &str) -> bool;
}

impl SlugRegistry for HashSet<String> {
    fn contains_slug(&self, slug: &str) -> bool {
        self.contains(slug)
    }
}

impl SlugRegistry for BTreeSet<String> {
    fn contains_slug(&self, slug: &str) -> bool {
        self.contains(slug)
    }
}

/// `base` cut so that `suffix` still fits within the slug limit.
fn with_suffix(base: &str, suffix: &str) -> String {
    let keep = SLUG_MAX_LEN.saturating_sub(suffix.chars().count());
    let mut slug: String = base.chars().take(keep).collect();
    slug.push_str(suffix);
    slug
}

/// Slug for the override of `occurrence_start`: `<parent>-<YYYYMMDDHHMM>`
/// in local time, with `-1`, `-2`, ... appended while the registry has it.
pub fn build_occurrence_slug<R: SlugRegistry + ?Sized>(
    event: &Event,
    occurrence_start: DateTime<Utc>,
    zone: &Zone,
    registry: &R,
) -> String {
    let parent = if event.slug.is_empty() {
        slugify(&event.title)
    } else {
        event.slug.clone()
    };
    let suffix = zone.to_local(occurrence_start).format("%Y%m%d%H%M");
    let base = format!("{}-{}", parent, suffix);

    let mut slug = with_suffix(&base, "");
    let mut counter = 1u32;
    while registry.contains_slug(&slug) {
        slug = with_suffix(&base, &format!("-{}", counter));
        counter += 1;
    }
    slug
}

/// Copy `event` into a detached, non-repeating event for `occurrence_start`.
///
/// Doors/end/curfew are re-derived from the parent's offsets, not copied.
/// Category and shift-template ids are shared; performer slots are copied.
pub fn clone_for_occurrence<R: SlugRegistry + ?Sized>(
    event: &Event,
    occurrence_start: DateTime<Utc>,
    zone: &Zone,
    registry: &R,
) -> Event {
    let reference = event
        .starts_at
        .or(event.next_start)
        .unwrap_or(occurrence_start);
    let offsets =
        ScheduleOffsets::between(Some(reference), event.doors_at, event.ends_at, event.curfew_at);

    Event {
        id: EventId::new(),
        slug: build_occurrence_slug(event, occurrence_start, zone, registry),
        recurrence: RecurrenceRule::none(),
        next_start: None,
        manual_occurrences: Vec::new(),
        parent_series: Some(event.id),
        parent_occurrence_start: Some(occurrence_start),
        starts_at: Some(occurrence_start),
        doors_at: offsets.doors_at(occurrence_start),
        ends_at: offsets.end_at(occurrence_start),
        curfew_at: offsets.curfew_at(occurrence_start),
        ..event.clone()
    }
}
