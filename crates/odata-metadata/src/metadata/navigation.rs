//! Single-pass tracking of navigation links not yet emitted.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use rustc_hash::FxHashSet;

use crate::metadata::EntityMetadataBuilder;
use crate::model::NavigationProperty;

/// A navigation link the payload did not carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLinkInfo {
    pub name: String,
    pub is_collection: bool,
}

#[derive(Debug, Default)]
enum Cursor {
    #[default]
    NotStarted,
    Active(VecDeque<NavigationProperty>),
    Exhausted,
}

/// Processed-name set plus the forward-only cursor over the remaining links.
#[derive(Debug, Default)]
pub(crate) struct NavigationLinkTracker {
    processed: FxHashSet<String>,
    cursor: Cursor,
}

impl NavigationLinkTracker {
    pub(crate) fn mark_processed(&mut self, name: &str) {
        self.processed.insert(name.to_string());
    }

    /// Advances the cursor.
    ///
    /// `candidates` is evaluated once, on the first advance. The processed set
    /// is consulted at each advance, so links marked after the cursor started
    /// are still skipped. Once exhausted the cursor stays exhausted.
    pub(crate) fn next<F>(&mut self, candidates: F) -> Option<NavigationLinkInfo>
    where
        F: FnOnce() -> Vec<NavigationProperty>,
    {
        if let Cursor::NotStarted = self.cursor {
            self.cursor = Cursor::Active(candidates().into());
        }

        let Cursor::Active(pending) = &mut self.cursor else {
            return None;
        };
        while let Some(property) = pending.pop_front() {
            if !self.processed.contains(&property.name) {
                return Some(NavigationLinkInfo {
                    name: property.name,
                    is_collection: property.is_collection,
                });
            }
        }
        self.cursor = Cursor::Exhausted;
        None
    }
}

/// Forward-only, non-restartable sequence of unprocessed navigation links.
///
/// Dropping the iterator and asking the builder for a new one resumes where
/// the previous one stopped; it never restarts.
#[derive(Debug)]
pub struct UnprocessedNavigationLinks<'b> {
    builder: &'b mut EntityMetadataBuilder,
}

impl<'b> UnprocessedNavigationLinks<'b> {
    pub(crate) fn new(builder: &'b mut EntityMetadataBuilder) -> Self {
        Self { builder }
    }
}

impl Iterator for UnprocessedNavigationLinks<'_> {
    type Item = NavigationLinkInfo;

    fn next(&mut self) -> Option<Self::Item> {
        self.builder.next_unprocessed_navigation_link()
    }
}

impl FusedIterator for UnprocessedNavigationLinks<'_> {}
