//! Search over the note collection.
//!
//! Searching never mutates anything: it projects the collection down to the
//! notes whose title or content contains the query, ignoring case.

use crate::entity::Note;

/// Characters of content shown next to a search hit.
pub const SNIPPET_CHARS: usize = 50;

/// Outcome of applying a query.
///
/// A blank query means no filter is active, which is not the same thing as
/// a filter that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResults<'a> {
    NoFilter,
    Matches(Vec<&'a Note>),
}

impl<'a> SearchResults<'a> {
    pub fn is_filtering(&self) -> bool {
        matches!(self, SearchResults::Matches(_))
    }

    /// Matches, or `None` when no filter is active.
    pub fn matches(&self) -> Option<&[&'a Note]> {
        match self {
            SearchResults::NoFilter => None,
            SearchResults::Matches(notes) => Some(notes.as_slice()),
        }
    }
}

/// Filter `notes` by a case-insensitive substring of title or content.
pub fn filter_notes<'a>(notes: &'a [Note], query: &str) -> SearchResults<'a> {
    if query.trim().is_empty() {
        return SearchResults::NoFilter;
    }

    let needle = query.to_lowercase();
    SearchResults::Matches(
        notes
            .iter()
            .filter(|note| {
                note.title.to_lowercase().contains(&needle)
                    || note.content.to_lowercase().contains(&needle)
            })
            .collect(),
    )
}

/// Leading slice of a note's content for result listings.
pub fn snippet(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
