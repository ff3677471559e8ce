//! Pure projections of (text, annotations) into view data.
//!
//! Nothing here touches the DOM; the wasm front end turns [`Segment`]s into
//! text nodes and highlight elements, and [`ListRow`]s into list items.
//! Everything is recomputed from scratch on each change.

use std::fmt;

use crate::gateway::BackendStatus;
use crate::model::{Annotation, DocId, Label, char_slice};
use crate::sync::SyncState;

/// One run of the highlighted text view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Unannotated text between (or around) highlights.
    Plain {
        /// Char offset of the first char.
        start: usize,
        /// One past the last char.
        end: usize,
        /// The covered text.
        text: String,
    },
    /// An annotated slice, rendered as one inline element.
    Highlight {
        /// Char offset of the first char.
        start: usize,
        /// One past the last char.
        end: usize,
        /// Label carried as element metadata.
        label: Label,
        /// The covered text, rendered as a single text node.
        text: String,
    },
}

impl Segment {
    /// The text this segment renders.
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain { text, .. } | Segment::Highlight { text, .. } => text,
        }
    }

    /// Rendered length in chars.
    pub fn char_len(&self) -> usize {
        match self {
            Segment::Plain { start, end, .. } | Segment::Highlight { start, end, .. } => {
                end - start
            }
        }
    }

    /// Check if this segment is a highlight.
    pub fn is_highlight(&self) -> bool {
        matches!(self, Segment::Highlight { .. })
    }
}

/// Split `text` at annotation boundaries.
///
/// Annotations are taken in start order. Any that overlap an earlier one or
/// run past the end of the text are skipped; the store never holds such
/// entries, so this only guards direct callers.
pub fn highlight_segments(text: &str, annotations: &[Annotation]) -> Vec<Segment> {
    let text_len = text.chars().count();
    let mut sorted: Vec<&Annotation> = annotations.iter().collect();
    sorted.sort_by_key(|a| a.start);

    let mut segments = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut cursor = 0;
    for ann in sorted {
        if ann.start < cursor || ann.end <= ann.start || ann.end > text_len {
            continue;
        }
        if ann.start > cursor {
            segments.push(Segment::Plain {
                start: cursor,
                end: ann.start,
                text: char_slice(text, cursor, ann.start).to_string(),
            });
        }
        segments.push(Segment::Highlight {
            start: ann.start,
            end: ann.end,
            label: ann.label.clone(),
            text: char_slice(text, ann.start, ann.end).to_string(),
        });
        cursor = ann.end;
    }
    if cursor < text_len {
        segments.push(Segment::Plain {
            start: cursor,
            end: text_len,
            text: char_slice(text, cursor, text_len).to_string(),
        });
    }
    segments
}

/// Recover annotations from rendered segments by counting rendered chars.
///
/// Uses only the rendered text, not the offsets stored on the segments, so it
/// checks that highlights render exactly their slice.
pub fn rederive_offsets(segments: &[Segment]) -> Vec<Annotation> {
    let mut cursor = 0;
    let mut out = Vec::new();
    for segment in segments {
        let len = segment.text().chars().count();
        if let Segment::Highlight { label, .. } = segment {
            out.push(Annotation::new(cursor, cursor + len, label.clone()));
        }
        cursor += len;
    }
    out
}

/// One entry of the annotation list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    /// Display position; also the argument for removal.
    pub index: usize,
    /// Entity label.
    pub label: Label,
    /// Start offset.
    pub start: usize,
    /// End offset.
    pub end: usize,
    /// Covered text.
    pub text: String,
}

impl fmt::Display for ListRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. [{}] ({}-{}): {}",
            self.index, self.label, self.start, self.end, self.text
        )
    }
}

/// Build the list view, one row per annotation in start order.
pub fn list_rows(text: &str, annotations: &[Annotation]) -> Vec<ListRow> {
    let mut sorted: Vec<&Annotation> = annotations.iter().collect();
    sorted.sort_by_key(|a| a.start);
    sorted
        .into_iter()
        .enumerate()
        .map(|(index, ann)| ListRow {
            index,
            label: ann.label.clone(),
            start: ann.start,
            end: ann.end,
            text: char_slice(text, ann.start, ann.end).to_string(),
        })
        .collect()
}

/// Summary line shown above the text.
pub fn doc_info(doc_id: Option<&DocId>, count: usize) -> String {
    let id = doc_id.map_or("—", DocId::as_str);
    format!("Document: {id} | Annotations: {count}")
}

/// Text for the backend availability indicator.
pub fn backend_status_line(status: &BackendStatus, base_url: &str) -> String {
    match status {
        BackendStatus::Unknown => format!("Backend: checking {base_url}"),
        BackendStatus::Available => format!("Backend available: {base_url}"),
        BackendStatus::Unavailable { reason } => format!("Backend unavailable: {reason}"),
    }
}

/// Save indicator for the current document. Empty when there is nothing to say.
pub fn sync_status_line(state: &SyncState, export_waiting: bool) -> String {
    if export_waiting {
        return "Saving annotations; export starts when done".to_string();
    }
    match state {
        SyncState::Idle => String::new(),
        SyncState::Saving => "Saving annotations...".to_string(),
        SyncState::Saved(ago) if ago.as_secs() == 0 => "Annotations saved".to_string(),
        SyncState::Saved(ago) => format!("Annotations saved {}s ago", ago.as_secs()),
        SyncState::Failed(message) => format!("Annotations not saved: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Paris est une ville.";

    #[test]
    fn test_no_annotations_renders_raw_text() {
        let segments = highlight_segments(TEXT, &[]);
        assert_eq!(
            segments,
            vec![Segment::Plain {
                start: 0,
                end: 20,
                text: TEXT.to_string()
            }]
        );
    }

    #[test]
    fn test_empty_text_renders_nothing() {
        assert!(highlight_segments("", &[]).is_empty());
    }

    #[test]
    fn test_segments_cover_text_in_order() {
        let anns = [Annotation::new(14, 19, "LOC"), Annotation::new(0, 5, "PERS")];
        let segments = highlight_segments(TEXT, &anns);

        let kinds: Vec<(bool, &str)> = segments
            .iter()
            .map(|s| (s.is_highlight(), s.text()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (true, "Paris"),
                (false, " est une "),
                (true, "ville"),
                (false, "."),
            ]
        );
        let joined: String = segments.iter().map(Segment::text).collect();
        assert_eq!(joined, TEXT);
    }

    #[test]
    fn test_round_trip_reproduces_offsets() {
        let text = "Barack Obama was born in Hawaii on August 4, 1961.";
        let anns = vec![
            Annotation::new(0, 12, "PERS"),
            Annotation::new(25, 31, "LOC"),
            Annotation::new(35, 49, "DATE"),
        ];
        let segments = highlight_segments(text, &anns);
        assert_eq!(rederive_offsets(&segments), anns);
    }

    #[test]
    fn test_round_trip_with_multibyte_text() {
        let text = "Émile habite à Zürich.";
        let anns = vec![Annotation::new(0, 5, "PERS"), Annotation::new(15, 21, "LOC")];
        let segments = highlight_segments(text, &anns);
        assert_eq!(segments[0].text(), "Émile");
        assert_eq!(rederive_offsets(&segments), anns);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let anns = [Annotation::new(6, 9, "MISC")];
        assert_eq!(highlight_segments(TEXT, &anns), highlight_segments(TEXT, &anns));
        assert_eq!(list_rows(TEXT, &anns), list_rows(TEXT, &anns));
    }

    #[test]
    fn test_invalid_annotations_are_skipped() {
        let anns = [
            Annotation::new(0, 5, "PERS"),
            Annotation::new(3, 8, "LOC"),
            Annotation::new(18, 30, "ORG"),
        ];
        let segments = highlight_segments(TEXT, &anns);
        assert_eq!(segments.iter().filter(|s| s.is_highlight()).count(), 1);
    }

    #[test]
    fn test_list_row_format() {
        let rows = list_rows(TEXT, &[Annotation::new(0, 5, "PERS")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].to_string(), "0. [PERS] (0-5): Paris");
    }

    #[test]
    fn test_list_rows_are_start_sorted() {
        let rows = list_rows(
            TEXT,
            &[Annotation::new(14, 19, "LOC"), Annotation::new(0, 5, "PERS")],
        );
        let lines: Vec<String> = rows.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec!["0. [PERS] (0-5): Paris", "1. [LOC] (14-19): ville"]
        );
    }

    #[test]
    fn test_doc_info() {
        assert_eq!(doc_info(None, 0), "Document: — | Annotations: 0");
        assert_eq!(
            doc_info(Some(&DocId::new("abc")), 2),
            "Document: abc | Annotations: 2"
        );
    }

    #[test]
    fn test_backend_status_line() {
        let url = "http://localhost:8001";
        assert_eq!(
            backend_status_line(&BackendStatus::Available, url),
            "Backend available: http://localhost:8001"
        );
        assert_eq!(
            backend_status_line(
                &BackendStatus::Unavailable {
                    reason: "HTTP 503".to_string()
                },
                url
            ),
            "Backend unavailable: HTTP 503"
        );
    }

    #[test]
    fn test_sync_status_line() {
        use std::time::Duration;

        assert_eq!(sync_status_line(&SyncState::Idle, false), "");
        assert_eq!(
            sync_status_line(&SyncState::Saved(Duration::from_secs(42)), false),
            "Annotations saved 42s ago"
        );
        assert_eq!(
            sync_status_line(&SyncState::Failed("HTTP 500".to_string()), false),
            "Annotations not saved: HTTP 500"
        );
        assert_eq!(
            sync_status_line(&SyncState::Saving, true),
            "Saving annotations; export starts when done"
        );
    }
}
