//! Hierarchical display numbers ("1", "1.1", "1.2", "2", ...) derived from
//! segment order and indentation. Recomputed from scratch on every call.
//!
//! A segment is numbered at most one level below its predecessor, and the
//! first segment always at the top level. Levels `[0, 1, 1, 0, 2]` number as
//! `1, 1.1, 1.2, 2, 2.1` and `[0, 2, 1]` as `1, 1.1, 1.2`, so every number in
//! a sequence is distinct.

use std::collections::HashMap;

use crate::{Segment, SegmentId, MAX_LEVEL};

const LEVEL_COUNT: usize = MAX_LEVEL as usize + 1;

/// Display numbers in sequence order.
pub fn segment_numbers(segments: &[Segment]) -> Vec<String> {
    let mut counters = [0u32; LEVEL_COUNT];
    let mut previous: Option<usize> = None;
    segments
        .iter()
        .map(|segment| {
            let wanted = segment.level.min(MAX_LEVEL) as usize;
            let depth = previous.map_or(0, |p| wanted.min(p + 1));
            previous = Some(depth);

            counters[depth] += 1;
            for deeper in counters.iter_mut().skip(depth + 1) {
                *deeper = 0;
            }
            counters[..=depth]
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(".")
        })
        .collect()
}

pub fn numbering(segments: &[Segment]) -> HashMap<SegmentId, String> {
    segments
        .iter()
        .map(|s| s.id.clone())
        .zip(segment_numbers(segments))
        .collect()
}

/// Plain-text script: one line per segment, indented four spaces per
/// numbering depth.
pub fn outline(segments: &[Segment]) -> String {
    segments
        .iter()
        .zip(segment_numbers(segments))
        .map(|(segment, number)| {
            format!(
                "{}{} {}",
                "    ".repeat(number.matches('.').count()),
                number,
                segment.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_levels(levels: &[u8]) -> Vec<Segment> {
        levels
            .iter()
            .enumerate()
            .map(|(i, level)| Segment::new(format!("s{i}")).with_level(*level))
            .collect()
    }

    #[test]
    fn numbers_follow_levels() {
        let segments = with_levels(&[0, 1, 1, 0, 2]);
        assert_eq!(
            segment_numbers(&segments),
            vec!["1", "1.1", "1.2", "2", "2.1"]
        );
    }

    #[test]
    fn deeper_counters_reset() {
        let segments = with_levels(&[0, 0, 1, 1, 0, 1]);
        assert_eq!(
            segment_numbers(&segments),
            vec!["1", "2", "2.1", "2.2", "3", "3.1"]
        );
        let map = numbering(&segments);
        assert_eq!(map[&SegmentId::from("s3")], "2.2");
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn nested_first_segment_numbered_as_root() {
        let segments = with_levels(&[1, 0, 3]);
        assert_eq!(segment_numbers(&segments), vec!["1", "2", "2.1"]);
    }

    #[test]
    fn skipped_levels_nest_one_deeper() {
        let segments = with_levels(&[0, 2, 1]);
        assert_eq!(segment_numbers(&segments), vec!["1", "1.1", "1.2"]);

        let segments = with_levels(&[0, 1, 4, 4, 2, 0]);
        assert_eq!(
            segment_numbers(&segments),
            vec!["1", "1.1", "1.1.1", "1.1.1.1", "1.1.2", "2"]
        );
    }

    #[test]
    fn numbers_are_unique() {
        let levels = [0, 3, 1, 2, 5, 0, 4, 1, 1, 3, 0, 2, 2, 5, 1];
        let segments = with_levels(&levels);
        let numbers = segment_numbers(&segments);
        let distinct: std::collections::HashSet<_> = numbers.iter().collect();
        assert_eq!(distinct.len(), segments.len(), "{numbers:?}");
    }

    #[test]
    fn headings_are_numbered_like_any_segment() {
        let mut segments = with_levels(&[0, 0]);
        segments[0].is_heading = true;
        assert_eq!(segment_numbers(&segments), vec!["1", "2"]);
    }

    #[test]
    fn outline_indents_by_level() {
        let segments = vec![
            Segment::new("a").with_text("EXT. MOUNTAIN TOP"),
            Segment::new("b").with_level(1).with_text("Engine roars"),
        ];
        assert_eq!(outline(&segments), "1 EXT. MOUNTAIN TOP\n    1.1 Engine roars");

        let skipped = with_levels(&[0, 3]);
        assert_eq!(outline(&skipped), "1 \n    1.1 ");
    }

    #[test]
    fn empty_sequence() {
        assert!(segment_numbers(&[]).is_empty());
        assert_eq!(outline(&[]), "");
    }
}
