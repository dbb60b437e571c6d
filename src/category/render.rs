use crate::util::{display_width, sanitize_for_terminal, truncate_to_width};

use super::tree::Forest;

const INDENT: &str = "  ";
const BRANCH_MARKER: &str = "+ ";
const LEAF_MARKER: &str = "- ";

/// Render the forest as indented text lines, one per category.
///
/// Branches are marked `+`, leaves `-`. Article counts are appended when
/// non-zero. Titles come from the server and are stripped of terminal
/// control sequences, then truncated so that each line fits in `max_width`
/// columns.
pub fn render_forest(forest: &Forest, max_width: usize) -> Vec<String> {
    forest
        .walk()
        .map(|(depth, node)| {
            let prefix = format!(
                "{}{}",
                INDENT.repeat(depth),
                if node.is_leaf { LEAF_MARKER } else { BRANCH_MARKER }
            );
            let suffix = if node.payload.article_count > 0 {
                format!(" ({})", node.payload.article_count)
            } else {
                String::new()
            };

            let title = sanitize_for_terminal(&node.title);
            let room = max_width
                .saturating_sub(display_width(&prefix))
                .saturating_sub(display_width(&suffix));

            format!("{}{}{}", prefix, truncate_to_width(&title, room), suffix)
        })
        .collect()
}
