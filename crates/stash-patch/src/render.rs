//! Rendering git-style diffs from known file contents

use similar::TextDiff;

/// Render a git-style diff deleting `path`, whose last known content is
/// `content`.
pub fn render_deletion(path: &str, content: &str) -> String {
    let mut rendered = format!(
        "diff --git a/{path} b/{path}\ndeleted file mode 100644\n--- a/{path}\n+++ /dev/null\n"
    );
    if !content.is_empty() {
        rendered.push_str(&TextDiff::from_lines(content, "").unified_diff().to_string());
    }
    rendered
}
