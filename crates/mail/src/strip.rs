//! Best-effort removal of quoted reply history from an email body.
//!
//! Truncate at the first reply-separator line, then drop any remaining
//! quote-marker lines, then trim. This is a line heuristic, not a MIME
//! parser; a separator inside legitimate prose truncates early.

/// Keep only the new content of a reply body.
pub fn strip_quoted_history(body: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();

    for line in body.lines() {
        if is_reply_separator(line) {
            break;
        }
        kept.push(line);
    }

    kept.retain(|line| !is_quoted_line(line));
    kept.join("\n").trim().to_owned()
}

/// Lines that conventionally introduce quoted or forwarded history.
fn is_reply_separator(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.starts_with("On ") && trimmed.ends_with("wrote:") {
        return true;
    }
    if trimmed.starts_with("-----Original Message-----") {
        return true;
    }
    if trimmed.starts_with("Begin forwarded message") {
        return true;
    }
    if trimmed.starts_with("________________________________") {
        return true;
    }
    false
}

fn is_quoted_line(line: &str) -> bool {
    line.trim_start().starts_with('>')
}
