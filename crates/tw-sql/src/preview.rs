//! Statement previews for log lines and results

/// Single-line leading fragment of `sql`, at most `max_chars` characters
/// (plus `...` when truncated). Runs of whitespace collapse to one space.
pub fn preview(sql: &str, max_chars: usize) -> String {
    let collapsed = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut out: String = collapsed.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
