pub mod export;
pub mod import;
pub mod recall;
pub mod remember;
pub mod roles;
pub mod stats;

/// One-line preview of engram content for terminal output.
fn preview(content: &str, max_chars: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        flat
    }
}
