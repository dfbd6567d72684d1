//! Small string helpers shared by the catalog and admin code.

/// Lower-case, ASCII-only slug: runs of non-alphanumerics collapse into one `-`.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Split a comma separated list, trimming entries and dropping blanks.
pub fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Split AC 1.5 Ton!! "), "split-ac-1-5-ton");
        assert_eq!(slugify("Inverter/Battery"), "inverter-battery");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn split_csv_drops_blanks() {
        assert_eq!(split_csv("Fast, ,Quiet ,,Efficient"), vec!["Fast", "Quiet", "Efficient"]);
        assert!(split_csv("").is_empty());
    }
}
