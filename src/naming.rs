//! Sheet and section names.
//!
//! Directory names become spreadsheet sheet names, which Excel restricts:
//! no `/ \ : * ? [ ]`, at most 31 characters, and unique within a workbook
//! regardless of case. Word headings and PDF titles use the raw directory
//! name; only the spreadsheet path goes through this module.

/// Longest sheet name Excel accepts, in characters.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '[', ']'];

/// Replace Excel's forbidden characters with `_` and cut to 31 characters.
///
/// - `"2024/01: trip"` → `"2024_01_ trip"`
/// - `"[draft]"` → `"_draft_"`
///
/// Truncation counts characters, so multi-byte names are never split inside
/// a code point.
pub fn sanitize_sheet_name(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_CHARS)
        .collect()
}

/// Sanitize every name and make the results unique.
///
/// A name that collides (case-insensitively) with an earlier one gets a
/// `_2`, `_3`, … suffix; the base is shortened so the result still fits in
/// 31 characters. Empty names become `Sheet`. Excel also rejects a leading
/// or trailing apostrophe, so those are replaced with `_` as well.
pub fn unique_sheet_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut taken: Vec<String> = Vec::with_capacity(names.len());
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let mut base = sanitize_sheet_name(name.as_ref());
        if base.is_empty() {
            base = "Sheet".to_string();
        }
        base = replace_edge_apostrophes(&base);

        let mut candidate = base.clone();
        let mut n = 2;
        while taken.contains(&candidate.to_lowercase()) {
            let suffix = format!("_{n}");
            let keep = MAX_SHEET_NAME_CHARS - suffix.chars().count();
            candidate = base.chars().take(keep).collect::<String>() + &suffix;
            n += 1;
        }

        taken.push(candidate.to_lowercase());
        result.push(candidate);
    }

    result
}

fn replace_edge_apostrophes(name: &str) -> String {
    let last = name.chars().count().saturating_sub(1);
    name.chars()
        .enumerate()
        .map(|(i, c)| {
            if c == '\'' && (i == 0 || i == last) {
                '_'
            } else {
                c
            }
        })
        .collect()
}
