//! Column-union schema unification over independently shaped [`ParseResult`]s.

use std::collections::{HashMap, HashSet};

use crate::types::{ParseResult, RawTable};

/// Union of all field names, in first-seen order.
///
/// Results are walked in order and each result's fields in their own order. Names are trimmed;
/// blank names are skipped and repeats are dropped.
pub fn unify_headers(results: &[ParseResult]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut headers = Vec::new();
    for result in results {
        for field in &result.fields {
            let name = field.trim();
            if name.is_empty() || !seen.insert(name) {
                continue;
            }
            headers.push(name.to_string());
        }
    }
    headers
}

/// Trim header names and suffix repeats (`id`, `id_1`, `id_2`, ...) so each column of one source
/// keeps its own key. Blank names are left blank.
pub fn unique_headers<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() || !out.iter().any(|n| n == name) {
            out.push(name.to_string());
            continue;
        }
        let mut n = 1;
        while out.contains(&format!("{name}_{n}")) {
            n += 1;
        }
        out.push(format!("{name}_{n}"));
    }
    out
}

/// Merge parse results into one [`RawTable`].
///
/// Every output row has exactly one cell per unified header: the source value when the row's
/// (trimmed) key matches the header, `None` otherwise. Row order is the concatenation of
/// `results` in order.
pub fn unify(results: &[ParseResult]) -> RawTable {
    let headers = unify_headers(results);
    let total_rows: usize = results.iter().map(ParseResult::row_count).sum();
    let mut rows = Vec::with_capacity(total_rows);

    for result in results {
        let projection = project(&headers, &result.fields);
        for row in &result.rows {
            rows.push(
                projection
                    .iter()
                    .map(|idx| idx.and_then(|i| row.get(i).cloned().flatten()))
                    .collect(),
            );
        }
    }

    RawTable { headers, rows }
}

/// Map each unified header to a source column index. When two source fields trim to the same
/// name, the later one wins.
fn project(headers: &[String], fields: &[String]) -> Vec<Option<usize>> {
    let by_name: HashMap<&str, usize> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| (f.trim(), i))
        .collect();
    headers.iter().map(|h| by_name.get(h.as_str()).copied()).collect()
}
