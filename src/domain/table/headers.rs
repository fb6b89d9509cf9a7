use std::collections::{HashMap, HashSet};

/// Make header names usable as column names.
///
/// Blank headers become `Unnamed: <index>`; repeated names get a `.1`, `.2`
/// suffix, skipping any suffix that is already taken.
pub fn normalize_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let named: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = name.as_ref();
            if name.trim().is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::with_capacity(named.len());
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(named.len());

    for name in named {
        if !seen.contains(&name) {
            seen.insert(name.clone());
            out.push(name);
            continue;
        }

        let count = counts.entry(name.clone()).or_insert(0);
        let mut candidate;
        loop {
            *count += 1;
            candidate = format!("{}.{}", name, count);
            if !seen.contains(&candidate) {
                break;
            }
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}
