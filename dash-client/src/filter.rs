/// Keep the rows of `data` that match a comma-separated pattern list.
///
/// * Patterns are separated by commas (`,`)
/// * A `!` prefix makes a pattern **negative**
/// * **All** patterns must hold for a row to be kept
///
/// A pattern is found in a row when **any** of `fields` contains its text.
///
/// ```text
/// "admin,!system:"
/// └── keep rows that
///     ├─ contain "admin"
///     └─ do **not** contain "system:"
/// ```
#[tracing::instrument(skip(data, get_field_value))]
pub fn filter_dynamic<'a, T, F>(
    data: &'a [T],
    patterns: &str,
    fields: &[&str],
    get_field_value: F,
) -> Vec<&'a T>
where
    F: Fn(&T, &str) -> Option<String>,
{
    let compiled: Vec<(bool, &str)> = patterns
        .split(',')
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| match raw.strip_prefix('!') {
            Some(text) => (true, text),
            None => (false, raw),
        })
        .collect();

    data.iter()
        .filter(|item| {
            compiled.iter().all(|(negative, pat)| {
                let found = fields.iter().any(|field| {
                    get_field_value(item, field)
                        .as_deref()
                        .is_some_and(|val| val.contains(pat))
                });
                found != *negative
            })
        })
        .collect()
}
