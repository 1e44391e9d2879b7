use std::cmp::Ordering;

/// Sort rows by `sort_by` (default `namespace`, then name) in `sort_order`
/// (`asc` unless `desc` is given).
pub fn sort_dynamic<T, F>(
    data: &mut [T],
    sort_by: Option<&str>,
    sort_order: Option<&str>,
    get_field_value: F,
) where
    F: Fn(&T, &str) -> Option<String>,
{
    let field = sort_by
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "namespace".to_owned());

    let descending = sort_order
        .map(|s| s.trim().eq_ignore_ascii_case("desc"))
        .unwrap_or(false);

    let directed = |ord: Ordering| if descending { ord.reverse() } else { ord };

    data.sort_by(|a, b| {
        let a_val = get_field_value(a, &field).unwrap_or_default();
        let b_val = get_field_value(b, &field).unwrap_or_default();
        let primary = directed(a_val.cmp(&b_val));

        if primary == Ordering::Equal && field != "name" {
            // Ties always fall back to ascending name.
            let a_name = get_field_value(a, "name").unwrap_or_default();
            let b_name = get_field_value(b, "name").unwrap_or_default();
            a_name.cmp(&b_name)
        } else {
            primary
        }
    });
}
