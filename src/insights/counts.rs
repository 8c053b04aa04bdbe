use std::collections::HashMap;

use serde::Serialize;

/// カテゴリ値とその出現回数（`value_counts`の1行）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// 値の出現回数を数える。欠損値は数えない。
///
/// 件数の降順に並べ、同数の場合は初出順を保つ。
#[must_use]
pub fn value_counts<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Vec<CategoryCount> {
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();

    for value in values.into_iter().flatten() {
        match positions.get(value) {
            Some(&position) => counts[position].count += 1,
            None => {
                positions.insert(value, counts.len());
                counts.push(CategoryCount {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    // sort_by は安定ソートなので同数は初出順のまま
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// 上位`n`件の値（`value_counts().head(n)`相当）。
#[must_use]
pub fn top_values<'a>(
    values: impl IntoIterator<Item = Option<&'a str>>,
    n: usize,
) -> Vec<CategoryCount> {
    let mut counts = value_counts(values);
    counts.truncate(n);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_counts_sorts_descending_and_skips_missing() {
        let values = [
            Some("NEUTRAL"),
            Some("POSITIVE"),
            None,
            Some("POSITIVE"),
            Some("NEGATIVE"),
            Some("POSITIVE"),
        ];
        let counts = value_counts(values);

        assert_eq!(
            counts,
            vec![
                CategoryCount {
                    value: "POSITIVE".into(),
                    count: 3
                },
                CategoryCount {
                    value: "NEUTRAL".into(),
                    count: 1
                },
                CategoryCount {
                    value: "NEGATIVE".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn top_values_truncates() {
        let users: Vec<String> = (0..15).map(|i| format!("user{i}")).collect();
        let mut values: Vec<Option<&str>> = users.iter().map(|u| Some(u.as_str())).collect();
        values.push(Some("user3"));

        let top = top_values(values, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].value, "user3");
        assert_eq!(top[0].count, 2);
        assert_eq!(top[1].value, "user0");
    }

    #[test]
    fn empty_input_yields_empty_counts() {
        assert!(value_counts(std::iter::empty()).is_empty());
    }
}
