//! Keyword filtering over (possibly nested) option lists
//!
//! Matching is a case-insensitive substring test against an option's label
//! and value. Groups are kept when they match themselves or when any
//! descendant does, at any depth; a kept group's `children`/`options` are
//! replaced by their own filtered descendants.

use crate::option::SelectOption;

/// Whether `item` matches `keyword`
///
/// An empty keyword matches everything.
pub fn matches(item: &SelectOption, keyword: &str) -> bool {
    keyword.is_empty() || matches_folded(item, &keyword.to_lowercase())
}

fn matches_folded(item: &SelectOption, folded: &str) -> bool {
    if item.label.to_lowercase().contains(folded)
        || item.value.as_text().to_lowercase().contains(folded)
    {
        return true;
    }
    item.is_group() && item.descendants().any(|child| matches_folded(child, folded))
}

/// Filter a list by keyword, rewriting kept groups to their matching descendants
///
/// Filtering with an empty keyword is the identity.
pub fn filter_list(list: &[SelectOption], keyword: &str) -> Vec<SelectOption> {
    if keyword.is_empty() {
        return list.to_vec();
    }
    filter_folded(list, &keyword.to_lowercase())
}

fn filter_folded(list: &[SelectOption], folded: &str) -> Vec<SelectOption> {
    list.iter()
        .filter(|item| matches_folded(item, folded))
        .map(|item| {
            if !item.is_group() {
                return item.clone();
            }
            SelectOption {
                children: item.children.as_deref().map(|c| filter_folded(c, folded)),
                options: item.options.as_deref().map(|o| filter_folded(o, folded)),
                ..item.clone()
            }
        })
        .collect()
}

/// Apply the `filter_option` setting
///
/// `Some(false)` means the caller filters on its own side and the list passes
/// through untouched; unset behaves like `Some(true)`.
pub fn apply_filter_option(
    list: &[SelectOption],
    keyword: Option<&str>,
    filter_option: Option<bool>,
) -> Vec<SelectOption> {
    match filter_option {
        Some(false) => list.to_vec(),
        _ => filter_list(list, keyword.unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruits() -> Vec<SelectOption> {
        vec![
            SelectOption::new("a", "Apple"),
            SelectOption::new("b", "Banana"),
        ]
    }

    #[test]
    fn test_static_list_keyword() {
        assert_eq!(filter_list(&fruits(), "an"), vec![SelectOption::new("b", "Banana")]);
    }

    #[test]
    fn test_empty_keyword_is_identity() {
        let list = vec![
            SelectOption::new("a", "Apple"),
            SelectOption::group("Nuts", vec![SelectOption::new("w", "Walnut")]),
        ];
        assert_eq!(filter_list(&list, ""), list);
    }

    #[test]
    fn test_case_insensitive_label_and_value() {
        let item = SelectOption::new("ID-42", "Answer");
        assert!(matches(&item, "ANS"));
        assert!(matches(&item, "id-4"));
        assert!(!matches(&item, "zzz"));
        assert!(matches(&SelectOption::new(42, "x"), "42"));
    }

    #[test]
    fn test_group_kept_by_single_matching_child() {
        let list = vec![SelectOption::group(
            "Fruit",
            vec![
                SelectOption::new("a", "Apple"),
                SelectOption::new("b", "Banana"),
            ],
        )];
        let filtered = filter_list(&list, "ban");
        assert_eq!(filtered.len(), 1);
        assert_eq!(
            filtered[0].children.as_deref(),
            Some(&[SelectOption::new("b", "Banana")][..])
        );
    }

    #[test]
    fn test_nested_groups_recurse() {
        let list = vec![SelectOption::group(
            "Food",
            vec![
                SelectOption::group("Veg", vec![SelectOption::new("k", "Kale")]),
                SelectOption::group("Fruit", vec![SelectOption::new("c", "Cherry")]),
            ],
        )];
        let filtered = filter_list(&list, "cher");
        let inner = filtered[0].children.as_ref().unwrap();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].label, "Fruit");
        assert_eq!(
            inner[0].children.as_deref(),
            Some(&[SelectOption::new("c", "Cherry")][..])
        );
    }

    #[test]
    fn test_group_without_matches_dropped() {
        let list = vec![SelectOption::group("Fruit", vec![SelectOption::new("a", "Apple")])];
        assert!(filter_list(&list, "kiwi").is_empty());
    }

    #[test]
    fn test_untagged_children_are_not_searched() {
        let mut parent = SelectOption::new("p", "Parent");
        parent.children = Some(vec![SelectOption::new("c", "Child")]);
        assert!(!matches(&parent, "child"));
    }

    #[test]
    fn test_filter_option_disabled_passes_through() {
        let list = fruits();
        assert_eq!(apply_filter_option(&list, Some("an"), Some(false)), list);
        assert_eq!(apply_filter_option(&list, Some("an"), None).len(), 1);
        assert_eq!(apply_filter_option(&list, None, Some(true)), list);
    }
}
