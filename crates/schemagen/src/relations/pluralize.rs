//! English pluralization tuned for table names.

/// Singular → plural forms that don't follow the suffix rules.
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
    ("class", "classes"),
];

/// Words whose plural is the word itself.
const UNCOUNTABLE: &[&str] = &[
    "curriculum",
    "data",
    "information",
    "equipment",
    "series",
    "species",
    "news",
    "sheep",
    "fish",
    "deer",
];

/// Pluralizes a snake_case name. Only the last segment is inflected, so
/// `grand_child` becomes `grand_children`.
///
/// Irregular and uncountable words come first. Otherwise a trailing `y`
/// becomes `ies`, `s`/`x`/`z`/`ch`/`sh` take `es`, and anything else takes
/// `s`. The rules apply to already-plural table names too.
pub fn pluralize(word: &str) -> String {
    match word.rsplit_once('_') {
        Some((head, tail)) if !tail.is_empty() => format!("{}_{}", head, pluralize_word(tail)),
        _ => pluralize_word(word),
    }
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_ascii_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return (*plural).to_string();
    }

    if lower.ends_with('y') {
        return format!("{}ies", &word[..word.len() - 1]);
    }

    const ES_SUFFIXES: &[&str] = &["s", "x", "z", "ch", "sh"];
    if ES_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{}es", word);
    }

    format!("{}s", word)
}

/// Finds the table a singular base name refers to.
///
/// Candidates are tried in order: `pluralize(base)`, `base`, `base + "s"`.
/// The first candidate naming an existing table wins.
pub fn resolve_table<'a>(base: &str, tables: &'a [String]) -> Option<&'a str> {
    if base.is_empty() {
        return None;
    }

    let candidates = [pluralize(base), base.to_string(), format!("{}s", base)];
    candidates
        .iter()
        .find_map(|candidate| tables.iter().find(|t| *t == candidate))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irregular_and_uncountable() {
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("class"), "classes");
        assert_eq!(pluralize("curriculum"), "curriculum");
        assert_eq!(pluralize("sheep"), "sheep");
    }

    #[test]
    fn test_y_becomes_ies() {
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "daies");
    }

    #[test]
    fn test_sibilants_take_es() {
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("analysis"), "analysises");
        assert_eq!(pluralize("users"), "userses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("quiz"), "quizes");
        assert_eq!(pluralize("match"), "matches");
        assert_eq!(pluralize("wish"), "wishes");
    }

    #[test]
    fn test_everything_else_takes_s() {
        assert_eq!(pluralize("photo"), "photos");
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("children"), "childrens");
    }

    #[test]
    fn test_compound_names_inflect_last_segment() {
        assert_eq!(pluralize("grand_child"), "grand_children");
        assert_eq!(pluralize("line_item"), "line_items");
    }

    #[test]
    fn test_resolve_table_candidates() {
        let tables: Vec<String> = ["children", "classes", "curriculum", "staff"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(resolve_table("child", &tables), Some("children"));
        assert_eq!(resolve_table("class", &tables), Some("classes"));
        assert_eq!(resolve_table("curriculum", &tables), Some("curriculum"));
        assert_eq!(resolve_table("staff", &tables), Some("staff"));
        assert_eq!(resolve_table("tutor", &tables), None);
        assert_eq!(resolve_table("", &tables), None);
    }
}
