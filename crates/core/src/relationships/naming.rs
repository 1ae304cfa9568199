//! Reference naming conventions
//!
//! Pluralization is deliberately simple: exact, `+s`, `+es` and `-s`.
//! Irregular plurals (`person` / `people`) are not resolved.

use std::collections::HashMap;

/// Singular suffixes, checked after the plural ones
const SINGLE_SUFFIXES: [&str; 3] = ["_id", "Id", "ID"];

/// Suffixes naming an array of references
const MANY_SUFFIXES: [&str; 2] = ["_ids", "Ids"];

/// Stem of a reference-style field name
///
/// `author_id` → `author`, `customerId` → `customer`, `tag_ids` → `tag`.
/// Camel-case suffixes only count after a lowercase letter or digit, so
/// `UUID` and `GUID` are not references. Returns `None` when the name
/// carries no id suffix or nothing precedes it.
pub fn reference_stem(field_name: &str) -> Option<&str> {
    MANY_SUFFIXES
        .iter()
        .chain(SINGLE_SUFFIXES.iter())
        .find_map(|suffix| {
            let stem = field_name.strip_suffix(suffix)?;
            let camel = suffix.starts_with(|c: char| c.is_ascii_uppercase());
            if camel && !stem.ends_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()) {
                return None;
            }
            Some(stem)
        })
        .map(|stem| stem.trim_end_matches('_'))
        .filter(|stem| !stem.is_empty())
}

/// `orderItem` → `order_item`
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (idx, ch) in name.char_indices() {
        if ch.is_uppercase() {
            if idx > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Collection names a stem may refer to, in resolution order, lowercased
pub fn candidate_names(stem: &str) -> Vec<String> {
    let mut variants = vec![stem.to_lowercase()];
    if stem.chars().any(char::is_uppercase) {
        variants.push(to_snake_case(stem));
    }

    let mut candidates: Vec<String> = Vec::new();
    for variant in variants {
        let mut forms = vec![
            variant.clone(),
            format!("{variant}s"),
            format!("{variant}es"),
        ];
        if let Some(singular) = variant.strip_suffix('s').filter(|s| !s.is_empty()) {
            forms.push(singular.to_string());
        }
        for form in forms {
            if !candidates.contains(&form) {
                candidates.push(form);
            }
        }
    }
    candidates
}

/// Case-insensitive lookup of collection names
#[derive(Debug, Clone, Default)]
pub struct CollectionIndex {
    by_lowercase: HashMap<String, String>,
}

impl CollectionIndex {
    /// Index the given names; on case-insensitive clashes the first wins
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut by_lowercase = HashMap::new();
        for name in names {
            by_lowercase
                .entry(name.to_lowercase())
                .or_insert_with(|| name.to_string());
        }
        Self { by_lowercase }
    }

    /// Look up a collection ignoring case
    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_lowercase.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Collections matching `stem`, in resolution order without duplicates
    pub fn resolve(&self, stem: &str) -> Vec<String> {
        let mut resolved: Vec<String> = Vec::new();
        for candidate in candidate_names(stem) {
            if let Some(name) = self.get(&candidate) {
                if !resolved.iter().any(|r| r == name) {
                    resolved.push(name.to_string());
                }
            }
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_stem() {
        assert_eq!(reference_stem("author_id"), Some("author"));
        assert_eq!(reference_stem("customerId"), Some("customer"));
        assert_eq!(reference_stem("userID"), Some("user"));
        assert_eq!(reference_stem("tag_ids"), Some("tag"));
        assert_eq!(reference_stem("memberIds"), Some("member"));
        assert_eq!(reference_stem("_id"), None);
        assert_eq!(reference_stem("id"), None);
        assert_eq!(reference_stem("paid"), None);
        assert_eq!(reference_stem("name"), None);
    }

    #[test]
    fn test_uppercase_acronyms_are_not_references() {
        assert_eq!(reference_stem("UUID"), None);
        assert_eq!(reference_stem("GUID"), None);
        assert_eq!(reference_stem("deviceUUID"), None);
        assert_eq!(reference_stem("ID"), None);
        assert_eq!(reference_stem("userID"), Some("user"));
        assert_eq!(reference_stem("item2Id"), Some("item2"));
        assert_eq!(reference_stem("USER_ID"), None);
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("orderItem"), "order_item");
        assert_eq!(to_snake_case("user"), "user");
        assert_eq!(to_snake_case("HTTPRequest"), "h_t_t_p_request");
    }

    #[test]
    fn test_candidate_names() {
        assert_eq!(
            candidate_names("author"),
            vec!["author", "authors", "authores"]
        );
        assert_eq!(
            candidate_names("address"),
            vec!["address", "addresss", "addresses", "addres"]
        );
        assert_eq!(
            candidate_names("orderItem"),
            vec![
                "orderitem",
                "orderitems",
                "orderitemes",
                "order_item",
                "order_items",
                "order_itemes"
            ]
        );
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let index = CollectionIndex::new(["Authors", "posts", "order_items"]);
        assert_eq!(index.resolve("author"), vec!["Authors"]);
        assert_eq!(index.resolve("orderItem"), vec!["order_items"]);
        assert!(index.resolve("comment").is_empty());
    }

    #[test]
    fn test_resolve_multiple_candidates_in_order() {
        let index = CollectionIndex::new(["users", "user"]);
        assert_eq!(index.resolve("user"), vec!["user", "users"]);
    }

    #[test]
    fn test_first_name_wins_on_case_clash() {
        let index = CollectionIndex::new(["Users", "users"]);
        assert_eq!(index.get("USERS"), Some("Users"));
    }
}
