//! Saved product ids ("favorites").
//!
//! Insertion-ordered and de-duplicated. Ids are not checked against the
//! catalog here; stale ids simply resolve to nothing when rendered.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    ids: Vec<String>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds from a stored list, dropping blanks and repeats.
    pub fn from_ids(ids: Vec<String>) -> Self {
        let mut favorites = Favorites::new();
        for id in ids {
            if !id.trim().is_empty() && !favorites.contains(&id) {
                favorites.ids.push(id);
            }
        }
        favorites
    }

    /// Adds or removes `id`. Returns `true` if it is now a favorite.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(position) = self.ids.iter().position(|saved| saved == id) {
            self.ids.remove(position);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|saved| saved == id)
    }

    pub fn list(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut favorites = Favorites::new();
        assert!(favorites.toggle("IP5"));
        assert!(favorites.toggle("WA3"));
        assert!(favorites.contains("IP5"));

        assert!(!favorites.toggle("IP5"));
        assert!(!favorites.contains("IP5"));
        assert_eq!(favorites.list(), ["WA3"]);
    }

    #[test]
    fn test_from_ids_dedupes() {
        let favorites = Favorites::from_ids(vec![
            "A".to_string(),
            "B".to_string(),
            "A".to_string(),
            " ".to_string(),
        ]);
        assert_eq!(favorites.list(), ["A", "B"]);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let favorites = Favorites::from_ids(vec!["KLOW".to_string()]);
        assert_eq!(serde_json::to_string(&favorites).unwrap(), r#"["KLOW"]"#);
    }
}
