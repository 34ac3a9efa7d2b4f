//! Exercise catalogs and filtering.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, Exercise};

/// A named collection of exercises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Unique identifier for this catalog.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

/// Narrows a catalog by category, technique, and difficulty.
///
/// An absent field, or the value `"All"`, matches everything.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub technique: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl CatalogFilter {
    pub fn matches(&self, exercise: &Exercise) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &str) -> bool {
            match wanted.as_deref() {
                None => true,
                Some(w) if w.eq_ignore_ascii_case("all") => true,
                Some(w) => w == actual,
            }
        }

        field_matches(&self.category, &exercise.category)
            && field_matches(&self.technique, &exercise.technique)
            && self.difficulty.map_or(true, |d| d == exercise.difficulty)
    }
}

impl Catalog {
    /// Look up an exercise by id.
    pub fn find(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Exercises matching `filter`, in catalog order.
    pub fn filter(&self, filter: &CatalogFilter) -> Vec<&Exercise> {
        self.exercises.iter().filter(|e| filter.matches(e)).collect()
    }

    /// Sorted, distinct categories.
    pub fn categories(&self) -> Vec<String> {
        self.distinct(|e| &e.category)
    }

    /// Sorted, distinct techniques.
    pub fn techniques(&self) -> Vec<String> {
        self.distinct(|e| &e.technique)
    }

    fn distinct(&self, key: impl Fn(&Exercise) -> &String) -> Vec<String> {
        self.exercises
            .iter()
            .map(key)
            .filter(|v| !v.is_empty())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Find an exercise by id across several catalogs. The first match wins.
pub fn find_exercise<'a>(catalogs: &'a [Catalog], id: &str) -> Option<&'a Exercise> {
    catalogs.iter().find_map(|c| c.find(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExerciseKind;
    use std::collections::BTreeMap;

    fn exercise(id: &str, category: &str, technique: &str, difficulty: Difficulty) -> Exercise {
        Exercise {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            difficulty,
            category: category.into(),
            technique: technique.into(),
            scenario: String::new(),
            input_data: String::new(),
            expected_output: "expected".into(),
            keywords: vec![],
            patterns: vec![],
            max_tokens: 50,
            example_output: String::new(),
            hints: vec![],
            kind: ExerciseKind::Normal,
            ai_eval_metrics: BTreeMap::new(),
            ai_eval_criteria: BTreeMap::new(),
            time_limit_secs: None,
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            id: "test".into(),
            name: "Test".into(),
            description: String::new(),
            exercises: vec![
                exercise("a", "Writing", "Few-shot", Difficulty::Easy),
                exercise("b", "Coding", "Chain-of-Thought", Difficulty::Hard),
                exercise("c", "Writing", "Chain-of-Thought", Difficulty::Medium),
            ],
        }
    }

    #[test]
    fn find_by_id() {
        let catalog = catalog();
        assert_eq!(catalog.find("b").map(|e| e.category.as_str()), Some("Coding"));
        assert!(catalog.find("zzz").is_none());
    }

    #[test]
    fn empty_filter_matches_all() {
        assert_eq!(catalog().filter(&CatalogFilter::default()).len(), 3);
    }

    #[test]
    fn all_keyword_matches_everything() {
        let filter = CatalogFilter {
            category: Some("All".into()),
            technique: Some("all".into()),
            difficulty: None,
        };
        assert_eq!(catalog().filter(&filter).len(), 3);
    }

    #[test]
    fn filters_combine() {
        let catalog = catalog();
        let filter = CatalogFilter {
            category: Some("Writing".into()),
            technique: Some("Chain-of-Thought".into()),
            difficulty: None,
        };
        let ids: Vec<&str> = catalog.filter(&filter).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);

        let filter = CatalogFilter {
            difficulty: Some(Difficulty::Easy),
            ..Default::default()
        };
        let ids: Vec<&str> = catalog.filter(&filter).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn distinct_options_are_sorted() {
        let catalog = catalog();
        assert_eq!(catalog.categories(), vec!["Coding", "Writing"]);
        assert_eq!(catalog.techniques(), vec!["Chain-of-Thought", "Few-shot"]);
    }

    #[test]
    fn find_across_catalogs() {
        let mut other = catalog();
        other.exercises = vec![exercise("z", "Misc", "Zero-shot", Difficulty::Easy)];
        let catalogs = vec![catalog(), other];
        assert_eq!(find_exercise(&catalogs, "z").map(|e| e.id.as_str()), Some("z"));
        assert!(find_exercise(&catalogs, "missing").is_none());
    }
}
