//! Column category classification.
//!
//! Categories are inferred from column names only. Each [`CategoryRule`]
//! carries keywords, optional coordinate patterns and the palette used to
//! highlight columns of that category. Scoring weights:
//!
//! | Match | Weight |
//! |-------|--------|
//! | keyword found in the joined names and in a column name | +2 |
//! | a name token (3+ chars) is a prefix of the keyword | +1 |
//! | coordinate pattern found in the joined names | +3 |
//!
//! The best table-level rule decides which columns are highlight candidates;
//! every column is then scored on its own to get its category. This is a
//! heuristic. Ambiguous names may be miscategorized, which is not an error.

use serde::Deserialize;

use crate::dataset::TabularDataset;
use crate::error::{Result, TableError};

/// Name of the catch-all category.
pub const GENERAL: &str = "general";

/// Palette used for `general` when the registry does not name one.
pub const GENERAL_PALETTE: &str = "grays_cool";

/// Shortest name token that counts as a weak keyword match.
const WEAK_TOKEN_MIN: usize = 3;

/// A named scoring rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub coordinate_patterns: Vec<String>,
    /// Default highlight palette for columns of this category.
    pub palette: String,
}

impl CategoryRule {
    pub fn new(name: impl Into<String>, palette: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keywords: Vec::new(),
            coordinate_patterns: Vec::new(),
            palette: palette.into(),
        }
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn coordinate_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.coordinate_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    fn is_general(&self) -> bool {
        self.name == GENERAL
    }

    /// Scores lower-cased names. Returns the score and which names matched.
    fn score(&self, names: &[String]) -> (u32, Vec<bool>) {
        let joined = names.join(" ");
        let mut score = 0;
        let mut matched = vec![false; names.len()];

        for keyword in &self.keywords {
            let keyword = keyword.to_lowercase();
            if keyword.is_empty() {
                continue;
            }
            let strong: Vec<usize> = (0..names.len())
                .filter(|&i| names[i].contains(&keyword))
                .collect();
            if joined.contains(&keyword) && !strong.is_empty() {
                score += 2;
                strong.iter().for_each(|&i| matched[i] = true);
                continue;
            }
            let weak: Vec<usize> = (0..names.len())
                .filter(|&i| weak_match(&names[i], &keyword))
                .collect();
            if !weak.is_empty() {
                score += 1;
                weak.iter().for_each(|&i| matched[i] = true);
            }
        }

        for pattern in &self.coordinate_patterns {
            let pattern = pattern.to_lowercase();
            if pattern.is_empty() || !joined.contains(&pattern) {
                continue;
            }
            score += 3;
            for (i, name) in names.iter().enumerate() {
                if name.contains(&pattern) {
                    matched[i] = true;
                }
            }
        }

        (score, matched)
    }
}

fn weak_match(name: &str, keyword: &str) -> bool {
    name.split(|c: char| !c.is_alphanumeric())
        .any(|token| token.chars().count() >= WEAK_TOKEN_MIN && keyword.starts_with(token))
}

/// Ordered category rules. Always holds a `general` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRegistry {
    rules: Vec<CategoryRule>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CategoryRegistry {
    /// Builds a registry, appending `general` if the rules lack one.
    pub fn new(mut rules: Vec<CategoryRule>) -> Self {
        if !rules.iter().any(CategoryRule::is_general) {
            rules.push(CategoryRule::new(GENERAL, GENERAL_PALETTE));
        }
        Self { rules }
    }

    /// Parses a YAML sequence of rules.
    pub fn from_yaml(origin: &str, yaml: &str) -> Result<Self> {
        let rules: Vec<CategoryRule> =
            serde_yaml::from_str(yaml).map_err(|e| TableError::config(origin, e))?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&CategoryRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Highlight palette of a category.
    pub fn palette_for(&self, category: &str) -> Option<&str> {
        self.get(category).map(|r| r.palette.as_str())
    }

    fn scoring_rules(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter().filter(|r| !r.is_general())
    }

    /// Best scoring rule, first registered wins ties. `None` if nothing scores.
    fn best(&self, names: &[String]) -> Option<(&CategoryRule, Vec<bool>)> {
        let mut best: Option<(&CategoryRule, u32, Vec<bool>)> = None;
        for rule in self.scoring_rules() {
            let (score, matched) = rule.score(names);
            if score == 0 {
                continue;
            }
            if best.as_ref().map_or(true, |(_, top, _)| score > *top) {
                best = Some((rule, score, matched));
            }
        }
        best.map(|(rule, _, matched)| (rule, matched))
    }
}

/// Result of classifying a set of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Winning table-level category, or `general`.
    pub table_category: String,
    /// Category per column, in column order.
    pub columns: Vec<String>,
    /// Highlight candidate flag per column, in column order.
    pub highlight: Vec<bool>,
}

impl Classification {
    pub fn category(&self, index: usize) -> &str {
        self.columns.get(index).map_or(GENERAL, String::as_str)
    }

    pub fn is_candidate(&self, index: usize) -> bool {
        self.highlight.get(index).copied().unwrap_or(false)
    }

    /// Indices of the highlight candidates.
    pub fn candidates(&self) -> impl Iterator<Item = usize> + '_ {
        self.highlight
            .iter()
            .enumerate()
            .filter_map(|(i, &h)| h.then_some(i))
    }
}

/// Classifies the columns of a dataset.
pub fn classify(dataset: &TabularDataset, registry: &CategoryRegistry) -> Classification {
    classify_names(dataset.columns(), registry)
}

/// Classifies bare column names.
///
/// ```rust
/// use tabula_render::classify::{classify_names, CategoryRegistry, CategoryRule};
///
/// let registry = CategoryRegistry::new(vec![
///     CategoryRule::new("forces", "reds").keywords(["force", "load"]),
/// ]);
/// let result = classify_names(&["Load_kN", "Comment"], &registry);
/// assert_eq!(result.columns, vec!["forces", "general"]);
/// assert_eq!(result.highlight, vec![true, false]);
/// ```
pub fn classify_names<S: AsRef<str>>(names: &[S], registry: &CategoryRegistry) -> Classification {
    let lowered: Vec<String> = names.iter().map(|n| n.as_ref().to_lowercase()).collect();

    let Some((winner, highlight)) = registry.best(&lowered) else {
        return Classification {
            table_category: GENERAL.to_string(),
            columns: vec![GENERAL.to_string(); lowered.len()],
            highlight: vec![false; lowered.len()],
        };
    };

    let columns = lowered
        .iter()
        .map(|name| {
            registry
                .best(std::slice::from_ref(name))
                .map_or_else(|| GENERAL.to_string(), |(rule, _)| rule.name.clone())
        })
        .collect();

    Classification {
        table_category: winner.name.clone(),
        columns,
        highlight,
    }
}
