//! Knowledge base: the static corpus of question variants and their answers.
//!
//! The corpus ships inside the binary (`data/knowledge.json`) and is parsed once.
//! At construction every variant is normalized and flattened into an ordered list
//! of pairs in category -> entry -> variant order. Matching walks that list front
//! to back, so declaration order decides ties.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::AppError;

/// Corpus compiled into the binary.
static EMBEDDED_KNOWLEDGE: &str = include_str!("../../data/knowledge.json");

/// Lower-case and trim a piece of text the same way for variants and queries.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// One question with its alternate phrasings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Alternate phrasings, matched case-insensitively.
    pub variants: Vec<String>,
    /// Returned verbatim when any variant matches.
    pub answer: String,
}

/// A named group of entries (greetings, science, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeCategory {
    pub name: String,
    pub entries: Vec<KnowledgeEntry>,
}

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    categories: Vec<KnowledgeCategory>,
}

/// A flattened `(normalized variant, answer)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPair {
    pub variant: String,
    pub answer: String,
    /// Position of the owning entry across all categories.
    pub entry_id: usize,
}

/// A variant whose own exact text resolves to a different, earlier entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowedVariant {
    pub variant: String,
    pub shadowed_by: String,
}

/// Corpus size summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeStats {
    pub categories: usize,
    pub entries: usize,
    pub variants: usize,
}

/// Read-only knowledge base. Build it once and share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    categories: Vec<KnowledgeCategory>,
    pairs: Vec<VariantPair>,
}

impl KnowledgeBase {
    /// Parse the corpus compiled into the binary.
    pub fn embedded() -> Result<Self, AppError> {
        Self::from_json(EMBEDDED_KNOWLEDGE)
    }

    /// Parse a corpus from a JSON document of the form
    /// `{"categories": [{"name": ..., "entries": [{"variants": [...], "answer": ...}]}]}`.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let file: KnowledgeFile = serde_json::from_str(json)?;
        Self::from_categories(file.categories)
    }

    /// Load a corpus from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::KnowledgeBase(format!("cannot read {}: {}", path.display(), e))
        })?;
        let kb = Self::from_json(&raw)?;
        info!("Loaded knowledge base from {:?}", path);
        Ok(kb)
    }

    /// Validate the categories and flatten them into ordered pairs.
    pub fn from_categories(categories: Vec<KnowledgeCategory>) -> Result<Self, AppError> {
        let mut pairs = Vec::new();
        let mut entry_id = 0;

        for category in &categories {
            for entry in &category.entries {
                if entry.variants.is_empty() {
                    return Err(AppError::KnowledgeBase(format!(
                        "entry {} in category '{}' has no variants",
                        entry_id, category.name
                    )));
                }
                if entry.answer.trim().is_empty() {
                    return Err(AppError::KnowledgeBase(format!(
                        "entry {} in category '{}' has an empty answer",
                        entry_id, category.name
                    )));
                }

                for variant in &entry.variants {
                    let normalized = normalize(variant);
                    if normalized.is_empty() {
                        return Err(AppError::KnowledgeBase(format!(
                            "entry {} in category '{}' has an empty variant",
                            entry_id, category.name
                        )));
                    }
                    pairs.push(VariantPair {
                        variant: normalized,
                        answer: entry.answer.clone(),
                        entry_id,
                    });
                }
                entry_id += 1;
            }
        }

        if pairs.is_empty() {
            return Err(AppError::KnowledgeBase(
                "knowledge base contains no entries".to_string(),
            ));
        }

        let kb = Self { categories, pairs };
        let stats = kb.stats();
        debug!(
            categories = stats.categories,
            entries = stats.entries,
            variants = stats.variants,
            "Knowledge base built"
        );
        Ok(kb)
    }

    /// Flattened pairs in declaration order.
    pub fn pairs(&self) -> &[VariantPair] {
        &self.pairs
    }

    pub fn categories(&self) -> &[KnowledgeCategory] {
        &self.categories
    }

    pub fn stats(&self) -> KnowledgeStats {
        KnowledgeStats {
            categories: self.categories.len(),
            entries: self.categories.iter().map(|c| c.entries.len()).sum(),
            variants: self.pairs.len(),
        }
    }

    /// Variants that can never be answered for their own exact text because an
    /// earlier variant of another entry wins the containment pass first.
    ///
    /// Quadratic in the number of variants; meant for preflight and tests, not
    /// for the request path.
    pub fn shadowed_variants(&self) -> Vec<ShadowedVariant> {
        let mut shadowed = Vec::new();

        for (index, pair) in self.pairs.iter().enumerate() {
            let winner = self.pairs[..index].iter().find(|earlier| {
                pair.variant.contains(earlier.variant.as_str())
                    || earlier.variant.contains(pair.variant.as_str())
            });

            if let Some(earlier) = winner {
                if earlier.entry_id != pair.entry_id && earlier.answer != pair.answer {
                    shadowed.push(ShadowedVariant {
                        variant: pair.variant.clone(),
                        shadowed_by: earlier.variant.clone(),
                    });
                }
            }
        }

        shadowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(variants: &[&str], answer: &str) -> KnowledgeEntry {
        KnowledgeEntry {
            variants: variants.iter().map(|v| v.to_string()).collect(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  What Is RUST?  "), "what is rust?");
        assert_eq!(normalize("\t\n"), "");
    }

    #[test]
    fn test_embedded_corpus_loads() {
        let kb = KnowledgeBase::embedded().unwrap();
        let stats = kb.stats();
        assert_eq!(stats.categories, 6);
        assert!(stats.entries > 40);
        assert_eq!(stats.variants, kb.pairs().len());
    }

    #[test]
    fn test_flattening_preserves_declaration_order() {
        let kb = KnowledgeBase::from_categories(vec![
            KnowledgeCategory {
                name: "first".to_string(),
                entries: vec![entry(&["Alpha", " BETA "], "a"), entry(&["gamma"], "g")],
            },
            KnowledgeCategory {
                name: "second".to_string(),
                entries: vec![entry(&["delta"], "d")],
            },
        ])
        .unwrap();

        let variants: Vec<&str> = kb.pairs().iter().map(|p| p.variant.as_str()).collect();
        assert_eq!(variants, vec!["alpha", "beta", "gamma", "delta"]);

        let entry_ids: Vec<usize> = kb.pairs().iter().map(|p| p.entry_id).collect();
        assert_eq!(entry_ids, vec![0, 0, 1, 2]);
        assert_eq!(kb.stats().entries, 3);
    }

    #[test]
    fn test_rejects_blank_variant() {
        let result = KnowledgeBase::from_categories(vec![KnowledgeCategory {
            name: "broken".to_string(),
            entries: vec![entry(&["ok", "   "], "answer")],
        }]);
        assert!(matches!(result, Err(AppError::KnowledgeBase(_))));
    }

    #[test]
    fn test_rejects_entry_without_variants() {
        let result = KnowledgeBase::from_categories(vec![KnowledgeCategory {
            name: "broken".to_string(),
            entries: vec![entry(&[], "answer")],
        }]);
        assert!(matches!(result, Err(AppError::KnowledgeBase(_))));
    }

    #[test]
    fn test_rejects_empty_corpus() {
        assert!(KnowledgeBase::from_categories(vec![]).is_err());
        assert!(KnowledgeBase::from_json(r#"{"categories": []}"#).is_err());
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        let result = KnowledgeBase::from_json(r#"{"entries": []}"#);
        assert!(matches!(result, Err(AppError::KnowledgeBase(_))));
    }

    #[test]
    fn test_shadowed_variants_detected() {
        let kb = KnowledgeBase::from_categories(vec![KnowledgeCategory {
            name: "greetings".to_string(),
            entries: vec![
                entry(&["hi"], "greeting"),
                entry(&["what is this"], "thing"),
            ],
        }])
        .unwrap();

        // "this" contains "hi", so the greeting always wins.
        let shadowed = kb.shadowed_variants();
        assert_eq!(shadowed.len(), 1);
        assert_eq!(shadowed[0].variant, "what is this");
        assert_eq!(shadowed[0].shadowed_by, "hi");
    }

    #[test]
    fn test_same_entry_variants_do_not_shadow() {
        let kb = KnowledgeBase::from_categories(vec![KnowledgeCategory {
            name: "greetings".to_string(),
            entries: vec![entry(&["hey", "hey there"], "greeting")],
        }])
        .unwrap();
        assert!(kb.shadowed_variants().is_empty());
    }

    #[test]
    fn test_embedded_corpus_has_no_shadowed_variants() {
        let kb = KnowledgeBase::embedded().unwrap();
        assert_eq!(kb.shadowed_variants(), vec![]);
    }
}
