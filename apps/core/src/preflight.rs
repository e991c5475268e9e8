//! Preflight Check System
//!
//! Verifies the configuration and the knowledge base before the assistant starts
//! answering. Failures block startup; warnings are only reported.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{info, warn};
use validator::Validate;

use crate::brain::{IntentMatcher, MatchKind};
use crate::config::AssistantConfig;

/// Query that should never be close to any real question.
const GIBBERISH_PROBE: &str = "zzqxj vvkwpf 0x7e3 qqqq";

/// Severity of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckLevel {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub level: CheckLevel,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            level: CheckLevel::Pass,
            message: message.to_string(),
            details: None,
        }
    }

    fn warn(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            level: CheckLevel::Warn,
            message: message.to_string(),
            details,
        }
    }

    fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            level: CheckLevel::Fail,
            message: message.to_string(),
            details,
        }
    }
}

/// Complete preflight check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
    pub ready_to_start: bool,
    pub duration_ms: u64,
    pub summary: String,
}

/// Runs every check against `config` and the matcher built from it.
pub fn run_preflight_checks(config: &AssistantConfig, matcher: &IntentMatcher) -> PreflightReport {
    info!("Running preflight checks");
    let start = Instant::now();

    let checks = vec![
        check_config(config),
        check_knowledge_size(matcher),
        check_shadowed_variants(matcher),
        check_self_test(matcher),
        check_fallback(matcher),
    ];

    for check in &checks {
        match check.level {
            CheckLevel::Pass => info!("  ✓ {}: {}", check.name, check.message),
            CheckLevel::Warn => warn!("  ! {}: {}", check.name, check.message),
            CheckLevel::Fail => warn!("  ✗ {}: {}", check.name, check.message),
        }
    }

    let failed = checks.iter().filter(|c| c.level == CheckLevel::Fail).count();
    let warned = checks.iter().filter(|c| c.level == CheckLevel::Warn).count();
    let ready_to_start = failed == 0;
    let summary = format!(
        "{} checks, {} failed, {} warnings",
        checks.len(),
        failed,
        warned
    );

    PreflightReport {
        checks,
        ready_to_start,
        duration_ms: start.elapsed().as_millis() as u64,
        summary,
    }
}

fn check_config(config: &AssistantConfig) -> CheckResult {
    match config.validate() {
        Ok(()) => CheckResult::pass("config", "Configuration is valid"),
        Err(e) => CheckResult::fail("config", "Configuration is invalid", Some(e.to_string())),
    }
}

fn check_knowledge_size(matcher: &IntentMatcher) -> CheckResult {
    let stats = matcher.knowledge().stats();
    if stats.variants == 0 {
        return CheckResult::fail("knowledge", "Knowledge base is empty", None);
    }
    CheckResult::pass(
        "knowledge",
        &format!(
            "{} categories, {} entries, {} variants",
            stats.categories, stats.entries, stats.variants
        ),
    )
}

fn check_shadowed_variants(matcher: &IntentMatcher) -> CheckResult {
    let shadowed = matcher.knowledge().shadowed_variants();
    if shadowed.is_empty() {
        return CheckResult::pass("shadowing", "Every variant reaches its own entry");
    }

    let details = shadowed
        .iter()
        .map(|s| format!("'{}' answered by '{}'", s.variant, s.shadowed_by))
        .collect::<Vec<_>>()
        .join(", ");
    CheckResult::warn(
        "shadowing",
        &format!("{} variants are shadowed by earlier entries", shadowed.len()),
        Some(details),
    )
}

/// Ask every variant verbatim through the configured matcher and check it gets
/// its own answer back. Shadowed variants are reported separately and skipped.
fn check_self_test(matcher: &IntentMatcher) -> CheckResult {
    let shadowed: HashSet<String> = matcher
        .knowledge()
        .shadowed_variants()
        .into_iter()
        .map(|s| s.variant)
        .collect();

    let misses: Vec<&str> = matcher
        .knowledge()
        .pairs()
        .iter()
        .filter(|pair| !shadowed.contains(&pair.variant))
        .filter(|pair| matcher.find_answer(&pair.variant) != pair.answer)
        .map(|pair| pair.variant.as_str())
        .collect();

    if misses.is_empty() {
        CheckResult::pass("self_test", "Every variant answers with its own entry")
    } else {
        CheckResult::fail(
            "self_test",
            &format!("{} variants resolve to the wrong answer", misses.len()),
            Some(misses.join(", ")),
        )
    }
}

fn check_fallback(matcher: &IntentMatcher) -> CheckResult {
    let result = matcher.match_query(GIBBERISH_PROBE);
    if result.kind == MatchKind::Fallback {
        CheckResult::pass("fallback", "Unrelated input gets the fallback answer")
    } else {
        CheckResult::warn(
            "fallback",
            "Unrelated input matched an entry; the threshold may be too loose",
            result.variant,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::{KnowledgeBase, KnowledgeCategory, KnowledgeEntry};
    use std::sync::Arc;

    fn matcher_for(entries: Vec<KnowledgeEntry>) -> IntentMatcher {
        let kb = KnowledgeBase::from_categories(vec![KnowledgeCategory {
            name: "test".to_string(),
            entries,
        }])
        .unwrap();
        IntentMatcher::new(Arc::new(kb))
    }

    #[test]
    fn test_embedded_corpus_is_ready() {
        let config = AssistantConfig::default();
        let matcher = config.build_matcher(Arc::new(KnowledgeBase::embedded().unwrap()));
        let report = run_preflight_checks(&config, &matcher);

        assert!(report.ready_to_start, "{:?}", report.checks);
        assert!(report.checks.iter().all(|c| c.level == CheckLevel::Pass));
        assert_eq!(report.checks.len(), 5);
    }

    #[test]
    fn test_shadowing_is_a_warning() {
        let matcher = matcher_for(vec![
            KnowledgeEntry {
                variants: vec!["hi".into()],
                answer: "greeting".into(),
            },
            KnowledgeEntry {
                variants: vec!["what is this".into()],
                answer: "thing".into(),
            },
        ]);
        let report = run_preflight_checks(&AssistantConfig::default(), &matcher);

        let shadowing = report.checks.iter().find(|c| c.name == "shadowing").unwrap();
        assert_eq!(shadowing.level, CheckLevel::Warn);
        assert!(shadowing.details.as_deref().unwrap().contains("what is this"));
        // A shadowed variant still resolves by containment, just to another entry.
        assert!(report.ready_to_start);
    }

    #[test]
    fn test_invalid_config_blocks_start() {
        let config = AssistantConfig {
            match_threshold: 2.0,
            ..AssistantConfig::default()
        };
        let matcher = config.build_matcher(Arc::new(KnowledgeBase::embedded().unwrap()));
        let report = run_preflight_checks(&config, &matcher);

        assert!(!report.ready_to_start);
        assert!(report.summary.contains("1 failed"));
    }

    #[test]
    fn test_loose_threshold_warns_on_fallback_probe() {
        let matcher = matcher_for(vec![KnowledgeEntry {
            variants: vec!["hello".into()],
            answer: "greeting".into(),
        }])
        .with_threshold(1.01);
        let report = run_preflight_checks(&AssistantConfig::default(), &matcher);

        let fallback = report.checks.iter().find(|c| c.name == "fallback").unwrap();
        assert_eq!(fallback.level, CheckLevel::Warn);
    }

    #[test]
    fn test_tiny_input_cap_fails_self_test() {
        let matcher = matcher_for(vec![
            KnowledgeEntry {
                variants: vec!["what is your name".into()],
                answer: "identity".into(),
            },
            KnowledgeEntry {
                variants: vec!["what is rust".into()],
                answer: "rust".into(),
            },
        ])
        .with_max_input_chars(5);
        let report = run_preflight_checks(&AssistantConfig::default(), &matcher);

        // "what is rust" is cut to "what " and lands on the first entry.
        let self_test = report.checks.iter().find(|c| c.name == "self_test").unwrap();
        assert_eq!(self_test.level, CheckLevel::Fail);
        assert_eq!(self_test.details.as_deref(), Some("what is rust"));
        assert!(!report.ready_to_start);
    }
}
