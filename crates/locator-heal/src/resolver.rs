//! Tiered resolution with fallback-chain orchestration
//!
//! Tiers run in strict priority order, each either terminal success or
//! fallthrough: memory, declared, suggested, heuristic. Cheaper and
//! more trustworthy sources are always consulted before expensive,
//! lower-confidence ones, and failures inside a tier are recovered by
//! falling through - only total exhaustion propagates.

use std::sync::Arc;

use dom_scanner::{DomScanner, ScannedElement};
use driver_adapter::SharedDriver;
use healbrowser_core_types::{
    DomElementDescriptor, ElementHandle, Locator, LogicalKey, TargetDescription,
};
use locator_memory::SharedLocatorMemory;
use suggest_bridge::{SuggestionProvider, SuggestionRequest};
use tracing::{debug, info, warn};

use crate::{
    builder::build_locator,
    errors::HealError,
    scorer::find_best_match,
    types::{MatchResult, ResolutionTier, ResolveOptions},
};

/// The resolution engine
///
/// Holds the driver boundary, the learned-locator store, the snapshot
/// scanner, and an optional suggestion oracle. One resolution runs to
/// completion before the next; for a fixed DOM state and fixed memory
/// content the outcome is deterministic.
pub struct HealingFinder {
    driver: SharedDriver,
    memory: SharedLocatorMemory,
    scanner: DomScanner,
    suggester: Option<Arc<dyn SuggestionProvider>>,
    options: ResolveOptions,
}

impl HealingFinder {
    pub fn new(driver: SharedDriver, memory: SharedLocatorMemory) -> Self {
        Self {
            scanner: DomScanner::new(driver.clone()),
            driver,
            memory,
            suggester: None,
            options: ResolveOptions::default(),
        }
    }

    /// Wire in a suggestion oracle. The engine behaves identically for
    /// the other tiers whether or not one is present.
    pub fn with_suggester(mut self, suggester: Arc<dyn SuggestionProvider>) -> Self {
        self.suggester = Some(suggester);
        self
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve the element for `key`, walking the fallback chain. On
    /// any success below the memory tier the winning locator is
    /// remembered before returning.
    pub async fn resolve(
        &self,
        key: &LogicalKey,
        target: &TargetDescription,
        declared: &[Locator],
    ) -> Result<MatchResult, HealError> {
        let mut attempts: Vec<String> = Vec::new();
        let mut ambiguous_memory: Option<MatchResult> = None;

        // Tier 1: learned memory. A unique live match short-circuits
        // everything; an ambiguous one is held at reduced confidence
        // and revalidated against the later tiers first.
        if let Some(locator) = self.memory.lookup(key) {
            attempts.push(format!("memory:{locator}"));
            let matches = self.live_matches(&locator).await;
            match matches.len() {
                1 => {
                    debug!(%key, %locator, "learned locator matched");
                    return Ok(MatchResult::new(
                        locator,
                        matches[0],
                        1.0,
                        ResolutionTier::Memory,
                    ));
                }
                0 => {
                    info!(%key, %locator, "learned locator no longer matches, falling back");
                }
                count => {
                    warn!(
                        %key, %locator, count,
                        "learned locator is ambiguous, holding first match at reduced confidence"
                    );
                    ambiguous_memory = Some(MatchResult::new(
                        locator,
                        matches[0],
                        self.options.ambiguous_memory_confidence,
                        ResolutionTier::Memory,
                    ));
                }
            }
        }

        // Tier 2: declared candidates, in caller priority order. First
        // locator with exactly one live match wins.
        for locator in declared {
            attempts.push(format!("declared:{locator}"));
            let matches = self.live_matches(locator).await;
            if matches.len() == 1 {
                info!(%key, %locator, "declared locator matched");
                self.remember(key, locator.clone());
                return Ok(MatchResult::new(
                    locator.clone(),
                    matches[0],
                    1.0,
                    ResolutionTier::Declared,
                ));
            }
            debug!(%key, %locator, count = matches.len(), "declared locator missed");
        }

        // Tier 3: suggestion oracle, when configured. One attempt, no
        // retry; any failure falls through.
        if let Some(suggester) = self.suggester.clone() {
            attempts.push(format!("suggested:{}", suggester.name()));
            if let Some(result) = self
                .try_suggestion(key, target, declared, suggester.as_ref())
                .await
            {
                self.remember(key, result.locator.clone());
                return Ok(result);
            }
        }

        // Tier 4: similarity heuristic over a fresh snapshot.
        attempts.push("heuristic:similarity".to_string());
        if let Some(result) = self.try_heuristic(key, target).await {
            self.remember(key, result.locator.clone());
            return Ok(result);
        }

        // Exhausted. An ambiguous memory hit, if held, beats failing.
        if let Some(result) = ambiguous_memory {
            warn!(%key, "accepting ambiguous learned locator at reduced confidence");
            return Ok(result);
        }

        Err(HealError::ElementNotResolved {
            key: key.clone(),
            attempts,
        })
    }

    /// Resolve and click in one step
    pub async fn click(
        &self,
        key: &LogicalKey,
        target: &TargetDescription,
        declared: &[Locator],
    ) -> Result<MatchResult, HealError> {
        let result = self.resolve(key, target, declared).await?;
        self.driver.click(result.element).await?;
        info!(%key, tier = result.tier.name(), confidence = result.confidence, "clicked element");
        Ok(result)
    }

    /// Handles of live, interactable elements matching the locator.
    /// Driver timeouts and per-query failures are misses, never fatal.
    async fn live_matches(&self, locator: &Locator) -> Vec<ElementHandle> {
        let handles = match self.driver.find_elements(locator).await {
            Ok(handles) => handles,
            Err(err) => {
                debug!(%locator, error = %err, "query treated as zero matches");
                return Vec::new();
            }
        };

        let mut live = Vec::new();
        for handle in handles {
            match self.driver.describe(handle).await {
                Ok(descriptor) if descriptor.is_interactable() => live.push(handle),
                Ok(_) => {}
                Err(err) => {
                    debug!(%handle, error = %err, "element dropped during liveness check")
                }
            }
        }
        live
    }

    async fn try_suggestion(
        &self,
        key: &LogicalKey,
        target: &TargetDescription,
        declared: &[Locator],
        suggester: &dyn SuggestionProvider,
    ) -> Option<MatchResult> {
        let scanned = self.snapshot(key).await;
        if scanned.is_empty() {
            debug!(%key, "no candidates to offer the suggestion provider");
            return None;
        }

        let request = SuggestionRequest {
            target: target.clone(),
            failed_locators: declared.to_vec(),
            candidates: scanned
                .iter()
                .map(|element| element.descriptor.clone())
                .collect(),
            dom_excerpt: self.driver.page_source().await.ok(),
        };

        let locator = match suggester.suggest(&request).await {
            Ok(Some(locator)) => locator,
            Ok(None) => {
                debug!(%key, provider = suggester.name(), "provider had no suggestion");
                return None;
            }
            Err(err) => {
                warn!(
                    %key, provider = suggester.name(), error = %err,
                    "suggestion failed, falling through"
                );
                return None;
            }
        };

        let matches = self.live_matches(&locator).await;
        if matches.len() == 1 {
            info!(%key, %locator, "suggested locator matched");
            Some(MatchResult::new(
                locator,
                matches[0],
                1.0,
                ResolutionTier::Suggested,
            ))
        } else {
            debug!(%key, %locator, count = matches.len(), "suggested locator missed");
            None
        }
    }

    async fn try_heuristic(
        &self,
        key: &LogicalKey,
        target: &TargetDescription,
    ) -> Option<MatchResult> {
        if target.is_empty() {
            debug!(%key, "no target signals, heuristic tier skipped");
            return None;
        }

        let scanned = self.snapshot(key).await;
        let descriptors: Vec<DomElementDescriptor> = scanned
            .iter()
            .map(|element| element.descriptor.clone())
            .collect();

        let Some(best) = find_best_match(target, &descriptors) else {
            debug!(%key, candidates = descriptors.len(), "no candidate above threshold");
            return None;
        };

        let winner = &scanned[best.index];
        let locator = build_locator(&winner.descriptor);
        info!(%key, %locator, score = best.score, "similarity match accepted");
        Some(MatchResult::new(
            locator,
            winner.handle,
            best.score,
            ResolutionTier::Heuristic,
        ))
    }

    async fn snapshot(&self, key: &LogicalKey) -> Vec<ScannedElement> {
        match self.scanner.scan(self.options.max_scan_candidates).await {
            Ok(scanned) => scanned,
            Err(err) => {
                warn!(%key, error = %err, "dom scan failed, treated as empty snapshot");
                Vec::new()
            }
        }
    }

    /// Persist a winning locator. A flush failure costs durability, not
    /// the resolution: log and move on.
    fn remember(&self, key: &LogicalKey, locator: Locator) {
        if let Err(err) = self.memory.remember(key, locator) {
            warn!(%key, error = %err, "failed to persist learned locator");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use driver_adapter::{FixtureDriver, FixtureElement};
    use locator_memory::LocatorMemory;
    use suggest_bridge::MockSuggestionProvider;

    fn login_page() -> Vec<FixtureElement> {
        vec![
            FixtureElement::new("input").with_id("username"),
            FixtureElement::new("input").with_id("password"),
            FixtureElement::new("button")
                .with_text("Entrar")
                .with_class("btn-primary"),
        ]
    }

    fn login_key() -> LogicalKey {
        LogicalKey::scoped("login-page", "login-button")
    }

    fn login_target() -> TargetDescription {
        TargetDescription::new().with_text("Entrar").with_tag("button")
    }

    fn finder(driver: Arc<FixtureDriver>) -> HealingFinder {
        HealingFinder::new(driver, Arc::new(LocatorMemory::in_memory()))
    }

    #[tokio::test]
    async fn test_memory_tier_wins_over_declared() {
        let driver = Arc::new(FixtureDriver::new(login_page()));
        let memory = Arc::new(LocatorMemory::in_memory());
        memory
            .remember(&login_key(), Locator::link_text("Entrar"))
            .unwrap();
        let finder = HealingFinder::new(driver, memory);

        let result = finder
            .resolve(
                &login_key(),
                &login_target(),
                &[Locator::css("button.btn-primary")],
            )
            .await
            .unwrap();

        assert_eq!(result.tier, ResolutionTier::Memory);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.locator, Locator::link_text("Entrar"));
    }

    #[tokio::test]
    async fn test_stale_memory_falls_through_to_declared() {
        let driver = Arc::new(FixtureDriver::new(login_page()));
        let memory = Arc::new(LocatorMemory::in_memory());
        memory
            .remember(&login_key(), Locator::id("login-btn"))
            .unwrap();
        let finder = HealingFinder::new(driver, memory.clone());

        let result = finder
            .resolve(
                &login_key(),
                &login_target(),
                &[Locator::css("button.btn-primary")],
            )
            .await
            .unwrap();

        assert_eq!(result.tier, ResolutionTier::Declared);
        // The working declared locator replaced the stale record.
        assert_eq!(
            memory.lookup(&login_key()),
            Some(Locator::css("button.btn-primary"))
        );
    }

    #[tokio::test]
    async fn test_declared_order_is_respected() {
        let page = vec![
            FixtureElement::new("button").with_id("a").with_text("One"),
            FixtureElement::new("button").with_id("b").with_text("Two"),
        ];
        let driver = Arc::new(FixtureDriver::new(page));
        let finder = finder(driver);

        let result = finder
            .resolve(
                &LogicalKey::new("page/first-button"),
                &TargetDescription::new(),
                &[Locator::id("b"), Locator::id("a")],
            )
            .await
            .unwrap();

        assert_eq!(result.locator, Locator::id("b"));
    }

    #[tokio::test]
    async fn test_overbroad_declared_locator_is_a_miss() {
        let page = vec![
            FixtureElement::new("button").with_class("btn").with_text("One"),
            FixtureElement::new("button").with_class("btn").with_text("Two"),
        ];
        let driver = Arc::new(FixtureDriver::new(page));
        let finder = finder(driver);

        let err = finder
            .resolve(
                &LogicalKey::new("page/some-button"),
                &TargetDescription::new(),
                &[Locator::css("button.btn")],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, HealError::ElementNotResolved { .. }));
    }

    #[tokio::test]
    async fn test_heuristic_heals_stale_declared_locator() {
        let driver = Arc::new(FixtureDriver::new(login_page()));
        let memory = Arc::new(LocatorMemory::in_memory());
        let finder = HealingFinder::new(driver.clone(), memory.clone());

        let result = finder
            .resolve(
                &login_key(),
                &login_target(),
                &[Locator::css("#submit-old")],
            )
            .await
            .unwrap();

        assert_eq!(result.tier, ResolutionTier::Heuristic);
        assert!(result.confidence >= 0.5 && result.confidence <= 1.0);
        // The button has no id/testid/aria-label, so the healed locator
        // anchors on its short text.
        assert_eq!(result.locator, Locator::link_text("Entrar"));
        assert_eq!(
            memory.lookup(&login_key()),
            Some(Locator::link_text("Entrar"))
        );

        // Second resolution starts at the memory tier.
        let again = finder
            .resolve(
                &login_key(),
                &login_target(),
                &[Locator::css("#submit-old")],
            )
            .await
            .unwrap();
        assert_eq!(again.tier, ResolutionTier::Memory);
        assert_eq!(again.element, result.element);
    }

    #[tokio::test]
    async fn test_suggestion_tier_runs_before_heuristic() {
        let driver = Arc::new(FixtureDriver::new(login_page()));
        let memory = Arc::new(LocatorMemory::in_memory());
        let finder = HealingFinder::new(driver, memory.clone()).with_suggester(Arc::new(
            MockSuggestionProvider::suggesting(Locator::css("button.btn-primary")),
        ));

        let result = finder
            .resolve(&login_key(), &login_target(), &[])
            .await
            .unwrap();

        assert_eq!(result.tier, ResolutionTier::Suggested);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(
            memory.lookup(&login_key()),
            Some(Locator::css("button.btn-primary"))
        );
    }

    #[tokio::test]
    async fn test_failing_suggester_falls_through_to_heuristic() {
        let driver = Arc::new(FixtureDriver::new(login_page()));
        let finder = finder(driver)
            .with_suggester(Arc::new(MockSuggestionProvider::failing("quota exceeded")));

        let result = finder
            .resolve(&login_key(), &login_target(), &[])
            .await
            .unwrap();

        assert_eq!(result.tier, ResolutionTier::Heuristic);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_attempted_strategies() {
        let driver = Arc::new(FixtureDriver::new(vec![FixtureElement::new("div")
            .with_text("nothing interactive here")]));
        let memory = Arc::new(LocatorMemory::in_memory());
        memory
            .remember(&login_key(), Locator::id("gone"))
            .unwrap();
        let finder = HealingFinder::new(driver, memory);

        let err = finder
            .resolve(
                &login_key(),
                &login_target(),
                &[Locator::css("#submit-old")],
            )
            .await
            .unwrap_err();

        let HealError::ElementNotResolved { key, attempts } = err else {
            panic!("expected exhaustion error");
        };
        assert_eq!(key, login_key());
        assert_eq!(
            attempts,
            vec![
                "memory:id:gone".to_string(),
                "declared:css:#submit-old".to_string(),
                "heuristic:similarity".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_ambiguous_memory_is_last_resort_at_reduced_confidence() {
        // Two identical buttons make the learned locator ambiguous, and
        // nothing else on the page matches the target confidently.
        let page = vec![
            FixtureElement::new("button").with_class("dup").with_text("Go"),
            FixtureElement::new("button").with_class("dup").with_text("Go"),
        ];
        let driver = Arc::new(FixtureDriver::new(page));
        let memory = Arc::new(LocatorMemory::in_memory());
        let key = LogicalKey::new("page/go-button");
        memory
            .remember(&key, Locator::css("button.dup"))
            .unwrap();
        let finder = HealingFinder::new(driver, memory);

        let result = finder
            .resolve(
                &key,
                &TargetDescription::new().with_text("Missing"),
                &[],
            )
            .await
            .unwrap();

        assert_eq!(result.tier, ResolutionTier::Memory);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.element, ElementHandle(0));
    }

    #[tokio::test]
    async fn test_ambiguous_memory_prefers_later_tier_revalidation() {
        let page = vec![
            FixtureElement::new("button").with_class("dup").with_text("Go"),
            FixtureElement::new("button")
                .with_class("dup")
                .with_id("go-now")
                .with_text("Go"),
        ];
        let driver = Arc::new(FixtureDriver::new(page));
        let memory = Arc::new(LocatorMemory::in_memory());
        let key = LogicalKey::new("page/go-button");
        memory.remember(&key, Locator::css("button.dup")).unwrap();
        let finder = HealingFinder::new(driver, memory);

        let result = finder
            .resolve(
                &key,
                &TargetDescription::new(),
                &[Locator::id("go-now")],
            )
            .await
            .unwrap();

        // The unambiguous declared candidate wins over the held
        // ambiguous memory hit.
        assert_eq!(result.tier, ResolutionTier::Declared);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.element, ElementHandle(1));
    }

    #[tokio::test]
    async fn test_click_resolves_and_clicks() {
        let driver = Arc::new(FixtureDriver::new(login_page()));
        let finder = finder(driver.clone());

        let result = finder
            .click(&login_key(), &login_target(), &[])
            .await
            .unwrap();

        assert_eq!(result.tier, ResolutionTier::Heuristic);
        assert_eq!(driver.clicks(), vec![result.element]);
    }

    #[tokio::test]
    async fn test_resolution_is_deterministic() {
        let driver = Arc::new(FixtureDriver::new(login_page()));
        let finder = finder(driver);
        let key = LogicalKey::new("login-page/button");

        let first = finder.resolve(&key, &login_target(), &[]).await.unwrap();
        let second = finder.resolve(&key, &login_target(), &[]).await.unwrap();

        assert_eq!(first.element, second.element);
        // Idempotent re-resolution: the second call hits memory.
        assert_eq!(first.tier, ResolutionTier::Heuristic);
        assert_eq!(second.tier, ResolutionTier::Memory);
    }
}
