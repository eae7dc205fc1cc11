//! End-to-end healing flows: engine + durable memory + fixture pages

use std::sync::Arc;

use driver_adapter::{FixtureDriver, FixtureElement};
use healbrowser_cli::pages::login;
use healbrowser_cli::{
    HealError, HealingFinder, Locator, LocatorMemory, LogicalKey, ResolutionTier,
    TargetDescription,
};
use suggest_bridge::MockSuggestionProvider;
use tempfile::TempDir;

fn memory_in(dir: &TempDir) -> Arc<LocatorMemory> {
    Arc::new(LocatorMemory::with_persistence(dir.path().join("memory.json")))
}

/// Stale declared locator, no memory, suggestions disabled: the
/// heuristic tier finds the "Entrar" button and the healed locator
/// survives a full store reload.
#[tokio::test]
async fn heals_stale_declared_locator_and_persists_across_reload() {
    let dir = TempDir::new().unwrap();
    let key = LogicalKey::new("login-page/submit");
    let target = TargetDescription::new().with_text("Entrar").with_tag("button");
    let declared = vec![Locator::css("#submit-old")];

    {
        let driver = Arc::new(FixtureDriver::new(vec![FixtureElement::new("button")
            .with_text("Entrar")]));
        let finder = HealingFinder::new(driver, memory_in(&dir));

        let result = finder.resolve(&key, &target, &declared).await.unwrap();
        assert_eq!(result.tier, ResolutionTier::Heuristic);
        assert_eq!(result.locator, Locator::link_text("Entrar"));
    }

    // Fresh engine, fresh store instance, same durable file: the
    // learned locator wins at the memory tier.
    let driver = Arc::new(FixtureDriver::new(vec![FixtureElement::new("button")
        .with_text("Entrar")]));
    let finder = HealingFinder::new(driver, memory_in(&dir));

    let result = finder.resolve(&key, &target, &declared).await.unwrap();
    assert_eq!(result.tier, ResolutionTier::Memory);
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.locator, Locator::link_text("Entrar"));
}

/// Memory holds (id, "login-btn") but the page no longer has that id:
/// the engine must fall through to the declared tier inside the same
/// call, not fail on the stale record.
#[tokio::test]
async fn stale_memory_record_falls_through_to_declared() {
    let dir = TempDir::new().unwrap();
    let memory = memory_in(&dir);
    let key = LogicalKey::new("login-page/submit");
    memory.remember(&key, Locator::id("login-btn")).unwrap();

    let driver = Arc::new(FixtureDriver::new(vec![FixtureElement::new("button")
        .with_id("sign-in")
        .with_text("Sign in")]));
    let finder = HealingFinder::new(driver, memory.clone());

    let result = finder
        .resolve(
            &key,
            &TargetDescription::new().with_tag("button"),
            &[Locator::id("sign-in")],
        )
        .await
        .unwrap();

    assert_eq!(result.tier, ResolutionTier::Declared);
    // The stale record was overwritten with the working locator.
    assert_eq!(memory.lookup(&key), Some(Locator::id("sign-in")));
}

/// Nothing on the page scores above the acceptance threshold: the
/// engine must end in ElementNotResolved, never a low-confidence click.
#[tokio::test]
async fn below_threshold_page_yields_element_not_resolved() {
    let driver = Arc::new(FixtureDriver::new(vec![
        FixtureElement::new("button").with_text("Completely unrelated"),
        FixtureElement::new("a").with_text("Also unrelated"),
    ]));
    let finder = HealingFinder::new(driver, Arc::new(LocatorMemory::in_memory()));

    let err = finder
        .resolve(
            &LogicalKey::new("checkout/place-order"),
            &TargetDescription::new()
                .with_text("Place order")
                .with_data_testid("place-order"),
            &[Locator::id("place-order")],
        )
        .await
        .unwrap_err();

    let HealError::ElementNotResolved { attempts, .. } = err else {
        panic!("expected exhaustion");
    };
    assert!(attempts.iter().any(|a| a.starts_with("declared:")));
    assert!(attempts.iter().any(|a| a.starts_with("heuristic:")));
}

/// The engine produces identical outcomes for the memory and declared
/// tiers whether or not a suggestion provider is wired in.
#[tokio::test]
async fn provider_presence_does_not_change_exact_tier_outcomes() {
    let page = || {
        vec![FixtureElement::new("button")
            .with_id("go")
            .with_text("Go")]
    };
    let key = LogicalKey::new("page/go");
    let target = TargetDescription::new().with_text("Go");
    let declared = vec![Locator::id("go")];

    let plain = HealingFinder::new(
        Arc::new(FixtureDriver::new(page())),
        Arc::new(LocatorMemory::in_memory()),
    );
    let with_provider = HealingFinder::new(
        Arc::new(FixtureDriver::new(page())),
        Arc::new(LocatorMemory::in_memory()),
    )
    .with_suggester(Arc::new(MockSuggestionProvider::suggesting(
        Locator::css("button"),
    )));

    let a = plain.resolve(&key, &target, &declared).await.unwrap();
    let b = with_provider.resolve(&key, &target, &declared).await.unwrap();

    assert_eq!(a.tier, ResolutionTier::Declared);
    assert_eq!(b.tier, ResolutionTier::Declared);
    assert_eq!(a.locator, b.locator);
    assert_eq!(a.element, b.element);
}

/// The demo login page end to end: username resolves from its first
/// declared candidate, password from its second, and the drifted login
/// button is healed by the heuristic tier and clicked.
#[tokio::test]
async fn demo_login_page_resolves_all_elements() {
    let dir = TempDir::new().unwrap();
    let driver = Arc::new(login::drifted_login_page());
    let finder = HealingFinder::new(driver.clone(), memory_in(&dir));

    let username = finder
        .resolve(
            &login::username_key(),
            &login::username_target(),
            &login::username_candidates(),
        )
        .await
        .unwrap();
    assert_eq!(username.tier, ResolutionTier::Declared);
    assert_eq!(username.locator, login::username_candidates()[0]);

    let password = finder
        .resolve(
            &login::password_key(),
            &login::password_target(),
            &login::password_candidates(),
        )
        .await
        .unwrap();
    assert_eq!(password.tier, ResolutionTier::Declared);
    assert_eq!(password.locator, login::password_candidates()[1]);

    let button = finder
        .click(
            &login::login_button_key(),
            &login::login_button_target(),
            &login::login_button_candidates(),
        )
        .await
        .unwrap();
    assert_eq!(button.tier, ResolutionTier::Heuristic);
    assert_eq!(driver.clicks(), vec![button.element]);

    // All three learned locators landed in one durable store.
    let memory = memory_in(&dir);
    assert_eq!(memory.len(), 3);
}

/// An accepted suggestion is validated against the live page and then
/// remembered like any other win.
#[tokio::test]
async fn accepted_suggestion_is_validated_and_remembered() {
    let dir = TempDir::new().unwrap();
    let memory = memory_in(&dir);
    let driver = Arc::new(FixtureDriver::new(vec![
        FixtureElement::new("button")
            .with_data_testid("login-submit")
            .with_text("Entrar"),
    ]));
    let finder = HealingFinder::new(driver, memory.clone()).with_suggester(Arc::new(
        MockSuggestionProvider::suggesting(Locator::data_testid("login-submit")),
    ));

    let key = LogicalKey::new("login-page/submit");
    let result = finder
        .resolve(
            &key,
            &TargetDescription::new().with_text("Entrar"),
            &[Locator::css("#submit-old")],
        )
        .await
        .unwrap();

    assert_eq!(result.tier, ResolutionTier::Suggested);
    assert_eq!(memory.lookup(&key), Some(Locator::data_testid("login-submit")));
}

/// A suggestion that does not resolve on the live page falls through to
/// the heuristic tier instead of being trusted blindly.
#[tokio::test]
async fn unresolvable_suggestion_falls_through() {
    let driver = Arc::new(FixtureDriver::new(vec![FixtureElement::new("button")
        .with_text("Entrar")]));
    let finder = HealingFinder::new(driver, Arc::new(LocatorMemory::in_memory()))
        .with_suggester(Arc::new(MockSuggestionProvider::suggesting(Locator::id(
            "hallucinated",
        ))));

    let result = finder
        .resolve(
            &LogicalKey::new("login-page/submit"),
            &TargetDescription::new().with_text("Entrar"),
            &[],
        )
        .await
        .unwrap();

    assert_eq!(result.tier, ResolutionTier::Heuristic);
    assert_eq!(result.locator, Locator::link_text("Entrar"));
}
