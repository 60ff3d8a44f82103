// tests/collector.rs
mod support;

use std::collections::HashSet;

use pricewatch::HarvestError;
use pricewatch::collect::{StopReason, collect};
use support::{Card, ScriptedPage, link, opts, site};

#[test]
fn growing_listing_reaches_target_with_discovery_ranks() {
    let mut page = ScriptedPage::growing(12, 5);
    let out = collect(&mut page, &site(), &opts(12, 250, 50), None).unwrap();

    let items = out.snapshot.items();
    assert_eq!(items.len(), 12);
    assert_eq!(out.stats.stop, StopReason::TargetReached);

    let ranks: Vec<usize> = items.iter().map(|i| i.rank).collect();
    assert_eq!(ranks, (1..=12).collect::<Vec<_>>());

    let links: HashSet<&str> = items.iter().map(|i| i.link.as_str()).collect();
    assert_eq!(links.len(), 12, "cards re-rendered across rounds must not duplicate");
    assert_eq!(items[0].link, link(0));
    assert_eq!(items[11].link, link(11));
}

#[test]
fn target_below_listing_size_stops_early() {
    let mut page = ScriptedPage::growing(40, 10);
    let out = collect(&mut page, &site(), &opts(15, 250, 50), None).unwrap();
    assert_eq!(out.snapshot.len(), 15);
    assert_eq!(out.stats.stop, StopReason::TargetReached);
    // 10 in the first round, 5 more after one scroll
    assert_eq!(out.stats.scrolls, 1);
}

#[test]
fn unchanging_listing_stops_after_stagnation_limit() {
    let cards = (0..3).map(|i| Card::new(i, "", "1,000원")).collect();
    let mut page = ScriptedPage::fixed(cards);
    let out = collect(&mut page, &site(), &opts(10, 100, 4), None).unwrap();

    assert_eq!(out.snapshot.len(), 3);
    assert_eq!(out.stats.stop, StopReason::Stagnation);
    assert_eq!(out.stats.stagnant_rounds, 4);
    // one productive round, then four stagnant ones
    assert_eq!(out.stats.rounds, 5);
    assert!(out.stats.scrolls <= 100);
}

#[test]
fn scroll_budget_is_never_exceeded() {
    let mut page = ScriptedPage::growing(100, 1);
    let out = collect(&mut page, &site(), &opts(100, 3, 50), None).unwrap();

    assert_eq!(out.stats.stop, StopReason::ScrollBudget);
    assert_eq!(out.stats.scrolls, 3);
    assert_eq!(page.scrolls.get(), 3);
    assert_eq!(out.snapshot.len(), 3);
}

#[test]
fn stale_card_is_skipped_without_consuming_a_rank() {
    let mut cards: Vec<Card> = (0..4).map(|i| Card::new(i, "5%", "2,000원")).collect();
    cards[1].stale = true;
    let mut page = ScriptedPage::fixed(cards);

    let out = collect(&mut page, &site(), &opts(3, 10, 5), None).unwrap();
    let got: Vec<(usize, String)> = out.snapshot.items().iter().map(|i| (i.rank, i.link.clone())).collect();
    assert_eq!(got, vec![(1, link(0)), (2, link(2)), (3, link(3))]);
    assert_eq!(out.stats.stale_skipped, 1);
}

#[test]
fn blank_and_duplicate_links_are_ignored() {
    let mut cards: Vec<Card> = (0..3).map(|i| Card::new(i, "", "1원")).collect();
    cards[1].href = "   ".into();
    cards[2].href = cards[0].href.clone();
    let mut page = ScriptedPage::fixed(cards);

    let out = collect(&mut page, &site(), &opts(5, 5, 2), None).unwrap();
    assert_eq!(out.snapshot.len(), 1);
    assert_eq!(out.snapshot.items()[0].rank, 1);
}

#[test]
fn fields_fall_back_through_candidate_selectors() {
    let mut page = ScriptedPage::fixed(vec![Card::new(7, "30%", "12,900원")]);
    let out = collect(&mut page, &site(), &opts(1, 5, 5), None).unwrap();

    let item = &out.snapshot.items()[0];
    // ".title" is absent on the card; ".name" supplies it
    assert_eq!(item.name, "Item 7");
    assert_eq!(item.discount_value, Some(30));
    assert_eq!(item.price_text, "12,900원");
    assert_eq!(item.price_value, Some(12900));
}

#[test]
fn missing_fields_degrade_to_no_value() {
    let mut page = ScriptedPage::fixed(vec![Card::new(1, "", "")]);
    let out = collect(&mut page, &site(), &opts(1, 5, 5), None).unwrap();
    let item = &out.snapshot.items()[0];
    assert_eq!(item.discount_text, "");
    assert_eq!(item.discount_value, None);
    assert_eq!(item.price_value, None);
}

#[test]
fn empty_page_is_not_ready() {
    let mut page = ScriptedPage::new(Vec::new(), Vec::new());
    let err = collect(&mut page, &site(), &opts(5, 5, 5), None).unwrap_err();
    assert!(matches!(err, HarvestError::PageNotReady { .. }));
    assert!(err.is_fatal());
}

#[test]
fn attribute_extractor_reads_labels() {
    use pricewatch::page::{CssAttr, FieldChain};

    let mut profile = site();
    profile.name = FieldChain::new()
        .with(CssAttr { selector: ".missing".into(), attr: "aria-label".into() })
        .with(CssAttr { selector: ".name".into(), attr: "aria-label".into() });

    let mut page = ScriptedPage::fixed(vec![Card::new(4, "", "5,000원")]);
    let out = collect(&mut page, &profile, &opts(1, 5, 5), None).unwrap();
    assert_eq!(out.snapshot.items()[0].name, "Item 4");
}

#[derive(Default)]
struct Counting {
    target: usize,
    found: Vec<usize>,
    rounds: usize,
    finished: Option<usize>,
}

impl pricewatch::progress::Progress for Counting {
    fn begin(&mut self, target: usize) { self.target = target; }
    fn item_found(&mut self, rank: usize, _link: &str) { self.found.push(rank); }
    fn round_done(&mut self, _round: usize, _collected: usize, _stagnant: usize) { self.rounds += 1; }
    fn finish(&mut self, collected: usize) { self.finished = Some(collected); }
}

#[test]
fn progress_hooks_follow_the_loop() {
    let mut page = ScriptedPage::growing(6, 3);
    let mut progress = Counting::default();
    let out = collect(&mut page, &site(), &opts(6, 10, 5), Some(&mut progress)).unwrap();

    assert_eq!(progress.target, 6);
    assert_eq!(progress.found, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(progress.rounds, out.stats.rounds);
    assert_eq!(progress.finished, Some(6));
}
