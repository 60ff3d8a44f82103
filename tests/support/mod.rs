// tests/support/mod.rs
//
// Scripted stand-ins for the browser, the state store and the mailer.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::time::Duration;

use pricewatch::HarvestError;
use pricewatch::config::{CollectOptions, SiteProfile};
use pricewatch::notify::{Message, Notifier};
use pricewatch::page::{ElementRef, PageObserver};
use pricewatch::snapshot::StateMap;
use pricewatch::store::StateStore;

pub const BASE_URL: &str = "https://shop.test/search?q=coat";
pub const LINK_SEL: &str = "a.item";

pub fn site() -> SiteProfile {
    SiteProfile::from_selectors(LINK_SEL, &[".title", ".name"], &[".discount"], &[".price"])
}

pub fn opts(target: usize, max_scrolls: usize, stagnation: usize) -> CollectOptions {
    CollectOptions {
        url: BASE_URL.to_string(),
        target_count: target,
        max_scroll_attempts: max_scrolls,
        stagnation_limit: stagnation,
        scroll_wait: Duration::ZERO,
        ready_timeout: Duration::ZERO,
        scroll_fraction: 0.9,
    }
}

pub fn link(i: usize) -> String {
    format!("https://shop.test/goods/{i}")
}

#[derive(Clone, Debug, Default)]
pub struct Card {
    pub href: String,
    pub name: String,
    pub discount: String,
    pub price: String,
    pub stale: bool,
}

impl Card {
    pub fn new(i: usize, discount: &str, price: &str) -> Self {
        Self {
            href: format!("/goods/{i}"),
            name: format!("Item {i}"),
            discount: discount.to_string(),
            price: price.to_string(),
            stale: false,
        }
    }
}

/// A listing page whose rendered cards depend on how far it was scrolled.
/// `views[k]` is what is on screen after `k` scrolls (the last view repeats).
pub struct ScriptedPage {
    pub cards: Vec<Card>,
    pub views: Vec<Vec<usize>>,
    pub scrolls: Cell<usize>,
    pub navigated: RefCell<Vec<String>>,
}

impl ScriptedPage {
    pub fn new(cards: Vec<Card>, views: Vec<Vec<usize>>) -> Self {
        Self { cards, views, scrolls: Cell::new(0), navigated: RefCell::new(Vec::new()) }
    }

    /// All cards visible from the start; scrolling changes nothing.
    pub fn fixed(cards: Vec<Card>) -> Self {
        let all = (0..cards.len()).collect();
        Self::new(cards, vec![all])
    }

    /// `n` cards, `per_round` more rendered after every scroll; earlier ones stay.
    pub fn growing(n: usize, per_round: usize) -> Self {
        let cards: Vec<Card> = (0..n).map(|i| Card::new(i, "10%", &format!("{},000원", i + 1))).collect();
        let mut views = Vec::new();
        let mut shown = per_round.min(n);
        loop {
            views.push((0..shown).collect());
            if shown == n { break; }
            shown = (shown + per_round).min(n);
        }
        Self::new(cards, views)
    }

    fn card_of(&self, el: &ElementRef, prefix: &str) -> Option<&Card> {
        let idx: usize = el.id().strip_prefix(prefix)?.parse().ok()?;
        self.cards.get(idx)
    }

    fn field(&self, el: &ElementRef) -> Option<String> {
        let (kind, idx) = el.id().split_once(':')?;
        let card = self.cards.get(idx.parse::<usize>().ok()?)?;
        Some(match kind {
            "name" => card.name.clone(),
            "discount" => card.discount.clone(),
            "price" => card.price.clone(),
            _ => return None,
        })
    }
}

impl PageObserver for ScriptedPage {
    fn navigate(&mut self, url: &str) -> Result<(), HarvestError> {
        self.navigated.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, HarvestError> {
        Ok(BASE_URL.to_string())
    }

    fn list_links(&mut self, selector: &str) -> Result<Vec<ElementRef>, HarvestError> {
        if selector != LINK_SEL || self.views.is_empty() {
            return Ok(Vec::new());
        }
        let pos = self.scrolls.get().min(self.views.len() - 1);
        Ok(self.views[pos].iter().map(|i| ElementRef::new(format!("link:{i}"))).collect())
    }

    fn attribute(&mut self, el: &ElementRef, name: &str) -> Result<Option<String>, HarvestError> {
        let Some(card) = self.card_of(el, "link:") else {
            // field elements carry their text as a label too
            return Ok((name == "aria-label").then(|| self.field(el)).flatten());
        };
        if card.stale {
            return Err(HarvestError::ElementStale(el.id().to_string()));
        }
        Ok((name == "href").then(|| card.href.clone()))
    }

    fn find_within(&mut self, el: &ElementRef, selector: &str) -> Result<Option<ElementRef>, HarvestError> {
        let Some(idx) = el.id().strip_prefix("card:") else { return Ok(None) };
        let kind = selector.trim_start_matches('.');
        let probe = ElementRef::new(format!("{kind}:{idx}"));
        Ok(self.field(&probe).filter(|t| !t.is_empty()).map(|_| probe))
    }

    fn parent_of(&mut self, el: &ElementRef) -> Result<Option<ElementRef>, HarvestError> {
        Ok(el.id().strip_prefix("link:").map(|i| ElementRef::new(format!("card:{i}"))))
    }

    fn text_of(&mut self, el: &ElementRef) -> Result<String, HarvestError> {
        Ok(self.field(el).unwrap_or_default())
    }

    fn scroll_viewport(&mut self, _fraction: f64) -> Result<(), HarvestError> {
        self.scrolls.set(self.scrolls.get() + 1);
        Ok(())
    }
}

/* ---------------- Notifier / store doubles ---------------- */

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<Message>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|m| m.subject.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, msg: &Message) -> Result<(), HarvestError> {
        self.sent.borrow_mut().push(msg.clone());
        if self.fail {
            return Err(HarvestError::NotifyFailed("smtp down".into()));
        }
        Ok(())
    }
}

/// Store whose reads and/or writes fail as if the backend were unreachable.
pub struct BrokenStore {
    pub fail_get: bool,
    pub fail_set: bool,
}

impl StateStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<StateMap, HarvestError> {
        if self.fail_get {
            return Err(HarvestError::StorageUnavailable("connection refused".into()));
        }
        Ok(StateMap::new())
    }

    fn set(&self, _key: &str, _value: &StateMap) -> Result<(), HarvestError> {
        if self.fail_set {
            return Err(HarvestError::StorageUnavailable("connection refused".into()));
        }
        Ok(())
    }
}
