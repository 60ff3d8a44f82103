// src/collect.rs
//
// Incremental collector: read the rendered links, record the new ones,
// scroll, repeat. The listing is lazy-loaded, so the set of links grows (and
// re-renders) as we scroll; identity is the canonical link, rank is
// discovery order.
//
// The loop is bounded three ways: target count reached, scroll budget spent,
// or too many rounds in a row without a new item. Stagnation is measured by
// collected *count*; a page that swaps items without net growth is stagnant.

use std::collections::HashSet;
use std::thread;

use crate::config::{CollectOptions, SiteProfile};
use crate::error::HarvestError;
use crate::page::{ElementRef, FieldExtractor, PageObserver};
use crate::progress::Progress;
use crate::snapshot::{Item, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    ScrollBudget,
    Stagnation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectStats {
    /// Read/extract rounds performed.
    pub rounds: usize,
    pub scrolls: usize,
    /// Consecutive rounds without growth when the loop ended.
    pub stagnant_rounds: usize,
    /// Items skipped because their element went stale mid-read.
    pub stale_skipped: usize,
    pub stop: StopReason,
}

#[derive(Clone, Debug)]
pub struct Collection {
    pub snapshot: Snapshot,
    pub stats: CollectStats,
}

/// Harvest up to `opts.target_count` unique items from an already loaded page.
///
/// Fails only when the page never shows a single item link
/// (`PageNotReady`) or the page session breaks. Running out of budget is not
/// a failure: whatever was collected is returned.
pub fn collect(
    page: &mut dyn PageObserver,
    site: &SiteProfile,
    opts: &CollectOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Result<Collection, HarvestError> {
    page.wait_ready(&site.link_selector, opts.ready_timeout)?;

    if let Some(p) = progress.as_deref_mut() {
        p.begin(opts.target_count);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut items: Vec<Item> = Vec::new();
    let mut rounds = 0usize;
    let mut scrolls = 0usize;
    let mut stagnant = 0usize;
    let mut stale_skipped = 0usize;
    let mut last_len = 0usize;

    while items.len() < opts.target_count
        && scrolls < opts.max_scroll_attempts
        && stagnant < opts.stagnation_limit
    {
        rounds += 1;

        let links = match page.list_links(&site.link_selector) {
            Ok(v) => v,
            Err(e) if e.is_stale() => {
                logd!("Collect: link list went stale in round {rounds}");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        for el in &links {
            if items.len() >= opts.target_count {
                break;
            }
            match read_item(page, site, el, items.len() + 1, &seen) {
                Ok(Some(item)) => {
                    if let Some(p) = progress.as_deref_mut() {
                        p.item_found(item.rank, &item.link);
                    }
                    seen.insert(item.link.clone());
                    items.push(item);
                }
                Ok(None) => {}
                Err(e) if e.is_stale() => {
                    stale_skipped += 1;
                    logd!("Collect: skipped stale element {}: {e}", el.id());
                }
                Err(e) => return Err(e),
            }
        }

        if items.len() == last_len {
            stagnant += 1;
        } else {
            stagnant = 0;
            last_len = items.len();
        }

        if let Some(p) = progress.as_deref_mut() {
            p.round_done(rounds, items.len(), stagnant);
        }

        if items.len() >= opts.target_count {
            break;
        }

        page.scroll_viewport(opts.scroll_fraction)?;
        if !opts.scroll_wait.is_zero() {
            thread::sleep(opts.scroll_wait);
        }
        scrolls += 1;
    }

    let stop = if items.len() >= opts.target_count {
        StopReason::TargetReached
    } else if stagnant >= opts.stagnation_limit {
        StopReason::Stagnation
    } else {
        StopReason::ScrollBudget
    };

    logf!(
        "Collect: stop={stop:?} collected={} target={} rounds={rounds} scrolls={scrolls} stale_skipped={stale_skipped}",
        items.len(),
        opts.target_count
    );
    if let Some(p) = progress.as_deref_mut() {
        p.finish(items.len());
    }

    Ok(Collection {
        snapshot: Snapshot::new(items),
        stats: CollectStats { rounds, scrolls, stagnant_rounds: stagnant, stale_skipped, stop },
    })
}

/// Read one link element into an item. `None` for blank/unresolvable or
/// already-seen links. Rank is only consumed by items actually returned.
fn read_item(
    page: &mut dyn PageObserver,
    site: &SiteProfile,
    link_el: &ElementRef,
    rank: usize,
    seen: &HashSet<String>,
) -> Result<Option<Item>, HarvestError> {
    let Some(link) = page.resolve_href(link_el)? else { return Ok(None) };
    if seen.contains(&link) {
        return Ok(None);
    }

    let card = page.nearest_container(link_el)?;
    let name = site.name.extract(page, &card)?;
    let discount = site.discount.extract(page, &card)?;
    let price = site.price.extract(page, &card)?;

    Ok(Some(Item::read(rank, link, name, discount, price)))
}
