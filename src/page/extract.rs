// src/page/extract.rs
//
// Field extractors: how to read one descriptive field (name, discount,
// price) off a product card. Site markup changes land here, as selector
// lists, not in the collector.

use std::fmt;

use crate::core::sanitize::normalize_ws;
use crate::error::HarvestError;

use super::{ElementRef, PageObserver};

pub trait FieldExtractor: fmt::Debug + Send + Sync {
    /// Read the field from `card`. `Ok(None)` when this strategy finds nothing;
    /// `ElementStale` when the card changed mid-read.
    fn extract(&self, page: &mut dyn PageObserver, card: &ElementRef) -> Result<Option<String>, HarvestError>;
}

/// Text of the first element under the card matching a CSS selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssText(pub String);

impl FieldExtractor for CssText {
    fn extract(&self, page: &mut dyn PageObserver, card: &ElementRef) -> Result<Option<String>, HarvestError> {
        page.extract_text(card, &self.0)
    }
}

/// Attribute of the first element under the card matching a CSS selector
/// (e.g. an `aria-label` carrying the full product name).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssAttr {
    pub selector: String,
    pub attr: String,
}

impl FieldExtractor for CssAttr {
    fn extract(&self, page: &mut dyn PageObserver, card: &ElementRef) -> Result<Option<String>, HarvestError> {
        let Some(el) = page.find_within(card, &self.selector)? else { return Ok(None) };
        let value = page.attribute(&el, &self.attr)?.map(|v| normalize_ws(&v));
        Ok(value.filter(|v| !v.is_empty()))
    }
}

/// Ordered candidates; the first non-empty result wins.
///
/// A stale card aborts the chain (the caller skips the item). Any other
/// failure of one candidate only rules that candidate out.
#[derive(Debug, Default)]
pub struct FieldChain {
    candidates: Vec<Box<dyn FieldExtractor>>,
}

impl FieldChain {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, extractor: impl FieldExtractor + 'static) -> Self {
        self.candidates.push(Box::new(extractor));
        self
    }

    /// Chain of [`CssText`] over the given selectors, in order.
    pub fn css<S: AsRef<str>>(selectors: &[S]) -> Self {
        selectors.iter().fold(Self::new(), |chain, s| chain.with(CssText(s.as_ref().to_string())))
    }
}

impl FieldExtractor for FieldChain {
    fn extract(&self, page: &mut dyn PageObserver, card: &ElementRef) -> Result<Option<String>, HarvestError> {
        for candidate in &self.candidates {
            match candidate.extract(page, card) {
                Ok(Some(text)) => return Ok(Some(text)),
                Ok(None) => {}
                Err(e) if e.is_stale() => return Err(e),
                Err(e) => logd!("Extract: {candidate:?} failed on {}: {e}", card.id()),
            }
        }
        Ok(None)
    }
}
