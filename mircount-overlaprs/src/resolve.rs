use std::collections::hash_map::Entry;

use fxhash::FxHashMap as HashMap;

use mircount_core::Strand;

use crate::index::{FeatureAnchor, FeatureIndex};
use crate::tiebreak::TieBreaker;

///
/// Match a read's span against indexed features.
///
/// Implementors only provide [`find_iter`](OverlapResolver::find_iter); the
/// majority-overlap rule in [`resolve`](OverlapResolver::resolve) is shared.
///
pub trait OverlapResolver: Send + Sync {
    ///
    /// Every feature entry stored at the positions `[start, end)` on the given
    /// contig and strand, one item per (position, feature) pair.
    ///
    fn find_iter<'a>(
        &'a self,
        chr: &str,
        strand: Strand,
        start: i64,
        end: i64,
    ) -> Box<dyn Iterator<Item = &'a FeatureAnchor> + 'a>;

    ///
    /// Pick the feature a read spanning `[start, end)` belongs to.
    ///
    /// Each feature is scored by the number of queried positions it is indexed
    /// at. The best scoring feature wins; when several share the best score
    /// the `tie_breaker` chooses among them, in the order they were first seen
    /// while scanning the span. Returns `None` when nothing is indexed in the
    /// span.
    ///
    fn resolve<T: TieBreaker + ?Sized>(
        &self,
        chr: &str,
        strand: Strand,
        start: i64,
        end: i64,
        tie_breaker: &mut T,
    ) -> Option<FeatureAnchor>
    where
        Self: Sized,
    {
        let mut tally: Vec<(FeatureAnchor, usize)> = Vec::new();
        let mut slots: HashMap<FeatureAnchor, usize> = HashMap::default();

        for anchor in self.find_iter(chr, strand, start, end) {
            match slots.entry(*anchor) {
                Entry::Occupied(slot) => tally[*slot.get()].1 += 1,
                Entry::Vacant(slot) => {
                    slot.insert(tally.len());
                    tally.push((*anchor, 1));
                }
            }
        }

        match tally.len() {
            0 => None,
            1 => Some(tally[0].0),
            _ => {
                let greatest = tally.iter().map(|(_, n)| *n).max().unwrap_or(0);
                let candidates: Vec<FeatureAnchor> = tally
                    .into_iter()
                    .filter(|(_, n)| *n == greatest)
                    .map(|(anchor, _)| anchor)
                    .collect();

                let pick = match candidates.len() {
                    1 => 0,
                    n => tie_breaker.pick(n).min(n - 1),
                };
                Some(candidates[pick])
            }
        }
    }
}

impl OverlapResolver for FeatureIndex {
    fn find_iter<'a>(
        &'a self,
        chr: &str,
        strand: Strand,
        start: i64,
        end: i64,
    ) -> Box<dyn Iterator<Item = &'a FeatureAnchor> + 'a> {
        match self.contigs.get(chr) {
            Some(stranded) => {
                let positions = stranded.get(strand);
                Box::new(
                    (start..end)
                        .filter_map(move |pos| positions.get(&pos))
                        .flatten(),
                )
            }
            // no features on this contig
            None => Box::new(std::iter::empty()),
        }
    }
}
