use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Half-open run of grid columns, `start` inclusive and `end` exclusive.
/// Construction pulls a degenerate `end` up to `start + 1` so every span
/// occupies at least one column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawColSpan")]
pub struct ColSpan {
    start: i64,
    end: i64,
}

#[derive(Deserialize)]
struct RawColSpan {
    start: i64,
    end: i64,
}

impl From<RawColSpan> for ColSpan {
    fn from(raw: RawColSpan) -> ColSpan {
        ColSpan::new(raw.start, raw.end)
    }
}

impl ColSpan {
    pub fn new(start: i64, end: i64) -> ColSpan {
        ColSpan {
            start,
            end: end.max(start + 1),
        }
    }

    pub fn with_width(start: i64, width: i64) -> ColSpan {
        ColSpan::new(start, start + width)
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn width(&self) -> i64 {
        self.end - self.start
    }

    /// True when the spans share at least one column. Touching ends do not
    /// count; adjacent spans are legal neighbors.
    pub fn overlaps(&self, other: &ColSpan) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// How lane assignments are reconciled after a committed placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanePolicy {
    /// Lane indices arrive from the host and are taken as ground truth.
    #[default]
    ServerStable,
    /// Lanes are re-derived after each commit by first-fit over interval
    /// starts; cards that fit nowhere are evicted.
    GreedyRepack,
}

/// A committed placement: which lane and which columns a card occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedSpan {
    pub lane: usize,
    pub span: ColSpan,
}

/// Occupied intervals per lane, keyed by the owning card id.
///
/// The registry records placements; it never repairs them. Callers commit
/// only solver-accepted spans, which keeps each lane's set pairwise
/// disjoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LaneRegistry {
    lane_count: usize,
    policy: LanePolicy,
    items: BTreeMap<String, PlacedSpan>,
}

impl LaneRegistry {
    pub fn new(lane_count: usize, policy: LanePolicy) -> LaneRegistry {
        LaneRegistry {
            lane_count: lane_count.max(1),
            policy,
            items: BTreeMap::new(),
        }
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn policy(&self) -> LanePolicy {
        self.policy
    }

    /// Clamp a raw lane index into `0..lane_count`.
    pub fn clamp_lane(&self, lane: i64) -> usize {
        lane.clamp(0, self.lane_count as i64 - 1) as usize
    }

    /// Record a placement, replacing any previous span for the same card.
    pub fn place(&mut self, id: &str, lane: usize, span: ColSpan) {
        let lane = lane.min(self.lane_count - 1);
        self.items.insert(id.to_string(), PlacedSpan { lane, span });
    }

    pub fn remove(&mut self, id: &str) -> Option<PlacedSpan> {
        self.items.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&PlacedSpan> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlacedSpan)> {
        self.items.iter().map(|(id, p)| (id.as_str(), p))
    }

    /// Occupied spans on one lane, sorted by start column. `excluding`
    /// leaves out the card currently being repositioned so it does not
    /// collide with itself.
    pub fn occupied(&self, lane: usize, excluding: Option<&str>) -> Vec<ColSpan> {
        let mut spans: Vec<ColSpan> = self
            .items
            .iter()
            .filter(|(id, p)| p.lane == lane && excluding != Some(id.as_str()))
            .map(|(_, p)| p.span)
            .collect();
        spans.sort_by_key(|s| s.start());
        spans
    }

    /// First-fit repack in `(start, id)` order. Cards that fit on no lane
    /// are removed and their ids returned so the caller can send them back
    /// to the pool.
    pub fn repack(&mut self) -> Vec<String> {
        let mut order: Vec<(i64, String)> = self
            .items
            .iter()
            .map(|(id, p)| (p.span.start(), id.clone()))
            .collect();
        order.sort();

        let mut lanes: Vec<Vec<ColSpan>> = vec![Vec::new(); self.lane_count];
        let mut evicted = Vec::new();
        for (_, id) in order {
            let Some(entry) = self.items.get(&id) else {
                continue;
            };
            let span = entry.span;
            let fit = lanes
                .iter()
                .position(|taken| taken.iter().all(|s| !s.overlaps(&span)));
            match fit {
                Some(lane) => {
                    lanes[lane].push(span);
                    if let Some(p) = self.items.get_mut(&id) {
                        p.lane = lane;
                    }
                }
                None => {
                    self.items.remove(&id);
                    evicted.push(id);
                }
            }
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_spans_widen_to_one_column() {
        assert_eq!(ColSpan::new(5, 5).width(), 1);
        assert_eq!(ColSpan::new(5, 2).width(), 1);
        assert_eq!(ColSpan::with_width(3, 0).width(), 1);
        assert_eq!(ColSpan::with_width(3, 4).width(), 4);
    }

    #[test]
    fn adjacent_spans_do_not_overlap() {
        let a = ColSpan::new(0, 5);
        assert!(!a.overlaps(&ColSpan::new(5, 8)));
        assert!(!ColSpan::new(5, 8).overlaps(&a));
        assert!(a.overlaps(&ColSpan::new(4, 6)));
        assert!(a.overlaps(&ColSpan::new(-2, 1)));
        assert!(a.overlaps(&ColSpan::new(1, 3)));
    }

    #[test]
    fn occupied_is_sorted_and_respects_exclusion() {
        let mut reg = LaneRegistry::new(2, LanePolicy::ServerStable);
        reg.place("b", 0, ColSpan::new(10, 14));
        reg.place("a", 0, ColSpan::new(2, 5));
        reg.place("c", 1, ColSpan::new(0, 3));

        let lane0 = reg.occupied(0, None);
        assert_eq!(lane0, vec![ColSpan::new(2, 5), ColSpan::new(10, 14)]);

        let without_a = reg.occupied(0, Some("a"));
        assert_eq!(without_a, vec![ColSpan::new(10, 14)]);

        assert_eq!(reg.occupied(1, None).len(), 1);
    }

    #[test]
    fn place_replaces_prior_span_for_the_card() {
        let mut reg = LaneRegistry::new(3, LanePolicy::ServerStable);
        reg.place("a", 0, ColSpan::new(0, 4));
        reg.place("a", 2, ColSpan::new(6, 9));
        assert_eq!(reg.len(), 1);
        assert!(reg.occupied(0, None).is_empty());
        assert_eq!(reg.get("a").map(|p| p.lane), Some(2));
    }

    #[test]
    fn lane_indices_clamp_into_range() {
        let reg = LaneRegistry::new(3, LanePolicy::ServerStable);
        assert_eq!(reg.clamp_lane(-4), 0);
        assert_eq!(reg.clamp_lane(1), 1);
        assert_eq!(reg.clamp_lane(99), 2);
    }

    #[test]
    fn repack_spreads_overlaps_across_lanes() {
        let mut reg = LaneRegistry::new(2, LanePolicy::GreedyRepack);
        reg.place("a", 0, ColSpan::new(0, 6));
        reg.place("b", 0, ColSpan::new(3, 8));
        reg.place("c", 0, ColSpan::new(6, 10));

        let evicted = reg.repack();
        assert!(evicted.is_empty());
        assert_eq!(reg.get("a").map(|p| p.lane), Some(0));
        assert_eq!(reg.get("b").map(|p| p.lane), Some(1));
        assert_eq!(reg.get("c").map(|p| p.lane), Some(0));
    }

    #[test]
    fn repack_evicts_what_fits_nowhere() {
        let mut reg = LaneRegistry::new(1, LanePolicy::GreedyRepack);
        reg.place("a", 0, ColSpan::new(0, 6));
        reg.place("b", 0, ColSpan::new(2, 5));

        let evicted = reg.repack();
        assert_eq!(evicted, vec!["b".to_string()]);
        assert_eq!(reg.len(), 1);
        assert!(reg.get("b").is_none());
    }

    #[test]
    fn repack_ties_break_by_id() {
        let mut reg = LaneRegistry::new(2, LanePolicy::GreedyRepack);
        reg.place("b", 1, ColSpan::new(4, 9));
        reg.place("a", 1, ColSpan::new(4, 7));

        let evicted = reg.repack();
        assert!(evicted.is_empty());
        assert_eq!(reg.get("a").map(|p| p.lane), Some(0));
        assert_eq!(reg.get("b").map(|p| p.lane), Some(1));
    }
}
