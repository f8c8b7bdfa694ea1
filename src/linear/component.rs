//! Stack of growing components for the linear-time flood.
//!
//! Components live in an arena and the stack holds their ids. Each component
//! owns the streaming history of its lineage; pixel membership and area are
//! tracked by a shared `DisjointSet`.

use crate::disjoint_set::DisjointSet;
use crate::stability::{AreaHistory, StabilityParams, StableLevel};
use crate::trace::trace_debug;
use crate::util::MserResult;

/// Index of a component in the arena.
pub(crate) type ComponentId = usize;

#[derive(Debug)]
struct Component {
    level: u8,
    seed: usize,
    seed_gray: u8,
    root: Option<usize>,
    history: AreaHistory,
}

impl Component {
    fn seed_key(&self) -> (u8, usize) {
        (self.seed_gray, self.seed)
    }
}

/// Stable level found on a lineage, tagged with the lineage seed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FoundRegion {
    pub(crate) seed: usize,
    pub(crate) stable: StableLevel,
}

#[derive(Debug)]
pub(crate) struct ComponentStack {
    sets: DisjointSet,
    arena: Vec<Option<Component>>,
    free: Vec<ComponentId>,
    stack: Vec<ComponentId>,
    params: StabilityParams,
    scratch: Vec<StableLevel>,
    found: Vec<FoundRegion>,
    created: usize,
}

impl ComponentStack {
    pub(crate) fn new(pixel_count: usize, params: StabilityParams) -> MserResult<Self> {
        Ok(Self {
            sets: DisjointSet::new(pixel_count)?,
            arena: Vec::new(),
            free: Vec::new(),
            stack: Vec::new(),
            params,
            scratch: Vec::new(),
            found: Vec::new(),
            created: 0,
        })
    }

    /// Id of the top component.
    pub(crate) fn top(&self) -> Option<ComponentId> {
        self.stack.last().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.stack.len()
    }

    /// Number of components created so far.
    pub(crate) fn created(&self) -> usize {
        self.created
    }

    /// Current level of the top component.
    pub(crate) fn top_level(&self) -> Option<u8> {
        self.top().map(|id| self.component(id).level)
    }

    fn second_level(&self) -> Option<u8> {
        let n = self.stack.len();
        (n >= 2).then(|| self.component(self.stack[n - 2]).level)
    }

    fn component(&self, id: ComponentId) -> &Component {
        self.arena[id]
            .as_ref()
            .unwrap_or_else(|| panic!("component {id} was destroyed"))
    }

    fn component_mut(&mut self, id: ComponentId) -> &mut Component {
        self.arena[id]
            .as_mut()
            .unwrap_or_else(|| panic!("component {id} was destroyed"))
    }

    fn area(&self, id: ComponentId) -> u32 {
        self.component(id)
            .root
            .map_or(0, |root| self.sets.set_cardinality(root) as u32)
    }

    /// Pushes an empty component at `level` seeded by `seed`.
    ///
    /// # Panics
    ///
    /// Panics unless `level` is strictly below the current top's level.
    pub(crate) fn push_component(&mut self, level: u8, seed: usize) {
        if let Some(top) = self.top_level() {
            assert!(
                level < top,
                "ComponentStack::push_component: level {level} is not below top level {top}"
            );
        }
        let component = Component {
            level,
            seed,
            seed_gray: level,
            root: None,
            history: AreaHistory::new(level),
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.arena[id] = Some(component);
                id
            }
            None => {
                self.arena.push(Some(component));
                self.arena.len() - 1
            }
        };
        self.stack.push(id);
        self.created += 1;
    }

    /// Adds a pixel of gray level `gray` to the top component.
    pub(crate) fn add_pixel(&mut self, pixel: usize, gray: u8) {
        let top = self
            .top()
            .unwrap_or_else(|| panic!("ComponentStack::add_pixel: stack is empty"));
        let current = self.component(top).root;
        let root = match current {
            Some(root) => self.sets.unify(root, pixel),
            None => self.sets.find(pixel),
        };
        let component = self.component_mut(top);
        component.root = Some(root);
        if (gray, pixel) < component.seed_key() {
            component.seed = pixel;
            component.seed_gray = gray;
        }
    }

    /// Advances the top component to `new_level`, finalizing one history
    /// entry per level passed.
    pub(crate) fn raise_level(&mut self, new_level: u8) {
        if let Some(top) = self.top() {
            self.raise(top, new_level);
        }
    }

    fn raise(&mut self, id: ComponentId, new_level: u8) {
        let area = self.area(id);
        let params = self.params;
        let mut scratch = std::mem::take(&mut self.scratch);
        let component = self.component_mut(id);
        debug_assert!(new_level >= component.level);
        for _ in component.level..new_level {
            component.history.push(area, &params, &mut scratch);
        }
        component.level = new_level;
        let seed = component.seed;
        self.collect(seed, &mut scratch);
        self.scratch = scratch;
    }

    /// Merges the top component into the one below it at that component's
    /// level. The lineage with the deeper seed survives; the other one is
    /// finished and destroyed.
    pub(crate) fn merge_top(&mut self) {
        let n = self.stack.len();
        assert!(n >= 2, "ComponentStack::merge_top: needs two components");
        let top = self.stack[n - 1];
        let below = self.stack[n - 2];
        let level = self.component(below).level;
        self.raise(top, level);

        let (winner, loser) = if self.component(top).seed_key() < self.component(below).seed_key() {
            (top, below)
        } else {
            (below, top)
        };
        let root = match (self.component(top).root, self.component(below).root) {
            (Some(a), Some(b)) => Some(self.sets.unify(a, b)),
            (a, b) => a.or(b),
        };
        let winner_component = self.component_mut(winner);
        winner_component.root = root;
        winner_component.level = level;

        self.stack.pop();
        self.stack[n - 2] = winner;
        self.terminate(loser, false);
        trace_debug!("mser.merge", gray = level, survivor = winner);
    }

    /// Merges or raises the stack until the top reaches `new_level`.
    pub(crate) fn process_stack(&mut self, new_level: u8) {
        loop {
            match self.second_level() {
                Some(below) if below <= new_level => {
                    self.merge_top();
                    if below == new_level {
                        return;
                    }
                }
                _ => {
                    self.raise_level(new_level);
                    return;
                }
            }
        }
    }

    /// Finishes the top component, including the entry for its current level.
    pub(crate) fn finish_top(&mut self) {
        if let Some(top) = self.stack.pop() {
            self.terminate(top, true);
        }
    }

    fn terminate(&mut self, id: ComponentId, include_current: bool) {
        // A merged-away component's root may no longer be a set root.
        let area = if include_current { self.area(id) } else { 0 };
        let Some(component) = self.arena[id].take() else {
            return;
        };
        let mut scratch = std::mem::take(&mut self.scratch);
        let mut history = component.history;
        if include_current {
            history.push(area, &self.params, &mut scratch);
        }
        history.finish(&self.params, &mut scratch);
        self.collect(component.seed, &mut scratch);
        self.scratch = scratch;
        self.free.push(id);
    }

    fn collect(&mut self, seed: usize, scratch: &mut Vec<StableLevel>) {
        for stable in scratch.drain(..) {
            trace_debug!("mser.region", seed = seed, area = stable.area);
            self.found.push(FoundRegion { seed, stable });
        }
    }

    pub(crate) fn into_found(self) -> Vec<FoundRegion> {
        self.found
    }
}

#[cfg(test)]
mod tests {
    use super::ComponentStack;
    use crate::stability::StabilityParams;

    fn params() -> StabilityParams {
        StabilityParams {
            delta: 2,
            min_area: 1,
            max_area: usize::MAX,
            max_merit: f64::INFINITY,
            diff_area_threshold: 0.1,
        }
    }

    #[test]
    fn deeper_seed_survives_merge() {
        let mut stack = ComponentStack::new(10, params()).unwrap();
        stack.push_component(50, 0);
        stack.add_pixel(0, 50);
        stack.push_component(10, 5);
        stack.add_pixel(5, 10);
        stack.add_pixel(6, 10);
        let deep = stack.top().unwrap();
        stack.process_stack(50);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.top(), Some(deep));
        assert_eq!(stack.top_level(), Some(50));
        assert_eq!(stack.area(deep), 3);
    }

    #[test]
    fn raise_stops_below_next_component() {
        let mut stack = ComponentStack::new(4, params()).unwrap();
        stack.push_component(100, 0);
        stack.push_component(20, 1);
        stack.add_pixel(1, 20);
        stack.process_stack(60);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top_level(), Some(60));
        stack.process_stack(120);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.top_level(), Some(120));
    }

    #[test]
    fn same_gray_smaller_index_takes_seed() {
        let mut stack = ComponentStack::new(4, params()).unwrap();
        stack.push_component(7, 3);
        stack.add_pixel(3, 7);
        stack.add_pixel(1, 7);
        let top = stack.top().unwrap();
        assert_eq!(stack.component(top).seed, 1);
    }

    #[test]
    fn flat_lineage_emits_on_finish() {
        let mut stack = ComponentStack::new(9, params()).unwrap();
        stack.push_component(0, 4);
        stack.add_pixel(4, 0);
        stack.raise_level(10);
        for p in [0, 1, 2, 3, 5, 6, 7, 8] {
            stack.add_pixel(p, 10);
        }
        stack.finish_top();
        let found = stack.into_found();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].seed, 4);
        assert_eq!(found[0].stable.area, 1);
        assert_eq!(found[0].stable.threshold, 4);
    }

    #[test]
    #[should_panic(expected = "is not below top level")]
    fn push_at_or_above_top_panics() {
        let mut stack = ComponentStack::new(2, params()).unwrap();
        stack.push_component(5, 0);
        stack.push_component(5, 1);
    }
}
