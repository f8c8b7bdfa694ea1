//! Area-history stability test shared by both detectors.
//!
//! A lineage's history holds one area per gray level from its birth level to
//! the level before it was absorbed. For every level `t` with `delta` levels
//! of history on both sides,
//!
//! ```text
//! q(t) = (h[t + delta] - h[t - delta]) / h[t]
//! ```
//!
//! Local minima of `q` are candidate thresholds. Runs of equal `q` form a
//! single plateau whose representative is its middle level, and levels
//! outside the valid range count as `+inf`, so a plateau touching either end
//! of the range is still a minimum. Candidates outside `[min_area, max_area]`
//! or above `max_merit` are dropped. The rest are grouped into clusters: a
//! candidate joins the open cluster while its area differs from the
//! cluster's first candidate by less than `diff_area_threshold` (relative to
//! its own area), and each cluster reports its lowest-`q` member.
//!
//! `AreaHistory` evaluates `q` as soon as an entry becomes final and drops
//! entries that can no longer influence a decision, so the linear-time
//! detector keeps only a window of each history alive. The classic detector
//! replays complete node histories through the same type.

use crate::util::{MserError, MserResult};
use std::collections::VecDeque;

/// Parameters of the stability test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StabilityParams {
    pub(crate) delta: usize,
    pub(crate) min_area: usize,
    pub(crate) max_area: usize,
    pub(crate) max_merit: f64,
    pub(crate) diff_area_threshold: f64,
}

/// A threshold accepted as maximally stable within one lineage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StableLevel {
    pub(crate) threshold: u8,
    pub(crate) area: usize,
    pub(crate) merit: f32,
}

#[derive(Clone, Copy, Debug)]
struct Plateau {
    start: usize,
    q: f64,
    /// Left neighbor is larger (or out of range).
    open: bool,
}

#[derive(Clone, Copy, Debug)]
struct Cluster {
    anchor_area: usize,
    best: StableLevel,
    best_q: f64,
}

/// Final per-level areas of one lineage plus the streaming scan state.
#[derive(Clone, Debug)]
pub(crate) struct AreaHistory {
    birth: usize,
    /// Level of `window[0]`.
    base: usize,
    window: VecDeque<u32>,
    pushed: usize,
    last_q_level: Option<usize>,
    plateau: Option<Plateau>,
    cluster: Option<Cluster>,
}

impl AreaHistory {
    pub(crate) fn new(birth: u8) -> Self {
        Self {
            birth: birth as usize,
            base: birth as usize,
            window: VecDeque::new(),
            pushed: 0,
            last_q_level: None,
            plateau: None,
            cluster: None,
        }
    }

    /// Number of final entries pushed so far.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pushed
    }

    /// Most recent final area, if any.
    pub(crate) fn last_area(&self) -> Option<u32> {
        self.window.back().copied()
    }

    /// Number of entries currently retained.
    #[cfg(test)]
    pub(crate) fn retained(&self) -> usize {
        self.window.len()
    }

    /// Appends the final area of the next level and evaluates every `q`
    /// that became computable.
    pub(crate) fn push(&mut self, area: u32, params: &StabilityParams, out: &mut Vec<StableLevel>) {
        debug_assert!(
            self.last_area().map_or(true, |prev| prev <= area),
            "area history must be non-decreasing"
        );
        let level = self.birth + self.pushed;
        self.window.push_back(area);
        self.pushed += 1;

        let delta = params.delta;
        if level < self.birth + 2 * delta {
            return;
        }
        let t = level - delta;
        self.evaluate(t, params, out);
        self.trim(t, delta);
    }

    /// Closes the history: the last plateau and the open cluster are resolved.
    pub(crate) fn finish(mut self, params: &StabilityParams, out: &mut Vec<StableLevel>) {
        if let (Some(plateau), Some(end)) = (self.plateau.take(), self.last_q_level) {
            if plateau.open {
                self.candidate(plateau.start, end, plateau.q, params, out);
            }
        }
        if let Some(cluster) = self.cluster.take() {
            out.push(cluster.best);
        }
    }

    fn area(&self, level: usize) -> u32 {
        self.window[level - self.base]
    }

    fn q(&self, t: usize, delta: usize) -> f64 {
        let center = self.area(t);
        if center == 0 {
            return f64::INFINITY;
        }
        let grown = self.area(t + delta) - self.area(t - delta);
        f64::from(grown) / f64::from(center)
    }

    fn evaluate(&mut self, t: usize, params: &StabilityParams, out: &mut Vec<StableLevel>) {
        let q = self.q(t, params.delta);
        self.last_q_level = Some(t);
        let next = match self.plateau {
            None => Plateau {
                start: t,
                q,
                open: true,
            },
            Some(p) if q == p.q => p,
            Some(p) if q > p.q => {
                if p.open {
                    self.candidate(p.start, t - 1, p.q, params, out);
                }
                Plateau {
                    start: t,
                    q,
                    open: false,
                }
            }
            Some(_) => Plateau {
                start: t,
                q,
                open: true,
            },
        };
        self.plateau = Some(next);
    }

    fn candidate(
        &mut self,
        start: usize,
        end: usize,
        q: f64,
        params: &StabilityParams,
        out: &mut Vec<StableLevel>,
    ) {
        let threshold = start + (end - start) / 2;
        let area = self.area(threshold) as usize;
        if area < params.min_area || area > params.max_area || q > params.max_merit {
            return;
        }
        let level = StableLevel {
            threshold: threshold as u8,
            area,
            merit: q as f32,
        };
        match self.cluster.as_mut() {
            Some(cluster) if relative_distance(cluster.anchor_area, area) < params.diff_area_threshold => {
                if cluster.best_q > q {
                    cluster.best = level;
                    cluster.best_q = q;
                }
            }
            Some(cluster) => {
                out.push(cluster.best);
                *cluster = Cluster {
                    anchor_area: area,
                    best: level,
                    best_q: q,
                };
            }
            None => {
                self.cluster = Some(Cluster {
                    anchor_area: area,
                    best: level,
                    best_q: q,
                });
            }
        }
    }

    fn trim(&mut self, t: usize, delta: usize) {
        let needed_by_next_q = t + 1 - delta;
        let keep_from = match self.plateau {
            Some(p) => p.start.min(needed_by_next_q),
            None => needed_by_next_q,
        };
        while self.base < keep_from {
            self.window.pop_front();
            self.base += 1;
        }
    }
}

fn relative_distance(anchor: usize, area: usize) -> f64 {
    (anchor as f64 - area as f64).abs() / area as f64
}

/// Rejects NaN and negative merit or clustering thresholds.
pub(crate) fn check_threshold(name: &'static str, value: f32) -> MserResult<()> {
    if value.is_nan() || value < 0.0 {
        return Err(MserError::InvalidParameter {
            name,
            reason: "must be a non-negative number",
        });
    }
    Ok(())
}

/// Runs the stability test over a complete history starting at `birth`.
pub(crate) fn scan_history(
    birth: u8,
    areas: &[u32],
    params: &StabilityParams,
    out: &mut Vec<StableLevel>,
) {
    let mut history = AreaHistory::new(birth);
    for &area in areas {
        history.push(area, params, out);
    }
    history.finish(params, out);
}
