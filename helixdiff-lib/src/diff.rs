use crate::base::Base;
use crate::config::DiffConfig;
use crate::error::Result;
use crate::helix::{HelixReader, HelixStream};
use crate::telomere::Subsection;
use std::cmp::{max, min};
use std::collections::HashMap;
use std::io;
use std::mem;
use tracing::trace;

const INF: usize = usize::MAX / 2;

/// Locates divergent subsections between two largely identical sequences.
///
/// Both sequences are walked in lock-step one window at a time. When a window
/// differs, a banded edit-distance alignment restricted to `realign_len` bases
/// on either side finds the cheapest point where the sequences agree again
/// for `anchor_len` bases; the stretch up to that point is reported and the
/// windowed scan resumes from there. Indels wider than the band are picked up
/// by looking the anchors up by k-mer across the whole realignment extent.
/// Only when neither finds a resync point is the extent reported as is, so
/// alignment work per divergence stays bounded.
#[derive(Debug, Clone)]
pub struct Differencer {
    config: DiffConfig,
}

struct Realignment {
    a_len: usize,
    b_len: usize,
    cost: usize,
    resynced: bool,
}

impl Differencer {
    pub fn new(config: DiffConfig) -> Result<Differencer> {
        config.validate()?;
        Ok(Differencer { config })
    }

    /// Divergent `(a, b)` subsection pairs between `a_range` of `a` and `b_range` of `b`,
    /// in ascending order, each in its own sample's base coordinates.
    pub fn diff<HA, HB>(
        &self,
        a: &mut HA,
        a_range: Subsection,
        b: &mut HB,
        b_range: Subsection,
    ) -> io::Result<Vec<(Subsection, Subsection)>>
    where
        HA: HelixStream + ?Sized,
        HB: HelixStream + ?Sized,
    {
        let mut ra = HelixReader::new(a);
        let mut rb = HelixReader::new(b);
        let a_end = max(a_range.start, a_range.end);
        let b_end = max(b_range.start, b_range.end);
        let (mut i, mut j) = (a_range.start, b_range.start);
        let mut divergences: Vec<(Subsection, Subsection)> = Vec::new();

        loop {
            let wa = min(self.config.window_len, a_end - i);
            let wb = min(self.config.window_len, b_end - j);
            if wa == 0 || wb == 0 {
                if wa != 0 || wb != 0 {
                    // one side ran out, the rest of the other is unmatched
                    divergences.push((Subsection::new(i, a_end), Subsection::new(j, b_end)));
                }
                break;
            }
            let xa = ra.fetch(i, wa)?;
            let xb = rb.fetch(j, wb)?;
            let same = xa.iter().zip(xb.iter()).take_while(|(x, y)| x == y).count();
            i += same;
            j += same;
            if same == min(wa, wb) {
                continue;
            }

            let realigned = self.realign(&mut ra, i, a_end, &mut rb, j, b_end)?;
            trace!(
                a_start = i,
                b_start = j,
                a_len = realigned.a_len,
                b_len = realigned.b_len,
                cost = realigned.cost,
                resynced = realigned.resynced,
                "realigned divergence"
            );
            divergences.push((
                Subsection::new(i, i + realigned.a_len),
                Subsection::new(j, j + realigned.b_len),
            ));
            i += realigned.a_len;
            j += realigned.b_len;
        }
        Ok(divergences)
    }

    fn realign<HA, HB>(
        &self,
        ra: &mut HelixReader<'_, HA>,
        i: usize,
        a_end: usize,
        rb: &mut HelixReader<'_, HB>,
        j: usize,
        b_end: usize,
    ) -> io::Result<Realignment>
    where
        HA: HelixStream + ?Sized,
        HB: HelixStream + ?Sized,
    {
        let span = self.config.realign_len + self.config.anchor_len;
        let xa = ra.fetch(i, min(span, a_end - i))?;
        let xb = rb.fetch(j, min(span, b_end - j))?;
        let window = AlignWindow {
            a: &xa,
            b: &xb,
            a_tail: xa.len() == a_end - i,
            b_tail: xb.len() == b_end - j,
            anchor_len: self.config.anchor_len,
        };
        Ok(banded_resync(&window, self.config.realign_len, self.config.band))
    }
}

/// Bases fetched around one divergence; `*_tail` marks a side that reaches the end of its range.
struct AlignWindow<'a> {
    a: &'a [Base],
    b: &'a [Base],
    a_tail: bool,
    b_tail: bool,
    anchor_len: usize,
}

impl AlignWindow<'_> {
    /// Whether the sequences agree again after consuming `x` bases of `a` and `y` of `b`.
    fn is_anchor(&self, x: usize, y: usize) -> bool {
        let k = self.anchor_len;
        if x + k <= self.a.len() && y + k <= self.b.len() {
            self.a[x..x + k] == self.b[y..y + k]
        } else {
            // both ranges finish together with nothing left in between
            self.a_tail && self.b_tail && self.a.len() - x == self.b.len() - y && self.a[x..] == self.b[y..]
        }
    }
}

fn banded_resync(window: &AlignWindow<'_>, realign_len: usize, band: usize) -> Realignment {
    let cols = min(realign_len, window.b.len());
    // rows past the band's reach of the last column hold no cells
    let rows = min(min(realign_len, window.a.len()), cols + band);

    let mut prev = vec![INF; cols + 1];
    let mut cur = vec![INF; cols + 1];
    // (cost, x, y)
    let mut best: Option<(usize, usize, usize)> = None;

    let consider = |cost: usize, x: usize, y: usize, best: &mut Option<(usize, usize, usize)>| {
        if cost >= INF || (x == 0 && y == 0) {
            return;
        }
        if let Some((best_cost, bx, by)) = *best {
            if cost > best_cost || (cost == best_cost && x + y >= bx + by) {
                return;
            }
        }
        if window.is_anchor(x, y) {
            *best = Some((cost, x, y));
        }
    };

    for (y, cell) in prev.iter_mut().enumerate().take(min(cols, band) + 1) {
        *cell = y;
        consider(y, 0, y, &mut best);
    }

    for x in 1..=rows {
        cur.fill(INF);
        let y_lo = x.saturating_sub(band);
        let y_hi = min(cols, x + band);
        if y_lo == 0 {
            cur[0] = x;
        }
        for y in max(y_lo, 1)..=y_hi {
            let sub = prev[y - 1] + (window.a[x - 1] != window.b[y - 1]) as usize;
            let del = prev[y] + 1;
            let ins = cur[y - 1] + 1;
            cur[y] = sub.min(del).min(ins);
        }
        let row_min = cur[y_lo..=y_hi].iter().copied().min().unwrap_or(INF);
        if let Some((best_cost, _, _)) = best {
            // costs never decrease from one row to the next
            if row_min > best_cost {
                break;
            }
        }
        for y in y_lo..=y_hi {
            consider(cur[y], x, y, &mut best);
        }
        mem::swap(&mut prev, &mut cur);
    }

    match best.or_else(|| kmer_resync(window, realign_len)) {
        Some((cost, x, y)) => Realignment {
            a_len: x,
            b_len: y,
            cost,
            resynced: true,
        },
        None => Realignment {
            a_len: rows,
            b_len: cols,
            cost: INF,
            resynced: false,
        },
    }
}

/// Nearest anchor anywhere within `realign_len` of the divergence, as `(cost, x, y)`.
///
/// The cost is that of substituting the shorter side and inserting or
/// deleting the rest, `max(x, y)`; ties go to the smaller `x + y`.
fn kmer_resync(window: &AlignWindow<'_>, realign_len: usize) -> Option<(usize, usize, usize)> {
    let k = window.anchor_len;
    let rows = min(realign_len, window.a.len());
    let cols = min(realign_len, window.b.len());

    let mut starts: HashMap<&[Base], Vec<usize>> = HashMap::new();
    for y in 0..=cols {
        if y + k <= window.b.len() {
            starts.entry(&window.b[y..y + k]).or_default().push(y);
        }
    }

    let mut best: Option<(usize, usize, usize)> = None;
    let mut offer = |x: usize, y: usize| {
        if x == 0 && y == 0 {
            return;
        }
        let cost = max(x, y);
        let better = match best {
            Some((best_cost, bx, by)) => cost < best_cost || (cost == best_cost && x + y < bx + by),
            None => true,
        };
        if better {
            best = Some((cost, x, y));
        }
    };
    for x in 0..=rows {
        if x + k <= window.a.len() {
            if let Some(ys) = starts.get(&window.a[x..x + k]) {
                for &y in ys {
                    offer(x, y);
                }
            }
        } else if let Some(y) = (window.b.len() + x).checked_sub(window.a.len()) {
            // too close to the end for a full anchor, both ranges must finish together
            if y <= cols && window.is_anchor(x, y) {
                offer(x, y);
            }
        }
    }
    best
}
