use crate::base::Base;
use crate::base::Base::{A, G, T};
use crate::helix::{HelixReader, HelixStream};
use std::fmt;
use std::io;

/// Repeating unit at both ends of a chromosome.
pub const TELOMERE_SEQ: [Base; 6] = [T, T, A, G, G, G];
const PERIOD: usize = TELOMERE_SEQ.len();

/// Half-open `[start, end)` range of base indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Subsection {
    pub start: usize,
    pub end: usize,
}

impl Subsection {
    pub fn new(start: usize, end: usize) -> Subsection {
        Subsection { start, end }
    }
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Subsection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Rotation of the telomere pattern that lines up with `window` read front to back.
fn leading_phase(window: &[Base]) -> Option<usize> {
    (0..PERIOD).find(|&t| {
        window
            .iter()
            .enumerate()
            .all(|(k, b)| *b == TELOMERE_SEQ[(t + k) % PERIOD])
    })
}

/// Rotation of the telomere pattern that lines up with `window` read back to front,
/// `window[0]` being the last base of the helix.
fn trailing_phase(window: &[Base]) -> Option<usize> {
    (0..PERIOD).find(|&t| {
        window
            .iter()
            .enumerate()
            .all(|(k, b)| *b == TELOMERE_SEQ[(PERIOD + t - k % PERIOD) % PERIOD])
    })
}

/// Returns the `[start, end)` base range lying between the leading and trailing telomeres.
///
/// A telomere is only recognised when the first (or last) full pattern period
/// matches some rotation of `TTAGGG`; from there the scan follows the pattern
/// one base at a time until the phase breaks, so partial periods are trimmed to
/// the exact mismatching base. Helices shorter than one period are returned
/// untouched. If the whole helix is telomere the range comes back empty
/// (`start >= end`).
///
/// Bases are pulled through a [`HelixReader`], so any chunk size works; the
/// trailing scan relies on the stream being able to seek backwards.
pub fn data_range<H: HelixStream + ?Sized>(helix: &mut H) -> io::Result<Subsection> {
    let mut reader = HelixReader::new(helix);
    let mut data_start = 0;
    let mut data_end = reader.len();

    if data_end < PERIOD {
        return Ok(Subsection::new(data_start, data_end));
    }

    let head = reader.fetch(0, PERIOD)?;
    if let Some(mut phase) = leading_phase(&head) {
        data_start = PERIOD;
        while data_start < data_end && reader.base_at(data_start)? == TELOMERE_SEQ[phase] {
            data_start += 1;
            phase = (phase + 1) % PERIOD;
        }
    }

    // not enough left over to classify a trailing telomere
    if data_end < data_start + PERIOD {
        return Ok(Subsection::new(data_start, data_end));
    }

    let mut tail = reader.fetch(data_end - PERIOD, PERIOD)?;
    tail.reverse();
    if let Some(mut phase) = trailing_phase(&tail) {
        data_end -= PERIOD;
        while data_end > data_start && reader.base_at(data_end - 1)? == TELOMERE_SEQ[phase] {
            data_end -= 1;
            phase = (PERIOD + phase - 1) % PERIOD;
        }
    }

    Ok(Subsection::new(data_start, data_end))
}
