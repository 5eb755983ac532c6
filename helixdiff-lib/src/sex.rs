use crate::base::PACKED_SIZE;
use crate::config::SexBands;
use crate::helix::HelixStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SexChromosome {
    X,
    Y,
    /// Length outside both reference bands, unlikely to be a real chromosome 23.
    Unknown,
}

fn within_band(len: usize, reference: usize) -> bool {
    // strictly inside (4/5, 5/4) of the reference length, widened so any usize fits
    let (len, reference) = (len as u128, reference as u128);
    len > 4 * reference / 5 && len < 5 * reference / 4
}

impl SexBands {
    /// Classifies a chromosome-23 helix by its length alone; the stream cursor is never touched.
    pub fn classify<H: HelixStream + ?Sized>(&self, helix: &H) -> SexChromosome {
        self.classify_len(helix.size() * PACKED_SIZE)
    }
    pub fn classify_len(&self, helix_len: usize) -> SexChromosome {
        if within_band(helix_len, self.x_len) {
            SexChromosome::X
        } else if within_band(helix_len, self.y_len) {
            SexChromosome::Y
        } else {
            SexChromosome::Unknown
        }
    }
}

/// Classifies against the reference human X/Y lengths.
pub fn classify_sex<H: HelixStream + ?Sized>(helix: &H) -> SexChromosome {
    SexBands::default().classify(helix)
}
