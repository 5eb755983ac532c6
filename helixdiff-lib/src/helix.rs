use crate::base::{pack_bases, string_to_bases, unpack, Base, PACKED_SIZE};
use std::cmp::{max, min};
use std::io;
use std::sync::Arc;

/// Default number of bases handed out per `read()` by in-memory helices.
pub const CHUNK_SIZE: usize = 1 << 16;

/// Seekable, chunked source of one chromosome's bases.
///
/// `seek` positions the stream at the first base of a storage unit, `read`
/// returns the next chunk of bases (empty once the stream is exhausted) and
/// `size` is the total number of storage units. Chunks may be as small as a
/// single base.
pub trait HelixStream {
    fn seek(&mut self, unit_idx: usize) -> io::Result<()>;
    fn read(&mut self) -> io::Result<Vec<Base>>;
    fn size(&self) -> usize;
}

/// A sample: a set of chromosome streams.
pub trait Person {
    type Helix: HelixStream;
    fn chromosomes(&self) -> usize;
    fn chromosome(&self, idx: usize) -> io::Result<Self::Helix>;
}

impl<H: HelixStream + ?Sized> HelixStream for &mut H {
    fn seek(&mut self, unit_idx: usize) -> io::Result<()> {
        (**self).seek(unit_idx)
    }
    fn read(&mut self) -> io::Result<Vec<Base>> {
        (**self).read()
    }
    fn size(&self) -> usize {
        (**self).size()
    }
}

impl<H: HelixStream + ?Sized> HelixStream for Box<H> {
    fn seek(&mut self, unit_idx: usize) -> io::Result<()> {
        (**self).seek(unit_idx)
    }
    fn read(&mut self) -> io::Result<Vec<Base>> {
        (**self).read()
    }
    fn size(&self) -> usize {
        (**self).size()
    }
}

/// Random access by base index on top of `seek`/`read`.
///
/// Only the most recently read chunk is kept. Accesses at or just past the
/// end of that chunk keep reading forward; anything else re-seeks to the
/// containing storage unit, reaching back one chunk width when moving
/// backwards so reverse scans do not re-seek on every base.
pub struct HelixReader<'h, H: HelixStream + ?Sized> {
    helix: &'h mut H,
    len: usize,
    chunk_start: usize,
    chunk: Vec<Base>,
    // stream cursor sits at chunk_start + chunk.len()
    positioned: bool,
    // widest chunk seen so far
    stride: usize,
}

impl<'h, H: HelixStream + ?Sized> HelixReader<'h, H> {
    pub fn new(helix: &'h mut H) -> HelixReader<'h, H> {
        let len = helix.size() * PACKED_SIZE;
        HelixReader {
            helix,
            len,
            chunk_start: 0,
            chunk: Vec::new(),
            positioned: false,
            stride: PACKED_SIZE,
        }
    }
    /// Length of the helix in bases.
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    fn chunk_end(&self) -> usize {
        self.chunk_start + self.chunk.len()
    }
    fn reposition(&mut self, idx: usize) -> io::Result<()> {
        let target = if idx < self.chunk_start {
            (idx + 1).saturating_sub(self.stride)
        } else {
            idx
        };
        let unit = target / PACKED_SIZE;
        self.helix.seek(unit)?;
        self.chunk_start = unit * PACKED_SIZE;
        self.chunk.clear();
        self.positioned = true;
        Ok(())
    }
    fn load(&mut self, idx: usize) -> io::Result<()> {
        if idx >= self.len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("base {} is past the end of the helix ({} bases)", idx, self.len),
            ));
        }
        let chunk_end = self.chunk_end();
        if idx >= self.chunk_start && idx < chunk_end {
            return Ok(());
        }
        let sequential = self.positioned && idx >= chunk_end && idx - chunk_end < self.stride;
        if !sequential {
            self.reposition(idx)?;
        }
        while idx >= self.chunk_end() {
            let next_start = self.chunk_end();
            let chunk = self.helix.read()?;
            if chunk.is_empty() {
                self.positioned = false;
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("helix ended at base {} of {}", next_start, self.len),
                ));
            }
            self.stride = max(self.stride, chunk.len());
            self.chunk_start = next_start;
            self.chunk = chunk;
        }
        Ok(())
    }
    pub fn base_at(&mut self, idx: usize) -> io::Result<Base> {
        self.load(idx)?;
        Ok(self.chunk[idx - self.chunk_start])
    }
    /// Copies `[start, start + len)` out of the helix.
    pub fn fetch(&mut self, start: usize, len: usize) -> io::Result<Vec<Base>> {
        let end = start + len;
        let mut out = Vec::with_capacity(len);
        let mut idx = start;
        while idx < end {
            self.load(idx)?;
            let offset = idx - self.chunk_start;
            let take = min(self.chunk.len() - offset, end - idx);
            out.extend_from_slice(&self.chunk[offset..offset + take]);
            idx += take;
        }
        Ok(out)
    }
}

/// In-memory helix over packed storage units.
#[derive(Clone, Debug)]
pub struct PackedHelix {
    data: Arc<[u8]>,
    chunk_bases: usize,
    // by base
    cursor: usize,
}

impl PackedHelix {
    pub fn new(data: impl Into<Arc<[u8]>>, chunk_bases: usize) -> io::Result<PackedHelix> {
        if chunk_bases == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "chunk size must be at least one base",
            ));
        }
        Ok(PackedHelix {
            data: data.into(),
            chunk_bases,
            cursor: 0,
        })
    }
    /// Packs `bases`, whose length must be a multiple of `PACKED_SIZE`.
    pub fn from_bases(bases: &[Base], chunk_bases: usize) -> io::Result<PackedHelix> {
        let data = pack_bases(bases).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("helix length must be a multiple of {}", PACKED_SIZE),
            )
        })?;
        PackedHelix::new(data, chunk_bases)
    }
    /// Builds a helix from an `ACGT` string whose length is a multiple of `PACKED_SIZE`.
    pub fn parse(seq: &str, chunk_bases: usize) -> io::Result<PackedHelix> {
        let bases = string_to_bases(seq.as_bytes()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "helix may only contain A, C, G and T")
        })?;
        PackedHelix::from_bases(&bases, chunk_bases)
    }
    pub fn len(&self) -> usize {
        self.data.len() * PACKED_SIZE
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl HelixStream for PackedHelix {
    fn seek(&mut self, unit_idx: usize) -> io::Result<()> {
        if unit_idx > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to unit {} past end of helix ({} units)", unit_idx, self.data.len()),
            ));
        }
        self.cursor = unit_idx * PACKED_SIZE;
        Ok(())
    }
    fn read(&mut self) -> io::Result<Vec<Base>> {
        let end = min(self.cursor + self.chunk_bases, self.len());
        let chunk = (self.cursor..end)
            .map(|idx| unpack(self.data[idx / PACKED_SIZE])[idx % PACKED_SIZE])
            .collect();
        self.cursor = end;
        Ok(chunk)
    }
    fn size(&self) -> usize {
        self.data.len()
    }
}

/// In-memory person; every `chromosome()` call hands out an independent cursor.
#[derive(Clone, Debug, Default)]
pub struct PackedPerson {
    chromosomes: Vec<PackedHelix>,
}

impl PackedPerson {
    pub fn new(chromosomes: Vec<PackedHelix>) -> PackedPerson {
        PackedPerson { chromosomes }
    }
}

impl Person for PackedPerson {
    type Helix = PackedHelix;

    fn chromosomes(&self) -> usize {
        self.chromosomes.len()
    }
    fn chromosome(&self, idx: usize) -> io::Result<PackedHelix> {
        let helix = self.chromosomes.get(idx).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no chromosome {} (person has {})", idx, self.chromosomes.len()),
            )
        })?;
        let mut helix = helix.clone();
        helix.cursor = 0;
        Ok(helix)
    }
}
