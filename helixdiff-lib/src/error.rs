use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompareError {
    /// Wrong chromosome count or unusable configuration.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Seek/read failure from a helix stream, tagged with the chromosome being processed.
    #[error("stream fault on chromosome {chromosome}: {source}")]
    StreamFault {
        chromosome: usize,
        #[source]
        source: io::Error,
    },
}
pub type Result<T> = std::result::Result<T, CompareError>;

impl CompareError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CompareError::InvalidInput(message.into())
    }
    pub fn stream_fault(chromosome: usize, source: io::Error) -> Self {
        CompareError::StreamFault { chromosome, source }
    }
    /// Chromosome index the failure is tied to, if any.
    pub fn chromosome(&self) -> Option<usize> {
        match self {
            CompareError::StreamFault { chromosome, .. } => Some(*chromosome),
            CompareError::InvalidInput(_) => None,
        }
    }
}

/// Attaches a chromosome index to io results coming out of a helix stream.
pub trait StreamContext<T> {
    fn on_chromosome(self, chromosome: usize) -> Result<T>;
}

impl<T> StreamContext<T> for io::Result<T> {
    fn on_chromosome(self, chromosome: usize) -> Result<T> {
        self.map_err(|source| CompareError::stream_fault(chromosome, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_fault_message() {
        let err = io::Result::<()>::Err(io::Error::new(io::ErrorKind::UnexpectedEof, "short read"))
            .on_chromosome(7)
            .unwrap_err();
        assert_eq!(err.chromosome(), Some(7));
        assert_eq!(err.to_string(), "stream fault on chromosome 7: short read");
    }
    #[test]
    fn test_invalid_input_has_no_chromosome() {
        let err = CompareError::invalid_input("22 chromosomes");
        assert_eq!(err.chromosome(), None);
        assert_eq!(err.to_string(), "invalid input: 22 chromosomes");
    }
}
