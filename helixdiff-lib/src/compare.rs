use crate::config::CompareConfig;
use crate::diff::Differencer;
use crate::error::{CompareError, Result, StreamContext};
use crate::helix::Person;
use crate::sex::SexChromosome;
use crate::telomere::{data_range, Subsection};
use std::fmt;
use std::thread;
use tracing::{debug, info, info_span, warn};

/// Chromosomes in a valid sample.
pub const NUM_CHROMOSOMES: usize = 23;
pub const SEX_CHROMOSOME_IDX: usize = 22;

/// One divergent region between the two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Difference {
    chromosome: usize,
    person_a: Subsection,
    person_b: Subsection,
}

impl Difference {
    pub(crate) fn new(chromosome: usize, person_a: Subsection, person_b: Subsection) -> Difference {
        Difference {
            chromosome,
            person_a,
            person_b,
        }
    }
    pub fn chromosome(&self) -> usize {
        self.chromosome
    }
    pub fn person_a(&self) -> Subsection {
        self.person_a
    }
    pub fn person_b(&self) -> Subsection {
        self.person_b
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chromosome {} | first sample: {} second sample: {}",
            self.chromosome, self.person_a, self.person_b
        )
    }
}

#[derive(Debug)]
pub enum ChromosomeOutcome {
    Compared(Vec<Difference>),
    /// Sex chromosomes of differing or unknown sex are not comparable.
    Skipped { a: SexChromosome, b: SexChromosome },
    Failed(CompareError),
}

/// Per-chromosome outcomes of a parallel comparison, in chromosome order.
#[derive(Debug)]
pub struct ComparisonReport {
    outcomes: Vec<(usize, ChromosomeOutcome)>,
}

impl ComparisonReport {
    pub fn outcomes(&self) -> &[(usize, ChromosomeOutcome)] {
        &self.outcomes
    }
    pub fn outcome(&self, chromosome: usize) -> Option<&ChromosomeOutcome> {
        self.outcomes
            .iter()
            .find(|(idx, _)| *idx == chromosome)
            .map(|(_, outcome)| outcome)
    }
    pub fn differences(&self) -> impl Iterator<Item = &Difference> {
        self.outcomes.iter().flat_map(|(_, outcome)| match outcome {
            ChromosomeOutcome::Compared(diffs) => diffs.as_slice(),
            _ => &[],
        })
    }
    pub fn failures(&self) -> impl Iterator<Item = &CompareError> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            ChromosomeOutcome::Failed(err) => Some(err),
            _ => None,
        })
    }
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
    /// All-or-nothing view: the differences, or the failure of the lowest chromosome index.
    pub fn into_result(self) -> Result<Vec<Difference>> {
        let mut differences = Vec::new();
        for (_, outcome) in self.outcomes {
            match outcome {
                ChromosomeOutcome::Compared(diffs) => differences.extend(diffs),
                ChromosomeOutcome::Skipped { .. } => {}
                ChromosomeOutcome::Failed(err) => return Err(err),
            }
        }
        Ok(differences)
    }
}

/// Compares two samples chromosome by chromosome.
///
/// Every chromosome is trimmed of its telomeres and the informative interiors
/// are handed to the [`Differencer`]. The sex chromosome is only compared when
/// both samples classify to the same known sex.
#[derive(Debug, Clone)]
pub struct Comparator {
    config: CompareConfig,
    differ: Differencer,
}

fn check_counts<PA: Person, PB: Person>(a: &PA, b: &PB) -> Result<()> {
    if a.chromosomes() != NUM_CHROMOSOMES || b.chromosomes() != NUM_CHROMOSOMES {
        return Err(CompareError::invalid_input(format!(
            "chromosome data does not match expected size: {} and {} chromosomes, expected {}",
            a.chromosomes(),
            b.chromosomes(),
            NUM_CHROMOSOMES
        )));
    }
    Ok(())
}

impl Comparator {
    pub fn new(config: CompareConfig) -> Result<Comparator> {
        config.validate()?;
        let differ = Differencer::new(config.diff.clone())?;
        Ok(Comparator { config, differ })
    }

    /// Compares one chromosome pair. Never yields `ChromosomeOutcome::Failed`; failures are returned as errors.
    pub fn compare_chromosome<PA: Person, PB: Person>(
        &self,
        a: &PA,
        b: &PB,
        chromosome: usize,
    ) -> Result<ChromosomeOutcome> {
        let _span = info_span!("chromosome", index = chromosome).entered();
        let mut helix_a = a.chromosome(chromosome).on_chromosome(chromosome)?;
        let mut helix_b = b.chromosome(chromosome).on_chromosome(chromosome)?;

        if chromosome == SEX_CHROMOSOME_IDX {
            let a_sex = self.config.sex.classify(&helix_a);
            let b_sex = self.config.sex.classify(&helix_b);
            if a_sex != b_sex || a_sex == SexChromosome::Unknown {
                debug!(?a_sex, ?b_sex, "sex chromosomes not comparable, skipping");
                return Ok(ChromosomeOutcome::Skipped { a: a_sex, b: b_sex });
            }
        }

        let a_range = data_range(&mut helix_a).on_chromosome(chromosome)?;
        let b_range = data_range(&mut helix_b).on_chromosome(chromosome)?;
        debug!(
            a_start = a_range.start,
            a_end = a_range.end,
            b_start = b_range.start,
            b_end = b_range.end,
            "trimmed telomeres"
        );

        let differences: Vec<Difference> = self
            .differ
            .diff(&mut helix_a, a_range, &mut helix_b, b_range)
            .on_chromosome(chromosome)?
            .into_iter()
            .map(|(pa, pb)| Difference::new(chromosome, pa, pb))
            .collect();
        debug!(differences = differences.len(), "chromosome compared");
        Ok(ChromosomeOutcome::Compared(differences))
    }

    /// Sequential comparison; the first stream fault aborts the whole run.
    pub fn compare<PA: Person, PB: Person>(&self, a: &PA, b: &PB) -> Result<Vec<Difference>> {
        check_counts(a, b)?;
        let mut differences: Vec<Difference> = Vec::new();
        for chromosome in 0..NUM_CHROMOSOMES {
            if let ChromosomeOutcome::Compared(diffs) = self.compare_chromosome(a, b, chromosome)? {
                differences.extend(diffs);
            }
        }
        info!(differences = differences.len(), "comparison finished");
        Ok(differences)
    }

    /// Compares chromosomes on `config.threads` workers.
    ///
    /// Each worker pulls chromosome indices off a shared queue and opens its
    /// own streams, so a failing chromosome only fails its own outcome. The
    /// outcomes are merged by chromosome index once every worker is done.
    pub fn compare_parallel<PA, PB>(&self, a: &PA, b: &PB) -> Result<ComparisonReport>
    where
        PA: Person + Sync,
        PB: Person + Sync,
    {
        check_counts(a, b)?;
        let (job_send, job_recv) = crossbeam_channel::bounded::<usize>(NUM_CHROMOSOMES);
        let (result_send, result_recv) = crossbeam_channel::unbounded::<(usize, ChromosomeOutcome)>();
        for chromosome in 0..NUM_CHROMOSOMES {
            // queue holds every index, cannot be full or disconnected here
            if job_send.send(chromosome).is_err() {
                break;
            }
        }
        drop(job_send);

        let n_threads = self.config.threads.min(NUM_CHROMOSOMES);
        thread::scope(|scope| {
            for _ in 0..n_threads {
                let jobs = job_recv.clone();
                let results = result_send.clone();
                scope.spawn(move || {
                    for chromosome in jobs.iter() {
                        let outcome = self.compare_chromosome(a, b, chromosome).unwrap_or_else(|err| {
                            warn!(chromosome, error = %err, "chromosome comparison failed");
                            ChromosomeOutcome::Failed(err)
                        });
                        if results.send((chromosome, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_send);

        let mut outcomes: Vec<(usize, ChromosomeOutcome)> = result_recv.iter().collect();
        outcomes.sort_by_key(|(chromosome, _)| *chromosome);
        let report = ComparisonReport { outcomes };
        info!(
            differences = report.differences().count(),
            failures = report.failures().count(),
            "parallel comparison finished"
        );
        Ok(report)
    }
}

/// Compares two samples with the default configuration.
pub fn compare<PA: Person, PB: Person>(a: &PA, b: &PB) -> Result<Vec<Difference>> {
    Comparator::new(CompareConfig::default())?.compare(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_difference_display() {
        let diff = Difference::new(4, Subsection::new(10, 12), Subsection::new(11, 11));
        assert_eq!(
            diff.to_string(),
            "Chromosome 4 | first sample: [10, 12] second sample: [11, 11]"
        );
    }
    #[test]
    fn test_report_views() {
        let report = ComparisonReport {
            outcomes: vec![
                (
                    0,
                    ChromosomeOutcome::Compared(vec![Difference::new(
                        0,
                        Subsection::new(1, 2),
                        Subsection::new(1, 2),
                    )]),
                ),
                (
                    1,
                    ChromosomeOutcome::Failed(CompareError::stream_fault(
                        1,
                        io::Error::new(io::ErrorKind::Other, "bad sector"),
                    )),
                ),
                (
                    22,
                    ChromosomeOutcome::Skipped {
                        a: SexChromosome::X,
                        b: SexChromosome::Y,
                    },
                ),
            ],
        };
        assert_eq!(report.differences().count(), 1);
        assert_eq!(report.failures().count(), 1);
        assert!(!report.is_complete());
        assert!(matches!(report.outcome(22), Some(ChromosomeOutcome::Skipped { .. })));
        assert!(report.outcome(5).is_none());
        let err = report.into_result().unwrap_err();
        assert_eq!(err.chromosome(), Some(1));
    }
}
