use rand::Rng;
use rand::seq::SliceRandom;

use super::constraints::ConstraintConfig;
use super::filter::Candidate;

/// Orders eligible candidates; the generator takes from the front.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRanker {
    fair_distribution: bool,
    week_shift_consistency: bool,
}

impl CandidateRanker {
    pub fn new(fair_distribution: bool, week_shift_consistency: bool) -> Self {
        Self {
            fair_distribution,
            week_shift_consistency,
        }
    }

    pub fn from_config(config: &ConstraintConfig) -> Self {
        Self::new(config.fair_distribution, config.week_shift_consistency)
    }

    /// With fair distribution the order is a stable sort on, in priority
    /// order: pre-allocated first, preference-bound first, consistency score,
    /// total assignments so far, assignments of this shift so far. Equal keys
    /// keep their input order.
    ///
    /// Without it, pre-allocated candidates keep the front in input order and
    /// everyone else is shuffled.
    pub fn rank<'a, R: Rng + ?Sized>(
        &self,
        mut candidates: Vec<Candidate<'a>>,
        rng: &mut R,
    ) -> Vec<Candidate<'a>> {
        if self.fair_distribution {
            let consistency = self.week_shift_consistency;
            candidates.sort_by_key(|c| {
                (
                    !c.pre_allocated,
                    !c.preference_bound,
                    if consistency { c.consistency } else { 0 },
                    c.total,
                    c.shift_count,
                )
            });
            return candidates;
        }

        let (mut ranked, mut rest): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|c| c.pre_allocated);
        rest.shuffle(rng);
        ranked.extend(rest);
        ranked
    }
}
