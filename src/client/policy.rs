use crate::SrvRecord;
use rand::Rng;
use std::fmt::Debug;

/// Represents a policy for choosing among SRV-located candidates.
pub trait Policy: Debug + Send + Sync {
    /// Picks one of `candidates`, returning its index, or `None` if there is
    /// nothing to pick from.
    fn select<T, R>(&self, candidates: &[T], rng: &mut R) -> Option<usize>
    where
        T: SrvRecord,
        R: Rng + ?Sized;

    /// Orders every candidate by repeatedly selecting among the ones not
    /// yet picked, returning indices into `candidates` in try-order.
    fn order<T, R>(&self, candidates: &[T], rng: &mut R) -> Vec<usize>
    where
        T: SrvRecord,
        R: Rng + ?Sized,
    {
        let mut remaining: Vec<(usize, &T)> = candidates.iter().enumerate().collect();
        let mut order = Vec::with_capacity(candidates.len());
        while !remaining.is_empty() {
            let records: Vec<&T> = remaining.iter().map(|(_, record)| *record).collect();
            let Some(picked) = self.select(&records, rng) else {
                break;
            };
            order.push(remaining.remove(picked).0);
        }
        order
    }
}

/// Weighted random selection per RFC 2782.
///
/// Only the candidates sharing the lowest priority take part. Each of them is
/// chosen with a probability proportional to its weight; zero-weight
/// candidates keep a small chance of being chosen, and a tier of nothing but
/// zero weights is chosen from uniformly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc2782;

impl Policy for Rfc2782 {
    fn select<T, R>(&self, candidates: &[T], rng: &mut R) -> Option<usize>
    where
        T: SrvRecord,
        R: Rng + ?Sized,
    {
        let best = candidates.iter().map(SrvRecord::priority).min()?;
        let mut tier: Vec<usize> = (0..candidates.len())
            .filter(|&i| candidates[i].priority() == best)
            .collect();

        // Stable sort putting zero weights first.
        tier.sort_by_key(|&i| candidates[i].weight() != 0);

        let total: u64 = tier.iter().map(|&i| u64::from(candidates[i].weight())).sum();
        if total == 0 {
            return Some(tier[rng.random_range(0..tier.len())]);
        }

        let pick = rng.random_range(0..=total);
        let mut running = 0;
        tier.into_iter().find(|&i| {
            running += u64::from(candidates[i].weight());
            running >= pick
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SrvData;
    use rand::{rngs::StdRng, SeedableRng};

    fn record(priority: u16, weight: u16) -> SrvData {
        SrvData {
            target: format!("p{priority}w{weight}.example.com"),
            port: 443,
            priority,
            weight,
        }
    }

    fn frequencies(records: &[SrvData], rounds: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(2782);
        let mut counts = vec![0usize; records.len()];
        for _ in 0..rounds {
            counts[Rfc2782.select(records, &mut rng).unwrap()] += 1;
        }
        counts
            .into_iter()
            .map(|c| c as f64 / rounds as f64)
            .collect()
    }

    #[test]
    fn empty() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(Rfc2782.select::<SrvData, _>(&[], &mut rng), None);
        assert!(Rfc2782.order::<SrvData, _>(&[], &mut rng).is_empty());
    }

    #[test]
    fn only_lowest_priority_is_selected() {
        let records = [record(2, 100), record(1, 0), record(1, 10), record(3, 1000)];
        let freq = frequencies(&records, 2000);
        assert_eq!(freq[0], 0.0);
        assert_eq!(freq[3], 0.0);
        assert!(freq[1] > 0.0 && freq[1] < 0.2, "{freq:?}");
        assert!(freq[2] > 0.8, "{freq:?}");
    }

    #[test]
    fn selects_in_proportion_to_weight() {
        let records = [record(5, 30), record(5, 70)];
        let freq = frequencies(&records, 10_000);
        assert!((freq[0] - 0.3).abs() < 0.025, "{freq:?}");
        assert!((freq[1] - 0.7).abs() < 0.025, "{freq:?}");
    }

    #[test]
    fn zero_weights_are_uniform() {
        let records = [record(0, 0), record(0, 0), record(0, 0), record(0, 0)];
        let freq = frequencies(&records, 8000);
        for f in freq {
            assert!((f - 0.25).abs() < 0.025, "{f}");
        }
    }

    #[test]
    fn order_walks_priorities_in_turn() {
        let records = [record(3, 10), record(1, 10), record(2, 0), record(1, 90)];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let order = Rfc2782.order(&records, &mut rng);
            assert_eq!(order.len(), 4);
            let mut firsts = order[..2].to_vec();
            firsts.sort_unstable();
            assert_eq!(firsts, vec![1, 3]);
            assert_eq!(&order[2..], &[2, 0]);
        }
    }
}
