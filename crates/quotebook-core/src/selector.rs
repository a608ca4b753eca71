//! Random quote selection

use rand::Rng;

use crate::models::Quote;

/// Outcome of asking for a random quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    /// A quote was picked
    Quote(&'a Quote),
    /// Nothing to pick from; `category` is the filter in effect
    Empty { category: String },
}

impl Selection<'_> {
    /// Message shown when there is nothing to display
    pub fn empty_message(category: &str) -> String {
        if category == crate::models::ALL_CATEGORIES {
            "No quotes available. Add some quotes to get started!".to_string()
        } else {
            format!("No quotes found in the \"{}\" category.", category)
        }
    }
}

/// Pick one quote uniformly at random
///
/// The index is `floor(r * len)` for `r` drawn uniformly from `[0, 1)`.
/// Returns `None` for an empty pool.
pub fn pick_random<'a, T, R>(pool: &[&'a T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        return None;
    }
    let r: f64 = rng.gen();
    let index = ((r * pool.len() as f64).floor() as usize).min(pool.len() - 1);
    Some(pool[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quotes(n: usize) -> Vec<Quote> {
        (0..n)
            .map(|i| Quote::server(i as u64, format!("Quote {}.", i), "life"))
            .collect()
    }

    #[test]
    fn test_pick_from_empty_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool: Vec<&Quote> = Vec::new();
        assert!(pick_random(&pool, &mut rng).is_none());
    }

    #[test]
    fn test_pick_single() {
        let mut rng = StdRng::seed_from_u64(1);
        let all = quotes(1);
        let pool: Vec<&Quote> = all.iter().collect();
        assert_eq!(pick_random(&pool, &mut rng), Some(&all[0]));
    }

    #[test]
    fn test_pick_reaches_every_quote() {
        let mut rng = StdRng::seed_from_u64(42);
        let all = quotes(4);
        let pool: Vec<&Quote> = all.iter().collect();

        let mut seen = [false; 4];
        for _ in 0..200 {
            let picked = pick_random(&pool, &mut rng).unwrap();
            seen[picked.id.unwrap() as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_empty_messages() {
        assert!(Selection::empty_message("all").starts_with("No quotes available"));
        assert_eq!(
            Selection::empty_message("life"),
            "No quotes found in the \"life\" category."
        );
    }
}
