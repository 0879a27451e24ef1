use rand::Rng;

/// Pick one template uniformly at random; `None` for an empty list.
pub fn pick_message<'a, S, R>(messages: &'a [S], rng: &mut R) -> Option<&'a str>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    if messages.is_empty() {
        return None;
    }
    let index = rng.random_range(0..messages.len());
    messages.get(index).map(AsRef::as_ref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_list_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        let empty: [&str; 0] = [];
        assert_eq!(pick_message(&empty, &mut rng), None);
    }

    #[test]
    fn pick_stays_within_list() {
        let mut rng = StdRng::seed_from_u64(7);
        let messages = ["a".to_string(), "b".to_string(), "c".to_string()];
        for _ in 0..64 {
            let picked = pick_message(&messages, &mut rng).unwrap();
            assert!(messages.iter().any(|m| m == picked));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let messages = ["a", "b", "c", "d"];
        let mut first = StdRng::seed_from_u64(42);
        let mut second = StdRng::seed_from_u64(42);
        for _ in 0..16 {
            assert_eq!(
                pick_message(&messages, &mut first),
                pick_message(&messages, &mut second)
            );
        }
    }
}
