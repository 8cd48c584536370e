use rand::Rng;

use crate::constants::{PASS_NUMBER_MAX, PASS_NUMBER_MIN, PASS_PREFIX};

/// Generate a human-readable pass identifier such as `BPS-48213`.
pub fn generate_pass_id() -> String {
    generate_pass_id_with(&mut rand::thread_rng())
}

pub fn generate_pass_id_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let n = rng.gen_range(PASS_NUMBER_MIN..=PASS_NUMBER_MAX);
    format!("{PASS_PREFIX}{n}")
}

/// Check the `BPS-` + five digit shape.
pub fn is_pass_id(s: &str) -> bool {
    s.strip_prefix(PASS_PREFIX)
        .map(|digits| digits.len() == 5 && digits.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_ids_have_pass_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let id = generate_pass_id_with(&mut rng);
            assert!(is_pass_id(&id), "bad pass id {id}");
            let n: u32 = id[PASS_PREFIX.len()..].parse().unwrap();
            assert!((PASS_NUMBER_MIN..=PASS_NUMBER_MAX).contains(&n));
        }
    }

    #[test]
    fn test_is_pass_id() {
        assert!(is_pass_id("BPS-10000"));
        assert!(!is_pass_id("BPS-1000"));
        assert!(!is_pass_id("XYZ-12345"));
        assert!(!is_pass_id("BPS-12a45"));
    }
}
