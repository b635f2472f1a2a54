use crate::currency::{from_cents, to_cents};

/// Splits `total` into `count` amounts that differ only in the last element.
///
/// Every element but the last is `total / count` rounded down to cents; the
/// last one absorbs the remainder so the parts always add back up to `total`.
/// A `count` of zero is treated as one and negative totals as zero.
pub fn even_split(total: f64, count: usize) -> Vec<f64> {
    let count = count.max(1);
    let total_cents = to_cents(total).max(0);
    let parts = count as i64;
    let base = total_cents / parts;
    let last = total_cents - base * (parts - 1);

    let mut amounts = vec![from_cents(base); count];
    amounts[count - 1] = from_cents(last);
    amounts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirds_put_the_remainder_last() {
        assert_eq!(even_split(1000.0, 3), vec![333.33, 333.33, 333.34]);
    }

    #[test]
    fn exact_division_is_uniform() {
        assert_eq!(even_split(1000.0, 4), vec![250.0; 4]);
    }

    #[test]
    fn zero_count_behaves_like_one() {
        assert_eq!(even_split(99.99, 0), vec![99.99]);
    }

    #[test]
    fn negative_total_clamps_to_zero() {
        assert_eq!(even_split(-50.0, 2), vec![0.0, 0.0]);
    }

    #[test]
    fn tiny_totals_land_on_the_last_installment() {
        assert_eq!(even_split(0.02, 3), vec![0.0, 0.0, 0.02]);
    }

    #[test]
    fn parts_sum_back_to_total() {
        for total in [0.0, 0.01, 10.0, 1234.56, 99_999.99] {
            for count in 1..=12 {
                let cents: i64 = even_split(total, count).iter().map(|a| to_cents(*a)).sum();
                assert_eq!(cents, to_cents(total), "total {total} count {count}");
            }
        }
    }
}
