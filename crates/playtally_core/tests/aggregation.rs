use playtally_core::{fold, normalize, Histogram, PlayRecord};
use pretty_assertions::assert_eq;

fn rec(player_count: u32, quantity: u64) -> PlayRecord {
    PlayRecord {
        quantity,
        player_count,
    }
}

#[test]
fn two_pages_accumulate_per_player_count() {
    let page_a = [rec(2, 3)];
    let page_b = [rec(2, 4), rec(0, 1)];

    let histogram = fold(fold(Histogram::new(), &page_a), &page_b);

    assert_eq!(histogram.iter().collect::<Vec<_>>(), vec![(0, 1), (2, 7)]);
}

#[test]
fn unpopulated_index_is_filled_with_zero() {
    let pages = [vec![rec(1, 2), rec(5, 1)], vec![rec(2, 1), rec(4, 6)]];
    let mut histogram = Histogram::new();
    for page in &pages {
        histogram = normalize(fold(histogram, page));
    }

    assert_eq!(histogram.get(3), Some(0));
    assert_eq!(histogram.to_dense(), vec![0, 2, 1, 0, 6, 1]);
    assert!(histogram.is_normalized());
}

#[test]
fn normalization_between_folds_does_not_change_totals() {
    let records = [rec(6, 1), rec(2, 2), rec(6, 3)];
    let plain = normalize(fold(Histogram::new(), &records));

    let mut stepwise = Histogram::new();
    for record in &records {
        stepwise = normalize(fold(stepwise, std::slice::from_ref(record)));
    }

    assert_eq!(plain, stepwise);
    assert_eq!(plain.total(), 6);
}
