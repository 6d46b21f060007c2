//! Cost-benefit ranking of product offers.
//!
//! The same product is usually listed by several retailers at different
//! prices and delivery costs. Search results are ordered by how much value
//! each offer returns per unit of money spent:
//!
//! ```text
//! cost             = price + delivery_cost
//! cost_benefit     = estimated_value  / cost
//! marginal_benefit = marginal_benefit / cost
//! total            = cost_benefit + marginal_benefit
//! ```
//!
//! Offers are sorted by `total` descending. Equal totals keep ascending
//! product id order. An offer whose cost is zero or negative scores zero on
//! both ratios, and a missing estimated value or marginal benefit counts as
//! zero.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::ProductId;

/// Decimal places kept on computed ratios.
pub const RATIO_SCALE: u32 = 6;

/// The numbers a product offer contributes to its ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankInput {
    pub price: Decimal,
    pub delivery_cost: Decimal,
    pub estimated_value: Option<Decimal>,
    pub marginal_benefit: Option<Decimal>,
}

/// Anything that can be ranked as a product offer.
pub trait Offer {
    /// Tie-breaker: lower ids rank first among equal scores.
    fn offer_id(&self) -> ProductId;

    /// Figures fed to [`score`].
    fn rank_input(&self) -> RankInput;
}

/// Computed score for one offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    /// `price + delivery_cost`.
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    /// `estimated_value / cost`.
    #[serde(with = "rust_decimal::serde::float")]
    pub cost_benefit: Decimal,
    /// `marginal_benefit / cost`.
    #[serde(with = "rust_decimal::serde::float")]
    pub marginal_benefit: Decimal,
    /// Sum of both ratios; the sort key.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// An offer together with its score and 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked<T> {
    #[serde(flatten)]
    pub item: T,
    pub rank: usize,
    pub score: Score,
}

/// Score a single offer.
#[must_use]
pub fn score(input: &RankInput) -> Score {
    let cost = input.price + input.delivery_cost;
    let ratio = |numerator: Option<Decimal>| -> Decimal {
        if cost <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        numerator
            .unwrap_or(Decimal::ZERO)
            .checked_div(cost)
            .unwrap_or(Decimal::ZERO)
            .round_dp(RATIO_SCALE)
    };

    let cost_benefit = ratio(input.estimated_value);
    let marginal_benefit = ratio(input.marginal_benefit);

    Score {
        cost,
        cost_benefit,
        marginal_benefit,
        total: cost_benefit + marginal_benefit,
    }
}

/// Score and order a set of offers, best first.
#[must_use]
pub fn rank<T: Offer>(items: Vec<T>) -> Vec<Ranked<T>> {
    let mut scored: Vec<(Score, T)> = items
        .into_iter()
        .map(|item| (score(&item.rank_input()), item))
        .collect();

    scored.sort_by(|(a_score, a), (b_score, b)| {
        b_score
            .total
            .cmp(&a_score.total)
            .then_with(|| a.offer_id().cmp(&b.offer_id()))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(index, (score, item))| Ranked {
            item,
            rank: index + 1,
            score,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    struct Listing {
        id: i32,
        input_price: Decimal,
        #[serde(skip)]
        input: RankInput,
    }

    impl Offer for Listing {
        fn offer_id(&self) -> ProductId {
            ProductId::new(self.id)
        }

        fn rank_input(&self) -> RankInput {
            self.input
        }
    }

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn listing(id: i32, price: Decimal, delivery: Decimal, value: Decimal, marginal: Decimal) -> Listing {
        Listing {
            id,
            input_price: price,
            input: RankInput {
                price,
                delivery_cost: delivery,
                estimated_value: Some(value),
                marginal_benefit: Some(marginal),
            },
        }
    }

    #[test]
    fn test_score_sums_both_ratios() {
        let s = score(&RankInput {
            price: d("90"),
            delivery_cost: d("10"),
            estimated_value: Some(d("150")),
            marginal_benefit: Some(d("20")),
        });
        assert_eq!(s.cost, d("100"));
        assert_eq!(s.cost_benefit, d("1.5"));
        assert_eq!(s.marginal_benefit, d("0.2"));
        assert_eq!(s.total, d("1.7"));
    }

    #[test]
    fn test_score_zero_cost_is_guarded() {
        let s = score(&RankInput {
            price: Decimal::ZERO,
            delivery_cost: Decimal::ZERO,
            estimated_value: Some(d("500")),
            marginal_benefit: Some(d("0.5")),
        });
        assert_eq!(s.cost, Decimal::ZERO);
        assert_eq!(s.total, Decimal::ZERO);
    }

    #[test]
    fn test_score_missing_figures_count_as_zero() {
        let s = score(&RankInput {
            price: d("50"),
            delivery_cost: Decimal::ZERO,
            estimated_value: None,
            marginal_benefit: Some(d("5")),
        });
        assert_eq!(s.cost_benefit, Decimal::ZERO);
        assert_eq!(s.marginal_benefit, d("0.1"));
    }

    #[test]
    fn test_score_rounds_ratios() {
        let s = score(&RankInput {
            price: d("3"),
            delivery_cost: Decimal::ZERO,
            estimated_value: Some(d("1")),
            marginal_benefit: None,
        });
        assert_eq!(s.cost_benefit, d("0.333333"));
    }

    #[test]
    fn test_rank_orders_best_value_first() {
        // Same phone from three retailers. Free delivery on the dearer
        // listing still returns the most value per shilling spent.
        let offers = vec![
            listing(1, d("115000"), d("500"), d("125000"), d("0.15")),
            listing(2, d("120000"), d("0"), d("130000"), d("0.12")),
            listing(3, d("110000"), d("1000"), d("120000"), d("0.10")),
        ];

        let ranked = rank(offers);
        let order: Vec<i32> = ranked.iter().map(|r| r.item.id).collect();
        assert_eq!(order, vec![2, 1, 3]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
        assert!(ranked[0].score.total >= ranked[1].score.total);
        assert!(ranked[1].score.total >= ranked[2].score.total);
    }

    #[test]
    fn test_rank_ties_break_on_id() {
        let offers = vec![
            listing(9, d("10"), d("0"), d("20"), d("0")),
            listing(4, d("10"), d("0"), d("20"), d("0")),
            listing(7, d("10"), d("0"), d("20"), d("0")),
        ];
        let order: Vec<i32> = rank(offers).iter().map(|r| r.item.id).collect();
        assert_eq!(order, vec![4, 7, 9]);
    }

    #[test]
    fn test_rank_empty() {
        let ranked = rank::<Listing>(Vec::new());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_ranked_serializes_flat_with_float_scores() {
        let ranked = rank(vec![listing(1, d("90"), d("10"), d("150"), d("20"))]);
        let json = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["rank"], 1);
        assert_eq!(json["score"]["total"], 1.7);
    }
}
