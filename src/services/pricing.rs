use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::{
        enums::ProductKind,
        pricing_tiers::{self, Column as TierCol, Entity as PricingTiers},
    },
    error::AppResult,
};

/// Fraction of the order total collected up front on the down-payment flow.
pub const DOWN_PAYMENT_PERCENT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTier {
    pub min_pax: i32,
    /// `None` or 0: open-ended, matches every pax count from `min_pax` up.
    pub max_pax: Option<i32>,
    pub price: i64,
}

impl PriceTier {
    pub fn new(min_pax: i32, max_pax: Option<i32>, price: i64) -> Self {
        Self {
            min_pax,
            max_pax,
            price,
        }
    }

    fn matches(&self, pax: i32) -> bool {
        match self.max_pax {
            Some(max) if max > 0 => self.min_pax <= pax && pax <= max,
            _ => pax >= self.min_pax,
        }
    }
}

impl From<pricing_tiers::Model> for PriceTier {
    fn from(model: pricing_tiers::Model) -> Self {
        Self::new(model.min_pax, model.max_pax, model.price)
    }
}

/// Per-pax price for `pax`, scanning tiers in ascending `min_pax` order.
/// Returns `None` when no tier covers the count.
pub fn price_per_pax(tiers: &[PriceTier], pax: i32) -> Option<i64> {
    let mut sorted = tiers.to_vec();
    sorted.sort_by_key(|tier| tier.min_pax);
    sorted
        .iter()
        .find(|tier| tier.matches(pax))
        .map(|tier| tier.price)
}

pub fn down_payment_for(total_amount: i64) -> i64 {
    total_amount * DOWN_PAYMENT_PERCENT / 100
}

pub async fn load_tiers<C: ConnectionTrait>(
    conn: &C,
    kind: ProductKind,
    product_id: Uuid,
) -> AppResult<Vec<PriceTier>> {
    let tiers = PricingTiers::find()
        .filter(TierCol::ProductKind.eq(kind))
        .filter(TierCol::ProductId.eq(product_id))
        .order_by_asc(TierCol::MinPax)
        .all(conn)
        .await?
        .into_iter()
        .map(PriceTier::from)
        .collect();
    Ok(tiers)
}
