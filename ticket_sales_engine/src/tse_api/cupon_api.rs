use std::fmt::Debug;

use chrono::{NaiveDate, Utc};
use log::*;

use crate::{
    db_types::{Cupon, CuponId, NewCupon},
    traits::CuponManagement,
    tse_api::errors::CuponError,
};

/// `CuponLedgerApi` is the only way the rest of the engine reads or spends coupon inventory.
pub struct CuponLedgerApi<B> {
    db: B,
}

impl<B> Debug for CuponLedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CuponLedgerApi")
    }
}

impl<B> CuponLedgerApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Checks that the coupon still has at least `quantity` uses left. Nothing is modified.
    pub fn reserve(&self, cupon: &Cupon, quantity: i64) -> Result<(), CuponError> {
        if cupon.amount < quantity {
            debug!("🎟️ Cupon '{}' has {} uses left. {quantity} requested.", cupon.name, cupon.amount);
            return Err(CuponError::InsufficientCupons {
                cupon_id: cupon.id.clone(),
                available: cupon.amount,
                requested: quantity,
            });
        }
        Ok(())
    }
}

impl<B> CuponLedgerApi<B>
where B: CuponManagement
{
    /// Looks up a coupon by code and returns it only if it can be used today.
    pub async fn find_available(&self, code: &str) -> Result<Option<Cupon>, CuponError> {
        self.find_available_on(code, Utc::now().date_naive()).await
    }

    /// As [`Self::find_available`], evaluating expiry against the given date.
    pub async fn find_available_on(&self, code: &str, today: NaiveDate) -> Result<Option<Cupon>, CuponError> {
        let cupon = self.db.fetch_active_cupon_by_code(code).await?;
        let available = cupon.filter(|c| {
            let ok = c.is_available(today);
            if !ok {
                debug!("🎟️ Cupon '{}' is not available (amount: {}, ends {})", c.name, c.amount, c.end_date);
            }
            ok
        });
        Ok(available)
    }

    /// Spends `quantity` uses of the coupon. The remaining amount stops at zero and the coupon is switched off once
    /// empty.
    pub async fn redeem(&self, id: &CuponId, quantity: i64) -> Result<Cupon, CuponError> {
        let cupon = self.db.redeem_cupon(id, quantity).await?;
        info!("🎟️ Cupon '{}' redeemed for {quantity} tickets. {} uses left.", cupon.name, cupon.amount);
        Ok(cupon)
    }

    pub async fn create_cupon(&self, cupon: NewCupon) -> Result<Cupon, CuponError> {
        let cupon = self.db.create_cupon(cupon).await?;
        Ok(cupon)
    }
}
