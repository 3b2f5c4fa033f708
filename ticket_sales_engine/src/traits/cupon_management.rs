use crate::{
    db_types::{Cupon, CuponId, NewCupon},
    traits::TicketGatewayError,
};

#[allow(async_fn_in_trait)]
pub trait CuponManagement {
    /// Raw lookup of an active coupon by its code. Expiry and remaining uses are NOT checked here.
    async fn fetch_active_cupon_by_code(&self, code: &str) -> Result<Option<Cupon>, TicketGatewayError>;

    async fn fetch_cupon(&self, id: &CuponId) -> Result<Option<Cupon>, TicketGatewayError>;

    async fn create_cupon(&self, cupon: NewCupon) -> Result<Cupon, TicketGatewayError>;

    /// Consumes `quantity` uses of the coupon in a single statement. The remaining amount stops at zero, and the coupon
    /// is deactivated once nothing is left. Returns the updated coupon.
    async fn redeem_cupon(&self, id: &CuponId, quantity: i64) -> Result<Cupon, TicketGatewayError>;
}
