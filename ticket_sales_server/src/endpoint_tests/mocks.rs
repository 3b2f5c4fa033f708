use mockall::mock;
use ticket_sales_engine::{
    db_types::{Cupon, CuponId, NewCupon, NewPhase, Phase, PhaseId},
    traits::{
        CheckoutProvider,
        CheckoutSessionRequest,
        CuponManagement,
        PhaseManagement,
        ProviderError,
        ProviderLineItem,
        ProviderSession,
        TicketGatewayError,
    },
};

mock! {
    pub PhaseManager {}
    impl PhaseManagement for PhaseManager {
        async fn fetch_active_phase(&self) -> Result<Option<Phase>, TicketGatewayError>;
        async fn fetch_phase(&self, id: &PhaseId) -> Result<Option<Phase>, TicketGatewayError>;
        async fn fetch_active_phase_by_name(&self, name: &str) -> Result<Option<Phase>, TicketGatewayError>;
        async fn fetch_phases(&self) -> Result<Vec<Phase>, TicketGatewayError>;
        async fn count_tickets_for_phase(&self, id: &PhaseId) -> Result<i64, TicketGatewayError>;
        async fn create_phase(&self, phase: NewPhase) -> Result<Phase, TicketGatewayError>;
        async fn activate_phase(&self, id: &PhaseId) -> Result<Phase, TicketGatewayError>;
    }
}

mock! {
    pub CuponManager {}
    impl CuponManagement for CuponManager {
        async fn fetch_active_cupon_by_code(&self, code: &str) -> Result<Option<Cupon>, TicketGatewayError>;
        async fn fetch_cupon(&self, id: &CuponId) -> Result<Option<Cupon>, TicketGatewayError>;
        async fn create_cupon(&self, cupon: NewCupon) -> Result<Cupon, TicketGatewayError>;
        async fn redeem_cupon(&self, id: &CuponId, quantity: i64) -> Result<Cupon, TicketGatewayError>;
    }
}

mock! {
    pub Provider {}
    impl CheckoutProvider for Provider {
        async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<ProviderSession, ProviderError>;
        async fn fetch_checkout_session(&self, session_id: &str) -> Result<ProviderSession, ProviderError>;
        async fn fetch_line_items(&self, session_id: &str) -> Result<Vec<ProviderLineItem>, ProviderError>;
    }
}
