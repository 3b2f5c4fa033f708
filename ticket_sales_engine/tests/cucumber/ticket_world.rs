use std::collections::HashMap;

use cucumber::World;
use ticket_sales_engine::{
    checkout_objects::{CheckoutConfig, CheckoutOutcome},
    db_types::CuponId,
    events::EventProducers,
    reconciliation_objects::{PaymentEvent, ReconciliationOutcome},
    CheckoutApi,
    CheckoutError,
    ReconciliationApi,
    ReconciliationError,
    SqliteDatabase,
};

use crate::support::{fake_provider::FakeProvider, prepare_env::new_test_db};

#[derive(Default, Debug, World)]
pub struct TicketWorld {
    pub system: Option<TicketSystem>,
}

#[derive(Debug)]
pub struct TicketSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub provider: FakeProvider,
    pub checkout: CheckoutApi<SqliteDatabase, FakeProvider>,
    pub reconciler: ReconciliationApi<SqliteDatabase, FakeProvider>,
    pub cupons: HashMap<String, CuponId>,
    pub last_checkout: Option<Result<CheckoutOutcome, CheckoutError>>,
    pub last_event: Option<PaymentEvent>,
    pub last_reconciliation: Option<Result<ReconciliationOutcome, ReconciliationError>>,
}

impl TicketWorld {
    pub fn sys(&mut self) -> &mut TicketSystem {
        self.system.as_mut().expect("The system has not been initialised. Start with 'Given a fresh install'")
    }
}

impl TicketSystem {
    pub async fn new() -> Self {
        let (db_path, db) = new_test_db().await;
        let provider = FakeProvider::default();
        let config = CheckoutConfig::default();
        let prefix = config.product_prefix.clone();
        let checkout = CheckoutApi::new(db.clone(), provider.clone(), EventProducers::default(), config);
        let reconciler = ReconciliationApi::new(db.clone(), provider.clone(), EventProducers::default(), prefix);
        Self {
            db_path,
            db,
            provider,
            checkout,
            reconciler,
            cupons: HashMap::new(),
            last_checkout: None,
            last_event: None,
            last_reconciliation: None,
        }
    }

    pub fn cupon_id(&self, name: &str) -> CuponId {
        self.cupons.get(name).cloned().unwrap_or_else(|| panic!("Cupon {name} was not created in this scenario"))
    }
}
