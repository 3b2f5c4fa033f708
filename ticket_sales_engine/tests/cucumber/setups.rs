use chrono::{NaiveDate, Utc};
use cucumber::given;
use ticket_sales_engine::{
    db_types::{NewCupon, NewPhase},
    traits::{CuponManagement, PhaseManagement},
};

use crate::cucumber::{ticket_world::TicketSystem, TicketWorld};

fn far_future() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 12, 31).expect("valid date")
}

#[given("a fresh install")]
async fn fresh_database(world: &mut TicketWorld) {
    let system = TicketSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "an active phase {string} priced at {int} EUR with {int} tickets")]
async fn active_phase(world: &mut TicketWorld, name: String, price: i64, tickets: i64) {
    let phase = NewPhase::new(name, price, tickets).active();
    world.sys().db.create_phase(phase).await.expect("Error creating phase");
}

#[given(expr = "an inactive phase {string} priced at {int} EUR")]
async fn inactive_phase(world: &mut TicketWorld, name: String, price: i64) {
    let phase = NewPhase::new(name, price, 100);
    world.sys().db.create_phase(phase).await.expect("Error creating phase");
}

#[given(expr = "a flat cupon {string} worth {int} EUR with {int} uses")]
async fn flat_cupon(world: &mut TicketWorld, name: String, value: i64, amount: i64) {
    add_cupon(world, NewCupon::flat(name, value, amount, far_future())).await;
}

#[given(expr = "a {int}% cupon {string} with {int} uses")]
async fn percentage_cupon(world: &mut TicketWorld, value: i64, name: String, amount: i64) {
    add_cupon(world, NewCupon::percentage(name, value, amount, far_future())).await;
}

#[given(expr = "an expired {int}% cupon {string} with {int} uses")]
async fn expired_cupon(world: &mut TicketWorld, value: i64, name: String, amount: i64) {
    let yesterday = Utc::now().date_naive().pred_opt().expect("valid date");
    add_cupon(world, NewCupon::percentage(name, value, amount, yesterday)).await;
}

async fn add_cupon(world: &mut TicketWorld, cupon: NewCupon) {
    let sys = world.sys();
    let cupon = sys.db.create_cupon(cupon).await.expect("Error creating cupon");
    sys.cupons.insert(cupon.name.clone(), cupon.id);
}
