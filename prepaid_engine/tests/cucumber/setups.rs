use cucumber::given;
use log::*;
use prepaid_engine::test_utils::gateway::TestGateway;

use crate::cucumber::GatewayWorld;

#[given("a fresh install")]
async fn fresh_install(world: &mut GatewayWorld) {
    let gateway = TestGateway::with_hooks(world.hooks()).await;
    debug!("🚀️ Created database: {}", gateway.db_path());
    world.system = Some(gateway);
}

#[given(expr = "the processor reports order {word} for {string} at {word} {word} with status {word}")]
async fn processor_order(
    world: &mut GatewayWorld,
    order_id: String,
    reference: String,
    currency: String,
    value: String,
    status: String,
) {
    world.gateway().processor.add_simple_order(&order_id, &reference, &currency, &value, &status);
}

#[given(expr = "the processor now reports order {word} with status {word}")]
async fn processor_status(world: &mut GatewayWorld, order_id: String, status: String) {
    world.gateway().processor.set_order_status(&order_id, &status);
}
