//! Relation resolution under loaded settings. Kept in its own test binary
//! because it configures the process-wide settings slot.

use tablemap_core::{Settings, SETTINGS};
use tablemap_db::prelude::*;
use tablemap_db::query::expressions::BinaryOp;

struct Order {
    customer_id: i64,
}

impl Entity for Order {
    fn entity_name() -> &'static str {
        "Order"
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![("customerId", Value::Int(self.customer_id))]
    }
}

struct Customer;

impl Entity for Customer {
    fn entity_name() -> &'static str {
        "Customer"
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }
}

#[test]
fn test_settings_loaded_after_resolver_construction_take_effect() {
    let registry = EntityRegistry::new();
    EntityDeclaration::<Customer>::new()
        .table("customer")
        .column("id", DataType::Integer)
        .commit(&registry)
        .unwrap();
    EntityDeclaration::<Order>::new()
        .table("orders")
        .column_as("customerId", "customer_id", DataType::Integer)
        .foreign::<Customer>("customer", "customerId", "id")
        .commit(&registry)
        .unwrap();
    let order = Order { customer_id: 4 };

    // Built before startup configuration: falls back to the defaults
    let early = RelationResolver::new(&registry);
    assert_eq!(
        early.resolve_foreign(&order, "customer", None).unwrap(),
        Expression::binary(BinaryOp::Eq, Expression::column("customer.id"), 4_i64)
    );
    assert!(!SETTINGS.is_configured());

    let loaded = Settings {
        qualify_unaliased_relations: false,
        ..Settings::default()
    };
    assert!(SETTINGS.configure(loaded).is_ok());

    let late = RelationResolver::new(&registry);
    assert_eq!(
        late.resolve_foreign(&order, "customer", None).unwrap(),
        Expression::binary(BinaryOp::Eq, Expression::column("id"), 4_i64)
    );
}
