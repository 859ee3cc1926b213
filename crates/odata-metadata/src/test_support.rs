//! Shared fixtures for unit tests.

use std::sync::Arc;

use url::Url;

use crate::model::{EdmModel, SchemaBuilder};

/// Service root used throughout the tests.
pub(crate) fn base_uri() -> Url {
    Url::parse("http://host/service.svc/").unwrap()
}

/// Sales model:
///
/// - `Customer` (key `ID`, etag `Version`, stream `Photo`, navigations `Orders`, `BestFriend`)
/// - `VipCustomer : Customer` (media-link entry, navigation `Perks`)
/// - `Order` (key `OrderID`, contained `Lines`), `Line` (key `LineNo`)
/// - `Company` singleton, `Customers` / `Orders` entity sets
/// - actions `Archive` (Customer), `Promote` (VipCustomer), unbound `Reset`
/// - functions `TopOrders()` and `TopOrders(count)` (Customer)
pub(crate) fn sample_model() -> Arc<dyn EdmModel> {
    Arc::new(sample_schema().build())
}

pub(crate) fn sample_schema() -> SchemaBuilder {
    SchemaBuilder::new("NS")
        .entity_type("Customer", |t| {
            t.key("ID")
                .property("Name")
                .etag_property("Version")
                .stream("Photo")
                .navigation("Orders", "NS.Order", true)
                .navigation("BestFriend", "NS.Customer", false)
        })
        .entity_type("VipCustomer", |t| {
            t.base("NS.Customer")
                .media_link_entry()
                .navigation("Perks", "NS.Perk", true)
        })
        .entity_type("Perk", |t| t.key("PerkID"))
        .entity_type("Order", |t| {
            t.key("OrderID")
                .etag_property("Total")
                .etag_property("Status")
                .contained("Lines", "NS.Line", true)
        })
        .entity_type("Line", |t| t.key("LineNo"))
        .entity_type("Company", |t| t.key("ID").property("Name"))
        .entity_type("Keyless", |t| t.property("Name"))
        .entity_set("Customers", "NS.Customer")
        .entity_set("Orders", "NS.Order")
        .entity_set("Keyless", "NS.Keyless")
        .singleton("Company", "NS.Company")
        .action("Archive", Some("NS.Customer"), &[])
        .action("Promote", Some("NS.VipCustomer"), &["level"])
        .action("Reset", None, &[])
        .function("TopOrders", Some("NS.Customer"), &[])
        .function("TopOrders", Some("NS.Customer"), &["count"])
}
