//! Prints the metadata a client would derive for a sparse customer payload.
//!
//! Usage: `cargo run --example describe_entity [key-as-segment]`

use std::sync::Arc;

use odata_metadata::{
    EdmModel, EntityMetadataBuilder, Explicit, MetadataContext, ModelEntryContext, Property,
    SchemaBuilder, TypeContext, UrlConvention, WireEntity, WireValues,
};
use url::Url;

fn show(label: &str, value: Option<impl std::fmt::Display>) {
    match value {
        Some(v) => println!("{:<14} {}", label, v),
        None => println!("{:<14} (none)", label),
    }
}

fn main() {
    let key_as_segment = std::env::args().nth(1).as_deref() == Some("key-as-segment");

    let model: Arc<dyn EdmModel> = Arc::new(
        SchemaBuilder::new("Sales")
            .entity_type("Customer", |t| {
                t.key("ID")
                    .property("Name")
                    .etag_property("Version")
                    .stream("Photo")
                    .navigation("Orders", "Sales.Order", true)
            })
            .entity_type("VipCustomer", |t| t.base("Sales.Customer").media_link_entry())
            .entity_type("Order", |t| t.key("OrderID"))
            .entity_set("Customers", "Sales.Customer")
            .entity_set("Orders", "Sales.Order")
            .action("Archive", Some("Sales.Customer"), &[])
            .action("Promote", Some("Sales.VipCustomer"), &["level"])
            .function("TopOrders", Some("Sales.Customer"), &[])
            .function("TopOrders", Some("Sales.Customer"), &["count"])
            .build(),
    );

    let base = Url::parse("http://host/service.svc/").expect("valid base URI");
    let mut metadata = MetadataContext::new(model.clone(), base).expect("valid metadata context");
    if key_as_segment {
        metadata = metadata.with_url_convention(UrlConvention::key_as_segment());
    }

    let values = WireValues {
        type_name: Some("Sales.VipCustomer".to_string()),
        properties: vec![
            Property::primitive("ID", 42),
            Property::primitive("Name", "Ada"),
            Property::primitive("Version", 3),
        ],
        ..Default::default()
    };
    let type_context = TypeContext::entity_set("Customers", "Sales.Customer");
    let entry = ModelEntryContext::for_entry(model, type_context, &values).expect("known type");
    let mut entity = WireEntity::from_values(values)
        .with_metadata_builder(EntityMetadataBuilder::conventional(metadata, entry));

    println!("=== Entity ===");
    show("Id", entity.id().expect("id"));
    show("EditLink", entity.edit_link().expect("edit link"));
    show("ReadLink", entity.read_link().expect("read link"));
    show("ETag", entity.etag());

    if let Some(media) = entity.media_resource() {
        show("MediaEdit", media.edit_link().expect("media edit link"));
    }

    println!("\n=== Properties ===");
    for property in entity.properties() {
        match entity.stream_property(&property.name) {
            Some(stream) => show(&property.name, stream.read_link().expect("stream link")),
            None => show(&property.name, property.as_primitive()),
        }
    }

    println!("\n=== Operations ===");
    for operation in entity.actions().into_iter().chain(entity.functions()) {
        println!(
            "{:?} {} -> {}",
            operation.kind(),
            operation.metadata(),
            operation
                .target()
                .expect("operation target")
                .map(String::from)
                .unwrap_or_default()
        );
    }

    println!("\n=== Navigation ===");
    let orders = entity
        .navigation_link("Orders", &Explicit::Unset)
        .expect("navigation link");
    show("Orders", orders);
    entity.mark_navigation_link_processed("Orders");
    let remaining: Vec<String> = entity
        .unprocessed_navigation_links()
        .map(|link| link.name)
        .collect();
    println!("Unprocessed: {:?}", remaining);
}
