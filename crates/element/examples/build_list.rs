//! Build a small list, reshuffle it, and print the markup after each step
//!
//! Run with `RUST_LOG=debug` to see every tree mutation.

use dom::{DomArena, DomSerializer, SerializerConfig};
use element::{ElementHandle, ElementOptions, Parent, Position};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut document = DomArena::new();
    let printer = DomSerializer::with_config(SerializerConfig {
        pretty: true,
        ..Default::default()
    });

    let mut list = ElementHandle::create(
        &mut document,
        ElementOptions::new()
            .tag("ul")
            .attribute("id", "list1")
            .parent(Parent::Root)
            .children(["a", "b"]),
    )?;
    println!("{}", printer.outer_html(&document, document.root_container())?);

    let extra = ElementHandle::create(
        &mut document,
        ElementOptions::new()
            .tag("li")
            .parent(Parent::try_from(&list)?)
            .child("c"),
    )?;
    extra.to_position(&mut document, Position::First)?;
    println!("{}", printer.outer_html(&document, document.root_container())?);

    list.set_tag(&mut document, "ol")?;
    list.set_attribute(&mut document, "class", "ordered")?;
    println!("{}", printer.outer_html(&document, document.root_container())?);

    if let Some(first) = extra.node() {
        println!("first item: {}", printer.generate_xpath(&document, first)?);
    }

    list.remove(&mut document)?;
    println!("{}", printer.outer_html(&document, document.root_container())?);

    Ok(())
}
