use simscribe::Locations;

fn main() {
    println!("---- test: Locations ----");

    let mut location_manager = Locations::new();
    location_manager.add_location(
        "Forest",
        "A dense and mysterious forest full of tall trees and wildlife.",
    );
    location_manager.add_location("Cave", "A dark and damp cave, home to bats and other creatures.");
    location_manager.add_location("Village", "A small, peaceful village at the foot of a mountain.");

    println!("All Locations:");
    println!("{}", location_manager);

    if let Some(forest) = location_manager.get_location("Forest") {
        println!("\nDescription of Forest:");
        println!("{}", forest.describe());
    }

    match location_manager.get_location("Desert") {
        Some(desert) => println!("{}", desert.describe()),
        None => println!("\nNo such location: Desert"),
    }
}
