use data_loader::Catalog;
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data");

    println!("Loading catalog artifacts from {}...\n", data_dir.display());

    let start = Instant::now();
    let catalog = Catalog::load_from_dir(data_dir).expect("Failed to load catalog");
    let elapsed = start.elapsed();

    let stats = catalog.statistics();
    let (rows, cols) = stats.matrix_shape;

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", stats.total_movies);
    println!("Matrix: {}x{}", rows, cols);
    println!(
        "\nPerformance: {:.0} scores/second",
        (rows * cols) as f64 / elapsed.as_secs_f64()
    );
}
