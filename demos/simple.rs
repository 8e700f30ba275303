//! Complete workflow demonstration for fortune_voronoi

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use fortune_voronoi::*;

fn main() -> Result<()> {
    println!("=== fortune_voronoi Demo ===\n");

    // Step 1: Scatter sites
    let (width, height) = (800.0, 600.0);
    let site_count = 200;
    println!("Step 1: Scattering {} sites in {}x{}...", site_count, width, height);
    let mut rng = ChaCha8Rng::seed_from_u64(12345);
    let sites: Vec<Vertex> = (0..site_count)
        .map(|_| Vertex::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height)))
        .collect();

    // Step 2: Compute the diagram
    println!("\nStep 2: Computing the diagram...");
    let start = Instant::now();
    let graph = VoronoiBuilder::new()
        .bounds(width, height)?
        .sites(sites)
        .build()?;
    let elapsed = start.elapsed();
    println!("  Cells: {}", graph.cells().len());
    println!("  Edges: {}", graph.edges().len());
    println!("  Time: {:.2?}", elapsed);

    // Step 3: Cell statistics
    println!("\nStep 3: Cell statistics:");
    let mut corner_counts = std::collections::BTreeMap::new();
    for cell in graph.cells() {
        *corner_counts.entry(cell.half_edges.len()).or_insert(0usize) += 1;
    }
    for (corners, count) in &corner_counts {
        let pct = (*count as f64 / graph.cells().len() as f64) * 100.0;
        println!("  {} corners: {} cells ({:.1}%)", corners, count, pct);
    }

    // Step 4: Walk one cell boundary
    println!("\nStep 4: First cell boundary:");
    let cell = &graph.cells()[0];
    let site = graph.sites()[cell.site].point;
    println!("  Site at ({:.1}, {:.1}):", site.x, site.y);
    for v in graph.cell_polygon(cell) {
        println!("    ({:.1}, {:.1})", v.x, v.y);
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
