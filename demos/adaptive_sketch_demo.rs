//! Demonstration of `adaptive_sketch`: construction, streaming updates, and
//! the five read operations over a synthetic bimodal stream.

use adaptive_sketch::{Identity, Sketch, SketchConf};

fn main() {
    println!("=== adaptive_sketch demo ===\n");

    // 1. Construction: a sketch with 64 bins per generation, 3 retained
    //    generations, starting over [0, 1000).
    println!("1. Construction");
    let conf = SketchConf::builder(64, 3)
        .cmap_bounds(0.0, 1000.0)
        .counter_size(64)
        .counter_no(2)
        .queue_size(2048)
        .start_threshold(2048)
        .build()
        .expect("valid configuration");
    let mut sketch: Sketch<f64, Identity> = Sketch::empty(conf, Identity);
    println!("   generations retained: {}\n", sketch.structures_len());

    // 2. Streaming updates: a cluster around 100 and a cluster around 800,
    //    so the sketch should end up with finer bins in those two regions.
    println!("2. Streaming a bimodal stream");
    let cluster_a: Vec<f64> = (0..3000).map(|i| 100.0 + (i as f64 - 1500.0) * 0.02).collect();
    let cluster_b: Vec<f64> = (0..3000).map(|i| 800.0 + (i as f64 - 1500.0) * 0.02).collect();
    sketch.update(&cluster_a);
    sketch.update(&cluster_b);
    sketch.deep_update();
    println!("   generations retained: {}\n", sketch.structures_len());

    // 3. Read operations.
    println!("3. Read operations");
    println!("   count(50, 150)       = {:.2}", sketch.count(&50.0, &150.0));
    println!("   probability(0, 500)  = {:.4}", sketch.probability(&0.0, &500.0));
    println!("   pdf(100)             = {:.6}", sketch.pdf(&100.0));
    println!("   pdf(500)             = {:.6}", sketch.pdf(&500.0));
    println!("   cdf(500)             = {:.4}", sketch.cdf(&500.0));
    println!("   median               = {:.2}", sketch.median());

    // 4. Aging: a rearrange demotes the current view and starts a fresh one.
    println!("\n4. rearrange() ages the current generation");
    let sum_before = sketch.sum();
    sketch.rearrange();
    println!("   sum before = {:.2}, sum after = {:.2}", sum_before, sketch.sum());

    // 5. Density plot: one record per young-generation bin.
    println!("\n5. density_plot()");
    let plot = sketch.density_plot();
    let finite = plot.is_finite();
    println!("   records: {}, all finite: {finite}", plot.records.len());
}
