//! CountyCluster: county economic segmentation CLI
//!
//! Entrypoint that loads county records, runs the clustering pipeline for
//! one state, and reports the resulting group assignment.

use anyhow::Result;
use clap::Parser;
use countycluster::{load_records, run_pipeline, viz, Args, StateCrosswalk};
use std::time::Instant;

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        println!("CountyCluster - County Economic Segmentation");
        println!("============================================\n");
    }

    let start_time = Instant::now();

    // Step 1: Load county records
    if args.verbose {
        println!("Step 1: Loading county records");
        println!("  Input file: {}", args.input);
    }

    let load_start = Instant::now();
    let records = load_records(&args.input)?;
    let load_time = load_start.elapsed();

    println!("✓ Data loaded: {} records", records.len());
    if args.verbose {
        println!("  Loading time: {:.2}s", load_time.as_secs_f64());
    }

    // Step 2: Run the clustering pipeline
    let config = args.to_config();
    if args.verbose {
        println!("\nStep 2: Clustering {} counties", config.state);
        println!("  Algorithm: {:?}", config.algorithm);
        println!("  Groups: {}", config.clusters);
        println!("  Metric: {:?}", config.metric);
        if let Some(seed) = config.seed {
            println!("  Seed: {}", seed);
        }
    }

    let cluster_start = Instant::now();
    let outcome = run_pipeline(&records, &StateCrosswalk::default(), &config)?;
    let cluster_time = cluster_start.elapsed();

    println!(
        "✓ Clustered {} counties into {} groups",
        outcome.assignment.len(),
        config.clusters
    );
    if args.verbose {
        println!("  Clustering time: {:.2}s", cluster_time.as_secs_f64());
    }

    // Step 3: Report and plot
    viz::generate_report(&outcome, &args.output)?;

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());
    println!("Scatter plot saved to: {}", args.output);
    println!(
        "Group sizes saved to: {}",
        args.output.replace(".png", "_sizes.png")
    );

    Ok(())
}
