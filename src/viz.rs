//! Plot generation for cluster results using Plotters
//!
//! Scatter plot of the normalized feature space plus a group-size bar chart.
//! Choropleth map rendering is a downstream concern; the renderer consumes
//! the FIPS → group mapping directly.

use plotters::prelude::*;

use crate::data::N_FEATURES;
use crate::pipeline::PipelineOutcome;

/// Color palette for the first few groups.
const GROUP_COLORS: [RGBColor; 5] = [RED, BLUE, GREEN, YELLOW, MAGENTA];

/// Feature rows plotted on the scatter axes (employment vs weekly wage).
const X_FEATURE: usize = 1;
const Y_FEATURE: usize = 2;

/// Scatter plot of counties in normalized feature space, colored by group.
pub fn create_group_scatter(
    outcome: &PipelineOutcome,
    output_path: &str,
    plot_title: Option<&str>,
) -> anyhow::Result<()> {
    let title = plot_title.unwrap_or("County Groups: Employment vs Weekly Wage (Normalized)");
    debug_assert_eq!(outcome.normalized.nrows(), N_FEATURES);

    let xs: Vec<f64> = outcome.normalized.row(X_FEATURE).to_vec();
    let ys: Vec<f64> = outcome.normalized.row(Y_FEATURE).to_vec();

    let x_min = xs.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 0.5;
    let x_max = xs.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 0.5;
    let y_min = ys.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 0.5;
    let y_max = ys.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 0.5;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Employment (Normalized)")
        .y_desc("Weekly Wage (Normalized)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (i, (&x, &y)) in xs.iter().zip(ys.iter()).enumerate() {
        let group = outcome.labels[i];
        let color = if group < GROUP_COLORS.len() {
            &GROUP_COLORS[group]
        } else {
            &BLACK
        };
        chart.draw_series(std::iter::once(Circle::new((x, y), 4, color.filled())))?;
    }

    root.present()?;
    println!("Group scatter plot saved to: {}", output_path);

    Ok(())
}

/// Bar chart of how many counties fall into each group.
pub fn create_group_size_chart(outcome: &PipelineOutcome, output_path: &str) -> anyhow::Result<()> {
    let sizes = outcome.assignment.group_sizes();
    let n_groups = sizes.len();
    let max_size = sizes.values().copied().max().unwrap_or(1) as f64;

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Group Sizes", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..(n_groups as f64 + 1.0), 0f64..(max_size * 1.1))?;

    chart
        .configure_mesh()
        .x_desc("Group")
        .y_desc("Number of Counties")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (&group, &size) in &sizes {
        let color = if group - 1 < GROUP_COLORS.len() {
            &GROUP_COLORS[group - 1]
        } else {
            &BLUE
        };
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (group as f64 - 0.4, 0.0),
                (group as f64 + 0.4, size as f64),
            ],
            color.filled(),
        )))?;
    }

    root.present()?;
    println!("Group size chart saved to: {}", output_path);

    Ok(())
}

/// Print the FIPS → group table and per-group counts to the console.
pub fn print_group_summary(outcome: &PipelineOutcome) {
    println!("\n=== County Groups ===");
    println!("  FIPS  | Group | County");
    println!("  ------|-------|-------");
    for (i, fips) in outcome.fips.iter().enumerate() {
        println!(
            "  {} | {:5} | {}",
            fips,
            outcome.labels[i] + 1,
            outcome.names[i]
        );
    }

    println!("\nGroup sizes:");
    let total = outcome.fips.len();
    for (group, size) in outcome.assignment.group_sizes() {
        let percentage = (size as f64 / total as f64) * 100.0;
        println!("  Group {}: {} counties ({:.1}%)", group, size, percentage);
    }
}

/// Generate both plots and the console summary.
pub fn generate_report(outcome: &PipelineOutcome, base_output_path: &str) -> anyhow::Result<()> {
    create_group_scatter(outcome, base_output_path, None)?;

    let size_chart_path = base_output_path.replace(".png", "_sizes.png");
    create_group_size_chart(outcome, &size_chart_path)?;

    print_group_summary(outcome);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{run_pipeline, Algorithm, PipelineConfig};
    use crate::data::{
        CountyRecord, StateCrosswalk, AREA_TYPE_COUNTY, OWNERSHIP_PRIVATE, TOTAL_ALL_INDUSTRIES,
    };
    use std::path::Path;
    use tempfile::tempdir;

    fn test_outcome() -> PipelineOutcome {
        let records: Vec<CountyRecord> = [
            ("1", "Allegany County", 10.0, 100.0, 500.0),
            ("3", "Anne Arundel County", 12.0, 110.0, 520.0),
            ("5", "Baltimore County", 500.0, 5000.0, 900.0),
            ("9", "Calvert County", 480.0, 4800.0, 880.0),
        ]
        .iter()
        .map(|&(code, name, estab, empl, wage)| CountyRecord {
            area_type: AREA_TYPE_COUNTY.to_owned(),
            industry: TOTAL_ALL_INDUSTRIES.to_owned(),
            ownership: OWNERSHIP_PRIVATE.to_owned(),
            state_fips: "24".to_owned(),
            county_code: code.to_owned(),
            area_name: name.to_owned(),
            establishments: estab,
            employment: empl,
            weekly_wage: wage,
        })
        .collect();

        let config = PipelineConfig::new("MD", Algorithm::KMedoids, 2);
        run_pipeline(&records, &StateCrosswalk::default(), &config).unwrap()
    }

    #[test]
    fn test_create_group_scatter() {
        let outcome = test_outcome();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("scatter.png");
        let output_str = output_path.to_str().unwrap();

        create_group_scatter(&outcome, output_str, None).unwrap();
        assert!(Path::new(output_str).exists());
    }

    #[test]
    fn test_generate_report() {
        let outcome = test_outcome();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("report.png");
        let output_str = output_path.to_str().unwrap();

        generate_report(&outcome, output_str).unwrap();
        assert!(Path::new(output_str).exists());
        assert!(temp_dir.path().join("report_sizes.png").exists());
    }
}
