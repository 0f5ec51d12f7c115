//! Gnuplot script writer: one png plot per sweep, data inline.

use std::io::Write;

use crate::experiment::SweepResult;

/// Write the plot of one sweep.
///
/// Each Dataset becomes one `"-"` series whose points follow the `plot` line
/// in Dataset order, each block closed by `e`.
pub fn write_plot<W: Write>(result: &SweepResult, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "set terminal png")?;
    writeln!(out, "set output \"{}\"", result.output_name)?;
    writeln!(out, "set title \"{}\"", result.title)?;
    writeln!(out, "set xlabel \"Position (m)\"")?;
    writeln!(out, "set ylabel \"Throughput (Mb per sample)\"")?;

    let series: Vec<String> = result
        .datasets
        .iter()
        .map(|dataset| format!("\"-\"  title \"{}\" with lines", dataset.title()))
        .collect();
    writeln!(out, "plot {}", series.join(", "))?;

    for dataset in &result.datasets {
        for (x, y) in dataset.points() {
            writeln!(out, "{} {}", x, y)?;
        }
        writeln!(out, "e")?;
    }
    Ok(())
}

/// Write every sweep's plot, in order, into one script.
pub fn write_script<W: Write>(results: &[SweepResult], out: &mut W) -> std::io::Result<()> {
    for (index, result) in results.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        write_plot(result, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::Dataset;

    fn result() -> SweepResult {
        let mut first = Dataset::new("54mb");
        first.add(100.0, 0.5);
        first.add(-10.0, 0.5);
        let second = Dataset::new("48mb");
        SweepResult {
            title: "Fixed data rate".to_string(),
            output_name: "reference-rates.png".to_string(),
            datasets: vec![first, second],
        }
    }

    #[test]
    fn plot_lists_series_in_dataset_order() {
        let mut out = Vec::new();
        write_plot(&result(), &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();

        assert!(script.starts_with("set terminal png\nset output \"reference-rates.png\"\n"));
        assert!(script.contains("plot \"-\"  title \"54mb\" with lines, \"-\"  title \"48mb\" with lines\n"));
        assert!(script.ends_with("100 0.5\n-10 0.5\ne\ne\n"));
    }

    #[test]
    fn script_separates_plots() {
        let mut out = Vec::new();
        write_script(&[result(), result()], &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();
        assert_eq!(script.matches("set terminal png").count(), 2);
        assert!(script.contains("e\n\nset terminal png"));
    }
}
