//! Text and CSV renderings of a [`DistortionAnalysis`].

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};

use crate::analysis::DistortionAnalysis;

/// Field entries listed by default in the text report.
pub const DEFAULT_REPORT_ROWS: usize = 10;

pub const CSV_HEADER: &str =
    "index,col,row,ideal_x,ideal_y,actual_x,actual_y,dx,dy,ideal_radius,radial";

/// Human-readable report: inputs, result and the first `rows` field entries.
pub fn write_text_report<W: Write>(
    out: &mut W,
    analysis: &DistortionAnalysis,
    rows: usize,
) -> io::Result<()> {
    let report = &analysis.report;
    let grid = &analysis.grid;
    let rule = "-".repeat(50);

    writeln!(out, "========== Lens Distortion Analysis Report ==========")?;
    writeln!(out, "--- 1. Input parameters ---")?;
    writeln!(
        out,
        "Grid size: {} x {} inner corners",
        grid.columns, grid.rows
    )?;
    writeln!(out, "Cell size: {:.2}", grid.cell_size)?;
    writeln!(
        out,
        "Image size: {} x {} px",
        analysis.image_size.width, analysis.image_size.height
    )?;
    writeln!(
        out,
        "Approximate center: ({:.1}, {:.1}) px",
        analysis.optical_center.x, analysis.optical_center.y
    )?;
    writeln!(
        out,
        "Ideal projection: {} (rms {:.3} px)",
        analysis.strategy, analysis.fit_rms_px
    )?;
    writeln!(out, "{rule}")?;

    writeln!(out, "--- 2. TV distortion result ---")?;
    writeln!(
        out,
        "** TV distortion: {:.3} % **",
        report.tv_distortion_percent
    )?;
    writeln!(
        out,
        "Max radial deviation: {:.3} px",
        report.max_radial_deviation
    )?;
    writeln!(
        out,
        "Ideal radius of worst point: {:.1} px",
        report.r_max_at_worst_point
    )?;
    writeln!(out)?;

    let shown = rows.min(report.field.len());
    writeln!(out, "--- 3. Distortion data (first {shown} points) ---")?;
    writeln!(out, "ideal (x, y) | actual (x, y) | delta (dx, dy) | radial (dr)")?;
    writeln!(out, "{}", "-".repeat(80))?;
    for v in report.field.iter().take(shown) {
        writeln!(
            out,
            "({:.2}, {:.2}) | ({:.2}, {:.2}) | ({:.3}, {:.3}) | {:.3}",
            v.ideal.x, v.ideal.y, v.actual.x, v.actual.y, v.delta.x, v.delta.y, v.radial_component
        )?;
    }
    if shown < report.field.len() {
        writeln!(out, "...")?;
    }
    writeln!(out, "{rule}")?;
    writeln!(out, "========== End of report ==========")
}

/// [`write_text_report`] into a string.
pub fn text_report(analysis: &DistortionAnalysis, rows: usize) -> io::Result<String> {
    let mut buf = Vec::new();
    write_text_report(&mut buf, analysis, rows)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// One CSV row per field entry, preceded by [`CSV_HEADER`].
pub fn write_csv<W: Write>(out: &mut W, analysis: &DistortionAnalysis) -> io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for (i, v) in analysis.report.field.iter().enumerate() {
        let (col, row) = v.grid_index;
        writeln!(
            out,
            "{i},{col},{row},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            v.ideal.x,
            v.ideal.y,
            v.actual.x,
            v.actual.y,
            v.delta.x,
            v.delta.y,
            v.ideal_radius,
            v.radial_component
        )?;
    }
    Ok(())
}

pub fn save_text_report(
    path: impl AsRef<Path>,
    analysis: &DistortionAnalysis,
    rows: usize,
) -> Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
    );
    write_text_report(&mut out, analysis, rows)
        .and_then(|_| out.flush())
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn save_csv(path: impl AsRef<Path>, analysis: &DistortionAnalysis) -> Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
    );
    write_csv(&mut out, analysis)
        .and_then(|_| out.flush())
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analysis::analyze_points, config::PipelineConfig};
    use distortion_core::{
        synthetic::planar, ControlPointSet, GridSpec, ImageSize, ProjectionKind,
    };

    fn sample() -> DistortionAnalysis {
        let grid = GridSpec::new(4, 3, 5.0);
        let size = ImageSize::new(200, 100);
        let ideal = planar::centered_grid_pixels(&grid, size, 20.0);
        let actual = planar::radial_scale(&ideal, size.center(), 0.01);
        let cps = ControlPointSet::from_pixels(&grid, actual).unwrap();
        let mut cfg = PipelineConfig::default();
        cfg.estimator.use_camera_model = false;
        analyze_points(&cps, &grid, size, &cfg).unwrap()
    }

    #[test]
    fn text_report_lists_first_rows() {
        let analysis = sample();
        assert_eq!(analysis.strategy, ProjectionKind::Homography);
        let text = text_report(&analysis, 5).unwrap();
        assert!(text.contains("Grid size: 4 x 3 inner corners"));
        assert!(text.contains("Approximate center: (100.0, 50.0) px"));
        assert!(text.contains("first 5 points"));
        let data_rows = text.lines().filter(|l| l.matches(" | ").count() == 3).count();
        // Header plus five entries.
        assert_eq!(data_rows, 6);
        assert!(text.contains("...\n"));

        let all = text_report(&analysis, 100).unwrap();
        assert!(all.contains("first 12 points"));
        assert!(!all.contains("...\n"));
    }

    #[test]
    fn csv_has_one_row_per_point() {
        let analysis = sample();
        let mut buf = Vec::new();
        write_csv(&mut buf, &analysis).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 13);
        assert!(lines[6].starts_with("5,1,1,"));
        assert!(lines.iter().skip(1).all(|l| l.split(',').count() == 11));
    }

    #[test]
    fn reports_are_saved_to_disk() {
        let analysis = sample();
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("report.txt");
        let csv = dir.path().join("field.csv");
        save_text_report(&txt, &analysis, DEFAULT_REPORT_ROWS).unwrap();
        save_csv(&csv, &analysis).unwrap();
        assert!(std::fs::read_to_string(&txt)
            .unwrap()
            .contains("TV distortion"));
        assert_eq!(std::fs::read_to_string(&csv).unwrap().lines().count(), 13);

        let missing = dir.path().join("nope").join("report.txt");
        assert!(save_text_report(&missing, &analysis, 3).is_err());
    }
}
