//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, deterministic output (golden-tested).
//!
//! Plot elements:
//! - model non-growth thickness: `-` line
//! - model growth thickness: `.` line
//! - measured non-growth points: `o`

use crate::domain::AnOutput;

/// Render the best fit of a run.
pub fn render_ascii_plot(output: &AnOutput, width: usize, height: usize) -> String {
    let nongrowth: Vec<(f64, f64)> = output
        .model_x
        .iter()
        .copied()
        .zip(output.model_nongrowth_y.iter().copied())
        .collect();
    let growth: Vec<(f64, f64)> = output
        .model_x
        .iter()
        .copied()
        .zip(output.model_growth_y.iter().copied())
        .collect();
    let mut txt = render_series_plot(&output.nongrowth, &nongrowth, &growth, width, height);
    txt.push_str(&format!(
        "o measured non-growth | - model non-growth | . model growth ({})\n",
        output.best_scenario
    ));
    txt
}

/// Render measured points over the two model curves.
pub fn render_series_plot(
    measured: &[(f64, f64)],
    nongrowth_curve: &[(f64, f64)],
    growth_curve: &[(f64, f64)],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let curves = [nongrowth_curve, growth_curve];
    let (x_min, x_max) = extent(curves.iter().flat_map(|c| c.iter()).chain(measured).map(|p| p.0))
        .unwrap_or((0.0, 1.0));
    let (y_min, y_max) = extent(curves.iter().flat_map(|c| c.iter()).chain(measured).map(|p| p.1))
        .unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Non-growth curve first so it wins where the curves overlap; points go last.
    draw_curve(&mut grid, nongrowth_curve, (x_min, x_max), (y_min, y_max), '-');
    draw_curve(&mut grid, growth_curve, (x_min, x_max), (y_min, y_max), '.');
    for &(x, y) in measured {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: cycle=[{x_min:.1}, {x_max:.1}] | thickness=[{y_min:.3}, {y_max:.3}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_range: (f64, f64), y_range: (f64, f64), ch: char) {
    let (x_min, x_max) = x_range;
    let (y_min, y_max) = y_range;
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        if !(t.is_finite() && y.is_finite()) {
            continue;
        }
        let x = map_x(t, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, ch);
        } else {
            draw_line(grid, x, yy, x, yy, ch);
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let measured = [(0.0, 0.0), (9.0, 4.5)];
        let nongrowth = [(0.0, 0.0), (9.0, 0.0)];
        let growth = [(0.0, 0.0), (9.0, 9.0)];

        let txt = render_series_plot(&measured, &nongrowth, &growth, 10, 5);
        let expected = concat!(
            "Plot: cycle=[0.0, 9.0] | thickness=[-0.450, 9.450]\n",
            "        ..\n",
            "      ..  \n",
            "    ..   o\n",
            "  ..      \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_input_still_renders_frame() {
        let txt = render_series_plot(&[], &[], &[], 12, 6);
        assert_eq!(txt.lines().count(), 7);
        assert!(txt.lines().skip(1).all(|l| l.chars().count() == 12 && l.trim().is_empty()));
    }
}
