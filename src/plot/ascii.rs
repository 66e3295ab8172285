//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - fitted trend: `-` line through the fitted values
//! - vertices: `+` on the fitted line
//! - observed points: `o`
//! - spikes: `x` at their raw value

use crate::domain::FitRecord;

/// Render raw vs fitted values of an analysis, day offset on the x axis.
pub fn render_ascii_plot(records: &[FitRecord], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (d_min, d_max) = day_range(records).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(records).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Trend first so vertices and points can overlay it.
    let trend: Vec<(f64, f64)> = records.iter().map(|r| (r.index_day as f64, r.val_fit)).collect();
    draw_curve(&mut grid, &trend, d_min, d_max, y_min, y_max);

    for r in records.iter().filter(|r| r.vertex) {
        let x = map_x(r.index_day as f64, d_min, d_max, width);
        let y = map_y(r.val_fit, y_min, y_max, height);
        grid[y][x] = '+';
    }

    for r in records {
        let Some(raw) = r.val_raw else { continue };
        let x = map_x(r.index_day as f64, d_min, d_max, width);
        let y = map_y(raw, y_min, y_max, height);
        grid[y][x] = if r.spike { 'x' } else { 'o' };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: day=[{d_min}, {d_max}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn day_range(records: &[FitRecord]) -> Option<(f64, f64)> {
    let first = records.first()?.index_day as f64;
    let last = records.last()?.index_day as f64;
    if last > first { Some((first, last)) } else { None }
}

fn y_range(records: &[FitRecord]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for r in records {
        for y in r.val_raw.into_iter().chain(std::iter::once(r.val_fit)) {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
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
    use crate::domain::LineEquation;
    use chrono::NaiveDate;

    fn record(day: i64, raw: Option<f64>, fit: f64, vertex: bool, spike: bool) -> FitRecord {
        FitRecord {
            index_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap() + chrono::Duration::days(day),
            index_day: day,
            val_raw: raw,
            val_fit: fit,
            eqn_fit: LineEquation::flat(fit),
            eqn_right: LineEquation::flat(fit),
            vertex,
            spike,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let records = vec![
            record(0, None, 0.0, true, false),
            record(5, Some(10.0), 1.0, false, true),
            record(9, Some(4.0), 2.0, true, false),
        ];

        let txt = render_ascii_plot(&records, 10, 5);
        let expected = concat!(
            "Plot: day=[0, 9] | y=[-0.50, 10.50]\n",
            "     x    \n",
            "          \n",
            "         o\n",
            "   ------+\n",
            "+--       \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn degenerate_inputs_still_render() {
        assert_eq!(render_ascii_plot(&[], 10, 5).lines().count(), 6);

        let single = vec![record(0, Some(1.0), 1.0, true, false)];
        let txt = render_ascii_plot(&single, 10, 5);
        assert_eq!(txt.lines().count(), 6);
        assert!(txt.contains('o'));
    }
}
