//! # Segmentation Visualization Rendering
//!
//! ASCII rendering of a segmented depth series for terminals. Depth grows
//! downward, one column per sample. Cast samples are drawn with the last digit
//! of their profile number, transition samples with `·`, missing samples are
//! left blank.

use crate::profiles::Segmentation;
use std::fmt::Write;

/// Space for the depth axis labels
const Y_AXIS_WIDTH: usize = 7;

/// Glyph for one sample given its profile index.
fn glyph(profile_index: f64) -> char {
    if !profile_index.is_finite() {
        '?'
    } else if profile_index.fract() != 0.0 {
        '·'
    } else {
        let digit = (profile_index as u64 % 10) as u32;
        char::from_digit(digit, 10).unwrap_or('#')
    }
}

/// Format a depth axis label
fn format_depth(depth: f64) -> String {
    if depth.fract() == 0.0 {
        format!("{:.0}", depth)
    } else {
        format!("{:.1}", depth)
    }
}

/// Render a segmented series into a multi-line string.
pub fn render_ascii(depth: &[f64], segmentation: &Segmentation, rows: usize) -> String {
    let rows = rows.max(2);
    let (min_depth, max_depth) = depth
        .iter()
        .copied()
        .filter(|d| d.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), d| {
            (min.min(d), max.max(d))
        });

    if !min_depth.is_finite() {
        return "no valid samples\n".to_string();
    }

    let depth_to_row = |d: f64| {
        if max_depth > min_depth {
            let normalized = (d - min_depth) / (max_depth - min_depth);
            (normalized * (rows as f64 - 1.0)).round() as usize
        } else {
            0
        }
    };

    let mut grid = vec![vec![' '; depth.len() + Y_AXIS_WIDTH]; rows];

    // Axis labels at the shallowest and deepest rows
    for (row, value) in [(0, min_depth), (rows - 1, max_depth)] {
        let label = format!("{:>width$}", format_depth(value), width = Y_AXIS_WIDTH - 1);
        for (i, ch) in label.chars().take(Y_AXIS_WIDTH - 1).enumerate() {
            grid[row][i] = ch;
        }
    }
    for line in grid.iter_mut() {
        line[Y_AXIS_WIDTH - 1] = '│';
    }

    for (column, &d) in depth.iter().enumerate() {
        if !d.is_finite() {
            continue;
        }
        let index = segmentation
            .profile_index
            .get(column)
            .copied()
            .unwrap_or(f64::NAN);
        grid[depth_to_row(d)][column + Y_AXIS_WIDTH] = glyph(index);
    }

    let mut out = String::new();
    for line in grid {
        out.extend(line);
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "{}{} casts, {} samples",
        " ".repeat(Y_AXIS_WIDTH),
        segmentation.cast_count(),
        depth.len()
    );
    out
}

/// Render a segmented series to the terminal.
pub fn draw_ascii(depth: &[f64], segmentation: &Segmentation, rows: usize) {
    print!("{}", render_ascii(depth, segmentation, rows));
}
