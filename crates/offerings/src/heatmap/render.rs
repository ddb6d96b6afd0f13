//! Rasterizes a normalized [`PivotTable`].

use image::{Rgb, RgbImage};

use super::font::{draw_text, put_pixel, text_height, text_length, Orientation};
use super::pivot::PivotTable;

pub const TITLE: &str = "Instance Type offerings by InstanceFamily, Location";
pub const X_LABEL: &str = "Location";
pub const Y_LABEL: &str = "Instance Type Family";

/// ColorBrewer `YlGnBu`, from 0 (light) to 1 (dark).
const YL_GN_BU: [[u8; 3]; 9] = [
    [255, 255, 217],
    [237, 248, 177],
    [199, 233, 180],
    [127, 205, 187],
    [65, 182, 196],
    [29, 145, 192],
    [34, 94, 168],
    [37, 52, 148],
    [8, 29, 88],
];

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);
/// Undefined cells: grey hatched with a darker grey. Neither is on the scale.
pub const UNDEFINED: Rgb<u8> = Rgb([224, 224, 224]);
pub const UNDEFINED_HATCH: Rgb<u8> = Rgb([160, 160, 160]);

/// Sizes of the heatmap's elements, in pixels.
#[derive(Clone, Copy, Debug)]
pub struct Style {
    pub cell_width: u32,
    pub cell_height: u32,
    pub label_scale: u32,
    pub title_scale: u32,
    pub padding: u32,
    pub colorbar_width: u32,
    pub min_colorbar_height: u32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            cell_width: 18,
            cell_height: 18,
            label_scale: 2,
            title_scale: 3,
            padding: 16,
            colorbar_width: 20,
            min_colorbar_height: 120,
        }
    }
}

/// Color of a normalized value. Values outside `[0, 1]` are clamped.
pub fn color_for(value: f64) -> Rgb<u8> {
    let t = value.clamp(0.0, 1.0) * (YL_GN_BU.len() - 1) as f64;
    let i = (t.floor() as usize).min(YL_GN_BU.len() - 2);
    let frac = t - i as f64;
    let (lo, hi) = (YL_GN_BU[i], YL_GN_BU[i + 1]);
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
    Rgb([mix(lo[0], hi[0]), mix(lo[1], hi[1]), mix(lo[2], hi[2])])
}

/// Where each element of the image goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    /// Top-left corner of the cell grid.
    pub grid_x: u32,
    pub grid_y: u32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub colorbar_x: u32,
    pub colorbar_height: u32,
}

impl Layout {
    pub fn new(table: &PivotTable, style: &Style) -> Self {
        let pad = style.padding;
        let label_h = text_height(style.label_scale);
        let longest = |labels: &[String]| {
            labels
                .iter()
                .map(|l| text_length(l, style.label_scale))
                .max()
                .unwrap_or(0)
        };

        let grid_width = table.locations().len() as u32 * style.cell_width;
        let grid_height = table.families().len() as u32 * style.cell_height;

        // Y axis label, then family labels, then the grid.
        let grid_x = pad + label_h + pad + longest(table.families()) + pad / 2;
        let grid_y = pad + text_height(style.title_scale) + pad;

        // Ticks on the right of the color bar: "0.0", "0.5", "1.0".
        let colorbar_x = grid_x + grid_width + pad;
        let tick_width = text_length("0.0", style.label_scale);
        let colorbar_height = grid_height
            .max(style.min_colorbar_height)
            .max(text_length(Y_LABEL, style.label_scale));

        let width = (colorbar_x + style.colorbar_width + 4 + pad / 2 + tick_width + pad)
            .max(text_length(TITLE, style.title_scale) + 2 * pad);
        let below_grid = pad / 2 + longest(table.locations()) + pad / 2 + label_h + pad;
        let height = (grid_y + grid_height + below_grid).max(grid_y + colorbar_height + pad);

        Self {
            width,
            height,
            grid_x,
            grid_y,
            grid_width,
            grid_height,
            colorbar_x,
            colorbar_height,
        }
    }

    /// Top-left corner of cell (`row`, `column`).
    pub fn cell_origin(&self, row: usize, column: usize, style: &Style) -> (u32, u32) {
        (
            self.grid_x + column as u32 * style.cell_width,
            self.grid_y + row as u32 * style.cell_height,
        )
    }
}

/// Draws `table`, whose defined cells are expected in `[0, 1]`.
pub fn render(table: &PivotTable, style: &Style) -> RgbImage {
    let layout = Layout::new(table, style);
    let mut image = RgbImage::from_pixel(layout.width, layout.height, BACKGROUND);

    draw_cells(&mut image, table, &layout, style);
    draw_labels(&mut image, table, &layout, style);
    draw_colorbar(&mut image, &layout, style);

    image
}

fn draw_cells(image: &mut RgbImage, table: &PivotTable, layout: &Layout, style: &Style) {
    for row in 0..table.families().len() {
        for column in 0..table.locations().len() {
            let (x0, y0) = layout.cell_origin(row, column, style);
            let cell = table.cell(row, column);
            for dy in 0..style.cell_height {
                for dx in 0..style.cell_width {
                    let color = match cell {
                        Some(value) => color_for(value),
                        None if (dx + dy) % 6 == 0 => UNDEFINED_HATCH,
                        None => UNDEFINED,
                    };
                    image.put_pixel(x0 + dx, y0 + dy, color);
                }
            }
        }
    }
}

fn draw_labels(image: &mut RgbImage, table: &PivotTable, layout: &Layout, style: &Style) {
    let scale = style.label_scale;
    let label_h = text_height(scale);
    let pad = style.padding;

    let title_x = (layout.width - text_length(TITLE, style.title_scale)) / 2;
    let horizontal = Orientation::Horizontal;
    let vertical = Orientation::Vertical;
    draw_text(image, title_x.into(), pad.into(), TITLE, style.title_scale, INK, horizontal);

    // Family labels, right-aligned against the grid and centered on each row.
    for (row, family) in table.families().iter().enumerate() {
        let (_, y) = layout.cell_origin(row, 0, style);
        let x = layout.grid_x - pad / 2 - text_length(family, scale);
        let y = y + style.cell_height.saturating_sub(label_h) / 2;
        draw_text(image, x.into(), y.into(), family, scale, INK, horizontal);
    }

    // Location labels run upwards and end just below the grid.
    let grid_bottom = layout.grid_y + layout.grid_height;
    for (column, location) in table.locations().iter().enumerate() {
        let (x, _) = layout.cell_origin(0, column, style);
        let x = x + style.cell_width.saturating_sub(label_h) / 2;
        let y = grid_bottom + pad / 2 + text_length(location, scale);
        draw_text(image, x.into(), y.into(), location, scale, INK, vertical);
    }

    let longest_location = table
        .locations()
        .iter()
        .map(|l| text_length(l, scale))
        .max()
        .unwrap_or(0);
    let x_label_x = layout.grid_x + layout.grid_width / 2;
    let x_label_x = x_label_x.saturating_sub(text_length(X_LABEL, scale) / 2);
    let x_label_y = grid_bottom + pad / 2 + longest_location + pad / 2;
    draw_text(image, x_label_x.into(), x_label_y.into(), X_LABEL, scale, INK, horizontal);

    // Centered on the color bar, which is at least as tall as the label.
    let y_label_len = text_length(Y_LABEL, scale);
    let y_label_y = layout.grid_y + layout.colorbar_height / 2 + y_label_len / 2;
    draw_text(image, pad.into(), y_label_y.into(), Y_LABEL, scale, INK, vertical);
}

fn draw_colorbar(image: &mut RgbImage, layout: &Layout, style: &Style) {
    let x0 = layout.colorbar_x;
    let y0 = layout.grid_y;
    let height = layout.colorbar_height;
    let bottom = height.saturating_sub(1).max(1);

    for dy in 0..height {
        let color = color_for(f64::from(bottom - dy.min(bottom)) / f64::from(bottom));
        for dx in 0..style.colorbar_width {
            image.put_pixel(x0 + dx, y0 + dy, color);
        }
    }

    let scale = style.label_scale;
    let tick_x = i64::from(x0 + style.colorbar_width);
    for (label, fraction) in [("1.0", 0.0), ("0.5", 0.5), ("0.0", 1.0)] {
        let y = i64::from(y0) + (f64::from(bottom) * fraction).round() as i64;
        for dx in 0..4 {
            put_pixel(image, tick_x + dx, y, INK);
        }
        let text_y = y - i64::from(text_height(scale)) / 2;
        let text_x = tick_x + 4 + i64::from(style.padding / 2);
        draw_text(image, text_x, text_y, label, scale, INK, Orientation::Horizontal);
    }
}
