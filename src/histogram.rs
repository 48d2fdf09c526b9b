use std::path::Path;

use image::{Rgb, RgbImage};

use crate::{
    catalog,
    error::AppResult,
    models::{Bin, Movie},
};

pub const BINS: usize = 5;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const MARGIN: u32 = 48;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const BAR: Rgb<u8> = Rgb([31, 119, 180]);

/// Draws the rating distribution and saves it to `path`; the extension picks
/// the image format. Returns the bins that were drawn.
pub fn save_rating_histogram(movies: &[Movie], path: &Path) -> AppResult<Vec<Bin>> {
    let bins = catalog::rating_bins(movies, BINS);
    render(&bins).save(path)?;
    tracing::info!(path = %path.display(), movies = movies.len(), "histogram saved");
    Ok(bins)
}

pub fn render(bins: &[Bin]) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    let plot_w = WIDTH - 2 * MARGIN;
    let plot_h = HEIGHT - 2 * MARGIN;
    let baseline = HEIGHT - MARGIN;
    let tallest = bins.iter().map(|b| b.count).max().unwrap_or(0);

    if tallest > 0 {
        let bar_w = plot_w / bins.len() as u32;
        for (i, bin) in bins.iter().enumerate() {
            let h = (bin.count as u64 * plot_h as u64 / tallest as u64) as u32;
            if h == 0 {
                continue;
            }
            let x0 = MARGIN + i as u32 * bar_w;
            fill_rect(&mut img, x0, baseline - h, bar_w, h, BAR);
            outline_rect(&mut img, x0, baseline - h, bar_w, h, AXIS);
        }
    }

    // axes
    fill_rect(&mut img, MARGIN, MARGIN, 1, plot_h + 1, AXIS);
    fill_rect(&mut img, MARGIN, baseline, plot_w + 1, 1, AXIS);
    img
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    for y in y0..(y0 + h).min(img.height()) {
        for x in x0..(x0 + w).min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

fn outline_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    fill_rect(img, x0, y0, w, 1, color);
    fill_rect(img, x0, y0 + h - 1, w, 1, color);
    fill_rect(img, x0, y0, 1, h, color);
    fill_rect(img, x0 + w - 1, y0, 1, h, color);
}
