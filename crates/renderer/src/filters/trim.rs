use image::imageops;

use stitch_common::{FilterContext, StitchResult};

use super::Filter;
use crate::Raster;

/// A channel must differ from the background by more than this to count as
/// content.
const TOLERANCE: i16 = 100;

/// `trim`: crop away the border that matches the top-left pixel.
pub struct TrimFilter;

/// Inclusive bounding box `(min_x, min_y, max_x, max_y)` of content pixels.
fn content_bounds(raster: &Raster) -> Option<(u32, u32, u32, u32)> {
    let background = raster.get_pixel_checked(0, 0)?.0;

    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, px) in raster.enumerate_pixels() {
        let differs = px
            .0
            .iter()
            .zip(background.iter())
            .any(|(&c, &b)| (c as i16 - b as i16).abs() > TOLERANCE);
        if differs {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }
    bounds
}

impl Filter for TrimFilter {
    fn name(&self) -> &'static str {
        "trim"
    }

    fn arity(&self) -> &'static [usize] {
        &[0]
    }

    fn apply(&self, raster: Raster, _ctx: &FilterContext, _args: &[String]) -> StitchResult<Raster> {
        match content_bounds(&raster) {
            Some((x0, y0, x1, y1)) => {
                Ok(imageops::crop_imm(&raster, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image())
            }
            None => Ok(raster),
        }
    }
}
