use image::{imageops, Rgb};

use stitch_common::{FilterContext, StitchResult};

use super::{parse_pixels, Filter};
use crate::Raster;

/// Grow the image by `rows` at the top, filled with the top-left color.
fn pad_top(raster: Raster, rows: u32) -> Raster {
    if rows == 0 {
        return raster;
    }
    let fill = raster.get_pixel_checked(0, 0).copied().unwrap_or(Rgb([0, 0, 0]));
    let mut out = Raster::from_pixel(raster.width(), raster.height() + rows, fill);
    imageops::replace(&mut out, &raster, 0, rows as i64);
    out
}

/// `add_px_top:N`
pub struct AddPxTopFilter;

impl Filter for AddPxTopFilter {
    fn name(&self) -> &'static str {
        "add_px_top"
    }

    fn arity(&self) -> &'static [usize] {
        &[1]
    }

    fn check_args(&self, args: &[String]) -> StitchResult<()> {
        args.iter()
            .try_for_each(|arg| parse_pixels(self.name(), arg).map(|_| ()))
    }

    fn apply(&self, raster: Raster, _ctx: &FilterContext, args: &[String]) -> StitchResult<Raster> {
        let rows = match args {
            [n] => parse_pixels(self.name(), n)?,
            _ => 0,
        };
        Ok(pad_top(raster, rows))
    }
}

/// `add_22_px`: fixed 22-row band, room for a caption bar.
pub struct Add22PxFilter;

impl Filter for Add22PxFilter {
    fn name(&self) -> &'static str {
        "add_22_px"
    }

    fn arity(&self) -> &'static [usize] {
        &[0]
    }

    fn apply(&self, raster: Raster, _ctx: &FilterContext, _args: &[String]) -> StitchResult<Raster> {
        Ok(pad_top(raster, 22))
    }
}
