use image::imageops::{self, FilterType};

use stitch_common::{FilterContext, StitchError, StitchResult};

use super::{parse_pixels, Filter};
use crate::Raster;

/// `scale` / `scale:W-H`: shrink to fit a box, preserving aspect ratio, and
/// center the result on a black canvas of exactly the box size.
///
/// Without arguments the box is the request's target size.
pub struct ScaleFilter;

impl ScaleFilter {
    fn target(&self, ctx: &FilterContext, args: &[String]) -> StitchResult<(u32, u32)> {
        let (width, height) = match args {
            [w, h] => (parse_pixels(self.name(), w)?, parse_pixels(self.name(), h)?),
            _ => (ctx.target_width, ctx.target_height),
        };
        self.require_positive(width, height)?;
        Ok((width, height))
    }

    fn require_positive(&self, width: u32, height: u32) -> StitchResult<()> {
        if width == 0 || height == 0 {
            return Err(StitchError::InvalidFilterArgument {
                filter: self.name().to_string(),
                message: format!("target size {}x{} must be positive", width, height),
            });
        }
        Ok(())
    }
}

/// Largest size with the source aspect ratio that fits in the box.
fn fit_within(src: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let ratio = f64::min(
        target.0 as f64 / src.0 as f64,
        target.1 as f64 / src.1 as f64,
    );
    let w = ((src.0 as f64 * ratio).round() as u32).clamp(1, target.0);
    let h = ((src.1 as f64 * ratio).round() as u32).clamp(1, target.1);
    (w, h)
}

impl Filter for ScaleFilter {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn arity(&self) -> &'static [usize] {
        &[0, 2]
    }

    fn check_args(&self, args: &[String]) -> StitchResult<()> {
        for arg in args {
            if parse_pixels(self.name(), arg)? == 0 {
                return Err(StitchError::InvalidFilterArgument {
                    filter: self.name().to_string(),
                    message: "target size must be positive".to_string(),
                });
            }
        }
        Ok(())
    }

    /// The no-argument form scales to the request's size, so that size must
    /// be usable too.
    fn check_target(&self, args: &[String], target: (u32, u32)) -> StitchResult<()> {
        if args.is_empty() {
            self.require_positive(target.0, target.1)?;
        }
        Ok(())
    }

    fn apply(&self, raster: Raster, ctx: &FilterContext, args: &[String]) -> StitchResult<Raster> {
        let (tw, th) = self.target(ctx, args)?;
        let (w, h) = raster.dimensions();

        if w < tw || h < th {
            return Err(StitchError::FilterPreconditionFailed {
                filter: self.name().to_string(),
                message: format!("source {}x{} is smaller than target {}x{}", w, h, tw, th),
            });
        }

        let (nw, nh) = fit_within((w, h), (tw, th));
        let resized = if (nw, nh) == (w, h) {
            raster
        } else {
            imageops::resize(&raster, nw, nh, FilterType::Lanczos3)
        };

        if (nw, nh) == (tw, th) {
            return Ok(resized);
        }

        let mut canvas = Raster::new(tw, th);
        imageops::replace(
            &mut canvas,
            &resized,
            ((tw - nw) / 2) as i64,
            ((th - nh) / 2) as i64,
        );
        Ok(canvas)
    }
}
