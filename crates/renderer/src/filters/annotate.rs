use stitch_common::time::format_timestamp;
use stitch_common::{FilterContext, StitchResult};

use super::Filter;
use crate::text::{draw_label, text_extent, LabelStyle};
use crate::Raster;

/// Gap between the label and the image edges.
const PADDING: u32 = 10;

/// `timestamp`: label the bottom-right corner with the satellite and the
/// resolved snapshot time.
pub struct TimestampFilter;

fn label_text(ctx: &FilterContext) -> String {
    format!("{} {}", ctx.satellite, format_timestamp(ctx.timestamp))
}

impl Filter for TimestampFilter {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn arity(&self) -> &'static [usize] {
        &[0]
    }

    fn apply(&self, mut raster: Raster, ctx: &FilterContext, _args: &[String]) -> StitchResult<Raster> {
        let text = label_text(ctx);
        let style = LabelStyle {
            font_size: (raster.height() / 40).clamp(12, 48) as f32,
            ..LabelStyle::default()
        };

        let (tw, th) = text_extent(&text, style.font_size);
        let x = raster.width().saturating_sub(tw + PADDING);
        let y = raster.height().saturating_sub(th + PADDING);

        draw_label(&mut raster, &text, x as i32, y as i32, &style);
        Ok(raster)
    }
}
