//! Drilling envelopes: everything that goes down into the material and comes back up.
//!
//! All sequences assume the tool starts at displacement height, in relative mode, and they leave it at
//! displacement height again.

use std::io::{Result, Write};

use nalgebra::geometry::Point2;
use nalgebra::Vector2;
use tracing::debug;

use crate::shapes::Path;
use crate::{g0, g1, gcode_comment, select_tool, xyf, zf, MachiningParameters};

fn header(file: &mut dyn Write, params: &MachiningParameters, comment: &str) -> Result<()> {
    if !comment.is_empty() {
        gcode_comment(file, comment)?;
    }
    if params.drill_diameter > 0.0 {
        select_tool(file, params.drill_diameter)?;
    }
    Ok(())
}

/// Cut `path` down to the drill depth.
///
/// After an optional rapid to `start`, the tool plunges to the surface and then one pass depth at a time,
/// running the whole path after every plunge. The last plunge takes the remaining depth. A zero pass depth
/// plunges straight to the full depth and runs the path once.
pub fn build_drawing_element(
    file: &mut dyn Write,
    path: &Path,
    start: Vector2<f64>,
    params: &MachiningParameters,
    comment: &str,
) -> Result<()> {
    header(file, params, comment)?;
    g0(file, xyf(start.x, start.y, params.fast_displacement_speed))?;

    let passes = params.pass_depths();
    debug!(passes = passes.len(), moves = path.len(), "drawing element");
    if params.pass_depth <= 0.0 {
        g1(
            file,
            zf(
                -params.displacement_height - params.drill_depth,
                params.drill_bore_speed,
            ),
        )?;
        path.write(file)?;
    } else {
        g1(file, zf(-params.displacement_height, params.drill_bore_speed))?;
        for depth in passes {
            g1(file, zf(-depth, params.drill_bore_speed))?;
            path.write(file)?;
        }
    }

    // Back up to displacement height
    g0(
        file,
        zf(
            params.drill_depth + params.displacement_height,
            params.fast_displacement_speed,
        ),
    )
}

/// Drill a straight hole at each point. Points are relative to where the tool is when we start,
/// and the tool is left above the last hole.
pub fn build_hole_set(
    file: &mut dyn Write,
    holes: &[Point2<f64>],
    params: &MachiningParameters,
    comment: &str,
) -> Result<()> {
    header(file, params, comment)?;
    let mut old = Point2::origin();
    for hole in holes {
        g0(
            file,
            xyf(hole.x - old.x, hole.y - old.y, params.fast_displacement_speed),
        )?;
        g1(
            file,
            zf(
                -params.displacement_height - params.drill_depth,
                params.drill_bore_speed,
            ),
        )?;
        g0(
            file,
            zf(
                params.drill_depth + params.displacement_height,
                params.fast_displacement_speed,
            ),
        )?;
        old = *hole;
    }
    Ok(())
}

/// A row of identical straight slits, each one tool diameter wide
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlitSet {
    /// Offset of the first slit's start from the current position
    pub start: Vector2<f64>,
    /// Vector along each slit
    pub length: Vector2<f64>,
    /// Offset from one slit's start to the next
    pub spacing: Vector2<f64>,
    pub count: usize,
}

/// Cut a [`SlitSet`]. Each slit is cut going back and forth, one pass depth deeper on every stroke, until the
/// drill depth is reached.
pub fn build_slit_set(
    file: &mut dyn Write,
    slits: &SlitSet,
    params: &MachiningParameters,
    comment: &str,
) -> Result<()> {
    header(file, params, comment)?;
    g0(
        file,
        xyf(slits.start.x, slits.start.y, params.fast_displacement_speed),
    )?;

    // A zero pass depth still needs a down and a back stroke
    let (step, double_passes) = if params.pass_depth > 0.0 {
        (
            params.pass_depth,
            (params.drill_depth / (2.0 * params.pass_depth)).ceil() as usize,
        )
    } else {
        (params.drill_depth / 2.0, 1)
    };
    let (dx, dy) = (slits.length.x, slits.length.y);

    for i in 0..slits.count {
        if slits.count > 1 {
            gcode_comment(file, &format!("slit {}", i + 1))?;
        }
        g0(
            file,
            zf(-params.displacement_height, params.fast_displacement_speed),
        )?;
        for _ in 0..double_passes {
            g1(file, zf(-step, params.drill_bore_speed))?;
            g1(file, xyf(dx, dy, params.drill_displacement_speed))?;
            g1(file, zf(-step, params.drill_bore_speed))?;
            g1(file, xyf(-dx, -dy, params.drill_displacement_speed))?;
        }
        g1(
            file,
            zf(
                2.0 * double_passes as f64 * step,
                params.fast_displacement_speed,
            ),
        )?;
        g0(
            file,
            zf(params.displacement_height, params.fast_displacement_speed),
        )?;
        if i + 1 < slits.count {
            g0(
                file,
                xyf(
                    slits.spacing.x,
                    slits.spacing.y,
                    params.fast_displacement_speed,
                ),
            )?;
        }
    }
    Ok(())
}
