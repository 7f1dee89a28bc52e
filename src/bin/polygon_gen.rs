//! Cut outlines drawn in a vector editor.
//!
//! Each `--id` names a `<path>` of the SVG file made of straight segments. The drawing is flipped to have Y
//! going up and moved so its lower left corner is at the origin.
use anyhow::{Context, Result};
use gcode::drilling::{build_drawing_element, build_hole_set};
use gcode::geometry::Polygon;
use gcode::shapes::polygon;
use gcode::{go_to_start, init_logging, move_back_to_origin, Machine, MachiningParameters};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::{info, warn};

#[derive(Debug, StructOpt)]
#[structopt(name = "polygon_gen", about = "Cuts polygon outlines imported from an SVG file")]
struct Opt {
    /// SVG file holding the outlines
    #[structopt(parse(from_os_str))]
    svg: PathBuf,

    /// Id of a path to cut, may be repeated
    #[structopt(long = "id", required = true)]
    ids: Vec<String>,

    /// Scale factor applied to the drawing
    #[structopt(long, default_value = "1")]
    scale: f64,

    /// Rotation of the drawing, in degrees counter-clockwise
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    rotate: f64,

    /// Mirror the drawing left to right, to cut it from the back of the panel
    #[structopt(long)]
    mirror: bool,

    /// Move every edge by this much to the right of its direction, in mm. Use half the drill diameter to
    /// keep the cut outside the outline, minus that to keep it inside.
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    expand: f64,

    /// Drill a hole in every corner turning the other way from the outline, to clear what the drill leaves
    #[structopt(long)]
    corner_holes: bool,

    #[structopt(flatten)]
    params: MachiningParameters,

    /// Controller to set up before the job (x-carve or next3d)
    #[structopt(long)]
    machine: Option<Machine>,

    /// X of the drawing origin, from where the drill is when the job starts, in mm
    #[structopt(long, default_value = "0")]
    start_x: f64,

    /// Y of the drawing origin, from where the drill is when the job starts, in mm
    #[structopt(long, default_value = "0")]
    start_y: f64,

    /// Output file for the resulting G code
    #[structopt(short, long, parse(from_os_str))]
    output: PathBuf,
}

fn help_text() {
    println!(
        "Before cut:\n
            Lower the drill until it touches the panel surface.
            The drawing's lower left corner is at the start position."
    )
}

/// Imported outlines, in panel coordinates
fn load(opt: &Opt) -> Result<Vec<(String, Polygon)>> {
    let mut outlines = Vec::new();
    for id in &opt.ids {
        let mut outline = Polygon::from_svg_file(&opt.svg, id, false)?
            .flip_vertical()
            .scale(opt.scale, None)
            .rotate(opt.rotate.to_radians());
        if opt.mirror {
            outline = outline.flip_horizontal();
        }
        if outline.len() < 2 {
            warn!(id = %id, "outline has less than 2 points, skipping");
            continue;
        }
        outlines.push((id.clone(), outline));
    }

    // Lower left corner of the whole drawing
    let corners: Vec<_> = outlines
        .iter()
        .filter_map(|(_, outline)| outline.min_max())
        .flat_map(|(min, max)| [min, max])
        .collect();
    if let Some((min, _)) = Polygon::new(corners).min_max() {
        outlines = outlines
            .into_iter()
            .map(|(id, outline)| (id, outline.offset(-min.x, -min.y)))
            .collect();
    }
    Ok(outlines)
}

fn main() -> Result<()> {
    init_logging();
    let opt = Opt::from_args();
    help_text();

    let outlines = load(&opt)?;
    let mut file = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&opt.output)
            .with_context(|| format!("Couldn't create {}", opt.output.display()))?,
    );
    go_to_start(
        &mut file,
        opt.start_x,
        opt.start_y,
        &opt.params,
        opt.machine,
    )?;

    for (id, outline) in &outlines {
        let outline = if opt.expand != 0.0 {
            outline
                .expand(opt.expand)
                .with_context(|| format!("Couldn't expand path '{id}'"))?
        } else {
            outline.clone()
        };

        if opt.corner_holes {
            let holes = outline.hole_set(0.0);
            if !holes.is_empty() {
                build_hole_set(
                    &mut file,
                    &holes,
                    &opt.params,
                    &format!("corners of \"{id}\""),
                )?;
                move_back_to_origin(&mut file, true, true, false)?;
            }
        }

        let (start, relative) = outline.extract_offset(true);
        build_drawing_element(
            &mut file,
            &polygon(&relative.points, false, opt.params.drill_displacement_speed),
            start,
            &opt.params,
            &format!("polygon \"{id}\""),
        )?;
        move_back_to_origin(&mut file, true, true, false)?;
        info!(id = %id, points = outline.len(), "cut outline");
    }
    file.flush()?;
    Ok(())
}
