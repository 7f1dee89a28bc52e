//! Generate drilling paths for panel cutouts: rectangular openings, round holes, hole grids, fixing holes
//! and straight slits.
//!
//! Every program starts with the drill touching the panel surface, at the start position, and ends back above
//! it. Cutout sizes are the finished sizes: the tool path is kept one drill radius inside them.
use anyhow::{bail, Context, Result};
use gcode::drilling::{build_drawing_element, build_hole_set, build_slit_set, SlitSet};
use gcode::geometry::Polygon;
use gcode::shapes::{circle, rectangle};
use gcode::{go_to_start, init_logging, move_back_to_origin, Machine, MachiningParameters};
use nalgebra::geometry::Point2;
use nalgebra::Vector2;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;

#[derive(Debug, StructOpt)]
#[structopt(name = "panel_gen", about = "Generates drilling paths for panel cutouts")]
struct Opt {
    #[structopt(flatten)]
    params: MachiningParameters,

    /// Controller to set up before the job (x-carve or next3d)
    #[structopt(long)]
    machine: Option<Machine>,

    /// X of the panel origin, from where the drill is when the job starts, in mm
    #[structopt(long, default_value = "0")]
    start_x: f64,

    /// Y of the panel origin, from where the drill is when the job starts, in mm
    #[structopt(long, default_value = "0")]
    start_y: f64,

    /// Output file for the resulting G code
    #[structopt(short, long, parse(from_os_str))]
    output: PathBuf,

    #[structopt(subcommand)]
    cut: Cut,
}

#[derive(Debug, StructOpt)]
enum Cut {
    /// Rectangular opening, lower left corner at (x, y)
    Rect {
        #[structopt(long)]
        width: f64,
        #[structopt(long)]
        height: f64,
        #[structopt(short, default_value = "0")]
        x: f64,
        #[structopt(short, default_value = "0")]
        y: f64,
    },
    /// Round opening centered on (x, y)
    Circle {
        #[structopt(long)]
        diameter: f64,
        #[structopt(short, default_value = "0")]
        x: f64,
        #[structopt(short, default_value = "0")]
        y: f64,
        /// Straight segments approximating the circle
        #[structopt(long, default_value = "64")]
        facets: usize,
    },
    /// Grid of drill holes, the first one centered on (x, y)
    Holes {
        #[structopt(long, default_value = "1")]
        columns: usize,
        #[structopt(long, default_value = "1")]
        rows: usize,
        #[structopt(long, default_value = "0")]
        spacing_x: f64,
        #[structopt(long, default_value = "0")]
        spacing_y: f64,
        #[structopt(short, default_value = "0")]
        x: f64,
        #[structopt(short, default_value = "0")]
        y: f64,
    },
    /// One drill hole at each corner of a rectangle, lower left corner at (x, y)
    Corners {
        #[structopt(long)]
        width: f64,
        #[structopt(long)]
        height: f64,
        #[structopt(short, default_value = "0")]
        x: f64,
        #[structopt(short, default_value = "0")]
        y: f64,
    },
    /// Row of identical slits
    Slits {
        /// Start of the first slit
        #[structopt(short, default_value = "0")]
        x: f64,
        #[structopt(short, default_value = "0")]
        y: f64,
        /// Slit length along X
        #[structopt(long, default_value = "0")]
        length_x: f64,
        /// Slit length along Y
        #[structopt(long, default_value = "0")]
        length_y: f64,
        #[structopt(long, default_value = "0")]
        spacing_x: f64,
        #[structopt(long, default_value = "0")]
        spacing_y: f64,
        #[structopt(long, default_value = "1")]
        count: usize,
    },
}

fn help_text() {
    println!(
        "Before cut:\n
            Lower the drill until it touches the panel surface.
            The job starts with the drill above its start position."
    )
}

fn make_cut(cut: &Cut, params: &MachiningParameters, file: &mut dyn Write) -> Result<()> {
    let d = params.drill_diameter;
    match *cut {
        Cut::Rect {
            width,
            height,
            x,
            y,
        } => {
            if width <= d || height <= d {
                bail!("A {width}x{height} opening is too small for a {d}mm drill");
            }
            build_drawing_element(
                file,
                &rectangle(width - d, height - d, params.drill_displacement_speed),
                Vector2::new(x + d / 2.0, y + d / 2.0),
                params,
                &format!("{width}x{height} opening"),
            )?;
        }
        Cut::Circle {
            diameter,
            x,
            y,
            facets,
        } => {
            if diameter <= d {
                bail!("A {diameter}mm hole is too small for a {d}mm drill, drill it with holes instead");
            }
            // The path starts on its circle, at angle 0
            build_drawing_element(
                file,
                &circle(diameter - d, facets, 0.0, params.drill_displacement_speed),
                Vector2::new(x + (diameter - d) / 2.0, y),
                params,
                &format!("{diameter}mm hole"),
            )?;
        }
        Cut::Holes {
            columns,
            rows,
            spacing_x,
            spacing_y,
            x,
            y,
        } => {
            let holes: Vec<Point2<f64>> = (0..rows)
                .flat_map(|row| {
                    (0..columns).map(move |column| {
                        Point2::new(
                            x + column as f64 * spacing_x,
                            y + row as f64 * spacing_y,
                        )
                    })
                })
                .collect();
            build_hole_set(file, &holes, params, &format!("{columns}x{rows} holes"))?;
        }
        Cut::Corners {
            width,
            height,
            x,
            y,
        } => {
            let corners = Polygon::rectangle(x, y, width, height);
            build_hole_set(file, &corners.points, params, "fixing holes")?;
        }
        Cut::Slits {
            x,
            y,
            length_x,
            length_y,
            spacing_x,
            spacing_y,
            count,
        } => {
            let slits = SlitSet {
                start: Vector2::new(x, y),
                length: Vector2::new(length_x, length_y),
                spacing: Vector2::new(spacing_x, spacing_y),
                count,
            };
            build_slit_set(file, &slits, params, "slits")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let opt = Opt::from_args();
    help_text();
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
    make_cut(&opt.cut, &opt.params, &mut file)?;
    move_back_to_origin(&mut file, true, true, false)?;
    file.flush()?;

    info!(output = %opt.output.display(), "done");
    Ok(())
}
