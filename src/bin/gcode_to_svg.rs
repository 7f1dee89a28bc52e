//! Draw what a program would cut, as an SVG file with one Inkscape layer per depth.
use anyhow::{Context, Result};
use gcode::init_logging;
use gcode::raster::{write_svg, Page, Trace};
use std::fs::{read_to_string, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;

#[derive(Debug, StructOpt)]
#[structopt(name = "gcode_to_svg", about = "Creates an SVG representation of a G code file")]
struct Opt {
    /// G code file to draw
    #[structopt(parse(from_os_str))]
    gcode: PathBuf,

    /// Output file, next to the G code file with an .svg extension if unset
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Page width, in mm
    #[structopt(short = "x", long, default_value = "1000")]
    width: f64,

    /// Page height, in mm
    #[structopt(short = "y", long, default_value = "1000")]
    height: f64,

    /// Drill diameter until the program selects a tool, in mm
    #[structopt(short, long, default_value = "6.35")]
    diameter: f64,

    /// Plate thickness, in mm
    #[structopt(short, long, default_value = "20")]
    thickness: f64,
}

fn main() -> Result<()> {
    init_logging();
    let opt = Opt::from_args();

    info!(gcode = %opt.gcode.display(), "reading");
    let program = read_to_string(&opt.gcode)
        .with_context(|| format!("Couldn't read {}", opt.gcode.display()))?;
    let trace = Trace::parse_with_tool(&program, opt.diameter)
        .with_context(|| format!("Couldn't parse {}", opt.gcode.display()))?;

    let output = opt
        .output
        .clone()
        .unwrap_or_else(|| opt.gcode.with_extension("svg"));
    let page = Page {
        width: opt.width,
        height: opt.height,
        thickness: opt.thickness,
    };
    let mut file = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&output)
            .with_context(|| format!("Couldn't create {}", output.display()))?,
    );
    write_svg(&mut file, &trace, &page)?;
    file.flush()?;

    info!(strokes = trace.strokes.len(), svg = %output.display(), "written");
    Ok(())
}
