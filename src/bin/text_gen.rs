//! Drill lines of text in a single-stroke font.
//!
//! The built-in font only has lowercase letters. A font table (`--font`) adds or replaces glyphs, see
//! `fonts/squared.txt` for digits and punctuation.
use anyhow::{Context, Result};
use gcode::fonts::{render_block, Font, TextStyle};
use gcode::{go_to_start, init_logging, Machine, MachiningParameters};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;

#[derive(Debug, StructOpt)]
#[structopt(name = "text_gen", about = "Drills text in a single-stroke font")]
struct Opt {
    /// Lines of text, the first one at the bottom
    #[structopt(required = true)]
    lines: Vec<String>,

    /// Font table to layer over the built-in lowercase letters
    #[structopt(long, parse(from_os_str))]
    font: Option<PathBuf>,

    #[structopt(flatten)]
    style: TextStyle,

    #[structopt(flatten)]
    params: MachiningParameters,

    /// Controller to set up before the job (x-carve or next3d)
    #[structopt(long)]
    machine: Option<Machine>,

    /// X of the text origin, from where the drill is when the job starts, in mm
    #[structopt(long, default_value = "0")]
    start_x: f64,

    /// Y of the text origin, from where the drill is when the job starts, in mm
    #[structopt(long, default_value = "0")]
    start_y: f64,

    /// Output file for the resulting G code
    #[structopt(short, long, parse(from_os_str))]
    output: PathBuf,
}

fn help_text(opt: &Opt) {
    println!(
        "Before cut:\n
            Lower the drill until it touches the panel surface.
            Letters are {}mm high and {}mm deep.",
        5.0 * opt.params.drill_diameter,
        opt.params.pass_depth
    )
}

fn main() -> Result<()> {
    init_logging();
    let opt = Opt::from_args();
    help_text(&opt);

    let mut font = Font::builtin();
    if let Some(path) = &opt.font {
        font.extend(Font::from_file(path)?);
        info!(glyphs = font.len(), font = %path.display(), "loaded font");
    }

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
    let lines: Vec<&str> = opt.lines.iter().map(String::as_str).collect();
    render_block(&mut file, &lines, &font, &opt.params, &opt.style)?;
    file.flush()?;

    info!(lines = lines.len(), output = %opt.output.display(), "done");
    Ok(())
}
