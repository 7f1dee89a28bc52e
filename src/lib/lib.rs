use std::io::{Result, Write};
use std::str::FromStr;

pub mod drilling;
mod error;
pub mod fonts;
pub mod geometry;
mod params;
pub mod raster;
pub mod shapes;
pub mod svg;

pub use error::Error;
pub use params::MachiningParameters;

/// Decimal places used for every coordinate and feed we emit
const PRECISION: i32 = 4;

/// Log to stderr, filtered by `RUST_LOG` (info by default). Stdout is left to the generators' help text.
pub fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Comments can't nest and end at the first `)`, so parentheses in the text are written as brackets.
pub fn gcode_comment(file: &mut dyn Write, s: &str) -> Result<()> {
    let text: String = s
        .chars()
        .map(|c| match c {
            '(' => '[',
            ')' => ']',
            c => c,
        })
        .collect();
    writeln!(file, "({text})")
}

/// Controllers that need their vertical axis configured before a job
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Machine {
    XCarve,
    Next3D,
}

impl Machine {
    fn setup_line(&self) -> &'static str {
        match self {
            Machine::XCarve => "$102=189 (X-Carve vertical axis displacement setup)",
            Machine::Next3D => "$102=133 (Next3D vertical axis displacement setup)",
        }
    }
}

impl FromStr for Machine {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x-carve" | "xcarve" => Ok(Machine::XCarve),
            "next3d" => Ok(Machine::Next3D),
            _ => Err(format!("unknown machine '{s}', expected x-carve or next3d")),
        }
    }
}

pub fn set_units_to_millimeters(file: &mut dyn Write) -> Result<()> {
    writeln!(file, "G21 (set units to millimeters)")
}

/// Declare the current position as zero on the chosen axes (G92)
pub fn set_current_position_as_origin(
    file: &mut dyn Write,
    set_x: bool,
    set_y: bool,
    set_z: bool,
) -> Result<()> {
    let axes: Vec<&str> = [("X", set_x), ("Y", set_y), ("Z", set_z)]
        .iter()
        .filter(|(_, set)| *set)
        .map(|(name, _)| *name)
        .collect();
    write!(file, "G92")?;
    for axis in &axes {
        write!(file, " {axis}0")?;
    }
    writeln!(file, " (set {} position to zero)", axes.join(","))
}

pub fn select_tool(file: &mut dyn Write, drill_diameter: f64) -> Result<()> {
    writeln!(
        file,
        "T{drill_diameter} (drill diameter for the following operations)"
    )
}

pub fn set_absolute_coordinates(file: &mut dyn Write) -> Result<()> {
    writeln!(file, "G90 (set to absolute positioning)")
}

pub fn set_relative_coordinates(file: &mut dyn Write) -> Result<()> {
    writeln!(file, "G91 (set to relative positioning)")
}

/// Rapid back to the origin set by `go_to_start`. The move is made in absolute mode, then we switch straight
/// back to relative mode, which every other emitter assumes.
pub fn move_back_to_origin(
    file: &mut dyn Write,
    move_x: bool,
    move_y: bool,
    move_z: bool,
) -> Result<()> {
    gcode_comment(file, "move back to origin")?;
    set_absolute_coordinates(file)?;
    write!(file, "G0")?;
    for (axis, chosen) in [("X", move_x), ("Y", move_y), ("Z", move_z)] {
        if chosen {
            write!(file, " {axis}0")?;
        }
    }
    writeln!(file)?;
    set_relative_coordinates(file)
}

/// Program preamble. Assumes the tool touches the surface: that height becomes Z0, we rise to the
/// displacement height, travel to the start position and make it the XY origin.
pub fn go_to_start(
    file: &mut dyn Write,
    start_x: f64,
    start_y: f64,
    params: &MachiningParameters,
    machine: Option<Machine>,
) -> Result<()> {
    gcode_comment(file, "initialization")?;
    if let Some(machine) = machine {
        writeln!(file, "{}", machine.setup_line())?;
    }
    set_units_to_millimeters(file)?;
    set_current_position_as_origin(file, false, false, true)?;
    set_relative_coordinates(file)?;
    gcode_comment(file, "move up to displacement height, set steady pace")?;
    g1(
        file,
        zf(params.displacement_height, params.drill_displacement_speed),
    )?;
    gcode_comment(file, "move to start position, set fast pace")?;
    g0(file, xyf(start_x, start_y, params.fast_displacement_speed))?;
    set_current_position_as_origin(file, true, true, false)
}

/// A relative displacement, with the feed to make it at.
/// Zero components are left out of the emitted command, and a zero feed means "keep the current feed".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PosAndFeed {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub feed: f64,
}

pub fn xy(x: f64, y: f64) -> PosAndFeed {
    PosAndFeed {
        x,
        y,
        ..Default::default()
    }
}

pub fn xyf(x: f64, y: f64, feed: f64) -> PosAndFeed {
    PosAndFeed {
        x,
        y,
        z: 0.0,
        feed,
    }
}

pub fn xyzf(x: f64, y: f64, z: f64, feed: f64) -> PosAndFeed {
    PosAndFeed { x, y, z, feed }
}

pub fn z(z: f64) -> PosAndFeed {
    PosAndFeed {
        z,
        ..Default::default()
    }
}

pub fn zf(z: f64, feed: f64) -> PosAndFeed {
    PosAndFeed {
        x: 0.0,
        y: 0.0,
        z,
        feed,
    }
}

impl PosAndFeed {
    /// True when every axis would print as zero, so the command would not move the machine
    pub fn is_noop(&self) -> bool {
        is_zero(self.x) && is_zero(self.y) && is_zero(self.z)
    }

    fn as_gvals(&self, file: &mut dyn Write) -> Result<()> {
        g_val(file, "X", self.x)?;
        g_val(file, "Y", self.y)?;
        g_val(file, "Z", self.z)?;
        g_val(file, "F", self.feed)?;
        Ok(())
    }
}

fn is_zero(v: f64) -> bool {
    (v * 10f64.powi(PRECISION)).round() == 0.0
}

/// Numbers that round nicely are printed in their minimal form, to keep the gcode human-friendly.
fn number(v: f64) -> String {
    if (v - v.round()).abs() < f64::EPSILON {
        format!("{}.", v.round())
    } else {
        format!("{:.*}", PRECISION as usize, v)
    }
}

/// Emit a gcode parameter value, unless it is zero.
fn g_val(file: &mut dyn Write, name: &str, v: f64) -> Result<()> {
    if is_zero(v) {
        Ok(())
    } else {
        write!(file, " {}{}", name, number(v))
    }
}

fn g_move_linear(file: &mut dyn Write, g: &str, p: &PosAndFeed) -> Result<()> {
    if p.is_noop() {
        return Ok(());
    }
    write!(file, "{g}")?;
    p.as_gvals(file)?;
    writeln!(file)?;
    Ok(())
}

/// Rapid relative move
pub fn g0(file: &mut dyn Write, p: PosAndFeed) -> Result<()> {
    g_move_linear(file, "G0", &p)
}

/// Steady (cutting) relative move
pub fn g1(file: &mut dyn Write, p: PosAndFeed) -> Result<()> {
    g_move_linear(file, "G1", &p)
}
