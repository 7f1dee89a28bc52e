//! Read a program back and draw what it would cut, for checking a job before running it.
//!
//! Only the words our generators emit are understood: `T`, `G0`, `G1`, `G90`, `G91` and `G92`. Everything
//! else is skipped.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::io::{Result, Write};

use nalgebra::geometry::Point3;
use tracing::debug;

use crate::Error;

const MM_TO_PX: f64 = 96.0 / 25.4;
/// Quarter inch, for programs that never select a tool
pub const DEFAULT_DIAMETER: f64 = 6.35;
/// Stroke width of moves above the material, in mm
const DISPLACEMENT_WIDTH: f64 = 1.0;
/// Heights within this of the surface count as the surface
const SURFACE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeKind {
    /// Horizontal move below the surface
    Cut,
    /// Horizontal move above the surface
    Travel,
    /// Vertical move ending at or below the surface, drawn at its end point
    Bore,
}

/// One move, in absolute coordinates: the program's starting point is (0, 0, 0)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub kind: StrokeKind,
    pub from: Point3<f64>,
    pub to: Point3<f64>,
    pub diameter: f64,
}

impl Stroke {
    fn depth_key(&self) -> Option<i64> {
        match self.kind {
            StrokeKind::Travel => None,
            // Thousandths of a millimeter
            _ => Some((-self.to.z * 1000.0).round() as i64),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trace {
    pub strokes: Vec<Stroke>,
    /// Where the tool is at the end of the program
    pub position: Point3<f64>,
}

struct Machine {
    absolute: bool,
    origin: Point3<f64>,
    position: Point3<f64>,
    diameter: f64,
}

/// Drop `( ... )` comments, nested or not, and everything after a `;`
fn strip_comments(line: &str) -> String {
    let line = line.split(';').next().unwrap_or("");
    let mut depth = 0usize;
    line.chars()
        .filter(|&c| match c {
            '(' => {
                depth += 1;
                false
            }
            ')' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect()
}

/// Axis values given by the words of a command, X Y Z in that order
fn axes(words: &[&str], line: usize) -> std::result::Result<[Option<f64>; 3], Error> {
    let mut values = [None; 3];
    for word in words {
        let slot = match word.chars().next() {
            Some('X') => 0,
            Some('Y') => 1,
            Some('Z') => 2,
            _ => continue,
        };
        let value = word[1..].parse().map_err(|_| Error::Program {
            line,
            word: word.to_string(),
        })?;
        values[slot] = Some(value);
    }
    Ok(values)
}

impl Machine {
    fn target(&self, values: [Option<f64>; 3]) -> Point3<f64> {
        let mut target = self.position;
        for (axis, value) in values.iter().enumerate() {
            if let Some(v) = value {
                target[axis] = if self.absolute {
                    self.origin[axis] + v
                } else {
                    self.position[axis] + v
                };
            }
        }
        target
    }

    fn stroke(&self, to: Point3<f64>) -> Option<Stroke> {
        let from = self.position;
        let kind = if (to.z - from.z).abs() < SURFACE {
            if from == to {
                return None;
            }
            if to.z <= SURFACE {
                StrokeKind::Cut
            } else {
                StrokeKind::Travel
            }
        } else if to.z <= SURFACE {
            StrokeKind::Bore
        } else {
            return None;
        };
        Some(Stroke {
            kind,
            from,
            to,
            diameter: self.diameter,
        })
    }
}

impl Trace {
    pub fn parse(program: &str) -> std::result::Result<Self, Error> {
        Trace::parse_with_tool(program, DEFAULT_DIAMETER)
    }

    /// Parse a program, drawing with `diameter` until it selects a tool
    pub fn parse_with_tool(program: &str, diameter: f64) -> std::result::Result<Self, Error> {
        let mut machine = Machine {
            absolute: true,
            origin: Point3::origin(),
            position: Point3::origin(),
            diameter,
        };
        let mut strokes = Vec::new();

        for (index, line) in program.lines().enumerate() {
            let code = strip_comments(line).to_ascii_uppercase();
            let words: Vec<&str> = code.split_whitespace().collect();
            let (command, arguments) = match words.split_first() {
                Some((command, arguments)) => (*command, arguments),
                None => continue,
            };
            let line = index + 1;
            match command {
                "G90" => machine.absolute = true,
                "G91" => machine.absolute = false,
                "G92" => {
                    let values = axes(arguments, line)?;
                    for (axis, value) in values.iter().enumerate() {
                        if let Some(v) = value {
                            machine.origin[axis] = machine.position[axis] - v;
                        }
                    }
                }
                "G0" | "G00" | "G1" | "G01" => {
                    let to = machine.target(axes(arguments, line)?);
                    strokes.extend(machine.stroke(to));
                    machine.position = to;
                }
                tool if tool.starts_with('T') => {
                    machine.diameter = tool[1..].parse().map_err(|_| Error::Program {
                        line,
                        word: tool.to_string(),
                    })?;
                }
                _ => {}
            }
        }

        debug!(strokes = strokes.len(), "parsed program");
        Ok(Trace {
            strokes,
            position: machine.position,
        })
    }
}

/// Sheet the trace is drawn on, in mm
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    /// Plate thickness: cuts get darker down to this depth, and are black below it
    pub thickness: f64,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            width: 1000.0,
            height: 1000.0,
            thickness: 20.0,
        }
    }
}

/// Orange on the surface, a gray ramp through the plate, black below it, green above the surface
pub fn color_code(z: f64, thickness: f64) -> String {
    if z.abs() < SURFACE {
        "orange".to_string()
    } else if z > 0.0 {
        "green".to_string()
    } else if z >= -thickness {
        let intensity = (255.0 + z * 255.0 / thickness) as u8;
        format!("rgb({intensity}, {intensity}, {intensity})")
    } else {
        "black".to_string()
    }
}

/// Layer name for a depth in thousandths of a millimeter
fn layer_name(depth: Option<i64>) -> String {
    match depth {
        None => "displacements".to_string(),
        Some(thousandths) => {
            let depth = format!("{:.3}", thousandths as f64 / 1000.0);
            let depth = depth.trim_end_matches('0').trim_end_matches('.');
            format!("depth_{depth}")
        }
    }
}

fn write_stroke(file: &mut dyn Write, stroke: &Stroke, page: &Page) -> Result<()> {
    let x = |p: &Point3<f64>| MM_TO_PX * p.x;
    let y = |p: &Point3<f64>| MM_TO_PX * (page.height - p.y);
    let color = color_code(stroke.to.z, page.thickness);
    match stroke.kind {
        StrokeKind::Bore => writeln!(
            file,
            "    <circle cx=\"{:.3}\" cy=\"{:.3}\" r=\"{:.3}\" stroke=\"none\" fill=\"{}\" />",
            x(&stroke.to),
            y(&stroke.to),
            MM_TO_PX * stroke.diameter / 2.0,
            color
        ),
        StrokeKind::Cut => writeln!(
            file,
            "    <line x1=\"{:.3}\" y1=\"{:.3}\" x2=\"{:.3}\" y2=\"{:.3}\" stroke=\"{}\" stroke-width=\"{:.3}\" stroke-linecap=\"round\" />",
            x(&stroke.from),
            y(&stroke.from),
            x(&stroke.to),
            y(&stroke.to),
            color,
            MM_TO_PX * stroke.diameter
        ),
        StrokeKind::Travel => writeln!(
            file,
            "    <line x1=\"{:.3}\" y1=\"{:.3}\" x2=\"{:.3}\" y2=\"{:.3}\" stroke=\"{}\" stroke-width=\"{:.3}mm\" />",
            x(&stroke.from),
            y(&stroke.from),
            x(&stroke.to),
            y(&stroke.to),
            color,
            DISPLACEMENT_WIDTH
        ),
    }
}

/// Write the trace as an SVG document with one Inkscape layer per depth, the deepest at the bottom, above a
/// `displacements` layer for moves in the air.
pub fn write_svg(file: &mut dyn Write, trace: &Trace, page: &Page) -> Result<()> {
    // Displacements first, then deepest first
    let mut layers: BTreeMap<Option<Reverse<i64>>, Vec<&Stroke>> = BTreeMap::new();
    for stroke in &trace.strokes {
        layers
            .entry(stroke.depth_key().map(Reverse))
            .or_default()
            .push(stroke);
    }
    debug!(layers = layers.len(), "writing svg");

    writeln!(file, "<svg")?;
    writeln!(file, "  xmlns=\"http://www.w3.org/2000/svg\"")?;
    writeln!(
        file,
        "  xmlns:inkscape=\"http://www.inkscape.org/namespaces/inkscape\""
    )?;
    writeln!(
        file,
        "  xmlns:sodipodi=\"http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd\""
    )?;
    writeln!(
        file,
        "  width=\"{}mm\" height=\"{}mm\"",
        page.width, page.height
    )?;
    writeln!(
        file,
        "  viewBox=\"0 0 {} {}\"",
        page.width * MM_TO_PX,
        page.height * MM_TO_PX
    )?;
    writeln!(file, ">")?;
    // Centimeter grid
    writeln!(
        file,
        "  <sodipodi:namedview inkscape:document-units=\"cm\" showgrid=\"true\">"
    )?;
    writeln!(
        file,
        "    <inkscape:grid type=\"xygrid\" id=\"cm\" units=\"cm\" spacingx=\"{0}\" spacingy=\"{0}\" emspacing=\"10\" originx=\"0\" originy=\"0\" />",
        10.0 * MM_TO_PX
    )?;
    writeln!(file, "  </sodipodi:namedview>")?;

    for (depth, strokes) in &layers {
        let name = layer_name(depth.map(|Reverse(thousandths)| thousandths));
        writeln!(
            file,
            "  <g inkscape:groupmode=\"layer\" id=\"{name}\" inkscape:label=\"{name}\">"
        )?;
        for stroke in strokes {
            write_stroke(file, stroke, page)?;
        }
        writeln!(file, "  </g>")?;
    }
    writeln!(file, "</svg>")
}
