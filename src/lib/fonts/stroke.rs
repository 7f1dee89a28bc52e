//! The stroke mini-language glyphs are written in, and the pen that draws it.
//!
//! A program is a whitespace separated list of commands, each a letter followed by its numeric
//! parameters. Lengths are in drill diameters, angles in degrees.
//!
//! | command | meaning |
//! |---|---|
//! | `m dx dy` | move without cutting. Leading moves place the glyph's entry point instead |
//! | `h dx` | horizontal cut |
//! | `v dy` | vertical cut |
//! | `l dx dy` | straight cut |
//! | `a r start end` | arc cut of radius `r`, from angle `start` to angle `end` on the circle |
//! | `u` | lift the drill one pass depth |
//! | `d` | dive the drill one pass depth |

use nalgebra::geometry::Point2;
use nalgebra::Vector2;

use super::TextStyle;
use crate::shapes::{self, Path};
use crate::{xyf, zf, Error, MachiningParameters};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    Move(f64, f64),
    Horizontal(f64),
    Vertical(f64),
    Line(f64, f64),
    /// Angles in degrees
    Arc {
        radius: f64,
        start: f64,
        end: f64,
    },
    Lift,
    Dive,
}

pub fn parse_stroke_program(program: &str) -> Result<Vec<PathCommand>, Error> {
    let mut tokens = program.split_whitespace();
    let mut commands = Vec::new();
    while let Some(token) = tokens.next() {
        let command = match token {
            "m" => PathCommand::Move(number(&mut tokens, 'm')?, number(&mut tokens, 'm')?),
            "h" => PathCommand::Horizontal(number(&mut tokens, 'h')?),
            "v" => PathCommand::Vertical(number(&mut tokens, 'v')?),
            "l" => PathCommand::Line(number(&mut tokens, 'l')?, number(&mut tokens, 'l')?),
            "a" => {
                let radius = number(&mut tokens, 'a')?;
                let start = number(&mut tokens, 'a')?;
                let end = number(&mut tokens, 'a')?;
                // Also rejects infinite angles, whose sweep is NaN
                if !((end - start).abs() <= 360.0) {
                    return Err(Error::ArcSweep { start, end });
                }
                PathCommand::Arc { radius, start, end }
            }
            "u" => PathCommand::Lift,
            "d" => PathCommand::Dive,
            other => return Err(Error::UnknownCommand(other.to_string())),
        };
        commands.push(command);
    }
    Ok(commands)
}

fn number<'a>(tokens: &mut impl Iterator<Item = &'a str>, command: char) -> Result<f64, Error> {
    let token = tokens.next().unwrap_or("");
    token.parse().map_err(|_| Error::InvalidNumber {
        command,
        found: token.to_string(),
    })
}

/// What running a program produced. Points are in drill diameters, relative to the glyph origin.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeRun {
    /// Toolpath, from the dive at the entry point to the rise at the end
    pub path: Path,
    pub entry: Point2<f64>,
    /// Where the pen stopped
    pub end: Point2<f64>,
    /// Largest x the pen reached, arcs included
    pub right_extent: f64,
}

impl StrokeRun {
    /// The end point, taken relative to the glyph's right edge.
    /// The next glyph starts one letter spacing right of that edge, not of wherever the pen stopped.
    pub fn exit(&self) -> Point2<f64> {
        Point2::new(self.end.x - self.right_extent, self.end.y)
    }
}

struct Pen<'a> {
    params: &'a MachiningParameters,
    style: &'a TextStyle,
    path: Path,
    cursor: Point2<f64>,
    right_extent: f64,
    /// Net count of explicit `u` over `d`
    lifted: i32,
    /// Lifted for a run of `m` moves, dive again before the next cut
    travelling: bool,
}

impl<'a> Pen<'a> {
    fn scale(&self) -> f64 {
        self.params.drill_diameter
    }

    fn vertical(&mut self, pass_depths: f64) {
        if pass_depths == 0.0 {
            return;
        }
        self.path.steady(zf(
            pass_depths * self.params.pass_depth,
            self.params.drill_bore_speed,
        ));
    }

    fn advance(&mut self, delta: Vector2<f64>) {
        self.cursor += delta;
        self.right_extent = self.right_extent.max(self.cursor.x);
    }

    fn cut(&mut self, dx: f64, dy: f64) {
        let d = self.scale();
        self.path
            .steady(xyf(dx * d, dy * d, self.params.drill_displacement_speed));
        self.advance(Vector2::new(dx, dy));
    }

    fn travel(&mut self, dx: f64, dy: f64) {
        let d = self.scale();
        if self.lifted <= 0 && !self.travelling {
            if !self.style.lift_for_drill_back {
                // Drag through the existing cut
                self.cut(dx, dy);
                return;
            }
            self.vertical(1.0);
            self.travelling = true;
        }
        self.path
            .rapid(xyf(dx * d, dy * d, self.params.fast_displacement_speed));
        self.advance(Vector2::new(dx, dy));
    }

    fn end_travel(&mut self) {
        if self.travelling {
            self.vertical(-1.0);
            self.travelling = false;
        }
    }

    fn arc(&mut self, radius: f64, start: f64, end: f64) {
        let (start_rad, end_rad) = (start.to_radians(), end.to_radians());
        let facets = ((end - start).abs() / 180.0 * self.style.half_circle_facets as f64)
            .ceil()
            .max(1.0) as usize;
        let d = self.scale();
        self.path.append(&shapes::arc(
            radius * d,
            facets,
            start_rad,
            end_rad,
            self.params.drill_displacement_speed,
        ));

        // The full circle's rightmost point counts if the sweep passes angle 0
        let center_x = self.cursor.x - radius * start_rad.cos();
        let (lo, hi) = (start.min(end), start.max(end));
        if (lo / 360.0).ceil() <= (hi / 360.0).floor() {
            self.right_extent = self.right_extent.max(center_x + radius);
        }

        let chord = Vector2::new(
            radius * (end_rad.cos() - start_rad.cos()),
            radius * (end_rad.sin() - start_rad.sin()),
        );
        self.advance(chord);
    }

    fn apply(&mut self, command: &PathCommand) {
        if !matches!(command, PathCommand::Move(..)) {
            self.end_travel();
        }
        match *command {
            PathCommand::Move(dx, dy) => self.travel(dx, dy),
            PathCommand::Horizontal(dx) => self.cut(dx, 0.0),
            PathCommand::Vertical(dy) => self.cut(0.0, dy),
            PathCommand::Line(dx, dy) => self.cut(dx, dy),
            PathCommand::Arc { radius, start, end } => self.arc(radius, start, end),
            PathCommand::Lift => {
                self.vertical(1.0);
                self.lifted += 1;
            }
            PathCommand::Dive => {
                self.vertical(-1.0);
                self.lifted -= 1;
            }
        }
    }
}

/// Draw a program from its entry point.
///
/// The path dives one pass depth at the entry point and comes back up to the surface at the end, whatever
/// lifts and dives happened in between.
pub fn execute(
    commands: &[PathCommand],
    params: &MachiningParameters,
    style: &TextStyle,
) -> StrokeRun {
    let mut commands = commands.iter().peekable();
    let mut entry = Point2::origin();
    while let Some(&&PathCommand::Move(dx, dy)) = commands.peek() {
        entry += Vector2::new(dx, dy);
        commands.next();
    }

    let mut pen = Pen {
        params,
        style,
        path: Path::new(),
        cursor: entry,
        right_extent: entry.x,
        lifted: 0,
        travelling: false,
    };
    pen.vertical(-1.0);
    for command in commands {
        pen.apply(command);
    }
    // A trailing travel is already one pass up, there is nothing left to cut
    let owed = if pen.travelling { 0.0 } else { 1.0 };
    pen.vertical(owed - pen.lifted as f64);

    StrokeRun {
        path: pen.path,
        entry,
        end: pen.cursor,
        right_extent: pen.right_extent,
    }
}
