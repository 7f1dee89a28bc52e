//! Single-stroke fonts drilled one pass depth deep, and the composer that chains glyphs into lines of text.
//!
//! Glyph coordinates are in drill diameters: a letter drawn with a 2mm drill is twice as large as one drawn
//! with a 1mm drill.

pub mod builtin;
pub mod stroke;

use std::collections::HashMap;
use std::fs::read_to_string;
use std::io::{Result, Write};
use std::path::PathBuf;

use anyhow::Context;
use nalgebra::geometry::Point2;
use structopt::StructOpt;
use tracing::{debug, warn};

use crate::shapes::Path;
use crate::{g0, gcode_comment, move_back_to_origin, select_tool, xyf, zf, Error, MachiningParameters};
use stroke::{execute, parse_stroke_program, PathCommand};

/// Text layout, in drill diameters
#[derive(Clone, Copy, Debug, PartialEq, StructOpt)]
pub struct TextStyle {
    /// Gap between the right edge of a glyph and the left edge of the next one
    #[structopt(long, default_value = "2")]
    pub letter_spacing: f64,
    /// Advance of a space character
    #[structopt(long, default_value = "4")]
    pub space_spacing: f64,
    /// Distance between the baselines of consecutive lines
    #[structopt(long, default_value = "15")]
    pub line_pitch: f64,
    /// Facets used for half a circle in glyph arcs
    #[structopt(long, default_value = "8")]
    pub half_circle_facets: usize,
    /// Lift the drill for moves inside a glyph instead of dragging it through the material
    #[structopt(long)]
    pub lift_for_drill_back: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            letter_spacing: 2.0,
            space_spacing: 4.0,
            line_pitch: 15.0,
            half_circle_facets: 8,
            lift_for_drill_back: false,
        }
    }
}

/// How a glyph is drawn
#[derive(Clone, Debug, PartialEq)]
pub enum StrokeProgram {
    /// Built-in segments, with hand-measured entry and exit points
    Segments {
        names: Vec<&'static str>,
        entry: Point2<f64>,
        exit: Point2<f64>,
    },
    /// A parsed stroke program; entry and exit come from running it
    Commands(Vec<PathCommand>),
}

/// A glyph ready to be drilled. `path` starts and ends at the surface, `entry` and `exit` are in drill
/// diameters and glyph-local.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub path: Path,
    pub entry: Point2<f64>,
    pub exit: Point2<f64>,
}

impl Glyph {
    /// Stands in for characters the font doesn't have: nothing is cut and the cursor doesn't advance
    pub fn empty() -> Self {
        Glyph {
            path: Path::new(),
            entry: Point2::origin(),
            exit: Point2::origin(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Font {
    glyphs: HashMap<char, StrokeProgram>,
}

impl Font {
    /// The hand-measured lowercase alphabet
    pub fn builtin() -> Self {
        Font {
            glyphs: builtin::letters().collect(),
        }
    }

    /// Parse a font table: one `char : program` declaration per line.
    ///
    /// `: : program` declares the colon itself, and `\c : program` declares `c` whatever it is. Blank lines
    /// and lines starting with `#` are skipped.
    pub fn parse(table: &str) -> std::result::Result<Self, Error> {
        let mut glyphs = HashMap::new();
        for (index, line) in table.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (character, program) = split_declaration(line).map_err(|message| Error::Parse {
                line: line_number,
                message,
            })?;
            let commands = parse_stroke_program(program).map_err(|e| Error::Parse {
                line: line_number,
                message: e.to_string(),
            })?;
            glyphs.insert(character, StrokeProgram::Commands(commands));
        }
        debug!(glyphs = glyphs.len(), "parsed font table");
        Ok(Font { glyphs })
    }

    pub fn from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let table = read_to_string(path)
            .with_context(|| format!("Couldn't read font file {}", path.display()))?;
        Font::parse(&table).with_context(|| format!("Bad font file {}", path.display()))
    }

    /// Add `other`'s glyphs, replacing ours where both have one
    pub fn extend(&mut self, other: Font) {
        self.glyphs.extend(other.glyphs);
    }

    pub fn program(&self, c: char) -> Option<&StrokeProgram> {
        self.glyphs.get(&c)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Run the glyph's program at the given drill size
    pub fn glyph(&self, c: char, params: &MachiningParameters, style: &TextStyle) -> Option<Glyph> {
        let glyph = match self.program(c)? {
            StrokeProgram::Segments { names, entry, exit } => {
                let commands: Vec<PathCommand> = names
                    .iter()
                    .filter_map(|name| builtin::segment(name))
                    .flatten()
                    .copied()
                    .collect();
                Glyph {
                    path: execute(&commands, params, style).path,
                    entry: *entry,
                    exit: *exit,
                }
            }
            StrokeProgram::Commands(commands) => {
                let run = execute(commands, params, style);
                Glyph {
                    entry: run.entry,
                    exit: run.exit(),
                    path: run.path,
                }
            }
        };
        Some(glyph)
    }
}

fn split_declaration(line: &str) -> std::result::Result<(char, &str), String> {
    if let Some(program) = line.strip_prefix(": :") {
        return Ok((':', program));
    }
    if let Some(escaped) = line.strip_prefix('\\') {
        let mut chars = escaped.chars();
        let character = chars
            .next()
            .ok_or_else(|| "nothing after '\\'".to_string())?;
        let program = chars
            .as_str()
            .trim_start()
            .strip_prefix(':')
            .ok_or_else(|| format!("missing ':' after '\\{character}'"))?;
        return Ok((character, program));
    }
    let (key, program) = line
        .split_once(':')
        .ok_or_else(|| "missing ':' separator".to_string())?;
    let mut chars = key.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(character), None) => Ok((character, program)),
        _ => Err(format!("'{}' is not a single character", key.trim())),
    }
}

/// Drill one line of text, the first glyph's origin at the current position. The tool must be at displacement
/// height, and goes back there between glyphs.
pub fn render_line(
    file: &mut dyn Write,
    text: &str,
    font: &Font,
    params: &MachiningParameters,
    style: &TextStyle,
) -> Result<()> {
    let d = params.drill_diameter;
    select_tool(file, d)?;
    let mut cursor = Point2::new(style.letter_spacing, 0.0);
    for c in text.chars() {
        if c == ' ' {
            cursor.x -= style.space_spacing - style.letter_spacing;
            continue;
        }
        let glyph = font.glyph(c, params, style).unwrap_or_else(|| {
            warn!(character = %c, "no glyph, skipping");
            Glyph::empty()
        });

        gcode_comment(file, &format!("glyph '{c}'"))?;
        g0(
            file,
            xyf(
                d * (glyph.entry.x - cursor.x + style.letter_spacing),
                d * (glyph.entry.y - cursor.y),
                params.fast_displacement_speed,
            ),
        )?;
        if !glyph.path.is_empty() {
            g0(
                file,
                zf(-params.displacement_height, params.fast_displacement_speed),
            )?;
            glyph.path.write(file)?;
            g0(
                file,
                zf(params.displacement_height, params.fast_displacement_speed),
            )?;
        }
        cursor = glyph.exit;
    }
    Ok(())
}

/// Drill several lines of text from the origin, each `line_pitch` above the previous one, and go back to the
/// origin at the end.
pub fn render_block(
    file: &mut dyn Write,
    lines: &[&str],
    font: &Font,
    params: &MachiningParameters,
    style: &TextStyle,
) -> Result<()> {
    for (n, line) in lines.iter().enumerate() {
        if n > 0 {
            move_back_to_origin(file, true, true, false)?;
            g0(
                file,
                xyf(
                    0.0,
                    n as f64 * style.line_pitch * params.drill_diameter,
                    params.fast_displacement_speed,
                ),
            )?;
        }
        gcode_comment(file, line)?;
        render_line(file, line, font, params, style)?;
    }
    move_back_to_origin(file, true, true, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn rendered(text: &str, font: &Font) -> String {
        let mut out = Vec::new();
        render_line(
            &mut out,
            text,
            font,
            &MachiningParameters::default(),
            &TextStyle::default(),
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    /// Sum of the X words of every rapid, i.e. how far the composer travelled between glyphs
    fn rapid_x(gcode: &str) -> f64 {
        gcode
            .lines()
            .filter(|l| l.starts_with("G0"))
            .filter_map(|l| {
                l.split_whitespace()
                    .find_map(|w| w.strip_prefix('X'))
                    .map(|v| v.parse::<f64>().unwrap())
            })
            .sum()
    }

    #[test]
    fn space_adds_its_advance() {
        let font = Font::builtin();
        let ab = rapid_x(&rendered("ab", &font));
        let a_b = rapid_x(&rendered("a b", &font));
        let style = TextStyle::default();
        let d = MachiningParameters::default().drill_diameter;
        assert!((a_b - ab - (style.space_spacing - style.letter_spacing) * d).abs() < EPSILON);
    }

    #[test]
    fn first_glyph_starts_at_its_entry() {
        let font = Font::parse("x: m 0 5 l 1.5 -5 l 1.5 5").unwrap();
        let gcode = rendered("x", &font);
        let lines: Vec<&str> = gcode.lines().collect();
        assert!(lines[0].starts_with("T4 "));
        assert_eq!(lines[1], "(glyph 'x')");
        // Cursor starts at one letter spacing, so only the entry remains
        assert_eq!(lines[2], "G0 Y20. F1000.");
        assert_eq!(lines[3], "G0 Z-10. F1000.");
        assert_eq!(lines.last().unwrap(), &"G0 Z10. F1000.");
    }

    #[test]
    fn glyphs_are_chained_by_their_exit() {
        let font = Font::parse("x: m 0 5 l 1.5 -5 l 1.5 5").unwrap();
        let gcode = rendered("xx", &font);
        // Exit (0, 5), entry (0, 5): the second glyph is just one letter spacing away
        assert!(gcode.contains("(glyph 'x')\nG0 X8. F1000.\n"));
    }

    #[test]
    fn unknown_glyph_cuts_nothing() {
        let font = Font::parse("x: h 1").unwrap();
        let gcode = rendered("?", &font);
        assert!(gcode.contains("(glyph '?')"));
        assert!(!gcode.contains("G1"));
        assert!(!gcode.contains("Z"));
    }

    #[test]
    fn unknown_glyph_only_adds_letter_spacing() {
        let font = Font::parse("x: h 1").unwrap();
        let d = MachiningParameters::default().drill_diameter;
        let extra = rapid_x(&rendered("x?x", &font)) - rapid_x(&rendered("xx", &font));
        assert!((extra - TextStyle::default().letter_spacing * d).abs() < EPSILON);
    }

    #[test]
    fn glyph_net_depth_is_zero() {
        let font = Font::builtin();
        let params = MachiningParameters::default();
        let style = TextStyle::default();
        for c in 'a'..='z' {
            let glyph = font.glyph(c, &params, &style).unwrap();
            assert!(!glyph.path.is_empty());
            assert!(glyph.path.displacement().z.abs() < EPSILON, "{c}");
        }
    }

    #[test]
    fn builtin_letters_keep_measured_points() {
        let font = Font::builtin();
        let glyph = font
            .glyph('b', &MachiningParameters::default(), &TextStyle::default())
            .unwrap();
        assert_eq!(glyph.entry, Point2::new(0.0, 0.0));
        assert_eq!(glyph.exit, Point2::new(-3.0, 1.5));
    }

    #[test]
    fn parses_font_table() {
        let table = "
# squares
0: v 5 h 3 v -5 h -3

: : m 0 1 u u m 0 2 d d
\\\\ : l 2 5
\\# : h 1
";
        let font = Font::parse(table).unwrap();
        assert_eq!(font.len(), 4);
        for c in ['0', ':', '\\', '#'] {
            assert!(matches!(font.program(c), Some(StrokeProgram::Commands(_))), "{c}");
        }
        assert_eq!(
            font.program('\\'),
            Some(&StrokeProgram::Commands(vec![PathCommand::Line(2.0, 5.0)]))
        );
    }

    #[test]
    fn font_table_errors_carry_line_numbers() {
        assert!(matches!(
            Font::parse("a: h 1\nb h 1"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(
            Font::parse("ab: h 1"),
            Err(Error::Parse { line: 1, .. })
        ));
        assert!(matches!(
            Font::parse("\n\na: h 1 z"),
            Err(Error::Parse { line: 3, .. })
        ));
        assert!(matches!(
            Font::parse("# wheel\no: a 1 0 1e12"),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn file_fonts_layer_over_builtin() {
        let mut font = Font::builtin();
        font.extend(Font::parse("a: h 1\n1: v 5").unwrap());
        assert_eq!(font.len(), 27);
        assert_eq!(
            font.program('a'),
            Some(&StrokeProgram::Commands(vec![PathCommand::Horizontal(1.0)]))
        );
    }

    #[test]
    fn style_defaults_parse_from_empty_command_line() {
        assert_eq!(TextStyle::from_iter(vec!["test"]), TextStyle::default());
    }

    #[test]
    fn block_lines_are_stacked() {
        let mut out = Vec::new();
        render_block(
            &mut out,
            &["x", "x", "x"],
            &Font::parse("x: h 1").unwrap(),
            &MachiningParameters::default(),
            &TextStyle::default(),
        )
        .unwrap();
        let gcode = String::from_utf8(out).unwrap();
        assert!(gcode.contains("G0 Y60. F1000.\n"));
        assert!(gcode.contains("G0 Y120. F1000.\n"));
        assert_eq!(gcode.matches("G90").count(), 3);
        assert!(gcode.trim_end().ends_with("(set to relative positioning)"));
    }
}
