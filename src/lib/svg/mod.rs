//! Polygon outlines drawn in a vector editor: one `<path>`, picked by id, made of straight segments only.

use std::fs::read_to_string;
use std::path::PathBuf;

use anyhow::Context;
use nalgebra::geometry::Point2;
use roxmltree::{Document, ParsingOptions};
use tracing::debug;

use crate::geometry::Polygon;
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Command(char),
    Number(f64),
}

/// Split path data into commands and numbers. Numbers may be separated by spaces, commas, or nothing at all
/// when the sign or a second decimal point makes the boundary clear (`1-2`, `.5.5`).
fn tokenize(data: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut chars = data.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() || c == ',' {
            chars.next();
        } else if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            tokens.push(Token::Command(c));
            chars.next();
        } else {
            let mut end = start;
            let mut seen_dot = false;
            let mut seen_exponent = false;
            let mut previous = None;
            while let Some(&(i, c)) = chars.peek() {
                let part_of_number = match c {
                    '0'..='9' => true,
                    '+' | '-' => i == start || matches!(previous, Some('e') | Some('E')),
                    '.' => !seen_dot && !seen_exponent,
                    'e' | 'E' => !seen_exponent && i != start,
                    _ => false,
                };
                if !part_of_number {
                    break;
                }
                seen_dot |= c == '.';
                seen_exponent |= c == 'e' || c == 'E';
                previous = Some(c);
                end = i + c.len_utf8();
                chars.next();
            }
            let text = &data[start..end];
            let value = text
                .parse()
                .map_err(|_| Error::Svg(format!("bad number '{}' in path data", &data[start..])))?;
            tokens.push(Token::Number(value));
        }
    }
    Ok(tokens)
}

fn coordinate(tokens: &[Token], index: &mut usize) -> Result<f64, Error> {
    match tokens.get(*index) {
        Some(Token::Number(v)) => {
            *index += 1;
            Ok(*v)
        }
        _ => Err(Error::Svg("path data ends in the middle of a command".to_string())),
    }
}

/// Points of a path's `d` attribute, in absolute coordinates. Returns whether the path was closed too.
fn path_points(data: &str) -> Result<(Vec<Point2<f64>>, bool), Error> {
    let tokens = tokenize(data)?;
    let mut points: Vec<Point2<f64>> = Vec::new();
    let mut current = Point2::origin();
    let mut subpath_start = Point2::origin();
    let mut closed = false;
    let mut command = None;
    let mut index = 0;

    while index < tokens.len() {
        if let Token::Command(c) = tokens[index] {
            command = Some(c);
            index += 1;
            if c == 'z' || c == 'Z' {
                closed = true;
                current = subpath_start;
                continue;
            }
            if index < tokens.len() && matches!(tokens[index], Token::Command(_)) {
                continue;
            }
        }
        let c = command.ok_or_else(|| Error::Svg("path data must start with a command".to_string()))?;
        let relative = c.is_ascii_lowercase();
        let base = if relative { current } else { Point2::origin() };
        current = match c {
            'm' | 'M' | 'l' | 'L' => {
                let x = coordinate(&tokens, &mut index)?;
                let y = coordinate(&tokens, &mut index)?;
                Point2::new(base.x + x, base.y + y)
            }
            'h' | 'H' => Point2::new(base.x + coordinate(&tokens, &mut index)?, current.y),
            'v' | 'V' => Point2::new(current.x, base.y + coordinate(&tokens, &mut index)?),
            'z' | 'Z' => return Err(Error::Svg("coordinates after a close command".to_string())),
            other => return Err(Error::UnsupportedPathCommand(other.to_string())),
        };
        points.push(current);
        match c {
            'm' | 'M' => {
                subpath_start = current;
                // Pairs following a moveto are linetos
                command = Some(if relative { 'l' } else { 'L' });
            }
            _ => {}
        }
    }
    Ok((points, closed))
}

/// Read the outline of the `<path>` with the given id.
///
/// Only straight segments (`m l h v z`, in both cases) are understood. If `close_shape` is set and the
/// path is closed, the first point is repeated at the end.
pub fn import_polygon(svg: &str, id: &str, close_shape: bool) -> Result<Polygon, Error> {
    let doc = Document::parse_with_options(
        svg,
        ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )?;
    let path = doc
        .descendants()
        .find(|n| n.has_tag_name("path") && n.attribute("id") == Some(id))
        .ok_or_else(|| Error::PathNotFound(id.to_string()))?;
    let data = path
        .attribute("d")
        .ok_or_else(|| Error::Svg(format!("path '{id}' has no 'd' attribute")))?;

    let (mut points, closed) = path_points(data)?;
    if close_shape && closed {
        if let Some(&first) = points.first() {
            points.push(first);
        }
    }
    debug!(id, points = points.len(), closed, "imported polygon");
    Ok(Polygon::new(points))
}

impl Polygon {
    pub fn from_svg_file(path: &PathBuf, id: &str, close_shape: bool) -> anyhow::Result<Self> {
        let svg = read_to_string(path)
            .with_context(|| format!("Couldn't read SVG file {}", path.display()))?;
        import_polygon(&svg, id, close_shape)
            .with_context(|| format!("Couldn't import path '{}' from {}", id, path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SQUARE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm">
  <g id="layer1">
    <path id="frame" d="m 10,20 h 30 v 40 h -30 z" style="fill:none" />
    <path id="zigzag" d="M 0 0 L 10 10 20 0 V -5" />
    <path id="curve" d="M 0,0 C 1,1 2,2 3,3" />
  </g>
</svg>"#;

    #[test]
    fn relative_path_becomes_absolute() {
        let polygon = import_polygon(SQUARE, "frame", false).unwrap();
        assert_eq!(
            polygon.points,
            vec![
                Point2::new(10.0, 20.0),
                Point2::new(40.0, 20.0),
                Point2::new(40.0, 60.0),
                Point2::new(10.0, 60.0),
            ]
        );
    }

    #[test]
    fn closing_repeats_first_point() {
        let polygon = import_polygon(SQUARE, "frame", true).unwrap();
        assert_eq!(polygon.len(), 5);
        assert_eq!(polygon.points[4], Point2::new(10.0, 20.0));

        // An open path stays open
        assert_eq!(import_polygon(SQUARE, "zigzag", true).unwrap().len(), 4);
    }

    #[test]
    fn implicit_repeats_and_absolute_commands() {
        let polygon = import_polygon(SQUARE, "zigzag", false).unwrap();
        assert_eq!(
            polygon.points,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(20.0, 0.0),
                Point2::new(20.0, -5.0),
            ]
        );
    }

    #[test]
    fn compact_numbers() {
        let (points, closed) = path_points("M1-2l.5.5-1e1,0").unwrap();
        assert!(!closed);
        assert_eq!(
            points,
            vec![
                Point2::new(1.0, -2.0),
                Point2::new(1.5, -1.5),
                Point2::new(-8.5, -1.5),
            ]
        );
    }

    #[test]
    fn import_failures() {
        assert_eq!(
            import_polygon(SQUARE, "curve", false),
            Err(Error::UnsupportedPathCommand("C".to_string()))
        );
        assert_eq!(
            import_polygon(SQUARE, "nothing", false),
            Err(Error::PathNotFound("nothing".to_string()))
        );
        assert!(matches!(
            import_polygon("<svg><path", "frame", false),
            Err(Error::Svg(_))
        ));
        assert!(matches!(path_points("10 20"), Err(Error::Svg(_))));
        assert!(matches!(path_points("M 10"), Err(Error::Svg(_))));
    }

    #[test]
    fn reads_svg_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SQUARE.as_bytes()).unwrap();
        let polygon = Polygon::from_svg_file(&file.path().to_path_buf(), "frame", true).unwrap();
        assert_eq!(polygon.len(), 5);

        assert!(Polygon::from_svg_file(&file.path().to_path_buf(), "nothing", true).is_err());
    }
}
