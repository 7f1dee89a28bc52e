//! Hand-measured lowercase alphabet.
//!
//! Letters are 3 drill diameters wide, with a 5 diameter x-height and 8 diameter ascenders and descenders
//! (3 below the baseline). Each letter is a list of named segments; the segments are stroke programs, but
//! the letters' entry and exit points were measured by hand and are kept as they are.

use nalgebra::geometry::Point2;

use super::stroke::PathCommand::{self, Dive, Horizontal, Lift, Line, Move, Vertical};
use super::StrokeProgram;

/// Radius of the round parts of a, b, c...
const R: f64 = 1.5;
const SMALL_R: f64 = 1.0;
/// Angle, in degrees, at which c, e, s and a stop short of a half circle: atan2(0.5, 1.5)
const TAKEBACK: f64 = 18.434948822922010;
/// How far in from the bowl's edge the pen stops: 1.5 * (1 - cos(TAKEBACK))
const TAKEBACK_X: f64 = 0.07697505292422929;
const TAKEBACK_Y: f64 = 0.5;
const LETTER_WIDTH: f64 = 3.0;
const LETTER_HEIGHT: f64 = 5.0;

const fn arc(radius: f64, start: f64, end: f64) -> PathCommand {
    PathCommand::Arc { radius, start, end }
}

/// Lift, rapid up two diameters, come back down: the dot of i and j
const DOT: &[PathCommand] = &[Lift, Lift, Move(0.0, 2.0), Dive, Dive];

const SEGMENTS: &[(&str, &[PathCommand])] = &[
    ("a1", &[arc(R, 180.0 - TAKEBACK, 0.0)]),
    ("a2", &[Vertical(-3.5)]),
    ("a3", &[Move(0.0, 1.5)]),
    ("a4", &[arc(R, 360.0, 180.0)]),
    ("a5", &[arc(SMALL_R, 180.0, 90.0)]),
    ("a6", &[Horizontal(2.0)]),
    ("b1", &[Vertical(8.0)]),
    ("b2", &[Move(0.0, -4.5)]),
    ("b3", &[arc(R, 180.0, 0.0)]),
    ("b4", &[Vertical(-2.0)]),
    ("b5", &[arc(R, 360.0, 180.0)]),
    ("c1", &[arc(R, TAKEBACK, 180.0)]),
    ("c2", &[Vertical(-2.0)]),
    ("c3", &[arc(R, 180.0, 360.0 - TAKEBACK)]),
    ("d1", &[arc(R, 0.0, 180.0)]),
    ("d2", &[Vertical(-2.0)]),
    ("d3", &[arc(R, 180.0, 360.0)]),
    ("d4", &[Move(0.0, -1.5)]),
    ("d5", &[Vertical(8.0)]),
    ("e1", &[Horizontal(2.5)]),
    ("e2", &[Vertical(1.0)]),
    ("e3", &[arc(R, 0.0, 180.0)]),
    ("e4", &[Vertical(-2.0)]),
    ("e5", &[arc(R, 180.0, 360.0 - TAKEBACK)]),
    ("f1", &[Vertical(6.5)]),
    ("f2", &[arc(R, 180.0, 90.0)]),
    ("f3", &[Lift, arc(R, 90.0, 180.0)]),
    ("f4", &[Vertical(-1.5)]),
    ("f5", &[Horizontal(-1.5), Dive]),
    ("f6", &[Horizontal(3.0)]),
    ("g1", &[arc(R, 0.0, 180.0)]),
    ("g2", &[Vertical(-2.0)]),
    ("g3", &[arc(R, 180.0, 360.0)]),
    ("g4", &[Move(0.0, 3.5)]),
    ("g5", &[Vertical(-6.5)]),
    ("g6", &[arc(R, 360.0, 180.0 + TAKEBACK)]),
    ("h1", &[Vertical(-8.0)]),
    ("h2", &[Move(0.0, 3.5)]),
    ("h3", &[arc(R, 180.0, 0.0)]),
    ("h4", &[Vertical(-3.5)]),
    ("i1", &[Vertical(5.0)]),
    ("i2", DOT),
    ("j1", &[arc(R, 270.0, 360.0)]),
    ("j2", &[Vertical(6.5)]),
    ("j3", DOT),
    ("k1", &[Vertical(-8.0)]),
    ("k2", &[Move(0.0, 2.0)]),
    ("k3", &[Line(3.0, 3.0)]),
    ("k4", &[Line(-2.0, -2.0)]),
    ("k5", &[Line(2.0, -3.0)]),
    ("l1", &[Vertical(-6.5)]),
    ("l2", &[arc(R, 180.0, 270.0)]),
    ("m1", &[Vertical(5.0)]),
    ("m2", &[Move(0.0, -1.5)]),
    ("m3", &[arc(R, 180.0, 0.0)]),
    ("m4", &[Vertical(-3.5)]),
    ("m5", &[Move(0.0, 3.5)]),
    ("m6", &[arc(R, 180.0, 0.0)]),
    ("m7", &[Vertical(-3.5)]),
    ("n1", &[Vertical(5.0)]),
    ("n2", &[Move(0.0, -1.5)]),
    ("n3", &[arc(R, 180.0, 0.0)]),
    ("n4", &[Vertical(-3.5)]),
    ("o1", &[Vertical(2.0)]),
    ("o2", &[arc(R, 180.0, 0.0)]),
    ("o3", &[Vertical(-2.0)]),
    ("o4", &[arc(R, 360.0, 180.0)]),
    ("p1", &[Vertical(8.0)]),
    ("p2", &[Move(0.0, -1.5)]),
    ("p3", &[arc(R, 180.0, 0.0)]),
    ("p4", &[Vertical(-2.0)]),
    ("p5", &[arc(R, 360.0, 180.0)]),
    ("q1", &[arc(R, 0.0, 180.0)]),
    ("q2", &[Vertical(-2.0)]),
    ("q3", &[arc(R, 180.0, 360.0)]),
    ("q4", &[Move(0.0, 3.5)]),
    ("q5", &[Vertical(-8.0)]),
    ("r1", &[Vertical(5.0)]),
    ("r2", &[Move(0.0, -1.5)]),
    ("r3", &[arc(R, 180.0, 90.0)]),
    ("r4", &[Horizontal(0.5)]),
    ("s1", &[arc(R, TAKEBACK, 180.0)]),
    ("s2", &[arc(SMALL_R, 180.0, 270.0)]),
    ("s3", &[Horizontal(1.0)]),
    ("s4", &[arc(SMALL_R, 90.0, 0.0)]),
    ("s5", &[arc(R, 360.0, 180.0 + TAKEBACK)]),
    ("t1", &[Horizontal(2.0)]),
    ("t2", &[Lift, Horizontal(-1.0)]),
    ("t3", &[Vertical(3.0), Dive]),
    ("t4", &[Vertical(-6.5)]),
    ("t5", &[arc(R, 180.0, 270.0)]),
    ("u1", &[Vertical(-3.5)]),
    ("u2", &[arc(R, 180.0, 360.0)]),
    ("u3", &[Move(0.0, -1.5)]),
    ("u4", &[Vertical(5.0)]),
    ("v1", &[Line(1.5, -5.0)]),
    ("v2", &[Line(1.5, 5.0)]),
    ("w1", &[Line(1.5, -5.0)]),
    ("w2", &[Line(1.5, 5.0)]),
    ("w3", &[Line(1.5, -5.0)]),
    ("w4", &[Line(1.5, 5.0)]),
    ("x1", &[Line(3.0, 5.0)]),
    ("x2", &[Move(-1.5, -2.5)]),
    ("x3", &[Move(-1.5, 2.5)]),
    ("x4", &[Line(3.0, -5.0)]),
    ("y1", &[Line(1.5, -5.0)]),
    ("y2", &[Move(1.5, 5.0)]),
    ("y3", &[Line(-8.0 / 5.0 * 1.5, -8.0)]),
    ("z1", &[Horizontal(3.0)]),
    ("z2", &[Line(-3.0, -5.0)]),
    ("z3", &[Horizontal(3.0)]),
];

struct Letter {
    character: char,
    segments: &'static [&'static str],
    entry: (f64, f64),
    exit: (f64, f64),
}

const LETTERS: &[Letter] = &[
    Letter {
        character: 'a',
        segments: &["a1", "a2", "a3", "a4", "a5", "a6"],
        entry: (TAKEBACK_X, 3.5 + TAKEBACK_Y),
        exit: (-0.5, 2.5),
    },
    Letter {
        character: 'b',
        segments: &["b1", "b2", "b3", "b4", "b5"],
        entry: (0.0, 0.0),
        exit: (-2.0 * R, R),
    },
    Letter {
        character: 'c',
        segments: &["c1", "c2", "c3"],
        entry: (LETTER_WIDTH - TAKEBACK_X, 3.5 + TAKEBACK_Y),
        exit: (-TAKEBACK_X, R - TAKEBACK_Y),
    },
    Letter {
        character: 'd',
        segments: &["d1", "d2", "d3", "d4", "d5"],
        entry: (LETTER_WIDTH, 3.5),
        exit: (0.0, 8.0),
    },
    Letter {
        character: 'e',
        segments: &["e1", "e2", "e3", "e4", "e5"],
        entry: (0.5, 2.5),
        exit: (-TAKEBACK_X, R - TAKEBACK_Y),
    },
    Letter {
        character: 'f',
        segments: &["f1", "f2", "f3", "f4", "f5", "f6"],
        entry: (0.0, 0.0),
        exit: (0.0, LETTER_HEIGHT),
    },
    Letter {
        character: 'g',
        segments: &["g1", "g2", "g3", "g4", "g5", "g6"],
        entry: (LETTER_WIDTH, 3.5),
        exit: (-2.0 * R + TAKEBACK_X, -1.5 - TAKEBACK_Y),
    },
    Letter {
        character: 'h',
        segments: &["h1", "h2", "h3", "h4"],
        entry: (0.0, 8.0),
        exit: (0.0, 0.0),
    },
    Letter {
        character: 'i',
        segments: &["i1", "i2"],
        entry: (0.0, 0.0),
        exit: (0.0, 7.0),
    },
    Letter {
        character: 'j',
        segments: &["j1", "j2", "j3"],
        entry: (0.0, -3.0),
        exit: (0.0, 7.0),
    },
    Letter {
        character: 'k',
        segments: &["k1", "k2", "k3", "k4", "k5"],
        entry: (0.0, 8.0),
        exit: (0.0, 0.0),
    },
    Letter {
        character: 'l',
        segments: &["l1", "l2"],
        entry: (0.0, 8.0),
        exit: (0.0, 0.0),
    },
    Letter {
        character: 'm',
        segments: &["m1", "m2", "m3", "m4", "m5", "m6", "m7"],
        entry: (0.0, 0.0),
        exit: (0.0, 0.0),
    },
    Letter {
        character: 'n',
        segments: &["n1", "n2", "n3", "n4"],
        entry: (0.0, 0.0),
        exit: (0.0, 0.0),
    },
    Letter {
        character: 'o',
        segments: &["o1", "o2", "o3", "o4"],
        entry: (0.0, 1.5),
        exit: (-LETTER_WIDTH, R),
    },
    Letter {
        character: 'p',
        segments: &["p1", "p2", "p3", "p4", "p5"],
        entry: (0.0, -3.0),
        exit: (-LETTER_WIDTH, R),
    },
    Letter {
        character: 'q',
        segments: &["q1", "q2", "q3", "q4", "q5"],
        entry: (LETTER_WIDTH, 3.5),
        exit: (0.0, -3.0),
    },
    Letter {
        character: 'r',
        segments: &["r1", "r2", "r3", "r4"],
        entry: (0.0, 0.0),
        exit: (0.0, LETTER_HEIGHT),
    },
    Letter {
        character: 's',
        segments: &["s1", "s2", "s3", "s4", "s5"],
        entry: (LETTER_WIDTH - TAKEBACK_X, 3.5 + TAKEBACK_Y),
        exit: (-LETTER_WIDTH + TAKEBACK_X, R - TAKEBACK_Y),
    },
    Letter {
        character: 't',
        segments: &["t1", "t2", "t3", "t4", "t5"],
        entry: (0.0, LETTER_HEIGHT),
        exit: (0.0, 0.0),
    },
    Letter {
        character: 'u',
        segments: &["u1", "u2", "u3", "u4"],
        entry: (0.0, LETTER_HEIGHT),
        exit: (0.0, LETTER_HEIGHT),
    },
    Letter {
        character: 'v',
        segments: &["v1", "v2"],
        entry: (0.0, LETTER_HEIGHT),
        exit: (0.0, LETTER_HEIGHT),
    },
    Letter {
        character: 'w',
        segments: &["w1", "w2", "w3", "w4"],
        entry: (0.0, LETTER_HEIGHT),
        exit: (0.0, LETTER_HEIGHT),
    },
    Letter {
        character: 'x',
        segments: &["x1", "x2", "x3", "x4"],
        entry: (0.0, 0.0),
        exit: (0.0, 0.0),
    },
    Letter {
        character: 'y',
        segments: &["y1", "y2", "y3"],
        entry: (0.0, LETTER_HEIGHT),
        exit: (-8.0 / 5.0 * 1.5, -3.0),
    },
    Letter {
        character: 'z',
        segments: &["z1", "z2", "z3"],
        entry: (0.0, LETTER_HEIGHT),
        exit: (0.0, 0.0),
    },
];

/// Commands of a named segment
pub fn segment(name: &str) -> Option<&'static [PathCommand]> {
    SEGMENTS
        .iter()
        .find(|(segment_name, _)| *segment_name == name)
        .map(|(_, commands)| *commands)
}

/// Every built-in letter with its program
pub fn letters() -> impl Iterator<Item = (char, StrokeProgram)> {
    LETTERS.iter().map(|letter| {
        (
            letter.character,
            StrokeProgram::Segments {
                names: letter.segments.to_vec(),
                entry: Point2::new(letter.entry.0, letter.entry.1),
                exit: Point2::new(letter.exit.0, letter.exit.1),
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_letter_segment_exists() {
        for letter in LETTERS {
            for name in letter.segments {
                assert!(segment(name).is_some(), "{} needs {}", letter.character, name);
            }
        }
    }

    #[test]
    fn whole_lowercase_alphabet() {
        let chars: String = LETTERS.iter().map(|l| l.character).collect();
        assert_eq!(chars, "abcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn takeback_constants_agree() {
        let angle = TAKEBACK_Y.atan2(R);
        assert!((angle.to_degrees() - TAKEBACK).abs() < 1e-12);
        assert!((R * (1.0 - angle.cos()) - TAKEBACK_X).abs() < 1e-12);
    }
}
