//! Generate programs, read them back, and check where the drill actually went.

use gcode::drilling::build_drawing_element;
use gcode::fonts::{render_block, render_line, Font, TextStyle};
use gcode::raster::{write_svg, Page, StrokeKind, Trace};
use gcode::shapes::rectangle;
use gcode::{go_to_start, move_back_to_origin, MachiningParameters};
use nalgebra::geometry::Point3;
use nalgebra::Vector2;
use std::path::PathBuf;

const EPSILON: f64 = 1e-6;

fn near(a: Point3<f64>, b: Point3<f64>) -> bool {
    (a - b).norm() < EPSILON
}

fn program(f: impl Fn(&mut Vec<u8>) -> std::io::Result<()>) -> String {
    let mut out = Vec::new();
    f(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn rectangle_cutout_lands_where_placed() {
    let params = MachiningParameters::default()
        .with_drill_depth(3.0)
        .with_pass_depth(1.0)
        .with_drill_diameter(2.0);
    let gcode = program(|out| {
        go_to_start(out, 3.0, 4.0, &params, None)?;
        build_drawing_element(
            out,
            &rectangle(10.0, 5.0, params.drill_displacement_speed),
            Vector2::new(2.0, 1.0),
            &params,
            "cutout",
        )?;
        move_back_to_origin(out, true, true, false)
    });
    let trace = Trace::parse(&gcode).unwrap();

    let corners = [
        Point3::new(5.0, 5.0, 0.0),
        Point3::new(15.0, 5.0, 0.0),
        Point3::new(15.0, 10.0, 0.0),
        Point3::new(5.0, 10.0, 0.0),
    ];
    let cuts: Vec<_> = trace
        .strokes
        .iter()
        .filter(|s| s.kind == StrokeKind::Cut)
        .collect();
    // Four edges per pass, three passes
    assert_eq!(cuts.len(), 12);
    for cut in &cuts {
        assert!(cut.to.z < 0.0 && cut.to.z >= -3.0 - EPSILON);
        let flat = Point3::new(cut.to.x, cut.to.y, 0.0);
        assert!(corners.iter().any(|c| near(*c, flat)), "{:?}", cut.to);
    }
    let deepest = trace
        .strokes
        .iter()
        .map(|s| s.to.z)
        .fold(f64::INFINITY, f64::min);
    assert!((deepest + 3.0).abs() < EPSILON);
    assert!(cuts.iter().all(|c| (c.diameter - 2.0).abs() < EPSILON));

    // Back above the start position
    assert!(near(trace.position, Point3::new(3.0, 4.0, 10.0)));

    let svg = program(|out| write_svg(out, &trace, &Page::default()));
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let layers: Vec<&str> = doc
        .descendants()
        .filter(|n| n.has_tag_name("g"))
        .filter_map(|n| n.attribute("id"))
        .collect();
    assert_eq!(
        layers,
        vec!["displacements", "depth_3", "depth_2", "depth_1", "depth_0"]
    );
}

#[test]
fn glyph_strokes_land_where_drawn() {
    let params = MachiningParameters::default().with_drill_diameter(2.0);
    let font = Font::parse("v: m 0 5 l 1.5 -5 l 1.5 5").unwrap();
    let gcode = program(|out| {
        go_to_start(out, 0.0, 0.0, &params, None)?;
        render_line(out, "v", &font, &params, &TextStyle::default())
    });
    let trace = Trace::parse(&gcode).unwrap();

    let cuts: Vec<_> = trace
        .strokes
        .iter()
        .filter(|s| s.kind == StrokeKind::Cut)
        .collect();
    assert_eq!(cuts.len(), 2);
    assert!(near(cuts[0].from, Point3::new(0.0, 10.0, -1.0)));
    assert!(near(cuts[0].to, Point3::new(3.0, 0.0, -1.0)));
    assert!(near(cuts[1].to, Point3::new(6.0, 10.0, -1.0)));
    assert!(near(trace.position, Point3::new(6.0, 10.0, 10.0)));
}

#[test]
fn text_block_stays_one_pass_deep_and_returns_home() {
    let params = MachiningParameters::default()
        .with_drill_diameter(1.0)
        .with_pass_depth(0.5);
    for lift in [false, true] {
        let style = TextStyle {
            lift_for_drill_back: lift,
            ..TextStyle::default()
        };
        let gcode = program(|out| {
            go_to_start(out, 20.0, 30.0, &params, None)?;
            render_block(
                out,
                &["the quick brown fox", "jumps over the lazy dog"],
                &Font::builtin(),
                &params,
                &style,
            )
        });
        let trace = Trace::parse(&gcode).unwrap();

        let deepest = trace
            .strokes
            .iter()
            .map(|s| s.to.z)
            .fold(f64::INFINITY, f64::min);
        assert!((deepest + 0.5).abs() < EPSILON, "lift={lift} deepest={deepest}");
        assert!(near(trace.position, Point3::new(20.0, 30.0, 10.0)));

        // Glyphs reach 3 below the baseline and 8 above it, the second line is 15 higher
        let heights: Vec<f64> = trace
            .strokes
            .iter()
            .filter(|s| s.kind == StrokeKind::Cut)
            .map(|s| s.to.y - 30.0)
            .collect();
        assert!(heights.iter().any(|y| *y < 0.0));
        assert!(heights.iter().any(|y| *y > 15.0 + 5.0));
        assert!(heights.iter().all(|y| *y > -3.5 && *y < 15.0 + 8.5), "lift={lift}");
    }
}

#[test]
fn parenthesis_glyphs_keep_comments_well_formed() {
    let params = MachiningParameters::default().with_drill_diameter(1.0);
    let mut font = Font::builtin();
    let table = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fonts/squared.txt");
    font.extend(Font::from_file(&table).unwrap());
    let gcode = program(|out| {
        go_to_start(out, 0.0, 0.0, &params, None)?;
        render_block(out, &["(1)"], &font, &params, &TextStyle::default())
    });

    for line in gcode.lines().filter(|l| l.contains('(') || l.contains(')')) {
        assert_eq!(line.matches('(').count(), 1, "{line}");
        assert_eq!(line.matches(')').count(), 1, "{line}");
        assert!(line.ends_with(')'), "{line}");
        assert!(line.find('(') < line.find(')'), "{line}");
    }
    assert!(gcode.contains("(glyph '[')"));
    assert!(gcode.contains("(glyph ']')"));
    assert!(gcode.contains("([1])"));
    assert!(Trace::parse(&gcode).is_ok());
}
