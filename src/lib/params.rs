use structopt::StructOpt;

/// Drilling and routing parameters shared by every generator.
///
/// Lengths are in millimeters, speeds in mm/min. Binaries flatten this into their own options, so each
/// field doubles as a command line flag (`--drill-depth` etc).
#[derive(Clone, Copy, Debug, PartialEq, StructOpt)]
pub struct MachiningParameters {
    /// Safe height above the surface for displacements, in mm
    #[structopt(long, default_value = "10")]
    pub displacement_height: f64,

    /// Total depth to drill, in mm
    #[structopt(long, default_value = "10")]
    pub drill_depth: f64,

    /// Depth of each pass, in mm. 0 drills the full depth in one pass.
    #[structopt(long, default_value = "1")]
    pub pass_depth: f64,

    /// Drill diameter, in mm
    #[structopt(long, default_value = "4")]
    pub drill_diameter: f64,

    /// Feed for displacements above the material, in mm/min
    #[structopt(long, default_value = "1000")]
    pub fast_displacement_speed: f64,

    /// Feed for lateral cuts, in mm/min
    #[structopt(long, default_value = "300")]
    pub drill_displacement_speed: f64,

    /// Feed for plunges, in mm/min
    #[structopt(long, default_value = "500")]
    pub drill_bore_speed: f64,
}

impl Default for MachiningParameters {
    fn default() -> Self {
        MachiningParameters {
            displacement_height: 10.0,
            drill_depth: 10.0,
            pass_depth: 1.0,
            drill_diameter: 4.0,
            fast_displacement_speed: 1000.0,
            drill_displacement_speed: 300.0,
            drill_bore_speed: 500.0,
        }
    }
}

impl MachiningParameters {
    pub fn with_drill_depth(self, drill_depth: f64) -> Self {
        MachiningParameters { drill_depth, ..self }
    }

    pub fn with_pass_depth(self, pass_depth: f64) -> Self {
        MachiningParameters { pass_depth, ..self }
    }

    pub fn with_drill_diameter(self, drill_diameter: f64) -> Self {
        MachiningParameters {
            drill_diameter,
            ..self
        }
    }

    /// Number of passes needed to reach `drill_depth`
    pub fn pass_count(&self) -> usize {
        if self.pass_depth <= 0.0 {
            1
        } else {
            ((self.drill_depth / self.pass_depth).ceil() as usize).max(1)
        }
    }

    /// Depth of each successive pass. All passes are `pass_depth` except the last, which takes what's left.
    pub fn pass_depths(&self) -> Vec<f64> {
        let n = self.pass_count();
        if n == 1 {
            return vec![self.drill_depth];
        }
        let mut depths = vec![self.pass_depth; n - 1];
        depths.push(self.drill_depth - (n - 1) as f64 * self.pass_depth);
        depths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pass_when_pass_depth_is_zero() {
        let p = MachiningParameters::default().with_pass_depth(0.0);
        assert_eq!(p.pass_count(), 1);
        assert_eq!(p.pass_depths(), vec![10.0]);
    }

    #[test]
    fn last_pass_takes_the_remainder() {
        let p = MachiningParameters::default()
            .with_drill_depth(7.0)
            .with_pass_depth(2.0);
        assert_eq!(p.pass_count(), 4);
        assert_eq!(p.pass_depths(), vec![2.0, 2.0, 2.0, 1.0]);
    }

    #[test]
    fn exact_multiple_has_full_last_pass() {
        let p = MachiningParameters::default()
            .with_drill_depth(6.0)
            .with_pass_depth(2.0);
        assert_eq!(p.pass_depths(), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn zero_depth_is_one_empty_pass() {
        let p = MachiningParameters::default().with_drill_depth(0.0);
        assert_eq!(p.pass_depths(), vec![0.0]);
    }

    #[test]
    fn defaults_parse_from_empty_command_line() {
        let p = MachiningParameters::from_iter(vec!["test"]);
        assert_eq!(p, MachiningParameters::default());
    }
}
