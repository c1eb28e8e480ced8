//! Joint-space waypoints and the typed segments they are grouped into.

use serde::{Deserialize, Serialize};

/// Joint values for one waypoint, in degrees, ordered from the base axis outwards.
pub type JointValues = Vec<f64>;

/// A single joint-space waypoint handed over by the motion planner.
///
/// Points are immutable once built; the emitter only reads them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPt {
    /// One value per axis, in degrees.
    joints: JointValues,

    /// Time in seconds to reach this point from the previous one.
    /// `None` leaves the timing to the configured speed data.
    #[serde(default)]
    duration: Option<f64>,
}

impl TrajectoryPt {
    pub fn new(joints: impl Into<JointValues>, duration: Option<f64>) -> Self {
        Self {
            joints: joints.into(),
            duration,
        }
    }

    /// Builds a point from joint values in radians, as most planners produce them.
    pub fn from_radians(joints: &[f64], duration: Option<f64>) -> Self {
        Self::new(
            joints.iter().map(|j| j.to_degrees()).collect::<Vec<_>>(),
            duration,
        )
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn joints(&self) -> &[f64] {
        &self.joints
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// The duration, if it is usable as a controller move time.
    ///
    /// Zero, negative and non-finite durations count as unset.
    pub fn timed_duration(&self) -> Option<f64> {
        self.duration.filter(|d| d.is_finite() && *d > 0.0)
    }
}

/// The role a run of points plays in the overall path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentType {
    /// Working motion at process speed. The output signal is held on throughout.
    Process,
    /// Lead-in transit towards the work. Output off.
    Approach,
    /// Transit between working segments. Output off.
    Traverse,
}

/// An ordered run of points sharing one [`SegmentType`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySegment {
    pub kind: SegmentType,
    pub points: Vec<TrajectoryPt>,
}

impl TrajectorySegment {
    pub fn new(kind: SegmentType, points: Vec<TrajectoryPt>) -> Self {
        Self { kind, points }
    }

    pub fn process(points: Vec<TrajectoryPt>) -> Self {
        Self::new(SegmentType::Process, points)
    }

    pub fn approach(points: Vec<TrajectoryPt>) -> Self {
        Self::new(SegmentType::Approach, points)
    }

    pub fn traverse(points: Vec<TrajectoryPt>) -> Self {
        Self::new(SegmentType::Traverse, points)
    }

    pub fn is_process(&self) -> bool {
        self.kind == SegmentType::Process
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radians_are_converted_to_degrees() {
        let pt = TrajectoryPt::from_radians(&[std::f64::consts::PI, 0.0], None);
        assert!((pt.joints()[0] - 180.0).abs() < 1e-9);
        assert_eq!(pt.joints()[1], 0.0);
    }

    #[test]
    fn degenerate_durations_are_unset() {
        let base = TrajectoryPt::new(vec![0.0; 6], None);
        assert_eq!(base.timed_duration(), None);
        assert_eq!(base.clone().with_duration(0.0).timed_duration(), None);
        assert_eq!(base.clone().with_duration(-1.0).timed_duration(), None);
        assert_eq!(base.clone().with_duration(f64::NAN).timed_duration(), None);
        assert_eq!(base.with_duration(0.5).timed_duration(), Some(0.5));
    }
}
