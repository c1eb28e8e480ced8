//! Writers that turn trajectories into an ABB RAPID program module.
//!
//! The entry points are [`emit_rapid_file`], for a path made of typed segments
//! with process I/O, and [`emit_joint_trajectory_file`], for a flat list of
//! points. Both write straight into any [`std::io::Write`] sink and stop at the
//! first failed write.
//!
//! # Program layout
//!
//! ```text
//! MODULE mRobotPath
//! PERS tooldata tProcess := [...];          tool and speed declarations
//! VAR speeddata vProcessSpeed := [...];
//! CONST jointtarget jTarg0 := [...];        one target per point, ids from 0
//! PROC main()
//! MoveAbsJ jTarg0, vApproachSpeed, z20, tProcess;
//! WaitRob \ZeroSpeed;
//! SetDO doProcess, 1;
//! MoveL CalcRobT(jTarg1, tProcess), vProcessSpeed, z1, tProcess;
//! ...
//! ENDPROC
//! ENDMODULE
//! ```

use crate::error::Result;
use crate::params::{ProcessParams, SpeedSource};
use crate::trajectory::{SegmentType, TrajectoryPt, TrajectorySegment};
use glam::{Quat, Vec3};
use std::io::Write;
use std::ops::Range;
use tracing::{debug, warn};

const MODULE_NAME: &str = "mRobotPath";
const TOOL_NAME: &str = "tProcess";
const GRIND_DATA_NAME: &str = "gProcess";

const PROCESS_SPEED_NAME: &str = "vProcessSpeed";
const APPROACH_SPEED_NAME: &str = "vApproachSpeed";
const TRAVERSE_SPEED_NAME: &str = "vTraverseSpeed";

/// Reorientation (deg/s), linear external axis (mm/s) and rotary external axis
/// (deg/s) speeds shared by every speed data record.
const ORIENTATION_SPEED: u32 = 500;
const LINEAR_AXIS_SPEED: u32 = 5000;
const ROTARY_AXIS_SPEED: u32 = 1000;

/// Tight corner zone for working moves, looser fly-by zone for transit.
const PROCESS_ZONE: &str = "z1";
const FREE_ZONE: &str = "z20";

const ROBOT_AXES: usize = 6;
const EXTERNAL_AXES: usize = 6;
/// RAPID's marker for an axis the controller does not drive.
const UNUSED_AXIS: &str = "9E9";

const JOINT_DECIMALS: usize = 4;
const DURATION_DECIMALS: usize = 3;

/// Where the segment walk stands relative to the working portion of the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunState {
    /// No process motion written yet; the next one carries the start code.
    BeforeFirstProcess,
    /// Output is on and process motions are being written.
    InProcessRun,
    /// At least one run has been closed and the output is off.
    AfterProcessRun,
}

/// Writes a complete program for an approach, a sequence of typed segments and a
/// departure.
///
/// Joint targets are numbered across approach, segments and departure in that
/// order. The output signal is switched on before each maximal run of process
/// segments and off right after it. The start code goes on the very first
/// process motion of the program and the end code on the very last one.
///
/// Segments without points write nothing and do not split a process run.
#[tracing::instrument(skip_all, fields(
    approach = approach.len(),
    segments = segments.len(),
    departure = departure.len()
))]
pub fn emit_rapid_file<W: Write>(
    sink: &mut W,
    approach: &[TrajectoryPt],
    departure: &[TrajectoryPt],
    segments: &[TrajectorySegment],
    params: &ProcessParams,
) -> Result<()> {
    emit_module_header(sink)?;
    emit_process_declarations(sink, params)?;

    let all_points = approach
        .iter()
        .chain(segments.iter().flat_map(|s| s.points.iter()))
        .chain(departure);
    for (n, pt) in all_points.enumerate() {
        emit_joint_position(sink, pt, n)?;
    }

    emit_main_header(sink)?;

    let mut next_id = 0;
    for pt in approach {
        emit_free_motion(sink, next_id, SpeedSource::Approach, pt.timed_duration(), false)?;
        next_id += 1;
    }

    for (index, segment) in segments.iter().enumerate() {
        if segment.is_process() && segment.is_empty() {
            warn!(segment = index, "process segment has no points");
        }
    }

    // Empty segments are skipped up front so they can neither open nor split a run.
    let active: Vec<(usize, &TrajectorySegment)> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_empty())
        .collect();
    let last_process = active
        .iter()
        .rev()
        .find(|(_, s)| s.is_process())
        .map(|(index, _)| *index);

    let mut run = RunState::BeforeFirstProcess;
    let mut process_runs = 0usize;

    for (position, (index, segment)) in active.iter().enumerate() {
        match segment.kind {
            SegmentType::Process => {
                let opens_program = run == RunState::BeforeFirstProcess;
                if run != RunState::InProcessRun {
                    emit_set_output(sink, params, true)?;
                    process_runs += 1;
                    run = RunState::InProcessRun;
                }

                let closes_program = last_process == Some(*index);
                let last = segment.points.len() - 1;
                for k in 0..segment.points.len() {
                    let start = opens_program && k == 0;
                    let end = closes_program && k == last;
                    emit_grind_motion(sink, params, next_id, start, end)?;
                    next_id += 1;
                }

                let run_continues = active
                    .get(position + 1)
                    .is_some_and(|(_, next)| next.is_process());
                if !run_continues {
                    emit_set_output(sink, params, false)?;
                    run = RunState::AfterProcessRun;
                }
            }
            SegmentType::Approach | SegmentType::Traverse => {
                let speed = match segment.kind {
                    SegmentType::Approach => SpeedSource::Approach,
                    _ => SpeedSource::Traverse,
                };
                for pt in &segment.points {
                    emit_free_motion(sink, next_id, speed, pt.timed_duration(), false)?;
                    next_id += 1;
                }
            }
        }
    }

    let last_departure = departure.len().saturating_sub(1);
    for (k, pt) in departure.iter().enumerate() {
        let stop_at = k == last_departure;
        emit_free_motion(sink, next_id, SpeedSource::Traverse, pt.timed_duration(), stop_at)?;
        next_id += 1;
    }

    emit_module_footer(sink)?;

    debug!(targets = next_id, process_runs, "emitted segmented program");
    Ok(())
}

/// Writes a program that moves through `points` with free motions only.
///
/// Points without a usable duration run at the traverse speed data; timed
/// points add an explicit move time. No I/O is ever written.
#[tracing::instrument(skip_all, fields(points = points.len()))]
pub fn emit_joint_trajectory_file<W: Write>(
    sink: &mut W,
    points: &[TrajectoryPt],
    params: &ProcessParams,
) -> Result<()> {
    emit_module_header(sink)?;
    emit_process_declarations(sink, params)?;

    for (n, pt) in points.iter().enumerate() {
        emit_joint_position(sink, pt, n)?;
    }

    emit_main_header(sink)?;

    let last = points.len().saturating_sub(1);
    for (n, pt) in points.iter().enumerate() {
        emit_free_motion(sink, n, SpeedSource::Traverse, pt.timed_duration(), n == last)?;
    }

    emit_module_footer(sink)?;

    debug!(targets = points.len(), "emitted joint trajectory program");
    Ok(())
}

/// `CONST jointtarget jTarg<n> := [[robax],[extax]];`
///
/// The first six values fill the robot axes, zero-padded. Further values fill
/// the external axes; the rest of those are marked unused.
pub(crate) fn emit_joint_position<W: Write>(sink: &mut W, pt: &TrajectoryPt, n: usize) -> Result<()> {
    let joints = pt.joints();
    if joints.len() > ROBOT_AXES + EXTERNAL_AXES {
        warn!(id = n, values = joints.len(), "dropping joint values past the external axes");
    }

    let robax = axis_list(joints, 0..ROBOT_AXES, "0");
    let extax = axis_list(joints, ROBOT_AXES..ROBOT_AXES + EXTERNAL_AXES, UNUSED_AXIS);
    writeln!(sink, "CONST jointtarget jTarg{n} := [[{robax}],[{extax}]];")?;
    Ok(())
}

/// Linear working move to target `n` at process speed.
///
/// With activation configured the grinding instruction is used and `start` /
/// `end` add the tool enable / disable switches. Without it the markers have
/// no rendering.
pub(crate) fn emit_grind_motion<W: Write>(
    sink: &mut W,
    params: &ProcessParams,
    n: usize,
    start: bool,
    end: bool,
) -> Result<()> {
    let target = format!("CalcRobT(jTarg{n}, {TOOL_NAME})");
    let tail = format!("{PROCESS_SPEED_NAME}, {PROCESS_ZONE}, {TOOL_NAME}");

    if params.activation.is_none() {
        writeln!(sink, "MoveL {target}, {tail};")?;
        return Ok(());
    }

    let switches: Vec<&str> = [(start, "\\Start"), (end, "\\End")]
        .into_iter()
        .filter_map(|(on, switch)| on.then_some(switch))
        .collect();
    let head = if switches.is_empty() {
        "GrindL".to_string()
    } else {
        format!("GrindL {},", switches.join(" "))
    };
    writeln!(sink, "{head} {target}, {tail} \\GData:={GRIND_DATA_NAME};")?;
    Ok(())
}

/// Joint move to target `n` at the speed data for `speed`.
///
/// A `duration` replaces the speed with an explicit move time. `stop_at`
/// requests a full stop instead of flying by.
pub(crate) fn emit_free_motion<W: Write>(
    sink: &mut W,
    n: usize,
    speed: SpeedSource,
    duration: Option<f64>,
    stop_at: bool,
) -> Result<()> {
    let speed_data = match speed {
        SpeedSource::Approach => APPROACH_SPEED_NAME,
        SpeedSource::Traverse => TRAVERSE_SPEED_NAME,
    };
    let timing = duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| format!("\\T:={}", fixed(d, DURATION_DECIMALS)))
        .unwrap_or_default();
    let zone = if stop_at { "fine" } else { FREE_ZONE };
    writeln!(sink, "MoveAbsJ jTarg{n}, {speed_data}{timing}, {zone}, {TOOL_NAME};")?;
    Ok(())
}

/// Sets the process output once the robot has come to rest.
pub(crate) fn emit_set_output<W: Write>(sink: &mut W, params: &ProcessParams, value: bool) -> Result<()> {
    writeln!(sink, "WaitRob \\ZeroSpeed;")?;
    writeln!(sink, "SetDO {}, {};", params.output_name, u8::from(value))?;
    Ok(())
}

/// Tool data, the three speed data records and, for grinding controllers, the
/// grind data record.
pub(crate) fn emit_process_declarations<W: Write>(sink: &mut W, params: &ProcessParams) -> Result<()> {
    let tool = &params.tool;
    writeln!(
        sink,
        "PERS tooldata {TOOL_NAME} := [TRUE,[{},{}],[{},{},[1,0,0,0],0,0,0]];",
        vec3(tool.translation),
        quat(tool.rotation),
        tool.mass,
        vec3(tool.center_of_gravity),
    )?;

    let speeds = [
        (PROCESS_SPEED_NAME, params.process_speed),
        (APPROACH_SPEED_NAME, params.approach_speed),
        (TRAVERSE_SPEED_NAME, params.traverse_speed),
    ];
    for (name, tcp) in speeds {
        writeln!(
            sink,
            "VAR speeddata {name} := [{tcp},{ORIENTATION_SPEED},{LINEAR_AXIS_SPEED},{ROTARY_AXIS_SPEED}];"
        )?;
    }

    if let Some(activation) = &params.activation {
        writeln!(
            sink,
            "TASK PERS grinddata {GRIND_DATA_NAME} := [{},{},{}];",
            activation.spindle_speed, activation.force, activation.slide_force
        )?;
    }
    Ok(())
}

fn emit_module_header<W: Write>(sink: &mut W) -> Result<()> {
    writeln!(sink, "MODULE {MODULE_NAME}")?;
    Ok(())
}

fn emit_main_header<W: Write>(sink: &mut W) -> Result<()> {
    writeln!(sink, "PROC main()")?;
    // Joint targets fix the arm configuration already.
    writeln!(sink, "ConfJ \\Off;")?;
    writeln!(sink, "ConfL \\Off;")?;
    Ok(())
}

fn emit_module_footer<W: Write>(sink: &mut W) -> Result<()> {
    writeln!(sink, "ENDPROC")?;
    writeln!(sink, "ENDMODULE")?;
    Ok(())
}

fn axis_list(joints: &[f64], axes: Range<usize>, fill: &str) -> String {
    axes.map(|i| {
        joints
            .get(i)
            .map_or_else(|| fill.to_string(), |v| fixed(*v, JOINT_DECIMALS))
    })
    .collect::<Vec<_>>()
    .join(",")
}

fn fixed(value: f64, decimals: usize) -> String {
    // No negative zero in the output.
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.decimals$}")
}

fn vec3(v: Vec3) -> String {
    format!("[{},{},{}]", v.x, v.y, v.z)
}

/// RAPID orders quaternions scalar first.
fn quat(q: Quat) -> String {
    format!("[{},{},{},{}]", q.w, q.x, q.y, q.z)
}
