//! Helpers shared by the integration tests: program parsing and sink stubs.
#![allow(dead_code)]

use rapid_path::{ActivationParams, ProcessParams, TrajectoryPt};
use std::io::{self, Write};

/// A program line reduced to what the tests check.
#[derive(Clone, Debug, PartialEq)]
pub enum Instr {
    Decl,
    Target(usize),
    Free(usize),
    Process { id: usize, start: bool, end: bool },
    Output { signal: String, on: bool },
}

/// Parses emitted text into instructions, skipping module framing lines.
pub fn parse(program: &str) -> Vec<Instr> {
    program.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Instr> {
    let line = line.trim();
    if line.starts_with("PERS tooldata")
        || line.starts_with("VAR speeddata")
        || line.starts_with("TASK PERS grinddata")
    {
        Some(Instr::Decl)
    } else if line.starts_with("CONST jointtarget") {
        Some(Instr::Target(target_id(line)))
    } else if line.starts_with("MoveAbsJ") {
        Some(Instr::Free(target_id(line)))
    } else if line.starts_with("MoveL") || line.starts_with("GrindL") {
        Some(Instr::Process {
            id: target_id(line),
            start: line.contains("\\Start"),
            end: line.contains("\\End"),
        })
    } else if let Some(rest) = line.strip_prefix("SetDO ") {
        let (signal, value) = rest.trim_end_matches(';').split_once(", ")?;
        Some(Instr::Output {
            signal: signal.to_string(),
            on: value == "1",
        })
    } else {
        None
    }
}

fn target_id(line: &str) -> usize {
    let start = line.find("jTarg").expect("line references a target") + "jTarg".len();
    line[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .expect("numeric target id")
}

pub fn point(seed: f64) -> TrajectoryPt {
    TrajectoryPt::new(vec![seed, seed + 1.0, seed + 2.0, 0.0, 45.0, -90.0], None)
}

pub fn grinding_params(signal: &str) -> ProcessParams {
    ProcessParams::default()
        .with_output(signal)
        .with_activation(ActivationParams {
            spindle_speed: 3000.0,
            force: 25.0,
            slide_force: 5.0,
        })
}

pub fn to_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).expect("program text is UTF-8")
}

/// Sink that accepts `allowed` writes and fails every write after that,
/// counting any write attempted once it has failed.
pub struct FailingSink {
    allowed: usize,
    writes: usize,
    failed: bool,
    pub writes_after_failure: usize,
}

impl FailingSink {
    pub fn new(allowed: usize) -> Self {
        Self {
            allowed,
            writes: 0,
            failed: false,
            writes_after_failure: 0,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.failed {
            self.writes_after_failure += 1;
            return Err(io::Error::other("sink already failed"));
        }
        if self.writes == self.allowed {
            self.failed = true;
            return Err(io::Error::other("sink full"));
        }
        self.writes += 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
