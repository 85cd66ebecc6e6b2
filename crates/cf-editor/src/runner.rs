//! Compile/run collaborator boundary.
//!
//! A request/response seam consumed by UI controls, never by the core
//! pipeline. One request may be in flight per user action; the gate
//! disables duplicate submissions and always re-enables on completion,
//! success or failure.

use cf_core::flowgraph::FlowGraph;
use cf_core::id::Ident;

/// What gets sent to the execution service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub source_code: String,
    pub language_id: String,
    pub filename: String,
}

impl RunRequest {
    pub fn c_program(source_code: &str) -> Self {
        RunRequest {
            source_code: source_code.to_string(),
            language_id: "c".to_string(),
            filename: "main.c".to_string(),
        }
    }
}

/// What comes back. `error` carries compiler or runtime text; failures are
/// advisory, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub success: bool,
    pub output: String,
    pub error: String,
    /// Seconds, when the service reports it.
    pub execution_time: Option<f64>,
}

/// The external compile/run service.
pub trait ExecService {
    /// Transport-level failure is the `Err` side; a program that compiled
    /// but misbehaved is still `Ok` with `success: false`.
    fn execute(&mut self, request: &RunRequest) -> Result<RunOutcome, String>;
}

/// Single-in-flight request gate backing the run button's disabled state.
#[derive(Debug, Default)]
pub struct RunGate {
    in_flight: bool,
}

impl RunGate {
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Try to claim the gate. `false` means a request is already running
    /// and this submission must be dropped.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }
}

/// Run `source` through the service under the gate. Returns `None` when a
/// request was already in flight. The gate re-opens on every path out.
pub fn run_program(
    gate: &mut RunGate,
    service: &mut dyn ExecService,
    source: &str,
) -> Option<Result<RunOutcome, String>> {
    if !gate.begin() {
        log::debug!("run request dropped: one already in flight");
        return None;
    }
    let result = service.execute(&RunRequest::c_program(source));
    if let Err(e) = &result {
        log::warn!("execution service failed: {e}");
    }
    gate.finish();
    Some(result)
}

/// The node ids to highlight as the simulated execution path: Start,
/// every program node in source order, End. A visualization aid, not an
/// interpreter.
#[must_use]
pub fn execution_path(fg: &FlowGraph) -> Vec<Ident> {
    fg.nodes_in_order().iter().map(|&i| fg.node(i).id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Scripted service double.
    struct FakeService {
        calls: usize,
        fail_transport: bool,
    }

    impl ExecService for FakeService {
        fn execute(&mut self, request: &RunRequest) -> Result<RunOutcome, String> {
            self.calls += 1;
            if self.fail_transport {
                return Err("connection refused".to_string());
            }
            Ok(RunOutcome {
                success: true,
                output: format!("ran {}", request.filename),
                error: String::new(),
                execution_time: Some(0.01),
            })
        }
    }

    #[test]
    fn run_executes_and_reopens_the_gate() {
        let mut gate = RunGate::default();
        let mut svc = FakeService {
            calls: 0,
            fail_transport: false,
        };
        let out = run_program(&mut gate, &mut svc, "int main() { return 0; }")
            .unwrap()
            .unwrap();
        assert!(out.success);
        assert_eq!(out.output, "ran main.c");
        assert!(!gate.is_in_flight());
    }

    #[test]
    fn duplicate_submission_is_dropped_while_in_flight() {
        let mut gate = RunGate::default();
        assert!(gate.begin());
        let mut svc = FakeService {
            calls: 0,
            fail_transport: false,
        };
        assert!(run_program(&mut gate, &mut svc, "x").is_none());
        assert_eq!(svc.calls, 0);
        gate.finish();
        assert!(run_program(&mut gate, &mut svc, "x").is_some());
    }

    #[test]
    fn transport_failure_still_reopens_the_gate() {
        let mut gate = RunGate::default();
        let mut svc = FakeService {
            calls: 0,
            fail_transport: true,
        };
        let result = run_program(&mut gate, &mut svc, "x").unwrap();
        assert!(result.is_err());
        assert!(!gate.is_in_flight(), "gate must re-enable after failure");
    }

    #[test]
    fn execution_path_covers_start_to_end_in_order() {
        let fg = FlowGraph::from_lines(
            ["int x = 0;", "printf(\"%d\", x);"].into_iter(),
        );
        let path = execution_path(&fg);
        assert_eq!(path.first(), Some(&Ident::start()));
        assert_eq!(path.last(), Some(&Ident::end()));
        assert_eq!(path.len(), 4);
    }
}
