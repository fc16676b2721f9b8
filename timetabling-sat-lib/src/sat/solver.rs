use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::str::FromStr;
use std::thread;

use super::{parse_model, Sat, Solution};
use crate::error::{Result, TimetablingError};

/// DIMACS convention followed by every supported solver.
const EXIT_SATISFIABLE: i32 = 10;
const EXIT_UNSATISFIABLE: i32 = 20;

/// A SAT solving backend.
///
/// `Ok(Some(model))` for satisfiable instances, `Ok(None)` for
/// unsatisfiable ones. Everything else is an error.
pub trait SatSolver {
    fn solve(&self, sat: &Sat) -> Result<Option<Solution>>;
}

/// The supported external solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    Kissat,
    Cadical,
    Minisat,
    Cryptominisat,
    GlucoseSimp,
    GlucoseSyrup,
    Slime,
    Ortoolsat,
}

/// How a solver consumes the instance and reports its model.
enum Invocation {
    /// DIMACS on stdin, `v`-lines on stdout.
    Piped(&'static [&'static str]),
    /// Input and output file arguments; the model lands in the output
    /// file behind a `SAT`/`UNSAT` header line.
    FileToFile(&'static [&'static str]),
    /// Input file argument, `v`-lines on stdout.
    FileToStdout,
}

impl SolverKind {
    pub const ALL: [SolverKind; 8] = [
        SolverKind::Kissat,
        SolverKind::Cadical,
        SolverKind::Minisat,
        SolverKind::Cryptominisat,
        SolverKind::GlucoseSimp,
        SolverKind::GlucoseSyrup,
        SolverKind::Slime,
        SolverKind::Ortoolsat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SolverKind::Kissat => "kissat",
            SolverKind::Cadical => "cadical",
            SolverKind::Minisat => "minisat",
            SolverKind::Cryptominisat => "cryptominisat",
            SolverKind::GlucoseSimp => "glucosesimp",
            SolverKind::GlucoseSyrup => "glucosesyrup",
            SolverKind::Slime => "slime",
            SolverKind::Ortoolsat => "ortoolsat",
        }
    }

    fn invocation(self) -> Invocation {
        match self {
            SolverKind::Kissat => Invocation::Piped(&["-q", "--relaxed"]),
            SolverKind::Cadical => Invocation::Piped(&["-q"]),
            SolverKind::Cryptominisat => Invocation::Piped(&["--verb", "0"]),
            SolverKind::Minisat => Invocation::FileToFile(&["-verb=0"]),
            SolverKind::GlucoseSimp => Invocation::FileToFile(&["-verb=0"]),
            SolverKind::GlucoseSyrup => Invocation::FileToFile(&["-verb=0"]),
            SolverKind::Slime => Invocation::FileToStdout,
            SolverKind::Ortoolsat => Invocation::FileToStdout,
        }
    }
}

impl FromStr for SolverKind {
    type Err = TimetablingError;

    fn from_str(name: &str) -> Result<Self> {
        SolverKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| {
                TimetablingError::Config(format!("\"{}\" is not a known solver", name))
            })
    }
}

/// Maps solver names to executable paths.
///
/// Loaded once per process from a `config.json` sibling of the
/// executable; a missing file or a missing entry falls back to the bare
/// command name resolved through `PATH`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolverConfig(HashMap<String, String>);

impl SolverConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            TimetablingError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        serde_json::from_str(&text).map_err(|err| {
            TimetablingError::Config(format!("cannot parse {}: {}", path.display(), err))
        })
    }

    /// Loads `config.json` from the running executable's directory, or
    /// an empty configuration when the file does not exist.
    pub fn from_executable_dir() -> Result<Self> {
        let executable = env::current_exe().map_err(|err| {
            TimetablingError::Config(format!("cannot determine executable path: {}", err))
        })?;
        let path = executable
            .parent()
            .map(|dir| dir.join("config.json"))
            .ok_or_else(|| {
                TimetablingError::Config("executable has no parent directory".to_string())
            })?;

        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn executable_for(&self, kind: SolverKind) -> String {
        self.0
            .get(kind.name())
            .cloned()
            .unwrap_or_else(|| kind.name().to_string())
    }
}

/// A SAT solver run as a subprocess.
pub struct ExternalSolver {
    kind: SolverKind,
    path: String,
}

impl ExternalSolver {
    pub fn new(kind: SolverKind, config: &SolverConfig) -> Self {
        ExternalSolver {
            kind,
            path: config.executable_for(kind),
        }
    }

    fn error(&self, message: String) -> TimetablingError {
        TimetablingError::Solver {
            name: self.kind.name().to_string(),
            message,
        }
    }

    /// Classifies the subprocess exit: 10 is satisfiable, 20 is
    /// unsatisfiable, everything else is a solver failure.
    fn classify(&self, output: &Output) -> Result<bool> {
        match output.status.code() {
            Some(EXIT_SATISFIABLE) => Ok(true),
            Some(EXIT_UNSATISFIABLE) => Ok(false),
            code => Err(self.error(format!(
                "unexpected exit status {:?}: {}",
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }

    fn solve_piped(&self, dimacs: String, args: &[&str]) -> Result<Option<Solution>> {
        let mut child = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.error(format!("cannot start {}: {}", self.path, err)))?;

        // Feed stdin from its own thread so a solver filling its stdout
        // pipe cannot deadlock against us.
        let mut stdin = child.stdin.take().expect("stdin is piped");
        let writer = thread::spawn(move || stdin.write_all(dimacs.as_bytes()));

        let output = child
            .wait_with_output()
            .map_err(|err| self.error(format!("cannot wait for {}: {}", self.path, err)))?;
        let written = writer.join().expect("stdin writer does not panic");

        let satisfiable = self.classify(&output)?;
        // A write failure only matters if the solver did not reach a
        // verdict; solvers may close stdin early once the instance read.
        if let Err(err) = written {
            debug!("solver {} closed stdin early: {}", self.kind.name(), err);
        }
        if !satisfiable {
            return Ok(None);
        }
        parse_model(&String::from_utf8_lossy(&output.stdout)).map(Some)
    }

    fn solve_file_to_file(&self, dimacs: &str, args: &[&str]) -> Result<Option<Solution>> {
        let workdir = tempfile::tempdir()
            .map_err(|err| self.error(format!("cannot create temporary directory: {}", err)))?;
        let input_path = workdir.path().join("instance.cnf");
        let model_path = workdir.path().join("model.out");
        fs::write(&input_path, dimacs)
            .map_err(|err| self.error(format!("cannot write DIMACS file: {}", err)))?;

        let output = Command::new(&self.path)
            .args(args)
            .arg(&input_path)
            .arg(&model_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| self.error(format!("cannot start {}: {}", self.path, err)))?;

        if !self.classify(&output)? {
            return Ok(None);
        }
        let model = fs::read_to_string(&model_path)
            .map_err(|err| self.error(format!("cannot read model file: {}", err)))?;
        parse_model(&model).map(Some)
    }

    fn solve_file_to_stdout(&self, dimacs: &str) -> Result<Option<Solution>> {
        let workdir = tempfile::tempdir()
            .map_err(|err| self.error(format!("cannot create temporary directory: {}", err)))?;
        let input_path = workdir.path().join("instance.cnf");
        fs::write(&input_path, dimacs)
            .map_err(|err| self.error(format!("cannot write DIMACS file: {}", err)))?;

        let output = Command::new(&self.path)
            .arg(&input_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| self.error(format!("cannot start {}: {}", self.path, err)))?;

        if !self.classify(&output)? {
            return Ok(None);
        }
        parse_model(&String::from_utf8_lossy(&output.stdout)).map(Some)
    }
}

impl SatSolver for ExternalSolver {
    fn solve(&self, sat: &Sat) -> Result<Option<Solution>> {
        let dimacs = sat.to_dimacs();
        debug!(
            "running {} on {} variables, {} clauses",
            self.kind.name(),
            sat.variables,
            sat.clauses.len()
        );

        match self.kind.invocation() {
            Invocation::Piped(args) => self.solve_piped(dimacs, args),
            Invocation::FileToFile(args) => self.solve_file_to_file(&dimacs, args),
            Invocation::FileToStdout => self.solve_file_to_stdout(&dimacs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_names_round_trip() {
        for kind in SolverKind::ALL {
            assert_eq!(kind.name().parse::<SolverKind>().unwrap(), kind);
        }
        assert!("brainsat".parse::<SolverKind>().is_err());
    }

    #[test]
    fn test_config_falls_back_to_command_name() {
        let config = SolverConfig::default();
        assert_eq!(config.executable_for(SolverKind::Kissat), "kissat");
    }

    #[test]
    fn test_config_parses_path_overrides() {
        let config: SolverConfig =
            serde_json::from_str(r#"{"kissat": "/opt/sat/bin/kissat"}"#).unwrap();
        assert_eq!(
            config.executable_for(SolverKind::Kissat),
            "/opt/sat/bin/kissat"
        );
        assert_eq!(config.executable_for(SolverKind::Cadical), "cadical");
    }
}
