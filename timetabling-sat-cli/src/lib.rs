pub mod app;
pub mod output;

use clap::{value_t_or_exit, ArgMatches};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::error::Error;
use std::fs;
use std::path::Path;

use timetabling_sat_lib::{
    verify, BuildOutcome, EmbeddedRoomTimetabler, ExternalSolver, IsolatedRoomTimetabler,
    ModelInput, SolverConfig, SolverKind, Timetabler,
};

/// Exit codes of the tool, following the DIMACS solver convention.
pub const EXIT_SCHEDULED: i32 = 10;
pub const EXIT_VERIFICATION_FAILED: i32 = 15;
pub const EXIT_UNSATISFIABLE: i32 = 20;

/// Runs the tool and returns its exit code. Hard failures (bad input,
/// solver errors) are returned as errors and map to a non-zero exit
/// outside the 10/15/20 contract.
pub fn run(matches: &ArgMatches) -> Result<i32, Box<dyn Error>> {
    let strategy = matches.value_of("strategy").expect("strategy has a default");
    let solver_kind: SolverKind = matches
        .value_of("solver")
        .expect("solver has a default")
        .parse()?;
    let similarity = value_t_or_exit!(matches, "similarity", f32);
    let file = matches.value_of("file").expect("file is required");

    if strategy == "hybrid" && !(similarity > 0.0 && similarity < 1.0) {
        return Err(format!(
            "room-similarity must be greater than 0 and smaller than 1: {}",
            similarity
        )
        .into());
    }

    let config = match matches.value_of("config") {
        Some(path) => SolverConfig::from_file(Path::new(path))?,
        None => SolverConfig::from_executable_dir()?,
    };

    let input = ModelInput::from_json_file(Path::new(file))?;
    info!(
        "read {} entries over {} subject-professors and {} groups",
        input.entries.len(),
        input.subject_professors.len(),
        input.groups.len()
    );

    let solver = ExternalSolver::new(solver_kind, &config);
    let timetabler: Box<dyn Timetabler> = match strategy {
        "pure" => Box::new(EmbeddedRoomTimetabler::new(solver)),
        "postponed" => Box::new(IsolatedRoomTimetabler::new(solver, false, 0.0)),
        "hybrid" => Box::new(IsolatedRoomTimetabler::new(solver, true, similarity)),
        _ => unreachable!("clap validated the strategy"),
    };

    let spinner = if matches.is_present("progress") {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    spinner.set_style(
        ProgressStyle::default_spinner().template("[{elapsed_precise}] {spinner:.cyan/blue} {msg}"),
    );
    spinner.set_message(format!(
        "Encoding and solving with {} ({})...",
        solver_kind.name(),
        strategy
    ));
    spinner.enable_steady_tick(100);

    let report = timetabler.build(&input)?;
    spinner.finish_with_message(format!(
        "Solved an instance of {} variables and {} clauses",
        report.variables, report.clauses
    ));

    let (variables, clauses) = (report.variables, report.clauses);
    let print_dimensions = move || {
        println!("Variables: {}", variables);
        println!("Clauses: {}", clauses);
    };

    match report.outcome {
        BuildOutcome::Unsatisfiable => {
            print_dimensions();
            Ok(EXIT_UNSATISFIABLE)
        }
        BuildOutcome::Unassignable => {
            eprintln!("not all lessons could be assigned a room");
            print_dimensions();
            Ok(EXIT_VERIFICATION_FAILED)
        }
        BuildOutcome::Scheduled(mut timetable) => {
            if !verify(&timetable, &input) {
                if strategy == "pure" {
                    return Err(
                        "verification failed under the pure strategy; the encoding is broken"
                            .into(),
                    );
                }
                eprintln!("the produced timetable failed verification");
                print_dimensions();
                return Ok(EXIT_VERIFICATION_FAILED);
            }

            timetable.sort_by_key(|tuple| (tuple.day, tuple.period));
            let per_class = output::per_class_timetable(&timetable, &input);
            let json = serde_json::to_string(&per_class)?;

            match matches.value_of("out") {
                Some(path) => fs::write(path, json)?,
                None => println!("{}", json),
            }

            print_dimensions();
            Ok(EXIT_SCHEDULED)
        }
    }
}
