use clap::{App, Arg};
use indoc::indoc;

pub const STRATEGIES: [&str; 3] = ["pure", "postponed", "hybrid"];
pub const SOLVERS: [&str; 8] = [
    "kissat",
    "cadical",
    "minisat",
    "cryptominisat",
    "glucosesimp",
    "glucosesyrup",
    "slime",
    "ortoolsat",
];

pub fn build_cli() -> App<'static, 'static> {
    let strategy = Arg::with_name("strategy")
        .long("strategy")
        .takes_value(true)
        .possible_values(&STRATEGIES)
        .default_value("pure")
        .help("Strategy used to build the timetable")
        .long_help(indoc! {"
            Strategy used to build the timetable.

            - \"pure\": rooms are encoded into the SAT instance, so every
              restriction is guaranteed by the solver and a timetable is
              found whenever one exists.
            - \"postponed\": room assignment is postponed to a matching
              step after solving. Completeness is not guaranteed.
            - \"hybrid\": like \"postponed\", but room-similarity
              restrictions are imposed on the SAT to steer the solver
              away of slots the matching cannot serve. Completeness is
              not guaranteed.
        "});

    let solver = Arg::with_name("solver")
        .long("solver")
        .takes_value(true)
        .possible_values(&SOLVERS)
        .default_value("kissat")
        .help("External SAT solver to run");

    let similarity = Arg::with_name("similarity")
        .long("similarity")
        .takes_value(true)
        .value_name("threshold")
        .default_value("0.5")
        .help("Room-similarity threshold in (0, 1), used by the hybrid strategy");

    let file = Arg::with_name("file")
        .long("file")
        .short("f")
        .takes_value(true)
        .value_name("path")
        .required(true)
        .help("Path to the JSON input file");

    let out = Arg::with_name("out")
        .long("out")
        .short("o")
        .takes_value(true)
        .value_name("path")
        .help("Path where the timetable will be written; standard output when omitted");

    let config = Arg::with_name("config")
        .long("config")
        .takes_value(true)
        .value_name("path")
        .help("Path to the solver configuration file")
        .long_help(indoc! {"
            Path to the solver configuration file.

            The file is a JSON object mapping solver names to executable
            paths. By default a config.json next to the executable is
            used; solvers without an entry are looked up through PATH.
        "});

    let progress = Arg::with_name("progress")
        .short("p")
        .long("show-progress")
        .help("Shows a progress spinner while encoding and solving");

    App::new("timetabling-sat")
        .version("0.1.0")
        .about("Builds university timetables by reduction to SAT")
        .long_about(indoc! {"
            Builds university timetables by reduction to SAT.

            The input curriculum is encoded as a CNF formula, handed to an
            external CDCL solver, and the returned model is decoded into a
            per-class timetable that is verified independently.

            Exit codes: 10 when a verified timetable was produced, 15 when
            the instance is satisfiable but room assignment or verification
            failed (postponed/hybrid only), 20 when it is unsatisfiable.
        "})
        .args(&[strategy, solver, similarity, file, out, config, progress])
}
