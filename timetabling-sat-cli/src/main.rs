use std::error::Error;
use std::process;

use timetabling_sat_cli::app::build_cli;
use timetabling_sat_cli::run;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let matches = build_cli().get_matches();
    let exit_code = run(&matches)?;

    process::exit(exit_code);
}
