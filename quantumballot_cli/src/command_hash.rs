pub fn command_hash(matches: &clap::ArgMatches) {
    let raw_id = match matches.value_of("RAW-ID") {
        Some(raw_id) => raw_id,
        None => {
            eprintln!("quantumballot hash: raw id required");
            std::process::exit(1);
        }
    };

    println!("{}", quantumballot::hash_identity(raw_id));
}
