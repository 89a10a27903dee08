use quantumballot::*;
use std::str::FromStr;

pub fn command_verify(matches: &clap::ArgMatches) {
    let (filename, key) = match (matches.value_of("STORE"), matches.value_of("KEY")) {
        (Some(filename), Some(key)) => (filename, key),
        _ => {
            eprintln!("quantumballot verify: store snapshot and key required");
            std::process::exit(1);
        }
    };

    let key = AnonymizedKey::from_str(key).unwrap_or_else(|e| {
        eprintln!("quantumballot verify: {}", e);
        std::process::exit(1);
    });

    let file_bytes = std::fs::read(filename).unwrap_or_else(|e| {
        eprintln!("quantumballot verify: unable to read {}: {}", filename, e);
        std::process::exit(1);
    });

    let store = StoreSnapshot::from_bytes(&file_bytes)
        .and_then(|snapshot| snapshot.into_store(DuplicatePolicy::Overwrite))
        .unwrap_or_else(|e| {
            eprintln!("quantumballot verify: unable to load {}: {}", filename, e);
            std::process::exit(1);
        });

    if verify(&key, &store) {
        println!("> Ballot {} is present", key);
    } else {
        println!("> Ballot {} not found", key);
        std::process::exit(1);
    }
}
