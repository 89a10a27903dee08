use crate::config::{Config, ISSUER_STREAM, SAMPLER_STREAM, SIMULATION_STREAM};
use log::{error, info, warn};
use quantumballot::*;
use serde::Deserialize;
use std::convert::TryFrom;

/// One entry of the input file
#[derive(Deserialize)]
struct VoteInput {
    voter: String,
    approvals: Vec<ApprovalFlag>,
}

/// Turn input entries into approval sets. A malformed entry drops that voter's ballot only.
fn approval_sets(inputs: Vec<VoteInput>) -> Vec<(String, ApprovalSet)> {
    let mut ballots = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        match ApprovalSet::try_from(input.approvals) {
            Ok(approvals) => ballots.push((input.voter, approvals)),
            Err(e) => error!(
                "quantumballot run: skipping entry {} ({}): {}",
                index, input.voter, e
            ),
        }
    }
    ballots
}

pub fn command_run(matches: &clap::ArgMatches, config: &Config) {
    let filename = match matches.value_of("INPUT") {
        Some(filename) => filename,
        None => {
            eprintln!("quantumballot run: input filename required");
            std::process::exit(1);
        }
    };

    let file_bytes = std::fs::read(filename).unwrap_or_else(|e| {
        eprintln!("quantumballot run: unable to read {}: {}", filename, e);
        std::process::exit(1);
    });

    let inputs: Vec<VoteInput> = serde_json::from_slice(&file_bytes).unwrap_or_else(|e| {
        eprintln!("quantumballot run: unable to read {}: {}", filename, e);
        std::process::exit(1);
    });

    let ballots = approval_sets(inputs);

    let scrutineer = Scrutineer::new(SecretToken::generate(&mut config.rng(SIMULATION_STREAM)));
    let issuer = IdentityIssuer::with_rng(config.rng(ISSUER_STREAM));
    let mut tallyman = Tallyman::with_issuer(issuer, config.on_duplicate);
    let mut sampler = RandomSampler::new(config.rng(SAMPLER_STREAM));

    let report = run_election(&ballots, &mut tallyman, &scrutineer, &mut sampler);

    for rejected in report.rejected.iter() {
        warn!(
            "quantumballot run: ballot from {} refused: {}",
            rejected.voter, rejected.reason
        );
    }
    for unsampled in report.tally.unsampled.iter() {
        warn!(
            "quantumballot run: ballot {} not counted: {}",
            unsampled.key, unsampled.reason
        );
    }

    if let Some(store_out) = matches.value_of("store-out") {
        let snapshot = StoreSnapshot::capture(tallyman.store(), Some(&report.tally.outcomes));
        let bytes = if matches.is_present("cbor") {
            snapshot.to_cbor()
        } else {
            snapshot.to_json().map(String::into_bytes)
        };
        let written = bytes.map_err(|e| e.to_string()).and_then(|bytes| {
            std::fs::write(store_out, bytes).map_err(|e| e.to_string())
        });
        if let Err(e) = written {
            eprintln!("quantumballot run: unable to write {}: {}", store_out, e);
            std::process::exit(1);
        }
        info!("quantumballot run: wrote store snapshot to {}", store_out);
    }

    match serde_json::to_string_pretty(&report.tally.result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("quantumballot run: unable to serialize result: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_entries_are_skipped() {
        let inputs: Vec<VoteInput> = serde_json::from_str(
            r#"[
                {"voter": "a", "approvals": [1, 0, 0, 0]},
                {"voter": "b", "approvals": [1, 0, "yes", 0]},
                {"voter": "c", "approvals": [0, 256, 0, -1]},
                {"voter": "d", "approvals": [false, true, true, false]},
                {"voter": "e", "approvals": [0.5, 0, 0, 0]},
                {"voter": "f", "approvals": [1, 0, 0]}
            ]"#,
        )
        .unwrap();

        let ballots = approval_sets(inputs);
        let voters: Vec<&str> = ballots.iter().map(|(voter, _)| voter.as_str()).collect();
        assert_eq!(voters, vec!["a", "d"]);
        assert_eq!(ballots[1].1.as_slice(), &[false, true, true, false]);
    }
}
