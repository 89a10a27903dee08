use crate::config::{Config, ISSUER_STREAM, SAMPLER_STREAM, SIMULATION_STREAM};
use quantumballot::*;
use rand::Rng;

const DEFAULT_VOTERS: [&str; 5] = ["Alice", "Bob", "Charlie", "David", "Eve"];

pub fn command_simulate(matches: &clap::ArgMatches, config: &Config) {
    let voters: Vec<String> = match matches.values_of("voters") {
        Some(names) => names
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect(),
        None => DEFAULT_VOTERS.iter().map(|name| name.to_string()).collect(),
    };

    // Each voter approves a random subset of the candidates
    let mut rng = config.rng(SIMULATION_STREAM);
    let ballots: Vec<(String, ApprovalSet)> = voters
        .into_iter()
        .map(|name| {
            let mut approvals = [false; NUM_CANDIDATES];
            for approved in approvals.iter_mut() {
                *approved = rng.gen();
            }
            (name, ApprovalSet::from(approvals))
        })
        .collect();

    let scrutineer = Scrutineer::new(SecretToken::generate(&mut rng));
    let issuer = IdentityIssuer::with_rng(config.rng(ISSUER_STREAM));
    let mut tallyman = Tallyman::with_issuer(issuer, config.on_duplicate);
    let mut sampler = RandomSampler::new(config.rng(SAMPLER_STREAM));

    let report = run_election(&ballots, &mut tallyman, &scrutineer, &mut sampler);

    for receipt in report.receipts.iter() {
        if receipt.verified {
            println!("Vote verified by Scrutineer for voter hash ID: {}", receipt.key);
        } else {
            println!("Vote could not be verified by Scrutineer.");
        }
    }
    for rejected in report.rejected.iter() {
        println!("Ballot from {} was refused: {}", rejected.voter, rejected.reason);
    }

    let result = &report.tally.result;
    let counts: Vec<String> = result
        .counts
        .iter()
        .map(|(candidate, count)| format!("{}: {}", candidate, count))
        .collect();
    println!("Vote Counts: {{{}}}", counts.join(", "));
    println!("{}", result.announcement());
}
