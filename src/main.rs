use log::{error, info};
use proc_regex_sim::automaton;
use regex::Regex;
use regex_sim_transformer::{
    build_automata, format_automaton, preset, Automaton, AutomatonDefinition, Budget, Simulation,
    StateSet,
};
use std::hint::black_box;
use std::process::ExitCode;
use std::time::Instant;

const USAGE: &str = "usage: regex_sim [--len-limit=N] [--nfa-limit=N] [--dfa-limit=N] \
                     [--input=W] [--preset=NAME] [--definition=FILE] <pattern>...";

fn main() -> ExitCode {
    env_logger::init();

    let mut budget = Budget::default();
    let mut input = None;
    let mut definitions = Vec::new();
    let mut patterns = Vec::new();
    for arg in std::env::args().skip(1) {
        let Some(flag) = arg.strip_prefix("--") else {
            patterns.push(arg);
            continue;
        };
        let Some((name, value)) = flag.split_once('=') else {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        };

        match name {
            "input" => input = Some(value.to_string()),
            "preset" => match preset(value) {
                Some(text) => definitions.push((value.to_string(), text.to_string())),
                None => {
                    eprintln!("unknown preset {value:?}");
                    return ExitCode::from(2);
                }
            },
            "definition" => match std::fs::read_to_string(value) {
                Ok(text) => definitions.push((value.to_string(), text)),
                Err(e) => {
                    eprintln!("{value}: {e}");
                    return ExitCode::from(2);
                }
            },
            "len-limit" | "nfa-limit" | "dfa-limit" => {
                let Ok(limit) = value.parse::<usize>() else {
                    eprintln!("invalid limit {value:?}\n{USAGE}");
                    return ExitCode::from(2);
                };
                budget = match name {
                    "len-limit" => budget.pattern_len(limit),
                    "nfa-limit" => budget.nfa_states(limit),
                    _ => budget.dfa_states(limit),
                };
            }
            _ => {
                eprintln!("unknown flag --{name}\n{USAGE}");
                return ExitCode::from(2);
            }
        }
    }

    if patterns.is_empty() && definitions.is_empty() {
        demo();
        return ExitCode::SUCCESS;
    }

    let mut failed = false;
    for pattern in &patterns {
        match build_automata(pattern, &budget) {
            Ok(automata) => {
                println!("Pattern: {pattern}\n");
                println!("[NFA]\n{}\n", format_automaton(&automata.nfa));
                println!("[DFA]\n{}\n", format_automaton(&automata.dfa));
                if let Some(input) = &input {
                    trace_run(&automata.dfa, input);
                }
            }
            Err(e) => {
                error!("rejected {pattern:?}");
                eprintln!("{pattern}: {e}");
                failed = true;
            }
        }
    }

    for (source, text) in &definitions {
        match text.parse::<AutomatonDefinition>() {
            Ok(automaton) => {
                println!("Automaton: {source}\n");
                println!("{}\n", format_automaton(&automaton));
                if let Some(input) = &input {
                    trace_run(&automaton, input);
                }
            }
            Err(e) => {
                error!("rejected definition {source:?}");
                eprintln!("{source}: {e}");
                failed = true;
            }
        }
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

/// Prints the live state set after every symbol of `input`.
fn trace_run<A: Automaton + ?Sized>(automaton: &A, input: &str) {
    let mut sim = Simulation::new(automaton, input);
    let show = |set: &StateSet| set.iter().map(|s| format!("q{s}")).collect::<Vec<_>>().join(", ");

    println!("Input: {input:?}");
    println!("  start: {{{}}}", show(sim.current()));
    while sim.step() {
        if let Some(m) = sim.last_move() {
            println!("  q{},{} → q{}", m.from, m.symbol, m.to);
        }
        println!("  {}: {{{}}}", sim.position(), show(sim.current()));
    }
    println!("  {}\n", if sim.is_accepted() { "accepted" } else { "rejected" });
}

fn demo() {
    assert!(my_implementation("abb"));
    assert!(my_implementation("aababb"));
    assert!(my_implementation("babb"));
    assert!(!my_implementation("abba"));
    assert!(!my_implementation("ab"));

    const TOTAL_RUNS: usize = 1_000_000;

    const TEST_SUIT: [&str; 4] = [
        "abb",
        "ababab",
        "bbbbabb",
        "none"
    ];

    info!("running {TOTAL_RUNS} matches per implementation");

    let start = Instant::now();
    for x in 0..TOTAL_RUNS {
        let i = x % TEST_SUIT.len();
        black_box(
            my_implementation(black_box(TEST_SUIT[i]))
        );
    }
    let my_time = start.elapsed();

    println!("Mine            : {:?} | {:?} per request", my_time, my_time / TOTAL_RUNS as u32);

    let re = Regex::new("^(a|b)*abb$").unwrap();
    let start = Instant::now();
    for x in 0..TOTAL_RUNS {
        let i = x % TEST_SUIT.len();
        black_box(
            regex_implementation(&re, black_box(TEST_SUIT[i]))
        );
    }
    let regex_time = start.elapsed();

    println!("Regex           : {:?} | {:?} per request", regex_time, regex_time / TOTAL_RUNS as u32);
}

const fn my_implementation(to_test: &str) -> bool {
    automaton!("(a|b)*abb").test(to_test)
}

fn regex_implementation(re: &Regex, to_test: &str) -> bool {
    re.is_match(to_test)
}
