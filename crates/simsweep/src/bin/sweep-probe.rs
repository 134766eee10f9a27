//! sweep-probe - a controllable stand-in for an external simulator
//!
//! Accepts arbitrary `--name=value` arguments and prints one whitespace-
//! separated line: for column `j`, the sum of its numeric argument values
//! plus `j`. Control arguments:
//!   --cols=N     output width (default 1)
//!   --noise=S    Gaussian noise stddev added per column (default 0)
//!   --exit=N     exit code after printing (default 0)
//!   --garbage    print a non-numeric token instead of numbers
//!
//! The end-to-end tests sweep this binary as their external executable; it
//! also makes a handy smoke target for trying out plans by hand.

use std::process::ExitCode;

use rand_distr::{Distribution, Normal};

struct Probe {
    cols: usize,
    noise: f64,
    exit: u8,
    garbage: bool,
    /// Sum of all numeric parameter values
    total: f64,
}

fn parse_args() -> Result<Probe, String> {
    let mut probe = Probe {
        cols: 1,
        noise: 0.0,
        exit: 0,
        garbage: false,
        total: 0.0,
    };
    for arg in std::env::args().skip(1) {
        if arg == "--garbage" {
            probe.garbage = true;
            continue;
        }
        let Some((name, value)) = arg.strip_prefix("--").and_then(|rest| rest.split_once('='))
        else {
            return Err(format!("unrecognized argument {arg:?}"));
        };
        match name {
            "cols" => {
                probe.cols = value
                    .parse()
                    .map_err(|_| format!("bad --cols value {value:?}"))?;
            }
            "noise" => {
                probe.noise = value
                    .parse()
                    .map_err(|_| format!("bad --noise value {value:?}"))?;
            }
            "exit" => {
                probe.exit = value
                    .parse()
                    .map_err(|_| format!("bad --exit value {value:?}"))?;
            }
            // Any other parameter contributes its numeric value; text
            // values are accepted and ignored in the sum.
            _ => {
                if let Ok(number) = value.parse::<f64>() {
                    probe.total += number;
                }
            }
        }
    }
    Ok(probe)
}

fn main() -> ExitCode {
    let probe = match parse_args() {
        Ok(probe) => probe,
        Err(message) => {
            eprintln!("sweep-probe: {message}");
            return ExitCode::from(2);
        }
    };

    if probe.garbage {
        println!("not-a-number");
        return ExitCode::from(probe.exit);
    }

    let noise = if probe.noise > 0.0 {
        match Normal::new(0.0, probe.noise) {
            Ok(dist) => Some(dist),
            Err(_) => {
                eprintln!("sweep-probe: bad --noise value {}", probe.noise);
                return ExitCode::from(2);
            }
        }
    } else {
        None
    };

    let mut rng = rand::rng();
    let line: Vec<String> = (0..probe.cols)
        .map(|j| {
            let mut value = probe.total + j as f64;
            if let Some(dist) = &noise {
                value += dist.sample(&mut rng);
            }
            value.to_string()
        })
        .collect();
    println!("{}", line.join(" "));
    ExitCode::from(probe.exit)
}
