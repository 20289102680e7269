mod cli;

use clap::Parser;
use miette::IntoDiagnostic;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use deriv::{
    evaluate, numeric_derivative_with_step, parse,
    grade::{Grader, Problem},
    plot::{Series, Viewport, sample_curve},
};

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let variable = cli.variable.as_str();

    match cli.command {
        Command::Eval { expr, at } => {
            let exp = parse(&expr, variable)?;
            println!("{}", evaluate(&exp, at)?);
        }
        Command::Slope { expr, at, step } => {
            let exp = parse(&expr, variable)?;
            println!("{}", numeric_derivative_with_step(&exp, at, step)?);
        }
        Command::Diff { expr } => {
            let (derivative, _) = Grader::new(variable).solve(&expr)?;
            println!("{derivative}");
        }
        Command::Check {
            answer,
            expected,
            equation,
        } => {
            let problem = Problem {
                equation: equation.unwrap_or_default(),
                solution: expected,
            };
            let verdict = Grader::new(variable).check(&problem, &answer)?;
            if verdict.correct {
                println!("correct");
            } else {
                println!("incorrect, expected {}", verdict.expected);
            }
        }
        Command::Plot {
            expr,
            derivative,
            view,
        } => {
            let exp = parse(&expr, variable)?;
            let series = if derivative {
                Series::Derivative
            } else {
                Series::Function
            };
            let segments = sample_curve(&exp, &Viewport::from(&view), series)?;
            let mut out = io::stdout().lock();
            for (i, segment) in segments.iter().enumerate() {
                if i > 0 {
                    writeln!(out).into_diagnostic()?;
                }
                for point in segment {
                    writeln!(out, "{} {}", point.x, point.y).into_diagnostic()?;
                }
            }
        }
    }
    Ok(())
}
