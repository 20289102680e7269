use clap::{Args, Parser, Subcommand};

use deriv::{DEFAULT_STEP, plot::Viewport};

#[derive(Parser, Debug)]
#[command(name = "deriv", version, about = "Evaluate and differentiate expressions in one variable")]
pub struct Cli {
    /// Name of the variable
    #[arg(long = "var", global = true, default_value = "x")]
    pub variable: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate an expression at a point
    Eval {
        #[arg(allow_hyphen_values = true)]
        expr: String,
        #[arg(long, allow_negative_numbers = true)]
        at: f64,
    },
    /// Estimate the slope at a point with a centered difference
    Slope {
        #[arg(allow_hyphen_values = true)]
        expr: String,
        #[arg(long, allow_negative_numbers = true)]
        at: f64,
        #[arg(long, default_value_t = DEFAULT_STEP)]
        step: f64,
    },
    /// Differentiate a sum of c*x^n terms
    Diff {
        #[arg(allow_hyphen_values = true)]
        expr: String,
    },
    /// Check an answer against an expected derivative
    Check {
        #[arg(allow_hyphen_values = true)]
        answer: String,
        /// Known correct answer
        #[arg(long, allow_hyphen_values = true, conflicts_with = "equation", required_unless_present = "equation")]
        expected: Option<String>,
        /// Expression whose derivative is expected
        #[arg(long, allow_hyphen_values = true)]
        equation: Option<String>,
    },
    /// Print curve segments as `x y` lines, segments separated by blank lines
    Plot {
        #[arg(allow_hyphen_values = true)]
        expr: String,
        /// Plot the numeric derivative instead
        #[arg(long)]
        derivative: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Sample x over [-range, range]
    #[arg(long, default_value_t = Viewport::default().x_range)]
    pub range: f64,
    #[arg(long, default_value_t = Viewport::default().step)]
    pub step: f64,
    #[arg(long, allow_negative_numbers = true, default_value_t = Viewport::default().y_min)]
    pub y_min: f64,
    #[arg(long, allow_negative_numbers = true, default_value_t = Viewport::default().y_max)]
    pub y_max: f64,
}

impl From<&ViewArgs> for Viewport {
    fn from(args: &ViewArgs) -> Self {
        Viewport {
            x_range: args.range,
            step: args.step,
            y_min: args.y_min,
            y_max: args.y_max,
        }
    }
}
