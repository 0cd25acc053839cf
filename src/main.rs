use anyhow::{Context, Result, anyhow};
use check_bit_length::{audit, cache};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The bit width `b`: the circuit outputs 1 iff the input is less than 2^b. Must be between
    /// 1 and 253.
    #[arg(long, global = true, default_value_t = 23)]
    #[arg(env = "CHECK_BIT_LENGTH_BITS")]
    bits: usize,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Builds the circuit and evaluates it on one or more inputs, printing one output per input.
    Evaluate {
        /// Decimal-encoded field elements.
        #[arg(long = "input", required = true)]
        inputs: Vec<String>,
    },

    /// Prints the number of constraints against the expected minimum of b + 2.
    Count,

    /// Audits the constraint count and fails if the circuit is likely under-constrained.
    Audit,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let gadget = cache::CACHE
        .get(args.bits)
        .with_context(|| format!("cannot build CheckBitLength({})", args.bits))?;

    match args.command {
        Command::Evaluate { inputs } => {
            for input in inputs {
                let output = gadget
                    .evaluate(input.as_str())
                    .with_context(|| format!("cannot evaluate input {:?}", input))?;
                println!("{}", output);
            }
        }
        Command::Count => println!("{}", audit::constraint_summary(gadget.as_ref())),
        Command::Audit => {
            let report = audit::audit(gadget.as_ref());
            println!("{}", report);
            if !report.passed() {
                return Err(anyhow!("the circuit is likely under-constrained"));
            }
        }
    }

    Ok(())
}
