use clap::error::ErrorKind;
use clap::Parser;
use log;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rusty_lif::config::{Parameters, DEFAULT_CONFIG_FILE};
use rusty_lif::error::{SNNError, EXIT_CONFIG, EXIT_IO};
use rusty_lif::output::OutputWriter;
use rusty_lif::simulator::simulator::Simulation;

/// Simulate a sparsely-connected network of leaky integrate-and-fire neurons.
/// Options given on the command line override the configuration file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The configuration file (defaults to brunel2000.conf, if present)
    #[arg(short = 'c', long)]
    config_file: Option<PathBuf>,
    /// Print debug messages
    #[arg(short = 'v', long)]
    verbose: bool,
    /// The number of neurons
    #[arg(short = 'N', long = "number-of-neurons")]
    num_neurons: Option<usize>,
    /// The number of connections per neuron
    #[arg(short = 'C', long = "number-of-connections")]
    num_connections: Option<usize>,
    /// The fraction of excitatory neurons
    #[arg(short = 'f', long = "fraction-excitatory")]
    fraction_excitatory: Option<f64>,
    /// The excitatory synaptic efficacy (in mV)
    #[arg(short = 'J', long = "synaptic-efficacy")]
    efficacy: Option<f64>,
    /// The ratio between inhibitory and excitatory efficacies
    #[arg(short = 'g', long = "inh-to-exc-weight-ratio")]
    inh_exc_ratio: Option<f64>,
    /// The membrane time constant (in ms)
    #[arg(short = 'T', long)]
    membrane_time_constant: Option<f64>,
    /// The refractory period (in ms)
    #[arg(short = 'r', long)]
    refractory_period: Option<f64>,
    /// The transmission delay (in ms)
    #[arg(short = 'D', long)]
    synaptic_delay: Option<f64>,
    /// The fast synaptic time constant (in ms)
    #[arg(short = 't', long)]
    synaptic_time_constant: Option<f64>,
    /// The slow synaptic time constant (in ms), enables slow synapses
    #[arg(short = 's', long)]
    slow_synaptic_time_constant: Option<f64>,
    /// The external current (in mV)
    #[arg(short = 'I', long, alias = "ext-current")]
    external_current: Option<f64>,
    /// The total simulated time (in ms)
    #[arg(long)]
    total_time: Option<f64>,
    /// The timestep (in ms)
    #[arg(long)]
    dt: Option<f64>,
    /// The warm-up time before which spikes are not counted (in ms)
    #[arg(long)]
    offset: Option<f64>,
    /// The width of the population rate window (in ms)
    #[arg(long)]
    time_window_size: Option<f64>,
    /// The seed of the random variate source
    #[arg(long)]
    seed: Option<u64>,
    /// The directory of the output files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Also write the log messages to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Write the membrane potential and currents of every neuron at the end of the run
    #[arg(long)]
    save_synaptic_state: bool,
}

impl Args {
    /// Override the parameters with the options given on the command line.
    fn apply_to(&self, parameters: &mut Parameters) {
        if let Some(value) = self.num_neurons {
            parameters.num_neurons = value;
        }
        if let Some(value) = self.num_connections {
            parameters.num_connections = value;
        }
        if let Some(value) = self.fraction_excitatory {
            parameters.fraction_excitatory = value;
        }
        if let Some(value) = self.efficacy {
            parameters.efficacy = value;
        }
        if let Some(value) = self.inh_exc_ratio {
            parameters.inh_exc_ratio = value;
        }
        if let Some(value) = self.membrane_time_constant {
            parameters.tau_m = value;
        }
        if let Some(value) = self.refractory_period {
            parameters.tau_rp = value;
        }
        if let Some(value) = self.synaptic_delay {
            parameters.delay = value;
        }
        if let Some(value) = self.synaptic_time_constant {
            parameters.tau_fast = value;
        }
        if let Some(value) = self.external_current {
            parameters.ext_current = value;
        }
        if let Some(value) = self.total_time {
            parameters.total_time = value;
        }
        if let Some(value) = self.dt {
            parameters.dt = value;
        }
        if let Some(value) = self.offset {
            parameters.offset = value;
        }
        if let Some(value) = self.time_window_size {
            parameters.time_window_size = value;
        }
        if let Some(value) = self.seed {
            parameters.seed = value;
        }
        if self.slow_synaptic_time_constant.is_some() {
            parameters.tau_slow = self.slow_synaptic_time_constant;
        }
    }
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), SNNError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{l} - {m}{n}")))
        .build();
    let mut config = Config::builder().appender(Appender::builder().build("console", Box::new(console)));
    let mut root = Root::builder().appender("console");

    if let Some(path) = log_file {
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{l} - {m}{n}")))
            .build(path)
            .map_err(|e| SNNError::IOError(e.to_string()))?;
        config = config.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
    }

    let config = config
        .build(root.build(level))
        .map_err(|e| SNNError::IOError(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| SNNError::IOError(e.to_string()))?;
    Ok(())
}

/// Resolve the parameters: defaults, then the configuration file, then the command line.
fn load_parameters(args: &Args) -> Result<Parameters, SNNError> {
    let mut parameters = match &args.config_file {
        Some(path) => Parameters::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Parameters::load(DEFAULT_CONFIG_FILE)?,
        None => {
            log::warn!(
                "Configuration file {} not found, using the default parameters",
                DEFAULT_CONFIG_FILE
            );
            Parameters::default()
        }
    };
    args.apply_to(&mut parameters);
    parameters.validate()?;
    Ok(parameters)
}

fn run(args: &Args) -> Result<(), SNNError> {
    let parameters = load_parameters(args)?;
    log::debug!("\n{}", parameters);

    let output = OutputWriter::new(&args.output_dir, &parameters)?;
    output.write_parameters(&parameters)?;

    let mut simulation = Simulation::build(&parameters)?;
    let rates = simulation.run()?;

    output.write_spikes(simulation.network())?;
    output.write_population_rate(&parameters, &rates)?;
    output.write_autocorrelation(&simulation.average_autocorrelation()?)?;
    output.write_global_autocorrelation(&simulation.population_autocorrelation()?)?;
    if args.save_synaptic_state {
        output.write_synaptic_state(&simulation.network().synaptic_snapshot())?;
    }

    log::info!("All outputs written with suffix {}", output.suffix());
    Ok(())
}

/// The exit code of a command line which could not be parsed.
/// Help and version requests are not failures; malformed options are configuration errors.
fn parse_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => EXIT_CONFIG,
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // clap routes help and version to stdout, errors to stderr
            let _ = e.print();
            return ExitCode::from(parse_exit_code(e.kind()));
        }
    };

    if let Err(e) = init_logging(args.verbose, args.log_file.as_deref()) {
        eprintln!("{}", e);
        return ExitCode::from(EXIT_IO);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let args = Args::try_parse_from([
            "rusty_lif", "-N", "200", "-C", "20", "-s", "100", "--dt", "0.1", "-I", "25",
        ])
        .unwrap();
        let mut parameters = Parameters {
            num_neurons: 5000,
            tau_m: 10.0,
            ..Parameters::default()
        };
        args.apply_to(&mut parameters);

        assert_eq!(parameters.num_neurons, 200);
        assert_eq!(parameters.num_connections, 20);
        assert_eq!(parameters.tau_slow, Some(100.0));
        assert_eq!(parameters.dt, 0.1);
        assert_eq!(parameters.ext_current, 25.0);
        // not given on the command line
        assert_eq!(parameters.tau_m, 10.0);
        assert!(!args.save_synaptic_state);
    }

    #[test]
    fn test_cli_long_options() {
        let args = Args::try_parse_from([
            "rusty_lif",
            "--number-of-neurons",
            "200",
            "--number-of-connections",
            "20",
            "--fraction-excitatory",
            "0.75",
            "--synaptic-efficacy",
            "0.2",
            "--inh-to-exc-weight-ratio",
            "4.5",
            "--ext-current",
            "25",
        ])
        .unwrap();
        let mut parameters = Parameters::default();
        args.apply_to(&mut parameters);

        assert_eq!(parameters.num_neurons, 200);
        assert_eq!(parameters.num_connections, 20);
        assert_eq!(parameters.fraction_excitatory, 0.75);
        assert_eq!(parameters.efficacy, 0.2);
        assert_eq!(parameters.inh_exc_ratio, 4.5);
        assert_eq!(parameters.ext_current, 25.0);

        let args = Args::try_parse_from(["rusty_lif", "--external-current", "15"]).unwrap();
        assert_eq!(args.external_current, Some(15.0));
    }

    #[test]
    fn test_malformed_option_is_config_error() {
        let e = Args::try_parse_from(["rusty_lif", "-N", "ten"]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::ValueValidation);
        assert_eq!(parse_exit_code(e.kind()), EXIT_CONFIG);

        let e = Args::try_parse_from(["rusty_lif", "--bogus"]).unwrap_err();
        assert_eq!(parse_exit_code(e.kind()), EXIT_CONFIG);

        let e = Args::try_parse_from(["rusty_lif", "--help"]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse_exit_code(e.kind()), 0);
    }
}
