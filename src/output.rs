//! Writers for the simulation outputs.
//!
//! All files of a run share a suffix built from the main parameters, e.g., `N1000_mu20_delay_1p50_T1_01p0.dat`.
//! The record writers are generic over [`Write`] and the [`OutputWriter`] maps them to files in an output directory.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::analysis::autocorrelation::AutocorrelationBin;
use crate::config::Parameters;
use crate::error::SNNError;
use crate::network::network::Network;
use crate::network::neuron::SynapticState;
use crate::simulator::simulator::RateSample;

/// Number of neurons, from the first index, whose spikes are written to the spike file.
pub const SPIKE_RECORD_NEURONS: usize = 100;

/// The suffix shared by the output files of a run.
pub fn file_suffix(parameters: &Parameters) -> String {
    let delay = format!("{:4.2}", parameters.delay).replace('.', "p");
    let tau_fast = format!("{:04.1}", parameters.tau_fast).replace('.', "p");
    let mut suffix = format!(
        "N{}_mu{:02}_delay_{}_T1_{}",
        parameters.num_neurons, parameters.ext_current as i64, delay, tau_fast
    );
    if let Some(tau_slow) = parameters.tau_slow {
        suffix.push_str(&format!("_T2_{}", tau_slow as i64));
    }
    suffix.push_str(".dat");
    suffix
}

/// Write the parameter header of the population rate file.
pub fn write_header<W: Write>(writer: &mut W, parameters: &Parameters) -> Result<(), SNNError> {
    writeln!(
        writer,
        "# N = {}, C = {}, J = {:4.2}, mu = {:4.2}, g = {:3.1}, dt = {:4.2}",
        parameters.num_neurons,
        parameters.num_connections,
        parameters.efficacy,
        parameters.ext_current,
        parameters.inh_exc_ratio,
        parameters.dt
    )?;
    write!(
        writer,
        "# tau_m = {:4.1}, tau_rp = {:5.3}, D = {:5.3}, tau_fast = {:5.3}",
        parameters.tau_m, parameters.tau_rp, parameters.delay, parameters.tau_fast
    )?;
    if let Some(tau_slow) = parameters.tau_slow {
        write!(writer, ", tau_slow = {:.1}", tau_slow)?;
    }
    writeln!(writer, "\n#")?;
    Ok(())
}

/// Write the `time index` records of the spikes of the first `num_neurons` neurons, neuron by neuron.
pub fn write_spikes<W: Write>(
    writer: &mut W,
    network: &Network,
    num_neurons: usize,
) -> Result<(), SNNError> {
    for (id, neuron) in network.neurons_iter().take(num_neurons).enumerate() {
        for &time in neuron.spike_train().iter() {
            writeln!(writer, "{:7.3} {:4}", time, id)?;
        }
    }
    Ok(())
}

/// Write the `time rate` records of the population rate.
pub fn write_population_rate<W: Write>(
    writer: &mut W,
    rates: &[RateSample],
) -> Result<(), SNNError> {
    for sample in rates.iter() {
        writeln!(writer, "{:9.3}  {:9.3}", sample.time, sample.rate)?;
    }
    Ok(())
}

/// Write the `lower upper value` records of an autocorrelation.
pub fn write_autocorrelation<W: Write>(
    writer: &mut W,
    bins: &[AutocorrelationBin],
) -> Result<(), SNNError> {
    for bin in bins.iter() {
        writeln!(writer, "{:9.4} {:9.4} {:9.7}", bin.lower, bin.upper, bin.value)?;
    }
    Ok(())
}

/// Write the `V I_fast I_slow` records of every neuron.
pub fn write_synaptic_state<W: Write>(
    writer: &mut W,
    states: &[SynapticState],
) -> Result<(), SNNError> {
    for state in states.iter() {
        writeln!(writer, "{:e} {:e} {:e}", state.v_m, state.i_fast, state.i_slow)?;
    }
    Ok(())
}

/// Creates the output files of a run in a directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    suffix: String,
}

impl OutputWriter {
    /// Create the writer, and the output directory if it does not exist.
    pub fn new<P: AsRef<Path>>(dir: P, parameters: &Parameters) -> Result<Self, SNNError> {
        std::fs::create_dir_all(dir.as_ref())?;
        Ok(OutputWriter {
            dir: dir.as_ref().to_path_buf(),
            suffix: file_suffix(parameters),
        })
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The path of the output file with the given prefix.
    pub fn path(&self, prefix: &str) -> PathBuf {
        self.dir.join(format!("{}_{}", prefix, self.suffix))
    }

    fn create(&self, prefix: &str) -> Result<BufWriter<File>, SNNError> {
        let path = self.path(prefix);
        log::info!("Writing {}", path.display());
        Ok(BufWriter::new(File::create(path)?))
    }

    pub fn write_spikes(&self, network: &Network) -> Result<(), SNNError> {
        let mut writer = self.create("spikes")?;
        write_spikes(&mut writer, network, SPIKE_RECORD_NEURONS)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_population_rate(
        &self,
        parameters: &Parameters,
        rates: &[RateSample],
    ) -> Result<(), SNNError> {
        let mut writer = self.create("population_rate")?;
        write_header(&mut writer, parameters)?;
        write_population_rate(&mut writer, rates)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_autocorrelation(&self, bins: &[AutocorrelationBin]) -> Result<(), SNNError> {
        let mut writer = self.create("autocorrelation")?;
        write_autocorrelation(&mut writer, bins)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_global_autocorrelation(
        &self,
        bins: &[AutocorrelationBin],
    ) -> Result<(), SNNError> {
        let mut writer = self.create("global_autocorrelation")?;
        write_autocorrelation(&mut writer, bins)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_synaptic_state(&self, states: &[SynapticState]) -> Result<(), SNNError> {
        let mut writer = self.create("synaptic_variables")?;
        write_synaptic_state(&mut writer, states)?;
        writer.flush()?;
        Ok(())
    }

    /// Save the resolved parameters as JSON, next to the data files.
    pub fn write_parameters(&self, parameters: &Parameters) -> Result<(), SNNError> {
        let stem = self.suffix.trim_end_matches(".dat");
        let path = self.dir.join(format!("parameters_{}.json", stem));
        log::info!("Writing {}", path.display());
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, parameters)
            .map_err(|e| SNNError::IOError(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::params::NetworkParameters;
    use crate::random::RandomSource;
    use tempfile::tempdir;

    #[test]
    fn test_file_suffix() {
        let parameters = Parameters::default();
        assert_eq!(file_suffix(&parameters), "N1000_mu20_delay_1p50_T1_01p0.dat");

        let parameters = Parameters {
            num_neurons: 10000,
            ext_current: 5.7,
            delay: 2.0,
            tau_fast: 0.5,
            tau_slow: Some(100.0),
            ..Parameters::default()
        };
        assert_eq!(
            file_suffix(&parameters),
            "N10000_mu05_delay_2p00_T1_00p5_T2_100.dat"
        );
    }

    #[test]
    fn test_header() {
        let mut buffer = Vec::new();
        write_header(&mut buffer, &Parameters::default()).unwrap();
        let header = String::from_utf8(buffer).unwrap();
        assert_eq!(
            header,
            "# N = 1000, C = 100, J = 0.10, mu = 20.00, g = 5.0, dt = 0.05\n\
             # tau_m = 20.0, tau_rp = 2.000, D = 1.500, tau_fast = 1.000\n#\n"
        );
    }

    #[test]
    fn test_records() {
        let mut buffer = Vec::new();
        write_population_rate(
            &mut buffer,
            &[RateSample {
                time: 0.5,
                rate: 12.0,
            }],
        )
        .unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "    0.500     12.000\n");

        let mut buffer = Vec::new();
        write_autocorrelation(
            &mut buffer,
            &[AutocorrelationBin {
                lower: -1.0,
                upper: 0.0,
                value: 0.5,
            }],
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "  -1.0000    0.0000 0.5000000\n"
        );
    }

    #[test]
    fn test_spike_records() {
        let parameters = Parameters {
            num_neurons: 10,
            num_connections: 2,
            ..Parameters::default()
        };
        let params = NetworkParameters::build(&parameters).unwrap();
        let mut rng = RandomSource::seed_from_u64(0);
        let network = Network::build(params, parameters.dt, &mut rng).unwrap();

        let mut buffer = Vec::new();
        write_spikes(&mut buffer, &network, SPIKE_RECORD_NEURONS).unwrap();
        // nothing was simulated
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_output_files() {
        let dir = tempdir().unwrap();
        let parameters = Parameters::default();
        let output = OutputWriter::new(dir.path().join("run"), &parameters).unwrap();

        output
            .write_population_rate(
                &parameters,
                &[RateSample {
                    time: 0.5,
                    rate: 1.0,
                }],
            )
            .unwrap();
        output.write_parameters(&parameters).unwrap();

        let content = std::fs::read_to_string(output.path("population_rate")).unwrap();
        assert!(content.starts_with("# N = 1000"));
        assert_eq!(content.lines().count(), 4);

        let json = dir
            .path()
            .join("run")
            .join("parameters_N1000_mu20_delay_1p50_T1_01p0.json");
        let loaded: Parameters =
            serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
        assert_eq!(loaded, parameters);
    }
}
