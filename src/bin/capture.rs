use droplog::{AcquisitionConfig, DataSource, SerialConfig, Simulator, SystemClock};

// Pass this instead of a port to capture a synthetic drop test.
const SIMULATOR_PORT: &str = "sim";

fn main() -> droplog::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let port = args.next().unwrap_or_else(|| droplog::DEFAULT_PORT.to_owned());
    let filename = args.next().unwrap_or_else(|| droplog::DEFAULT_FILENAME.to_owned());

    let source = if port == SIMULATOR_PORT {
        DataSource::Simulator(Simulator::default().with_period(droplog::SENSOR_PERIOD))
    } else {
        DataSource::Serial(SerialConfig::new(port))
    };
    let run = {
        let mut stream = source.open()?;
        droplog::acquire(&mut stream, &mut SystemClock, &AcquisitionConfig::default())?
    };
    droplog::codec::write_file(&filename, &run)?;
    println!("saved {} samples ({:.1} s), run `droplog-plot {}`",
        run.len(), run.duration(), filename);
    Ok(())
}
