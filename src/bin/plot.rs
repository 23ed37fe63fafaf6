use droplog::{Plot, PlotStyle};

fn main() -> droplog::Result<()> {
    env_logger::init();

    let filename = std::env::args().nth(1)
        .unwrap_or_else(|| droplog::DEFAULT_FILENAME.to_owned());
    let run = droplog::codec::read_file(&filename)?;
    let plot = Plot::from_run(&run)?;
    print!("{}", plot.draw(&PlotStyle::default())?);
    Ok(())
}
