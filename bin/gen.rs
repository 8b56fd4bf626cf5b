use clap::{Arg, Command};
use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    let matches = Command::new("gen")
        .about("Write a synthetic proxies-performance.csv to stdout")
        .arg(
            Arg::new("rows")
                .long("rows")
                .value_parser(clap::value_parser!(usize))
                .default_value("32"),
        )
        .get_matches();

    let rows = matches.get_one::<usize>("rows").copied().unwrap_or(32);

    let mut out = io::BufWriter::new(io::stdout().lock());
    writeln!(&mut out, "Case,Requests/sec,Transfer 10K/sec,Server Error,Timeout")?;
    // row i carries R{i}/T{i} so the rotated output shows where each value came from
    for i in 0..rows {
        writeln!(&mut out, "label{i},R{i},T{i},0,0")?;
    }

    out.flush()?;
    Ok(())
}
