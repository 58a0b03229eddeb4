use tally::config::DatasetKind;

fn main() -> Result<(), anyhow::Error> {
    tally::cli::main(DatasetKind::Progress)
}
