fn main() -> anyhow::Result<()> {
    sporeformats::cli::run_cli()
}
