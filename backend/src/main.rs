use clap::Parser;
use rijks_lib::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  rijks_lib::init_tracing();
  rijks_lib::run(Cli::parse()).await
}
