use clap::Parser;
use simple_translate_cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    simple_translate_cli::init_tracing();
    let cli = Cli::parse();
    simple_translate_cli::run(cli).await
}
