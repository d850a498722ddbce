use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = urlrelay::cli::Cli::parse();
    if let Err(e) = urlrelay::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
