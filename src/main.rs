#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = classbook::run().await {
        eprintln!("classbook fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
