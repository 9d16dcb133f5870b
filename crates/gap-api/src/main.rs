#[tokio::main]
async fn main() {
    if let Err(err) = gap_api::run().await {
        tracing::error!(error = %err, "gap-api failed");
        eprintln!("gap-api failed: {err}");
        std::process::exit(1);
    }
}
