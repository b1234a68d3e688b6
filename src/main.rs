#[tokio::main]
async fn main() -> std::io::Result<()> {
    clicker_server::run_with_config().await
}
