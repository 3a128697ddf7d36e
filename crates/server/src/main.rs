#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sparky_server::start().await
}
