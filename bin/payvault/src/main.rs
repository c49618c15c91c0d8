#[tokio::main]
async fn main() -> Result<(), eyre::Report> {
    payvault::run().await
}
