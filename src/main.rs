#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    paybench_server::run().await
}
