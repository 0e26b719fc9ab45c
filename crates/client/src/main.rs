use clap::Parser;
use signed_identity::{SigningKey, telemetry};
use signed_identity_client::run;

#[derive(Parser)]
struct Args {
    #[clap(long, default_value = "127.0.0.1")]
    host: String,
    #[clap(long, default_value = "8181")]
    port: u16,
    #[clap(long, env = "SIGNING_KEY", hide_env_values = true)]
    signing_key: String,
    #[clap(long, env = "RUST_LOG", default_value = "warn")]
    log_filter: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_tracing(&args.log_filter)?;

    let key = SigningKey::new(args.signing_key)?;
    let round_trip = run(&args.host, args.port, &key).await?;

    println!("payload:   {}", String::from_utf8_lossy(&round_trip.payload));
    println!("signature: {}", round_trip.signature);
    println!("local:     {}", if round_trip.locally_verified { "valid" } else { "invalid" });
    println!("server:    {} {}", round_trip.status.as_u16(), round_trip.verdict);

    if !round_trip.accepted() {
        std::process::exit(1);
    }
    Ok(())
}
