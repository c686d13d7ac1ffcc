//! Mock fake-data API server
//!
//! Serves the seeded users and posts locally so the suites can run without
//! network access: `restprobe-mock --bind 127.0.0.1:4010`, then
//! `restprobe run --base-url http://127.0.0.1:4010`.

use std::net::SocketAddr;

use clap::Parser;
use restprobe::common::logging;
use restprobe::mock::MockServer;

#[derive(Parser)]
#[command(name = "restprobe-mock", about = "Local mock of the fake-data REST API")]
#[command(version, long_about = None)]
struct Args {
    /// Address to listen on (port 0 picks a free port)
    #[arg(long, default_value = "127.0.0.1:4010", env = "RESTPROBE_MOCK_BIND")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() {
    logging::init_mock();
    let args = Args::parse();

    let server = match MockServer::start(args.bind).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Test harnesses parse this line to discover the port
    println!("restprobe-mock listening at: {}", server.addr());

    tokio::select! {
        result = server.wait() => {
            if let Err(e) = result {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }
}
