//! Stand-alone async-race backend for local development and demos.

use clap::Parser;
use log::info;

use async_race::{mock, random_cars, InMemoryBackend};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Random cars to put in the garage at start-up
    #[arg(short, long, default_value_t = 4)]
    seed: usize,
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let backend = InMemoryBackend::new();
    for car in random_cars(args.seed) {
        backend.seed_car(&car.name, &car.color);
    }
    info!("garage seeded with {} car(s)", args.seed);

    mock::serve(backend, &args.bind).await
}
