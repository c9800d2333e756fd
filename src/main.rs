use raychess::config::EngineConfig;
use raychess::server::run_server;

fn main() {
    tracing_subscriber::fmt::init();

    let config = match EngineConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            eprintln!(
                "usage: raychess [--listen HOST:PORT] [--startpos FEN] [--depth N] \
                 [--random-chance N] [--random-threshold CP] [--endgame-threshold N] \
                 [--tt-file PATH]"
            );
            std::process::exit(2);
        }
    };

    if let Err(error) = run_server(config) {
        tracing::error!(%error, "server terminated");
        std::process::exit(1);
    }
}
