//! TCP front door for the game server.
//!
//! One blocking listener; each accepted connection gets its own thread and a
//! private `GameSession`. The engine core inside a session is strictly
//! single-threaded.

pub mod protocol;
pub mod session;

use std::io::{self, BufReader};
use std::net::TcpStream;
use std::thread;

use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::server::session::GameSession;

pub fn run_server(config: EngineConfig) -> io::Result<()> {
    let listener = std::net::TcpListener::bind(&config.listen_address)?;
    info!(address = %config.listen_address, "listening");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let config = config.clone();
                thread::spawn(move || {
                    if let Err(error) = handle_connection(stream, config) {
                        warn!(%error, "connection ended with an error");
                    }
                });
            }
            Err(error) => warn!(%error, "failed to accept connection"),
        }
    }

    Ok(())
}

fn handle_connection(stream: TcpStream, config: EngineConfig) -> io::Result<()> {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_owned());
    info!(%peer, "client connected");

    let reader = BufReader::new(stream.try_clone()?);
    let mut session = match GameSession::new(config) {
        Ok(session) => session,
        Err(message) => {
            error!(%message, "failed to start a game session");
            return Ok(());
        }
    };
    let result = session.run(reader, stream);
    info!(%peer, "client disconnected");
    result
}
