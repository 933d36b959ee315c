//! Fetches a url and prints the response as it streams in.
//!
//! ```shell
//! cargo run --example fetch -- http://127.0.0.1:8080/
//! ```

use std::io::Write;

use futures::StreamExt;
use futures::channel::mpsc;
use reactor_http::client::{ClientConnection, ClientEvent, ClientSession};
use reactor_http::protocol::Delivery;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let url = std::env::args().nth(1).unwrap_or_else(|| "http://127.0.0.1:8080/".to_owned());

    let (sender, mut receiver) = mpsc::unbounded();
    let mut session = ClientSession::new(sender);
    if let Err(e) = session.open("GET", &url, "", Delivery::Streaming) {
        error!(cause = %e, "can't open session");
        return;
    }
    tokio::spawn(ClientConnection::new(session).run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(cause = %e, "listen for ctrl-c error");
        }
    }));

    let mut stdout = std::io::stdout();
    while let Some(event) = receiver.next().await {
        match event {
            ClientEvent::Header(head) => {
                println!("HTTP/1.{} {} {}", head.minor_version(), head.status(), String::from_utf8_lossy(head.reason()));
                for field in head.fields() {
                    println!("{}: {}", String::from_utf8_lossy(field.name()), String::from_utf8_lossy(field.value()));
                }
                println!();
            }
            ClientEvent::Chunk(chunk) => {
                if let Err(e) = stdout.write_all(&chunk) {
                    error!(cause = %e, "write stdout error");
                }
            }
            ClientEvent::Response(_) => {
                if let Err(e) = stdout.flush() {
                    error!(cause = %e, "flush stdout error");
                }
            }
            ClientEvent::Error(e) => error!(cause = %e, "fetch failed"),
            ClientEvent::Close => break,
        }
    }
}
