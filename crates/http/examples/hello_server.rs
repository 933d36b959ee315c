use std::net::SocketAddr;

use reactor_http::protocol::{Field, HttpError, Request};
use reactor_http::server::{Handler, HttpServer, ServerSession};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

struct Hello;

impl Handler for Hello {
    fn on_request(&self, session: &mut ServerSession, request: Request) {
        let path = String::from_utf8_lossy(request.path()).into_owned();
        info!(path = %path, content_len = request.content().len(), "request");

        match path.as_str() {
            "/" => session.respond(200, Some("text/plain"), "Hello World!\r\n"),
            "/echo" => session.respond(200, Some("application/octet-stream"), request.content().clone()),
            "/peer" => {
                let peer = session.peer().map(|peer| peer.to_string()).unwrap_or_default();
                session.respond_with_fields(200, Some("text/plain"), peer, [Field::new("Cache-Control", "no-store")]);
            }
            _ => session.respond(404, Some("text/plain"), "Not Found\r\n"),
        }
    }

    fn on_accept(&self, peer: SocketAddr) {
        info!(%peer, "accept");
    }

    fn on_error(&self, error: HttpError) {
        warn!(cause = %error, "connection error");
    }

    fn on_close(&self) {
        info!("listener closed");
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let server = match HttpServer::builder().address("127.0.0.1", "8080").name("reactor-http").build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "invalid server config");
            return;
        }
    };

    if let Err(e) = server.start(Hello).await {
        error!(cause = %e, "server error");
    }
}
